//! Packed lists: an ordered sequence of strings kept in one store value as
//! `[a,b,"c d"]`.

use crate::value::{ValueError, NULL_VALUE};

/// Decodes a packed list. Brackets are optional so hand written values such
/// as `10,20,30` are accepted. Items holding the null sentinel decode to `""`.
pub fn expand_list(value: &str) -> Result<Vec<String>, ValueError> {
    let value = value.trim();
    let value = value.strip_prefix('[').unwrap_or(value);
    let value = value.strip_suffix(']').unwrap_or(value);

    let mut result = Vec::new();
    if value.trim().is_empty() {
        return Ok(result);
    }

    let mut item = String::new();
    let mut quoted = false;
    let mut in_quote = false;
    let mut escaped = false;
    for c in value.chars() {
        if in_quote {
            match c {
                _ if escaped => {
                    item.push(c);
                    escaped = false;
                }
                '\\' => escaped = true,
                '"' => in_quote = false,
                _ => item.push(c),
            }
            continue;
        }
        match c {
            ',' => {
                result.push(finish_item(&mut item, quoted));
                quoted = false;
            }
            '"' if item.is_empty() && !quoted => {
                quoted = true;
                in_quote = true;
            }
            '[' | ']' => return Err(ValueError::UnexpectedCharacter(c)),
            c if c.is_whitespace() => {}
            c => item.push(c),
        }
    }
    result.push(finish_item(&mut item, quoted));
    Ok(result)
}

fn finish_item(item: &mut String, quoted: bool) -> String {
    let value = std::mem::take(item);
    if !quoted && value.eq_ignore_ascii_case(NULL_VALUE) {
        String::new()
    } else {
        value
    }
}

/// Encodes items into a packed list. Blank items become the null sentinel;
/// items that would confuse the decoder are quoted.
pub fn collapse_list<T: AsRef<str>>(items: &[T]) -> String {
    let mut result = String::from("[");
    for (index, item) in items.iter().enumerate() {
        if index > 0 {
            result.push(',');
        }
        let item = item.as_ref();
        if item.trim().is_empty() {
            result.push_str(NULL_VALUE);
        } else if item.contains([',', '"', '\\', '[', ']']) || item.chars().any(char::is_whitespace)
        {
            result.push('"');
            result.push_str(&item.replace('\\', "\\\\").replace('"', "\\\""));
            result.push('"');
        } else {
            result.push_str(item);
        }
    }
    result.push(']');
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_and_bracketed_forms() {
        assert_eq!(expand_list("10,20,30").unwrap(), ["10", "20", "30"]);
        assert_eq!(expand_list("[10, 20 ,30]").unwrap(), ["10", "20", "30"]);
        assert!(expand_list("[]").unwrap().is_empty());
        assert!(expand_list("").unwrap().is_empty());
    }

    #[test]
    fn blank_items_use_null_sentinel() {
        let packed = collapse_list(&["a", "", "b"]);
        assert_eq!(packed, "[a,null,b]");
        assert_eq!(expand_list(&packed).unwrap(), ["a", "", "b"]);
    }

    #[test]
    fn special_items_are_quoted() {
        let items = ["a,b", "say \"hi\"", "back\\slash", "two words", "line\nbreak"];
        let packed = collapse_list(&items);
        assert_eq!(expand_list(&packed).unwrap(), items);
    }

    #[test]
    fn stray_bracket_is_rejected() {
        assert_eq!(
            expand_list("[a,[b]"),
            Err(ValueError::UnexpectedCharacter('['))
        );
    }
}
