//! Conversions between DAGS string values and integers/booleans, plus the
//! escaping used when a value is embedded in a packed list or array cell.

pub mod error;

pub use error::ValueError;

/// Reserved literal for "no value".
pub const NULL_VALUE: &str = "null";
pub const TRUE_VALUE: &str = "true";
pub const FALSE_VALUE: &str = "false";
/// Escape written in place of a line break, both in packed items and in
/// script output.
pub const NEWLINE_ESCAPE: &str = "\\n";

const COMMA_ESCAPE: &str = "\\x2C";

const TRUTHY: [&str; 7] = [TRUE_VALUE, "t", "on", "yes", "y", "1", "-1"];
const FALSY: [&str; 7] = [NULL_VALUE, FALSE_VALUE, "f", "off", "no", "n", "0"];

/// Empty, whitespace only, or the null sentinel.
pub fn is_null(value: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value.eq_ignore_ascii_case(NULL_VALUE)
}

/// Scripts are recognised by their leading `@`.
pub fn is_script(value: &str) -> bool {
    value.trim_start().starts_with('@')
}

pub fn to_int(value: &str) -> Result<i64, ValueError> {
    let trimmed = value.trim();
    if is_null(trimmed) || trimmed.eq_ignore_ascii_case(FALSE_VALUE) {
        return Ok(0);
    }
    if trimmed.eq_ignore_ascii_case(TRUE_VALUE) {
        return Ok(1);
    }
    trimmed
        .parse()
        .map_err(|_| ValueError::NotNumeric(value.to_string()))
}

pub fn to_bool(value: &str) -> Result<bool, ValueError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || FALSY.iter().any(|f| trimmed.eq_ignore_ascii_case(f)) {
        Ok(false)
    } else if TRUTHY.iter().any(|t| trimmed.eq_ignore_ascii_case(t)) {
        Ok(true)
    } else {
        Err(ValueError::NotBoolean(value.to_string()))
    }
}

pub fn bool_to_string(value: bool) -> &'static str {
    if value {
        TRUE_VALUE
    } else {
        FALSE_VALUE
    }
}

/// Escapes a single item so it can sit between the commas of a packed value.
pub fn pack_item(value: &str) -> String {
    if value.trim().is_empty() {
        return NULL_VALUE.to_string();
    }
    value
        .replace(',', COMMA_ESCAPE)
        .replace("\r\n", NEWLINE_ESCAPE)
        .replace('\n', NEWLINE_ESCAPE)
}

pub fn unpack_item(value: &str) -> String {
    if is_null(value) {
        return String::new();
    }
    value
        .replace(COMMA_ESCAPE, ",")
        .replace(NEWLINE_ESCAPE, "\n")
}

/// Decodes a quoted literal token: drops the surrounding quotes and resolves
/// `\"` and `\\`. Other escapes such as `\n` are left for the host.
pub fn unquote(text: &str) -> String {
    let Some(inner) = text.strip_prefix('"') else {
        return text.to_string();
    };
    let inner = inner.strip_suffix('"').unwrap_or(inner);

    let mut result = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            result.push(c);
            continue;
        }
        match chars.next() {
            Some(escaped @ ('"' | '\\')) => result.push(escaped),
            Some(other) => {
                result.push('\\');
                result.push(other);
            }
            None => result.push('\\'),
        }
    }
    result
}
