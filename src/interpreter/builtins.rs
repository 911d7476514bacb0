//! Keyword behaviour that does not touch control flow.

use super::error::RuntimeErrorKind;
use super::Engine;
use crate::keyword::Keyword;
use crate::store::{self, array, list, Store};
use crate::value;
use rand::{rngs::StdRng, Rng};

pub(super) fn arithmetic(keyword: Keyword, x: i64, y: i64) -> Result<i64, RuntimeErrorKind> {
    let result = match keyword {
        Keyword::Add | Keyword::AddTo => x.wrapping_add(y),
        Keyword::Sub | Keyword::SubTo => x.wrapping_sub(y),
        Keyword::Mul | Keyword::MulTo => x.wrapping_mul(y),
        Keyword::Div | Keyword::DivTo | Keyword::Mod | Keyword::ModTo if y == 0 => {
            return Err(RuntimeErrorKind::DivideByZero)
        }
        Keyword::Div | Keyword::DivTo => x.wrapping_div(y),
        Keyword::Mod | Keyword::ModTo => x.wrapping_rem(y),
        other => unreachable!("{other} is not arithmetic"),
    };
    Ok(result)
}

/// Boolean tests on a single value. The `*DATA` variants receive the stored
/// value already looked up.
pub(super) fn predicate(keyword: Keyword, x: &str) -> bool {
    match keyword {
        Keyword::True | Keyword::TrueData => value::to_bool(x).unwrap_or(true),
        Keyword::False | Keyword::FalseData => !value::to_bool(x).unwrap_or(true),
        Keyword::IsNull | Keyword::IsNullData => value::is_null(x),
        Keyword::IsScript | Keyword::IsScriptData => value::is_script(x),
        Keyword::IsBool | Keyword::IsBoolData => value::to_bool(x).is_ok(),
        other => unreachable!("{other} is not a predicate"),
    }
}

pub(super) fn random_below(rng: &mut StdRng, limit: i64) -> i64 {
    if limit <= 0 {
        0
    } else {
        rng.gen_range(0..limit)
    }
}

pub(super) fn random_percent(rng: &mut StdRng, percent: i64) -> bool {
    rng.gen_range(0..100) < percent
}

/// Pure functions over already evaluated arguments.
pub(super) fn function(keyword: Keyword, args: &[String]) -> Result<String, RuntimeErrorKind> {
    let int = |index: usize| value::to_int(&args[index]);
    let result = match keyword {
        Keyword::Abs => int(0)?.wrapping_abs().to_string(),
        Keyword::Add | Keyword::Sub | Keyword::Mul | Keyword::Div | Keyword::Mod => {
            arithmetic(keyword, int(0)?, int(1)?)?.to_string()
        }
        Keyword::Concat => args.concat(),
        Keyword::Lower => args[0].to_lowercase(),
        Keyword::Upper => args[0].to_uppercase(),
        Keyword::Trim => args[0].trim().to_string(),
        Keyword::Replace if args[1].is_empty() => args[0].clone(),
        Keyword::Replace => args[0].replace(&args[1], &args[2]),
        Keyword::Substring => {
            let length = args.get(2).map(|len| value::to_int(len)).transpose()?;
            substring(&args[0], int(1)?, length)
        }
        Keyword::Format => format(&args[0], &args[1..]),
        Keyword::Eq => value::bool_to_string(int(0)? == int(1)?).to_string(),
        Keyword::Ne => value::bool_to_string(int(0)? != int(1)?).to_string(),
        Keyword::Lt => value::bool_to_string(int(0)? < int(1)?).to_string(),
        Keyword::Le => value::bool_to_string(int(0)? <= int(1)?).to_string(),
        Keyword::Gt => value::bool_to_string(int(0)? > int(1)?).to_string(),
        Keyword::Ge => value::bool_to_string(int(0)? >= int(1)?).to_string(),
        Keyword::True
        | Keyword::False
        | Keyword::IsNull
        | Keyword::IsScript
        | Keyword::IsBool => value::bool_to_string(predicate(keyword, &args[0])).to_string(),
        other => unreachable!("{other} is dispatched by the engine"),
    };
    Ok(result)
}

/// Character based slice. Out of range positions are clamped and a missing
/// length takes the remainder.
fn substring(text: &str, start: i64, length: Option<i64>) -> String {
    let start = usize::try_from(start.max(0)).unwrap_or(usize::MAX);
    let chars = text.chars().skip(start);
    match length {
        Some(length) => chars
            .take(usize::try_from(length.max(0)).unwrap_or(usize::MAX))
            .collect(),
        None => chars.collect(),
    }
}

/// Replaces `{0}`, `{1}`... with the matching argument in one pass.
/// Placeholders without an argument are kept as written.
fn format(template: &str, args: &[String]) -> String {
    let mut result = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        result.push_str(&rest[..open]);
        let tail = &rest[open..];
        let argument = tail.find('}').and_then(|close| {
            let index: usize = tail[1..close].parse().ok()?;
            Some((args.get(index)?, close))
        });
        match argument {
            Some((argument, close)) => {
                result.push_str(argument);
                rest = &tail[close + 1..];
            }
            None => {
                result.push('{');
                rest = &tail[1..];
            }
        }
    }
    result.push_str(rest);
    result
}

fn list_index(position: &str) -> Result<usize, RuntimeErrorKind> {
    let index = value::to_int(position)?;
    usize::try_from(index).map_err(|_| RuntimeErrorKind::InvalidIndex(index))
}

fn grow(items: &mut Vec<String>, len: usize) {
    if items.len() < len {
        items.resize(len, String::new());
    }
}

impl<S: Store> Engine<S> {
    pub(super) fn list_command(
        &mut self,
        keyword: Keyword,
        args: &[String],
        out: &mut String,
    ) -> Result<(), RuntimeErrorKind> {
        let name = &args[0];
        if keyword == Keyword::ClearList {
            store::set(&mut self.store, name, "");
            return Ok(());
        }

        let mut items = list::expand_list(&store::get(&self.store, name))?;
        match keyword {
            Keyword::AddList => items.push(args[1].clone()),
            Keyword::GetList => {
                let index = list_index(&args[1])?;
                out.push_str(items.get(index).map_or("", String::as_str));
                return Ok(());
            }
            Keyword::ListLength => {
                out.push_str(&items.len().to_string());
                return Ok(());
            }
            Keyword::SetList => {
                let index = list_index(&args[1])?;
                grow(&mut items, index + 1);
                items[index] = args[2].clone();
            }
            Keyword::InsertAtList => {
                let index = list_index(&args[1])?;
                grow(&mut items, index);
                items.insert(index, args[2].clone());
            }
            Keyword::RemoveAtList => {
                let index = list_index(&args[1])?;
                if index >= items.len() {
                    return Ok(());
                }
                items.remove(index);
            }
            other => unreachable!("{other} is not a list command"),
        }
        store::set(&mut self.store, name, &list::collapse_list(&items));
        Ok(())
    }

    pub(super) fn array_command(
        &mut self,
        keyword: Keyword,
        args: &[String],
        out: &mut String,
    ) -> Result<(), RuntimeErrorKind> {
        let name = &args[0];
        match keyword {
            Keyword::ClearArray => {
                let prefix = array::cell_prefix(name);
                for (key, _) in store::get_by_prefix(&self.store, &prefix) {
                    store::set(&mut self.store, &key, "");
                }
            }
            Keyword::GetArray => {
                let key = array::cell_key(name, value::to_int(&args[1])?, value::to_int(&args[2])?);
                out.push_str(&value::unpack_item(&store::get(&self.store, &key)));
            }
            Keyword::SetArray => {
                let key = array::cell_key(name, value::to_int(&args[1])?, value::to_int(&args[2])?);
                store::set(&mut self.store, &key, &value::pack_item(&args[3]));
            }
            other => unreachable!("{other} is not an array command"),
        }
        Ok(())
    }
}
