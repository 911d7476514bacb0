//! Access to the host's flat string mapping.
//!
//! The host owns the data; the engine only reads and overwrites entries
//! through the [`Store`] trait. Values equal to the null sentinel read back
//! as `""`.

pub mod array;
pub mod list;

use crate::value::{self, ValueError, NULL_VALUE};
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};

pub trait Store {
    fn get_raw(&self, key: &str) -> Option<&str>;
    fn insert(&mut self, key: &str, value: String);
    /// Keys in the mapping's natural iteration order.
    fn keys(&self) -> Vec<String>;
}

impl Store for IndexMap<String, String> {
    fn get_raw(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }

    fn insert(&mut self, key: &str, value: String) {
        match self.get_mut(key) {
            Some(slot) => *slot = value,
            None => {
                IndexMap::insert(self, key.to_string(), value);
            }
        }
    }

    fn keys(&self) -> Vec<String> {
        IndexMap::keys(self).cloned().collect()
    }
}

impl Store for BTreeMap<String, String> {
    fn get_raw(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }

    fn insert(&mut self, key: &str, value: String) {
        BTreeMap::insert(self, key.to_string(), value);
    }

    fn keys(&self) -> Vec<String> {
        BTreeMap::keys(self).cloned().collect()
    }
}

impl Store for HashMap<String, String> {
    fn get_raw(&self, key: &str) -> Option<&str> {
        self.get(key).map(String::as_str)
    }

    fn insert(&mut self, key: &str, value: String) {
        HashMap::insert(self, key.to_string(), value);
    }

    fn keys(&self) -> Vec<String> {
        HashMap::keys(self).cloned().collect()
    }
}

impl<S: Store + ?Sized> Store for &mut S {
    fn get_raw(&self, key: &str) -> Option<&str> {
        (**self).get_raw(key)
    }

    fn insert(&mut self, key: &str, value: String) {
        (**self).insert(key, value)
    }

    fn keys(&self) -> Vec<String> {
        (**self).keys()
    }
}

/// Stored value, or `""` when the key is absent or holds the null sentinel.
pub fn get<S: Store + ?Sized>(store: &S, key: &str) -> String {
    match store.get_raw(key) {
        Some(value) if !value.eq_ignore_ascii_case(NULL_VALUE) => value.to_string(),
        _ => String::new(),
    }
}

/// Inserts or overwrites `key`. Blank values are stored as the null sentinel.
pub fn set<S: Store + ?Sized>(store: &mut S, key: &str, value: &str) {
    let value = if value::is_null(value) {
        NULL_VALUE
    } else {
        value
    };
    store.insert(key, value.to_string());
}

pub fn get_int<S: Store + ?Sized>(store: &S, key: &str) -> Result<i64, ValueError> {
    let value = get(store, key);
    value::to_int(&value).map_err(|_| ValueError::NotNumeric(format!("[{key}] {value}")))
}

/// Entries whose key starts with `prefix`, in store order. Prefixes that
/// begin with `@` (stored macros) match case-insensitively.
pub fn get_by_prefix<S: Store + ?Sized>(store: &S, prefix: &str) -> Vec<(String, String)> {
    let ignore_case = prefix.starts_with('@');
    store
        .keys()
        .into_iter()
        .filter(|key| has_prefix(key, prefix, ignore_case))
        .map(|key| {
            let value = get(store, &key);
            (key, value)
        })
        .collect()
}

fn has_prefix(key: &str, prefix: &str, ignore_case: bool) -> bool {
    if !ignore_case {
        return key.starts_with(prefix);
    }
    key.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}
