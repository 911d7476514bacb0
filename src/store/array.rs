//! Packed arrays are not a container: cell `(y, x)` of array `name` is the
//! ordinary store entry `name[y,x]`. Existing dictionaries depend on this key
//! shape.

pub fn cell_key(name: &str, y: i64, x: i64) -> String {
    format!("{name}[{y},{x}]")
}

/// Prefix shared by every cell of `name`.
pub fn cell_prefix(name: &str) -> String {
    format!("{name}[")
}
