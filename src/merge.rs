//! Field-level merge helpers used to layer check definitions.
//!
//! Overrides replace, they never extend:
//! - optional scalars are replaced when the override is set
//! - strings are replaced when the override is non-empty
//! - sequences are replaced wholesale by the de-duplicated override when it
//!   is non-empty
//!
//! Applying the same override twice gives the same result as applying it once.

/// A definition that can absorb an override of the same kind.
pub trait Merge {
    type Error;

    fn merge(&mut self, other: &Self) -> Result<(), Self::Error>;
}

/// Replace `a` with `b` if `b` is set.
pub fn merge_option<T: Clone + PartialEq>(a: &mut Option<T>, b: &Option<T>) {
    if let Some(value) = b
        && a.as_ref() != Some(value)
    {
        *a = Some(value.clone());
    }
}

/// Replace `a` with `b` if `b` is not empty.
pub fn merge_string(a: &mut String, b: &str) {
    if !b.is_empty() && a != b {
        *a = b.to_string();
    }
}

/// Replace `a` with the unique values of `b`, unless `b` is empty.
pub fn merge_slice<T: Clone + PartialEq>(a: &mut Vec<T>, b: &[T]) {
    if b.is_empty() {
        return;
    }
    *a = dedup(b);
}

/// Unique values of `items`, keeping the first occurrence of each.
pub fn dedup<T: Clone + PartialEq>(items: &[T]) -> Vec<T> {
    let mut unique: Vec<T> = Vec::with_capacity(items.len());
    for item in items {
        if !unique.contains(item) {
            unique.push(item.clone());
        }
    }
    unique
}
