//! Field descriptors driving the generic delta engine
//!
//! Each resource kind publishes a table of [`Field`] descriptors instead of
//! relying on reflection: one entry per diffable field, carrying the
//! accessors the delta engine needs to compare desired against actual
//! without any per-kind diff code.

/// Descriptor for one diffable field of a resource kind.
///
/// The function pointers are supplied by the [`field!`](crate::field) macro
/// as non-capturing closures. `differs` is only consulted when `is_set`
/// reports the field present on the desired resource; absent fields are
/// don't-care and never compared.
pub struct Field<R> {
    /// Field name as it appears in ChangeSets and error messages.
    pub name: &'static str,
    /// Whether the desired resource sets this field at all.
    pub is_set: fn(&R) -> bool,
    /// Whether desired and actual disagree on this field.
    pub differs: fn(&R, &R) -> bool,
    /// Copy the desired value into a delta payload.
    pub copy: fn(&R, &mut R),
}

/// Build a [`Field`] descriptor for an `Option` field.
///
/// The plain form compares with `PartialEq`. Pass `eq = path::to::fn` for
/// fields that need custom equality, e.g. reference lists compared
/// set-like with [`unordered_eq`].
#[macro_export]
macro_rules! field {
    ($name:literal, $f:ident) => {
        $crate::fields::Field {
            name: $name,
            is_set: |r| r.$f.is_some(),
            differs: |desired, actual| desired.$f != actual.$f,
            copy: |desired, delta| delta.$f = desired.$f.clone(),
        }
    };
    ($name:literal, $f:ident, eq = $eq:expr) => {
        $crate::fields::Field {
            name: $name,
            is_set: |r| r.$f.is_some(),
            differs: |desired, actual| !($eq)(&desired.$f, &actual.$f),
            copy: |desired, delta| delta.$f = desired.$f.clone(),
        }
    };
}

/// Order-independent equality for reference-list fields.
///
/// Reference lists are compared by the referenced identities as a multiset;
/// the order a backend happens to report them in is not significant.
pub fn unordered_eq<T: Ord + Clone>(a: &Option<Vec<T>>, b: &Option<Vec<T>>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => {
            if a.len() != b.len() {
                return false;
            }
            let mut a = a.clone();
            let mut b = b.clone();
            a.sort();
            b.sort();
            a == b
        }
        (None, None) => true,
        _ => false,
    }
}
