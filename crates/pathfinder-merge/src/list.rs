//! Append-unique merge for accumulating list fields
//!
//! Lists behave as insertion-ordered sets: existing order is never disturbed,
//! and an incoming item is appended only if no exact (case-sensitive) copy is
//! already present.

use indexmap::IndexSet;

/// Merge `incoming` into `existing`, keeping first-seen order.
///
/// Items already present in `existing` are dropped, as are repeats inside
/// `incoming` itself. The result never contains duplicates, and
/// `append_unique(x, x.clone()) == x` for any duplicate-free `x`.
#[must_use]
pub fn append_unique<I>(existing: &[String], incoming: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut set: IndexSet<String> = existing.iter().cloned().collect();
    set.extend(incoming);
    set.into_iter().collect()
}

/// Check that a list has no duplicate entries
#[inline]
#[must_use]
pub fn is_unique(items: &[String]) -> bool {
    find_duplicate(items).is_none()
}

/// Return the first entry that appears more than once, if any
#[must_use]
pub fn find_duplicate(items: &[String]) -> Option<&str> {
    let mut seen = IndexSet::with_capacity(items.len());
    items
        .iter()
        .find(|item| !seen.insert(item.as_str()))
        .map(String::as_str)
}
