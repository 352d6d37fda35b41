//! Replace-by-key merge for scalar fields

/// Replace a scalar with the incoming value.
///
/// Generated text fields are regenerated wholesale; the previous value is
/// discarded, never concatenated.
#[inline]
#[must_use]
pub fn replace_scalar<T>(_existing: Option<T>, incoming: T) -> Option<T> {
    Some(incoming)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_existing_value() {
        let plan = replace_scalar(Some("old plan".to_string()), "new plan".to_string());
        assert_eq!(plan.as_deref(), Some("new plan"));
    }

    #[test]
    fn fills_empty_value() {
        assert_eq!(replace_scalar(None, 7), Some(7));
    }
}
