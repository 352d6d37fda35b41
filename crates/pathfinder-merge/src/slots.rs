//! Fixed-slot assignment with cross-slot uniqueness
//!
//! Used for the ranked core-value selection: N ordered slots, each either
//! empty or holding a value that no other slot holds.

/// Slot assignment rejection
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SlotError {
    /// Value already occupies another slot
    #[error("'{value}' is already selected in slot {occupied}")]
    DuplicateValue {
        /// Rejected value
        value: String,
        /// Slot currently holding it
        occupied: usize,
    },

    /// Slot index outside the array
    #[error("slot {index} out of range (0..{len})")]
    IndexOutOfRange {
        /// Requested slot
        index: usize,
        /// Number of slots
        len: usize,
    },

    /// Empty values cannot be assigned
    #[error("slot value must not be empty")]
    EmptyValue,
}

/// Assign `value` to `slots[index]`.
///
/// Rejects the assignment if `value` already sits in a *different* slot.
/// Re-assigning a value to the slot it already occupies is accepted and
/// leaves the slots unchanged.
///
/// # Errors
/// - [`SlotError::IndexOutOfRange`] if `index >= N`
/// - [`SlotError::EmptyValue`] if `value` is empty
/// - [`SlotError::DuplicateValue`] if another slot holds `value`
pub fn assign_slot<const N: usize>(
    slots: &[Option<String>; N],
    index: usize,
    value: &str,
) -> Result<[Option<String>; N], SlotError> {
    if index >= N {
        return Err(SlotError::IndexOutOfRange { index, len: N });
    }
    if value.is_empty() {
        return Err(SlotError::EmptyValue);
    }

    let occupied = slots
        .iter()
        .enumerate()
        .find(|(i, slot)| *i != index && slot.as_deref() == Some(value))
        .map(|(i, _)| i);

    if let Some(occupied) = occupied {
        return Err(SlotError::DuplicateValue {
            value: value.to_string(),
            occupied,
        });
    }

    let mut next = slots.clone();
    next[index] = Some(value.to_string());
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn five(values: [Option<&str>; 5]) -> [Option<String>; 5] {
        values.map(|v| v.map(str::to_string))
    }

    #[test]
    fn assigns_into_empty_slot() {
        let slots = five([Some("honesty"), None, None, None, None]);
        let next = assign_slot(&slots, 1, "courage").unwrap();
        assert_eq!(next[1].as_deref(), Some("courage"));
        assert_eq!(next[0].as_deref(), Some("honesty"));
    }

    #[test]
    fn rejects_value_held_by_other_slot() {
        let slots = five([Some("honesty"), Some("courage"), None, None, None]);
        let err = assign_slot(&slots, 3, "courage").unwrap_err();
        assert_eq!(
            err,
            SlotError::DuplicateValue {
                value: "courage".into(),
                occupied: 1
            }
        );
    }

    #[test]
    fn same_value_same_slot_is_noop() {
        let slots = five([Some("honesty"), None, None, None, None]);
        let next = assign_slot(&slots, 0, "honesty").unwrap();
        assert_eq!(next, slots);
    }

    #[test]
    fn overwrites_own_slot_with_new_value() {
        let slots = five([Some("honesty"), None, None, None, None]);
        let next = assign_slot(&slots, 0, "grace").unwrap();
        assert_eq!(next[0].as_deref(), Some("grace"));
    }

    #[test]
    fn rejects_out_of_range_index() {
        let slots = five([None, None, None, None, None]);
        assert_eq!(
            assign_slot(&slots, 5, "x").unwrap_err(),
            SlotError::IndexOutOfRange { index: 5, len: 5 }
        );
    }

    #[test]
    fn rejects_empty_value() {
        let slots = five([None, None, None, None, None]);
        assert_eq!(assign_slot(&slots, 0, "").unwrap_err(), SlotError::EmptyValue);
    }

    proptest! {
        #[test]
        fn filled_slots_stay_unique(ops in prop::collection::vec((0usize..5, "[a-c]"), 0..30)) {
            let mut slots: [Option<String>; 5] = Default::default();
            for (index, value) in ops {
                if let Ok(next) = assign_slot(&slots, index, &value) {
                    slots = next;
                }
                let filled: Vec<&String> = slots.iter().flatten().collect();
                let mut dedup = filled.clone();
                dedup.sort();
                dedup.dedup();
                prop_assert_eq!(dedup.len(), filled.len());
            }
        }
    }
}
