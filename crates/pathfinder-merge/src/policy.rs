//! Merge policy classification

use serde::{Deserialize, Serialize};

/// How a profile field absorbs new data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Ordered set union (see [`crate::append_unique`])
    AppendUnique,

    /// Whole-value replacement (see [`crate::replace_scalar`])
    ReplaceScalar,

    /// Fixed slots with uniqueness (see [`crate::assign_slot`])
    AssignSlot,
}

impl MergePolicy {
    /// Policy name (for logging/serialization)
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AppendUnique => "append_unique",
            Self::ReplaceScalar => "replace_scalar",
            Self::AssignSlot => "assign_slot",
        }
    }

    /// Whether concurrent writers can lose each other's data under a
    /// plain last-writer-wins store write
    #[inline]
    #[must_use]
    pub fn needs_revision_check(&self) -> bool {
        matches!(self, Self::AppendUnique | Self::AssignSlot)
    }
}

impl std::fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_accumulating_policies_need_revision_check() {
        assert!(MergePolicy::AppendUnique.needs_revision_check());
        assert!(MergePolicy::AssignSlot.needs_revision_check());
        assert!(!MergePolicy::ReplaceScalar.needs_revision_check());
    }

    #[test]
    fn display_matches_name() {
        assert_eq!(MergePolicy::AssignSlot.to_string(), "assign_slot");
    }
}
