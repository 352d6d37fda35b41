//! Role history entries (one-to-many with a profile)

use crate::ids::RoleId;
use serde::{Deserialize, Serialize};

/// Upper bound of the enjoyment scale
pub const MAX_HEART_EXPLOSIONS_LEVEL: u8 = 10;

/// Role validation failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoleError {
    /// Title is required
    #[error("role title must not be empty")]
    EmptyTitle,

    /// Enjoyment level above the scale
    #[error("heart explosions level {0} outside 0..=10")]
    HeartLevelOutOfRange(u8),
}

/// A past or current role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    /// Absent for roles not yet stored
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<RoleId>,
    /// Title held
    pub role_title: String,
    /// Organization or setting
    pub organization_context: String,
    /// Free-text duration
    pub duration: String,
    /// Main responsibilities
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_responsibilities: Option<String>,
    /// Notable accomplishments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_accomplishments: Option<String>,
    /// What the user enjoyed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub what_i_loved: Option<String>,
    /// What the user disliked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub what_i_disliked: Option<String>,
    /// Enjoyment, 0-10
    pub heart_explosions_level: u8,
}

impl Role {
    /// New unsaved role
    #[must_use]
    pub fn new(
        role_title: impl Into<String>,
        organization_context: impl Into<String>,
        duration: impl Into<String>,
        heart_explosions_level: u8,
    ) -> Self {
        Self {
            id: None,
            role_title: role_title.into(),
            organization_context: organization_context.into(),
            duration: duration.into(),
            key_responsibilities: None,
            key_accomplishments: None,
            what_i_loved: None,
            what_i_disliked: None,
            heart_explosions_level,
        }
    }

    /// Builder: attach an existing id
    #[must_use]
    pub fn with_id(mut self, id: RoleId) -> Self {
        self.id = Some(id);
        self
    }

    /// Check field constraints
    ///
    /// # Errors
    /// [`RoleError`] on an empty title or an out-of-range level
    pub fn validate(&self) -> Result<(), RoleError> {
        if self.role_title.trim().is_empty() {
            return Err(RoleError::EmptyTitle);
        }
        if self.heart_explosions_level > MAX_HEART_EXPLOSIONS_LEVEL {
            return Err(RoleError::HeartLevelOutOfRange(self.heart_explosions_level));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_checks_title_and_level() {
        assert!(Role::new("Engineer", "Acme", "2y", 7).validate().is_ok());
        assert_eq!(
            Role::new(" ", "Acme", "2y", 7).validate(),
            Err(RoleError::EmptyTitle)
        );
        assert_eq!(
            Role::new("Engineer", "Acme", "2y", 11).validate(),
            Err(RoleError::HeartLevelOutOfRange(11))
        );
    }

    #[test]
    fn wire_names_follow_document_layout() {
        let mut role = Role::new("Engineer", "Acme", "2y", 9);
        role.what_i_loved = Some("shipping".into());
        let json = serde_json::to_value(&role).unwrap();
        assert_eq!(json["whatILoved"], "shipping");
        assert_eq!(json["heartExplosionsLevel"], 9);
        assert!(json.get("id").is_none());
    }
}
