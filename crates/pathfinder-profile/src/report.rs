//! Generated narrative report records
//!
//! A report is created once per generation and never modified. Regenerating
//! creates a new record and repoints the profile; the old one is left in place.

use crate::ids::{ReportId, UserId};
use crate::profile::Typology;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Report content before the store assigns an id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDraft {
    /// Owner
    pub user_id: UserId,
    /// Narrative text
    pub report: String,
    /// Echo of the typology the report was generated from
    #[serde(flatten)]
    pub typology: Typology,
}

/// Immutable stored report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Record id
    pub id: ReportId,
    /// Owner
    pub user_id: UserId,
    /// Narrative text
    pub report: String,
    /// Echo of the typology the report was generated from
    #[serde(flatten)]
    pub typology: Typology,
    /// Creation time
    pub created_at: DateTime<Utc>,
}

impl Report {
    /// Materialize a draft
    #[must_use]
    pub fn from_draft(id: ReportId, draft: ReportDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: draft.user_id,
            report: draft.report,
            typology: draft.typology,
            created_at,
        }
    }
}
