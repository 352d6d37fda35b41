//! Pathfinder profile model
//!
//! The long-lived per-user aggregate and the records hanging off it:
//!
//! - [`Profile`]: typology, core values, accumulating lists, generated text,
//!   planning inputs, assessment score and completion flags
//! - [`Report`]: immutable generated narrative, referenced by id
//! - [`Role`]: role history entries, upserted by id
//! - [`ProfilePatch`]: the closed, versioned merge-patch every write goes through
//!
//! # Example
//!
//! ```rust
//! use pathfinder_profile::{GeneratedField, Profile, ProfilePatch, UserId};
//!
//! let mut profile = Profile::new(UserId::new("alice").unwrap());
//! profile
//!     .apply_patch(&ProfilePatch::new().with_generated(GeneratedField::RoutePlan, "Week 1: ..."))
//!     .unwrap();
//! assert_eq!(profile.route_plan.as_deref(), Some("Week 1: ..."));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod field;
mod ids;
mod patch;
mod profile;
mod report;
mod role;

pub use field::{GeneratedField, ListField, Milestone, ProfileField};
pub use ids::{IdError, ReportId, Revision, RoleId, UserId};
pub use patch::{
    AssessmentPatch, GeneratedTextPatch, ListPatch, PatchError, PlanningPatch, ProfilePatch,
    PATCH_SCHEMA_VERSION,
};
pub use profile::{CoreValues, Profile, Typology, CORE_VALUE_SLOTS};
pub use report::{Report, ReportDraft};
pub use role::{Role, RoleError, MAX_HEART_EXPLOSIONS_LEVEL};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
