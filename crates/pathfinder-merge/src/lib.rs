//! Pathfinder merge policies
//!
//! Pure functions that fold newly generated or user-entered data into the
//! long-lived profile aggregate without losing information.
//!
//! # Core Concepts
//!
//! - [`append_unique`]: ordered set union for accumulating list fields
//! - [`replace_scalar`]: whole-value replacement for generated text
//! - [`assign_slot`]: fixed-slot assignment with cross-slot uniqueness
//! - [`MergePolicy`]: names the policy a field is merged under
//!
//! # Example
//!
//! ```rust
//! use pathfinder_merge::{append_unique, assign_slot};
//!
//! let ideas = append_unique(&["A".to_string()], ["A".to_string(), "B".to_string()]);
//! assert_eq!(ideas, vec!["A".to_string(), "B".to_string()]);
//!
//! let slots: [Option<String>; 3] = [Some("honesty".into()), None, None];
//! assert!(assign_slot(&slots, 1, "honesty").is_err());
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod list;
mod policy;
mod scalar;
mod slots;

pub use list::{append_unique, find_duplicate, is_unique};
pub use policy::MergePolicy;
pub use scalar::replace_scalar;
pub use slots::{assign_slot, SlotError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
