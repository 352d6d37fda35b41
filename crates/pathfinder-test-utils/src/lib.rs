//! Testing utilities for the Pathfinder workspace
//!
//! Shared fixtures, a scripted generative service and a store wrapper that
//! injects failures and concurrent writes.

#![allow(missing_docs)]

mod generator;
mod store;

pub use generator::{CallLog, ScriptedGenerator};
pub use store::FaultyStore;

use pathfinder_profile::{Profile, Typology, UserId};

pub fn user(id: &str) -> UserId {
    UserId::new(id).unwrap()
}

pub fn complete_typology() -> Typology {
    Typology::new("4", "4w5", "sx", "sx/sp", "451")
}

/// Typology with all five codes, nothing else filled
pub fn profile_with_typology(id: &str) -> Profile {
    Profile::new(user(id)).with_typology(complete_typology())
}

/// Typology with one code removed
pub fn profile_missing(id: &str, field: pathfinder_profile::ProfileField) -> Profile {
    let mut typology = complete_typology();
    match field {
        pathfinder_profile::ProfileField::EnneagramType => typology.enneagram_type = None,
        pathfinder_profile::ProfileField::Wing => typology.wing = None,
        pathfinder_profile::ProfileField::Subtype => typology.subtype = None,
        pathfinder_profile::ProfileField::InstinctualStacking => {
            typology.instinctual_stacking = None;
        }
        pathfinder_profile::ProfileField::Trifix => typology.trifix = None,
        other => panic!("{other} is not a typology field"),
    }
    Profile::new(user(id)).with_typology(typology)
}

/// Typology plus route planner inputs
pub fn planning_profile(id: &str, hours: f64, commitments: &str, timeline: &str) -> Profile {
    profile_with_typology(id).with_planning(hours, commitments, timeline)
}

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}
