//! Pathfinder aggregate store
//!
//! The [`AggregateStore`] contract and two implementations:
//!
//! - [`InMemoryStore`]: dashmap-backed, for tests and single-process use
//! - [`JsonFileStore`]: one JSON document per record on local disk
//!
//! Both support conditional writes via [`WritePrecondition::Revision`], the
//! optimistic-concurrency primitive list-field writers rely on.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod file;
mod memory;
mod store;

pub use file::JsonFileStore;
pub use memory::InMemoryStore;
pub use store::{AggregateStore, StoreError, WritePrecondition};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
