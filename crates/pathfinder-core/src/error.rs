//! Error types for the enrichment pipeline
//!
//! Every failure is returned as a typed value so callers can render a
//! specific message per kind:
//! - missing upstream input (precondition)
//! - malformed step input (validation)
//! - generative service failure
//! - persistence failure after a successful generation

use crate::precheck::StepKind;
use crate::steps::PendingWrite;
use pathfinder_merge::SlotError;
use pathfinder_profile::{ProfileField, RoleError};
use pathfinder_store::StoreError;

/// Failure of a single enrichment step run
#[derive(Debug, thiserror::Error)]
pub enum EnrichmentError {
    /// Required upstream fields are missing; the user must complete them
    #[error("{step}: missing required fields: {}", field_list(.missing))]
    PreconditionFailed {
        /// Step that was gated
        step: StepKind,
        /// Fields that must be filled first
        missing: Vec<ProfileField>,
    },

    /// Step input has the wrong shape (e.g. non-positive hours)
    #[error("{step}: invalid input: {cause}")]
    ValidationFailed {
        /// Step that rejected the input
        step: StepKind,
        /// What was wrong
        #[source]
        cause: InputError,
    },

    /// External generation failed or returned nothing usable
    #[error("{step}: generation failed: {cause}")]
    GenerationFailed {
        /// Step whose generation failed
        step: StepKind,
        /// Service error
        #[source]
        cause: GenerationError,
    },

    /// Artifact was generated but could not be saved
    #[error("{step}: persist failed: {cause}")]
    PersistFailed {
        /// Step whose save failed
        step: StepKind,
        /// Store error
        #[source]
        cause: StoreError,
        /// Write that can be retried without regenerating
        pending: Option<Box<PendingWrite>>,
    },
}

/// Coarse error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`EnrichmentError::PreconditionFailed`]
    PreconditionFailed,
    /// See [`EnrichmentError::ValidationFailed`]
    ValidationFailed,
    /// See [`EnrichmentError::GenerationFailed`]
    GenerationFailed,
    /// See [`EnrichmentError::PersistFailed`]
    PersistFailed,
}

impl ErrorKind {
    /// Metric/log label
    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::PreconditionFailed => "precondition_failed",
            Self::ValidationFailed => "validation_failed",
            Self::GenerationFailed => "generation_failed",
            Self::PersistFailed => "persist_failed",
        }
    }
}

impl EnrichmentError {
    /// Classification of this error
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PreconditionFailed { .. } => ErrorKind::PreconditionFailed,
            Self::ValidationFailed { .. } => ErrorKind::ValidationFailed,
            Self::GenerationFailed { .. } => ErrorKind::GenerationFailed,
            Self::PersistFailed { .. } => ErrorKind::PersistFailed,
        }
    }

    /// Step the error belongs to
    #[inline]
    #[must_use]
    pub fn step(&self) -> StepKind {
        match self {
            Self::PreconditionFailed { step, .. }
            | Self::ValidationFailed { step, .. }
            | Self::GenerationFailed { step, .. }
            | Self::PersistFailed { step, .. } => *step,
        }
    }

    /// Fixed by the user completing or correcting input
    #[inline]
    #[must_use]
    pub fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            Self::PreconditionFailed { .. } | Self::ValidationFailed { .. }
        )
    }

    /// Worth retrying as-is
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::GenerationFailed { .. } | Self::PersistFailed { .. }
        )
    }

    /// Missing fields of a precondition failure
    #[must_use]
    pub fn missing_fields(&self) -> &[ProfileField] {
        match self {
            Self::PreconditionFailed { missing, .. } => missing,
            _ => &[],
        }
    }

    /// Take the retryable write out of a persist failure
    #[must_use]
    pub fn into_pending(self) -> Option<PendingWrite> {
        match self {
            Self::PersistFailed { pending, .. } => pending.map(|p| *p),
            _ => None,
        }
    }
}

fn field_list(fields: &[ProfileField]) -> String {
    fields
        .iter()
        .map(ProfileField::wire_name)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Generative service failure
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// Transport or provider error
    #[error("service error: {0}")]
    Service(String),

    /// Service did not answer in time
    #[error("generation timed out")]
    Timeout,

    /// Result field absent or blank
    #[error("empty response")]
    EmptyResponse,

    /// Response could not be interpreted
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Malformed step or editor input
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InputError {
    /// Hours must be a finite positive number
    #[error("available hours must be a positive number, got {0}")]
    NonPositiveHours(f64),

    /// Unknown focus selection
    #[error("unknown focus area '{0}' (expected career, contribution or calling)")]
    UnknownFocusArea(String),

    /// Quiz needs a full answer vector
    #[error("expected {expected} ratings, got {found}")]
    WrongRatingCount {
        /// Required count
        expected: usize,
        /// Supplied count
        found: usize,
    },

    /// Quiz rating above the scale
    #[error("rating {value} at position {index} is above {max}")]
    RatingOutOfRange {
        /// Position in the answer vector
        index: usize,
        /// Supplied rating
        value: u8,
        /// Scale maximum
        max: u8,
    },

    /// Typology incomplete when building a request
    #[error("typology incomplete: {}", field_list(.0))]
    IncompleteTypology(Vec<ProfileField>),

    /// Required text input is blank
    #[error("{0} must not be empty")]
    Blank(ProfileField),
}

/// Failure of a direct profile edit
#[derive(Debug, thiserror::Error)]
pub enum EditError {
    /// Core-value slot rejected the value
    #[error("core value rejected: {0}")]
    Slot(#[from] SlotError),

    /// A role failed validation
    #[error("role {index} invalid: {source}")]
    Role {
        /// Position in the submitted batch
        index: usize,
        /// What was wrong
        source: RoleError,
    },

    /// Malformed input
    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    /// Store failure
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Lost every optimistic-concurrency attempt
    #[error("gave up after {attempts} conflicting writes")]
    ConflictRetriesExhausted {
        /// Attempts made
        attempts: usize,
    },
}
