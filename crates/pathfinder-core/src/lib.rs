//! Pathfinder Core - profile enrichment pipeline
//!
//! Turns a user's self-description into generated artifacts, one step at a
//! time:
//! - Gates every step on the profile fields it needs
//! - Calls the generative service once per run
//! - Merges the artifact back under the target field's policy
//! - Returns typed errors, including a retryable write when only the save failed
//!
//! # Core Concepts
//!
//! - [`EnrichmentStep`]: report, ideas, synthesis and route plan
//! - [`EnrichmentPipeline`]: precheck, generate and commit with optimistic
//!   concurrency on list fields
//! - [`ProfileEditor`]: direct user edits (typology, values, lists, quiz)
//! - [`GenerativeService`]: the external generator contract
//!
//! # Example
//!
//! ```rust,ignore
//! use pathfinder_core::{EnrichmentPipeline, IdeasStep, PipelineConfig};
//! use pathfinder_store::InMemoryStore;
//! use std::sync::Arc;
//!
//! # async fn example(generator: Arc<dyn pathfinder_core::GenerativeService>) -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(InMemoryStore::new());
//! let pipeline = EnrichmentPipeline::new(store, generator, PipelineConfig::default());
//!
//! let user = pathfinder_profile::UserId::new("alice")?;
//! let outcome = pipeline.run_for_user(&IdeasStep::default(), &user, ()).await?;
//! println!("{} new ideas at {}", outcome.artifact.len(), outcome.receipt.revision);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod archetype;
mod config;
mod editor;
mod error;
mod generative;
mod occ;
mod pipeline;
mod precheck;
mod quiz;
mod steps;

pub use archetype::{format_archetype, ArchetypeCodes};
pub use config::{
    ConfigError, LlmConfig, LoggingConfig, PathfinderConfig, PipelineConfig, StoreBackend,
    StoreConfig, ENV_LLM_BASE_URL, ENV_LLM_MODEL, ENV_LOG, ENV_STORE_PATH,
};
pub use editor::ProfileEditor;
pub use error::{EditError, EnrichmentError, ErrorKind, GenerationError, InputError};
pub use generative::{
    GenerativeService, IdeasRequest, IdeasResponse, PlanRequest, PlanResponse, ProfileSnapshot,
    ReportRequest, ReportResponse, SynthesisRequest, SynthesisResponse,
};
pub use pipeline::EnrichmentPipeline;
pub use precheck::{validate, Readiness, StepKind};
pub use quiz::{score as score_quiz, score_slice as score_quiz_slice, MAX_RATING, QUESTION_COUNT};
pub use steps::{
    normalize_ideas, validate_hours, CommitReceipt, EnrichmentStep, FocusArea, FocusSelection,
    GeneratedReport, IdeasStep, PendingWrite, ReportStep, RoutePlanStep, StepOutcome,
    SynthesisStep, SynthesizedText,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
