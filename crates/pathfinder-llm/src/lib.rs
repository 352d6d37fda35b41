//! Pathfinder LLM - chat-completions generative service
//!
//! Implements [`pathfinder_core::GenerativeService`] against any endpoint
//! that speaks the OpenAI chat-completions protocol.
//!
//! # Core Concepts
//!
//! - [`ChatCompletionsGenerator`]: one HTTP call per request shape
//! - [`prompts`]: the text sent for each shape
//! - [`parse_idea_list`]: recovers an idea list from free-form completions
//! - [`LlmError`]: transport failures, mapped onto
//!   [`pathfinder_core::GenerationError`] at the trait boundary
//!
//! # Example
//!
//! ```rust,ignore
//! use pathfinder_core::LlmConfig;
//! use pathfinder_llm::ChatCompletionsGenerator;
//!
//! let generator = ChatCompletionsGenerator::new(LlmConfig::default())?;
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod client;
mod error;
mod parse;
pub mod prompts;

pub use client::ChatCompletionsGenerator;
pub use error::LlmError;
pub use parse::parse_idea_list;
pub use prompts::Prompt;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
