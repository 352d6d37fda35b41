//! Contract with the external text generator
//!
//! One call per request shape. Implementations own transport, prompting and
//! parsing; the pipeline only sees typed requests and responses.

use crate::archetype::ArchetypeCodes;
use crate::error::GenerationError;
use crate::steps::FocusArea;
use async_trait::async_trait;
use pathfinder_profile::Profile;
use serde::{Deserialize, Serialize};

/// Input for the narrative report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    /// All five typology codes
    pub archetype: ArchetypeCodes,
}

/// Narrative report text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportResponse {
    /// Report body
    pub report: String,
}

/// Profile context for career ideas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileSnapshot {
    /// Typology codes
    pub archetype: ArchetypeCodes,
    /// Filled core-value slots, in rank order
    pub core_values: Vec<String>,
    /// Skills
    pub skills: Vec<String>,
    /// Passions
    pub passions: Vec<String>,
    /// Interests
    pub interests: Vec<String>,
    /// Ideas already stored, so the generator can avoid repeats
    pub existing_ideas: Vec<String>,
    /// Contribution text, if synthesized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contribution_profile: Option<String>,
    /// Calling text, if synthesized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calling_profile: Option<String>,
    /// Role clarity percentage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role_clarity_score: Option<u8>,
}

impl ProfileSnapshot {
    /// Snapshot of a profile with known-complete typology
    #[must_use]
    pub fn new(archetype: ArchetypeCodes, profile: &Profile) -> Self {
        Self {
            archetype,
            core_values: profile.core_values.values().map(str::to_string).collect(),
            skills: profile.skills.clone(),
            passions: profile.passions.clone(),
            interests: profile.interests.clone(),
            existing_ideas: profile.career_ideas.clone(),
            contribution_profile: profile.contribution_profile.clone(),
            calling_profile: profile.calling_profile.clone(),
            role_clarity_score: profile.role_clarity_score,
        }
    }
}

/// Input for career ideas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdeasRequest {
    /// Profile context
    pub profile: ProfileSnapshot,
    /// Upper bound on ideas wanted
    pub max_ideas: usize,
}

/// Generated career ideas, unnormalized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdeasResponse {
    /// Ideas as returned
    pub ideas: Vec<String>,
}

/// Input for a focus-area synthesis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisRequest {
    /// Typology codes
    pub archetype: ArchetypeCodes,
    /// Which text to synthesize
    pub focus_area: FocusArea,
}

/// Synthesized text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisResponse {
    /// Body
    pub text: String,
}

/// Input for a route plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    /// Weekly hours available
    pub available_hours: f64,
    /// Existing commitments
    pub commitments: String,
    /// Target timeline
    pub timeline: String,
}

/// Generated plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanResponse {
    /// Plan body
    pub plan: String,
}

/// External text generation, one method per request shape
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GenerativeService: Send + Sync {
    /// Narrative report
    async fn report(&self, request: ReportRequest) -> Result<ReportResponse, GenerationError>;

    /// Career ideas
    async fn ideas(&self, request: IdeasRequest) -> Result<IdeasResponse, GenerationError>;

    /// Contribution or calling text
    async fn synthesis(
        &self,
        request: SynthesisRequest,
    ) -> Result<SynthesisResponse, GenerationError>;

    /// Route plan
    async fn plan(&self, request: PlanRequest) -> Result<PlanResponse, GenerationError>;
}

/// Trimmed text, or [`GenerationError::EmptyResponse`] when blank
pub(crate) fn non_blank(text: String) -> Result<String, GenerationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(GenerationError::EmptyResponse)
    } else if trimmed.len() == text.len() {
        Ok(text)
    } else {
        Ok(trimmed.to_string())
    }
}
