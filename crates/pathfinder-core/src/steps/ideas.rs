//! Career idea generation

use super::{EnrichmentStep, PendingWrite};
use crate::archetype::ArchetypeCodes;
use crate::config::PipelineConfig;
use crate::error::{GenerationError, InputError};
use crate::generative::{GenerativeService, IdeasRequest, ProfileSnapshot};
use crate::precheck::StepKind;
use async_trait::async_trait;
use pathfinder_merge::append_unique;
use pathfinder_profile::{ListField, Profile, UserId};

/// Generates career ideas and appends the new ones to `careerIdeas`
#[derive(Debug, Clone, Copy)]
pub struct IdeasStep {
    max_ideas: usize,
    min_ideas: usize,
}

impl IdeasStep {
    /// Step keeping at most `max_ideas` per run
    #[inline]
    #[must_use]
    pub fn new(max_ideas: usize) -> Self {
        Self {
            max_ideas,
            min_ideas: 0,
        }
    }

    /// Builder: warn when fewer than `min_ideas` survive normalization
    #[inline]
    #[must_use]
    pub fn with_min_ideas(mut self, min_ideas: usize) -> Self {
        self.min_ideas = min_ideas;
        self
    }

    /// Step configured from the pipeline section
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.max_ideas).with_min_ideas(config.min_ideas)
    }

    /// Upper bound per run
    #[inline]
    #[must_use]
    pub fn max_ideas(&self) -> usize {
        self.max_ideas
    }
}

impl Default for IdeasStep {
    fn default() -> Self {
        Self::from_config(&PipelineConfig::default())
    }
}

/// Trim, drop blanks and repeats, keep at most `max` in original order
#[must_use]
pub fn normalize_ideas(raw: Vec<String>, max: usize) -> Vec<String> {
    let cleaned = raw
        .into_iter()
        .map(|idea| idea.trim().to_string())
        .filter(|idea| !idea.is_empty());
    let mut ideas = append_unique(&[], cleaned);
    ideas.truncate(max);
    ideas
}

#[async_trait]
impl EnrichmentStep for IdeasStep {
    type Input = ();
    type Request = IdeasRequest;
    type Artifact = Vec<String>;

    fn kind(&self) -> StepKind {
        StepKind::Ideas
    }

    fn prepare(&self, profile: &Profile, _input: &()) -> Result<IdeasRequest, InputError> {
        let archetype = ArchetypeCodes::from_typology(&profile.typology)
            .map_err(InputError::IncompleteTypology)?;
        Ok(IdeasRequest {
            profile: ProfileSnapshot::new(archetype, profile),
            max_ideas: self.max_ideas,
        })
    }

    async fn generate(
        &self,
        request: IdeasRequest,
        generator: &dyn GenerativeService,
    ) -> Result<Vec<String>, GenerationError> {
        let response = generator.ideas(request).await?;
        let ideas = normalize_ideas(response.ideas, self.max_ideas);

        if ideas.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        if ideas.len() < self.min_ideas {
            tracing::warn!(
                "Generator returned {} usable idea(s), expected at least {}",
                ideas.len(),
                self.min_ideas
            );
        }
        Ok(ideas)
    }

    fn pending_write(&self, user: &UserId, ideas: &Vec<String>) -> PendingWrite {
        PendingWrite::AppendList {
            user_id: user.clone(),
            field: ListField::CareerIdeas,
            items: ideas.clone(),
        }
    }
}
