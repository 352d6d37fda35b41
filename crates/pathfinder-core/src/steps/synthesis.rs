//! Contribution and calling synthesis

use super::{EnrichmentStep, FocusArea, PendingWrite};
use crate::archetype::ArchetypeCodes;
use crate::error::{GenerationError, InputError};
use crate::generative::{non_blank, GenerativeService, SynthesisRequest};
use crate::precheck::StepKind;
use async_trait::async_trait;
use pathfinder_profile::{Profile, UserId};

/// Synthesizes the text of one focus area, replacing the previous text
#[derive(Debug, Clone, Copy, Default)]
pub struct SynthesisStep;

/// Synthesized text and the area it belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedText {
    /// Focus area
    pub focus: FocusArea,
    /// Text body
    pub text: String,
}

#[async_trait]
impl EnrichmentStep for SynthesisStep {
    type Input = FocusArea;
    type Request = SynthesisRequest;
    type Artifact = SynthesizedText;

    fn kind(&self) -> StepKind {
        StepKind::Synthesis
    }

    fn prepare(&self, profile: &Profile, focus: &FocusArea) -> Result<SynthesisRequest, InputError> {
        let archetype = ArchetypeCodes::from_typology(&profile.typology)
            .map_err(InputError::IncompleteTypology)?;
        Ok(SynthesisRequest {
            archetype,
            focus_area: *focus,
        })
    }

    async fn generate(
        &self,
        request: SynthesisRequest,
        generator: &dyn GenerativeService,
    ) -> Result<SynthesizedText, GenerationError> {
        let focus = request.focus_area;
        let response = generator.synthesis(request).await?;
        Ok(SynthesizedText {
            focus,
            text: non_blank(response.text)?,
        })
    }

    fn pending_write(&self, user: &UserId, artifact: &SynthesizedText) -> PendingWrite {
        PendingWrite::ReplaceText {
            user_id: user.clone(),
            field: artifact.focus.target(),
            text: artifact.text.clone(),
        }
    }
}
