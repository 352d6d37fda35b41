//! Life-purpose narrative report

use super::{EnrichmentStep, PendingWrite};
use crate::archetype::ArchetypeCodes;
use crate::error::{GenerationError, InputError};
use crate::generative::{non_blank, GenerativeService, ReportRequest};
use crate::precheck::StepKind;
use async_trait::async_trait;
use pathfinder_profile::{Profile, ReportDraft, UserId};

/// Generates a new report record from the full typology
///
/// Every run creates a new record and repoints the profile; earlier
/// records are left untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportStep;

/// Report text with the typology it was generated from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedReport {
    /// Narrative text
    pub report: String,
    /// Typology echoed into the record
    pub archetype: ArchetypeCodes,
}

#[async_trait]
impl EnrichmentStep for ReportStep {
    type Input = ();
    type Request = ReportRequest;
    type Artifact = GeneratedReport;

    fn kind(&self) -> StepKind {
        StepKind::Report
    }

    fn prepare(&self, profile: &Profile, _input: &()) -> Result<ReportRequest, InputError> {
        let archetype = ArchetypeCodes::from_typology(&profile.typology)
            .map_err(InputError::IncompleteTypology)?;
        Ok(ReportRequest { archetype })
    }

    async fn generate(
        &self,
        request: ReportRequest,
        generator: &dyn GenerativeService,
    ) -> Result<GeneratedReport, GenerationError> {
        let archetype = request.archetype.clone();
        let response = generator.report(request).await?;
        Ok(GeneratedReport {
            report: non_blank(response.report)?,
            archetype,
        })
    }

    fn pending_write(&self, user: &UserId, artifact: &GeneratedReport) -> PendingWrite {
        PendingWrite::NewReport {
            draft: ReportDraft {
                user_id: user.clone(),
                report: artifact.report.clone(),
                typology: artifact.archetype.clone().into(),
            },
        }
    }
}
