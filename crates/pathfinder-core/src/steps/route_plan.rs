//! Route plan from the user's planning inputs

use super::{EnrichmentStep, PendingWrite};
use crate::error::{GenerationError, InputError};
use crate::generative::{non_blank, GenerativeService, PlanRequest};
use crate::precheck::StepKind;
use async_trait::async_trait;
use pathfinder_profile::{GeneratedField, Profile, ProfileField, UserId};

/// Generates a plan from available hours, commitments and timeline
#[derive(Debug, Clone, Copy, Default)]
pub struct RoutePlanStep;

/// Check that hours are a finite positive number
///
/// # Errors
/// [`InputError::NonPositiveHours`] otherwise
pub fn validate_hours(hours: f64) -> Result<f64, InputError> {
    if hours.is_finite() && hours > 0.0 {
        Ok(hours)
    } else {
        Err(InputError::NonPositiveHours(hours))
    }
}

fn required_text(value: Option<&String>, field: ProfileField) -> Result<String, InputError> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or(InputError::Blank(field))
}

#[async_trait]
impl EnrichmentStep for RoutePlanStep {
    type Input = ();
    type Request = PlanRequest;
    type Artifact = String;

    fn kind(&self) -> StepKind {
        StepKind::RoutePlan
    }

    fn prepare(&self, profile: &Profile, _input: &()) -> Result<PlanRequest, InputError> {
        let hours = profile
            .available_hours
            .ok_or(InputError::Blank(ProfileField::AvailableHours))?;
        Ok(PlanRequest {
            available_hours: validate_hours(hours)?,
            commitments: required_text(profile.commitments.as_ref(), ProfileField::Commitments)?,
            timeline: required_text(profile.timeline.as_ref(), ProfileField::Timeline)?,
        })
    }

    async fn generate(
        &self,
        request: PlanRequest,
        generator: &dyn GenerativeService,
    ) -> Result<String, GenerationError> {
        let response = generator.plan(request).await?;
        non_blank(response.plan)
    }

    fn pending_write(&self, user: &UserId, plan: &String) -> PendingWrite {
        PendingWrite::ReplaceText {
            user_id: user.clone(),
            field: GeneratedField::RoutePlan,
            text: plan.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(hours: f64) -> Profile {
        Profile::new(UserId::new("u1").unwrap()).with_planning(hours, " day job ", "12 months")
    }

    #[test]
    fn prepare_trims_text_inputs() {
        let request = RoutePlanStep.prepare(&profile(6.5), &()).unwrap();
        assert_eq!(request.available_hours, 6.5);
        assert_eq!(request.commitments, "day job");
        assert_eq!(request.timeline, "12 months");
    }

    #[test]
    fn non_positive_or_non_finite_hours_are_rejected() {
        for hours in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            let err = RoutePlanStep.prepare(&profile(hours), &()).unwrap_err();
            assert!(matches!(err, InputError::NonPositiveHours(_)), "{hours}");
        }
    }
}
