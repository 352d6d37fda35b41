//! Prompt text for each request shape

use pathfinder_core::{
    ArchetypeCodes, FocusArea, IdeasRequest, PlanRequest, ReportRequest, SynthesisRequest,
};
use std::fmt::Write;

/// System + user message pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// Instructions
    pub system: String,
    /// Request content
    pub user: String,
}

const COACH: &str = "You are a thoughtful career and life-purpose coach. \
Write in second person, warmly and concretely. Do not mention that you are an AI.";

fn typology_lines(archetype: &ArchetypeCodes) -> String {
    format!(
        "Archetype: {}\nType: {}\nWing: {}\nSubtype: {}\nInstinctual stacking: {}\nTritype: {}",
        archetype.code(),
        archetype.enneagram_type,
        archetype.wing,
        archetype.subtype,
        archetype.instinctual_stacking,
        archetype.trifix
    )
}

/// Life-purpose report prompt
#[must_use]
pub fn report(request: &ReportRequest) -> Prompt {
    Prompt {
        system: COACH.to_string(),
        user: format!(
            "Write a life-purpose report of four to six paragraphs for this person.\n\n{}",
            typology_lines(&request.archetype)
        ),
    }
}

/// Career ideas prompt; asks for a bare JSON array
#[must_use]
pub fn ideas(request: &IdeasRequest) -> Prompt {
    let profile = &request.profile;
    let mut user = format!(
        "Suggest {} career ideas for this person. Answer with a JSON array of short strings \
         and nothing else.\n\n{}",
        request.max_ideas,
        typology_lines(&profile.archetype)
    );

    let sections: [(&str, &[String]); 4] = [
        ("Core values", &profile.core_values),
        ("Skills", &profile.skills),
        ("Passions", &profile.passions),
        ("Interests", &profile.interests),
    ];
    for (label, items) in sections {
        if !items.is_empty() {
            let _ = write!(user, "\n{}: {}", label, items.join(", "));
        }
    }
    if let Some(text) = &profile.contribution_profile {
        let _ = write!(user, "\nContribution: {text}");
    }
    if let Some(text) = &profile.calling_profile {
        let _ = write!(user, "\nCalling: {text}");
    }
    if let Some(score) = profile.role_clarity_score {
        let _ = write!(user, "\nRole clarity: {score}%");
    }
    if !profile.existing_ideas.is_empty() {
        let _ = write!(
            user,
            "\nAlready suggested (do not repeat): {}",
            profile.existing_ideas.join(", ")
        );
    }

    Prompt {
        system: COACH.to_string(),
        user,
    }
}

/// Contribution or calling synthesis prompt
#[must_use]
pub fn synthesis(request: &SynthesisRequest) -> Prompt {
    let ask = match request.focus_area {
        FocusArea::Contribution => "how this person most naturally contributes to others",
        FocusArea::Calling => "what this person is called to do with their life",
    };
    Prompt {
        system: COACH.to_string(),
        user: format!(
            "In one or two paragraphs, describe {ask}.\n\n{}",
            typology_lines(&request.archetype)
        ),
    }
}

/// Route plan prompt
#[must_use]
pub fn plan(request: &PlanRequest) -> Prompt {
    Prompt {
        system: COACH.to_string(),
        user: format!(
            "Create a step-by-step plan toward a more purposeful career.\n\
             Available hours per week: {}\nCurrent commitments: {}\nTimeline: {}\n\
             Break the plan into phases that fit the timeline and the weekly hours.",
            request.available_hours, request.commitments, request.timeline
        ),
    }
}
