//! Argument parsing helpers

use anyhow::{bail, Context};
use pathfinder_profile::{ListField, Milestone};

/// Comma- or whitespace-separated quiz ratings
pub(crate) fn parse_ratings(raw: &str) -> anyhow::Result<Vec<u8>> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u8>()
                .with_context(|| format!("rating {part:?} is not a number between 0 and 10"))
        })
        .collect()
}

/// List field by wire or kebab-case name
pub(crate) fn parse_list_field(raw: &str) -> anyhow::Result<ListField> {
    Ok(match raw {
        "careerIdeas" | "career-ideas" | "ideas" => ListField::CareerIdeas,
        "skills" => ListField::Skills,
        "passions" => ListField::Passions,
        "interests" => ListField::Interests,
        other => bail!("unknown list field {other:?} (skills, passions, interests, career-ideas)"),
    })
}

pub(crate) fn parse_milestone(raw: &str) -> anyhow::Result<Milestone> {
    Ok(match raw {
        "driver" => Milestone::Driver,
        "destination" => Milestone::Destination,
        "route" => Milestone::Route,
        other => bail!("unknown milestone {other:?} (driver, destination, route)"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn ratings_accept_commas_and_spaces() {
        assert_eq!(
            parse_ratings("8,8, 8 8,8,8,8,8,8,9").unwrap(),
            vec![8, 8, 8, 8, 8, 8, 8, 8, 8, 9]
        );
        assert!(parse_ratings("1,two").is_err());
        assert!(parse_ratings("300").is_err());
    }

    #[test]
    fn list_field_names() {
        assert_eq!(parse_list_field("career-ideas").unwrap(), ListField::CareerIdeas);
        assert_eq!(parse_list_field("careerIdeas").unwrap(), ListField::CareerIdeas);
        assert_eq!(parse_list_field("skills").unwrap(), ListField::Skills);
        assert!(parse_list_field("hobbies").is_err());
    }

    #[test]
    fn milestone_names() {
        assert_eq!(parse_milestone("route").unwrap(), Milestone::Route);
        assert!(parse_milestone("done").is_err());
    }
}
