//! Interpreting completion text

use regex::Regex;
use std::sync::OnceLock;

const LIST_MARKER: &str = r"^\s*(?:[-*•]|\d+[.)])\s+(.+?)\s*$";

fn list_marker() -> Option<&'static Regex> {
    static MARKER: OnceLock<Option<Regex>> = OnceLock::new();
    MARKER
        .get_or_init(|| match Regex::new(LIST_MARKER) {
            Ok(regex) => Some(regex),
            Err(err) => {
                tracing::error!("Invalid list marker pattern: {}", err);
                None
            }
        })
        .as_ref()
}

/// Extract career ideas from completion text
///
/// Prefers the first JSON array of strings found in the text (models often
/// wrap it in prose or a code fence); falls back to bullet or numbered
/// lines. Returns `None` when neither is present.
#[must_use]
pub fn parse_idea_list(content: &str) -> Option<Vec<String>> {
    if let Some(ideas) = json_array(content) {
        return Some(ideas);
    }

    let marker = list_marker()?;
    let bullets: Vec<String> = content
        .lines()
        .filter_map(|line| marker.captures(line))
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim_matches(|c| c == '"' || c == '*').trim().to_string())
        .filter(|idea| !idea.is_empty())
        .collect();

    if bullets.is_empty() {
        None
    } else {
        Some(bullets)
    }
}

fn json_array(content: &str) -> Option<Vec<String>> {
    let start = content.find('[')?;
    let end = content.rfind(']')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&content[start..=end]).ok()
}
