//! Display code for a complete typology

use pathfinder_profile::{ProfileField, Typology};
use serde::{Deserialize, Serialize};

/// The five typology codes, all known to be non-blank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchetypeCodes {
    /// Type digit, e.g. `4`
    pub enneagram_type: String,
    /// Wing, e.g. `4w5`
    pub wing: String,
    /// Subtype, e.g. `sx`
    pub subtype: String,
    /// Stacking, e.g. `sx/sp`
    pub instinctual_stacking: String,
    /// Tritype, e.g. `451`
    pub trifix: String,
}

impl ArchetypeCodes {
    /// Extract trimmed codes from a typology
    ///
    /// # Errors
    /// The absent or blank fields, in display order
    pub fn from_typology(typology: &Typology) -> Result<Self, Vec<ProfileField>> {
        let missing = typology.missing();
        if !missing.is_empty() {
            return Err(missing);
        }

        let get = |field: ProfileField| {
            typology
                .get(field)
                .map(str::trim)
                .unwrap_or_default()
                .to_string()
        };
        Ok(Self {
            enneagram_type: get(ProfileField::EnneagramType),
            wing: get(ProfileField::Wing),
            subtype: get(ProfileField::Subtype),
            instinctual_stacking: get(ProfileField::InstinctualStacking),
            trifix: get(ProfileField::Trifix),
        })
    }

    /// Formatted code, e.g. `Enneagram 4w5 SX SX/SP 451`
    ///
    /// The wing's leading type digit is not repeated; a wing that does not
    /// start with the type is appended as-is.
    #[must_use]
    pub fn code(&self) -> String {
        let wing = self
            .wing
            .strip_prefix(self.enneagram_type.as_str())
            .unwrap_or(&self.wing);
        format!(
            "Enneagram {}{} {} {} {}",
            self.enneagram_type,
            wing,
            self.subtype.to_uppercase(),
            self.instinctual_stacking.to_uppercase(),
            self.trifix
        )
    }
}

impl From<ArchetypeCodes> for Typology {
    fn from(codes: ArchetypeCodes) -> Self {
        Typology::new(
            codes.enneagram_type,
            codes.wing,
            codes.subtype,
            codes.instinctual_stacking,
            codes.trifix,
        )
    }
}

impl std::fmt::Display for ArchetypeCodes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.code())
    }
}

/// Archetype display code, or `None` unless all five codes are present
#[must_use]
pub fn format_archetype(typology: &Typology) -> Option<String> {
    ArchetypeCodes::from_typology(typology)
        .ok()
        .map(|codes| codes.code())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_full_code() {
        let typology = Typology::new("4", "4w5", "sx", "sx/sp", "451");
        assert_eq!(
            format_archetype(&typology).as_deref(),
            Some("Enneagram 4w5 SX SX/SP 451")
        );
    }

    #[test]
    fn wing_without_type_prefix_is_kept_whole() {
        let typology = Typology::new("9", "w1", "sp", "sp/so", "954");
        assert_eq!(
            format_archetype(&typology).as_deref(),
            Some("Enneagram 9w1 SP SP/SO 954")
        );
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let typology = Typology::new(" 4 ", "4w5 ", "sx", " sx/sp", "451");
        assert_eq!(
            format_archetype(&typology).as_deref(),
            Some("Enneagram 4w5 SX SX/SP 451")
        );
    }

    #[test]
    fn incomplete_typology_has_no_code() {
        let mut typology = Typology::new("4", "4w5", "sx", "sx/sp", "451");
        typology.subtype = Some(String::new());
        assert_eq!(format_archetype(&typology), None);
        assert_eq!(format_archetype(&Typology::default()), None);
        assert_eq!(
            ArchetypeCodes::from_typology(&typology).unwrap_err(),
            vec![ProfileField::Subtype]
        );
    }
}
