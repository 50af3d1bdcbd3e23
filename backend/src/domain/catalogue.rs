//! Reference data shared by assignments and colleagues: skills and ministries.

use serde::{Deserialize, Serialize};

use super::Error;

/// Skill identifier.
pub type SkillId = i32;
/// Ministry identifier.
pub type MinistryId = i32;

/// Maximum skill name length in characters.
pub const SKILL_NAME_MAX: usize = 30;

/// A role or competence that a service asks for and a colleague offers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Skill {
    /// Stable identifier.
    pub id: SkillId,
    /// Unique display name.
    pub name: String,
}

/// Government ministry issuing assignments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Ministry {
    /// Stable identifier.
    pub id: MinistryId,
    /// Full name, e.g. "Ministerie van Financiën".
    pub name: String,
    /// Short form such as "FIN"; may be empty.
    pub abbreviation: String,
}

impl Ministry {
    /// Abbreviation when present, otherwise the full name.
    #[must_use]
    pub fn short_label(&self) -> &str {
        if self.abbreviation.is_empty() {
            &self.name
        } else {
            &self.abbreviation
        }
    }
}

/// Normalise and validate a skill name.
///
/// # Errors
/// Rejects blank names and names longer than [`SKILL_NAME_MAX`] characters.
///
/// # Examples
/// ```
/// use wies::domain::skill_name;
///
/// assert_eq!(skill_name("  Scrum Master ").unwrap(), "Scrum Master");
/// assert!(skill_name("   ").is_err());
/// ```
pub fn skill_name(raw: &str) -> Result<String, Error> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(Error::invalid_field(
            "name",
            "empty_name",
            "skill name must not be empty",
        ));
    }
    if name.chars().count() > SKILL_NAME_MAX {
        return Err(Error::invalid_field(
            "name",
            "name_too_long",
            format!("skill name must be at most {SKILL_NAME_MAX} characters"),
        ));
    }
    Ok(name.to_owned())
}

/// Normalise and validate a ministry name and abbreviation.
///
/// # Errors
/// Rejects blank names.
pub fn ministry_fields(raw_name: &str, abbreviation: &str) -> Result<(String, String), Error> {
    let name = raw_name.trim();
    if name.is_empty() {
        return Err(Error::invalid_field(
            "name",
            "empty_name",
            "ministry name must not be empty",
        ));
    }
    Ok((name.to_owned(), abbreviation.trim().to_owned()))
}
