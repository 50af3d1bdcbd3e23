//! Colleagues: staff who can be placed on services.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::{Error, LabelId, SkillId, SourceRef, UserId, is_valid_email};

/// Colleague identifier.
pub type ColleagueId = i32;

/// Stored colleague.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Colleague {
    /// Stable identifier.
    pub id: ColleagueId,
    /// Linked login, if the colleague uses the application.
    pub user_id: Option<UserId>,
    /// Display name.
    pub name: String,
    /// E-mail address; used to match imports.
    pub email: String,
    /// Skills offered.
    pub skill_ids: BTreeSet<SkillId>,
    /// Attached labels.
    pub label_ids: BTreeSet<LabelId>,
    /// Origin.
    #[serde(flatten)]
    pub source: SourceRef,
}

/// The parts of a colleague shown next to assignments and placements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ColleagueSummary {
    /// Identifier.
    pub id: ColleagueId,
    /// Display name.
    pub name: String,
    /// Labels, for the label filter.
    pub label_ids: BTreeSet<LabelId>,
}

impl From<&Colleague> for ColleagueSummary {
    fn from(colleague: &Colleague) -> Self {
        Self {
            id: colleague.id,
            name: colleague.name.clone(),
            label_ids: colleague.label_ids.clone(),
        }
    }
}

/// Editable colleague fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, utoipa::ToSchema)]
pub struct ColleagueDraft {
    /// Display name.
    pub name: String,
    /// E-mail address.
    #[serde(default)]
    pub email: String,
    /// Skills offered.
    #[serde(default)]
    pub skill_ids: BTreeSet<SkillId>,
    /// Labels.
    #[serde(default)]
    pub label_ids: BTreeSet<LabelId>,
}

impl ColleagueDraft {
    /// Trim fields and check the e-mail shape when one is given.
    ///
    /// # Errors
    /// Rejects a blank name or a malformed e-mail address.
    pub fn normalised(self) -> Result<Self, Error> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(Error::invalid_field("name", "required", "name is required"));
        }
        let email = self.email.trim().to_owned();
        if !email.is_empty() && !is_valid_email(&email) {
            return Err(Error::invalid_field(
                "email",
                "invalid_email",
                format!("invalid email address '{email}'"),
            ));
        }
        Ok(Self {
            name,
            email,
            ..self
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("Piet", "", true)]
    #[case("Piet", "piet@minbzk.nl", true)]
    #[case("", "piet@minbzk.nl", false)]
    #[case("Piet", "piet", false)]
    fn validates_name_and_optional_email(
        #[case] name: &str,
        #[case] email: &str,
        #[case] valid: bool,
    ) {
        let draft = ColleagueDraft {
            name: name.to_owned(),
            email: email.to_owned(),
            ..ColleagueDraft::default()
        };
        assert_eq!(draft.normalised().is_ok(), valid);
    }
}
