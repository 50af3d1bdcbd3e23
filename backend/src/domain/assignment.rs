//! Assignments: client engagements grouping services and placements.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::text_enum::string_enum;
use super::{ColleagueId, Error, MinistryId, OrganizationId, Period};

/// Assignment identifier.
pub type AssignmentId = i32;

/// Maximum length of the free-text description.
pub const EXTRA_INFO_MAX: usize = 5000;
const NAME_MAX: usize = 200;

/// Pipeline status; also the kanban columns, in order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentStatus {
    /// Prospect.
    #[default]
    Lead,
    /// Looking for colleagues.
    Vacature,
    /// Staffed.
    Ingevuld,
    /// Declined.
    Afgewezen,
    /// Archived.
    Historisch,
}

string_enum!(AssignmentStatus, "assignment status", {
    Lead => "LEAD",
    Vacature => "VACATURE",
    Ingevuld => "INGEVULD",
    Afgewezen => "AFGEWEZEN",
    Historisch => "HISTORISCH",
});

impl AssignmentStatus {
    /// Statuses in board order.
    pub const ALL: [Self; 5] = [
        Self::Lead,
        Self::Vacature,
        Self::Ingevuld,
        Self::Afgewezen,
        Self::Historisch,
    ];
}

/// System a record originates from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    /// Entered in this application.
    #[default]
    Wies,
    /// Imported from the external recruitment system.
    OtysIir,
}

string_enum!(Source, "source", {
    Wies => "wies",
    OtysIir => "otys_iir",
});

/// Origin of an imported record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SourceRef {
    /// Originating system.
    pub source: Source,
    /// Identifier in that system.
    pub source_id: String,
    /// Link into that system.
    pub source_url: String,
}

/// How an organisation relates to an assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AssignmentOrganizationRole {
    /// The client; at most one per assignment.
    Primary,
    /// Also involved.
    Involved,
    /// Took over from a dissolved client.
    Successor,
}

string_enum!(AssignmentOrganizationRole, "assignment organization role", {
    Primary => "PRIMARY",
    Involved => "INVOLVED",
    Successor => "SUCCESSOR",
});

/// Organisation linked to an assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AssignmentOrganization {
    /// Linked organisation.
    pub organization_id: OrganizationId,
    /// Relationship.
    pub role: AssignmentOrganizationRole,
    /// First day the link applies.
    #[serde(default)]
    pub effective_from: Option<NaiveDate>,
    /// Last day the link applies.
    #[serde(default)]
    pub effective_until: Option<NaiveDate>,
}

/// Stored assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Assignment {
    /// Stable identifier.
    pub id: AssignmentId,
    /// Name.
    pub name: String,
    /// First day.
    pub start_date: Option<NaiveDate>,
    /// Last day.
    pub end_date: Option<NaiveDate>,
    /// Pipeline status.
    pub status: AssignmentStatus,
    /// Issuing ministry.
    pub ministry_id: Option<MinistryId>,
    /// Responsible colleague (business development).
    pub owner_id: Option<ColleagueId>,
    /// Free-text description.
    pub extra_info: String,
    /// Origin.
    #[serde(flatten)]
    pub source: SourceRef,
}

impl Assignment {
    /// Own start and end dates.
    #[must_use]
    pub const fn period(&self) -> Period {
        Period::new(self.start_date, self.end_date)
    }
}

/// Editable assignment fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AssignmentDraft {
    /// Name.
    pub name: String,
    /// First day.
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    /// Last day.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Pipeline status.
    #[serde(default)]
    pub status: AssignmentStatus,
    /// Issuing ministry.
    #[serde(default)]
    pub ministry_id: Option<MinistryId>,
    /// Responsible colleague.
    #[serde(default)]
    pub owner_id: Option<ColleagueId>,
    /// Description.
    #[serde(default)]
    pub extra_info: String,
    /// Linked organisations.
    #[serde(default)]
    pub organizations: Vec<AssignmentOrganization>,
}

impl AssignmentDraft {
    /// Draft mirroring a stored assignment and its organisation links.
    #[must_use]
    pub fn from_stored(assignment: &Assignment, organizations: Vec<AssignmentOrganization>) -> Self {
        Self {
            name: assignment.name.clone(),
            start_date: assignment.start_date,
            end_date: assignment.end_date,
            status: assignment.status,
            ministry_id: assignment.ministry_id,
            owner_id: assignment.owner_id,
            extra_info: assignment.extra_info.clone(),
            organizations,
        }
    }

    /// Trim text and check lengths, dates and organisation links.
    ///
    /// # Errors
    /// Returns a field error for a blank or over-long name, over-long extra
    /// info, an end date before the start, more than one primary
    /// organisation or a repeated organisation/role pair.
    pub fn normalised(self) -> Result<Self, Error> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err(Error::invalid_field("name", "required", "name is required"));
        }
        if name.chars().count() > NAME_MAX {
            return Err(Error::invalid_field(
                "name",
                "name_too_long",
                format!("name must be at most {NAME_MAX} characters"),
            ));
        }
        let extra_info = self.extra_info.trim().to_owned();
        if extra_info.chars().count() > EXTRA_INFO_MAX {
            return Err(Error::invalid_field(
                "extra_info",
                "too_long",
                format!("extra info must be at most {EXTRA_INFO_MAX} characters"),
            ));
        }
        Period::new(self.start_date, self.end_date).validate()?;
        let primaries = self
            .organizations
            .iter()
            .filter(|link| link.role == AssignmentOrganizationRole::Primary)
            .count();
        if primaries > 1 {
            return Err(Error::invalid_field(
                "organizations",
                "multiple_primary",
                "an assignment has at most one primary organization",
            ));
        }
        for (position, link) in self.organizations.iter().enumerate() {
            let repeated = self
                .organizations
                .iter()
                .skip(position + 1)
                .any(|other| {
                    other.organization_id == link.organization_id && other.role == link.role
                });
            if repeated {
                return Err(Error::invalid_field(
                    "organizations",
                    "duplicate_organization",
                    format!(
                        "organization {} is linked twice as {}",
                        link.organization_id, link.role
                    ),
                ));
            }
        }
        Ok(Self {
            name,
            extra_info,
            ..self
        })
    }
}

/// Single-attribute edit from the inline edit forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentEdit {
    /// New name.
    Name(String),
    /// New start and end date.
    Period {
        /// First day.
        start_date: Option<NaiveDate>,
        /// Last day.
        end_date: Option<NaiveDate>,
    },
    /// New status.
    Status(AssignmentStatus),
    /// New description.
    ExtraInfo(String),
    /// New owner.
    Owner(Option<ColleagueId>),
    /// New ministry.
    Ministry(Option<MinistryId>),
    /// Replacement organisation links.
    Organizations(Vec<AssignmentOrganization>),
}

#[derive(Deserialize)]
struct PeriodBody {
    #[serde(default)]
    start_date: Option<NaiveDate>,
    #[serde(default)]
    end_date: Option<NaiveDate>,
}

impl AssignmentEdit {
    /// Interpret the `{"value": ..}` body sent for `attribute`.
    ///
    /// The `period` attribute takes `{"start_date": .., "end_date": ..}`
    /// instead.
    ///
    /// # Errors
    /// Rejects unknown attributes and values of the wrong shape.
    pub fn parse(attribute: &str, body: Value) -> Result<Self, Error> {
        if attribute == "period" {
            let period: PeriodBody = serde_json::from_value(body)
                .map_err(|err| Error::invalid_request(format!("invalid period: {err}")))?;
            return Ok(Self::Period {
                start_date: period.start_date,
                end_date: period.end_date,
            });
        }
        let value = match body {
            Value::Object(mut map) => map.remove("value").unwrap_or(Value::Null),
            other => other,
        };
        let invalid =
            |err: serde_json::Error| Error::invalid_request(format!("invalid {attribute}: {err}"));
        match attribute {
            "name" => serde_json::from_value(value).map(Self::Name).map_err(invalid),
            "status" => serde_json::from_value(value).map(Self::Status).map_err(invalid),
            "extra_info" => serde_json::from_value(value)
                .map(|text: Option<String>| Self::ExtraInfo(text.unwrap_or_default()))
                .map_err(invalid),
            "owner" => serde_json::from_value(value).map(Self::Owner).map_err(invalid),
            "ministry" => serde_json::from_value(value).map(Self::Ministry).map_err(invalid),
            "organizations" => serde_json::from_value(value)
                .map(Self::Organizations)
                .map_err(invalid),
            other => Err(Error::invalid_request(format!(
                "unknown assignment attribute: {other}"
            ))),
        }
    }

    /// Apply the edit to `draft`.
    pub fn apply(self, draft: &mut AssignmentDraft) {
        match self {
            Self::Name(name) => draft.name = name,
            Self::Period {
                start_date,
                end_date,
            } => {
                draft.start_date = start_date;
                draft.end_date = end_date;
            }
            Self::Status(status) => draft.status = status,
            Self::ExtraInfo(text) => draft.extra_info = text,
            Self::Owner(owner) => draft.owner_id = owner,
            Self::Ministry(ministry) => draft.ministry_id = ministry,
            Self::Organizations(links) => draft.organizations = links,
        }
    }
}
