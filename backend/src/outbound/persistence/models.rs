//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Enum columns hold the domain's stored
//! text and are parsed back on read; a row that does not parse is reported
//! as a query error.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::{
    Assignment, AssignmentOrganization, Colleague, ColleagueSummary, Event, Label, LabelCategory,
    Ministry, Organization, Placement, PreviousName, Service, Skill, SourceRef,
};

use super::schema::{
    assignment_organizations, assignments, colleagues, events, label_categories, labels,
    ministries, organizations, placements, services, skills, users,
};

fn parse_text<T>(value: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|err: T::Err| err.to_string())
}

fn source_ref(source: &str, source_id: String, source_url: String) -> Result<SourceRef, String> {
    Ok(SourceRef {
        source: parse_text(source)?,
        source_id,
        source_url,
    })
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = skills)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct SkillRow {
    pub id: i32,
    pub name: String,
}

impl From<SkillRow> for Skill {
    fn from(row: SkillRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = ministries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct MinistryRow {
    pub id: i32,
    pub name: String,
    pub abbreviation: String,
}

impl From<MinistryRow> for Ministry {
    fn from(row: MinistryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            abbreviation: row.abbreviation,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = label_categories)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct LabelCategoryRow {
    pub id: i32,
    pub name: String,
    pub color: String,
}

impl From<LabelCategoryRow> for LabelCategory {
    fn from(row: LabelCategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            color: row.color,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = labels)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct LabelRow {
    pub id: i32,
    pub name: String,
    pub category_id: i32,
}

impl From<LabelRow> for Label {
    fn from(row: LabelRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            category_id: row.category_id,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = organizations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct OrganizationRow {
    pub id: i32,
    pub name: String,
    pub abbreviation: String,
    pub organization_type: String,
    pub parent_id: Option<i32>,
    pub is_active: bool,
    pub tooi_identifier: Option<String>,
    pub oin_number: Option<String>,
    pub previous_names: String,
    pub successor_id: Option<i32>,
    pub source_url: Option<String>,
}

impl TryFrom<OrganizationRow> for Organization {
    type Error = String;

    fn try_from(row: OrganizationRow) -> Result<Self, Self::Error> {
        let previous_names: Vec<PreviousName> = serde_json::from_str(&row.previous_names)
            .map_err(|err| format!("organization {}: previous names: {err}", row.id))?;
        Ok(Self {
            id: row.id,
            name: row.name,
            abbreviation: row.abbreviation,
            organization_type: parse_text(&row.organization_type)?,
            parent_id: row.parent_id,
            is_active: row.is_active,
            tooi_identifier: row.tooi_identifier,
            oin_number: row.oin_number,
            previous_names,
            successor_id: row.successor_id,
            source_url: row.source_url,
        })
    }
}

/// Insert and full-overwrite shape for organisations.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = organizations)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct OrganizationValues<'a> {
    pub name: &'a str,
    pub abbreviation: &'a str,
    pub organization_type: &'static str,
    pub parent_id: Option<i32>,
    pub is_active: bool,
    pub tooi_identifier: Option<&'a str>,
    pub oin_number: Option<&'a str>,
    pub previous_names: String,
    pub successor_id: Option<i32>,
    pub source_url: Option<&'a str>,
}

impl<'a> OrganizationValues<'a> {
    pub(crate) fn from_organization(org: &'a Organization) -> Result<Self, String> {
        Ok(Self {
            name: &org.name,
            abbreviation: &org.abbreviation,
            organization_type: org.organization_type.as_str(),
            parent_id: org.parent_id,
            is_active: org.is_active,
            tooi_identifier: org.tooi_identifier.as_deref(),
            oin_number: org.oin_number.as_deref(),
            previous_names: serde_json::to_string(&org.previous_names)
                .map_err(|err| err.to_string())?,
            successor_id: org.successor_id,
            source_url: org.source_url.as_deref(),
        })
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct UserRow {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_superuser: bool,
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserValues<'a> {
    pub email: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = colleagues)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct ColleagueRow {
    pub id: i32,
    pub user_id: Option<i32>,
    pub name: String,
    pub email: String,
    pub source: String,
    pub source_id: String,
    pub source_url: String,
}

impl ColleagueRow {
    /// Colleague without skills and labels; callers attach those.
    pub(crate) fn into_colleague(self) -> Result<Colleague, String> {
        Ok(Colleague {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            email: self.email,
            skill_ids: Default::default(),
            label_ids: Default::default(),
            source: source_ref(&self.source, self.source_id, self.source_url)?,
        })
    }

    pub(crate) fn summary(&self) -> ColleagueSummary {
        ColleagueSummary {
            id: self.id,
            name: self.name.clone(),
            label_ids: Default::default(),
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = colleagues)]
pub(crate) struct NewColleagueRow<'a> {
    pub user_id: Option<i32>,
    pub name: &'a str,
    pub email: &'a str,
    pub source: &'static str,
    pub source_id: &'a str,
    pub source_url: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = assignments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct AssignmentRow {
    pub id: i32,
    pub name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: String,
    pub ministry_id: Option<i32>,
    pub owner_id: Option<i32>,
    pub extra_info: String,
    pub source: String,
    pub source_id: String,
    pub source_url: String,
}

impl TryFrom<AssignmentRow> for Assignment {
    type Error = String;

    fn try_from(row: AssignmentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            start_date: row.start_date,
            end_date: row.end_date,
            status: parse_text(&row.status)?,
            ministry_id: row.ministry_id,
            owner_id: row.owner_id,
            extra_info: row.extra_info,
            source: source_ref(&row.source, row.source_id, row.source_url)?,
        })
    }
}

/// Editable assignment columns; the source is only written on insert.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = assignments)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct AssignmentValues<'a> {
    pub name: &'a str,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: &'static str,
    pub ministry_id: Option<i32>,
    pub owner_id: Option<i32>,
    pub extra_info: &'a str,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = assignments)]
pub(crate) struct AssignmentSourceValues<'a> {
    pub source: &'static str,
    pub source_id: &'a str,
    pub source_url: &'a str,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = assignment_organizations)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct AssignmentOrganizationRow {
    pub assignment_id: i32,
    pub organization_id: i32,
    pub role: String,
    pub effective_from: Option<NaiveDate>,
    pub effective_until: Option<NaiveDate>,
}

impl TryFrom<&AssignmentOrganizationRow> for AssignmentOrganization {
    type Error = String;

    fn try_from(row: &AssignmentOrganizationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            organization_id: row.organization_id,
            role: parse_text(&row.role)?,
            effective_from: row.effective_from,
            effective_until: row.effective_until,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = assignment_organizations)]
pub(crate) struct NewAssignmentOrganizationRow {
    pub assignment_id: i32,
    pub organization_id: i32,
    pub role: &'static str,
    pub effective_from: Option<NaiveDate>,
    pub effective_until: Option<NaiveDate>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = services)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct ServiceRow {
    pub id: i32,
    pub assignment_id: i32,
    pub description: String,
    pub skill_id: Option<i32>,
    pub cost_type: String,
    pub fixed_cost: Option<i32>,
    pub hours_per_week: Option<i32>,
    pub period_source: String,
    pub specific_start_date: Option<NaiveDate>,
    pub specific_end_date: Option<NaiveDate>,
    pub source: String,
    pub source_id: String,
    pub source_url: String,
}

impl TryFrom<ServiceRow> for Service {
    type Error = String;

    fn try_from(row: ServiceRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            assignment_id: row.assignment_id,
            description: row.description,
            skill_id: row.skill_id,
            cost_type: parse_text(&row.cost_type)?,
            fixed_cost: row.fixed_cost,
            hours_per_week: row.hours_per_week,
            period_source: parse_text(&row.period_source)?,
            specific_start_date: row.specific_start_date,
            specific_end_date: row.specific_end_date,
            source: source_ref(&row.source, row.source_id, row.source_url)?,
        })
    }
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = services)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct ServiceValues<'a> {
    pub description: &'a str,
    pub skill_id: Option<i32>,
    pub cost_type: &'static str,
    pub fixed_cost: Option<i32>,
    pub hours_per_week: Option<i32>,
    pub period_source: &'static str,
    pub specific_start_date: Option<NaiveDate>,
    pub specific_end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = placements)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct PlacementRow {
    pub id: i32,
    pub colleague_id: i32,
    pub service_id: i32,
    pub hours_per_week: Option<i32>,
    pub period_source: String,
    pub specific_start_date: Option<NaiveDate>,
    pub specific_end_date: Option<NaiveDate>,
    pub source: String,
    pub source_id: String,
    pub source_url: String,
}

impl TryFrom<PlacementRow> for Placement {
    type Error = String;

    fn try_from(row: PlacementRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            colleague_id: row.colleague_id,
            service_id: row.service_id,
            hours_per_week: row.hours_per_week,
            period_source: parse_text(&row.period_source)?,
            specific_start_date: row.specific_start_date,
            specific_end_date: row.specific_end_date,
            source: source_ref(&row.source, row.source_id, row.source_url)?,
        })
    }
}

#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = placements)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct PlacementValues {
    pub colleague_id: i32,
    pub service_id: i32,
    pub hours_per_week: Option<i32>,
    pub period_source: &'static str,
    pub specific_start_date: Option<NaiveDate>,
    pub specific_end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = events)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct EventRow {
    pub id: i32,
    pub timestamp: NaiveDateTime,
    pub user_email: String,
    pub name: String,
    pub context: String,
}

impl TryFrom<EventRow> for Event {
    type Error = String;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            timestamp: row.timestamp.and_utc(),
            user_email: row.user_email,
            name: parse_text(&row.name)?,
            context: serde_json::from_str(&row.context)
                .map_err(|err| format!("event {}: context: {err}", row.id))?,
        })
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = events)]
pub(crate) struct NewEventRow<'a> {
    pub timestamp: NaiveDateTime,
    pub user_email: &'a str,
    pub name: &'static str,
    pub context: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AssignmentStatus, OrganizationType, Source};
    use rstest::rstest;

    fn organization_row(kind: &str, previous_names: &str) -> OrganizationRow {
        OrganizationRow {
            id: 7,
            name: "Belastingdienst".to_owned(),
            abbreviation: "BD".to_owned(),
            organization_type: kind.to_owned(),
            parent_id: Some(1),
            is_active: true,
            tooi_identifier: None,
            oin_number: None,
            previous_names: previous_names.to_owned(),
            successor_id: None,
            source_url: None,
        }
    }

    #[rstest]
    fn organization_rows_parse_type_and_history() {
        let org = Organization::try_from(organization_row(
            OrganizationType::Organisatieonderdeel.as_str(),
            r#"[{"name":"Fiscus","until":"2025-12-31"}]"#,
        ))
        .expect("valid row");
        assert_eq!(org.organization_type, OrganizationType::Organisatieonderdeel);
        assert_eq!(org.previous_names.len(), 1);

        let values = OrganizationValues::from_organization(&org).expect("values");
        assert!(values.previous_names.contains("Fiscus"));
    }

    #[rstest]
    #[case("bogus", "[]")]
    #[case("organisatieonderdeel", "not json")]
    fn malformed_organization_rows_are_rejected(#[case] kind: &str, #[case] history: &str) {
        assert!(Organization::try_from(organization_row(kind, history)).is_err());
    }

    #[rstest]
    fn assignment_rows_parse_status_and_source() {
        let assignment = Assignment::try_from(AssignmentRow {
            id: 1,
            name: "Opdracht".to_owned(),
            start_date: None,
            end_date: None,
            status: AssignmentStatus::Ingevuld.as_str().to_owned(),
            ministry_id: None,
            owner_id: None,
            extra_info: String::new(),
            source: Source::OtysIir.as_str().to_owned(),
            source_id: "42".to_owned(),
            source_url: String::new(),
        })
        .expect("valid row");
        assert_eq!(assignment.status, AssignmentStatus::Ingevuld);
        assert_eq!(assignment.source.source, Source::OtysIir);
    }
}
