//! Placement import: one row per colleague placed on an assignment's skill.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Serialize;

use super::{Columns, Sheet, rejected};
use crate::domain::{Error, Period, is_valid_email, parse_date_dmy, skill_name};

/// Required columns, in the order of the template spreadsheet.
pub const PLACEMENT_COLUMNS: [&str; 11] = [
    "assignment_name",
    "assignment_description",
    "assignment_owner",
    "assignment_owner_email",
    "assignment_organization",
    "assignment_ministry",
    "assignment_start_date",
    "assignment_end_date",
    "service_skill",
    "placement_colleague_name",
    "placement_colleague_email",
];

/// Person referenced by a row; matched on e-mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRow {
    /// Name used when the colleague is created.
    pub name: String,
    /// Match key.
    pub email: String,
    /// Brand label for newly created colleagues.
    pub brand: Option<String>,
}

/// Validated row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementImportRow {
    /// Spreadsheet row number.
    pub row: usize,
    /// Assignment match key.
    pub assignment_name: String,
    /// Stored as the assignment's extra info.
    pub assignment_description: String,
    /// Assignment owner.
    pub owner: Option<ContactRow>,
    /// Client organisation name or abbreviation.
    pub organization: Option<String>,
    /// Ministry name.
    pub ministry: Option<String>,
    /// Assignment start.
    pub start_date: Option<NaiveDate>,
    /// Assignment end.
    pub end_date: Option<NaiveDate>,
    /// Skill of the service.
    pub skill: Option<String>,
    /// Placed colleague.
    pub colleague: ContactRow,
}

/// Validated import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlacementImportPlan {
    /// Rows in file order.
    pub rows: Vec<PlacementImportRow>,
}

/// What an applied import created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct PlacementImportReport {
    /// New colleagues, owners included.
    pub colleagues_created: usize,
    /// New assignments.
    pub assignments_created: usize,
    /// New services.
    pub services_created: usize,
    /// New skills.
    pub skills_created: usize,
    /// New ministries.
    pub ministries_created: usize,
    /// New placements.
    pub placements_created: usize,
    /// Non-fatal remarks such as unknown organisations.
    pub warnings: Vec<String>,
}

impl PlacementImportPlan {
    /// Parse and validate `content`.
    ///
    /// # Errors
    /// Returns an invalid-request error listing every problem; nothing is
    /// imported when any row is invalid.
    pub fn parse(content: &str) -> Result<Self, Error> {
        let Some(sheet) = Sheet::read(content).map_err(rejected)? else {
            return Err(rejected(vec![
                "CSV file is leeg of heeft geen headers.".to_owned(),
            ]));
        };
        let missing = sheet.columns.missing(&PLACEMENT_COLUMNS);
        if !missing.is_empty() {
            return Err(rejected(vec![format!(
                "CSV mist kolommen: {}.",
                missing.join(", ")
            )]));
        }

        let mut rows = Vec::with_capacity(sheet.records.len());
        let mut errors = Vec::new();
        for (row, record) in &sheet.records {
            match parse_row(*row, &sheet.columns, record) {
                Ok(parsed) => rows.push(parsed),
                Err(mut row_errors) => errors.append(&mut row_errors),
            }
        }
        if errors.is_empty() {
            Ok(Self { rows })
        } else {
            Err(rejected(errors))
        }
    }

    /// Distinct brand labels the plan refers to.
    #[must_use]
    pub fn brand_names(&self) -> BTreeSet<&str> {
        self.rows
            .iter()
            .flat_map(|row| {
                row.owner
                    .as_ref()
                    .and_then(|owner| owner.brand.as_deref())
                    .into_iter()
                    .chain(row.colleague.brand.as_deref())
            })
            .collect()
    }
}

fn parse_row(
    row: usize,
    columns: &Columns,
    record: &csv::StringRecord,
) -> Result<PlacementImportRow, Vec<String>> {
    let cell = |name: &str| columns.get(record, name);
    let optional = |name: &str| Some(cell(name)).filter(|v| !v.is_empty()).map(str::to_owned);
    let mut errors = Vec::new();

    let assignment_name = cell("assignment_name");
    if assignment_name.is_empty() {
        errors.push(format!("Row {row}: assignment_name is required"));
    }

    let owner_email = cell("assignment_owner_email");
    if !owner_email.is_empty() && !is_valid_email(owner_email) {
        errors.push(format!("Row {row}: invalid email format '{owner_email}'"));
    }
    let colleague_email = cell("placement_colleague_email");
    if colleague_email.is_empty() {
        errors.push(format!("Row {row}: placement_colleague_email is required"));
    } else if !is_valid_email(colleague_email) {
        errors.push(format!("Row {row}: invalid email format '{colleague_email}'"));
    }

    let mut date = |name: &str| {
        let raw = cell(name);
        if raw.is_empty() {
            return None;
        }
        let parsed = parse_date_dmy(raw);
        if parsed.is_none() {
            errors.push(format!(
                "Row {row}: {name} '{raw}' is not a DD-MM-YYYY date"
            ));
        }
        parsed
    };
    let start_date = date("assignment_start_date");
    let end_date = date("assignment_end_date");
    if Period::new(start_date, end_date).validate().is_err() {
        errors.push(format!("Row {row}: assignment_end_date is before assignment_start_date"));
    }

    let skill = match optional("service_skill") {
        Some(raw) => match skill_name(&raw) {
            Ok(name) => Some(name),
            Err(err) => {
                errors.push(format!("Row {row}: {}", err.message()));
                None
            }
        },
        None => None,
    };

    if !errors.is_empty() {
        return Err(errors);
    }
    Ok(PlacementImportRow {
        row,
        assignment_name: assignment_name.to_owned(),
        assignment_description: cell("assignment_description").to_owned(),
        owner: (!owner_email.is_empty()).then(|| ContactRow {
            name: cell("assignment_owner").to_owned(),
            email: owner_email.to_owned(),
            brand: optional("owner_brand"),
        }),
        organization: optional("assignment_organization"),
        ministry: optional("assignment_ministry"),
        start_date,
        end_date,
        skill,
        colleague: ContactRow {
            name: cell("placement_colleague_name").to_owned(),
            email: colleague_email.to_owned(),
            brand: optional("colleague_brand"),
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const HEADER: &str = "assignment_name,assignment_description,assignment_owner,assignment_owner_email,assignment_organization,assignment_ministry,assignment_start_date,assignment_end_date,service_skill,placement_colleague_name,placement_colleague_email,colleague_brand";

    fn errors_of(err: &Error) -> Vec<String> {
        err.details()
            .and_then(|details| details.get("errors"))
            .and_then(|errors| serde_json::from_value(errors.clone()).ok())
            .unwrap_or_default()
    }

    #[rstest]
    fn parses_rows_with_optional_fields() {
        let content = format!(
            "{HEADER}\nDatateam,Analyse,Piet,piet@rijksoverheid.nl,DGDOO,BZK,01-02-2026,31-12-2026,Data engineer,Anna,anna@rijksoverheid.nl,Rijks ICT\n\
             Datateam,,,,,,,,,Bas,bas@rijksoverheid.nl,\n"
        );
        let plan = PlacementImportPlan::parse(&content).expect("valid import");
        assert_eq!(plan.rows.len(), 2);
        let first = plan.rows.first().expect("first row");
        assert_eq!(first.row, 2);
        assert_eq!(first.owner.as_ref().map(|o| o.email.as_str()), Some("piet@rijksoverheid.nl"));
        assert_eq!(first.start_date, NaiveDate::from_ymd_opt(2026, 2, 1));
        assert_eq!(first.skill.as_deref(), Some("Data engineer"));
        let second = plan.rows.get(1).expect("second row");
        assert!(second.owner.is_none());
        assert!(second.ministry.is_none());
        assert_eq!(plan.brand_names(), BTreeSet::from(["Rijks ICT"]));
    }

    #[rstest]
    #[case("", "CSV file is leeg of heeft geen headers.")]
    #[case("assignment_name,service_skill\n", "CSV mist kolommen: ")]
    fn rejects_missing_headers(#[case] content: &str, #[case] prefix: &str) {
        let err = PlacementImportPlan::parse(content).expect_err("invalid header");
        assert!(err.message().starts_with(prefix), "{}", err.message());
    }

    #[rstest]
    fn collects_errors_from_every_row() {
        let content = format!(
            "{HEADER}\n,x,,,,,2026-01-01,,,Anna,anna\n\
             Datateam,,,,,,01-06-2026,01-01-2026,,Bas,bas@rijksoverheid.nl,\n"
        );
        let err = PlacementImportPlan::parse(&content).expect_err("invalid rows");
        assert_eq!(
            errors_of(&err),
            [
                "Row 2: assignment_name is required",
                "Row 2: invalid email format 'anna'",
                "Row 2: assignment_start_date '2026-01-01' is not a DD-MM-YYYY date",
                "Row 3: assignment_end_date is before assignment_start_date",
            ]
        );
    }
}
