//! User import: accounts with an optional brand label and role flags.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use super::{Sheet, rejected};
use crate::domain::{AllowedEmailDomains, Error, Role, is_valid_email};

const REQUIRED: [&str; 3] = ["first_name", "last_name", "email"];
const ROLE_COLUMNS: [(&str, Role); 3] = [
    ("Beheerder", Role::Beheerder),
    ("Consultant", Role::Consultant),
    ("BDM", Role::BusinessDevelopmentManager),
];

/// Validated row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserImportRow {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// E-mail address; existing accounts are skipped.
    pub email: String,
    /// Brand label in the `Merk` category.
    pub brand: Option<String>,
    /// Roles flagged with `y`.
    pub roles: BTreeSet<Role>,
}

/// Validated import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserImportPlan {
    /// Rows in file order.
    pub rows: Vec<UserImportRow>,
}

/// What an applied import created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct UserImportReport {
    /// New accounts.
    pub users_created: usize,
    /// Number of brand labels created.
    pub labels_created: usize,
    /// Names of the brand labels created.
    pub created_labels: Vec<String>,
    /// Skipped rows.
    pub warnings: Vec<String>,
}

impl UserImportPlan {
    /// Parse and validate `content` against the e-mail allow list.
    ///
    /// # Errors
    /// Returns an invalid-request error listing every problem.
    pub fn parse(content: &str, domains: &AllowedEmailDomains) -> Result<Self, Error> {
        let Some(sheet) = Sheet::read(content).map_err(rejected)? else {
            return Err(rejected(vec!["CSV file is empty or has no headers.".to_owned()]));
        };
        let missing = sheet.columns.missing(&REQUIRED);
        if !missing.is_empty() {
            return Err(rejected(vec![format!(
                "Missing required columns: {}",
                missing.join(", ")
            )]));
        }

        let mut rows = Vec::new();
        let mut errors = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for (row, record) in &sheet.records {
            let cell = |name: &str| sheet.columns.get(record, name);
            let mut row_errors = Vec::new();
            for name in REQUIRED {
                if cell(name).is_empty() {
                    row_errors.push(format!("Row {row}: {name} is required"));
                }
            }
            let email = cell("email");
            if !email.is_empty() {
                if !is_valid_email(email) {
                    row_errors.push(format!("Row {row}: invalid email format '{email}'"));
                }
                if !domains.allows(email) {
                    row_errors.push(format!(
                        "Row {row}: email '{email}' has invalid domain. Allowed: {}",
                        domains.describe()
                    ));
                }
            }
            let mut roles = BTreeSet::new();
            for (column, role) in ROLE_COLUMNS {
                if !sheet.columns.contains(column) {
                    continue;
                }
                let raw = cell(column);
                match raw.to_lowercase().as_str() {
                    "y" => {
                        roles.insert(role);
                    }
                    "n" | "" => {}
                    _ => row_errors.push(format!(
                        "Row {row}: {column} must be 'y' or 'n', got '{raw}'"
                    )),
                }
            }
            if !email.is_empty() && !seen.insert(email.to_owned()) {
                row_errors.push(format!("Row {row}: duplicate email '{email}' in CSV"));
            }

            if row_errors.is_empty() {
                rows.push(UserImportRow {
                    first_name: cell("first_name").to_owned(),
                    last_name: cell("last_name").to_owned(),
                    email: email.to_owned(),
                    brand: Some(cell("brand")).filter(|b| !b.is_empty()).map(str::to_owned),
                    roles,
                });
            } else {
                errors.append(&mut row_errors);
            }
        }
        if errors.is_empty() {
            Ok(Self { rows })
        } else {
            Err(rejected(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn errors_of(err: &Error) -> Vec<String> {
        err.details()
            .and_then(|details| details.get("errors"))
            .and_then(|errors| serde_json::from_value(errors.clone()).ok())
            .unwrap_or_default()
    }

    #[rstest]
    fn parses_roles_and_brand() {
        let content = "first_name,last_name,email,brand,Beheerder,Consultant,BDM\n\
                       Jan,Jansen,jan@rijksoverheid.nl,Rijks ICT,y,N,\n\
                       Els,Smit,els@rijksoverheid.nl,,,,Y\n";
        let plan = UserImportPlan::parse(content, &AllowedEmailDomains::parse("@rijksoverheid.nl"))
            .expect("valid import");
        let roles: Vec<_> = plan.rows.iter().map(|row| row.roles.clone()).collect();
        assert_eq!(
            roles,
            [
                BTreeSet::from([Role::Beheerder]),
                BTreeSet::from([Role::BusinessDevelopmentManager]),
            ]
        );
        assert_eq!(
            plan.rows.first().and_then(|row| row.brand.as_deref()),
            Some("Rijks ICT")
        );
    }

    #[rstest]
    fn reports_every_row_problem() {
        let content = "first_name,last_name,email,Beheerder\n\
                       ,Jansen,jan@example.com,ja\n\
                       Els,Smit,els@rijksoverheid.nl,\n\
                       Els,Smit,els@rijksoverheid.nl,n\n";
        let err = UserImportPlan::parse(content, &AllowedEmailDomains::parse("@rijksoverheid.nl"))
            .expect_err("invalid rows");
        assert_eq!(
            errors_of(&err),
            [
                "Row 2: first_name is required",
                "Row 2: email 'jan@example.com' has invalid domain. Allowed: @rijksoverheid.nl",
                "Row 2: Beheerder must be 'y' or 'n', got 'ja'",
                "Row 4: duplicate email 'els@rijksoverheid.nl' in CSV",
            ]
        );
    }

    #[rstest]
    fn requires_name_and_email_columns() {
        let err = UserImportPlan::parse("first_name,brand\n", &AllowedEmailDomains::default())
            .expect_err("missing columns");
        assert_eq!(err.message(), "Missing required columns: email, last_name");
    }
}
