//! SQLite-backed CSV import writer.
//!
//! Each plan is applied inside one transaction with get-or-create semantics:
//! rows that match existing records reuse them, and any failure rolls the
//! whole import back.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};
use tracing::warn;

use crate::domain::ports::{ImportRepository, ImportRepositoryError};
use crate::domain::{
    AssignmentOrganizationRole, AssignmentStatus, BRAND_CATEGORY, ContactRow, DEFAULT_LABELS,
    LabelCategoryId, LabelId, PlacementImportPlan, PlacementImportReport, PlacementImportRow,
    Source, UserImportPlan, UserImportReport,
};

use super::diesel_colleague_repository::user_with_email;
use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::diesel_user_repository::{claim_colleague, write_memberships};
use super::models::{AssignmentValues, NewAssignmentOrganizationRow, NewColleagueRow, UserValues};
use super::pool::{DbPool, SqliteConn};
use super::schema::{
    assignment_organizations, assignments, colleague_labels, colleagues, label_categories,
    labels, ministries, organizations, placements, services, skills, users,
};

const BRAND_FALLBACK_COLOR: &str = "#DCE3EA";

/// Diesel-backed implementation of the import repository.
#[derive(Clone)]
pub struct DieselImportRepository {
    pool: DbPool,
}

impl DieselImportRepository {
    /// Create a new repository with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn brand_color() -> &'static str {
    DEFAULT_LABELS
        .iter()
        .find(|category| category.name == BRAND_CATEGORY)
        .map_or(BRAND_FALLBACK_COLOR, |category| category.color)
}

async fn brand_category(conn: &mut SqliteConn) -> QueryResult<LabelCategoryId> {
    diesel::insert_into(label_categories::table)
        .values((
            label_categories::name.eq(BRAND_CATEGORY),
            label_categories::color.eq(brand_color()),
        ))
        .on_conflict(label_categories::name)
        .do_nothing()
        .execute(conn)
        .await?;
    label_categories::table
        .filter(label_categories::name.eq(BRAND_CATEGORY))
        .select(label_categories::id)
        .first(conn)
        .await
}

/// Brand labels resolved during one import.
struct Brands {
    category_id: LabelCategoryId,
    resolved: HashMap<String, LabelId>,
    created: Vec<String>,
}

impl Brands {
    async fn load(conn: &mut SqliteConn) -> QueryResult<Self> {
        Ok(Self {
            category_id: brand_category(conn).await?,
            resolved: HashMap::new(),
            created: Vec::new(),
        })
    }

    async fn label(&mut self, conn: &mut SqliteConn, name: &str) -> QueryResult<LabelId> {
        if let Some(id) = self.resolved.get(name) {
            return Ok(*id);
        }
        let inserted = diesel::insert_into(labels::table)
            .values((labels::category_id.eq(self.category_id), labels::name.eq(name)))
            .on_conflict((labels::category_id, labels::name))
            .do_nothing()
            .execute(conn)
            .await?;
        let id: LabelId = labels::table
            .filter(labels::category_id.eq(self.category_id))
            .filter(labels::name.eq(name))
            .select(labels::id)
            .first(conn)
            .await?;
        if inserted > 0 {
            self.created.push(name.to_owned());
        }
        self.resolved.insert(name.to_owned(), id);
        Ok(id)
    }
}

/// Colleague by e-mail, created with the contact's brand when missing.
async fn contact_colleague(
    conn: &mut SqliteConn,
    contact: &ContactRow,
    brands: &mut Brands,
    report: &mut PlacementImportReport,
) -> QueryResult<i32> {
    let existing: Option<i32> = colleagues::table
        .filter(colleagues::email.eq(&contact.email))
        .select(colleagues::id)
        .order(colleagues::id.asc())
        .first(conn)
        .await
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }
    let user_id = user_with_email(conn, &contact.email).await?;
    let id: i32 = diesel::insert_into(colleagues::table)
        .values(NewColleagueRow {
            user_id,
            name: &contact.name,
            email: &contact.email,
            source: Source::Wies.as_str(),
            source_id: "",
            source_url: "",
        })
        .returning(colleagues::id)
        .get_result(conn)
        .await?;
    if let Some(brand) = contact.brand.as_deref() {
        let label_id = brands.label(conn, brand).await?;
        diesel::insert_into(colleague_labels::table)
            .values((
                colleague_labels::colleague_id.eq(id),
                colleague_labels::label_id.eq(label_id),
            ))
            .execute(conn)
            .await?;
    }
    report.colleagues_created += 1;
    Ok(id)
}

async fn ministry(
    conn: &mut SqliteConn,
    name: &str,
    report: &mut PlacementImportReport,
) -> QueryResult<i32> {
    let inserted = diesel::insert_into(ministries::table)
        .values((ministries::name.eq(name), ministries::abbreviation.eq(name)))
        .on_conflict(ministries::name)
        .do_nothing()
        .execute(conn)
        .await?;
    report.ministries_created += inserted;
    ministries::table
        .filter(ministries::name.eq(name))
        .select(ministries::id)
        .first(conn)
        .await
}

async fn skill(
    conn: &mut SqliteConn,
    name: &str,
    report: &mut PlacementImportReport,
) -> QueryResult<i32> {
    let inserted = diesel::insert_into(skills::table)
        .values(skills::name.eq(name))
        .on_conflict(skills::name)
        .do_nothing()
        .execute(conn)
        .await?;
    report.skills_created += inserted;
    skills::table
        .filter(skills::name.eq(name))
        .select(skills::id)
        .first(conn)
        .await
}

/// Organisation whose name or abbreviation matches, ignoring case.
fn match_organization(index: &[(i32, String, String)], needle: &str) -> Option<i32> {
    let lower = needle.to_lowercase();
    index
        .iter()
        .find(|(_, name, abbreviation)| {
            name.to_lowercase() == lower || abbreviation.to_lowercase() == lower
        })
        .map(|(id, _, _)| *id)
}

async fn assignment(
    conn: &mut SqliteConn,
    row: &PlacementImportRow,
    owner_id: Option<i32>,
    ministry_id: Option<i32>,
    organization_index: &[(i32, String, String)],
    report: &mut PlacementImportReport,
) -> QueryResult<i32> {
    let existing: Option<i32> = assignments::table
        .filter(assignments::source.eq(Source::Wies.as_str()))
        .filter(assignments::name.eq(&row.assignment_name))
        .select(assignments::id)
        .order(assignments::id.asc())
        .first(conn)
        .await
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }
    let id: i32 = diesel::insert_into(assignments::table)
        .values(AssignmentValues {
            name: &row.assignment_name,
            start_date: row.start_date,
            end_date: row.end_date,
            status: AssignmentStatus::Ingevuld.as_str(),
            ministry_id,
            owner_id,
            extra_info: &row.assignment_description,
        })
        .returning(assignments::id)
        .get_result(conn)
        .await?;
    report.assignments_created += 1;

    if let Some(client) = row.organization.as_deref() {
        if let Some(organization_id) = match_organization(organization_index, client) {
            diesel::insert_into(assignment_organizations::table)
                .values(NewAssignmentOrganizationRow {
                    assignment_id: id,
                    organization_id,
                    role: AssignmentOrganizationRole::Primary.as_str(),
                    effective_from: None,
                    effective_until: None,
                })
                .execute(conn)
                .await?;
        } else {
            warn!(row = row.row, organization = client, "import references unknown organisation");
            report.warnings.push(format!(
                "Rij {}: organisatie '{client}' niet gevonden, opdracht zonder opdrachtgever aangemaakt.",
                row.row
            ));
        }
    }
    Ok(id)
}

async fn service(
    conn: &mut SqliteConn,
    assignment_id: i32,
    skill_id: Option<i32>,
    report: &mut PlacementImportReport,
) -> QueryResult<i32> {
    let existing: Option<i32> = services::table
        .filter(services::assignment_id.eq(assignment_id))
        .filter(services::skill_id.is(skill_id))
        .filter(services::source.eq(Source::Wies.as_str()))
        .select(services::id)
        .order(services::id.asc())
        .first(conn)
        .await
        .optional()?;
    if let Some(id) = existing {
        return Ok(id);
    }
    report.services_created += 1;
    diesel::insert_into(services::table)
        .values((
            services::assignment_id.eq(assignment_id),
            services::skill_id.eq(skill_id),
            services::description.eq(""),
        ))
        .returning(services::id)
        .get_result(conn)
        .await
}

async fn placement(
    conn: &mut SqliteConn,
    colleague_id: i32,
    service_id: i32,
    report: &mut PlacementImportReport,
) -> QueryResult<()> {
    let existing: Option<i32> = placements::table
        .filter(placements::colleague_id.eq(colleague_id))
        .filter(placements::service_id.eq(service_id))
        .filter(placements::source.eq(Source::Wies.as_str()))
        .select(placements::id)
        .first(conn)
        .await
        .optional()?;
    if existing.is_none() {
        diesel::insert_into(placements::table)
            .values((
                placements::colleague_id.eq(colleague_id),
                placements::service_id.eq(service_id),
            ))
            .execute(conn)
            .await?;
        report.placements_created += 1;
    }
    Ok(())
}

async fn apply_placements(
    conn: &mut SqliteConn,
    plan: &PlacementImportPlan,
) -> QueryResult<PlacementImportReport> {
    let mut report = PlacementImportReport::default();
    let mut brands = Brands::load(conn).await?;
    let organization_index: Vec<(i32, String, String)> = organizations::table
        .select((
            organizations::id,
            organizations::name,
            organizations::abbreviation,
        ))
        .order(organizations::id.asc())
        .load(conn)
        .await?;

    for row in &plan.rows {
        let owner_id = match row.owner.as_ref() {
            Some(owner) => Some(contact_colleague(conn, owner, &mut brands, &mut report).await?),
            None => None,
        };
        let ministry_id = match row.ministry.as_deref() {
            Some(name) => Some(ministry(conn, name, &mut report).await?),
            None => None,
        };
        let assignment_id = assignment(
            conn,
            row,
            owner_id,
            ministry_id,
            &organization_index,
            &mut report,
        )
        .await?;
        let skill_id = match row.skill.as_deref() {
            Some(name) => Some(skill(conn, name, &mut report).await?),
            None => None,
        };
        let service_id = service(conn, assignment_id, skill_id, &mut report).await?;
        let colleague_id = contact_colleague(conn, &row.colleague, &mut brands, &mut report).await?;
        placement(conn, colleague_id, service_id, &mut report).await?;
    }
    Ok(report)
}

async fn apply_users(
    conn: &mut SqliteConn,
    plan: &UserImportPlan,
) -> QueryResult<UserImportReport> {
    let mut report = UserImportReport::default();
    let mut brands = Brands::load(conn).await?;
    for row in &plan.rows {
        let mut label_ids = BTreeSet::new();
        if let Some(brand) = row.brand.as_deref() {
            label_ids.insert(brands.label(conn, brand).await?);
        }
        let existing: Option<i32> = users::table
            .filter(users::email.eq(&row.email))
            .select(users::id)
            .first(conn)
            .await
            .optional()?;
        if existing.is_some() {
            report
                .warnings
                .push(format!("User with email '{}' already exists, skipped", row.email));
            continue;
        }
        let user_id: i32 = diesel::insert_into(users::table)
            .values(UserValues {
                email: &row.email,
                first_name: &row.first_name,
                last_name: &row.last_name,
            })
            .returning(users::id)
            .get_result(conn)
            .await?;
        write_memberships(conn, user_id, &row.roles, &label_ids).await?;
        claim_colleague(conn, user_id, &row.email).await?;
        report.users_created += 1;
    }
    report.labels_created = brands.created.len();
    report.created_labels = brands.created;
    Ok(report)
}

#[async_trait]
impl ImportRepository for DieselImportRepository {
    async fn import_placements(
        &self,
        plan: &PlacementImportPlan,
    ) -> Result<PlacementImportReport, ImportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| async move { apply_placements(conn, plan).await }.scope_boxed())
            .await
            .map_err(|err| map_diesel_error(err, "import placements"))
    }

    async fn import_users(
        &self,
        plan: &UserImportPlan,
    ) -> Result<UserImportReport, ImportRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| async move { apply_users(conn, plan).await }.scope_boxed())
            .await
            .map_err(|err| map_diesel_error(err, "import users"))
    }
}
