//! SQLite-backed assignment, service and placement adapter.
//!
//! Aggregates are assembled in memory from one query per table, all read in
//! one transaction and restricted to the rows the scope references. The
//! placement listing filters, orders and pages in SQL before loading the
//! rows of its page.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use diesel::dsl::{self, sql};
use diesel::prelude::*;
use diesel::sql_types::{Bool, Date, Nullable, Text};
use diesel::sqlite::Sqlite;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection as _, RunQueryDsl};

use crate::domain::ports::{AssignmentRepository, AssignmentRepositoryError};
use crate::domain::{
    Assignment, AssignmentAggregate, AssignmentDraft, AssignmentId, AssignmentOrganization,
    AssignmentStatus, ColleagueId, ColleagueSummary, LabelId, LinkedOrganization, Ministry,
    OrganizationId, PeriodWindow, Placement, PlacementAggregate, PlacementDraft, PlacementId,
    PlacementOrder, PlacementQuery, PlacementRecord, PlacementSlice, Service, ServiceAggregate,
    ServiceDraft, ServiceId, Skill,
};

use super::diesel_colleague_repository::colleague_tags;
use super::diesel_error_mapping::{collect_rows, map_diesel_error, map_pool_error};
use super::models::{
    AssignmentOrganizationRow, AssignmentRow, AssignmentValues, ColleagueRow, MinistryRow,
    NewAssignmentOrganizationRow, PlacementRow, PlacementValues, ServiceRow, ServiceValues,
    SkillRow,
};
use super::pool::{DbPool, SqliteConn};
use super::schema::{
    assignment_organizations, assignments, colleague_labels, colleagues, ministries,
    organizations, placements, services, skills,
};

/// Diesel-backed implementation of the assignment repository.
#[derive(Clone)]
pub struct DieselAssignmentRepository {
    pool: DbPool,
}

impl DieselAssignmentRepository {
    /// Create a new repository with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn assignment_values(draft: &AssignmentDraft) -> AssignmentValues<'_> {
    AssignmentValues {
        name: &draft.name,
        start_date: draft.start_date,
        end_date: draft.end_date,
        status: draft.status.as_str(),
        ministry_id: draft.ministry_id,
        owner_id: draft.owner_id,
        extra_info: &draft.extra_info,
    }
}

pub(super) fn service_values(draft: &ServiceDraft) -> ServiceValues<'_> {
    ServiceValues {
        description: &draft.description,
        skill_id: draft.skill_id,
        cost_type: draft.cost_type.as_str(),
        fixed_cost: draft.fixed_cost,
        hours_per_week: draft.hours_per_week,
        period_source: draft.period_source.as_str(),
        specific_start_date: draft.specific_start_date,
        specific_end_date: draft.specific_end_date,
    }
}

pub(super) const fn placement_values(draft: &PlacementDraft) -> PlacementValues {
    PlacementValues {
        colleague_id: draft.colleague_id,
        service_id: draft.service_id,
        hours_per_week: draft.hours_per_week,
        period_source: draft.period_source.as_str(),
        specific_start_date: draft.specific_start_date,
        specific_end_date: draft.specific_end_date,
    }
}

async fn write_links(
    conn: &mut SqliteConn,
    assignment_id: AssignmentId,
    links: &[AssignmentOrganization],
) -> QueryResult<()> {
    diesel::delete(
        assignment_organizations::table
            .filter(assignment_organizations::assignment_id.eq(assignment_id)),
    )
    .execute(conn)
    .await?;
    for link in links {
        diesel::insert_into(assignment_organizations::table)
            .values(NewAssignmentOrganizationRow {
                assignment_id,
                organization_id: link.organization_id,
                role: link.role.as_str(),
                effective_from: link.effective_from,
                effective_until: link.effective_until,
            })
            .execute(conn)
            .await?;
    }
    Ok(())
}

/// Raw rows behind a set of aggregates.
struct AggregateRows {
    assignments: Vec<AssignmentRow>,
    links: Vec<(AssignmentOrganizationRow, String, String)>,
    services: Vec<ServiceRow>,
    placements: Vec<PlacementRow>,
    colleagues: Vec<ColleagueRow>,
    colleague_labels: HashMap<ColleagueId, BTreeSet<LabelId>>,
    skills: Vec<SkillRow>,
    ministries: Vec<MinistryRow>,
}

/// Which aggregates to load.
#[derive(Clone, Copy)]
enum RowScope<'a> {
    All,
    Assignment(AssignmentId),
    /// These placements with only their own service and assignment.
    Placements(&'a [PlacementId]),
}

fn distinct_ids<T>(rows: &[T], id: impl Fn(&T) -> Option<i32>) -> Vec<i32> {
    rows.iter()
        .filter_map(id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Rows for `scope`, plus the colleagues, skills and ministries they
/// reference. Run inside a transaction so every table is read from the same
/// snapshot.
async fn load_rows(conn: &mut SqliteConn, scope: RowScope<'_>) -> QueryResult<AggregateRows> {
    let mut placement_query = placements::table
        .inner_join(services::table)
        .select(PlacementRow::as_select())
        .order(placements::id.asc())
        .into_boxed();
    match scope {
        RowScope::All => {}
        RowScope::Assignment(id) => {
            placement_query = placement_query.filter(services::assignment_id.eq(id));
        }
        RowScope::Placements(ids) => {
            placement_query = placement_query.filter(placements::id.eq_any(ids.to_vec()));
        }
    }
    let placements: Vec<PlacementRow> = placement_query.load(conn).await?;

    let mut service_query = services::table
        .select(ServiceRow::as_select())
        .order(services::id.asc())
        .into_boxed();
    match scope {
        RowScope::All => {}
        RowScope::Assignment(id) => {
            service_query = service_query.filter(services::assignment_id.eq(id));
        }
        RowScope::Placements(_) => {
            let ids = distinct_ids(&placements, |row| Some(row.service_id));
            service_query = service_query.filter(services::id.eq_any(ids));
        }
    }
    let services: Vec<ServiceRow> = service_query.load(conn).await?;

    let mut assignment_query = assignments::table
        .select(AssignmentRow::as_select())
        .order(assignments::id.asc())
        .into_boxed();
    let mut link_query = assignment_organizations::table
        .inner_join(organizations::table)
        .select((
            AssignmentOrganizationRow::as_select(),
            organizations::name,
            organizations::abbreviation,
        ))
        .order((
            assignment_organizations::assignment_id.asc(),
            assignment_organizations::id.asc(),
        ))
        .into_boxed();
    match scope {
        RowScope::All => {}
        RowScope::Assignment(id) => {
            assignment_query = assignment_query.filter(assignments::id.eq(id));
            link_query = link_query.filter(assignment_organizations::assignment_id.eq(id));
        }
        RowScope::Placements(_) => {
            let ids = distinct_ids(&services, |row| Some(row.assignment_id));
            assignment_query = assignment_query.filter(assignments::id.eq_any(ids.clone()));
            link_query = link_query.filter(assignment_organizations::assignment_id.eq_any(ids));
        }
    }
    let assignments: Vec<AssignmentRow> = assignment_query.load(conn).await?;
    let links = link_query.load(conn).await?;

    let colleague_ids: Vec<ColleagueId> = placements
        .iter()
        .map(|row| row.colleague_id)
        .chain(assignments.iter().filter_map(|row| row.owner_id))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let colleagues = colleagues::table
        .filter(colleagues::id.eq_any(colleague_ids.clone()))
        .select(ColleagueRow::as_select())
        .load(conn)
        .await?;
    let (_, colleague_labels) = colleague_tags(conn, colleague_ids).await?;
    let skills = skills::table
        .filter(skills::id.eq_any(distinct_ids(&services, |row| row.skill_id)))
        .select(SkillRow::as_select())
        .load(conn)
        .await?;
    let ministries = ministries::table
        .filter(ministries::id.eq_any(distinct_ids(&assignments, |row| row.ministry_id)))
        .select(MinistryRow::as_select())
        .load(conn)
        .await?;

    Ok(AggregateRows {
        assignments,
        links,
        services,
        placements,
        colleagues,
        colleague_labels,
        skills,
        ministries,
    })
}

async fn load_aggregates(
    conn: &mut SqliteConn,
    scope: RowScope<'_>,
) -> Result<Vec<AssignmentAggregate>, AssignmentRepositoryError> {
    let rows = conn
        .transaction(|conn| load_rows(conn, scope).scope_boxed())
        .await
        .map_err(|err| map_diesel_error(err, "load assignments"))?;
    assemble(rows)
}

fn assemble(rows: AggregateRows) -> Result<Vec<AssignmentAggregate>, AssignmentRepositoryError> {
    let mut colleague_labels = rows.colleague_labels;
    let summaries: HashMap<i32, ColleagueSummary> = rows
        .colleagues
        .iter()
        .map(|row| {
            let mut summary = row.summary();
            summary.label_ids = colleague_labels.remove(&row.id).unwrap_or_default();
            (row.id, summary)
        })
        .collect();
    let skills: HashMap<i32, Skill> = rows
        .skills
        .into_iter()
        .map(|row| (row.id, Skill::from(row)))
        .collect();
    let ministries: HashMap<i32, Ministry> = rows
        .ministries
        .into_iter()
        .map(|row| (row.id, Ministry::from(row)))
        .collect();

    let mut placements_by_service: HashMap<ServiceId, Vec<PlacementAggregate>> = HashMap::new();
    for placement in collect_rows::<Placement, _, AssignmentRepositoryError, _>(
        rows.placements,
        Placement::try_from,
    )? {
        let colleague = summaries.get(&placement.colleague_id).cloned().ok_or_else(|| {
            AssignmentRepositoryError::query(format!(
                "placement {} references missing colleague",
                placement.id
            ))
        })?;
        placements_by_service
            .entry(placement.service_id)
            .or_default()
            .push(PlacementAggregate {
                placement,
                colleague,
            });
    }

    let mut services_by_assignment: HashMap<AssignmentId, Vec<ServiceAggregate>> = HashMap::new();
    for service in
        collect_rows::<Service, _, AssignmentRepositoryError, _>(rows.services, Service::try_from)?
    {
        let skill = service.skill_id.and_then(|id| skills.get(&id).cloned());
        let placements = placements_by_service.remove(&service.id).unwrap_or_default();
        services_by_assignment
            .entry(service.assignment_id)
            .or_default()
            .push(ServiceAggregate {
                service,
                skill,
                placements,
            });
    }

    let mut links_by_assignment: HashMap<AssignmentId, Vec<LinkedOrganization>> = HashMap::new();
    for (row, name, abbreviation) in rows.links {
        let link =
            AssignmentOrganization::try_from(&row).map_err(AssignmentRepositoryError::query)?;
        links_by_assignment
            .entry(row.assignment_id)
            .or_default()
            .push(LinkedOrganization {
                organization_id: link.organization_id,
                name,
                abbreviation,
                role: link.role,
                effective_from: link.effective_from,
                effective_until: link.effective_until,
            });
    }

    collect_rows::<Assignment, _, AssignmentRepositoryError, _>(
        rows.assignments,
        Assignment::try_from,
    )?
    .into_iter()
    .map(|assignment| {
        Ok(AssignmentAggregate {
            ministry: assignment
                .ministry_id
                .and_then(|id| ministries.get(&id).cloned()),
            owner: assignment
                .owner_id
                .and_then(|id| summaries.get(&id).cloned()),
            organizations: links_by_assignment
                .remove(&assignment.id)
                .unwrap_or_default(),
            services: services_by_assignment
                .remove(&assignment.id)
                .unwrap_or_default(),
            assignment,
        })
    })
    .collect()
}

diesel::define_sql_function! {
    /// SQLite `lower`; folds ASCII letters only.
    fn lower(text: Text) -> Text;
}

/// Start of a placement's resolved period: its own dates, else the
/// service's, else the assignment's.
const RESOLVED_START: &str = "(CASE WHEN placements.period_source = 'PLACEMENT' \
     THEN placements.specific_start_date \
     WHEN services.period_source = 'SERVICE' THEN services.specific_start_date \
     ELSE assignments.start_date END)";

/// End counterpart of [`RESOLVED_START`].
const RESOLVED_END: &str = "(CASE WHEN placements.period_source = 'PLACEMENT' \
     THEN placements.specific_end_date \
     WHEN services.period_source = 'SERVICE' THEN services.specific_end_date \
     ELSE assignments.end_date END)";

const SKILL_NAME: &str =
    "(SELECT lower(skills.name) FROM skills WHERE skills.id = services.skill_id)";

type ListingSource = dsl::InnerJoin<
    dsl::InnerJoin<placements::table, dsl::InnerJoin<services::table, assignments::table>>,
    colleagues::table,
>;
type ListingQuery = dsl::IntoBoxed<'static, ListingSource, Sqlite>;

/// `%text%`, with the LIKE wildcards in `text` escaped by a backslash.
fn contains_pattern(text: &str) -> String {
    let mut pattern = String::from("%");
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Placements on filled assignments matching every predicate of `query`.
fn matching_placements(query: &PlacementQuery) -> ListingQuery {
    let mut rows: ListingQuery = placements::table
        .inner_join(services::table.inner_join(assignments::table))
        .inner_join(colleagues::table)
        .into_boxed()
        .filter(assignments::status.eq(AssignmentStatus::Ingevuld.as_str()));

    if let Some(search) = &query.search {
        let pattern = contains_pattern(search);
        let matching_organizations = organizations::table
            .filter(
                organizations::name
                    .like(pattern.clone())
                    .escape('\\')
                    .or(organizations::abbreviation.like(pattern.clone()).escape('\\')),
            )
            .select(organizations::id);
        let matching_ministries = ministries::table
            .filter(
                ministries::name
                    .like(pattern.clone())
                    .escape('\\')
                    .or(ministries::abbreviation.like(pattern.clone()).escape('\\')),
            )
            .select(ministries::id.nullable());
        rows = rows.filter(
            colleagues::name
                .like(pattern.clone())
                .escape('\\')
                .or(assignments::name.like(pattern.clone()).escape('\\'))
                .or(assignments::extra_info.like(pattern).escape('\\'))
                .or(assignments::id.eq_any(
                    assignment_organizations::table
                        .filter(assignment_organizations::organization_id.eq_any(matching_organizations))
                        .select(assignment_organizations::assignment_id),
                ))
                .or(assignments::ministry_id.eq_any(matching_ministries)),
        );
    }
    if !query.skill_ids.is_empty() {
        let ids: Vec<_> = query.skill_ids.iter().copied().collect();
        rows = rows.filter(services::skill_id.eq_any(ids));
    }
    for group in &query.label_groups {
        let ids: Vec<_> = group.iter().copied().collect();
        rows = rows.filter(
            placements::colleague_id.eq_any(
                colleague_labels::table
                    .filter(colleague_labels::label_id.eq_any(ids))
                    .select(colleague_labels::colleague_id),
            ),
        );
    }
    if let Some(organization_ids) = &query.organization_ids {
        let ids: Vec<_> = organization_ids.iter().copied().collect();
        rows = rows.filter(
            assignments::id.eq_any(
                assignment_organizations::table
                    .filter(assignment_organizations::organization_id.eq_any(ids))
                    .select(assignment_organizations::assignment_id),
            ),
        );
    }
    if !query.ministry_ids.is_empty() {
        let ids: Vec<_> = query.ministry_ids.iter().copied().collect();
        rows = rows.filter(assignments::ministry_id.eq_any(ids));
    }
    match query.window {
        PeriodWindow::Overlapping(range) => rows.filter(
            sql::<Bool>(&format!("{RESOLVED_START} <= "))
                .bind::<Date, _>(range.to)
                .sql(&format!(" AND {RESOLVED_END} >= "))
                .bind::<Date, _>(range.from),
        ),
        PeriodWindow::EndingFrom(date) => rows.filter(
            sql::<Bool>(&format!("({RESOLVED_END} IS NULL OR {RESOLVED_END} >= "))
                .bind::<Date, _>(date)
                .sql(")"),
        ),
    }
}

/// Apply `order`, falling back to the placement id.
fn ordered(rows: ListingQuery, order: PlacementOrder) -> ListingQuery {
    match order {
        PlacementOrder::StartDate => rows.order_by((
            assignments::start_date.is_null().asc(),
            assignments::start_date.desc(),
            placements::id.asc(),
        )),
        PlacementOrder::ColleagueName => {
            rows.order_by((lower(colleagues::name).asc(), placements::id.asc()))
        }
        PlacementOrder::AssignmentName => {
            rows.order_by((lower(assignments::name).asc(), placements::id.asc()))
        }
        PlacementOrder::SkillName => rows.order_by((
            sql::<Bool>(&format!("{SKILL_NAME} IS NULL")).asc(),
            sql::<Nullable<Text>>(SKILL_NAME).asc(),
            placements::id.asc(),
        )),
    }
}

#[async_trait]
impl AssignmentRepository for DieselAssignmentRepository {
    async fn list_aggregates(&self) -> Result<Vec<AssignmentAggregate>, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        load_aggregates(&mut conn, RowScope::All).await
    }

    async fn list_placements(
        &self,
        query: &PlacementQuery,
    ) -> Result<PlacementSlice, AssignmentRepositoryError> {
        let limit = i64::try_from(query.limit)
            .map_err(|_| AssignmentRepositoryError::query("page size exceeds i64 range"))?;
        let offset = i64::try_from(query.offset)
            .map_err(|_| AssignmentRepositoryError::query("page offset exceeds i64 range"))?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let (total, page_ids, rows) = conn
            .transaction(|conn| {
                async move {
                    let total: i64 = matching_placements(query).count().get_result(conn).await?;
                    let page_ids: Vec<PlacementId> = ordered(matching_placements(query), query.order)
                        .select(placements::id)
                        .limit(limit)
                        .offset(offset)
                        .load(conn)
                        .await?;
                    let rows = load_rows(conn, RowScope::Placements(&page_ids)).await?;
                    Ok::<_, diesel::result::Error>((total, page_ids, rows))
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_diesel_error(err, "list placements"))?;
        let mut records = PlacementRecord::flatten(&assemble(rows)?);
        records.sort_by_key(|record| page_ids.iter().position(|id| *id == record.placement_id));
        Ok(PlacementSlice {
            records,
            total: usize::try_from(total).unwrap_or_default(),
        })
    }

    async fn client_organization_ids(
        &self,
    ) -> Result<BTreeSet<OrganizationId>, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let ids: Vec<OrganizationId> = assignment_organizations::table
            .inner_join(assignments::table)
            .filter(assignments::status.eq(AssignmentStatus::Ingevuld.as_str()))
            .select(assignment_organizations::organization_id)
            .distinct()
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list client organisations"))?;
        Ok(ids.into_iter().collect())
    }

    async fn find_aggregate(
        &self,
        id: AssignmentId,
    ) -> Result<Option<AssignmentAggregate>, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        Ok(load_aggregates(&mut conn, RowScope::Assignment(id))
            .await?
            .into_iter()
            .next())
    }

    async fn create(
        &self,
        draft: &AssignmentDraft,
    ) -> Result<AssignmentId, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                let id: AssignmentId = diesel::insert_into(assignments::table)
                    .values(assignment_values(draft))
                    .returning(assignments::id)
                    .get_result(conn)
                    .await?;
                write_links(conn, id, &draft.organizations).await?;
                Ok::<_, diesel::result::Error>(id)
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_diesel_error(err, "create assignment"))
    }

    async fn update(
        &self,
        id: AssignmentId,
        draft: &AssignmentDraft,
    ) -> Result<bool, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        conn.transaction(|conn| {
            async move {
                let updated = diesel::update(assignments::table.find(id))
                    .set(assignment_values(draft))
                    .execute(conn)
                    .await?;
                if updated > 0 {
                    write_links(conn, id, &draft.organizations).await?;
                }
                Ok::<_, diesel::result::Error>(updated > 0)
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_diesel_error(err, "update assignment"))
    }

    async fn set_status(
        &self,
        id: AssignmentId,
        status: AssignmentStatus,
    ) -> Result<bool, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(assignments::table.find(id))
            .set(assignments::status.eq(status.as_str()))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "set assignment status"))?;
        Ok(updated > 0)
    }

    async fn delete(&self, id: AssignmentId) -> Result<bool, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(assignments::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "delete assignment"))?;
        Ok(deleted > 0)
    }

    async fn find_service(
        &self,
        id: ServiceId,
    ) -> Result<Option<Service>, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ServiceRow> = services::table
            .find(id)
            .select(ServiceRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find service"))?;
        row.map(Service::try_from)
            .transpose()
            .map_err(AssignmentRepositoryError::query)
    }

    async fn create_service(
        &self,
        assignment_id: AssignmentId,
        draft: &ServiceDraft,
    ) -> Result<Service, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: ServiceRow = diesel::insert_into(services::table)
            .values((
                services::assignment_id.eq(assignment_id),
                service_values(draft),
            ))
            .returning(ServiceRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "create service"))?;
        Service::try_from(row).map_err(AssignmentRepositoryError::query)
    }

    async fn update_service(
        &self,
        id: ServiceId,
        draft: &ServiceDraft,
    ) -> Result<Option<Service>, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ServiceRow> = diesel::update(services::table.find(id))
            .set(service_values(draft))
            .returning(ServiceRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "update service"))?;
        row.map(Service::try_from)
            .transpose()
            .map_err(AssignmentRepositoryError::query)
    }

    async fn delete_service(&self, id: ServiceId) -> Result<bool, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(services::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "delete service"))?;
        Ok(deleted > 0)
    }

    async fn find_placement(
        &self,
        id: PlacementId,
    ) -> Result<Option<Placement>, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PlacementRow> = placements::table
            .find(id)
            .select(PlacementRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find placement"))?;
        row.map(Placement::try_from)
            .transpose()
            .map_err(AssignmentRepositoryError::query)
    }

    async fn create_placement(
        &self,
        draft: &PlacementDraft,
    ) -> Result<Placement, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: PlacementRow = diesel::insert_into(placements::table)
            .values(placement_values(draft))
            .returning(PlacementRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "create placement"))?;
        Placement::try_from(row).map_err(AssignmentRepositoryError::query)
    }

    async fn update_placement(
        &self,
        id: PlacementId,
        draft: &PlacementDraft,
    ) -> Result<Option<Placement>, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<PlacementRow> = diesel::update(placements::table.find(id))
            .set(placement_values(draft))
            .returning(PlacementRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "update placement"))?;
        row.map(Placement::try_from)
            .transpose()
            .map_err(AssignmentRepositoryError::query)
    }

    async fn delete_placement(&self, id: PlacementId) -> Result<bool, AssignmentRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(placements::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "delete placement"))?;
        Ok(deleted > 0)
    }
}
