//! SQLite-backed organisation adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{OrganizationRepository, OrganizationRepositoryError};
use crate::domain::{Organization, OrganizationDraft, OrganizationId};

use super::diesel_error_mapping::{collect_rows, map_diesel_error, map_pool_error};
use super::models::{OrganizationRow, OrganizationValues};
use super::pool::DbPool;
use super::schema::{assignment_organizations, organizations};

/// Diesel-backed implementation of the organisation repository.
#[derive(Clone)]
pub struct DieselOrganizationRepository {
    pool: DbPool,
}

impl DieselOrganizationRepository {
    /// Create a new repository with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn draft_values(draft: &OrganizationDraft) -> OrganizationValues<'_> {
    OrganizationValues {
        name: &draft.name,
        abbreviation: &draft.abbreviation,
        organization_type: draft.organization_type.as_str(),
        parent_id: draft.parent_id,
        is_active: true,
        tooi_identifier: draft.tooi_identifier.as_deref(),
        oin_number: draft.oin_number.as_deref(),
        previous_names: "[]".to_owned(),
        successor_id: None,
        source_url: draft.source_url.as_deref(),
    }
}

#[async_trait]
impl OrganizationRepository for DieselOrganizationRepository {
    async fn list_all(&self) -> Result<Vec<Organization>, OrganizationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<OrganizationRow> = organizations::table
            .select(OrganizationRow::as_select())
            .order(organizations::id.asc())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list organizations"))?;
        collect_rows(rows, Organization::try_from)
    }

    async fn create(
        &self,
        draft: &OrganizationDraft,
    ) -> Result<Organization, OrganizationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: OrganizationRow = diesel::insert_into(organizations::table)
            .values(draft_values(draft))
            .returning(OrganizationRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "create organization"))?;
        Organization::try_from(row).map_err(OrganizationRepositoryError::query)
    }

    async fn save(&self, organization: &Organization) -> Result<(), OrganizationRepositoryError> {
        let values = OrganizationValues::from_organization(organization)
            .map_err(OrganizationRepositoryError::query)?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(organizations::table.find(organization.id))
            .set(values)
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "save organization"))?;
        Ok(())
    }

    async fn delete(&self, id: OrganizationId) -> Result<bool, OrganizationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(organizations::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "delete organization"))?;
        Ok(deleted > 0)
    }

    async fn count_assignment_links(
        &self,
        id: OrganizationId,
    ) -> Result<usize, OrganizationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let links: i64 = assignment_organizations::table
            .filter(assignment_organizations::organization_id.eq(id))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "count assignment links"))?;
        Ok(usize::try_from(links).unwrap_or_default())
    }
}
