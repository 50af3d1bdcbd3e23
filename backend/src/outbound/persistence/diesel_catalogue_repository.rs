//! SQLite-backed skill and ministry catalogue adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CatalogueRepository, CatalogueRepositoryError};
use crate::domain::{Ministry, MinistryId, Skill, SkillId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{MinistryRow, SkillRow};
use super::pool::DbPool;
use super::schema::{ministries, skills};

/// Diesel-backed implementation of the catalogue repository.
#[derive(Clone)]
pub struct DieselCatalogueRepository {
    pool: DbPool,
}

impl DieselCatalogueRepository {
    /// Create a new repository with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogueRepository for DieselCatalogueRepository {
    async fn list_skills(&self) -> Result<Vec<Skill>, CatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<SkillRow> = skills::table
            .select(SkillRow::as_select())
            .order((skills::name.asc(), skills::id.asc()))
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list skills"))?;
        Ok(rows.into_iter().map(Skill::from).collect())
    }

    async fn find_skill_by_name(
        &self,
        name: &str,
    ) -> Result<Option<Skill>, CatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<SkillRow> = skills::table
            .filter(skills::name.eq(name))
            .select(SkillRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find skill"))?;
        Ok(row.map(Skill::from))
    }

    async fn create_skill(&self, name: &str) -> Result<Skill, CatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: SkillRow = diesel::insert_into(skills::table)
            .values(skills::name.eq(name))
            .returning(SkillRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "create skill"))?;
        Ok(row.into())
    }

    async fn delete_skill(&self, id: SkillId) -> Result<bool, CatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(skills::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "delete skill"))?;
        Ok(deleted > 0)
    }

    async fn list_ministries(&self) -> Result<Vec<Ministry>, CatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<MinistryRow> = ministries::table
            .select(MinistryRow::as_select())
            .order(ministries::name.asc())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list ministries"))?;
        Ok(rows.into_iter().map(Ministry::from).collect())
    }

    async fn find_ministry(
        &self,
        id: MinistryId,
    ) -> Result<Option<Ministry>, CatalogueRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<MinistryRow> = ministries::table
            .find(id)
            .select(MinistryRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "find ministry"))?;
        Ok(row.map(Ministry::from))
    }
}
