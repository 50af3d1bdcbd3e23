//! SQLite-backed label category and label adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{LabelRepository, LabelRepositoryError};
use crate::domain::{Label, LabelCategory, LabelCategoryId, LabelId};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::models::{LabelCategoryRow, LabelRow};
use super::pool::DbPool;
use super::schema::{label_categories, labels};

/// Diesel-backed implementation of the label repository.
#[derive(Clone)]
pub struct DieselLabelRepository {
    pool: DbPool,
}

impl DieselLabelRepository {
    /// Create a new repository with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LabelRepository for DieselLabelRepository {
    async fn list_categories(&self) -> Result<Vec<LabelCategory>, LabelRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<LabelCategoryRow> = label_categories::table
            .select(LabelCategoryRow::as_select())
            .order(label_categories::name.asc())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list label categories"))?;
        Ok(rows.into_iter().map(LabelCategory::from).collect())
    }

    async fn list_labels(&self) -> Result<Vec<Label>, LabelRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<LabelRow> = labels::table
            .select(LabelRow::as_select())
            .order((labels::category_id.asc(), labels::name.asc()))
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "list labels"))?;
        Ok(rows.into_iter().map(Label::from).collect())
    }

    async fn create_category(
        &self,
        name: &str,
        color: &str,
    ) -> Result<LabelCategory, LabelRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: LabelCategoryRow = diesel::insert_into(label_categories::table)
            .values((label_categories::name.eq(name), label_categories::color.eq(color)))
            .returning(LabelCategoryRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "create label category"))?;
        Ok(row.into())
    }

    async fn update_category(&self, category: &LabelCategory) -> Result<bool, LabelRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(label_categories::table.find(category.id))
            .set((
                label_categories::name.eq(&category.name),
                label_categories::color.eq(&category.color),
            ))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "update label category"))?;
        Ok(updated > 0)
    }

    async fn delete_category(&self, id: LabelCategoryId) -> Result<bool, LabelRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(label_categories::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "delete label category"))?;
        Ok(deleted > 0)
    }

    async fn ensure_category(
        &self,
        name: &str,
        color: &str,
    ) -> Result<LabelCategory, LabelRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(label_categories::table)
            .values((label_categories::name.eq(name), label_categories::color.eq(color)))
            .on_conflict(label_categories::name)
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "ensure label category"))?;
        let row: LabelCategoryRow = label_categories::table
            .filter(label_categories::name.eq(name))
            .select(LabelCategoryRow::as_select())
            .first(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "ensure label category"))?;
        Ok(row.into())
    }

    async fn create_label(
        &self,
        category_id: LabelCategoryId,
        name: &str,
    ) -> Result<Label, LabelRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: LabelRow = diesel::insert_into(labels::table)
            .values((labels::category_id.eq(category_id), labels::name.eq(name)))
            .returning(LabelRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "create label"))?;
        Ok(row.into())
    }

    async fn ensure_label(
        &self,
        category_id: LabelCategoryId,
        name: &str,
    ) -> Result<(Label, bool), LabelRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let inserted = diesel::insert_into(labels::table)
            .values((labels::category_id.eq(category_id), labels::name.eq(name)))
            .on_conflict((labels::category_id, labels::name))
            .do_nothing()
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "ensure label"))?;
        let row: LabelRow = labels::table
            .filter(labels::category_id.eq(category_id))
            .filter(labels::name.eq(name))
            .select(LabelRow::as_select())
            .first(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "ensure label"))?;
        Ok((row.into(), inserted > 0))
    }

    async fn rename_label(
        &self,
        id: LabelId,
        name: &str,
    ) -> Result<Option<Label>, LabelRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<LabelRow> = diesel::update(labels::table.find(id))
            .set(labels::name.eq(name))
            .returning(LabelRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "rename label"))?;
        Ok(row.map(Label::from))
    }

    async fn delete_label(&self, id: LabelId) -> Result<bool, LabelRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(labels::table.find(id))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "delete label"))?;
        Ok(deleted > 0)
    }
}
