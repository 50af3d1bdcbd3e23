//! SQLite-backed key/value configuration adapter.
//!
//! Values are stored as JSON text.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use serde_json::Value;

use crate::domain::ports::{ConfigRepository, ConfigRepositoryError};

use super::diesel_error_mapping::{map_diesel_error, map_pool_error};
use super::pool::DbPool;
use super::schema::config;

/// Diesel-backed implementation of the configuration repository.
#[derive(Clone)]
pub struct DieselConfigRepository {
    pool: DbPool,
}

impl DieselConfigRepository {
    /// Create a new repository with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConfigRepository for DieselConfigRepository {
    async fn get(&self, key: &str) -> Result<Option<Value>, ConfigRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let raw: Option<String> = config::table
            .find(key)
            .select(config::value)
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, "get config"))?;
        raw.map(|text| {
            serde_json::from_str(&text)
                .map_err(|err| ConfigRepositoryError::query(format!("config {key}: {err}")))
        })
        .transpose()
    }

    async fn set(&self, key: &str, value: &Value) -> Result<(), ConfigRepositoryError> {
        let text = value.to_string();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(config::table)
            .values((config::key.eq(key), config::value.eq(&text)))
            .on_conflict(config::key)
            .do_update()
            .set(config::value.eq(excluded(config::value)))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "set config"))?;
        Ok(())
    }
}
