//! SQLite-backed audit event adapter.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{EventRepository, EventRepositoryError};
use crate::domain::{Event, NewEvent};

use super::diesel_error_mapping::{collect_rows, map_diesel_error, map_pool_error};
use super::models::{EventRow, NewEventRow};
use super::pool::DbPool;
use super::schema::events;

/// Diesel-backed implementation of the event repository.
#[derive(Clone)]
pub struct DieselEventRepository {
    pool: DbPool,
}

impl DieselEventRepository {
    /// Create a new repository with the given connection pool.
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventRepository for DieselEventRepository {
    async fn record(&self, event: &NewEvent) -> Result<(), EventRepositoryError> {
        let row = NewEventRow {
            timestamp: Utc::now().naive_utc(),
            user_email: &event.user_email,
            name: event.name.as_str(),
            context: event.context.to_string(),
        };
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(events::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "record event"))?;
        Ok(())
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Event>, EventRepositoryError> {
        let max_rows = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<EventRow> = events::table
            .select(EventRow::as_select())
            .order((events::timestamp.desc(), events::id.desc()))
            .limit(max_rows)
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, "recent events"))?;
        collect_rows(rows, Event::try_from)
    }
}
