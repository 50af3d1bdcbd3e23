//! Port for the audit trail.

use async_trait::async_trait;

use crate::domain::{Event, NewEvent};

use super::define_port_error;

define_port_error! {
    /// Errors raised by event repository adapters.
    pub enum EventRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "event repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "event repository query failed: {message}",
    }
}

/// Append-only event storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Append an event, stamped with the current time.
    async fn record(&self, event: &NewEvent) -> Result<(), EventRepositoryError>;

    /// Most recent events first.
    async fn recent(&self, limit: usize) -> Result<Vec<Event>, EventRepositoryError>;
}
