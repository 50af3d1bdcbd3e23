//! Port for the key/value configuration table.

use async_trait::async_trait;
use serde_json::Value;

use super::define_port_error;

define_port_error! {
    /// Errors raised by config repository adapters.
    pub enum ConfigRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "config repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "config repository query failed: {message}",
    }
}

/// JSON values stored by key.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ConfigRepository: Send + Sync {
    /// Stored value, if any.
    async fn get(&self, key: &str) -> Result<Option<Value>, ConfigRepositoryError>;

    /// Insert or replace a value.
    async fn set(&self, key: &str, value: &Value) -> Result<(), ConfigRepositoryError>;
}
