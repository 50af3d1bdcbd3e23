//! Port applying validated CSV imports.
//!
//! Each call runs in one transaction: either every row is applied or none.

use async_trait::async_trait;

use crate::domain::{
    PlacementImportPlan, PlacementImportReport, UserImportPlan, UserImportReport,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by import adapters.
    pub enum ImportRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "import repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "import failed: {message}",
    }
}

/// Get-or-create writer for imports.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImportRepository: Send + Sync {
    /// Apply a placement import.
    async fn import_placements(
        &self,
        plan: &PlacementImportPlan,
    ) -> Result<PlacementImportReport, ImportRepositoryError>;

    /// Apply a user import; existing e-mail addresses are skipped.
    async fn import_users(
        &self,
        plan: &UserImportPlan,
    ) -> Result<UserImportReport, ImportRepositoryError>;
}
