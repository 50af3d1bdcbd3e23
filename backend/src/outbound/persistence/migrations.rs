//! Embedded schema migrations.
//!
//! Migrations run on a plain synchronous connection on the blocking thread
//! pool, before the async pool hands out connections.

use diesel::Connection as _;
use diesel::sqlite::SqliteConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

/// Embedded migrations from the backend/migrations directory.
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while applying migrations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    /// The database could not be opened.
    #[error("failed to open database for migrations: {message}")]
    Connection {
        /// Error details.
        message: String,
    },

    /// A migration failed to apply.
    #[error("failed to apply migrations: {message}")]
    Apply {
        /// Error details.
        message: String,
    },
}

fn apply(database_url: &str) -> Result<Vec<String>, MigrationError> {
    let mut conn = SqliteConnection::establish(database_url).map_err(|err| {
        MigrationError::Connection {
            message: err.to_string(),
        }
    })?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationError::Apply {
            message: err.to_string(),
        })?;
    Ok(applied.iter().map(ToString::to_string).collect())
}

/// Apply every pending migration and return the applied versions.
///
/// # Errors
///
/// Returns [`MigrationError`] when the database cannot be opened or a
/// migration fails.
pub async fn run_migrations(database_url: &str) -> Result<Vec<String>, MigrationError> {
    let url = database_url.to_owned();
    let applied = tokio::task::spawn_blocking(move || apply(&url))
        .await
        .map_err(|err| MigrationError::Apply {
            message: err.to_string(),
        })??;
    info!(count = applied.len(), "applied pending migrations");
    Ok(applied)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrations_apply_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("migrate.sqlite3");
        let url = path.to_string_lossy().into_owned();

        let first = run_migrations(&url).await.expect("first run");
        assert!(!first.is_empty());
        let second = run_migrations(&url).await.expect("second run");
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn unreadable_location_is_a_connection_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("missing").join("db.sqlite3");
        let err = run_migrations(&path.to_string_lossy())
            .await
            .expect_err("directory does not exist");
        assert!(matches!(err, MigrationError::Connection { .. }));
    }
}
