//! Shared Diesel error mapping for every repository adapter.
//!
//! Port errors differ per repository but share the same shape, so each one
//! implements [`RepositoryFailure`] and the helpers here translate pool and
//! Diesel errors once.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::{
    AssignmentRepositoryError, CatalogueRepositoryError, ColleagueRepositoryError,
    ConfigRepositoryError, EventRepositoryError, ImportRepositoryError, LabelRepositoryError,
    OrganizationRepositoryError, UserRepositoryError,
};

use super::pool::PoolError;

/// Constructors a port error offers to the persistence layer.
///
/// Ports without dedicated conflict or reference variants fall back to a
/// query error.
pub(crate) trait RepositoryFailure: Sized {
    fn connection(message: String) -> Self;
    fn query(message: String) -> Self;
    fn conflict(message: String) -> Self {
        Self::query(message)
    }
    fn invalid_reference(message: String) -> Self {
        Self::query(message)
    }
}

macro_rules! repository_failure {
    ($ty:ty) => {
        impl RepositoryFailure for $ty {
            fn connection(message: String) -> Self {
                Self::connection(message)
            }
            fn query(message: String) -> Self {
                Self::query(message)
            }
        }
    };
    ($ty:ty, conflict) => {
        impl RepositoryFailure for $ty {
            fn connection(message: String) -> Self {
                Self::connection(message)
            }
            fn query(message: String) -> Self {
                Self::query(message)
            }
            fn conflict(message: String) -> Self {
                Self::conflict(message)
            }
        }
    };
    ($ty:ty, conflict, invalid_reference) => {
        impl RepositoryFailure for $ty {
            fn connection(message: String) -> Self {
                Self::connection(message)
            }
            fn query(message: String) -> Self {
                Self::query(message)
            }
            fn conflict(message: String) -> Self {
                Self::conflict(message)
            }
            fn invalid_reference(message: String) -> Self {
                Self::invalid_reference(message)
            }
        }
    };
}

repository_failure!(ConfigRepositoryError);
repository_failure!(EventRepositoryError);
repository_failure!(ImportRepositoryError);
repository_failure!(CatalogueRepositoryError, conflict);
repository_failure!(LabelRepositoryError, conflict, invalid_reference);
repository_failure!(OrganizationRepositoryError, conflict, invalid_reference);
repository_failure!(UserRepositoryError, conflict, invalid_reference);
repository_failure!(ColleagueRepositoryError, conflict, invalid_reference);
repository_failure!(AssignmentRepositoryError, conflict, invalid_reference);

/// Map pool errors into the port's connection error.
pub(crate) fn map_pool_error<E: RepositoryFailure>(error: PoolError) -> E {
    E::connection(error.into_message())
}

/// Map Diesel errors into the port's error, keeping the database message.
///
/// `operation` names the failing call in debug logs.
pub(crate) fn map_diesel_error<E: RepositoryFailure>(error: DieselError, operation: &str) -> E {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), %operation, "diesel operation failed");
        }
        other => debug!(error = %other, %operation, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            E::conflict(info.message().to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            E::invalid_reference(info.message().to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            E::connection("database connection error".to_owned())
        }
        DieselError::NotFound => E::query("record not found".to_owned()),
        other => E::query(other.to_string()),
    }
}

/// Collect converted rows, failing on the first row that does not map.
pub(crate) fn collect_rows<T, R, E, F>(rows: Vec<R>, convert: F) -> Result<Vec<T>, E>
where
    E: RepositoryFailure,
    F: Fn(R) -> Result<T, String>,
{
    rows.into_iter()
        .map(|row| convert(row).map_err(E::query))
        .collect()
}
