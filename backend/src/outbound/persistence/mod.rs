//! SQLite persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of domain repository ports
//! backed by SQLite via Diesel, with async access through `diesel-async`'s
//! sync connection wrapper and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: Repository implementations only translate between
//!   Diesel models and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are internal implementation details, never
//!   exposed to the domain layer.
//! - **Strongly typed errors**: All database errors are mapped to the port
//!   error types through one shared mapper.
//!
//! # Example
//!
//! ```no_run
//! use wies::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("wies.sqlite3")).await?;
//! let repo = DieselUserRepository::new(pool);
//! # let _ = repo;
//! # Ok(())
//! # }
//! ```

mod diesel_assignment_repository;
mod diesel_catalogue_repository;
mod diesel_colleague_repository;
mod diesel_config_repository;
mod diesel_error_mapping;
mod diesel_event_repository;
mod diesel_import_repository;
mod diesel_label_repository;
mod diesel_organization_repository;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_assignment_repository::DieselAssignmentRepository;
pub use diesel_catalogue_repository::DieselCatalogueRepository;
pub use diesel_colleague_repository::DieselColleagueRepository;
pub use diesel_config_repository::DieselConfigRepository;
pub use diesel_event_repository::DieselEventRepository;
pub use diesel_import_repository::DieselImportRepository;
pub use diesel_label_repository::DieselLabelRepository;
pub use diesel_organization_repository::DieselOrganizationRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError, SqliteConn};
