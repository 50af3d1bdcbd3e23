//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Each repository trait exposes a typed error generated by
//! [`define_port_error!`]; services translate those into domain errors.

mod macros;
pub(crate) use macros::define_port_error;

mod assignment_repository;
mod catalogue_repository;
mod colleague_repository;
mod config_repository;
mod event_repository;
mod import_repository;
mod label_repository;
mod organization_repository;
mod user_repository;

#[cfg(test)]
pub use assignment_repository::MockAssignmentRepository;
pub use assignment_repository::{AssignmentRepository, AssignmentRepositoryError};
#[cfg(test)]
pub use catalogue_repository::MockCatalogueRepository;
pub use catalogue_repository::{CatalogueRepository, CatalogueRepositoryError};
#[cfg(test)]
pub use colleague_repository::MockColleagueRepository;
pub use colleague_repository::{ColleagueRepository, ColleagueRepositoryError};
#[cfg(test)]
pub use config_repository::MockConfigRepository;
pub use config_repository::{ConfigRepository, ConfigRepositoryError};
#[cfg(test)]
pub use event_repository::MockEventRepository;
pub use event_repository::{EventRepository, EventRepositoryError};
#[cfg(test)]
pub use import_repository::MockImportRepository;
pub use import_repository::{ImportRepository, ImportRepositoryError};
#[cfg(test)]
pub use label_repository::MockLabelRepository;
pub use label_repository::{LabelRepository, LabelRepositoryError};
#[cfg(test)]
pub use organization_repository::MockOrganizationRepository;
pub use organization_repository::{OrganizationRepository, OrganizationRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserRepository, UserRepositoryError};
