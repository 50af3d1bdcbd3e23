//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable against any port
//! implementation.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{
    AssignmentRepository, CatalogueRepository, ColleagueRepository, ConfigRepository,
    EventRepository, ImportRepository, LabelRepository, OrganizationRepository, UserRepository,
};
use crate::domain::{
    AllowedEmailDomains, AssignmentService, CatalogueService, ColleagueService,
    FilterOrderService, ImportService, LabelService, OrganizationService,
    PlacementListingSources, PlacementService, UserService,
};

/// Parameter object bundling every port implementation the handlers need.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Users and their role groups.
    pub users: Arc<dyn UserRepository>,
    /// Audit event log.
    pub events: Arc<dyn EventRepository>,
    /// Assignments with their services and placements.
    pub assignments: Arc<dyn AssignmentRepository>,
    /// Colleagues.
    pub colleagues: Arc<dyn ColleagueRepository>,
    /// Skills and ministries.
    pub catalogue: Arc<dyn CatalogueRepository>,
    /// Label categories and labels.
    pub labels: Arc<dyn LabelRepository>,
    /// Organisation forest.
    pub organizations: Arc<dyn OrganizationRepository>,
    /// Key/value settings such as the filter order.
    pub config: Arc<dyn ConfigRepository>,
    /// CSV import writes.
    pub imports: Arc<dyn ImportRepository>,
    /// Source of today's date.
    pub clock: Arc<dyn Clock>,
}

/// Deployment switches that change handler behaviour.
#[derive(Debug, Clone, Default)]
pub struct HttpOptions {
    /// E-mail suffixes accepted for new and edited users.
    pub allowed_email_domains: AllowedEmailDomains,
    /// Enables `POST /login` by e-mail address.
    pub dev_login: bool,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// User administration.
    pub users: UserService,
    /// Assignment, service and board use cases.
    pub assignments: AssignmentService,
    /// Placement listing and edits.
    pub placements: PlacementService,
    /// Colleague administration.
    pub colleagues: ColleagueService,
    /// Skill and ministry administration.
    pub catalogue: CatalogueService,
    /// Organisation edits and the tree browser.
    pub organizations: OrganizationService,
    /// Label administration.
    pub labels: LabelService,
    /// Placement filter order.
    pub filters: FilterOrderService,
    /// Placement and user CSV imports.
    pub imports: ImportService,
    /// Whether `POST /login` is served.
    pub dev_login: bool,
}

impl HttpState {
    /// Wire every use case from its ports.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use mockable::DefaultClock;
    /// use wies::inbound::http::state::{HttpOptions, HttpState, HttpStatePorts};
    /// use wies::outbound::persistence::*;
    ///
    /// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
    /// let pool = DbPool::new(PoolConfig::new("wies.sqlite3")).await?;
    /// let ports = HttpStatePorts {
    ///     users: Arc::new(DieselUserRepository::new(pool.clone())),
    ///     events: Arc::new(DieselEventRepository::new(pool.clone())),
    ///     assignments: Arc::new(DieselAssignmentRepository::new(pool.clone())),
    ///     colleagues: Arc::new(DieselColleagueRepository::new(pool.clone())),
    ///     catalogue: Arc::new(DieselCatalogueRepository::new(pool.clone())),
    ///     labels: Arc::new(DieselLabelRepository::new(pool.clone())),
    ///     organizations: Arc::new(DieselOrganizationRepository::new(pool.clone())),
    ///     config: Arc::new(DieselConfigRepository::new(pool.clone())),
    ///     imports: Arc::new(DieselImportRepository::new(pool)),
    ///     clock: Arc::new(DefaultClock),
    /// };
    /// let state = HttpState::new(ports, HttpOptions::default());
    /// assert!(!state.dev_login);
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn new(ports: HttpStatePorts, options: HttpOptions) -> Self {
        let HttpStatePorts {
            users,
            events,
            assignments,
            colleagues,
            catalogue,
            labels,
            organizations,
            config,
            imports,
            clock,
        } = ports;
        let HttpOptions {
            allowed_email_domains,
            dev_login,
        } = options;

        let filters = FilterOrderService::new(config, Arc::clone(&labels));
        let catalogue = CatalogueService::new(catalogue);
        let labels = LabelService::new(labels, filters.clone());
        let organizations = OrganizationService::new(organizations, Arc::clone(&clock));
        let placements = PlacementService::new(
            Arc::clone(&assignments),
            PlacementListingSources {
                catalogue: catalogue.clone(),
                labels: labels.clone(),
                organizations: organizations.clone(),
                filter_order: filters.clone(),
            },
            Arc::clone(&clock),
        );
        Self {
            users: UserService::new(users, events, allowed_email_domains.clone()),
            colleagues: ColleagueService::new(colleagues, Arc::clone(&assignments)),
            assignments: AssignmentService::new(assignments, clock),
            imports: ImportService::new(imports, allowed_email_domains),
            placements,
            catalogue,
            organizations,
            labels,
            filters,
            dev_login,
        }
    }
}
