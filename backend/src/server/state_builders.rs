//! Wires the Diesel adapters into the HTTP state.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;

use wies::inbound::http::state::{HttpOptions, HttpState, HttpStatePorts};
use wies::outbound::persistence::{
    DbPool, DieselAssignmentRepository, DieselCatalogueRepository, DieselColleagueRepository,
    DieselConfigRepository, DieselEventRepository, DieselImportRepository, DieselLabelRepository,
    DieselOrganizationRepository, DieselUserRepository,
};

fn diesel_ports(pool: &DbPool) -> HttpStatePorts {
    HttpStatePorts {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        events: Arc::new(DieselEventRepository::new(pool.clone())),
        assignments: Arc::new(DieselAssignmentRepository::new(pool.clone())),
        colleagues: Arc::new(DieselColleagueRepository::new(pool.clone())),
        catalogue: Arc::new(DieselCatalogueRepository::new(pool.clone())),
        labels: Arc::new(DieselLabelRepository::new(pool.clone())),
        organizations: Arc::new(DieselOrganizationRepository::new(pool.clone())),
        config: Arc::new(DieselConfigRepository::new(pool.clone())),
        imports: Arc::new(DieselImportRepository::new(pool.clone())),
        clock: Arc::new(DefaultClock),
    }
}

/// Build the shared handler state over `pool`.
pub(super) fn build_http_state(pool: &DbPool, options: HttpOptions) -> web::Data<HttpState> {
    web::Data::new(HttpState::new(diesel_ports(pool), options))
}
