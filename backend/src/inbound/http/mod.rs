//! HTTP inbound adapter exposing REST endpoints under `/api/v1`.

pub mod assignments;
pub mod auth;
pub mod catalogue;
pub mod colleagues;
pub mod error;
pub mod filters;
pub mod health;
pub mod labels;
pub mod organizations;
pub mod placements;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

pub use error::ApiResult;

use actix_web::web;

use crate::domain::Error;

/// Upper bound for JSON bodies.
const JSON_LIMIT: usize = 256 * 1024;
/// Upper bound for plain-text bodies such as CSV imports.
const PAYLOAD_LIMIT: usize = 8 * 1024 * 1024;

fn rejected(err: impl std::fmt::Display) -> actix_web::Error {
    Error::invalid_request(err.to_string()).into()
}

/// Register every API route and the extractor settings.
///
/// Fixed segments are registered before `{id}` segments sharing their
/// prefix so `/assignments/board` never parses as an id.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .limit(JSON_LIMIT)
            .error_handler(|err, _| rejected(err)),
    )
    .app_data(web::PathConfig::default().error_handler(|err, _| rejected(err)))
    .app_data(web::QueryConfig::default().error_handler(|err, _| rejected(err)))
    .app_data(web::PayloadConfig::new(PAYLOAD_LIMIT))
    .service(auth::login)
    .service(auth::logout)
    .service(auth::me)
    .service(assignments::list_assignments)
    .service(assignments::create_assignment)
    .service(assignments::board)
    .service(assignments::get_assignment)
    .service(assignments::delete_assignment)
    .service(assignments::edit_attribute)
    .service(assignments::move_assignment)
    .service(assignments::create_service)
    .service(assignments::get_service)
    .service(assignments::update_service)
    .service(assignments::delete_service)
    .service(placements::list_placements)
    .service(placements::create_placement)
    .service(placements::import_placements)
    .service(placements::get_placement)
    .service(placements::update_placement)
    .service(placements::delete_placement)
    .service(colleagues::list_colleagues)
    .service(colleagues::create_colleague)
    .service(colleagues::get_colleague)
    .service(colleagues::update_colleague)
    .service(colleagues::delete_colleague)
    .service(catalogue::list_skills)
    .service(catalogue::create_skill)
    .service(catalogue::delete_skill)
    .service(catalogue::list_ministries)
    .service(catalogue::get_ministry)
    .service(organizations::tree)
    .service(organizations::tree_search)
    .service(organizations::tree_category)
    .service(organizations::tree_children)
    .service(organizations::list_organizations)
    .service(organizations::create_organization)
    .service(organizations::update_organization)
    .service(organizations::delete_organization)
    .service(labels::list_categories)
    .service(labels::create_category)
    .service(labels::update_category)
    .service(labels::delete_category)
    .service(labels::create_label)
    .service(labels::update_label)
    .service(labels::delete_label)
    .service(filters::list_filters)
    .service(filters::move_filter)
    .service(users::list_users)
    .service(users::create_user)
    .service(users::import_users)
    .service(users::update_user)
    .service(users::delete_user);
}

#[cfg(test)]
mod tests {
    use super::test_utils::{TestApp, login_cookie};
    use crate::domain::Role;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[case("/api/v1/placements/abc")]
    #[case("/api/v1/assignments/abc")]
    #[case("/api/v1/users?pagina=twee")]
    #[actix_web::test]
    async fn malformed_parameters_use_the_error_envelope(#[case] uri: &str) {
        let app = TestApp::new().await;
        app.db
            .seed_user("beheer@rijksoverheid.nl", &[Role::Beheerder], false)
            .await
            .expect("seed user");
        let service = test::init_service(app.build()).await;
        let cookie = login_cookie(&service, "beheer@rijksoverheid.nl").await;
        let res = test::call_service(
            &service,
            test::TestRequest::get().uri(uri).cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["code"], "invalid_request");
    }

    #[actix_web::test]
    async fn malformed_json_uses_the_error_envelope() {
        let app = TestApp::new().await;
        let service = test::init_service(app.build()).await;
        let res = test::call_service(
            &service,
            test::TestRequest::post()
                .uri("/api/v1/login")
                .insert_header(("content-type", "application/json"))
                .set_payload("{not json")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["code"], "invalid_request");
    }
}
