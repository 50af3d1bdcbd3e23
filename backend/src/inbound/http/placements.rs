//! Placement table, placement CRUD and the placement CSV import.
//!
//! ```text
//! GET /api/v1/placements?zoeken=jan&periode=2026-01-01_2026-12-31&pagina=2
//! POST /api/v1/placements/import   (text/csv body)
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};

use crate::domain::{
    DomainError, Placement, PlacementDraft, PlacementId, PlacementImportReport, PlacementListing,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_user;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Filtered and paged placement table.
///
/// The query string is passed through unparsed; repeated keys and unknown
/// filter names are handled by the listing itself.
#[utoipa::path(
    get,
    path = "/api/v1/placements",
    responses(
        (status = 200, description = "Placement table", body = PlacementListing),
        (status = 401, description = "Login required", body = DomainError)
    ),
    tags = ["placements"],
    operation_id = "listPlacements"
)]
#[get("/placements")]
pub async fn list_placements(
    state: web::Data<HttpState>,
    session: SessionContext,
    req: HttpRequest,
) -> ApiResult<web::Json<PlacementListing>> {
    current_user(&state, &session).await?;
    let listing = state.placements.listing(req.query_string()).await?;
    Ok(web::Json(listing))
}

/// Place a colleague on a service.
#[utoipa::path(
    post,
    path = "/api/v1/placements",
    request_body = PlacementDraft,
    responses(
        (status = 201, description = "Created", body = Placement),
        (status = 400, description = "Invalid placement", body = DomainError),
        (status = 403, description = "Forbidden", body = DomainError)
    ),
    tags = ["placements"],
    operation_id = "createPlacement"
)]
#[post("/placements")]
pub async fn create_placement(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<PlacementDraft>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&state, &session).await?;
    let placement = state
        .placements
        .create(&user, payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(placement))
}

/// Import assignments, services and placements from CSV.
///
/// All rows are applied in one transaction; a file with any invalid row
/// changes nothing.
#[utoipa::path(
    post,
    path = "/api/v1/placements/import",
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 200, description = "Import report", body = PlacementImportReport),
        (status = 400, description = "Invalid file", body = DomainError),
        (status = 403, description = "Forbidden", body = DomainError)
    ),
    tags = ["placements"],
    operation_id = "importPlacements"
)]
#[post("/placements/import")]
pub async fn import_placements(
    state: web::Data<HttpState>,
    session: SessionContext,
    body: String,
) -> ApiResult<web::Json<PlacementImportReport>> {
    let user = current_user(&state, &session).await?;
    let report = state.imports.import_placements(&user, &body).await?;
    Ok(web::Json(report))
}

/// One placement.
#[utoipa::path(
    get,
    path = "/api/v1/placements/{id}",
    params(("id" = i32, Path, description = "Placement id")),
    responses(
        (status = 200, description = "Placement", body = Placement),
        (status = 404, description = "Not found", body = DomainError)
    ),
    tags = ["placements"],
    operation_id = "getPlacement"
)]
#[get("/placements/{id}")]
pub async fn get_placement(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<PlacementId>,
) -> ApiResult<web::Json<Placement>> {
    current_user(&state, &session).await?;
    Ok(web::Json(state.placements.placement(path.into_inner()).await?))
}

/// Replace a placement's fields.
#[utoipa::path(
    put,
    path = "/api/v1/placements/{id}",
    params(("id" = i32, Path, description = "Placement id")),
    request_body = PlacementDraft,
    responses(
        (status = 200, description = "Updated", body = Placement),
        (status = 403, description = "Forbidden", body = DomainError),
        (status = 404, description = "Not found", body = DomainError)
    ),
    tags = ["placements"],
    operation_id = "updatePlacement"
)]
#[put("/placements/{id}")]
pub async fn update_placement(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<PlacementId>,
    payload: web::Json<PlacementDraft>,
) -> ApiResult<web::Json<Placement>> {
    let user = current_user(&state, &session).await?;
    let placement = state
        .placements
        .update(&user, path.into_inner(), payload.into_inner())
        .await?;
    Ok(web::Json(placement))
}

/// Delete a placement.
#[utoipa::path(
    delete,
    path = "/api/v1/placements/{id}",
    params(("id" = i32, Path, description = "Placement id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Forbidden", body = DomainError),
        (status = 404, description = "Not found", body = DomainError)
    ),
    tags = ["placements"],
    operation_id = "deletePlacement"
)]
#[delete("/placements/{id}")]
pub async fn delete_placement(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<PlacementId>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&state, &session).await?;
    state.placements.delete(&user, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::inbound::http::test_utils::{TestApp, login_cookie};
    use actix_web::http::StatusCode;
    use actix_web::http::header;
    use actix_web::test;
    use serde_json::Value;

    const CSV: &str = "\
assignment_name,assignment_description,assignment_owner,assignment_owner_email,assignment_organization,assignment_ministry,assignment_start_date,assignment_end_date,service_skill,placement_colleague_name,placement_colleague_email
Datalab,Analyse,Piet Bos,piet@rijksoverheid.nl,,BZK,01-01-2026,31-12-2026,Data Scientist,Jan Jansen,jan@rijksoverheid.nl
";

    #[actix_web::test]
    async fn imported_placements_appear_in_the_table() {
        let app = TestApp::new().await;
        app.db
            .seed_user("admin@rijksoverheid.nl", &[], true)
            .await
            .expect("seed admin");
        let service = test::init_service(app.build()).await;
        let cookie = login_cookie(&service, "admin@rijksoverheid.nl").await;

        let res = test::call_service(
            &service,
            test::TestRequest::post()
                .uri("/api/v1/placements/import")
                .insert_header((header::CONTENT_TYPE, "text/csv"))
                .cookie(cookie.clone())
                .set_payload(CSV)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let report: Value = test::read_body_json(res).await;
        assert_eq!(report["placements_created"], 1);

        let res = test::call_service(
            &service,
            test::TestRequest::get()
                .uri("/api/v1/placements?zoeken=jan")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let listing: Value = test::read_body_json(res).await;
        assert_eq!(listing["total"], 1);
    }

    #[actix_web::test]
    async fn consultants_cannot_import() {
        let app = TestApp::new().await;
        app.db
            .seed_user("consultant@rijksoverheid.nl", &[Role::Consultant], false)
            .await
            .expect("seed consultant");
        let service = test::init_service(app.build()).await;
        let cookie = login_cookie(&service, "consultant@rijksoverheid.nl").await;

        let res = test::call_service(
            &service,
            test::TestRequest::post()
                .uri("/api/v1/placements/import")
                .cookie(cookie)
                .set_payload(CSV)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn table_requires_login() {
        let app = TestApp::new().await;
        let service = test::init_service(app.build()).await;
        let res = test::call_service(
            &service,
            test::TestRequest::get().uri("/api/v1/placements").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn unknown_placement_is_not_found() {
        let app = TestApp::new().await;
        app.db
            .seed_user("admin@rijksoverheid.nl", &[], true)
            .await
            .expect("seed admin");
        let service = test::init_service(app.build()).await;
        let cookie = login_cookie(&service, "admin@rijksoverheid.nl").await;
        let res = test::call_service(
            &service,
            test::TestRequest::get()
                .uri("/api/v1/placements/999")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
