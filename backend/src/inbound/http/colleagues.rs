//! Colleague list, detail and CRUD.

use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::domain::{
    Colleague, ColleagueDetail, ColleagueDraft, ColleagueId, ColleagueListQuery, DomainError,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_user;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Colleagues matching the filters, by name.
#[utoipa::path(
    get,
    path = "/api/v1/colleagues",
    params(ColleagueListQuery),
    responses(
        (status = 200, description = "Colleagues", body = [Colleague]),
        (status = 401, description = "Login required", body = DomainError)
    ),
    tags = ["colleagues"],
    operation_id = "listColleagues"
)]
#[get("/colleagues")]
pub async fn list_colleagues(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<ColleagueListQuery>,
) -> ApiResult<web::Json<Vec<Colleague>>> {
    current_user(&state, &session).await?;
    Ok(web::Json(state.colleagues.list(&query).await?))
}

/// Create a colleague.
#[utoipa::path(
    post,
    path = "/api/v1/colleagues",
    request_body = ColleagueDraft,
    responses(
        (status = 201, description = "Created", body = Colleague),
        (status = 400, description = "Invalid colleague", body = DomainError),
        (status = 403, description = "Forbidden", body = DomainError)
    ),
    tags = ["colleagues"],
    operation_id = "createColleague"
)]
#[post("/colleagues")]
pub async fn create_colleague(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<ColleagueDraft>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&state, &session).await?;
    let colleague = state
        .colleagues
        .create(&user, payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(colleague))
}

/// Colleague with the placements they hold.
#[utoipa::path(
    get,
    path = "/api/v1/colleagues/{id}",
    params(("id" = i32, Path, description = "Colleague id")),
    responses(
        (status = 200, description = "Colleague", body = ColleagueDetail),
        (status = 404, description = "Not found", body = DomainError)
    ),
    tags = ["colleagues"],
    operation_id = "getColleague"
)]
#[get("/colleagues/{id}")]
pub async fn get_colleague(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ColleagueId>,
) -> ApiResult<web::Json<ColleagueDetail>> {
    current_user(&state, &session).await?;
    Ok(web::Json(state.colleagues.detail(path.into_inner()).await?))
}

/// Replace a colleague's name, e-mail, skills and labels.
#[utoipa::path(
    put,
    path = "/api/v1/colleagues/{id}",
    params(("id" = i32, Path, description = "Colleague id")),
    request_body = ColleagueDraft,
    responses(
        (status = 200, description = "Updated", body = Colleague),
        (status = 403, description = "Forbidden", body = DomainError),
        (status = 404, description = "Not found", body = DomainError)
    ),
    tags = ["colleagues"],
    operation_id = "updateColleague"
)]
#[put("/colleagues/{id}")]
pub async fn update_colleague(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ColleagueId>,
    payload: web::Json<ColleagueDraft>,
) -> ApiResult<web::Json<Colleague>> {
    let user = current_user(&state, &session).await?;
    let colleague = state
        .colleagues
        .update(&user, path.into_inner(), payload.into_inner())
        .await?;
    Ok(web::Json(colleague))
}

/// Delete a colleague.
#[utoipa::path(
    delete,
    path = "/api/v1/colleagues/{id}",
    params(("id" = i32, Path, description = "Colleague id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Forbidden", body = DomainError),
        (status = 404, description = "Not found", body = DomainError)
    ),
    tags = ["colleagues"],
    operation_id = "deleteColleague"
)]
#[delete("/colleagues/{id}")]
pub async fn delete_colleague(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ColleagueId>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&state, &session).await?;
    state.colleagues.delete(&user, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::inbound::http::test_utils::{TestApp, login_cookie};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn created_colleague_is_listed_and_linked_to_its_user() {
        let app = TestApp::new().await;
        app.db
            .seed_user("bdm@rijksoverheid.nl", &[Role::BusinessDevelopmentManager], false)
            .await
            .expect("seed user");
        let service = test::init_service(app.build()).await;
        let cookie = login_cookie(&service, "bdm@rijksoverheid.nl").await;

        let res = test::call_service(
            &service,
            test::TestRequest::post()
                .uri("/api/v1/colleagues")
                .cookie(cookie.clone())
                .set_json(json!({"name": "Bea de Manager", "email": "bdm@rijksoverheid.nl"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(res).await;
        assert!(created["user_id"].is_number());

        let res = test::call_service(
            &service,
            test::TestRequest::get()
                .uri("/api/v1/colleagues?zoeken=bea")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let listed: Value = test::read_body_json(res).await;
        assert_eq!(listed.as_array().map(Vec::len), Some(1));
    }

    #[actix_web::test]
    async fn consultants_cannot_delete_colleagues() {
        let app = TestApp::new().await;
        app.db
            .seed_user("consultant@rijksoverheid.nl", &[Role::Consultant], false)
            .await
            .expect("seed user");
        let service = test::init_service(app.build()).await;
        let cookie = login_cookie(&service, "consultant@rijksoverheid.nl").await;
        let res = test::call_service(
            &service,
            test::TestRequest::delete()
                .uri("/api/v1/colleagues/1")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
