//! Assignments, their kanban board and the services they ask for.

use actix_web::{HttpResponse, delete, get, patch, post, put, web};
use serde_json::Value;

use crate::domain::{
    AssignmentDraft, AssignmentId, AssignmentListQuery, AssignmentView, DomainError, KanbanCard,
    KanbanColumn, MoveCard, Service, ServiceDraft, ServiceId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_user;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Assignment cards, by name.
#[utoipa::path(
    get,
    path = "/api/v1/assignments",
    params(AssignmentListQuery),
    responses(
        (status = 200, description = "Assignments", body = [KanbanCard]),
        (status = 401, description = "Login required", body = DomainError)
    ),
    tags = ["assignments"],
    operation_id = "listAssignments"
)]
#[get("/assignments")]
pub async fn list_assignments(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<AssignmentListQuery>,
) -> ApiResult<web::Json<Vec<KanbanCard>>> {
    current_user(&state, &session).await?;
    Ok(web::Json(state.assignments.list(&query).await?))
}

/// Create an assignment.
#[utoipa::path(
    post,
    path = "/api/v1/assignments",
    request_body = AssignmentDraft,
    responses(
        (status = 201, description = "Created", body = AssignmentView),
        (status = 400, description = "Invalid assignment", body = DomainError),
        (status = 403, description = "Forbidden", body = DomainError)
    ),
    tags = ["assignments"],
    operation_id = "createAssignment"
)]
#[post("/assignments")]
pub async fn create_assignment(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<AssignmentDraft>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&state, &session).await?;
    let view = state
        .assignments
        .create(&user, payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(view))
}

/// Kanban board: one column per status.
#[utoipa::path(
    get,
    path = "/api/v1/assignments/board",
    responses((status = 200, description = "Board", body = [KanbanColumn])),
    tags = ["assignments"],
    operation_id = "assignmentBoard"
)]
#[get("/assignments/board")]
pub async fn board(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<KanbanColumn>>> {
    current_user(&state, &session).await?;
    Ok(web::Json(state.assignments.board().await?))
}

/// Assignment detail with services, placements and cost.
#[utoipa::path(
    get,
    path = "/api/v1/assignments/{id}",
    params(("id" = i32, Path, description = "Assignment id")),
    responses(
        (status = 200, description = "Assignment", body = AssignmentView),
        (status = 404, description = "Not found", body = DomainError)
    ),
    tags = ["assignments"],
    operation_id = "getAssignment"
)]
#[get("/assignments/{id}")]
pub async fn get_assignment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<AssignmentId>,
) -> ApiResult<web::Json<AssignmentView>> {
    let user = current_user(&state, &session).await?;
    Ok(web::Json(
        state.assignments.detail(&user, path.into_inner()).await?,
    ))
}

/// Delete an assignment with its services and placements.
#[utoipa::path(
    delete,
    path = "/api/v1/assignments/{id}",
    params(("id" = i32, Path, description = "Assignment id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Forbidden", body = DomainError),
        (status = 404, description = "Not found", body = DomainError)
    ),
    tags = ["assignments"],
    operation_id = "deleteAssignment"
)]
#[delete("/assignments/{id}")]
pub async fn delete_assignment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<AssignmentId>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&state, &session).await?;
    state.assignments.delete(&user, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Change one attribute: `name`, `period`, `status`, `extra_info`,
/// `owner`, `ministry` or `organizations`.
#[utoipa::path(
    patch,
    path = "/api/v1/assignments/{id}/{attribute}",
    params(
        ("id" = i32, Path, description = "Assignment id"),
        ("attribute" = String, Path, description = "Attribute to change")
    ),
    request_body = Object,
    responses(
        (status = 200, description = "Updated", body = AssignmentView),
        (status = 400, description = "Invalid value", body = DomainError),
        (status = 403, description = "Forbidden", body = DomainError)
    ),
    tags = ["assignments"],
    operation_id = "editAssignmentAttribute"
)]
#[patch("/assignments/{id}/{attribute}")]
pub async fn edit_attribute(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(AssignmentId, String)>,
    payload: web::Json<Value>,
) -> ApiResult<web::Json<AssignmentView>> {
    let user = current_user(&state, &session).await?;
    let (id, attribute) = path.into_inner();
    let view = state
        .assignments
        .edit_attribute(&user, id, &attribute, payload.into_inner())
        .await?;
    Ok(web::Json(view))
}

/// Move a card to another board column.
#[utoipa::path(
    post,
    path = "/api/v1/assignments/{id}/move",
    params(("id" = i32, Path, description = "Assignment id")),
    request_body = MoveCard,
    responses(
        (status = 200, description = "Moved card", body = KanbanCard),
        (status = 403, description = "Forbidden", body = DomainError)
    ),
    tags = ["assignments"],
    operation_id = "moveAssignment"
)]
#[post("/assignments/{id}/move")]
pub async fn move_assignment(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<AssignmentId>,
    payload: web::Json<MoveCard>,
) -> ApiResult<web::Json<KanbanCard>> {
    let user = current_user(&state, &session).await?;
    let card = state
        .assignments
        .move_card(&user, path.into_inner(), payload.into_inner())
        .await?;
    Ok(web::Json(card))
}

/// Add a service to an assignment.
#[utoipa::path(
    post,
    path = "/api/v1/assignments/{id}/services",
    params(("id" = i32, Path, description = "Assignment id")),
    request_body = ServiceDraft,
    responses(
        (status = 201, description = "Created", body = Service),
        (status = 400, description = "Invalid service", body = DomainError),
        (status = 403, description = "Forbidden", body = DomainError)
    ),
    tags = ["services"],
    operation_id = "createService"
)]
#[post("/assignments/{id}/services")]
pub async fn create_service(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<AssignmentId>,
    payload: web::Json<ServiceDraft>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&state, &session).await?;
    let service = state
        .assignments
        .create_service(&user, path.into_inner(), payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(service))
}

/// One service.
#[utoipa::path(
    get,
    path = "/api/v1/services/{id}",
    params(("id" = i32, Path, description = "Service id")),
    responses(
        (status = 200, description = "Service", body = Service),
        (status = 404, description = "Not found", body = DomainError)
    ),
    tags = ["services"],
    operation_id = "getService"
)]
#[get("/services/{id}")]
pub async fn get_service(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ServiceId>,
) -> ApiResult<web::Json<Service>> {
    current_user(&state, &session).await?;
    Ok(web::Json(state.assignments.service(path.into_inner()).await?))
}

/// Replace a service's fields.
#[utoipa::path(
    put,
    path = "/api/v1/services/{id}",
    params(("id" = i32, Path, description = "Service id")),
    request_body = ServiceDraft,
    responses(
        (status = 200, description = "Updated", body = Service),
        (status = 403, description = "Forbidden", body = DomainError),
        (status = 404, description = "Not found", body = DomainError)
    ),
    tags = ["services"],
    operation_id = "updateService"
)]
#[put("/services/{id}")]
pub async fn update_service(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ServiceId>,
    payload: web::Json<ServiceDraft>,
) -> ApiResult<web::Json<Service>> {
    let user = current_user(&state, &session).await?;
    let service = state
        .assignments
        .update_service(&user, path.into_inner(), payload.into_inner())
        .await?;
    Ok(web::Json(service))
}

/// Delete a service and its placements.
#[utoipa::path(
    delete,
    path = "/api/v1/services/{id}",
    params(("id" = i32, Path, description = "Service id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Forbidden", body = DomainError),
        (status = 404, description = "Not found", body = DomainError)
    ),
    tags = ["services"],
    operation_id = "deleteService"
)]
#[delete("/services/{id}")]
pub async fn delete_service(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<ServiceId>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&state, &session).await?;
    state
        .assignments
        .delete_service(&user, path.into_inner())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::inbound::http::test_utils::{TestApp, login_cookie};
    use actix_web::cookie::Cookie;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use serde_json::json;

    async fn signed_in(roles: &[Role], is_superuser: bool) -> (TestApp, String) {
        let app = TestApp::new().await;
        let email = "bdm@rijksoverheid.nl".to_owned();
        app.db
            .seed_user(&email, roles, is_superuser)
            .await
            .expect("seed user");
        (app, email)
    }

    fn post(uri: &str, cookie: &Cookie<'static>, body: Value) -> actix_http::Request {
        test::TestRequest::post()
            .uri(uri)
            .cookie(cookie.clone())
            .set_json(body)
            .to_request()
    }

    #[actix_web::test]
    async fn create_edit_and_move_an_assignment() {
        let (app, email) = signed_in(&[], true).await;
        let service = test::init_service(app.build()).await;
        let cookie = login_cookie(&service, &email).await;

        let res = test::call_service(
            &service,
            post(
                "/api/v1/assignments",
                &cookie,
                json!({"name": "Datalab", "start_date": "2026-01-01", "end_date": "2026-12-31"}),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created: Value = test::read_body_json(res).await;
        let id = created["id"].as_i64().expect("assignment id");
        assert_eq!(created["status"], "LEAD");

        let res = test::call_service(
            &service,
            test::TestRequest::patch()
                .uri(&format!("/api/v1/assignments/{id}/name"))
                .cookie(cookie.clone())
                .set_json(json!({"value": "Datalab 2"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let edited: Value = test::read_body_json(res).await;
        assert_eq!(edited["name"], "Datalab 2");

        let res = test::call_service(
            &service,
            post(
                &format!("/api/v1/assignments/{id}/move"),
                &cookie,
                json!({"status": "VACATURE"}),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);

        let res = test::call_service(
            &service,
            test::TestRequest::get()
                .uri("/api/v1/assignments/board")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let columns: Value = test::read_body_json(res).await;
        let vacature = columns
            .as_array()
            .and_then(|cols| cols.iter().find(|col| col["status"] == "VACATURE"))
            .expect("vacature column");
        assert_eq!(vacature["cards"][0]["name"], "Datalab 2");
    }

    #[actix_web::test]
    async fn services_are_created_under_their_assignment() {
        let (app, email) = signed_in(&[Role::BusinessDevelopmentManager], false).await;
        let service = test::init_service(app.build()).await;
        let cookie = login_cookie(&service, &email).await;

        let res = test::call_service(
            &service,
            post("/api/v1/assignments", &cookie, json!({"name": "Portaal"})),
        )
        .await;
        let created: Value = test::read_body_json(res).await;
        let id = created["id"].as_i64().expect("assignment id");

        let res = test::call_service(
            &service,
            post(
                &format!("/api/v1/assignments/{id}/services"),
                &cookie,
                json!({"description": "Frontend", "hours_per_week": 32}),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created_service: Value = test::read_body_json(res).await;
        assert_eq!(created_service["assignment_id"].as_i64(), Some(id));

        let service_id = created_service["id"].as_i64().expect("service id");
        let res = test::call_service(
            &service,
            test::TestRequest::get()
                .uri(&format!("/api/v1/services/{service_id}"))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_web::test]
    async fn consultants_cannot_create_assignments() {
        let (app, email) = signed_in(&[Role::Consultant], false).await;
        let service = test::init_service(app.build()).await;
        let cookie = login_cookie(&service, &email).await;

        let res = test::call_service(
            &service,
            post("/api/v1/assignments", &cookie, json!({"name": "Datalab"})),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn unknown_attribute_is_rejected() {
        let (app, email) = signed_in(&[], true).await;
        let service = test::init_service(app.build()).await;
        let cookie = login_cookie(&service, &email).await;
        let res = test::call_service(
            &service,
            post("/api/v1/assignments", &cookie, json!({"name": "Datalab"})),
        )
        .await;
        let created: Value = test::read_body_json(res).await;
        let id = created["id"].as_i64().expect("assignment id");

        let res = test::call_service(
            &service,
            test::TestRequest::patch()
                .uri(&format!("/api/v1/assignments/{id}/colour"))
                .cookie(cookie)
                .set_json(json!({"value": "red"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
