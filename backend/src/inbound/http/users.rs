//! User administration.
//!
//! ```text
//! GET  /api/v1/users?zoeken=jan&rol=Beheerder&pagina=2
//! POST /api/v1/users/import   (CSV body: first_name,last_name,email,brand,Beheerder,Consultant,BDM)
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::domain::{
    DomainError, User, UserDraft, UserId, UserImportReport, UserListQuery, UserPage,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_user;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// One page of users, superusers hidden.
#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(UserListQuery),
    responses(
        (status = 200, description = "Users", body = UserPage),
        (status = 403, description = "Forbidden", body = DomainError)
    ),
    tags = ["users"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<UserListQuery>,
) -> ApiResult<web::Json<UserPage>> {
    let viewer = current_user(&state, &session).await?;
    Ok(web::Json(state.users.list(&viewer, &query).await?))
}

/// Create a user with role groups.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = UserDraft,
    responses(
        (status = 201, description = "Created", body = User),
        (status = 400, description = "Invalid user or e-mail domain", body = DomainError),
        (status = 403, description = "Forbidden", body = DomainError),
        (status = 409, description = "E-mail taken", body = DomainError)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<UserDraft>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    let user = state.users.create(&actor, payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

/// Import accounts from CSV. Existing e-mail addresses are skipped.
#[utoipa::path(
    post,
    path = "/api/v1/users/import",
    request_body(content = String, content_type = "text/csv"),
    responses(
        (status = 200, description = "Import report", body = UserImportReport),
        (status = 400, description = "Rejected file", body = DomainError),
        (status = 403, description = "Forbidden", body = DomainError)
    ),
    tags = ["users"],
    operation_id = "importUsers"
)]
#[post("/users/import")]
pub async fn import_users(
    state: web::Data<HttpState>,
    session: SessionContext,
    body: String,
) -> ApiResult<web::Json<UserImportReport>> {
    let actor = current_user(&state, &session).await?;
    Ok(web::Json(state.imports.import_users(&actor, &body).await?))
}

/// Replace a user's names, e-mail and role groups.
#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    params(("id" = i32, Path, description = "User id")),
    request_body = UserDraft,
    responses(
        (status = 200, description = "Updated", body = User),
        (status = 403, description = "Forbidden", body = DomainError),
        (status = 404, description = "Not found", body = DomainError)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users/{id}")]
pub async fn update_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<UserId>,
    payload: web::Json<UserDraft>,
) -> ApiResult<web::Json<User>> {
    let actor = current_user(&state, &session).await?;
    let user = state
        .users
        .update(&actor, path.into_inner(), payload.into_inner())
        .await?;
    Ok(web::Json(user))
}

/// Delete a user.
#[utoipa::path(
    delete,
    path = "/api/v1/users/{id}",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Forbidden", body = DomainError),
        (status = 404, description = "Not found", body = DomainError)
    ),
    tags = ["users"],
    operation_id = "deleteUser"
)]
#[delete("/users/{id}")]
pub async fn delete_user(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<UserId>,
) -> ApiResult<HttpResponse> {
    let actor = current_user(&state, &session).await?;
    state.users.delete(&actor, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::inbound::http::test_utils::{TestApp, login_cookie};
    use actix_web::http::{StatusCode, header};
    use actix_web::test;
    use serde_json::{Value, json};

    async fn admin_app() -> TestApp {
        let app = TestApp::new().await;
        app.db
            .seed_user("beheer@rijksoverheid.nl", &[Role::Beheerder], false)
            .await
            .expect("seed admin");
        app.db
            .seed_user("root@rijksoverheid.nl", &[], true)
            .await
            .expect("seed superuser");
        app
    }

    #[actix_web::test]
    async fn admin_creates_and_lists_users() {
        let app = admin_app().await;
        let service = test::init_service(app.build()).await;
        let cookie = login_cookie(&service, "beheer@rijksoverheid.nl").await;

        let res = test::call_service(
            &service,
            test::TestRequest::post()
                .uri("/api/v1/users")
                .cookie(cookie.clone())
                .set_json(json!({
                    "first_name": "Jan",
                    "last_name": "Jansen",
                    "email": "Jan@Rijksoverheid.nl",
                    "roles": ["Consultant"]
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = test::call_service(
            &service,
            test::TestRequest::get()
                .uri("/api/v1/users?zoeken=jansen")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let page: Value = test::read_body_json(res).await;
        assert_eq!(page["total"], 1);
        assert_eq!(page["users"][0]["first_name"], "Jan");
    }

    #[actix_web::test]
    async fn superusers_are_hidden_from_the_list() {
        let app = admin_app().await;
        let service = test::init_service(app.build()).await;
        let cookie = login_cookie(&service, "beheer@rijksoverheid.nl").await;
        let res = test::call_service(
            &service,
            test::TestRequest::get()
                .uri("/api/v1/users")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let page: Value = test::read_body_json(res).await;
        let emails: Vec<&str> = page["users"]
            .as_array()
            .expect("users")
            .iter()
            .filter_map(|user| user["email"].as_str())
            .collect();
        assert!(!emails.contains(&"root@rijksoverheid.nl"));
    }

    #[actix_web::test]
    async fn csv_import_reports_created_accounts() {
        let app = admin_app().await;
        let service = test::init_service(app.build()).await;
        let cookie = login_cookie(&service, "beheer@rijksoverheid.nl").await;
        let csv = "first_name,last_name,email,brand,Beheerder,Consultant,BDM\n\
                   Piet,Peters,piet@rijksoverheid.nl,Rijksconsultants,n,y,n\n";
        let res = test::call_service(
            &service,
            test::TestRequest::post()
                .uri("/api/v1/users/import")
                .cookie(cookie)
                .insert_header((header::CONTENT_TYPE, "text/csv"))
                .set_payload(csv)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let report: Value = test::read_body_json(res).await;
        assert_eq!(report["users_created"], 1);
    }

    #[actix_web::test]
    async fn consultants_cannot_list_users() {
        let app = TestApp::new().await;
        app.db
            .seed_user("jan@rijksoverheid.nl", &[Role::Consultant], false)
            .await
            .expect("seed user");
        let service = test::init_service(app.build()).await;
        let cookie = login_cookie(&service, "jan@rijksoverheid.nl").await;
        let res = test::call_service(
            &service,
            test::TestRequest::get()
                .uri("/api/v1/users")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
