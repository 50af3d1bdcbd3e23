//! Development login, logout and the signed-in user.
//!
//! ```text
//! POST /api/v1/login {"email":"jan@rijksoverheid.nl"}
//! POST /api/v1/logout
//! GET /api/v1/me
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, Error, User, UserProfile};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Resolve the signed-in user from the session cookie.
///
/// # Errors
/// `unauthorized` without a session or when the stored id no longer exists.
pub async fn current_user(state: &HttpState, session: &SessionContext) -> ApiResult<User> {
    let id = session.require_user_id()?;
    state.users.current(id).await
}

/// Login request body for `POST /api/v1/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LoginRequest {
    /// Address of an existing user.
    pub email: String,
}

/// Sign in by e-mail address. Only available when the development login
/// is enabled.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in", body = UserProfile,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 401, description = "Unknown user", body = DomainError),
        (status = 404, description = "Development login disabled", body = DomainError)
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<UserProfile>> {
    if !state.dev_login {
        return Err(Error::not_found("development login is disabled"));
    }
    let user = state.users.login(&payload.email).await?;
    session.persist_user(user.id)?;
    Ok(web::Json(UserProfile::from(user)))
}

/// Forget the session.
#[utoipa::path(
    post,
    path = "/api/v1/logout",
    responses((status = 204, description = "Signed out")),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[post("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.clear();
    HttpResponse::NoContent().finish()
}

/// The signed-in user with roles and effective permissions.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Current user", body = UserProfile),
        (status = 401, description = "Login required", body = DomainError)
    ),
    tags = ["auth"],
    operation_id = "me"
)]
#[get("/me")]
pub async fn me(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<UserProfile>> {
    let user = current_user(&state, &session).await?;
    Ok(web::Json(UserProfile::from(user)))
}
