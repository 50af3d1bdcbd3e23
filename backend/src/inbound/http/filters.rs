//! Filter order settings.
//!
//! ```text
//! GET  /api/v1/filters
//! POST /api/v1/filters/2/up
//! ```

use actix_web::{get, post, web};

use crate::domain::{DomainError, FilterDisplay, FilterMove, MoveDirection};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_user;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Filter order rows for the settings page.
#[utoipa::path(
    get,
    path = "/api/v1/filters",
    responses(
        (status = 200, description = "Filters in display order", body = [FilterDisplay]),
        (status = 403, description = "Forbidden", body = DomainError)
    ),
    tags = ["filters"],
    operation_id = "listFilters"
)]
#[get("/filters")]
pub async fn list_filters(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<FilterDisplay>>> {
    let user = current_user(&state, &session).await?;
    Ok(web::Json(state.filters.display(&user).await?))
}

/// Swap the filter at a 1-based position with its neighbour.
#[utoipa::path(
    post,
    path = "/api/v1/filters/{position}/{direction}",
    params(
        ("position" = usize, Path, description = "1-based position"),
        ("direction" = String, Path, description = "`up` or `down`")
    ),
    responses(
        (status = 200, description = "Moved", body = FilterMove),
        (status = 400, description = "Invalid move", body = DomainError),
        (status = 403, description = "Forbidden", body = DomainError)
    ),
    tags = ["filters"],
    operation_id = "moveFilter"
)]
#[post("/filters/{position}/{direction}")]
pub async fn move_filter(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<(usize, String)>,
) -> ApiResult<web::Json<FilterMove>> {
    let user = current_user(&state, &session).await?;
    let (position, raw_direction) = path.into_inner();
    let direction: MoveDirection = raw_direction.parse()?;
    Ok(web::Json(
        state.filters.move_filter(&user, position, direction).await?,
    ))
}
