//! Organisation list, CRUD and the hierarchy browser.
//!
//! ```text
//! GET /api/v1/organizations/tree                       category roots with counts
//! GET /api/v1/organizations/tree/category/ministerie   roots of one type
//! GET /api/v1/organizations/tree/12                    children of 12
//! GET /api/v1/organizations/tree/search?zoeken=belast  matches with ancestors
//! ```

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::Deserialize;

use crate::domain::{
    CategoryNode, DomainError, Error, Organization, OrganizationDraft, OrganizationId,
    OrganizationListQuery, OrganizationType, OrganizationUpdate, TreeNode, TreeSearchHit,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_user;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Query for `GET /organizations/tree/search`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct TreeSearchQuery {
    /// Text matched against names, abbreviations and former names.
    #[serde(default, rename = "zoeken")]
    pub search: String,
}

/// Organisations matching the listing filters.
#[utoipa::path(
    get,
    path = "/api/v1/organizations",
    params(OrganizationListQuery),
    responses((status = 200, description = "Organisations", body = [Organization])),
    tags = ["organizations"],
    operation_id = "listOrganizations"
)]
#[get("/organizations")]
pub async fn list_organizations(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<OrganizationListQuery>,
) -> ApiResult<web::Json<Vec<Organization>>> {
    current_user(&state, &session).await?;
    Ok(web::Json(state.organizations.list(&query).await?))
}

/// Create an organisation below an allowed parent.
#[utoipa::path(
    post,
    path = "/api/v1/organizations",
    request_body = OrganizationDraft,
    responses(
        (status = 201, description = "Created", body = Organization),
        (status = 400, description = "Invalid organisation", body = DomainError),
        (status = 403, description = "Forbidden", body = DomainError)
    ),
    tags = ["organizations"],
    operation_id = "createOrganization"
)]
#[post("/organizations")]
pub async fn create_organization(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<OrganizationDraft>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&state, &session).await?;
    let organization = state
        .organizations
        .create(&user, payload.into_inner())
        .await?;
    Ok(HttpResponse::Created().json(organization))
}

/// Edit an organisation; renames are kept as former names and dissolving
/// records the end date and an optional successor.
#[utoipa::path(
    put,
    path = "/api/v1/organizations/{id}",
    params(("id" = i32, Path, description = "Organisation id")),
    request_body = OrganizationUpdate,
    responses(
        (status = 200, description = "Updated", body = Organization),
        (status = 400, description = "Invalid organisation", body = DomainError),
        (status = 403, description = "Forbidden", body = DomainError),
        (status = 404, description = "Not found", body = DomainError)
    ),
    tags = ["organizations"],
    operation_id = "updateOrganization"
)]
#[put("/organizations/{id}")]
pub async fn update_organization(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<OrganizationId>,
    payload: web::Json<OrganizationUpdate>,
) -> ApiResult<web::Json<Organization>> {
    let user = current_user(&state, &session).await?;
    let organization = state
        .organizations
        .update(&user, path.into_inner(), payload.into_inner())
        .await?;
    Ok(web::Json(organization))
}

/// Delete an organisation without children.
#[utoipa::path(
    delete,
    path = "/api/v1/organizations/{id}",
    params(("id" = i32, Path, description = "Organisation id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Forbidden", body = DomainError),
        (status = 409, description = "Still linked to assignments", body = DomainError)
    ),
    tags = ["organizations"],
    operation_id = "deleteOrganization"
)]
#[delete("/organizations/{id}")]
pub async fn delete_organization(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<OrganizationId>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&state, &session).await?;
    state.organizations.delete(&user, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Top-level categories of the organisation tree browser.
#[utoipa::path(
    get,
    path = "/api/v1/organizations/tree",
    responses((status = 200, description = "Category roots", body = [CategoryNode])),
    tags = ["organizations"],
    operation_id = "organizationTree"
)]
#[get("/organizations/tree")]
pub async fn tree(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<CategoryNode>>> {
    current_user(&state, &session).await?;
    Ok(web::Json(state.organizations.categories().await?))
}

/// Tree nodes whose name or abbreviation matches the search.
#[utoipa::path(
    get,
    path = "/api/v1/organizations/tree/search",
    params(TreeSearchQuery),
    responses((status = 200, description = "Matches", body = [TreeSearchHit])),
    tags = ["organizations"],
    operation_id = "organizationTreeSearch"
)]
#[get("/organizations/tree/search")]
pub async fn tree_search(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<TreeSearchQuery>,
) -> ApiResult<web::Json<Vec<TreeSearchHit>>> {
    current_user(&state, &session).await?;
    Ok(web::Json(state.organizations.search(&query.search).await?))
}

/// Root organisations of one category.
#[utoipa::path(
    get,
    path = "/api/v1/organizations/tree/category/{type}",
    params(("type" = String, Path, description = "Organisation type, e.g. `ministerie`")),
    responses(
        (status = 200, description = "Roots of the type", body = [TreeNode]),
        (status = 400, description = "Unknown type", body = DomainError)
    ),
    tags = ["organizations"],
    operation_id = "organizationTreeCategory"
)]
#[get("/organizations/tree/category/{kind}")]
pub async fn tree_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<Vec<TreeNode>>> {
    current_user(&state, &session).await?;
    let kind: OrganizationType = path
        .parse()
        .map_err(|err| Error::invalid_request(format!("{err}")))?;
    Ok(web::Json(state.organizations.category_roots(kind).await?))
}

/// Direct children of an organisation in the tree browser.
#[utoipa::path(
    get,
    path = "/api/v1/organizations/tree/{id}",
    params(("id" = i32, Path, description = "Parent organisation id")),
    responses(
        (status = 200, description = "Children", body = [TreeNode]),
        (status = 404, description = "Not found", body = DomainError)
    ),
    tags = ["organizations"],
    operation_id = "organizationTreeChildren"
)]
#[get("/organizations/tree/{id}")]
pub async fn tree_children(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<OrganizationId>,
) -> ApiResult<web::Json<Vec<TreeNode>>> {
    current_user(&state, &session).await?;
    Ok(web::Json(
        state.organizations.tree_children(path.into_inner()).await?,
    ))
}
