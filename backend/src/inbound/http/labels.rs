//! Label categories and their labels.

use actix_web::{HttpResponse, delete, get, post, put, web};

use crate::domain::{
    DomainError, Label, LabelCategory, LabelCategoryId, LabelCategoryInput,
    LabelCategoryWithLabels, LabelId, LabelInput,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_user;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Label categories with their labels.
#[utoipa::path(
    get,
    path = "/api/v1/labels/categories",
    responses((status = 200, description = "Categories with labels", body = [LabelCategoryWithLabels])),
    tags = ["labels"],
    operation_id = "listLabelCategories"
)]
#[get("/labels/categories")]
pub async fn list_categories(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<LabelCategoryWithLabels>>> {
    current_user(&state, &session).await?;
    Ok(web::Json(state.labels.categories().await?))
}

/// Create a category; it is appended to the filter order.
#[utoipa::path(
    post,
    path = "/api/v1/labels/categories",
    request_body = LabelCategoryInput,
    responses(
        (status = 201, description = "Created", body = LabelCategory),
        (status = 400, description = "Invalid name or colour", body = DomainError),
        (status = 403, description = "Forbidden", body = DomainError),
        (status = 409, description = "Name taken", body = DomainError)
    ),
    tags = ["labels"],
    operation_id = "createLabelCategory"
)]
#[post("/labels/categories")]
pub async fn create_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LabelCategoryInput>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&state, &session).await?;
    let category = state.labels.create_category(&user, &payload).await?;
    Ok(HttpResponse::Created().json(category))
}

/// Rename or recolour a label category.
#[utoipa::path(
    put,
    path = "/api/v1/labels/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    request_body = LabelCategoryInput,
    responses(
        (status = 200, description = "Updated", body = LabelCategory),
        (status = 404, description = "Not found", body = DomainError)
    ),
    tags = ["labels"],
    operation_id = "updateLabelCategory"
)]
#[put("/labels/categories/{id}")]
pub async fn update_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<LabelCategoryId>,
    payload: web::Json<LabelCategoryInput>,
) -> ApiResult<web::Json<LabelCategory>> {
    let user = current_user(&state, &session).await?;
    let category = state
        .labels
        .update_category(&user, path.into_inner(), &payload)
        .await?;
    Ok(web::Json(category))
}

/// Delete a category with its labels.
#[utoipa::path(
    delete,
    path = "/api/v1/labels/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = DomainError)
    ),
    tags = ["labels"],
    operation_id = "deleteLabelCategory"
)]
#[delete("/labels/categories/{id}")]
pub async fn delete_category(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<LabelCategoryId>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&state, &session).await?;
    state.labels.delete_category(&user, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Add a label to a category.
#[utoipa::path(
    post,
    path = "/api/v1/labels/categories/{id}/labels",
    params(("id" = i32, Path, description = "Category id")),
    request_body = LabelInput,
    responses(
        (status = 201, description = "Created", body = Label),
        (status = 409, description = "Name taken in this category", body = DomainError)
    ),
    tags = ["labels"],
    operation_id = "createLabel"
)]
#[post("/labels/categories/{id}/labels")]
pub async fn create_label(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<LabelCategoryId>,
    payload: web::Json<LabelInput>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&state, &session).await?;
    let label = state
        .labels
        .create_label(&user, path.into_inner(), &payload)
        .await?;
    Ok(HttpResponse::Created().json(label))
}

/// Rename a label.
#[utoipa::path(
    put,
    path = "/api/v1/labels/{id}",
    params(("id" = i32, Path, description = "Label id")),
    request_body = LabelInput,
    responses(
        (status = 200, description = "Renamed", body = Label),
        (status = 404, description = "Not found", body = DomainError)
    ),
    tags = ["labels"],
    operation_id = "updateLabel"
)]
#[put("/labels/{id}")]
pub async fn update_label(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<LabelId>,
    payload: web::Json<LabelInput>,
) -> ApiResult<web::Json<Label>> {
    let user = current_user(&state, &session).await?;
    let label = state
        .labels
        .update_label(&user, path.into_inner(), &payload)
        .await?;
    Ok(web::Json(label))
}

/// Delete a label.
#[utoipa::path(
    delete,
    path = "/api/v1/labels/{id}",
    params(("id" = i32, Path, description = "Label id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 404, description = "Not found", body = DomainError)
    ),
    tags = ["labels"],
    operation_id = "deleteLabel"
)]
#[delete("/labels/{id}")]
pub async fn delete_label(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<LabelId>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&state, &session).await?;
    state.labels.delete_label(&user, path.into_inner()).await?;
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
    async fn categories_and_labels_round_trip_through_the_api() {
        let app = TestApp::new().await;
        app.db
            .seed_user("beheer@rijksoverheid.nl", &[Role::Beheerder], false)
            .await
            .expect("seed user");
        let service = test::init_service(app.build()).await;
        let cookie = login_cookie(&service, "beheer@rijksoverheid.nl").await;

        let res = test::call_service(
            &service,
            test::TestRequest::post()
                .uri("/api/v1/labels/categories")
                .cookie(cookie.clone())
                .set_json(json!({"name": "Team", "color": "#AABBCC"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let category: Value = test::read_body_json(res).await;
        let category_id = category["id"].as_i64().expect("category id");

        let res = test::call_service(
            &service,
            test::TestRequest::post()
                .uri(&format!("/api/v1/labels/categories/{category_id}/labels"))
                .cookie(cookie.clone())
                .set_json(json!({"name": "Data"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = test::call_service(
            &service,
            test::TestRequest::post()
                .uri(&format!("/api/v1/labels/categories/{category_id}/labels"))
                .cookie(cookie.clone())
                .set_json(json!({"name": "Data"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CONFLICT);

        let res = test::call_service(
            &service,
            test::TestRequest::get()
                .uri("/api/v1/labels/categories")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let listed: Value = test::read_body_json(res).await;
        let team = listed
            .as_array()
            .expect("categories")
            .iter()
            .find(|entry| entry["name"] == "Team")
            .expect("team category listed");
        assert_eq!(team["labels"][0]["name"], "Data");
    }

    #[actix_web::test]
    async fn invalid_colour_is_a_bad_request() {
        let app = TestApp::new().await;
        app.db
            .seed_user("beheer@rijksoverheid.nl", &[Role::Beheerder], false)
            .await
            .expect("seed user");
        let service = test::init_service(app.build()).await;
        let cookie = login_cookie(&service, "beheer@rijksoverheid.nl").await;
        let res = test::call_service(
            &service,
            test::TestRequest::post()
                .uri("/api/v1/labels/categories")
                .cookie(cookie)
                .set_json(json!({"name": "Team", "color": "blauw"}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
