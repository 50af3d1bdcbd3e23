//! Skills and ministries.
//!
//! ```text
//! GET /api/v1/skills?zoeken=data
//! POST /api/v1/skills {"name":"Data Scientist"}   201 when new, 200 when known
//! ```

use actix_web::{HttpResponse, delete, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, Ministry, MinistryId, Skill, SkillId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_user;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Query for `GET /skills`.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
pub struct SkillSearch {
    /// Case-insensitive part of the name.
    #[serde(default, rename = "zoeken")]
    pub search: Option<String>,
}

/// Body for `POST /skills`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct SkillRequest {
    /// Skill name; surrounding whitespace is ignored.
    pub name: String,
}

/// Skills, optionally filtered by a name fragment.
#[utoipa::path(
    get,
    path = "/api/v1/skills",
    params(SkillSearch),
    responses((status = 200, description = "Skills", body = [Skill])),
    tags = ["catalogue"],
    operation_id = "listSkills"
)]
#[get("/skills")]
pub async fn list_skills(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<SkillSearch>,
) -> ApiResult<web::Json<Vec<Skill>>> {
    current_user(&state, &session).await?;
    let skills = state.catalogue.search_skills(query.search.as_deref()).await?;
    Ok(web::Json(skills))
}

/// Get or create a skill by name.
#[utoipa::path(
    post,
    path = "/api/v1/skills",
    request_body = SkillRequest,
    responses(
        (status = 200, description = "Existing skill", body = Skill),
        (status = 201, description = "Created", body = Skill),
        (status = 400, description = "Invalid name", body = DomainError)
    ),
    tags = ["catalogue"],
    operation_id = "createSkill"
)]
#[post("/skills")]
pub async fn create_skill(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SkillRequest>,
) -> ApiResult<HttpResponse> {
    current_user(&state, &session).await?;
    let lookup = state.catalogue.get_or_create_skill(&payload.name).await?;
    let mut response = if lookup.created {
        HttpResponse::Created()
    } else {
        HttpResponse::Ok()
    };
    Ok(response.json(lookup.skill))
}

/// Delete a skill; services keep running without one.
#[utoipa::path(
    delete,
    path = "/api/v1/skills/{id}",
    params(("id" = i32, Path, description = "Skill id")),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Forbidden", body = DomainError),
        (status = 404, description = "Not found", body = DomainError)
    ),
    tags = ["catalogue"],
    operation_id = "deleteSkill"
)]
#[delete("/skills/{id}")]
pub async fn delete_skill(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<SkillId>,
) -> ApiResult<HttpResponse> {
    let user = current_user(&state, &session).await?;
    state.catalogue.delete_skill(&user, path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Every ministry.
#[utoipa::path(
    get,
    path = "/api/v1/ministries",
    responses((status = 200, description = "Ministries", body = [Ministry])),
    tags = ["catalogue"],
    operation_id = "listMinistries"
)]
#[get("/ministries")]
pub async fn list_ministries(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<Ministry>>> {
    current_user(&state, &session).await?;
    Ok(web::Json(state.catalogue.ministries().await?))
}

/// One ministry.
#[utoipa::path(
    get,
    path = "/api/v1/ministries/{id}",
    params(("id" = i32, Path, description = "Ministry id")),
    responses(
        (status = 200, description = "Ministry", body = Ministry),
        (status = 404, description = "Not found", body = DomainError)
    ),
    tags = ["catalogue"],
    operation_id = "getMinistry"
)]
#[get("/ministries/{id}")]
pub async fn get_ministry(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<MinistryId>,
) -> ApiResult<web::Json<Ministry>> {
    current_user(&state, &session).await?;
    Ok(web::Json(state.catalogue.ministry(path.into_inner()).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::inbound::http::test_utils::{TestApp, login_cookie};
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("Data Scientist", StatusCode::CREATED)]
    #[case("Data Analist", StatusCode::OK)]
    #[case("  Data Analist ", StatusCode::OK)]
    #[actix_web::test]
    async fn posting_a_skill_reports_whether_it_is_new(
        #[case] second_name: &str,
        #[case] expected: StatusCode,
    ) {
        let app = TestApp::new().await;
        app.db
            .seed_user("jan@rijksoverheid.nl", &[Role::Consultant], false)
            .await
            .expect("seed user");
        let service = test::init_service(app.build()).await;
        let cookie = login_cookie(&service, "jan@rijksoverheid.nl").await;

        let first = test::call_service(
            &service,
            test::TestRequest::post()
                .uri("/api/v1/skills")
                .cookie(cookie.clone())
                .set_json(json!({"name": "Data Analist"}))
                .to_request(),
        )
        .await;
        assert_eq!(first.status(), StatusCode::CREATED);

        let second = test::call_service(
            &service,
            test::TestRequest::post()
                .uri("/api/v1/skills")
                .cookie(cookie)
                .set_json(json!({ "name": second_name }))
                .to_request(),
        )
        .await;
        assert_eq!(second.status(), expected);
    }

    #[actix_web::test]
    async fn unknown_ministry_is_not_found() {
        let app = TestApp::new().await;
        app.db
            .seed_user("jan@rijksoverheid.nl", &[], false)
            .await
            .expect("seed user");
        let service = test::init_service(app.build()).await;
        let cookie = login_cookie(&service, "jan@rijksoverheid.nl").await;
        let res = test::call_service(
            &service,
            test::TestRequest::get()
                .uri("/api/v1/ministries/77")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
