//! End-to-end staffing flow through the HTTP API against a migrated SQLite
//! database.

use actix_web::http::StatusCode;
use actix_web::test;
use rstest::rstest;
use serde::{Deserialize, Serialize};
use serde_json::json;

use wies::domain::Role;
use wies::test_support::TestDatabase;

mod support;

use support::{api_app, get_json, id_of, login, post_json};

/// Filter row with a fixed field order for snapshots.
#[derive(Debug, Deserialize, Serialize)]
struct FilterRow {
    filter_key: String,
    id: Option<i64>,
    label: String,
    position: usize,
    is_first: bool,
    is_last: bool,
}

#[actix_web::test]
async fn staffing_an_assignment_shows_up_everywhere() {
    let db = TestDatabase::new().await.expect("test database");
    db.seed_user("root@rijksoverheid.nl", &[], true)
        .await
        .expect("seed superuser");
    let service = test::init_service(api_app(db.state())).await;
    let cookie = login(&service, "root@rijksoverheid.nl").await;

    let (status, ministry) = post_json(
        &service,
        &cookie,
        "/api/v1/organizations",
        json!({"name": "Ministerie van Binnenlandse Zaken", "abbreviation": "BZK", "organization_type": "ministerie"}),
    )
    .await;
    assert_eq!(status, 201);

    let (status, skill) = post_json(
        &service,
        &cookie,
        "/api/v1/skills",
        json!({"name": "Data Scientist"}),
    )
    .await;
    assert_eq!(status, 201);

    let (status, colleague) = post_json(
        &service,
        &cookie,
        "/api/v1/colleagues",
        json!({"name": "Anna de Vries", "email": "anna@rijksoverheid.nl"}),
    )
    .await;
    assert_eq!(status, 201);

    let (status, assignment) = post_json(
        &service,
        &cookie,
        "/api/v1/assignments",
        json!({
            "name": "Datalab",
            "status": "INGEVULD",
            "start_date": "2026-01-01",
            "end_date": "2026-12-31",
            "organizations": [
                {"organization_id": id_of(&ministry), "role": "PRIMARY"}
            ]
        }),
    )
    .await;
    assert_eq!(status, 201, "{assignment}");

    let (status, service_body) = post_json(
        &service,
        &cookie,
        &format!("/api/v1/assignments/{}/services", id_of(&assignment)),
        json!({"description": "Analyse", "skill_id": id_of(&skill), "hours_per_week": 36}),
    )
    .await;
    assert_eq!(status, 201, "{service_body}");

    let (status, placement) = post_json(
        &service,
        &cookie,
        "/api/v1/placements",
        json!({
            "colleague_id": id_of(&colleague),
            "service_id": id_of(&service_body),
            "hours_per_week": 32
        }),
    )
    .await;
    assert_eq!(status, 201, "{placement}");

    let (status, listing) = get_json(&service, &cookie, "/api/v1/placements?zoeken=anna").await;
    assert_eq!(status, 200);
    assert_eq!(listing["total"], 1);
    assert_eq!(listing["rows"][0]["assignment_name"], "Datalab");
    assert_eq!(listing["rows"][0]["hours_per_week"], 32);

    let (status, detail) = get_json(
        &service,
        &cookie,
        &format!("/api/v1/colleagues/{}", id_of(&colleague)),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(detail["placements"][0]["assignment_name"], "Datalab");

    let (status, board) = get_json(&service, &cookie, "/api/v1/assignments/board").await;
    assert_eq!(status, 200);
    let filled = board
        .as_array()
        .expect("columns")
        .iter()
        .find(|column| column["status"] == "INGEVULD")
        .expect("filled column");
    assert_eq!(filled["cards"][0]["name"], "Datalab");
}

#[actix_web::test]
async fn moving_a_card_changes_its_column() {
    let db = TestDatabase::new().await.expect("test database");
    db.seed_user("root@rijksoverheid.nl", &[], true)
        .await
        .expect("seed superuser");
    let service = test::init_service(api_app(db.state())).await;
    let cookie = login(&service, "root@rijksoverheid.nl").await;

    let (_, assignment) = post_json(
        &service,
        &cookie,
        "/api/v1/assignments",
        json!({"name": "Verkenning"}),
    )
    .await;
    let (status, card) = post_json(
        &service,
        &cookie,
        &format!("/api/v1/assignments/{}/move", id_of(&assignment)),
        json!({"status": "VACATURE"}),
    )
    .await;
    assert_eq!(status, 200, "{card}");

    let (_, detail) = get_json(
        &service,
        &cookie,
        &format!("/api/v1/assignments/{}", id_of(&assignment)),
    )
    .await;
    assert_eq!(detail["status"], "VACATURE");
}

#[rstest]
#[case(&[Role::Consultant], 403)]
#[case(&[Role::BusinessDevelopmentManager], 201)]
#[actix_web::test]
async fn only_sales_roles_create_assignments(#[case] roles: &[Role], #[case] expected: u16) {
    let db = TestDatabase::new().await.expect("test database");
    db.seed_user("iemand@rijksoverheid.nl", roles, false)
        .await
        .expect("seed user");
    let service = test::init_service(api_app(db.state())).await;
    let cookie = login(&service, "iemand@rijksoverheid.nl").await;

    let (status, _) = post_json(
        &service,
        &cookie,
        "/api/v1/assignments",
        json!({"name": "Nieuwe opdracht"}),
    )
    .await;
    assert_eq!(status, expected);
}

#[actix_web::test]
async fn responses_carry_a_trace_id() {
    let db = TestDatabase::new().await.expect("test database");
    let service = test::init_service(api_app(db.state())).await;
    let res = test::call_service(
        &service,
        test::TestRequest::get().uri("/api/v1/me").to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let header = res
        .headers()
        .get("trace-id")
        .expect("trace id header")
        .to_str()
        .expect("ascii")
        .to_owned();
    let body: serde_json::Value = test::read_body_json(res).await;
    assert_eq!(body["traceId"], header);
}

#[actix_web::test]
async fn fresh_database_lists_the_default_filter_order() {
    let db = TestDatabase::new().await.expect("test database");
    db.seed_user("beheer@rijksoverheid.nl", &[Role::Beheerder], false)
        .await
        .expect("seed user");
    let service = test::init_service(api_app(db.state())).await;
    let cookie = login(&service, "beheer@rijksoverheid.nl").await;

    let (status, filters) = get_json(&service, &cookie, "/api/v1/filters").await;
    assert_eq!(status, 200);
    let rows: Vec<FilterRow> = serde_json::from_value(filters).expect("filter rows");
    insta::assert_json_snapshot!("default_filter_order", rows);
}
