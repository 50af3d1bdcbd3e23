//! Shared helpers for the HTTP integration suites.

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use serde_json::{Value, json};

use wies::Trace;
use wies::inbound::http::configure;
use wies::inbound::http::state::HttpState;

/// The API as the server mounts it, with a throwaway session key.
pub fn api_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let session = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build();
    App::new()
        .app_data(web::Data::new(state))
        .wrap(Trace)
        .service(web::scope("/api/v1").wrap(session).configure(configure))
}

/// Sign in by e-mail and return the session cookie.
pub async fn login<S, B>(service: &S, email: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(
        service,
        test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(json!({ "email": email }))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "login failed: {}", res.status());
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// POST `body` as JSON and return status and decoded body.
pub async fn post_json<S, B>(
    service: &S,
    cookie: &Cookie<'static>,
    uri: &str,
    body: Value,
) -> (u16, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(
        service,
        test::TestRequest::post()
            .uri(uri)
            .cookie(cookie.clone())
            .set_json(body)
            .to_request(),
    )
    .await;
    let status = res.status().as_u16();
    let bytes = test::read_body(res).await;
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// GET `uri` and return status and decoded body.
pub async fn get_json<S, B>(service: &S, cookie: &Cookie<'static>, uri: &str) -> (u16, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(
        service,
        test::TestRequest::get()
            .uri(uri)
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    let status = res.status().as_u16();
    let bytes = test::read_body(res).await;
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

/// Numeric `id` field of a created resource.
pub fn id_of(value: &Value) -> i64 {
    value["id"].as_i64().expect("response carries an id")
}
