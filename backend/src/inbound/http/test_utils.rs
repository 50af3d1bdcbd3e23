//! Test helpers for inbound HTTP components.

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, test, web};
use serde_json::json;

use crate::inbound::http::state::HttpState;
use crate::test_support::TestDatabase;

/// Session middleware with a fresh key and the `Secure` flag off for
/// plain-HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Temporary database plus the state wired to it.
pub struct TestApp {
    /// Migrated database backing the app.
    pub db: TestDatabase,
    /// State handed to the handlers.
    pub state: HttpState,
}

impl TestApp {
    /// Create a fresh database and its state.
    pub async fn new() -> Self {
        let db = TestDatabase::new().await.expect("test database");
        let state = db.state();
        Self { db, state }
    }

    /// The `/api/v1` scope behind a test session middleware.
    pub fn build(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(web::Data::new(self.state.clone()))
            .wrap(test_session_middleware())
            .service(web::scope("/api/v1").configure(super::configure))
    }
}

/// Sign in through `POST /login` and return the session cookie.
pub async fn login_cookie<S, B>(service: &S, email: &str) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
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
