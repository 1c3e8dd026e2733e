//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpResponse, web};
use chrono::{TimeZone, Utc};

use crate::domain::ports::{MockWorkflowCommand, MockWorkflowQuery};
use crate::domain::{Email, Role, User, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{json_error_handler, query_error_handler};

/// Path of the helper route that signs a user id into the session.
pub const SIGN_IN_PATH: &str = "/__test/sign-in";

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Account fixture named after its role.
pub fn user(id: i64, role: Role) -> User {
    User {
        id: UserId::new(id),
        name: format!("{} {id}", role.label()),
        email: Email::new(format!("{}{id}@example.com", role.as_str())).expect("fixture email"),
        role,
        active: true,
        created_at: Utc
            .with_ymd_and_hms(2025, 1, 1, 9, 0, 0)
            .single()
            .expect("fixture timestamp"),
    }
}

/// Query mock that resolves `actor` for every authenticated request.
pub fn queries_for(actor: &User) -> MockWorkflowQuery {
    let mut queries = MockWorkflowQuery::new();
    let resolved = actor.clone();
    queries
        .expect_resolve_actor()
        .times(0..)
        .returning(move |_| Ok(resolved.clone()));
    queries
}

/// Bundle the mocks into handler state.
pub fn state(commands: MockWorkflowCommand, queries: MockWorkflowQuery) -> HttpState {
    HttpState::new(Arc::new(commands), Arc::new(queries))
}

async fn sign_in(session: SessionContext, id: web::Path<i64>) -> ApiResult<HttpResponse> {
    session.persist_user(UserId::new(id.into_inner()))?;
    Ok(HttpResponse::NoContent().finish())
}

/// App with sessions, JSON error handlers and the sign-in helper route.
pub fn test_app(
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
    App::new()
        .app_data(web::Data::new(state))
        .app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .app_data(web::QueryConfig::default().error_handler(query_error_handler))
        .wrap(test_session_middleware())
        .route(
            &format!("{SIGN_IN_PATH}/{{id}}"),
            web::post().to(sign_in),
        )
}

/// Session cookie set by a response.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}

/// Sign `user` in through the helper route and return the cookie.
macro_rules! sign_in_cookie {
    ($app:expr, $user:expr) => {{
        let request = ::actix_web::test::TestRequest::post()
            .uri(&format!(
                "{}/{}",
                $crate::inbound::http::test_utils::SIGN_IN_PATH,
                $user.id
            ))
            .to_request();
        let response = ::actix_web::test::call_service($app, request).await;
        assert!(response.status().is_success(), "sign-in helper failed");
        $crate::inbound::http::test_utils::session_cookie(&response)
    }};
}

pub(crate) use sign_in_cookie;
