//! Tests for the sign-in handlers.

use super::*;
use crate::domain::ports::{MockWorkflowCommand, MockWorkflowQuery};
use crate::domain::{Email, Role};
use crate::inbound::http::test_utils::{self, sign_in_cookie, test_app, user};
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use rstest::rstest;
use serde_json::{Value, json};

fn with_lookup(found: Option<User>) -> MockWorkflowQuery {
    let mut queries = MockWorkflowQuery::new();
    queries
        .expect_find_user_by_email()
        .times(1)
        .returning(move |_| Ok(found.clone()));
    queries
}

async fn post_login(state: HttpState, body: Value) -> actix_web::dev::ServiceResponse {
    let app = actix_test::init_service(
        test_app(state).service(web::scope("/api/v1").service(login)),
    )
    .await;
    let request = actix_test::TestRequest::post()
        .uri("/api/v1/login")
        .set_json(body)
        .to_request();
    actix_test::call_service(&app, request).await
}

#[actix_web::test]
async fn known_user_signs_in() {
    let officer = user(2, Role::Officer);
    let state = test_utils::state(MockWorkflowCommand::new(), with_lookup(Some(officer.clone())));

    let res = post_login(state, json!({"email": "officer2@example.com"})).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.response().cookies().any(|cookie| cookie.name() == "session"));
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["id"], 2);
    assert_eq!(body["role"], "officer");
}

#[rstest]
#[case(false, StatusCode::UNAUTHORIZED)]
#[case(true, StatusCode::OK)]
#[actix_web::test]
async fn unknown_email_depends_on_auto_provisioning(
    #[case] auto_provision: bool,
    #[case] expected: StatusCode,
) {
    let mut commands = MockWorkflowCommand::new();
    commands
        .expect_provision_user()
        .times(usize::from(auto_provision))
        .returning(|name, email: Email| {
            assert_eq!(name.as_deref(), Some("Grace"));
            let mut provisioned = user(9, Role::Officer);
            provisioned.email = email;
            Ok(provisioned)
        });
    let state =
        test_utils::state(commands, with_lookup(None)).with_auto_provision(auto_provision);

    let res = post_login(state, json!({"email": "grace@example.com", "name": "Grace"})).await;
    assert_eq!(res.status(), expected);
}

#[actix_web::test]
async fn inactive_accounts_are_refused() {
    let mut viewer = user(3, Role::Viewer);
    viewer.active = false;
    let state = test_utils::state(MockWorkflowCommand::new(), with_lookup(Some(viewer)));

    let res = post_login(state, json!({"email": "viewer3@example.com"})).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert!(!res.response().cookies().any(|cookie| cookie.name() == "session"));
}

#[actix_web::test]
async fn malformed_email_is_a_bad_request() {
    let state = test_utils::state(MockWorkflowCommand::new(), MockWorkflowQuery::new());

    let res = post_login(state, json!({"email": "nobody"})).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["details"]["field"], "email");
}

#[actix_web::test]
async fn me_requires_a_session_and_logout_ends_it() {
    let admin = user(1, Role::Admin);
    let state = test_utils::state(MockWorkflowCommand::new(), test_utils::queries_for(&admin));
    let app = actix_test::init_service(
        test_app(state).service(web::scope("/api/v1").service(me).service(logout)),
    )
    .await;

    let anonymous =
        actix_test::call_service(&app, actix_test::TestRequest::get().uri("/api/v1/me").to_request())
            .await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let cookie = sign_in_cookie!(&app, admin);
    let signed_in = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/me")
            .cookie(cookie.clone())
            .to_request(),
    )
    .await;
    assert_eq!(signed_in.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(signed_in).await;
    assert_eq!(body["email"], "admin1@example.com");

    let out = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/logout")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(out.status(), StatusCode::NO_CONTENT);
}
