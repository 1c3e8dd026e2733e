//! Tests for the contract handlers.

use super::*;
use crate::domain::ports::MockWorkflowCommand;
use crate::domain::{Role, User};
use crate::inbound::http::test_utils::{self, queries_for, sign_in_cookie, test_app, user};
use actix_web::http::StatusCode;
use actix_web::test as actix_test;
use chrono::{TimeZone, Utc};
use rstest::rstest;
use serde_json::{Value, json};

fn contract(id: i64, number: &str) -> Contract {
    let at = Utc
        .with_ymd_and_hms(2025, 3, 1, 12, 0, 0)
        .single()
        .expect("fixture timestamp");
    Contract {
        id: ContractId::new(id),
        number: number.to_owned(),
        title: "Vehicle Maintenance Support".to_owned(),
        agency: Some("DoD".to_owned()),
        naics: None,
        set_aside: None,
        description: None,
        status: ContractStatus::Draft,
        officer_id: None,
        due_date: None,
        created_at: at,
        updated_at: at,
    }
}

macro_rules! contracts_app {
    ($state:expr) => {
        actix_test::init_service(
            test_app($state).service(
                web::scope("/api/v1")
                    .service(list_contracts)
                    .service(create_contract)
                    .service(get_contract)
                    .service(update_contract)
                    .service(delete_contract),
            ),
        )
        .await
    };
}

#[actix_web::test]
async fn listing_passes_query_filters_through() {
    let viewer = user(3, Role::Viewer);
    let mut queries = queries_for(&viewer);
    queries
        .expect_list_contracts()
        .withf(|actor: &User, filter: &ContractFilter| {
            actor.role == Role::Viewer
                && filter.status == Some(ContractStatus::InProgress)
                && filter.officer_id == Some(UserId::new(2))
                && filter.agency_contains.as_deref() == Some("DoD")
                && filter.naics.is_none()
        })
        .times(1)
        .returning(|_, _| Ok(vec![contract(1, "RFQ-1")]));
    let app = contracts_app!(test_utils::state(MockWorkflowCommand::new(), queries));
    let cookie = sign_in_cookie!(&app, viewer);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/contracts?status=in_progress&officerId=2&agency=DoD")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body[0]["number"], "RFQ-1");
    assert_eq!(body[0]["status"], "draft");
}

#[actix_web::test]
async fn unknown_status_filter_is_a_bad_request() {
    let viewer = user(3, Role::Viewer);
    let app = contracts_app!(test_utils::state(MockWorkflowCommand::new(), queries_for(&viewer)));
    let cookie = sign_in_cookie!(&app, viewer);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/contracts?status=won")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["code"], "invalid_request");
}

#[actix_web::test]
async fn create_returns_201_with_the_stored_contract() {
    let officer = user(2, Role::Officer);
    let mut commands = MockWorkflowCommand::new();
    commands
        .expect_create_contract()
        .withf(|_, command: &CreateContract| {
            command.number == "RFQ-1" && command.title == "Test" && command.officer_id.is_none()
        })
        .times(1)
        .returning(|_, command| Ok(contract(5, &command.number)));
    let app = contracts_app!(test_utils::state(commands, queries_for(&officer)));
    let cookie = sign_in_cookie!(&app, officer);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::post()
            .uri("/api/v1/contracts")
            .cookie(cookie)
            .set_json(json!({"number": "RFQ-1", "title": "Test"}))
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["id"], 5);
}

#[rstest]
#[case(json!({}), None)]
#[case(json!({"officerId": null}), Some(None))]
#[case(json!({"officerId": 4}), Some(Some(UserId::new(4))))]
#[actix_web::test]
async fn patch_distinguishes_null_from_absent(
    #[case] body: Value,
    #[case] expected: Option<Option<UserId>>,
) {
    let officer = user(2, Role::Officer);
    let mut commands = MockWorkflowCommand::new();
    commands
        .expect_update_contract()
        .withf(move |_, id: &ContractId, patch: &ContractPatch| {
            *id == ContractId::new(7) && patch.officer_id == expected
        })
        .times(1)
        .returning(|_, id, _| Ok(contract(id.get(), "RFQ-7")));
    let app = contracts_app!(test_utils::state(commands, queries_for(&officer)));
    let cookie = sign_in_cookie!(&app, officer);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri("/api/v1/contracts/7")
            .cookie(cookie)
            .set_json(body)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[rstest]
#[case(json!({}), None, None)]
#[case(json!({"agency": null, "naics": "541330"}), Some(""), Some("541330"))]
#[case(json!({"agency": "", "naics": null}), Some(""), Some(""))]
#[actix_web::test]
async fn null_optional_text_clears_like_blank(
    #[case] body: Value,
    #[case] agency: Option<&'static str>,
    #[case] naics: Option<&'static str>,
) {
    let officer = user(2, Role::Officer);
    let mut commands = MockWorkflowCommand::new();
    commands
        .expect_update_contract()
        .withf(move |_, _, patch: &ContractPatch| {
            patch.agency.as_deref() == agency
                && patch.naics.as_deref() == naics
                && patch.title.is_none()
        })
        .times(1)
        .returning(|_, id, _| Ok(contract(id.get(), "RFQ-7")));
    let app = contracts_app!(test_utils::state(commands, queries_for(&officer)));
    let cookie = sign_in_cookie!(&app, officer);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::patch()
            .uri("/api/v1/contracts/7")
            .cookie(cookie)
            .set_json(body)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_web::test]
async fn denied_delete_surfaces_as_403() {
    let officer = user(2, Role::Officer);
    let mut commands = MockWorkflowCommand::new();
    commands
        .expect_delete_contract()
        .times(1)
        .returning(|_, _| Err(Error::forbidden("officer cannot delete")));
    let app = contracts_app!(test_utils::state(commands, queries_for(&officer)));
    let cookie = sign_in_cookie!(&app, officer);

    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::delete()
            .uri("/api/v1/contracts/1")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: Value = actix_test::read_body_json(res).await;
    assert_eq!(body["message"], "officer cannot delete");
}

#[actix_web::test]
async fn missing_contract_is_404_and_anonymous_is_401() {
    let admin = user(1, Role::Admin);
    let mut queries = queries_for(&admin);
    queries
        .expect_get_contract()
        .returning(|_, id| Err(Error::not_found(format!("contract {id} not found"))));
    let app = contracts_app!(test_utils::state(MockWorkflowCommand::new(), queries));

    let anonymous = actix_test::call_service(
        &app,
        actix_test::TestRequest::get().uri("/api/v1/contracts/9").to_request(),
    )
    .await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);

    let cookie = sign_in_cookie!(&app, admin);
    let res = actix_test::call_service(
        &app,
        actix_test::TestRequest::get()
            .uri("/api/v1/contracts/9")
            .cookie(cookie)
            .to_request(),
    )
    .await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
