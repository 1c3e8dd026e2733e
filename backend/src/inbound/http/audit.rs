//! Audit log endpoint.
//!
//! ```text
//! GET /api/v1/audit-log?limit=200
//! ```

use actix_web::{get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{AuditEntry, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_user;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Page size for the audit log.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AuditLogQuery {
    /// Entries to return; clamped to 1..=1000, default 1000.
    pub limit: Option<u32>,
}

/// Newest audit entries first. Admin only.
#[utoipa::path(
    get,
    path = "/api/v1/audit-log",
    params(AuditLogQuery),
    responses(
        (status = 200, description = "Audit entries", body = [AuditEntry]),
        (status = 401, description = "Not signed in", body = Error),
        (status = 403, description = "Admin only", body = Error)
    ),
    tags = ["audit"],
    operation_id = "auditLog"
)]
#[get("/audit-log")]
pub async fn audit_log(
    state: web::Data<HttpState>,
    session: SessionContext,
    query: web::Query<AuditLogQuery>,
) -> ApiResult<web::Json<Vec<AuditEntry>>> {
    let actor = current_user(&state, &session).await?;
    state
        .queries
        .audit_log(&actor, query.into_inner().limit)
        .await
        .map(web::Json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockWorkflowCommand;
    use crate::domain::{AuditAction, AuditEntryId, EntityKind, Role, SYSTEM_ACTOR};
    use crate::inbound::http::test_utils::{self, queries_for, sign_in_cookie, test_app, user};
    use actix_web::http::StatusCode;
    use actix_web::test as actix_test;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;
    use serde_json::{Value, json};

    fn seeded_entry() -> AuditEntry {
        AuditEntry {
            id: AuditEntryId::new(1),
            at: Utc
                .with_ymd_and_hms(2025, 6, 2, 8, 0, 0)
                .single()
                .expect("fixture timestamp"),
            user_id: None,
            actor: SYSTEM_ACTOR.to_owned(),
            action: AuditAction::Create,
            entity: EntityKind::User,
            entity_id: 1,
            before: None,
            after: Some(json!({"id": 1, "name": "Admin"})),
        }
    }

    #[rstest]
    #[case("/api/v1/audit-log", None)]
    #[case("/api/v1/audit-log?limit=25", Some(25))]
    #[actix_web::test]
    async fn limit_is_forwarded(#[case] uri: &str, #[case] expected: Option<u32>) {
        let admin = user(1, Role::Admin);
        let mut queries = queries_for(&admin);
        queries
            .expect_audit_log()
            .withf(move |_, limit: &Option<u32>| *limit == expected)
            .times(1)
            .returning(|_, _| Ok(vec![seeded_entry()]));
        let app = actix_test::init_service(
            test_app(test_utils::state(MockWorkflowCommand::new(), queries))
                .service(web::scope("/api/v1").service(audit_log)),
        )
        .await;
        let cookie = sign_in_cookie!(&app, admin);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri(uri).cookie(cookie).to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = actix_test::read_body_json(res).await;
        assert_eq!(body[0]["actor"], "system");
        assert_eq!(body[0]["userId"], Value::Null);
        assert_eq!(body[0]["before"], Value::Null);
    }

    #[actix_web::test]
    async fn negative_limit_is_a_bad_request() {
        let admin = user(1, Role::Admin);
        let app = actix_test::init_service(
            test_app(test_utils::state(MockWorkflowCommand::new(), queries_for(&admin)))
                .service(web::scope("/api/v1").service(audit_log)),
        )
        .await;
        let cookie = sign_in_cookie!(&app, admin);

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/api/v1/audit-log?limit=-1")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
