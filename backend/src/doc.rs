//! OpenAPI documentation configuration.
//!
//! This module defines the [`ApiDoc`] struct which generates the OpenAPI
//! specification for the REST API. It registers:
//!
//! - **Paths**: every handler in the HTTP inbound adapter
//! - **Schemas**: domain records, request bodies and the error envelope
//! - **Security**: session cookie authentication scheme
//!
//! The generated specification is served by Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::ports::{Dashboard, Report, ReportSummary};
use crate::domain::{
    AuditAction, AuditEntry, Contract, ContractStatus, EntityKind, Error, ErrorCode, Role, Task,
    TaskStatus, User,
};
use crate::inbound::http::auth::LoginRequest;
use crate::inbound::http::contracts::{CreateContractRequest, UpdateContractRequest};
use crate::inbound::http::tasks::{CreateTaskRequest, UpdateTaskRequest};
use crate::inbound::http::users::{CreateUserRequest, UpdateUserRequest};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Contract workflow API",
        description = "Contracts, tasks and users behind role-based access, with an audit trail.",
        license(
            name = "Apache-2.0",
            url = "https://www.apache.org/licenses/LICENSE-2.0.html"
        )
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::auth::me,
        crate::inbound::http::dashboard::dashboard,
        crate::inbound::http::dashboard::report,
        crate::inbound::http::contracts::list_contracts,
        crate::inbound::http::contracts::create_contract,
        crate::inbound::http::contracts::get_contract,
        crate::inbound::http::contracts::update_contract,
        crate::inbound::http::contracts::delete_contract,
        crate::inbound::http::tasks::list_tasks,
        crate::inbound::http::tasks::create_task,
        crate::inbound::http::tasks::get_task,
        crate::inbound::http::tasks::update_task,
        crate::inbound::http::tasks::delete_task,
        crate::inbound::http::users::list_users,
        crate::inbound::http::users::create_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::list_assignable_users,
        crate::inbound::http::audit::audit_log,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        User,
        Role,
        Contract,
        ContractStatus,
        Task,
        TaskStatus,
        AuditEntry,
        AuditAction,
        EntityKind,
        Dashboard,
        Report,
        ReportSummary,
        Error,
        ErrorCode,
        LoginRequest,
        CreateContractRequest,
        UpdateContractRequest,
        CreateTaskRequest,
        UpdateTaskRequest,
        CreateUserRequest,
        UpdateUserRequest,
    )),
    tags(
        (name = "auth", description = "Session sign-in and sign-out"),
        (name = "contracts", description = "Contract pursuits"),
        (name = "tasks", description = "Work items under a contract"),
        (name = "users", description = "Accounts and the assignment directory"),
        (name = "views", description = "Dashboard and pipeline report"),
        (name = "audit", description = "Append-only mutation history"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying the generated document.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[rstest]
    #[case("Error", &["code", "message", "traceId", "details"])]
    #[case("User", &["id", "name", "email", "role", "active", "createdAt"])]
    #[case("Contract", &["number", "title", "officerId", "dueDate", "updatedAt"])]
    #[case("Task", &["contractId", "assignedTo", "completedAt", "notes"])]
    #[case("AuditEntry", &["actor", "action", "entity", "entityId", "before", "after"])]
    fn schemas_expose_camel_case_fields(#[case] name: &str, #[case] fields: &[&str]) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas.get(name).expect("schema registered");
        for field in fields {
            assert_object_schema_has_field(schema, field);
        }
    }

    #[rstest]
    #[case("/api/v1/login")]
    #[case("/api/v1/contracts/{id}")]
    #[case("/api/v1/tasks")]
    #[case("/api/v1/users/assignable")]
    #[case("/api/v1/audit-log")]
    #[case("/health/ready")]
    fn paths_are_registered(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[rstest]
    fn session_cookie_scheme_is_declared() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
