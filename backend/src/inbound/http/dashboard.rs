//! Read-only views: the personal dashboard and the pipeline report.
//!
//! ```text
//! GET /api/v1/dashboard
//! GET /api/v1/reports
//! ```

use actix_web::{get, web};

use crate::domain::Error;
use crate::domain::ports::{Dashboard, Report};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::current_user;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Contracts owned by and tasks assigned to the signed-in user.
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    responses(
        (status = 200, description = "Dashboard", body = Dashboard),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["views"],
    operation_id = "dashboard"
)]
#[get("/dashboard")]
pub async fn dashboard(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Dashboard>> {
    let actor = current_user(&state, &session).await?;
    state.queries.dashboard(&actor).await.map(web::Json)
}

/// Active pipeline, completed work and headline counts.
#[utoipa::path(
    get,
    path = "/api/v1/reports",
    responses(
        (status = 200, description = "Report", body = Report),
        (status = 401, description = "Not signed in", body = Error)
    ),
    tags = ["views"],
    operation_id = "report"
)]
#[get("/reports")]
pub async fn report(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Report>> {
    let actor = current_user(&state, &session).await?;
    state.queries.report(&actor).await.map(web::Json)
}
