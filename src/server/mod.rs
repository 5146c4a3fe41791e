use anyhow::{Context, Result};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::board::BoardItem;
use crate::dashboards::{DashboardCatalog, DashboardSelection, items_for};
use crate::research::{ResearchError, normalize_response};

#[derive(Clone)]
struct AppState {
    catalog: DashboardCatalog,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct NormalizeRequest {
    response: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthBody {
    status: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DashboardBody {
    selection: DashboardSelection,
    name: Option<String>,
    items: Vec<BoardItem>,
}

pub fn router() -> Router {
    let state = AppState {
        catalog: DashboardCatalog::default(),
    };
    Router::new()
        .route("/health", get(handle_health))
        .route("/catalog", get(handle_catalog))
        .route("/dashboards/:folder_id/:dashboard_id", get(handle_dashboard))
        .route("/research/normalize", post(handle_normalize))
        .with_state(state)
}

pub async fn run_http_server(bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind HTTP server to `{bind}`"))?;
    let local_addr = listener.local_addr().ok();

    info!(
        requested_bind = %bind,
        bound_addr = local_addr.map(|addr| addr.to_string()),
        "starting HTTP server"
    );

    axum::serve(listener, router())
        .await
        .context("HTTP server exited with an error")
}

async fn handle_health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

async fn handle_catalog(State(state): State<AppState>) -> Json<DashboardCatalog> {
    Json(state.catalog)
}

async fn handle_dashboard(
    State(state): State<AppState>,
    Path((folder_id, dashboard_id)): Path<(u32, u32)>,
) -> Json<DashboardBody> {
    let selection = DashboardSelection::new(folder_id, dashboard_id);
    Json(DashboardBody {
        selection,
        name: state.catalog.dashboard_name(selection).map(str::to_owned),
        items: items_for(selection),
    })
}

async fn handle_normalize(Json(req): Json<NormalizeRequest>) -> Response {
    match normalize_response(&req.response) {
        Ok(normalized) => (StatusCode::OK, Json(normalized)).into_response(),
        Err(error) => {
            let status = status_code_for_error(&error);
            warn!(
                status = status.as_u16(),
                error = %error,
                "HTTP normalize request failed"
            );
            let body = ErrorBody {
                error: error.to_string(),
            };
            (status, Json(body)).into_response()
        }
    }
}

fn status_code_for_error(error: &ResearchError) -> StatusCode {
    match error {
        ResearchError::MalformedResponse { .. } | ResearchError::SchemaViolation { .. } => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}
