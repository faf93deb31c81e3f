use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
    Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::models::{Report, ReportType};
use crate::routes::error_response;
use crate::scheduler;
use crate::AppState;

#[derive(Deserialize)]
pub struct ReportsQuery {
    user_id: String,
    report_type: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

#[derive(Deserialize)]
pub struct GenerateQuery {
    user_id: String,
    report_type: String,
}

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/reports", get(get_user_reports))
        .route("/reports/generate", post(generate_report))
        .route("/reports/schedule", post(schedule_reports))
        .route("/reports/:report_id", get(get_report))
        .with_state(state)
}

async fn get_user_reports(
    State(state): State<AppState>,
    Query(query): Query<ReportsQuery>,
) -> Result<Json<Vec<Report>>, (StatusCode, String)> {
    let kind = match query.report_type.as_deref() {
        None => None,
        Some(raw) => Some(ReportType::from_str(raw).ok_or((
            StatusCode::BAD_REQUEST,
            format!("Invalid report type: {raw}"),
        ))?),
    };
    let limit = query.limit.unwrap_or(10).clamp(1, 100);
    let offset = query.offset.unwrap_or(0).max(0);

    let reports = state
        .store
        .get_user_reports(&query.user_id, kind, limit, offset)
        .await
        .map_err(|e| {
            tracing::error!("❌ DB error listing reports: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "DB error".into())
        })?;

    Ok(Json(reports))
}

async fn get_report(
    State(state): State<AppState>,
    Path(report_id): Path<String>,
) -> Result<Json<Report>, (StatusCode, String)> {
    let report = state.store.get_report(&report_id).await.map_err(|e| {
        tracing::error!("❌ DB error fetching report {report_id}: {e}");
        (StatusCode::INTERNAL_SERVER_ERROR, "DB error".into())
    })?;

    report
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "Report not found".into()))
}

async fn generate_report(
    State(state): State<AppState>,
    Query(query): Query<GenerateQuery>,
) -> Result<Json<Report>, (StatusCode, String)> {
    let report = state
        .reports
        .generate_on_demand(&query.user_id, &query.report_type)
        .await
        .map_err(error_response)?;
    Ok(Json(report))
}

async fn schedule_reports(
    State(state): State<AppState>,
) -> Result<Json<Value>, (StatusCode, String)> {
    let users = state.store.get_all_users().await.map_err(|e| {
        tracing::error!("❌ DB error loading users for scheduling: {e}");
        (StatusCode::INTERNAL_SERVER_ERROR, "DB error".into())
    })?;

    let today = Utc::now().date_naive();
    let scheduled = scheduler::schedule_for_date(&state.reports, &users, today)
        .await
        .map_err(error_response)?;

    Ok(Json(json!({
        "status": "Reports scheduled successfully",
        "scheduled": scheduled.len(),
    })))
}
