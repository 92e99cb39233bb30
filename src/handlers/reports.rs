// src/handlers/reports.rs

use axum::{extract::State, response::IntoResponse, Json};

use crate::{config::AppState, models::pricing::MenuReportRow};

// GET /api/reports/summary
pub async fn summary(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(app_state.report_service.summary().await)
}

// GET /api/reports/menu
pub async fn menu(State(app_state): State<AppState>) -> impl IntoResponse {
    let rows: Vec<MenuReportRow> = app_state
        .report_service
        .menu_report()
        .await
        .into_iter()
        .map(MenuReportRow::rounded)
        .collect();
    Json(rows)
}
