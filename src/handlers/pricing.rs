// src/handlers/pricing.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    handlers::entities::{price_target, validate_amount, validate_percent},
    middleware::i18n::Locale,
    models::pricing::{PriceAdjustment, SimulatedItem},
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuotePayload {
    #[validate(custom(function = "validate_amount"))]
    pub cost: Decimal,
    #[validate(custom(function = "validate_percent"))]
    pub margin_pct: Option<Decimal>,
    #[validate(custom(function = "validate_amount"))]
    pub sale_price: Option<Decimal>,
}

// POST /api/pricing/quote
pub async fn quote(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<QuotePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;
    let target = price_target(payload.margin_pct, payload.sale_price).map_err(|e| e.to_api_error(&locale))?;

    let quote = app_state.pricing_service.quote(payload.cost, target);
    Ok((StatusCode::OK, Json(quote.rounded())))
}

// POST /api/pricing/refresh
pub async fn refresh(State(app_state): State<AppState>, locale: Locale) -> Result<impl IntoResponse, ApiError> {
    let report = app_state
        .catalog_service
        .refresh_derived()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(report)))
}

// POST /api/recipes/sync-ingredients
pub async fn sync_recipe_ingredients(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let report = app_state
        .catalog_service
        .sync_recipe_ingredients()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(report)))
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SimulationPayload {
    #[validate(length(min = 1, message = "Informe ao menos um reajuste."))]
    pub adjustments: Vec<PriceAdjustment>,
}

// POST /api/simulation
pub async fn simulate(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<SimulationPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let mut result = app_state
        .simulation_service
        .simulate(&payload.adjustments)
        .await
        .map_err(|e| e.to_api_error(&locale))?;
    result.items = result.items.into_iter().map(SimulatedItem::rounded).collect();

    Ok((StatusCode::OK, Json(result)))
}
