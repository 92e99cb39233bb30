// src/handlers/catalog.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    handlers::entities::validate_amount,
    middleware::i18n::Locale,
    models::catalog::{Ingredient, IngredientKind, Packaging, Supplier, SupplierPriceOffer, UnitOfMeasure},
};

// ---
// Fornecedores
// ---
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SupplierPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,
    pub contact_name: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "E-mail inválido."))]
    pub email: Option<String>,
    pub active: Option<bool>,
}

impl SupplierPayload {
    fn into_model(self) -> Supplier {
        Supplier {
            id: String::new(),
            name: self.name,
            contact_name: self.contact_name,
            phone: self.phone,
            email: self.email,
            active: self.active.unwrap_or(true),
            created_at: Utc::now(),
        }
    }
}

pub async fn create_supplier(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<SupplierPayload>,
) -> Result<impl IntoResponse, ApiError> {
    save_supplier(app_state, locale, None, payload).await
}

pub async fn update_supplier(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
    Json(payload): Json<SupplierPayload>,
) -> Result<impl IntoResponse, ApiError> {
    save_supplier(app_state, locale, Some(id), payload).await
}

async fn save_supplier(
    app_state: AppState,
    locale: Locale,
    id: Option<String>,
    payload: SupplierPayload,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let supplier = app_state
        .catalog_service
        .save_supplier(id.as_deref(), payload.into_model())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((created_or_ok(&id), Json(supplier)))
}

// ---
// Embalagens
// ---
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PackagingPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(custom(function = "validate_amount"))]
    #[serde(default)]
    pub unit_price: Decimal,

    #[validate(custom(function = "validate_amount"))]
    pub lot_price: Option<Decimal>,

    #[validate(custom(function = "validate_amount"))]
    pub lot_quantity: Option<Decimal>,

    pub active: Option<bool>,
    pub category: Option<String>,
    pub supplier_id: Option<String>,
}

impl PackagingPayload {
    fn into_model(self) -> Packaging {
        Packaging {
            id: String::new(),
            name: self.name,
            unit_price: self.unit_price,
            lot_price: self.lot_price,
            lot_quantity: self.lot_quantity,
            active: self.active.unwrap_or(true),
            category: self.category,
            supplier_id: self.supplier_id,
        }
    }
}

pub async fn create_packaging(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<PackagingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    save_packaging(app_state, locale, None, payload).await
}

pub async fn update_packaging(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
    Json(payload): Json<PackagingPayload>,
) -> Result<impl IntoResponse, ApiError> {
    save_packaging(app_state, locale, Some(id), payload).await
}

async fn save_packaging(
    app_state: AppState,
    locale: Locale,
    id: Option<String>,
    payload: PackagingPayload,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let packaging = app_state
        .catalog_service
        .save_packaging(id.as_deref(), payload.into_model())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((created_or_ok(&id), Json(packaging)))
}

// ---
// Insumos
// ---
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IngredientPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[serde(default)]
    pub kind: IngredientKind,

    #[serde(default)]
    pub unit: UnitOfMeasure,

    #[validate(custom(function = "validate_amount"))]
    pub purchased_quantity: Decimal,

    // Preço real pago pela quantidade comprada
    #[validate(custom(function = "validate_amount"))]
    pub price_paid: Decimal,

    pub active: Option<bool>,
    pub category: Option<String>,
    pub supplier_id: Option<String>,
}

impl IngredientPayload {
    fn into_model(self) -> Ingredient {
        Ingredient {
            id: String::new(),
            name: self.name,
            kind: self.kind,
            unit: self.unit,
            purchased_quantity: self.purchased_quantity,
            price_paid: self.price_paid,
            price_per_gram: Decimal::ZERO,
            active: self.active.unwrap_or(true),
            category: self.category,
            supplier_id: self.supplier_id,
            recipe_id: None,
        }
    }
}

pub async fn create_ingredient(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<IngredientPayload>,
) -> Result<impl IntoResponse, ApiError> {
    save_ingredient(app_state, locale, None, payload).await
}

pub async fn update_ingredient(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
    Json(payload): Json<IngredientPayload>,
) -> Result<impl IntoResponse, ApiError> {
    save_ingredient(app_state, locale, Some(id), payload).await
}

async fn save_ingredient(
    app_state: AppState,
    locale: Locale,
    id: Option<String>,
    payload: IngredientPayload,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let ingredient = app_state
        .catalog_service
        .save_ingredient(id.as_deref(), payload.into_model())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((created_or_ok(&id), Json(ingredient)))
}

// ---
// Ofertas de fornecedores
// ---
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct OfferPayload {
    #[validate(length(min = 1, message = "O campo 'ingredientId' é obrigatório."))]
    pub ingredient_id: String,

    #[validate(length(min = 1, message = "O campo 'supplierId' é obrigatório."))]
    pub supplier_id: String,

    #[validate(custom(function = "validate_amount"))]
    pub gross_price: Decimal,

    #[validate(custom(function = "validate_amount"))]
    pub discounted_price: Option<Decimal>,

    #[serde(default)]
    pub unit: UnitOfMeasure,

    #[validate(custom(function = "validate_amount"))]
    pub quantity: Option<Decimal>,

    pub lead_time_days: Option<u32>,

    #[serde(default)]
    pub is_default: bool,
}

impl OfferPayload {
    fn into_model(self) -> SupplierPriceOffer {
        SupplierPriceOffer {
            id: String::new(),
            ingredient_id: self.ingredient_id,
            supplier_id: self.supplier_id,
            gross_price: self.gross_price,
            discounted_price: self.discounted_price,
            unit: self.unit,
            quantity: self.quantity.unwrap_or(Decimal::ONE),
            lead_time_days: self.lead_time_days,
            is_default: self.is_default,
        }
    }
}

pub async fn create_offer(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<OfferPayload>,
) -> Result<impl IntoResponse, ApiError> {
    save_offer(app_state, locale, None, payload).await
}

pub async fn update_offer(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
    Json(payload): Json<OfferPayload>,
) -> Result<impl IntoResponse, ApiError> {
    save_offer(app_state, locale, Some(id), payload).await
}

async fn save_offer(
    app_state: AppState,
    locale: Locale,
    id: Option<String>,
    payload: OfferPayload,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let offer = app_state
        .supplier_service
        .save_offer(id.as_deref(), payload.into_model())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((created_or_ok(&id), Json(offer)))
}

pub async fn delete_offer(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .supplier_service
        .delete_offer(&id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// GET /api/ingredients/{id}/offers
pub async fn list_ingredient_offers(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(ingredient_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let offers = app_state
        .supplier_service
        .offers_for_ingredient(&ingredient_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(offers)))
}

// GET /api/ingredients/{id}/offers/best
pub async fn best_ingredient_offer(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(ingredient_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let offer = app_state
        .supplier_service
        .best_offer(&ingredient_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?
        .ok_or_else(|| AppError::not_found("supplier_offer", ingredient_id).to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(offer)))
}

// POST /api/offers/{id}/default
pub async fn set_default_offer(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(offer_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let ingredient = app_state
        .supplier_service
        .set_default_offer(&offer_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(ingredient)))
}

pub(crate) fn created_or_ok(id: &Option<String>) -> StatusCode {
    if id.is_some() { StatusCode::OK } else { StatusCode::CREATED }
}
