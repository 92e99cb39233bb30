// src/handlers/compositions.rs

// Produtos, receitas, copos padrão e cardápio: cadastro e custo.

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
    handlers::{
        catalog::created_or_ok,
        entities::{price_target, validate_amount, validate_percent},
    },
    middleware::i18n::Locale,
    models::composition::{
        AcaiType, CupSize, IngredientPortion, MenuComposition, MenuItem, Product, Recipe, StandardCup,
    },
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PortionPayload {
    #[validate(length(min = 1, message = "O campo 'ingredientId' é obrigatório."))]
    pub ingredient_id: String,

    #[validate(custom(function = "validate_amount"))]
    pub quantity: Decimal,
}

fn portions(payload: Vec<PortionPayload>) -> Vec<IngredientPortion> {
    payload
        .into_iter()
        .map(|p| IngredientPortion { ingredient_id: p.ingredient_id, quantity: p.quantity })
        .collect()
}

// ---
// Produtos
// ---
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[serde(default)]
    pub packaging_ids: Vec<String>,

    #[validate(nested)]
    #[serde(default)]
    pub ingredients: Vec<PortionPayload>,

    #[validate(custom(function = "validate_percent"))]
    pub margin_pct: Option<Decimal>,

    #[validate(custom(function = "validate_amount"))]
    pub sale_price: Option<Decimal>,
}

pub async fn create_product(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<ProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    save_product(app_state, locale, None, payload).await
}

pub async fn update_product(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
    Json(payload): Json<ProductPayload>,
) -> Result<impl IntoResponse, ApiError> {
    save_product(app_state, locale, Some(id), payload).await
}

async fn save_product(
    app_state: AppState,
    locale: Locale,
    id: Option<String>,
    payload: ProductPayload,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;
    let target = price_target(payload.margin_pct, payload.sale_price).map_err(|e| e.to_api_error(&locale))?;

    let product = Product {
        id: String::new(),
        name: payload.name,
        packaging_ids: payload.packaging_ids,
        ingredients: portions(payload.ingredients),
        margin_pct: Decimal::ZERO,
        sale_price: Decimal::ZERO,
        total_cost: Decimal::ZERO,
    };

    let product = app_state
        .catalog_service
        .save_product(id.as_deref(), product, target)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((created_or_ok(&id), Json(product)))
}

pub async fn product_cost(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let cost = app_state
        .pricing_service
        .product_cost(&id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(cost.rounded())))
}

// ---
// Receitas
// ---
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RecipePayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    #[validate(nested)]
    #[serde(default)]
    pub ingredients: Vec<PortionPayload>,

    // Rendimento em gramas
    #[validate(custom(function = "validate_amount"))]
    pub yield_grams: Decimal,

    pub prep_time_minutes: Option<u32>,
    pub category: Option<String>,
}

pub async fn create_recipe(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<RecipePayload>,
) -> Result<impl IntoResponse, ApiError> {
    save_recipe(app_state, locale, None, payload).await
}

pub async fn update_recipe(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
    Json(payload): Json<RecipePayload>,
) -> Result<impl IntoResponse, ApiError> {
    save_recipe(app_state, locale, Some(id), payload).await
}

async fn save_recipe(
    app_state: AppState,
    locale: Locale,
    id: Option<String>,
    payload: RecipePayload,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let recipe = Recipe {
        id: String::new(),
        name: payload.name,
        ingredients: portions(payload.ingredients),
        yield_grams: payload.yield_grams,
        total_cost: Decimal::ZERO,
        cost_per_gram: Decimal::ZERO,
        prep_time_minutes: payload.prep_time_minutes,
        category: payload.category,
    };

    let recipe = app_state
        .catalog_service
        .save_recipe(id.as_deref(), recipe)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((created_or_ok(&id), Json(recipe)))
}

pub async fn recipe_cost(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let cost = app_state
        .pricing_service
        .recipe_cost(&id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(cost.rounded())))
}

// ---
// Copos padrão
// ---
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CupPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    pub size: CupSize,

    #[validate(custom(function = "validate_amount"))]
    pub portion_grams: Decimal,

    #[serde(default)]
    pub acai_type: AcaiType,

    #[serde(default)]
    pub packaging_ids: Vec<String>,

    #[validate(custom(function = "validate_percent"))]
    pub margin_pct: Option<Decimal>,

    #[validate(custom(function = "validate_amount"))]
    pub sale_price: Option<Decimal>,
}

pub async fn create_cup(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<CupPayload>,
) -> Result<impl IntoResponse, ApiError> {
    save_cup(app_state, locale, None, payload).await
}

pub async fn update_cup(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
    Json(payload): Json<CupPayload>,
) -> Result<impl IntoResponse, ApiError> {
    save_cup(app_state, locale, Some(id), payload).await
}

async fn save_cup(
    app_state: AppState,
    locale: Locale,
    id: Option<String>,
    payload: CupPayload,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;
    let target = price_target(payload.margin_pct, payload.sale_price).map_err(|e| e.to_api_error(&locale))?;

    let cup = StandardCup {
        id: String::new(),
        name: payload.name,
        size: payload.size,
        portion_grams: payload.portion_grams,
        acai_type: payload.acai_type,
        packaging_ids: payload.packaging_ids,
        acai_cost: Decimal::ZERO,
        packaging_cost: Decimal::ZERO,
        total_cost: Decimal::ZERO,
        margin_pct: Decimal::ZERO,
        sale_price: Decimal::ZERO,
    };

    let cup = app_state
        .catalog_service
        .save_cup(id.as_deref(), cup, target)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((created_or_ok(&id), Json(cup)))
}

pub async fn cup_cost(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let cost = app_state
        .pricing_service
        .cup_cost(&id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(cost.rounded())))
}

// ---
// Cardápio
// ---
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemPayload {
    #[validate(length(min = 1, message = "O nome é obrigatório."))]
    pub name: String,

    pub description: Option<String>,

    pub composition: MenuComposition,

    #[validate(custom(function = "validate_percent"))]
    pub margin_pct: Option<Decimal>,

    #[validate(custom(function = "validate_amount"))]
    pub sale_price: Option<Decimal>,

    pub active: Option<bool>,
}

pub async fn create_menu_item(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<MenuItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    save_menu_item(app_state, locale, None, payload).await
}

pub async fn update_menu_item(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
    Json(payload): Json<MenuItemPayload>,
) -> Result<impl IntoResponse, ApiError> {
    save_menu_item(app_state, locale, Some(id), payload).await
}

async fn save_menu_item(
    app_state: AppState,
    locale: Locale,
    id: Option<String>,
    payload: MenuItemPayload,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;
    let target = price_target(payload.margin_pct, payload.sale_price).map_err(|e| e.to_api_error(&locale))?;

    let now = Utc::now();
    let item = MenuItem {
        id: String::new(),
        name: payload.name,
        description: payload.description,
        composition: payload.composition,
        cost: Decimal::ZERO,
        markup: Decimal::ZERO,
        margin_pct: Decimal::ZERO,
        sale_price: Decimal::ZERO,
        active: payload.active.unwrap_or(true),
        created_at: now,
        updated_at: now,
    };

    let item = app_state
        .catalog_service
        .save_menu_item(id.as_deref(), item, target)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((created_or_ok(&id), Json(item)))
}

pub async fn menu_item_cost(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let cost = app_state
        .pricing_service
        .menu_item_cost(&id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(cost.rounded())))
}
