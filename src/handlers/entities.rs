// src/handlers/entities.rs

// Handlers genéricos de leitura e remoção, instanciados por coleção no roteador.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;
use validator::ValidationError;

use crate::{
    common::{
        error::{ApiError, AppError},
        money::{MAX_AMOUNT, MAX_PERCENT, MIN_PERCENT},
    },
    config::AppState,
    middleware::i18n::Locale,
    models::{pricing::PriceTarget, state::Entity},
};

// GET /api/<coleção>
pub async fn list<T>(State(app_state): State<AppState>) -> impl IntoResponse
where
    T: Entity + Serialize,
{
    Json(app_state.catalog_service.list::<T>().await)
}

// GET /api/<coleção>/{id}
pub async fn get_one<T>(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    T: Entity + Serialize,
{
    let entity = app_state
        .catalog_service
        .get::<T>(&id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(entity)))
}

// DELETE /api/<coleção>/{id}
// Não há cascata: quem referencia o registro passa a custear zero para ele.
pub async fn delete_one<T>(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
    T: Entity,
{
    app_state
        .catalog_service
        .delete::<T>(&id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// ---
// Validações compartilhadas pelos payloads
// ---
/// Preços e quantidades: de zero até `MAX_AMOUNT`.
pub fn validate_amount(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    if *val > MAX_AMOUNT {
        let mut err = ValidationError::new("range");
        err.add_param("max".into(), &MAX_AMOUNT);
        err.message = Some("O valor excede o máximo permitido.".into());
        return Err(err);
    }
    Ok(())
}

/// Margens e variações percentuais, entre -100% e `MAX_PERCENT`.
pub fn validate_percent(val: &Decimal) -> Result<(), ValidationError> {
    if *val < MIN_PERCENT || *val > MAX_PERCENT {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &MIN_PERCENT);
        err.add_param("max".into(), &MAX_PERCENT);
        err.message = Some("Percentual fora da faixa permitida.".into());
        return Err(err);
    }
    Ok(())
}

/// Exatamente um entre margem e preço de venda precisa ser informado.
pub fn price_target(margin_pct: Option<Decimal>, sale_price: Option<Decimal>) -> Result<PriceTarget, AppError> {
    match (margin_pct, sale_price) {
        (Some(margin), None) => Ok(PriceTarget::Margin(margin)),
        (None, Some(price)) => Ok(PriceTarget::SalePrice(price)),
        (Some(_), Some(_)) => Err(AppError::InvalidInput(
            "Informe a margem ou o preço de venda, não os dois.".into(),
        )),
        (None, None) => Err(AppError::InvalidInput("Informe a margem ou o preço de venda.".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_target_requires_exactly_one_side() {
        let ten = Decimal::TEN;
        assert_eq!(price_target(Some(ten), None).unwrap(), PriceTarget::Margin(ten));
        assert_eq!(price_target(None, Some(ten)).unwrap(), PriceTarget::SalePrice(ten));
        assert!(price_target(Some(ten), Some(ten)).is_err());
        assert!(price_target(None, None).is_err());
    }

    #[test]
    fn amounts_must_be_within_range() {
        assert!(validate_amount(&Decimal::NEGATIVE_ONE).is_err());
        assert!(validate_amount(&Decimal::ZERO).is_ok());
        assert!(validate_amount(&MAX_AMOUNT).is_ok());
        assert!(validate_amount(&(MAX_AMOUNT + Decimal::ONE)).is_err());
    }

    #[test]
    fn percentages_must_be_within_range() {
        assert!(validate_percent(&MIN_PERCENT).is_ok());
        assert!(validate_percent(&Decimal::from(-101)).is_err());
        assert!(validate_percent(&MAX_PERCENT).is_ok());
        assert!(validate_percent(&Decimal::from(100_000_000)).is_err());
    }
}
