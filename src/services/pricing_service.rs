// src/services/pricing_service.rs

use rust_decimal::Decimal;

use crate::{
    common::error::AppError,
    db::CatalogRepository,
    models::{
        composition::{MenuItem, Product, Recipe, StandardCup},
        pricing::{CupCost, MenuItemCost, PriceQuote, PriceTarget, ProductCost, RecipeCost},
        state::{Entity, PricingState},
    },
    services::{catalog_service::warn_unresolved, cost_engine, margin},
};

/// Consultas de custo sobre o estado atual. Nada aqui grava.
#[derive(Clone)]
pub struct PricingService {
    repo: CatalogRepository,
}

impl PricingService {
    pub fn new(repo: CatalogRepository) -> Self {
        Self { repo }
    }

    async fn compute<T, R>(&self, id: &str, f: impl FnOnce(&T, &PricingState) -> R) -> Result<R, AppError>
    where
        T: Entity,
    {
        self.repo
            .read(|state| {
                state
                    .find::<T>(id)
                    .map(|entity| f(entity, state))
                    .ok_or_else(|| AppError::not_found(T::KIND, id))
            })
            .await
    }

    pub async fn product_cost(&self, id: &str) -> Result<ProductCost, AppError> {
        let cost = self.compute::<Product, _>(id, cost_engine::product_cost).await?;
        warn_unresolved(Product::KIND, id, &cost.unresolved);
        Ok(cost)
    }

    pub async fn recipe_cost(&self, id: &str) -> Result<RecipeCost, AppError> {
        let cost = self.compute::<Recipe, _>(id, cost_engine::recipe_cost).await?;
        warn_unresolved(Recipe::KIND, id, &cost.unresolved);
        Ok(cost)
    }

    pub async fn cup_cost(&self, id: &str) -> Result<CupCost, AppError> {
        let cost = self.compute::<StandardCup, _>(id, cost_engine::cup_cost).await?;
        warn_unresolved(StandardCup::KIND, id, &cost.unresolved);
        Ok(cost)
    }

    pub async fn menu_item_cost(&self, id: &str) -> Result<MenuItemCost, AppError> {
        let cost = self.compute::<MenuItem, _>(id, cost_engine::menu_item_cost).await?;
        warn_unresolved(MenuItem::KIND, id, &cost.unresolved);
        Ok(cost)
    }

    /// Cotação avulsa: custo + margem vira preço, custo + preço vira margem.
    pub fn quote(&self, cost: Decimal, target: PriceTarget) -> PriceQuote {
        match target {
            PriceTarget::Margin(m) => margin::quote_from_margin(cost, m),
            PriceTarget::SalePrice(p) => margin::quote_from_price(cost, p),
        }
    }
}
