// src/services/simulation_service.rs

// Simulação "e se": aplica reajustes numa cópia do estado e compara o cardápio antes e depois.

use rust_decimal::Decimal;

use crate::{
    common::{
        error::AppError,
        money::{div_or_zero, MAX_AMOUNT, MAX_PERCENT, MIN_PERCENT},
    },
    db::CatalogRepository,
    models::{
        catalog::{Ingredient, IngredientKind, Packaging},
        pricing::{
            AdjustmentTarget, PriceAdjustment, PriceChange, RefKind, SimulatedItem, SimulationResult,
            UnresolvedRef,
        },
        state::PricingState,
    },
    services::{
        catalog_service::{refresh_state, sync_recipe_mirrors},
        cost_engine,
        margin::{margin_from_price, price_from_margin},
    },
};

#[derive(Clone)]
pub struct SimulationService {
    repo: CatalogRepository,
}

impl SimulationService {
    pub fn new(repo: CatalogRepository) -> Self {
        Self { repo }
    }

    pub async fn simulate(&self, adjustments: &[PriceAdjustment]) -> Result<SimulationResult, AppError> {
        let current = self.repo.snapshot().await;
        let result = simulate(&current, adjustments)?;
        tracing::info!(
            "Simulação com {} reajustes afetou {} itens do cardápio",
            adjustments.len(),
            result.affected_items
        );
        Ok(result)
    }
}

fn check_change(change: PriceChange) -> Result<(), AppError> {
    match change {
        PriceChange::NewPrice(price) if price.is_sign_negative() && !price.is_zero() => {
            Err(AppError::InvalidInput("O novo preço não pode ser negativo.".into()))
        }
        PriceChange::NewPrice(price) if price > MAX_AMOUNT => {
            Err(AppError::InvalidInput("O novo preço excede o máximo permitido.".into()))
        }
        PriceChange::Percent(pct) if pct < MIN_PERCENT || pct > MAX_PERCENT => {
            Err(AppError::InvalidInput("Percentual de reajuste fora da faixa permitida.".into()))
        }
        _ => Ok(()),
    }
}

fn changed(value: Decimal, change: PriceChange) -> Decimal {
    match change {
        PriceChange::NewPrice(price) => price,
        PriceChange::Percent(pct) => {
            value.saturating_mul(Decimal::ONE.saturating_add(div_or_zero(pct, Decimal::ONE_HUNDRED)))
        }
    }
}

/// Aplica os reajustes em `state`. Devolve os alvos que não existem.
fn apply_adjustments(
    state: &mut PricingState,
    adjustments: &[PriceAdjustment],
) -> Result<Vec<UnresolvedRef>, AppError> {
    let mut unknown = Vec::new();
    for adj in adjustments {
        check_change(adj.change)?;
        match adj.target {
            AdjustmentTarget::Ingredient => match state.find_mut::<Ingredient>(&adj.id) {
                // O preço do espelho vem da receita e seria sobrescrito na sincronização
                Some(ingredient) if ingredient.kind == IngredientKind::Receita => {
                    return Err(AppError::InvalidInput(format!(
                        "O insumo '{}' espelha uma receita. Reajuste os insumos da receita.",
                        ingredient.name
                    )));
                }
                Some(ingredient) => {
                    let ppg = changed(ingredient.price_per_gram, adj.change);
                    // O preço pago passa a refletir o novo preço por grama
                    ingredient.price_paid = ppg
                        .saturating_mul(ingredient.purchased_quantity)
                        .saturating_mul(ingredient.unit.base_factor());
                    ingredient.price_per_gram = ppg;
                }
                None => unknown.push(UnresolvedRef { kind: RefKind::Ingredient, id: adj.id.clone() }),
            },
            AdjustmentTarget::Packaging => match state.find_mut::<Packaging>(&adj.id) {
                Some(packaging) => {
                    packaging.unit_price = changed(packaging.effective_unit_price(), adj.change);
                    packaging.lot_price = None;
                    packaging.lot_quantity = None;
                }
                None => unknown.push(UnresolvedRef { kind: RefKind::Packaging, id: adj.id.clone() }),
            },
        }
    }
    Ok(unknown)
}

/// Os dois lados passam pela mesma sincronização e recálculo, então só os reajustes geram diferença.
pub fn simulate(current: &PricingState, adjustments: &[PriceAdjustment]) -> Result<SimulationResult, AppError> {
    let mut baseline = current.clone();
    sync_recipe_mirrors(&mut baseline);
    refresh_state(&mut baseline);

    let mut simulated = baseline.clone();
    let unknown_targets = apply_adjustments(&mut simulated, adjustments)?;
    sync_recipe_mirrors(&mut simulated);
    refresh_state(&mut simulated);

    let mut items: Vec<SimulatedItem> = current
        .menu_items
        .iter()
        .map(|item| {
            let (current_cost, _) = cost_engine::composition_cost(&item.composition, &baseline);
            let (simulated_cost, _) = cost_engine::composition_cost(&item.composition, &simulated);
            let current_margin = margin_from_price(current_cost, item.sale_price);

            SimulatedItem {
                menu_item_id: item.id.clone(),
                name: item.name.clone(),
                sale_price: item.sale_price,
                current_cost,
                simulated_cost,
                cost_delta: simulated_cost.saturating_sub(current_cost),
                current_margin_pct: current_margin,
                simulated_margin_pct: margin_from_price(simulated_cost, item.sale_price),
                price_to_keep_margin: price_from_margin(simulated_cost, current_margin),
            }
        })
        .collect();

    items.sort_by(|a, b| b.cost_delta.cmp(&a.cost_delta));
    let affected_items = items.iter().filter(|i| !i.cost_delta.is_zero()).count();

    Ok(SimulationResult { items, affected_items, unknown_targets })
}
