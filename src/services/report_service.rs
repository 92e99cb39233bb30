// src/services/report_service.rs

use rust_decimal::Decimal;

use crate::{
    common::money::{div_or_zero, round_currency, round_per_gram, saturating_sum},
    db::CatalogRepository,
    models::{
        catalog::IngredientKind,
        pricing::{EntityCounts, IngredientPriceRow, MenuReportRow, PricingSummary, UnresolvedRef},
        state::PricingState,
    },
    services::cost_engine,
};

const TOP_INGREDIENTS: usize = 5;

#[derive(Clone)]
pub struct ReportService {
    repo: CatalogRepository,
    min_margin_pct: Decimal,
}

impl ReportService {
    pub fn new(repo: CatalogRepository, min_margin_pct: Decimal) -> Self {
        Self { repo, min_margin_pct }
    }

    pub async fn menu_report(&self) -> Vec<MenuReportRow> {
        self.repo.read(menu_rows).await
    }

    pub async fn summary(&self) -> PricingSummary {
        let threshold = self.min_margin_pct;
        self.repo.read(|state| summarize(state, threshold)).await
    }
}

/// Uma linha por item de cardápio, com custo recalculado agora.
pub fn menu_rows(state: &PricingState) -> Vec<MenuReportRow> {
    state
        .menu_items
        .iter()
        .map(|item| {
            let cost = cost_engine::menu_item_cost(item, state);
            MenuReportRow {
                menu_item_id: item.id.clone(),
                name: item.name.clone(),
                kind: item.composition.kind_name(),
                cost: cost.cost,
                sale_price: cost.sale_price,
                markup: cost.markup,
                margin_pct: cost.margin_pct,
                unresolved: cost.unresolved,
            }
        })
        .collect()
}

fn collect_unresolved(state: &PricingState) -> Vec<UnresolvedRef> {
    let mut all: Vec<UnresolvedRef> = Vec::new();
    let lists = state
        .products
        .iter()
        .map(|p| cost_engine::product_cost(p, state).unresolved)
        .chain(state.recipes.iter().map(|r| cost_engine::recipe_cost(r, state).unresolved))
        .chain(state.standard_cups.iter().map(|c| cost_engine::cup_cost(c, state).unresolved))
        .chain(state.menu_items.iter().map(|m| cost_engine::menu_item_cost(m, state).unresolved));

    for r in lists.flatten() {
        if !all.contains(&r) {
            all.push(r);
        }
    }
    all
}

pub fn summarize(state: &PricingState, min_margin_pct: Decimal) -> PricingSummary {
    let rows: Vec<MenuReportRow> = menu_rows(state)
        .into_iter()
        .zip(state.menu_items.iter())
        .filter(|(_, item)| item.active)
        .map(|(row, _)| row)
        .collect();

    let margins: Vec<Decimal> = rows.iter().map(|r| r.margin_pct).collect();
    let average_margin_pct = div_or_zero(saturating_sum(margins.iter().copied()), Decimal::from(margins.len()));

    let mut low_margin_items: Vec<MenuReportRow> = rows
        .iter()
        .filter(|r| r.margin_pct < min_margin_pct)
        .cloned()
        .map(MenuReportRow::rounded)
        .collect();
    low_margin_items.sort_by(|a, b| a.margin_pct.cmp(&b.margin_pct));

    let mut ingredients: Vec<IngredientPriceRow> = state
        .ingredients
        .iter()
        .filter(|i| i.active && i.kind != IngredientKind::Receita)
        .map(|i| IngredientPriceRow {
            ingredient_id: i.id.clone(),
            name: i.name.clone(),
            price_per_gram: round_per_gram(i.price_per_gram),
        })
        .collect();
    ingredients.sort_by(|a, b| b.price_per_gram.cmp(&a.price_per_gram));
    ingredients.truncate(TOP_INGREDIENTS);

    PricingSummary {
        counts: EntityCounts {
            packaging: state.packaging.len(),
            ingredients: state.ingredients.len(),
            recipes: state.recipes.len(),
            products: state.products.len(),
            standard_cups: state.standard_cups.len(),
            menu_items: state.menu_items.len(),
            suppliers: state.suppliers.len(),
        },
        average_margin_pct: round_currency(average_margin_pct),
        min_margin_pct: margins.iter().min().copied().map(round_currency),
        max_margin_pct: margins.iter().max().copied().map(round_currency),
        min_margin_threshold: min_margin_pct,
        low_margin_items,
        most_expensive_ingredients: ingredients,
        unresolved: collect_unresolved(state),
    }
}
