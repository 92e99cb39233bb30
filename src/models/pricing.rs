// src/models/pricing.rs

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::money::{round_currency, round_per_gram};

/// Tipo do registro que uma composição referencia.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefKind {
    Packaging,
    Ingredient,
    Recipe,
    Product,
    StandardCup,
    // Nenhum insumo ativo do tipo açaí para custear um copo
    AcaiSource,
}

/// Referência que não pôde ser resolvida e entrou no custo como zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedRef {
    pub kind: RefKind,
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCost {
    pub packaging_cost: Decimal,
    pub ingredient_cost: Decimal,
    pub total_cost: Decimal,
    pub sale_price: Decimal,
    pub margin_pct: Decimal,
    pub profit: Decimal,
    pub unresolved: Vec<UnresolvedRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeCost {
    pub total_cost: Decimal,
    pub yield_grams: Decimal,
    pub cost_per_gram: Decimal,
    pub unresolved: Vec<UnresolvedRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CupCost {
    pub acai_ingredient_id: Option<String>,
    pub acai_cost: Decimal,
    pub packaging_cost: Decimal,
    pub total_cost: Decimal,
    pub sale_price: Decimal,
    pub margin_pct: Decimal,
    pub profit: Decimal,
    pub unresolved: Vec<UnresolvedRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItemCost {
    pub cost: Decimal,
    pub sale_price: Decimal,
    pub markup: Decimal,
    pub margin_pct: Decimal,
    pub unresolved: Vec<UnresolvedRef>,
}

/// Como o preço de um item é fixado: pela margem (o preço sai do custo) ou pelo preço (a margem sai do custo).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceTarget {
    Margin(Decimal),
    SalePrice(Decimal),
}

/// Resultado da cotação bidirecional de margem.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub cost: Decimal,
    pub sale_price: Decimal,
    pub margin_pct: Decimal,
    pub markup: Decimal,
}

// --- Sincronização e recálculo ---

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshReport {
    pub ingredients: usize,
    pub recipes: usize,
    pub products: usize,
    pub standard_cups: usize,
    pub menu_items: usize,
    pub unresolved: Vec<UnresolvedRef>,
}

// --- Simulação ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentTarget {
    Ingredient,
    Packaging,
}

/// Novo preço absoluto (por grama para insumos, por unidade para embalagens) ou variação percentual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PriceChange {
    NewPrice(Decimal),
    Percent(Decimal),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceAdjustment {
    pub target: AdjustmentTarget,
    pub id: String,
    pub change: PriceChange,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedItem {
    pub menu_item_id: String,
    pub name: String,
    pub sale_price: Decimal,
    pub current_cost: Decimal,
    pub simulated_cost: Decimal,
    pub cost_delta: Decimal,
    pub current_margin_pct: Decimal,
    pub simulated_margin_pct: Decimal,
    /// Preço necessário para manter a margem atual com o custo simulado.
    pub price_to_keep_margin: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub items: Vec<SimulatedItem>,
    pub affected_items: usize,
    pub unknown_targets: Vec<UnresolvedRef>,
}

// --- Relatórios ---

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityCounts {
    pub packaging: usize,
    pub ingredients: usize,
    pub recipes: usize,
    pub products: usize,
    pub standard_cups: usize,
    pub menu_items: usize,
    pub suppliers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuReportRow {
    pub menu_item_id: String,
    pub name: String,
    pub kind: &'static str,
    pub cost: Decimal,
    pub sale_price: Decimal,
    pub markup: Decimal,
    pub margin_pct: Decimal,
    pub unresolved: Vec<UnresolvedRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientPriceRow {
    pub ingredient_id: String,
    pub name: String,
    pub price_per_gram: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingSummary {
    pub counts: EntityCounts,
    pub average_margin_pct: Decimal,
    pub min_margin_pct: Option<Decimal>,
    pub max_margin_pct: Option<Decimal>,
    pub min_margin_threshold: Decimal,
    pub low_margin_items: Vec<MenuReportRow>,
    pub most_expensive_ingredients: Vec<IngredientPriceRow>,
    pub unresolved: Vec<UnresolvedRef>,
}

// --- Arredondamento na borda (respostas da API e relatórios) ---

impl ProductCost {
    pub fn rounded(self) -> Self {
        Self {
            packaging_cost: round_currency(self.packaging_cost),
            ingredient_cost: round_currency(self.ingredient_cost),
            total_cost: round_currency(self.total_cost),
            sale_price: round_currency(self.sale_price),
            margin_pct: round_currency(self.margin_pct),
            profit: round_currency(self.profit),
            unresolved: self.unresolved,
        }
    }
}

impl RecipeCost {
    pub fn rounded(self) -> Self {
        Self {
            total_cost: round_currency(self.total_cost),
            yield_grams: self.yield_grams,
            cost_per_gram: round_per_gram(self.cost_per_gram),
            unresolved: self.unresolved,
        }
    }
}

impl CupCost {
    pub fn rounded(self) -> Self {
        Self {
            acai_ingredient_id: self.acai_ingredient_id,
            acai_cost: round_currency(self.acai_cost),
            packaging_cost: round_currency(self.packaging_cost),
            total_cost: round_currency(self.total_cost),
            sale_price: round_currency(self.sale_price),
            margin_pct: round_currency(self.margin_pct),
            profit: round_currency(self.profit),
            unresolved: self.unresolved,
        }
    }
}

impl MenuItemCost {
    pub fn rounded(self) -> Self {
        Self {
            cost: round_currency(self.cost),
            sale_price: round_currency(self.sale_price),
            markup: round_currency(self.markup),
            margin_pct: round_currency(self.margin_pct),
            unresolved: self.unresolved,
        }
    }
}

impl PriceQuote {
    pub fn rounded(self) -> Self {
        Self {
            cost: round_currency(self.cost),
            sale_price: round_currency(self.sale_price),
            margin_pct: round_currency(self.margin_pct),
            markup: round_currency(self.markup),
        }
    }
}

impl SimulatedItem {
    pub fn rounded(self) -> Self {
        Self {
            sale_price: round_currency(self.sale_price),
            current_cost: round_currency(self.current_cost),
            simulated_cost: round_currency(self.simulated_cost),
            cost_delta: round_currency(self.cost_delta),
            current_margin_pct: round_currency(self.current_margin_pct),
            simulated_margin_pct: round_currency(self.simulated_margin_pct),
            price_to_keep_margin: round_currency(self.price_to_keep_margin),
            ..self
        }
    }
}

impl MenuReportRow {
    pub fn rounded(self) -> Self {
        Self {
            cost: round_currency(self.cost),
            sale_price: round_currency(self.sale_price),
            markup: round_currency(self.markup),
            margin_pct: round_currency(self.margin_pct),
            ..self
        }
    }
}
