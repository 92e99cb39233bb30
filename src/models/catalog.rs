// src/models/catalog.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::money::div_or_zero;

// --- 1. Fornecedores ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Supplier {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

// --- 2. Embalagens ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Packaging {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub unit_price: Decimal,
    // Compra em lote: o preço unitário passa a ser lot_price / lot_quantity
    #[serde(default)]
    pub lot_price: Option<Decimal>,
    #[serde(default)]
    pub lot_quantity: Option<Decimal>,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub supplier_id: Option<String>,
}

impl Packaging {
    /// Preço efetivo de uma unidade, considerando a compra em lote quando informada.
    pub fn effective_unit_price(&self) -> Decimal {
        match (self.lot_price, self.lot_quantity) {
            (Some(price), Some(qty)) if qty > Decimal::ZERO => div_or_zero(price, qty),
            _ => self.unit_price,
        }
    }
}

// --- 3. Insumos ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitOfMeasure {
    #[default]
    G,
    Kg,
    Ml,
    L,
    Un,
}

impl UnitOfMeasure {
    /// Quantos gramas (ou ml, ou unidades) cabem em uma unidade de compra.
    pub fn base_factor(self) -> Decimal {
        match self {
            UnitOfMeasure::G | UnitOfMeasure::Ml | UnitOfMeasure::Un => Decimal::ONE,
            UnitOfMeasure::Kg | UnitOfMeasure::L => Decimal::ONE_THOUSAND,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IngredientKind {
    #[default]
    Insumo,
    Acai,
    // Espelho sintético de uma receita
    Receita,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: IngredientKind,
    #[serde(default)]
    pub unit: UnitOfMeasure,
    #[serde(default)]
    pub purchased_quantity: Decimal,
    #[serde(default)]
    pub price_paid: Decimal,
    #[serde(default)]
    pub price_per_gram: Decimal,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub supplier_id: Option<String>,
    #[serde(default)]
    pub recipe_id: Option<String>,
}

impl Ingredient {
    /// Preço por grama derivado da compra real. Quantidade zero resulta em zero.
    pub fn derive_price_per_gram(unit: UnitOfMeasure, purchased_quantity: Decimal, price_paid: Decimal) -> Decimal {
        let grams = purchased_quantity.saturating_mul(unit.base_factor());
        if grams <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        div_or_zero(price_paid, grams)
    }

    pub fn recompute_price_per_gram(&mut self) {
        self.price_per_gram = Self::derive_price_per_gram(self.unit, self.purchased_quantity, self.price_paid);
    }
}

// --- 4. Ofertas de fornecedores ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierPriceOffer {
    pub id: String,
    pub ingredient_id: String,
    pub supplier_id: String,
    pub gross_price: Decimal,
    #[serde(default)]
    pub discounted_price: Option<Decimal>,
    #[serde(default)]
    pub unit: UnitOfMeasure,
    // Quantidade comprada pelo preço da oferta (ex: 1 kg)
    #[serde(default = "default_offer_quantity")]
    pub quantity: Decimal,
    #[serde(default)]
    pub lead_time_days: Option<u32>,
    #[serde(default)]
    pub is_default: bool,
}

impl SupplierPriceOffer {
    pub fn effective_price(&self) -> Decimal {
        self.discounted_price.unwrap_or(self.gross_price)
    }

    pub fn price_per_gram(&self) -> Decimal {
        Ingredient::derive_price_per_gram(self.unit, self.quantity, self.effective_price())
    }
}

fn default_active() -> bool {
    true
}

fn default_offer_quantity() -> Decimal {
    Decimal::ONE
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn price_per_gram_converts_kilograms() {
        let ppg = Ingredient::derive_price_per_gram(UnitOfMeasure::Kg, d("2"), d("40"));
        assert_eq!(ppg, d("0.02"));
    }

    #[test]
    fn price_per_gram_with_zero_quantity_is_zero() {
        let ppg = Ingredient::derive_price_per_gram(UnitOfMeasure::G, Decimal::ZERO, d("10"));
        assert_eq!(ppg, Decimal::ZERO);
    }

    #[test]
    fn lot_price_overrides_unit_price() {
        let packaging = Packaging {
            id: "p".into(),
            name: "Copo 500ml".into(),
            unit_price: d("1.00"),
            lot_price: Some(d("45.00")),
            lot_quantity: Some(d("50")),
            active: true,
            category: None,
            supplier_id: None,
        };
        assert_eq!(packaging.effective_unit_price(), d("0.90"));

        let no_qty = Packaging { lot_quantity: Some(Decimal::ZERO), ..packaging };
        assert_eq!(no_qty.effective_unit_price(), d("1.00"));
    }

    #[test]
    fn offer_prefers_discounted_price() {
        let offer: SupplierPriceOffer = serde_json::from_str(
            r#"{"id":"o","ingredientId":"i","supplierId":"s","grossPrice":30.0,"discountedPrice":27.5,"unit":"kg"}"#,
        )
        .unwrap();
        assert_eq!(offer.effective_price(), d("27.5"));
        assert_eq!(offer.quantity, Decimal::ONE);
        assert_eq!(offer.price_per_gram(), d("0.0275"));
    }
}
