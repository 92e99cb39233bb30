// src/models/composition.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::catalog::IngredientKind;

/// Um insumo e a quantidade usada (gramas, ml ou unidades, conforme o insumo).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientPortion {
    pub ingredient_id: String,
    pub quantity: Decimal,
}

// --- 1. Produtos ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub packaging_ids: Vec<String>,
    #[serde(default)]
    pub ingredients: Vec<IngredientPortion>,
    #[serde(default)]
    pub margin_pct: Decimal,
    #[serde(default)]
    pub sale_price: Decimal,
    // Derivado: recalculado a cada gravação ou refresh
    #[serde(default)]
    pub total_cost: Decimal,
}

// --- 2. Receitas ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub ingredients: Vec<IngredientPortion>,
    #[serde(default)]
    pub yield_grams: Decimal,
    #[serde(default)]
    pub total_cost: Decimal,
    #[serde(default)]
    pub cost_per_gram: Decimal,
    #[serde(default)]
    pub prep_time_minutes: Option<u32>,
    #[serde(default)]
    pub category: Option<String>,
}

// --- 3. Copos padrão ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CupSize {
    #[serde(rename = "300ml")]
    Ml300,
    #[serde(rename = "400ml")]
    Ml400,
    #[serde(rename = "500ml")]
    Ml500,
    #[serde(rename = "700ml")]
    Ml700,
    #[serde(rename = "1000ml")]
    Ml1000,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AcaiType {
    #[default]
    Tradicional,
    Zero,
    Cupuacu,
}

impl AcaiType {
    /// Tipo de insumo usado para custear a porção do copo.
    ///
    /// Os três sabores apontam hoje para o mesmo insumo genérico de açaí, então
    /// um copo de cupuaçu é custeado com o preço do açaí. Mantido assim até o
    /// catálogo ter um insumo próprio para cada sabor.
    pub fn ingredient_kind(self) -> IngredientKind {
        match self {
            AcaiType::Tradicional | AcaiType::Zero | AcaiType::Cupuacu => IngredientKind::Acai,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StandardCup {
    pub id: String,
    pub name: String,
    pub size: CupSize,
    pub portion_grams: Decimal,
    #[serde(default)]
    pub acai_type: AcaiType,
    #[serde(default)]
    pub packaging_ids: Vec<String>,
    #[serde(default)]
    pub acai_cost: Decimal,
    #[serde(default)]
    pub packaging_cost: Decimal,
    #[serde(default)]
    pub total_cost: Decimal,
    #[serde(default)]
    pub margin_pct: Decimal,
    #[serde(default)]
    pub sale_price: Decimal,
}

// --- 4. Cardápio ---

/// O que compõe um item de cardápio. O discriminante `tipo` segue os nomes já
/// gravados no documento de estado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tipo", rename_all = "lowercase")]
pub enum MenuComposition {
    #[serde(rename_all = "camelCase")]
    Complemento { ingredient_id: String, quantity: Decimal },
    #[serde(rename_all = "camelCase")]
    Receita { recipe_id: String, quantity_grams: Decimal },
    #[serde(rename_all = "camelCase")]
    Copo { cup_id: String },
    Combinado { components: Vec<ComboComponent> },
}

impl MenuComposition {
    pub fn kind_name(&self) -> &'static str {
        match self {
            MenuComposition::Complemento { .. } => "complemento",
            MenuComposition::Receita { .. } => "receita",
            MenuComposition::Copo { .. } => "copo",
            MenuComposition::Combinado { .. } => "combinado",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComboSource {
    Ingredient,
    Recipe,
    Product,
}

/// Parte de um combinado. Para insumos e receitas a quantidade é em gramas;
/// para produtos é o número de unidades.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComboComponent {
    pub source: ComboSource,
    pub ref_id: String,
    pub quantity: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub composition: MenuComposition,
    #[serde(default)]
    pub cost: Decimal,
    #[serde(default)]
    pub markup: Decimal,
    #[serde(default)]
    pub margin_pct: Decimal,
    #[serde(default)]
    pub sale_price: Decimal,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn default_active() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_acai_type_maps_to_generic_acai() {
        for t in [AcaiType::Tradicional, AcaiType::Zero, AcaiType::Cupuacu] {
            assert_eq!(t.ingredient_kind(), IngredientKind::Acai);
        }
    }

    #[test]
    fn composition_uses_tipo_discriminant() {
        let json = r#"{"tipo":"combinado","components":[
            {"source":"product","refId":"p1","quantity":2},
            {"source":"ingredient","refId":"i1","quantity":30}
        ]}"#;
        let composition: MenuComposition = serde_json::from_str(json).unwrap();
        match composition {
            MenuComposition::Combinado { components } => {
                assert_eq!(components.len(), 2);
                assert_eq!(components[0].source, ComboSource::Product);
            }
            other => panic!("composição inesperada: {:?}", other),
        }

        let copo = serde_json::to_value(MenuComposition::Copo { cup_id: "c1".into() }).unwrap();
        assert_eq!(copo["tipo"], "copo");
        assert_eq!(copo["cupId"], "c1");
    }
}
