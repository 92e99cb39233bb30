// src/models/state.rs

use serde::{Deserialize, Serialize};

use crate::models::{
    catalog::{Ingredient, Packaging, Supplier, SupplierPriceOffer},
    composition::{MenuItem, Product, Recipe, StandardCup},
};

/// O documento inteiro, como é gravado no armazenamento.
///
/// Não há campo de versão: coleções ausentes em documentos antigos viram listas vazias.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PricingState {
    pub packaging: Vec<Packaging>,
    pub ingredients: Vec<Ingredient>,
    pub products: Vec<Product>,
    pub menu_items: Vec<MenuItem>,
    pub recipes: Vec<Recipe>,
    pub suppliers: Vec<Supplier>,
    pub supplier_offers: Vec<SupplierPriceOffer>,
    pub standard_cups: Vec<StandardCup>,
}

/// Uma coleção do documento, endereçável por id.
pub trait Entity: Clone + Send + Sync + 'static {
    /// Nome usado em logs e mensagens de erro.
    const KIND: &'static str;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: String);
    fn table(state: &PricingState) -> &Vec<Self>;
    fn table_mut(state: &mut PricingState) -> &mut Vec<Self>;
}

macro_rules! entity_table {
    ($ty:ty, $kind:literal, $field:ident) => {
        impl Entity for $ty {
            const KIND: &'static str = $kind;

            fn id(&self) -> &str {
                &self.id
            }

            fn set_id(&mut self, id: String) {
                self.id = id;
            }

            fn table(state: &PricingState) -> &Vec<Self> {
                &state.$field
            }

            fn table_mut(state: &mut PricingState) -> &mut Vec<Self> {
                &mut state.$field
            }
        }
    };
}

entity_table!(Packaging, "packaging", packaging);
entity_table!(Ingredient, "ingredient", ingredients);
entity_table!(Product, "product", products);
entity_table!(MenuItem, "menu_item", menu_items);
entity_table!(Recipe, "recipe", recipes);
entity_table!(Supplier, "supplier", suppliers);
entity_table!(SupplierPriceOffer, "supplier_offer", supplier_offers);
entity_table!(StandardCup, "standard_cup", standard_cups);

impl PricingState {
    /// Busca linear por id. As coleções são pequenas (dezenas a centenas de registros).
    pub fn find<T: Entity>(&self, id: &str) -> Option<&T> {
        T::table(self).iter().find(|e| e.id() == id)
    }

    pub fn find_mut<T: Entity>(&mut self, id: &str) -> Option<&mut T> {
        T::table_mut(self).iter_mut().find(|e| e.id() == id)
    }

    /// Insere ou substitui pelo id. Retorna `true` quando o registro já existia.
    pub fn upsert<T: Entity>(&mut self, entity: T) -> bool {
        let table = T::table_mut(self);
        match table.iter_mut().find(|e| e.id() == entity.id()) {
            Some(existing) => {
                *existing = entity;
                true
            }
            None => {
                table.push(entity);
                false
            }
        }
    }

    /// Remove pelo id. Dependentes não são tocados.
    pub fn remove<T: Entity>(&mut self, id: &str) -> Option<T> {
        let table = T::table_mut(self);
        let pos = table.iter().position(|e| e.id() == id)?;
        Some(table.remove(pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_collections_default_to_empty() {
        let state: PricingState = serde_json::from_str(
            r#"{"packaging":[{"id":"a","name":"Tampa","unitPrice":0.3}]}"#,
        )
        .unwrap();
        assert_eq!(state.packaging.len(), 1);
        assert!(state.ingredients.is_empty());
        assert!(state.standard_cups.is_empty());
        assert!(state.packaging[0].active);
    }

    #[test]
    fn upsert_replaces_by_id_and_remove_leaves_others() {
        let mut state = PricingState::default();
        let supplier = Supplier {
            id: "s1".into(),
            name: "Distribuidora Norte".into(),
            contact_name: None,
            phone: None,
            email: None,
            active: true,
            created_at: chrono::Utc::now(),
        };
        assert!(!state.upsert(supplier.clone()));
        assert!(state.upsert(Supplier { name: "Distribuidora Sul".into(), ..supplier.clone() }));
        assert_eq!(state.suppliers.len(), 1);
        assert_eq!(state.find::<Supplier>("s1").unwrap().name, "Distribuidora Sul");

        assert!(state.remove::<Supplier>("nope").is_none());
        assert!(state.remove::<Supplier>("s1").is_some());
        assert!(state.suppliers.is_empty());
    }
}
