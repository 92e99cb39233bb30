// src/services/supplier_service.rs

use crate::{
    common::error::AppError,
    db::CatalogRepository,
    models::{
        catalog::{Ingredient, Supplier, SupplierPriceOffer},
        state::PricingState,
    },
    services::catalog_service::{new_id, refresh_state},
};

#[derive(Clone)]
pub struct SupplierService {
    repo: CatalogRepository,
}

impl SupplierService {
    pub fn new(repo: CatalogRepository) -> Self {
        Self { repo }
    }

    /// Ofertas do insumo, da mais barata (por grama) para a mais cara.
    pub async fn offers_for_ingredient(&self, ingredient_id: &str) -> Result<Vec<SupplierPriceOffer>, AppError> {
        self.repo
            .read(|state| -> Result<Vec<SupplierPriceOffer>, AppError> {
                state
                    .find::<Ingredient>(ingredient_id)
                    .ok_or_else(|| AppError::not_found("ingredient", ingredient_id))?;
                Ok(sorted_offers(state, ingredient_id))
            })
            .await
    }

    pub async fn best_offer(&self, ingredient_id: &str) -> Result<Option<SupplierPriceOffer>, AppError> {
        Ok(self.offers_for_ingredient(ingredient_id).await?.into_iter().next())
    }

    pub async fn save_offer(&self, id: Option<&str>, mut offer: SupplierPriceOffer) -> Result<SupplierPriceOffer, AppError> {
        let make_default = offer.is_default;
        let saved = self
            .repo
            .mutate(|state| {
                if state.find::<Ingredient>(&offer.ingredient_id).is_none() {
                    return Err(AppError::InvalidInput(format!("Insumo '{}' não existe.", offer.ingredient_id)));
                }
                if state.find::<Supplier>(&offer.supplier_id).is_none() {
                    return Err(AppError::InvalidInput(format!("Fornecedor '{}' não existe.", offer.supplier_id)));
                }
                match id {
                    Some(id) if state.find::<SupplierPriceOffer>(id).is_none() => {
                        return Err(AppError::not_found("supplier_offer", id));
                    }
                    Some(id) => offer.id = id.to_string(),
                    None => offer.id = new_id(),
                }
                // O padrão só é ligado por apply_default, que também desmarca as outras
                offer.is_default = state
                    .find::<SupplierPriceOffer>(&offer.id)
                    .is_some_and(|o| o.is_default);
                state.upsert(offer.clone());
                if make_default {
                    apply_default(state, &offer.id)?;
                }
                Ok(state.find::<SupplierPriceOffer>(&offer.id).cloned().unwrap_or(offer))
            })
            .await?;

        tracing::info!("Oferta '{}' do fornecedor '{}' gravada", saved.id, saved.supplier_id);
        Ok(saved)
    }

    pub async fn delete_offer(&self, id: &str) -> Result<SupplierPriceOffer, AppError> {
        self.repo.delete::<SupplierPriceOffer>(id).await
    }

    /// Marca a oferta como padrão do insumo e passa a custear o insumo pelo preço dela.
    pub async fn set_default_offer(&self, offer_id: &str) -> Result<Ingredient, AppError> {
        let ingredient = self.repo.mutate(|state| apply_default(state, offer_id)).await?;
        tracing::info!(
            "Oferta '{}' agora é a padrão de '{}' ({} por grama)",
            offer_id,
            ingredient.name,
            ingredient.price_per_gram
        );
        Ok(ingredient)
    }
}

fn sorted_offers(state: &PricingState, ingredient_id: &str) -> Vec<SupplierPriceOffer> {
    let mut offers: Vec<SupplierPriceOffer> = state
        .supplier_offers
        .iter()
        .filter(|o| o.ingredient_id == ingredient_id)
        .cloned()
        .collect();
    offers.sort_by_key(|o| o.price_per_gram());
    offers
}

fn apply_default(state: &mut PricingState, offer_id: &str) -> Result<Ingredient, AppError> {
    let offer = state
        .find::<SupplierPriceOffer>(offer_id)
        .cloned()
        .ok_or_else(|| AppError::not_found("supplier_offer", offer_id))?;

    for o in state.supplier_offers.iter_mut().filter(|o| o.ingredient_id == offer.ingredient_id) {
        o.is_default = o.id == offer.id;
    }

    let ingredient = state
        .find_mut::<Ingredient>(&offer.ingredient_id)
        .ok_or_else(|| AppError::not_found("ingredient", offer.ingredient_id.clone()))?;
    ingredient.unit = offer.unit;
    ingredient.purchased_quantity = offer.quantity;
    ingredient.price_paid = offer.effective_price();
    ingredient.supplier_id = Some(offer.supplier_id.clone());
    ingredient.recompute_price_per_gram();
    let ingredient_id = ingredient.id.clone();

    refresh_state(state);

    state
        .find::<Ingredient>(&ingredient_id)
        .cloned()
        .ok_or_else(|| AppError::not_found("ingredient", ingredient_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::catalog_repo::memory::repository;
    use crate::models::catalog::UnitOfMeasure;
    use crate::models::composition::Product;
    use crate::models::pricing::PriceTarget;
    use crate::services::catalog_service::CatalogService;
    use crate::services::cost_engine::fixtures::*;
    use rust_decimal::Decimal;

    fn offer(ingredient_id: &str, supplier_id: &str, gross: &str, discounted: Option<&str>) -> SupplierPriceOffer {
        SupplierPriceOffer {
            id: String::new(),
            ingredient_id: ingredient_id.into(),
            supplier_id: supplier_id.into(),
            gross_price: d(gross),
            discounted_price: discounted.map(d),
            unit: UnitOfMeasure::Kg,
            quantity: Decimal::ONE,
            lead_time_days: Some(2),
            is_default: false,
        }
    }

    fn supplier(name: &str) -> Supplier {
        Supplier {
            id: String::new(),
            name: name.into(),
            contact_name: None,
            phone: None,
            email: None,
            active: true,
            created_at: chrono::Utc::now(),
        }
    }

    #[tokio::test]
    async fn offers_sort_by_effective_price_per_gram() {
        let (repo, _) = repository().await;
        let catalog = CatalogService::new(repo.clone());
        let suppliers = SupplierService::new(repo);

        let granola = catalog.save_ingredient(None, ingredient("", "0.02")).await.unwrap();
        let s1 = catalog.save_supplier(None, supplier("Atacadão")).await.unwrap();
        let s2 = catalog.save_supplier(None, supplier("Mercado Central")).await.unwrap();

        suppliers.save_offer(None, offer(&granola.id, &s1.id, "25.00", None)).await.unwrap();
        suppliers.save_offer(None, offer(&granola.id, &s2.id, "30.00", Some("22.00"))).await.unwrap();

        let offers = suppliers.offers_for_ingredient(&granola.id).await.unwrap();
        assert_eq!(offers.len(), 2);
        assert_eq!(offers[0].supplier_id, s2.id);

        let best = suppliers.best_offer(&granola.id).await.unwrap().unwrap();
        assert_eq!(best.effective_price(), d("22.00"));
    }

    #[tokio::test]
    async fn offer_requires_existing_ingredient_and_supplier() {
        let (repo, _) = repository().await;
        let suppliers = SupplierService::new(repo);
        let err = suppliers.save_offer(None, offer("i", "s", "10", None)).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(suppliers.offers_for_ingredient("i").await.is_err());
    }

    #[tokio::test]
    async fn default_offer_reprices_ingredient_and_dependents() {
        let (repo, _) = repository().await;
        let catalog = CatalogService::new(repo.clone());
        let suppliers = SupplierService::new(repo);

        let leite = catalog.save_ingredient(None, ingredient("", "0.01")).await.unwrap();
        let s1 = catalog.save_supplier(None, supplier("Laticínios Serra")).await.unwrap();
        let product = catalog
            .save_product(None, product("", &[], vec![portion(&leite.id, "100")], "0"), PriceTarget::Margin(d("50")))
            .await
            .unwrap();
        assert_eq!(product.total_cost, d("1.00"));

        let first = suppliers.save_offer(None, offer(&leite.id, &s1.id, "30.00", None)).await.unwrap();
        let mut second = offer(&leite.id, &s1.id, "20.00", None);
        second.is_default = true;
        let second = suppliers.save_offer(None, second).await.unwrap();
        assert!(second.is_default);

        let repriced = catalog.get::<Ingredient>(&leite.id).await.unwrap();
        assert_eq!(repriced.price_per_gram, d("0.02"));
        assert_eq!(repriced.supplier_id.as_deref(), Some(s1.id.as_str()));
        assert_eq!(catalog.get::<Product>(&product.id).await.unwrap().total_cost, d("2.00"));

        let ingredient = suppliers.set_default_offer(&first.id).await.unwrap();
        assert_eq!(ingredient.price_per_gram, d("0.03"));
        let offers = suppliers.offers_for_ingredient(&leite.id).await.unwrap();
        assert_eq!(offers.iter().filter(|o| o.is_default).count(), 1);
        assert!(offers.iter().any(|o| o.id == first.id && o.is_default));
    }
}
