// src/services/catalog_service.rs

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{
    common::{error::AppError, money::MAX_AMOUNT},
    db::CatalogRepository,
    models::{
        catalog::{Ingredient, IngredientKind, Packaging, Supplier, UnitOfMeasure},
        composition::{MenuComposition, MenuItem, Product, Recipe, StandardCup},
        pricing::{PriceTarget, RefreshReport, SyncReport, UnresolvedRef},
        state::{Entity, PricingState},
    },
    services::{
        cost_engine,
        margin::{margin_from_price, markup, price_from_margin},
    },
};

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Devolve (preço de venda, margem) a partir do custo e de como o preço foi fixado.
pub fn resolve_price(cost: Decimal, target: PriceTarget) -> (Decimal, Decimal) {
    match target {
        PriceTarget::Margin(margin) => (price_from_margin(cost, margin), margin),
        PriceTarget::SalePrice(price) => (price, margin_from_price(cost, price)),
    }
}

// ---
// Derivações puras sobre o documento
// ---

fn merge_unresolved(into: &mut Vec<UnresolvedRef>, from: Vec<UnresolvedRef>) {
    for r in from {
        if !into.contains(&r) {
            into.push(r);
        }
    }
}

fn derive_recipe(recipe: &mut Recipe, state: &PricingState) -> Vec<UnresolvedRef> {
    let cost = cost_engine::recipe_cost(recipe, state);
    recipe.total_cost = cost.total_cost;
    recipe.cost_per_gram = cost.cost_per_gram;
    cost.unresolved
}

fn derive_product(product: &mut Product, target: PriceTarget, state: &PricingState) -> Vec<UnresolvedRef> {
    let cost = cost_engine::product_cost(product, state);
    let (sale_price, margin) = resolve_price(cost.total_cost, target);
    product.total_cost = cost.total_cost;
    product.sale_price = sale_price;
    product.margin_pct = margin;
    cost.unresolved
}

fn derive_cup(cup: &mut StandardCup, target: PriceTarget, state: &PricingState) -> Vec<UnresolvedRef> {
    let cost = cost_engine::cup_cost(cup, state);
    let (sale_price, margin) = resolve_price(cost.total_cost, target);
    cup.acai_cost = cost.acai_cost;
    cup.packaging_cost = cost.packaging_cost;
    cup.total_cost = cost.total_cost;
    cup.sale_price = sale_price;
    cup.margin_pct = margin;
    cost.unresolved
}

fn derive_menu_item(item: &mut MenuItem, target: PriceTarget, state: &PricingState) -> Vec<UnresolvedRef> {
    let (cost, unresolved) = cost_engine::composition_cost(&item.composition, state);
    let (sale_price, margin) = resolve_price(cost, target);
    item.cost = cost;
    item.sale_price = sale_price;
    item.margin_pct = margin;
    item.markup = markup(cost, sale_price);
    unresolved
}

/// Cria, atualiza ou remove os insumos espelho (tipo `receita`) para que cada
/// receita tenha exatamente um, com o custo por grama atual.
pub fn sync_recipe_mirrors(state: &mut PricingState) -> SyncReport {
    let mut report = SyncReport::default();

    let mirrors: Vec<Ingredient> = state
        .recipes
        .iter()
        .map(|recipe| {
            let cost = cost_engine::recipe_cost(recipe, state);
            let existing_id = state
                .ingredients
                .iter()
                .find(|i| i.kind == IngredientKind::Receita && i.recipe_id.as_deref() == Some(recipe.id.as_str()))
                .map(|i| i.id.clone());

            Ingredient {
                id: existing_id.unwrap_or_else(new_id),
                name: recipe.name.clone(),
                kind: IngredientKind::Receita,
                unit: UnitOfMeasure::G,
                purchased_quantity: recipe.yield_grams,
                price_paid: cost.total_cost,
                price_per_gram: cost.cost_per_gram,
                active: true,
                category: recipe.category.clone(),
                supplier_id: None,
                recipe_id: Some(recipe.id.clone()),
            }
        })
        .collect();

    // Espelhos cuja receita não existe mais
    let before = state.ingredients.len();
    state.ingredients.retain(|i| {
        i.kind != IngredientKind::Receita
            || i.recipe_id
                .as_deref()
                .is_some_and(|rid| state_has_recipe(&mirrors, rid))
    });
    report.removed = before - state.ingredients.len();

    for mirror in mirrors {
        match state.find_mut::<Ingredient>(&mirror.id) {
            Some(existing) => {
                // O estado ativo é decisão do usuário
                let candidate = Ingredient { active: existing.active, ..mirror };
                if *existing != candidate {
                    *existing = candidate;
                    report.updated += 1;
                }
            }
            None => {
                state.ingredients.push(mirror);
                report.created += 1;
            }
        }
    }

    report
}

fn state_has_recipe(mirrors: &[Ingredient], recipe_id: &str) -> bool {
    mirrors.iter().any(|m| m.recipe_id.as_deref() == Some(recipe_id))
}

/// Recalcula todos os campos derivados gravados. Produtos e copos mantêm a margem;
/// itens de cardápio mantêm o preço de venda.
pub fn refresh_state(state: &mut PricingState) -> RefreshReport {
    let mut report = RefreshReport::default();

    for ingredient in state.ingredients.iter_mut().filter(|i| i.kind != IngredientKind::Receita) {
        ingredient.recompute_price_per_gram();
        report.ingredients += 1;
    }

    let mut recipes = std::mem::take(&mut state.recipes);
    for recipe in recipes.iter_mut() {
        merge_unresolved(&mut report.unresolved, derive_recipe(recipe, state));
    }
    state.recipes = recipes;
    report.recipes = state.recipes.len();

    let mut products = std::mem::take(&mut state.products);
    for product in products.iter_mut() {
        let target = PriceTarget::Margin(product.margin_pct);
        merge_unresolved(&mut report.unresolved, derive_product(product, target, state));
    }
    state.products = products;
    report.products = state.products.len();

    let mut cups = std::mem::take(&mut state.standard_cups);
    for cup in cups.iter_mut() {
        let target = PriceTarget::Margin(cup.margin_pct);
        merge_unresolved(&mut report.unresolved, derive_cup(cup, target, state));
    }
    state.standard_cups = cups;
    report.standard_cups = state.standard_cups.len();

    let mut items = std::mem::take(&mut state.menu_items);
    for item in items.iter_mut() {
        let target = PriceTarget::SalePrice(item.sale_price);
        merge_unresolved(&mut report.unresolved, derive_menu_item(item, target, state));
    }
    state.menu_items = items;
    report.menu_items = state.menu_items.len();

    report
}

// ---
// Serviço
// ---

#[derive(Clone)]
pub struct CatalogService {
    repo: CatalogRepository,
}

impl CatalogService {
    pub fn new(repo: CatalogRepository) -> Self {
        Self { repo }
    }

    pub async fn list<T: Entity>(&self) -> Vec<T> {
        self.repo.list::<T>().await
    }

    pub async fn get<T: Entity>(&self, id: &str) -> Result<T, AppError> {
        self.repo.get::<T>(id).await
    }

    pub async fn delete<T: Entity>(&self, id: &str) -> Result<T, AppError> {
        self.repo.delete::<T>(id).await
    }

    /// Insere com id novo (`id = None`) ou substitui um registro existente.
    /// `derive` recebe o registro e o documento atual para preencher campos calculados.
    async fn save_with<T, F>(&self, id: Option<&str>, mut entity: T, derive: F) -> Result<T, AppError>
    where
        T: Entity,
        F: FnOnce(&mut T, Option<&T>, &PricingState) -> Result<(), AppError>,
    {
        self.repo
            .mutate(|state| {
                let previous = match id {
                    Some(id) => Some(state.find::<T>(id).cloned().ok_or_else(|| AppError::not_found(T::KIND, id))?),
                    None => None,
                };
                entity.set_id(id.map(str::to_string).unwrap_or_else(new_id));
                derive(&mut entity, previous.as_ref(), state)?;
                let replaced = state.upsert(entity.clone());
                tracing::info!(
                    "{} '{}' {}",
                    T::KIND,
                    entity.id(),
                    if replaced { "atualizado" } else { "criado" }
                );
                Ok(entity)
            })
            .await
    }

    pub async fn save_supplier(&self, id: Option<&str>, supplier: Supplier) -> Result<Supplier, AppError> {
        self.save_with(id, supplier, |s, previous, _| {
            s.created_at = previous.map_or_else(Utc::now, |p| p.created_at);
            Ok(())
        })
        .await
    }

    pub async fn save_packaging(&self, id: Option<&str>, packaging: Packaging) -> Result<Packaging, AppError> {
        self.save_with(id, packaging, |_, _, _| Ok(())).await
    }

    pub async fn save_ingredient(&self, id: Option<&str>, ingredient: Ingredient) -> Result<Ingredient, AppError> {
        if ingredient.kind == IngredientKind::Receita {
            return Err(AppError::InvalidInput(
                "Insumos de receita são mantidos pela sincronização de receitas.".into(),
            ));
        }
        self.save_with(id, ingredient, |i, previous, _| {
            if previous.is_some_and(|p| p.kind == IngredientKind::Receita) {
                return Err(AppError::InvalidInput(
                    "Insumos de receita são mantidos pela sincronização de receitas.".into(),
                ));
            }
            i.recipe_id = None;
            i.recompute_price_per_gram();
            Ok(())
        })
        .await
    }

    pub async fn save_recipe(&self, id: Option<&str>, recipe: Recipe) -> Result<Recipe, AppError> {
        self.save_with(id, recipe, |r, _, state| {
            let unresolved = derive_recipe(r, state);
            warn_unresolved(Recipe::KIND, &r.id, &unresolved);
            Ok(())
        })
        .await
    }

    pub async fn save_product(&self, id: Option<&str>, product: Product, target: PriceTarget) -> Result<Product, AppError> {
        self.save_with(id, product, |p, _, state| {
            let unresolved = derive_product(p, target, state);
            warn_unresolved(Product::KIND, &p.id, &unresolved);
            Ok(())
        })
        .await
    }

    pub async fn save_cup(&self, id: Option<&str>, cup: StandardCup, target: PriceTarget) -> Result<StandardCup, AppError> {
        self.save_with(id, cup, |c, _, state| {
            let unresolved = derive_cup(c, target, state);
            warn_unresolved(StandardCup::KIND, &c.id, &unresolved);
            Ok(())
        })
        .await
    }

    pub async fn save_menu_item(&self, id: Option<&str>, item: MenuItem, target: PriceTarget) -> Result<MenuItem, AppError> {
        validate_composition(&item.composition)?;
        self.save_with(id, item, |m, previous, state| {
            let now = Utc::now();
            m.created_at = previous.map_or(now, |p| p.created_at);
            m.updated_at = now;
            let unresolved = derive_menu_item(m, target, state);
            warn_unresolved(MenuItem::KIND, &m.id, &unresolved);
            Ok(())
        })
        .await
    }

    /// Sincronização explícita receita -> insumo espelho.
    pub async fn sync_recipe_ingredients(&self) -> Result<SyncReport, AppError> {
        let report = self.repo.mutate(|state| Ok(sync_recipe_mirrors(state))).await?;
        tracing::info!(
            "Receitas sincronizadas: {} criados, {} atualizados, {} removidos",
            report.created,
            report.updated,
            report.removed
        );
        Ok(report)
    }

    pub async fn refresh_derived(&self) -> Result<RefreshReport, AppError> {
        let report = self.repo.mutate(|state| Ok(refresh_state(state))).await?;
        if !report.unresolved.is_empty() {
            tracing::warn!("Recálculo encontrou {} referências quebradas", report.unresolved.len());
        }
        Ok(report)
    }
}

fn validate_composition(composition: &MenuComposition) -> Result<(), AppError> {
    let out_of_range = |q: &Decimal| (q.is_sign_negative() && !q.is_zero()) || *q > MAX_AMOUNT;
    let bad_quantity = match composition {
        MenuComposition::Complemento { quantity, .. } => out_of_range(quantity),
        MenuComposition::Receita { quantity_grams, .. } => out_of_range(quantity_grams),
        MenuComposition::Copo { .. } => false,
        MenuComposition::Combinado { components } => {
            if components.is_empty() {
                return Err(AppError::InvalidInput("Um combinado precisa de ao menos um componente.".into()));
            }
            components.iter().any(|c| out_of_range(&c.quantity))
        }
    };
    if bad_quantity {
        return Err(AppError::InvalidInput(
            "Quantidades precisam estar entre zero e o máximo permitido.".into(),
        ));
    }
    Ok(())
}

pub(crate) fn warn_unresolved(kind: &str, id: &str, unresolved: &[UnresolvedRef]) {
    if !unresolved.is_empty() {
        let ids: Vec<&str> = unresolved.iter().map(|r| r.id.as_str()).collect();
        tracing::warn!("{} '{}' referencia registros inexistentes: {:?}", kind, id, ids);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::catalog_repo::memory::repository;
    use crate::models::composition::{AcaiType, CupSize, IngredientPortion};
    use crate::services::cost_engine::fixtures::*;

    async fn service() -> CatalogService {
        let (repo, _) = repository().await;
        CatalogService::new(repo)
    }

    #[tokio::test]
    async fn creating_assigns_fresh_uuid_ids() {
        let svc = service().await;
        let a = svc.save_packaging(None, packaging("", "1.50")).await.unwrap();
        let b = svc.save_packaging(None, packaging("", "2.00")).await.unwrap();
        assert_ne!(a.id, b.id);
        assert!(Uuid::parse_str(&a.id).is_ok());
    }

    #[tokio::test]
    async fn updating_unknown_id_is_not_found() {
        let svc = service().await;
        let err = svc.save_packaging(Some("ghost"), packaging("", "1.00")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn saving_ingredient_derives_price_per_gram() {
        let svc = service().await;
        let mut acai = ingredient("", "0");
        acai.unit = UnitOfMeasure::Kg;
        acai.purchased_quantity = d("10");
        acai.price_paid = d("180");
        let saved = svc.save_ingredient(None, acai).await.unwrap();
        assert_eq!(saved.price_per_gram, d("0.018"));
    }

    #[tokio::test]
    async fn product_price_follows_margin_or_sale_price() {
        let svc = service().await;
        let a = svc.save_packaging(None, packaging("", "1.50")).await.unwrap();
        let b = svc.save_packaging(None, packaging("", "2.00")).await.unwrap();
        let x = svc.save_ingredient(None, ingredient("", "0.02")).await.unwrap();

        let p = product("", &[&a.id, &b.id], vec![portion(&x.id, "100")], "0");
        let by_margin = svc.save_product(None, p.clone(), PriceTarget::Margin(d("80"))).await.unwrap();
        assert_eq!(by_margin.total_cost, d("5.50"));
        assert_eq!(by_margin.sale_price, d("9.90"));

        let by_price = svc
            .save_product(Some(&by_margin.id), p, PriceTarget::SalePrice(d("11.00")))
            .await
            .unwrap();
        assert_eq!(by_price.margin_pct, d("100"));
        assert_eq!(svc.list::<Product>().await.len(), 1);
    }

    #[tokio::test]
    async fn recipe_mirror_is_created_updated_and_removed_explicitly() {
        let svc = service().await;
        let x = svc.save_ingredient(None, ingredient("", "0.01")).await.unwrap();
        let y = svc.save_ingredient(None, ingredient("", "0.05")).await.unwrap();
        let recipe = svc
            .save_recipe(None, recipe("", vec![portion(&x.id, "200"), portion(&y.id, "50")], "250"))
            .await
            .unwrap();
        assert_eq!(recipe.cost_per_gram, d("0.018"));

        // Salvar a receita não cria o espelho sozinho
        assert_eq!(svc.list::<Ingredient>().await.len(), 2);

        let report = svc.sync_recipe_ingredients().await.unwrap();
        assert_eq!(report, SyncReport { created: 1, updated: 0, removed: 0 });
        let mirror = svc
            .list::<Ingredient>()
            .await
            .into_iter()
            .find(|i| i.kind == IngredientKind::Receita)
            .unwrap();
        assert_eq!(mirror.recipe_id.as_deref(), Some(recipe.id.as_str()));
        assert_eq!(mirror.price_per_gram, d("0.018"));

        let again = svc.sync_recipe_ingredients().await.unwrap();
        assert_eq!(again, SyncReport::default());

        let mut cheaper = recipe.clone();
        cheaper.yield_grams = d("500");
        svc.save_recipe(Some(&recipe.id), cheaper).await.unwrap();
        let report = svc.sync_recipe_ingredients().await.unwrap();
        assert_eq!(report.updated, 1);
        let mirror = svc.get::<Ingredient>(&mirror.id).await.unwrap();
        assert_eq!(mirror.price_per_gram, d("0.009"));

        svc.delete::<Recipe>(&recipe.id).await.unwrap();
        let report = svc.sync_recipe_ingredients().await.unwrap();
        assert_eq!(report.removed, 1);
        assert!(svc.get::<Ingredient>(&mirror.id).await.is_err());
    }

    #[tokio::test]
    async fn mirrors_cannot_be_edited_by_hand() {
        let svc = service().await;
        let mut fake = ingredient("", "0.01");
        fake.kind = IngredientKind::Receita;
        assert!(matches!(svc.save_ingredient(None, fake).await, Err(AppError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn refresh_picks_up_new_ingredient_prices() {
        let svc = service().await;
        let mut acai = ingredient("", "0.02");
        acai.kind = IngredientKind::Acai;
        acai.purchased_quantity = d("1000");
        acai.price_paid = d("20");
        let acai = svc.save_ingredient(None, acai).await.unwrap();
        let copo = svc.save_packaging(None, packaging("", "0.50")).await.unwrap();

        let cup = StandardCup {
            id: String::new(),
            name: "Copo 300".into(),
            size: CupSize::Ml300,
            portion_grams: d("250"),
            acai_type: AcaiType::Tradicional,
            packaging_ids: vec![copo.id.clone()],
            acai_cost: Decimal::ZERO,
            packaging_cost: Decimal::ZERO,
            total_cost: Decimal::ZERO,
            margin_pct: Decimal::ZERO,
            sale_price: Decimal::ZERO,
        };
        let cup = svc.save_cup(None, cup, PriceTarget::Margin(d("100"))).await.unwrap();
        assert_eq!(cup.total_cost, d("5.50"));

        let item = svc
            .save_menu_item(None, menu_item("", MenuComposition::Copo { cup_id: cup.id.clone() }, "0"), PriceTarget::SalePrice(d("15")))
            .await
            .unwrap();
        assert_eq!(item.cost, d("5.50"));

        let mut pricier = acai.clone();
        pricier.price_paid = d("30");
        svc.save_ingredient(Some(&acai.id), pricier).await.unwrap();

        let report = svc.refresh_derived().await.unwrap();
        assert!(report.unresolved.is_empty());

        let cup = svc.get::<StandardCup>(&cup.id).await.unwrap();
        assert_eq!(cup.total_cost, d("8.00"));
        assert_eq!(cup.sale_price, d("16.00"));

        let item = svc.get::<MenuItem>(&item.id).await.unwrap();
        assert_eq!(item.sale_price, d("15"));
        assert_eq!(item.cost, d("8.00"));
        assert_eq!(item.markup, d("7.00"));
    }

    #[tokio::test]
    async fn empty_combo_is_rejected() {
        let svc = service().await;
        let item = menu_item("", MenuComposition::Combinado { components: vec![] }, "10");
        let err = svc.save_menu_item(None, item, PriceTarget::SalePrice(d("10"))).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn composition_quantities_must_be_within_range() {
        let svc = service().await;
        let huge = MenuComposition::Complemento { ingredient_id: "granola".into(), quantity: d("1000000000000000") };
        let err = svc
            .save_menu_item(None, menu_item("", huge, "10"), PriceTarget::SalePrice(d("10")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));

        let negative = MenuComposition::Receita { recipe_id: "creme".into(), quantity_grams: d("-5") };
        let err = svc
            .save_menu_item(None, menu_item("", negative, "10"), PriceTarget::SalePrice(d("10")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
        assert!(svc.list::<MenuItem>().await.is_empty());
    }

    #[tokio::test]
    async fn refresh_reports_broken_references() {
        let svc = service().await;
        let p = Product {
            ingredients: vec![IngredientPortion { ingredient_id: "gone".into(), quantity: d("10") }],
            ..product("", &[], vec![], "0")
        };
        svc.save_product(None, p, PriceTarget::Margin(d("50"))).await.unwrap();
        let report = svc.refresh_derived().await.unwrap();
        assert_eq!(report.products, 1);
        assert_eq!(report.unresolved.len(), 1);
    }
}
