// src/services/cost_engine.rs

// Motor de custos: funções puras `(entidade, estado) -> detalhamento`.
// Referência que não existe no estado entra como custo zero e é listada em `unresolved`.

use rust_decimal::Decimal;

use crate::{
    common::money::{div_or_zero, saturating_sum},
    models::{
        catalog::{Ingredient, Packaging},
        composition::{
            ComboComponent, ComboSource, IngredientPortion, MenuComposition, MenuItem, Product, Recipe,
            StandardCup,
        },
        pricing::{CupCost, MenuItemCost, ProductCost, RecipeCost, RefKind, UnresolvedRef},
        state::PricingState,
    },
    services::margin::{margin_from_price, markup, price_from_margin},
};

struct Resolver<'a> {
    state: &'a PricingState,
    unresolved: Vec<UnresolvedRef>,
}

impl<'a> Resolver<'a> {
    fn new(state: &'a PricingState) -> Self {
        Self { state, unresolved: Vec::new() }
    }

    fn miss(&mut self, kind: RefKind, id: &str) {
        if !self.unresolved.iter().any(|r| r.kind == kind && r.id == id) {
            self.unresolved.push(UnresolvedRef { kind, id: id.to_string() });
        }
    }

    fn packaging_cost(&mut self, ids: &[String]) -> Decimal {
        let mut total = Decimal::ZERO;
        for id in ids {
            match self.state.find::<Packaging>(id) {
                Some(p) => total = total.saturating_add(p.effective_unit_price()),
                None => self.miss(RefKind::Packaging, id),
            }
        }
        total
    }

    fn ingredient_price_per_gram(&mut self, id: &str) -> Decimal {
        match self.state.find::<Ingredient>(id) {
            Some(i) => i.price_per_gram,
            None => {
                self.miss(RefKind::Ingredient, id);
                Decimal::ZERO
            }
        }
    }

    fn ingredient_cost(&mut self, portions: &[IngredientPortion]) -> Decimal {
        saturating_sum(
            portions
                .iter()
                .map(|p| p.quantity.saturating_mul(self.ingredient_price_per_gram(&p.ingredient_id))),
        )
    }

    fn recipe_totals(&mut self, recipe: &Recipe) -> (Decimal, Decimal) {
        let total = self.ingredient_cost(&recipe.ingredients);
        let per_gram = if recipe.yield_grams > Decimal::ZERO {
            div_or_zero(total, recipe.yield_grams)
        } else {
            Decimal::ZERO
        };
        (total, per_gram)
    }

    fn recipe_cost_per_gram(&mut self, id: &str) -> Decimal {
        let state = self.state;
        match state.find::<Recipe>(id) {
            Some(recipe) => self.recipe_totals(recipe).1,
            None => {
                self.miss(RefKind::Recipe, id);
                Decimal::ZERO
            }
        }
    }

    fn product_total(&mut self, product: &Product) -> (Decimal, Decimal) {
        let packaging = self.packaging_cost(&product.packaging_ids);
        let ingredients = self.ingredient_cost(&product.ingredients);
        (packaging, ingredients)
    }

    fn product_total_by_id(&mut self, id: &str) -> Decimal {
        let state = self.state;
        match state.find::<Product>(id) {
            Some(product) => {
                let (packaging, ingredients) = self.product_total(product);
                packaging.saturating_add(ingredients)
            }
            None => {
                self.miss(RefKind::Product, id);
                Decimal::ZERO
            }
        }
    }

    fn acai_source(&mut self, cup: &StandardCup) -> Option<&'a Ingredient> {
        let kind = cup.acai_type.ingredient_kind();
        let state = self.state;
        let found = state
            .ingredients
            .iter()
            .find(|i| i.active && i.kind == kind);
        if found.is_none() {
            self.miss(RefKind::AcaiSource, "acai");
        }
        found
    }

    fn cup_totals(&mut self, cup: &StandardCup) -> (Option<&'a Ingredient>, Decimal, Decimal) {
        let acai = self.acai_source(cup);
        let acai_cost = acai.map_or(Decimal::ZERO, |i| cup.portion_grams.saturating_mul(i.price_per_gram));
        let packaging_cost = self.packaging_cost(&cup.packaging_ids);
        (acai, acai_cost, packaging_cost)
    }

    fn cup_total_by_id(&mut self, id: &str) -> Decimal {
        let state = self.state;
        match state.find::<StandardCup>(id) {
            Some(cup) => {
                let (_, acai_cost, packaging_cost) = self.cup_totals(cup);
                acai_cost.saturating_add(packaging_cost)
            }
            None => {
                self.miss(RefKind::StandardCup, id);
                Decimal::ZERO
            }
        }
    }

    fn combo_component(&mut self, component: &ComboComponent) -> Decimal {
        let unit_cost = match component.source {
            ComboSource::Ingredient => self.ingredient_price_per_gram(&component.ref_id),
            ComboSource::Recipe => self.recipe_cost_per_gram(&component.ref_id),
            ComboSource::Product => self.product_total_by_id(&component.ref_id),
        };
        component.quantity.saturating_mul(unit_cost)
    }

    fn composition(&mut self, composition: &MenuComposition) -> Decimal {
        match composition {
            MenuComposition::Complemento { ingredient_id, quantity } => {
                quantity.saturating_mul(self.ingredient_price_per_gram(ingredient_id))
            }
            MenuComposition::Receita { recipe_id, quantity_grams } => {
                quantity_grams.saturating_mul(self.recipe_cost_per_gram(recipe_id))
            }
            MenuComposition::Copo { cup_id } => self.cup_total_by_id(cup_id),
            MenuComposition::Combinado { components } => {
                saturating_sum(components.iter().map(|c| self.combo_component(c)))
            }
        }
    }
}

/// Custo de um produto, com preço de venda derivado da margem cadastrada.
pub fn product_cost(product: &Product, state: &PricingState) -> ProductCost {
    let mut resolver = Resolver::new(state);
    let (packaging_cost, ingredient_cost) = resolver.product_total(product);
    let total_cost = packaging_cost.saturating_add(ingredient_cost);
    let sale_price = price_from_margin(total_cost, product.margin_pct);

    ProductCost {
        packaging_cost,
        ingredient_cost,
        total_cost,
        sale_price,
        margin_pct: product.margin_pct,
        profit: markup(total_cost, sale_price),
        unresolved: resolver.unresolved,
    }
}

/// Custo total e custo por grama. Rendimento zero resulta em custo por grama zero.
pub fn recipe_cost(recipe: &Recipe, state: &PricingState) -> RecipeCost {
    let mut resolver = Resolver::new(state);
    let (total_cost, cost_per_gram) = resolver.recipe_totals(recipe);

    RecipeCost {
        total_cost,
        yield_grams: recipe.yield_grams,
        cost_per_gram,
        unresolved: resolver.unresolved,
    }
}

pub fn cup_cost(cup: &StandardCup, state: &PricingState) -> CupCost {
    let mut resolver = Resolver::new(state);
    let (acai, acai_cost, packaging_cost) = resolver.cup_totals(cup);
    let total_cost = acai_cost.saturating_add(packaging_cost);
    let sale_price = price_from_margin(total_cost, cup.margin_pct);

    CupCost {
        acai_ingredient_id: acai.map(|i| i.id.clone()),
        acai_cost,
        packaging_cost,
        total_cost,
        sale_price,
        margin_pct: cup.margin_pct,
        profit: markup(total_cost, sale_price),
        unresolved: resolver.unresolved,
    }
}

/// Custo apenas da composição, sem olhar para preço de venda.
pub fn composition_cost(composition: &MenuComposition, state: &PricingState) -> (Decimal, Vec<UnresolvedRef>) {
    let mut resolver = Resolver::new(state);
    let cost = resolver.composition(composition);
    (cost, resolver.unresolved)
}

/// Custo do item de cardápio; margem e markup saem do preço de venda cadastrado.
pub fn menu_item_cost(item: &MenuItem, state: &PricingState) -> MenuItemCost {
    let (cost, unresolved) = composition_cost(&item.composition, state);

    MenuItemCost {
        cost,
        sale_price: item.sale_price,
        markup: markup(cost, item.sale_price),
        margin_pct: margin_from_price(cost, item.sale_price),
        unresolved,
    }
}
