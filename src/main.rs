//src/main.rs

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

mod common;
mod config;
mod db;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Settings};
use crate::handlers::entities::{delete_one, get_one, list};
use crate::models::{
    catalog::{Ingredient, Packaging, Supplier, SupplierPriceOffer},
    composition::{MenuItem, Product, Recipe, StandardCup},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração ou o armazenamento falharem, a aplicação não deve iniciar.
    let settings = Settings::from_env()?;
    let addr = settings.addr.clone();
    let app_state = AppState::new(settings).await?;

    let app = router(app_state);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn router(app_state: AppState) -> Router {
    let catalog_routes = Router::new()
        .route(
            "/suppliers",
            get(list::<Supplier>).post(handlers::catalog::create_supplier),
        )
        .route(
            "/suppliers/{id}",
            get(get_one::<Supplier>)
                .put(handlers::catalog::update_supplier)
                .delete(delete_one::<Supplier>),
        )
        .route(
            "/packaging",
            get(list::<Packaging>).post(handlers::catalog::create_packaging),
        )
        .route(
            "/packaging/{id}",
            get(get_one::<Packaging>)
                .put(handlers::catalog::update_packaging)
                .delete(delete_one::<Packaging>),
        )
        .route(
            "/ingredients",
            get(list::<Ingredient>).post(handlers::catalog::create_ingredient),
        )
        .route(
            "/ingredients/{id}",
            get(get_one::<Ingredient>)
                .put(handlers::catalog::update_ingredient)
                .delete(delete_one::<Ingredient>),
        )
        .route("/ingredients/{id}/offers", get(handlers::catalog::list_ingredient_offers))
        .route("/ingredients/{id}/offers/best", get(handlers::catalog::best_ingredient_offer))
        .route(
            "/offers",
            get(list::<SupplierPriceOffer>).post(handlers::catalog::create_offer),
        )
        .route(
            "/offers/{id}",
            get(get_one::<SupplierPriceOffer>)
                .put(handlers::catalog::update_offer)
                .delete(handlers::catalog::delete_offer),
        )
        .route("/offers/{id}/default", post(handlers::catalog::set_default_offer));

    let composition_routes = Router::new()
        .route(
            "/products",
            get(list::<Product>).post(handlers::compositions::create_product),
        )
        .route(
            "/products/{id}",
            get(get_one::<Product>)
                .put(handlers::compositions::update_product)
                .delete(delete_one::<Product>),
        )
        .route("/products/{id}/cost", get(handlers::compositions::product_cost))
        .route(
            "/recipes",
            get(list::<Recipe>).post(handlers::compositions::create_recipe),
        )
        .route("/recipes/sync-ingredients", post(handlers::pricing::sync_recipe_ingredients))
        .route(
            "/recipes/{id}",
            get(get_one::<Recipe>)
                .put(handlers::compositions::update_recipe)
                .delete(delete_one::<Recipe>),
        )
        .route("/recipes/{id}/cost", get(handlers::compositions::recipe_cost))
        .route(
            "/cups",
            get(list::<StandardCup>).post(handlers::compositions::create_cup),
        )
        .route(
            "/cups/{id}",
            get(get_one::<StandardCup>)
                .put(handlers::compositions::update_cup)
                .delete(delete_one::<StandardCup>),
        )
        .route("/cups/{id}/cost", get(handlers::compositions::cup_cost))
        .route(
            "/menu",
            get(list::<MenuItem>).post(handlers::compositions::create_menu_item),
        )
        .route(
            "/menu/{id}",
            get(get_one::<MenuItem>)
                .put(handlers::compositions::update_menu_item)
                .delete(delete_one::<MenuItem>),
        )
        .route("/menu/{id}/cost", get(handlers::compositions::menu_item_cost));

    let pricing_routes = Router::new()
        .route("/pricing/quote", post(handlers::pricing::quote))
        .route("/pricing/refresh", post(handlers::pricing::refresh))
        .route("/simulation", post(handlers::pricing::simulate))
        .route("/reports/summary", get(handlers::reports::summary))
        .route("/reports/menu", get(handlers::reports::menu));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest(
            "/api",
            catalog_routes.merge(composition_routes).merge(pricing_routes),
        )
        .with_state(app_state)
}
