// src/config.rs

use std::{env, path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context;
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;

use crate::{
    db::{CatalogRepository, FileStateStorage, PgStateStorage, StateStorage},
    services::{CatalogService, PricingService, ReportService, SimulationService, SupplierService},
};

pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_STATE_FILE: &str = "acai-state.json";
pub const DEFAULT_STORAGE_KEY: &str = "acai-pricing-state";
pub const DEFAULT_MIN_MARGIN_PCT: u32 = 30;

/// Onde o documento de estado é guardado.
#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend {
    Postgres { database_url: String },
    File { path: PathBuf },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub addr: String,
    pub storage: StorageBackend,
    pub storage_key: String,
    pub min_margin_pct: Decimal,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Monta as configurações a partir de qualquer fonte chave/valor.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let addr = lookup("APP_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());

        let storage = match lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()) {
            Some(database_url) => StorageBackend::Postgres { database_url },
            None => StorageBackend::File {
                path: lookup("STATE_FILE")
                    .unwrap_or_else(|| DEFAULT_STATE_FILE.to_string())
                    .into(),
            },
        };

        let storage_key = lookup("STORAGE_KEY").unwrap_or_else(|| DEFAULT_STORAGE_KEY.to_string());

        let min_margin_pct = match lookup("MIN_MARGIN_PCT") {
            Some(raw) => raw
                .trim()
                .parse::<Decimal>()
                .with_context(|| format!("MIN_MARGIN_PCT inválido: '{}'", raw))?,
            None => Decimal::from(DEFAULT_MIN_MARGIN_PCT),
        };

        Ok(Self { addr, storage, storage_key, min_margin_pct })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub catalog_service: CatalogService,
    pub supplier_service: SupplierService,
    pub pricing_service: PricingService,
    pub simulation_service: SimulationService,
    pub report_service: ReportService,
}

impl AppState {
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        let storage: Arc<dyn StateStorage> = match &settings.storage {
            StorageBackend::Postgres { database_url } => {
                let pool = PgPoolOptions::new()
                    .max_connections(5)
                    .acquire_timeout(Duration::from_secs(3))
                    .connect(database_url)
                    .await?;
                tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

                sqlx::migrate!().run(&pool).await?;
                tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

                Arc::new(PgStateStorage::new(pool, settings.storage_key.clone()))
            }
            StorageBackend::File { path } => {
                tracing::info!("Usando arquivo de estado {}", path.display());
                Arc::new(FileStateStorage::new(path.clone()))
            }
        };

        let repo = CatalogRepository::load(storage).await?;
        Ok(Self::with_repository(&settings, repo))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_repository(settings: &Settings, repo: CatalogRepository) -> Self {
        Self {
            catalog_service: CatalogService::new(repo.clone()),
            supplier_service: SupplierService::new(repo.clone()),
            pricing_service: PricingService::new(repo.clone()),
            simulation_service: SimulationService::new(repo.clone()),
            report_service: ReportService::new(repo, settings.min_margin_pct),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_to_file_storage() {
        let settings = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(settings.addr, DEFAULT_ADDR);
        assert_eq!(settings.storage, StorageBackend::File { path: DEFAULT_STATE_FILE.into() });
        assert_eq!(settings.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(settings.min_margin_pct, Decimal::from(30));
    }

    #[test]
    fn database_url_selects_postgres() {
        let settings = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://acai@localhost/precos"),
            ("MIN_MARGIN_PCT", "45.5"),
        ]))
        .unwrap();
        assert!(matches!(settings.storage, StorageBackend::Postgres { .. }));
        assert_eq!(settings.min_margin_pct, "45.5".parse::<Decimal>().unwrap());
    }

    #[test]
    fn invalid_margin_is_rejected() {
        let err = Settings::from_lookup(lookup(&[("MIN_MARGIN_PCT", "trinta")])).unwrap_err();
        assert!(err.to_string().contains("MIN_MARGIN_PCT"));
    }
}
