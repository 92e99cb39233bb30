// src/db/state_storage.rs

use std::path::PathBuf;

use async_trait::async_trait;
use sqlx::{types::Json, PgPool, Row};

use crate::{common::error::AppError, models::state::PricingState};

/// Onde o documento de estado mora. O documento é sempre lido e gravado inteiro.
#[async_trait]
pub trait StateStorage: Send + Sync {
    async fn load(&self) -> Result<Option<PricingState>, AppError>;
    async fn save(&self, state: &PricingState) -> Result<(), AppError>;
}

// ---
// Postgres: uma linha por chave, documento em JSONB
// ---
#[derive(Clone)]
pub struct PgStateStorage {
    pool: PgPool,
    key: String,
}

impl PgStateStorage {
    pub fn new(pool: PgPool, key: impl Into<String>) -> Self {
        Self { pool, key: key.into() }
    }
}

#[async_trait]
impl StateStorage for PgStateStorage {
    async fn load(&self) -> Result<Option<PricingState>, AppError> {
        let row = sqlx::query("SELECT document FROM app_storage WHERE storage_key = $1")
            .bind(&self.key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let Json(state): Json<PricingState> = row.try_get("document")?;
                Ok(Some(state))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, state: &PricingState) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO app_storage (storage_key, document, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (storage_key)
            DO UPDATE SET document = EXCLUDED.document, updated_at = NOW()
            "#,
        )
        .bind(&self.key)
        .bind(Json(state))
        .execute(&self.pool)
        .await?;

        tracing::debug!("Documento '{}' gravado no Postgres", self.key);
        Ok(())
    }
}

// ---
// Arquivo JSON local
// ---
#[derive(Clone)]
pub struct FileStateStorage {
    path: PathBuf,
}

impl FileStateStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl StateStorage for FileStateStorage {
    async fn load(&self) -> Result<Option<PricingState>, AppError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let state = serde_json::from_slice(&bytes)?;
        Ok(Some(state))
    }

    async fn save(&self, state: &PricingState) -> Result<(), AppError> {
        let bytes = serde_json::to_vec_pretty(state)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        tracing::debug!("Documento gravado em {}", self.path.display());
        Ok(())
    }
}
