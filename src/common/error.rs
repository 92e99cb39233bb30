// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use thiserror::Error;

use crate::middleware::i18n::Locale;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("{entity} '{id}' não encontrado")]
    NotFound { entity: &'static str, id: String },

    #[error("Entrada inválida: {0}")]
    InvalidInput(String),

    // Backend Postgres do documento de estado
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de E/S: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Documento de estado inválido: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl AppError {
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        AppError::NotFound { entity, id: id.into() }
    }
}

/// O erro que sai pela API: status + mensagem já traduzida.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        let en = locale.is_english();
        match self {
            AppError::ValidationError(errors) => {
                let mut details = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| match &e.message {
                            Some(m) => m.to_string(),
                            None => e.code.to_string(),
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: pick(en, "One or more fields are invalid.", "Um ou mais campos são inválidos.").into(),
                    details: Some(json!(details)),
                }
            }
            AppError::NotFound { entity, id } => ApiError {
                status: StatusCode::NOT_FOUND,
                error: if en {
                    format!("{} '{}' not found.", entity, id)
                } else {
                    format!("Registro '{}' ({}) não encontrado.", id, entity)
                },
                details: None,
            },
            AppError::InvalidInput(message) => ApiError {
                status: StatusCode::BAD_REQUEST,
                error: message.clone(),
                details: None,
            },
            // Falhas de armazenamento e internas viram 500; o detalhe fica só no log.
            e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                ApiError {
                    status: StatusCode::INTERNAL_SERVER_ERROR,
                    error: pick(en, "An unexpected error occurred.", "Ocorreu um erro inesperado.").into(),
                    details: None,
                }
            }
        }
    }
}

fn pick(en: bool, english: &'static str, portuguese: &'static str) -> &'static str {
    if en { english } else { portuguese }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    #[test]
    fn not_found_maps_to_404_in_both_languages() {
        let err = AppError::not_found("recipe", "r1");
        let pt = err.to_api_error(&Locale("pt".into()));
        assert_eq!(pt.status, StatusCode::NOT_FOUND);
        assert!(pt.error.contains("não encontrado"));

        let en = err.to_api_error(&Locale("en".into()));
        assert_eq!(en.error, "recipe 'r1' not found.");
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let mut errors = ValidationErrors::new();
        let mut e = ValidationError::new("length");
        e.message = Some("O nome é obrigatório.".into());
        errors.add("name", e);

        let api = AppError::ValidationError(errors).to_api_error(&Locale("pt".into()));
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.unwrap();
        assert_eq!(details["name"][0], "O nome é obrigatório.");
    }

    #[test]
    fn storage_errors_hide_details() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "/var/lib/acai");
        let api = AppError::from(io).to_api_error(&Locale("en".into()));
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.error.contains("/var/lib"));
    }
}
