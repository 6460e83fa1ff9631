// src/common/error.rs

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::middleware::i18n::Locale;

// Nosso tipo de erro de domínio. Os handlers convertem para `ApiError`
// (o corpo HTTP) respeitando o idioma do cliente.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Transição de etapa inválida: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Não existe etapa anterior a '{0}'")]
    NoPreviousStage(String),

    #[error("Justificativa deve ter no mínimo {min} caracteres")]
    JustificationTooShort { min: usize },

    #[error("Valor da hora não informado e sem padrão configurado")]
    MissingHourlyRate,

    #[error("Nenhum destinatário informado")]
    NoRecipients,

    #[error("Token de aprovação não encontrado")]
    TokenNotFound,

    #[error("Token de aprovação expirado")]
    TokenExpired,

    #[error("Token de aprovação já utilizado")]
    TokenAlreadyUsed,

    #[error("Documento desatualizado (esperado {expected}, atual {current})")]
    StaleDocument { expected: String, current: String },

    #[error("Chave pública ausente ou inválida")]
    InvalidPublicKey,

    #[error("Link de arquivo inválido ou expirado")]
    InvalidFileSignature,

    #[error("Falha no armazenamento: {0}")]
    StorageError(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

/// O corpo de erro que sai na resposta HTTP.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub code: &'static str,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::JustificationTooShort { .. }
            | AppError::NoPreviousStage(_)
            | AppError::MissingHourlyRate
            | AppError::NoRecipients => StatusCode::BAD_REQUEST,
            AppError::ResourceNotFound(_) | AppError::TokenNotFound => StatusCode::NOT_FOUND,
            AppError::DatabaseError(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            AppError::InvalidTransition { .. } | AppError::StaleDocument { .. } => {
                StatusCode::CONFLICT
            }
            AppError::TokenExpired | AppError::TokenAlreadyUsed => StatusCode::GONE,
            AppError::InvalidPublicKey | AppError::InvalidFileSignature => {
                StatusCode::UNAUTHORIZED
            }
            AppError::StorageError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Código estável consumido pelo script embutido nos documentos.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::ResourceNotFound(_) => "NOT_FOUND",
            AppError::DatabaseError(sqlx::Error::RowNotFound) => "NOT_FOUND",
            AppError::InvalidTransition { .. } => "INVALID_TRANSITION",
            AppError::NoPreviousStage(_) => "NO_PREVIOUS_STAGE",
            AppError::JustificationTooShort { .. } => "JUSTIFICATION_TOO_SHORT",
            AppError::MissingHourlyRate => "HOURLY_RATE_REQUIRED",
            AppError::NoRecipients => "NO_RECIPIENTS",
            AppError::TokenNotFound => "TOKEN_NOT_FOUND",
            AppError::TokenExpired => "TOKEN_EXPIRED",
            AppError::TokenAlreadyUsed => "TOKEN_ALREADY_USED",
            AppError::StaleDocument { .. } => "STALE_DOCUMENT",
            AppError::InvalidPublicKey => "INVALID_PUBLIC_KEY",
            AppError::InvalidFileSignature => "INVALID_FILE_SIGNATURE",
            AppError::StorageError(_) => "STORAGE_ERROR",
            _ => "INTERNAL_ERROR",
        }
    }

    fn message(&self, english: bool) -> String {
        let (pt, en): (String, String) = match self {
            AppError::ValidationError(_) => (
                "Um ou mais campos são inválidos.".into(),
                "One or more fields are invalid.".into(),
            ),
            AppError::ResourceNotFound(what) => (
                format!("Não encontrado: {}.", what),
                format!("Not found: {}.", what),
            ),
            AppError::DatabaseError(sqlx::Error::RowNotFound) => (
                "Registro não encontrado.".into(),
                "Record not found.".into(),
            ),
            AppError::InvalidTransition { from, to } => (
                format!("Não é possível mover de '{}' para '{}'.", from, to),
                format!("Cannot move from '{}' to '{}'.", from, to),
            ),
            AppError::NoPreviousStage(stage) => (
                format!("A etapa '{}' é a inicial; não há como retroceder.", stage),
                format!("Stage '{}' is the first one; it cannot be reverted.", stage),
            ),
            AppError::JustificationTooShort { min } => (
                format!("A justificativa deve ter no mínimo {} caracteres.", min),
                format!("The justification must have at least {} characters.", min),
            ),
            AppError::MissingHourlyRate => (
                "Informe o valor da hora (não há valor padrão configurado).".into(),
                "Provide the hourly rate (no default is configured).".into(),
            ),
            AppError::NoRecipients => (
                "Informe ao menos um destinatário.".into(),
                "Provide at least one recipient.".into(),
            ),
            AppError::TokenNotFound => (
                "Link de aprovação inválido.".into(),
                "Invalid approval link.".into(),
            ),
            AppError::TokenExpired => (
                "Este link de aprovação expirou. Solicite um novo envio do documento.".into(),
                "This approval link has expired. Please request a new copy.".into(),
            ),
            AppError::TokenAlreadyUsed => (
                "Este link de aprovação já foi utilizado. Cada link aceita apenas uma resposta.".into(),
                "This approval link was already used. Each link accepts a single response.".into(),
            ),
            AppError::StaleDocument { .. } => (
                "Este documento foi atualizado desde o envio. Solicite uma cópia atualizada antes de responder.".into(),
                "This document has changed since it was sent. Please request an updated copy before responding.".into(),
            ),
            AppError::InvalidPublicKey => (
                "Chave de acesso ausente ou inválida.".into(),
                "Missing or invalid access key.".into(),
            ),
            AppError::InvalidFileSignature => (
                "Link de arquivo inválido ou expirado.".into(),
                "Invalid or expired file link.".into(),
            ),
            AppError::StorageError(_) => (
                "Falha ao acessar o armazenamento de arquivos.".into(),
                "File storage is unavailable.".into(),
            ),
            _ => (
                "Ocorreu um erro inesperado.".into(),
                "An unexpected error occurred.".into(),
            ),
        };
        if english { en } else { pt }
    }

    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        let status = self.status();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            // O `tracing` loga a mensagem detalhada que o `thiserror` nos deu.
            tracing::error!("Erro Interno do Servidor: {:?}", self);
        }

        let details = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                Some(Value::Object(details))
            }
            AppError::StaleDocument { expected, current } => {
                Some(json!({ "expected": expected, "current": current }))
            }
            _ => None,
        };

        ApiError {
            status,
            code: self.code(),
            error: self.message(locale.is_english()),
            details,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error(&Locale::default()).into_response()
    }
}
