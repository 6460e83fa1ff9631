// src/models/approval.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::workflow::QuoteStage;

// --- Enums ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "document_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Quote,
    Budget,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Quote => "quote",
            DocumentKind::Budget => "budget",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "approval_decision", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Approve,
    RequestChanges,
    Reject,
}

// --- Destinatário (quem recebe o link) ---

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Maria Souza")]
    pub name: String,
    #[validate(email(message = "invalid_email"))]
    #[schema(example = "maria@cliente.com.br")]
    pub email: Option<String>,
    #[schema(example = "(11) 98888-7777")]
    pub phone: Option<String>,
    #[schema(example = "Compras")]
    pub role: Option<String>,
}

// --- Token de aprovação (uso único, expira em 30 dias) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalToken {
    pub id: Uuid,
    pub token: String,
    pub document_id: Uuid,
    pub document_kind: DocumentKind,
    pub recipient_name: String,
    pub recipient_email: Option<String>,
    pub recipient_phone: Option<String>,
    pub recipient_role: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

// --- Resposta do aprovador (somente inserção; é a trilha de auditoria) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalResponse {
    pub id: Uuid,
    pub token_id: Option<Uuid>,
    pub document_id: Uuid,
    pub document_kind: DocumentKind,
    pub document_version: i32,
    pub decision: Decision,
    pub responder_name: String,
    pub responder_email: Option<String>,
    pub responder_phone: Option<String>,
    pub remarks: Option<String>,
    pub user_agent: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Dados para gravar uma resposta (o id e a data vêm do banco).
#[derive(Debug, Clone)]
pub struct NewApprovalResponse {
    pub token_id: Option<Uuid>,
    pub document_id: Uuid,
    pub document_kind: DocumentKind,
    pub document_version: i32,
    pub decision: Decision,
    pub responder_name: String,
    pub responder_email: Option<String>,
    pub responder_phone: Option<String>,
    pub remarks: Option<String>,
    pub user_agent: Option<String>,
}

// --- Payloads / views públicas (usadas pelo script embutido no documento) ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResponsePayload {
    pub token: Option<String>,
    pub document_id: Uuid,
    pub document_kind: DocumentKind,
    pub document_version: i32,
    // A etapa em que o documento estava quando foi gerado.
    pub expected_stage: Option<QuoteStage>,
    pub decision: Decision,
    #[validate(custom(function = "not_blank"))]
    pub responder_name: String,
    #[validate(email(message = "invalid_email"))]
    pub responder_email: Option<String>,
    pub responder_phone: Option<String>,
    #[validate(length(max = 4000, message = "too_long"))]
    pub remarks: Option<String>,
    // O termo de responsabilidade precisa ter sido marcado.
    #[validate(custom(function = "must_be_acknowledged"))]
    pub acknowledged: bool,
}

// Só espaços não conta como nome.
fn not_blank(value: &str) -> Result<(), ValidationError> {
    if !value.trim().is_empty() {
        return Ok(());
    }
    let mut err = ValidationError::new("required");
    err.message = Some("Informe o nome de quem está respondendo.".into());
    Err(err)
}

fn must_be_acknowledged(value: &bool) -> Result<(), ValidationError> {
    if *value {
        return Ok(());
    }
    let mut err = ValidationError::new("required");
    err.message = Some("A declaração de responsabilidade precisa ser aceita.".into());
    Err(err)
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecipientView {
    pub document_id: Uuid,
    pub document_kind: DocumentKind,
    pub recipient_name: String,
    pub recipient_email: Option<String>,
    pub recipient_phone: Option<String>,
    pub recipient_role: Option<String>,
    pub expires_at: DateTime<Utc>,
}

impl From<&ApprovalToken> for TokenRecipientView {
    fn from(token: &ApprovalToken) -> Self {
        Self {
            document_id: token.document_id,
            document_kind: token.document_kind,
            recipient_name: token.recipient_name.clone(),
            recipient_email: token.recipient_email.clone(),
            recipient_phone: token.recipient_phone.clone(),
            recipient_role: token.recipient_role.clone(),
            expires_at: token.expires_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DocumentStatus {
    pub document_id: Uuid,
    pub document_kind: DocumentKind,
    pub stage: QuoteStage,
    #[schema(example = "Orçamento Enviado ao Cliente")]
    pub stage_label: String,
    pub version: i32,
    pub is_current: bool,
}
