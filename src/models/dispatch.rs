// src/models/dispatch.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::{
    models::approval::{DocumentKind, Recipient},
    services::{document::DocumentVariant, storage::PhotoFailure},
};

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RenderQuery {
    /// `internal`, `client` (padrão) ou `approval`.
    #[serde(default)]
    pub variant: DocumentVariant,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendDocumentPayload {
    /// Destinatários avulsos.
    #[serde(default)]
    #[validate(nested)]
    pub recipients: Vec<Recipient>,
    /// Contatos cadastrados do cliente.
    #[serde(default)]
    pub contact_ids: Vec<Uuid>,
    /// Texto da mensagem; sem ele vai uma saudação padrão.
    #[validate(length(max = 2000, message = "too_long"))]
    pub message: Option<String>,
    pub actor: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum DeliveryStatus {
    Issued,
    Failed,
}

/// O que cada destinatário recebe (ou por que não recebeu).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipientDelivery {
    pub recipient: Recipient,
    pub status: DeliveryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mailto_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub whatsapp_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendOutcome {
    pub document_id: Uuid,
    pub document_kind: DocumentKind,
    pub document_version: i32,
    /// Link do documento sem token individual.
    pub document_url: String,
    /// Um único `mailto:` com todos os e-mails que receberam token.
    pub mailto_uri: Option<String>,
    pub deliveries: Vec<RecipientDelivery>,
    pub photo_failures: Vec<PhotoFailure>,
}
