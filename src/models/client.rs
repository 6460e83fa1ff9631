// src/models/client.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::approval::Recipient;

// --- Cadastro de clientes e contatos ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    #[schema(example = "Metalúrgica Exemplo Ltda")]
    pub name: String,
    #[schema(example = "12.345.678/0001-99")]
    pub document_number: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientContact {
    pub id: Uuid,
    pub client_id: Uuid,
    #[schema(example = "Maria Souza")]
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[schema(example = "Compras")]
    pub role: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&ClientContact> for Recipient {
    fn from(contact: &ClientContact) -> Self {
        Recipient {
            name: contact.name.clone(),
            email: contact.email.clone(),
            phone: contact.phone.clone(),
            role: contact.role.clone(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClientDetail {
    #[serde(flatten)]
    pub client: Client,
    pub contacts: Vec<ClientContact>,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    pub document_number: Option<String>,
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateContactPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    #[validate(email(message = "invalid_email"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: Option<String>,
}
