// src/models/quote.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::common::numeric::lenient_string;
use crate::models::workflow::{QuoteStage, StageEventKind};
use crate::services::totals::Totals;

// --- A Ficha (cabeçalho) ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub id: Uuid,
    #[schema(example = "2026-0042")]
    pub number: String,
    pub stage: QuoteStage,
    // Incrementa a cada gravação; é a "versão" da ficha vista pelo aprovador.
    #[schema(example = 3)]
    pub revision: i32,

    // Cliente
    pub client_id: Option<Uuid>,
    #[schema(example = "Metalúrgica Exemplo Ltda")]
    pub client_name: String,
    #[schema(example = "12.345.678/0001-99")]
    pub client_document: Option<String>,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,

    // Peça
    #[schema(example = "Eixo de transmissão 1045")]
    pub part_description: String,
    pub part_code: Option<String>,
    pub drawing_number: Option<String>,
    pub material_spec: Option<String>,
    #[schema(example = 2)]
    pub quantity: i32,

    // Grupos de campos flexíveis (mapas chave -> valor, ver services/catalog.rs)
    #[schema(value_type = Object)]
    pub sampling: Value,
    #[schema(value_type = Object)]
    pub execution: Value,
    #[schema(value_type = Object)]
    pub treatments: Value,
    #[schema(value_type = Object)]
    pub special_services: Value,
    #[schema(value_type = Object, example = json!({"torno_grande": 5}))]
    pub labor_hours: Value,

    pub notes: Option<String>,

    // Números de controle
    pub client_request_number: Option<String>,
    pub internal_order_number: Option<String>,

    // Cache dos totais (a fonte da verdade é o recálculo)
    pub hours_per_unit: Decimal,
    pub hours_total: Decimal,
    pub material_cost_per_unit: Decimal,
    pub material_cost_total: Decimal,

    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialLine {
    pub id: Uuid,
    pub quote_id: Uuid,
    pub position: i32,
    #[schema(example = "Barra redonda SAE 1045 Ø50")]
    pub description: String,
    // Quantidade e preço ficam como foram digitados.
    #[schema(example = "3")]
    pub quantity: String,
    #[schema(example = "kg")]
    pub unit: Option<String>,
    #[schema(example = "10.00")]
    pub unit_price: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: Uuid,
    pub quote_id: Uuid,
    pub position: i32,
    #[schema(example = "peca-frente.jpg")]
    pub name: String,
    #[schema(example = 245812)]
    pub size_bytes: i64,
    // Referência no armazenamento de objetos; nada de pixels aqui.
    #[schema(example = "photos/0d1c.../peca-frente.jpg")]
    pub storage_ref: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuoteDetail {
    #[serde(flatten)]
    pub quote: Quote,
    pub materials: Vec<MaterialLine>,
    pub photos: Vec<Photo>,
    // Recalculado na leitura a partir dos materiais gravados.
    pub totals: Totals,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageEvent {
    pub id: Uuid,
    pub quote_id: Uuid,
    pub kind: StageEventKind,
    pub from_stage: QuoteStage,
    pub to_stage: QuoteStage,
    pub justification: Option<String>,
    pub actor: Option<String>,
    pub created_at: DateTime<Utc>,
}

// --- Payloads ---

fn default_quantity() -> i32 {
    1
}

fn empty_object() -> Value {
    json!({})
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialLinePayload {
    #[validate(length(min = 1, max = 500, message = "required"))]
    pub description: String,

    #[serde(default, deserialize_with = "lenient_string")]
    #[schema(value_type = String, example = "3")]
    pub quantity: String,

    pub unit: Option<String>,

    #[serde(default, deserialize_with = "lenient_string")]
    #[schema(value_type = String, example = "10.00")]
    pub unit_price: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuotePayload {
    pub client_id: Option<Uuid>,

    #[validate(length(min = 1, message = "required"))]
    pub client_name: String,
    pub client_document: Option<String>,
    pub contact_name: Option<String>,
    #[validate(email(message = "invalid_email"))]
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,

    #[validate(length(min = 1, message = "required"))]
    pub part_description: String,
    pub part_code: Option<String>,
    pub drawing_number: Option<String>,
    pub material_spec: Option<String>,

    #[serde(default = "default_quantity")]
    #[validate(range(min = 1, message = "must_be_positive"))]
    pub quantity: i32,

    #[serde(default = "empty_object")]
    #[schema(value_type = Object)]
    pub sampling: Value,
    #[serde(default = "empty_object")]
    #[schema(value_type = Object)]
    pub execution: Value,
    #[serde(default = "empty_object")]
    #[schema(value_type = Object)]
    pub treatments: Value,
    #[serde(default = "empty_object")]
    #[schema(value_type = Object)]
    pub special_services: Value,
    #[serde(default = "empty_object")]
    #[schema(value_type = Object)]
    pub labor_hours: Value,

    pub notes: Option<String>,
    pub client_request_number: Option<String>,
    pub internal_order_number: Option<String>,

    #[serde(default)]
    #[validate(nested)]
    pub materials: Vec<MaterialLinePayload>,

    pub created_by: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddPhotoPayload {
    #[validate(length(min = 1, message = "required"))]
    pub name: String,
    #[validate(range(min = 0, message = "must_not_be_negative"))]
    pub size_bytes: i64,
    #[validate(length(min = 1, message = "required"))]
    pub storage_ref: String,
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceStagePayload {
    pub actor: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RevertStagePayload {
    // O mínimo de caracteres é conferido pela regra de reversão (conta sem espaços nas pontas).
    #[schema(example = "Cliente pediu troca do material da peça")]
    pub justification: String,
    pub actor: Option<String>,
}

#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct QuoteListQuery {
    /// Filtra pela etapa (código, ex.: `draft`).
    pub stage: Option<QuoteStage>,
}

#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PhotoUploadQuery {
    /// Nome original do arquivo.
    #[validate(length(min = 1, max = 255, message = "required"))]
    pub name: String,
}
