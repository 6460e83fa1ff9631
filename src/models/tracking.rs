// src/models/tracking.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::workflow::{ProductionStage, PurchaseStage};

// Trilhas de acompanhamento depois da aprovação do cliente (Compras / Produção).

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequisition {
    pub id: Uuid,
    pub quote_id: Uuid,
    #[schema(example = "Barra SAE 1045 Ø50 - 12 kg")]
    pub description: String,
    pub supplier: Option<String>,
    pub stage: PurchaseStage,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductionOrder {
    pub id: Uuid,
    pub quote_id: Uuid,
    #[schema(example = "OP-2026-0042")]
    pub order_number: Option<String>,
    pub stage: ProductionStage,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- Payloads ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequisitionPayload {
    #[validate(length(min = 1, message = "required"))]
    pub description: String,
    pub supplier: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductionOrderPayload {
    pub order_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionPurchasePayload {
    pub new_stage: PurchaseStage,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransitionProductionPayload {
    pub new_stage: ProductionStage,
}
