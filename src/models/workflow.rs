// src/models/workflow.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// --- Etapas da Ficha Técnica de Cotação ---
// Sequência linear: rascunho -> compras -> comercial -> enviado -> aprovado.
// A tabela de transições fica em services/workflow.rs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "quote_stage", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum QuoteStage {
    Draft,
    AwaitingPurchasingQuote,
    AwaitingCommercialBudget,
    BudgetSentToClient,
    ClientApproved,
}

// --- Requisição de Compra (trilha do PCP) ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "purchase_stage", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PurchaseStage {
    AwaitingPcp,
    ApprovedPcp,
    InPurchase,
    OrderSent,
    InTransit,
    Received,
}

// --- Ordem de Produção ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "production_stage", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ProductionStage {
    AwaitingMaterials,
    AwaitingStart,
    InProduction,
    Paused,
    Completed,
}

// Tipo de movimento registrado no histórico de etapas da ficha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "stage_event_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StageEventKind {
    Advance,
    Revert,
    Send,
}
