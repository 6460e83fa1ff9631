// src/handlers/tracking.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::tracking::{
        CreateProductionOrderPayload, CreateRequisitionPayload, ProductionOrder, PurchaseRequisition,
        TransitionProductionPayload, TransitionPurchasePayload,
    },
};

// =============================================================================
//  ÁREA 1: REQUISIÇÕES DE COMPRA
// =============================================================================

// POST /api/quotes/{id}/requisitions
#[utoipa::path(
    post,
    path = "/api/quotes/{id}/requisitions",
    tag = "Acompanhamento",
    request_body = CreateRequisitionPayload,
    params(("id" = Uuid, Path, description = "ID da ficha")),
    responses(
        (status = 201, description = "Requisição criada (Aguardando PCP)", body = PurchaseRequisition)
    )
)]
pub async fn create_requisition(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(quote_id): Path<Uuid>,
    Json(payload): Json<CreateRequisitionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let requisition = app_state
        .tracking_service
        .create_requisition(&app_state.db_pool, quote_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(requisition)))
}

// GET /api/quotes/{id}/requisitions
#[utoipa::path(
    get,
    path = "/api/quotes/{id}/requisitions",
    tag = "Acompanhamento",
    params(("id" = Uuid, Path, description = "ID da ficha")),
    responses(
        (status = 200, description = "Requisições da ficha", body = Vec<PurchaseRequisition>)
    )
)]
pub async fn list_requisitions(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(quote_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let requisitions = app_state
        .tracking_service
        .list_requisitions(quote_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(requisitions)))
}

// POST /api/requisitions/{id}/transition
#[utoipa::path(
    post,
    path = "/api/requisitions/{id}/transition",
    tag = "Acompanhamento",
    request_body = TransitionPurchasePayload,
    params(("id" = Uuid, Path, description = "ID da requisição")),
    responses(
        (status = 200, description = "Requisição na nova etapa", body = PurchaseRequisition),
        (status = 409, description = "Transição não permitida")
    )
)]
pub async fn transition_requisition(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransitionPurchasePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let requisition = app_state
        .tracking_service
        .transition_requisition(&app_state.db_pool, id, payload.new_stage)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(requisition)))
}

// =============================================================================
//  ÁREA 2: ORDENS DE PRODUÇÃO
// =============================================================================

// POST /api/quotes/{id}/production-orders
#[utoipa::path(
    post,
    path = "/api/quotes/{id}/production-orders",
    tag = "Acompanhamento",
    request_body = CreateProductionOrderPayload,
    params(("id" = Uuid, Path, description = "ID da ficha")),
    responses(
        (status = 201, description = "Ordem criada (Aguardando Materiais)", body = ProductionOrder)
    )
)]
pub async fn create_production_order(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(quote_id): Path<Uuid>,
    Json(payload): Json<CreateProductionOrderPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let order = app_state
        .tracking_service
        .create_production_order(&app_state.db_pool, quote_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(order)))
}

// GET /api/quotes/{id}/production-orders
#[utoipa::path(
    get,
    path = "/api/quotes/{id}/production-orders",
    tag = "Acompanhamento",
    params(("id" = Uuid, Path, description = "ID da ficha")),
    responses(
        (status = 200, description = "Ordens de produção da ficha", body = Vec<ProductionOrder>)
    )
)]
pub async fn list_production_orders(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(quote_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let orders = app_state
        .tracking_service
        .list_production_orders(quote_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(orders)))
}

// POST /api/production-orders/{id}/transition
#[utoipa::path(
    post,
    path = "/api/production-orders/{id}/transition",
    tag = "Acompanhamento",
    request_body = TransitionProductionPayload,
    params(("id" = Uuid, Path, description = "ID da ordem de produção")),
    responses(
        (status = 200, description = "Ordem na nova etapa", body = ProductionOrder),
        (status = 409, description = "Transição não permitida")
    )
)]
pub async fn transition_production_order(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<TransitionProductionPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let order = app_state
        .tracking_service
        .transition_production_order(&app_state.db_pool, id, payload.new_stage)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(order)))
}
