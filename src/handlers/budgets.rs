// src/handlers/budgets.rs

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
    models::budget::{Budget, CreateBudgetPayload},
};

// POST /api/quotes/{id}/budgets
#[utoipa::path(
    post,
    path = "/api/quotes/{id}/budgets",
    tag = "Orçamentos",
    request_body = CreateBudgetPayload,
    params(("id" = Uuid, Path, description = "ID da ficha")),
    responses(
        (status = 201, description = "Nova versão do orçamento (passa a ser a atual)", body = Budget),
        (status = 400, description = "Percentuais fora de 0-100 ou valor da hora ausente"),
        (status = 404, description = "Ficha não encontrada")
    )
)]
pub async fn create_budget(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(quote_id): Path<Uuid>,
    Json(payload): Json<CreateBudgetPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let budget = app_state
        .budget_service
        .create_version(&app_state.db_pool, quote_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(budget)))
}

// GET /api/quotes/{id}/budgets
#[utoipa::path(
    get,
    path = "/api/quotes/{id}/budgets",
    tag = "Orçamentos",
    params(("id" = Uuid, Path, description = "ID da ficha")),
    responses(
        (status = 200, description = "Versões, da mais nova para a mais antiga", body = Vec<Budget>)
    )
)]
pub async fn list_budgets(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(quote_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let budgets = app_state
        .budget_service
        .list_versions(quote_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(budgets)))
}

// GET /api/quotes/{id}/budgets/current
#[utoipa::path(
    get,
    path = "/api/quotes/{id}/budgets/current",
    tag = "Orçamentos",
    params(("id" = Uuid, Path, description = "ID da ficha")),
    responses(
        (status = 200, description = "Versão atual", body = Budget),
        (status = 404, description = "Ficha sem orçamento")
    )
)]
pub async fn current_budget(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(quote_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let budget = app_state
        .budget_service
        .get_current(&app_state.db_pool, quote_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(budget)))
}

// GET /api/budgets/{id}
#[utoipa::path(
    get,
    path = "/api/budgets/{id}",
    tag = "Orçamentos",
    params(("id" = Uuid, Path, description = "ID do orçamento")),
    responses(
        (status = 200, description = "Orçamento", body = Budget),
        (status = 404, description = "Orçamento não encontrado")
    )
)]
pub async fn get_budget(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let budget = app_state
        .budget_service
        .get_budget(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(budget)))
}
