// src/handlers/approvals.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::{headers::UserAgent, TypedHeader};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::approval::{
        ApprovalResponse, ApprovalToken, DocumentKind, DocumentStatus, SubmitResponsePayload,
        TokenRecipientView,
    },
};

// =============================================================================
//  ÁREA 1: ROTAS PÚBLICAS (chamadas pelo formulário embutido no documento)
// =============================================================================

// GET /api/public/approval-tokens/{token}
#[utoipa::path(
    get,
    path = "/api/public/approval-tokens/{token}",
    tag = "Aprovação (pública)",
    params(("token" = String, Path, description = "Token do link individual")),
    responses(
        (status = 200, description = "Identidade do destinatário para pré-preencher", body = TokenRecipientView),
        (status = 404, description = "TOKEN_NOT_FOUND"),
        (status = 410, description = "TOKEN_EXPIRED ou TOKEN_ALREADY_USED")
    ),
    security(("public_key" = []))
)]
pub async fn get_token(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let view = app_state
        .approval_service
        .token_for_prefill(&token)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(view)))
}

// GET /api/public/documents/{kind}/{id}/status
#[utoipa::path(
    get,
    path = "/api/public/documents/{kind}/{id}/status",
    tag = "Aprovação (pública)",
    params(
        ("kind" = DocumentKind, Path, description = "quote ou budget"),
        ("id" = Uuid, Path, description = "ID do documento")
    ),
    responses(
        (status = 200, description = "Etapa e versão atuais", body = DocumentStatus),
        (status = 404, description = "Documento não encontrado")
    ),
    security(("public_key" = []))
)]
pub async fn document_status(
    State(app_state): State<AppState>,
    locale: Locale,
    Path((kind, id)): Path<(DocumentKind, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let status = app_state
        .approval_service
        .document_status(kind, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(status)))
}

// POST /api/public/approval-responses
#[utoipa::path(
    post,
    path = "/api/public/approval-responses",
    tag = "Aprovação (pública)",
    request_body = SubmitResponsePayload,
    responses(
        (status = 201, description = "Resposta registrada", body = ApprovalResponse),
        (status = 400, description = "Dados inválidos (ex.: declaração não aceita)"),
        (status = 409, description = "STALE_DOCUMENT"),
        (status = 410, description = "TOKEN_EXPIRED ou TOKEN_ALREADY_USED")
    ),
    security(("public_key" = []))
)]
pub async fn submit_response(
    State(app_state): State<AppState>,
    locale: Locale,
    user_agent: Option<TypedHeader<UserAgent>>,
    Json(payload): Json<SubmitResponsePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let user_agent = user_agent.map(|TypedHeader(ua)| ua.as_str().to_string());

    let response = app_state
        .approval_service
        .submit_response(payload, user_agent)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(response)))
}

// =============================================================================
//  ÁREA 2: ROTAS INTERNAS (trilha de auditoria)
// =============================================================================

// GET /api/documents/{kind}/{id}/responses
#[utoipa::path(
    get,
    path = "/api/documents/{kind}/{id}/responses",
    tag = "Documentos",
    params(
        ("kind" = DocumentKind, Path, description = "quote ou budget"),
        ("id" = Uuid, Path, description = "ID do documento")
    ),
    responses(
        (status = 200, description = "Respostas recebidas, em ordem de chegada", body = Vec<ApprovalResponse>)
    )
)]
pub async fn list_responses(
    State(app_state): State<AppState>,
    locale: Locale,
    Path((kind, id)): Path<(DocumentKind, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let responses = app_state
        .approval_service
        .list_responses(kind, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(responses)))
}

// GET /api/documents/{kind}/{id}/tokens
#[utoipa::path(
    get,
    path = "/api/documents/{kind}/{id}/tokens",
    tag = "Documentos",
    params(
        ("kind" = DocumentKind, Path, description = "quote ou budget"),
        ("id" = Uuid, Path, description = "ID do documento")
    ),
    responses(
        (status = 200, description = "Tokens emitidos e se já foram usados", body = Vec<ApprovalToken>)
    )
)]
pub async fn list_tokens(
    State(app_state): State<AppState>,
    locale: Locale,
    Path((kind, id)): Path<(DocumentKind, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    let tokens = app_state
        .approval_service
        .list_tokens(kind, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(tokens)))
}
