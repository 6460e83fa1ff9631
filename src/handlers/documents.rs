// src/handlers/documents.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::{
        approval::DocumentKind,
        dispatch::{RenderQuery, SendDocumentPayload, SendOutcome},
    },
};

// Quantas fotos ficaram de fora do documento gerado.
const PHOTO_FAILURES_HEADER: HeaderName = HeaderName::from_static("x-photo-failures");

// GET /api/documents/{kind}/{id}?variant=internal|client|approval
#[utoipa::path(
    get,
    path = "/api/documents/{kind}/{id}",
    tag = "Documentos",
    params(
        ("kind" = DocumentKind, Path, description = "quote ou budget"),
        ("id" = Uuid, Path, description = "ID da ficha ou do orçamento"),
        RenderQuery
    ),
    responses(
        (status = 200, description = "Documento HTML autossuficiente", content_type = "text/html"),
        (status = 404, description = "Documento não encontrado")
    )
)]
pub async fn render_document(
    State(app_state): State<AppState>,
    locale: Locale,
    Path((kind, id)): Path<(DocumentKind, Uuid)>,
    Query(query): Query<RenderQuery>,
) -> Result<Response, ApiError> {
    let rendered = app_state
        .dispatch_service
        .render(&app_state.db_pool, kind, id, query.variant)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let headers = [
        (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", rendered.file_name),
        ),
        (PHOTO_FAILURES_HEADER, rendered.photo_failures.len().to_string()),
    ];

    Ok((headers, rendered.html).into_response())
}

// POST /api/documents/{kind}/{id}/send
#[utoipa::path(
    post,
    path = "/api/documents/{kind}/{id}/send",
    tag = "Documentos",
    request_body = SendDocumentPayload,
    params(
        ("kind" = DocumentKind, Path, description = "quote ou budget"),
        ("id" = Uuid, Path, description = "ID da ficha ou do orçamento")
    ),
    responses(
        (status = 200, description = "Documento gravado; resultado por destinatário", body = SendOutcome),
        (status = 400, description = "Sem destinatários"),
        (status = 409, description = "Orçamento não é mais a versão atual")
    )
)]
pub async fn send_document(
    State(app_state): State<AppState>,
    locale: Locale,
    Path((kind, id)): Path<(DocumentKind, Uuid)>,
    Json(payload): Json<SendDocumentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let outcome = app_state
        .dispatch_service
        .send(&app_state.db_pool, kind, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(outcome)))
}
