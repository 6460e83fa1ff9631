// src/handlers/quotes.rs

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
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
    models::quote::{
        AddPhotoPayload, AdvanceStagePayload, Photo, PhotoUploadQuery, Quote, QuoteDetail,
        QuoteListQuery, QuotePayload, RevertStagePayload, StageEvent,
    },
};

// =============================================================================
//  ÁREA 1: CRUD DA FICHA
// =============================================================================

// POST /api/quotes
#[utoipa::path(
    post,
    path = "/api/quotes",
    tag = "Fichas",
    request_body = QuotePayload,
    responses(
        (status = 201, description = "Ficha criada (número AAAA-NNNN, rascunho)", body = QuoteDetail),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_quote(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<QuotePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let detail = app_state
        .quote_service
        .create_quote(&app_state.db_pool, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(detail)))
}

// GET /api/quotes
#[utoipa::path(
    get,
    path = "/api/quotes",
    tag = "Fichas",
    params(QuoteListQuery),
    responses(
        (status = 200, description = "Fichas, mais recentes primeiro", body = Vec<Quote>)
    )
)]
pub async fn list_quotes(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(query): Query<QuoteListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let quotes = app_state
        .quote_service
        .list_quotes(&app_state.db_pool, query.stage)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(quotes)))
}

// GET /api/quotes/{id}
#[utoipa::path(
    get,
    path = "/api/quotes/{id}",
    tag = "Fichas",
    params(("id" = Uuid, Path, description = "ID da ficha")),
    responses(
        (status = 200, description = "Ficha com materiais, fotos e totais", body = QuoteDetail),
        (status = 404, description = "Ficha não encontrada")
    )
)]
pub async fn get_quote(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .quote_service
        .get_quote(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(detail)))
}

// PUT /api/quotes/{id}
#[utoipa::path(
    put,
    path = "/api/quotes/{id}",
    tag = "Fichas",
    request_body = QuotePayload,
    params(("id" = Uuid, Path, description = "ID da ficha")),
    responses(
        (status = 200, description = "Ficha salva (revisão + 1)", body = QuoteDetail),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Ficha não encontrada")
    )
)]
pub async fn update_quote(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<QuotePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let detail = app_state
        .quote_service
        .update_quote(&app_state.db_pool, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(detail)))
}

// POST /api/quotes/{id}/clone
#[utoipa::path(
    post,
    path = "/api/quotes/{id}/clone",
    tag = "Fichas",
    params(("id" = Uuid, Path, description = "ID da ficha de origem")),
    responses(
        (status = 201, description = "Cópia criada como rascunho, sem fotos", body = QuoteDetail),
        (status = 404, description = "Ficha não encontrada")
    )
)]
pub async fn clone_quote(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .quote_service
        .clone_quote(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(detail)))
}

// DELETE /api/quotes/{id}
#[utoipa::path(
    delete,
    path = "/api/quotes/{id}",
    tag = "Fichas",
    params(("id" = Uuid, Path, description = "ID da ficha")),
    responses(
        (status = 204, description = "Ficha excluída"),
        (status = 404, description = "Ficha não encontrada")
    )
)]
pub async fn delete_quote(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .quote_service
        .delete_quote(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 2: ETAPAS
// =============================================================================

// POST /api/quotes/{id}/advance
#[utoipa::path(
    post,
    path = "/api/quotes/{id}/advance",
    tag = "Fichas",
    request_body = AdvanceStagePayload,
    params(("id" = Uuid, Path, description = "ID da ficha")),
    responses(
        (status = 200, description = "Ficha na etapa seguinte", body = Quote),
        (status = 409, description = "Já está na última etapa")
    )
)]
pub async fn advance_stage(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    payload: Option<Json<AdvanceStagePayload>>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = payload.map(|Json(p)| p).unwrap_or_default();

    let quote = app_state
        .quote_service
        .advance_stage(&app_state.db_pool, id, payload.actor.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(quote)))
}

// POST /api/quotes/{id}/revert
#[utoipa::path(
    post,
    path = "/api/quotes/{id}/revert",
    tag = "Fichas",
    request_body = RevertStagePayload,
    params(("id" = Uuid, Path, description = "ID da ficha")),
    responses(
        (status = 200, description = "Ficha na etapa anterior", body = Quote),
        (status = 400, description = "Justificativa curta ou ficha já no rascunho")
    )
)]
pub async fn revert_stage(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<RevertStagePayload>,
) -> Result<impl IntoResponse, ApiError> {
    let quote = app_state
        .quote_service
        .revert_stage(&app_state.db_pool, id, &payload.justification, payload.actor.as_deref())
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(quote)))
}

// GET /api/quotes/{id}/history
#[utoipa::path(
    get,
    path = "/api/quotes/{id}/history",
    tag = "Fichas",
    params(("id" = Uuid, Path, description = "ID da ficha")),
    responses(
        (status = 200, description = "Movimentos de etapa, do mais antigo ao mais recente", body = Vec<StageEvent>)
    )
)]
pub async fn stage_history(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let events = app_state
        .quote_service
        .stage_history(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(events)))
}

// =============================================================================
//  ÁREA 3: FOTOS
// =============================================================================

// POST /api/quotes/{id}/photos
#[utoipa::path(
    post,
    path = "/api/quotes/{id}/photos",
    tag = "Fichas",
    request_body = AddPhotoPayload,
    params(("id" = Uuid, Path, description = "ID da ficha")),
    responses(
        (status = 201, description = "Foto anexada (referência já existente no armazenamento)", body = Photo)
    )
)]
pub async fn add_photo(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Json(payload): Json<AddPhotoPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let photo = app_state
        .quote_service
        .add_photo(&app_state.db_pool, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(photo)))
}

// POST /api/quotes/{id}/photos/upload?name=...
#[utoipa::path(
    post,
    path = "/api/quotes/{id}/photos/upload",
    tag = "Fichas",
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    params(("id" = Uuid, Path, description = "ID da ficha"), PhotoUploadQuery),
    responses(
        (status = 201, description = "Arquivo gravado e foto anexada", body = Photo)
    )
)]
pub async fn upload_photo(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
    Query(query): Query<PhotoUploadQuery>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    query
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let storage_ref = app_state
        .storage_service
        .upload_photo(id, &query.name, &body)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let payload = AddPhotoPayload {
        name: query.name,
        size_bytes: body.len() as i64,
        storage_ref,
    };

    let photo = app_state
        .quote_service
        .add_photo(&app_state.db_pool, id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(photo)))
}

// GET /api/quotes/{id}/photos
#[utoipa::path(
    get,
    path = "/api/quotes/{id}/photos",
    tag = "Fichas",
    params(("id" = Uuid, Path, description = "ID da ficha")),
    responses(
        (status = 200, description = "Fotos na ordem de exibição", body = Vec<Photo>)
    )
)]
pub async fn list_photos(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let photos = app_state
        .quote_service
        .list_photos(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(photos)))
}

// DELETE /api/quotes/{id}/photos/{photo_id}
#[utoipa::path(
    delete,
    path = "/api/quotes/{id}/photos/{photo_id}",
    tag = "Fichas",
    params(
        ("id" = Uuid, Path, description = "ID da ficha"),
        ("photo_id" = Uuid, Path, description = "ID da foto")
    ),
    responses(
        (status = 204, description = "Foto removida"),
        (status = 404, description = "Foto não encontrada")
    )
)]
pub async fn remove_photo(
    State(app_state): State<AppState>,
    locale: Locale,
    Path((id, photo_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .quote_service
        .remove_photo(&app_state.db_pool, id, photo_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
