// src/handlers/files.rs

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{common::error::ApiError, config::AppState, middleware::i18n::Locale};

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SignedFileQuery {
    /// Assinatura emitida junto com o link.
    pub sig: String,
}

// GET /api/public/files/{*key}?sig=...
// Aberto pelo navegador direto do link; a assinatura substitui a chave pública.
#[utoipa::path(
    get,
    path = "/api/public/files/{key}",
    tag = "Aprovação (pública)",
    params(
        ("key" = String, Path, description = "Chave do arquivo no armazenamento"),
        SignedFileQuery
    ),
    responses(
        (status = 200, description = "Conteúdo do arquivo"),
        (status = 401, description = "Assinatura inválida ou expirada")
    )
)]
pub async fn get_signed_file(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(key): Path<String>,
    Query(query): Query<SignedFileQuery>,
) -> Result<Response, ApiError> {
    let (bytes, content_type) = app_state
        .storage_service
        .open_signed(&key, &query.sig)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let headers = [
        (header::CONTENT_TYPE, content_type),
        (header::CACHE_CONTROL, "private, max-age=300"),
    ];

    Ok((headers, bytes).into_response())
}
