// src/handlers/clients.rs

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
    models::client::{Client, ClientContact, ClientDetail, CreateClientPayload, CreateContactPayload},
};

// POST /api/clients
#[utoipa::path(
    post,
    path = "/api/clients",
    tag = "Clientes",
    request_body = CreateClientPayload,
    responses(
        (status = 201, description = "Cliente cadastrado", body = Client),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_client(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<CreateClientPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let client = app_state
        .client_service
        .create_client(&app_state.db_pool, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(client)))
}

// GET /api/clients
#[utoipa::path(
    get,
    path = "/api/clients",
    tag = "Clientes",
    responses(
        (status = 200, description = "Clientes em ordem alfabética", body = Vec<Client>)
    )
)]
pub async fn list_clients(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<impl IntoResponse, ApiError> {
    let clients = app_state
        .client_service
        .list_clients()
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(clients)))
}

// GET /api/clients/{id}
#[utoipa::path(
    get,
    path = "/api/clients/{id}",
    tag = "Clientes",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 200, description = "Cliente com contatos", body = ClientDetail),
        (status = 404, description = "Cliente não encontrado")
    )
)]
pub async fn get_client(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let detail = app_state
        .client_service
        .get_client(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::OK, Json(detail)))
}

// DELETE /api/clients/{id}
#[utoipa::path(
    delete,
    path = "/api/clients/{id}",
    tag = "Clientes",
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 204, description = "Cliente excluído (fichas ficam, sem vínculo)"),
        (status = 404, description = "Cliente não encontrado")
    )
)]
pub async fn delete_client(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .client_service
        .delete_client(&app_state.db_pool, id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}

// POST /api/clients/{id}/contacts
#[utoipa::path(
    post,
    path = "/api/clients/{id}/contacts",
    tag = "Clientes",
    request_body = CreateContactPayload,
    params(("id" = Uuid, Path, description = "ID do cliente")),
    responses(
        (status = 201, description = "Contato adicionado", body = ClientContact),
        (status = 404, description = "Cliente não encontrado")
    )
)]
pub async fn add_contact(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(client_id): Path<Uuid>,
    Json(payload): Json<CreateContactPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let contact = app_state
        .client_service
        .add_contact(&app_state.db_pool, client_id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(contact)))
}

// DELETE /api/clients/{id}/contacts/{contact_id}
#[utoipa::path(
    delete,
    path = "/api/clients/{id}/contacts/{contact_id}",
    tag = "Clientes",
    params(
        ("id" = Uuid, Path, description = "ID do cliente"),
        ("contact_id" = Uuid, Path, description = "ID do contato")
    ),
    responses(
        (status = 204, description = "Contato removido"),
        (status = 404, description = "Contato não encontrado")
    )
)]
pub async fn remove_contact(
    State(app_state): State<AppState>,
    locale: Locale,
    Path((client_id, contact_id)): Path<(Uuid, Uuid)>,
) -> Result<impl IntoResponse, ApiError> {
    app_state
        .client_service
        .remove_contact(&app_state.db_pool, client_id, contact_id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(StatusCode::NO_CONTENT)
}
