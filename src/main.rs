//src/main.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppConfig, AppState};
use crate::docs::ApiDoc;
use crate::middleware::cors::{internal_cors, public_cors};
use crate::middleware::public_key::public_key_guard;

// Fotos de peça vêm direto da câmera do celular.
const PHOTO_UPLOAD_LIMIT: usize = 15 * 1024 * 1024;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = AppConfig::from_env()?;
    let app_state = AppState::new(&config).await?;

    sqlx::migrate!().run(&app_state.db_pool).await?;
    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // =========================================================================
    //  ROTAS INTERNAS (equipe da fábrica)
    // =========================================================================

    let quote_routes = Router::new()
        .route("/", post(handlers::quotes::create_quote).get(handlers::quotes::list_quotes))
        .route(
            "/{id}",
            get(handlers::quotes::get_quote)
                .put(handlers::quotes::update_quote)
                .delete(handlers::quotes::delete_quote),
        )
        .route("/{id}/clone", post(handlers::quotes::clone_quote))
        .route("/{id}/advance", post(handlers::quotes::advance_stage))
        .route("/{id}/revert", post(handlers::quotes::revert_stage))
        .route("/{id}/history", get(handlers::quotes::stage_history))
        .route(
            "/{id}/photos",
            post(handlers::quotes::add_photo).get(handlers::quotes::list_photos),
        )
        .route(
            "/{id}/photos/upload",
            post(handlers::quotes::upload_photo).layer(DefaultBodyLimit::max(PHOTO_UPLOAD_LIMIT)),
        )
        .route("/{id}/photos/{photo_id}", delete(handlers::quotes::remove_photo))
        .route(
            "/{id}/budgets",
            post(handlers::budgets::create_budget).get(handlers::budgets::list_budgets),
        )
        .route("/{id}/budgets/current", get(handlers::budgets::current_budget))
        .route(
            "/{id}/requisitions",
            post(handlers::tracking::create_requisition).get(handlers::tracking::list_requisitions),
        )
        .route(
            "/{id}/production-orders",
            post(handlers::tracking::create_production_order)
                .get(handlers::tracking::list_production_orders),
        );

    let client_routes = Router::new()
        .route("/", post(handlers::clients::create_client).get(handlers::clients::list_clients))
        .route(
            "/{id}",
            get(handlers::clients::get_client).delete(handlers::clients::delete_client),
        )
        .route("/{id}/contacts", post(handlers::clients::add_contact))
        .route("/{id}/contacts/{contact_id}", delete(handlers::clients::remove_contact));

    let document_routes = Router::new()
        .route("/{kind}/{id}", get(handlers::documents::render_document))
        .route("/{kind}/{id}/send", post(handlers::documents::send_document))
        .route("/{kind}/{id}/responses", get(handlers::approvals::list_responses))
        .route("/{kind}/{id}/tokens", get(handlers::approvals::list_tokens));

    let internal_routes = Router::new()
        .nest("/api/quotes", quote_routes)
        .nest("/api/clients", client_routes)
        .nest("/api/documents", document_routes)
        .route("/api/budgets/{id}", get(handlers::budgets::get_budget))
        .route(
            "/api/requisitions/{id}/transition",
            post(handlers::tracking::transition_requisition),
        )
        .route(
            "/api/production-orders/{id}/transition",
            post(handlers::tracking::transition_production_order),
        )
        .layer(internal_cors(&config.cors_allowed_origins));

    // =========================================================================
    //  ROTAS PÚBLICAS (formulário embutido no documento enviado ao cliente)
    // =========================================================================

    // O CORS fica por fora para o preflight não esbarrar na chave.
    let public_routes = Router::new()
        .route("/approval-tokens/{token}", get(handlers::approvals::get_token))
        .route("/documents/{kind}/{id}/status", get(handlers::approvals::document_status))
        .route("/approval-responses", post(handlers::approvals::submit_response))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            public_key_guard,
        ))
        .layer(public_cors());

    // Links assinados: a assinatura já é a credencial.
    let file_routes = Router::new()
        .route("/api/public/files/{*key}", get(handlers::files::get_signed_file))
        .layer(public_cors());

    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .merge(internal_routes)
        .nest("/api/public", public_routes)
        .merge(file_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let listener = TcpListener::bind(&config.server_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
