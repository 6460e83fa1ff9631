// src/middleware/cors.rs

use axum::http::{header, HeaderName, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

use crate::middleware::public_key::PUBLIC_KEY_HEADER;

/// CORS das rotas públicas. O documento pode abrir de qualquer lugar
/// (armazenamento, anexo de e-mail, `file://`), então a origem é livre;
/// sem credenciais, quem autentica é a chave pública.
pub fn public_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::ACCEPT_LANGUAGE,
            HeaderName::from_static(PUBLIC_KEY_HEADER),
        ])
        .max_age(std::time::Duration::from_secs(3600))
}

/// CORS das rotas internas (painel da oficina).
pub fn internal_cors(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::very_permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ACCEPT_LANGUAGE])
}
