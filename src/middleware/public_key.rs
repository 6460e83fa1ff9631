// src/middleware/public_key.rs

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
};

/// Cabeçalho que o script embutido no documento envia em toda chamada.
pub const PUBLIC_KEY_HEADER: &str = "apikey";

/// Comparação em tempo constante; chave esperada vazia nunca confere.
fn key_matches(given: Option<&str>, expected: &str) -> bool {
    let Some(given) = given else {
        return false;
    };
    if expected.is_empty() || given.len() != expected.len() {
        return false;
    }
    given.as_bytes().ct_eq(expected.as_bytes()).unwrap_u8() == 1
}

// Protege as rotas chamadas pelo formulário de aprovação embutido.
pub async fn public_key_guard(
    State(app_state): State<AppState>,
    locale: Locale,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let given = request
        .headers()
        .get(PUBLIC_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    if !key_matches(given, &app_state.endpoint.public_key) {
        tracing::warn!("🔒 Chamada pública recusada: chave ausente ou inválida");
        return Err(AppError::InvalidPublicKey.to_api_error(&locale));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_exact_key_passes() {
        assert!(key_matches(Some("pk_live_123"), "pk_live_123"));
        assert!(!key_matches(Some("pk_live_124"), "pk_live_123"));
        assert!(!key_matches(Some("pk_live_12"), "pk_live_123"));
        assert!(!key_matches(None, "pk_live_123"));
        assert!(!key_matches(Some(""), ""));
    }
}
