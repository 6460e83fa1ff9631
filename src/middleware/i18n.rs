// src/middleware/i18n.rs

use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};

// Idioma preferido do cliente. O padrão é português: a oficina e os clientes são do Brasil.
#[derive(Debug, Clone)]
pub struct Locale(pub String);

impl Default for Locale {
    fn default() -> Self {
        Locale("pt".to_string())
    }
}

impl Locale {
    pub fn is_english(&self) -> bool {
        self.0 == "en"
    }

    pub fn from_header(value: &str) -> Self {
        accept_language::parse(value)
            .first()
            // "pt-BR" -> split vira ["pt", "BR"] -> next() pega "pt"
            .map(|tag| tag.split('-').next().unwrap_or(tag).to_lowercase())
            .map(Locale)
            .unwrap_or_default()
    }
}

impl<S> FromRequestParts<S> for Locale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let locale = parts
            .headers
            .get(header::ACCEPT_LANGUAGE)
            .and_then(|header_value| header_value.to_str().ok())
            .map(Locale::from_header)
            .unwrap_or_default();

        Ok(locale)
    }
}
