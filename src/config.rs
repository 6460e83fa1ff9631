// src/config.rs

use std::{env, str::FromStr, sync::Arc, time::Duration};

use anyhow::{anyhow, Context};
use rust_decimal::Decimal;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{ApprovalRepository, BudgetRepository, ClientRepository, QuoteRepository, TrackingRepository},
    models::settings::CompanyProfile,
    services::{
        approval_service::ApprovalService,
        budget_service::BudgetService,
        client_service::ClientService,
        dispatch_service::DispatchService,
        document::BackendEndpoint,
        quote_service::QuoteService,
        storage::{LocalObjectStorage, StorageService, UrlSigner},
        tracking_service::TrackingService,
    },
};

// =============================================================================
//  CONFIGURAÇÃO (variáveis de ambiente / .env)
// =============================================================================

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub server_addr: String,
    pub public_base_url: String,
    pub public_api_key: String,
    pub storage_dir: String,
    pub storage_signing_secret: String,
    pub photo_url_ttl_minutes: i64,
    pub default_hourly_rate: Option<Decimal>,
    pub cors_allowed_origins: Vec<String>,
    pub company: CompanyProfile,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Lê a configuração de uma fonte qualquer (o ambiente, ou um mapa nos testes).
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let required = |key: &str| get(key).ok_or_else(|| anyhow!("{} deve ser definida", key));

        let photo_url_ttl_minutes = match get("PHOTO_URL_TTL_MINUTES") {
            Some(raw) => raw
                .parse::<i64>()
                .with_context(|| format!("PHOTO_URL_TTL_MINUTES inválido: '{}'", raw))?,
            None => 60,
        };

        let default_hourly_rate = get("DEFAULT_HOURLY_RATE")
            .map(|raw| {
                Decimal::from_str(&raw.replace(',', "."))
                    .with_context(|| format!("DEFAULT_HOURLY_RATE inválido: '{}'", raw))
            })
            .transpose()?;

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            server_addr: get("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            public_base_url: get("PUBLIC_BASE_URL").unwrap_or_else(|| "http://localhost:3000".to_string()),
            public_api_key: required("PUBLIC_API_KEY")?,
            storage_dir: get("STORAGE_DIR").unwrap_or_else(|| "./storage".to_string()),
            storage_signing_secret: required("STORAGE_SIGNING_SECRET")?,
            photo_url_ttl_minutes,
            default_hourly_rate,
            cors_allowed_origins,
            company: CompanyProfile {
                name: get("COMPANY_NAME").unwrap_or_default(),
                document_number: get("COMPANY_DOCUMENT"),
                address: get("COMPANY_ADDRESS"),
                phone: get("COMPANY_PHONE"),
                email: get("COMPANY_EMAIL"),
            },
        })
    }
}

// =============================================================================
//  ESTADO COMPARTILHADO
// =============================================================================

#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub endpoint: BackendEndpoint,
    pub quote_service: QuoteService,
    pub budget_service: BudgetService,
    pub client_service: ClientService,
    pub tracking_service: TrackingService,
    pub approval_service: ApprovalService,
    pub storage_service: StorageService,
    pub dispatch_service: DispatchService,
}

impl AppState {
    pub async fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&config.database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let endpoint = BackendEndpoint {
            base_url: config.public_base_url.trim_end_matches('/').to_string(),
            public_key: config.public_api_key.clone(),
        };

        let quote_repo = QuoteRepository::new(db_pool.clone());
        let quote_service = QuoteService::new(quote_repo.clone());
        let budget_service = BudgetService::new(
            BudgetRepository::new(db_pool.clone()),
            quote_repo.clone(),
            config.default_hourly_rate,
        );
        let client_service = ClientService::new(ClientRepository::new(db_pool.clone()));
        let tracking_service = TrackingService::new(TrackingRepository::new(db_pool.clone()), quote_repo);
        let approval_service = ApprovalService::new(Arc::new(ApprovalRepository::new(db_pool.clone())));

        let storage_service = StorageService::new(
            Arc::new(LocalObjectStorage::new(&config.storage_dir)),
            UrlSigner::new(&endpoint.base_url, config.storage_signing_secret.clone()),
            chrono::Duration::minutes(config.photo_url_ttl_minutes),
        );

        let dispatch_service = DispatchService::new(
            quote_service.clone(),
            budget_service.clone(),
            client_service.clone(),
            approval_service.clone(),
            storage_service.clone(),
            endpoint.clone(),
            config.company.clone(),
        );

        Ok(Self {
            db_pool,
            endpoint,
            quote_service,
            budget_service,
            client_service,
            tracking_service,
            approval_service,
            storage_service,
            dispatch_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 3] = [
        ("DATABASE_URL", "postgres://localhost/ficha"),
        ("PUBLIC_API_KEY", "pk_test"),
        ("STORAGE_SIGNING_SECRET", "segredo"),
    ];

    #[test]
    fn defaults_apply_when_optional_values_are_missing() {
        let config = AppConfig::from_lookup(lookup(&REQUIRED)).unwrap();

        assert_eq!(config.server_addr, "0.0.0.0:3000");
        assert_eq!(config.public_base_url, "http://localhost:3000");
        assert_eq!(config.storage_dir, "./storage");
        assert_eq!(config.photo_url_ttl_minutes, 60);
        assert_eq!(config.default_hourly_rate, None);
        assert!(config.cors_allowed_origins.is_empty());
        assert_eq!(config.company.document_number, None);
    }

    #[test]
    fn parses_optional_values() {
        let mut pairs = REQUIRED.to_vec();
        pairs.extend([
            ("DEFAULT_HOURLY_RATE", "85,50"),
            ("PHOTO_URL_TTL_MINUTES", "15"),
            ("CORS_ALLOWED_ORIGINS", "https://painel.exemplo.com, ,http://localhost:5173"),
            ("COMPANY_NAME", "Usinagem Exemplo"),
        ]);
        let config = AppConfig::from_lookup(lookup(&pairs)).unwrap();

        assert_eq!(config.default_hourly_rate, Some(Decimal::from_str("85.50").unwrap()));
        assert_eq!(config.photo_url_ttl_minutes, 15);
        assert_eq!(config.cors_allowed_origins.len(), 2);
        assert_eq!(config.company.name, "Usinagem Exemplo");
    }

    #[test]
    fn missing_required_value_is_an_error() {
        let err = AppConfig::from_lookup(lookup(&REQUIRED[..2])).unwrap_err();
        assert!(err.to_string().contains("STORAGE_SIGNING_SECRET"));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("PHOTO_URL_TTL_MINUTES", "uma hora"));
        assert!(AppConfig::from_lookup(lookup(&pairs)).is_err());
    }
}
