// src/services/storage.rs

use std::{
    path::{Component, Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::quote::Photo,
    services::document::ResolvedPhoto,
};

/// Validade dos links de documentos enviados (a mesma dos tokens de aprovação).
pub const DOCUMENT_URL_TTL_DAYS: i64 = 30;

// =============================================================================
//  COLABORADOR: ARMAZENAMENTO DE OBJETOS
// =============================================================================

#[async_trait]
pub trait ObjectStorage: Send + Sync {
    async fn put(&self, key: &str, content: &[u8]) -> Result<(), AppError>;
    async fn get(&self, key: &str) -> Result<Vec<u8>, AppError>;
    async fn exists(&self, key: &str) -> Result<bool, AppError>;
}

/// Arquivos em disco, abaixo de STORAGE_DIR.
pub struct LocalObjectStorage {
    root: PathBuf,
}

impl LocalObjectStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    // Só aceita caminhos relativos simples: nada de "..", raiz ou prefixo de drive.
    fn path_for(&self, key: &str) -> Result<PathBuf, AppError> {
        let relative = Path::new(key);
        let valid = !key.is_empty()
            && relative
                .components()
                .all(|component| matches!(component, Component::Normal(_)));
        if !valid {
            return Err(AppError::StorageError(format!("chave inválida: {}", key)));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ObjectStorage for LocalObjectStorage {
    async fn put(&self, key: &str, content: &[u8]) -> Result<(), AppError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::StorageError(e.to_string()))?;
        }
        tokio::fs::write(&path, content)
            .await
            .map_err(|e| AppError::StorageError(e.to_string()))
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, AppError> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::ResourceNotFound(key.to_string()))
            }
            Err(e) => Err(AppError::StorageError(e.to_string())),
        }
    }

    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        let path = self.path_for(key)?;
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| AppError::StorageError(e.to_string()))
    }
}

// =============================================================================
//  LINKS ASSINADOS
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
struct FileClaims {
    key: String,
    exp: usize,
}

/// Assina e confere os links `/api/public/files/{key}?sig=`.
#[derive(Clone)]
pub struct UrlSigner {
    base_url: String,
    secret: String,
}

impl UrlSigner {
    pub fn new(base_url: &str, secret: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            secret,
        }
    }

    pub fn sign(&self, key: &str, ttl: Duration) -> Result<String, AppError> {
        let claims = FileClaims {
            key: key.to_string(),
            exp: (Utc::now() + ttl).timestamp().max(0) as usize,
        };
        let sig = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_ref()),
        )?;

        let encoded_key = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");

        Ok(format!("{}/api/public/files/{}?sig={}", self.base_url, encoded_key, sig))
    }

    pub fn verify(&self, key: &str, sig: &str) -> Result<(), AppError> {
        let data = decode::<FileClaims>(
            sig,
            &DecodingKey::from_secret(self.secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidFileSignature)?;

        if data.claims.key != key {
            return Err(AppError::InvalidFileSignature);
        }
        Ok(())
    }
}

// =============================================================================
//  SERVIÇO
// =============================================================================

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredDocument {
    pub key: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PhotoFailure {
    pub name: String,
    pub storage_ref: String,
    pub reason: String,
}

/// Resultado da resolução das fotos: as que deram certo (na ordem original)
/// e as que falharam, cada uma com o motivo.
#[derive(Debug, Clone, Default)]
pub struct PhotoResolutionReport {
    pub resolved: Vec<ResolvedPhoto>,
    pub failed: Vec<PhotoFailure>,
}

#[derive(Clone)]
pub struct StorageService {
    storage: Arc<dyn ObjectStorage>,
    signer: UrlSigner,
    photo_ttl: Duration,
}

impl StorageService {
    pub fn new(storage: Arc<dyn ObjectStorage>, signer: UrlSigner, photo_ttl: Duration) -> Self {
        Self { storage, signer, photo_ttl }
    }

    /// Grava o documento gerado e devolve um link válido por 30 dias.
    pub async fn upload_document(
        &self,
        suggested_name: &str,
        html: &str,
    ) -> Result<StoredDocument, AppError> {
        let key = format!(
            "documents/{}/{}",
            Uuid::new_v4(),
            sanitize_file_name(suggested_name, "documento.html")
        );
        self.storage.put(&key, html.as_bytes()).await?;
        let url = self.signer.sign(&key, self.sent_document_ttl())?;

        tracing::info!("📄 Documento armazenado em {}", key);
        Ok(StoredDocument { key, url })
    }

    /// Grava os bytes de uma foto e devolve a referência de armazenamento.
    pub async fn upload_photo(
        &self,
        quote_id: Uuid,
        name: &str,
        content: &[u8],
    ) -> Result<String, AppError> {
        let key = format!(
            "photos/{}/{}-{}",
            quote_id,
            Uuid::new_v4().simple(),
            sanitize_file_name(name, "foto.jpg")
        );
        self.storage.put(&key, content).await?;
        Ok(key)
    }

    /// Validade dos links de foto em pré-visualizações (PHOTO_URL_TTL_MINUTES).
    pub fn preview_ttl(&self) -> Duration {
        self.photo_ttl
    }

    /// Validade dos links embutidos num documento enviado: acompanha o link
    /// do próprio documento.
    pub fn sent_document_ttl(&self) -> Duration {
        Duration::days(DOCUMENT_URL_TTL_DAYS)
    }

    pub async fn photo_url(&self, storage_ref: &str, ttl: Duration) -> Result<String, AppError> {
        if !self.storage.exists(storage_ref).await? {
            return Err(AppError::StorageError(format!(
                "arquivo não encontrado: {}",
                storage_ref
            )));
        }
        self.signer.sign(storage_ref, ttl)
    }

    /// Resolve todas as fotos em paralelo, preservando a ordem original.
    pub async fn resolve_photos(&self, photos: &[Photo], ttl: Duration) -> PhotoResolutionReport {
        let futures = photos.iter().map(|photo| self.photo_url(&photo.storage_ref, ttl));
        let results = futures::future::join_all(futures).await;

        let mut report = PhotoResolutionReport::default();
        for (photo, result) in photos.iter().zip(results) {
            match result {
                Ok(url) => report.resolved.push(ResolvedPhoto {
                    name: photo.name.clone(),
                    url,
                }),
                Err(e) => {
                    tracing::warn!("⚠️ Foto '{}' não resolvida: {}", photo.name, e);
                    report.failed.push(PhotoFailure {
                        name: photo.name.clone(),
                        storage_ref: photo.storage_ref.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        report
    }

    /// Confere a assinatura e devolve o conteúdo com o content-type.
    pub async fn open_signed(
        &self,
        key: &str,
        sig: &str,
    ) -> Result<(Vec<u8>, &'static str), AppError> {
        self.signer.verify(key, sig)?;
        let bytes = self.storage.get(key).await?;
        Ok((bytes, content_type_for(key)))
    }
}

fn sanitize_file_name(name: &str, fallback: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '-'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() { fallback.to_string() } else { cleaned.to_string() }
}

pub fn content_type_for(key: &str) -> &'static str {
    let ext = key
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "html" | "htm" => "text/html; charset=utf-8",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}
