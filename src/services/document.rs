// src/services/document.rs

//! Geração do documento HTML da ficha / orçamento.
//!
//! O resultado é um arquivo único e autossuficiente (CSS e scripts embutidos),
//! que abre direto do disco ou servido pelo armazenamento. A variante
//! `Approval` carrega o mini-formulário de resposta do cliente, que fala com
//! o backend pelo endereço e chave recebidos em [`BackendEndpoint`].

pub mod escape;
pub mod format;
mod render;

use serde::Deserialize;
use utoipa::ToSchema;

use crate::models::{
    budget::Budget,
    quote::{MaterialLine, Quote},
    settings::CompanyProfile,
};

pub use render::render_document;

#[cfg(test)]
pub(crate) use render::tests::{sample_budget, sample_quote};

/// Tempo até o formulário de aprovação se fechar depois de enviado.
pub const APPROVAL_CLOSE_DELAY_MS: u32 = 4000;

/// Endereço e chave pública que o script do documento usa para chamar o backend.
#[derive(Debug, Clone)]
pub struct BackendEndpoint {
    pub base_url: String,
    pub public_key: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DocumentVariant {
    /// Uso interno: mostra a composição de custos do orçamento.
    Internal,
    /// Cópia do cliente, sem custos internos.
    #[default]
    Client,
    /// Cópia do cliente com o formulário de aprovação embutido.
    Approval,
}

impl DocumentVariant {
    pub fn shows_cost_breakdown(&self) -> bool {
        matches!(self, DocumentVariant::Internal)
    }
}

/// Foto já com URL acessível (assinada, temporária).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPhoto {
    pub name: String,
    pub url: String,
}

pub struct DocumentInput<'a> {
    pub quote: &'a Quote,
    pub materials: &'a [MaterialLine],
    pub photos: &'a [ResolvedPhoto],
    pub budget: Option<&'a Budget>,
    pub company: &'a CompanyProfile,
    pub variant: DocumentVariant,
    pub endpoint: &'a BackendEndpoint,
}
