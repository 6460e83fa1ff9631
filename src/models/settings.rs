// src/models/settings.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Dados da oficina impressos no cabeçalho dos documentos.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    #[schema(example = "Usinagem Polacchini Ltda")]
    pub name: String,

    #[schema(example = "12.345.678/0001-99")]
    pub document_number: Option<String>,

    #[schema(example = "Rua das Flores, 123 - Distrito Industrial")]
    pub address: Option<String>,

    #[schema(example = "(11) 99999-8888")]
    pub phone: Option<String>,

    #[schema(example = "comercial@usinagem.com.br")]
    pub email: Option<String>,
}
