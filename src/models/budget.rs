// src/models/budget.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

// --- O Orçamento (sempre uma versão; nunca editado depois de emitido) ---

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BudgetLineItem {
    #[schema(example = "Eixo de transmissão 1045")]
    pub description: String,
    #[schema(example = "2")]
    pub quantity: Decimal,
    #[schema(example = "800.00")]
    pub unit_price: Decimal,
    #[schema(example = "1600.00")]
    pub total: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: Uuid,
    pub quote_id: Uuid,
    #[schema(example = 1)]
    pub version: i32,
    pub is_current: bool,
    pub issued_at: Option<DateTime<Utc>>,

    #[schema(value_type = Vec<BudgetLineItem>)]
    pub line_items: Json<Vec<BudgetLineItem>>,

    // Base de custo (interna; não aparece no documento do cliente)
    #[schema(example = "30.00")]
    pub material_cost: Decimal,
    #[schema(example = "5")]
    pub labor_hours: Decimal,
    #[schema(example = "50.00")]
    pub hourly_rate: Decimal,
    #[schema(example = "250.00")]
    pub labor_cost: Decimal,
    #[schema(example = "0.00")]
    pub other_costs: Decimal,
    #[schema(example = "280.00")]
    pub cost_base: Decimal,

    // Os três botões do markup
    #[schema(example = "25")]
    pub variable_pct: Decimal,
    #[schema(example = "10")]
    pub fixed_pct: Decimal,
    #[schema(example = "30")]
    pub profit_pct: Decimal,

    #[schema(example = "800.00")]
    pub sale_price: Decimal,
    #[schema(example = 2)]
    pub quantity: i32,
    #[schema(example = "1600.00")]
    pub total_price: Decimal,
    // Percentuais somando >= 100: preço = base de custo, e a UI deve avisar.
    pub degenerate: bool,

    // Condições comerciais
    #[schema(example = 30)]
    pub delivery_days: i32,
    #[schema(example = 15)]
    pub validity_days: i32,
    #[schema(example = "28 dias após faturamento")]
    pub payment_terms: String,
    #[schema(example = 90)]
    pub warranty_days: i32,

    pub notes: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

// --- Payloads ---

pub(crate) fn validate_percentage(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() || *val > Decimal::ONE_HUNDRED {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0);
        err.add_param("max".into(), &100);
        err.message = Some("O percentual deve estar entre 0 e 100.".into());
        return Err(err);
    }
    Ok(())
}

pub(crate) fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BudgetLineItemPayload {
    #[validate(length(min = 1, message = "required"))]
    pub description: String,
    #[validate(custom(function = "validate_not_negative"))]
    pub quantity: Decimal,
    #[validate(custom(function = "validate_not_negative"))]
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBudgetPayload {
    // Se ausente, usa DEFAULT_HOURLY_RATE da configuração.
    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = "50.00")]
    pub hourly_rate: Option<Decimal>,

    #[serde(default)]
    #[validate(custom(function = "validate_not_negative"))]
    pub other_costs: Decimal,

    #[validate(custom(function = "validate_percentage"))]
    #[schema(example = "25")]
    pub variable_pct: Decimal,
    #[validate(custom(function = "validate_percentage"))]
    #[schema(example = "10")]
    pub fixed_pct: Decimal,
    #[validate(custom(function = "validate_percentage"))]
    #[schema(example = "30")]
    pub profit_pct: Decimal,

    #[serde(default)]
    #[validate(nested)]
    pub extra_items: Vec<BudgetLineItemPayload>,

    #[validate(range(min = 0, message = "must_not_be_negative"))]
    pub delivery_days: i32,
    #[validate(range(min = 0, message = "must_not_be_negative"))]
    pub validity_days: i32,
    #[validate(length(min = 1, message = "required"))]
    pub payment_terms: String,
    #[serde(default)]
    #[validate(range(min = 0, message = "must_not_be_negative"))]
    pub warranty_days: i32,

    pub notes: Option<String>,
    pub created_by: Option<String>,
}
