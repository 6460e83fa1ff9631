// src/services/budget_service.rs

use rust_decimal::Decimal;
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{budget_repo::NewBudget, BudgetRepository, QuoteRepository},
    models::{
        budget::{Budget, BudgetLineItem, CreateBudgetPayload},
        quote::{MaterialLine, Quote},
    },
    services::{
        pricing::{compute_price, PricingInput},
        totals::compute_totals,
    },
};

/// Monta a nova versão a partir da ficha e dos materiais gravados.
///
/// A base de custo é por peça (materiais de uma unidade + horas de uma
/// unidade); o preço de venda também é por peça. A linha principal do
/// orçamento multiplica pela quantidade da ficha e os itens extras entram
/// como linhas próprias.
pub fn build_budget(
    quote: &Quote,
    materials: &[MaterialLine],
    payload: &CreateBudgetPayload,
    default_hourly_rate: Option<Decimal>,
) -> Result<NewBudget, AppError> {
    let hourly_rate = payload
        .hourly_rate
        .or(default_hourly_rate)
        .ok_or(AppError::MissingHourlyRate)?;

    let totals = compute_totals(materials, &quote.labor_hours, quote.quantity);
    let priced = compute_price(&PricingInput {
        material_cost: totals.material_cost_per_unit,
        labor_hours: totals.hours_per_unit,
        hourly_rate,
        other_costs: payload.other_costs,
        variable_pct: payload.variable_pct,
        fixed_pct: payload.fixed_pct,
        profit_pct: payload.profit_pct,
    });

    let quantity = Decimal::from(quote.quantity);
    let mut line_items = vec![BudgetLineItem {
        description: quote.part_description.clone(),
        quantity,
        unit_price: priced.sale_price,
        total: priced.sale_price.saturating_mul(quantity),
    }];
    line_items.extend(payload.extra_items.iter().map(|item| BudgetLineItem {
        description: item.description.trim().to_string(),
        quantity: item.quantity,
        unit_price: item.unit_price,
        total: item.quantity.saturating_mul(item.unit_price),
    }));

    let total_price = line_items
        .iter()
        .fold(Decimal::ZERO, |acc, item| acc.saturating_add(item.total));

    Ok(NewBudget {
        quote_id: quote.id,
        line_items,
        material_cost: totals.material_cost_per_unit,
        labor_hours: totals.hours_per_unit,
        hourly_rate,
        labor_cost: priced.labor_cost,
        other_costs: payload.other_costs,
        cost_base: priced.cost_base,
        variable_pct: payload.variable_pct,
        fixed_pct: payload.fixed_pct,
        profit_pct: payload.profit_pct,
        sale_price: priced.sale_price,
        quantity: quote.quantity,
        total_price,
        degenerate: priced.degenerate,
        delivery_days: payload.delivery_days,
        validity_days: payload.validity_days,
        payment_terms: payload.payment_terms.trim().to_string(),
        warranty_days: payload.warranty_days,
        notes: payload.notes.clone().filter(|n| !n.trim().is_empty()),
        created_by: payload.created_by.clone(),
    })
}

#[derive(Clone)]
pub struct BudgetService {
    repo: BudgetRepository,
    quote_repo: QuoteRepository,
    default_hourly_rate: Option<Decimal>,
}

impl BudgetService {
    pub fn new(repo: BudgetRepository, quote_repo: QuoteRepository, default_hourly_rate: Option<Decimal>) -> Self {
        Self {
            repo,
            quote_repo,
            default_hourly_rate,
        }
    }

    /// Nova versão (max + 1). As anteriores deixam de ser a atual.
    /// A etapa da ficha não muda aqui.
    pub async fn create_version<'e, E>(
        &self,
        executor: E,
        quote_id: Uuid,
        payload: &CreateBudgetPayload,
    ) -> Result<Budget, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        // A trava na ficha serializa duas criações simultâneas.
        let quote = self
            .quote_repo
            .find_quote_for_update(&mut *tx, quote_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("ficha {}", quote_id)))?;
        let materials = self.quote_repo.list_materials(&mut *tx, quote_id).await?;

        let new_budget = build_budget(&quote, &materials, payload, self.default_hourly_rate)?;

        self.repo.clear_current(&mut *tx, quote_id).await?;
        let budget = self.repo.insert_version(&mut *tx, &new_budget).await?;

        tx.commit().await?;

        if budget.degenerate {
            tracing::warn!(
                "⚠️ Orçamento v{} da ficha {}: percentuais somam 100% ou mais, preço = base de custo",
                budget.version,
                quote.number
            );
        }
        tracing::info!(
            "💰 Orçamento v{} criado para a ficha {} (total {})",
            budget.version,
            quote.number,
            budget.total_price
        );
        Ok(budget)
    }

    pub async fn list_versions(&self, quote_id: Uuid) -> Result<Vec<Budget>, AppError> {
        self.repo.list_versions(quote_id).await
    }

    pub async fn get_budget<'e, E>(&self, executor: E, id: Uuid) -> Result<Budget, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_budget(executor, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("orçamento {}", id)))
    }

    pub async fn get_current<'e, E>(&self, executor: E, quote_id: Uuid) -> Result<Budget, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo
            .find_current(executor, quote_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("orçamento atual da ficha {}", quote_id)))
    }

    pub async fn mark_issued<'e, E>(&self, executor: E, id: Uuid) -> Result<Budget, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.mark_issued(executor, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{budget::BudgetLineItemPayload, workflow::QuoteStage};
    use chrono::Utc;
    use serde_json::json;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn quote(quantity: i32) -> Quote {
        let now = Utc::now();
        Quote {
            id: Uuid::new_v4(),
            number: "2026-0042".to_string(),
            stage: QuoteStage::AwaitingCommercialBudget,
            revision: 2,
            client_id: None,
            client_name: "Metalúrgica Exemplo".to_string(),
            client_document: None,
            contact_name: None,
            contact_email: None,
            contact_phone: None,
            part_description: "Eixo de transmissão".to_string(),
            part_code: None,
            drawing_number: None,
            material_spec: None,
            quantity,
            sampling: json!({}),
            execution: json!({}),
            treatments: json!({}),
            special_services: json!({}),
            labor_hours: json!({ "torno_grande": 5 }),
            notes: None,
            client_request_number: None,
            internal_order_number: None,
            hours_per_unit: Decimal::ZERO,
            hours_total: Decimal::ZERO,
            material_cost_per_unit: Decimal::ZERO,
            material_cost_total: Decimal::ZERO,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn materials(quote_id: Uuid) -> Vec<MaterialLine> {
        vec![MaterialLine {
            id: Uuid::new_v4(),
            quote_id,
            position: 0,
            description: "Barra SAE 1045".to_string(),
            quantity: "3".to_string(),
            unit: Some("kg".to_string()),
            unit_price: "10.00".to_string(),
            created_at: Utc::now(),
        }]
    }

    fn payload(variable: &str, hourly_rate: Option<&str>) -> CreateBudgetPayload {
        CreateBudgetPayload {
            hourly_rate: hourly_rate.map(dec),
            other_costs: Decimal::ZERO,
            variable_pct: dec(variable),
            fixed_pct: dec("10"),
            profit_pct: dec("30"),
            extra_items: Vec::new(),
            delivery_days: 30,
            validity_days: 15,
            payment_terms: " 28 dias ".to_string(),
            warranty_days: 90,
            notes: Some("   ".to_string()),
            created_by: None,
        }
    }

    #[test]
    fn prices_per_unit_and_multiplies_by_quantity() {
        let q = quote(2);
        let budget = build_budget(&q, &materials(q.id), &payload("25", Some("50")), None).unwrap();

        // base = 30 + 5h × 50 = 280; fator = 0,35 -> 800 por peça
        assert_eq!(budget.cost_base, dec("280.00"));
        assert_eq!(budget.sale_price, dec("800"));
        assert_eq!(budget.line_items.len(), 1);
        assert_eq!(budget.line_items[0].quantity, dec("2"));
        assert_eq!(budget.total_price, dec("1600"));
        assert!(!budget.degenerate);
        assert_eq!(budget.payment_terms, "28 dias");
        assert_eq!(budget.notes, None);
    }

    #[test]
    fn extra_items_add_to_the_total() {
        let q = quote(1);
        let mut p = payload("25", Some("50"));
        p.extra_items.push(BudgetLineItemPayload {
            description: "Frete".to_string(),
            quantity: dec("1"),
            unit_price: dec("120.50"),
        });
        let budget = build_budget(&q, &materials(q.id), &p, None).unwrap();

        assert_eq!(budget.line_items.len(), 2);
        assert_eq!(budget.total_price, dec("920.50"));
    }

    #[test]
    fn degenerate_markup_falls_back_to_cost_base() {
        let q = quote(1);
        let budget = build_budget(&q, &materials(q.id), &payload("60", Some("50")), None).unwrap();

        assert!(budget.degenerate);
        assert_eq!(budget.sale_price, budget.cost_base);
    }

    #[test]
    fn hourly_rate_falls_back_to_configured_default() {
        let q = quote(1);
        let budget = build_budget(&q, &materials(q.id), &payload("25", None), Some(dec("40"))).unwrap();
        assert_eq!(budget.hourly_rate, dec("40"));
        assert_eq!(budget.labor_cost, dec("200"));

        let missing = build_budget(&q, &materials(q.id), &payload("25", None), None);
        assert!(matches!(missing, Err(AppError::MissingHourlyRate)));
    }
}
