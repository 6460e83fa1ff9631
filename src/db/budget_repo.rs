// src/db/budget_repo.rs

use rust_decimal::Decimal;
use sqlx::{types::Json, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::budget::{Budget, BudgetLineItem},
};

const BUDGET_COLUMNS: &str = r#"
    id, quote_id, version, is_current, issued_at, line_items,
    material_cost, labor_hours, hourly_rate, labor_cost, other_costs, cost_base,
    variable_pct, fixed_pct, profit_pct,
    sale_price, quantity, total_price, degenerate,
    delivery_days, validity_days, payment_terms, warranty_days,
    notes, created_by, created_at
"#;

/// Versão pronta para gravar (o id, a versão e a data vêm do banco).
#[derive(Debug, Clone)]
pub struct NewBudget {
    pub quote_id: Uuid,
    pub line_items: Vec<BudgetLineItem>,
    pub material_cost: Decimal,
    pub labor_hours: Decimal,
    pub hourly_rate: Decimal,
    pub labor_cost: Decimal,
    pub other_costs: Decimal,
    pub cost_base: Decimal,
    pub variable_pct: Decimal,
    pub fixed_pct: Decimal,
    pub profit_pct: Decimal,
    pub sale_price: Decimal,
    pub quantity: i32,
    pub total_price: Decimal,
    pub degenerate: bool,
    pub delivery_days: i32,
    pub validity_days: i32,
    pub payment_terms: String,
    pub warranty_days: i32,
    pub notes: Option<String>,
    pub created_by: Option<String>,
}

#[derive(Clone)]
pub struct BudgetRepository {
    pool: PgPool,
}

impl BudgetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Tira o "atual" de todas as versões da ficha (antes de inserir a nova).
    pub async fn clear_current<'e, E>(&self, executor: E, quote_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE budgets SET is_current = FALSE WHERE quote_id = $1 AND is_current")
            .bind(quote_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    /// Insere como versão max+1 e atual. Chamar dentro da mesma transação do `clear_current`.
    pub async fn insert_version<'e, E>(&self, executor: E, budget: &NewBudget) -> Result<Budget, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO budgets (
                quote_id, version, is_current, line_items,
                material_cost, labor_hours, hourly_rate, labor_cost, other_costs, cost_base,
                variable_pct, fixed_pct, profit_pct,
                sale_price, quantity, total_price, degenerate,
                delivery_days, validity_days, payment_terms, warranty_days,
                notes, created_by
            )
            VALUES (
                $1,
                (SELECT COALESCE(MAX(version), 0) + 1 FROM budgets WHERE quote_id = $1),
                TRUE, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                $16, $17, $18, $19, $20, $21
            )
            RETURNING {}
            "#,
            BUDGET_COLUMNS
        );

        let saved = sqlx::query_as::<_, Budget>(&sql)
            .bind(budget.quote_id)
            .bind(Json(&budget.line_items))
            .bind(budget.material_cost)
            .bind(budget.labor_hours)
            .bind(budget.hourly_rate)
            .bind(budget.labor_cost)
            .bind(budget.other_costs)
            .bind(budget.cost_base)
            .bind(budget.variable_pct)
            .bind(budget.fixed_pct)
            .bind(budget.profit_pct)
            .bind(budget.sale_price)
            .bind(budget.quantity)
            .bind(budget.total_price)
            .bind(budget.degenerate)
            .bind(budget.delivery_days)
            .bind(budget.validity_days)
            .bind(&budget.payment_terms)
            .bind(budget.warranty_days)
            .bind(&budget.notes)
            .bind(&budget.created_by)
            .fetch_one(executor)
            .await?;

        Ok(saved)
    }

    // Leitura simples: vai direto na pool principal.
    pub async fn list_versions(&self, quote_id: Uuid) -> Result<Vec<Budget>, AppError> {
        let sql = format!(
            "SELECT {} FROM budgets WHERE quote_id = $1 ORDER BY version DESC",
            BUDGET_COLUMNS
        );
        let budgets = sqlx::query_as::<_, Budget>(&sql)
            .bind(quote_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(budgets)
    }

    pub async fn find_budget<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Budget>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {} FROM budgets WHERE id = $1", BUDGET_COLUMNS);
        let budget = sqlx::query_as::<_, Budget>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(budget)
    }

    pub async fn find_current<'e, E>(&self, executor: E, quote_id: Uuid) -> Result<Option<Budget>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            "SELECT {} FROM budgets WHERE quote_id = $1 AND is_current",
            BUDGET_COLUMNS
        );
        let budget = sqlx::query_as::<_, Budget>(&sql)
            .bind(quote_id)
            .fetch_optional(executor)
            .await?;
        Ok(budget)
    }

    /// Marca como emitido (só na primeira vez; reenviar não muda a data).
    pub async fn mark_issued<'e, E>(&self, executor: E, id: Uuid) -> Result<Budget, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE budgets SET issued_at = COALESCE(issued_at, NOW())
            WHERE id = $1
            RETURNING {}
            "#,
            BUDGET_COLUMNS
        );
        let budget = sqlx::query_as::<_, Budget>(&sql)
            .bind(id)
            .fetch_one(executor)
            .await?;
        Ok(budget)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::assert_columns_match,
        services::document::{sample_budget, sample_quote},
    };

    #[test]
    fn column_list_matches_budget_row() {
        assert_columns_match(BUDGET_COLUMNS, &sample_budget(&sample_quote(), "25"));
    }
}
