// src/db/tracking_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        tracking::{CreateProductionOrderPayload, CreateRequisitionPayload, ProductionOrder, PurchaseRequisition},
        workflow::{ProductionStage, PurchaseStage},
    },
};

#[derive(Clone)]
pub struct TrackingRepository {
    pool: PgPool,
}

impl TrackingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  REQUISIÇÕES DE COMPRA
    // =========================================================================

    pub async fn create_requisition<'e, E>(
        &self,
        executor: E,
        quote_id: Uuid,
        payload: &CreateRequisitionPayload,
    ) -> Result<PurchaseRequisition, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let requisition = sqlx::query_as::<_, PurchaseRequisition>(
            r#"
            INSERT INTO purchase_requisitions (quote_id, description, supplier, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING id, quote_id, description, supplier, stage, notes, created_at, updated_at
            "#,
        )
        .bind(quote_id)
        .bind(&payload.description)
        .bind(&payload.supplier)
        .bind(&payload.notes)
        .fetch_one(executor)
        .await?;
        Ok(requisition)
    }

    // Leitura simples: vai direto na pool principal.
    pub async fn list_requisitions(&self, quote_id: Uuid) -> Result<Vec<PurchaseRequisition>, AppError> {
        let requisitions = sqlx::query_as::<_, PurchaseRequisition>(
            r#"
            SELECT id, quote_id, description, supplier, stage, notes, created_at, updated_at
            FROM purchase_requisitions
            WHERE quote_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(quote_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(requisitions)
    }

    pub async fn find_requisition<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<PurchaseRequisition>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let requisition = sqlx::query_as::<_, PurchaseRequisition>(
            r#"
            SELECT id, quote_id, description, supplier, stage, notes, created_at, updated_at
            FROM purchase_requisitions
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(requisition)
    }

    /// Grava a nova etapa só se a atual ainda for `from` (sem corrida entre operadores).
    pub async fn set_requisition_stage<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        from: PurchaseStage,
        to: PurchaseStage,
    ) -> Result<Option<PurchaseRequisition>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let requisition = sqlx::query_as::<_, PurchaseRequisition>(
            r#"
            UPDATE purchase_requisitions SET stage = $3, updated_at = NOW()
            WHERE id = $1 AND stage = $2
            RETURNING id, quote_id, description, supplier, stage, notes, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(executor)
        .await?;
        Ok(requisition)
    }

    // =========================================================================
    //  ORDENS DE PRODUÇÃO
    // =========================================================================

    pub async fn create_production_order<'e, E>(
        &self,
        executor: E,
        quote_id: Uuid,
        payload: &CreateProductionOrderPayload,
    ) -> Result<ProductionOrder, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, ProductionOrder>(
            r#"
            INSERT INTO production_orders (quote_id, order_number, notes)
            VALUES ($1, $2, $3)
            RETURNING id, quote_id, order_number, stage, notes, created_at, updated_at
            "#,
        )
        .bind(quote_id)
        .bind(&payload.order_number)
        .bind(&payload.notes)
        .fetch_one(executor)
        .await?;
        Ok(order)
    }

    // Leitura simples: vai direto na pool principal.
    pub async fn list_production_orders(&self, quote_id: Uuid) -> Result<Vec<ProductionOrder>, AppError> {
        let orders = sqlx::query_as::<_, ProductionOrder>(
            r#"
            SELECT id, quote_id, order_number, stage, notes, created_at, updated_at
            FROM production_orders
            WHERE quote_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(quote_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(orders)
    }

    pub async fn find_production_order<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<ProductionOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, ProductionOrder>(
            r#"
            SELECT id, quote_id, order_number, stage, notes, created_at, updated_at
            FROM production_orders
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;
        Ok(order)
    }

    pub async fn set_production_stage<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        from: ProductionStage,
        to: ProductionStage,
    ) -> Result<Option<ProductionOrder>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let order = sqlx::query_as::<_, ProductionOrder>(
            r#"
            UPDATE production_orders SET stage = $3, updated_at = NOW()
            WHERE id = $1 AND stage = $2
            RETURNING id, quote_id, order_number, stage, notes, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(executor)
        .await?;
        Ok(order)
    }
}
