// src/services/tracking_service.rs

use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{QuoteRepository, TrackingRepository},
    models::{
        tracking::{CreateProductionOrderPayload, CreateRequisitionPayload, ProductionOrder, PurchaseRequisition},
        workflow::{ProductionStage, PurchaseStage},
    },
    services::workflow::{check_production_transition, check_purchase_transition},
};

#[derive(Clone)]
pub struct TrackingService {
    repo: TrackingRepository,
    quote_repo: QuoteRepository,
}

impl TrackingService {
    pub fn new(repo: TrackingRepository, quote_repo: QuoteRepository) -> Self {
        Self { repo, quote_repo }
    }

    async fn ensure_quote(&self, conn: &mut sqlx::PgConnection, quote_id: Uuid) -> Result<(), AppError> {
        if self.quote_repo.find_quote(&mut *conn, quote_id).await?.is_none() {
            return Err(AppError::ResourceNotFound(format!("ficha {}", quote_id)));
        }
        Ok(())
    }

    // =========================================================================
    //  COMPRAS
    // =========================================================================

    pub async fn create_requisition<'e, E>(
        &self,
        executor: E,
        quote_id: Uuid,
        payload: &CreateRequisitionPayload,
    ) -> Result<PurchaseRequisition, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;
        self.ensure_quote(&mut *conn, quote_id).await?;
        let requisition = self.repo.create_requisition(&mut *conn, quote_id, payload).await?;
        tracing::info!("🛒 Requisição de compra criada para a ficha {}", quote_id);
        Ok(requisition)
    }

    pub async fn list_requisitions(&self, quote_id: Uuid) -> Result<Vec<PurchaseRequisition>, AppError> {
        self.repo.list_requisitions(quote_id).await
    }

    pub async fn transition_requisition<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        target: PurchaseStage,
    ) -> Result<PurchaseRequisition, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;
        let current = self
            .repo
            .find_requisition(&mut *conn, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("requisição {}", id)))?;

        check_purchase_transition(current.stage, target)?;

        // Outro operador pode ter mexido no meio do caminho.
        let updated = self
            .repo
            .set_requisition_stage(&mut *conn, id, current.stage, target)
            .await?
            .ok_or_else(|| AppError::InvalidTransition {
                from: current.stage.label().to_string(),
                to: target.label().to_string(),
            })?;

        tracing::info!("🛒 Requisição {}: {} -> {}", id, current.stage.label(), target.label());
        Ok(updated)
    }

    // =========================================================================
    //  PRODUÇÃO
    // =========================================================================

    pub async fn create_production_order<'e, E>(
        &self,
        executor: E,
        quote_id: Uuid,
        payload: &CreateProductionOrderPayload,
    ) -> Result<ProductionOrder, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;
        self.ensure_quote(&mut *conn, quote_id).await?;
        let order = self.repo.create_production_order(&mut *conn, quote_id, payload).await?;
        tracing::info!("🏭 Ordem de produção criada para a ficha {}", quote_id);
        Ok(order)
    }

    pub async fn list_production_orders(&self, quote_id: Uuid) -> Result<Vec<ProductionOrder>, AppError> {
        self.repo.list_production_orders(quote_id).await
    }

    pub async fn transition_production_order<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        target: ProductionStage,
    ) -> Result<ProductionOrder, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;
        let current = self
            .repo
            .find_production_order(&mut *conn, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("ordem de produção {}", id)))?;

        check_production_transition(current.stage, target)?;

        let updated = self
            .repo
            .set_production_stage(&mut *conn, id, current.stage, target)
            .await?
            .ok_or_else(|| AppError::InvalidTransition {
                from: current.stage.label().to_string(),
                to: target.label().to_string(),
            })?;

        tracing::info!("🏭 Ordem {}: {} -> {}", id, current.stage.label(), target.label());
        Ok(updated)
    }
}
