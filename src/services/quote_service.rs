// src/services/quote_service.rs

use chrono::{Datelike, Utc};
use sqlx::{Acquire, Executor, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::QuoteRepository,
    models::{
        quote::{
            AddPhotoPayload, MaterialLine, MaterialLinePayload, Photo, Quote, QuoteDetail,
            QuotePayload, StageEvent,
        },
        workflow::{QuoteStage, StageEventKind},
    },
    services::{
        totals::compute_totals,
        workflow::{plan_advance, plan_budget_send, plan_reversal},
    },
};

/// Número da FTC: ano com quatro dígitos, hífen, sequencial do ano com quatro dígitos.
pub fn format_ftc_number(year: i32, seq: i32) -> String {
    format!("{}-{:04}", year, seq)
}

/// Monta um payload a partir de uma ficha gravada (base para duplicar).
fn payload_from(quote: &Quote, materials: &[MaterialLine]) -> QuotePayload {
    QuotePayload {
        client_id: quote.client_id,
        client_name: quote.client_name.clone(),
        client_document: quote.client_document.clone(),
        contact_name: quote.contact_name.clone(),
        contact_email: quote.contact_email.clone(),
        contact_phone: quote.contact_phone.clone(),
        part_description: quote.part_description.clone(),
        part_code: quote.part_code.clone(),
        drawing_number: quote.drawing_number.clone(),
        material_spec: quote.material_spec.clone(),
        quantity: quote.quantity,
        sampling: quote.sampling.clone(),
        execution: quote.execution.clone(),
        treatments: quote.treatments.clone(),
        special_services: quote.special_services.clone(),
        labor_hours: quote.labor_hours.clone(),
        notes: quote.notes.clone(),
        client_request_number: quote.client_request_number.clone(),
        internal_order_number: quote.internal_order_number.clone(),
        materials: materials
            .iter()
            .map(|m| MaterialLinePayload {
                description: m.description.clone(),
                quantity: m.quantity.clone(),
                unit: m.unit.clone(),
                unit_price: m.unit_price.clone(),
            })
            .collect(),
        created_by: quote.created_by.clone(),
    }
}

#[derive(Clone)]
pub struct QuoteService {
    repo: QuoteRepository,
}

impl QuoteService {
    pub fn new(repo: QuoteRepository) -> Self {
        Self { repo }
    }

    // =========================================================================
    //  CRUD
    // =========================================================================

    pub async fn create_quote<'e, E>(&self, executor: E, payload: &QuotePayload) -> Result<QuoteDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let totals = compute_totals(&payload.materials, &payload.labor_hours, payload.quantity);

        let mut tx = executor.begin().await?;

        let year = Utc::now().year();
        let seq = self.repo.next_number_seq(&mut *tx, year).await?;
        let number = format_ftc_number(year, seq);

        let quote = self.repo.insert_quote(&mut *tx, &number, payload, &totals).await?;
        let materials = self
            .repo
            .replace_materials(&mut *tx, quote.id, &payload.materials)
            .await?;

        tx.commit().await?;

        tracing::info!("📝 Ficha {} criada ({})", quote.number, quote.id);
        Ok(QuoteDetail {
            quote,
            materials,
            photos: Vec::new(),
            totals,
        })
    }

    /// Grava a ficha inteira de novo: campos, materiais e totais.
    pub async fn update_quote<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &QuotePayload,
    ) -> Result<QuoteDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let totals = compute_totals(&payload.materials, &payload.labor_hours, payload.quantity);

        let mut tx = executor.begin().await?;

        let quote = self
            .repo
            .update_quote(&mut *tx, id, payload, &totals)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("ficha {}", id)))?;
        let materials = self.repo.replace_materials(&mut *tx, id, &payload.materials).await?;
        let photos = self.repo.list_photos(&mut *tx, id).await?;

        tx.commit().await?;

        tracing::info!("💾 Ficha {} salva (revisão {})", quote.number, quote.revision);
        Ok(QuoteDetail {
            quote,
            materials,
            photos,
            totals,
        })
    }

    pub async fn get_quote<'e, E>(&self, executor: E, id: Uuid) -> Result<QuoteDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;

        let quote = self
            .repo
            .find_quote(&mut *conn, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("ficha {}", id)))?;
        let materials = self.repo.list_materials(&mut *conn, id).await?;
        let photos = self.repo.list_photos(&mut *conn, id).await?;
        let totals = compute_totals(&materials, &quote.labor_hours, quote.quantity);

        Ok(QuoteDetail {
            quote,
            materials,
            photos,
            totals,
        })
    }

    pub async fn list_quotes<'e, E>(&self, executor: E, stage: Option<QuoteStage>) -> Result<Vec<Quote>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_quotes(executor, stage).await
    }

    /// Nova ficha com os mesmos campos e materiais. Fotos não são copiadas;
    /// a cópia nasce como rascunho e ganha número próprio.
    pub async fn clone_quote<'e, E>(&self, executor: E, id: Uuid) -> Result<QuoteDetail, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let source = self
            .repo
            .find_quote(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("ficha {}", id)))?;
        let source_materials = self.repo.list_materials(&mut *tx, id).await?;
        let payload = payload_from(&source, &source_materials);

        let detail = self.create_quote(&mut *tx, &payload).await?;
        tx.commit().await?;

        tracing::info!("📑 Ficha {} duplicada como {}", source.number, detail.quote.number);
        Ok(detail)
    }

    pub async fn delete_quote<'e, E>(&self, executor: E, id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.delete_quote(executor, id).await? {
            return Err(AppError::ResourceNotFound(format!("ficha {}", id)));
        }
        tracing::info!("🗑️ Ficha {} excluída", id);
        Ok(())
    }

    // =========================================================================
    //  ETAPAS
    // =========================================================================

    pub async fn advance_stage<'e, E>(&self, executor: E, id: Uuid, actor: Option<&str>) -> Result<Quote, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        self.move_stage(executor, id, StageEventKind::Advance, None, actor).await
    }

    /// Volta uma etapa. Não confere nada rio abaixo (compras, produção).
    pub async fn revert_stage<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        justification: &str,
        actor: Option<&str>,
    ) -> Result<Quote, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        self.move_stage(executor, id, StageEventKind::Revert, Some(justification), actor)
            .await
    }

    /// Envio do orçamento: sai de "Aguardando Orçamento Comercial" para
    /// "Orçamento Enviado ao Cliente". Reenvio em outra etapa não move nada.
    pub async fn mark_budget_sent<'e, E>(&self, executor: E, id: Uuid, actor: Option<&str>) -> Result<Quote, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let quote = self
            .repo
            .find_quote_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("ficha {}", id)))?;

        let target = plan_budget_send(quote.stage);
        if target == quote.stage {
            tx.commit().await?;
            return Ok(quote);
        }

        self.repo.set_stage(&mut *tx, id, target).await?;
        self.repo
            .insert_stage_event(&mut *tx, id, StageEventKind::Send, quote.stage, target, None, actor, Utc::now())
            .await?;
        let updated = self
            .repo
            .find_quote(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("ficha {}", id)))?;

        tx.commit().await?;

        tracing::info!("📨 Ficha {}: {} -> {}", updated.number, quote.stage, target);
        Ok(updated)
    }

    async fn move_stage<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        kind: StageEventKind,
        justification: Option<&str>,
        actor: Option<&str>,
    ) -> Result<Quote, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        let quote = self
            .repo
            .find_quote_for_update(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("ficha {}", id)))?;

        let target = match kind {
            StageEventKind::Revert => plan_reversal(quote.stage, justification.unwrap_or_default())?,
            _ => plan_advance(quote.stage)?,
        };

        self.repo.set_stage(&mut *tx, id, target).await?;
        self.repo
            .insert_stage_event(
                &mut *tx,
                id,
                kind,
                quote.stage,
                target,
                justification.map(str::trim),
                actor,
                Utc::now(),
            )
            .await?;
        let updated = self
            .repo
            .find_quote(&mut *tx, id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("ficha {}", id)))?;

        tx.commit().await?;

        match kind {
            StageEventKind::Revert => tracing::info!(
                "↩️ Ficha {} revertida: {} -> {}",
                updated.number,
                quote.stage,
                target
            ),
            _ => tracing::info!("➡️ Ficha {} avançou: {} -> {}", updated.number, quote.stage, target),
        }
        Ok(updated)
    }

    pub async fn stage_history(&self, id: Uuid) -> Result<Vec<StageEvent>, AppError> {
        self.repo.list_stage_events(id).await
    }

    // =========================================================================
    //  FOTOS
    // =========================================================================

    pub async fn add_photo<'e, E>(&self, executor: E, quote_id: Uuid, payload: &AddPhotoPayload) -> Result<Photo, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut conn = executor.acquire().await?;
        if self.repo.find_quote(&mut *conn, quote_id).await?.is_none() {
            return Err(AppError::ResourceNotFound(format!("ficha {}", quote_id)));
        }
        let photo = self.repo.add_photo(&mut *conn, quote_id, payload).await?;
        tracing::info!("📷 Foto '{}' anexada à ficha {}", photo.name, quote_id);
        Ok(photo)
    }

    pub async fn list_photos<'e, E>(&self, executor: E, quote_id: Uuid) -> Result<Vec<Photo>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        self.repo.list_photos(executor, quote_id).await
    }

    pub async fn remove_photo<'e, E>(&self, executor: E, quote_id: Uuid, photo_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if !self.repo.remove_photo(executor, quote_id, photo_id).await? {
            return Err(AppError::ResourceNotFound(format!("foto {}", photo_id)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use serde_json::json;

    #[test]
    fn ftc_number_is_zero_padded() {
        assert_eq!(format_ftc_number(2026, 42), "2026-0042");
        assert_eq!(format_ftc_number(2026, 1), "2026-0001");
        assert_eq!(format_ftc_number(2027, 12345), "2027-12345");
    }

    #[test]
    fn clone_payload_keeps_fields_and_materials() {
        let now = Utc::now();
        let quote = Quote {
            id: Uuid::new_v4(),
            number: "2026-0007".to_string(),
            stage: QuoteStage::BudgetSentToClient,
            revision: 4,
            client_id: None,
            client_name: "Metalúrgica Exemplo".to_string(),
            client_document: None,
            contact_name: Some("Maria".to_string()),
            contact_email: None,
            contact_phone: None,
            part_description: "Eixo".to_string(),
            part_code: Some("EX-10".to_string()),
            drawing_number: None,
            material_spec: None,
            quantity: 3,
            sampling: json!({}),
            execution: json!({ "desenho": true }),
            treatments: json!({}),
            special_services: json!({}),
            labor_hours: json!({ "torno_grande": 2 }),
            notes: Some("urgente".to_string()),
            client_request_number: None,
            internal_order_number: None,
            hours_per_unit: Decimal::TWO,
            hours_total: Decimal::from(6),
            material_cost_per_unit: Decimal::ZERO,
            material_cost_total: Decimal::ZERO,
            created_by: None,
            created_at: now,
            updated_at: now,
        };
        let materials = vec![MaterialLine {
            id: Uuid::new_v4(),
            quote_id: quote.id,
            position: 0,
            description: "Barra".to_string(),
            quantity: "3 kg".to_string(),
            unit: Some("kg".to_string()),
            unit_price: "abc".to_string(),
            created_at: now,
        }];

        let payload = payload_from(&quote, &materials);

        assert_eq!(payload.part_code.as_deref(), Some("EX-10"));
        assert_eq!(payload.quantity, 3);
        assert_eq!(payload.labor_hours, json!({ "torno_grande": 2 }));
        assert_eq!(payload.materials.len(), 1);
        // Texto cru preservado na cópia.
        assert_eq!(payload.materials[0].quantity, "3 kg");
        assert_eq!(payload.materials[0].unit_price, "abc");
    }
}
