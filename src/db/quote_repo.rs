// src/db/quote_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Acquire, Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        quote::{AddPhotoPayload, MaterialLine, MaterialLinePayload, Photo, Quote, QuotePayload, StageEvent},
        workflow::{QuoteStage, StageEventKind},
    },
    services::totals::Totals,
};

const QUOTE_COLUMNS: &str = r#"
    id, number, stage, revision,
    client_id, client_name, client_document, contact_name, contact_email, contact_phone,
    part_description, part_code, drawing_number, material_spec, quantity,
    sampling, execution, treatments, special_services, labor_hours,
    notes, client_request_number, internal_order_number,
    hours_per_unit, hours_total, material_cost_per_unit, material_cost_total,
    created_by, created_at, updated_at
"#;

#[derive(Clone)]
pub struct QuoteRepository {
    pool: PgPool,
}

impl QuoteRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  NUMERAÇÃO
    // =========================================================================

    /// Próximo sequencial do ano (upsert atômico na tabela de sequências).
    pub async fn next_number_seq<'e, E>(&self, executor: E, year: i32) -> Result<i32, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let seq: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO quote_number_sequences (year, last_value)
            VALUES ($1, 1)
            ON CONFLICT (year) DO UPDATE SET last_value = quote_number_sequences.last_value + 1
            RETURNING last_value
            "#,
        )
        .bind(year)
        .fetch_one(executor)
        .await?;

        Ok(seq)
    }

    // =========================================================================
    //  FICHA (CABEÇALHO)
    // =========================================================================

    pub async fn insert_quote<'e, E>(
        &self,
        executor: E,
        number: &str,
        payload: &QuotePayload,
        totals: &Totals,
    ) -> Result<Quote, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            INSERT INTO quotes (
                number, stage, revision,
                client_id, client_name, client_document, contact_name, contact_email, contact_phone,
                part_description, part_code, drawing_number, material_spec, quantity,
                sampling, execution, treatments, special_services, labor_hours,
                notes, client_request_number, internal_order_number,
                hours_per_unit, hours_total, material_cost_per_unit, material_cost_total,
                created_by
            )
            VALUES ($1, 'draft', 1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                    $13, $14, $15, $16, $17, $18, $19, $20, $21, $22, $23, $24, $25)
            RETURNING {}
            "#,
            QUOTE_COLUMNS
        );

        let quote = sqlx::query_as::<_, Quote>(&sql)
            .bind(number)
            .bind(payload.client_id)
            .bind(&payload.client_name)
            .bind(&payload.client_document)
            .bind(&payload.contact_name)
            .bind(&payload.contact_email)
            .bind(&payload.contact_phone)
            .bind(&payload.part_description)
            .bind(&payload.part_code)
            .bind(&payload.drawing_number)
            .bind(&payload.material_spec)
            .bind(payload.quantity)
            .bind(&payload.sampling)
            .bind(&payload.execution)
            .bind(&payload.treatments)
            .bind(&payload.special_services)
            .bind(&payload.labor_hours)
            .bind(&payload.notes)
            .bind(&payload.client_request_number)
            .bind(&payload.internal_order_number)
            .bind(totals.hours_per_unit)
            .bind(totals.hours_total)
            .bind(totals.material_cost_per_unit)
            .bind(totals.material_cost_total)
            .bind(&payload.created_by)
            .fetch_one(executor)
            .await?;

        Ok(quote)
    }

    /// Regrava os campos editáveis. O número nunca muda; a revisão sobe um.
    pub async fn update_quote<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &QuotePayload,
        totals: &Totals,
    ) -> Result<Option<Quote>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            UPDATE quotes SET
                revision = revision + 1,
                client_id = $2, client_name = $3, client_document = $4,
                contact_name = $5, contact_email = $6, contact_phone = $7,
                part_description = $8, part_code = $9, drawing_number = $10,
                material_spec = $11, quantity = $12,
                sampling = $13, execution = $14, treatments = $15,
                special_services = $16, labor_hours = $17,
                notes = $18, client_request_number = $19, internal_order_number = $20,
                hours_per_unit = $21, hours_total = $22,
                material_cost_per_unit = $23, material_cost_total = $24,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            QUOTE_COLUMNS
        );

        let quote = sqlx::query_as::<_, Quote>(&sql)
            .bind(id)
            .bind(payload.client_id)
            .bind(&payload.client_name)
            .bind(&payload.client_document)
            .bind(&payload.contact_name)
            .bind(&payload.contact_email)
            .bind(&payload.contact_phone)
            .bind(&payload.part_description)
            .bind(&payload.part_code)
            .bind(&payload.drawing_number)
            .bind(&payload.material_spec)
            .bind(payload.quantity)
            .bind(&payload.sampling)
            .bind(&payload.execution)
            .bind(&payload.treatments)
            .bind(&payload.special_services)
            .bind(&payload.labor_hours)
            .bind(&payload.notes)
            .bind(&payload.client_request_number)
            .bind(&payload.internal_order_number)
            .bind(totals.hours_per_unit)
            .bind(totals.hours_total)
            .bind(totals.material_cost_per_unit)
            .bind(totals.material_cost_total)
            .fetch_optional(executor)
            .await?;

        Ok(quote)
    }

    pub async fn find_quote<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Quote>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {} FROM quotes WHERE id = $1", QUOTE_COLUMNS);
        let quote = sqlx::query_as::<_, Quote>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(quote)
    }

    /// Trava a linha da ficha até o fim da transação (mudança de etapa).
    pub async fn find_quote_for_update<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Quote>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!("SELECT {} FROM quotes WHERE id = $1 FOR UPDATE", QUOTE_COLUMNS);
        let quote = sqlx::query_as::<_, Quote>(&sql)
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(quote)
    }

    pub async fn list_quotes<'e, E>(
        &self,
        executor: E,
        stage: Option<QuoteStage>,
    ) -> Result<Vec<Quote>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let sql = format!(
            r#"
            SELECT {} FROM quotes
            WHERE ($1::quote_stage IS NULL OR stage = $1)
            ORDER BY created_at DESC
            "#,
            QUOTE_COLUMNS
        );
        let quotes = sqlx::query_as::<_, Quote>(&sql)
            .bind(stage)
            .fetch_all(executor)
            .await?;
        Ok(quotes)
    }

    /// Remove a ficha; materiais, fotos, histórico e orçamentos vão junto (CASCADE).
    pub async fn delete_quote<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM quotes WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  MATERIAIS
    // =========================================================================

    /// Substitui todas as linhas de material da ficha, mantendo a ordem recebida.
    pub async fn replace_materials<'e, E>(
        &self,
        executor: E,
        quote_id: Uuid,
        lines: &[MaterialLinePayload],
    ) -> Result<Vec<MaterialLine>, AppError>
    where
        E: Executor<'e, Database = Postgres> + Acquire<'e, Database = Postgres>,
    {
        let mut tx = executor.begin().await?;

        sqlx::query("DELETE FROM quote_materials WHERE quote_id = $1")
            .bind(quote_id)
            .execute(&mut *tx)
            .await?;

        let mut saved = Vec::with_capacity(lines.len());
        for (position, line) in lines.iter().enumerate() {
            let material = sqlx::query_as::<_, MaterialLine>(
                r#"
                INSERT INTO quote_materials (quote_id, position, description, quantity, unit, unit_price)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING id, quote_id, position, description, quantity, unit, unit_price, created_at
                "#,
            )
            .bind(quote_id)
            .bind(position as i32)
            .bind(&line.description)
            .bind(&line.quantity)
            .bind(&line.unit)
            .bind(&line.unit_price)
            .fetch_one(&mut *tx)
            .await?;
            saved.push(material);
        }

        tx.commit().await?;
        Ok(saved)
    }

    pub async fn list_materials<'e, E>(&self, executor: E, quote_id: Uuid) -> Result<Vec<MaterialLine>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let materials = sqlx::query_as::<_, MaterialLine>(
            r#"
            SELECT id, quote_id, position, description, quantity, unit, unit_price, created_at
            FROM quote_materials
            WHERE quote_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(quote_id)
        .fetch_all(executor)
        .await?;
        Ok(materials)
    }

    // =========================================================================
    //  FOTOS (só metadados)
    // =========================================================================

    pub async fn add_photo<'e, E>(
        &self,
        executor: E,
        quote_id: Uuid,
        payload: &AddPhotoPayload,
    ) -> Result<Photo, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        // A posição é a próxima livre; fotos não são reordenadas.
        let photo = sqlx::query_as::<_, Photo>(
            r#"
            INSERT INTO quote_photos (quote_id, position, name, size_bytes, storage_ref)
            VALUES (
                $1,
                (SELECT COALESCE(MAX(position) + 1, 0) FROM quote_photos WHERE quote_id = $1),
                $2, $3, $4
            )
            RETURNING id, quote_id, position, name, size_bytes, storage_ref, created_at
            "#,
        )
        .bind(quote_id)
        .bind(&payload.name)
        .bind(payload.size_bytes)
        .bind(&payload.storage_ref)
        .fetch_one(executor)
        .await?;
        Ok(photo)
    }

    pub async fn list_photos<'e, E>(&self, executor: E, quote_id: Uuid) -> Result<Vec<Photo>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let photos = sqlx::query_as::<_, Photo>(
            r#"
            SELECT id, quote_id, position, name, size_bytes, storage_ref, created_at
            FROM quote_photos
            WHERE quote_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(quote_id)
        .fetch_all(executor)
        .await?;
        Ok(photos)
    }

    pub async fn remove_photo<'e, E>(&self, executor: E, quote_id: Uuid, photo_id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM quote_photos WHERE id = $1 AND quote_id = $2")
            .bind(photo_id)
            .bind(quote_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  ETAPAS
    // =========================================================================

    pub async fn set_stage<'e, E>(&self, executor: E, id: Uuid, stage: QuoteStage) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE quotes SET stage = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(stage)
            .execute(executor)
            .await?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn insert_stage_event<'e, E>(
        &self,
        executor: E,
        quote_id: Uuid,
        kind: StageEventKind,
        from: QuoteStage,
        to: QuoteStage,
        justification: Option<&str>,
        actor: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<StageEvent, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let event = sqlx::query_as::<_, StageEvent>(
            r#"
            INSERT INTO quote_stage_events (quote_id, kind, from_stage, to_stage, justification, actor, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, quote_id, kind, from_stage, to_stage, justification, actor, created_at
            "#,
        )
        .bind(quote_id)
        .bind(kind)
        .bind(from)
        .bind(to)
        .bind(justification)
        .bind(actor)
        .bind(at)
        .fetch_one(executor)
        .await?;
        Ok(event)
    }

    // Leitura simples: vai direto na pool principal.
    pub async fn list_stage_events(&self, quote_id: Uuid) -> Result<Vec<StageEvent>, AppError> {
        let events = sqlx::query_as::<_, StageEvent>(
            r#"
            SELECT id, quote_id, kind, from_stage, to_stage, justification, actor, created_at
            FROM quote_stage_events
            WHERE quote_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(quote_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(events)
    }
}
