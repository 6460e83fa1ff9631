// src/db/approval_repo.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        approval::{ApprovalResponse, ApprovalToken, DocumentKind, DocumentStatus, NewApprovalResponse},
        workflow::QuoteStage,
    },
    services::approval_service::{ApprovalStore, NewApprovalToken},
};

const TOKEN_COLUMNS: &str = r#"
    id, token, document_id, document_kind,
    recipient_name, recipient_email, recipient_phone, recipient_role,
    expires_at, used_at, created_at
"#;

const RESPONSE_COLUMNS: &str = r#"
    id, token_id, document_id, document_kind, document_version, decision,
    responder_name, responder_email, responder_phone, remarks, user_agent, created_at
"#;

#[derive(FromRow)]
struct StatusRow {
    stage: QuoteStage,
    version: i32,
    is_current: bool,
}

#[derive(Clone)]
pub struct ApprovalRepository {
    pool: PgPool,
}

impl ApprovalRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ApprovalStore for ApprovalRepository {
    async fn insert_token(&self, token: &NewApprovalToken) -> Result<ApprovalToken, AppError> {
        let sql = format!(
            r#"
            INSERT INTO approval_tokens (
                token, document_id, document_kind,
                recipient_name, recipient_email, recipient_phone, recipient_role, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            TOKEN_COLUMNS
        );

        let saved = sqlx::query_as::<_, ApprovalToken>(&sql)
            .bind(&token.token)
            .bind(token.document_id)
            .bind(token.document_kind)
            .bind(&token.recipient.name)
            .bind(&token.recipient.email)
            .bind(&token.recipient.phone)
            .bind(&token.recipient.role)
            .bind(token.expires_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(saved)
    }

    async fn find_token(&self, token: &str) -> Result<Option<ApprovalToken>, AppError> {
        let sql = format!("SELECT {} FROM approval_tokens WHERE token = $1", TOKEN_COLUMNS);
        let found = sqlx::query_as::<_, ApprovalToken>(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found)
    }

    async fn record_response(
        &self,
        token_id: Option<Uuid>,
        response: &NewApprovalResponse,
        at: DateTime<Utc>,
    ) -> Result<ApprovalResponse, AppError> {
        let mut tx = self.pool.begin().await?;

        // Consumo condicional: só um pedido consegue marcar o token.
        if let Some(token_id) = token_id {
            let consumed = sqlx::query(
                "UPDATE approval_tokens SET used_at = $2 WHERE id = $1 AND used_at IS NULL",
            )
            .bind(token_id)
            .bind(at)
            .execute(&mut *tx)
            .await?;

            if consumed.rows_affected() == 0 {
                tx.rollback().await?;
                return Err(AppError::TokenAlreadyUsed);
            }
        }

        let sql = format!(
            r#"
            INSERT INTO approval_responses (
                token_id, document_id, document_kind, document_version, decision,
                responder_name, responder_email, responder_phone, remarks, user_agent, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING {}
            "#,
            RESPONSE_COLUMNS
        );

        let saved = sqlx::query_as::<_, ApprovalResponse>(&sql)
            .bind(token_id)
            .bind(response.document_id)
            .bind(response.document_kind)
            .bind(response.document_version)
            .bind(response.decision)
            .bind(&response.responder_name)
            .bind(&response.responder_email)
            .bind(&response.responder_phone)
            .bind(&response.remarks)
            .bind(&response.user_agent)
            .bind(at)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(saved)
    }

    async fn document_status(
        &self,
        kind: DocumentKind,
        document_id: Uuid,
    ) -> Result<Option<DocumentStatus>, AppError> {
        // Ficha: a versão é a revisão e ela é sempre a atual.
        // Orçamento: a versão é a do orçamento; a etapa é a da ficha dona.
        let sql = match kind {
            DocumentKind::Quote => {
                "SELECT stage, revision AS version, TRUE AS is_current FROM quotes WHERE id = $1"
            }
            DocumentKind::Budget => {
                r#"
                SELECT q.stage, b.version, b.is_current
                FROM budgets b
                JOIN quotes q ON q.id = b.quote_id
                WHERE b.id = $1
                "#
            }
        };

        let row = sqlx::query_as::<_, StatusRow>(sql)
            .bind(document_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| DocumentStatus {
            document_id,
            document_kind: kind,
            stage: row.stage,
            stage_label: row.stage.label().to_string(),
            version: row.version,
            is_current: row.is_current,
        }))
    }

    async fn list_responses(
        &self,
        kind: DocumentKind,
        document_id: Uuid,
    ) -> Result<Vec<ApprovalResponse>, AppError> {
        let sql = format!(
            r#"
            SELECT {} FROM approval_responses
            WHERE document_kind = $1 AND document_id = $2
            ORDER BY created_at ASC
            "#,
            RESPONSE_COLUMNS
        );
        let responses = sqlx::query_as::<_, ApprovalResponse>(&sql)
            .bind(kind)
            .bind(document_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(responses)
    }

    async fn list_tokens(
        &self,
        kind: DocumentKind,
        document_id: Uuid,
    ) -> Result<Vec<ApprovalToken>, AppError> {
        let sql = format!(
            r#"
            SELECT {} FROM approval_tokens
            WHERE document_kind = $1 AND document_id = $2
            ORDER BY created_at ASC
            "#,
            TOKEN_COLUMNS
        );
        let tokens = sqlx::query_as::<_, ApprovalToken>(&sql)
            .bind(kind)
            .bind(document_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::assert_columns_match, models::approval::Decision};

    #[test]
    fn column_lists_match_token_and_response_rows() {
        let now = Utc::now();
        let token = ApprovalToken {
            id: Uuid::new_v4(),
            token: "tok".to_string(),
            document_id: Uuid::new_v4(),
            document_kind: DocumentKind::Budget,
            recipient_name: "Maria".to_string(),
            recipient_email: None,
            recipient_phone: None,
            recipient_role: None,
            expires_at: now,
            used_at: None,
            created_at: now,
        };
        assert_columns_match(TOKEN_COLUMNS, &token);

        let response = ApprovalResponse {
            id: Uuid::new_v4(),
            token_id: Some(token.id),
            document_id: token.document_id,
            document_kind: DocumentKind::Budget,
            document_version: 1,
            decision: Decision::Approve,
            responder_name: "Maria".to_string(),
            responder_email: None,
            responder_phone: None,
            remarks: None,
            user_agent: None,
            created_at: now,
        };
        assert_columns_match(RESPONSE_COLUMNS, &response);
    }
}
