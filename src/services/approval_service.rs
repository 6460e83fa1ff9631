// src/services/approval_service.rs

use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        approval::{
            ApprovalResponse, ApprovalToken, DocumentKind, DocumentStatus, NewApprovalResponse,
            Recipient, SubmitResponsePayload, TokenRecipientView,
        },
        workflow::QuoteStage,
    },
};

/// Validade dos tokens de aprovação, contada a partir da emissão.
pub const TOKEN_TTL_DAYS: i64 = 30;
const TOKEN_BYTES: usize = 32;

/// 32 bytes do gerador do sistema operacional, em base64 url-safe (43 caracteres).
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

// =============================================================================
//  COLABORADOR: PERSISTÊNCIA DE TOKENS E RESPOSTAS
// =============================================================================

#[derive(Debug, Clone)]
pub struct NewApprovalToken {
    pub token: String,
    pub document_id: Uuid,
    pub document_kind: DocumentKind,
    pub recipient: Recipient,
    pub expires_at: DateTime<Utc>,
}

#[async_trait]
pub trait ApprovalStore: Send + Sync {
    async fn insert_token(&self, token: &NewApprovalToken) -> Result<ApprovalToken, AppError>;

    async fn find_token(&self, token: &str) -> Result<Option<ApprovalToken>, AppError>;

    /// Consome o token (se houver) e grava a resposta numa única operação.
    /// O consumo é condicional: se outro pedido já marcou o token, devolve
    /// `TokenAlreadyUsed` e nada é gravado.
    async fn record_response(
        &self,
        token_id: Option<Uuid>,
        response: &NewApprovalResponse,
        at: DateTime<Utc>,
    ) -> Result<ApprovalResponse, AppError>;

    async fn document_status(
        &self,
        kind: DocumentKind,
        document_id: Uuid,
    ) -> Result<Option<DocumentStatus>, AppError>;

    async fn list_responses(
        &self,
        kind: DocumentKind,
        document_id: Uuid,
    ) -> Result<Vec<ApprovalResponse>, AppError>;

    async fn list_tokens(
        &self,
        kind: DocumentKind,
        document_id: Uuid,
    ) -> Result<Vec<ApprovalToken>, AppError>;
}

// =============================================================================
//  REGRAS
// =============================================================================

/// Expirado vence usado: um token vencido é "expirado" mesmo que já tenha sido usado.
pub fn check_token(token: &ApprovalToken, now: DateTime<Utc>) -> Result<(), AppError> {
    if now >= token.expires_at {
        return Err(AppError::TokenExpired);
    }
    if token.used_at.is_some() {
        return Err(AppError::TokenAlreadyUsed);
    }
    Ok(())
}

/// O documento que o cliente tem em mãos ainda é o atual?
pub fn check_fresh(
    status: &DocumentStatus,
    version: i32,
    expected_stage: Option<QuoteStage>,
) -> Result<(), AppError> {
    let stage_moved = expected_stage.is_some_and(|stage| stage != status.stage);
    if !status.is_current || status.version != version || stage_moved {
        let expected_label = expected_stage
            .map(|s| s.label())
            .unwrap_or(status.stage_label.as_str());
        return Err(AppError::StaleDocument {
            expected: format!("v{} ({})", version, expected_label),
            current: format!("v{} ({})", status.version, status.stage_label),
        });
    }
    Ok(())
}

// =============================================================================
//  SERVIÇO
// =============================================================================

/// Resultado da emissão para um destinatário. Falhas não interrompem o lote.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum TokenIssueOutcome {
    #[serde(rename_all = "camelCase")]
    Issued {
        recipient: Recipient,
        token: String,
        expires_at: DateTime<Utc>,
    },
    #[serde(rename_all = "camelCase")]
    Failed { recipient: Recipient, reason: String },
}

impl TokenIssueOutcome {
    pub fn is_issued(&self) -> bool {
        matches!(self, TokenIssueOutcome::Issued { .. })
    }
}

#[derive(Clone)]
pub struct ApprovalService {
    store: Arc<dyn ApprovalStore>,
}

impl ApprovalService {
    pub fn new(store: Arc<dyn ApprovalStore>) -> Self {
        Self { store }
    }

    /// Um token por destinatário, todos com a mesma validade. As gravações
    /// rodam em paralelo; cada destinatário recebe seu próprio resultado.
    pub async fn issue_tokens(
        &self,
        document_id: Uuid,
        kind: DocumentKind,
        recipients: &[Recipient],
    ) -> Vec<TokenIssueOutcome> {
        let expires_at = Utc::now() + Duration::days(TOKEN_TTL_DAYS);

        let futures = recipients.iter().map(|recipient| {
            let new_token = NewApprovalToken {
                token: generate_token(),
                document_id,
                document_kind: kind,
                recipient: recipient.clone(),
                expires_at,
            };
            async move {
                match self.store.insert_token(&new_token).await {
                    Ok(saved) => TokenIssueOutcome::Issued {
                        recipient: new_token.recipient,
                        token: saved.token,
                        expires_at: saved.expires_at,
                    },
                    Err(e) => {
                        tracing::warn!(
                            "⚠️ Falha ao emitir token para '{}': {}",
                            new_token.recipient.name,
                            e
                        );
                        TokenIssueOutcome::Failed {
                            recipient: new_token.recipient,
                            reason: e.to_string(),
                        }
                    }
                }
            }
        });
        let outcomes = futures::future::join_all(futures).await;

        let issued = outcomes.iter().filter(|o| o.is_issued()).count();
        tracing::info!(
            "🔑 {} de {} tokens emitidos para {} {}",
            issued,
            outcomes.len(),
            kind.as_str(),
            document_id
        );
        outcomes
    }

    /// Identidade do destinatário, para o formulário pré-preencher e travar.
    pub async fn token_for_prefill(&self, token: &str) -> Result<TokenRecipientView, AppError> {
        let found = self
            .store
            .find_token(token)
            .await?
            .ok_or(AppError::TokenNotFound)?;
        check_token(&found, Utc::now())?;
        Ok(TokenRecipientView::from(&found))
    }

    pub async fn document_status(
        &self,
        kind: DocumentKind,
        document_id: Uuid,
    ) -> Result<DocumentStatus, AppError> {
        self.store
            .document_status(kind, document_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound(format!("{} {}", kind.as_str(), document_id)))
    }

    /// Recebe a resposta do formulário embutido. Não mexe na etapa da ficha.
    pub async fn submit_response(
        &self,
        payload: SubmitResponsePayload,
        user_agent: Option<String>,
    ) -> Result<ApprovalResponse, AppError> {
        let now = Utc::now();

        // 1. Token (opcional: o documento pode ter sido aberto sem link individual)
        let token = match payload.token.as_deref().filter(|t| !t.is_empty()) {
            Some(raw) => {
                let found = self
                    .store
                    .find_token(raw)
                    .await?
                    .ok_or(AppError::TokenNotFound)?;
                if found.document_id != payload.document_id
                    || found.document_kind != payload.document_kind
                {
                    return Err(AppError::TokenNotFound);
                }
                check_token(&found, now)?;
                Some(found)
            }
            None => None,
        };

        // 2. Documento ainda atual? (leitura antes da escrita; não é transação)
        let status = self
            .document_status(payload.document_kind, payload.document_id)
            .await?;
        if let Err(e) = check_fresh(&status, payload.document_version, payload.expected_stage) {
            tracing::warn!(
                "⚠️ Resposta recusada para {} {}: documento desatualizado",
                payload.document_kind.as_str(),
                payload.document_id
            );
            return Err(e);
        }

        // 3. Com token, a identidade é a do destinatário (o formulário a travou).
        let (responder_name, responder_email, responder_phone) = match &token {
            Some(t) => (
                t.recipient_name.clone(),
                t.recipient_email.clone().or(payload.responder_email),
                t.recipient_phone.clone().or(payload.responder_phone),
            ),
            None => (
                payload.responder_name.trim().to_string(),
                payload.responder_email,
                payload.responder_phone,
            ),
        };

        let new_response = NewApprovalResponse {
            token_id: token.as_ref().map(|t| t.id),
            document_id: payload.document_id,
            document_kind: payload.document_kind,
            document_version: payload.document_version,
            decision: payload.decision,
            responder_name,
            responder_email,
            responder_phone,
            remarks: payload.remarks.filter(|r| !r.trim().is_empty()),
            user_agent,
        };

        let saved = self
            .store
            .record_response(new_response.token_id, &new_response, now)
            .await?;

        tracing::info!(
            "✅ Resposta {:?} registrada para {} {} (v{})",
            saved.decision,
            saved.document_kind.as_str(),
            saved.document_id,
            saved.document_version
        );
        Ok(saved)
    }

    pub async fn list_responses(
        &self,
        kind: DocumentKind,
        document_id: Uuid,
    ) -> Result<Vec<ApprovalResponse>, AppError> {
        self.store.list_responses(kind, document_id).await
    }

    pub async fn list_tokens(
        &self,
        kind: DocumentKind,
        document_id: Uuid,
    ) -> Result<Vec<ApprovalToken>, AppError> {
        self.store.list_tokens(kind, document_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::approval::Decision;
    use std::sync::Mutex;
    use validator::Validate;

    // Dublê em memória do repositório.
    #[derive(Default)]
    struct MemoryStore {
        tokens: Mutex<Vec<ApprovalToken>>,
        responses: Mutex<Vec<ApprovalResponse>>,
        statuses: Mutex<Vec<DocumentStatus>>,
        reject_recipient: Option<String>,
    }

    #[async_trait]
    impl ApprovalStore for MemoryStore {
        async fn insert_token(&self, token: &NewApprovalToken) -> Result<ApprovalToken, AppError> {
            if self.reject_recipient.as_deref() == Some(token.recipient.name.as_str()) {
                return Err(AppError::InternalServerError(anyhow::anyhow!("conexão perdida")));
            }
            let saved = ApprovalToken {
                id: Uuid::new_v4(),
                token: token.token.clone(),
                document_id: token.document_id,
                document_kind: token.document_kind,
                recipient_name: token.recipient.name.clone(),
                recipient_email: token.recipient.email.clone(),
                recipient_phone: token.recipient.phone.clone(),
                recipient_role: token.recipient.role.clone(),
                expires_at: token.expires_at,
                used_at: None,
                created_at: Utc::now(),
            };
            self.tokens.lock().unwrap().push(saved.clone());
            Ok(saved)
        }

        async fn find_token(&self, token: &str) -> Result<Option<ApprovalToken>, AppError> {
            Ok(self.tokens.lock().unwrap().iter().find(|t| t.token == token).cloned())
        }

        async fn record_response(
            &self,
            token_id: Option<Uuid>,
            response: &NewApprovalResponse,
            at: DateTime<Utc>,
        ) -> Result<ApprovalResponse, AppError> {
            if let Some(id) = token_id {
                let mut tokens = self.tokens.lock().unwrap();
                let token = tokens
                    .iter_mut()
                    .find(|t| t.id == id && t.used_at.is_none())
                    .ok_or(AppError::TokenAlreadyUsed)?;
                token.used_at = Some(at);
            }
            let saved = ApprovalResponse {
                id: Uuid::new_v4(),
                token_id,
                document_id: response.document_id,
                document_kind: response.document_kind,
                document_version: response.document_version,
                decision: response.decision,
                responder_name: response.responder_name.clone(),
                responder_email: response.responder_email.clone(),
                responder_phone: response.responder_phone.clone(),
                remarks: response.remarks.clone(),
                user_agent: response.user_agent.clone(),
                created_at: at,
            };
            self.responses.lock().unwrap().push(saved.clone());
            Ok(saved)
        }

        async fn document_status(
            &self,
            kind: DocumentKind,
            document_id: Uuid,
        ) -> Result<Option<DocumentStatus>, AppError> {
            Ok(self
                .statuses
                .lock()
                .unwrap()
                .iter()
                .find(|s| s.document_kind == kind && s.document_id == document_id)
                .cloned())
        }

        async fn list_responses(
            &self,
            kind: DocumentKind,
            document_id: Uuid,
        ) -> Result<Vec<ApprovalResponse>, AppError> {
            Ok(self
                .responses
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.document_kind == kind && r.document_id == document_id)
                .cloned()
                .collect())
        }

        async fn list_tokens(
            &self,
            kind: DocumentKind,
            document_id: Uuid,
        ) -> Result<Vec<ApprovalToken>, AppError> {
            Ok(self
                .tokens
                .lock()
                .unwrap()
                .iter()
                .filter(|t| t.document_kind == kind && t.document_id == document_id)
                .cloned()
                .collect())
        }
    }

    fn recipient(name: &str) -> Recipient {
        Recipient {
            name: name.to_string(),
            email: Some(format!("{}@cliente.com.br", name.to_lowercase())),
            phone: Some("11988887777".to_string()),
            role: Some("Compras".to_string()),
        }
    }

    fn status(document_id: Uuid, version: i32, stage: QuoteStage) -> DocumentStatus {
        DocumentStatus {
            document_id,
            document_kind: DocumentKind::Budget,
            stage,
            stage_label: stage.label().to_string(),
            version,
            is_current: true,
        }
    }

    fn payload(document_id: Uuid, token: Option<String>) -> SubmitResponsePayload {
        SubmitResponsePayload {
            token,
            document_id,
            document_kind: DocumentKind::Budget,
            document_version: 2,
            expected_stage: Some(QuoteStage::BudgetSentToClient),
            decision: Decision::Approve,
            responder_name: "Outro Nome".to_string(),
            responder_email: None,
            responder_phone: None,
            remarks: Some("  ".to_string()),
            acknowledged: true,
        }
    }

    #[test]
    fn blank_responder_name_is_rejected() {
        let id = Uuid::new_v4();
        let mut blank = payload(id, None);
        blank.responder_name = "   ".to_string();
        let errors = blank.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 1);

        let mut empty = payload(id, None);
        empty.responder_name = String::new();
        assert!(empty.validate().is_err());

        assert!(payload(id, None).validate().is_ok());
    }

    fn setup(document_id: Uuid) -> (ApprovalService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::default());
        store
            .statuses
            .lock()
            .unwrap()
            .push(status(document_id, 2, QuoteStage::BudgetSentToClient));
        (ApprovalService::new(store.clone()), store)
    }

    fn expired_token(document_id: Uuid, used: bool) -> ApprovalToken {
        ApprovalToken {
            id: Uuid::new_v4(),
            token: generate_token(),
            document_id,
            document_kind: DocumentKind::Budget,
            recipient_name: "Maria".to_string(),
            recipient_email: None,
            recipient_phone: None,
            recipient_role: None,
            expires_at: Utc::now() - Duration::days(1),
            used_at: used.then(Utc::now),
            created_at: Utc::now() - Duration::days(31),
        }
    }

    #[test]
    fn tokens_are_random_and_url_safe() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn expiry_wins_over_used_flag() {
        let id = Uuid::new_v4();
        assert!(matches!(
            check_token(&expired_token(id, false), Utc::now()),
            Err(AppError::TokenExpired)
        ));
        assert!(matches!(
            check_token(&expired_token(id, true), Utc::now()),
            Err(AppError::TokenExpired)
        ));
    }

    #[test]
    fn freshness_checks_version_stage_and_current_flag() {
        let id = Uuid::new_v4();
        let current = status(id, 2, QuoteStage::BudgetSentToClient);
        assert!(check_fresh(&current, 2, Some(QuoteStage::BudgetSentToClient)).is_ok());
        assert!(check_fresh(&current, 2, None).is_ok());
        assert!(matches!(check_fresh(&current, 1, None), Err(AppError::StaleDocument { .. })));
        assert!(matches!(
            check_fresh(&current, 2, Some(QuoteStage::AwaitingCommercialBudget)),
            Err(AppError::StaleDocument { .. })
        ));

        let mut replaced = current.clone();
        replaced.is_current = false;
        assert!(check_fresh(&replaced, 2, None).is_err());
    }

    #[tokio::test]
    async fn issues_one_token_per_recipient_with_shared_expiry() {
        let id = Uuid::new_v4();
        let (service, store) = setup(id);
        let outcomes = service
            .issue_tokens(id, DocumentKind::Budget, &[recipient("Maria"), recipient("Joao")])
            .await;

        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(TokenIssueOutcome::is_issued));
        let tokens = store.tokens.lock().unwrap();
        assert_eq!(tokens.len(), 2);
        assert_ne!(tokens[0].token, tokens[1].token);
        assert_eq!(tokens[0].expires_at, tokens[1].expires_at);
        let ttl = tokens[0].expires_at - Utc::now();
        assert!(ttl > Duration::days(29) && ttl <= Duration::days(30));
    }

    #[tokio::test]
    async fn partial_batch_failure_is_reported_per_recipient() {
        let id = Uuid::new_v4();
        let store = Arc::new(MemoryStore {
            reject_recipient: Some("Joao".to_string()),
            ..Default::default()
        });
        let service = ApprovalService::new(store.clone());

        let outcomes = service
            .issue_tokens(
                id,
                DocumentKind::Quote,
                &[recipient("Maria"), recipient("Joao"), recipient("Ana")],
            )
            .await;

        let summary: Vec<(String, bool)> = outcomes
            .iter()
            .map(|o| match o {
                TokenIssueOutcome::Issued { recipient, .. } => (recipient.name.clone(), true),
                TokenIssueOutcome::Failed { recipient, .. } => (recipient.name.clone(), false),
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Maria".to_string(), true),
                ("Joao".to_string(), false),
                ("Ana".to_string(), true)
            ]
        );
        assert_eq!(store.tokens.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn token_is_single_use() {
        let id = Uuid::new_v4();
        let (service, store) = setup(id);
        let outcomes = service
            .issue_tokens(id, DocumentKind::Budget, &[recipient("Maria")])
            .await;
        let TokenIssueOutcome::Issued { token, .. } = &outcomes[0] else {
            panic!("token não emitido");
        };

        let view = service.token_for_prefill(token).await.unwrap();
        assert_eq!(view.recipient_name, "Maria");

        let first = service
            .submit_response(payload(id, Some(token.clone())), Some("Mozilla/5.0".into()))
            .await
            .unwrap();
        assert_eq!(first.responder_name, "Maria");
        assert_eq!(first.remarks, None);
        assert_eq!(first.user_agent.as_deref(), Some("Mozilla/5.0"));

        let second = service.submit_response(payload(id, Some(token.clone())), None).await;
        assert!(matches!(second, Err(AppError::TokenAlreadyUsed)));
        assert!(matches!(
            service.token_for_prefill(token).await,
            Err(AppError::TokenAlreadyUsed)
        ));
        assert_eq!(store.responses.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn expired_token_blocks_submission() {
        let id = Uuid::new_v4();
        let (service, store) = setup(id);
        let token = expired_token(id, false);
        store.tokens.lock().unwrap().push(token.clone());

        let result = service.submit_response(payload(id, Some(token.token)), None).await;
        assert!(matches!(result, Err(AppError::TokenExpired)));
        assert!(store.responses.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn stale_document_blocks_submission() {
        let id = Uuid::new_v4();
        let (service, store) = setup(id);
        let mut stale = payload(id, None);
        stale.document_version = 1;

        let result = service.submit_response(stale, None).await;
        assert!(matches!(result, Err(AppError::StaleDocument { .. })));
        assert!(store.responses.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn token_for_another_document_is_rejected() {
        let id = Uuid::new_v4();
        let (service, _) = setup(id);
        let outcomes = service
            .issue_tokens(Uuid::new_v4(), DocumentKind::Budget, &[recipient("Maria")])
            .await;
        let TokenIssueOutcome::Issued { token, .. } = &outcomes[0] else {
            panic!("token não emitido");
        };

        let result = service.submit_response(payload(id, Some(token.clone())), None).await;
        assert!(matches!(result, Err(AppError::TokenNotFound)));
    }

    #[tokio::test]
    async fn response_without_token_uses_typed_identity() {
        let id = Uuid::new_v4();
        let (service, _) = setup(id);
        let saved = service.submit_response(payload(id, None), None).await.unwrap();
        assert_eq!(saved.responder_name, "Outro Nome");
        assert_eq!(saved.token_id, None);
        assert_eq!(service.list_responses(DocumentKind::Budget, id).await.unwrap().len(), 1);
    }
}
