// src/services/workflow.rs

use std::fmt;
use std::str::FromStr;

use crate::{
    common::error::AppError,
    models::workflow::{ProductionStage, PurchaseStage, QuoteStage},
};

/// Tamanho mínimo da justificativa para retroceder uma ficha.
pub const MIN_JUSTIFICATION_CHARS: usize = 10;

// =============================================================================
//  FICHA DE COTAÇÃO
// =============================================================================

impl QuoteStage {
    pub const ALL: [QuoteStage; 5] = [
        QuoteStage::Draft,
        QuoteStage::AwaitingPurchasingQuote,
        QuoteStage::AwaitingCommercialBudget,
        QuoteStage::BudgetSentToClient,
        QuoteStage::ClientApproved,
    ];

    /// Código persistido no banco.
    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStage::Draft => "draft",
            QuoteStage::AwaitingPurchasingQuote => "awaiting_purchasing_quote",
            QuoteStage::AwaitingCommercialBudget => "awaiting_commercial_budget",
            QuoteStage::BudgetSentToClient => "budget_sent_to_client",
            QuoteStage::ClientApproved => "client_approved",
        }
    }

    /// Rótulo exibido nas telas e nos documentos.
    pub fn label(&self) -> &'static str {
        match self {
            QuoteStage::Draft => "Rascunho",
            QuoteStage::AwaitingPurchasingQuote => "Aguardando Cotação de Compras",
            QuoteStage::AwaitingCommercialBudget => "Aguardando Orçamento Comercial",
            QuoteStage::BudgetSentToClient => "Orçamento Enviado ao Cliente",
            QuoteStage::ClientApproved => "Aprovado pelo Cliente",
        }
    }

    /// Rótulo -> etapa, sem diferenciar maiúsculas nem acentos.
    pub fn from_label(label: &str) -> Option<QuoteStage> {
        let wanted = fold(label);
        Self::ALL.into_iter().find(|stage| fold(stage.label()) == wanted)
    }

    /// A única etapa seguinte permitida.
    pub fn next(&self) -> Option<QuoteStage> {
        match self {
            QuoteStage::Draft => Some(QuoteStage::AwaitingPurchasingQuote),
            QuoteStage::AwaitingPurchasingQuote => Some(QuoteStage::AwaitingCommercialBudget),
            QuoteStage::AwaitingCommercialBudget => Some(QuoteStage::BudgetSentToClient),
            QuoteStage::BudgetSentToClient => Some(QuoteStage::ClientApproved),
            QuoteStage::ClientApproved => None,
        }
    }

    /// Tabela fixa de retrocesso. `None` para o rascunho: não é erro, é resposta.
    pub fn previous(&self) -> Option<QuoteStage> {
        match self {
            QuoteStage::Draft => None,
            QuoteStage::AwaitingPurchasingQuote => Some(QuoteStage::Draft),
            QuoteStage::AwaitingCommercialBudget => Some(QuoteStage::AwaitingPurchasingQuote),
            QuoteStage::BudgetSentToClient => Some(QuoteStage::AwaitingCommercialBudget),
            QuoteStage::ClientApproved => Some(QuoteStage::BudgetSentToClient),
        }
    }
}

impl fmt::Display for QuoteStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuoteStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == code)
            .or_else(|| Self::from_label(code))
            .ok_or_else(|| format!("Etapa desconhecida: {}", s))
    }
}

/// Valida o avanço e devolve a etapa de destino.
pub fn plan_advance(current: QuoteStage) -> Result<QuoteStage, AppError> {
    current.next().ok_or_else(|| AppError::InvalidTransition {
        from: current.label().to_string(),
        to: "—".to_string(),
    })
}

/// Valida o retrocesso. Não olha orçamentos ou requisições já criados:
/// o retrocesso é incondicional fora a justificativa.
pub fn plan_reversal(current: QuoteStage, justification: &str) -> Result<QuoteStage, AppError> {
    let previous = current
        .previous()
        .ok_or_else(|| AppError::NoPreviousStage(current.label().to_string()))?;

    if justification.trim().chars().count() < MIN_JUSTIFICATION_CHARS {
        return Err(AppError::JustificationTooShort {
            min: MIN_JUSTIFICATION_CHARS,
        });
    }

    Ok(previous)
}

/// Etapa em que a ficha fica depois de enviar o orçamento. Só sai de
/// "Aguardando Orçamento Comercial"; reenvio em outra etapa não move nada.
pub fn plan_budget_send(current: QuoteStage) -> QuoteStage {
    match current {
        QuoteStage::AwaitingCommercialBudget => QuoteStage::BudgetSentToClient,
        other => other,
    }
}

// =============================================================================
//  TRILHAS PERIFÉRICAS (COMPRAS / PRODUÇÃO)
// =============================================================================

impl PurchaseStage {
    pub fn label(&self) -> &'static str {
        match self {
            PurchaseStage::AwaitingPcp => "Aguardando PCP",
            PurchaseStage::ApprovedPcp => "Aprovado PCP",
            PurchaseStage::InPurchase => "Em Compra",
            PurchaseStage::OrderSent => "Pedido Enviado",
            PurchaseStage::InTransit => "Em Trânsito",
            PurchaseStage::Received => "Recebido",
        }
    }

    pub fn next(&self) -> Option<PurchaseStage> {
        match self {
            PurchaseStage::AwaitingPcp => Some(PurchaseStage::ApprovedPcp),
            PurchaseStage::ApprovedPcp => Some(PurchaseStage::InPurchase),
            PurchaseStage::InPurchase => Some(PurchaseStage::OrderSent),
            PurchaseStage::OrderSent => Some(PurchaseStage::InTransit),
            PurchaseStage::InTransit => Some(PurchaseStage::Received),
            PurchaseStage::Received => None,
        }
    }

    pub fn can_transition_to(&self, target: PurchaseStage) -> bool {
        self.next() == Some(target)
    }
}

impl ProductionStage {
    pub fn label(&self) -> &'static str {
        match self {
            ProductionStage::AwaitingMaterials => "Aguardando Materiais",
            ProductionStage::AwaitingStart => "Aguardando Início",
            ProductionStage::InProduction => "Em Produção",
            ProductionStage::Paused => "Pausado",
            ProductionStage::Completed => "Concluído",
        }
    }

    pub fn can_transition_to(&self, target: ProductionStage) -> bool {
        use ProductionStage::*;
        matches!(
            (self, target),
            (AwaitingMaterials, AwaitingStart)
                | (AwaitingStart, InProduction)
                | (InProduction, Paused)
                | (Paused, InProduction)
                | (InProduction, Completed)
        )
    }
}

pub fn check_purchase_transition(from: PurchaseStage, to: PurchaseStage) -> Result<(), AppError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(AppError::InvalidTransition {
            from: from.label().to_string(),
            to: to.label().to_string(),
        })
    }
}

pub fn check_production_transition(from: ProductionStage, to: ProductionStage) -> Result<(), AppError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(AppError::InvalidTransition {
            from: from.label().to_string(),
            to: to.label().to_string(),
        })
    }
}

// Minúsculas e sem acentos, para comparar rótulos digitados à mão.
fn fold(text: &str) -> String {
    text.trim()
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
            'é' | 'è' | 'ê' | 'ë' => 'e',
            'í' | 'ì' | 'î' | 'ï' => 'i',
            'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
            'ú' | 'ù' | 'û' | 'ü' => 'u',
            'ç' => 'c',
            other => other,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reversal_table_is_complete() {
        assert_eq!(QuoteStage::Draft.previous(), None);
        assert_eq!(
            QuoteStage::AwaitingPurchasingQuote.previous(),
            Some(QuoteStage::Draft)
        );
        assert_eq!(
            QuoteStage::AwaitingCommercialBudget.previous(),
            Some(QuoteStage::AwaitingPurchasingQuote)
        );
        assert_eq!(
            QuoteStage::BudgetSentToClient.previous(),
            Some(QuoteStage::AwaitingCommercialBudget)
        );
        assert_eq!(
            QuoteStage::ClientApproved.previous(),
            Some(QuoteStage::BudgetSentToClient)
        );
    }

    #[test]
    fn next_and_previous_are_inverse() {
        for stage in QuoteStage::ALL {
            if let Some(next) = stage.next() {
                assert_eq!(next.previous(), Some(stage));
            }
        }
        assert_eq!(QuoteStage::ClientApproved.next(), None);
    }

    #[test]
    fn codes_and_labels_round_trip() {
        for stage in QuoteStage::ALL {
            assert_eq!(stage.as_str().parse::<QuoteStage>(), Ok(stage));
            assert_eq!(QuoteStage::from_label(stage.label()), Some(stage));
        }
        assert_eq!(
            QuoteStage::from_label("aguardando cotacao de compras"),
            Some(QuoteStage::AwaitingPurchasingQuote)
        );
        assert_eq!(
            "ORÇAMENTO ENVIADO AO CLIENTE".parse::<QuoteStage>(),
            Ok(QuoteStage::BudgetSentToClient)
        );
        assert!("em_producao".parse::<QuoteStage>().is_err());
    }

    #[test]
    fn reversal_requires_justification() {
        let err = plan_reversal(QuoteStage::AwaitingCommercialBudget, "curta").unwrap_err();
        assert!(matches!(err, AppError::JustificationTooShort { min: 10 }));

        let err = plan_reversal(QuoteStage::AwaitingCommercialBudget, "          x ").unwrap_err();
        assert!(matches!(err, AppError::JustificationTooShort { .. }));

        let to = plan_reversal(
            QuoteStage::AwaitingCommercialBudget,
            "Cliente alterou o desenho",
        )
        .unwrap();
        assert_eq!(to, QuoteStage::AwaitingPurchasingQuote);
    }

    #[test]
    fn draft_cannot_be_reverted() {
        let err = plan_reversal(QuoteStage::Draft, "qualquer justificativa longa").unwrap_err();
        assert!(matches!(err, AppError::NoPreviousStage(_)));
    }

    #[test]
    fn advance_stops_at_client_approval() {
        assert_eq!(
            plan_advance(QuoteStage::Draft).unwrap(),
            QuoteStage::AwaitingPurchasingQuote
        );
        assert!(plan_advance(QuoteStage::ClientApproved).is_err());
    }

    #[test]
    fn budget_send_only_moves_from_commercial_budget() {
        assert_eq!(
            plan_budget_send(QuoteStage::AwaitingCommercialBudget),
            QuoteStage::BudgetSentToClient
        );
        for stage in [
            QuoteStage::Draft,
            QuoteStage::AwaitingPurchasingQuote,
            QuoteStage::BudgetSentToClient,
            QuoteStage::ClientApproved,
        ] {
            assert_eq!(plan_budget_send(stage), stage);
        }
    }

    #[test]
    fn purchase_track_is_linear() {
        assert!(PurchaseStage::AwaitingPcp.can_transition_to(PurchaseStage::ApprovedPcp));
        assert!(!PurchaseStage::AwaitingPcp.can_transition_to(PurchaseStage::Received));
        assert!(!PurchaseStage::Received.can_transition_to(PurchaseStage::AwaitingPcp));
        assert!(check_purchase_transition(PurchaseStage::InTransit, PurchaseStage::Received).is_ok());
    }

    #[test]
    fn production_can_pause_and_resume() {
        use ProductionStage::*;
        assert!(InProduction.can_transition_to(Paused));
        assert!(Paused.can_transition_to(InProduction));
        assert!(!Paused.can_transition_to(Completed));
        assert!(InProduction.can_transition_to(Completed));
        assert!(check_production_transition(AwaitingMaterials, InProduction).is_err());
    }
}
