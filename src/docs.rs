// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use crate::handlers;
use crate::middleware::public_key::PUBLIC_KEY_HEADER;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Fichas ---
        handlers::quotes::create_quote,
        handlers::quotes::list_quotes,
        handlers::quotes::get_quote,
        handlers::quotes::update_quote,
        handlers::quotes::clone_quote,
        handlers::quotes::delete_quote,
        handlers::quotes::advance_stage,
        handlers::quotes::revert_stage,
        handlers::quotes::stage_history,
        handlers::quotes::add_photo,
        handlers::quotes::upload_photo,
        handlers::quotes::list_photos,
        handlers::quotes::remove_photo,

        // --- Orçamentos ---
        handlers::budgets::create_budget,
        handlers::budgets::list_budgets,
        handlers::budgets::current_budget,
        handlers::budgets::get_budget,

        // --- Documentos ---
        handlers::documents::render_document,
        handlers::documents::send_document,
        handlers::approvals::list_responses,
        handlers::approvals::list_tokens,

        // --- Clientes ---
        handlers::clients::create_client,
        handlers::clients::list_clients,
        handlers::clients::get_client,
        handlers::clients::delete_client,
        handlers::clients::add_contact,
        handlers::clients::remove_contact,

        // --- Acompanhamento ---
        handlers::tracking::create_requisition,
        handlers::tracking::list_requisitions,
        handlers::tracking::transition_requisition,
        handlers::tracking::create_production_order,
        handlers::tracking::list_production_orders,
        handlers::tracking::transition_production_order,

        // --- Públicas ---
        handlers::approvals::get_token,
        handlers::approvals::document_status,
        handlers::approvals::submit_response,
        handlers::files::get_signed_file,
    ),
    components(
        schemas(
            // --- Workflow ---
            models::workflow::QuoteStage,
            models::workflow::PurchaseStage,
            models::workflow::ProductionStage,
            models::workflow::StageEventKind,

            // --- Fichas ---
            models::quote::Quote,
            models::quote::MaterialLine,
            models::quote::Photo,
            models::quote::QuoteDetail,
            models::quote::StageEvent,
            models::quote::MaterialLinePayload,
            models::quote::QuotePayload,
            models::quote::AddPhotoPayload,
            models::quote::AdvanceStagePayload,
            models::quote::RevertStagePayload,
            services::totals::Totals,

            // --- Orçamentos ---
            models::budget::Budget,
            models::budget::BudgetLineItem,
            models::budget::BudgetLineItemPayload,
            models::budget::CreateBudgetPayload,
            services::pricing::PricingResult,

            // --- Documentos e envio ---
            services::document::DocumentVariant,
            models::dispatch::SendDocumentPayload,
            models::dispatch::DeliveryStatus,
            models::dispatch::RecipientDelivery,
            models::dispatch::SendOutcome,
            services::storage::StoredDocument,
            services::storage::PhotoFailure,

            // --- Aprovação ---
            models::approval::DocumentKind,
            models::approval::Decision,
            models::approval::Recipient,
            models::approval::ApprovalToken,
            models::approval::ApprovalResponse,
            models::approval::SubmitResponsePayload,
            models::approval::TokenRecipientView,
            models::approval::DocumentStatus,

            // --- Clientes ---
            models::client::Client,
            models::client::ClientContact,
            models::client::ClientDetail,
            models::client::CreateClientPayload,
            models::client::CreateContactPayload,

            // --- Acompanhamento ---
            models::tracking::PurchaseRequisition,
            models::tracking::ProductionOrder,
            models::tracking::CreateRequisitionPayload,
            models::tracking::CreateProductionOrderPayload,
            models::tracking::TransitionPurchasePayload,
            models::tracking::TransitionProductionPayload,

            // --- Empresa ---
            models::settings::CompanyProfile,
        )
    ),
    tags(
        (name = "Fichas", description = "Fichas Técnicas de Cotação, materiais, fotos e etapas"),
        (name = "Orçamentos", description = "Versões de orçamento comercial"),
        (name = "Documentos", description = "Geração, envio e trilha de aprovação"),
        (name = "Clientes", description = "Clientes e contatos"),
        (name = "Acompanhamento", description = "Requisições de compra e ordens de produção"),
        (name = "Aprovação (pública)", description = "Rotas usadas pelo formulário embutido no documento")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "public_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(PUBLIC_KEY_HEADER))),
        );
    }
}
