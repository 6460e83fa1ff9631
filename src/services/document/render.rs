// src/services/document/render.rs

use serde_json::Value;

use super::{
    escape::{escape_html, js_string},
    format::{
        format_brl, format_date_br, format_hours, format_number_br, format_percent,
        gallery_neighbors, hours, text_or_dash, tri_state, value_text_or_dash,
    },
    DocumentInput, DocumentVariant, ResolvedPhoto, APPROVAL_CLOSE_DELAY_MS,
};
use crate::{
    models::{
        approval::DocumentKind,
        budget::Budget,
        quote::{MaterialLine, Quote},
    },
    services::{
        catalog::{
            FieldKind, FieldSpec, EXECUTION_FIELDS, SAMPLING_FIELDS, SPECIAL_SERVICE_FIELDS,
            TREATMENT_FIELDS, WORK_CENTER_GROUPS,
        },
        pricing::{compute_price, PricingInput},
        totals::{compute_totals, PricedLine, Totals},
    },
};

const STYLE: &str = include_str!("assets/document.css");
const GALLERY_SCRIPT: &str = include_str!("assets/gallery.js");
const APPROVAL_SCRIPT: &str = include_str!("assets/approval.js");

/// Monta o documento inteiro. Função pura: mesma entrada, mesmo HTML.
pub fn render_document(input: &DocumentInput<'_>) -> String {
    let quote = input.quote;
    // Os totais da ficha gravada são só cache; o documento recalcula.
    let totals = compute_totals(input.materials, &quote.labor_hours, quote.quantity);

    let mut out = String::with_capacity(48 * 1024);

    open_page(&mut out, input);
    header_section(&mut out, input);
    client_section(&mut out, quote);
    part_section(&mut out, quote);
    field_section(&mut out, "Amostragem", SAMPLING_FIELDS, &quote.sampling);
    field_section(&mut out, "Execução", EXECUTION_FIELDS, &quote.execution);
    field_section(&mut out, "Tratamentos", TREATMENT_FIELDS, &quote.treatments);
    field_section(&mut out, "Serviços Especiais", SPECIAL_SERVICE_FIELDS, &quote.special_services);
    labor_section(&mut out, &quote.labor_hours, &totals);
    materials_section(&mut out, input.materials, &totals);
    notes_section(&mut out, quote);
    control_section(&mut out, quote);
    gallery_section(&mut out, input.photos);

    if let Some(budget) = input.budget {
        commercial_section(&mut out, budget);
        if input.variant.shows_cost_breakdown() {
            cost_breakdown_section(&mut out, budget);
        }
    }

    if input.variant == DocumentVariant::Approval {
        approval_section(&mut out, input);
    }

    close_page(&mut out, input);
    out
}

// =============================================================================
//  PEÇAS DE MARCAÇÃO
// =============================================================================

fn field(out: &mut String, label: &str, value: &str) {
    out.push_str(&format!(
        "<div class=\"field\"><span class=\"label\">{}</span><span class=\"value\">{}</span></div>",
        escape_html(label),
        escape_html(value)
    ));
}

fn optional_field(out: &mut String, label: &str, value: Option<&str>) {
    field(out, label, text_or_dash(value));
}

fn render_catalog_field(spec: &FieldSpec, values: &Value) -> String {
    let value = values.get(spec.key);
    match spec.kind {
        FieldKind::Text => value_text_or_dash(value),
        FieldKind::TriState => tri_state(value),
        FieldKind::Hours => hours(value),
    }
}

fn days(n: i32) -> String {
    if n == 1 { "1 dia".to_string() } else { format!("{} dias", n) }
}

// =============================================================================
//  SEÇÕES
// =============================================================================

fn open_page(out: &mut String, input: &DocumentInput<'_>) {
    let title = match input.budget {
        Some(_) => "Orçamento",
        None => "Ficha Técnica de Cotação",
    };
    out.push_str("<!DOCTYPE html>\n<html lang=\"pt-BR\">\n<head>\n<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str(&format!(
        "<title>{} {}</title>\n<style>\n{}</style>\n</head>\n<body>\n<div class=\"page\">\n",
        title,
        escape_html(&input.quote.number),
        STYLE
    ));
}

fn header_section(out: &mut String, input: &DocumentInput<'_>) {
    let quote = input.quote;
    let company = input.company;

    let (title, version_line, date) = match input.budget {
        Some(budget) => (
            "Orçamento",
            format!("Versão {}", budget.version),
            budget.issued_at.unwrap_or(budget.created_at),
        ),
        None => (
            "Ficha Técnica de Cotação",
            format!("Revisão {}", quote.revision),
            quote.updated_at,
        ),
    };

    let company_lines: Vec<String> = [
        company.document_number.as_deref().map(|d| format!("CNPJ {}", d.trim())),
        company.address.clone(),
        company.phone.clone(),
        company.email.clone(),
    ]
    .into_iter()
    .flatten()
    .filter(|line| !line.trim().is_empty())
    .map(|line| escape_html(line.trim()))
    .collect();

    out.push_str("<header class=\"doc-header\">\n<div>\n");
    out.push_str(&format!(
        "<h1>{}</h1>\n<div class=\"company\">{}</div>\n</div>\n",
        escape_html(text_or_dash(Some(&company.name))),
        company_lines.join("<br>")
    ));
    out.push_str(&format!(
        "<div class=\"meta\"><div>{}</div><strong>Nº {}</strong><div>{}</div><div>{}</div><span class=\"badge\">{}</span></div>\n",
        title,
        escape_html(&quote.number),
        version_line,
        format_date_br(&date),
        escape_html(quote.stage.label())
    ));
    out.push_str("</header>\n");
}

fn client_section(out: &mut String, quote: &Quote) {
    out.push_str("<section class=\"client\"><h2>Cliente</h2><div class=\"grid\">");
    field(out, "Razão social", text_or_dash(Some(&quote.client_name)));
    optional_field(out, "CNPJ / CPF", quote.client_document.as_deref());
    optional_field(out, "Contato", quote.contact_name.as_deref());
    optional_field(out, "E-mail", quote.contact_email.as_deref());
    optional_field(out, "Telefone", quote.contact_phone.as_deref());
    out.push_str("</div></section>\n");
}

fn part_section(out: &mut String, quote: &Quote) {
    out.push_str("<section class=\"part\"><h2>Peça</h2><div class=\"grid\">");
    field(out, "Descrição", text_or_dash(Some(&quote.part_description)));
    optional_field(out, "Código", quote.part_code.as_deref());
    optional_field(out, "Nº do desenho", quote.drawing_number.as_deref());
    optional_field(out, "Material", quote.material_spec.as_deref());
    field(out, "Quantidade", &quote.quantity.to_string());
    out.push_str("</div></section>\n");
}

fn field_section(out: &mut String, title: &str, fields: &[FieldSpec], values: &Value) {
    out.push_str(&format!("<section><h2>{}</h2><div class=\"grid\">", escape_html(title)));
    for spec in fields {
        field(out, spec.label, &render_catalog_field(spec, values));
    }
    out.push_str("</div></section>\n");
}

fn labor_section(out: &mut String, labor_hours: &Value, totals: &Totals) {
    out.push_str("<section class=\"labor\"><h2>Horas por Centro de Trabalho</h2>");
    for group in WORK_CENTER_GROUPS {
        out.push_str(&format!("<h3>{}</h3><div class=\"grid\">", escape_html(group.title)));
        for spec in group.fields {
            field(out, spec.label, &render_catalog_field(spec, labor_hours));
        }
        out.push_str("</div>");
    }
    out.push_str(&format!(
        "<div class=\"totals\">\
         <div>Horas por peça<strong>{}</strong></div>\
         <div>Horas totais<strong>{}</strong></div>\
         <div>Material por peça<strong>{}</strong></div>\
         <div>Material total<strong>{}</strong></div>\
         </div></section>\n",
        format_hours(totals.hours_per_unit),
        format_hours(totals.hours_total),
        format_brl(totals.material_cost_per_unit),
        format_brl(totals.material_cost_total)
    ));
}

fn materials_section(out: &mut String, materials: &[MaterialLine], totals: &Totals) {
    // Sem nenhuma linha com valor, a tabela não aparece.
    if materials.iter().all(|line| line.line_total().is_zero()) {
        return;
    }

    out.push_str(
        "<section class=\"materials\"><h2>Materiais</h2><table class=\"materials\">\
         <thead><tr><th>Descrição</th><th class=\"num\">Qtd</th><th>Un</th>\
         <th class=\"num\">Preço unit.</th><th class=\"num\">Total</th></tr></thead><tbody>",
    );
    for line in materials {
        out.push_str(&format!(
            "<tr><td>{}</td><td class=\"num\">{}</td><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td></tr>",
            escape_html(text_or_dash(Some(&line.description))),
            escape_html(text_or_dash(Some(&line.quantity))),
            escape_html(text_or_dash(line.unit.as_deref())),
            escape_html(text_or_dash(Some(&line.unit_price))),
            format_brl(line.line_total())
        ));
    }
    out.push_str(&format!(
        "</tbody><tfoot><tr><td colspan=\"4\">Total por peça</td><td class=\"num\">{}</td></tr></tfoot></table></section>\n",
        format_brl(totals.material_cost_per_unit)
    ));
}

fn notes_section(out: &mut String, quote: &Quote) {
    out.push_str(&format!(
        "<section><h2>Observações</h2><div class=\"notes\">{}</div></section>\n",
        escape_html(text_or_dash(quote.notes.as_deref()))
    ));
}

fn control_section(out: &mut String, quote: &Quote) {
    out.push_str("<section><h2>Números de Controle</h2><div class=\"grid\">");
    field(out, "Nº da FTC", &quote.number);
    optional_field(out, "Solicitação do cliente", quote.client_request_number.as_deref());
    optional_field(out, "Pedido interno", quote.internal_order_number.as_deref());
    out.push_str("</div></section>\n");
}

fn gallery_section(out: &mut String, photos: &[ResolvedPhoto]) {
    out.push_str("<section class=\"photos\"><h2>Fotos</h2>");
    if photos.is_empty() {
        out.push_str("<p class=\"empty\">Nenhuma foto anexada.</p></section>\n");
        return;
    }

    out.push_str("<div class=\"gallery\">");
    for (index, photo) in photos.iter().enumerate() {
        let (prev, next) = gallery_neighbors(index, photos.len());
        let url = escape_html(&photo.url);
        let name = escape_html(&photo.name);
        out.push_str(&format!(
            "<figure data-index=\"{index}\" data-prev=\"{prev}\" data-next=\"{next}\" data-full=\"{url}\" data-name=\"{name}\">\
             <img src=\"{url}\" alt=\"{name}\" loading=\"lazy\"><figcaption>{name}</figcaption></figure>"
        ));
    }
    out.push_str("</div></section>\n");
}

fn commercial_section(out: &mut String, budget: &Budget) {
    out.push_str("<section class=\"commercial\"><h2>Proposta Comercial</h2>");
    out.push_str(&format!(
        "<div class=\"price-box\"><div class=\"caption\">Valor total</div><div class=\"price\">{}</div>\
         <div class=\"caption\">{} peça(s) × {}</div></div>",
        format_brl(budget.total_price),
        budget.quantity,
        format_brl(budget.sale_price)
    ));

    if !budget.line_items.is_empty() {
        out.push_str(
            "<table class=\"items\"><thead><tr><th>Item</th><th class=\"num\">Qtd</th>\
             <th class=\"num\">Preço unit.</th><th class=\"num\">Total</th></tr></thead><tbody>",
        );
        for item in budget.line_items.iter() {
            out.push_str(&format!(
                "<tr><td>{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td><td class=\"num\">{}</td></tr>",
                escape_html(text_or_dash(Some(&item.description))),
                item.quantity.normalize(),
                format_brl(item.unit_price),
                format_brl(item.total)
            ));
        }
        out.push_str(&format!(
            "</tbody><tfoot><tr><td colspan=\"3\">Total</td><td class=\"num\">{}</td></tr></tfoot></table>",
            format_brl(budget.total_price)
        ));
    }

    out.push_str("<h3>Condições Comerciais</h3><div class=\"grid\">");
    field(out, "Prazo de entrega", &days(budget.delivery_days));
    field(out, "Validade da proposta", &days(budget.validity_days));
    field(out, "Condições de pagamento", text_or_dash(Some(&budget.payment_terms)));
    field(out, "Garantia", &days(budget.warranty_days));
    out.push_str("</div>");

    if let Some(notes) = budget.notes.as_deref().filter(|n| !n.trim().is_empty()) {
        out.push_str(&format!("<div class=\"notes\">{}</div>", escape_html(notes.trim())));
    }
    out.push_str("</section>\n");
}

fn cost_breakdown_section(out: &mut String, budget: &Budget) {
    let pricing = compute_price(&PricingInput {
        material_cost: budget.material_cost,
        labor_hours: budget.labor_hours,
        hourly_rate: budget.hourly_rate,
        other_costs: budget.other_costs,
        variable_pct: budget.variable_pct,
        fixed_pct: budget.fixed_pct,
        profit_pct: budget.profit_pct,
    });

    out.push_str("<section class=\"breakdown\"><h2>Composição de Custos (uso interno)</h2>");
    if pricing.degenerate {
        out.push_str(&format!(
            "<p class=\"warning\">Os percentuais somam {}. O preço de venda foi igualado à base de custo.</p>",
            format_percent(pricing.other_pct)
        ));
    }
    out.push_str("<div class=\"grid\">");
    field(out, "Material por peça", &format_brl(budget.material_cost));
    field(
        out,
        "Mão de obra",
        &format!(
            "{} × {} = {}",
            format_hours(budget.labor_hours),
            format_brl(budget.hourly_rate),
            format_brl(pricing.labor_cost)
        ),
    );
    field(out, "Outros custos", &format_brl(budget.other_costs));
    field(out, "Base de custo", &format_brl(pricing.cost_base));
    field(
        out,
        "Despesas variáveis",
        &format!("{} = {}", format_percent(budget.variable_pct), format_brl(pricing.variable_amount)),
    );
    field(
        out,
        "Despesas fixas",
        &format!("{} = {}", format_percent(budget.fixed_pct), format_brl(pricing.fixed_amount)),
    );
    field(
        out,
        "Lucro",
        &format!("{} = {}", format_percent(budget.profit_pct), format_brl(pricing.profit_amount)),
    );
    field(out, "Fator de markup", &format_number_br(pricing.markup_factor, 4));
    field(out, "Preço de venda por peça", &format_brl(pricing.sale_price));
    out.push_str("</div></section>\n");
}

fn approval_section(out: &mut String, input: &DocumentInput<'_>) {
    let quote = input.quote;
    let (kind, document_id, version) = match input.budget {
        Some(budget) => (DocumentKind::Budget, budget.id, budget.version),
        None => (DocumentKind::Quote, quote.id, quote.revision),
    };

    out.push_str(
        "<section id=\"approval\" class=\"approval\"><h2>Resposta do Cliente</h2>\
         <div class=\"identity\">\
         <div><label for=\"responder-name\">Nome</label><input type=\"text\" id=\"responder-name\" autocomplete=\"name\"></div>\
         <div><label for=\"responder-email\">E-mail</label><input type=\"email\" id=\"responder-email\" autocomplete=\"email\"></div>\
         <div><label for=\"responder-phone\">Telefone</label><input type=\"tel\" id=\"responder-phone\" autocomplete=\"tel\"></div>\
         </div>\
         <div class=\"tabs\">\
         <button type=\"button\" class=\"active\" data-target=\"panel-approve\">Aprovar</button>\
         <button type=\"button\" data-target=\"panel-request-changes\">Solicitar alterações</button>\
         <button type=\"button\" data-target=\"panel-reject\">Recusar</button>\
         </div>",
    );

    let panels = [
        (
            "approve",
            "panel-approve",
            true,
            "Ao aprovar, declaro que conferi as informações deste documento e que tenho autorização para aprová-lo em nome da empresa.",
            "Confirmar aprovação",
        ),
        (
            "request_changes",
            "panel-request-changes",
            false,
            "Declaro que as alterações descritas abaixo são necessárias e estou ciente de que uma nova versão do documento será emitida.",
            "Enviar solicitação",
        ),
        (
            "reject",
            "panel-reject",
            false,
            "Declaro que tenho autorização para recusar este documento em nome da empresa.",
            "Confirmar recusa",
        ),
    ];

    for (decision, id, active, statement, button) in panels {
        out.push_str(&format!(
            "<div class=\"panel{}\" id=\"{id}\" data-decision=\"{decision}\">\
             <p class=\"statement\">{statement}</p>\
             <label><input type=\"checkbox\" class=\"ack\"> Li e concordo com a declaração acima.</label>\
             <label for=\"{id}-remarks\">Observações</label><textarea id=\"{id}-remarks\" rows=\"3\"></textarea>\
             <button type=\"button\" class=\"submit\">{button}</button>\
             </div>",
            if active { " active" } else { "" },
        ));
    }

    out.push_str("<div class=\"message\"></div></section>\n");

    let base_url = input.endpoint.base_url.trim_end_matches('/');
    out.push_str(&format!(
        "<script>window.FICHA_APPROVAL = {{ apiBase: {}, apiKey: {}, documentId: {}, documentKind: {}, documentVersion: {}, expectedStage: {}, closeDelayMs: {} }};</script>\n",
        js_string(base_url),
        js_string(&input.endpoint.public_key),
        js_string(&document_id.to_string()),
        js_string(kind.as_str()),
        version,
        js_string(quote.stage.as_str()),
        APPROVAL_CLOSE_DELAY_MS
    ));
    out.push_str("<script>\n");
    out.push_str(APPROVAL_SCRIPT);
    out.push_str("</script>\n");
}

fn close_page(out: &mut String, input: &DocumentInput<'_>) {
    let quote = input.quote;
    out.push_str(&format!(
        "<footer>{} · FTC {} · Revisão {}</footer>\n</div>\n",
        escape_html(text_or_dash(Some(&input.company.name))),
        escape_html(&quote.number),
        quote.revision
    ));

    if !input.photos.is_empty() {
        out.push_str(
            "<div id=\"photo-viewer\" class=\"viewer\">\
             <button type=\"button\" class=\"close\" aria-label=\"Fechar\">×</button>\
             <button type=\"button\" class=\"prev\" aria-label=\"Anterior\">‹</button>\
             <img alt=\"\">\
             <button type=\"button\" class=\"next\" aria-label=\"Próxima\">›</button>\
             <div class=\"caption\"></div></div>\n<script>\n",
        );
        out.push_str(GALLERY_SCRIPT);
        out.push_str("</script>\n");
    }

    out.push_str("</body>\n</html>\n");
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        models::{
            budget::BudgetLineItem, settings::CompanyProfile, workflow::QuoteStage,
        },
        services::document::BackendEndpoint,
    };
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use serde_json::json;
    use sqlx::types::Json;
    use std::str::FromStr;
    use uuid::Uuid;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    pub(crate) fn sample_quote() -> Quote {
        let at = Utc.with_ymd_and_hms(2026, 3, 7, 12, 0, 0).unwrap();
        Quote {
            id: Uuid::new_v4(),
            number: "2026-0042".to_string(),
            stage: QuoteStage::AwaitingCommercialBudget,
            revision: 3,
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
            quantity: 2,
            sampling: json!({}),
            execution: json!({}),
            treatments: json!({}),
            special_services: json!({}),
            labor_hours: json!({ "torno_grande": 5, "solda": "sim" }),
            notes: None,
            client_request_number: None,
            internal_order_number: None,
            hours_per_unit: Decimal::ZERO,
            hours_total: Decimal::ZERO,
            material_cost_per_unit: Decimal::ZERO,
            material_cost_total: Decimal::ZERO,
            created_by: None,
            created_at: at,
            updated_at: at,
        }
    }

    fn material(quote_id: Uuid) -> MaterialLine {
        MaterialLine {
            id: Uuid::new_v4(),
            quote_id,
            position: 0,
            description: "Barra SAE 1045".to_string(),
            quantity: "3".to_string(),
            unit: Some("kg".to_string()),
            unit_price: "10.00".to_string(),
            created_at: Utc.with_ymd_and_hms(2026, 3, 7, 12, 0, 0).unwrap(),
        }
    }

    pub(crate) fn sample_budget(quote: &Quote, variable: &str) -> Budget {
        Budget {
            id: Uuid::new_v4(),
            quote_id: quote.id,
            version: 2,
            is_current: true,
            issued_at: None,
            line_items: Json(vec![BudgetLineItem {
                description: quote.part_description.clone(),
                quantity: Decimal::from(2),
                unit_price: dec("800"),
                total: dec("1600"),
            }]),
            material_cost: dec("30"),
            labor_hours: dec("5"),
            hourly_rate: dec("50"),
            labor_cost: dec("250"),
            other_costs: Decimal::ZERO,
            cost_base: dec("280"),
            variable_pct: dec(variable),
            fixed_pct: dec("10"),
            profit_pct: dec("30"),
            sale_price: dec("800"),
            quantity: 2,
            total_price: dec("1600"),
            degenerate: false,
            delivery_days: 30,
            validity_days: 15,
            payment_terms: "28 dias".to_string(),
            warranty_days: 90,
            notes: None,
            created_by: None,
            created_at: Utc.with_ymd_and_hms(2026, 3, 8, 12, 0, 0).unwrap(),
        }
    }

    fn endpoint() -> BackendEndpoint {
        BackendEndpoint {
            base_url: "https://api.oficina.example/".to_string(),
            public_key: "pk_test".to_string(),
        }
    }

    fn render(
        quote: &Quote,
        materials: &[MaterialLine],
        photos: &[ResolvedPhoto],
        budget: Option<&Budget>,
        variant: DocumentVariant,
    ) -> String {
        let company = CompanyProfile {
            name: "Usinagem Teste".to_string(),
            ..Default::default()
        };
        let endpoint = endpoint();
        render_document(&DocumentInput {
            quote,
            materials,
            photos,
            budget,
            company: &company,
            variant,
            endpoint: &endpoint,
        })
    }

    #[test]
    fn renders_totals_and_field_formats() {
        let quote = sample_quote();
        let materials = vec![material(quote.id)];
        let html = render(&quote, &materials, &[], None, DocumentVariant::Client);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("Ficha Técnica de Cotação"));
        assert!(html.contains(">5h<"));
        assert!(html.contains(">✓ SIM<"));
        assert!(html.contains(">0h<"));
        assert!(html.contains(">10h<"));
        assert!(html.contains("R$ 30,00"));
        assert!(html.contains("R$ 60,00"));
        assert!(html.contains("Aguardando Orçamento Comercial"));
    }

    #[test]
    fn empty_record_never_leaks_null_or_undefined() {
        let mut quote = sample_quote();
        quote.labor_hours = Value::Null;
        quote.sampling = Value::Null;
        let html = render(&quote, &[], &[], None, DocumentVariant::Client);

        assert!(!html.contains("null"));
        assert!(!html.contains("undefined"));
        assert!(!html.contains("None"));
        assert!(html.contains(">—<"));
        assert!(html.contains(">0h<"));
    }

    #[test]
    fn optional_sections_are_omitted() {
        let quote = sample_quote();
        let html = render(&quote, &[], &[], None, DocumentVariant::Client);

        assert!(!html.contains("<table class=\"materials\""));
        assert!(!html.contains("Proposta Comercial"));
        assert!(!html.contains("id=\"approval\""));
        assert!(!html.contains("photo-viewer"));
        assert!(html.contains("Nenhuma foto anexada."));
    }

    #[test]
    fn materials_without_prices_are_omitted() {
        let quote = sample_quote();
        let mut unpriced = material(quote.id);
        unpriced.unit_price = "a combinar".to_string();
        let mut no_quantity = material(quote.id);
        no_quantity.quantity = "".to_string();

        let html = render(&quote, &[unpriced.clone(), no_quantity], &[], None, DocumentVariant::Client);
        assert!(!html.contains("<table class=\"materials\""));

        let html = render(&quote, &[unpriced, material(quote.id)], &[], None, DocumentVariant::Client);
        assert!(html.contains("<table class=\"materials\""));
        assert!(html.contains("a combinar"));
    }

    #[test]
    fn gallery_links_wrap_around() {
        let quote = sample_quote();
        let photos: Vec<ResolvedPhoto> = (0..3)
            .map(|i| ResolvedPhoto {
                name: format!("foto-{i}.jpg"),
                url: format!("https://cdn.example/foto-{i}.jpg?sig=a&b=c"),
            })
            .collect();
        let html = render(&quote, &[], &photos, None, DocumentVariant::Client);

        assert!(html.contains("data-index=\"0\" data-prev=\"2\" data-next=\"1\""));
        assert!(html.contains("data-index=\"2\" data-prev=\"1\" data-next=\"0\""));
        assert!(html.contains("foto-1.jpg?sig=a&amp;b=c"));
        assert!(html.contains("id=\"photo-viewer\""));
        assert!(!html.contains("Nenhuma foto anexada."));
        let first = html.find("foto-0.jpg").unwrap();
        let third = html.find("foto-2.jpg").unwrap();
        assert!(first < third);
    }

    #[test]
    fn client_copy_hides_cost_breakdown() {
        let quote = sample_quote();
        let budget = sample_budget(&quote, "25");

        let client = render(&quote, &[], &[], Some(&budget), DocumentVariant::Client);
        assert!(client.contains("Proposta Comercial"));
        assert!(client.contains("R$ 1.600,00"));
        assert!(client.contains("30 dias"));
        assert!(!client.contains("Composição de Custos"));
        assert!(!client.contains("Base de custo"));
        assert!(!client.contains("Fator de markup"));

        let internal = render(&quote, &[], &[], Some(&budget), DocumentVariant::Internal);
        assert!(internal.contains("Composição de Custos"));
        assert!(internal.contains("R$ 280,00"));
        assert!(internal.contains("25,00% = R$ 200,00"));
        assert!(!internal.contains("class=\"warning\""));
    }

    #[test]
    fn internal_copy_warns_on_degenerate_markup() {
        let quote = sample_quote();
        let budget = sample_budget(&quote, "60");
        let html = render(&quote, &[], &[], Some(&budget), DocumentVariant::Internal);
        assert!(html.contains("class=\"warning\""));
        assert!(html.contains("100,00%"));
    }

    #[test]
    fn hostile_text_is_escaped() {
        let mut quote = sample_quote();
        quote.client_name = "<script>alert(\"x\")</script>".to_string();
        quote.notes = Some("linha 1\nlinha 2 & 'fim'".to_string());
        let html = render(&quote, &[], &[], None, DocumentVariant::Client);

        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;"));
        assert!(html.contains("linha 1&#10;linha 2 &amp; &#39;fim&#39;"));
    }

    #[test]
    fn approval_variant_embeds_form_and_config() {
        let quote = sample_quote();
        let budget = sample_budget(&quote, "25");
        let html = render(&quote, &[], &[], Some(&budget), DocumentVariant::Approval);

        assert!(html.contains("id=\"approval\""));
        assert!(html.contains("data-decision=\"approve\""));
        assert!(html.contains("data-decision=\"request_changes\""));
        assert!(html.contains("data-decision=\"reject\""));
        assert_eq!(html.matches("class=\"ack\"").count(), 3);
        assert!(html.contains("apiBase: \"https://api.oficina.example\""));
        assert!(html.contains(&format!("documentId: \"{}\"", budget.id)));
        assert!(html.contains("documentKind: \"budget\""));
        assert!(html.contains("documentVersion: 2"));
        assert!(html.contains("expectedStage: \"awaiting_commercial_budget\""));
        assert!(html.contains("closeDelayMs: 4000"));
        assert!(!html.contains("Composição de Custos"));
    }

    #[test]
    fn approval_config_cannot_break_out_of_script() {
        let quote = sample_quote();
        let company = CompanyProfile::default();
        let endpoint = BackendEndpoint {
            base_url: "https://x\"/</script><script>alert(1)//".to_string(),
            public_key: "k'\n".to_string(),
        };
        let html = render_document(&DocumentInput {
            quote: &quote,
            materials: &[],
            photos: &[],
            budget: None,
            company: &company,
            variant: DocumentVariant::Approval,
            endpoint: &endpoint,
        });

        assert!(!html.contains("</script><script>alert(1)"));
        assert!(html.contains("documentKind: \"quote\""));
        assert!(html.contains("documentVersion: 3"));
        assert!(html.contains("apiKey: \"k\\'\\n\""));
    }

    #[test]
    fn rendering_is_deterministic() {
        let quote = sample_quote();
        let materials = vec![material(quote.id)];
        let a = render(&quote, &materials, &[], None, DocumentVariant::Approval);
        let b = render(&quote, &materials, &[], None, DocumentVariant::Approval);
        assert_eq!(a, b);
    }
}
