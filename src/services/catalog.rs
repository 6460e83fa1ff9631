// src/services/catalog.rs

//! Catálogo fixo dos campos da ficha.
//!
//! Os grupos flexíveis (amostragem, execução, tratamentos, serviços especiais e
//! horas por centro de trabalho) são gravados como mapas JSON; a ordem e os
//! rótulos de exibição vêm daqui, sempre na mesma sequência.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    TriState,
    Hours,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub key: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldGroup {
    pub title: &'static str,
    pub fields: &'static [FieldSpec],
}

const fn text(key: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec { key, label, kind: FieldKind::Text }
}

const fn tri(key: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec { key, label, kind: FieldKind::TriState }
}

const fn hours(key: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec { key, label, kind: FieldKind::Hours }
}

pub const SAMPLING_FIELDS: &[FieldSpec] = &[
    tri("possui_amostra", "Possui amostra"),
    tri("devolver_amostra", "Devolver amostra"),
    tri("desenho_fornecido", "Desenho fornecido"),
    tri("modelo_3d", "Modelo 3D fornecido"),
    text("observacao_amostra", "Observações da amostra"),
];

pub const EXECUTION_FIELDS: &[FieldSpec] = &[
    text("tipo_servico", "Tipo de serviço"),
    tri("execucao_em_campo", "Execução em campo"),
    tri("material_do_cliente", "Material fornecido pelo cliente"),
    tri("urgente", "Urgente"),
    text("prazo_desejado", "Prazo desejado"),
];

pub const TREATMENT_FIELDS: &[FieldSpec] = &[
    tri("tratamento_termico", "Tratamento térmico"),
    tri("tempera", "Têmpera"),
    tri("cementacao", "Cementação"),
    tri("nitretacao", "Nitretação"),
    tri("zincagem", "Zincagem"),
    tri("cromo_duro", "Cromo duro"),
    tri("oxidacao_negra", "Oxidação negra"),
    tri("pintura", "Pintura"),
];

pub const SPECIAL_SERVICE_FIELDS: &[FieldSpec] = &[
    tri("balanceamento", "Balanceamento"),
    tri("liquido_penetrante", "Ensaio por líquido penetrante"),
    tri("ultrassom", "Ensaio por ultrassom"),
    tri("certificado_material", "Certificado de material"),
    tri("relatorio_dimensional", "Relatório dimensional"),
    text("terceirizacao", "Serviço terceirizado"),
];

// Algumas destas chaves guardavam SIM/NÃO antes de virarem horas;
// a renderização aceita as duas formas.
pub const WORK_CENTER_GROUPS: &[FieldGroup] = &[
    FieldGroup {
        title: "Tornearia",
        fields: &[
            hours("torno_grande", "Torno grande"),
            hours("torno_medio", "Torno médio"),
            hours("torno_pequeno", "Torno pequeno"),
            hours("torno_cnc", "Torno CNC"),
        ],
    },
    FieldGroup {
        title: "Fresagem e Usinagem",
        fields: &[
            hours("fresadora", "Fresadora"),
            hours("centro_usinagem", "Centro de usinagem"),
            hours("mandrilhadora", "Mandrilhadora"),
            hours("plaina", "Plaina"),
            hours("furadeira_radial", "Furadeira radial"),
        ],
    },
    FieldGroup {
        title: "Caldeiraria e Solda",
        fields: &[
            hours("corte", "Corte (serra/plasma)"),
            hours("dobra_calandra", "Dobra / Calandra"),
            hours("solda", "Solda"),
            hours("caldeiraria", "Caldeiraria"),
        ],
    },
    FieldGroup {
        title: "Acabamento e Montagem",
        fields: &[
            hours("retifica", "Retífica"),
            hours("ajustagem", "Ajustagem"),
            hours("montagem", "Montagem"),
        ],
    },
    FieldGroup {
        title: "Engenharia",
        fields: &[
            hours("projeto", "Projeto / Desenho"),
            hours("programacao_cnc", "Programação CNC"),
            hours("inspecao", "Inspeção"),
        ],
    },
];

/// Todas as chaves de horas, na ordem de exibição.
pub fn work_center_keys() -> impl Iterator<Item = &'static str> {
    WORK_CENTER_GROUPS
        .iter()
        .flat_map(|group| group.fields.iter().map(|f| f.key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn work_center_keys_are_unique() {
        let keys: Vec<_> = work_center_keys().collect();
        let unique: HashSet<_> = keys.iter().collect();
        assert_eq!(keys.len(), unique.len());
        assert!(keys.contains(&"torno_grande"));
    }

    #[test]
    fn labor_groups_only_hold_hour_fields() {
        for group in WORK_CENTER_GROUPS {
            assert!(group.fields.iter().all(|f| f.kind == FieldKind::Hours));
        }
    }
}
