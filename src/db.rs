pub mod quote_repo;
pub use quote_repo::QuoteRepository;
pub mod budget_repo;
pub use budget_repo::BudgetRepository;
pub mod approval_repo;
pub use approval_repo::ApprovalRepository;
pub mod client_repo;
pub use client_repo::ClientRepository;
pub mod tracking_repo;
pub use tracking_repo::TrackingRepository;

/// As consultas montam o SELECT a partir das listas de colunas de cada
/// repositório. Confere que a lista bate com os campos da struct lida via
/// `FromRow` (serializada em camelCase).
#[cfg(test)]
pub(crate) fn assert_columns_match<T: serde::Serialize>(columns: &str, row: &T) {
    use std::collections::BTreeSet;

    let listed: BTreeSet<String> = columns
        .split(',')
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .collect();

    let value = serde_json::to_value(row).unwrap();
    let fields: BTreeSet<String> = value
        .as_object()
        .unwrap()
        .keys()
        .map(|key| {
            key.chars().fold(String::new(), |mut acc, c| {
                if c.is_ascii_uppercase() {
                    acc.push('_');
                    acc.push(c.to_ascii_lowercase());
                } else {
                    acc.push(c);
                }
                acc
            })
        })
        .collect();

    assert_eq!(listed, fields);
}
