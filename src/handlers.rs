// src/handlers.rs

pub mod approvals;
pub mod budgets;
pub mod clients;
pub mod documents;
pub mod files;
pub mod quotes;
pub mod tracking;
