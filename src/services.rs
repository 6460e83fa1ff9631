pub mod approval_service;
pub mod budget_service;
pub mod catalog;
pub mod client_service;
pub mod dispatch_service;
pub mod document;
pub mod messaging;
pub mod pricing;
pub mod quote_service;
pub mod storage;
pub mod totals;
pub mod tracking_service;
pub mod workflow;
