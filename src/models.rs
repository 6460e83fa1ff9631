pub mod approval;
pub mod budget;
pub mod client;
pub mod dispatch;
pub mod quote;
pub mod settings;
pub mod tracking;
pub mod workflow;
