pub mod cors;
pub mod i18n;
pub mod public_key;
