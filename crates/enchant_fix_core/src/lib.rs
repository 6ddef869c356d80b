pub mod core_api;
pub mod language;
pub mod record;
