pub mod export_service;
pub mod fetch_service;
pub mod history_service;
