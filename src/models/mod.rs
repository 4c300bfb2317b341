pub mod alert;
pub mod api_config;
