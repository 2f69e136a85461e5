pub mod proxy_handlers;
pub mod proxy_models;
