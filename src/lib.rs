pub mod api;
pub mod config;
pub mod core;
pub mod error;
pub mod interfaces;
pub mod observability;
pub mod persistence;
pub mod price_infra;
pub mod relay;
pub mod types;
pub mod utils;

// Environment selecting `config/{env}` on top of `config/default`
pub const ENV_VAR: &str = "PRICE_RELAY_ENV";
pub const DEFAULT_ENV: &str = "production";
