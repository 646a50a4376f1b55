use crate::config::*;
use crate::error::{Error, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    pub catalog: Catalog,
    pub derivation: DerivationConfig,
    pub ledger: LedgerConfig,
    pub schedule: ScheduleConfig,
    pub state: StateConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl AppConfig {
    /// Defaults, then `config/default`, then `config/{env}`, then
    /// `PRICE_RELAY__*` environment variables.
    pub fn load(env: &str) -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self::with_defaults()
            .map_err(|e| Error::ConfigError(e.to_string()))?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("PRICE_RELAY")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("ledger.endpoints"),
            )
            .build()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        Self::finish(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config = Self::with_defaults()
            .map_err(|e| Error::ConfigError(e.to_string()))?
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        Self::finish(config)
    }

    fn with_defaults() -> std::result::Result<ConfigBuilder<DefaultState>, config::ConfigError> {
        let schedule = ScheduleConfig::default();

        Config::builder()
            .set_default("derivation.scale", crate::types::price::LedgerPrice::DEFAULT_SCALE)?
            .set_default("ledger.endpoints", Vec::<String>::new())?
            .set_default("ledger.expire_seconds", 15)?
            .set_default("ledger.blocks_behind", 3)?
            .set_default("ledger.attempt_timeout_secs", 20)?
            .set_default("ledger.update.name", "update")?
            .set_default("ledger.update.permission", "oracle")?
            .set_default("ledger.update.price_field", "eos_price")?
            .set_default("ledger.follow_up.name", "run")?
            .set_default("ledger.follow_up.permission", "active")?
            .set_default("schedule.period_secs", schedule.period_secs)?
            .set_default("schedule.cycle_deadline_secs", schedule.cycle_deadline_secs)?
            .set_default("schedule.fetch_timeout_secs", schedule.fetch_timeout_secs)?
            .set_default("state.checkpoint_path", "data/last_update.txt")?
            .set_default("logging.json", false)
    }

    fn finish(config: Config) -> Result<Self> {
        let app_config: AppConfig = config
            .try_deserialize()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        app_config.validate()?;
        Ok(app_config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.ledger.endpoints.is_empty() {
            return Err(Error::NoEndpoints);
        }
        if self.derivation.routes.is_empty() || self.derivation.routes.iter().any(|r| r.is_empty()) {
            return Err(Error::ConfigError(
                "derivation.routes must contain at least one non-empty route".to_string(),
            ));
        }
        for quote in self.derivation.referenced_quotes() {
            match self.catalog.get(quote) {
                Some(providers) if !providers.is_empty() => {}
                _ => {
                    return Err(Error::ConfigError(format!(
                        "quote {} is used by a route but has no providers",
                        quote
                    )))
                }
            }
        }
        if self.derivation.scale == 0 {
            return Err(Error::ConfigError("derivation.scale must be positive".to_string()));
        }
        if self.schedule.period_secs == 0 {
            return Err(Error::ConfigError("schedule.period_secs must be positive".to_string()));
        }
        if self.schedule.cycle_deadline_secs == 0 {
            return Err(Error::ConfigError(
                "schedule.cycle_deadline_secs must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// One-line digest for the startup log.
    pub fn digest(&self) -> String {
        format!(
            "quotes={:?} routes={:?} endpoints={} period={}s deadline={}s",
            self.catalog.keys().collect::<Vec<_>>(),
            self.derivation.routes,
            self.ledger.endpoints.len(),
            self.schedule.period_secs,
            self.schedule.cycle_deadline_secs,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
        [catalog]
        btc_usd = [
            { url = "https://a.example/btc", path = "price" },
            { url = "https://b.example/btc", path = "data/amount" },
        ]
        eos_btc = [{ url = "https://a.example/eosbtc", path = "price" }]
        eos_usd = [{ url = "https://a.example/eosusd", path = "0/last" }]

        [derivation]
        routes = [["btc_usd", "eos_btc"], ["eos_usd"]]

        [ledger]
        endpoints = ["https://rpc-1.example", "https://rpc-2.example"]
        contract = "buckprotocol"

        [ledger.update]
        actor = "buckprotocol"

        [ledger.follow_up]
        actor = "scrugeoracle"
    "#;

    #[test]
    fn test_minimal_config_fills_defaults() {
        let config = AppConfig::from_toml_str(MINIMAL).unwrap();

        assert_eq!(config.catalog["btc_usd"].len(), 2);
        assert_eq!(config.catalog["btc_usd"][1].path, "data/amount");
        assert_eq!(config.derivation.scale, 100);
        assert_eq!(config.ledger.endpoints[0], Endpoint::new("https://rpc-1.example"));
        assert_eq!(config.ledger.expire_seconds, 15);
        assert_eq!(config.ledger.update.name, "update");
        assert_eq!(config.ledger.update.permission, "oracle");
        assert_eq!(config.ledger.update.price_field, "eos_price");
        assert_eq!(config.ledger.follow_up.name, "run");
        assert_eq!(config.ledger.follow_up.data, serde_json::json!({ "max": 50 }));
        assert_eq!(config.schedule.period_secs, 300);
        assert!(!config.logging.json);
        assert!(config.metrics.listen.is_none());
    }

    #[test]
    fn test_route_with_unknown_quote_is_rejected() {
        let contents = MINIMAL.replace(r#"["eos_usd"]]"#, r#"["eos_eur"]]"#);
        let err = AppConfig::from_toml_str(&contents).unwrap_err();
        assert!(matches!(err, Error::ConfigError(msg) if msg.contains("eos_eur")));
    }

    #[test]
    fn test_no_endpoints_is_rejected() {
        let contents = MINIMAL.replace(
            r#"endpoints = ["https://rpc-1.example", "https://rpc-2.example"]"#,
            "endpoints = []",
        );
        assert!(matches!(
            AppConfig::from_toml_str(&contents),
            Err(Error::NoEndpoints)
        ));
    }
}
