//! Service configuration: serialized defaults, then `cardioguard.toml`,
//! then `CARDIOGUARD_`-prefixed environment variables.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::registry::ModelRegistry;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Directory holding the classifier artifacts (and optional manifest)
    pub models_dir: String,
    /// Bind address for the HTTP server
    pub bind: String,
    /// Model used by the single-endpoint API and bulk scoring
    pub designated_model: String,
    /// Consensus vote-count threshold for the panel verdict
    pub consensus_threshold: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            models_dir: "models".to_string(),
            bind: "0.0.0.0:8080".to_string(),
            designated_model: "Logistic Regression".to_string(),
            consensus_threshold: 2,
        }
    }
}

pub fn load_config() -> Result<AppConfig, figment::Error> {
    let figment = Figment::from(Serialized::defaults(AppConfig::default()))
        .merge(Toml::file("cardioguard.toml"))
        .merge(Env::prefixed("CARDIOGUARD_"));

    let config: AppConfig = figment.extract()?;

    if !ModelRegistry::names().any(|n| n == config.designated_model) {
        return Err(figment::Error::from(format!(
            "designated_model '{}' is not in the fixed model set",
            config.designated_model
        )));
    }
    if config.consensus_threshold == 0 {
        return Err(figment::Error::from(
            "consensus_threshold must be at least 1".to_string(),
        ));
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_historical_dashboard() {
        let config = AppConfig::default();
        assert_eq!(config.designated_model, "Logistic Regression");
        assert_eq!(config.consensus_threshold, 2);
    }
}
