//! Server configuration from the environment

use crate::engine::DEFAULT_MAX_INTERACTION_AGE;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub port: u16,
    /// Expected `X-Bot-Api-Secret-Token`; unchecked when unset
    pub secret_token: Option<String>,
    pub max_interaction_age: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let db_path = get("DISCOVERY_DB_PATH")
            .filter(|p| !p.is_empty())
            .map_or_else(
                || {
                    let home = get("HOME").unwrap_or_else(|| "/tmp".to_string());
                    PathBuf::from(home).join(".infinite-buttons").join("discovery.db")
                },
                PathBuf::from,
            );

        Self {
            db_path,
            port: get("DISCOVERY_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            secret_token: get("BOT_SECRET_TOKEN").filter(|t| !t.is_empty()),
            max_interaction_age: get("MAX_INTERACTION_AGE_SECS")
                .and_then(|s| s.parse().ok())
                .map_or(DEFAULT_MAX_INTERACTION_AGE, Duration::from_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[("HOME", "/home/player")]);
        assert_eq!(
            config.db_path,
            PathBuf::from("/home/player/.infinite-buttons/discovery.db")
        );
        assert_eq!(config.port, 8000);
        assert_eq!(config.secret_token, None);
        assert_eq!(config.max_interaction_age, Duration::from_secs(604_800));
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("DISCOVERY_DB_PATH", "/data/d.db"),
            ("DISCOVERY_PORT", "9090"),
            ("BOT_SECRET_TOKEN", "s3cret"),
            ("MAX_INTERACTION_AGE_SECS", "60"),
        ]);
        assert_eq!(config.db_path, PathBuf::from("/data/d.db"));
        assert_eq!(config.port, 9090);
        assert_eq!(config.secret_token.as_deref(), Some("s3cret"));
        assert_eq!(config.max_interaction_age, Duration::from_secs(60));
    }

    #[test]
    fn test_bad_values_fall_back() {
        let config = config(&[
            ("DISCOVERY_PORT", "eighty"),
            ("BOT_SECRET_TOKEN", ""),
            ("MAX_INTERACTION_AGE_SECS", "-1"),
        ]);
        assert_eq!(config.port, 8000);
        assert_eq!(config.secret_token, None);
        assert_eq!(config.max_interaction_age, DEFAULT_MAX_INTERACTION_AGE);
        assert!(config.db_path.starts_with("/tmp"));
    }
}
