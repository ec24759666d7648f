use std::collections::HashMap;
use thiserror::Error;

/// Runtime configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: String,
    pub alert_thresholds: AlertThresholds,
}

/// Day thresholds for the alert engine. Caller-supplied input, not owned
/// state; requests may override these per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertThresholds {
    pub delivery_alert_days: i64,
    pub payment_alert_days: i64,
    pub birthday_alert_days: i64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        AlertThresholds {
            delivery_alert_days: 3,
            payment_alert_days: 7,
            birthday_alert_days: 7,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnv(String),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let port = env_map
            .get("PORT")
            .map(|s| s.as_str())
            .unwrap_or("8080")
            .parse::<u16>()
            .map_err(|_| {
                ConfigError::InvalidValue("PORT".to_string(), "must be a valid u16".to_string())
            })?;

        let database_path = env_map
            .get("DATABASE_PATH")
            .cloned()
            .ok_or_else(|| ConfigError::MissingEnv("DATABASE_PATH".to_string()))?;

        let defaults = AlertThresholds::default();
        let alert_thresholds = AlertThresholds {
            delivery_alert_days: parse_days(
                &env_map,
                "DELIVERY_ALERT_DAYS",
                defaults.delivery_alert_days,
            )?,
            payment_alert_days: parse_days(
                &env_map,
                "PAYMENT_ALERT_DAYS",
                defaults.payment_alert_days,
            )?,
            birthday_alert_days: parse_days(
                &env_map,
                "BIRTHDAY_ALERT_DAYS",
                defaults.birthday_alert_days,
            )?,
        };

        Ok(Config {
            port,
            database_path,
            alert_thresholds,
        })
    }
}

fn parse_days(
    env_map: &HashMap<String, String>,
    key: &str,
    default: i64,
) -> Result<i64, ConfigError> {
    match env_map.get(key) {
        None => Ok(default),
        Some(raw) => raw.parse::<i64>().ok().filter(|d| *d >= 0).ok_or_else(|| {
            ConfigError::InvalidValue(key.to_string(), "must be a non-negative integer".to_string())
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_required_env() -> HashMap<String, String> {
        let mut map = HashMap::new();
        map.insert("DATABASE_PATH".to_string(), "/tmp/debtbook.db".to_string());
        map
    }

    #[test]
    fn test_missing_database_path() {
        let result = Config::from_env_map(HashMap::new());
        match result {
            Err(ConfigError::MissingEnv(s)) => assert_eq!(s, "DATABASE_PATH"),
            _ => panic!("Expected MissingEnv error"),
        }
    }

    #[test]
    fn test_threshold_defaults() {
        let config = Config::from_env_map(setup_required_env()).unwrap();
        assert_eq!(config.alert_thresholds, AlertThresholds::default());
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_threshold_overrides() {
        let mut env_map = setup_required_env();
        env_map.insert("DELIVERY_ALERT_DAYS".to_string(), "5".to_string());
        env_map.insert("PAYMENT_ALERT_DAYS".to_string(), "14".to_string());
        let config = Config::from_env_map(env_map).unwrap();
        assert_eq!(config.alert_thresholds.delivery_alert_days, 5);
        assert_eq!(config.alert_thresholds.payment_alert_days, 14);
        assert_eq!(config.alert_thresholds.birthday_alert_days, 7);
    }

    #[test]
    fn test_negative_threshold_rejected() {
        let mut env_map = setup_required_env();
        env_map.insert("BIRTHDAY_ALERT_DAYS".to_string(), "-1".to_string());
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "BIRTHDAY_ALERT_DAYS"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_port() {
        let mut env_map = setup_required_env();
        env_map.insert("PORT".to_string(), "not_a_number".to_string());
        let result = Config::from_env_map(env_map);
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "PORT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }
}
