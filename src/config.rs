use std::{env, path::PathBuf};
use tracing::warn;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DATA_PATH: &str = "data/state.json";
const DEFAULT_BCRYPT_COST: u32 = 10;
const DEFAULT_SESSION_TTL_HOURS: i64 = 24 * 30;
const MIN_BCRYPT_COST: u32 = 4;
const MAX_BCRYPT_COST: u32 = 31;
const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    pub data_path: PathBuf,
    pub bcrypt_cost: u32,
    pub session_ttl_hours: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            bcrypt_cost: DEFAULT_BCRYPT_COST,
            session_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from any key lookup; unparseable values keep their
    /// defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let data_path = lookup("APP_DATA_PATH")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.data_path);

        Self {
            port: parse_or("PORT", &lookup, defaults.port),
            data_path,
            bcrypt_cost: parse_or("APP_BCRYPT_COST", &lookup, defaults.bcrypt_cost)
                .clamp(MIN_BCRYPT_COST, MAX_BCRYPT_COST),
            session_ttl_hours: parse_or("APP_SESSION_TTL_HOURS", &lookup, defaults.session_ttl_hours)
                .clamp(1, MAX_SESSION_TTL_HOURS),
        }
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours)
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, lookup: &impl Fn(&str) -> Option<String>, default: T) -> T {
    match lookup(key) {
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!("ignoring invalid {key}={raw:?}");
                default
            }
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        assert_eq!(config(&[]), Config::default());
    }

    #[test]
    fn reads_overrides() {
        let config = config(&[
            ("PORT", "9000"),
            ("APP_DATA_PATH", "/tmp/stats.json"),
            ("APP_BCRYPT_COST", "4"),
            ("APP_SESSION_TTL_HOURS", "2"),
        ]);
        assert_eq!(config.port, 9000);
        assert_eq!(config.data_path, PathBuf::from("/tmp/stats.json"));
        assert_eq!(config.bcrypt_cost, 4);
        assert_eq!(config.session_ttl(), chrono::Duration::hours(2));
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = config(&[("PORT", "eighty"), ("APP_BCRYPT_COST", "1"), ("APP_DATA_PATH", " ")]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.bcrypt_cost, 4);
        assert_eq!(config.data_path, PathBuf::from("data/state.json"));
    }
}
