//! Environment-driven configuration for the host loop.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

const DEFAULT_TICK_INTERVAL_MS: u64 = 100;
const DEFAULT_TICK_COUNT: u64 = 10;

#[derive(Clone, Debug)]
pub struct Config {
    /// Time between two flushes of the hub.
    pub tick_interval: Duration,
    /// Number of ticks to run; 0 runs until Ctrl+C.
    pub tick_count: u64,
    pub logs_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(DEFAULT_TICK_INTERVAL_MS),
            tick_count: DEFAULT_TICK_COUNT,
            logs_path: PathBuf::from("logs"),
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overrides defaults with `TICK_INTERVAL_MS`, `TICK_COUNT` and `LOGS_PATH`.
    pub fn load(&mut self) -> Result<(), AppError> {
        if let Some(ms) = parse_var::<u64>("TICK_INTERVAL_MS")? {
            if ms == 0 {
                return Err(AppError::InvalidConfig {
                    key: "TICK_INTERVAL_MS".to_string(),
                    value: ms.to_string(),
                });
            }
            self.tick_interval = Duration::from_millis(ms);
        }
        if let Some(count) = parse_var::<u64>("TICK_COUNT")? {
            self.tick_count = count;
        }
        if let Ok(path) = std::env::var("LOGS_PATH") {
            self.logs_path = PathBuf::from(path);
        }
        Ok(())
    }
}

fn parse_var<T: FromStr>(key: &str) -> Result<Option<T>, AppError> {
    match std::env::var(key) {
        Ok(value) => parse_value(key, &value).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, AppError> {
    value.trim().parse::<T>().map_err(|_| AppError::InvalidConfig {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_value_accepts_padded_number() {
        let parsed: u64 = parse_value("TICK_COUNT", " 42 ").unwrap();
        assert_eq!(parsed, 42);
    }

    #[test]
    fn test_parse_value_rejects_garbage() {
        let result = parse_value::<u64>("TICK_INTERVAL_MS", "fast");
        match result.unwrap_err() {
            AppError::InvalidConfig { key, value } => {
                assert_eq!(key, "TICK_INTERVAL_MS");
                assert_eq!(value, "fast");
            }
            _ => panic!("Expected InvalidConfig error"),
        }
    }
}
