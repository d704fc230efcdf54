use std::{fmt::Display, str::FromStr};

use once_cell::sync::Lazy;

use crate::error::Error;

pub const DEFAULT_HIGH_QUANTITY_THRESHOLD: i64 = 75;
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

pub const ENV_HIGH_QUANTITY_THRESHOLD: &str = "TRADENET_HIGH_QUANTITY_THRESHOLD";
pub const ENV_EVENT_CAPACITY: &str = "TRADENET_EVENT_CAPACITY";

/// Process-wide configuration, read once from the environment.
/// A malformed variable is a deployment error and aborts start-up.
pub static NETWORK_CONFIG: Lazy<NetworkConfig> = Lazy::new(|| match NetworkConfig::from_env() {
    Ok(config) => config,
    Err(err) => panic!("{}", err),
});

#[derive(Debug, Clone, PartialEq)]
pub struct NetworkConfig {
    /// Assets with `quantity >= high_quantity_threshold` are picked up by
    /// the high-quantity removal queries.
    pub high_quantity_threshold: i64,
    /// Buffer size of the event broadcast channel. Slow subscribers lag
    /// behind once it fills up.
    ///
    /// A bulk removal delivers one event per matched asset in a single
    /// burst. When more assets match than this capacity, a subscriber that
    /// is not reading concurrently gets `RecvError::Lagged` and misses the
    /// oldest notifications. Raise it for networks with large holdings.
    pub event_capacity: usize,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            high_quantity_threshold: DEFAULT_HIGH_QUANTITY_THRESHOLD,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl NetworkConfig {
    pub fn from_env() -> Result<Self, Error> {
        let config = Self {
            high_quantity_threshold: env_or(
                ENV_HIGH_QUANTITY_THRESHOLD,
                DEFAULT_HIGH_QUANTITY_THRESHOLD,
            )?,
            event_capacity: env_or(ENV_EVENT_CAPACITY, DEFAULT_EVENT_CAPACITY)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_high_quantity_threshold(mut self, threshold: i64) -> Self {
        self.high_quantity_threshold = threshold;
        self
    }

    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.event_capacity == 0 {
            return Err(Error::Config(
                "event capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn env_or<T>(key: &str, default: T) -> Result<T, Error>
where
    T: FromStr,
    T::Err: Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|err| Error::Config(format!("{}={:?}: {}", key, raw, err))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = NetworkConfig::default();
        assert_eq!(config.high_quantity_threshold, 75);
        assert_eq!(config.event_capacity, 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builders() {
        let config = NetworkConfig::default()
            .with_high_quantity_threshold(60)
            .with_event_capacity(8);
        assert_eq!(config.high_quantity_threshold, 60);
        assert_eq!(config.event_capacity, 8);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = NetworkConfig::default().with_event_capacity(0);
        assert!(matches!(config.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_env_or_parses_and_rejects() {
        // Keys are unique to this test so parallel tests never observe them.
        unsafe {
            std::env::set_var("TRADENET_TEST_ENV_OR_OK", " 60 ");
            std::env::set_var("TRADENET_TEST_ENV_OR_BAD", "lots");
        }
        assert_eq!(env_or::<i64>("TRADENET_TEST_ENV_OR_OK", 75).unwrap(), 60);
        assert_eq!(env_or::<i64>("TRADENET_TEST_ENV_OR_MISSING", 75).unwrap(), 75);
        assert!(matches!(
            env_or::<i64>("TRADENET_TEST_ENV_OR_BAD", 75),
            Err(Error::Config(_))
        ));
    }
}
