//! Process configuration read from the environment.
//!
//! | Variable                | Default       | Meaning                                  |
//! |-------------------------|---------------|------------------------------------------|
//! | `CART_EXPIRY_MS`        | `300000`      | Cart and mirror-context time-to-live     |
//! | `CART_MAILBOX_CAPACITY` | `32`          | Bounded mailbox size of the cart actor   |
//! | `CART_ENV`              | `development` | Free-form environment label for the logs |

use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_CART_EXPIRY_MS: u64 = 300_000;
pub const DEFAULT_MAILBOX_CAPACITY: usize = 32;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: '{value}'")]
    InvalidValue { var: &'static str, value: String },

    #[error("Cart TTL must be positive and representable, got {0:?}")]
    InvalidTtl(Duration),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Used identically by the cart factory and the context mirror.
    pub cart_expiry: Duration,
    pub mailbox_capacity: usize,
    pub environment: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cart_expiry: Duration::from_millis(DEFAULT_CART_EXPIRY_MS),
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
            environment: "development".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup; unset keys fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let cart_expiry = match lookup("CART_EXPIRY_MS") {
            Some(raw) => {
                let ms = parse_positive::<u64>("CART_EXPIRY_MS", &raw)?;
                Duration::from_millis(ms)
            }
            None => defaults.cart_expiry,
        };

        let mailbox_capacity = match lookup("CART_MAILBOX_CAPACITY") {
            Some(raw) => parse_positive::<usize>("CART_MAILBOX_CAPACITY", &raw)?,
            None => defaults.mailbox_capacity,
        };

        let environment = lookup("CART_ENV").unwrap_or(defaults.environment);

        Ok(Self {
            cart_expiry,
            mailbox_capacity,
            environment,
        })
    }
}

fn parse_positive<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match raw.trim().parse::<T>() {
        Ok(value) if value > T::default() => Ok(value),
        _ => Err(ConfigError::InvalidValue {
            var,
            value: raw.to_string(),
        }),
    }
}
