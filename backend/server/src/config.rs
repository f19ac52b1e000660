use std::{env, fmt::Display, str::FromStr};

use store::{StateDir, allow_init_from_env};
use tracing::{info, warn};

use crate::error::AppError;

pub struct Config {
    pub port: u16,
    pub host: String,
    pub state_dir: StateDir,
    pub allow_init: bool,
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        Ok(Self {
            port: try_load("PORT", "5000")?,
            host: try_load("HOST", "0.0.0.0")?,
            state_dir: StateDir::from_env()?,
            allow_init: allow_init_from_env(),
        })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn try_load<T: FromStr>(key: &'static str, default: &str) -> Result<T, AppError>
where
    T::Err: Display,
{
    let raw = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.trim().parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value: {e}");
        AppError::Config {
            key,
            reason: e.to_string(),
        }
    })
}
