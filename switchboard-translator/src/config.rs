//! Translator configuration

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    /// Cadence of the channel-variable poll fallback, used against
    /// backends that cannot push completion events
    pub poll_interval: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            poll_interval: Duration::from_millis(env_parse(
                "SWITCHBOARD_POLL_INTERVAL_MS",
                500,
            )?),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(500),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> anyhow::Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid {key} '{value}': {e}")),
        Err(_) => Ok(default),
    }
}
