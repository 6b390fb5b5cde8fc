use std::str::FromStr;

use anyhow::{Context, Result};

use super::config_model::{Database, DotEnvyConfig, Housekeeping, WorkerServer};

pub const DEFAULT_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_BATCH_SIZE: i64 = 100;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let worker_server = WorkerServer {
        port: required("SERVER_PORT_WORKER")?
            .parse()
            .context("SERVER_PORT_WORKER is invalid")?,
        body_limit: optional_parsed("SERVER_BODY_LIMIT", 1)?,
        timeout: optional_parsed("SERVER_TIMEOUT", 30)?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
    };

    let housekeeping = Housekeeping {
        interval_secs: optional_parsed("HOUSEKEEPING_INTERVAL_SECS", DEFAULT_INTERVAL_SECS)?
            .max(1),
        batch_size: optional_parsed("HOUSEKEEPING_BATCH_SIZE", DEFAULT_BATCH_SIZE)?.max(1),
    };

    Ok(DotEnvyConfig {
        worker_server,
        database,
        housekeeping,
    })
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} is invalid"))
}

fn optional_parsed<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} is invalid")),
        _ => Ok(default),
    }
}
