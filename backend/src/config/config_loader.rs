use std::str::FromStr;

use anyhow::{Context, Result};

use crate::config::{
    config_model::{BackendServer, Database, DotEnvyConfig, OrderSettings, UserSecret},
    stage::Stage,
};

pub const DEFAULT_ACCEPT_WINDOW_SECS: i64 = 300;

pub fn load() -> Result<DotEnvyConfig> {
    dotenvy::dotenv().ok();

    let backend_server = BackendServer {
        port: required_parsed("SERVER_PORT_BACKEND")?,
        body_limit: required_parsed("SERVER_BODY_LIMIT")?,
        timeout: required_parsed("SERVER_TIMEOUT")?,
    };

    let database = Database {
        url: required("DATABASE_URL")?,
    };

    let orders = OrderSettings {
        accept_window_secs: optional_parsed(
            "ORDER_ACCEPT_WINDOW_SECS",
            DEFAULT_ACCEPT_WINDOW_SECS,
        )?,
    };

    Ok(DotEnvyConfig {
        backend_server,
        database,
        orders,
        stage: get_stage(),
    })
}

pub fn get_stage() -> Stage {
    dotenvy::dotenv().ok();

    let stage_str = std::env::var("STAGE").unwrap_or_default();
    Stage::try_from(&stage_str).unwrap_or_default()
}

pub fn get_user_secret() -> Result<UserSecret> {
    dotenvy::dotenv().ok();

    Ok(UserSecret {
        secret: required("JWT_USER_SECRET")?,
    })
}

fn required(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("{key} is invalid"))
}

fn required_parsed<T>(key: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    required(key)?
        .trim()
        .parse::<T>()
        .with_context(|| format!("{key} is invalid"))
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
