use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use tracing::info;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: usize,
    pub cors_permissive: bool,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        Ok(Self {
            db_path: setting(&lookup, "SHUTTER_DB_PATH", PathBuf::from("shutter.db"))?,
            host: setting(&lookup, "SHUTTER_HOST", "0.0.0.0".to_string())?,
            port: setting(&lookup, "SHUTTER_PORT", 3000)?,
            max_upload_bytes: setting(&lookup, "SHUTTER_MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            cors_permissive: setting(&lookup, "SHUTTER_CORS_PERMISSIVE", true)?,
        })
    }

    pub fn addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }
}

fn setting<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr + std::fmt::Debug,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        None => {
            info!("{} not set, using {:?}", key, default);
            Ok(default)
        }
    }
}
