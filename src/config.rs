//! Runtime configuration, read from `SERVICEX_*` environment variables.

use std::path::PathBuf;

use secrecy::SecretString;

use crate::error::ConfigError;

pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_DB_PATH: &str = "./data/servicex.db";

/// Where finalized leads are written.
#[derive(Debug, Clone)]
pub enum SinkConfig {
    /// The local content store's `contacts` table.
    Store,
    /// A hosted backend's REST endpoint.
    Rest { url: String, api_key: SecretString },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_port: u16,
    pub db_path: PathBuf,
    pub sink: SinkConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let http_port = match get("SERVICEX_HTTP_PORT") {
            Some(raw) => raw.trim().parse().map_err(|e| ConfigError::InvalidValue {
                key: "SERVICEX_HTTP_PORT".into(),
                message: format!("{e}"),
            })?,
            None => DEFAULT_HTTP_PORT,
        };

        let db_path = get("SERVICEX_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));

        let sink = match get("SERVICEX_LEAD_SINK").as_deref().map(str::trim) {
            None | Some("store") => SinkConfig::Store,
            Some("rest") => {
                let url = get("SERVICEX_BACKEND_URL").ok_or_else(|| ConfigError::MissingRequired {
                    key: "SERVICEX_BACKEND_URL".into(),
                    hint: "Set the hosted backend URL when SERVICEX_LEAD_SINK=rest".into(),
                })?;
                let key = get("SERVICEX_BACKEND_KEY").ok_or_else(|| ConfigError::MissingRequired {
                    key: "SERVICEX_BACKEND_KEY".into(),
                    hint: "Set the backend API key when SERVICEX_LEAD_SINK=rest".into(),
                })?;
                SinkConfig::Rest {
                    url,
                    api_key: SecretString::from(key),
                }
            }
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "SERVICEX_LEAD_SINK".into(),
                    message: format!("expected `store` or `rest`, got `{other}`"),
                });
            }
        };

        Ok(Self {
            http_port,
            db_path,
            sink,
        })
    }
}
