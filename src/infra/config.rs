use serde::Deserialize;

use crate::core::error::GatewayError;
use crate::infra::runtime::limits::DEFAULT_TIMEOUT_MS;

pub const DEFAULT_BASE_URL: &str = "https://admin.da.live";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub mode: String, // "server" or "stdio"
    pub port: u16,
    pub da_admin: DaAdminConfig,
}

/// Connection settings for the DA Admin API.
#[derive(Debug, Clone, PartialEq)]
pub struct DaAdminConfig {
    pub api_token: Option<String>,
    pub base_url: String,
    pub timeout_ms: u64,
}

impl Default for DaAdminConfig {
    fn default() -> Self {
        Self { api_token: None, base_url: DEFAULT_BASE_URL.into(), timeout_ms: DEFAULT_TIMEOUT_MS }
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    #[serde(default)]
    server: ServerSection,
    #[serde(default)]
    da_admin: DaAdminSection,
}

#[derive(Debug, Default, Deserialize)]
struct ServerSection {
    mode: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct DaAdminSection {
    api_token: Option<String>,
    base_url: Option<String>,
    timeout_ms: Option<u64>,
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Environment only.
    pub fn from_env() -> Self {
        Self::merge(FileConfig::default())
    }

    /// TOML file named by `DA_MCP_CONFIG` (if any), overridden by environment.
    pub fn from_env_and_toml() -> Result<Self, GatewayError> {
        let file = match env_nonempty("DA_MCP_CONFIG") {
            Some(path) => match std::fs::read_to_string(&path) {
                Ok(raw) => Self::parse_toml(&raw)?,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    tracing::warn!(path = %path, "config file not found, using environment only");
                    FileConfig::default()
                }
                Err(e) => return Err(GatewayError::Config(format!("{path}: {e}"))),
            },
            None => FileConfig::default(),
        };
        Ok(Self::merge(file))
    }

    fn parse_toml(raw: &str) -> Result<FileConfig, GatewayError> {
        toml::from_str(raw).map_err(|e| GatewayError::Config(e.to_string()))
    }

    fn merge(file: FileConfig) -> Self {
        let mode = env_nonempty("MODE").or(file.server.mode).unwrap_or_else(|| "server".into());
        let port = env_nonempty("PORT")
            .and_then(|s| s.parse::<u16>().ok())
            .or(file.server.port)
            .unwrap_or(8080);
        let defaults = DaAdminConfig::default();
        let da_admin = DaAdminConfig {
            api_token: env_nonempty("DA_ADMIN_API_TOKEN").or(file.da_admin.api_token),
            base_url: env_nonempty("DA_ADMIN_BASE_URL")
                .or(file.da_admin.base_url)
                .unwrap_or(defaults.base_url),
            timeout_ms: env_nonempty("DA_ADMIN_TIMEOUT_MS")
                .and_then(|s| s.parse::<u64>().ok())
                .or(file.da_admin.timeout_ms)
                .unwrap_or(defaults.timeout_ms),
        };
        Self { mode, port, da_admin }
    }

    pub fn validate(&self) -> Result<(), GatewayError> {
        if !matches!(self.mode.as_str(), "server" | "stdio") {
            return Err(GatewayError::Config(format!(
                "Invalid MODE: {}. Must be 'server' or 'stdio'",
                self.mode
            )));
        }
        if self.mode == "server" && self.port == 0 {
            return Err(GatewayError::Config("PORT cannot be 0".into()));
        }
        self.da_admin.validate()
    }
}

impl DaAdminConfig {
    pub fn validate(&self) -> Result<(), GatewayError> {
        if self.api_token.as_deref().map_or(true, |t| t.trim().is_empty()) {
            return Err(GatewayError::Config("DA_ADMIN_API_TOKEN is required".into()));
        }
        if self.timeout_ms == 0 {
            return Err(GatewayError::Config("DA_ADMIN_TIMEOUT_MS must be positive".into()));
        }
        reqwest::Url::parse(&self.base_url)
            .map_err(|e| GatewayError::Config(format!("DA_ADMIN_BASE_URL {}: {e}", self.base_url)))?;
        Ok(())
    }
}
