//! Declared configuration: provider connection plus resource tables.
//!
//! ```toml
//! [provider]
//! address = "10.1.1.245"
//! username = "admin"
//! insecure = true
//!
//! [resources.bigip_ltm_pool.web]
//! name = "/Common/web"
//! load_balancing_mode = "round-robin"
//! ```

use anyhow::{Context, Result, bail};
use bigip::ConnectionConfig;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// Environment variable overriding `provider.address`
pub const ENV_HOST: &str = "BIGIP_HOST";
/// Environment variable overriding `provider.username`
pub const ENV_USER: &str = "BIGIP_USER";
/// Environment variable overriding `provider.password`
pub const ENV_PASSWORD: &str = "BIGIP_PASSWORD";

static LABEL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]*$").expect("static regex"));

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,

    /// `[resources.<type>.<label>]` tables.
    #[serde(default)]
    pub resources: BTreeMap<String, BTreeMap<String, toml::Table>>,
}

/// The `[provider]` table.
#[derive(Debug, Default, Deserialize)]
pub struct ProviderConfig {
    pub address: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    #[serde(default)]
    pub insecure: bool,
    pub timeout_secs: Option<u64>,
}

/// One declared resource.
#[derive(Debug, Clone, PartialEq)]
pub struct Declared {
    pub type_name: String,
    pub label: String,
    pub attributes: Value,
}

impl Config {
    /// Load and parse a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Declared resources in `type.label` order
    pub fn declared(&self) -> Result<Vec<Declared>> {
        let mut out = Vec::new();
        for (type_name, by_label) in &self.resources {
            for (label, table) in by_label {
                if !LABEL.is_match(label) {
                    bail!("Invalid label '{label}' for {type_name}: use letters, digits, '_' or '-'");
                }
                let attributes = serde_json::to_value(table)
                    .with_context(|| format!("Could not convert {type_name}.{label}"))?;
                out.push(Declared {
                    type_name: type_name.clone(),
                    label: label.clone(),
                    attributes,
                });
            }
        }
        Ok(out)
    }

    /// Connection settings with environment overrides applied
    pub fn connection(&self) -> Result<ConnectionConfig> {
        self.connection_with(|key| std::env::var(key).ok())
    }

    fn connection_with(&self, env: impl Fn(&str) -> Option<String>) -> Result<ConnectionConfig> {
        let pick = |key: &str, configured: &Option<String>| {
            env(key)
                .filter(|v| !v.is_empty())
                .or_else(|| configured.clone())
        };

        let Some(address) = pick(ENV_HOST, &self.provider.address) else {
            bail!("No management address: set provider.address or {ENV_HOST}");
        };
        let Some(username) = pick(ENV_USER, &self.provider.username) else {
            bail!("No username: set provider.username or {ENV_USER}");
        };
        let password = pick(ENV_PASSWORD, &self.provider.password).unwrap_or_default();

        let mut conn = ConnectionConfig::new(address, username, password);
        conn.insecure = self.provider.insecure;
        if let Some(secs) = self.provider.timeout_secs {
            conn.timeout_secs = secs;
        }
        Ok(conn)
    }
}
