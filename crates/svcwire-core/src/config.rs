use serde::{Deserialize, Serialize};
use std::fs;

use crate::error::{WireError, WireResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireConfig {
    /// env_logger filter, `RUST_LOG` still overrides it.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    #[serde(default)]
    pub render: RenderOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Nested component limit for one render pass.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Debug-log dependencies that resolve to absent.
    #[serde(default = "default_log_missing")]
    pub log_missing: bool,
}

fn default_log_filter() -> String {
    "info".to_string()
}
fn default_max_depth() -> usize {
    256
}
fn default_log_missing() -> bool {
    true
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            log_missing: default_log_missing(),
        }
    }
}

impl Default for WireConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            render: RenderOptions::default(),
        }
    }
}

impl WireConfig {
    /// Unreadable file means defaults; a file that does not parse is an error.
    pub fn load_or_default(path: &str) -> WireResult<Self> {
        match fs::read_to_string(path) {
            Ok(s) => Self::from_toml_str(&s)
                .map_err(|e| WireError::Config(format!("parse {}: {}", path, e))),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}
