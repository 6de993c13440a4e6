// src/config.rs
//! Service configuration: TOML file + environment overrides.
//!
//! Resolution:
//! 1) `$EMOTION_CONFIG_PATH` (must exist if set)
//! 2) `config/emotion.toml` (optional; missing file = defaults)
//! 3) env overrides: `HISTORY_CAPACITY`, `MAX_BATCH_ROWS`, `DEBUG_ROUTES=1`

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/emotion.toml";
pub const ENV_CONFIG_PATH: &str = "EMOTION_CONFIG_PATH";
pub const ENV_HISTORY_CAPACITY: &str = "HISTORY_CAPACITY";
pub const ENV_MAX_BATCH_ROWS: &str = "MAX_BATCH_ROWS";
pub const ENV_DEBUG_ROUTES: &str = "DEBUG_ROUTES";

fn default_history_capacity() -> usize {
    10_000
}
fn default_max_batch_rows() -> usize {
    5_000
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// Records kept in the history log (oldest dropped first).
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,
    /// Upper bound on records per batch / CSV upload.
    #[serde(default = "default_max_batch_rows")]
    pub max_batch_rows: usize,
    /// Mount `/debug/*` and `/metrics`.
    #[serde(default)]
    pub debug_routes: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            history_capacity: default_history_capacity(),
            max_batch_rows: default_max_batch_rows(),
            debug_routes: false,
        }
    }
}

impl AppConfig {
    /// Load using env var + fallbacks, then apply env overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = match std::env::var(ENV_CONFIG_PATH) {
            Ok(p) => {
                let pb = PathBuf::from(p);
                if !pb.exists() {
                    return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
                }
                Self::load_from(&pb)?
            }
            Err(_) => {
                let default = PathBuf::from(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    Self::load_from(&default)?
                } else {
                    Self::default()
                }
            }
        };
        cfg.apply_env();
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing config at {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: AppConfig = toml::from_str(s)?;
        cfg.sanitize();
        Ok(cfg)
    }

    fn apply_env(&mut self) {
        if let Some(v) = parse_usize_env(std::env::var(ENV_HISTORY_CAPACITY).ok()) {
            self.history_capacity = v;
        }
        if let Some(v) = parse_usize_env(std::env::var(ENV_MAX_BATCH_ROWS).ok()) {
            self.max_batch_rows = v;
        }
        if std::env::var(ENV_DEBUG_ROUTES).ok().as_deref() == Some("1") {
            self.debug_routes = true;
        }
        self.sanitize();
    }

    // zero would make every append/upload a no-op
    fn sanitize(&mut self) {
        if self.history_capacity == 0 {
            self.history_capacity = default_history_capacity();
        }
        if self.max_batch_rows == 0 {
            self.max_batch_rows = default_max_batch_rows();
        }
    }
}

fn parse_usize_env(raw: Option<String>) -> Option<usize> {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
}
