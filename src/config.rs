//! Process configuration.
//!
//! Read once at startup by the binary. The rendering core never looks at the
//! environment; the base URL reaches it through the template.

use anyhow::{anyhow, Result};

use crate::template::{RenderMode, DEFAULT_BASE_URL};

/// Renderer configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Public deployment URL that tracking QR codes point at.
    pub tracking_base_url: String,
    pub render_mode: RenderMode,
    pub rust_log: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracking_base_url: DEFAULT_BASE_URL.to_string(),
            render_mode: RenderMode::Detailed,
            rust_log: "info".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source. Unset and blank values fall back to
    /// the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let tracking_base_url = match get("TRACKING_BASE_URL") {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
                url.trim_end_matches('/').to_string()
            }
            Some(url) => {
                return Err(anyhow!(
                    "TRACKING_BASE_URL must be an http(s) URL, got '{url}'"
                ))
            }
            None => defaults.tracking_base_url,
        };

        let render_mode = match get("REPORT_RENDER_MODE") {
            Some(mode) => mode
                .parse::<RenderMode>()
                .map_err(|e| anyhow!("REPORT_RENDER_MODE: {e}"))?,
            None => defaults.render_mode,
        };

        Ok(Config {
            tracking_base_url,
            render_mode,
            rust_log: get("RUST_LOG").unwrap_or(defaults.rust_log),
        })
    }
}
