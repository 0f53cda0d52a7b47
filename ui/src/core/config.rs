//! Diary configuration: page list, layout and timing.
//!
//! The shipped configuration is embedded from `assets/diary.json`. A broken or
//! missing value never stops the page from rendering; `load()` falls back to
//! the built-in defaults and logs why.

use dioxus::logger::tracing::{info, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::diary::content::{ClosingMessage, PageSequence, CLOSING_SENTINEL};
use crate::diary::engine::Layout;
use crate::diary::input::DEFAULT_SWIPE_THRESHOLD;

const EMBEDDED_CONFIG: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/assets/diary.json"));

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("diary config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("diary config rejected: {0}")]
    Invalid(&'static str),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DiaryConfig {
    pub pages: Vec<String>,
    pub layout: Layout,
    pub flip_ms: u64,
    pub bounce_ms: u64,
    pub swipe_threshold: f64,
    pub surprise_delay_ms: u64,
    pub closing: ClosingMessage,
}

impl DiaryConfig {
    pub const DEFAULT_FLIP_MS: u64 = 1000;
    pub const DEFAULT_BOUNCE_MS: u64 = 400;
    pub const DEFAULT_SURPRISE_DELAY_MS: u64 = 600;

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Embedded configuration, or defaults if it cannot be used.
    pub fn load() -> Self {
        match Self::from_json(EMBEDDED_CONFIG) {
            Ok(config) => {
                info!(
                    pages = config.pages.len(),
                    layout = ?config.layout,
                    "diary config loaded"
                );
                config
            }
            Err(err) => {
                warn!("{err}; using built-in diary config");
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.flip_ms == 0 {
            return Err(ConfigError::Invalid("flip_ms must be greater than zero"));
        }
        if !self.swipe_threshold.is_finite() || self.swipe_threshold <= 0.0 {
            return Err(ConfigError::Invalid("swipe_threshold must be a positive number"));
        }
        Ok(())
    }

    pub fn page_sequence(&self) -> PageSequence {
        PageSequence::from_config(&self.pages, self.closing.clone())
    }
}

impl Default for DiaryConfig {
    fn default() -> Self {
        let mut pages: Vec<String> = (1..=7).map(|n| format!("images/p{n}.jpeg")).collect();
        pages.push(CLOSING_SENTINEL.to_string());

        Self {
            pages,
            layout: Layout::Spread,
            flip_ms: Self::DEFAULT_FLIP_MS,
            bounce_ms: Self::DEFAULT_BOUNCE_MS,
            swipe_threshold: DEFAULT_SWIPE_THRESHOLD,
            surprise_delay_ms: Self::DEFAULT_SURPRISE_DELAY_MS,
            closing: ClosingMessage::default(),
        }
    }
}
