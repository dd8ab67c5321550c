//! Daemon configuration.
//!
//! `ConsoleConfig` carries the bind address, browser options and the
//! sanitization rule overrides. Values come from defaults, then an optional
//! TOML file, then CLI flags on top; the binary does the layering.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConsoleError, ConsoleResult};
use crate::sanitizer::{
    DEFAULT_ALLOWED_ATTRIBUTES, DEFAULT_INDENT_SIZE, DEFAULT_STRIPPED_TAGS, Sanitizer,
};

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_indent_size() -> usize {
    DEFAULT_INDENT_SIZE
}

/// Configuration for the relay daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConsoleConfig {
    /// Address the WebSocket listener binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Run the browser without a visible window.
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Explicit Chromium executable. When unset, the usual install
    /// locations are probed.
    #[serde(default)]
    pub chrome_executable: Option<PathBuf>,

    /// Timeout for individual CDP requests, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Attribute names that survive snapshot sanitization.
    /// Defaults to the built-in allow-set when unset.
    #[serde(default)]
    pub allowed_attributes: Option<Vec<String>>,

    /// Tag names whose subtrees are removed from snapshots.
    /// Defaults to the built-in deny-set when unset.
    #[serde(default)]
    pub stripped_tags: Option<Vec<String>>,

    /// Spaces per nesting level in sanitized snapshots.
    #[serde(default = "default_indent_size")]
    pub indent_size: usize,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            headless: default_headless(),
            chrome_executable: None,
            request_timeout_secs: default_request_timeout_secs(),
            allowed_attributes: None,
            stripped_tags: None,
            indent_size: default_indent_size(),
        }
    }
}

impl ConsoleConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// [`ConsoleError::Config`] when the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> ConsoleResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            ConsoleError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        toml::from_str(&raw)
            .map_err(|e| ConsoleError::Config(format!("cannot parse {}: {e}", path.display())))
    }

    /// Build the sanitizer described by this configuration.
    #[must_use]
    pub fn sanitizer(&self) -> Sanitizer {
        let allowed = self.allowed_attributes.clone().unwrap_or_else(|| {
            DEFAULT_ALLOWED_ATTRIBUTES
                .iter()
                .map(ToString::to_string)
                .collect()
        });
        let stripped = self.stripped_tags.clone().unwrap_or_else(|| {
            DEFAULT_STRIPPED_TAGS
                .iter()
                .map(ToString::to_string)
                .collect()
        });
        Sanitizer::with_rules(allowed, stripped, self.indent_size)
    }
}
