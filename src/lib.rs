//! Remote-control relay for a managed headless browser.
//!
//! A WebSocket listener accepts a two-message JSON envelope
//! (`executeCode` / `fetchHTML`), forwards commands to a chromiumoxide
//! browser session, and answers snapshot requests with sanitized,
//! pretty-printed page markup. The [`sanitizer`] module is the interesting
//! part; everything around it is dispatch glue.

pub mod browser;
pub mod config;
pub mod console;
pub mod error;
pub mod sanitizer;

pub use browser::{BrowserManager, BrowserWrapper, launch_browser};
pub use config::ConsoleConfig;
pub use console::protocol::{ConsoleRequest, ConsoleResponse};
pub use console::{ConsoleContext, run};
pub use error::{ConsoleError, ConsoleResult};
pub use sanitizer::{
    DEFAULT_ALLOWED_ATTRIBUTES, DEFAULT_INDENT_SIZE, DEFAULT_STRIPPED_TAGS, SanitizeError,
    Sanitizer,
};
