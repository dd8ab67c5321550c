//! Managed Chromium instance.
//!
//! The relay owns a single browser process and a single persistent page.
//! [`launch`] handles process startup and the CDP event-handler task;
//! [`manager`] wraps both behind a lazily-initialized, crash-recovering
//! handle that the dispatch loop talks to.

pub mod launch;
pub mod manager;

pub use launch::{BrowserWrapper, launch_browser};
pub use manager::BrowserManager;
