//! Browser process lifecycle.
//!
//! Launches chromiumoxide with a dedicated temp profile directory and keeps
//! the CDP event-handler task tracked so it can be stopped with the browser.

use std::path::PathBuf;
use std::time::Duration;

use chromiumoxide::browser::{Browser, BrowserConfigBuilder, HeadlessMode};
use futures::StreamExt;
use tokio::task::{self, JoinHandle};
use tracing::{debug, error, info, warn};

use crate::config::ConsoleConfig;
use crate::error::{ConsoleError, ConsoleResult};

/// Wrapper for a Browser and its event handler task.
///
/// The handler MUST be aborted when the browser goes away, otherwise the
/// task runs indefinitely after the process is gone. Dropping the wrapper
/// takes care of it, and of the temp profile directory.
pub struct BrowserWrapper {
    browser: Browser,
    handler: JoinHandle<()>,
    user_data_dir: Option<PathBuf>,
}

impl BrowserWrapper {
    pub(crate) fn new(browser: Browser, handler: JoinHandle<()>, user_data_dir: PathBuf) -> Self {
        Self {
            browser,
            handler,
            user_data_dir: Some(user_data_dir),
        }
    }

    /// Get reference to inner browser
    pub(crate) fn browser(&self) -> &Browser {
        &self.browser
    }

    /// Get mutable reference to inner browser
    pub(crate) fn browser_mut(&mut self) -> &mut Browser {
        &mut self.browser
    }

    /// Remove the temp profile directory (blocking operation).
    ///
    /// MUST be called after `browser.wait()` completes so Chrome has
    /// released its file handles; Windows refuses to delete locked files.
    /// Blocking `std::fs` is used because this also runs from Drop, where
    /// async is not available.
    pub fn cleanup_temp_dir(&mut self) {
        if let Some(path) = self.user_data_dir.take() {
            debug!("Removing temp profile directory: {}", path.display());
            if let Err(e) = std::fs::remove_dir_all(&path) {
                warn!(
                    "Failed to remove temp profile directory {}: {}",
                    path.display(),
                    e
                );
            }
        }
    }
}

impl Drop for BrowserWrapper {
    fn drop(&mut self) {
        self.handler.abort();
        // Browser::drop() kills the Chrome process itself.
        if self.user_data_dir.is_some() {
            warn!("BrowserWrapper dropped without explicit shutdown - removing temp dir in Drop");
            self.cleanup_temp_dir();
        }
    }
}

/// Launch a browser instance for the relay.
///
/// Returns `(Browser, JoinHandle, PathBuf)` where the path is the temp
/// profile directory that must be cleaned up after the browser exits. The
/// handler task drains CDP events and is aborted by
/// [`BrowserWrapper::drop`].
pub async fn launch_browser(
    config: &ConsoleConfig,
) -> ConsoleResult<(Browser, JoinHandle<()>, PathBuf)> {
    info!(headless = config.headless, "Launching browser");

    let user_data_dir =
        std::env::temp_dir().join(format!("browser_console_{}", std::process::id()));
    std::fs::create_dir_all(&user_data_dir)?;

    let mut builder = BrowserConfigBuilder::default()
        .request_timeout(Duration::from_secs(config.request_timeout_secs))
        .window_size(1280, 900)
        .user_data_dir(user_data_dir.clone())
        .headless_mode(HeadlessMode::default())
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--disable-extensions")
        .arg("--disable-background-networking")
        .arg("--disable-popup-blocking")
        .arg("--disable-notifications")
        .arg("--hide-scrollbars")
        .arg("--mute-audio");

    if let Some(path) = &config.chrome_executable {
        builder = builder.chrome_executable(path.clone());
    }
    if !config.headless {
        builder = builder.with_head();
    }

    let browser_config = builder.build().map_err(ConsoleError::Browser)?;

    let (browser, mut handler) = Browser::launch(browser_config)
        .await
        .map_err(|e| ConsoleError::Browser(format!("failed to launch browser: {e}")))?;

    let handler_task = task::spawn(async move {
        while let Some(event) = handler.next().await {
            if let Err(e) = event {
                error!("Browser handler error: {e:?}");
            }
        }
        debug!("Browser event handler task completed");
    });

    Ok((browser, handler_task, user_data_dir))
}
