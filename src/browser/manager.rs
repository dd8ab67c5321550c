//! Shared browser session with lazy launch and crash recovery.

use std::sync::Arc;

use chromiumoxide::page::Page;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::ConsoleConfig;
use crate::error::{ConsoleError, ConsoleResult};

use super::launch::{BrowserWrapper, launch_browser};

/// One browser process plus the persistent page commands run against.
struct ConsoleSession {
    wrapper: BrowserWrapper,
    page: Page,
}

/// Handle to the relay's browser.
///
/// # Lifecycle
/// - Nothing is launched on construction; the first request launches the
///   browser and opens a blank page (~2-3s).
/// - Later requests reuse the session after a `version()` health check.
/// - A failed health check tears the crashed process down and relaunches.
/// - `shutdown()` closes the browser explicitly on daemon exit.
///
/// Clones share the same underlying session.
#[derive(Clone)]
pub struct BrowserManager {
    config: ConsoleConfig,
    session: Arc<Mutex<Option<ConsoleSession>>>,
}

impl BrowserManager {
    /// Create a manager; the browser is launched lazily on first use.
    #[must_use]
    pub fn new(config: ConsoleConfig) -> Self {
        Self {
            config,
            session: Arc::new(Mutex::new(None)),
        }
    }

    /// Get the persistent page, launching or relaunching the browser as
    /// needed.
    async fn page(&self) -> ConsoleResult<Page> {
        let mut guard = self.session.lock().await;

        if let Some(session) = guard.as_ref() {
            match session.wrapper.browser().version().await {
                Ok(_) => {
                    debug!("Browser health check passed, reusing session");
                    return Ok(session.page.clone());
                }
                Err(e) => {
                    warn!("Browser health check failed: {e}. Recovering...");
                    if let Some(mut crashed) = guard.take() {
                        // Best-effort teardown; the process may already be gone.
                        let _ = crashed.wrapper.browser_mut().close().await;
                        let _ = crashed.wrapper.browser_mut().wait().await;
                        crashed.wrapper.cleanup_temp_dir();
                    }
                }
            }
        }

        info!("Launching browser session");
        let (browser, handler, user_data_dir) = launch_browser(&self.config).await?;
        let wrapper = BrowserWrapper::new(browser, handler, user_data_dir);

        let page = wrapper
            .browser()
            .new_page("about:blank")
            .await
            .map_err(|e| ConsoleError::Browser(format!("failed to open page: {e}")))?;

        let handle = page.clone();
        *guard = Some(ConsoleSession { wrapper, page });
        Ok(handle)
    }

    /// Evaluate a JavaScript snippet in the live page.
    ///
    /// The snippet is wrapped in an async IIFE so `await` works at the top
    /// level, and the settled value is returned as JSON. A thrown exception
    /// or CDP failure comes back as [`ConsoleError::Evaluation`]; the
    /// session itself stays up.
    pub async fn execute_code(&self, code: &str) -> ConsoleResult<Value> {
        let page = self.page().await?;
        let wrapped = format!("(async () => {{ {code} }})()");
        let evaluated = page
            .evaluate(wrapped)
            .await
            .map_err(|e| ConsoleError::Evaluation(e.to_string()))?;
        Ok(evaluated.value().cloned().unwrap_or(Value::Null))
    }

    /// Serialized markup of the page as it currently stands.
    pub async fn snapshot_markup(&self) -> ConsoleResult<String> {
        let page = self.page().await?;
        page.content()
            .await
            .map_err(|e| ConsoleError::Browser(format!("failed to read page content: {e}")))
    }

    /// Shut the browser down if it is running.
    ///
    /// Safe to call multiple times. `close()` must be explicit here:
    /// dropping the wrapper only aborts the handler task.
    pub async fn shutdown(&self) -> ConsoleResult<()> {
        let mut guard = self.session.lock().await;

        if let Some(mut session) = guard.take() {
            info!("Shutting down browser");
            if let Err(e) = session.wrapper.browser_mut().close().await {
                warn!("Failed to close browser cleanly: {e}");
            }
            if let Err(e) = session.wrapper.browser_mut().wait().await {
                warn!("Failed to wait for browser exit: {e}");
            }
            session.wrapper.cleanup_temp_dir();
        }
        Ok(())
    }
}
