// Browser console daemon: WebSocket relay in front of a managed browser.
//
// Clients send {"action": "executeCode", "code": ...} or
// {"action": "fetchHTML"} and receive a {"success": ...} envelope back.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use browser_console::ConsoleConfig;

#[derive(Debug, Parser)]
#[command(name = "browser-console", version, about = "Remote-control relay for a managed headless browser")]
struct Cli {
    /// TOML configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Bind address for the command channel (overrides the file).
    #[arg(long, value_name = "ADDR", env = "BROWSER_CONSOLE_BIND")]
    bind: Option<String>,

    /// Run the browser with a visible window.
    #[arg(long)]
    headed: bool,

    /// Chromium executable to launch (overrides discovery).
    #[arg(long, value_name = "PATH")]
    chrome: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ConsoleConfig::from_file(path)?,
        None => ConsoleConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    if cli.headed {
        config.headless = false;
    }
    if let Some(chrome) = cli.chrome {
        config.chrome_executable = Some(chrome);
    }

    browser_console::run(config).await
}
