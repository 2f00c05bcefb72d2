//! runeterm headless driver
//!
//! Runs a shell session without a GUI: stdin lines are forwarded to
//! the shell as key presses and the final screen contents are printed
//! when the shell exits. Useful for exercising the full
//! parse/interpret/grid pipeline from a pipe.

use anyhow::{Context, Result};
use runeterm_config::Config;
use tracing::info;

mod app;

use app::App;

#[tokio::main]
async fn main() -> Result<()> {
    let mut config = Config::default();
    if let Some(shell) = std::env::args().nth(1) {
        config.shell = Some(shell);
    }

    runeterm_core::logging::init_logging(&config.logging)
        .context("failed to initialize logging")?;

    info!("starting runeterm v{}", runeterm_core::VERSION);

    let mut app = App::new(config);
    app.run().await?;

    info!("runeterm shutting down");
    Ok(())
}
