//! Headless session driver
//!
//! Owns a terminal session, pumps stdin lines into it as key presses
//! and mirrors the final grid to stdout once the shell exits.

use anyhow::{Context, Result};
use runeterm_config::Config;
use runeterm_pty::{Key, Modifiers, Terminal};
use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tracing::{debug, info};

/// The headless runeterm application.
pub struct App {
    config: Config,
}

impl App {
    /// Create an application with the given configuration.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the session until the shell exits, then print the final
    /// screen contents.
    pub async fn run(&mut self) -> Result<()> {
        let shell = self.config.shell();
        let mut terminal = Terminal::start(&shell, self.config.cols, self.config.rows)
            .context("failed to start terminal session")?;
        let mut render = terminal
            .take_render_signal()
            .context("render signal already taken")?;
        let done = terminal
            .take_done_signal()
            .context("done signal already taken")?;
        tokio::pin!(done);

        let mut input = BufReader::new(stdin()).lines();
        let mut stdin_open = true;
        let mut frames: u64 = 0;

        loop {
            tokio::select! {
                _ = &mut done => break,
                signal = render.recv() => match signal {
                    Some(()) => frames += 1,
                    None => break,
                },
                line = input.next_line(), if stdin_open => match line {
                    Ok(Some(line)) => self.send_line(&terminal, &line)?,
                    Ok(None) => {
                        debug!("stdin closed");
                        stdin_open = false;
                    }
                    Err(e) => {
                        debug!(error = %e, "stdin read failed");
                        stdin_open = false;
                    }
                },
            }
        }

        info!(frames, "shell session ended");
        print!("{}", self.screen_text(&terminal));
        Ok(())
    }

    fn send_line(&self, terminal: &Terminal, line: &str) -> Result<()> {
        for ch in line.chars() {
            // The key table takes unshifted names, like a GUI would
            // deliver them.
            let mods = if ch.is_ascii_uppercase() {
                Modifiers::SHIFT
            } else {
                Modifiers::empty()
            };
            terminal.key_pressed(&Key::Char(ch), mods)?;
        }
        terminal.key_pressed(&Key::Enter, Modifiers::empty())?;
        Ok(())
    }

    fn screen_text(&self, terminal: &Terminal) -> String {
        let cells = terminal.runes();
        let cols = terminal.size().cols.max(1);
        let mut screen = String::with_capacity(cells.len() + cells.len() / cols);
        for (i, cell) in cells.iter().enumerate() {
            screen.push(cell.ch);
            if (i + 1) % cols == 0 {
                screen.push('\n');
            }
        }
        screen
    }
}
