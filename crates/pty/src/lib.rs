//! runeterm PTY session management
//!
//! Spawns the shell on a PTY and drives the byte pipeline: one reader
//! task pulls chunks from the PTY, feeds them through the
//! control-sequence parser and applies the resulting operations to the
//! shared grid under a single write lock, pulsing the render channel
//! after each batch.

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod keys;
pub mod parser;
pub mod translate;

pub use keys::{Key, Modifiers};
pub use parser::{Operation, Parser};

use anyhow::{anyhow, Context, Result};
use portable_pty::{native_pty_system, CommandBuilder, MasterPty, PtySize};
use runeterm_grid::{Cell, Grid, Size};
use std::io::{Read, Write};
use std::sync::{Arc, Mutex, RwLock};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, instrument};

/// Size of a single PTY read.
const READ_CHUNK: usize = 1024;

/// A running terminal session: the shell process on its PTY, the shared
/// screen grid and the signal channels consumed by a renderer.
///
/// All grid mutation happens on one reader task; renderers only take
/// the read lock through [`Terminal::runes`], so a snapshot never
/// observes a half-applied operation batch.
pub struct Terminal {
    grid: Arc<RwLock<Grid>>,
    master: Box<dyn MasterPty + Send>,
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
    render_rx: Option<mpsc::UnboundedReceiver<()>>,
    done_rx: Option<oneshot::Receiver<()>>,
}

impl Terminal {
    /// Launch `shell` on a fresh PTY with a `cols x rows` grid.
    ///
    /// Must be called from within a tokio runtime: the PTY reader runs
    /// on a blocking task. The spawned shell gets `TERM=vt100`.
    #[instrument(name = "terminal_start", skip_all)]
    pub fn start(shell: &str, cols: u16, rows: u16) -> Result<Self> {
        info!(subsystem = "pty", shell, cols, rows, "starting shell session");

        let pty_system = native_pty_system();
        let pair = pty_system
            .openpty(PtySize {
                rows,
                cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .context("failed to open PTY")?;

        let mut cmd = CommandBuilder::new(shell);
        cmd.env("TERM", "vt100");
        let mut child = pair
            .slave
            .spawn_command(cmd)
            .context("failed to spawn shell")?;

        let reader = pair
            .master
            .try_clone_reader()
            .context("failed to clone PTY reader")?;
        let writer = pair
            .master
            .take_writer()
            .context("failed to take PTY writer")?;
        let writer = Arc::new(Mutex::new(writer));

        let grid = Arc::new(RwLock::new(Grid::new(cols as usize, rows as usize)));
        let (render_tx, render_rx) = mpsc::unbounded_channel();
        let (done_tx, done_rx) = oneshot::channel();

        let task_grid = Arc::clone(&grid);
        let task_writer = Arc::clone(&writer);
        tokio::task::spawn_blocking(move || {
            read_loop(reader, task_grid, task_writer, render_tx);
            let _ = child.wait();
            let _ = done_tx.send(());
            info!(subsystem = "pty", "shell session ended");
        });

        Ok(Self {
            grid,
            master: pair.master,
            writer,
            render_rx: Some(render_rx),
            done_rx: Some(done_rx),
        })
    }

    /// Resize the grid (destructively) and the PTY window.
    #[instrument(name = "terminal_resize", skip(self))]
    pub fn resize(&self, cols: u16, rows: u16) -> Result<()> {
        {
            let mut grid = self
                .grid
                .write()
                .map_err(|_| anyhow!("grid lock poisoned"))?;
            grid.resize(Size {
                rows: rows as usize,
                cols: cols as usize,
            });
        }
        self.master
            .resize(PtySize {
                rows,
                cols,
                pixel_width: 0,
                pixel_height: 0,
            })
            .context("failed to resize PTY")?;
        Ok(())
    }

    /// Encode a key press and write it to the shell's input.
    pub fn key_pressed(&self, key: &Key, mods: Modifiers) -> Result<()> {
        let bytes = keys::encode(key, mods);
        debug!(subsystem = "pty", byte_count = bytes.len(), "writing key bytes");
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| anyhow!("PTY writer lock poisoned"))?;
        writer
            .write_all(&bytes)
            .context("failed to write key bytes to PTY")?;
        writer.flush().context("failed to flush PTY writer")?;
        Ok(())
    }

    /// Snapshot of the active buffer for rendering.
    pub fn runes(&self) -> Vec<Cell> {
        match self.grid.read() {
            Ok(grid) => grid.snapshot(),
            Err(_) => {
                error!(subsystem = "pty", "grid lock poisoned, rendering empty snapshot");
                Vec::new()
            }
        }
    }

    /// Current grid dimensions.
    pub fn size(&self) -> Size {
        match self.grid.read() {
            Ok(grid) => grid.size(),
            Err(_) => Size { rows: 0, cols: 0 },
        }
    }

    /// Take the render-signal receiver. Fires once per applied
    /// operation batch; the channel closes when the PTY ends.
    pub fn take_render_signal(&mut self) -> Option<mpsc::UnboundedReceiver<()>> {
        self.render_rx.take()
    }

    /// Take the done-signal receiver. Fires exactly once, when the
    /// shell exits and the PTY reaches end of stream.
    pub fn take_done_signal(&mut self) -> Option<oneshot::Receiver<()>> {
        self.done_rx.take()
    }
}

/// Pull chunks from the PTY until EOF, applying parsed operations to
/// the grid under the write lock. Reply bytes (device attribute
/// responses) go back through the shared PTY writer.
fn read_loop(
    mut reader: Box<dyn Read + Send>,
    grid: Arc<RwLock<Grid>>,
    writer: Arc<Mutex<Box<dyn Write + Send>>>,
    render_tx: mpsc::UnboundedSender<()>,
) {
    let mut parser = Parser::new();
    let mut buf = [0u8; READ_CHUNK];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => {
                debug!(subsystem = "pty", "PTY reached end of stream");
                return;
            }
            Ok(n) => n,
            Err(e) => {
                error!(subsystem = "pty", error = %e, "PTY read failed");
                return;
            }
        };

        let ops = parser.parse(&buf[..n]);
        if ops.is_empty() {
            continue;
        }
        {
            let mut grid = match grid.write() {
                Ok(grid) => grid,
                Err(_) => {
                    error!(subsystem = "pty", "grid lock poisoned, stopping reader");
                    return;
                }
            };
            let mut pty_writer = match writer.lock() {
                Ok(writer) => writer,
                Err(_) => {
                    error!(subsystem = "pty", "PTY writer lock poisoned, stopping reader");
                    return;
                }
            };
            for op in &ops {
                translate::apply(&mut grid, &mut **pty_writer, op);
            }
        }
        if render_tx.send(()).is_err() {
            // Renderer went away, keep draining the PTY silently.
            debug!(subsystem = "pty", "render channel closed");
        }
    }
}
