//! Operation interpreter
//!
//! Applies parsed operations to the grid: control executions, ESC/CSI
//! commands (cursor movement, erases, margins, private modes, SGR) and
//! the DA1/DA2 query replies, which are written to the PTY reply sink.

use crate::parser::{param, Operation};
use runeterm_grid::{Brush, CellAttrs, Color, Grid};
use std::io::Write;
use tracing::{debug, error};

/// DA1 reply: a VT100 with the advanced video option.
const DA1_REPLY: &[u8] = b"\x1b[?1;2c";
/// DA2 reply
const DA2_REPLY: &[u8] = b"\x1b[>0;0;0c";

/// The normal SGR palette (colors 30-37 / 40-47).
const NORMAL_PALETTE: [Color; 8] = [
    Color::rgb(0, 0, 0),
    Color::rgb(205, 49, 49),
    Color::rgb(13, 188, 121),
    Color::rgb(229, 229, 16),
    Color::rgb(36, 114, 200),
    Color::rgb(188, 63, 188),
    Color::rgb(17, 168, 205),
    Color::rgb(229, 229, 229),
];

/// The bright SGR palette (colors 90-97 / 100-107).
const BRIGHT_PALETTE: [Color; 8] = [
    Color::rgb(102, 102, 102),
    Color::rgb(241, 76, 76),
    Color::rgb(35, 209, 139),
    Color::rgb(245, 245, 67),
    Color::rgb(59, 142, 234),
    Color::rgb(214, 112, 214),
    Color::rgb(41, 184, 219),
    Color::rgb(229, 229, 229),
];

/// Intensity levels of the 6x6x6 color cube.
const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

/// Apply a single parsed operation to the grid. Query replies are
/// written to `reply`; unknown sequences are logged and ignored, so
/// malformed input can never desynchronize the screen state.
pub fn apply(grid: &mut Grid, reply: &mut dyn Write, op: &Operation) {
    match op {
        Operation::Print(ch) => grid.write_char(*ch),
        Operation::Execute(byte) => execute_control(grid, *byte),
        Operation::Esc {
            final_byte,
            intermediates,
        } => {
            // ESC @ .. ESC _ are aliases for the C1 controls.
            if intermediates.is_empty() && ('@'..='_').contains(final_byte) {
                execute_control(grid, *final_byte as u8 + 0x40);
            } else {
                debug!(
                    subsystem = "interp",
                    final_byte = %final_byte,
                    intermediates = %intermediates,
                    "ignoring escape sequence"
                );
            }
        }
        Operation::Csi {
            final_byte,
            intermediates,
            params,
        } => translate_csi(grid, reply, *final_byte, intermediates, params),
        Operation::Osc { payload } => {
            debug!(subsystem = "interp", payload = %payload, "ignoring OSC sequence");
        }
    }
}

fn execute_control(grid: &mut Grid, byte: u8) {
    match byte {
        0x08 => grid.backspace(),
        0x09 => grid.tab(),
        0x0a => grid.lf(),
        0x0d => grid.cr(),
        // RI
        0x8d => grid.reverse_index(),
        _ => debug!(subsystem = "interp", byte, "ignoring control byte"),
    }
}

fn translate_csi(
    grid: &mut Grid,
    reply: &mut dyn Write,
    final_byte: char,
    intermediates: &str,
    params: &[u16],
) {
    if !intermediates.is_empty() {
        match (intermediates, final_byte) {
            ("?", 'h') => set_private_mode(grid, params, true),
            ("?", 'l') => set_private_mode(grid, params, false),
            (">", 'c') => write_reply(reply, DA2_REPLY),
            _ => debug!(
                subsystem = "interp",
                final_byte = %final_byte,
                intermediates,
                ?params,
                "ignoring CSI sequence with intermediates"
            ),
        }
        return;
    }

    let rows = grid.size().rows;
    match final_byte {
        // CUU
        'A' => grid.move_cursor(0, -(param(params, 0, 1) as isize)),
        // CUD
        'B' | 'e' => grid.move_cursor(0, param(params, 0, 1) as isize),
        // CUF
        'C' | 'a' => grid.move_cursor(param(params, 0, 1) as isize, 0),
        // CUB
        'D' => grid.move_cursor(-(param(params, 0, 1) as isize), 0),
        // CUP / HVP, one-based [row;column]
        'H' | 'f' => grid.set_cursor(
            param(params, 1, 1) as usize - 1,
            param(params, 0, 1) as usize - 1,
        ),
        // ED
        'J' => erase_in_display(grid, param(params, 0, 0)),
        // EL
        'K' => erase_in_line(grid, param(params, 0, 0)),
        // DCH
        'P' => grid.delete_chars(param(params, 0, 1) as usize),
        // DL
        'M' => grid.delete_lines(param(params, 0, 1) as usize),
        // DECSTBM, one-based inclusive margins
        'r' => grid.set_scroll_area(
            param(params, 0, 1) as usize - 1,
            param(params, 1, rows.min(u16::MAX as usize) as u16) as usize,
        ),
        's' => grid.save_cursor(),
        'u' => grid.restore_cursor(),
        // DA1
        'c' => write_reply(reply, DA1_REPLY),
        // SGR
        'm' => apply_sgr(grid, params),
        _ => debug!(
            subsystem = "interp",
            final_byte = %final_byte,
            ?params,
            "ignoring CSI sequence"
        ),
    }
}

fn set_private_mode(grid: &mut Grid, params: &[u16], enable: bool) {
    match param(params, 0, 0) {
        // DECOM
        6 => grid.set_origin_mode(enable),
        // Alternate screen buffer with cursor save/restore
        1049 if enable => {
            grid.save_cursor();
            grid.switch_to_alternate();
        }
        1049 => {
            grid.switch_to_primary();
            grid.restore_cursor();
        }
        mode => debug!(subsystem = "interp", mode, enable, "ignoring private mode"),
    }
}

fn erase_in_display(grid: &mut Grid, mode: u16) {
    let cursor = grid.cursor();
    let size = grid.size();
    match mode {
        0 => {
            grid.clear_in_line(cursor.x, size.cols);
            grid.clear_lines(cursor.y + 1, size.rows);
        }
        1 => {
            grid.clear_in_line(0, cursor.x + 1);
            grid.clear_lines(0, cursor.y.saturating_sub(1));
        }
        2 => {
            grid.clear_lines(0, size.rows);
            grid.set_cursor(0, 0);
        }
        _ => debug!(subsystem = "interp", mode, "ignoring ED mode"),
    }
}

fn erase_in_line(grid: &mut Grid, mode: u16) {
    let cursor = grid.cursor();
    let cols = grid.size().cols;
    match mode {
        0 => grid.clear_in_line(cursor.x, cols),
        1 => grid.clear_in_line(0, cursor.x + 1),
        2 => grid.clear_in_line(0, cols),
        _ => debug!(subsystem = "interp", mode, "ignoring EL mode"),
    }
}

/// Walk the SGR parameter list, folding each code into the brush. An
/// empty list is equivalent to a single reset.
fn apply_sgr(grid: &mut Grid, params: &[u16]) {
    let params: &[u16] = if params.is_empty() { &[0] } else { params };
    let mut brush = grid.brush();
    let mut i = 0;
    while i < params.len() {
        match params[i] {
            0 => brush = Brush::default(),
            1 => brush.attrs |= CellAttrs::BOLD,
            7 => brush.attrs |= CellAttrs::INVERT,
            27 => brush.attrs &= !CellAttrs::INVERT,
            n @ 30..=37 => brush.fg = NORMAL_PALETTE[(n - 30) as usize],
            n @ 40..=47 => brush.bg = NORMAL_PALETTE[(n - 40) as usize],
            n @ 90..=97 => brush.fg = BRIGHT_PALETTE[(n - 90) as usize],
            n @ 100..=107 => brush.bg = BRIGHT_PALETTE[(n - 100) as usize],
            38 => match extended_color(&params[i..]) {
                Some((color, consumed)) => {
                    brush.fg = color;
                    i += consumed;
                }
                None => debug!(subsystem = "interp", "incomplete extended foreground"),
            },
            48 => match extended_color(&params[i..]) {
                Some((color, consumed)) => {
                    brush.bg = color;
                    i += consumed;
                }
                None => debug!(subsystem = "interp", "incomplete extended background"),
            },
            code => debug!(subsystem = "interp", code, "ignoring SGR code"),
        }
        i += 1;
    }
    grid.set_brush(brush);
}

/// Decode an extended-color introducer (`38`/`48` plus `5;n` or
/// `2;r;g;b`). Returns the color and the number of extra parameters
/// consumed.
fn extended_color(params: &[u16]) -> Option<(Color, usize)> {
    match params.get(1)? {
        5 => {
            let n = *params.get(2)?;
            Some((color_256(n), 2))
        }
        2 => {
            if params.len() < 5 {
                return None;
            }
            let r = params[2].min(255) as u8;
            let g = params[3].min(255) as u8;
            let b = params[4].min(255) as u8;
            Some((Color::rgb(r, g, b), 4))
        }
        _ => None,
    }
}

/// Map a 256-color palette index to RGB: the two 8-entry palettes, the
/// 6x6x6 cube, then the grayscale ramp.
fn color_256(n: u16) -> Color {
    match n {
        0..=7 => NORMAL_PALETTE[n as usize],
        8..=15 => BRIGHT_PALETTE[(n - 8) as usize],
        16..=231 => {
            let idx = (n - 16) as usize;
            Color::rgb(
                CUBE_LEVELS[idx / 36],
                CUBE_LEVELS[idx / 6 % 6],
                CUBE_LEVELS[idx % 6],
            )
        }
        232..=255 => {
            let gray = (8 + (n - 232) * 10) as u8;
            Color::rgb(gray, gray, gray)
        }
        _ => Color::DEFAULT_FG,
    }
}

fn write_reply(reply: &mut dyn Write, bytes: &[u8]) {
    if let Err(e) = reply.write_all(bytes) {
        error!(subsystem = "interp", error = %e, "failed to write reply to PTY");
    }
}
