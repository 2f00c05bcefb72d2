//! runeterm screen buffer
//!
//! Terminal grid model: painted cells, the dual primary/alternate
//! buffer, cursor and scroll-margin state, and render snapshots.

#![warn(missing_docs)]
#![deny(unsafe_code)]

use bitflags::bitflags;
use std::fmt::{self, Write as _};
use tracing::debug;

/// A 24-bit RGB color, implicitly opaque.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    /// Red component (0-255)
    pub r: u8,
    /// Green component (0-255)
    pub g: u8,
    /// Blue component (0-255)
    pub b: u8,
}

impl Color {
    /// Create a new RGB color
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Default foreground color of the theme
    pub const DEFAULT_FG: Color = Color::rgb(0xeb, 0xdb, 0xb2);

    /// Default background color of the theme
    pub const DEFAULT_BG: Color = Color::rgb(0x28, 0x28, 0x28);
}

bitflags! {
    /// Cell attribute flags for styling
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CellAttrs: u8 {
        /// Bold text
        const BOLD = 1 << 0;
        /// Inverted colors (fg/bg swapped by the renderer)
        const INVERT = 1 << 1;
        /// Blinking cell (also used to mark the cursor in snapshots)
        const BLINK = 1 << 2;
    }
}

/// The graphic-rendition state applied to newly written cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Brush {
    /// Foreground color
    pub fg: Color,
    /// Background color
    pub bg: Color,
    /// Attribute flags
    pub attrs: CellAttrs,
}

impl Default for Brush {
    fn default() -> Self {
        Self {
            fg: Color::DEFAULT_FG,
            bg: Color::DEFAULT_BG,
            attrs: CellAttrs::empty(),
        }
    }
}

/// A single grid cell: a character painted with a brush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    /// The character occupying the cell
    pub ch: char,
    /// The brush the character was painted with
    pub brush: Brush,
}

/// Zero-based cursor position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    /// Column, `0..cols`
    pub x: usize,
    /// Row, `0..rows`
    pub y: usize,
}

/// Grid dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    /// Number of rows
    pub rows: usize,
    /// Number of columns
    pub cols: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActiveBuffer {
    Primary,
    Alternate,
}

/// The terminal screen buffer.
///
/// Owns two equally sized line matrices (primary and alternate); only
/// the active one is written to and rendered. Carries the cursor, the
/// current brush, the scrolling margins, origin mode, and the deferred
/// soft-wrap flag.
#[derive(Debug)]
pub struct Grid {
    lines: Vec<Vec<Cell>>,
    alternate_lines: Vec<Vec<Cell>>,
    active: ActiveBuffer,
    size: Size,
    cursor: Cursor,
    saved_cursor: Cursor,
    // Set after writing into the last column: the next write performs
    // CR+LF first. Without this, the last cell of the last row could
    // never be filled without scrolling.
    pending_wrap: bool,
    scroll_top: usize,
    scroll_bottom: usize,
    // When origin mode is on, cursor addressing is relative to the
    // scroll margins and the cursor cannot leave them.
    origin_mode: bool,
    brush: Brush,
}

impl Grid {
    /// Create a blank `cols x rows` grid with default brush and the
    /// scroll area covering the whole screen.
    pub fn new(cols: usize, rows: usize) -> Self {
        debug_assert!(cols > 0 && rows > 0, "grid dimensions must be non-zero");
        let size = Size { rows, cols };
        let mut grid = Self {
            lines: Vec::new(),
            alternate_lines: Vec::new(),
            active: ActiveBuffer::Primary,
            size,
            cursor: Cursor::default(),
            saved_cursor: Cursor::default(),
            pending_wrap: false,
            scroll_top: 0,
            scroll_bottom: rows,
            origin_mode: false,
            brush: Brush::default(),
        };
        grid.lines = grid.make_lines(size);
        grid.alternate_lines = grid.make_lines(size);
        grid
    }

    /// Current grid dimensions
    pub fn size(&self) -> Size {
        self.size
    }

    /// Current cursor position
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// Current scroll area as a half-open `[top, bottom)` row range
    pub fn scroll_area(&self) -> (usize, usize) {
        (self.scroll_top, self.scroll_bottom)
    }

    /// Current brush
    pub fn brush(&self) -> Brush {
        self.brush
    }

    /// Replace the current brush
    pub fn set_brush(&mut self, brush: Brush) {
        self.brush = brush;
    }

    /// Restore the default brush
    pub fn reset_brush(&mut self) {
        self.brush = Brush::default();
    }

    fn blank_cell(&self) -> Cell {
        Cell {
            ch: ' ',
            brush: self.brush,
        }
    }

    fn new_line(&self) -> Vec<Cell> {
        vec![self.blank_cell(); self.size.cols]
    }

    fn make_lines(&self, size: Size) -> Vec<Vec<Cell>> {
        (0..size.rows).map(|_| vec![self.blank_cell(); size.cols]).collect()
    }

    fn min_y(&self) -> usize {
        if self.origin_mode {
            self.scroll_top
        } else {
            0
        }
    }

    fn max_y(&self) -> usize {
        if self.origin_mode {
            self.scroll_bottom
        } else {
            self.size.rows
        }
    }

    fn in_scroll_area(&self, y: usize) -> bool {
        (self.scroll_top..self.scroll_bottom).contains(&y)
    }

    /// Write a printable character at the cursor with the current
    /// brush.
    ///
    /// Wrapping is deferred: filling the last column sets a flag and
    /// leaves the cursor in place; the wrap (CR+LF, possibly a scroll)
    /// happens just before the next write.
    pub fn write_char(&mut self, ch: char) {
        if self.pending_wrap {
            self.pending_wrap = false;
            self.cr();
            self.lf();
        }
        self.lines[self.cursor.y][self.cursor.x] = Cell {
            ch,
            brush: self.brush,
        };
        if self.cursor.x + 1 >= self.size.cols {
            self.pending_wrap = true;
        } else {
            self.cursor.x += 1;
        }
    }

    /// Carriage return: column 0 on the current row.
    pub fn cr(&mut self) {
        let y = self.cursor.y;
        self.set_cursor(0, y);
    }

    /// Line feed. At the bottom margin the scroll area scrolls up one
    /// line instead of the cursor advancing.
    pub fn lf(&mut self) {
        self.pending_wrap = false;
        self.cursor.y += 1;
        if self.cursor.y >= self.scroll_bottom {
            self.scroll_up(1);
            self.cursor.y -= 1;
        }
    }

    /// Reverse index: move up one row; at the top margin the scroll
    /// area scrolls down instead. Above the top margin the cursor
    /// simply decrements (floored at row 0).
    pub fn reverse_index(&mut self) {
        if self.cursor.y == self.scroll_top {
            self.scroll_down(1);
        } else {
            self.cursor.y = self.cursor.y.saturating_sub(1);
        }
    }

    /// Scroll the scroll area up by `n` lines, filling the vacated
    /// bottom rows with blanks in the current brush.
    pub fn scroll_up(&mut self, n: usize) {
        let n = n.min(self.scroll_bottom - self.scroll_top);
        if n == 0 {
            return;
        }
        self.lines[self.scroll_top..self.scroll_bottom].rotate_left(n);
        let blank = self.new_line();
        for row in self.scroll_bottom - n..self.scroll_bottom {
            self.lines[row] = blank.clone();
        }
    }

    /// Scroll the scroll area down by `n` lines, filling the vacated
    /// top rows with blanks in the current brush.
    pub fn scroll_down(&mut self, n: usize) {
        let n = n.min(self.scroll_bottom - self.scroll_top);
        if n == 0 {
            return;
        }
        self.lines[self.scroll_top..self.scroll_bottom].rotate_right(n);
        let blank = self.new_line();
        for row in self.scroll_top..self.scroll_top + n {
            self.lines[row] = blank.clone();
        }
    }

    /// Set the scroll area to the half-open row range `[top, bottom)`,
    /// clamped so that it is always a non-empty range within the grid,
    /// and home the cursor to the top-left of the area.
    pub fn set_scroll_area(&mut self, top: usize, bottom: usize) {
        self.scroll_top = top.min(self.size.rows - 1);
        self.scroll_bottom = bottom.clamp(self.scroll_top + 1, self.size.rows);
        let top = self.scroll_top;
        self.set_cursor(0, top);
    }

    /// Enable or disable origin mode and home the cursor.
    pub fn set_origin_mode(&mut self, enabled: bool) {
        self.origin_mode = enabled;
        self.set_cursor(0, 0);
    }

    /// Place the cursor, clamping into the addressable area (the whole
    /// grid, or the scroll margins under origin mode).
    pub fn set_cursor(&mut self, x: usize, y: usize) {
        self.cursor = Cursor {
            x: x.min(self.size.cols - 1),
            y: y.clamp(self.min_y(), self.max_y() - 1),
        };
        self.pending_wrap = false;
    }

    /// Move the cursor relative to its current position. Vertical
    /// movement does not cross the scroll margins when the cursor
    /// starts inside them.
    pub fn move_cursor(&mut self, dx: isize, dy: isize) {
        let x = (self.cursor.x as isize + dx).max(0) as usize;
        let mut y = self.cursor.y as isize + dy;
        if dy != 0 && self.in_scroll_area(self.cursor.y) {
            y = y.clamp(self.scroll_top as isize, self.scroll_bottom as isize - 1);
        }
        self.set_cursor(x, y.max(0) as usize);
    }

    /// Move the cursor one column left, stopping at the left edge.
    /// Cells are not modified.
    pub fn backspace(&mut self) {
        if self.cursor.x > 0 {
            self.cursor.x -= 1;
        }
    }

    /// Move the cursor to the next multiple-of-8 tab stop, capped at
    /// the last column.
    pub fn tab(&mut self) {
        let next = (self.cursor.x / 8 * 8) + 8;
        if next < self.size.cols {
            self.cursor.x = next;
        } else {
            self.cursor.x = self.size.cols - 1;
        }
    }

    /// Overwrite the rows in `[start, end)` with blanks in the current
    /// brush. The range is clamped; an inverted range is a no-op.
    pub fn clear_lines(&mut self, start: usize, end: usize) {
        let s = start.min(self.size.rows);
        let e = end.min(self.size.rows);
        let blank = self.blank_cell();
        for row in s..e {
            self.lines[row].fill(blank);
        }
    }

    /// Overwrite the columns `[start, end)` of the cursor's row with
    /// blanks in the current brush. The range is clamped; an inverted
    /// range is a no-op.
    pub fn clear_in_line(&mut self, start: usize, end: usize) {
        let s = start.min(self.size.cols);
        let e = end.min(self.size.cols);
        if s >= e {
            return;
        }
        let blank = self.blank_cell();
        self.lines[self.cursor.y][s..e].fill(blank);
    }

    /// Delete `n` characters at the cursor, shifting the rest of the
    /// line left and padding the tail with blanks.
    pub fn delete_chars(&mut self, n: usize) {
        let Cursor { x, y } = self.cursor;
        let cols = self.size.cols;
        let n = n.min(cols - x);
        if n == 0 {
            return;
        }
        let blank = self.blank_cell();
        let line = &mut self.lines[y];
        line.copy_within(x + n..cols, x);
        line[cols - n..].fill(blank);
    }

    /// Delete `n` lines starting at the cursor row, shifting the rest
    /// of the scroll area up and padding its bottom with blanks. A
    /// cursor outside the scroll area makes this a no-op.
    pub fn delete_lines(&mut self, n: usize) {
        let y = self.cursor.y;
        if !self.in_scroll_area(y) {
            return;
        }
        let n = n.min(self.scroll_bottom - y);
        if n == 0 {
            return;
        }
        self.lines[y..self.scroll_bottom].rotate_left(n);
        let blank = self.new_line();
        for row in self.scroll_bottom - n..self.scroll_bottom {
            self.lines[row] = blank.clone();
        }
    }

    /// Snapshot the cursor position.
    pub fn save_cursor(&mut self) {
        self.saved_cursor = self.cursor;
    }

    /// Restore the last saved cursor position, clamped to the current
    /// bounds.
    pub fn restore_cursor(&mut self) {
        let Cursor { x, y } = self.saved_cursor;
        self.set_cursor(x, y);
    }

    /// Switch to the alternate buffer: swap the matrices, clear the
    /// now-active one and home the cursor. No-op when already active.
    pub fn switch_to_alternate(&mut self) {
        if self.active == ActiveBuffer::Alternate {
            return;
        }
        std::mem::swap(&mut self.lines, &mut self.alternate_lines);
        self.active = ActiveBuffer::Alternate;
        let rows = self.size.rows;
        self.clear_lines(0, rows);
        self.set_cursor(0, 0);
    }

    /// Switch back to the primary buffer. The alternate's contents are
    /// left in place (they are discarded on the next entry). No-op when
    /// already active.
    pub fn switch_to_primary(&mut self) {
        if self.active == ActiveBuffer::Primary {
            return;
        }
        std::mem::swap(&mut self.lines, &mut self.alternate_lines);
        self.active = ActiveBuffer::Primary;
        self.pending_wrap = false;
    }

    /// Resize both buffers, discarding their contents. The scroll area
    /// resets to the whole screen and the cursor clamps to the new
    /// bounds. Returns whether the dimensions actually changed.
    pub fn resize(&mut self, size: Size) -> bool {
        if self.size == size {
            debug!(subsystem = "grid", "ignoring same-size resize");
            return false;
        }
        debug!(
            subsystem = "grid",
            rows = size.rows,
            cols = size.cols,
            "resizing grid"
        );
        self.size = size;
        self.lines = self.make_lines(size);
        self.alternate_lines = self.make_lines(size);
        self.scroll_top = 0;
        self.scroll_bottom = size.rows;
        let Cursor { x, y } = self.cursor;
        self.set_cursor(x, y);
        true
    }

    /// Produce a defensive `rows x cols` copy of the active buffer for
    /// rendering, with the cell under the cursor marked blinking.
    pub fn snapshot(&self) -> Vec<Cell> {
        let mut out = Vec::with_capacity(self.size.rows * self.size.cols);
        for (ri, row) in self.lines.iter().enumerate() {
            for (ci, cell) in row.iter().enumerate() {
                let mut cell = *cell;
                if self.cursor.x == ci && self.cursor.y == ri {
                    cell.brush.attrs |= CellAttrs::BLINK;
                }
                out.push(cell);
            }
        }
        out
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.lines {
            for cell in row {
                f.write_char(cell.ch)?;
            }
            f.write_char('\n')?;
        }
        Ok(())
    }
}
