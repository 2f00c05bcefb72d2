//! End-to-end VT scenarios
//!
//! Byte streams through the full parser -> interpreter -> grid
//! pipeline, checking the screen contents, cursor placement and the
//! device-attribute replies a real client would observe.

use runeterm_grid::{CellAttrs, Color, Cursor, Grid};
use runeterm_pty::parser::Parser;
use runeterm_pty::translate;

/// Feed `input` through a fresh parser into the grid, collecting reply
/// bytes.
fn run(grid: &mut Grid, input: &[u8]) -> Vec<u8> {
    let mut parser = Parser::new();
    let mut reply = Vec::new();
    for op in parser.parse(input) {
        translate::apply(grid, &mut reply, &op);
    }
    reply
}

#[test]
fn deferred_wrap_fills_the_last_cell() {
    let mut grid = Grid::new(2, 2);
    run(&mut grid, b"aaaa");
    assert_eq!(grid.to_string(), "aa\naa\n");

    // Only the next write triggers the wrap and the scroll.
    run(&mut grid, b"b");
    assert_eq!(grid.to_string(), "aa\nb \n");
}

#[test]
fn scroll_region_scrolls_inner_rows_only() {
    let mut grid = Grid::new(1, 5);
    run(&mut grid, b"a\r\nb\r\nc\r\nd\r\ne");
    assert_eq!(grid.to_string(), "a\nb\nc\nd\ne\n");

    grid.set_scroll_area(1, 4);
    grid.scroll_up(2);
    assert_eq!(grid.to_string(), "a\nd\n \n \ne\n");
}

#[test]
fn reverse_index_inside_scroll_region() {
    let mut grid = Grid::new(1, 5);
    run(&mut grid, b"a\r\nb\r\nc\r\nd");
    run(&mut grid, b"\x1b[2;4r");
    assert_eq!(grid.cursor(), Cursor { x: 0, y: 1 });

    run(&mut grid, b"\x1bM");
    assert_eq!(grid.to_string(), "a\n \nb\nc\n \n");

    run(&mut grid, b"\x1bM");
    assert_eq!(grid.to_string(), "a\n \n \nb\n \n");
}

#[test]
fn cursor_up_uses_default_and_clamps() {
    let mut grid = Grid::new(10, 5);
    run(&mut grid, b"\x1b[5;1H\x1b[A");
    assert_eq!(grid.cursor(), Cursor { x: 0, y: 3 });

    run(&mut grid, b"\x1b[39A");
    assert_eq!(grid.cursor(), Cursor { x: 0, y: 0 });
}

#[test]
fn alternate_screen_round_trip_preserves_primary() {
    let mut grid = Grid::new(4, 4);
    run(&mut grid, b"ABCD");
    let saved = grid.cursor();

    run(&mut grid, b"\x1b[?1049h");
    assert_eq!(grid.to_string(), "    \n    \n    \n    \n");
    assert_eq!(grid.cursor(), Cursor { x: 0, y: 0 });

    // Writes on the alternate buffer never touch the primary.
    run(&mut grid, b"garbage\r\nmore");
    run(&mut grid, b"\x1b[?1049l");
    assert_eq!(grid.to_string(), "ABCD\n    \n    \n    \n");
    assert_eq!(grid.cursor(), saved);
}

#[test]
fn control_byte_inside_escape_does_not_abort_it() {
    let mut grid = Grid::new(4, 2);
    grid.set_cursor(0, 1);

    // BEL between ESC and '[' executes without dropping the sequence,
    // so the CSI A afterwards still moves the cursor.
    run(&mut grid, b"\x1b\x07[A");
    assert_eq!(grid.cursor(), Cursor { x: 0, y: 0 });
}

#[test]
fn device_attribute_replies() {
    let mut grid = Grid::new(4, 2);
    assert_eq!(run(&mut grid, b"\x1b[c"), b"\x1b[?1;2c");
    assert_eq!(run(&mut grid, b"\x1b[>c"), b"\x1b[>0;0;0c");
    assert_eq!(run(&mut grid, b"plain text"), b"");
}

#[test]
fn sgr_256_color_cube_levels() {
    let mut grid = Grid::new(4, 1);
    run(&mut grid, b"\x1b[38;5;216m");
    // 216 - 16 = 200 -> cube cell (5, 3, 2).
    assert_eq!(grid.brush().fg, Color::rgb(255, 175, 135));

    run(&mut grid, b"\x1b[38;5;16mx");
    assert_eq!(grid.brush().fg, Color::rgb(0, 0, 0));
    let cell = grid.snapshot()[0];
    assert_eq!(cell.ch, 'x');
    assert_eq!(cell.brush.fg, Color::rgb(0, 0, 0));
    assert!(!cell.brush.attrs.contains(CellAttrs::BLINK));
}

#[test]
fn full_screen_program_session() {
    // A pager-like exchange: enter the alternate screen, set margins,
    // draw a header and body, scroll, then leave.
    let mut grid = Grid::new(8, 4);
    run(&mut grid, b"prompt$ ");

    run(&mut grid, b"\x1b[?1049h\x1b[2J\x1b[1;1HHEADER\x1b[2;4r\x1b[2;1H");
    run(&mut grid, b"line1\r\nline2\r\nline3\r\nline4");
    assert_eq!(grid.to_string(), "HEADER  \nline2   \nline3   \nline4   \n");

    run(&mut grid, b"\x1b[?1049l");
    assert_eq!(grid.to_string(), "prompt$ \n        \n        \n        \n");
}
