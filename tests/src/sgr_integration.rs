//! SGR integration between the parser, interpreter and grid

use runeterm_grid::{Brush, Cell, CellAttrs, Color, Grid};
use runeterm_pty::parser::Parser;
use runeterm_pty::translate;

fn run(grid: &mut Grid, input: &[u8]) {
    let mut parser = Parser::new();
    let mut reply: Vec<u8> = Vec::new();
    for op in parser.parse(input) {
        translate::apply(grid, &mut reply, &op);
    }
}

fn cell_at(grid: &Grid, x: usize, y: usize) -> Cell {
    grid.snapshot()[y * grid.size().cols + x]
}

#[test]
fn test_sgr_paints_following_text_only() {
    let mut grid = Grid::new(20, 5);
    run(&mut grid, b"\x1b[1;31mHello\x1b[0m World");

    // "Hello" is bold red.
    let h = cell_at(&grid, 0, 0);
    assert_eq!(h.ch, 'H');
    assert!(h.brush.attrs.contains(CellAttrs::BOLD));
    assert_eq!(h.brush.fg, Color::rgb(205, 49, 49));

    let o = cell_at(&grid, 4, 0);
    assert_eq!(o.ch, 'o');
    assert!(o.brush.attrs.contains(CellAttrs::BOLD));

    // " World" is back to the default brush.
    let w = cell_at(&grid, 6, 0);
    assert_eq!(w.ch, 'W');
    assert_eq!(w.brush, Brush::default());
}

#[test]
fn test_sgr_survives_chunked_delivery() {
    let mut grid = Grid::new(20, 5);
    let mut parser = Parser::new();
    let mut reply: Vec<u8> = Vec::new();

    // The color sequence arrives split across reads.
    for part in [b"\x1b[38;5;".as_slice(), b"216m", b"x"] {
        for op in parser.parse(part) {
            translate::apply(&mut grid, &mut reply, &op);
        }
    }

    let x = cell_at(&grid, 0, 0);
    assert_eq!(x.ch, 'x');
    assert_eq!(x.brush.fg, Color::rgb(255, 175, 135));
}

#[test]
fn test_invert_flag_reaches_cells() {
    let mut grid = Grid::new(10, 2);
    run(&mut grid, b"\x1b[7mab\x1b[27mc");

    assert!(cell_at(&grid, 0, 0).brush.attrs.contains(CellAttrs::INVERT));
    assert!(cell_at(&grid, 1, 0).brush.attrs.contains(CellAttrs::INVERT));
    assert!(!cell_at(&grid, 2, 0).brush.attrs.contains(CellAttrs::INVERT));
}

#[test]
fn test_background_colors_paint_cleared_cells() {
    let mut grid = Grid::new(4, 2);
    run(&mut grid, b"\x1b[44m\x1b[2J");

    // Erases use the current brush, so the background sticks.
    let blank = cell_at(&grid, 3, 1);
    assert_eq!(blank.ch, ' ');
    assert_eq!(blank.brush.bg, Color::rgb(36, 114, 200));
}

#[test]
fn test_direct_rgb_round_trip() {
    let mut grid = Grid::new(10, 1);
    run(&mut grid, b"\x1b[38;2;10;20;30m\x1b[48;2;40;50;60mz");

    let z = cell_at(&grid, 0, 0);
    assert_eq!(z.brush.fg, Color::rgb(10, 20, 30));
    assert_eq!(z.brush.bg, Color::rgb(40, 50, 60));
}

#[test]
fn test_grayscale_ramp_ends() {
    let mut grid = Grid::new(4, 1);
    run(&mut grid, b"\x1b[38;5;232m");
    assert_eq!(grid.brush().fg, Color::rgb(8, 8, 8));
    run(&mut grid, b"\x1b[38;5;255m");
    assert_eq!(grid.brush().fg, Color::rgb(238, 238, 238));
}
