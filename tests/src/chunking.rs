//! Parser chunking properties
//!
//! The parser must behave identically however the byte stream is cut
//! into read chunks, and must consume arbitrary input without losing
//! the screen invariants.

use runeterm_grid::Grid;
use runeterm_pty::parser::{Operation, Parser};
use runeterm_pty::translate;

const MIXED_INPUT: &[u8] =
    b"ls -l\r\n\x1b[1;31mred\x1b[0m \x1b[38;5;216mcube\x1b[m\x1b[?1049h\x1b[2;4r\
      \x1b]0;title\x07\x1b[5;10Hdeep\x1b[?1049l\x1b[c tail";

fn parse_whole(input: &[u8]) -> Vec<Operation> {
    Parser::new().parse(input)
}

#[test]
fn every_split_point_yields_the_same_operations() {
    let whole = parse_whole(MIXED_INPUT);
    for split in 0..=MIXED_INPUT.len() {
        let mut parser = Parser::new();
        let mut ops = parser.parse(&MIXED_INPUT[..split]);
        ops.extend(parser.parse(&MIXED_INPUT[split..]));
        assert_eq!(ops, whole, "split at byte {}", split);
    }
}

#[test]
fn byte_at_a_time_matches_contiguous_parse() {
    let whole = parse_whole(MIXED_INPUT);
    let mut parser = Parser::new();
    let mut ops = Vec::new();
    for &b in MIXED_INPUT {
        ops.extend(parser.parse(&[b]));
    }
    assert_eq!(ops, whole);
}

#[test]
fn arbitrary_bytes_never_break_the_grid_invariants() {
    let mut grid = Grid::new(7, 5);
    let mut parser = Parser::new();
    let mut reply: Vec<u8> = Vec::new();

    // Every byte value, repeatedly, with shifting phase so sequences
    // land across chunk boundaries in different ways.
    let soup: Vec<u8> = (0..=255u8).cycle().take(3000).collect();
    for chunk in soup.chunks(17) {
        for op in parser.parse(chunk) {
            translate::apply(&mut grid, &mut reply, &op);

            let cursor = grid.cursor();
            let size = grid.size();
            assert!(cursor.x < size.cols, "cursor x out of bounds");
            assert!(cursor.y < size.rows, "cursor y out of bounds");
        }
    }
    assert_eq!(grid.snapshot().len(), 7 * 5);
}

#[test]
fn interleaved_sessions_do_not_share_state() {
    let mut a = Parser::new();
    let mut b = Parser::new();

    // Leave parser `a` mid-CSI, then run a full sequence through `b`.
    assert!(a.parse(b"\x1b[1;").is_empty());
    let ops = b.parse(b"\x1b[2J");
    assert_eq!(
        ops,
        vec![Operation::Csi {
            final_byte: 'J',
            intermediates: String::new(),
            params: vec![2],
        }]
    );

    // Parser `a` still finishes its own sequence with its own params.
    let ops = a.parse(b"31m");
    assert_eq!(
        ops,
        vec![Operation::Csi {
            final_byte: 'm',
            intermediates: String::new(),
            params: vec![1, 31],
        }]
    );
}
