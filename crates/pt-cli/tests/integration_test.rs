//! Integration tests for the probtree pipeline.
//!
//! These tests verify the end-to-end flow from raw text to the serialized
//! element list the graph view consumes.

use pt_core::{CompileError, GraphElement};
use pt_parser::{parse_text, parse_tree};

/// The canonical coin-flip example compiles to the documented element list.
#[test]
fn coin_flip_compiles_end_to_end() {
    let input = "Coin Flip\n  Heads (50%)\n  Tails (50%)";

    let elements = parse_text(input, 0).expect("coin flip should compile");
    assert_eq!(elements.iter().filter(|e| e.is_node()).count(), 3);
    assert_eq!(elements.iter().filter(|e| e.is_edge()).count(), 2);

    let json = serde_json::to_value(&elements).expect("elements serialize");
    let array = json.as_array().expect("array");

    assert_eq!(array[0]["group"], "nodes");
    assert_eq!(array[0]["data"]["id"], "n0");
    assert_eq!(array[0]["data"]["label"], "Coin Flip");
    assert_eq!(array[0]["data"]["prob"], "");

    let edge = array
        .iter()
        .find(|element| element["group"] == "edges")
        .expect("at least one edge");
    assert_eq!(edge["data"]["source"], "n0");
    assert_eq!(edge["data"]["label"], "50%");
}

/// Node dimensions are present, positive, and deterministic.
#[test]
fn compiled_nodes_carry_display_dimensions() {
    let input = "Root with a fairly long label that wraps\n  Leaf (1)";

    let first = parse_text(input, 0).expect("should compile");
    let second = parse_text(input, 0).expect("should compile");
    assert_eq!(first, second);

    for element in &first {
        if let GraphElement::Node { data } = element {
            assert!(data.width > 0, "node {} has zero width", data.id);
            assert!(data.height > 0, "node {} has zero height", data.id);
        }
    }

    // The wrapped root must be taller than the single-line leaf.
    let heights: Vec<u32> = first
        .iter()
        .filter_map(|element| match element {
            GraphElement::Node { data } => Some(data.height),
            GraphElement::Edge { .. } => None,
        })
        .collect();
    assert!(heights[0] > heights[1]);
}

/// Invalid input fails with a located error instead of partial output.
#[test]
fn errors_are_line_located() {
    let cases = [
        ("  Indented Root", 1),
        ("Root\nSecond Root", 2),
        ("Root\n  A\n    B\n A2", 4),
        ("Root\n  A (150%)", 2),
        ("Root\n  A (0.2)\n  B (0.2)", 1),
    ];

    for (input, expected_line) in cases {
        let error = parse_text(input, 0).expect_err("should fail");
        assert_eq!(
            error.line(),
            expected_line,
            "input {input:?} reported line {}",
            error.line()
        );
    }
}

/// The starting line offset shifts every reported error line.
#[test]
fn starting_line_offsets_error_lines() {
    let error = parse_text("Root\n  Bad (x%)", 0);
    // "(x%)" is not numeric-looking, so it stays in the label; no error.
    assert!(error.is_ok());

    let error = parse_text("Root\n  Bad (5x%)", 100).expect_err("should fail");
    assert!(matches!(
        error,
        CompileError::ProbabilityRange { line: 102, .. }
    ));
}

/// Inputs read from disk behave identically to in-memory text.
#[test]
fn file_input_round_trips() {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    let text = "Weather\n  Rain (30%)\n  Dry (70%)";
    file.write_all(text.as_bytes()).expect("write temp file");

    let from_disk = std::fs::read_to_string(file.path()).expect("read temp file");
    assert_eq!(parse_text(&from_disk, 0), parse_text(text, 0));
}

/// The resolved tree exposes cumulative path probabilities for tooling.
#[test]
fn resolved_tree_reports_cumulative_probabilities() {
    let tree = parse_tree("Game\n  Win (0.6)\n    Bonus (0.5)\n  Lose (0.4)", 0)
        .expect("should parse")
        .expect("has a root");

    assert_eq!(tree.cumulative, Some(1.0));
    let win = &tree.children[0];
    assert_eq!(win.cumulative, Some(0.6));
    let bonus = &win.children[0];
    assert!((bonus.cumulative.expect("fully annotated path") - 0.3).abs() < 1e-12);
}

/// Deep chains compile with one edge per link.
#[test]
fn deep_chain_compiles_linearly() {
    let mut input = String::from("L0\n");
    for depth in 1..32 {
        input.push_str(&" ".repeat(depth * 2));
        input.push_str(&format!("L{depth}\n"));
    }

    let elements = parse_text(&input, 0).expect("should compile");
    assert_eq!(elements.iter().filter(|e| e.is_node()).count(), 32);
    assert_eq!(elements.iter().filter(|e| e.is_edge()).count(), 31);
}
