//! Integration tests for the `words`, `chars` and `search` subcommands.

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    Command::cargo_bin("textpool").unwrap()
}

const HELLO: &[u8] = b"BT /F1 12 Tf 72 720 Td (Hello World) Tj ET";

// --- words ---

#[test]
fn words_text_format_lists_boxes() {
    cmd()
        .args(["words", "-"])
        .write_stdin(HELLO)
        .assert()
        .success()
        .stdout(predicate::str::contains("text\tx0\ty0\tx1\ty1\tsize\trotation"))
        .stdout(predicate::str::contains("Hello\t72.00\t717.00\t102.00\t729.00\t12.00\t0"))
        .stdout(predicate::str::contains("World\t105.00"));
}

#[test]
fn words_json_format() {
    let output = cmd()
        .args(["words", "-", "--format", "json"])
        .write_stdin(HELLO)
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let words = json.as_array().unwrap();
    assert_eq!(words.len(), 2);
    assert_eq!(words[0]["text"], "Hello");
    assert_eq!(words[1]["x0"], 105.0);
    assert_eq!(words[1]["rotation"], "0");
}

#[test]
fn words_csv_format() {
    cmd()
        .args(["words", "-", "--format", "csv", "--rotate", "90"])
        .write_stdin(HELLO)
        .assert()
        .success()
        .stdout(predicate::str::contains("text,x0,y0,x1,y1,size,rotation"))
        .stdout(predicate::str::contains(",270\n"));
}

// --- chars ---

#[test]
fn chars_text_format_includes_spaces() {
    let output = cmd()
        .args(["chars", "-"])
        .write_stdin(HELLO)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    // Header plus one row per glyph.
    assert_eq!(stdout.lines().count(), 12);
    assert!(stdout.contains("H\t72.00\t720.00\t6.00\t0.00\t12.00\t0\tF1"));
}

// --- search ---

#[test]
fn search_finds_match_with_box() {
    cmd()
        .args(["search", "-", "World"])
        .write_stdin(HELLO)
        .assert()
        .success()
        .stdout(predicate::str::contains("World\t105.00\t717.00\t135.00\t729.00"));
}

#[test]
fn search_across_words() {
    cmd()
        .args(["search", "-", "o w", "--ignore-case", "--format", "csv"])
        .write_stdin(HELLO)
        .assert()
        .success()
        .stdout(predicate::str::contains("o W,72.00"));
}

#[test]
fn search_literal_escapes_regex() {
    cmd()
        .args(["search", "-", "H.llo", "--literal"])
        .write_stdin(HELLO)
        .assert()
        .success()
        .stdout("text\tx0\ty0\tx1\ty1\n");

    cmd()
        .args(["search", "-", "H.llo"])
        .write_stdin(HELLO)
        .assert()
        .success()
        .stdout(predicate::str::contains("Hello\t72.00"));
}

#[test]
fn search_invalid_regex_exits_with_error() {
    cmd()
        .args(["search", "-", "(unclosed"])
        .write_stdin(HELLO)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error"));
}
