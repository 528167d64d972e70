//! head / tail / grep item semantics over live pipelines.

mod common;

use common::Harness;

fn seeded() -> Harness {
    Harness::builder()
        .file("a", "")
        .file("ab", "")
        .file("abc", "")
        .file("zz", "")
        .build()
}

#[test]
fn head_takes_the_first_n_items() {
    let mut h = seeded();
    h.line("ls | head 2");
    let screen = h.screen();
    assert!(screen.contains("a\nab"));
    assert!(!screen.contains("abc"));
    assert_eq!(h.status(), "0");
}

#[test]
fn head_flushes_short_input_on_eof() {
    let mut h = Harness::new();
    h.line("echo solo | head 5");
    assert!(h.screen().ends_with("solo"));
    assert_eq!(h.status(), "0");
}

#[test]
fn head_rejects_bad_count() {
    let mut h = Harness::new();
    h.line("head potato");
    assert!(h.screen().contains("head: invalid count: potato"));
    assert_eq!(h.status(), "1");
}

#[test]
fn tail_keeps_the_last_n_items() {
    let mut h = Harness::new();
    h.line("cat | tail 3");
    for n in 1..=5 {
        h.line(&n.to_string());
    }
    h.ctrl('d');
    assert!(h.screen().ends_with("3\n4\n5"));
    assert_eq!(h.status(), "0");
}

#[test]
fn tail_of_empty_stream_emits_nothing() {
    let mut h = Harness::new();
    h.line("cat | tail 3");
    let before = h.screen();
    h.ctrl('d');
    assert_eq!(h.screen(), before);
    assert_eq!(h.status(), "0");
}

#[test]
fn grep_filters_items_by_regex() {
    let mut h = seeded();
    h.line("ls | grep ^a");
    let screen = h.screen();
    assert!(screen.ends_with("a\nab\nabc"));
    assert!(!screen.ends_with("zz"));
    assert_eq!(h.status(), "0");
}

#[test]
fn grep_without_match_exits_one() {
    let mut h = Harness::new();
    h.line("echo hello | grep xyz");
    assert_eq!(h.status(), "1");
    // Nothing beyond the echoed command line reached the pane.
    assert!(h.screen().ends_with("echo hello | grep xyz"));
}

#[test]
fn grep_invalid_pattern_fails_the_job() {
    let mut h = Harness::new();
    h.line("echo x | grep [");
    assert!(h.screen().contains("grep: invalid pattern"));
    assert_eq!(h.status(), "1");
}

#[test]
fn grep_missing_operand() {
    let mut h = Harness::new();
    h.line("grep");
    assert!(h.screen().contains("grep: missing operand"));
    assert_eq!(h.status(), "1");
}

#[test]
fn filters_compose() {
    let mut h = seeded();
    h.line("ls | grep ^a | tail 2");
    assert!(h.screen().ends_with("ab\nabc"));
    assert_eq!(h.status(), "0");
}
