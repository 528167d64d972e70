use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span, Text};

use seashell::output::{Layout, Output};

#[test]
fn text_str_round_trips() {
    let payload = Output::text("hello world");
    assert_eq!(payload.str(), "hello world");
}

#[test]
fn text_items_split_on_line_breaks() {
    let payload = Output::text("a\nb\nc");
    assert_eq!(
        payload.items(),
        vec![Output::text("a"), Output::text("b"), Output::text("c")]
    );
}

#[test]
fn array_items_round_trip() {
    let members = vec![Output::text("a"), Output::text("b")];
    let payload = Output::rows(members.clone());
    assert_eq!(payload.items(), members);
}

#[test]
fn array_str_joins_members_with_newlines() {
    let payload = Output::rows(vec![Output::text("3"), Output::text("4"), Output::text("5")]);
    assert_eq!(payload.str(), "3\n4\n5");
}

#[test]
fn nested_array_flattens_through_str() {
    let inner = Output::rows(vec![Output::text("x"), Output::text("y")]);
    let payload = Output::rows(vec![Output::text("a"), inner]);
    assert_eq!(payload.str(), "a\nx\ny");
}

#[test]
fn object_yields_itself_from_items() {
    let payload = Output::Object(serde_json::json!({"pid": 3}));
    assert_eq!(payload.items(), vec![payload.clone()]);
}

#[test]
fn object_string_form() {
    let payload = Output::Object(serde_json::json!("plain"));
    assert_eq!(payload.str(), "plain");

    let payload = Output::Object(serde_json::json!(42));
    assert_eq!(payload.str(), "42");
}

#[test]
fn raw_preserves_styling_through_render() {
    let styled = Text::from(Line::from(Span::styled(
        "danger",
        Style::default().fg(Color::Red),
    )));
    let payload = Output::Raw(styled.clone());
    assert_eq!(payload.render(), styled);
    assert_eq!(payload.str(), "danger");
}

#[test]
fn raw_items_split_per_line() {
    let raw = Text::from(vec![Line::from("one"), Line::from("two")]);
    let items = Output::Raw(raw).items();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].str(), "one");
    assert_eq!(items[1].str(), "two");
}

#[test]
fn columns_render_on_a_single_line() {
    let payload = Output::columns(vec![Output::text("a"), Output::text("b"), Output::text("c")]);
    let rendered = payload.render();
    assert_eq!(rendered.lines.len(), 1);
    let flat: String = rendered.lines[0]
        .spans
        .iter()
        .map(|s| s.content.as_ref())
        .collect();
    assert_eq!(flat, "a  b  c");
}

#[test]
fn rows_render_one_line_per_member() {
    let payload = Output::Array(
        vec![Output::text("a"), Output::text("b")],
        Layout::Rows,
    );
    assert_eq!(payload.render().lines.len(), 2);
}
