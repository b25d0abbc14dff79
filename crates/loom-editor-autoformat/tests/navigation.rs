mod common;

use common::Harness;
use insta::assert_snapshot;
use loom_editor_autoformat::EditorConfig;
use loom_editor_core::{Attributes, Delta, Embed, Key, KeydownResult, PlainDocument};

/// `a`, a divider, then `rest` as further lines.
fn with_divider(rest: &str) -> Harness {
    let contents = Delta::new()
        .insert("a\n")
        .insert_embed(Embed::new("divider", serde_json::Value::Bool(true)), Attributes::new())
        .insert("\n")
        .insert(rest);
    Harness::with_doc(PlainDocument::from_delta(contents), &EditorConfig::default())
}

#[test]
fn test_backspace_below_embed_selects_it() {
    let mut h = with_divider("b\n");
    h.doc.set_caret(4);

    assert_eq!(h.press_key(Key::Backspace), KeydownResult::Handled);
    assert_snapshot!(h.log(), @"select_embed(2)");
    assert_eq!(h.doc.selected_embed(), Some(2));
    assert_eq!(h.text(), "a\n\nb\n");
}

#[test]
fn test_backspace_on_empty_line_below_embed_removes_line() {
    let mut h = with_divider("\nb\n");
    h.doc.set_caret(4);

    assert_eq!(h.press_key(Key::Backspace), KeydownResult::Handled);
    assert_snapshot!(h.log(), @r"
    delete_text(4, 1, user)
    select_embed(2)
    ");
    assert_eq!(h.text(), "a\n\nb\n");
}

#[test]
fn test_backspace_on_last_empty_line_keeps_final_newline() {
    let mut h = with_divider("\n");
    // The divider is followed only by the document's final empty line.
    h.doc.set_caret(4);
    assert_eq!(h.doc.lines().len(), 3);

    assert_eq!(h.press_key(Key::Backspace), KeydownResult::Handled);
    assert_snapshot!(h.log(), @r"
    delete_text(3, 1, user)
    select_embed(2)
    ");
    assert_eq!(h.doc.lines().len(), 2);
}

#[test]
fn test_backspace_in_text_is_native() {
    let mut h = with_divider("bc\n");
    h.doc.set_caret(6);
    assert_eq!(h.press_key(Key::Backspace), KeydownResult::PassThrough);
    assert_eq!(h.text(), "a\n\nb\n");
}

#[test]
fn test_arrows_select_adjacent_embeds() {
    let mut h = with_divider("b\n");

    h.doc.set_caret(1);
    assert_eq!(h.press_key(Key::ArrowRight), KeydownResult::Handled);
    assert_eq!(h.doc.selected_embed(), Some(2));

    h.doc.set_caret(4);
    assert_eq!(h.press_key(Key::ArrowLeft), KeydownResult::Handled);
    assert_eq!(h.doc.selected_embed(), Some(2));

    h.doc.set_caret(4);
    assert_eq!(h.press_key(Key::ArrowUp), KeydownResult::Handled);
    assert_eq!(h.doc.selected_embed(), Some(2));

    h.doc.set_caret(0);
    assert_eq!(h.press_key(Key::ArrowDown), KeydownResult::Handled);
    assert_eq!(h.doc.selected_embed(), Some(2));
}

#[test]
fn test_arrows_inside_text_move_normally() {
    let mut h = with_divider("bc\n");
    h.doc.set_caret(5);
    assert_eq!(h.press_key(Key::ArrowLeft), KeydownResult::PassThrough);
    assert_eq!(h.caret(), Some(4));
    assert_eq!(h.doc.selected_embed(), None);
}

#[test]
fn test_inline_attachment_is_selected_from_either_side() {
    let contents = Delta::new()
        .insert("x")
        .insert_embed(
            Embed::new("attachment", serde_json::json!({"name": "a.pdf"})),
            Attributes::new(),
        )
        .insert("y\n");
    let mut h = Harness::with_doc(PlainDocument::from_delta(contents), &EditorConfig::default());

    h.doc.set_caret(1);
    assert_eq!(h.press_key(Key::ArrowRight), KeydownResult::Handled);
    assert_eq!(h.doc.selected_embed(), Some(1));

    h.doc.set_caret(2);
    assert_eq!(h.press_key(Key::ArrowLeft), KeydownResult::Handled);
    assert_eq!(h.doc.selected_embed(), Some(1));

    h.doc.set_caret(2);
    assert_eq!(h.press_key(Key::Backspace), KeydownResult::Handled);
    assert_eq!(h.doc.selected_embed(), Some(1));
}

#[test]
fn test_emoji_embeds_are_stepped_over() {
    let mut h = Harness::new("");
    h.input("a😀b");
    h.doc.set_caret(2);
    assert_eq!(h.press_key(Key::ArrowLeft), KeydownResult::PassThrough);
    assert_eq!(h.caret(), Some(1));
    assert_eq!(h.doc.selected_embed(), None);
}
