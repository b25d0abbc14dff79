mod common;

use common::Harness;
use insta::assert_snapshot;
use loom_editor_autoformat::{EditorConfig, MarkdownConfig};
use loom_editor_core::{AttrValue, DocumentHost, Key, KeydownResult, UndoManager};

#[test]
fn test_headline_on_space() {
    let mut h = Harness::new("Title\n\n");
    h.type_keys("##");
    h.reset_logs();

    assert_eq!(h.press_key(Key::Space), KeydownResult::Handled);
    assert_snapshot!(h.log(), @r"
    delete_text(6, 2, user)
    format_line(6, 0, {header: 2}, user)
    set_selection(6, 0, silent)
    ");
    assert_eq!(h.line(1).formats.get("header"), Some(&AttrValue::Int(2)));
    assert_eq!(h.text(), "Title\n\n");
    assert_eq!(h.event_names(), vec!["style_applied"]);
}

#[test]
fn test_hashes_after_text_are_prose() {
    let mut h = Harness::new("Title\n\n");
    h.type_keys("a #");
    assert_eq!(h.press_key(Key::Space), KeydownResult::PassThrough);
    assert_eq!(h.text(), "Title\na # \n");
    assert!(h.line(1).formats.is_empty());
}

#[test]
fn test_bold_on_space() {
    let mut h = Harness::new("");
    h.type_keys("**Bold**");
    h.reset_logs();

    assert_eq!(h.press_key(Key::Space), KeydownResult::Handled);
    assert_snapshot!(h.log(), @r#"
    delete_text(0, 8, user)
    insert_text(0, "Bold", {bold: true}, user)
    insert_text(4, " ", {bold: false}, user)
    set_selection(5, 0, silent)
    "#);
    assert_eq!(h.text(), "Bold \n");
    assert_eq!(h.caret(), Some(5));
    let (leaf, _) = h.doc.leaf(0).unwrap();
    assert_eq!(leaf.attributes.get("bold"), Some(&AttrValue::Bool(true)));
}

#[test]
fn test_nested_pair_applies_both_formats() {
    let mut h = Harness::new("");
    h.type_keys("**_both_**");
    assert_eq!(h.press_key(Key::Space), KeydownResult::Handled);
    assert_eq!(h.text(), "both \n");
    let (leaf, _) = h.doc.leaf(0).unwrap();
    assert_eq!(leaf.attributes.get("bold"), Some(&AttrValue::Bool(true)));
    assert_eq!(leaf.attributes.get("italic"), Some(&AttrValue::Bool(true)));
}

#[test]
fn test_every_inline_style_converts() {
    let styles: [(&str, &str, &[&str]); 15] = [
        ("**", "**", &["bold"]),
        ("_", "_", &["italic"]),
        ("__", "__", &["underline"]),
        ("~~", "~~", &["strike"]),
        ("`", "`", &["code"]),
        ("**_", "_**", &["bold", "italic"]),
        ("**__", "__**", &["bold", "underline"]),
        ("**~~", "~~**", &["bold", "strike"]),
        ("**`", "`**", &["bold", "code"]),
        ("___", "___", &["italic", "underline"]),
        ("_~~", "~~_", &["italic", "strike"]),
        ("_`", "`_", &["italic", "code"]),
        ("__~~", "~~__", &["underline", "strike"]),
        ("__`", "`__", &["underline", "code"]),
        ("~~`", "`~~", &["strike", "code"]),
    ];
    for (open, close, formats) in styles {
        let mut h = Harness::new("");
        h.type_keys(&format!("a {open}x{close}"));
        assert_eq!(h.press_key(Key::Space), KeydownResult::Handled, "{open}x{close}");
        assert_eq!(h.text(), "a x \n", "{open}x{close}");
        assert_eq!(h.caret(), Some(4), "{open}x{close}");

        let (styled, _) = h.doc.leaf(2).unwrap();
        let (space, _) = h.doc.leaf(3).unwrap();
        for format in formats {
            assert_eq!(
                styled.attributes.get(*format),
                Some(&AttrValue::Bool(true)),
                "{format} on {open}x{close}"
            );
            assert!(
                space.attributes.get(*format).is_none_or(AttrValue::is_removal),
                "{format} after {open}x{close}"
            );
        }
    }
}

#[test]
fn test_snake_case_stays_prose() {
    let mut h = Harness::new("");
    h.type_keys("snake_case_");
    assert_ne!(h.press_key(Key::Space), KeydownResult::Handled);
    assert_eq!(h.text(), "snake_case_ \n");
}

#[test]
fn test_disabled_style_is_ignored() {
    let config = EditorConfig {
        markdown: MarkdownConfig {
            bold: false,
            ..MarkdownConfig::default()
        },
        ..EditorConfig::default()
    };
    let mut h = Harness::with_config("", &config);
    h.type_keys("**Bold**");
    h.reset_logs();
    h.press_key(Key::Space);
    assert_eq!(h.log(), "");
    assert_eq!(h.text(), "**Bold** \n");
}

#[test]
fn test_link_on_space() {
    let mut h = Harness::new("");
    h.type_keys("see [docs](https://x.io)");
    h.reset_logs();

    assert_eq!(h.press_key(Key::Space), KeydownResult::Handled);
    assert_snapshot!(h.log(), @r#"
    delete_text(4, 20, user)
    insert_text(4, "docs", {link: "https://x.io"}, user)
    insert_text(8, " ", {link: false}, user)
    set_selection(9, 0, silent)
    "#);
    assert_eq!(h.text(), "see docs \n");
}

#[test]
fn test_list_marker_converts_line() {
    let mut h = Harness::new("Title\n\n");
    h.type_keys("-");
    h.reset_logs();

    assert_eq!(h.press_key(Key::Space), KeydownResult::Handled);
    assert_snapshot!(h.log(), @r#"
    delete_text(6, 1, user)
    format_line(6, 0, {list: "bullet"}, user)
    set_selection(6, 0, silent)
    "#);
    assert_eq!(
        h.line(1).formats.get("list"),
        Some(&AttrValue::Str("bullet".into()))
    );
}

#[test]
fn test_every_list_marker_maps_to_its_kind() {
    let markers = [
        ("*", "unordered"),
        ("[]", "unchecked"),
        ("[ ]", "unchecked"),
        ("[x]", "checked"),
        ("-", "bullet"),
        ("1.", "ordered"),
    ];
    for (marker, kind) in markers {
        let mut h = Harness::new("Title\n\n");
        h.type_keys(marker);
        assert_eq!(h.press_key(Key::Space), KeydownResult::Handled, "{marker}");
        assert_eq!(h.text(), "Title\n\n", "{marker}");
        assert_eq!(h.caret(), Some(6), "{marker}");
        assert_eq!(
            h.line(1).formats.get("list"),
            Some(&AttrValue::Str(kind.into())),
            "{marker}"
        );
    }
}

#[test]
fn test_list_marker_on_title_line_stays_text() {
    let mut h = Harness::new("");
    h.type_keys("-");
    assert_eq!(h.press_key(Key::Space), KeydownResult::Handled);
    assert_eq!(h.text(), "- \n");
    assert!(h.line(0).formats.is_empty());
    assert_eq!(h.caret(), Some(2));
}

#[test]
fn test_list_indent_and_empty_enter() {
    let mut h = Harness::new("Title\n\n");
    h.type_keys("[] ");
    h.reset_logs();

    h.press_key(Key::Tab);
    h.press_key(Key::Tab);
    assert_eq!(h.line(1).formats.get("indent"), Some(&AttrValue::Int(2)));

    h.reset_logs();
    assert_eq!(h.press_key(Key::Enter), KeydownResult::Handled);
    assert_snapshot!(h.log(), @"format_line(6, 0, {indent: null, list: null}, user)");
    assert!(h.line(1).formats.get("list").is_none());
}

#[test]
fn test_code_block_and_blockquote() {
    let mut h = Harness::new("Title\n\n");
    h.type_keys("```");
    assert_eq!(h.press_key(Key::Space), KeydownResult::Handled);
    assert_eq!(h.line(1).formats.get("code-block"), Some(&AttrValue::Bool(true)));

    // Backspace on the empty code line drops the format.
    h.reset_logs();
    assert_eq!(h.press_key(Key::Backspace), KeydownResult::Handled);
    assert_snapshot!(h.log(), @"format_line(6, 0, {code-block: null}, user)");

    h.type_keys(">");
    assert_eq!(h.press_key(Key::Space), KeydownResult::Handled);
    assert_eq!(h.line(1).formats.get("blockquote"), Some(&AttrValue::Bool(true)));
}

#[test]
fn test_divider_from_three_dashes() {
    let mut h = Harness::new("Title\n\n");
    h.type_keys("--");
    assert_eq!(h.type_keys("-"), KeydownResult::Handled);

    assert_eq!(h.text(), "Title\n\n\n");
    let (leaf, _) = h.doc.leaf(6).unwrap();
    assert!(leaf.is_block_embed());
    assert_eq!(h.caret(), Some(8));
    assert_eq!(
        h.line(1).formats.get("id"),
        Some(&AttrValue::Str("line-1".into()))
    );
}

#[test]
fn test_divider_needs_a_bare_line() {
    let mut h = Harness::new("Title\n\n");
    h.input("a--");
    h.reset_logs();
    assert_ne!(h.type_keys("-"), KeydownResult::Handled);
    assert_eq!(h.log(), "");
    assert_eq!(h.text(), "Title\na---\n");

    // Text after the marker blocks it too.
    let mut h = Harness::new("Title\nx");
    h.doc.set_caret(6);
    h.input("--");
    h.reset_logs();
    h.type_keys("-");
    assert_eq!(h.log(), "");
}

#[test]
fn test_triple_underscore_on_bare_line_is_a_divider() {
    let mut h = Harness::new("Title\n\n");
    h.type_keys("__");
    assert_eq!(h.type_keys("_"), KeydownResult::Handled);
    assert!(h.doc.leaf(6).unwrap().0.is_block_embed());
}

#[test]
fn test_dash_enter_makes_divider() {
    let mut h = Harness::new("Title\n\n");
    h.type_keys("-");
    assert_eq!(h.press_key(Key::Enter), KeydownResult::Handled);
    assert!(h.doc.leaf(6).unwrap().0.is_block_embed());
}

#[test]
fn test_enter_splits_line_with_fresh_id() {
    let mut h = Harness::new("Hello world");
    h.doc.set_caret(5);
    h.reset_logs();

    assert_eq!(h.press_key(Key::Enter), KeydownResult::Handled);
    assert_snapshot!(h.log(), @r#"
    update_contents([{"retain":5},{"insert":"\n","attributes":{"id":"line-1"}}], user)
    set_selection(6, 0, silent)
    scroll_into_view()
    "#);
    assert_eq!(h.text(), "Hello\n world\n");
}

#[test]
fn test_enter_in_header_clears_header_below() {
    let mut h = Harness::new("Title\n\n");
    h.type_keys("# Heading");
    h.doc.set_caret(9);
    h.press_key(Key::Enter);

    assert_eq!(h.line(1).formats.get("header"), Some(&AttrValue::Int(1)));
    assert!(h.line(2).formats.get("header").is_none());
    assert_eq!(h.text(), "Title\nHea\nding\n");
}

#[test]
fn test_undo_restores_markdown_source() {
    let mut h = Harness::new("");
    h.type_keys("**Bold**");
    h.doc.history_mut().cutoff();
    h.press_key(Key::Space);
    assert_eq!(h.text(), "Bold \n");

    assert!(h.doc.undo());
    assert_eq!(h.text(), "**Bold**\n");
}

#[test]
fn test_backspace_after_inline_code_restores_backtick() {
    let mut h = Harness::new("");
    h.type_keys("`x`");
    h.press_key(Key::Space);
    assert_eq!(h.text(), "x \n");

    // Step back onto the code run.
    h.doc.backspace();
    h.reset_logs();
    assert_eq!(h.press_key(Key::Backspace), KeydownResult::Handled);
    assert_eq!(h.text(), "`x\n");
    assert_eq!(h.caret(), Some(2));
}
