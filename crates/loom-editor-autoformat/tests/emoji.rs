mod common;

use common::Harness;
use insta::assert_snapshot;
use loom_editor_autoformat::{
    EMOJI_EMBED, EditorConfig, EmojiConfig, RecordingDiagnostics, Services, UiAction,
    emoji::EmojiInserter,
};
use loom_editor_core::{
    Delta, DocumentHost, Insert, Key, KeydownResult, LeafKind, Op, PlainDocument, UndoManager,
};

fn is_emoji_at(h: &Harness, index: usize) -> bool {
    h.doc
        .leaf(index)
        .is_some_and(|(leaf, _)| matches!(&leaf.kind, LeafKind::Embed { kind, .. } if kind == EMOJI_EMBED))
}

#[test]
fn test_shortname_becomes_embed() {
    let mut h = Harness::new("");
    h.type_keys("hi :wink");
    h.reset_logs();

    assert_eq!(h.type_keys(":"), KeydownResult::Handled);
    assert_snapshot!(h.log(), @r#"
    delete_text(3, 5, user)
    insert_embed(3, "emoji-embed", user)
    set_selection(4, 0, user)
    "#);
    assert!(is_emoji_at(&h, 3));
    assert_eq!(h.text(), "hi \n");
    assert_eq!(h.ui.dispatched(), vec![UiAction::ClearEmojiPicker]);
}

#[test]
fn test_unknown_shortname_is_typed() {
    let mut h = Harness::new("");
    h.type_keys("x :notanemojiname");
    h.reset_logs();

    assert_eq!(h.type_keys(":"), KeydownResult::PassThrough);
    assert_eq!(h.text(), "x :notanemojiname:\n");
    assert!(h.ui_state().emoji_picker.is_none());
}

#[test]
fn test_shortname_in_inline_code_is_left_alone() {
    let mut h = Harness::new("");
    h.type_keys("`code`");
    h.press_key(Key::Space);
    h.doc.backspace();
    h.input(" :wink");

    h.reset_logs();
    h.type_keys(":");
    assert!(!h.log().contains("insert_embed"));
}

#[test]
fn test_colon_after_space_opens_picker() {
    let mut h = Harness::new("");
    h.type_keys("hey ");
    assert_eq!(h.type_keys(":"), KeydownResult::PassThrough);

    let picker = h.ui_state().emoji_picker.unwrap();
    assert_eq!(picker.index, 4);
    assert_eq!(picker.text, "");
    assert_eq!(picker.editor_id, "editor");
    assert_eq!(h.text(), "hey :\n");

    // Space closes it again.
    h.press_key(Key::Space);
    assert!(h.ui_state().emoji_picker.is_none());
}

#[test]
fn test_colon_at_line_start_opens_picker() {
    let mut h = Harness::new("");
    h.type_keys(":");
    assert_eq!(h.ui_state().emoji_picker.unwrap().index, 0);
}

#[test]
fn test_colon_inside_word_keeps_picker_closed() {
    let mut h = Harness::new("");
    h.type_keys("a:");
    assert!(h.ui_state().emoji_picker.is_none());
}

#[test]
fn test_enter_confirms_picker_search() {
    let mut h = Harness::new("");
    h.type_keys("ok :");
    h.type_keys("tada");
    h.editor.services_mut().dispatch(UiAction::SetEmojiSearch {
        text: "tada".into(),
    });
    h.reset_logs();

    assert_eq!(h.press_key(Key::Enter), KeydownResult::Handled);
    assert_snapshot!(h.log(), @r#"
    delete_text(3, 5, user)
    insert_embed(3, "emoji-embed", user)
    set_selection(4, 0, user)
    "#);
    assert!(h.ui_state().emoji_picker.is_none());
    assert_eq!(h.text(), "ok \n");
}

#[test]
fn test_enter_with_empty_search_closes_picker() {
    let mut h = Harness::new("");
    h.type_keys("ok :");
    h.press_key(Key::Enter);
    assert!(h.ui_state().emoji_picker.is_none());
    assert_eq!(h.text(), "ok :\n\n");
}

struct CountingInserter(std::rc::Rc<std::cell::Cell<usize>>);

impl EmojiInserter for CountingInserter {
    fn confirm(
        &mut self,
        _doc: &mut dyn DocumentHost,
        _picker: &loom_editor_autoformat::ui_state::EmojiPickerState,
        _resolver: &loom_editor_autoformat::EmojiResolver,
    ) -> bool {
        self.0.set(self.0.get() + 1);
        false
    }
}

#[test]
fn test_picker_confirmation_is_delegated() {
    let config = EditorConfig::default();
    let count = std::rc::Rc::new(std::cell::Cell::new(0));
    let services = Services::new(&config).with_emoji_inserter(CountingInserter(count.clone()));
    let mut h = Harness::with_doc(PlainDocument::new(""), &config);
    *h.editor.services_mut() = services.with_ui(h.ui.clone());

    h.type_keys(" :");
    h.editor.services_mut().dispatch(UiAction::SetEmojiSearch {
        text: "smile".into(),
    });
    assert_eq!(h.press_key(Key::Enter), KeydownResult::Handled);
    assert_eq!(count.get(), 1);
}

#[test]
fn test_escape_closes_picker() {
    let mut h = Harness::new("");
    h.type_keys(":");
    assert_eq!(h.press_key(Key::Escape), KeydownResult::Handled);
    assert!(h.ui_state().emoji_picker.is_none());
    assert_eq!(h.press_key(Key::Escape), KeydownResult::PassThrough);
}

#[test]
fn test_picker_disabled() {
    let config = EditorConfig {
        emoji: EmojiConfig {
            picker: false,
            shortcode: true,
        },
        ..EditorConfig::default()
    };
    let mut h = Harness::with_config("", &config);
    assert_eq!(h.type_keys(":"), KeydownResult::NotHandled);
    assert!(h.ui_state().emoji_picker.is_none());
}

#[test]
fn test_typed_native_emoji_is_embedded() {
    let mut h = Harness::new("hi ");
    h.doc.history_mut().cutoff();
    h.input("😉");

    assert_eq!(h.text(), "hi \n");
    assert!(is_emoji_at(&h, 3));
    assert_eq!(h.caret(), Some(4));
    // The rewrite folds into the keystroke's undo step.
    assert!(h.doc.undo());
    assert_eq!(h.text(), "hi \n");
    assert!(h.doc.leaf(3).is_none());
}

#[test]
fn test_flag_and_zwj_sequences_are_single_embeds() {
    let mut h = Harness::new("");
    h.input("🇯🇵");
    assert!(is_emoji_at(&h, 0));
    assert_eq!(h.doc.length(), 2);

    let mut h = Harness::new("");
    h.input("👩‍💻");
    assert!(is_emoji_at(&h, 0));
    assert_eq!(h.doc.length(), 2);
}

#[test]
fn test_text_symbols_are_not_embedded() {
    let mut h = Harness::new("");
    h.input("© 2024");
    assert_eq!(h.text(), "© 2024\n");
}

#[test]
fn test_paste_embeds_every_emoji() {
    let h = Harness::new("");
    let pasted = Delta::new().insert("go 🚀 go 🚀");
    let out = h.editor.paste("go 🚀 go 🚀", pasted);
    let embeds = out
        .ops()
        .iter()
        .filter(|op| matches!(op, Op::Insert { insert: Insert::Embed(_), .. }))
        .count();
    assert_eq!(embeds, 2);
    assert_eq!(out.length(), 9);
}

#[test]
fn test_unknown_sequence_is_reported_and_replaced() {
    let diagnostics = RecordingDiagnostics::default();
    let config = EditorConfig::default();
    let mut h = Harness::new("");
    *h.editor.services_mut() = Services::new(&config).with_diagnostics(diagnostics.clone());

    let value = h.editor.services().emoji.resolve_by_unified("1f9ff-1f9ff");
    assert_eq!(value.short_name, "question");
    let reports = diagnostics.reports();
    assert_eq!(reports.len(), 1);
    assert_eq!(
        reports[0].1.get("unified").map(String::as_str),
        Some("1f9ff-1f9ff")
    );
}
