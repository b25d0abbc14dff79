//! External UI state for the emoji picker and mention list.
//!
//! Handlers read a snapshot and dispatch actions; they never hold the state
//! across calls. `MemoryUiStore` is a reducer-backed store for hosts without
//! their own.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmojiPickerState {
    /// Document offset of the `:` that opened the picker.
    pub index: usize,
    pub bottom: f64,
    pub left: f64,
    /// Search text typed since the picker opened.
    pub text: String,
    pub editor_id: SmolStr,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: SmolStr,
    pub name: SmolStr,
}

impl Member {
    pub fn new(id: impl Into<SmolStr>, name: impl Into<SmolStr>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MentionListState {
    /// Document offset of the `@` that opened the list.
    pub index: usize,
    pub bottom: f64,
    pub left: f64,
    pub text: String,
    pub editor_id: SmolStr,
    pub members: Vec<Member>,
    pub selected_index: usize,
}

impl MentionListState {
    pub fn selected(&self) -> Option<&Member> {
        self.members.get(self.selected_index)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiState {
    pub emoji_picker: Option<EmojiPickerState>,
    pub mention_list: Option<MentionListState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UiAction {
    SetEmojiPicker {
        index: usize,
        bottom: f64,
        left: f64,
        text: String,
        #[serde(rename = "editorId")]
        editor_id: SmolStr,
    },
    ClearEmojiPicker,
    SetMentionList {
        index: usize,
        bottom: f64,
        left: f64,
        text: String,
        #[serde(rename = "editorId")]
        editor_id: SmolStr,
    },
    ClearMentionList,
    SetSelectedMemberIndex {
        index: usize,
    },
    /// Candidates for the open mention list, fed by the host.
    SetMentionMembers {
        members: Vec<Member>,
    },
    /// Search text for the open emoji picker, fed by the host.
    SetEmojiSearch {
        text: String,
    },
}

pub trait UiStore {
    fn snapshot(&self) -> UiState;
    fn dispatch(&mut self, action: UiAction);
}

/// Apply an action to a state.
pub fn reduce(state: &mut UiState, action: UiAction) {
    match action {
        UiAction::SetEmojiPicker {
            index,
            bottom,
            left,
            text,
            editor_id,
        } => {
            state.emoji_picker = Some(EmojiPickerState {
                index,
                bottom,
                left,
                text,
                editor_id,
            });
        }
        UiAction::ClearEmojiPicker => state.emoji_picker = None,
        UiAction::SetMentionList {
            index,
            bottom,
            left,
            text,
            editor_id,
        } => {
            state.mention_list = Some(MentionListState {
                index,
                bottom,
                left,
                text,
                editor_id,
                members: Vec::new(),
                selected_index: 0,
            });
        }
        UiAction::ClearMentionList => state.mention_list = None,
        UiAction::SetSelectedMemberIndex { index } => {
            if let Some(list) = state.mention_list.as_mut() {
                list.selected_index = index;
            }
        }
        UiAction::SetMentionMembers { members } => {
            if let Some(list) = state.mention_list.as_mut() {
                list.selected_index = list.selected_index.min(members.len().saturating_sub(1));
                list.members = members;
            }
        }
        UiAction::SetEmojiSearch { text } => {
            if let Some(picker) = state.emoji_picker.as_mut() {
                picker.text = text;
            }
        }
    }
}

/// In-memory store. Clones share state and the dispatch log.
#[derive(Debug, Clone, Default)]
pub struct MemoryUiStore {
    state: Rc<RefCell<UiState>>,
    log: Rc<RefCell<Vec<UiAction>>>,
}

impl MemoryUiStore {
    /// Every action dispatched so far.
    pub fn dispatched(&self) -> Vec<UiAction> {
        self.log.borrow().clone()
    }

    pub fn clear_log(&self) {
        self.log.borrow_mut().clear();
    }
}

impl UiStore for MemoryUiStore {
    fn snapshot(&self) -> UiState {
        self.state.borrow().clone()
    }

    fn dispatch(&mut self, action: UiAction) {
        self.log.borrow_mut().push(action.clone());
        reduce(&mut self.state.borrow_mut(), action);
    }
}
