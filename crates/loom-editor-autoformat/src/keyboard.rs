//! Keydown dispatch over the binding table.

use loom_editor_core::{DocumentHost, KeyEvent, KeydownResult};
use tracing::{debug, trace};

use crate::bindings::{Binding, Bindings, Flow, HandlerCx};
use crate::config::EditorConfig;
use crate::context::KeyContext;
use crate::services::Services;

#[derive(Debug, Clone)]
pub struct Keyboard {
    bindings: Bindings,
}

impl Keyboard {
    pub fn new(config: &EditorConfig) -> Self {
        Self::with_comment_bindings(config, Vec::new())
    }

    /// Comment-mode bindings are only registered when `config.comment_mode`
    /// is set.
    pub fn with_comment_bindings(config: &EditorConfig, comment_bindings: Vec<Binding>) -> Self {
        Self {
            bindings: Bindings::from_config(config, comment_bindings),
        }
    }

    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Run the bindings for `event` in order until one handles it.
    ///
    /// `Handled` means the default action must be suppressed. `PassThrough`
    /// means at least one binding ran and let the key through; `NotHandled`
    /// means none applied.
    pub fn handle_keydown(
        &self,
        doc: &mut dyn DocumentHost,
        services: &mut Services,
        event: &KeyEvent,
    ) -> KeydownResult {
        let span = tracing::debug_span!("keydown", key = ?event.key);
        let _enter = span.enter();

        let candidates: Vec<&Binding> = self
            .bindings
            .for_key(&event.key)
            .iter()
            .filter(|binding| binding.matches_event(event))
            .collect();
        if candidates.is_empty() {
            return KeydownResult::NotHandled;
        }
        let Some(mut context) = KeyContext::from_document(doc) else {
            trace!("no text selection");
            return KeydownResult::NotHandled;
        };

        let mut ran = false;
        for binding in candidates {
            if !binding.accepts(&context) {
                continue;
            }
            let Some(matched) = binding.match_prefix(&context) else {
                trace!(binding = %binding.name, "prefix did not match");
                continue;
            };
            context.matched = matched;
            ran = true;
            let mut cx = HandlerCx {
                doc: &mut *doc,
                services: &mut *services,
                event,
                binding,
            };
            match binding.run(&mut cx, &context) {
                Flow::Handled => {
                    debug!(binding = %binding.name, "handled");
                    return KeydownResult::Handled;
                }
                Flow::Continue => trace!(binding = %binding.name, "passed through"),
            }
        }
        if ran {
            KeydownResult::PassThrough
        } else {
            KeydownResult::NotHandled
        }
    }
}
