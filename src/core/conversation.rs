//! The ordered transcript owned by the session.
//!
//! Entries are appended in event-completion order; the single structural
//! mutation beyond append is the atomic swap of a thinking placeholder for
//! its finished response, so the renderer can never observe a transcript
//! missing an expected entry.

use std::collections::VecDeque;

use crate::core::message::{Message, Role};

/// A prior turn in gateway form: role and text only. Attachments and
/// citations from history are never resent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryTurn {
    pub role: Role,
    pub text: String,
}

#[derive(Default)]
pub struct ConversationStore {
    messages: VecDeque<Message>,
    next_seq: u64,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Monotonic id for a regular message.
    pub fn next_id(&mut self) -> String {
        self.next_seq += 1;
        format!("m-{}", self.next_seq)
    }

    /// Monotonic id for a thinking placeholder.
    pub fn next_thinking_id(&mut self) -> String {
        self.next_seq += 1;
        format!("thinking-{}", self.next_seq)
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push_back(message);
    }

    /// Atomically remove the entry with `id` and append `replacement`.
    ///
    /// Returns `false` when no entry carries `id`; the replacement is still
    /// appended so a completed response is never dropped.
    pub fn replace(&mut self, id: &str, replacement: Message) -> bool {
        let removed = if let Some(pos) = self.messages.iter().position(|m| m.id == id) {
            self.messages.remove(pos);
            true
        } else {
            false
        };
        self.messages.push_back(replacement);
        removed
    }

    pub fn get(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.back()
    }

    /// Latest finished model response, if any. Used by the itinerary export.
    pub fn last_model_message(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role.is_model() && !m.is_thinking)
    }

    /// Read-only view for the renderer.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Message> {
        self.messages.iter()
    }

    pub fn has_thinking_placeholder(&self) -> bool {
        self.messages.iter().any(|m| m.is_thinking)
    }

    /// Prior turns in gateway form, skipping system entries and thinking
    /// placeholders.
    pub fn history(&self) -> Vec<HistoryTurn> {
        self.messages
            .iter()
            .filter(|m| !m.is_thinking && m.role != Role::System)
            .map(|m| HistoryTurn {
                role: m.role,
                text: m.text.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attachment::{Attachment, AttachmentKind};

    #[test]
    fn ids_are_unique_and_monotonic() {
        let mut store = ConversationStore::new();
        let a = store.next_id();
        let b = store.next_thinking_id();
        let c = store.next_id();
        assert_eq!(a, "m-1");
        assert_eq!(b, "thinking-2");
        assert_eq!(c, "m-3");
    }

    #[test]
    fn replace_swaps_placeholder_in_one_step() {
        let mut store = ConversationStore::new();
        store.append(Message::user("m-1", "hello"));
        store.append(Message::thinking("thinking-2"));
        assert!(store.has_thinking_placeholder());

        let replaced = store.replace("thinking-2", Message::model("m-3", "hi"));
        assert!(replaced);
        assert!(!store.has_thinking_placeholder());
        assert_eq!(store.len(), 2);
        assert_eq!(store.last().unwrap().text, "hi");
    }

    #[test]
    fn replace_with_unknown_id_still_appends() {
        let mut store = ConversationStore::new();
        let replaced = store.replace("thinking-404", Message::model("m-1", "late reply"));
        assert!(!replaced);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn history_is_role_and_text_only() {
        let mut store = ConversationStore::new();
        let mut user = Message::user("m-1", "find flights");
        user.attachments
            .push(Attachment::new(AttachmentKind::Image, "image/png", b"xx"));
        store.append(user);
        store.append(Message::thinking("thinking-2"));
        store.append(Message::new("m-3", Role::System, "internal"));

        let history = store.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].text, "find flights");
    }

    #[test]
    fn last_model_message_skips_placeholders() {
        let mut store = ConversationStore::new();
        store.append(Message::model("m-1", "itinerary"));
        store.append(Message::thinking("thinking-2"));
        assert_eq!(store.last_model_message().unwrap().id, "m-1");
    }
}
