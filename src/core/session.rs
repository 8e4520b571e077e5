//! Session Controller: turn-taking over the conversation store.
//!
//! All transcript and phase mutations funnel through this type. The phase
//! machine has two loops (Idle → Recording → Processing → Idle for voice,
//! Idle → Processing → Idle for typed sends) and exactly one gateway call
//! may be in flight at a time. The renderer only ever sees read-only
//! snapshots.

use tracing::debug;

use crate::core::attachment::Attachment;
use crate::core::constants::{
    GATEWAY_ERROR_TEXT, GREETING_TEXT, VOICE_MESSAGE_LABEL, VOICE_PROMPT_TEXT,
};
use crate::core::conversation::{ConversationStore, HistoryTurn};
use crate::core::gateway::{GatewayError, GatewayReply};
use crate::core::message::Message;

/// Mutually exclusive session phase; exactly one holds at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Recording,
    Processing,
}

/// Everything a gateway call needs, captured at the Idle → Processing
/// transition. History is the transcript *before* the new user message.
#[derive(Debug, Clone)]
pub struct TurnRequest {
    pub placeholder_id: String,
    pub history: Vec<HistoryTurn>,
    pub text: String,
    pub attachments: Vec<Attachment>,
}

pub struct SessionController {
    phase: Phase,
    store: ConversationStore,
    pending_text: String,
    pending_attachments: Vec<Attachment>,
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionController {
    pub fn new() -> Self {
        Self {
            phase: Phase::Idle,
            store: ConversationStore::new(),
            pending_text: String::new(),
            pending_attachments: Vec::new(),
        }
    }

    /// A session seeded with the assistant greeting, as the interactive
    /// client shows on startup.
    pub fn with_greeting() -> Self {
        let mut controller = Self::new();
        let id = controller.store.next_id();
        controller.store.append(Message::model(id, GREETING_TEXT));
        controller
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn is_processing(&self) -> bool {
        self.phase == Phase::Processing
    }

    pub fn is_recording(&self) -> bool {
        self.phase == Phase::Recording
    }

    /// Read-only transcript snapshot for the renderer.
    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn pending_text(&self) -> &str {
        &self.pending_text
    }

    pub fn pending_attachments(&self) -> &[Attachment] {
        &self.pending_attachments
    }

    /// Typing edits are accepted only while idle; input is frozen during
    /// recording and processing.
    pub fn input_char(&mut self, c: char) {
        if self.phase == Phase::Idle {
            self.pending_text.push(c);
        }
    }

    pub fn input_backspace(&mut self) {
        if self.phase == Phase::Idle {
            self.pending_text.pop();
        }
    }

    pub fn attach(&mut self, attachment: Attachment) {
        if self.phase == Phase::Idle {
            self.pending_attachments.push(attachment);
        }
    }

    /// Idle → Processing: the tap-to-send transition.
    ///
    /// Returns `None` without touching any state when the guard rejects the
    /// request: a send while not idle, or a send with neither text nor
    /// attachments. Otherwise the pending input is taken atomically, the
    /// user message and thinking placeholder are appended, and the caller
    /// must dispatch the returned request to the gateway.
    pub fn request_send(&mut self) -> Option<TurnRequest> {
        if self.phase != Phase::Idle {
            return None;
        }
        if self.pending_text.trim().is_empty() && self.pending_attachments.is_empty() {
            return None;
        }

        let text = std::mem::take(&mut self.pending_text);
        let attachments = std::mem::take(&mut self.pending_attachments);
        let history = self.store.history();

        let user_id = self.store.next_id();
        self.store.append(Message::user_with_attachments(
            user_id,
            text.clone(),
            attachments.clone(),
        ));

        let placeholder_id = self.store.next_thinking_id();
        self.store.append(Message::thinking(placeholder_id.clone()));

        self.phase = Phase::Processing;
        debug!(placeholder = %placeholder_id, "send transition: idle -> processing");

        Some(TurnRequest {
            placeholder_id,
            history,
            text,
            attachments,
        })
    }

    /// Idle → Recording. Returns `false` when the session is not idle; the
    /// caller must not touch the microphone in that case.
    pub fn start_recording(&mut self) -> bool {
        if self.phase != Phase::Idle {
            return false;
        }
        self.phase = Phase::Recording;
        debug!("record transition: idle -> recording");
        true
    }

    /// Abort a recording without sending anything. Transcript untouched.
    pub fn cancel_recording(&mut self) {
        if self.phase == Phase::Recording {
            self.phase = Phase::Idle;
            debug!("record transition: recording -> idle (cancelled)");
        }
    }

    /// Recording → Processing: the finalized capture becomes one voice turn.
    ///
    /// An empty capture is accepted: the voice message and its zero-length
    /// audio attachment are sent like any other.
    pub fn finish_recording(&mut self, attachment: Attachment) -> Option<TurnRequest> {
        if self.phase != Phase::Recording {
            return None;
        }

        let history = self.store.history();

        let user_id = self.store.next_id();
        self.store.append(Message::user_with_attachments(
            user_id,
            VOICE_MESSAGE_LABEL,
            vec![attachment.clone()],
        ));

        let placeholder_id = self.store.next_thinking_id();
        self.store.append(Message::thinking(placeholder_id.clone()));

        self.phase = Phase::Processing;
        debug!(placeholder = %placeholder_id, "record transition: recording -> processing");

        Some(TurnRequest {
            placeholder_id,
            history,
            text: VOICE_PROMPT_TEXT.to_string(),
            attachments: vec![attachment],
        })
    }

    /// Processing → Idle: swap the placeholder for the finished response.
    ///
    /// A gateway failure becomes the fixed error message; the reset to idle
    /// is unconditional so the user can always retry.
    pub fn complete_turn(
        &mut self,
        placeholder_id: &str,
        result: Result<GatewayReply, GatewayError>,
    ) {
        let id = self.store.next_id();
        let replacement = match result {
            Ok(reply) => Message::model_with_citations(id, reply.text, reply.citations),
            Err(error) => {
                debug!(%error, "gateway call failed");
                Message::model(id, GATEWAY_ERROR_TEXT)
            }
        };
        self.store.replace(placeholder_id, replacement);
        self.phase = Phase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::attachment::AttachmentKind;
    use crate::core::constants::EMPTY_RESPONSE_TEXT;
    use crate::core::gateway::{reply_from_response, ModelGateway};
    use crate::core::message::{Citation, Role};
    use async_trait::async_trait;

    fn reply(text: &str) -> GatewayReply {
        GatewayReply {
            text: text.to_string(),
            citations: Vec::new(),
        }
    }

    fn transport_error() -> GatewayError {
        GatewayError::Status(reqwest::StatusCode::BAD_GATEWAY, "boom".to_string())
    }

    #[test]
    fn empty_send_mutates_nothing() {
        let mut session = SessionController::new();
        session.input_char(' ');
        assert!(session.request_send().is_none());
        assert_eq!(session.phase(), Phase::Idle);
        assert!(session.store().is_empty());
    }

    #[test]
    fn attachment_only_send_is_allowed() {
        let mut session = SessionController::new();
        session.attach(Attachment::new(AttachmentKind::Image, "image/png", b"x"));
        let turn = session.request_send().unwrap();
        assert!(turn.text.is_empty());
        assert_eq!(turn.attachments.len(), 1);
        assert!(session.is_processing());
    }

    #[test]
    fn send_appends_user_message_and_placeholder() {
        let mut session = SessionController::new();
        for c in "رحلة من القاهرة إلى دبي".chars() {
            session.input_char(c);
        }
        let turn = session.request_send().unwrap();

        assert!(turn.history.is_empty());
        assert_eq!(turn.text, "رحلة من القاهرة إلى دبي");
        assert_eq!(session.store().len(), 2);
        assert!(session.store().has_thinking_placeholder());
        assert!(session.pending_text().is_empty());
        assert!(session.is_processing());
    }

    #[test]
    fn second_send_while_processing_is_a_no_op() {
        let mut session = SessionController::new();
        session.input_char('a');
        let _turn = session.request_send().unwrap();

        session.pending_text.push('b');
        let before = session.store().len();
        assert!(session.request_send().is_none());
        assert_eq!(session.store().len(), before);
        assert!(session.is_processing());
    }

    #[test]
    fn typing_is_frozen_while_processing() {
        let mut session = SessionController::new();
        session.input_char('a');
        let _turn = session.request_send().unwrap();
        session.input_char('x');
        session.attach(Attachment::new(AttachmentKind::Image, "image/png", b"x"));
        assert!(session.pending_text().is_empty());
        assert!(session.pending_attachments().is_empty());
    }

    #[test]
    fn success_replaces_placeholder_with_response() {
        let mut session = SessionController::new();
        session.input_char('a');
        let turn = session.request_send().unwrap();
        let len_with_placeholder = session.store().len();

        session.complete_turn(
            &turn.placeholder_id,
            Ok(GatewayReply {
                text: "السعر 500 دولار".to_string(),
                citations: vec![Citation {
                    uri: "https://emirates.com".to_string(),
                    title: "Emirates".to_string(),
                }],
            }),
        );

        assert!(session.is_idle());
        assert!(!session.store().has_thinking_placeholder());
        // net +1 relative to the transcript before the placeholder
        assert_eq!(session.store().len(), len_with_placeholder);
        let last = session.store().last().unwrap();
        assert_eq!(last.role, Role::Model);
        assert_eq!(last.text, "السعر 500 دولار");
        assert_eq!(last.citations.len(), 1);
    }

    #[test]
    fn failure_replaces_placeholder_with_fixed_error_text() {
        let mut session = SessionController::new();
        session.input_char('a');
        let turn = session.request_send().unwrap();

        session.complete_turn(&turn.placeholder_id, Err(transport_error()));

        assert!(session.is_idle());
        assert!(!session.store().has_thinking_placeholder());
        assert_eq!(session.store().last().unwrap().text, GATEWAY_ERROR_TEXT);
    }

    #[test]
    fn completion_returns_to_idle_even_without_placeholder() {
        let mut session = SessionController::new();
        session.input_char('a');
        let _turn = session.request_send().unwrap();
        session.complete_turn("thinking-404", Ok(reply("hi")));
        assert!(session.is_idle());
    }

    #[test]
    fn recording_loop_produces_a_voice_turn() {
        let mut session = SessionController::new();
        assert!(session.start_recording());
        assert!(session.is_recording());

        let attachment = Attachment::from_audio(&[], 16_000).unwrap();
        let turn = session.finish_recording(attachment).unwrap();

        assert_eq!(turn.text, VOICE_PROMPT_TEXT);
        assert_eq!(turn.attachments.len(), 1);
        assert_eq!(turn.attachments[0].encoded_len(), 0);

        let first = session.store().iter().next().unwrap();
        assert_eq!(first.text, VOICE_MESSAGE_LABEL);
        assert!(first.has_attachments());
        assert!(session.is_processing());
    }

    #[test]
    fn record_start_is_rejected_while_processing() {
        let mut session = SessionController::new();
        session.input_char('a');
        let _turn = session.request_send().unwrap();
        assert!(!session.start_recording());
        assert!(session.is_processing());
    }

    #[test]
    fn cancelled_recording_leaves_transcript_untouched() {
        let mut session = SessionController::new();
        session.start_recording();
        session.cancel_recording();
        assert!(session.is_idle());
        assert!(session.store().is_empty());
    }

    #[test]
    fn greeting_seeds_history_for_later_turns() {
        let mut session = SessionController::with_greeting();
        assert_eq!(session.store().len(), 1);
        session.input_char('a');
        let turn = session.request_send().unwrap();
        assert_eq!(turn.history.len(), 1);
        assert_eq!(turn.history[0].role, Role::Model);
    }

    struct CannedGateway {
        body: &'static str,
    }

    #[async_trait]
    impl ModelGateway for CannedGateway {
        async fn send(
            &self,
            _history: &[HistoryTurn],
            _new_text: &str,
            _attachments: &[Attachment],
        ) -> Result<GatewayReply, GatewayError> {
            let response = serde_json::from_str(self.body).expect("canned body");
            Ok(reply_from_response(&response))
        }
    }

    #[tokio::test]
    async fn full_turn_against_a_mocked_gateway() {
        let gateway = CannedGateway {
            body: r#"{"candidates":[{"content":{"parts":[{"text":"السعر 500 دولار"}]}}]}"#,
        };
        let mut session = SessionController::new();
        for c in "رحلة من القاهرة إلى دبي".chars() {
            session.input_char(c);
        }
        let turn = session.request_send().unwrap();
        let result = gateway.send(&turn.history, &turn.text, &turn.attachments).await;
        session.complete_turn(&turn.placeholder_id, result);

        assert!(session.is_idle());
        assert_eq!(session.store().last().unwrap().text, "السعر 500 دولار");
    }

    #[tokio::test]
    async fn empty_gateway_body_is_substituted_not_errored() {
        let gateway = CannedGateway { body: "{}" };
        let mut session = SessionController::new();
        session.input_char('a');
        let turn = session.request_send().unwrap();
        let result = gateway.send(&turn.history, &turn.text, &turn.attachments).await;
        session.complete_turn(&turn.placeholder_id, result);
        assert_eq!(session.store().last().unwrap().text, EMPTY_RESPONSE_TEXT);
    }
}
