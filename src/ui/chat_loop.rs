//! Main chat event loop.
//!
//! Runs the full-screen terminal session: draws frames, routes keyboard
//! input into session-controller transitions, dispatches one gateway task
//! per turn, and applies completions in arrival order. The controller's
//! Processing guard is the only concurrency control; the loop cannot start
//! a second send while one is in flight.

use std::error::Error;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::debug;

use crate::audio::{Recorder, RecordingHandle};
use crate::core::attachment::Attachment;
use crate::core::constants::MIC_PERMISSION_ALERT;
use crate::core::gateway::{GatewayError, GatewayReply, ModelGateway};
use crate::core::session::{SessionController, TurnRequest};
use crate::ui::export::export_itinerary;
use crate::ui::renderer::{build_display_lines, max_scroll_offset, ui, ChatView};
use crate::utils::logging::LoggingState;

pub struct ChatLoopOptions {
    pub markdown: bool,
    /// Directory the itinerary export lands in; the filename is fixed.
    pub export_dir: PathBuf,
}

/// Completion of one gateway call, delivered back to the loop.
struct TurnOutcome {
    placeholder_id: String,
    result: Result<GatewayReply, GatewayError>,
}

/// What the input area is editing.
enum InputMode {
    Message,
    /// Collecting a local file path for an attachment.
    AttachPath(String),
}

struct LoopState {
    session: SessionController,
    logging: LoggingState,
    mode: InputMode,
    recording: Option<RecordingHandle>,
    scroll_offset: u16,
    auto_scroll: bool,
    tick: usize,
    alert: Option<String>,
    markdown: bool,
}

impl LoopState {
    fn dispatch(
        &mut self,
        turn: TurnRequest,
        gateway: &Arc<dyn ModelGateway>,
        tx: &mpsc::UnboundedSender<TurnOutcome>,
    ) {
        if let Some(last_user) = self
            .session
            .store()
            .iter()
            .rev()
            .find(|m| m.role.is_user())
        {
            if let Err(e) = self.logging.log_message(&format!("You: {}", last_user.text)) {
                debug!("failed to log message: {e}");
            }
        }

        let gateway = Arc::clone(gateway);
        let tx = tx.clone();
        tokio::spawn(async move {
            let result = gateway
                .send(&turn.history, &turn.text, &turn.attachments)
                .await;
            let _ = tx.send(TurnOutcome {
                placeholder_id: turn.placeholder_id,
                result,
            });
        });
    }

    fn toggle_recording(
        &mut self,
        gateway: &Arc<dyn ModelGateway>,
        tx: &mpsc::UnboundedSender<TurnOutcome>,
    ) {
        if self.session.is_recording() {
            let Some(handle) = self.recording.take() else {
                self.session.cancel_recording();
                return;
            };
            match handle.stop() {
                Ok(attachment) => {
                    if let Some(turn) = self.session.finish_recording(attachment) {
                        self.dispatch(turn, gateway, tx);
                    }
                }
                Err(e) => {
                    self.alert = Some(e.to_string());
                    self.session.cancel_recording();
                }
            }
        } else if self.session.is_idle() {
            match Recorder::start() {
                Ok(handle) => {
                    self.session.start_recording();
                    self.recording = Some(handle);
                }
                Err(e) => {
                    debug!("microphone acquisition failed: {e}");
                    self.alert = Some(MIC_PERMISSION_ALERT.to_string());
                }
            }
        }
    }

    fn cancel_recording(&mut self) {
        // Dropping the handle releases the microphone.
        self.recording = None;
        self.session.cancel_recording();
    }

    fn confirm_attach_path(&mut self, path: String) {
        match Attachment::from_file(path.trim()) {
            Ok(attachment) => {
                self.session.attach(attachment);
                self.alert = None;
            }
            Err(e) => {
                self.alert = Some(e.to_string());
            }
        }
        self.mode = InputMode::Message;
    }

    fn export(&mut self, export_dir: &std::path::Path) {
        match self.session.store().last_model_message() {
            Some(message) => match export_itinerary(message, export_dir) {
                Ok(path) => {
                    self.alert = Some(format!("Saved {}", path.display()));
                }
                Err(e) => {
                    self.alert = Some(format!("Export failed: {e}"));
                }
            },
            None => {
                self.alert = Some("Nothing to export yet".to_string());
            }
        }
    }

    fn apply_outcome(&mut self, outcome: TurnOutcome, available_height: u16) {
        self.session
            .complete_turn(&outcome.placeholder_id, outcome.result);
        if let Some(message) = self.session.store().last() {
            if let Err(e) = self.logging.log_message(&message.text) {
                debug!("failed to log message: {e}");
            }
        }
        if self.auto_scroll {
            self.scroll_to_bottom(available_height);
        }
    }

    fn scroll_to_bottom(&mut self, available_height: u16) {
        let total = self.display_line_count();
        self.scroll_offset = max_scroll_offset(total, available_height);
    }

    fn display_line_count(&self) -> u16 {
        let view = self.view();
        build_display_lines(&view).len() as u16
    }

    fn view(&self) -> ChatView<'_> {
        let path_prompt = match &self.mode {
            InputMode::AttachPath(path) => Some(path.as_str()),
            InputMode::Message => None,
        };
        ChatView {
            session: &self.session,
            markdown: self.markdown,
            scroll_offset: self.scroll_offset,
            tick: self.tick,
            alert: self.alert.as_deref(),
            path_prompt,
        }
    }
}

pub async fn run_chat_loop(
    session: SessionController,
    gateway: Arc<dyn ModelGateway>,
    logging: LoggingState,
    options: ChatLoopOptions,
) -> Result<(), Box<dyn Error>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_inner(&mut terminal, session, gateway, logging, options).await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_inner(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    session: SessionController,
    gateway: Arc<dyn ModelGateway>,
    logging: LoggingState,
    options: ChatLoopOptions,
) -> Result<(), Box<dyn Error>> {
    let (tx, mut rx) = mpsc::unbounded_channel::<TurnOutcome>();

    let mut state = LoopState {
        session,
        logging,
        mode: InputMode::Message,
        recording: None,
        scroll_offset: 0,
        auto_scroll: true,
        tick: 0,
        alert: None,
        markdown: options.markdown,
    };

    loop {
        terminal.draw(|f| ui(f, &state.view()))?;

        let viewport = terminal.size().unwrap_or_default();
        // 3 rows for the input block, 1 for the transcript title
        let available_height = viewport.height.saturating_sub(3).saturating_sub(1);

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    match key.code {
                        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            break;
                        }
                        KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            state.alert = None;
                            state.toggle_recording(&gateway, &tx);
                        }
                        KeyCode::Char('o') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            if state.session.is_idle() {
                                state.alert = None;
                                state.mode = InputMode::AttachPath(String::new());
                            }
                        }
                        KeyCode::Char('e') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                            state.export(&options.export_dir);
                        }
                        KeyCode::Esc => match state.mode {
                            InputMode::AttachPath(_) => state.mode = InputMode::Message,
                            InputMode::Message => {
                                if state.session.is_recording() {
                                    state.cancel_recording();
                                }
                                state.alert = None;
                            }
                        },
                        KeyCode::Enter => match std::mem::replace(&mut state.mode, InputMode::Message)
                        {
                            InputMode::AttachPath(path) => state.confirm_attach_path(path),
                            InputMode::Message => {
                                state.alert = None;
                                if let Some(turn) = state.session.request_send() {
                                    state.dispatch(turn, &gateway, &tx);
                                    state.auto_scroll = true;
                                    state.scroll_to_bottom(available_height);
                                }
                            }
                        },
                        KeyCode::Char(c) => match &mut state.mode {
                            InputMode::AttachPath(path) => path.push(c),
                            InputMode::Message => state.session.input_char(c),
                        },
                        KeyCode::Backspace => match &mut state.mode {
                            InputMode::AttachPath(path) => {
                                path.pop();
                            }
                            InputMode::Message => state.session.input_backspace(),
                        },
                        KeyCode::Up => {
                            state.auto_scroll = false;
                            state.scroll_offset = state.scroll_offset.saturating_sub(1);
                        }
                        KeyCode::Down => {
                            let max =
                                max_scroll_offset(state.display_line_count(), available_height);
                            state.scroll_offset = state.scroll_offset.saturating_add(1).min(max);
                            if state.scroll_offset >= max {
                                state.auto_scroll = true;
                            }
                        }
                        _ => {}
                    }
                }
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollUp => {
                        state.auto_scroll = false;
                        state.scroll_offset = state.scroll_offset.saturating_sub(3);
                    }
                    MouseEventKind::ScrollDown => {
                        let max = max_scroll_offset(state.display_line_count(), available_height);
                        state.scroll_offset = state.scroll_offset.saturating_add(3).min(max);
                        if state.scroll_offset >= max {
                            state.auto_scroll = true;
                        }
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        // Apply completed gateway calls in arrival order
        while let Ok(outcome) = rx.try_recv() {
            state.apply_outcome(outcome, available_height);
        }

        if state.session.is_processing() {
            state.tick = state.tick.wrapping_add(1);
        }
    }

    Ok(())
}
