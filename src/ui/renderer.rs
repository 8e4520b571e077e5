//! Presentation layer: turns a transcript snapshot into terminal frames.
//!
//! Consumes read-only state from the session controller; never mutates it.

use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::core::constants::THINKING_STATUS;
use crate::core::message::{Message, Role};
use crate::core::session::{Phase, SessionController};
use crate::ui::markdown::{render_markdown, render_plain};

const SPINNER_FRAMES: [&str; 6] = ["⠋", "⠙", "⠸", "⠴", "⠦", "⠇"];

/// Everything the renderer needs for one frame.
pub struct ChatView<'a> {
    pub session: &'a SessionController,
    pub markdown: bool,
    pub scroll_offset: u16,
    pub tick: usize,
    /// Inline alert shown above the input area (encoding/microphone errors).
    pub alert: Option<&'a str>,
    /// When set, the input area is collecting a file path to attach.
    pub path_prompt: Option<&'a str>,
}

pub fn build_display_lines(view: &ChatView<'_>) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for message in view.session.store().iter() {
        append_message_lines(&mut lines, message, view);
        lines.push(Line::from(""));
    }
    lines
}

fn append_message_lines(lines: &mut Vec<Line<'static>>, message: &Message, view: &ChatView<'_>) {
    if message.is_thinking {
        let frame = SPINNER_FRAMES[view.tick % SPINNER_FRAMES.len()];
        lines.push(Line::from(Span::styled(
            format!("{frame} {THINKING_STATUS}"),
            Style::default()
                .fg(Color::LightBlue)
                .add_modifier(Modifier::DIM),
        )));
        return;
    }

    match message.role {
        Role::User => {
            lines.push(Line::from(vec![
                Span::styled(
                    "You: ",
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(message.text.clone(), Style::default().fg(Color::Cyan)),
            ]));
            for attachment in &message.attachments {
                lines.push(Line::from(Span::styled(
                    format!("  📎 {}", attachment.mime_type),
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
        Role::Model => {
            if view.markdown {
                lines.extend(render_markdown(&message.text));
            } else {
                lines.extend(render_plain(&message.text));
            }
            if !message.citations.is_empty() {
                lines.push(Line::from(Span::styled(
                    "Sources:",
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::BOLD),
                )));
                for (index, citation) in message.citations.iter().enumerate() {
                    let title = if citation.title.is_empty() {
                        citation.uri.clone()
                    } else {
                        citation.title.clone()
                    };
                    lines.push(Line::from(vec![
                        Span::styled(
                            format!("  [{}] {} ", index + 1, title),
                            Style::default().fg(Color::DarkGray),
                        ),
                        Span::styled(
                            citation.uri.clone(),
                            Style::default()
                                .fg(Color::Blue)
                                .add_modifier(Modifier::UNDERLINED),
                        ),
                    ]));
                }
            }
        }
        Role::System => {
            for line in message.text.lines() {
                lines.push(Line::from(Span::styled(
                    line.to_string(),
                    Style::default().fg(Color::DarkGray),
                )));
            }
        }
    }
}

/// Scroll offset needed to pin the transcript bottom to the viewport.
pub fn max_scroll_offset(total_lines: u16, available_height: u16) -> u16 {
    total_lines.saturating_sub(available_height)
}

fn input_title(view: &ChatView<'_>) -> String {
    if let Some(alert) = view.alert {
        return format!("⚠ {alert}");
    }
    if view.path_prompt.is_some() {
        return "Attach file path — Enter to confirm, Esc to cancel".to_string();
    }
    match view.session.phase() {
        Phase::Idle => {
            let pending = view.session.pending_attachments().len();
            if pending > 0 {
                format!("{pending} attachment(s) pending — Enter to send")
            } else {
                "Enter send · Ctrl+R record · Ctrl+O attach · Ctrl+E export · Ctrl+C quit"
                    .to_string()
            }
        }
        Phase::Recording => "● Recording — Ctrl+R to stop, Esc to cancel".to_string(),
        Phase::Processing => THINKING_STATUS.to_string(),
    }
}

pub fn ui(f: &mut Frame, view: &ChatView<'_>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(f.area());

    let lines = build_display_lines(view);
    let available_height = chunks[0].height.saturating_sub(1);
    let max_offset = max_scroll_offset(lines.len() as u16, available_height);
    let scroll_offset = view.scroll_offset.min(max_offset);

    let transcript = Paragraph::new(lines)
        .block(Block::default().title("FlightGenius — Ultimate Edition"))
        .wrap(Wrap { trim: true })
        .scroll((scroll_offset, 0));
    f.render_widget(transcript, chunks[0]);

    let input_style = match view.session.phase() {
        Phase::Idle => Style::default().fg(Color::Yellow),
        Phase::Recording => Style::default().fg(Color::Red),
        Phase::Processing => Style::default().fg(Color::DarkGray),
    };
    let input_text = view.path_prompt.unwrap_or_else(|| view.session.pending_text());
    let input = Paragraph::new(input_text)
        .style(input_style)
        .block(Block::default().borders(Borders::ALL).title(input_title(view)))
        .wrap(Wrap { trim: true });
    f.render_widget(input, chunks[1]);

    if view.session.is_idle() {
        let cursor_x = input_text.width() as u16 + 1;
        f.set_cursor_position((chunks[1].x + cursor_x, chunks[1].y + 1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::gateway::GatewayReply;
    use crate::core::message::Citation;

    fn view(session: &SessionController) -> ChatView<'_> {
        ChatView {
            session,
            markdown: true,
            scroll_offset: 0,
            tick: 0,
            alert: None,
            path_prompt: None,
        }
    }

    fn all_text(lines: &[Line<'_>]) -> String {
        lines
            .iter()
            .map(|l| {
                l.spans
                    .iter()
                    .map(|s| s.content.as_ref())
                    .collect::<String>()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn thinking_placeholder_renders_status_line() {
        let mut session = SessionController::new();
        session.input_char('a');
        let _turn = session.request_send().unwrap();
        let rendered = all_text(&build_display_lines(&view(&session)));
        assert!(rendered.contains(THINKING_STATUS));
        assert!(rendered.contains("You: a"));
    }

    #[test]
    fn citations_render_as_numbered_sources() {
        let mut session = SessionController::new();
        session.input_char('a');
        let turn = session.request_send().unwrap();
        session.complete_turn(
            &turn.placeholder_id,
            Ok(GatewayReply {
                text: "done".to_string(),
                citations: vec![Citation {
                    uri: "https://emirates.com".to_string(),
                    title: "Emirates".to_string(),
                }],
            }),
        );
        let rendered = all_text(&build_display_lines(&view(&session)));
        assert!(rendered.contains("Sources:"));
        assert!(rendered.contains("[1] Emirates"));
        assert!(rendered.contains("https://emirates.com"));
    }

    #[test]
    fn scroll_offset_clamps_to_content() {
        assert_eq!(max_scroll_offset(10, 4), 6);
        assert_eq!(max_scroll_offset(3, 4), 0);
    }
}
