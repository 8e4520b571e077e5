//! Markdown rendering for the chat area.
//!
//! Model responses arrive as markdown (headings, emphasis, links, lists);
//! this walks the pulldown-cmark event stream and emits styled terminal
//! lines. Tables and code fences are out of scope for the assistant's
//! output and fall back to plain text.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

#[derive(Default)]
struct RenderState {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    bold: usize,
    italic: usize,
    heading: bool,
    link_target: Option<String>,
    list_stack: Vec<Option<u64>>,
}

impl RenderState {
    fn style(&self) -> Style {
        let mut style = Style::default();
        if self.heading {
            style = style.fg(Color::Cyan).add_modifier(Modifier::BOLD);
        }
        if self.bold > 0 {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.italic > 0 {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if self.link_target.is_some() {
            style = style.fg(Color::Blue).add_modifier(Modifier::UNDERLINED);
        }
        style
    }

    fn push_text(&mut self, text: &str) {
        // Markdown text events can span multiple source lines
        let mut first = true;
        for piece in text.split('\n') {
            if !first {
                self.flush_line();
            }
            if !piece.is_empty() {
                self.current
                    .push(Span::styled(piece.to_string(), self.style()));
            }
            first = false;
        }
    }

    fn flush_line(&mut self) {
        let spans = std::mem::take(&mut self.current);
        self.lines.push(Line::from(spans));
    }

    fn flush_if_open(&mut self) {
        if !self.current.is_empty() {
            self.flush_line();
        }
    }

    fn blank_line(&mut self) {
        // Only between content lines; never lead a message with spacing
        if matches!(self.lines.last(), Some(line) if !is_blank(line)) {
            self.lines.push(Line::default());
        }
    }

    fn item_prefix(&mut self) -> String {
        let depth = self.list_stack.len().saturating_sub(1);
        let indent = "  ".repeat(depth);
        match self.list_stack.last_mut() {
            Some(Some(number)) => {
                let prefix = format!("{indent}{number}. ");
                *number += 1;
                prefix
            }
            _ => format!("{indent}• "),
        }
    }
}

/// Render markdown into styled display lines.
pub fn render_markdown(text: &str) -> Vec<Line<'static>> {
    let mut state = RenderState::default();
    let parser = Parser::new_ext(text, Options::empty());

    for event in parser {
        match event {
            Event::Start(Tag::Heading { .. }) => {
                state.flush_if_open();
                state.blank_line();
                state.heading = true;
            }
            Event::End(TagEnd::Heading(_)) => {
                state.flush_if_open();
                state.heading = false;
            }
            Event::Start(Tag::Paragraph) => {}
            Event::End(TagEnd::Paragraph) => {
                state.flush_if_open();
                if state.list_stack.is_empty() {
                    state.blank_line();
                }
            }
            Event::Start(Tag::Strong) => state.bold += 1,
            Event::End(TagEnd::Strong) => state.bold = state.bold.saturating_sub(1),
            Event::Start(Tag::Emphasis) => state.italic += 1,
            Event::End(TagEnd::Emphasis) => state.italic = state.italic.saturating_sub(1),
            Event::Start(Tag::List(start)) => {
                state.flush_if_open();
                state.list_stack.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                state.list_stack.pop();
                if state.list_stack.is_empty() {
                    state.blank_line();
                }
            }
            Event::Start(Tag::Item) => {
                state.flush_if_open();
                let prefix = state.item_prefix();
                state
                    .current
                    .push(Span::styled(prefix, Style::default().fg(Color::Yellow)));
            }
            Event::End(TagEnd::Item) => state.flush_if_open(),
            Event::Start(Tag::Link { dest_url, .. }) => {
                state.link_target = Some(dest_url.to_string());
            }
            Event::End(TagEnd::Link) => {
                if let Some(target) = state.link_target.take() {
                    state.current.push(Span::styled(
                        format!(" ({target})"),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
            }
            Event::Text(text) => state.push_text(&text),
            Event::Code(code) => {
                let style = Style::default().fg(Color::Green);
                state.current.push(Span::styled(code.to_string(), style));
            }
            Event::SoftBreak | Event::HardBreak => state.flush_line(),
            Event::Rule => {
                state.flush_if_open();
                state.lines.push(Line::from(Span::styled(
                    "─".repeat(24),
                    Style::default().fg(Color::DarkGray),
                )));
            }
            _ => {}
        }
    }
    state.flush_if_open();

    // Trim a trailing spacer so callers control spacing between messages
    while matches!(state.lines.last(), Some(line) if is_blank(line)) {
        state.lines.pop();
    }
    state.lines
}

fn is_blank(line: &Line<'_>) -> bool {
    line.spans.iter().all(|span| span.content.is_empty())
}

/// Plain-text fallback when markdown rendering is disabled.
pub fn render_plain(text: &str) -> Vec<Line<'static>> {
    text.lines()
        .map(|line| Line::from(line.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn headings_are_bold_cyan_lines() {
        let lines = render_markdown("# Flights\nbody");
        let heading = lines
            .iter()
            .find(|l| line_text(l) == "Flights")
            .expect("heading line");
        assert_eq!(heading.spans[0].style.fg, Some(Color::Cyan));
        assert!(heading.spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn bullet_lists_get_prefixes() {
        let lines = render_markdown("* بحث أسعار لحظي\n* روابط حجز مباشرة");
        let rendered: Vec<String> = lines.iter().map(line_text).collect();
        assert!(rendered.contains(&"• بحث أسعار لحظي".to_string()));
        assert!(rendered.contains(&"• روابط حجز مباشرة".to_string()));
    }

    #[test]
    fn ordered_lists_count_up() {
        let lines = render_markdown("1. first\n2. second");
        let rendered: Vec<String> = lines.iter().map(line_text).collect();
        assert!(rendered.contains(&"1. first".to_string()));
        assert!(rendered.contains(&"2. second".to_string()));
    }

    #[test]
    fn strong_spans_are_bold() {
        let lines = render_markdown("fare: **500 USD**");
        let line = &lines[0];
        let bold_span = line
            .spans
            .iter()
            .find(|s| s.content == "500 USD")
            .expect("bold span");
        assert!(bold_span.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn links_render_text_then_target() {
        let lines = render_markdown("[EgyptAir](https://egyptair.com)");
        let rendered = line_text(&lines[0]);
        assert_eq!(rendered, "EgyptAir (https://egyptair.com)");
    }

    #[test]
    fn plain_fallback_preserves_lines() {
        let lines = render_plain("a\n\nb");
        assert_eq!(lines.len(), 3);
        assert_eq!(line_text(&lines[0]), "a");
        assert_eq!(line_text(&lines[2]), "b");
    }
}
