//! Rendering for the terminal client

use crate::app::{App, Focus};
use crate::state_machine::RequestPhase;
use crate::transcript::{LiveSlot, Role};
use chrono::Utc;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

const SIDEBAR_WIDTH: u16 = 34;

pub fn render(app: &App, frame: &mut Frame) {
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let [sidebar_area, main_area] =
        Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
            .areas(body_area);

    let [transcript_area, chips_area, input_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(3),
        Constraint::Length(3),
    ])
    .areas(main_area);

    render_header(app, frame, header_area);
    render_history(app, frame, sidebar_area);
    if app.session.has_interacted() {
        render_transcript(app, frame, transcript_area);
    } else {
        render_welcome(app, frame, transcript_area);
    }
    render_chips(app, frame, chips_area);
    render_input(app, frame, input_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let phase = match app.session.phase() {
        RequestPhase::Idle | RequestPhase::Completed | RequestPhase::Errored => "",
        RequestPhase::AwaitingFirstByte => " waiting for answer",
        RequestPhase::Streaming => " receiving answer",
    };
    let title = Line::from(vec![
        Span::styled(
            " InfraBot ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(phase, Style::default().fg(Color::Yellow)),
    ]);
    frame.render_widget(
        Paragraph::new(title).style(Style::default().bg(Color::DarkGray)),
        area,
    );
}

fn render_history(app: &App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == Focus::History;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { Color::Cyan } else { Color::DarkGray }))
        .title(" History (F2) ");

    let history = app.session.history();
    if history.is_empty() {
        let empty = Paragraph::new("No conversations yet")
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let now = Utc::now();
    let active = history.active_id();
    let items: Vec<ListItem> = history
        .entries()
        .iter()
        .map(|entry| {
            let marker = if Some(&entry.id) == active { "● " } else { "  " };
            let title = if entry.preview.is_empty() {
                entry.query.clone()
            } else {
                entry.preview.clone()
            };
            ListItem::new(Text::from(vec![
                Line::from(format!("{marker}{title}")),
                Line::from(Span::styled(
                    format!("  {}", entry.age(now)),
                    Style::default().fg(Color::DarkGray),
                )),
            ]))
        })
        .collect();

    let list = List::new(items).block(block).highlight_style(
        Style::default()
            .bg(Color::Cyan)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD),
    );

    let mut state = ListState::default();
    if focused {
        state.select(Some(app.history_cursor));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

fn render_welcome(app: &App, frame: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::default(),
        Line::from(Span::styled(
            "How can I help you today?",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Pick a topic below (Tab) or type your question.",
            Style::default().fg(Color::DarkGray),
        )),
        Line::default(),
    ];
    for topic in app.session.navigator().roots() {
        lines.push(Line::from(format!("  • {}", topic.label)));
    }

    frame.render_widget(
        Paragraph::new(lines).block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn render_transcript(app: &App, frame: &mut Frame, area: Rect) {
    let transcript = app.session.transcript();
    let mut lines: Vec<Line> = Vec::new();

    for message in transcript.messages() {
        push_message(&mut lines, message.role, &message.content);
    }

    match transcript.live() {
        LiveSlot::Empty => {}
        LiveSlot::Thinking => {
            lines.push(speaker(Role::Assistant));
            let dots = ".".repeat(usize::from(app.animation_frame) + 1);
            lines.push(Line::from(Span::styled(
                format!("Thinking{dots}"),
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC),
            )));
        }
        LiveSlot::Streaming(content) => push_message(&mut lines, Role::Assistant, content),
    }

    // Follow the latest message
    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);
    let total = wrapped_height(&lines, inner_width);
    let scroll = total.saturating_sub(inner_height);

    let paragraph = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);
}

fn speaker(role: Role) -> Line<'static> {
    match role {
        Role::User => Line::from(Span::styled(
            "You:",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Role::Assistant => Line::from(Span::styled(
            "InfraBot:",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
    }
}

fn push_message<'a>(lines: &mut Vec<Line<'a>>, role: Role, content: &'a str) {
    lines.push(speaker(role));
    for line in content.lines() {
        lines.push(Line::from(line));
    }
    lines.push(Line::default());
}

/// Rows needed to show `lines` word-wrapped at `width`
///
/// Mirrors the paragraph's word wrapping: a word that does not fit on the
/// current row moves to the next one, and a word wider than a row is split.
fn wrapped_height(lines: &[Line], width: u16) -> u16 {
    let width = usize::from(width.max(1));
    let rows: usize = lines.iter().map(|line| line_rows(line, width)).sum();
    u16::try_from(rows).unwrap_or(u16::MAX)
}

fn line_rows(line: &Line, width: usize) -> usize {
    let text: String = line.spans.iter().map(|span| span.content.as_ref()).collect();
    let mut rows = 1;
    let mut used = 0;
    for word in text.split(' ') {
        let mut word_width = Span::raw(word).width();
        if used > 0 && used + 1 + word_width <= width {
            used += 1 + word_width;
            continue;
        }
        if used > 0 {
            rows += 1;
        }
        while word_width > width {
            rows += 1;
            word_width -= width;
        }
        used = word_width;
    }
    rows
}

fn render_chips(app: &App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == Focus::Chips;
    let title = if app.session.navigator().is_active() {
        let path = app.session.navigator().breadcrumb().join(" › ");
        if path.is_empty() {
            " Sub-topics ".to_string()
        } else {
            format!(" {path} ")
        }
    } else {
        " Topics (Tab) ".to_string()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(if focused { Color::Yellow } else { Color::DarkGray }))
        .title(title);

    let mut spans = Vec::new();
    for (i, chip) in app.chips().into_iter().enumerate() {
        let style = if focused && i == app.chip_cursor {
            Style::default().bg(Color::Yellow).fg(Color::Black)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(format!(" {chip} "), style));
        spans.push(Span::raw(" "));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let enabled = app.session.can_submit();
    let focused = app.focus == Focus::Input;
    let border = match (enabled, focused) {
        (false, _) => Color::DarkGray,
        (true, true) => Color::Cyan,
        (true, false) => Color::Gray,
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border))
        .title(if enabled { " Ask " } else { " Please wait " });

    // Keep the tail of long input visible
    let inner_width = usize::from(area.width.saturating_sub(2));
    let len = app.input.chars().count();
    let skip = (len + 1).saturating_sub(inner_width).min(len);
    let visible: String = app.input.chars().skip(skip).collect();

    let (text, style) = if app.input.is_empty() {
        (
            "Ask anything about IT...".to_string(),
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (visible, Style::default().fg(Color::Cyan))
    };
    frame.render_widget(Paragraph::new(text).style(style).block(block), area);

    // No room for a cursor inside the borders
    if enabled && focused && inner_width > 0 {
        let cursor = u16::try_from(len - skip).unwrap_or(0);
        frame.set_cursor_position((area.x + cursor + 1, area.y + 1));
    }
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().fg(Color::White);

    let mut spans = Vec::new();
    for (key, label) in [
        ("Enter", "send"),
        ("Tab", "topics"),
        ("Esc", "back"),
        ("F2", "history"),
        ("Ctrl-C", "quit"),
    ] {
        spans.push(Span::styled(format!(" {key} "), key_style));
        spans.push(Span::styled(format!(" {label} "), label_style));
    }
    if let Some(notice) = &app.notice {
        spans.push(Span::styled(
            format!("  {notice}"),
            Style::default().fg(Color::Yellow),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
