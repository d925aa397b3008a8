//! Frame rendering for the interactive review.
//!
//! Three regions: a header with the risk-coloured banner, the scrollable
//! card, and a footer with the key bindings.

use crate::approval::context::ApprovalContext;
use crate::card::{ChangeKind, DiffCard, LineStyle, RiskTier};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Banner, risk line, description, bottom border.
pub const HEADER_HEIGHT: u16 = 4;
/// Top border plus the bindings line.
pub const FOOTER_HEIGHT: u16 = 2;
/// The card region never shows fewer lines than this.
pub const MIN_VISIBLE_LINES: u16 = 10;
const CONTENT_BORDERS: u16 = 2;

const ORANGE: Color = Color::Rgb(255, 165, 0);

/// Number of card lines visible for a terminal of the given height.
pub fn viewport_height(terminal_height: u16) -> usize {
    terminal_height
        .saturating_sub(HEADER_HEIGHT + FOOTER_HEIGHT + CONTENT_BORDERS)
        .max(MIN_VISIBLE_LINES) as usize
}

/// Draw one full frame of the review.
pub fn draw(frame: &mut Frame<'_>, context: &ApprovalContext) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(HEADER_HEIGHT),
            Constraint::Min(MIN_VISIBLE_LINES + CONTENT_BORDERS),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(frame.area());

    render_header(frame, chunks[0], context.card());
    render_content(frame, chunks[1], context);
    render_footer(frame, chunks[2]);
}

pub fn risk_color(risk: RiskTier) -> Color {
    match risk {
        RiskTier::None => Color::Green,
        RiskTier::Low => Color::Yellow,
        RiskTier::Medium => ORANGE,
        RiskTier::High => Color::Red,
        RiskTier::Critical => Color::Magenta,
    }
}

pub fn change_color(kind: ChangeKind) -> Color {
    match kind {
        ChangeKind::Create => Color::Green,
        ChangeKind::Modify => Color::Yellow,
        ChangeKind::Delete => Color::Red,
        ChangeKind::Execute | ChangeKind::Network => Color::Magenta,
    }
}

fn line_style(style: LineStyle) -> Style {
    match style {
        LineStyle::Heading(kind) => Style::default()
            .fg(change_color(kind))
            .add_modifier(Modifier::BOLD),
        LineStyle::Added => Style::default().fg(Color::Green),
        LineStyle::Removed => Style::default().fg(Color::Red),
        LineStyle::Context => Style::default().fg(Color::Gray),
    }
}

fn render_header(frame: &mut Frame<'_>, area: Rect, card: &DiffCard) {
    let color = risk_color(card.risk());

    let banner = Span::styled(
        format!("{} Action Approval Required", card.risk().marker()),
        Style::default().fg(color).add_modifier(Modifier::BOLD),
    );
    let risk = Span::styled(
        format!("Risk: {}", card.risk().to_string().to_uppercase()),
        Style::default().fg(color),
    );
    let description = Span::styled(
        card.description().to_string(),
        Style::default().fg(Color::White),
    );

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(vec![
        Line::from(banner),
        Line::from(risk),
        Line::from(description),
    ])
    .block(block);

    frame.render_widget(paragraph, area);
}

fn render_content(frame: &mut Frame<'_>, area: Rect, context: &ApprovalContext) {
    let lines = context.card().lines();
    let offset = context.scroll_offset();
    let visible = area.height.saturating_sub(CONTENT_BORDERS) as usize;

    let text: Vec<Line> = lines
        .iter()
        .skip(offset)
        .take(visible)
        .map(|line| Line::from(Span::styled(line.text.as_str(), line_style(line.style))))
        .collect();

    let title = if lines.len() > visible {
        let end = (offset + visible).min(lines.len());
        format!("Proposed changes [{}/{}]", end, lines.len())
    } else {
        "Proposed changes".to_string()
    };

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn render_footer(frame: &mut Frame<'_>, area: Rect) {
    let key = |k: &'static str, color: Color| {
        Span::styled(k, Style::default().fg(color).add_modifier(Modifier::BOLD))
    };

    let bindings = Line::from(vec![
        key("y", Color::Green),
        Span::raw(" Approve  "),
        key("n", Color::Red),
        Span::raw(" Reject  "),
        key("Esc", Color::Red),
        Span::raw(" Cancel  "),
        key("↑/↓", Color::Cyan),
        Span::raw(" Scroll  "),
        key("PgUp/PgDn", Color::Cyan),
        Span::raw(" Page  "),
        key("Home/End", Color::Cyan),
        Span::raw(" Jump"),
    ]);

    let block = Block::default()
        .borders(Borders::TOP)
        .border_style(Style::default().fg(Color::Cyan));

    let paragraph = Paragraph::new(bindings)
        .block(block)
        .style(Style::default().fg(Color::Gray));

    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::Change;
    use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};

    fn buffer_text(buffer: &Buffer) -> String {
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn long_context(lines: usize) -> ApprovalContext {
        let body: Vec<String> = (1..=lines).map(|i| format!("key_{}: {}", i, i)).collect();
        let change = Change::new("config.yaml", ChangeKind::Delete).with_before(body.join("\n"));
        let card = DiffCard::new("delete config.yaml", RiskTier::High, vec![change]).unwrap();
        ApprovalContext::new(card)
    }

    fn render(context: &ApprovalContext, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| draw(f, context)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn test_viewport_has_floor() {
        assert_eq!(viewport_height(10), 10);
        assert_eq!(viewport_height(18), 10);
        assert_eq!(viewport_height(40), 32);
    }

    #[test]
    fn test_header_and_footer_rendered() {
        let screen = render(&long_context(3), 100, 24);
        assert!(screen.contains("Action Approval Required"));
        assert!(screen.contains("Risk: HIGH"));
        assert!(screen.contains("delete config.yaml"));
        assert!(screen.contains("Approve"));
        assert!(screen.contains("Reject"));
        assert!(screen.contains("PgUp/PgDn"));
    }

    #[test]
    fn test_content_starts_at_scroll_offset() {
        let mut context = long_context(40);
        context.scroll_down(10);
        context.scroll_down(10);
        let screen = render(&context, 100, 24);
        assert!(!screen.contains("1. [DELETE] config.yaml"));
        assert!(!screen.contains("key_1: 1 "));
        assert!(screen.contains("key_2: 2"));
    }

    #[test]
    fn test_scroll_indicator_only_when_overflowing() {
        let screen = render(&long_context(3), 100, 24);
        assert!(screen.contains("Proposed changes"));
        assert!(!screen.contains("Proposed changes ["));

        let screen = render(&long_context(40), 100, 24);
        assert!(screen.contains("Proposed changes [16/41]"));
    }

    #[test]
    fn test_snapshot_cannot_rewrite_the_screen() {
        let change = Change::new("a.sh", ChangeKind::Create)
            .with_after("rm -rf ~\r  echo harmless\x1b[2K");
        let card = DiffCard::new("install\x1b[1A script", RiskTier::High, vec![change]).unwrap();
        let screen = render(&ApprovalContext::new(card), 100, 24);

        assert!(!screen.contains('\x1b'));
        assert!(!screen.contains('\r'));
        assert!(screen.contains("rm -rf ~\\r  echo harmless\\u{1b}[2K"));
        assert!(screen.contains("install\\u{1b}[1A script"));
    }

    #[test]
    fn test_risk_colors() {
        assert_eq!(risk_color(RiskTier::None), Color::Green);
        assert_eq!(risk_color(RiskTier::Medium), ORANGE);
        assert_eq!(risk_color(RiskTier::Critical), Color::Magenta);
        assert_eq!(change_color(ChangeKind::Delete), Color::Red);
        assert_eq!(change_color(ChangeKind::Create), Color::Green);
    }
}
