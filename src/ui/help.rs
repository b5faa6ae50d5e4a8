//! Help Overlay
//!
//! Shows keyboard shortcuts and help information.

use super::dialog::centered_rect;
use ratatui::{
    layout::Alignment,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

fn section(title: &'static str) -> Line<'static> {
    Line::from(Span::styled(title, Style::default().add_modifier(Modifier::BOLD)))
}

fn binding(keys: &'static str, description: &'static str, color: Color) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<12}", keys), Style::default().fg(color)),
        Span::raw(description),
    ])
}

pub fn render(f: &mut Frame) {
    let popup_area = centered_rect(70, 80, f.area());

    f.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(Span::styled(
            "Keyboard Shortcuts",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        section("Navigation"),
        binding("j/k, ↑/↓", "Move up/down", Color::Yellow),
        binding("gg", "Go to top", Color::Yellow),
        binding("G", "Go to bottom", Color::Yellow),
        binding("Ctrl+d/u", "Page down/up", Color::Yellow),
        Line::from(""),
        section("Views"),
        binding("1-4, Tab", "Customers / Sales Orders / Items / Purchase Orders", Color::Yellow),
        binding("Enter/d", "View document details", Color::Yellow),
        binding("R", "Refresh current view", Color::Yellow),
        binding("N", "Notification history", Color::Yellow),
        Line::from(""),
        section("Filtering"),
        binding("/", "Filter loaded rows", Color::Yellow),
        binding("Esc", "Clear filter", Color::Yellow),
        Line::from(""),
        section("Documents"),
        binding("n", "New customer", Color::Yellow),
        binding("Delete", "Delete document (destructive)", Color::Red),
        Line::from(""),
        binding("?/Esc", "Close help", Color::Yellow),
        binding("q", "Quit application", Color::Yellow),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            " Help ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .alignment(Alignment::Left);

    f.render_widget(paragraph, popup_area);
}
