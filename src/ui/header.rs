//! Header Component
//!
//! Displays endpoint, session, and entity information.

use crate::app::App;
use crate::VERSION;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use terp::data::Entity;
use terp::erp::AuthMethod;

pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" terp v{} ", VERSION),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);

    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    // Row 1: Endpoint and session
    let endpoint = app.data.client().base_endpoint();
    let auth_method = app.auth_method;
    let auth_color = match auth_method {
        AuthMethod::Session => Color::Green,
        AuthMethod::ApiKey => Color::Cyan,
        AuthMethod::Anonymous => Color::Yellow,
    };
    let endpoint_line = Line::from(vec![
        Span::styled(" ERP: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            if endpoint.is_empty() { "(not configured)" } else { endpoint },
            Style::default()
                .fg(if endpoint.is_empty() { Color::Red } else { Color::Yellow })
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("Auth: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            auth_method.display_name(),
            Style::default().fg(auth_color).add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("User: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            app.user.as_deref().unwrap_or("-"),
            Style::default().fg(Color::White),
        ),
    ]);
    f.render_widget(Paragraph::new(endpoint_line), rows[0]);

    // Row 2: Current entity and count
    let records = app.list.records.len();
    let entity_line = Line::from(vec![
        Span::styled(" Entity: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            app.entity.display_name(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" ({})", app.entity.doctype()),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("  "),
        Span::styled("Count: ", Style::default().fg(Color::DarkGray)),
        Span::styled(
            format!("{}", app.filtered_items.len()),
            Style::default().fg(Color::White),
        ),
        if records != app.filtered_items.len() {
            Span::styled(
                format!(" (filtered from {})", records),
                Style::default().fg(Color::DarkGray),
            )
        } else {
            Span::raw("")
        },
    ]);
    f.render_widget(Paragraph::new(entity_line), rows[1]);

    // Row 3: Entity tabs
    let mut tabs = vec![Span::styled(" ", Style::default())];
    for (idx, entity) in Entity::ALL.iter().enumerate() {
        let style = if *entity == app.entity {
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        tabs.push(Span::styled(
            format!(" {}:{} ", idx + 1, entity.display_name()),
            style,
        ));
        tabs.push(Span::raw(" "));
    }
    f.render_widget(Paragraph::new(Line::from(tabs)), rows[2]);

    // Row 4: Help hint
    let help_line = Line::from(vec![
        Span::styled(
            " ?:help  /:filter  n:new  R:refresh  N:notifications  q:quit",
            Style::default().fg(Color::DarkGray),
        ),
        if app.readonly {
            Span::styled(
                "  [READ-ONLY]",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::raw("")
        },
    ]);
    f.render_widget(Paragraph::new(help_line), rows[3]);
}
