//! Terminal User Interface rendering module
//!
//! This module handles all UI rendering for terp using the ratatui framework.
//! Documents of the current entity are shown in a table with vim-style
//! navigation.
//!
//! # Architecture
//!
//! - [`splash`] - Startup splash screen
//! - `header` - Header bar with endpoint/session info
//! - `help` - Help overlay showing keybindings
//! - `dialog` - Confirmation and warning dialogs
//! - `form` - New customer form
//! - `notifications` - Operation history panel
//!
//! # List States
//!
//! The list area shows exactly one of: a loading message, a static error
//! message, an empty-list message, or the table.
//!
//! # JSON Highlighting
//!
//! The describe view provides syntax highlighting for JSON output:
//! - Keys in cyan
//! - Strings in green
//! - Numbers in light blue
//! - Booleans in magenta
//! - Null values in dark gray

mod dialog;
mod form;
mod header;
mod help;
mod notifications;
pub mod splash;

use crate::app::{App, Mode};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        Block, Borders, Cell, Paragraph, Row, Scrollbar, ScrollbarOrientation, ScrollbarState,
        Table, TableState,
    },
    Frame,
};
use terp::data::{display_field, ColumnDef};
use terp::notification::NotificationStatus;

pub fn render(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Header (multi-line)
            Constraint::Min(1),    // Main content (table or describe)
            Constraint::Length(1), // Footer/crumb
        ])
        .split(f.area());

    header::render(f, app, chunks[0]);

    match app.mode {
        Mode::Describe => {
            render_describe_view(f, app, chunks[1]);
        },
        _ => {
            render_main_content(f, app, chunks[1]);
        },
    }

    render_crumb(f, app, chunks[2]);

    // Overlays
    match app.mode {
        Mode::Help => {
            help::render(f);
        },
        Mode::Create => {
            form::render(f, app);
        },
        Mode::Confirm | Mode::Warning => {
            dialog::render(f, app);
        },
        Mode::Notifications => {
            notifications::render(f, app);
        },
        _ => {},
    }
}

fn render_main_content(f: &mut Frame, app: &mut App, area: Rect) {
    // If filter is active or has text, show filter input above table
    let show_filter = app.filter_active || !app.filter_text.is_empty();

    let table_area = if show_filter {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(area);

        render_filter_bar(f, app, chunks[0]);
        chunks[1]
    } else {
        area
    };

    let label = app.entity.display_name().to_lowercase();

    if app.list.is_error.is_some() {
        render_list_message(
            f,
            app,
            table_area,
            &format!("Error loading {}", label),
            Color::Red,
        );
    } else if app.list.is_loading {
        render_list_message(
            f,
            app,
            table_area,
            &format!("Loading {}...", label),
            Color::Yellow,
        );
    } else if app.list.records.is_empty() {
        render_list_message(
            f,
            app,
            table_area,
            &format!("No {} found", label),
            Color::DarkGray,
        );
    } else {
        render_table(f, app, table_area);
    }
}

fn render_filter_bar(f: &mut Frame, app: &App, area: Rect) {
    let cursor_style = if app.filter_active {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let filter_display = if app.filter_active {
        format!("/{}_", app.filter_text)
    } else {
        format!("/{}", app.filter_text)
    };

    let paragraph = Paragraph::new(Line::from(vec![Span::styled(filter_display, cursor_style)]));
    f.render_widget(paragraph, area);
}

fn list_block(app: &App) -> Block<'static> {
    let count = app.filtered_items.len();
    let title = if app.filter_text.is_empty() {
        format!(" {}[{}] ", app.entity.display_name(), count)
    } else {
        format!(
            " {}[{}/{}] ",
            app.entity.display_name(),
            count,
            app.list.records.len()
        )
    };

    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center)
}

fn render_list_message(f: &mut Frame, app: &App, area: Rect, message: &str, color: Color) {
    let block = list_block(app);
    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let paragraph = Paragraph::new(message.to_string())
        .style(Style::default().fg(color))
        .alignment(Alignment::Center);
    f.render_widget(paragraph, inner_area);
}

/// Render the document table with virtual scrolling
fn render_table(f: &mut Frame, app: &mut App, area: Rect) {
    let block = list_block(app);
    let inner_area = block.inner(area);
    f.render_widget(block, area);

    // Calculate viewport - account for header row
    let visible_height = (inner_area.height as usize).saturating_sub(1);
    app.update_viewport(visible_height);
    app.ensure_visible();

    let total_items = app.filtered_items.len();
    let needs_scrollbar = total_items > visible_height;

    let table_area = if needs_scrollbar {
        Rect {
            width: inner_area.width.saturating_sub(1),
            ..inner_area
        }
    } else {
        inner_area
    };

    let range = app.visible_range();
    let columns = app.entity.columns();

    let header_cells: Vec<Cell> = columns
        .iter()
        .map(|col| {
            Cell::from(format!(" {}", col.header)).style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
        })
        .collect();
    let header = Row::new(header_cells).height(1);

    // Build only visible rows
    let rows: Vec<Row> = app.filtered_items[range.clone()]
        .iter()
        .map(|item| {
            let cells = columns.iter().map(|col| {
                let value = display_field(item, col.field);
                let style = get_cell_style(&value, col);
                Cell::from(format!(" {}", truncate_string(&value, 38))).style(style)
            });
            Row::new(cells)
        })
        .collect();

    let widths: Vec<Constraint> = columns
        .iter()
        .map(|col| Constraint::Percentage(col.width))
        .collect();

    let table = Table::new(rows, widths).header(header).row_highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    // Adjust selected index for virtual scrolling
    let mut state = TableState::default();
    if app.selected >= range.start && app.selected < range.end {
        state.select(Some(app.selected - range.start));
    }

    f.render_stateful_widget(table, table_area, &mut state);

    if needs_scrollbar {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .symbols(symbols::scrollbar::VERTICAL)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"));

        let mut scrollbar_state = ScrollbarState::new(total_items.saturating_sub(visible_height))
            .position(app.scroll_offset);

        f.render_stateful_widget(scrollbar, inner_area, &mut scrollbar_state);
    }
}

/// Document status colors (Sales/Purchase Order `status`)
fn get_cell_style(value: &str, col: &ColumnDef) -> Style {
    if col.field != "status" {
        return Style::default();
    }
    match value {
        "Completed" | "Closed" => Style::default().fg(Color::Green),
        "Cancelled" => Style::default().fg(Color::Red),
        "Draft" => Style::default().fg(Color::DarkGray),
        "On Hold" => Style::default().fg(Color::Magenta),
        v if v.starts_with("To ") => Style::default().fg(Color::Yellow),
        _ => Style::default(),
    }
}

/// Truncate string for display (Unicode-safe)
fn truncate_string(s: &str, max_len: usize) -> String {
    let char_count = s.chars().count();
    if char_count > max_len {
        let truncated: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    } else {
        s.to_string()
    }
}

fn render_describe_view(f: &mut Frame, app: &App, area: Rect) {
    let name = app.describe_name.clone().unwrap_or_default();
    let title = format!(" {}: {} ", app.entity.doctype(), name);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            title,
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner_area = block.inner(area);
    f.render_widget(block, area);

    let state = &app.describe;
    let json = match app.describe_json() {
        Some(json) => json,
        None => {
            let (message, color) = if let Some(err) = &state.is_error {
                (
                    format!("Error loading {}: {}", name, terp::erp::format_erp_error(err)),
                    Color::Red,
                )
            } else if state.is_loading {
                (format!("Loading {}...", name), Color::Yellow)
            } else {
                ("No document selected".to_string(), Color::DarkGray)
            };
            let paragraph = Paragraph::new(message).style(Style::default().fg(color));
            f.render_widget(paragraph, inner_area);
            return;
        },
    };

    let lines: Vec<Line> = json.lines().map(highlight_json_line).collect();
    let total_lines = lines.len();

    let visible_lines = inner_area.height as usize;
    let max_scroll = total_lines.saturating_sub(visible_lines);
    let scroll = app.describe_scroll.min(max_scroll);

    let paragraph = Paragraph::new(lines).scroll((scroll as u16, 0));
    f.render_widget(paragraph, inner_area);

    if total_lines > visible_lines {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"));
        let mut scrollbar_state = ScrollbarState::new(max_scroll + visible_lines).position(scroll);
        f.render_stateful_widget(scrollbar, inner_area, &mut scrollbar_state);
    }
}

/// Apply JSON syntax highlighting to a single line
fn highlight_json_line(line: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut chars = line.chars().peekable();
    let mut current = String::new();
    let mut is_key = true;

    let flush = |current: &mut String, spans: &mut Vec<Span<'static>>| {
        if !current.is_empty() {
            spans.push(Span::styled(current.clone(), get_json_value_style(current)));
            current.clear();
        }
    };

    while let Some(c) = chars.next() {
        match c {
            '"' => {
                if !current.is_empty() {
                    spans.push(Span::raw(current.clone()));
                    current.clear();
                }

                let mut string_content = String::from("\"");
                while let Some(next_c) = chars.next() {
                    string_content.push(next_c);
                    if next_c == '"' {
                        break;
                    }
                    if next_c == '\\' {
                        if let Some(escaped) = chars.next() {
                            string_content.push(escaped);
                        }
                    }
                }

                let style = if is_key {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default().fg(Color::Green)
                };
                spans.push(Span::styled(string_content, style));
            },
            ':' => {
                spans.push(Span::styled(":", Style::default().fg(Color::White)));
                is_key = false;
            },
            ',' => {
                flush(&mut current, &mut spans);
                spans.push(Span::styled(",", Style::default().fg(Color::White)));
                is_key = true;
            },
            '{' | '}' | '[' | ']' => {
                flush(&mut current, &mut spans);
                spans.push(Span::styled(c.to_string(), Style::default().fg(Color::Yellow)));
                if c == '{' || c == '[' {
                    is_key = c == '{';
                }
            },
            ' ' | '\t' => {
                flush(&mut current, &mut spans);
                spans.push(Span::raw(c.to_string()));
            },
            _ => {
                current.push(c);
            },
        }
    }

    flush(&mut current, &mut spans);

    Line::from(spans)
}

/// Get style for JSON values (numbers, booleans, null)
fn get_json_value_style(value: &str) -> Style {
    let trimmed = value.trim();
    if trimmed == "null" {
        Style::default().fg(Color::DarkGray)
    } else if trimmed == "true" || trimmed == "false" {
        Style::default().fg(Color::Magenta)
    } else if trimmed.parse::<f64>().is_ok() {
        Style::default().fg(Color::LightBlue)
    } else {
        Style::default().fg(Color::White)
    }
}

fn render_crumb(f: &mut Frame, app: &App, area: Rect) {
    let crumb_display = match app.mode {
        Mode::Describe => format!(
            "{} > {}",
            app.entity.key(),
            app.describe_name.as_deref().unwrap_or("-")
        ),
        Mode::Create => format!("{} > new", app.entity.key()),
        _ => app.entity.key().to_string(),
    };

    let toast = app.notification_manager.current_toast();
    let toast_text = toast.map(|notif| notif.toast_message(app.notification_manager.detail_level));

    let notification_indicator = {
        let pending = app.notification_manager.pending_count();
        let total = app.notification_manager.notifications.len();
        if pending > 0 {
            format!(" [↻{}]", pending)
        } else if total > 0 {
            " [N]".to_string()
        } else {
            String::new()
        }
    };

    let list_error = app.list.is_error.as_deref();

    let status_text = if let Some(ref toast) = toast_text {
        toast.clone()
    } else if let Some(err) = list_error {
        format!("Error: {}", terp::erp::format_erp_error(err))
    } else if app.list.is_loading {
        "Loading...".to_string()
    } else if app.mode == Mode::Describe {
        "j/k: scroll | R: refresh | q/Esc: back".to_string()
    } else if app.mode == Mode::Create {
        "Tab: next field | Space: toggle type | Enter: create | Esc: cancel".to_string()
    } else if app.filter_active {
        "Type to filter | Enter: apply | Esc: clear".to_string()
    } else {
        "1-4: entity | n: new | Enter: describe | Del: delete | R: refresh | ?: help".to_string()
    };

    let style = if let Some(notif) = toast {
        match &notif.status {
            NotificationStatus::Success => Style::default().fg(Color::Green),
            NotificationStatus::Error(_) => Style::default().fg(Color::Red),
            NotificationStatus::Pending => Style::default().fg(Color::Yellow),
        }
    } else if list_error.is_some() {
        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
    } else if app.list.is_loading {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let indicator_style = if app.notification_manager.pending_count() > 0 {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let crumb = Line::from(vec![
        Span::styled(
            format!("<{}>", crumb_display),
            Style::default().fg(Color::Black).bg(Color::Cyan),
        ),
        Span::raw(" "),
        Span::styled(status_text, style),
        Span::styled(notification_indicator, indicator_style),
    ]);

    f.render_widget(Paragraph::new(crumb), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span_texts(line: &Line) -> Vec<String> {
        line.spans.iter().map(|s| s.content.to_string()).collect()
    }

    #[test]
    fn test_highlight_key_and_string_value() {
        let line = highlight_json_line(r#"  "customer_name": "Acme","#);
        let texts = span_texts(&line);
        assert!(texts.contains(&"\"customer_name\"".to_string()));
        assert!(texts.contains(&"\"Acme\"".to_string()));

        let key = line.spans.iter().find(|s| s.content == "\"customer_name\"").unwrap();
        assert_eq!(key.style.fg, Some(Color::Cyan));
        let value = line.spans.iter().find(|s| s.content == "\"Acme\"").unwrap();
        assert_eq!(value.style.fg, Some(Color::Green));
    }

    #[test]
    fn test_highlight_escaped_quote_stays_in_string() {
        let line = highlight_json_line(r#"  "a": "say \"hi\"""#);
        let texts = span_texts(&line);
        assert!(texts.contains(&r#""say \"hi\"""#.to_string()));
    }

    #[test]
    fn test_value_styles() {
        assert_eq!(get_json_value_style("null").fg, Some(Color::DarkGray));
        assert_eq!(get_json_value_style("true").fg, Some(Color::Magenta));
        assert_eq!(get_json_value_style("12.5").fg, Some(Color::LightBlue));
    }

    #[test]
    fn test_truncate_string_is_unicode_safe() {
        assert_eq!(truncate_string("short", 10), "short");
        assert_eq!(truncate_string("Ünïcödé customer", 8), "Ünïcö...");
    }
}
