//! New Customer Form
//!
//! Popup for creating a customer.

use super::dialog::centered_rect;
use crate::app::App;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use terp::form::{CustomerType, FormField};

pub fn render(f: &mut Frame, app: &App) {
    let popup_area = centered_rect(60, 40, f.area());

    f.render_widget(Clear, popup_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(Span::styled(
            " New Customer ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(popup_area);
    f.render_widget(block, popup_area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // spacer
            Constraint::Length(1), // name
            Constraint::Length(1), // type
            Constraint::Length(1), // group
            Constraint::Length(1), // territory
            Constraint::Length(1), // spacer
            Constraint::Length(1), // submit
            Constraint::Min(0),
        ])
        .split(inner);

    let form = &app.form;
    // Disabled while the create request is in flight
    let enabled = !app.creating;

    let label_style = Style::default().fg(Color::DarkGray);
    let focus_style = |field: FormField| {
        if enabled && form.focus == field {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else if enabled {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    };

    let cursor = if enabled && form.focus == FormField::CustomerName {
        "_"
    } else {
        ""
    };
    let name_line = Line::from(vec![
        Span::styled(" Customer Name: ", label_style),
        Span::styled(
            format!("{}{}", form.customer_name, cursor),
            focus_style(FormField::CustomerName),
        ),
    ]);
    f.render_widget(Paragraph::new(name_line), rows[1]);

    let type_option = |customer_type: CustomerType| {
        if form.customer_type == customer_type {
            Span::styled(
                format!("({}) ", customer_type.as_str()),
                focus_style(FormField::CustomerType),
            )
        } else {
            Span::styled(format!(" {}  ", customer_type.as_str()), label_style)
        }
    };
    let type_line = Line::from(vec![
        Span::styled(" Customer Type: ", label_style),
        type_option(CustomerType::Company),
        type_option(CustomerType::Individual),
    ]);
    f.render_widget(Paragraph::new(type_line), rows[2]);

    let group_line = Line::from(vec![
        Span::styled(" Group:         ", label_style),
        Span::styled(form.customer_group.as_str(), label_style),
    ]);
    f.render_widget(Paragraph::new(group_line), rows[3]);

    let territory_line = Line::from(vec![
        Span::styled(" Territory:     ", label_style),
        Span::styled(form.territory.as_str(), label_style),
    ]);
    f.render_widget(Paragraph::new(territory_line), rows[4]);

    let submit = if app.creating {
        Span::styled(
            " Creating... ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(
            " Create Customer (Enter) ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Green)
                .add_modifier(Modifier::BOLD),
        )
    };
    f.render_widget(Paragraph::new(Line::from(vec![Span::raw(" "), submit])), rows[6]);
}
