//! Splash Screen
//!
//! Startup checklist shown while the client connects and the first list loads.

use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

/// Startup stages, in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStep {
    Config,
    Client,
    Session,
    FirstList,
}

impl InitStep {
    pub const ALL: [InitStep; 4] = [
        InitStep::Config,
        InitStep::Client,
        InitStep::Session,
        InitStep::FirstList,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::Config => "Configuration",
            Self::Client => "ERP endpoint",
            Self::Session => "Session",
            Self::FirstList => "Initial data",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum StepOutcome {
    Done(String),
    /// Finished, but the app starts in a degraded state
    Warned(String),
}

/// Splash screen state
#[derive(Debug, Default)]
pub struct SplashState {
    running: Option<(InitStep, String)>,
    finished: Vec<(InitStep, StepOutcome)>,
}

impl SplashState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `step` as running with a short description of what it does
    pub fn begin(&mut self, step: InitStep, detail: impl Into<String>) {
        self.running = Some((step, detail.into()));
    }

    /// Finish the running step
    pub fn finish(&mut self, detail: impl Into<String>) {
        self.close(StepOutcome::Done(detail.into()));
    }

    /// Finish the running step with a non-fatal problem
    pub fn warn(&mut self, detail: impl Into<String>) {
        self.close(StepOutcome::Warned(detail.into()));
    }

    fn close(&mut self, outcome: StepOutcome) {
        if let Some((step, _)) = self.running.take() {
            self.finished.push((step, outcome));
        }
    }

    pub fn is_ready(&self) -> bool {
        self.running.is_none() && self.finished.len() == InitStep::ALL.len()
    }

    fn progress(&self) -> f64 {
        self.finished.len().min(InitStep::ALL.len()) as f64 / InitStep::ALL.len() as f64
    }

    fn step_line(&self, step: InitStep) -> Line<'static> {
        let label = format!("{:<15}", step.label());
        let finished = self.finished.iter().find(|(s, _)| *s == step);

        let (marker, marker_style, detail, detail_style) = match (finished, &self.running) {
            (Some((_, StepOutcome::Done(detail))), _) => (
                "✓",
                Style::default().fg(Color::Green),
                detail.as_str(),
                Style::default().fg(Color::DarkGray),
            ),
            (Some((_, StepOutcome::Warned(detail))), _) => (
                "!",
                Style::default().fg(Color::Yellow),
                detail.as_str(),
                Style::default().fg(Color::Yellow),
            ),
            (None, Some((running, detail))) if *running == step => (
                "▸",
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                detail.as_str(),
                Style::default().fg(Color::White),
            ),
            _ => (
                "·",
                Style::default().fg(Color::DarkGray),
                "",
                Style::default(),
            ),
        };

        Line::from(vec![
            Span::styled(format!(" {} ", marker), marker_style),
            Span::styled(label, Style::default().fg(Color::Gray)),
            Span::styled(detail.to_string(), detail_style),
        ])
    }
}

pub fn render(f: &mut Frame, state: &SplashState) {
    let area = f.area();

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Length(17),
            Constraint::Min(0),
        ])
        .split(area);

    let center = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(20),
            Constraint::Percentage(60),
            Constraint::Percentage(20),
        ])
        .split(rows[1])[1];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Terminal UI for ERPNext ",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ))
        .title_alignment(Alignment::Center);
    let inner = block.inner(center);
    f.render_widget(block, center);

    let parts = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6),
            Constraint::Length(1),
            Constraint::Length(InitStep::ALL.len() as u16),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

    let logo_style = Style::default().fg(Color::Cyan);
    let logo: Vec<Line> = [
        "  _                   ",
        " | |_ ___ _ __ _ __   ",
        " | __/ _ \\ '__| '_ \\  ",
        " | ||  __/ |  | |_) | ",
        "  \\__\\___|_|  | .__/  ",
        "               |_|     ",
    ]
    .into_iter()
    .map(|row| Line::from(Span::styled(row, logo_style)))
    .collect();
    f.render_widget(Paragraph::new(logo).alignment(Alignment::Center), parts[0]);

    let steps: Vec<Line> = InitStep::ALL.iter().map(|step| state.step_line(*step)).collect();
    f.render_widget(Paragraph::new(steps), parts[2]);

    let label = if state.is_ready() {
        "Ready".to_string()
    } else {
        format!(
            "{}/{}  (Ctrl+C to abort)",
            state.finished.len(),
            InitStep::ALL.len()
        )
    };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(state.progress())
        .label(Span::styled(label, Style::default().fg(Color::White)));
    f.render_widget(gauge, parts[4]);
}
