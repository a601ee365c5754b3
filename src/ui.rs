pub mod charting;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Bar, BarChart, BarGroup, Paragraph, Widget, Wrap},
};

use crate::util::format_clock;
use crate::{App, AppState};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.state {
            AppState::Setup => render_setup(self, area, buf),
            AppState::Running => render_running(self, area, buf),
            AppState::Report => render_report(self, area, buf),
        }
    }
}

fn render_setup(app: &App, area: Rect, buf: &mut Buffer) {
    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_style = Style::default().add_modifier(Modifier::DIM);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(6),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .split(area);

    let form = Paragraph::new(vec![
        Line::from(Span::styled("open field test", bold_style)),
        Line::from(""),
        Line::from(vec![
            Span::styled("Subject ID: ", dim_style),
            Span::styled(format!("{}_", app.subject_input), bold_style),
        ]),
        Line::from(vec![
            Span::styled("Duration: ", dim_style),
            Span::styled(format!("{} seconds", app.duration_input), bold_style),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "type to edit the subject id, Up/Down adjusts duration, Enter starts",
            italic_style,
        )),
    ])
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    form.render(chunks[1], buf);

    if let Some(status) = &app.status {
        let status = Paragraph::new(Span::styled(
            status.clone(),
            Style::default().patch(bold_style).fg(Color::Red),
        ))
        .alignment(Alignment::Center);
        status.render(chunks[2], buf);
    }
}

fn render_running(app: &App, area: Rect, buf: &mut Buffer) {
    let snapshot = app.trial.snapshot();

    let bold_style = Style::default().add_modifier(Modifier::BOLD);
    let dim_bold_style = Style::default()
        .patch(bold_style)
        .add_modifier(Modifier::DIM);
    let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
    let italic_style = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(2),
            Constraint::Min(1),
        ])
        .split(area);

    let subject = Paragraph::new(Span::styled(
        app.trial.subject_id().to_string(),
        dim_bold_style,
    ))
    .alignment(Alignment::Center);
    subject.render(chunks[1], buf);

    let timer = Paragraph::new(Span::styled(
        format!("Remaining {}", format_clock(snapshot.remaining_secs)),
        bold_style,
    ))
    .alignment(Alignment::Center);
    timer.render(chunks[2], buf);

    let rows: Vec<Line> = snapshot
        .regions
        .iter()
        .map(|r| {
            let (marker, style) = if r.is_pressed {
                ("● ", green_bold_style)
            } else {
                ("  ", dim_bold_style)
            };
            Line::from(Span::styled(
                format!("{}{:<8} {:>8.2} s", marker, r.region.label(), r.accumulated_secs),
                style,
            ))
        })
        .collect();
    let regions = Paragraph::new(rows).alignment(Alignment::Center);
    regions.render(chunks[3], buf);

    let legend = Paragraph::new(Span::styled(
        "(1) corner   (2) lateral   (3) center   (space) release   (s)top",
        italic_style,
    ))
    .alignment(Alignment::Center);
    legend.render(chunks[4], buf);
}

fn render_report(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(report) = &app.report else {
        return;
    };

    let dim_italic_style = Style::default()
        .add_modifier(Modifier::DIM)
        .add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Length(11),
            Constraint::Min(4),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let text = Paragraph::new(report.to_text()).wrap(Wrap { trim: false });
    text.render(chunks[0], buf);

    match charting::chart_bars(report) {
        Ok(entries) => {
            let bars: Vec<Bar> = entries
                .iter()
                .map(|(label, value, value_text)| {
                    Bar::default()
                        .label(Line::from(*label))
                        .value(*value)
                        .text_value(value_text.clone())
                })
                .collect();
            let chart = BarChart::default()
                .direction(Direction::Horizontal)
                .bar_width(1)
                .bar_gap(1)
                .bar_style(Style::default().fg(Color::Magenta))
                .value_style(Style::default().fg(Color::Black).bg(Color::Magenta))
                .data(BarGroup::default().bars(&bars));
            chart.render(chunks[1], buf);
        }
        Err(_) => {
            let placeholder = Paragraph::new(Span::styled(
                "No region time recorded to chart.",
                dim_italic_style,
            ))
            .alignment(Alignment::Center);
            placeholder.render(chunks[1], buf);
        }
    }

    let legend = Paragraph::new(Span::styled(
        "(e)xport   (r)estart   (q)uit",
        dim_italic_style,
    ))
    .alignment(Alignment::Center);
    legend.render(chunks[2], buf);

    if let Some(status) = &app.status {
        let status = Paragraph::new(Span::styled(
            status.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::ITALIC),
        ))
        .alignment(Alignment::Center);
        status.render(chunks[3], buf);
    }
}
