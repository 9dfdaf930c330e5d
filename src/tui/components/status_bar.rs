//! Status bar component.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::tui::app::{App, Loadable, Mode};

/// Renders the status bar.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let mode_span = match app.mode {
        Mode::Normal => Span::styled(" NORMAL ", Style::default().fg(Color::Black).bg(Color::Cyan)),
        Mode::Insert => Span::styled(
            " INSERT ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        ),
    };

    let (graph_label, graph_color) = match &app.graph {
        Loadable::Loading => (" Loading ".to_string(), Color::Yellow),
        Loadable::Failed(_) => (" Graph unavailable ".to_string(), Color::Red),
        Loadable::Ready(scene) if scene.in_flight_count() > 0 => (
            format!(" Expanding {} ", scene.in_flight_count()),
            Color::Yellow,
        ),
        Loadable::Ready(_) => (" Ready ".to_string(), Color::Green),
    };

    let error_span = if let Some(ref error) = app.error_message {
        Span::styled(
            format!(" {} ", error.message),
            Style::default().fg(Color::Red),
        )
    } else {
        Span::raw("")
    };

    let tab_info = format!(" {}/{} ", app.active_tab + 1, app.tabs.len());
    let used = mode_span.width() + graph_label.len() + error_span.width() + 2;

    let line = Line::from(vec![
        mode_span,
        Span::styled(graph_label, Style::default().fg(graph_color)),
        Span::raw("│"),
        error_span,
        Span::raw(format!(
            "{:>width$}",
            tab_info,
            width = (area.width as usize).saturating_sub(used)
        )),
    ]);

    let para = Paragraph::new(line).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(para, area);
}
