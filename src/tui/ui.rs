//! Main UI rendering coordinator.

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::amount::format_amount;

use super::app::{App, Loadable, Mode, Tab};
use super::components::{status_bar, tab_bar};
use super::tabs::{graph, transactions};

/// Screen regions shared by every tab.
#[derive(Clone, Copy, Debug)]
pub struct Areas {
    pub tab_bar: Rect,
    pub header: Rect,
    pub content: Rect,
    pub help: Rect,
    pub status: Rect,
}

/// Splits the terminal into the regions every tab uses.
pub fn areas(area: Rect) -> Areas {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Tab bar
            Constraint::Length(3), // Address header / input
            Constraint::Min(3),    // Tab content
            Constraint::Length(1), // Keybindings
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    Areas {
        tab_bar: chunks[0],
        header: chunks[1],
        content: chunks[2],
        help: chunks[3],
        status: chunks[4],
    }
}

/// Cells inside the graph panel's border.
pub fn graph_area(area: Rect) -> Rect {
    areas(area).content.inner(Margin {
        horizontal: 1,
        vertical: 1,
    })
}

/// Renders the entire application UI.
pub fn render(frame: &mut Frame, app: &App) {
    let areas = areas(frame.area());

    tab_bar::render(frame, areas.tab_bar, app);
    render_header(frame, areas.header, app);
    match app.current_tab() {
        Tab::Graph => graph::render(frame, areas.content, app),
        Tab::Transactions => transactions::render(frame, areas.content, app),
    }
    render_keybindings(frame, areas.help, app);
    status_bar::render(frame, areas.status, app);
}

/// Renders the center address summary, or the address input in insert mode.
fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    if app.mode == Mode::Insert {
        let block = Block::default()
            .title(" New center address ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));
        let inner = block.inner(area);
        frame.render_widget(Paragraph::new(app.input.as_str()).block(block), area);
        frame.set_cursor_position((inner.x + app.input.cursor_column(), inner.y));
        return;
    }

    let mut spans = vec![Span::styled(
        app.center.as_str(),
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];
    match &app.detail {
        Loadable::Ready(detail) => {
            let label = Style::default().fg(Color::DarkGray);
            spans.push(Span::styled("  balance ", label));
            spans.push(Span::raw(format_amount(detail.balance)));
            spans.push(Span::styled("  received ", label));
            spans.push(Span::styled(
                format_amount(detail.received),
                Style::default().fg(Color::Green),
            ));
            spans.push(Span::styled("  sent ", label));
            spans.push(Span::styled(
                format_amount(detail.sent),
                Style::default().fg(Color::Red),
            ));
            spans.push(Span::styled("  txs ", label));
            spans.push(Span::raw(detail.transaction_count.to_string()));
            if let Some(tag) = detail.address_tags.first() {
                spans.push(Span::styled(
                    format!("  [{}]", tag.name),
                    Style::default().fg(Color::Magenta),
                ));
            }
        }
        Loadable::Loading => spans.push(Span::styled(
            "  loading...",
            Style::default().fg(Color::DarkGray),
        )),
        Loadable::Failed(message) => spans.push(Span::styled(
            format!("  {message}"),
            Style::default().fg(Color::Red),
        )),
    }

    let block = Block::default().title(" Address ").borders(Borders::ALL);
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

/// Renders the keybindings help line.
fn render_keybindings(frame: &mut Frame, area: Rect, app: &App) {
    let text = match (app.mode, app.current_tab()) {
        (Mode::Insert, _) => "[Enter] Load  [Esc] Cancel",
        (Mode::Normal, Tab::Graph) => {
            "[Click] Expand  [hjkl] Pan  [+/-] Zoom  [r] Auto layout  [/] Address  [Tab] Switch  [q] Quit"
        }
        (Mode::Normal, Tab::Transactions) => {
            "[n/p] Page  [j/k] Scroll  [/] Address  [Tab] Switch  [q] Quit"
        }
    };
    let help = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, area);
}
