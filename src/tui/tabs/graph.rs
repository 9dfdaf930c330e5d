//! Graph tab: the fund-flow graph drawn on a braille canvas.
//!
//! The canvas is sized in viewport pixels (one cell is
//! [`CELL_WIDTH`]×[`CELL_HEIGHT`]), so everything the scene computes in
//! viewport space can be drawn directly. Canvas `y` grows upward, viewport
//! `y` grows downward; [`flip`] converts.

use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Block, Borders, Paragraph, Wrap,
        canvas::{Canvas, Context, Line as CanvasLine, Rectangle},
    },
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::graph::{GraphScene, NodeKind, Point, Rect as GraphRect};
use crate::tui::app::{App, CELL_HEIGHT, CELL_WIDTH, Loadable};

/// Renders the graph panel.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    match &app.graph {
        Loadable::Loading => render_message(
            frame,
            area,
            format!("Loading graph for {} ...", app.center),
            Color::DarkGray,
        ),
        Loadable::Failed(message) => render_message(
            frame,
            area,
            format!("Could not load graph for {}:\n{message}", app.center),
            Color::Red,
        ),
        Loadable::Ready(scene) => render_scene(frame, area, scene, app.tooltip.as_deref()),
    }
}

fn render_message(frame: &mut Frame, area: Rect, text: String, color: Color) {
    let block = Block::default()
        .title(" Graph ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color));
    let para = Paragraph::new(text)
        .style(Style::default().fg(color))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(block);
    frame.render_widget(para, area);
}

fn render_scene(frame: &mut Frame, area: Rect, scene: &GraphScene, tooltip: Option<&[String]>) {
    let graph = scene.graph();
    let mut title = format!(
        " Graph  {} nodes  {} edges  {:.0}% ",
        graph.node_count(),
        graph.edge_count(),
        scene.viewport().zoom() * 100.0
    );
    if scene.in_flight_count() > 0 {
        title.push_str(&format!(" expanding {} ", scene.in_flight_count()));
    }

    let mut block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    if let Some(lines) = tooltip {
        block = block.title_bottom(Line::from(Span::styled(
            format!(" {} ", lines.join("  ")),
            Style::default().fg(Color::Yellow),
        )));
    }

    let size = scene.viewport().size();
    let canvas = Canvas::default()
        .block(block)
        .marker(Marker::Braille)
        .x_bounds([0.0, size.width])
        .y_bounds([0.0, size.height])
        .paint(|ctx| paint(ctx, scene));
    frame.render_widget(canvas, area);
}

fn paint(ctx: &mut Context<'_>, scene: &GraphScene) {
    let graph = scene.graph();
    let layout = scene.layout();
    let viewport = scene.viewport();
    let height = viewport.size().height;
    let on_screen = |r: GraphRect| viewport.rect_to_viewport(r);

    for combo in graph.combos() {
        let Some(rect) = layout.combo_rect(&combo.id).map(on_screen) else {
            continue;
        };
        draw_rect(ctx, rect, height, Color::DarkGray);
        let corner = flip(Point::new(rect.x + CELL_WIDTH, rect.y + CELL_HEIGHT / 2.0), height);
        let label = fit_label(&combo.label, rect.width);
        ctx.print(
            corner.x,
            corner.y,
            Span::styled(label, Style::default().fg(Color::DarkGray)),
        );
    }

    for edge in graph.edges() {
        let (Some(source), Some(target)) = (
            layout.node_rect(&edge.source).map(on_screen),
            layout.node_rect(&edge.target).map(on_screen),
        ) else {
            continue;
        };
        let from = flip(Point::new(source.center().x, source.bottom()), height);
        let to = flip(Point::new(target.center().x, target.y), height);
        ctx.draw(&CanvasLine {
            x1: from.x,
            y1: from.y,
            x2: to.x,
            y2: to.y,
            color: Color::Gray,
        });
        if let Some(label) = edge.label() {
            let mid = Point::new((from.x + to.x) / 2.0, (from.y + to.y) / 2.0);
            ctx.print(
                mid.x + CELL_WIDTH,
                mid.y,
                Span::styled(label, Style::default().fg(Color::DarkGray)),
            );
        }
    }

    // Node boxes and labels go on a layer above edges and combos.
    ctx.layer();
    for node in graph.nodes() {
        let Some(rect) = layout.node_rect(&node.id).map(on_screen) else {
            continue;
        };
        let color = if node.highlighted {
            Color::Blue
        } else {
            match node.kind {
                NodeKind::Center => Color::Cyan,
                NodeKind::Input => Color::Green,
                NodeKind::Output => Color::Yellow,
                NodeKind::Anchor => Color::DarkGray,
            }
        };
        draw_rect(ctx, rect, height, color);

        if node.label.is_empty() {
            continue;
        }
        let label = fit_label(&node.label, rect.width);
        let text_width = label.width() as f64 * CELL_WIDTH;
        let c = flip(rect.center(), height);
        let mut style = Style::default().fg(color);
        if node.kind == NodeKind::Center {
            style = style.add_modifier(Modifier::BOLD);
        }
        ctx.print(c.x - text_width / 2.0, c.y, Span::styled(label, style));
    }
}

/// Draws a viewport-space rectangle.
fn draw_rect(ctx: &mut Context<'_>, rect: GraphRect, height: f64, color: Color) {
    ctx.draw(&Rectangle {
        x: rect.x,
        y: height - rect.bottom(),
        width: rect.width,
        height: rect.height,
        color,
    });
}

/// Converts a viewport point to canvas coordinates.
fn flip(p: Point, height: f64) -> Point {
    Point::new(p.x, height - p.y)
}

/// Shortens `label` so it fits in `width` viewport pixels, counting
/// terminal columns rather than characters.
fn fit_label(label: &str, width: f64) -> String {
    let columns = (width / CELL_WIDTH).floor() as usize;
    if label.width() <= columns.saturating_sub(2) {
        return label.to_string();
    }
    let keep = columns.saturating_sub(5) / 2;
    if keep == 0 {
        return String::new();
    }
    let head = take_columns(label.chars(), keep);
    let mut tail: Vec<char> = take_columns(label.chars().rev(), keep).chars().collect();
    tail.reverse();
    format!("{head}...{}", tail.into_iter().collect::<String>())
}

/// Collects characters until the next one would exceed `columns`.
fn take_columns(chars: impl Iterator<Item = char>, columns: usize) -> String {
    let mut used = 0;
    chars
        .take_while(|c| {
            used += c.width().unwrap_or(0);
            used <= columns
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_shrink_with_the_box() {
        let label = "bc1qxy2kgdyg...83kkfjhx0wlh";
        assert_eq!(fit_label(label, 240.0), label);
        assert_eq!(fit_label(label, 120.0), "bc1qx...x0wlh");
        assert_eq!(fit_label(label, 40.0), "");
    }

    #[test]
    fn wide_labels_are_cut_by_display_width() {
        let label = "交易所热钱包地址";
        let fitted = fit_label(label, 120.0);
        assert_eq!(fitted, "交易...地址");
        assert!(fitted.width() <= 13);
    }

    #[test]
    fn flip_inverts_y() {
        assert_eq!(flip(Point::new(3.0, 10.0), 100.0), Point::new(3.0, 90.0));
    }
}
