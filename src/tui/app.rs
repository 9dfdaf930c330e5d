//! Application state for the TUI.

use std::time::Instant;

use ratatui::layout::Rect;

use crate::graph::{GraphScene, Point, Size};
use crate::models::{AddressDetail, Page, Transaction};

use super::ui;

/// Width of one terminal cell in viewport pixels.
pub const CELL_WIDTH: f64 = 8.0;
/// Height of one terminal cell in viewport pixels.
pub const CELL_HEIGHT: f64 = 16.0;

/// Central application state container.
pub struct App {
    // -- Tab State --
    /// List of available tabs.
    pub tabs: Vec<Tab>,
    /// Index of the currently active tab.
    pub active_tab: usize,

    // -- Address State --
    /// Address the graph and transaction list are centered on.
    pub center: String,
    /// The mounted graph, once the initial fetch has finished.
    pub graph: Loadable<GraphScene>,
    /// Balance and totals for the center address.
    pub detail: Loadable<AddressDetail>,
    /// Current page of the center address's transactions.
    pub transactions: Loadable<Page<Transaction>>,
    /// 1-based transactions page number.
    pub tx_page: u32,
    pub page_size: u32,
    /// First transaction shown in the list.
    pub tx_scroll: usize,

    // -- UI State --
    /// Current input mode.
    pub mode: Mode,
    /// New center address being typed.
    pub input: crate::tui::input::TextInput,
    /// Lines describing the hovered graph node.
    pub tooltip: Option<Vec<String>>,
    /// Error message to display (clears after timeout).
    pub error_message: Option<ErrorDisplay>,
    /// Terminal size in cells.
    pub terminal_size: (u16, u16),

    // -- Internal --
    /// Flag to signal application should quit.
    pub should_quit: bool,
}

impl App {
    /// Creates the state for `center`, with every view loading.
    pub fn new(center: impl Into<String>, page_size: u32, terminal_size: (u16, u16)) -> Self {
        Self {
            tabs: vec![Tab::Graph, Tab::Transactions],
            active_tab: 0,

            center: center.into(),
            graph: Loadable::Loading,
            detail: Loadable::Loading,
            transactions: Loadable::Loading,
            tx_page: 1,
            page_size,
            tx_scroll: 0,

            mode: Mode::Normal,
            input: crate::tui::input::TextInput::new(),
            tooltip: None,
            error_message: None,
            terminal_size,

            should_quit: false,
        }
    }

    /// Returns the currently active tab.
    pub fn current_tab(&self) -> Tab {
        self.tabs[self.active_tab]
    }

    /// Switches to the next tab.
    pub fn next_tab(&mut self) {
        if !self.tabs.is_empty() {
            self.active_tab = (self.active_tab + 1) % self.tabs.len();
        }
    }

    /// Switches to the previous tab.
    pub fn previous_tab(&mut self) {
        if !self.tabs.is_empty() {
            self.active_tab = self
                .active_tab
                .checked_sub(1)
                .unwrap_or(self.tabs.len() - 1);
        }
    }

    /// Drops everything tied to the old center and marks all views as
    /// loading. The graph scene, and with it the expansion state, is
    /// discarded.
    pub fn reset_center(&mut self, center: impl Into<String>) {
        self.center = center.into();
        self.graph = Loadable::Loading;
        self.detail = Loadable::Loading;
        self.transactions = Loadable::Loading;
        self.tx_page = 1;
        self.tx_scroll = 0;
        self.tooltip = None;
    }

    /// Cells occupied by the graph canvas.
    pub fn graph_area(&self) -> Rect {
        let (width, height) = self.terminal_size;
        ui::graph_area(Rect::new(0, 0, width, height))
    }

    /// Graph canvas size in viewport pixels.
    pub fn graph_size(&self) -> Size {
        let area = self.graph_area();
        Size::new(
            f64::from(area.width) * CELL_WIDTH,
            f64::from(area.height) * CELL_HEIGHT,
        )
    }

    /// Maps a terminal cell to the viewport pixel at its center, or `None`
    /// if the cell lies outside the graph canvas.
    pub fn cell_to_point(&self, column: u16, row: u16) -> Option<Point> {
        let area = self.graph_area();
        if column < area.x || row < area.y || column >= area.right() || row >= area.bottom() {
            return None;
        }
        Some(Point::new(
            f64::from(column - area.x) * CELL_WIDTH + CELL_WIDTH / 2.0,
            f64::from(row - area.y) * CELL_HEIGHT + CELL_HEIGHT / 2.0,
        ))
    }

    /// Returns `true` if a later transactions page exists.
    pub fn has_next_page(&self) -> bool {
        match &self.transactions {
            Loadable::Ready(page) => self.tx_page < page.pagination.total_pages,
            _ => false,
        }
    }

    /// Sets an error message to display.
    pub fn show_error(&mut self, message: impl Into<String>) {
        self.error_message = Some(ErrorDisplay {
            message: message.into(),
            timestamp: Instant::now(),
        });
    }

    /// Clears error messages older than 5 seconds.
    pub fn clear_stale_errors(&mut self) {
        if let Some(ref error) = self.error_message
            && error.timestamp.elapsed() > std::time::Duration::from_secs(5)
        {
            self.error_message = None;
        }
    }
}

/// Tab types in the application.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tab {
    /// Fund-flow graph around the center address.
    Graph,
    /// Classified transaction list.
    Transactions,
}

impl Tab {
    /// Returns the display title for the tab.
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Graph => "Graph",
            Tab::Transactions => "Transactions",
        }
    }
}

/// Data fetched from the backend.
#[derive(Debug)]
pub enum Loadable<T> {
    Loading,
    Failed(String),
    Ready(T),
}

impl<T> Loadable<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            Loadable::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn ready_mut(&mut self) -> Option<&mut T> {
        match self {
            Loadable::Ready(value) => Some(value),
            _ => None,
        }
    }
}

impl<T> From<crate::Result<T>> for Loadable<T> {
    fn from(result: crate::Result<T>) -> Self {
        match result {
            Ok(value) => Loadable::Ready(value),
            Err(e) => Loadable::Failed(e.to_string()),
        }
    }
}

/// Input mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Normal,
    Insert,
}

/// Error message with timestamp for auto-clear.
#[derive(Clone, Debug)]
pub struct ErrorDisplay {
    /// The error message.
    pub message: String,
    /// When the error was shown.
    pub timestamp: Instant,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tabs_wrap_around() {
        let mut app = App::new("A", 20, (120, 40));
        assert_eq!(app.current_tab(), Tab::Graph);
        app.next_tab();
        assert_eq!(app.current_tab(), Tab::Transactions);
        app.next_tab();
        assert_eq!(app.current_tab(), Tab::Graph);
        app.previous_tab();
        assert_eq!(app.current_tab(), Tab::Transactions);
    }

    #[test]
    fn cells_map_to_pixel_centers_inside_the_canvas() {
        let app = App::new("A", 20, (120, 40));
        let area = app.graph_area();
        let p = app.cell_to_point(area.x, area.y).unwrap();
        assert_eq!(p, Point::new(4.0, 8.0));
        assert!(app.cell_to_point(area.right(), area.y).is_none());
        assert!(app.cell_to_point(0, 0).is_none());
    }

    #[test]
    fn reset_center_clears_views() {
        let mut app = App::new("A", 20, (120, 40));
        app.tx_page = 3;
        app.graph = Loadable::Failed("boom".to_string());
        app.tooltip = Some(vec!["x".to_string()]);
        app.reset_center("B");
        assert_eq!(app.center, "B");
        assert_eq!(app.tx_page, 1);
        assert!(matches!(app.graph, Loadable::Loading));
        assert!(app.tooltip.is_none());
    }
}
