//! Event handling for the TUI.

use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton,
    MouseEvent, MouseEventKind,
};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::graph::{ExpansionOutcome, ExpansionTicket, GraphScene, Point, truncate_middle};
use crate::models::{AddressDetail, Page, Transaction};
use crate::session::GraphEvent;

use super::app::{App, Loadable, Mode, Tab};

/// Viewport pixels moved by one pan key press.
const PAN_STEP: f64 = 40.0;
/// Zoom factor applied by one `+` key press.
const KEY_ZOOM_STEP: f64 = 1.25;
/// Zoom factor applied by one scroll wheel notch.
const WHEEL_ZOOM_STEP: f64 = 1.1;

/// Events that can occur in the application.
#[derive(Debug)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// The mouse moved, clicked or scrolled.
    Mouse(MouseEvent),
    /// Terminal was resized.
    Resize(u16, u16),
    /// Periodic tick for UI updates.
    Tick,
}

/// Messages that update application state.
#[derive(Debug)]
pub enum Message {
    /// Input event from terminal.
    Input(Event),

    /// Initial load or expansion finished.
    Graph(GraphEvent),
    /// A transactions page arrived.
    TransactionsLoaded {
        address: String,
        page: u32,
        result: crate::Result<Page<Transaction>>,
    },
    /// Address totals arrived.
    DetailLoaded {
        address: String,
        result: crate::Result<AddressDetail>,
    },

    /// Request to quit the application.
    Quit,
}

impl From<GraphEvent> for Message {
    fn from(event: GraphEvent) -> Self {
        Message::Graph(event)
    }
}

/// Actions that require external handling (network fetches).
#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    /// Fetch one more hop for a clicked node.
    Expand(ExpansionTicket),
    /// Re-initialize every view around a new center address.
    LoadCenter(String),
    /// Fetch one page of the center's transactions.
    LoadTransactions { address: String, page: u32 },
}

/// Spawns a task that polls for terminal events and sends them to a channel.
pub fn spawn_event_reader(tx: mpsc::UnboundedSender<Message>) {
    tokio::spawn(async move {
        loop {
            // Poll for events with a 50ms timeout
            let polled = tokio::task::spawn_blocking(|| {
                if event::poll(Duration::from_millis(50)).unwrap_or(false) {
                    event::read().ok()
                } else {
                    None
                }
            })
            .await;

            let event = match polled {
                Ok(Some(CrosstermEvent::Key(key))) => Event::Key(key),
                Ok(Some(CrosstermEvent::Mouse(mouse))) => Event::Mouse(mouse),
                Ok(Some(CrosstermEvent::Resize(w, h))) => Event::Resize(w, h),
                Ok(_) => continue,
                Err(_) => break,
            };
            if tx.send(Message::Input(event)).is_err() {
                break;
            }
        }
    });
}

/// Spawns a task that sends periodic tick events.
pub fn spawn_tick_timer(tx: mpsc::UnboundedSender<Message>, interval_ms: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_millis(interval_ms));
        loop {
            interval.tick().await;
            if tx.send(Message::Input(Event::Tick)).is_err() {
                break;
            }
        }
    });
}

/// Updates application state based on a message.
///
/// Graph events must already have been checked against the session
/// generation; this function only guards against results for a center the
/// user has since navigated away from.
pub fn update(app: &mut App, message: Message) -> Option<Action> {
    match message {
        Message::Input(event) => handle_input(app, event),
        Message::Graph(event) => {
            handle_graph_event(app, event);
            None
        }
        Message::TransactionsLoaded {
            address,
            page,
            result,
        } => {
            if address == app.center && page == app.tx_page {
                app.transactions = result.into();
                app.tx_scroll = 0;
            }
            None
        }
        Message::DetailLoaded { address, result } => {
            if address == app.center {
                app.detail = result.into();
            }
            None
        }
        Message::Quit => {
            app.should_quit = true;
            None
        }
    }
}

fn handle_graph_event(app: &mut App, event: GraphEvent) {
    match event {
        GraphEvent::Loaded { center, result, .. } => {
            if center != app.center {
                return;
            }
            let size = app.graph_size();
            app.graph = match result {
                Ok(response) => {
                    let scene = GraphScene::new(&response, size);
                    info!(
                        center = %center,
                        nodes = scene.graph().node_count(),
                        edges = scene.graph().edge_count(),
                        "graph mounted"
                    );
                    Loadable::Ready(scene)
                }
                Err(e) => {
                    warn!(center = %center, error = %e, "graph load failed");
                    Loadable::Failed(e.to_string())
                }
            };
        }
        GraphEvent::Expanded { ticket, result, .. } => {
            let Some(scene) = app.graph.ready_mut() else {
                return;
            };
            let outcome = scene.apply_expansion(&ticket, result);
            app.tooltip = scene.hover_tooltip();
            if let ExpansionOutcome::Failed(reason) = outcome {
                app.show_error(format!(
                    "expand {} failed: {reason}",
                    truncate_middle(&ticket.address, 8)
                ));
            }
        }
    }
}

/// Handles input events and updates application state.
fn handle_input(app: &mut App, event: Event) -> Option<Action> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
        Event::Key(_) => None,
        Event::Mouse(mouse) => handle_mouse(app, mouse),
        Event::Resize(w, h) => {
            app.terminal_size = (w, h);
            let size = app.graph_size();
            if let Some(scene) = app.graph.ready_mut() {
                scene.resize(size);
            }
            None
        }
        Event::Tick => {
            app.clear_stale_errors();
            None
        }
    }
}

/// Handles mouse events over the graph canvas.
fn handle_mouse(app: &mut App, mouse: MouseEvent) -> Option<Action> {
    if app.current_tab() != Tab::Graph || app.mode != Mode::Normal {
        return None;
    }
    let point = app.cell_to_point(mouse.column, mouse.row);
    let scene = app.graph.ready_mut()?;
    let now = Instant::now();

    let Some(point) = point else {
        if matches!(mouse.kind, MouseEventKind::Moved) {
            app.tooltip = None;
        }
        return None;
    };

    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => scene.click(point, now).map(Action::Expand),
        MouseEventKind::Moved => {
            scene.hover(point, now);
            app.tooltip = scene.hover_tooltip();
            None
        }
        MouseEventKind::ScrollUp => {
            scene.zoom(WHEEL_ZOOM_STEP, point);
            None
        }
        MouseEventKind::ScrollDown => {
            scene.zoom(1.0 / WHEEL_ZOOM_STEP, point);
            None
        }
        _ => None,
    }
}

/// Handles key press events.
fn handle_key(app: &mut App, key: KeyEvent) -> Option<Action> {
    // Global keys (work in any mode)
    match key.code {
        KeyCode::Char('q') if key.modifiers.is_empty() && app.mode == Mode::Normal => {
            app.should_quit = true;
            return None;
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.should_quit = true;
            return None;
        }
        KeyCode::Esc => {
            app.mode = Mode::Normal;
            app.input.clear();
            app.error_message = None;
            return None;
        }
        _ => {}
    }

    // Mode-specific handling
    match app.mode {
        Mode::Normal => handle_normal_mode(app, key),
        Mode::Insert => handle_insert_mode(app, key),
    }
}

/// Handles keys in normal mode.
fn handle_normal_mode(app: &mut App, key: KeyEvent) -> Option<Action> {
    match key.code {
        // Tab navigation
        KeyCode::Tab => {
            if key.modifiers.contains(KeyModifiers::SHIFT) {
                app.previous_tab();
            } else {
                app.next_tab();
            }
            None
        }
        KeyCode::BackTab => {
            app.previous_tab();
            None
        }

        // New center address
        KeyCode::Char('/') => {
            app.input.clear();
            app.mode = Mode::Insert;
            None
        }

        _ => match app.current_tab() {
            Tab::Graph => handle_graph_tab_keys(app, key),
            Tab::Transactions => handle_transactions_tab_keys(app, key),
        },
    }
}

/// Handles keys for the Graph tab.
fn handle_graph_tab_keys(app: &mut App, key: KeyEvent) -> Option<Action> {
    let scene = app.graph.ready_mut()?;
    let size = scene.viewport().size();
    let middle = Point::new(size.width / 2.0, size.height / 2.0);

    match key.code {
        // Moving the view left shifts the content right.
        KeyCode::Char('h') | KeyCode::Left => scene.pan(PAN_STEP, 0.0),
        KeyCode::Char('l') | KeyCode::Right => scene.pan(-PAN_STEP, 0.0),
        KeyCode::Char('k') | KeyCode::Up => scene.pan(0.0, PAN_STEP),
        KeyCode::Char('j') | KeyCode::Down => scene.pan(0.0, -PAN_STEP),

        KeyCode::Char('+') | KeyCode::Char('=') => scene.zoom(KEY_ZOOM_STEP, middle),
        KeyCode::Char('-') => scene.zoom(1.0 / KEY_ZOOM_STEP, middle),

        // Auto layout
        KeyCode::Char('r') => {
            scene.relayout();
            scene.fit();
        }
        _ => {}
    }
    None
}

/// Handles keys for the Transactions tab.
fn handle_transactions_tab_keys(app: &mut App, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Char('n') if app.has_next_page() => {
            app.tx_page += 1;
            app.transactions = Loadable::Loading;
            Some(Action::LoadTransactions {
                address: app.center.clone(),
                page: app.tx_page,
            })
        }
        KeyCode::Char('p') if app.tx_page > 1 && !matches!(app.transactions, Loadable::Loading) => {
            app.tx_page -= 1;
            app.transactions = Loadable::Loading;
            Some(Action::LoadTransactions {
                address: app.center.clone(),
                page: app.tx_page,
            })
        }
        KeyCode::Char('j') | KeyCode::Down => {
            let len = app.transactions.ready().map_or(0, |page| page.list.len());
            if app.tx_scroll + 1 < len {
                app.tx_scroll += 1;
            }
            None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.tx_scroll = app.tx_scroll.saturating_sub(1);
            None
        }
        _ => None,
    }
}

/// Handles keys in insert mode (text input).
fn handle_insert_mode(app: &mut App, key: KeyEvent) -> Option<Action> {
    match key.code {
        KeyCode::Enter => {
            let address = app.input.take().trim().to_string();
            app.mode = Mode::Normal;
            if address.is_empty() {
                return None;
            }
            app.reset_center(address.clone());
            Some(Action::LoadCenter(address))
        }
        KeyCode::Char(c) => {
            app.input.insert(c);
            None
        }
        KeyCode::Backspace => {
            app.input.backspace();
            None
        }
        KeyCode::Delete => {
            app.input.delete();
            None
        }
        KeyCode::Left => {
            app.input.move_left();
            None
        }
        KeyCode::Right => {
            app.input.move_right();
            None
        }
        KeyCode::Home => {
            app.input.move_home();
            None
        }
        KeyCode::End => {
            app.input.move_end();
            None
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    use crate::FlowscopeError;
    use crate::models::GraphResponse;

    fn key(code: KeyCode) -> Message {
        Message::Input(Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }))
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Message {
        Message::Input(Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }))
    }

    fn response(center: &str) -> GraphResponse {
        serde_json::from_value(serde_json::json!({
            "center": center,
            "incoming": [],
            "outgoing": [{"address": "B", "txid": "t1", "amount": 5000}]
        }))
        .unwrap()
    }

    fn loaded_app() -> App {
        let mut app = App::new("A", 20, (160, 50));
        update(
            &mut app,
            Message::Graph(GraphEvent::Loaded {
                generation: 1,
                center: "A".to_string(),
                result: Ok(response("A")),
            }),
        );
        app
    }

    /// Terminal cell covering the center of `node_id`.
    fn cell_of(app: &App, node_id: &str) -> (u16, u16) {
        let scene = app.graph.ready().unwrap();
        let p = scene.overlay().region(node_id).unwrap().rect.center();
        let area = app.graph_area();
        (
            area.x + (p.x / crate::tui::app::CELL_WIDTH) as u16,
            area.y + (p.y / crate::tui::app::CELL_HEIGHT) as u16,
        )
    }

    #[test]
    fn load_mounts_scene() {
        let app = loaded_app();
        let scene = app.graph.ready().unwrap();
        assert_eq!(scene.graph().node_count(), 2);
    }

    #[test]
    fn load_for_previous_center_is_ignored() {
        let mut app = App::new("B", 20, (160, 50));
        update(
            &mut app,
            Message::Graph(GraphEvent::Loaded {
                generation: 1,
                center: "A".to_string(),
                result: Ok(response("A")),
            }),
        );
        assert!(matches!(app.graph, Loadable::Loading));
    }

    #[test]
    fn failed_load_shows_error_panel() {
        let mut app = App::new("A", 20, (160, 50));
        update(
            &mut app,
            Message::Graph(GraphEvent::Loaded {
                generation: 1,
                center: "A".to_string(),
                result: Err(FlowscopeError::Api("404 Not Found".to_string())),
            }),
        );
        assert!(matches!(app.graph, Loadable::Failed(ref m) if m.contains("404")));
    }

    #[test]
    fn click_on_node_requests_expansion_once() {
        let mut app = loaded_app();
        let (column, row) = cell_of(&app, "out-t1-B-0");

        let action = update(
            &mut app,
            mouse(MouseEventKind::Down(MouseButton::Left), column, row),
        );
        let Some(Action::Expand(ticket)) = action else {
            panic!("expected expansion, got {action:?}");
        };
        assert_eq!(ticket.address, "B");

        let again = update(
            &mut app,
            mouse(MouseEventKind::Down(MouseButton::Left), column, row),
        );
        assert!(again.is_none());
    }

    #[test]
    fn failed_expansion_sets_status_error() {
        let mut app = loaded_app();
        let (column, row) = cell_of(&app, "out-t1-B-0");
        let Some(Action::Expand(ticket)) = update(
            &mut app,
            mouse(MouseEventKind::Down(MouseButton::Left), column, row),
        ) else {
            panic!("expected expansion");
        };

        update(
            &mut app,
            Message::Graph(GraphEvent::Expanded {
                generation: 1,
                ticket,
                result: Err(FlowscopeError::Timeout("slow".to_string())),
            }),
        );
        assert!(app.error_message.is_some());
        assert_eq!(app.graph.ready().unwrap().graph().node_count(), 2);
    }

    #[test]
    fn hover_sets_tooltip() {
        let mut app = loaded_app();
        let (column, row) = cell_of(&app, "out-t1-B-0");
        update(&mut app, mouse(MouseEventKind::Moved, column, row));
        let tooltip = app.tooltip.clone().unwrap();
        assert!(tooltip.iter().any(|line| line.contains('B')));

        update(&mut app, mouse(MouseEventKind::Moved, 0, 0));
        assert!(app.tooltip.is_none());
    }

    #[test]
    fn entering_address_reloads_center() {
        let mut app = loaded_app();
        update(&mut app, key(KeyCode::Char('/')));
        assert_eq!(app.mode, Mode::Insert);
        for c in "Z9".chars() {
            update(&mut app, key(KeyCode::Char(c)));
        }
        let action = update(&mut app, key(KeyCode::Enter));
        assert_eq!(action, Some(Action::LoadCenter("Z9".to_string())));
        assert_eq!(app.center, "Z9");
        assert!(matches!(app.graph, Loadable::Loading));
        assert_eq!(app.mode, Mode::Normal);
    }

    #[test]
    fn q_quits_only_in_normal_mode() {
        let mut app = App::new("A", 20, (160, 50));
        update(&mut app, key(KeyCode::Char('/')));
        update(&mut app, key(KeyCode::Char('q')));
        assert!(!app.should_quit);
        assert_eq!(app.input.as_str(), "q");
        update(&mut app, key(KeyCode::Esc));
        update(&mut app, key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn paging_waits_for_current_page() {
        let mut app = App::new("A", 2, (160, 50));
        app.next_tab();
        assert!(update(&mut app, key(KeyCode::Char('n'))).is_none());

        let page: Page<Transaction> = serde_json::from_value(serde_json::json!({
            "list": [],
            "pagination": {"total": 5, "totalPages": 3, "currentPage": 1}
        }))
        .unwrap();
        update(
            &mut app,
            Message::TransactionsLoaded {
                address: "A".to_string(),
                page: 1,
                result: Ok(page),
            },
        );
        let action = update(&mut app, key(KeyCode::Char('n')));
        assert_eq!(
            action,
            Some(Action::LoadTransactions {
                address: "A".to_string(),
                page: 2
            })
        );
        assert!(matches!(app.transactions, Loadable::Loading));
    }

    #[test]
    fn zoom_keys_change_scale() {
        let mut app = loaded_app();
        let before = app.graph.ready().unwrap().viewport().zoom();
        update(&mut app, key(KeyCode::Char('+')));
        let after = app.graph.ready().unwrap().viewport().zoom();
        assert!(after > before);
        update(&mut app, key(KeyCode::Char('r')));
        let refit = app.graph.ready().unwrap().viewport().zoom();
        assert!((refit - before).abs() < 1e-9);
    }
}
