//! flowscope: browse an address's fund flows from the terminal.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::{Arc, Mutex};

use clap::Parser;
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use flowscope::api::ExplorerClient;
use flowscope::config::{AppConfig, fetch_config};
use flowscope::session::GraphSession;
use flowscope::tui::event::{spawn_event_reader, spawn_tick_timer, update};
use flowscope::tui::{Action, App, Message, Tui, render, restore_terminal, setup_terminal};
use flowscope::{FlowscopeError, Result};

/// Interactive fund-flow graph and transaction list for one address.
#[derive(Parser, Debug)]
#[command(name = "flowscope")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Address to center the graph on
    address: String,
}

const TICK_INTERVAL_MS: u64 = 250;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = fetch_config()?;
    setup_tracing(&config.log_file)?;

    let client = Arc::new(ExplorerClient::new(&config.api)?);
    info!(base_url = client.base_url(), address = %cli.address, "starting");

    let mut terminal = setup_terminal()?;
    let result = run(&mut terminal, client, &config, cli.address).await;
    let restored = restore_terminal(&mut terminal);

    if let Err(ref e) = result {
        error!(error = %e, "exiting with error");
    }
    result.and(restored)
}

/// Sends logs to `path`, since the terminal itself is taken by the UI.
fn setup_tracing(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| FlowscopeError::Io(format!("cannot open log file {}: {e}", path.display())))?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("flowscope=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init()
        .map_err(|e| FlowscopeError::Config(format!("failed to set up logging: {e}")))
}

/// Fetches that are not part of the graph session.
struct Fetcher {
    client: Arc<ExplorerClient>,
    tx: mpsc::UnboundedSender<Message>,
    page_size: u32,
}

impl Fetcher {
    fn transactions(&self, address: String, page: u32) {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        let page_size = self.page_size;
        tokio::spawn(async move {
            let result = client.address_transactions(&address, page_size, page).await;
            let _ = tx.send(Message::TransactionsLoaded {
                address,
                page,
                result,
            });
        });
    }

    fn detail(&self, address: String) {
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = client.address_detail(&address).await;
            let _ = tx.send(Message::DetailLoaded { address, result });
        });
    }
}

async fn run(
    terminal: &mut Tui,
    client: Arc<ExplorerClient>,
    config: &AppConfig,
    address: String,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Message>();
    spawn_event_reader(tx.clone());
    spawn_tick_timer(tx.clone(), TICK_INTERVAL_MS);

    let size = terminal
        .size()
        .map_err(|e| FlowscopeError::Io(format!("failed to read terminal size: {e}")))?;
    let mut app = App::new(address.clone(), config.api.page_size, (size.width, size.height));
    let mut session = GraphSession::new(Arc::clone(&client), tx.clone(), config.api.timeout);
    let fetcher = Fetcher {
        client,
        tx,
        page_size: config.api.page_size,
    };

    dispatch(Action::LoadCenter(address), &mut session, &fetcher);

    while !app.should_quit {
        terminal
            .draw(|frame| render(frame, &app))
            .map_err(|e| FlowscopeError::Io(format!("failed to draw: {e}")))?;

        let Some(message) = rx.recv().await else {
            break;
        };
        if let Message::Graph(event) = &message
            && !session.accepts(event)
        {
            debug!(generation = event.generation(), "stale graph event dropped");
            continue;
        }
        if let Some(action) = update(&mut app, message) {
            dispatch(action, &mut session, &fetcher);
        }
    }

    session.close();
    info!("shutting down");
    Ok(())
}

fn dispatch(
    action: Action,
    session: &mut GraphSession<ExplorerClient, Message>,
    fetcher: &Fetcher,
) {
    match action {
        Action::Expand(ticket) => session.expand(ticket),
        Action::LoadCenter(address) => {
            session.load(&address);
            fetcher.detail(address.clone());
            fetcher.transactions(address, 1);
        }
        Action::LoadTransactions { address, page } => fetcher.transactions(address, page),
    }
}
