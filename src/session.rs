//! Asynchronous side of the graph view.
//!
//! [`GraphSession`] spawns the network fetches for the initial load and for
//! each expansion, and posts their results back to the UI loop as
//! [`GraphEvent`]s. The UI applies them in one synchronous step, so the
//! graph is never painted half-merged.
//!
//! Each load bumps a generation counter. Events carry the generation they
//! were spawned under; the UI drops any event whose generation is no longer
//! current, which covers both navigating to a new center and closing the
//! view while fetches are still running.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, info};

use crate::api::GraphSource;
use crate::graph::ExpansionTicket;
use crate::models::GraphResponse;
use crate::{FlowscopeError, Result};

/// Result of a graph fetch, tagged with the session generation.
#[derive(Debug)]
pub enum GraphEvent {
    Loaded {
        generation: u64,
        center: String,
        result: Result<GraphResponse>,
    },
    Expanded {
        generation: u64,
        ticket: ExpansionTicket,
        result: Result<GraphResponse>,
    },
}

impl GraphEvent {
    pub fn generation(&self) -> u64 {
        match self {
            GraphEvent::Loaded { generation, .. } | GraphEvent::Expanded { generation, .. } => {
                *generation
            }
        }
    }
}

/// Spawns graph fetches and routes their results to the UI channel.
pub struct GraphSession<S, M> {
    source: Arc<S>,
    tx: mpsc::UnboundedSender<M>,
    timeout: Duration,
    generation: u64,
    tasks: Vec<AbortHandle>,
    closed: bool,
}

impl<S, M> GraphSession<S, M>
where
    S: GraphSource,
    M: From<GraphEvent> + Send + 'static,
{
    pub fn new(source: Arc<S>, tx: mpsc::UnboundedSender<M>, timeout: Duration) -> Self {
        Self {
            source,
            tx,
            timeout,
            generation: 0,
            tasks: Vec::new(),
            closed: false,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` if `event` belongs to the current generation of an
    /// open session.
    pub fn accepts(&self, event: &GraphEvent) -> bool {
        !self.closed && event.generation() == self.generation
    }

    /// Starts loading the graph around `center`, invalidating every fetch
    /// issued before. Returns the new generation.
    pub fn load(&mut self, center: &str) -> u64 {
        self.abort_all();
        self.generation += 1;
        self.closed = false;
        info!(center, generation = self.generation, "graph load");

        let generation = self.generation;
        let center = center.to_string();
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let timeout = self.timeout;
        self.track(tokio::spawn(async move {
            let result = fetch_graph(source.as_ref(), &center, timeout).await;
            let _ = tx.send(M::from(GraphEvent::Loaded {
                generation,
                center,
                result,
            }));
        }));
        generation
    }

    /// Fetches one more hop for the address named by `ticket`.
    pub fn expand(&mut self, ticket: ExpansionTicket) {
        if self.closed {
            debug!(address = %ticket.address, "session closed, expansion dropped");
            return;
        }
        let generation = self.generation;
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        let timeout = self.timeout;
        self.track(tokio::spawn(async move {
            let result = fetch_graph(source.as_ref(), &ticket.address, timeout).await;
            let _ = tx.send(M::from(GraphEvent::Expanded {
                generation,
                ticket,
                result,
            }));
        }));
    }

    /// Stops every pending fetch and rejects any result still in transit.
    pub fn close(&mut self) {
        self.abort_all();
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn track(&mut self, handle: tokio::task::JoinHandle<()>) {
        self.tasks.retain(|t| !t.is_finished());
        self.tasks.push(handle.abort_handle());
    }

    fn abort_all(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

impl<S, M> Drop for GraphSession<S, M> {
    fn drop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

/// Fetches `address`'s graph, failing with [`FlowscopeError::Timeout`] if it
/// takes longer than `timeout`.
pub async fn fetch_graph<S: GraphSource + ?Sized>(
    source: &S,
    address: &str,
    timeout: Duration,
) -> Result<GraphResponse> {
    match tokio::time::timeout(timeout, source.address_graph(address)).await {
        Ok(result) => result,
        Err(_) => Err(FlowscopeError::Timeout(format!(
            "graph for {address} after {}ms",
            timeout.as_millis()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::future::Future;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use tokio_test::{assert_err, assert_ok};

    use crate::graph::{ExpansionOutcome, GraphScene, Size};

    /// In-memory source that counts calls and can be slowed down.
    struct FakeSource {
        calls: AtomicUsize,
        delay: Duration,
        fail: bool,
    }

    impl FakeSource {
        fn new(delay: Duration, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                delay,
                fail,
            })
        }
    }

    impl GraphSource for FakeSource {
        fn address_graph(
            &self,
            address: &str,
        ) -> impl Future<Output = Result<GraphResponse>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let address = address.to_string();
            let delay = self.delay;
            let fail = self.fail;
            async move {
                tokio::time::sleep(delay).await;
                if fail {
                    return Err(FlowscopeError::Api(format!("no graph for {address}")));
                }
                serde_json::from_value(serde_json::json!({
                    "center": address,
                    "incoming": [],
                    "outgoing": [{
                        "address": format!("{address}-out"),
                        "txid": format!("{address}-tx"),
                        "amount": 1
                    }]
                }))
                .map_err(FlowscopeError::from)
            }
        }
    }

    #[tokio::test]
    async fn load_delivers_current_generation() {
        let source = FakeSource::new(Duration::ZERO, false);
        let (tx, mut rx) = mpsc::unbounded_channel::<GraphEvent>();
        let mut session = GraphSession::new(source, tx, Duration::from_secs(1));

        let generation = session.load("C");
        let event = rx.recv().await.unwrap();
        assert!(session.accepts(&event));
        match event {
            GraphEvent::Loaded {
                generation: g,
                center,
                result,
            } => {
                assert_eq!(g, generation);
                assert_eq!(center, "C");
                assert_ok!(result);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn reload_makes_earlier_results_stale() {
        let source = FakeSource::new(Duration::ZERO, false);
        let (tx, _rx) = mpsc::unbounded_channel::<GraphEvent>();
        let mut session = GraphSession::new(source, tx, Duration::from_secs(1));

        let first = session.load("A");
        let second = session.load("B");
        assert!(second > first);

        let stale = GraphEvent::Loaded {
            generation: first,
            center: "A".to_string(),
            result: Err(FlowscopeError::Api("ignored".to_string())),
        };
        assert!(!session.accepts(&stale));
    }

    #[tokio::test]
    async fn closed_session_rejects_everything() {
        let source = FakeSource::new(Duration::from_millis(50), false);
        let (tx, mut rx) = mpsc::unbounded_channel::<GraphEvent>();
        let mut session = GraphSession::new(source, tx, Duration::from_secs(1));

        session.load("C");
        session.close();
        assert!(session.is_closed());

        let late = tokio::time::timeout(Duration::from_millis(200), rx.recv()).await;
        assert!(late.is_err() || late.unwrap().is_none_or(|e| !session.accepts(&e)));
    }

    #[tokio::test]
    async fn slow_source_times_out() {
        let source = FakeSource::new(Duration::from_secs(5), false);
        let result = fetch_graph(source.as_ref(), "X", Duration::from_millis(20)).await;
        let err = assert_err!(result);
        assert!(matches!(err, FlowscopeError::Timeout(_)));
    }

    #[tokio::test]
    async fn double_click_issues_one_fetch() {
        let source = FakeSource::new(Duration::from_millis(20), false);
        let (tx, mut rx) = mpsc::unbounded_channel::<GraphEvent>();
        let mut session = GraphSession::new(Arc::clone(&source), tx, Duration::from_secs(1));

        session.load("C");
        let GraphEvent::Loaded { result, .. } = rx.recv().await.unwrap() else {
            panic!("expected load");
        };
        let mut scene = GraphScene::new(&assert_ok!(result), Size::new(1200.0, 800.0));

        let p = scene.overlay().region("out-C-tx-C-out-0").unwrap().rect.center();
        let now = std::time::Instant::now();
        for _ in 0..2 {
            if let Some(ticket) = scene.click(p, now) {
                session.expand(ticket);
            }
        }

        let event = rx.recv().await.unwrap();
        assert!(session.accepts(&event));
        let GraphEvent::Expanded { ticket, result, .. } = event else {
            panic!("expected expansion");
        };
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        let outcome = scene.apply_expansion(&ticket, result);
        assert!(matches!(outcome, ExpansionOutcome::Merged(_)));

        let p = scene.overlay().region("out-C-tx-C-out-0").unwrap().rect.center();
        assert!(scene.click(p, now).is_none());
    }

    #[tokio::test]
    async fn failed_expansion_is_reported_not_raised() {
        let source = FakeSource::new(Duration::ZERO, true);
        let (tx, mut rx) = mpsc::unbounded_channel::<GraphEvent>();
        let mut session = GraphSession::new(source, tx, Duration::from_secs(1));
        session.expand(ExpansionTicket {
            address: "X".to_string(),
            node_id: "n".to_string(),
        });
        let GraphEvent::Expanded { result, .. } = rx.recv().await.unwrap() else {
            panic!("expected expansion");
        };
        assert_err!(result);
    }
}
