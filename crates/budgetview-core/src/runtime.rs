//! View runtime
//!
//! A single task owns the [`TransactionView`] and applies host events and
//! fetch completions one at a time. Source requests run on their own tasks
//! and report back through an internal channel. Every applied event
//! publishes a fresh [`ViewSnapshot`].

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};

use crate::error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::source::SourceRef;
use crate::view::{TransactionView, ViewCommand, ViewEvent, ViewSnapshot};

const REQUEST_BUFFER: usize = 64;

struct ViewRequest {
    event: ViewEvent,
    reply: oneshot::Sender<ViewSnapshot>,
}

pub struct ViewRuntime {
    view: TransactionView,
    source: SourceRef,
    request_rx: mpsc::Receiver<ViewRequest>,
    completion_tx: mpsc::UnboundedSender<ViewEvent>,
    completion_rx: mpsc::UnboundedReceiver<ViewEvent>,
    snapshot_tx: watch::Sender<ViewSnapshot>,
    logger: Arc<dyn ErrorLogger>,
}

/// Cloneable handle used by hosts to drive the view
#[derive(Clone)]
pub struct ViewHandle {
    request_tx: mpsc::Sender<ViewRequest>,
    snapshot_rx: watch::Receiver<ViewSnapshot>,
}

impl ViewRuntime {
    pub fn new(view: TransactionView, source: SourceRef) -> (Self, ViewHandle) {
        let (request_tx, request_rx) = mpsc::channel(REQUEST_BUFFER);
        let (completion_tx, completion_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(view.snapshot());

        let runtime = Self {
            view,
            source,
            request_rx,
            completion_tx,
            completion_rx,
            snapshot_tx,
            logger: Arc::new(DefaultErrorLogger),
        };
        let handle = ViewHandle {
            request_tx,
            snapshot_rx,
        };
        (runtime, handle)
    }

    pub fn with_logger(mut self, logger: Arc<dyn ErrorLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Process events until every [`ViewHandle`] is dropped
    pub async fn run(mut self) {
        log::info!(target: "budgetview::runtime", "View runtime started");

        loop {
            tokio::select! {
                request = self.request_rx.recv() => match request {
                    Some(ViewRequest { event, reply }) => {
                        let snapshot = self.apply(event);
                        // The caller may have given up waiting
                        let _ = reply.send(snapshot);
                    }
                    None => break,
                },
                Some(event) = self.completion_rx.recv() => {
                    self.apply(event);
                }
            }
        }

        log::info!(target: "budgetview::runtime", "View runtime stopped");
    }

    fn apply(&mut self, event: ViewEvent) -> ViewSnapshot {
        for command in self.view.dispatch(event) {
            self.spawn(command);
        }
        let snapshot = self.view.snapshot();
        self.snapshot_tx.send_replace(snapshot.clone());
        snapshot
    }

    fn spawn(&self, command: ViewCommand) {
        let source = Arc::clone(&self.source);
        let completions = self.completion_tx.clone();
        let logger = Arc::clone(&self.logger);

        match command {
            ViewCommand::FetchPage(ticket) => {
                tokio::spawn(async move {
                    let result = source.fetch_transaction_page(&ticket.query).await;
                    if let Err(e) = &result {
                        let context = ErrorContext::new("fetch_transaction_page")
                            .with_envelope(Some(ticket.query.envelope.clone()))
                            .with_generation(ticket.generation);
                        logger.log_error(&CoreError::Source(e.clone()), &context);
                    }
                    let _ = completions.send(ViewEvent::PageLoaded {
                        generation: ticket.generation,
                        mutation_echo: ticket.mutation_echo,
                        result,
                    });
                });
            }
            ViewCommand::FetchMeta(ticket) => {
                tokio::spawn(async move {
                    let result = source
                        .fetch_envelope_meta(&ticket.user_id, &ticket.envelope)
                        .await;
                    let _ = completions.send(ViewEvent::MetaLoaded {
                        generation: ticket.generation,
                        result,
                    });
                });
            }
        }
    }
}

impl ViewHandle {
    /// Apply an event and return the snapshot it produced
    pub async fn dispatch(&self, event: ViewEvent) -> CoreResult<ViewSnapshot> {
        let (reply, response) = oneshot::channel();
        self.request_tx
            .send(ViewRequest { event, reply })
            .await
            .map_err(|_| CoreError::RuntimeStopped)?;
        response.await.map_err(|_| CoreError::RuntimeStopped)
    }

    /// Apply an event, then wait for its fetch to resolve.
    ///
    /// Returns the latest snapshot once nothing is pending, or whatever is
    /// current when `timeout` elapses.
    pub async fn settle(&self, event: ViewEvent, timeout: Duration) -> CoreResult<ViewSnapshot> {
        let snapshot = self.dispatch(event).await?;
        if !snapshot.pending {
            return Ok(snapshot);
        }
        self.wait_for(|s| !s.pending, timeout).await
    }

    /// Wait until a published snapshot satisfies `predicate`, or `timeout`
    /// elapses. Returns the latest snapshot either way.
    pub async fn wait_for<F>(&self, mut predicate: F, timeout: Duration) -> CoreResult<ViewSnapshot>
    where
        F: FnMut(&ViewSnapshot) -> bool,
    {
        let mut rx = self.snapshot_rx.clone();
        let outcome = match tokio::time::timeout(timeout, rx.wait_for(|s| predicate(s))).await {
            Ok(Ok(snapshot)) => Ok(snapshot.clone()),
            Ok(Err(_)) => Err(CoreError::RuntimeStopped),
            Err(_) => {
                log::debug!(target: "budgetview::runtime", "Timed out waiting for view to settle");
                Ok(self.snapshot())
            }
        };
        outcome
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> ViewSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Receiver notified on every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<ViewSnapshot> {
        self.snapshot_rx.clone()
    }
}
