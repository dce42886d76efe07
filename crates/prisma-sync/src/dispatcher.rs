//! Fire-and-forget persistence of committed status changes

use crate::RecordStore;
use prisma_domain::Record;
use prisma_workflow::StatusChange;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Outcome of the calls awaited by [`StatusDispatcher::flush`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Calls the store accepted
    pub succeeded: usize,
    /// Calls that failed or were lost with the worker
    pub failed: usize,
}

enum Job {
    Status(StatusChange),
    Save { project_id: String, records: Vec<Record> },
    Flush(oneshot::Sender<DispatchSummary>),
}

/// Pushes status changes to the record store from a background worker
///
/// Calls are queued and never awaited by the caller, so the next local
/// transition is accepted immediately. One worker drains the queue in
/// order: a full-set save queued before a status update always reaches the
/// store first. Failures are logged and dropped; local state stays the
/// source of truth.
///
/// The worker is started on first use, which must happen inside a tokio
/// runtime.
pub struct StatusDispatcher {
    store: Arc<dyn RecordStore>,
    sender: Option<mpsc::UnboundedSender<Job>>,
    queued: Arc<AtomicUsize>,
    enabled: bool,
}

impl StatusDispatcher {
    /// Dispatcher writing to `store`
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self {
            store,
            sender: None,
            queued: Arc::new(AtomicUsize::new(0)),
            enabled: true,
        }
    }

    /// Dispatcher that drops every change
    pub fn disabled(store: Arc<dyn RecordStore>) -> Self {
        Self {
            enabled: false,
            ..Self::new(store)
        }
    }

    /// Whether changes are pushed at all
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Calls queued and not yet answered by the store
    pub fn in_flight(&self) -> usize {
        self.queued.load(Ordering::SeqCst)
    }

    /// Queue one `update_status` call per change
    pub fn dispatch(&mut self, changes: &[StatusChange]) {
        for change in changes {
            self.enqueue(Job::Status(change.clone()));
        }
    }

    /// Queue a `save` of the full record set
    pub fn dispatch_save(&mut self, project_id: &str, records: Vec<Record>) {
        self.enqueue(Job::Save {
            project_id: project_id.to_string(),
            records,
        });
    }

    /// Wait until every queued call has been answered
    pub async fn flush(&mut self) -> DispatchSummary {
        let Some(sender) = &self.sender else {
            return DispatchSummary::default();
        };

        let (reply, answer) = oneshot::channel();
        if sender.send(Job::Flush(reply)).is_err() {
            return self.worker_lost();
        }
        match answer.await {
            Ok(summary) => summary,
            Err(_) => self.worker_lost(),
        }
    }

    fn enqueue(&mut self, job: Job) {
        if !self.enabled {
            return;
        }

        self.queued.fetch_add(1, Ordering::SeqCst);
        if let Err(mpsc::error::SendError(job)) = self.worker().send(job) {
            tracing::error!("Persistence worker stopped; starting a new one");
            self.sender = None;
            if self.worker().send(job).is_err() {
                self.queued.fetch_sub(1, Ordering::SeqCst);
            }
        }
    }

    fn worker(&mut self) -> &mpsc::UnboundedSender<Job> {
        let store = &self.store;
        let queued = &self.queued;
        self.sender.get_or_insert_with(|| {
            let (sender, receiver) = mpsc::unbounded_channel();
            tokio::spawn(run(Arc::clone(store), Arc::clone(queued), receiver));
            sender
        })
    }

    fn worker_lost(&mut self) -> DispatchSummary {
        tracing::error!("Persistence worker failed");
        self.sender = None;
        let lost = self.queued.swap(0, Ordering::SeqCst);
        DispatchSummary {
            succeeded: 0,
            failed: lost,
        }
    }
}

async fn run(
    store: Arc<dyn RecordStore>,
    queued: Arc<AtomicUsize>,
    mut receiver: mpsc::UnboundedReceiver<Job>,
) {
    let mut summary = DispatchSummary::default();
    tracing::debug!("Persistence worker started");

    while let Some(job) = receiver.recv().await {
        let ok = match job {
            Job::Status(change) => persist_status(store.as_ref(), &change).await,
            Job::Save { project_id, records } => save(store.as_ref(), &project_id, &records).await,
            Job::Flush(reply) => {
                let _ = reply.send(std::mem::take(&mut summary));
                continue;
            }
        };

        if ok {
            summary.succeeded += 1;
        } else {
            summary.failed += 1;
        }
        queued.fetch_sub(1, Ordering::SeqCst);
    }

    tracing::debug!("Persistence worker stopped");
}

async fn persist_status(store: &dyn RecordStore, change: &StatusChange) -> bool {
    match store
        .update_status(&change.record_id, change.to, change.reason.as_deref())
        .await
    {
        Ok(()) => {
            tracing::debug!("Persisted {} -> {}", change.record_id, change.to);
            true
        }
        Err(e) => {
            tracing::warn!("Failed to persist status of {}: {}", change.record_id, e);
            false
        }
    }
}

async fn save(store: &dyn RecordStore, project_id: &str, records: &[Record]) -> bool {
    match store.save(project_id, records).await {
        Ok(()) => {
            tracing::debug!("Saved {} records for project '{}'", records.len(), project_id);
            true
        }
        Err(e) => {
            tracing::warn!("Failed to save project '{}': {}", project_id, e);
            false
        }
    }
}

impl std::fmt::Debug for StatusDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusDispatcher")
            .field("in_flight", &self.in_flight())
            .field("enabled", &self.enabled)
            .finish()
    }
}
