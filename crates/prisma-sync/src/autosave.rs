//! Debounced autosave of free-text drafts

use crate::{DraftField, DraftStore, SyncError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Duration, Instant};

/// Background worker coalescing draft edits
///
/// Every edit restarts that field's quiet period. When a field has been
/// quiet for the debounce window its last value is saved once; earlier
/// values are dropped. Fields are debounced independently.
///
/// # Examples
///
/// ```
/// use prisma_sync::{Autosaver, DraftField, MemoryDraftStore};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryDraftStore::new();
///     let autosaver = Autosaver::spawn(Arc::new(store.clone()), "review", Duration::from_millis(50));
///
///     autosaver.edit(DraftField::Pico, "Adults with")?;
///     autosaver.edit(DraftField::Pico, "Adults with type 2 diabetes")?;
///     autosaver.shutdown().await?;
///
///     assert_eq!(store.saves().len(), 1);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Autosaver {
    sender: mpsc::UnboundedSender<(DraftField, String)>,
    handle: JoinHandle<()>,
}

impl Autosaver {
    /// Start the worker for `project_id`
    pub fn spawn(store: Arc<dyn DraftStore>, project_id: impl Into<String>, debounce: Duration) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(store, project_id.into(), debounce, receiver));
        Self { sender, handle }
    }

    /// Record a new value for `field`
    pub fn edit(&self, field: DraftField, value: impl Into<String>) -> Result<(), SyncError> {
        self.sender
            .send((field, value.into()))
            .map_err(|_| SyncError::Worker("autosave worker stopped".to_string()))
    }

    /// Save everything still pending and stop the worker
    pub async fn shutdown(self) -> Result<(), SyncError> {
        drop(self.sender);
        self.handle
            .await
            .map_err(|e| SyncError::Worker(format!("autosave worker failed: {}", e)))
    }
}

async fn run(
    store: Arc<dyn DraftStore>,
    project_id: String,
    debounce: Duration,
    mut receiver: mpsc::UnboundedReceiver<(DraftField, String)>,
) {
    let mut pending: HashMap<DraftField, (String, Instant)> = HashMap::new();

    tracing::debug!("Autosave worker started (debounce: {:?})", debounce);

    loop {
        let next_due = pending.values().map(|(_, due)| *due).min();

        tokio::select! {
            message = receiver.recv() => match message {
                Some((field, value)) => {
                    pending.insert(field, (value, Instant::now() + debounce));
                }
                None => {
                    let remaining: Vec<_> = pending.drain().collect();
                    for (field, (value, _)) in remaining {
                        save(store.as_ref(), &project_id, field, &value).await;
                    }
                    break;
                }
            },
            _ = sleep_until(next_due.unwrap_or_else(|| Instant::now() + debounce)), if next_due.is_some() => {
                let now = Instant::now();
                let due: Vec<DraftField> = pending
                    .iter()
                    .filter(|(_, (_, at))| *at <= now)
                    .map(|(field, _)| *field)
                    .collect();
                for field in due {
                    if let Some((value, _)) = pending.remove(&field) {
                        save(store.as_ref(), &project_id, field, &value).await;
                    }
                }
            }
        }
    }

    tracing::debug!("Autosave worker stopped");
}

async fn save(store: &dyn DraftStore, project_id: &str, field: DraftField, value: &str) {
    match store.save_draft(project_id, field, value).await {
        Ok(()) => tracing::debug!("Autosaved {} ({} chars)", field, value.chars().count()),
        Err(e) => tracing::warn!("Autosave of {} failed: {}", field, e),
    }
}
