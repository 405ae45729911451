use std::sync::Mutex;

use tokio::sync::watch;

use crate::errors::CoreError;

use super::database::{Collection, Database};

/// A query result that refreshes itself whenever the store mutates the
/// collection it reads from.
///
/// Dropping the `LiveQuery` ends the subscription; the store prunes it on the
/// next publish and never pushes to it again.
#[derive(Debug)]
pub struct LiveQuery<T> {
    rx: watch::Receiver<T>,
}

impl<T: Clone> LiveQuery<T> {
    /// The latest result, without waiting.
    pub fn current(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Whether a refresh arrived that has not been seen through `next` yet.
    pub fn has_changed(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Wait for the next refresh and return it.
    pub async fn next(&mut self) -> Result<T, CoreError> {
        self.rx
            .changed()
            .await
            .map_err(|_| CoreError::StoreUnavailable("store dropped".into()))?;
        Ok(self.rx.borrow_and_update().clone())
    }

    /// Mark the current result as seen.
    pub fn mark_seen(&mut self) {
        self.rx.borrow_and_update();
    }
}

struct Subscriber {
    collections: Vec<Collection>,
    refresh: Box<dyn Fn(&Database) + Send + Sync>,
    is_closed: Box<dyn Fn() -> bool + Send + Sync>,
}

/// Registry of live queries. Mutations publish the collections they touched
/// and every matching query re-runs against the new image.
#[derive(Default)]
pub(crate) struct Subscribers {
    entries: Mutex<Vec<Subscriber>>,
}

impl Subscribers {
    pub(crate) fn subscribe<T, Q>(
        &self,
        collections: &[Collection],
        db: &Database,
        query: Q,
    ) -> LiveQuery<T>
    where
        T: Send + Sync + 'static,
        Q: Fn(&Database) -> T + Send + Sync + 'static,
    {
        let (tx, rx) = watch::channel(query(db));
        let tx = std::sync::Arc::new(tx);
        let watcher = tx.clone();

        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.push(Subscriber {
            collections: collections.to_vec(),
            refresh: Box::new(move |db| {
                tx.send_replace(query(db));
            }),
            is_closed: Box::new(move || watcher.is_closed()),
        });
        LiveQuery { rx }
    }

    /// Re-run every live query reading one of `touched`.
    pub(crate) fn publish(&self, db: &Database, touched: &[Collection]) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.retain(|s| !(s.is_closed)());
        for subscriber in entries
            .iter()
            .filter(|s| s.collections.iter().any(|c| touched.contains(c)))
        {
            (subscriber.refresh)(db);
        }
    }

    /// Number of live subscriptions, after pruning dropped ones.
    pub(crate) fn active(&self) -> usize {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.retain(|s| !(s.is_closed)());
        entries.len()
    }
}
