use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::errors::CoreError;
use crate::models::holding::{Holding, HoldingId};
use crate::models::portfolio::{Portfolio, PortfolioId};

use super::backend::{MemoryBackend, StorageBackend};
use super::database::{Collection, Database};
use super::live::{LiveQuery, Subscribers};
use super::manager::{StorageManager, StoreImage};

/// Observable state of the store handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    Closed,
    Opening,
    Open,
}

enum HandleState {
    Closed,
    Opening,
    Open(Database),
}

/// Durable local persistence of portfolios and holdings.
///
/// The handle moves through **Closed → Opening → Open**. It may drop back to
/// Closed at any time: through [`close`](Self::close) (resource pressure,
/// app lifecycle) or when a write fails. Every public operation that finds
/// the handle Closed reopens it, running the legacy migration if needed,
/// and retries exactly once. If that fails it returns
/// [`CoreError::StoreUnavailable`].
///
/// Mutations are applied to a copy of the image and only committed once the
/// backend accepted the write, then published to live queries.
///
/// One handle owns a store file at a time. The handle lock serializes
/// writers and migration within a process only: a handle opened after
/// another has migrated sees the current layout and does nothing, but two
/// handles open on the same file at once each keep their own image and the
/// last commit wins.
///
/// **Note**: the store does not validate input (empty names, unknown
/// portfolio ids) and [`delete_portfolio`](Self::delete_portfolio) does not
/// cascade. Callers wanting the cascade use
/// [`delete_portfolio_cascade`](Self::delete_portfolio_cascade).
pub struct PortfolioStore {
    backend: Box<dyn StorageBackend>,
    state: Mutex<HandleState>,
    subscribers: Subscribers,
}

impl std::fmt::Debug for PortfolioStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PortfolioStore")
            .field("status", &self.status())
            .field("subscribers", &self.subscribers.active())
            .finish()
    }
}

impl PortfolioStore {
    /// Create a handle over `backend`. The handle starts Closed and opens
    /// lazily on first use.
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            state: Mutex::new(HandleState::Closed),
            subscribers: Subscribers::default(),
        }
    }

    /// Create a handle and open it immediately.
    pub fn open(backend: impl StorageBackend + 'static) -> Result<Self, CoreError> {
        let store = Self::new(backend);
        store.ensure_open()?;
        Ok(store)
    }

    /// Open a file-backed store (native only).
    #[cfg(not(target_arch = "wasm32"))]
    pub fn open_file(path: impl Into<std::path::PathBuf>) -> Result<Self, CoreError> {
        Self::open(super::backend::FileBackend::new(path))
    }

    /// An ephemeral store that lives only as long as the handle.
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    // ── Handle lifecycle ────────────────────────────────────────────

    pub fn status(&self) -> StoreStatus {
        match *self.lock_state() {
            HandleState::Closed => StoreStatus::Closed,
            HandleState::Opening => StoreStatus::Opening,
            HandleState::Open(_) => StoreStatus::Open,
        }
    }

    /// Make sure the handle is Open, migrating a legacy image if needed.
    /// A no-op when already Open.
    pub fn ensure_open(&self) -> Result<(), CoreError> {
        self.reopen()
    }

    /// Drop the in-memory image and move to Closed. Models the store being
    /// closed from outside; the next operation reopens transparently.
    pub fn close(&self) {
        let mut state = self.lock_state();
        if matches!(*state, HandleState::Open(_)) {
            debug!("closing portfolio store handle");
        }
        *state = HandleState::Closed;
    }

    /// Number of live queries still subscribed.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.active()
    }

    // ── Portfolios ──────────────────────────────────────────────────

    /// Create a portfolio. The store does not check that `name` is non-empty.
    pub fn create_portfolio(&self, name: &str, emoji: &str) -> Result<PortfolioId, CoreError> {
        let id = self.write(&[Collection::Portfolios], |db| {
            db.insert_portfolio(name.to_string(), emoji.to_string(), Utc::now())
        })?;
        info!(portfolio = %id, name, "created portfolio");
        Ok(id)
    }

    /// Remove the portfolio record only; its holdings are left untouched.
    /// Returns whether the portfolio existed.
    pub fn delete_portfolio(&self, id: PortfolioId) -> Result<bool, CoreError> {
        self.write(&[Collection::Portfolios], |db| db.remove_portfolio(id))
    }

    /// Remove every holding of a portfolio. Returns how many were removed.
    pub fn delete_holdings_for_portfolio(&self, id: PortfolioId) -> Result<usize, CoreError> {
        self.write(&[Collection::Holdings], |db| db.remove_holdings_for(id))
    }

    /// Remove a portfolio together with its holdings in one atomic write.
    /// Returns whether the portfolio existed and how many holdings went with it.
    pub fn delete_portfolio_cascade(&self, id: PortfolioId) -> Result<(bool, usize), CoreError> {
        let (existed, removed) = self.write(&[Collection::Holdings, Collection::Portfolios], |db| {
            let removed = db.remove_holdings_for(id);
            (db.remove_portfolio(id), removed)
        })?;
        info!(portfolio = %id, holdings = removed, "deleted portfolio");
        Ok((existed, removed))
    }

    /// All portfolios in creation order.
    pub fn list_portfolios(&self) -> Result<Vec<Portfolio>, CoreError> {
        self.read(|db| db.portfolios.clone())
    }

    pub fn get_portfolio(&self, id: PortfolioId) -> Result<Option<Portfolio>, CoreError> {
        self.read(|db| db.portfolio(id).cloned())
    }

    // ── Holdings ────────────────────────────────────────────────────

    /// Append a holding. Re-adding a coin creates another record; the
    /// portfolio id is not checked.
    pub fn add_holding(
        &self,
        portfolio_id: PortfolioId,
        coin_id: &str,
        coin_symbol: &str,
        coin_name: &str,
        amount: f64,
    ) -> Result<HoldingId, CoreError> {
        let id = self.write(&[Collection::Holdings], |db| {
            db.insert_holding(
                portfolio_id,
                coin_id.to_string(),
                coin_symbol.to_string(),
                coin_name.to_string(),
                amount,
                Utc::now(),
            )
        })?;
        debug!(holding = %id, portfolio = %portfolio_id, coin_id, amount, "added holding");
        Ok(id)
    }

    /// Remove a single holding. An unknown id is not an error.
    pub fn delete_holding(&self, id: HoldingId) -> Result<bool, CoreError> {
        self.write(&[Collection::Holdings], |db| db.remove_holding(id))
    }

    /// Holdings of one portfolio in insertion order.
    pub fn list_holdings(&self, portfolio_id: PortfolioId) -> Result<Vec<Holding>, CoreError> {
        self.read(|db| db.holdings_for(portfolio_id))
    }

    /// Every holding in the store, whatever its portfolio.
    pub fn list_all_holdings(&self) -> Result<Vec<Holding>, CoreError> {
        self.read(|db| db.holdings.clone())
    }

    /// Holdings whose portfolio no longer exists. Empty unless a caller
    /// used `delete_portfolio` without removing the holdings first.
    pub fn dangling_holdings(&self) -> Result<Vec<Holding>, CoreError> {
        self.read(|db| db.dangling_holdings().into_iter().cloned().collect())
    }

    // ── Live queries ────────────────────────────────────────────────

    /// Live list of portfolios; refreshed on every portfolio mutation.
    pub fn watch_portfolios(&self) -> Result<LiveQuery<Vec<Portfolio>>, CoreError> {
        self.watch(&[Collection::Portfolios], |db: &Database| db.portfolios.clone())
    }

    /// Live holdings of one portfolio; refreshed on every holding mutation.
    pub fn watch_holdings(
        &self,
        portfolio_id: PortfolioId,
    ) -> Result<LiveQuery<Vec<Holding>>, CoreError> {
        self.watch(&[Collection::Holdings], move |db: &Database| {
            db.holdings_for(portfolio_id)
        })
    }

    /// Subscribe `query` to the given collections. The initial result and
    /// the registration happen under the handle lock, so no write can slip
    /// in between them.
    pub fn watch<T, Q>(
        &self,
        collections: &[Collection],
        query: Q,
    ) -> Result<LiveQuery<T>, CoreError>
    where
        T: Send + Sync + 'static,
        Q: Fn(&Database) -> T + Clone + Send + Sync + 'static,
    {
        self.with_retry(|| {
            let state = self.lock_state();
            match &*state {
                HandleState::Open(db) => {
                    Ok(self.subscribers.subscribe(collections, db, query.clone()))
                }
                _ => Err(CoreError::StoreClosed),
            }
        })
    }

    // ── Internal ────────────────────────────────────────────────────

    fn lock_state(&self) -> MutexGuard<'_, HandleState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn read<T>(&self, op: impl Fn(&Database) -> T) -> Result<T, CoreError> {
        self.with_retry(|| match &*self.lock_state() {
            HandleState::Open(db) => Ok(op(db)),
            _ => Err(CoreError::StoreClosed),
        })
    }

    fn write<T>(
        &self,
        touched: &[Collection],
        op: impl Fn(&mut Database) -> T,
    ) -> Result<T, CoreError> {
        self.with_retry(|| self.try_write(touched, &op))
    }

    /// One write attempt against an Open handle. A failed backend write
    /// closes the handle and reports `StoreClosed`, which triggers the retry.
    fn try_write<T>(
        &self,
        touched: &[Collection],
        op: &impl Fn(&mut Database) -> T,
    ) -> Result<T, CoreError> {
        let mut state = self.lock_state();
        let HandleState::Open(db) = &*state else {
            return Err(CoreError::StoreClosed);
        };

        let mut next = db.clone();
        let out = op(&mut next);
        let bytes = StorageManager::encode(&next)?;

        if let Err(e) = self.backend.store(&bytes) {
            warn!(error = %e, "store write failed; closing handle");
            *state = HandleState::Closed;
            return Err(CoreError::StoreClosed);
        }

        self.subscribers.publish(&next, touched);
        *state = HandleState::Open(next);
        Ok(out)
    }

    /// Run `attempt`; if the handle was Closed, reopen and run it once more.
    fn with_retry<T>(&self, attempt: impl Fn() -> Result<T, CoreError>) -> Result<T, CoreError> {
        match attempt() {
            Err(CoreError::StoreClosed) => {
                self.reopen()?;
                attempt().map_err(|e| match e {
                    CoreError::StoreClosed => {
                        CoreError::StoreUnavailable("store closed again during retry".into())
                    }
                    other => other,
                })
            }
            other => other,
        }
    }

    /// Closed → Opening → Open. Holding the state lock throughout makes the
    /// migration single-entry: a concurrent caller waits and then sees Open.
    fn reopen(&self) -> Result<(), CoreError> {
        let mut state = self.lock_state();
        if matches!(*state, HandleState::Open(_)) {
            return Ok(());
        }

        *state = HandleState::Opening;

        match self.load_image() {
            Ok(db) => {
                debug!(
                    portfolios = db.portfolios.len(),
                    holdings = db.holdings.len(),
                    "portfolio store open"
                );
                // The image on disk may differ from what subscribers last saw.
                self.subscribers
                    .publish(&db, &[Collection::Portfolios, Collection::Holdings]);
                *state = HandleState::Open(db);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "failed to open portfolio store");
                *state = HandleState::Closed;
                Err(CoreError::StoreUnavailable(e.to_string()))
            }
        }
    }

    /// Read the backend image, upgrading a legacy one in place.
    fn load_image(&self) -> Result<Database, CoreError> {
        let Some(bytes) = self.backend.load()? else {
            return Ok(Database::new());
        };

        match StorageManager::decode(&bytes)? {
            StoreImage::Current(db) => Ok(db),
            StoreImage::Legacy(legacy) => {
                let count = legacy.holdings.len();
                let db = legacy.migrate(Utc::now());
                // Persist before anyone can read: the upgraded image replaces
                // the legacy one in a single backend write.
                self.backend.store(&StorageManager::encode(&db)?)?;
                info!(holdings = count, "migrated legacy store to multi-portfolio layout");
                Ok(db)
            }
        }
    }
}
