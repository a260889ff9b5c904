//! Reactive store handle.
//!
//! # Responsibility
//! - Own the single SQLite connection behind an explicitly passed `Store`.
//! - Run typed queries and typed mutations against it.
//! - Push the full, re-evaluated result of every live subscription after
//!   each committed mutation touching one of its tables.
//! - Expose reachability as an explicit `ConnectionState`.
//!
//! # Invariants
//! - Each mutation runs in exactly one transaction; subscribers never see a
//!   partially applied mutation.
//! - Writes are last-write-wins per row. No version token is checked.
//! - Lock order is always connection, then subscription list.
//! - No retry, timeout or cancellation is applied to any call.

pub mod mutations;
pub mod queries;

use crate::config::StoreConfig;
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::clock::{Clock, SystemClock};
use crate::repo::{RepoError, RepoResult};
use log::{info, warn};
use rusqlite::Connection;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use tokio::sync::watch;

pub type StoreResult<T> = Result<T, StoreError>;

/// Reachability of the backing store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConnectionState {
    Connecting,
    Connected,
    Unreachable { reason: String },
}

impl ConnectionState {
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl Display for ConnectionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Unreachable { reason } => write!(f, "unreachable ({reason})"),
        }
    }
}

#[derive(Debug)]
pub enum StoreError {
    /// The store is not connected; carries the current state description.
    Unavailable(String),
    /// The query or mutation was rejected by the data layer.
    Repo(RepoError),
    /// A previous holder of the connection lock panicked.
    Poisoned,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(state) => write!(f, "store unavailable: {state}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Poisoned => write!(f, "store connection lock poisoned"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Unavailable(_) | Self::Poisoned => None,
        }
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Repo(RepoError::Db(DbError::Sqlite(value)))
    }
}

impl<T> From<PoisonError<T>> for StoreError {
    fn from(_: PoisonError<T>) -> Self {
        Self::Poisoned
    }
}

/// Tables a query reads or a mutation writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Table {
    Tasks,
    Memories,
}

impl Table {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::Memories => "memories",
        }
    }
}

/// Read-only, subscribable store function.
pub trait Query: Send + Sync + 'static {
    type Output: Clone + Default + Send + Sync + 'static;

    /// Stable `<table>.<function>` name used in logs.
    fn name(&self) -> &'static str;

    /// Tables whose writes invalidate this query's result.
    fn tables(&self) -> &'static [Table];

    fn run(&self, conn: &Connection) -> RepoResult<Self::Output>;

    /// Value shown in place of a real result while the store is unusable.
    ///
    /// Lists degrade to empty, stats to all-zero counts.
    fn fallback(&self) -> Self::Output {
        Self::Output::default()
    }
}

/// Store function that writes; runs inside one transaction.
pub trait Mutation: Sized {
    type Output;

    fn name(&self) -> &'static str;

    fn tables(&self) -> &'static [Table];

    fn apply(self, conn: &Connection, clock: &Arc<dyn Clock>) -> RepoResult<Self::Output>;
}

/// Receiving side of a live subscription.
///
/// Holds the latest delivered result. Dropping it ends the subscription.
#[derive(Debug)]
pub struct LiveQuery<T> {
    receiver: watch::Receiver<T>,
}

impl<T: Clone> LiveQuery<T> {
    /// Latest delivered result.
    pub fn current(&self) -> T {
        self.receiver.borrow().clone()
    }

    /// Returns `true` when a result arrived that has not been marked seen.
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    /// Returns the latest result and marks it seen.
    pub fn take_update(&mut self) -> T {
        self.receiver.borrow_and_update().clone()
    }

    /// Waits for the next delivery. Returns `false` once the store is gone.
    pub async fn changed(&mut self) -> bool {
        self.receiver.changed().await.is_ok()
    }
}

trait LiveEntry: Send {
    fn name(&self) -> &'static str;
    fn touches(&self, tables: &[Table]) -> bool;
    fn is_closed(&self) -> bool;
    fn refresh(&self, conn: &Connection);
}

struct LiveSlot<Q: Query> {
    query: Q,
    sender: watch::Sender<Q::Output>,
}

impl<Q: Query> LiveEntry for LiveSlot<Q> {
    fn name(&self) -> &'static str {
        self.query.name()
    }

    fn touches(&self, tables: &[Table]) -> bool {
        self.query.tables().iter().any(|table| tables.contains(table))
    }

    fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    fn refresh(&self, conn: &Connection) {
        match self.query.run(conn) {
            Ok(value) => {
                self.sender.send_replace(value);
            }
            Err(err) => warn!(
                "event=live_refresh module=store status=error query={} error={err}",
                self.query.name()
            ),
        }
    }
}

struct StoreInner {
    conn: Mutex<Option<Connection>>,
    state: watch::Sender<ConnectionState>,
    live: Mutex<Vec<Box<dyn LiveEntry>>>,
    clock: Arc<dyn Clock>,
}

/// Cloneable handle to one store connection and its subscriptions.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

impl Store {
    /// Connects according to `config`.
    ///
    /// Never fails: an open error leaves the handle `Unreachable` so
    /// callers can degrade instead of aborting.
    pub fn open(config: &StoreConfig) -> Self {
        Self::open_with_clock(config, Arc::new(SystemClock))
    }

    pub fn open_with_clock(config: &StoreConfig, clock: Arc<dyn Clock>) -> Self {
        let store = Self::with_state(ConnectionState::Connecting, clock);
        store.connect(config);
        store
    }

    /// Handle that never reached the store.
    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self::with_state(
            ConnectionState::Unreachable {
                reason: reason.into(),
            },
            Arc::new(SystemClock),
        )
    }

    fn with_state(state: ConnectionState, clock: Arc<dyn Clock>) -> Self {
        let (state, _) = watch::channel(state);
        Self {
            inner: Arc::new(StoreInner {
                conn: Mutex::new(None),
                state,
                live: Mutex::new(Vec::new()),
                clock,
            }),
        }
    }

    /// Drops the current connection and connects again.
    ///
    /// Live subscriptions survive and receive fresh results on success.
    pub fn reconnect(&self, config: &StoreConfig) {
        self.connect(config);
    }

    fn connect(&self, config: &StoreConfig) {
        self.inner.state.send_replace(ConnectionState::Connecting);
        let opened = if config.in_memory {
            open_db_in_memory()
        } else {
            open_db(&config.path)
        };

        let mut guard = match self.inner.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match opened {
            Ok(conn) => {
                {
                    let live = self.live_entries();
                    for entry in live.iter() {
                        entry.refresh(&conn);
                    }
                }
                *guard = Some(conn);
                self.inner.state.send_replace(ConnectionState::Connected);
                info!("event=store_connect module=store status=ok");
            }
            Err(err) => {
                *guard = None;
                warn!("event=store_connect module=store status=error error={err}");
                self.inner.state.send_replace(ConnectionState::Unreachable {
                    reason: err.to_string(),
                });
            }
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.inner.state.borrow().clone()
    }

    /// Receiver that observes every future state transition.
    pub fn watch_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state.subscribe()
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.inner.clock
    }

    /// Runs `query` once against the current data.
    pub fn query<Q: Query>(&self, query: &Q) -> StoreResult<Q::Output> {
        let guard = self.inner.conn.lock()?;
        let conn = self.require_connection(guard.as_ref())?;
        Ok(query.run(conn)?)
    }

    /// Runs `query` and keeps it live.
    ///
    /// The returned receiver starts with the current result and gets the
    /// re-evaluated result after every later mutation on the query's tables.
    pub fn subscribe<Q: Query>(&self, query: Q) -> StoreResult<LiveQuery<Q::Output>> {
        let guard = self.inner.conn.lock()?;
        let conn = self.require_connection(guard.as_ref())?;
        let initial = query.run(conn)?;
        let (sender, receiver) = watch::channel(initial);

        let mut live = self.live_entries();
        live.retain(|entry| !entry.is_closed());
        info!(
            "event=subscribe module=store status=ok query={} live_count={}",
            query.name(),
            live.len() + 1
        );
        live.push(Box::new(LiveSlot { query, sender }));

        Ok(LiveQuery { receiver })
    }

    /// Applies `mutation` in a transaction and refreshes affected
    /// subscriptions after commit.
    pub fn mutate<M: Mutation>(&self, mutation: M) -> StoreResult<M::Output> {
        let name = mutation.name();
        let tables = mutation.tables();
        let started_at = Instant::now();

        let mut guard = self.inner.conn.lock()?;
        let conn = match guard.as_mut() {
            Some(conn) => conn,
            None => return Err(StoreError::Unavailable(self.state().to_string())),
        };

        let tx = conn.transaction()?;
        let output = match mutation.apply(&tx, &self.inner.clock) {
            Ok(output) => output,
            Err(err) => {
                warn!(
                    "event=mutation module=store status=error mutation={name} duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                return Err(err.into());
            }
        };
        tx.commit()?;

        let refreshed = self.refresh_live(conn, tables);
        info!(
            "event=mutation module=store status=ok mutation={name} duration_ms={} refreshed={refreshed}",
            started_at.elapsed().as_millis()
        );
        Ok(output)
    }

    /// Number of subscriptions whose receiver is still alive.
    pub fn live_count(&self) -> usize {
        let mut live = self.live_entries();
        live.retain(|entry| !entry.is_closed());
        live.len()
    }

    fn refresh_live(&self, conn: &Connection, tables: &[Table]) -> usize {
        let mut live = self.live_entries();
        live.retain(|entry| !entry.is_closed());
        let mut refreshed = 0;
        for entry in live.iter().filter(|entry| entry.touches(tables)) {
            log::debug!("event=live_refresh module=store status=start query={}", entry.name());
            entry.refresh(conn);
            refreshed += 1;
        }
        refreshed
    }

    fn live_entries(&self) -> MutexGuard<'_, Vec<Box<dyn LiveEntry>>> {
        match self.inner.live.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn require_connection<'a>(&self, conn: Option<&'a Connection>) -> StoreResult<&'a Connection> {
        conn.ok_or_else(|| StoreError::Unavailable(self.state().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{ConnectionState, Store, StoreError};
    use crate::config::StoreConfig;
    use crate::store::queries::ListTasks;

    #[test]
    fn unreachable_store_rejects_queries() {
        let store = Store::unreachable("not configured");
        assert_eq!(
            store.state(),
            ConnectionState::Unreachable {
                reason: "not configured".to_string()
            }
        );
        let err = store.query(&ListTasks::default()).unwrap_err();
        assert!(matches!(err, StoreError::Unavailable(_)));
    }

    #[test]
    fn connection_state_serializes_with_tag() {
        let value = serde_json::to_value(ConnectionState::Unreachable {
            reason: "offline".to_string(),
        })
        .unwrap();
        assert_eq!(value["state"], "unreachable");
        assert_eq!(value["reason"], "offline");
        assert_eq!(
            serde_json::to_value(ConnectionState::Connected).unwrap()["state"],
            "connected"
        );
    }

    #[test]
    fn in_memory_store_connects() {
        let store = Store::open(&StoreConfig::in_memory());
        assert!(store.state().is_connected());
        assert!(store.query(&ListTasks::default()).unwrap().is_empty());
    }

    #[test]
    fn open_failure_leaves_store_unreachable() {
        let dir = tempfile::tempdir().unwrap();
        let config = StoreConfig {
            path: dir.path().join("missing").join("nested").join("mission.db"),
            in_memory: false,
        };
        let store = Store::open(&config);
        assert!(matches!(store.state(), ConnectionState::Unreachable { .. }));
    }
}
