//! View-binding adapters between presentation code and the store.
//!
//! # Responsibility
//! - Hand query results and mutation callbacks to screens.
//! - Degrade instead of failing: screens always get something to render.
//!
//! # Invariants
//! - Query adapters never return an error. Any store failure yields the
//!   query's `fallback()` value, flagged as degraded, plus a `warn` event.
//! - Mutation adapters never return an error. A disconnected store yields
//!   `Skipped`; a rejected write yields `Rejected`.
//! - Every view carries the store's `ConnectionState`, so degraded data can
//!   be told apart from a genuinely empty result.

use crate::store::{ConnectionState, LiveQuery, Mutation, Query, Store, StoreError};
use log::warn;
use std::marker::PhantomData;

/// One-shot query result as seen by a screen.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryView<T> {
    pub data: T,
    /// `true` when `data` is the fallback value rather than a real result.
    pub degraded: bool,
    pub state: ConnectionState,
}

/// Result of invoking a bound mutation.
#[derive(Debug)]
pub enum MutationOutcome<T> {
    Applied(T),
    /// The store was not connected; nothing was attempted.
    Skipped { reason: String },
    /// The store refused the write (validation, unknown id, storage error).
    Rejected(StoreError),
}

impl<T> MutationOutcome<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn applied(self) -> Option<T> {
        match self {
            Self::Applied(value) => Some(value),
            Self::Skipped { .. } | Self::Rejected(_) => None,
        }
    }
}

/// Entry point screens use to reach the store.
#[derive(Clone)]
pub struct Bindings {
    store: Store,
}

impl Bindings {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn state(&self) -> ConnectionState {
        self.store.state()
    }

    /// Runs `query` once, falling back on any failure.
    pub fn use_query<Q: Query>(&self, query: Q) -> QueryView<Q::Output> {
        match self.store.query(&query) {
            Ok(data) => QueryView {
                data,
                degraded: false,
                state: self.store.state(),
            },
            Err(err) => {
                warn!(
                    "event=query_fallback module=binding status=degraded query={} error={err}",
                    query.name()
                );
                QueryView {
                    data: query.fallback(),
                    degraded: true,
                    state: self.store.state(),
                }
            }
        }
    }

    /// Subscribes to `query`, or pins its fallback value when the
    /// subscription cannot be established.
    pub fn use_live_query<Q: Query>(&self, query: Q) -> LiveView<Q::Output> {
        let name = query.name();
        let fallback = query.fallback();
        match self.store.subscribe(query) {
            Ok(live) => LiveView::Live(live),
            Err(err) => {
                warn!(
                    "event=subscribe_fallback module=binding status=degraded query={name} error={err}"
                );
                LiveView::Degraded(fallback)
            }
        }
    }

    /// Binds a mutation type.
    ///
    /// When the store is not connected at bind time, the handle is a no-op
    /// that reports `Skipped` on every call.
    pub fn use_mutation<M: Mutation>(&self) -> MutationHandle<M> {
        let state = self.store.state();
        let store = if state.is_connected() {
            Some(self.store.clone())
        } else {
            None
        };
        MutationHandle {
            store,
            bound_state: state,
            _mutation: PhantomData,
        }
    }
}

/// Live query as seen by a screen.
#[derive(Debug)]
pub enum LiveView<T> {
    Live(LiveQuery<T>),
    Degraded(T),
}

impl<T: Clone> LiveView<T> {
    pub fn current(&self) -> T {
        match self {
            Self::Live(live) => live.current(),
            Self::Degraded(value) => value.clone(),
        }
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded(_))
    }

    /// `true` when a newer result is waiting. Always `false` when degraded.
    pub fn has_changed(&self) -> bool {
        match self {
            Self::Live(live) => live.has_changed(),
            Self::Degraded(_) => false,
        }
    }

    /// Latest value, marking it seen.
    pub fn take_update(&mut self) -> T {
        match self {
            Self::Live(live) => live.take_update(),
            Self::Degraded(value) => value.clone(),
        }
    }
}

/// Callback for one mutation type.
pub struct MutationHandle<M: Mutation> {
    store: Option<Store>,
    bound_state: ConnectionState,
    _mutation: PhantomData<fn(M)>,
}

impl<M: Mutation> MutationHandle<M> {
    /// `false` for handles bound while the store was disconnected.
    pub fn is_live(&self) -> bool {
        self.store.is_some()
    }

    pub fn call(&self, mutation: M) -> MutationOutcome<M::Output> {
        let name = mutation.name();
        let Some(store) = self.store.as_ref() else {
            let reason = format!("store {}", self.bound_state);
            warn!("event=mutation_skipped module=binding status=skipped mutation={name} reason={reason}");
            return MutationOutcome::Skipped { reason };
        };

        match store.mutate(mutation) {
            Ok(output) => MutationOutcome::Applied(output),
            Err(StoreError::Unavailable(state)) => {
                warn!("event=mutation_skipped module=binding status=skipped mutation={name} reason={state}");
                MutationOutcome::Skipped { reason: state }
            }
            Err(err) => {
                warn!("event=mutation_rejected module=binding status=error mutation={name} error={err}");
                MutationOutcome::Rejected(err)
            }
        }
    }
}
