//! Entity cache - last fetched snapshot of one backend collection
//!
//! Each collection moves through
//!
//! ```text
//! Empty -> Loading -> Loaded -> Loading -> Loaded ...
//!             \-> LoadFailed -> Loading ...
//! ```
//!
//! Loads are tagged with a [`Generation`]. Only the completion belonging to
//! the most recently started load is applied; anything older is discarded
//! so an in-flight stale fetch can never clobber newer state. Failures keep
//! the last good items.
//!
//! Writes do not take a generation. They only hold the state at `Loading`
//! while in flight, so a failed write never invalidates a pending load.

use crate::core::entity::Entity;

/// Lifecycle state of one cached collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Empty,
    Loading,
    Loaded,
    LoadFailed,
}

impl std::fmt::Display for LoadState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadState::Empty => write!(f, "empty"),
            LoadState::Loading => write!(f, "loading"),
            LoadState::Loaded => write!(f, "loaded"),
            LoadState::LoadFailed => write!(f, "load failed"),
        }
    }
}

/// Ticket identifying one started load
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// What happened to a completed load
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Applied<T> {
    /// The result replaced the cache
    Current,
    /// A newer load was started meanwhile; the fetched items are handed
    /// back untouched
    Superseded(Vec<T>),
}

/// Authoritative in-memory copy of one collection
#[derive(Debug)]
pub struct EntityCache<T> {
    items: Vec<T>,
    state: LoadState,
    /// State to return to once nothing is in flight
    settled: LoadState,
    latest: u64,
    /// Generation of the current load while it is still running
    pending: Option<u64>,
    writes: usize,
}

impl<T> Default for EntityCache<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            state: LoadState::Empty,
            settled: LoadState::Empty,
            latest: 0,
            pending: None,
            writes: 0,
        }
    }
}

impl<T: Entity> EntityCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a load and get its ticket
    ///
    /// Every ticket issued earlier becomes stale.
    pub fn begin(&mut self) -> Generation {
        self.latest += 1;
        self.pending = Some(self.latest);
        self.mark_loading();
        Generation(self.latest)
    }

    /// Note a write in flight; pair with [`EntityCache::end_write`]
    pub fn begin_write(&mut self) {
        self.writes += 1;
        self.mark_loading();
    }

    /// Finish a write without touching items or load generations
    ///
    /// The settled state comes back only once no other write and no load
    /// is still running.
    pub fn end_write(&mut self) {
        self.writes = self.writes.saturating_sub(1);
        if self.writes == 0 && self.pending.is_none() {
            self.state = self.settled;
        }
    }

    fn mark_loading(&mut self) {
        if self.state != LoadState::Loading {
            self.settled = self.state;
        }
        self.state = LoadState::Loading;
    }

    fn settle(&mut self, state: LoadState) {
        self.pending = None;
        self.settled = state;
        self.state = if self.writes > 0 { LoadState::Loading } else { state };
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        generation.0 == self.latest
    }

    /// Apply a finished fetch, unless a newer one has been started since
    ///
    /// On success the collection is replaced wholesale. On failure the
    /// previous items are kept and the state becomes `LoadFailed`. A stale
    /// result leaves the cache alone: its items come back in
    /// [`Applied::Superseded`] and its error is returned as is.
    pub fn complete<E>(&mut self, generation: Generation, result: Result<Vec<T>, E>) -> Result<Applied<T>, E> {
        if !self.is_current(generation) {
            return result.map(Applied::Superseded);
        }
        match result {
            Ok(items) => {
                self.items = items;
                self.settle(LoadState::Loaded);
                Ok(Applied::Current)
            }
            Err(err) => {
                self.settle(LoadState::LoadFailed);
                Err(err)
            }
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Owned copy for use across an await point
    pub fn snapshot(&self) -> Vec<T> {
        self.items.clone()
    }

    pub fn find(&self, id: i64) -> Option<&T> {
        self.items.iter().find(|item| item.id() == Some(id))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
