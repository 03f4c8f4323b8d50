//! Polled read-only queries (balances, token metadata).
//!
//! A [`Query`] doesn't fetch anything itself. The owner asks it for a
//! [`Ticket`] whenever a fetch is due, runs the fetch and hands the result
//! back. Results are applied last-request-wins per dependency key: a result
//! for a key that has since changed, or for a request that was superseded by
//! a newer one, is dropped.

use {
    crate::util::{Generation, Generations},
    std::time::Duration,
    tokio::time::Instant,
};

/// A request to fetch the value for `key`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ticket<K> {
    pub key: K,
    generation: Generation,
}

#[derive(Debug)]
pub struct Query<K, T> {
    /// `None` disables the query.
    key: Option<K>,
    data: Option<T>,
    error: Option<String>,
    fetching: bool,
    last_fetch: Option<Instant>,
    /// When the key last changed, i.e. since when an initial fetch is owed.
    keyed_at: Instant,
    refetch_interval: Option<Duration>,
    generations: Generations,
}

impl<K, T> Query<K, T>
where
    K: Clone + PartialEq,
{
    /// A query that is only fetched on demand and when its key changes.
    pub fn new() -> Self {
        Self {
            key: None,
            data: None,
            error: None,
            fetching: false,
            last_fetch: None,
            keyed_at: Instant::now(),
            refetch_interval: None,
            generations: Generations::default(),
        }
    }

    /// A query that is also refetched every `interval`.
    pub fn polling(interval: Duration) -> Self {
        Self {
            refetch_interval: Some(interval),
            ..Self::new()
        }
    }

    /// Points the query at a new dependency key. Changing the key drops the
    /// current data and makes the query due immediately; `None` disables it.
    pub fn set_key(&mut self, key: Option<K>) {
        if self.key == key {
            return;
        }
        self.key = key;
        self.data = None;
        self.error = None;
        self.fetching = false;
        self.last_fetch = None;
        self.keyed_at = Instant::now();
        self.generations.invalidate();
    }

    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    pub fn is_enabled(&self) -> bool {
        self.key.is_some()
    }

    /// Whether the query should be fetched at `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        self.next_due().is_some_and(|due| due <= now)
    }

    /// When the query will next become due, if ever.
    pub fn next_due(&self) -> Option<Instant> {
        if self.key.is_none() || self.fetching {
            return None;
        }
        match (self.last_fetch, self.refetch_interval) {
            (None, _) => Some(self.keyed_at),
            (Some(last), Some(interval)) => Some(last + interval),
            (Some(_), None) => None,
        }
    }

    /// Starts a fetch. Any fetch already in flight is superseded. Returns
    /// `None` if the query is disabled.
    pub fn begin(&mut self, now: Instant) -> Option<Ticket<K>> {
        let key = self.key.clone()?;
        self.fetching = true;
        self.last_fetch = Some(now);
        Some(Ticket {
            key,
            generation: self.generations.next(),
        })
    }

    /// Applies the result of a fetch. Returns whether it was applied.
    pub fn complete(&mut self, ticket: &Ticket<K>, result: anyhow::Result<T>) -> bool {
        if self.key.as_ref() != Some(&ticket.key) || !self.generations.is_current(ticket.generation)
        {
            return false;
        }
        self.fetching = false;
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
            }
            Err(err) => {
                // Keep showing the last good value.
                self.error = Some(format!("{err:#}"));
            }
        }
        true
    }

    /// Overwrites the data directly, e.g. with a value fetched as part of
    /// another flow.
    pub fn set_data(&mut self, key: &K, data: T, now: Instant) {
        if self.key.as_ref() != Some(key) {
            return;
        }
        self.generations.invalidate();
        self.data = Some(data);
        self.error = None;
        self.fetching = false;
        self.last_fetch = Some(now);
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Enabled but nothing fetched yet.
    pub fn is_loading(&self) -> bool {
        self.key.is_some() && self.data.is_none() && self.error.is_none()
    }

    pub fn is_fetching(&self) -> bool {
        self.fetching
    }
}

impl<K, T> Default for Query<K, T>
where
    K: Clone + PartialEq,
{
    fn default() -> Self {
        Self::new()
    }
}
