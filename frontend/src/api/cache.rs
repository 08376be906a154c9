use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;
use chrono::{DateTime, Utc};
use futures::future::{FutureExt, LocalBoxFuture, Shared};
use log::debug;
use serde_json::Value;
use crate::api::error::QueryError;

type InFlight = Shared<LocalBoxFuture<'static, Result<Value, QueryError>>>;

/// Source of "now" for staleness checks.
pub type Clock = Rc<dyn Fn() -> DateTime<Utc>>;

/// Stable identifier of a cached query: the operation name followed by its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(parts.into_iter().map(Into::into).collect())
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// How long a successful result is served without refetching.
    pub stale_time: Duration,
}

impl QueryOptions {
    pub fn stale_after(stale_time: Duration) -> Self {
        Self { stale_time }
    }

    pub fn always_fresh() -> Self {
        Self { stale_time: Duration::ZERO }
    }
}

/// Result of a query guarded by a precondition.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutcome<T> {
    /// The precondition was not met and no request was made.
    Disabled,
    Ready(T),
}

impl<T> QueryOutcome<T> {
    pub fn ready(self) -> Option<T> {
        match self {
            QueryOutcome::Disabled => None,
            QueryOutcome::Ready(value) => Some(value),
        }
    }
}

#[derive(Default)]
struct QueryEntry {
    data: Option<Value>,
    updated_at: Option<DateTime<Utc>>,
    in_flight: Option<(u64, InFlight)>,
}

impl QueryEntry {
    fn is_fresh(&self, now: DateTime<Utc>, stale_time: Duration) -> bool {
        match (self.data.is_some(), self.updated_at) {
            (true, Some(updated_at)) => {
                let age = now.signed_duration_since(updated_at).to_std().unwrap_or_default();
                age < stale_time
            }
            _ => false,
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub entries_with_data: usize,
    pub in_flight: usize,
}

/// Query cache shared by every view of the app.
///
/// Results are stored as raw JSON under a [`QueryKey`]. A fetch is served
/// from cache while the entry is younger than the caller's stale time;
/// otherwise the fetcher runs, and callers that ask for the same key while it
/// is running wait on that one request instead of issuing their own. Cloning
/// the client shares the cache.
#[derive(Clone)]
pub struct QueryClient {
    entries: Rc<RefCell<HashMap<QueryKey, QueryEntry>>>,
    next_request: Rc<Cell<u64>>,
    clock: Clock,
}

impl QueryClient {
    pub fn new() -> Self {
        Self::with_clock(Utc::now)
    }

    pub fn with_clock(clock: impl Fn() -> DateTime<Utc> + 'static) -> Self {
        Self {
            entries: Rc::new(RefCell::new(HashMap::new())),
            next_request: Rc::new(Cell::new(0)),
            clock: Rc::new(clock),
        }
    }

    /// Returns the cached value for `key` or runs `fetcher` to produce it.
    pub async fn fetch<F, Fut>(
        &self,
        key: &QueryKey,
        options: QueryOptions,
        fetcher: F,
    ) -> Result<Value, QueryError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value, QueryError>> + 'static,
    {
        let pending = {
            let entries = self.entries.borrow();
            let entry = entries.get(key);
            let fresh = entry
                .filter(|e| e.is_fresh((self.clock)(), options.stale_time))
                .and_then(|e| e.data.clone());
            if let Some(data) = fresh {
                debug!("Cache hit for key: {}", key);
                return Ok(data);
            }
            entry.and_then(|e| e.in_flight.as_ref().map(|(_, pending)| pending.clone()))
        };

        if let Some(pending) = pending {
            debug!("Joining in-flight request for key: {}", key);
            return pending.await;
        }

        debug!("Cache miss for key: {}, fetching...", key);
        let request_id = self.next_request.get() + 1;
        self.next_request.set(request_id);

        let request = self.settle(key.clone(), request_id, fetcher()).boxed_local().shared();
        self.entries
            .borrow_mut()
            .entry(key.clone())
            .or_default()
            .in_flight = Some((request_id, request.clone()));

        request.await
    }

    /// Records the outcome of request `request_id` once it resolves.
    ///
    /// The entry is only touched if that request is still the current one for
    /// the key, so results of requests orphaned by `remove` or `clear` are dropped.
    /// A failure with nothing cached before it leaves no entry behind.
    fn settle<Fut>(
        &self,
        key: QueryKey,
        request_id: u64,
        request: Fut,
    ) -> impl Future<Output = Result<Value, QueryError>> + 'static
    where
        Fut: Future<Output = Result<Value, QueryError>> + 'static,
    {
        let entries = Rc::downgrade(&self.entries);
        let clock = Rc::clone(&self.clock);
        async move {
            let result = request.await;
            if let Some(entries) = entries.upgrade() {
                let mut entries = entries.borrow_mut();
                let drop_entry = match entries.get_mut(&key) {
                    Some(entry) if matches!(entry.in_flight, Some((id, _)) if id == request_id) => {
                        entry.in_flight = None;
                        if let Ok(data) = &result {
                            entry.data = Some(data.clone());
                            entry.updated_at = Some(clock());
                        }
                        entry.data.is_none()
                    }
                    _ => {
                        debug!("Discarding result of orphaned request for key: {}", key);
                        false
                    }
                };
                if drop_entry {
                    entries.remove(&key);
                }
            }
            result
        }
    }

    /// Cached value for `key`, stale or not.
    pub fn peek(&self, key: &QueryKey) -> Option<Value> {
        self.entries.borrow().get(key).and_then(|entry| entry.data.clone())
    }

    pub fn is_stale(&self, key: &QueryKey, options: QueryOptions) -> bool {
        self.entries
            .borrow()
            .get(key)
            .map(|entry| !entry.is_fresh((self.clock)(), options.stale_time))
            .unwrap_or(true)
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        self.entries
            .borrow()
            .get(key)
            .map(|entry| entry.in_flight.is_some())
            .unwrap_or(false)
    }

    /// Marks every entry under `prefix` stale; cached data stays available to `peek`.
    pub fn invalidate(&self, prefix: &QueryKey) {
        let mut entries = self.entries.borrow_mut();
        for (key, entry) in entries.iter_mut() {
            if key.starts_with(prefix) {
                entry.updated_at = None;
            }
        }
    }

    pub fn remove(&self, key: &QueryKey) {
        self.entries.borrow_mut().remove(key);
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }

    pub fn stats(&self) -> CacheStats {
        let entries = self.entries.borrow();
        CacheStats {
            total_entries: entries.len(),
            entries_with_data: entries.values().filter(|e| e.data.is_some()).count(),
            in_flight: entries.values().filter(|e| e.in_flight.is_some()).count(),
        }
    }
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for QueryClient {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.entries, &other.entries)
    }
}

impl fmt::Debug for QueryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryClient").field("stats", &self.stats()).finish()
    }
}
