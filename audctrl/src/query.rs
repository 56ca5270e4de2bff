//! Query cache
//!
//! Results of list fetches keyed by [`QueryKey`].  Reads of a key that
//! is already being fetched share the in-flight request; successful
//! results are kept until their kind is invalidated, after which the
//! next read fetches again.  There are no partial updates: invalidation
//! followed by a refetch is the only way the cache is brought up to
//! date.

use audcore::resource::ResourceKind;
use futures::future::{
    BoxFuture,
    FutureExt,
    Shared,
};
use parking_lot::Mutex;
use std::{
    any::Any,
    collections::HashMap,
    fmt,
    future::Future,
    sync::{
        Arc,
        Weak,
    },
};

#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct QueryKey {
    pub kind: ResourceKind,
    pub page: u32,
    /// The url-encoded filter.
    pub filter: String,
}

type Value = Arc<dyn Any + Send + Sync>;
type Pending<T, E> = Shared<BoxFuture<'static, Result<T, E>>>;
type Subscriber = Arc<dyn Fn(ResourceKind) + Send + Sync>;

enum Entry {
    /// The fetch is a [`Pending`] of the type it was started with.
    Pending {
        generation: u64,
        fetch: Box<dyn Any + Send + Sync>,
    },
    Ready {
        // when the entry was last read or stored.
        used: u64,
        value: Value,
    },
}

/// Results kept per kind unless set otherwise.
pub const DEFAULT_CAPACITY: usize = 32;

struct Inner {
    entries: HashMap<QueryKey, Entry>,
    capacity: usize,
    clock: u64,
    generation: u64,
    invalidations: HashMap<ResourceKind, usize>,
    subscribers: Vec<(u64, Subscriber)>,
    next_subscriber: u64,
}

#[derive(Clone, Default)]
pub struct QueryCache(Arc<Mutex<Inner>>);

impl Default for Inner {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            capacity: DEFAULT_CAPACITY,
            clock: 0,
            generation: 0,
            invalidations: HashMap::new(),
            subscribers: Vec::new(),
            next_subscriber: 0,
        }
    }
}

impl Inner {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Store a result, dropping the least recently used results of the
    /// same kind beyond the capacity.
    fn store(&mut self, key: QueryKey, value: Value) {
        let used = self.tick();
        let kind = key.kind;
        self.entries.insert(key, Entry::Ready { used, value });
        loop {
            let mut ready = self.entries.iter()
                .filter_map(|(key, entry)| match entry {
                    Entry::Ready { used, .. } if key.kind == kind => Some((*used, key)),
                    _ => None,
                });
            let Some(first) = ready.next() else { break };
            let (count, oldest) = ready.fold((1, first), |(count, oldest), next| {
                (count + 1, if next.0 < oldest.0 { next } else { oldest })
            });
            if count <= self.capacity {
                break;
            }
            let oldest = oldest.1.clone();
            log::trace!("evicting {oldest}");
            self.entries.remove(&oldest);
        }
    }
}

/// Keeps a subscriber registered for as long as it is held.
pub struct Subscription {
    id: u64,
    cache: Weak<Mutex<Inner>>,
}

impl QueryKey {
    pub fn new(kind: ResourceKind, page: u32, filter: impl Into<String>) -> Self {
        Self {
            kind,
            page,
            filter: filter.into(),
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}#{}?{}", self.kind, self.page, self.filter)
    }
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// A cache keeping at most `capacity` results per kind, the least
    /// recently used being dropped first.  In-flight fetches are not
    /// counted.
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Arc::new(Mutex::new(Inner {
            capacity: capacity.max(1),
            .. Inner::default()
        })))
    }

    /// Read `key`, calling `fetcher` only if there is neither a cached
    /// result nor a fetch in flight for it.  Errors are handed to every
    /// reader waiting on the same fetch but are not kept.
    pub async fn fetch<T, E, F, Fut>(
        &self,
        key: QueryKey,
        fetcher: F,
    ) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        E: Clone + Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let (generation, pending) = {
            let mut inner = self.0.lock();
            let tick = inner.tick();
            let existing = match inner.entries.get_mut(&key) {
                Some(Entry::Ready { used, value }) => match value.downcast_ref::<Result<T, E>>() {
                    Some(result) => {
                        *used = tick;
                        return result.clone();
                    }
                    None => {
                        log::warn!("cached value for {key} is of an unexpected type; refetching");
                        None
                    }
                },
                Some(Entry::Pending { generation, fetch }) => {
                    match fetch.downcast_ref::<Pending<T, E>>() {
                        Some(fetch) => Some((*generation, fetch.clone())),
                        None => {
                            log::warn!("in-flight fetch for {key} is of an unexpected type; refetching");
                            None
                        }
                    }
                }
                None => None,
            };
            match existing {
                Some(existing) => {
                    log::trace!("joining in-flight fetch for {key}");
                    existing
                }
                None => {
                    log::trace!("fetching {key}");
                    inner.generation += 1;
                    let generation = inner.generation;
                    let fetch: Pending<T, E> = fetcher().boxed().shared();
                    inner.entries.insert(key.clone(), Entry::Pending {
                        generation,
                        fetch: Box::new(fetch.clone()),
                    });
                    (generation, fetch)
                }
            }
        };

        let result = pending.await;

        let mut inner = self.0.lock();
        let current = matches!(
            inner.entries.get(&key),
            Some(Entry::Pending { generation: g, .. }) if *g == generation
        );
        if !current {
            // invalidated (and possibly refetched) in the meantime.
            log::trace!("not storing stale result for {key}");
        } else if result.is_ok() {
            inner.store(key, Arc::new(result.clone()));
        } else {
            inner.entries.remove(&key);
        }
        result
    }

    /// Drop every entry of the given kind and notify subscribers.
    pub fn invalidate(&self, kind: ResourceKind) {
        let subscribers = {
            let mut inner = self.0.lock();
            inner.entries.retain(|key, _| key.kind != kind);
            *inner.invalidations.entry(kind).or_default() += 1;
            inner.subscribers
                .iter()
                .map(|(_, subscriber)| subscriber.clone())
                .collect::<Vec<_>>()
        };
        log::trace!("invalidated {kind}; notifying {} subscriber(s)", subscribers.len());
        for subscriber in subscribers {
            subscriber(kind);
        }
    }

    /// Forget everything, such as when the session changes; fetches in
    /// flight complete without being stored.
    pub fn clear(&self) {
        let mut inner = self.0.lock();
        log::trace!("clearing {} cached entries", inner.entries.len());
        inner.entries.clear();
    }

    /// How many times `kind` was invalidated.
    pub fn invalidations(&self, kind: ResourceKind) -> usize {
        self.0.lock()
            .invalidations
            .get(&kind)
            .copied()
            .unwrap_or(0)
    }

    pub fn is_cached(&self, key: &QueryKey) -> bool {
        matches!(self.0.lock().entries.get(key), Some(Entry::Ready { .. }))
    }

    pub fn is_pending(&self, key: &QueryKey) -> bool {
        matches!(self.0.lock().entries.get(key), Some(Entry::Pending { .. }))
    }

    pub fn subscribe(
        &self,
        subscriber: impl Fn(ResourceKind) + Send + Sync + 'static,
    ) -> Subscription {
        let mut inner = self.0.lock();
        inner.next_subscriber += 1;
        let id = inner.next_subscriber;
        inner.subscribers.push((id, Arc::new(subscriber)));
        Subscription {
            id,
            cache: Arc::downgrade(&self.0),
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cache) = self.cache.upgrade() {
            cache.lock().subscribers.retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod test {
    use futures::channel::oneshot;
    use std::sync::atomic::{
        AtomicUsize,
        Ordering,
    };

    use super::*;

    fn key(page: u32) -> QueryKey {
        QueryKey::new(ResourceKind::Repos, page, "")
    }

    #[async_std::test]
    async fn dedup_in_flight() -> anyhow::Result<()> {
        let cache = QueryCache::new();
        let calls = Arc::new(AtomicUsize::new(0));
        let (tx, rx) = oneshot::channel::<u32>();

        let first = cache.fetch(key(1), {
            let calls = calls.clone();
            move || {
                calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    rx.await.map_err(|_| "cancelled".to_string())
                }
            }
        });
        let second = cache.fetch(key(1), {
            let calls = calls.clone();
            move || {
                calls.fetch_add(1, Ordering::SeqCst);
                async move { Ok::<u32, String>(0) }
            }
        });
        let release = async move {
            tx.send(42).expect("receiver still alive");
        };
        let (first, second, _) = futures::join!(first, second, release);
        assert_eq!(first, Ok(42));
        assert_eq!(second, Ok(42));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.is_cached(&key(1)));

        // cached results are served without a call
        let third = cache.fetch(key(1), || async { Ok::<u32, String>(0) }).await;
        assert_eq!(third, Ok(42));
        Ok(())
    }

    #[async_std::test]
    async fn invalidate() -> anyhow::Result<()> {
        let cache = QueryCache::new();
        let notified = Arc::new(AtomicUsize::new(0));
        let subscription = cache.subscribe({
            let notified = notified.clone();
            move |kind| {
                assert_eq!(kind, ResourceKind::Repos);
                notified.fetch_add(1, Ordering::SeqCst);
            }
        });

        cache.fetch(key(1), || async { Ok::<u32, String>(1) }).await.ok();
        cache.fetch(key(2), || async { Ok::<u32, String>(2) }).await.ok();
        let users = QueryKey::new(ResourceKind::Users, 1, "");
        cache.fetch(users.clone(), || async { Ok::<u32, String>(3) }).await.ok();

        cache.invalidate(ResourceKind::Repos);
        assert!(!cache.is_cached(&key(1)));
        assert!(!cache.is_cached(&key(2)));
        assert!(cache.is_cached(&users));
        assert_eq!(cache.invalidations(ResourceKind::Repos), 1);
        assert_eq!(cache.invalidations(ResourceKind::Users), 0);
        assert_eq!(notified.load(Ordering::SeqCst), 1);

        let refetched = cache.fetch(key(1), || async { Ok::<u32, String>(10) }).await;
        assert_eq!(refetched, Ok(10));

        drop(subscription);
        cache.invalidate(ResourceKind::Repos);
        assert_eq!(notified.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[async_std::test]
    async fn errors_are_not_kept() -> anyhow::Result<()> {
        let cache = QueryCache::new();
        let failed = cache.fetch(key(1), || async { Err::<u32, String>("down".into()) }).await;
        assert_eq!(failed, Err("down".to_string()));
        assert!(!cache.is_cached(&key(1)));
        assert!(!cache.is_pending(&key(1)));
        let retried = cache.fetch(key(1), || async { Ok::<u32, String>(1) }).await;
        assert_eq!(retried, Ok(1));
        Ok(())
    }

    #[async_std::test]
    async fn clear() -> anyhow::Result<()> {
        let cache = QueryCache::new();
        cache.fetch(key(1), || async { Ok::<u32, String>(1) }).await.ok();
        assert!(cache.is_cached(&key(1)));
        cache.clear();
        assert!(!cache.is_cached(&key(1)));
        assert_eq!(cache.invalidations(ResourceKind::Repos), 0);
        Ok(())
    }

    #[async_std::test]
    async fn least_recently_used_evicted() -> anyhow::Result<()> {
        let cache = QueryCache::with_capacity(2);
        let users = QueryKey::new(ResourceKind::Users, 1, "");
        cache.fetch(users.clone(), || async { Ok::<u32, String>(0) }).await.ok();
        for page in 1..=2 {
            cache.fetch(key(page), move || async move { Ok::<u32, String>(page) }).await.ok();
        }
        // reading page 1 again makes page 2 the oldest
        assert_eq!(cache.fetch(key(1), || async { Ok::<u32, String>(0) }).await, Ok(1));
        cache.fetch(key(3), || async { Ok::<u32, String>(3) }).await.ok();

        assert!(cache.is_cached(&key(1)));
        assert!(!cache.is_cached(&key(2)));
        assert!(cache.is_cached(&key(3)));
        // other kinds are counted separately
        assert!(cache.is_cached(&users));
        Ok(())
    }

    #[async_std::test]
    async fn stale_result_discarded() -> anyhow::Result<()> {
        let cache = QueryCache::new();
        let (tx, rx) = oneshot::channel::<u32>();
        let fetch = cache.fetch(key(1), move || async move {
            rx.await.map_err(|_| "cancelled".to_string())
        });
        let invalidate = {
            let cache = cache.clone();
            async move {
                cache.invalidate(ResourceKind::Repos);
                tx.send(1).expect("receiver still alive");
            }
        };
        let (result, _) = futures::join!(fetch, invalidate);
        // the reader still gets its answer, but it is not cached.
        assert_eq!(result, Ok(1));
        assert!(!cache.is_cached(&key(1)));
        Ok(())
    }
}
