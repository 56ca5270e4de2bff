use async_trait::async_trait;
use audcore::{
    error::BackendError,
    pagination::{
        PagePaginationInfo,
        Paged,
    },
    repo::{
        Repo,
        RepoCreation,
        RepoUpdate,
    },
    resource::{
        CreatedId,
        ResourceKind,
        SearchFilter,
        traits::{
            ListBackend,
            MutationBackend,
        },
    },
};
use futures::{
    channel::oneshot,
    future::{
        FutureExt,
        Shared,
    },
};
use parking_lot::Mutex;
use std::sync::atomic::{
    AtomicUsize,
    Ordering,
};

use crate::fixtures::date;

/// A repository backend held in memory, counting the calls made to it.
pub struct MemoryBackend {
    repos: Mutex<Vec<Repo>>,
    page_size: usize,
    next_id: AtomicUsize,
    fetches: AtomicUsize,
    loads: AtomicUsize,
    mutations: AtomicUsize,
    gate: Mutex<Option<Shared<oneshot::Receiver<()>>>>,
    failure: Mutex<Option<BackendError>>,
}

impl MemoryBackend {
    pub fn new(page_size: usize) -> Self {
        Self {
            repos: Mutex::new(Vec::new()),
            page_size: page_size.max(1),
            next_id: AtomicUsize::new(1),
            fetches: AtomicUsize::new(0),
            loads: AtomicUsize::new(0),
            mutations: AtomicUsize::new(0),
            gate: Mutex::new(None),
            failure: Mutex::new(None),
        }
    }

    pub fn with_repos(self, repos: impl IntoIterator<Item = Repo>) -> Self {
        self.repos.lock().extend(repos);
        self
    }

    /// Hold every page fetch until the returned sender is used or
    /// dropped.
    pub fn hold(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.lock() = Some(rx.shared());
        tx
    }

    /// Fail the next mutation with `error`.
    pub fn fail_next(&self, error: BackendError) {
        *self.failure.lock() = Some(error);
    }

    pub fn repos(&self) -> Vec<Repo> {
        self.repos.lock().clone()
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    pub fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub fn mutations(&self) -> usize {
        self.mutations.load(Ordering::SeqCst)
    }

    fn mutate(&self) -> Result<(), BackendError> {
        self.mutations.fetch_add(1, Ordering::SeqCst);
        match self.failure.lock().take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl ListBackend for MemoryBackend {
    type Resource = Repo;
    type Filter = SearchFilter;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Repos
    }

    async fn fetch_page(
        &self,
        page: u32,
        filter: &SearchFilter,
    ) -> Result<Paged<Repo>, BackendError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        let gate = self.gate.lock().clone();
        if let Some(gate) = gate {
            gate.await.ok();
        }

        let needle = filter.q.as_deref().map(str::to_lowercase);
        let matched = self.repos.lock()
            .iter()
            .filter(|repo| match &needle {
                Some(needle) => repo.name.to_lowercase().contains(needle),
                None => true,
            })
            .cloned()
            .collect::<Vec<_>>();
        let total = matched.len();
        let total_pages = total.div_ceil(self.page_size).max(1);
        let items = matched
            .into_iter()
            .skip((page.max(1) as usize - 1) * self.page_size)
            .take(self.page_size)
            .collect();
        Ok(Paged::new(items, PagePaginationInfo {
            page,
            page_size: self.page_size as u32,
            total: total as u64,
            total_pages: total_pages as u32,
        }))
    }

    async fn load(&self, id: &str) -> Result<Repo, BackendError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        self.repos.lock()
            .iter()
            .find(|repo| repo.id == id)
            .cloned()
            .ok_or_else(|| BackendError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl MutationBackend for MemoryBackend {
    type Create = RepoCreation;
    type Created = CreatedId;
    type Update = RepoUpdate;

    async fn create(&self, payload: RepoCreation) -> Result<CreatedId, BackendError> {
        self.mutate()?;
        let id = format!("repo-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.repos.lock().push(Repo {
            id: id.clone(),
            name: payload.name,
            status: payload.status,
            created_at: date(),
            stats: None,
        });
        Ok(CreatedId { id })
    }

    async fn update(&self, id: &str, patch: RepoUpdate) -> Result<(), BackendError> {
        self.mutate()?;
        let mut repos = self.repos.lock();
        let repo = repos
            .iter_mut()
            .find(|repo| repo.id == id)
            .ok_or_else(|| BackendError::NotFound(id.to_string()))?;
        if let Some(name) = patch.name {
            repo.name = name;
        }
        if let Some(status) = patch.status {
            repo.status = status;
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), BackendError> {
        self.mutate()?;
        let mut repos = self.repos.lock();
        let before = repos.len();
        repos.retain(|repo| repo.id != id);
        if repos.len() == before {
            return Err(BackendError::NotFound(id.to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::fixtures::repo;
    use super::*;

    #[async_std::test]
    async fn paging_and_search() -> anyhow::Result<()> {
        let backend = MemoryBackend::new(2)
            .with_repos([
                repo("r1", "Orders"),
                repo("r2", "Billing"),
                repo("r3", "Order history"),
            ]);
        let page = backend.fetch_page(2, &SearchFilter::default()).await?;
        assert_eq!(page.pagination.total_pages, 2);
        assert_eq!(page.items, [repo("r3", "Order history")]);

        let found = backend.fetch_page(1, &SearchFilter::from_search("order")).await?;
        assert_eq!(found.len(), 2);
        assert_eq!(backend.fetches(), 2);

        backend.delete("r2").await?;
        assert!(backend.load("r2").await.is_err());
        backend.fail_next(BackendError::Authorization);
        assert_eq!(backend.delete("r1").await, Err(BackendError::Authorization));
        assert_eq!(backend.repos().len(), 2);
        Ok(())
    }
}
