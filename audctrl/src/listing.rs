//! Generic list screen orchestration.
//!
//! A [`ResourceManager`] ties a backend, a [`ResourceState`] and the
//! [`QueryCache`] together for one kind of resource, providing the list
//! view, its rendering through its column definitions and the modal
//! flows that mutate the listed resources.

use audcore::{
    error::BackendError,
    pagination::Paged,
    resource::{
        Resource,
        traits::{
            ListBackend,
            MutationBackend,
        },
    },
    validate::Validate,
};
use parking_lot::Mutex;
use std::sync::{
    Arc,
    atomic::{
        AtomicBool,
        Ordering,
    },
};

use crate::{
    flow::{
        CreateFlow,
        DeleteFlow,
        EditFlow,
    },
    query::{
        QueryCache,
        QueryKey,
    },
    state::ResourceState,
};

pub mod columns;

/// A list column: its header and how a cell is rendered.
pub struct Column<R> {
    header: String,
    render: Box<dyn Fn(&R) -> String + Send + Sync>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum ListView<R> {
    #[default]
    Loading,
    Ready(Paged<R>),
    /// The fetch failed with the given message; the list is not retried
    /// until the next refresh.
    Error(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RowAction {
    /// Navigation target that opens the edit modal.
    Edit(String),
    /// Open the deletion confirmation for the id.
    Delete(String),
}

pub struct ResourceManager<B: ListBackend> {
    backend: Arc<B>,
    state: Arc<dyn ResourceState>,
    cache: QueryCache,
    columns: Vec<Column<B::Resource>>,
    filter: Box<dyn Fn(&str) -> B::Filter + Send + Sync>,
    view: Mutex<ListView<B::Resource>>,
    mounted: AtomicBool,
}

impl<R> Column<R> {
    pub fn new(
        header: impl Into<String>,
        render: impl Fn(&R) -> String + Send + Sync + 'static,
    ) -> Self {
        Self {
            header: header.into(),
            render: Box::new(render),
        }
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn render(&self, item: &R) -> String {
        (self.render)(item)
    }
}

impl<R> ListView<R> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn items(&self) -> &[R] {
        match self {
            Self::Ready(paged) => &paged.items,
            _ => &[],
        }
    }
}

impl<B: ListBackend> ResourceManager<B> {
    pub fn new(
        backend: Arc<B>,
        state: Arc<dyn ResourceState>,
        cache: QueryCache,
    ) -> Self {
        Self {
            backend,
            state,
            cache,
            columns: Vec::new(),
            filter: Box::new(|_| B::Filter::default()),
            view: Mutex::new(ListView::Loading),
            mounted: AtomicBool::new(true),
        }
    }

    pub fn with_columns(mut self, columns: Vec<Column<B::Resource>>) -> Self {
        self.columns = columns;
        self
    }

    /// How the search text of the state turns into the list filter.
    pub fn with_filter(
        mut self,
        filter: impl Fn(&str) -> B::Filter + Send + Sync + 'static,
    ) -> Self {
        self.filter = Box::new(filter);
        self
    }

    pub fn state(&self) -> &Arc<dyn ResourceState> {
        &self.state
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn backend(&self) -> &Arc<B> {
        &self.backend
    }

    fn current(&self) -> (QueryKey, B::Filter) {
        let filter = (self.filter)(&self.state.search());
        let encoded = serde_urlencoded::to_string(&filter)
            .unwrap_or_else(|e| {
                log::warn!("unable to encode filter for {}: {e}", self.backend.kind());
                String::new()
            });
        (QueryKey::new(self.backend.kind(), self.state.page(), encoded), filter)
    }

    /// The key the list is currently fetched under.
    pub fn query_key(&self) -> QueryKey {
        self.current().0
    }

    /// Fetch the list for the current state through the cache.
    pub async fn refresh(&self) -> ListView<B::Resource> {
        let (key, filter) = self.current();
        if !self.cache.is_cached(&key) {
            *self.view.lock() = ListView::Loading;
        }
        let page = key.page;
        let backend = self.backend.clone();
        let result = self.cache.fetch(key.clone(), move || async move {
            backend.fetch_page(page, &filter).await
        }).await;

        if !self.mounted.load(Ordering::SeqCst) {
            log::warn!("discarding result for {key} as the list is unmounted");
            return self.view();
        }
        if self.query_key() != key {
            log::warn!("discarding result for {key} as the list moved on");
            return self.view();
        }
        let view = match result {
            Ok(paged) => ListView::Ready(paged),
            Err(e) => {
                log::trace!("failed to fetch {key}: {e}");
                ListView::Error(e.user_message())
            }
        };
        *self.view.lock() = view.clone();
        view
    }

    pub fn view(&self) -> ListView<B::Resource> {
        self.view.lock().clone()
    }

    pub fn headers(&self) -> Vec<&str> {
        self.columns
            .iter()
            .map(Column::header)
            .collect()
    }

    pub fn render_row(&self, item: &B::Resource) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| column.render(item))
            .collect()
    }

    /// The text cells of the currently shown list.
    pub fn render_rows(&self) -> Vec<Vec<String>> {
        self.view
            .lock()
            .items()
            .iter()
            .map(|item| self.render_row(item))
            .collect()
    }

    /// Stop accepting results; anything still in flight is discarded.
    pub fn unmount(&self) {
        self.mounted.store(false, Ordering::SeqCst);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted.load(Ordering::SeqCst)
    }
}

/// Walk every page of the backend, bypassing the cache.
pub async fn fetch_all<B: ListBackend>(
    backend: &B,
    filter: &B::Filter,
) -> Result<Vec<B::Resource>, BackendError> {
    let mut result = Vec::new();
    let mut page = 1;
    loop {
        let paged = backend.fetch_page(page, filter).await?;
        let done = paged.is_empty() || !paged.pagination.has_next();
        result.extend(paged);
        if done {
            break;
        }
        page += 1;
    }
    Ok(result)
}

impl<B: MutationBackend> ResourceManager<B> {
    pub fn row_actions(&self, item: &B::Resource) -> Vec<RowAction> {
        vec![
            RowAction::Edit(self.state.resource_link(item.id())),
            RowAction::Delete(item.id().to_string()),
        ]
    }

    pub fn create_flow(&self) -> CreateFlow<B>
    where
        B::Create: Validate,
    {
        CreateFlow::new(self.backend.clone(), self.state.clone(), self.cache.clone())
    }

    pub fn edit_flow(&self) -> EditFlow<B>
    where
        B::Update: Validate,
    {
        EditFlow::new(self.backend.clone(), self.state.clone(), self.cache.clone())
    }

    pub fn delete_flow(&self) -> DeleteFlow<B> {
        DeleteFlow::new(self.backend.clone(), self.cache.clone())
    }
}
