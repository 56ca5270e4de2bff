use audcore::{
    error::BackendError,
    location::{
        Location,
        MemoryHistory,
    },
    resource::{
        Resource,
        ResourceKind,
        SearchFilter,
    },
};
use audctrl::{
    listing::{
        ListView,
        ResourceManager,
        RowAction,
        columns::repo_columns,
        fetch_all,
    },
    query::{
        QueryCache,
        QueryKey,
    },
    state::{
        MemoryState,
        ResourceState,
        StateBacking,
        resource_state,
    },
};
use std::sync::Arc;
use test_aud::{
    core::MockRepoBackend,
    fixtures::{
        paged,
        repo,
    },
    memory::MemoryBackend,
};

fn memory_state() -> Arc<dyn ResourceState> {
    Arc::new(MemoryState::new(Location::new("/repos")))
}

fn sample() -> MemoryBackend {
    MemoryBackend::new(2)
        .with_repos([
            repo("r1", "Orders"),
            repo("r2", "Billing"),
            repo("r3", "Order history"),
        ])
}

#[async_std::test]
async fn identical_fetches_share_one_call() -> anyhow::Result<()> {
    let backend = Arc::new(sample());
    let cache = QueryCache::new();
    let first = ResourceManager::new(backend.clone(), memory_state(), cache.clone());
    let second = ResourceManager::new(backend.clone(), memory_state(), cache.clone());
    assert_eq!(first.query_key(), second.query_key());

    let gate = backend.hold();
    let release = async move {
        gate.send(()).ok();
    };
    let (a, b, _) = futures::join!(first.refresh(), second.refresh(), release);
    assert_eq!(a, b);
    assert_eq!(a.items().len(), 2);
    assert_eq!(backend.fetches(), 1);

    // served from the cache from now on
    first.refresh().await;
    assert_eq!(backend.fetches(), 1);
    Ok(())
}

#[async_std::test]
async fn render_page() -> anyhow::Result<()> {
    let backend = Arc::new(sample());
    let manager = ResourceManager::new(backend.clone(), memory_state(), QueryCache::new())
        .with_columns(repo_columns())
        .with_filter(SearchFilter::from_search);
    assert!(manager.view().is_loading());
    assert_eq!(manager.headers(), ["Name", "Status", "Created", "Logs"]);

    manager.state().set_page(2);
    let paged = match manager.refresh().await {
        ListView::Ready(paged) => paged,
        view => panic!("expected a page, got {view:?}"),
    };
    assert_eq!(paged.pagination.page, 2);
    assert!(paged.pagination.has_previous());
    assert_eq!(manager.render_rows(), [["Order history", "enabled", "2024-01-02 03:04", ""]]);
    Ok(())
}

#[async_std::test]
async fn search_keeps_page() -> anyhow::Result<()> {
    let backend = Arc::new(sample());
    let manager = ResourceManager::new(backend.clone(), memory_state(), QueryCache::new())
        .with_filter(SearchFilter::from_search);
    manager.state().set_page(2);
    manager.state().set_search("order");
    assert_eq!(manager.query_key(), QueryKey::new(ResourceKind::Repos, 2, "q=order"));
    let view = manager.refresh().await;
    assert!(view.items().is_empty());

    manager.state().set_page(1);
    let view = manager.refresh().await;
    assert_eq!(
        view.items().iter().map(Resource::id).collect::<Vec<_>>(),
        ["r1", "r3"],
    );
    Ok(())
}

#[async_std::test]
async fn fetch_failure() -> anyhow::Result<()> {
    let mut backend = MockRepoBackend::new();
    backend.expect_repo_fetch_page()
        .times(1)
        .returning(|_, _| Err(BackendError::Network("connection refused".into())));
    let cache = QueryCache::new();
    let manager = ResourceManager::new(Arc::new(backend), memory_state(), cache.clone());
    let view = manager.refresh().await;
    assert_eq!(
        view,
        ListView::Error("Unable to reach the server, please try again.".to_string()),
    );
    assert!(!cache.is_cached(&manager.query_key()));
    Ok(())
}

#[async_std::test]
async fn unmounted_results_are_discarded() -> anyhow::Result<()> {
    let mut backend = MockRepoBackend::new();
    backend.expect_repo_fetch_page()
        .times(1)
        .returning(|_, _| Ok(paged(vec![repo("r1", "Orders")])));
    let manager = ResourceManager::new(Arc::new(backend), memory_state(), QueryCache::new());
    manager.unmount();
    let view = manager.refresh().await;
    assert!(view.is_loading());
    assert!(manager.render_rows().is_empty());
    Ok(())
}

#[async_std::test]
async fn row_actions() -> anyhow::Result<()> {
    let history = Arc::new(MemoryHistory::new("/repos?page=2"));
    let state = resource_state(StateBacking::Url, history.clone());
    let manager = ResourceManager::new(Arc::new(sample()), state.clone(), QueryCache::new());
    let actions = manager.row_actions(&repo("r1", "Orders"));
    assert_eq!(actions, [
        RowAction::Edit("/repos?page=2&edit=r1".to_string()),
        RowAction::Delete("r1".to_string()),
    ]);
    // producing the link navigated nowhere
    assert_eq!(history.len(), 1);
    assert_eq!(state.resource_id(), None);
    Ok(())
}

#[async_std::test]
async fn walk_all_pages() -> anyhow::Result<()> {
    let backend = sample();
    let repos = fetch_all(&backend, &SearchFilter::default()).await?;
    assert_eq!(repos.len(), 3);
    assert_eq!(backend.fetches(), 2);
    Ok(())
}
