use audcore::{
    error::{
        BackendError,
        Error,
    },
    location::{
        MemoryHistory,
        Navigator,
    },
    repo::{
        RepoCreation,
        RepoStatus,
        RepoUpdate,
    },
    resource::{
        ResourceKind,
        SearchFilter,
    },
    user::UserUpdate,
};
use audctrl::{
    error::FlowError,
    flow::FlowState,
    listing::ResourceManager,
    query::QueryCache,
    state::{
        Modal,
        ResourceState,
        StateBacking,
        resource_state,
    },
};
use std::sync::Arc;
use test_aud::{
    core::{
        MockRepoBackend,
        MockUserBackend,
    },
    fixtures::{
        repo,
        user,
    },
    memory::MemoryBackend,
};

struct Screen<B: audcore::resource::traits::MutationBackend> {
    history: Arc<MemoryHistory>,
    state: Arc<dyn ResourceState>,
    cache: QueryCache,
    manager: ResourceManager<B>,
}

fn screen<B>(backend: B, backing: StateBacking) -> Screen<B>
where
    B: audcore::resource::traits::MutationBackend<Filter = SearchFilter>,
{
    let history = Arc::new(MemoryHistory::new("/repos"));
    let state = resource_state(backing, history.clone());
    let cache = QueryCache::new();
    let manager = ResourceManager::new(Arc::new(backend), state.clone(), cache.clone());
    Screen { history, state, cache, manager }
}

fn creation(name: &str) -> RepoCreation {
    RepoCreation {
        name: name.to_string(),
        status: RepoStatus::Enabled,
    }
}

#[async_std::test]
async fn create_success() -> anyhow::Result<()> {
    let screen = screen(MemoryBackend::new(10), StateBacking::Url);
    assert!(screen.manager.refresh().await.items().is_empty());

    let flow = screen.manager.create_flow();
    flow.open()?;
    assert!(screen.state.is_new());
    assert_eq!(screen.history.len(), 2);

    let created = flow.submit(creation("Orders")).await?;
    assert_eq!(created.map(|c| c.id).as_deref(), Some("repo-1"));
    assert_eq!(flow.state(), FlowState::Closed);
    assert_eq!(flow.draft(), None);
    assert_eq!(screen.cache.invalidations(ResourceKind::Repos), 1);
    // closed by going back
    assert!(!screen.state.is_new());
    assert_eq!(screen.history.len(), 1);

    let view = screen.manager.refresh().await;
    assert_eq!(view.items(), [repo("repo-1", "Orders")]);
    Ok(())
}

#[async_std::test]
async fn open_close_does_not_invalidate() -> anyhow::Result<()> {
    for backing in [StateBacking::Url, StateBacking::Memory] {
        let backend = Arc::new(MemoryBackend::new(10));
        let history = Arc::new(MemoryHistory::new("/repos"));
        let state = resource_state(backing, history.clone());
        let cache = QueryCache::new();
        let manager = ResourceManager::new(backend.clone(), state.clone(), cache.clone());
        manager.refresh().await;
        let key = manager.query_key();

        let flow = manager.create_flow();
        flow.open()?;
        assert!(state.is_new());
        flow.close()?;
        assert_eq!(flow.state(), FlowState::Closed);
        assert_eq!(state.modal(), Modal::Closed);
        assert_eq!(manager.query_key(), key, "{backing:?}");
        assert_eq!(cache.invalidations(ResourceKind::Repos), 0, "{backing:?}");
        assert!(cache.is_cached(&key), "{backing:?}");

        manager.refresh().await;
        assert_eq!(backend.fetches(), 1, "{backing:?}");
    }
    Ok(())
}

#[async_std::test]
async fn invalid_form_is_not_sent() -> anyhow::Result<()> {
    let mut backend = MockRepoBackend::new();
    backend.expect_repo_create()
        .times(0);
    let screen = screen(backend, StateBacking::Url);
    let flow = screen.manager.create_flow();
    flow.open()?;

    assert_eq!(flow.submit(creation("  ")).await?, None);
    let state = flow.state();
    match state.error() {
        Some(Error::Validation(errors)) => assert_eq!(errors.field("name"), Some("Name is required")),
        e => panic!("expected a validation error, got {e:?}"),
    }
    assert!(state.is_open());
    assert_eq!(flow.draft(), Some(creation("  ")));
    assert!(screen.state.is_new());
    assert_eq!(screen.cache.invalidations(ResourceKind::Repos), 0);
    Ok(())
}

#[async_std::test]
async fn create_failure_keeps_form() -> anyhow::Result<()> {
    let backend = MemoryBackend::new(10);
    backend.fail_next(BackendError::from_status(409, "Repository already exists"));
    let screen = screen(backend, StateBacking::Url);
    let flow = screen.manager.create_flow();
    flow.open()?;

    assert_eq!(flow.submit(creation("Orders")).await?, None);
    assert_eq!(
        flow.state().error().map(Error::user_message).as_deref(),
        Some("Repository already exists"),
    );
    assert_eq!(flow.draft(), Some(creation("Orders")));
    assert!(screen.state.is_new());
    assert_eq!(screen.cache.invalidations(ResourceKind::Repos), 0);

    // error cleared upon reopening
    flow.open()?;
    assert_eq!(flow.state(), FlowState::Open { error: None });
    Ok(())
}

#[async_std::test]
async fn submit_requires_open() -> anyhow::Result<()> {
    let screen = screen(MemoryBackend::new(10), StateBacking::Memory);
    let flow = screen.manager.create_flow();
    assert_eq!(
        flow.submit(creation("Orders")).await,
        Err(FlowError::InvalidTransition { action: "submit", state: "closed" }),
    );
    Ok(())
}

#[async_std::test]
async fn edit_success() -> anyhow::Result<()> {
    let backend = MemoryBackend::new(10)
        .with_repos([repo("r1", "Orders")]);
    let screen = screen(backend, StateBacking::Url);
    screen.state.follow_link(&screen.state.resource_link("r1"));
    assert_eq!(screen.history.len(), 2);

    let flow = screen.manager.edit_flow();
    let id = screen.state.resource_id().expect("edit modal is open");
    assert_eq!(flow.form(), None);
    flow.open(&id).await?;
    assert_eq!(flow.form(), Some(repo("r1", "Orders")));
    assert_eq!(flow.target().as_deref(), Some("r1"));

    let patch = RepoUpdate {
        name: Some("Invoices".to_string()),
        .. RepoUpdate::default()
    };
    assert!(flow.submit(patch).await?);
    assert_eq!(flow.state(), FlowState::Closed);
    assert_eq!(flow.form(), None);
    assert_eq!(screen.cache.invalidations(ResourceKind::Repos), 1);
    assert_eq!(screen.state.resource_id(), None);
    assert_eq!(screen.history.current_location().to_string(), "/repos");

    let view = screen.manager.refresh().await;
    assert_eq!(view.items()[0].name, "Invoices");
    Ok(())
}

#[async_std::test]
async fn edit_not_found() -> anyhow::Result<()> {
    let mut backend = MockUserBackend::new();
    backend.expect_user_load()
        .times(1)
        .withf(|id: &str| id == "u404")
        .returning(|id| Err(BackendError::NotFound(id.to_string())));
    backend.expect_user_update()
        .times(0);
    let screen = screen(backend, StateBacking::Memory);
    let flow = screen.manager.edit_flow();
    flow.open("u404").await?;
    assert_eq!(flow.state(), FlowState::NotFound);
    assert_eq!(flow.form(), None);
    assert_eq!(
        flow.submit(UserUpdate::default()).await,
        Err(FlowError::InvalidTransition { action: "submit", state: "not found" }),
    );
    Ok(())
}

#[async_std::test]
async fn edit_load_failure() -> anyhow::Result<()> {
    let mut backend = MockUserBackend::new();
    backend.expect_user_load()
        .times(1)
        .returning(|_| Err(BackendError::Authorization));
    let screen = screen(backend, StateBacking::Memory);
    let flow = screen.manager.edit_flow();
    flow.open("u1").await?;
    assert_eq!(flow.form(), None);
    assert_eq!(
        flow.state(),
        FlowState::Open { error: Some(Error::Backend(BackendError::Authorization)) },
    );
    Ok(())
}

#[async_std::test]
async fn edit_failure_keeps_form() -> anyhow::Result<()> {
    let mut backend = MockUserBackend::new();
    backend.expect_user_load()
        .returning(|id| Ok(user(id, "John", "Doe")));
    backend.expect_user_update()
        .times(1)
        .returning(|_, _| Err(BackendError::Http { status: 500, message: String::new() }));
    let screen = screen(backend, StateBacking::Memory);
    let flow = screen.manager.edit_flow();
    flow.open("u1").await?;
    let patch = UserUpdate::from(&user("u1", "Jane", "Doe"));
    assert!(!flow.submit(patch.clone()).await?);
    assert_eq!(flow.form(), Some(user("u1", "John", "Doe")));
    assert_eq!(flow.draft(), Some(patch));
    assert_eq!(
        flow.state().error().map(Error::user_message).as_deref(),
        Some("The server responded with an error (500)."),
    );
    assert_eq!(screen.cache.invalidations(ResourceKind::Users), 0);
    Ok(())
}

#[async_std::test]
async fn delete_success() -> anyhow::Result<()> {
    let backend = MemoryBackend::new(10)
        .with_repos([repo("r1", "Orders"), repo("r2", "Billing")]);
    let screen = screen(backend, StateBacking::Url);
    let view = screen.manager.refresh().await;
    assert_eq!(view.items().len(), 2);

    let flow = screen.manager.delete_flow();
    flow.open(&view.items()[0])?;
    assert_eq!(flow.target_label().as_deref(), Some("Orders"));
    assert!(flow.confirm().await?);
    assert_eq!(flow.state(), FlowState::Closed);
    assert_eq!(flow.target_id(), None);
    assert_eq!(screen.cache.invalidations(ResourceKind::Repos), 1);
    // the deletion confirmation never touched the location
    assert_eq!(screen.history.len(), 1);

    let view = screen.manager.refresh().await;
    assert_eq!(view.items(), [repo("r2", "Billing")]);
    Ok(())
}

#[async_std::test]
async fn delete_failure() -> anyhow::Result<()> {
    let mut backend = MockRepoBackend::new();
    backend.expect_repo_delete()
        .times(1)
        .returning(|_| Err(BackendError::Authorization));
    let screen = screen(backend, StateBacking::Memory);
    let flow = screen.manager.delete_flow();
    assert_eq!(
        flow.confirm().await,
        Err(FlowError::InvalidTransition { action: "confirm", state: "closed" }),
    );
    flow.open(&repo("r1", "Orders"))?;
    assert!(!flow.confirm().await?);
    assert_eq!(
        flow.state().error().map(Error::user_message).as_deref(),
        Some("You are not allowed to perform this action."),
    );
    assert_eq!(flow.target_id().as_deref(), Some("r1"));
    assert_eq!(screen.cache.invalidations(ResourceKind::Repos), 0);
    flow.cancel()?;
    assert_eq!(flow.state(), FlowState::Closed);
    Ok(())
}
