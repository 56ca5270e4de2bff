//! The management screens.
//!
//! Every screen is a list with its create, edit and delete modals, all
//! driven by a [`Screen`].  The list and the modals are derived from the
//! resource management state and the flows; changes made through them,
//! navigation and invalidations of the listed kind all bump the screen's
//! version so whatever was derived is computed again.

use audcore::{
    ac::Session,
    resource::{
        SearchFilter,
        traits::MutationBackend,
    },
    validate::Validate,
};
use audctrl::{
    error::FlowError,
    flow::{
        CreateFlow,
        DeleteFlow,
        EditFlow,
        FlowState,
    },
    listing::{
        Column,
        ListView,
        ResourceManager,
        RowAction,
    },
    state::resource_state,
};
use leptos::{
    logging,
    prelude::*,
    task::spawn_local,
};
use leptos_router::hooks::use_location;
use std::sync::Arc;

use crate::component::{
    AppCtx,
    FlowMessage,
    Pager,
};

mod apikey;
mod permission;
mod repo;
mod user;

pub use apikey::ApikeysPage;
pub use repo::ReposPage;
pub use user::UsersPage;

pub struct Screen<B: MutationBackend> {
    pub manager: Arc<ResourceManager<B>>,
    pub create: Arc<CreateFlow<B>>,
    pub edit: Arc<EditFlow<B>>,
    pub delete: Arc<DeleteFlow<B>>,
    version: RwSignal<usize>,
    search: Memo<String>,
}

impl<B: MutationBackend> Clone for Screen<B> {
    fn clone(&self) -> Self {
        Self {
            manager: self.manager.clone(),
            create: self.create.clone(),
            edit: self.edit.clone(),
            delete: self.delete.clone(),
            version: self.version,
            search: self.search,
        }
    }
}

fn report(result: Result<(), FlowError>) {
    if let Err(e) = result {
        logging::warn!("{e}");
    }
}

impl<B> Screen<B>
where
    B: MutationBackend<Filter = SearchFilter> + 'static,
    B::Create: Validate,
    B::Update: Validate,
{
    pub fn new(backend: B, columns: Vec<Column<B::Resource>>) -> Self {
        let ctx = expect_context::<AppCtx>();
        let state = resource_state(ctx.backing, ctx.navigator.clone());
        let manager = ResourceManager::new(Arc::new(backend), state, ctx.cache.clone())
            .with_columns(columns)
            .with_filter(SearchFilter::from_search);
        let manager = Arc::new(manager);

        let version = RwSignal::new(0usize);
        let kind = manager.backend().kind();
        let subscription = ctx.cache.subscribe(move |invalidated| {
            if invalidated == kind {
                version.update(|v| *v += 1);
            }
        });
        let unmount = manager.clone();
        on_cleanup(move || {
            unmount.unmount();
            drop(subscription);
        });

        Self {
            create: Arc::new(manager.create_flow()),
            edit: Arc::new(manager.edit_flow()),
            delete: Arc::new(manager.delete_flow()),
            manager,
            version,
            search: use_location().search,
        }
    }

    fn touch(&self) {
        self.version.update(|v| *v += 1);
    }

    fn track(&self) {
        self.search.track();
        self.version.track();
    }

    /// Bring the flows in line with the modal named by the state, which
    /// may have been changed by navigation.
    fn sync(&self) {
        let state = self.manager.state();
        match (state.is_new(), self.create.state()) {
            (true, FlowState::Closed) => report(self.create.open()),
            (false, FlowState::Open { .. }) => report(self.create.close()),
            _ => (),
        }
        match state.resource_id() {
            Some(id) if self.edit.target().as_deref() != Some(id.as_str()) => {
                let screen = self.clone();
                spawn_local(async move {
                    report(screen.edit.open(&id).await);
                    screen.touch();
                });
            }
            None => match self.edit.state() {
                FlowState::Closed | FlowState::Submitting => (),
                _ => report(self.edit.close()),
            },
            _ => (),
        }
    }

    pub fn set_page(&self, page: u32) {
        self.manager.state().set_page(page);
        self.touch();
    }

    pub fn set_search(&self, text: &str) {
        self.manager.state().set_search(text.trim());
        self.touch();
    }

    pub fn open_create(&self) {
        report(self.create.open());
        self.touch();
    }

    pub fn close_create(&self) {
        report(self.create.close());
        self.touch();
    }

    pub fn submit_create(
        &self,
        payload: B::Create,
        on_created: impl FnOnce(B::Created) + 'static,
    ) {
        let screen = self.clone();
        spawn_local(async move {
            match screen.create.submit(payload).await {
                Ok(Some(created)) => on_created(created),
                Ok(None) => (),
                Err(e) => logging::warn!("{e}"),
            }
            screen.touch();
        });
        self.touch();
    }

    pub fn follow(&self, link: &str) {
        self.manager.state().follow_link(link);
        self.touch();
    }

    pub fn close_edit(&self) {
        report(self.edit.close());
        self.touch();
    }

    pub fn submit_edit(&self, patch: B::Update) {
        let screen = self.clone();
        spawn_local(async move {
            if let Err(e) = screen.edit.submit(patch).await {
                logging::warn!("{e}");
            }
            screen.touch();
        });
        self.touch();
    }

    pub fn open_delete(&self, item: &B::Resource) {
        report(self.delete.open(item));
        self.touch();
    }

    pub fn cancel_delete(&self) {
        report(self.delete.cancel());
        self.touch();
    }

    pub fn confirm_delete(&self) {
        let screen = self.clone();
        spawn_local(async move {
            if let Err(e) = screen.delete.confirm().await {
                logging::warn!("{e}");
            }
            screen.touch();
        });
        self.touch();
    }
}

/// The list with its search box, pager and row actions, followed by the
/// modals.  `create_form` and `edit_form` render the fields of the
/// respective modals.
pub fn screen_view<B>(
    title: &'static str,
    screen: Screen<B>,
    writable: fn(&Session) -> bool,
    create_form: impl Fn(Screen<B>) -> AnyView + Send + Sync + 'static,
    edit_form: impl Fn(Screen<B>, B::Resource) -> AnyView + Send + Sync + 'static,
) -> impl IntoView
where
    B: MutationBackend<Filter = SearchFilter> + 'static,
    B::Create: Validate,
    B::Update: Validate,
{
    let session = expect_context::<AppCtx>().session;
    let writable = move || session.with(writable);

    let sync = screen.clone();
    Effect::new(move |_| {
        sync.track();
        sync.sync();
    });

    let fetch = screen.clone();
    let list = LocalResource::new(move || {
        fetch.track();
        let manager = fetch.manager.clone();
        async move { manager.refresh().await }
    });

    let headers = screen.manager.headers()
        .into_iter()
        .map(|header| view! { <th>{header.to_string()}</th> })
        .collect_view();
    let search = screen.clone();
    let search_value = screen.clone();
    let add = screen.clone();
    let rows = screen.clone();

    view! {
        <div class="main">
            <h1>{title}</h1>
            <div class="toolbar">
                <input
                    type="search"
                    placeholder="Search"
                    prop:value=move || {
                        search_value.track();
                        search_value.manager.state().search()
                    }
                    on:change=move |ev| search.set_search(&event_target_value(&ev))
                />
                <Show when=writable>
                    <button on:click={
                        let add = add.clone();
                        move |_| add.open_create()
                    }>"Add"</button>
                </Show>
            </div>
            <table>
                <thead><tr>{headers}<th></th></tr></thead>
                <Transition fallback=|| view! { <tbody></tbody> }>
                    {move || list.get().map(|view| rows_view(&rows, view, writable()))}
                </Transition>
            </table>
            {create_modal(screen.clone(), create_form)}
            {edit_modal(screen.clone(), edit_form)}
            {delete_modal(screen)}
        </div>
    }
}

fn rows_view<B>(
    screen: &Screen<B>,
    view: ListView<B::Resource>,
    writable: bool,
) -> AnyView
where
    B: MutationBackend<Filter = SearchFilter> + 'static,
    B::Create: Validate,
    B::Update: Validate,
{
    let paged = match view {
        ListView::Loading => return view! {
            <tbody><tr><td>"Loading..."</td></tr></tbody>
        }.into_any(),
        ListView::Error(message) => return view! {
            <tbody><tr><td class="error">{message}</td></tr></tbody>
        }.into_any(),
        ListView::Ready(paged) => paged,
    };
    let pager = screen.clone();
    let rows = paged.items
        .into_iter()
        .map(|item| {
            let cells = screen.manager.render_row(&item)
                .into_iter()
                .map(|cell| view! { <td>{cell}</td> })
                .collect_view();
            let actions = writable.then(|| screen.manager.row_actions(&item)
                .into_iter()
                .map(|action| match action {
                    RowAction::Edit(link) => {
                        let screen = screen.clone();
                        view! {
                            <button on:click=move |_| screen.follow(&link)>"Edit"</button>
                        }.into_any()
                    }
                    RowAction::Delete(_) => {
                        let screen = screen.clone();
                        let item = item.clone();
                        view! {
                            <button on:click=move |_| screen.open_delete(&item)>"Delete"</button>
                        }.into_any()
                    }
                })
                .collect_view());
            view! {
                <tr>{cells}<td class="actions">{actions}</td></tr>
            }
        })
        .collect_view();
    view! {
        <tbody>{rows}</tbody>
        <tfoot><tr><td>
            <Pager
                pagination=paged.pagination
                on_page=move |page| pager.set_page(page)
            />
        </td></tr></tfoot>
    }.into_any()
}

fn create_modal<B>(
    screen: Screen<B>,
    form: impl Fn(Screen<B>) -> AnyView + Send + Sync + 'static,
) -> impl IntoView
where
    B: MutationBackend<Filter = SearchFilter> + 'static,
    B::Create: Validate,
    B::Update: Validate,
{
    move || {
        screen.track();
        let state = screen.create.state();
        (state != FlowState::Closed).then(|| {
            let close = screen.clone();
            view! {
                <div class="modal">
                    <FlowMessage state/>
                    {form(screen.clone())}
                    <button on:click=move |_| close.close_create()>"Cancel"</button>
                </div>
            }
        })
    }
}

fn edit_modal<B>(
    screen: Screen<B>,
    form: impl Fn(Screen<B>, B::Resource) -> AnyView + Send + Sync + 'static,
) -> impl IntoView
where
    B: MutationBackend<Filter = SearchFilter> + 'static,
    B::Create: Validate,
    B::Update: Validate,
{
    move || {
        screen.track();
        let close = screen.clone();
        let body = match screen.edit.state() {
            FlowState::Closed => return None,
            FlowState::Loading => view! { <p>"Loading..."</p> }.into_any(),
            FlowState::NotFound => view! {
                <p>"This item does not exist anymore."</p>
            }.into_any(),
            state => {
                let fields = screen.edit.form()
                    .map(|resource| form(screen.clone(), resource));
                view! {
                    <FlowMessage state/>
                    {fields}
                }.into_any()
            }
        };
        Some(view! {
            <div class="modal">
                {body}
                <button on:click=move |_| close.close_edit()>"Close"</button>
            </div>
        })
    }
}

fn delete_modal<B>(screen: Screen<B>) -> impl IntoView
where
    B: MutationBackend<Filter = SearchFilter> + 'static,
    B::Create: Validate,
    B::Update: Validate,
{
    move || {
        screen.track();
        let state = screen.delete.state();
        (state != FlowState::Closed).then(|| {
            let submitting = state == FlowState::Submitting;
            let label = screen.delete.target_label().unwrap_or_default();
            let confirm = screen.clone();
            let cancel = screen.clone();
            view! {
                <div class="modal">
                    <p>"Do you confirm the deletion of "<strong>{label}</strong>"?"</p>
                    <FlowMessage state/>
                    <button
                        disabled=submitting
                        on:click=move |_| confirm.confirm_delete()
                    >"Delete"</button>
                    <button
                        disabled=submitting
                        on:click=move |_| cancel.cancel_delete()
                    >"Cancel"</button>
                </div>
            }
        })
    }
}
