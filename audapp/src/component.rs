use audcore::{
    ac::Session,
    error::Error,
    pagination::PagePaginationInfo,
    permission::{
        Permissions,
        PermissionScope,
        ReadWritePermissions,
    },
    resource::SearchFilter,
};
use audctrl::{
    client::{
        ApiClient,
        RepoApi,
    },
    flow::FlowState,
    listing::fetch_all,
    query::QueryCache,
    state::StateBacking,
};
use leptos::{
    logging,
    prelude::*,
};
use std::sync::Arc;

use crate::navigator::RouterNavigator;

/// Shared by every page of the application.
#[derive(Clone)]
pub struct AppCtx {
    pub client: ApiClient,
    pub backing: StateBacking,
    pub cache: QueryCache,
    pub session: RwSignal<Session>,
    pub navigator: Arc<RouterNavigator>,
}

/// Every repository as (id, name) pairs, for the permission views.
pub async fn known_repos(client: ApiClient) -> Vec<(String, String)> {
    match fetch_all(&RepoApi::new(client), &SearchFilter::default()).await {
        Ok(repos) => repos.into_iter()
            .map(|repo| (repo.id, repo.name))
            .collect(),
        Err(e) => {
            logging::warn!("unable to list repositories: {e}");
            Vec::new()
        }
    }
}

/// Stands in for a page the current session may not see.
#[component]
pub fn Forbidden() -> impl IntoView {
    view! {
        <div class="main">
            <p>"You are not allowed to view this page."</p>
        </div>
    }
}

#[component]
pub fn Pager(
    pagination: PagePaginationInfo,
    #[prop(into)] on_page: Callback<u32>,
) -> impl IntoView {
    let current = pagination.page;
    view! {
        <div class="pager">
            {pagination.pages()
                .map(|page| view! {
                    <button
                        class:active={page == current}
                        disabled={page == current}
                        on:click=move |_| on_page.run(page)
                    >{page}</button>
                })
                .collect_view()}
        </div>
    }
}

/// The message of the flow error, if any, with the offending field
/// errors listed separately.
#[component]
pub fn FlowMessage(state: FlowState) -> impl IntoView {
    state.error().map(|error| match error {
        Error::Validation(errors) => view! {
            <ul class="error">
                {errors.0.iter()
                    .map(|e| view! { <li>{e.message.clone()}</li> })
                    .collect_view()}
            </ul>
        }.into_any(),
        e => view! { <p class="error">{e.user_message()}</p> }.into_any(),
    })
}

fn flags(rw: ReadWritePermissions) -> &'static str {
    match (rw.read, rw.write) {
        (true, true) => "read, write",
        (true, false) => "read",
        (false, true) => "write",
        (false, false) => "none",
    }
}

fn scope(scope: PermissionScope) -> String {
    match scope {
        PermissionScope::Partial => "some repositories".to_string(),
        scope => scope.to_string(),
    }
}

/// What a set of permissions amounts to against the known repositories,
/// given as (id, name) pairs.
#[component]
pub fn PermissionSummary(
    permissions: Permissions,
    repos: Vec<(String, String)>,
) -> impl IntoView {
    let applicable = permissions.applicable(repos.iter().map(|(id, _)| id.as_str()));
    let management = applicable.management;
    let overrides = repos.into_iter()
        .filter_map(|(id, name)| {
            let rw = permissions.repo_log_permissions(&id);
            (!applicable.is_superadmin && !rw.is_empty()).then(|| view! {
                <li>{name}": "{flags(rw)}</li>
            })
        })
        .collect_view();
    view! {
        <dl class="permissions">
            <dt>"Superadmin"</dt>
            <dd>{if applicable.is_superadmin { "yes" } else { "no" }}</dd>
            <dt>"Logs read"</dt>
            <dd>{scope(applicable.logs.read)}</dd>
            <dt>"Logs write"</dt>
            <dd>{scope(applicable.logs.write)}</dd>
            <dt>"Repository logs"</dt>
            <dd><ul>{overrides}</ul></dd>
            <dt>"Repositories"</dt>
            <dd>{flags(management.repos)}</dd>
            <dt>"Users"</dt>
            <dd>{flags(management.users)}</dd>
            <dt>"API keys"</dt>
            <dd>{flags(management.apikeys)}</dd>
        </dl>
    }
}
