use audcore::{
    ac::Session,
    repo::{
        Repo,
        RepoCreation,
        RepoStatus,
        RepoUpdate,
    },
};
use audctrl::{
    client::RepoApi,
    listing::columns::repo_columns,
};
use leptos::{
    ev,
    logging,
    prelude::*,
};
use leptos_meta::Title;
use leptos_router::components::A;

use crate::component::{
    AppCtx,
    Forbidden,
};
use super::{
    Screen,
    screen_view,
};

const STATUSES: [RepoStatus; 3] = [
    RepoStatus::Enabled,
    RepoStatus::Readonly,
    RepoStatus::Disabled,
];

fn status_select(status: RwSignal<RepoStatus>) -> impl IntoView {
    view! {
        <select on:change=move |ev| match event_target_value(&ev).parse() {
            Ok(value) => status.set(value),
            Err(e) => logging::warn!("{e}"),
        }>
            {STATUSES.into_iter()
                .map(|value| view! {
                    <option
                        value=value.to_string()
                        selected=move || status.get() == value
                    >{value.to_string()}</option>
                })
                .collect_view()}
        </select>
    }
}

fn create_form(screen: Screen<RepoApi>) -> AnyView {
    let draft = screen.create.draft().unwrap_or_default();
    let name = RwSignal::new(draft.name);
    let status = RwSignal::new(draft.status);
    view! {
        <form on:submit=move |ev: ev::SubmitEvent| {
            ev.prevent_default();
            let payload = RepoCreation {
                name: name.get_untracked(),
                status: status.get_untracked(),
            };
            screen.submit_create(payload, |created| logging::log!("created repo {}", created.id));
        }>
            <h2>"New repository"</h2>
            <label>"Name"<input type="text" bind:value=name/></label>
            <label>"Status"{status_select(status)}</label>
            <button type="submit">"Create"</button>
        </form>
    }.into_any()
}

fn edit_form(screen: Screen<RepoApi>, repo: Repo) -> AnyView {
    let draft = screen.edit.draft().unwrap_or_else(|| RepoUpdate::from(&repo));
    let name = RwSignal::new(draft.name.unwrap_or_else(|| repo.name.clone()));
    let status = RwSignal::new(draft.status.unwrap_or(repo.status));
    let stats = repo.stats.map(|stats| view! {
        <dl>
            <dt>"Logs"</dt>
            <dd>{stats.log_count}</dd>
            <dt>"First log"</dt>
            <dd>{stats.first_log_date.map(|d| d.format("%Y-%m-%d %H:%M").to_string())}</dd>
            <dt>"Last log"</dt>
            <dd>{stats.last_log_date.map(|d| d.format("%Y-%m-%d %H:%M").to_string())}</dd>
        </dl>
    });
    view! {
        <form on:submit=move |ev: ev::SubmitEvent| {
            ev.prevent_default();
            screen.submit_edit(RepoUpdate {
                name: Some(name.get_untracked()),
                status: Some(status.get_untracked()),
            });
        }>
            <h2>"Repository "{repo.name}</h2>
            {stats}
            <A href=format!("/logs?repo={}", repo.id)>"View logs"</A>
            <label>"Name"<input type="text" bind:value=name/></label>
            <label>"Status"{status_select(status)}</label>
            <button type="submit">"Save"</button>
        </form>
    }.into_any()
}

#[component]
fn RepoScreen() -> impl IntoView {
    let client = expect_context::<AppCtx>().client;
    let screen = Screen::new(RepoApi::new(client), repo_columns());
    screen_view("Repositories", screen, Session::can_write_repos, create_form, edit_form)
}

#[component]
pub fn ReposPage() -> impl IntoView {
    let session = expect_context::<AppCtx>().session;
    view! {
        <Title text="Repositories - Auditize"/>
        <Show
            when=move || session.with(Session::can_read_repos)
            fallback=|| view! { <Forbidden/> }
        >
            <RepoScreen/>
        </Show>
    }
}
