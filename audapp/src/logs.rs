use audcore::{
    ac::Session,
    location::{
        Location,
        NavigateOptions,
        Navigator,
    },
    logs::{
        CustomField,
        LogEntry,
        LogSearchParams,
    },
    resource::Resource,
};
use audctrl::{
    client::LogApi,
    listing::{
        ListView,
        ResourceManager,
        columns::log_columns,
    },
    state::resource_state,
};
use leptos::{
    ev,
    logging,
    prelude::*,
};
use leptos_meta::Title;
use leptos_router::hooks::{
    use_location,
    use_query_map,
};
use std::sync::Arc;

use crate::component::{
    AppCtx,
    Forbidden,
    Pager,
    known_repos,
};

const REPO_PARAM: &str = "repo";

fn fields(title: &'static str, fields: Vec<CustomField>) -> impl IntoView {
    (!fields.is_empty()).then(|| view! {
        <h4>{title}</h4>
        <dl>
            {fields.into_iter()
                .map(|CustomField { name, value }| view! { <dt>{name}</dt><dd>{value}</dd> })
                .collect_view()}
        </dl>
    })
}

fn details(entry: LogEntry) -> impl IntoView {
    view! {
        <div class="log-details">
            <h3>{entry.label()}</h3>
            {fields("Source", entry.source)}
            {fields("Details", entry.details)}
            {entry.actor.map(|actor| fields("Actor", actor.extra))}
            {entry.resource.map(|resource| fields("Resource", resource.extra))}
        </div>
    }
}

fn parse_filter(repo_id: &str, search: &str) -> LogSearchParams {
    let params = LogSearchParams::from_query(search)
        .unwrap_or_else(|e| {
            logging::warn!("ignoring invalid log filter {search:?}: {e}");
            LogSearchParams::default()
        });
    LogSearchParams {
        repo_id: repo_id.to_string(),
        .. params
    }
}

#[component]
fn LogFilter(
    manager: Arc<ResourceManager<LogApi>>,
    version: RwSignal<usize>,
) -> impl IntoView {
    let current = LogSearchParams::from_query(&manager.state().search())
        .unwrap_or_default();
    let actor_name = RwSignal::new(current.actor_name.unwrap_or_default());
    let action_type = RwSignal::new(current.action_type.unwrap_or_default());
    let resource_name = RwSignal::new(current.resource_name.unwrap_or_default());
    let tag_ref = RwSignal::new(current.tag_ref.unwrap_or_default());
    let value = |signal: RwSignal<String>| {
        Some(signal.get_untracked()).filter(|v| !v.trim().is_empty())
    };

    view! {
        <form class="filter" on:submit=move |ev: ev::SubmitEvent| {
            ev.prevent_default();
            let params = LogSearchParams {
                actor_name: value(actor_name),
                action_type: value(action_type),
                resource_name: value(resource_name),
                tag_ref: value(tag_ref),
                .. LogSearchParams::default()
            };
            match params.to_query() {
                Ok(query) => {
                    manager.state().set_page(1);
                    manager.state().set_search(&query);
                    version.update(|v| *v += 1);
                }
                Err(e) => logging::warn!("unable to encode log filter: {e}"),
            }
        }>
            <input type="text" placeholder="Actor" bind:value=actor_name/>
            <input type="text" placeholder="Action" bind:value=action_type/>
            <input type="text" placeholder="Resource" bind:value=resource_name/>
            <input type="text" placeholder="Tag" bind:value=tag_ref/>
            <button type="submit">"Filter"</button>
        </form>
    }
}

#[component]
fn LogScreen(repo_id: String) -> impl IntoView {
    let ctx = expect_context::<AppCtx>();
    let state = resource_state(ctx.backing, ctx.navigator.clone());
    let filter_repo = repo_id.clone();
    let manager = ResourceManager::new(
        Arc::new(LogApi::new(ctx.client.clone(), repo_id)),
        state,
        ctx.cache.clone(),
    )
        .with_columns(log_columns())
        .with_filter(move |search| parse_filter(&filter_repo, search));
    let manager = Arc::new(manager);
    let unmount = manager.clone();
    on_cleanup(move || unmount.unmount());

    let version = RwSignal::new(0usize);
    let search = use_location().search;
    let fetch = manager.clone();
    let list = LocalResource::new(move || {
        search.track();
        version.track();
        let manager = fetch.clone();
        async move { manager.refresh().await }
    });
    let selected = RwSignal::new(None::<String>);

    let headers = manager.headers()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let pager = manager.clone();
    let render = manager.clone();
    let rows = move || list.get().map(|view| {
        let paged = match view {
            ListView::Loading => return view! {
                <p>"Loading..."</p>
            }.into_any(),
            ListView::Error(message) => return view! {
                <p class="error">{message}</p>
            }.into_any(),
            ListView::Ready(paged) => paged,
        };
        let shown = paged.items.iter()
            .find(|entry| selected.with(|id| id.as_deref() == Some(entry.id())))
            .cloned()
            .map(details);
        let rows = paged.items.iter()
            .map(|entry| {
                let id = entry.id().to_string();
                let cells = render.render_row(entry)
                    .into_iter()
                    .map(|cell| view! { <td>{cell}</td> })
                    .collect_view();
                view! {
                    <tr on:click=move |_| selected.set(Some(id.clone()))>{cells}</tr>
                }
            })
            .collect_view();
        let pager = pager.clone();
        view! {
            <table>
                <thead><tr>
                    {headers.iter()
                        .map(|header| view! { <th>{header.clone()}</th> })
                        .collect_view()}
                </tr></thead>
                <tbody>{rows}</tbody>
            </table>
            <Pager
                pagination=paged.pagination
                on_page=move |page| {
                    pager.state().set_page(page);
                    version.update(|v| *v += 1);
                }
            />
            {shown}
        }.into_any()
    });

    view! {
        <LogFilter manager version/>
        <Transition fallback=|| ()>{rows}</Transition>
    }
}

#[component]
pub fn LogsPage() -> impl IntoView {
    let ctx = expect_context::<AppCtx>();
    let session = ctx.session;
    let query = use_query_map();
    let repo_id = Memo::new(move |_| query.with(|q| q.get(REPO_PARAM).map(|v| v.to_string())));

    let client = ctx.client.clone();
    let repos = LocalResource::new(move || known_repos(client.clone()));
    let navigator = ctx.navigator.clone();
    let choose = move |ev: ev::Event| {
        let target = Location::new("/logs").with(REPO_PARAM, event_target_value(&ev));
        navigator.navigate(&target.to_string(), NavigateOptions::default());
    };
    let options = move || repos.get().map(|repos| {
        let permissions = session.with(Session::permissions);
        repos.into_iter()
            .filter(|(id, _)| permissions.repo_log_permissions(id).read)
            .map(|(id, name)| {
                let selected = repo_id.get().as_deref() == Some(id.as_str());
                view! { <option value=id selected=selected>{name}</option> }
            })
            .collect_view()
    });

    view! {
        <Title text="Logs - Auditize"/>
        <Show
            when=move || session.with(Session::can_read_logs)
            fallback=|| view! { <Forbidden/> }
        >
            <div class="main">
                <h1>"Logs"</h1>
                <select on:change=choose.clone()>
                    <option value="" disabled=true selected=move || repo_id.with(Option::is_none)>
                        "Select a repository"
                    </option>
                    <Transition fallback=|| ()>{options}</Transition>
                </select>
                {move || repo_id.get().map(|repo_id| view! { <LogScreen repo_id/> })}
            </div>
        </Show>
    }
}
