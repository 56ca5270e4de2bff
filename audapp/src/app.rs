use audcore::ac::Session;
use audctrl::{
    client::{
        AccountApi,
        ApiClient,
    },
    conf::{
        Builder,
        DEFAULT_API_URL,
    },
    query::QueryCache,
    state::StateBacking,
};
use leptos::{
    ev,
    logging,
    prelude::*,
    task::spawn_local,
};
use leptos_meta::*;
use leptos_router::{
    components::{
        A,
        Route,
        Router,
        Routes,
    },
    StaticSegment,
};
use std::sync::Arc;

use crate::{
    account::{
        AccountPage,
        LoginPage,
        ResetPasswordPage,
        SessionStatus,
    },
    component::AppCtx,
    error::AppError,
    error_template::ErrorTemplate,
    logs::LogsPage,
    manage::{
        ApikeysPage,
        ReposPage,
        UsersPage,
    },
    navigator::RouterNavigator,
};

/// The configuration of the web application, fixed at build time.
pub fn builder() -> Builder {
    let state_backing = match option_env!("AUDITIZE_STATE_BACKING") {
        Some("memory") => StateBacking::Memory,
        _ => StateBacking::Url,
    };
    Builder::new()
        .api_url(option_env!("AUDITIZE_API_URL").unwrap_or(DEFAULT_API_URL).to_string())
        .state_backing(state_backing)
        .page_size(option_env!("AUDITIZE_PAGE_SIZE").and_then(|v| v.parse().ok()))
}

#[component]
pub fn App() -> impl IntoView {
    // Provides context that manages stylesheets, titles, meta tags, etc.
    provide_meta_context();

    view! {
        <Title text="Auditize"/>
        <Router>
            <Layout/>
        </Router>
    }
}

fn failure(error: AppError) -> AnyView {
    let mut outside_errors = Errors::default();
    outside_errors.insert_with_default_key(error);
    view! { <ErrorTemplate outside_errors/> }.into_any()
}

fn provide_session(client: ApiClient) -> RwSignal<Session> {
    let session = RwSignal::new(Session::default());
    spawn_local(async move {
        match AccountApi::new(client).session().await {
            Ok(current) => session.set(current),
            Err(e) => logging::warn!("unable to restore session: {e}"),
        }
    });
    session
}

#[component]
fn Layout() -> impl IntoView {
    let builder = builder();
    let client = match builder.build() {
        Ok(client) => client,
        Err(e) => return failure(AppError::Message(e.to_string())),
    };
    let Some(navigator) = RouterNavigator::new() else {
        return failure(AppError::InternalServerError);
    };
    let navigator = Arc::new(navigator);
    let listener = navigator.clone();
    let handle = window_event_listener(ev::popstate, move |_| listener.on_popstate());
    on_cleanup(move || handle.remove());

    let session = provide_session(client.clone());
    provide_context(AppCtx {
        client,
        backing: builder.state_backing,
        cache: QueryCache::new(),
        session,
        navigator,
    });

    view! {
        <Nav/>
        <main>
            <Routes fallback=|| failure(AppError::NotFound)>
                <Route path=StaticSegment("") view=HomePage/>
                <Route path=StaticSegment("repos") view=ReposPage/>
                <Route path=StaticSegment("users") view=UsersPage/>
                <Route path=StaticSegment("apikeys") view=ApikeysPage/>
                <Route path=StaticSegment("logs") view=LogsPage/>
                <Route path=StaticSegment("account") view=AccountPage/>
                <Route path=StaticSegment("login") view=LoginPage/>
                <Route path=StaticSegment("reset-password") view=ResetPasswordPage/>
            </Routes>
        </main>
    }
    .into_any()
}

#[component]
fn Nav() -> impl IntoView {
    let session = expect_context::<AppCtx>().session;
    view! {
        <nav>
            <A href="/">"Home"</A>
            <Show when=move || session.with(Session::can_read_logs)>
                <A href="/logs">"Logs"</A>
            </Show>
            <Show when=move || session.with(Session::can_read_repos)>
                <A href="/repos">"Repositories"</A>
            </Show>
            <Show when=move || session.with(Session::can_read_users)>
                <A href="/users">"Users"</A>
            </Show>
            <Show when=move || session.with(Session::can_read_apikeys)>
                <A href="/apikeys">"API keys"</A>
            </Show>
            <div class="flex-grow"></div>
            <SessionStatus/>
        </nav>
    }
}

#[component]
fn HomePage() -> impl IntoView {
    let session = expect_context::<AppCtx>().session;
    view! {
        <div class="main">
            <h1>"Auditize"</h1>
            {move || match session.get() {
                Session::Authenticated(user) => view! {
                    <p>"Welcome back, "{user.first_name}"."</p>
                }.into_any(),
                Session::Anonymous => view! {
                    <p>"Please "<A href="/login">"log in"</A>" to continue."</p>
                }.into_any(),
            }}
        </div>
    }
}
