use audcore::{
    ac::{
        ForgotPassword,
        LoginForm,
        PasswordChange,
        PasswordReset,
        Session,
    },
    location::{
        NavigateOptions,
        Navigator,
    },
};
use audctrl::client::AccountApi;
use leptos::{
    ev,
    logging,
    prelude::*,
    task::spawn_local,
};
use leptos_meta::Title;
use leptos_router::{
    components::A,
    hooks::use_query_map,
};

use crate::component::{
    AppCtx,
    PermissionSummary,
    known_repos,
};

/// The outcome of the last submission of a form.
#[derive(Clone, Debug, PartialEq)]
enum Outcome {
    Done(&'static str),
    Failed(String),
}

fn outcome_view(outcome: RwSignal<Option<Outcome>>) -> impl IntoView {
    move || outcome.get().map(|outcome| match outcome {
        Outcome::Done(message) => view! { <p class="notice">{message}</p> }.into_any(),
        Outcome::Failed(message) => view! { <p class="error">{message}</p> }.into_any(),
    })
}

#[component]
pub fn SessionStatus() -> impl IntoView {
    let ctx = expect_context::<AppCtx>();
    let session = ctx.session;
    let log_out = move |_: ev::MouseEvent| {
        let api = AccountApi::new(ctx.client.clone());
        let cache = ctx.cache.clone();
        let navigator = ctx.navigator.clone();
        spawn_local(async move {
            if let Err(e) = api.log_out().await {
                logging::warn!("error logging out: {e}");
            }
            session.set(Session::Anonymous);
            // nothing listed under the previous session may be shown.
            cache.clear();
            navigator.navigate("/login", NavigateOptions { replace: true });
        });
    };
    move || match session.get() {
        Session::Authenticated(user) => view! {
            <span>"Logged in as "<A href="/account">{user.first_name}" "{user.last_name}</A></span>
            <button on:click=log_out.clone()>"Log out"</button>
        }.into_any(),
        Session::Anonymous => view! {
            <A href="/login">"Log in"</A>
        }.into_any(),
    }
}

#[component]
fn ForgotPasswordForm() -> impl IntoView {
    let client = expect_context::<AppCtx>().client;
    let email = RwSignal::new(String::new());
    let outcome = RwSignal::new(None::<Outcome>);
    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let api = AccountApi::new(client.clone());
        let form = ForgotPassword { email: email.get_untracked() };
        spawn_local(async move {
            outcome.set(Some(match api.forgot_password(&form).await {
                Ok(()) => Outcome::Done("If the address is known, a reset link has been sent."),
                Err(e) => Outcome::Failed(e.user_message()),
            }));
        });
    };
    view! {
        <form on:submit=on_submit>
            <h2>"Forgot your password?"</h2>
            {outcome_view(outcome)}
            <label>"Email"<input type="email" bind:value=email/></label>
            <button type="submit">"Send a reset link"</button>
        </form>
    }
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let ctx = expect_context::<AppCtx>();
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let outcome = RwSignal::new(None::<Outcome>);
    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let api = AccountApi::new(ctx.client.clone());
        let navigator = ctx.navigator.clone();
        let session = ctx.session;
        let form = LoginForm {
            email: email.get_untracked(),
            password: password.get_untracked(),
        };
        spawn_local(async move {
            match api.log_in(&form).await {
                Ok(user) => {
                    session.set(user.into());
                    navigator.navigate("/", NavigateOptions { replace: true });
                }
                Err(e) => outcome.set(Some(Outcome::Failed(e.user_message()))),
            }
        });
    };
    view! {
        <Title text="Log in - Auditize"/>
        <div class="main">
            <form on:submit=on_submit>
                <h1>"Log in"</h1>
                {outcome_view(outcome)}
                <label>"Email"<input type="email" bind:value=email/></label>
                <label>"Password"<input type="password" bind:value=password/></label>
                <button type="submit">"Log in"</button>
            </form>
            <ForgotPasswordForm/>
        </div>
    }
}

#[component]
fn PasswordChangeForm() -> impl IntoView {
    let client = expect_context::<AppCtx>().client;
    let password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let outcome = RwSignal::new(None::<Outcome>);
    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let api = AccountApi::new(client.clone());
        let form = PasswordChange {
            password: password.get_untracked(),
            confirm: confirm.get_untracked(),
        };
        spawn_local(async move {
            outcome.set(Some(match api.change_password(&form).await {
                Ok(()) => {
                    password.set(String::new());
                    confirm.set(String::new());
                    Outcome::Done("Your password has been changed.")
                }
                Err(e) => Outcome::Failed(e.user_message()),
            }));
        });
    };
    view! {
        <form on:submit=on_submit>
            <h2>"Change password"</h2>
            {outcome_view(outcome)}
            <label>"New password"<input type="password" bind:value=password/></label>
            <label>"Confirm"<input type="password" bind:value=confirm/></label>
            <button type="submit">"Change"</button>
        </form>
    }
}

#[component]
pub fn AccountPage() -> impl IntoView {
    let ctx = expect_context::<AppCtx>();
    let session = ctx.session;
    let client = ctx.client.clone();
    let repos = LocalResource::new(move || {
        let client = client.clone();
        let readable = session.with(Session::can_read_repos);
        async move {
            if readable {
                known_repos(client).await
            } else {
                Vec::new()
            }
        }
    });
    let summary = move || repos.get().map(|repos| view! {
        <PermissionSummary permissions=session.with(Session::permissions) repos/>
    });

    view! {
        <Title text="Account - Auditize"/>
        <div class="main">
            {move || match session.get() {
                Session::Authenticated(user) => view! {
                    <h1>{user.first_name}" "{user.last_name}</h1>
                    <p>{user.email}</p>
                    <h2>"Permissions"</h2>
                    <Transition fallback=|| ()>{summary}</Transition>
                    <PasswordChangeForm/>
                }.into_any(),
                Session::Anonymous => view! {
                    <p>"Please "<A href="/login">"log in"</A>" to see your account."</p>
                }.into_any(),
            }}
        </div>
    }
}

#[component]
pub fn ResetPasswordPage() -> impl IntoView {
    let client = expect_context::<AppCtx>().client;
    let query = use_query_map();
    let password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let outcome = RwSignal::new(None::<Outcome>);
    let on_submit = move |ev: ev::SubmitEvent| {
        ev.prevent_default();
        let api = AccountApi::new(client.clone());
        let form = PasswordReset {
            token: query.with_untracked(|q| q.get("token").map(|v| v.to_string()))
                .unwrap_or_default(),
            password: password.get_untracked(),
            confirm: confirm.get_untracked(),
        };
        spawn_local(async move {
            outcome.set(Some(match api.set_password(&form).await {
                Ok(()) => Outcome::Done("Your password has been set, you may now log in."),
                Err(e) => Outcome::Failed(e.user_message()),
            }));
        });
    };
    view! {
        <Title text="Set password - Auditize"/>
        <div class="main">
            <form on:submit=on_submit>
                <h1>"Set your password"</h1>
                {outcome_view(outcome)}
                <label>"Password"<input type="password" bind:value=password/></label>
                <label>"Confirm"<input type="password" bind:value=confirm/></label>
                <button type="submit">"Set password"</button>
            </form>
            <A href="/login">"Log in"</A>
        </div>
    }
}
