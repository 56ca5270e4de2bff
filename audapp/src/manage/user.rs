use audcore::{
    ac::Session,
    user::{
        User,
        UserCreation,
        UserUpdate,
    },
};
use audctrl::{
    client::UserApi,
    listing::columns::user_columns,
};
use leptos::{
    ev,
    prelude::*,
};
use leptos_meta::Title;

use crate::component::{
    AppCtx,
    Forbidden,
};
use super::{
    Screen,
    permission::PermissionsEditor,
    screen_view,
};

const LANGS: [(&str, &str); 2] = [
    ("en", "English"),
    ("fr", "Français"),
];

fn lang_select(lang: RwSignal<String>) -> impl IntoView {
    view! {
        <select on:change=move |ev| lang.set(event_target_value(&ev))>
            {LANGS.into_iter()
                .map(|(code, name)| view! {
                    <option value=code selected=move || lang.with(|l| l == code)>{name}</option>
                })
                .collect_view()}
        </select>
    }
}

fn create_form(screen: Screen<UserApi>) -> AnyView {
    let draft = screen.create.draft().unwrap_or_default();
    let first_name = RwSignal::new(draft.first_name);
    let last_name = RwSignal::new(draft.last_name);
    let email = RwSignal::new(draft.email);
    let lang = RwSignal::new(draft.lang);
    let permissions = RwSignal::new(draft.permissions);
    view! {
        <form on:submit=move |ev: ev::SubmitEvent| {
            ev.prevent_default();
            let payload = UserCreation {
                first_name: first_name.get_untracked(),
                last_name: last_name.get_untracked(),
                email: email.get_untracked(),
                lang: lang.get_untracked(),
                permissions: permissions.get_untracked(),
            };
            screen.submit_create(payload, |_| ());
        }>
            <h2>"New user"</h2>
            <label>"First name"<input type="text" bind:value=first_name/></label>
            <label>"Last name"<input type="text" bind:value=last_name/></label>
            <label>"Email"<input type="email" bind:value=email/></label>
            <label>"Language"{lang_select(lang)}</label>
            <PermissionsEditor permissions/>
            <button type="submit">"Create"</button>
        </form>
    }.into_any()
}

fn edit_form(screen: Screen<UserApi>, user: User) -> AnyView {
    let draft = screen.edit.draft().unwrap_or_else(|| UserUpdate::from(&user));
    let first_name = RwSignal::new(draft.first_name.unwrap_or_else(|| user.first_name.clone()));
    let last_name = RwSignal::new(draft.last_name.unwrap_or_else(|| user.last_name.clone()));
    let email = RwSignal::new(draft.email.unwrap_or_else(|| user.email.clone()));
    let lang = RwSignal::new(draft.lang.unwrap_or_else(|| user.lang.clone()));
    let permissions = RwSignal::new(draft.permissions.unwrap_or_else(|| user.permissions.clone()));
    let last_login = user.authenticated_at
        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "never".to_string());
    view! {
        <form on:submit=move |ev: ev::SubmitEvent| {
            ev.prevent_default();
            screen.submit_edit(UserUpdate {
                first_name: Some(first_name.get_untracked()),
                last_name: Some(last_name.get_untracked()),
                email: Some(email.get_untracked()),
                lang: Some(lang.get_untracked()),
                permissions: Some(permissions.get_untracked()),
            });
        }>
            <h2>"User "{user.full_name()}</h2>
            <p>"Last login: "{last_login}</p>
            <label>"First name"<input type="text" bind:value=first_name/></label>
            <label>"Last name"<input type="text" bind:value=last_name/></label>
            <label>"Email"<input type="email" bind:value=email/></label>
            <label>"Language"{lang_select(lang)}</label>
            <PermissionsEditor permissions/>
            <button type="submit">"Save"</button>
        </form>
    }.into_any()
}

#[component]
fn UserScreen() -> impl IntoView {
    let client = expect_context::<AppCtx>().client;
    let screen = Screen::new(UserApi::new(client), user_columns());
    screen_view("Users", screen, Session::can_write_users, create_form, edit_form)
}

#[component]
pub fn UsersPage() -> impl IntoView {
    let session = expect_context::<AppCtx>().session;
    view! {
        <Title text="Users - Auditize"/>
        <Show
            when=move || session.with(Session::can_read_users)
            fallback=|| view! { <Forbidden/> }
        >
            <UserScreen/>
        </Show>
    }
}
