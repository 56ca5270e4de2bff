use audcore::{
    ac::Session,
    apikey::{
        Apikey,
        ApikeyCreation,
        ApikeySecret,
        ApikeyUpdate,
    },
};
use audctrl::{
    client::ApikeyApi,
    listing::columns::apikey_columns,
};
use leptos::{
    ev,
    logging,
    prelude::*,
    task::spawn_local,
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

fn create_form(
    screen: Screen<ApikeyApi>,
    secret: RwSignal<Option<ApikeySecret>>,
) -> AnyView {
    let draft = screen.create.draft().unwrap_or_default();
    let name = RwSignal::new(draft.name);
    let permissions = RwSignal::new(draft.permissions);
    view! {
        <form on:submit=move |ev: ev::SubmitEvent| {
            ev.prevent_default();
            let payload = ApikeyCreation {
                name: name.get_untracked(),
                permissions: permissions.get_untracked(),
            };
            screen.submit_create(payload, move |created| secret.set(Some(created)));
        }>
            <h2>"New API key"</h2>
            <label>"Name"<input type="text" bind:value=name/></label>
            <PermissionsEditor permissions/>
            <button type="submit">"Create"</button>
        </form>
    }.into_any()
}

fn edit_form(
    screen: Screen<ApikeyApi>,
    apikey: Apikey,
    secret: RwSignal<Option<ApikeySecret>>,
) -> AnyView {
    let draft = screen.edit.draft().unwrap_or_else(|| ApikeyUpdate::from(&apikey));
    let name = RwSignal::new(draft.name.unwrap_or_else(|| apikey.name.clone()));
    let permissions = RwSignal::new(draft.permissions.unwrap_or_else(|| apikey.permissions.clone()));
    let backend = screen.manager.backend().clone();
    let id = apikey.id.clone();
    let regenerate = move |_: ev::MouseEvent| {
        let backend = backend.clone();
        let id = id.clone();
        spawn_local(async move {
            match backend.regenerate_key(&id).await {
                Ok(key) => secret.set(Some(key)),
                Err(e) => logging::warn!("unable to regenerate key for {id}: {e}"),
            }
        });
    };
    view! {
        <form on:submit=move |ev: ev::SubmitEvent| {
            ev.prevent_default();
            screen.submit_edit(ApikeyUpdate {
                name: Some(name.get_untracked()),
                permissions: Some(permissions.get_untracked()),
            });
        }>
            <h2>"API key "{apikey.name}</h2>
            <button type="button" on:click=regenerate>"Regenerate key"</button>
            <label>"Name"<input type="text" bind:value=name/></label>
            <PermissionsEditor permissions/>
            <button type="submit">"Save"</button>
        </form>
    }.into_any()
}

#[component]
fn ApikeyScreen() -> impl IntoView {
    let client = expect_context::<AppCtx>().client;
    let screen = Screen::new(ApikeyApi::new(client), apikey_columns());
    let secret = RwSignal::new(None::<ApikeySecret>);
    let notice = move || secret.get().map(|ApikeySecret { key, .. }| view! {
        <div class="notice">
            <p>"The secret of the API key is shown only once, copy it now:"</p>
            <code>{key}</code>
            <button on:click=move |_| secret.set(None)>"Done"</button>
        </div>
    });
    view! {
        {notice}
        {screen_view(
            "API keys",
            screen,
            Session::can_write_apikeys,
            move |screen| create_form(screen, secret),
            move |screen, apikey| edit_form(screen, apikey, secret),
        )}
    }
}

#[component]
pub fn ApikeysPage() -> impl IntoView {
    let session = expect_context::<AppCtx>().session;
    view! {
        <Title text="API keys - Auditize"/>
        <Show
            when=move || session.with(Session::can_read_apikeys)
            fallback=|| view! { <Forbidden/> }
        >
            <ApikeyScreen/>
        </Show>
    }
}
