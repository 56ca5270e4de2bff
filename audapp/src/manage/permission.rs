use audcore::{
    ac::Session,
    permission::{
        Permissions,
        ReadWritePermissions,
    },
};
use leptos::prelude::*;

use crate::component::{
    AppCtx,
    PermissionSummary,
    known_repos,
};

/// Whether the session may hand out the grant built by `set` from
/// nothing.
fn grantable(session: &Session, set: impl FnOnce(&mut Permissions)) -> bool {
    let mut grant = Permissions::default();
    set(&mut grant);
    session.can_grant(&grant)
}

fn checkbox(
    label: &'static str,
    permissions: RwSignal<Permissions>,
    get: fn(&Permissions) -> bool,
    set: fn(&mut Permissions, bool),
) -> impl IntoView {
    let session = expect_context::<AppCtx>().session;
    view! {
        <label>
            <input
                type="checkbox"
                prop:checked=move || permissions.with(get)
                on:change=move |ev| {
                    let checked = event_target_checked(&ev);
                    permissions.update(|p| set(p, checked));
                }
                disabled=move || !session.with(|s| grantable(s, |p| set(p, true)))
            />
            {label}
        </label>
    }
}

fn repo_checkbox(
    permissions: RwSignal<Permissions>,
    repo_id: String,
    write: bool,
) -> impl IntoView {
    let session = expect_context::<AppCtx>().session;
    let allowed = {
        let repo_id = repo_id.clone();
        move || session.with(|s| grantable(s, |p| p.set_repo_log_permissions(
            repo_id.clone(),
            ReadWritePermissions::new(!write, write),
        )))
    };
    let id = repo_id.clone();
    let granted = move |p: &Permissions| {
        let rw = p.logs.repos.get(&id).copied().unwrap_or_default();
        if write { rw.write } else { rw.read }
    };
    view! {
        <input
            type="checkbox"
            prop:checked=move || permissions.with(&granted)
            on:change=move |ev| {
                let checked = event_target_checked(&ev);
                permissions.update(|p| {
                    let rw = p.logs.repos.get(&repo_id).copied().unwrap_or_default();
                    let rw = if write {
                        ReadWritePermissions::new(rw.read, checked)
                    } else {
                        ReadWritePermissions::new(checked, rw.write)
                    };
                    p.set_repo_log_permissions(repo_id.clone(), rw);
                });
            }
            disabled=move || permissions.with(|p| p.is_superadmin) || !allowed()
        />
    }
}

/// Edits the permissions held by the signal; the summary below reflects
/// what they amount to.  Flags the current session does not hold itself
/// cannot be changed.
#[component]
pub fn PermissionsEditor(permissions: RwSignal<Permissions>) -> impl IntoView {
    let client = expect_context::<AppCtx>().client;
    let repos = LocalResource::new(move || known_repos(client.clone()));

    let overrides = move || repos.get().map(|repos| repos.into_iter()
        .map(|(id, name)| view! {
            <tr>
                <td>{name}</td>
                <td>{repo_checkbox(permissions, id.clone(), false)}</td>
                <td>{repo_checkbox(permissions, id, true)}</td>
            </tr>
        })
        .collect_view());
    let summary = move || repos.get().map(|repos| view! {
        <PermissionSummary permissions=permissions.get() repos/>
    });

    view! {
        <fieldset class="permissions">
            <legend>"Permissions"</legend>
            {checkbox("Superadmin", permissions, |p| p.is_superadmin, |p, v| p.is_superadmin = v)}
            <h4>"Logs"</h4>
            {checkbox("Read", permissions, |p| p.logs.read, |p, v| p.logs.read = v)}
            {checkbox("Write", permissions, |p| p.logs.write, |p, v| p.logs.write = v)}
            <table>
                <thead><tr><th>"Repository"</th><th>"Read"</th><th>"Write"</th></tr></thead>
                <tbody>
                    <Transition fallback=|| ()>{overrides}</Transition>
                </tbody>
            </table>
            <h4>"Management"</h4>
            {checkbox("Read repositories", permissions,
                |p| p.management.repos.read, |p, v| p.management.repos.read = v)}
            {checkbox("Write repositories", permissions,
                |p| p.management.repos.write, |p, v| p.management.repos.write = v)}
            {checkbox("Read users", permissions,
                |p| p.management.users.read, |p, v| p.management.users.read = v)}
            {checkbox("Write users", permissions,
                |p| p.management.users.write, |p, v| p.management.users.write = v)}
            {checkbox("Read API keys", permissions,
                |p| p.management.apikeys.read, |p, v| p.management.apikeys.read = v)}
            {checkbox("Write API keys", permissions,
                |p| p.management.apikeys.write, |p, v| p.management.apikeys.write = v)}
            <Transition fallback=|| ()>{summary}</Transition>
        </fieldset>
    }
}

#[cfg(test)]
mod test {
    use audcore::{
        ac::{
            CurrentUser,
            Session,
        },
        permission::{
            Permissions,
            ReadWritePermissions,
        },
    };

    use super::grantable;

    fn authenticated(permissions: Permissions) -> Session {
        CurrentUser {
            id: "u1".into(),
            first_name: "Jane".into(),
            last_name: "Doe".into(),
            email: "jane.doe@example.net".into(),
            lang: "en".into(),
            permissions,
        }.into()
    }

    #[test]
    fn grantable_flags() {
        let mut permissions = Permissions::default();
        permissions.management.users = ReadWritePermissions::new(true, true);
        permissions.set_repo_log_permissions("r1", ReadWritePermissions::new(true, false));
        let session = authenticated(permissions);

        assert!(grantable(&session, |p| p.management.users.write = true));
        assert!(!grantable(&session, |p| p.management.repos.read = true));
        assert!(!grantable(&session, |p| p.is_superadmin = true));
        assert!(!grantable(&session, |p| p.logs.read = true));
        assert!(grantable(&session, |p| p.set_repo_log_permissions(
            "r1", ReadWritePermissions::new(true, false),
        )));
        assert!(!grantable(&session, |p| p.set_repo_log_permissions(
            "r1", ReadWritePermissions::new(false, true),
        )));
        assert!(!grantable(&session, |p| p.set_repo_log_permissions(
            "r2", ReadWritePermissions::new(true, false),
        )));

        assert!(!grantable(&Session::Anonymous, |p| p.logs.read = true));
        let superadmin = authenticated(Permissions::superadmin());
        assert!(grantable(&superadmin, |p| p.is_superadmin = true));
    }
}
