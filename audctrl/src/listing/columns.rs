use audcore::{
    apikey::Apikey,
    logs::LogEntry,
    repo::Repo,
    resource::Resource,
    user::User,
};
use chrono::{
    DateTime,
    Utc,
};

use super::Column;

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

fn date(value: &DateTime<Utc>) -> String {
    value.format(DATE_FORMAT).to_string()
}

pub fn repo_columns() -> Vec<Column<Repo>> {
    vec![
        Column::new("Name", |repo: &Repo| repo.name.clone()),
        Column::new("Status", |repo: &Repo| repo.status.to_string()),
        Column::new("Created", |repo: &Repo| date(&repo.created_at)),
        Column::new("Logs", |repo: &Repo| {
            repo.stats
                .as_ref()
                .map(|stats| stats.log_count.to_string())
                .unwrap_or_default()
        }),
    ]
}

pub fn user_columns() -> Vec<Column<User>> {
    vec![
        Column::new("Name", |user: &User| user.full_name()),
        Column::new("Email", |user: &User| user.email.clone()),
        Column::new("Last login", |user: &User| {
            user.authenticated_at
                .as_ref()
                .map(date)
                .unwrap_or_else(|| "never".to_string())
        }),
    ]
}

pub fn apikey_columns() -> Vec<Column<Apikey>> {
    vec![
        Column::new("Name", |apikey: &Apikey| apikey.name.clone()),
        Column::new("Created", |apikey: &Apikey| date(&apikey.created_at)),
    ]
}

pub fn log_columns() -> Vec<Column<LogEntry>> {
    vec![
        Column::new("Date", |entry: &LogEntry| date(&entry.saved_at)),
        Column::new("Actor", |entry: &LogEntry| {
            entry.actor
                .as_ref()
                .map(|actor| actor.name.clone())
                .unwrap_or_default()
        }),
        Column::new("Action", |entry: &LogEntry| entry.label()),
        Column::new("Resource", |entry: &LogEntry| {
            entry.resource
                .as_ref()
                .map(|resource| format!("{} ({})", resource.name, resource.kind))
                .unwrap_or_default()
        }),
        Column::new("Node", |entry: &LogEntry| {
            entry.node_path
                .iter()
                .map(|node| node.name.as_str())
                .collect::<Vec<_>>()
                .join(" > ")
        }),
        Column::new("Tags", |entry: &LogEntry| {
            entry.tags
                .iter()
                .map(|tag| tag.name.as_deref().unwrap_or(&tag.kind))
                .collect::<Vec<_>>()
                .join(", ")
        }),
    ]
}

#[cfg(test)]
mod test {
    use audcore::repo::{
        RepoStats,
        RepoStatus,
    };
    use super::*;

    #[test]
    fn render_repo() -> anyhow::Result<()> {
        let repo = Repo {
            id: "r1".into(),
            name: "Orders".into(),
            status: RepoStatus::Readonly,
            created_at: "2024-03-04T05:06:07Z".parse()?,
            stats: Some(RepoStats {
                log_count: 12,
                .. Default::default()
            }),
        };
        let cells = repo_columns()
            .iter()
            .map(|column| column.render(&repo))
            .collect::<Vec<_>>();
        assert_eq!(cells, ["Orders", "readonly", "2024-03-04 05:06", "12"]);
        Ok(())
    }
}
