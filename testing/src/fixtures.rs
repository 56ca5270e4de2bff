use audcore::{
    pagination::{
        PagePaginationInfo,
        Paged,
    },
    permission::Permissions,
    repo::{
        Repo,
        RepoStatus,
    },
    user::{
        DEFAULT_LANG,
        User,
    },
};
use chrono::{
    DateTime,
    TimeZone,
    Utc,
};

pub fn date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
        .single()
        .unwrap_or_default()
}

pub fn repo(id: &str, name: &str) -> Repo {
    Repo {
        id: id.to_string(),
        name: name.to_string(),
        status: RepoStatus::Enabled,
        created_at: date(),
        stats: None,
    }
}

pub fn user(id: &str, first_name: &str, last_name: &str) -> User {
    User {
        id: id.to_string(),
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: format!("{}@example.com", first_name.to_lowercase()),
        lang: DEFAULT_LANG.to_string(),
        permissions: Permissions::default(),
        created_at: date(),
        authenticated_at: None,
    }
}

/// A single page holding all of `items`.
pub fn paged<T>(items: Vec<T>) -> Paged<T> {
    let total = items.len() as u64;
    Paged::new(items, PagePaginationInfo {
        page: 1,
        page_size: total as u32,
        total,
        total_pages: 1,
    })
}
