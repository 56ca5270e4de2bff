use async_trait::async_trait;
use audcore::{
    error::BackendError,
    pagination::Paged,
    repo::{
        Repo,
        RepoCreation,
        RepoUpdate,
    },
    resource::{
        CreatedId,
        ResourceKind,
        SearchFilter,
        traits::{
            ListBackend,
            MutationBackend,
        },
    },
};
use reqwest::Method;

use super::{
    ApiClient,
    local,
};

#[derive(Clone, Debug)]
pub struct RepoApi {
    client: ApiClient,
}

impl RepoApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ListBackend for RepoApi {
    type Resource = Repo;
    type Filter = SearchFilter;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Repos
    }

    async fn fetch_page(
        &self,
        page: u32,
        filter: &SearchFilter,
    ) -> Result<Paged<Repo>, BackendError> {
        let query = self.client.list_query(page, filter)?;
        local(self.client.get_list(&["repos"], &query)).await
    }

    async fn load(&self, id: &str) -> Result<Repo, BackendError> {
        local(self.client.get_json(&["repos", id])).await
    }
}

#[async_trait]
impl MutationBackend for RepoApi {
    type Create = RepoCreation;
    type Created = CreatedId;
    type Update = RepoUpdate;

    async fn create(&self, payload: RepoCreation) -> Result<CreatedId, BackendError> {
        local(self.client.post_json(&["repos"], &payload)).await
    }

    async fn update(&self, id: &str, patch: RepoUpdate) -> Result<(), BackendError> {
        local(self.client.execute(Method::PATCH, &["repos", id], Some(&patch))).await
    }

    async fn delete(&self, id: &str) -> Result<(), BackendError> {
        local(self.client.execute::<()>(Method::DELETE, &["repos", id], None)).await
    }
}
