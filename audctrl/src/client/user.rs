use async_trait::async_trait;
use audcore::{
    error::BackendError,
    pagination::Paged,
    resource::{
        CreatedId,
        ResourceKind,
        SearchFilter,
        traits::{
            ListBackend,
            MutationBackend,
        },
    },
    user::{
        User,
        UserCreation,
        UserUpdate,
    },
};
use reqwest::Method;

use super::{
    ApiClient,
    local,
};

#[derive(Clone, Debug)]
pub struct UserApi {
    client: ApiClient,
}

impl UserApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ListBackend for UserApi {
    type Resource = User;
    type Filter = SearchFilter;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Users
    }

    async fn fetch_page(
        &self,
        page: u32,
        filter: &SearchFilter,
    ) -> Result<Paged<User>, BackendError> {
        let query = self.client.list_query(page, filter)?;
        local(self.client.get_list(&["users"], &query)).await
    }

    async fn load(&self, id: &str) -> Result<User, BackendError> {
        local(self.client.get_json(&["users", id])).await
    }
}

#[async_trait]
impl MutationBackend for UserApi {
    type Create = UserCreation;
    type Created = CreatedId;
    type Update = UserUpdate;

    async fn create(&self, payload: UserCreation) -> Result<CreatedId, BackendError> {
        let payload = payload.normalized();
        local(self.client.post_json(&["users"], &payload)).await
    }

    async fn update(&self, id: &str, patch: UserUpdate) -> Result<(), BackendError> {
        let patch = patch.normalized();
        local(self.client.execute(Method::PATCH, &["users", id], Some(&patch))).await
    }

    async fn delete(&self, id: &str) -> Result<(), BackendError> {
        local(self.client.execute::<()>(Method::DELETE, &["users", id], None)).await
    }
}
