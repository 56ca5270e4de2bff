use async_trait::async_trait;
use audcore::{
    apikey::{
        Apikey,
        ApikeyCreation,
        ApikeySecret,
        ApikeyUpdate,
    },
    error::BackendError,
    pagination::Paged,
    resource::{
        ResourceKind,
        SearchFilter,
        traits::{
            ListBackend,
            MutationBackend,
        },
    },
};
use reqwest::Method;
use serde::Deserialize;

use super::{
    ApiClient,
    local,
};

#[derive(Clone, Debug)]
pub struct ApikeyApi {
    client: ApiClient,
}

#[derive(Deserialize)]
struct KeyBody {
    key: String,
}

impl ApikeyApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Replace the secret of an api key; the new one is only ever shown
    /// here.
    pub async fn regenerate_key(&self, id: &str) -> Result<ApikeySecret, BackendError> {
        let body: KeyBody = local(
            self.client.post_json(&["apikeys", id, "key"], &serde_json::json!({}))
        ).await?;
        Ok(ApikeySecret {
            id: id.to_string(),
            key: body.key,
        })
    }
}

#[async_trait]
impl ListBackend for ApikeyApi {
    type Resource = Apikey;
    type Filter = SearchFilter;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Apikeys
    }

    async fn fetch_page(
        &self,
        page: u32,
        filter: &SearchFilter,
    ) -> Result<Paged<Apikey>, BackendError> {
        let query = self.client.list_query(page, filter)?;
        local(self.client.get_list(&["apikeys"], &query)).await
    }

    async fn load(&self, id: &str) -> Result<Apikey, BackendError> {
        local(self.client.get_json(&["apikeys", id])).await
    }
}

#[async_trait]
impl MutationBackend for ApikeyApi {
    type Create = ApikeyCreation;
    type Created = ApikeySecret;
    type Update = ApikeyUpdate;

    async fn create(&self, payload: ApikeyCreation) -> Result<ApikeySecret, BackendError> {
        let payload = payload.normalized();
        local(self.client.post_json(&["apikeys"], &payload)).await
    }

    async fn update(&self, id: &str, patch: ApikeyUpdate) -> Result<(), BackendError> {
        let patch = patch.normalized();
        local(self.client.execute(Method::PATCH, &["apikeys", id], Some(&patch))).await
    }

    async fn delete(&self, id: &str) -> Result<(), BackendError> {
        local(self.client.execute::<()>(Method::DELETE, &["apikeys", id], None)).await
    }
}
