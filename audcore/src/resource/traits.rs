use async_trait::async_trait;
use serde::Serialize;

use crate::{
    error::BackendError,
    pagination::Paged,
};
use super::{
    Resource,
    ResourceKind,
};

/// Read access to a kind of resource.
#[async_trait]
pub trait ListBackend: Send + Sync + 'static {
    type Resource: Resource + Clone + Send + Sync + 'static;
    /// The list filter; its url-encoded form is part of the cache key.
    type Filter: Clone + Default + Serialize + Send + Sync + 'static;

    fn kind(&self) -> ResourceKind;

    async fn fetch_page(
        &self,
        page: u32,
        filter: &Self::Filter,
    ) -> Result<Paged<Self::Resource>, BackendError>;
    async fn load(
        &self,
        id: &str,
    ) -> Result<Self::Resource, BackendError>;
}

/// Write access to a kind of resource.
#[async_trait]
pub trait MutationBackend: ListBackend {
    type Create: Clone + Send + Sync + 'static;
    type Created: Clone + Send + Sync + 'static;
    type Update: Clone + Send + Sync + 'static;

    async fn create(
        &self,
        payload: Self::Create,
    ) -> Result<Self::Created, BackendError>;
    async fn update(
        &self,
        id: &str,
        patch: Self::Update,
    ) -> Result<(), BackendError>;
    async fn delete(
        &self,
        id: &str,
    ) -> Result<(), BackendError>;
}
