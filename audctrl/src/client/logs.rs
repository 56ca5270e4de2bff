use async_trait::async_trait;
use audcore::{
    error::BackendError,
    logs::{
        LogEntry,
        LogSearchParams,
    },
    pagination::Paged,
    resource::{
        ResourceKind,
        traits::ListBackend,
    },
};

use super::{
    ApiClient,
    local,
};

/// The logs of a single repository.
#[derive(Clone, Debug)]
pub struct LogApi {
    client: ApiClient,
    repo_id: String,
}

impl LogApi {
    pub fn new(client: ApiClient, repo_id: impl Into<String>) -> Self {
        Self {
            client,
            repo_id: repo_id.into(),
        }
    }

    pub fn repo_id(&self) -> &str {
        &self.repo_id
    }
}

#[async_trait]
impl ListBackend for LogApi {
    type Resource = LogEntry;
    type Filter = LogSearchParams;

    fn kind(&self) -> ResourceKind {
        ResourceKind::Logs
    }

    async fn fetch_page(
        &self,
        page: u32,
        filter: &LogSearchParams,
    ) -> Result<Paged<LogEntry>, BackendError> {
        if !filter.repo_id.is_empty() && filter.repo_id != self.repo_id {
            log::warn!(
                "ignoring repo_id {:?} in filter for logs of {:?}",
                filter.repo_id,
                self.repo_id,
            );
        }
        // the repository is part of the path.
        let filter = LogSearchParams {
            repo_id: String::new(),
            .. filter.clone()
        };
        let query = self.client.list_query(page, &filter)?;
        local(self.client.get_list(&["repos", &self.repo_id, "logs"], &query)).await
    }

    async fn load(&self, id: &str) -> Result<LogEntry, BackendError> {
        local(self.client.get_json(&["repos", &self.repo_id, "logs", id])).await
    }
}
