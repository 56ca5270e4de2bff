//! HTTP backends over the REST api.

use audcore::{
    error::BackendError,
    pagination::{
        PagePaginationInfo,
        Paged,
    },
};
use reqwest::{
    Method,
    RequestBuilder,
    Response,
    Url,
};
use serde::{
    Deserialize,
    Serialize,
    de::DeserializeOwned,
};
use std::future::Future;

use crate::error::ConfigError;

mod account;
mod apikey;
mod logs;
mod repo;
mod user;

pub use account::AccountApi;
pub use apikey::ApikeyApi;
pub use logs::LogApi;
pub use repo::RepoApi;
pub use user::UserApi;

#[derive(Clone, Debug)]
pub struct ApiClient {
    base_url: Url,
    api_key: Option<String>,
    page_size: Option<u32>,
    http: reqwest::Client,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Deserialize)]
struct ListBody<T> {
    data: Vec<T>,
    pagination: PagePaginationInfo,
}

#[derive(Serialize)]
struct PageQuery {
    page: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    page_size: Option<u32>,
}

// Futures produced by reqwest in the browser may not leave the thread
// they were made on; the browser only has the one.
#[cfg(target_arch = "wasm32")]
pub(crate) fn local<F: Future>(fut: F) -> send_wrapper::SendWrapper<F> {
    send_wrapper::SendWrapper::new(fut)
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn local<F: Future>(fut: F) -> F {
    fut
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };
        let url = Url::parse(base_url)
            .map_err(|e| invalid(e.to_string()))?;
        if url.cannot_be_a_base() {
            return Err(invalid("not a base url".to_string()));
        }
        Ok(Self {
            base_url: url,
            api_key: None,
            page_size: None,
            http: reqwest::Client::new(),
        })
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn page_size(&self) -> Option<u32> {
        self.page_size
    }

    /// The api url for the given path segments; each segment is encoded
    /// on its own so ids may contain anything.
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        url.set_query(None);
        url.set_fragment(None);
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .push("api")
                .extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        log::trace!("{method} {url}");
        let request = self.http.request(method, url);
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    pub(crate) fn list_query(
        &self,
        page: u32,
        filter: &impl Serialize,
    ) -> Result<String, BackendError> {
        let encode = |e: serde_urlencoded::ser::Error| BackendError::Decode(e.to_string());
        let paging = serde_urlencoded::to_string(PageQuery {
            page,
            page_size: self.page_size,
        }).map_err(encode)?;
        let filter = serde_urlencoded::to_string(filter).map_err(encode)?;
        Ok(if filter.is_empty() {
            paging
        } else {
            format!("{paging}&{filter}")
        })
    }

    pub(crate) async fn get_list<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &str,
    ) -> Result<Paged<T>, BackendError> {
        let mut url = self.url(segments);
        url.set_query(Some(query));
        let body: ListBody<T> = self.send(self.request(Method::GET, url)).await?;
        Ok(Paged::new(body.data, body.pagination))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
    ) -> Result<T, BackendError> {
        self.send(self.request(Method::GET, self.url(segments))).await
    }

    pub(crate) async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T, BackendError> {
        self.send(self.request(Method::POST, self.url(segments)).json(body)).await
    }

    /// A request answered with no content.
    pub(crate) async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<(), BackendError> {
        let request = self.request(method, self.url(segments));
        let request = match body {
            Some(body) => request.json(body),
            None => request,
        };
        check(dispatch(request).await?).await?;
        Ok(())
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, BackendError> {
        let response = check(dispatch(request).await?).await?;
        response.json::<T>()
            .await
            .map_err(|e| BackendError::Decode(e.to_string()))
    }
}

async fn dispatch(request: RequestBuilder) -> Result<Response, BackendError> {
    request.send()
        .await
        .map_err(|e| BackendError::Network(e.to_string()))
}

async fn check(response: Response) -> Result<Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let reason = status.canonical_reason().unwrap_or_default().to_string();
    let message = response.json::<ErrorBody>()
        .await
        .map(|body| body.message)
        .unwrap_or(reason);
    log::trace!("request failed with {status}: {message}");
    Err(BackendError::from_status(status.as_u16(), message))
}

#[cfg(test)]
mod test {
    use audcore::resource::SearchFilter;
    use super::*;

    #[test]
    fn urls() -> anyhow::Result<()> {
        let client = ApiClient::new("http://localhost:8000/")?;
        assert_eq!(
            client.url(&["repos", "a/b c"]).as_str(),
            "http://localhost:8000/api/repos/a%2Fb%20c",
        );
        let client = ApiClient::new("https://example.com/auditize?x=1")?;
        assert_eq!(
            client.url(&["users", "me"]).as_str(),
            "https://example.com/auditize/api/users/me",
        );
        assert!(ApiClient::new("not a url").is_err());
        assert!(ApiClient::new("mailto:admin@example.com").is_err());
        Ok(())
    }

    #[test]
    fn list_query() -> anyhow::Result<()> {
        let client = ApiClient::new("http://localhost:8000")?;
        assert_eq!(client.list_query(2, &SearchFilter::default())?, "page=2");
        let client = client.with_page_size(20);
        assert_eq!(
            client.list_query(1, &SearchFilter::from_search("acme corp"))?,
            "page=1&page_size=20&q=acme+corp",
        );
        Ok(())
    }
}
