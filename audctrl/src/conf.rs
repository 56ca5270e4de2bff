use clap::Parser;

use crate::{
    client::ApiClient,
    error::ConfigError,
    state::StateBacking,
};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

#[derive(Clone, Debug, Parser)]
pub struct Builder {
    #[clap(
        long,
        value_name = "AUDITIZE_API_URL",
        env = "AUDITIZE_API_URL",
        default_value = DEFAULT_API_URL,
    )]
    pub api_url: String,
    #[clap(long, value_name = "AUDITIZE_API_KEY", env = "AUDITIZE_API_KEY")]
    pub api_key: Option<String>,
    #[clap(
        long,
        value_name = "AUDITIZE_STATE_BACKING",
        env = "AUDITIZE_STATE_BACKING",
        value_enum,
        default_value_t = StateBacking::Url,
    )]
    pub state_backing: StateBacking,
    #[clap(long, value_name = "AUDITIZE_PAGE_SIZE", env = "AUDITIZE_PAGE_SIZE")]
    pub page_size: Option<u32>,
}

impl Default for Builder {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: None,
            state_backing: StateBacking::default(),
            page_size: None,
        }
    }
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn api_url(mut self, value: String) -> Self {
        self.api_url = value;
        self
    }

    pub fn api_key(mut self, value: Option<String>) -> Self {
        self.api_key = value;
        self
    }

    pub fn state_backing(mut self, value: StateBacking) -> Self {
        self.state_backing = value;
        self
    }

    pub fn page_size(mut self, value: Option<u32>) -> Self {
        self.page_size = value;
        self
    }

    pub fn build(&self) -> Result<ApiClient, ConfigError> {
        let client = ApiClient::new(&self.api_url)?;
        let client = match &self.api_key {
            Some(key) => client.with_api_key(key),
            None => client,
        };
        Ok(match self.page_size {
            Some(size) => client.with_page_size(size),
            None => client,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_args() -> anyhow::Result<()> {
        let builder = Builder::try_parse_from([
            "audctrl",
            "--api-url", "https://audit.example.com",
            "--state-backing", "memory",
            "--page-size", "50",
        ])?;
        assert_eq!(builder.state_backing, StateBacking::Memory);
        let client = builder.build()?;
        assert_eq!(client.base_url().as_str(), "https://audit.example.com/");
        assert_eq!(client.page_size(), Some(50));
        Ok(())
    }

    #[test]
    fn setters() {
        let builder = Builder::new()
            .api_key(Some("secret".to_string()));
        assert_eq!(builder.api_key.as_deref(), Some("secret"));
        assert!(Builder::new().api_url("::".to_string()).build().is_err());
        assert_eq!(Builder::new().state_backing, StateBacking::Url);
    }
}
