use async_trait::async_trait;
use reqwest::{
    header::{HeaderValue, CONTENT_TYPE},
    Client,
};
use shared::protocol::{OptionList, API_KEY_HEADER, GET_OPTIONS_ROUTE};
use url::Url;

use crate::error::FetchError;

/// Produces the option list for an API key.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait OptionsSource {
    async fn fetch_options(&self, api_key: &str) -> Result<OptionList, FetchError>;
}

/// `POST /api/get-options` against a fixed origin.
#[derive(Debug, Clone)]
pub struct HttpOptionsSource {
    http: Client,
    endpoint: Url,
}

impl HttpOptionsSource {
    pub fn new(base_url: &str) -> Result<Self, url::ParseError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, url::ParseError> {
        let endpoint = Url::parse(base_url)?.join(GET_OPTIONS_ROUTE)?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl OptionsSource for HttpOptionsSource {
    async fn fetch_options(&self, api_key: &str) -> Result<OptionList, FetchError> {
        let key = HeaderValue::from_str(api_key).map_err(|_| FetchError::InvalidKeyHeader)?;
        let response = self
            .http
            .post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(API_KEY_HEADER, key)
            .send()
            .await
            .map_err(FetchError::transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(FetchError::transport)?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
