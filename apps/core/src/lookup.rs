use std::future::Future;
use std::time::Duration;

use reqwest::Client;

use crate::config::Config;
use crate::contract::{SearchRequest, SearchResult};

/// Message shown for any non-success status, whatever the body says.
pub const NO_RESULT_MESSAGE: &str = "No Result Found";

#[derive(Debug)]
pub enum LookupError {
    Status(u16),
    Transport(reqwest::Error),
    Decode(serde_json::Error),
}

impl std::fmt::Display for LookupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status(_) => write!(f, "{NO_RESULT_MESSAGE}"),
            Self::Transport(error) => write!(f, "{error}"),
            Self::Decode(error) => write!(f, "{error}"),
        }
    }
}

impl std::error::Error for LookupError {}

impl From<reqwest::Error> for LookupError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value)
    }
}

impl From<serde_json::Error> for LookupError {
    fn from(value: serde_json::Error) -> Self {
        Self::Decode(value)
    }
}

/// Remote keyword search over an uploaded document. `Ok(None)` means the service
/// answered with a JSON `null`.
pub trait LookupService {
    fn lookup(
        &self,
        request: &SearchRequest,
    ) -> impl Future<Output = Result<Option<SearchResult>, LookupError>> + Send;
}

#[derive(Debug, Clone)]
pub struct HttpLookupService {
    client: Client,
    endpoint: String,
}

impl HttpLookupService {
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self, LookupError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint: endpoint.trim().to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, LookupError> {
        Self::new(
            &config.endpoint,
            config.request_timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl LookupService for HttpLookupService {
    fn lookup(
        &self,
        request: &SearchRequest,
    ) -> impl Future<Output = Result<Option<SearchResult>, LookupError>> + Send {
        async move {
            let body = request.to_json()?;
            let response = self
                .client
                .post(&self.endpoint)
                .query(&[("payload", body.as_str())])
                .body(body.clone())
                .send()
                .await?;

            let status = response.status();
            if !status.is_success() {
                return Err(LookupError::Status(status.as_u16()));
            }

            let bytes = response.bytes().await?;
            Ok(serde_json::from_slice::<Option<SearchResult>>(&bytes)?)
        }
    }
}
