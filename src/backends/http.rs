use crate::backends::backend::{CONTINUE_FALLBACK_MESSAGE, SCRAPE_FALLBACK_MESSAGE, ScrapeBackend};
use crate::config::ViewerConfig;
use crate::error::{Result, ViewerError};
use crate::results::{ContinueRequest, ErrorBody, ScrapeRequest, ScrapeResult, SubpageBatch};
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use url::Url;

const SCRAPE_PATH: &str = "scrape";
const CONTINUE_PATH: &str = "continue_scraping";

/// JSON-over-HTTP client for the scrape service
pub struct HttpBackend {
    client: reqwest::Client,
    base: Url,
}

impl HttpBackend {
    /// Create a backend rooted at the configured server URL
    pub fn new(config: &ViewerConfig) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::new(),
            base: config.server_base()?,
        })
    }

    /// Full URL of an endpoint under the server base
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base.join(path)?)
    }

    async fn post<B, T>(&self, path: &str, body: &B, fallback: &str) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.endpoint(path)?;
        ::log::debug!("POST {}", url);

        let response = self
            .client
            .post(url.clone())
            .json(body)
            .send()
            .await
            .map_err(|e| ViewerError::Transport(format!("{}: {}", fallback, e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ViewerError::Transport(format!("{}: {}", fallback, e)))?;

        ::log::debug!("POST {} returned {} ({} bytes)", url, status, text.len());
        decode_response(status, &text, fallback)
    }
}

impl ScrapeBackend for HttpBackend {
    async fn scrape(&self, request: &ScrapeRequest) -> Result<ScrapeResult> {
        self.post(SCRAPE_PATH, request, SCRAPE_FALLBACK_MESSAGE).await
    }

    async fn continue_scraping(&self, request: &ContinueRequest) -> Result<SubpageBatch> {
        self.post(CONTINUE_PATH, request, CONTINUE_FALLBACK_MESSAGE)
            .await
    }
}

/// Turn a status and body into the decoded payload or a transport error
pub fn decode_response<T: DeserializeOwned>(
    status: StatusCode,
    body: &str,
    fallback: &str,
) -> Result<T> {
    if !status.is_success() {
        ::log::warn!("Scrape service responded with {}", status);
        return Err(ViewerError::Transport(error_message(body, fallback)));
    }

    serde_json::from_str(body).map_err(|e| {
        ::log::warn!("Malformed response body: {}", e);
        ViewerError::Transport(format!("{}: malformed response ({})", fallback, e))
    })
}

/// The `error` field of an error body, or the fallback when absent
pub fn error_message(body: &str, fallback: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
