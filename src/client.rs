use std::env;
use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::Stream;
use futures::stream::StreamExt;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Response};
use url::Url;

use crate::client_logger::ClientLogger;
use crate::error::{Error, ErrorEnvelope, Result};
use crate::observability::{CLIENT_REQUEST_DURATION, CLIENT_REQUEST_ERRORS, CLIENT_REQUESTS};
use crate::sse::process_sse;
use crate::types::{GenerateContentRequest, GenerateContentResponse, Model};

const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";
const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// A stream of response chunks from `streamGenerateContent`.
pub type ChunkStream = Pin<Box<dyn Stream<Item = Result<GenerateContentResponse>> + Send>>;

/// Client for the Gemini API.
#[derive(Clone)]
pub struct Gemini {
    api_key: HeaderValue,
    client: ReqwestClient,
    base_url: Url,
    timeout: Option<Duration>,
    logger: Option<Arc<dyn ClientLogger>>,
}

impl Gemini {
    /// Create a new Gemini client.
    ///
    /// The API key can be provided directly or read from the GEMINI_API_KEY
    /// environment variable.
    pub fn new(api_key: Option<String>) -> Result<Self> {
        Self::with_options(api_key, None, None)
    }

    /// Create a new client with custom settings.
    ///
    /// No timeout is applied unless one is given; a streamed reply may take as
    /// long as the service needs.
    pub fn with_options(
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let api_key = resolve_api_key(api_key, env::var(API_KEY_ENV).ok())?;
        let mut api_key = HeaderValue::from_str(&api_key).map_err(|_| {
            Error::authentication("API key contains characters not allowed in a header")
        })?;
        api_key.set_sensitive(true);

        let mut base_url = base_url.unwrap_or_else(|| DEFAULT_API_URL.to_string());
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        let base_url = Url::parse(&base_url)?;

        let mut builder = ReqwestClient::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            Error::http_client(
                format!("Failed to build HTTP client: {e}"),
                Some(Box::new(e)),
            )
        })?;

        Ok(Self {
            api_key,
            client,
            base_url,
            timeout,
            logger: None,
        })
    }

    /// Attach a logger that observes every request and streamed chunk.
    pub fn with_logger(mut self, logger: Arc<dyn ClientLogger>) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Create and return default headers for API requests.
    fn default_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            HeaderValue::from_static("text/event-stream"),
        );
        headers.insert("x-goog-api-key", self.api_key.clone());
        headers
    }

    /// The URL for streaming content from `model`.
    fn stream_url(&self, model: &Model) -> Result<Url> {
        let mut url = self
            .base_url
            .join(&format!("models/{model}:streamGenerateContent"))?;
        url.set_query(Some("alt=sse"));
        Ok(url)
    }

    /// Process API response errors and convert to our Error type
    async fn process_error_response(response: Response) -> Error {
        let status_code = response.status().as_u16();

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|val| val.to_str().ok())
            .and_then(|val| val.parse::<u64>().ok());

        let error_body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                return Error::http_client(
                    format!("Failed to read error response: {e}"),
                    Some(Box::new(e)),
                );
            }
        };

        match serde_json::from_str::<ErrorEnvelope>(&error_body) {
            Ok(envelope) => envelope.into_error(status_code, retry_after),
            Err(_) => Error::from_status(status_code, None, error_body, retry_after),
        }
    }

    fn request_failed(&self, e: reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::timeout(
                format!("Request timed out: {e}"),
                self.timeout.map(|t| t.as_secs_f64()),
            )
        } else if e.is_connect() {
            Error::connection(format!("Connection error: {e}"), Some(Box::new(e)))
        } else {
            Error::http_client(format!("Request failed: {e}"), Some(Box::new(e)))
        }
    }

    fn record_failure(&self, error: Error) -> Error {
        CLIENT_REQUEST_ERRORS.click();
        if let Some(logger) = &self.logger {
            logger.log_error(&error);
        }
        error
    }

    /// Send a request to `model` and get a streaming response.
    ///
    /// Returns a stream of response chunks that can be processed incrementally.
    /// The stream is finite and cannot be restarted.
    pub async fn stream(
        &self,
        model: &Model,
        request: &GenerateContentRequest,
    ) -> Result<ChunkStream> {
        let url = self.stream_url(model)?;
        if let Some(logger) = &self.logger {
            logger.log_request(model, request);
        }

        CLIENT_REQUESTS.click();
        let start = Instant::now();
        let response = match self
            .client
            .post(url)
            .headers(self.default_headers())
            .json(request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                let error = self.request_failed(e);
                return Err(self.record_failure(error));
            }
        };
        CLIENT_REQUEST_DURATION.add(start.elapsed().as_secs_f64());

        if !response.status().is_success() {
            let error = Self::process_error_response(response).await;
            return Err(self.record_failure(error));
        }

        let logger = self.logger.clone();
        let chunks = process_sse(Box::pin(response.bytes_stream())).inspect(move |item| {
            if let Some(logger) = &logger {
                match item {
                    Ok(chunk) => logger.log_stream_chunk(chunk),
                    Err(error) => logger.log_error(error),
                }
            }
        });

        Ok(Box::pin(chunks))
    }
}

/// Picks the API key: an explicit key wins, otherwise the environment's.
///
/// A missing or blank environment key is the startup failure reported before the
/// chat begins.  The returned key is trimmed.
fn resolve_api_key(explicit: Option<String>, from_env: Option<String>) -> Result<String> {
    let api_key = match explicit {
        Some(key) => key,
        None => from_env
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                Error::authentication(format!(
                    "{API_KEY_ENV} not found in environment variables. \
                     Please set it before starting the chat."
                ))
            })?,
    };
    let api_key = api_key.trim();
    if api_key.is_empty() {
        return Err(Error::authentication("API key must not be empty"));
    }
    Ok(api_key.to_string())
}

impl fmt::Debug for Gemini {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gemini")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .field("logger", &self.logger.is_some())
            .finish()
    }
}
