pub mod error;
pub mod pagination;
pub mod retry;

pub use error::{RemoteServiceError, Result};

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use retry::{retry_with_backoff, RetryConfig};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

#[derive(Clone, Debug)]
pub enum AuthMethod {
    Basic { username: String, password: String },
}

/// Transport settings fixed when the underlying HTTP client is built.
#[derive(Clone, Debug)]
pub struct ClientOptions {
    pub timeout: Duration,
    pub verify_tls: bool,
    pub headers: Vec<(String, String)>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            verify_tls: true,
            headers: Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    auth: Option<AuthMethod>,
    retry_config: RetryConfig,
}

impl ApiClient {
    pub fn new(base_url: impl AsRef<str>) -> Result<Self> {
        Self::with_options(base_url, &ClientOptions::default())
    }

    pub fn with_options(base_url: impl AsRef<str>, options: &ClientOptions) -> Result<Self> {
        let mut url = Url::parse(base_url.as_ref())?;
        // Url::join drops the last path segment unless it ends with a slash.
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        for (name, value) in &options.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                RemoteServiceError::InvalidHeader {
                    name: name.clone(),
                    message: e.to_string(),
                }
            })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| RemoteServiceError::InvalidHeader {
                    name: name.clone(),
                    message: e.to_string(),
                })?;
            headers.insert(header_name, header_value);
        }

        let client = Client::builder()
            .user_agent(format!("ticketbridge/{}", env!("CARGO_PKG_VERSION")))
            .timeout(options.timeout)
            .danger_accept_invalid_certs(!options.verify_tls)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: url,
            auth: None,
            retry_config: RetryConfig::default(),
        })
    }

    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.auth = Some(AuthMethod::Basic {
            username: username.into(),
            password: password.into(),
        });
        self
    }

    /// Backoff policy applied to GET requests. Other methods get one attempt.
    pub fn with_retry_config(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::GET, path, Option::<&()>::None).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn request<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T> {
        let joined = self
            .base_url
            .join(path.strip_prefix('/').unwrap_or(path))?;

        let retry_config = if method == Method::GET {
            self.retry_config.clone()
        } else {
            RetryConfig::single_attempt()
        };

        debug!(method = %method, url = %joined, "Sending request");

        retry_with_backoff(&retry_config, || async {
            let mut req = self.client.request(method.clone(), joined.clone());
            req = self.apply_auth(req);

            if let Some(body) = body {
                req = req.json(body);
            }

            let response = req.send().await?;
            let status = response.status();

            match status {
                StatusCode::UNAUTHORIZED => Err(RemoteServiceError::AuthenticationFailed {
                    message: "Invalid or expired credentials".to_string(),
                }),
                StatusCode::FORBIDDEN => {
                    let message = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Forbidden".to_string());
                    Err(RemoteServiceError::Forbidden { message })
                }
                StatusCode::NOT_FOUND => {
                    let resource = joined.path().to_string();
                    Err(RemoteServiceError::NotFound { resource })
                }
                StatusCode::BAD_REQUEST => {
                    let message = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Bad request".to_string());
                    Err(RemoteServiceError::BadRequest { message })
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    let retry_after = response
                        .headers()
                        .get("retry-after")
                        .and_then(|v| v.to_str().ok())
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(60);
                    Err(RemoteServiceError::RateLimitExceeded { retry_after })
                }
                status if status.is_server_error() => {
                    let message = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Server error".to_string());
                    Err(RemoteServiceError::ServerError {
                        status: status.as_u16(),
                        message,
                    })
                }
                status if status.is_success() => {
                    let bytes = response.bytes().await?;
                    // 204 No Content and empty 201s decode as JSON null.
                    let raw: &[u8] = if bytes.is_empty() { &b"null"[..] } else { &bytes[..] };
                    serde_json::from_slice::<T>(raw).map_err(|e| {
                        error!("Failed to parse JSON response: {}", e);
                        RemoteServiceError::InvalidResponse(e.to_string())
                    })
                }
                _ => {
                    let message = response
                        .text()
                        .await
                        .unwrap_or_else(|_| format!("Unexpected status: {}", status));
                    Err(RemoteServiceError::UnexpectedStatus {
                        status: status.as_u16(),
                        message,
                    })
                }
            }
        })
        .await
    }

    fn apply_auth(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.auth {
            Some(AuthMethod::Basic { username, password }) => {
                request.basic_auth(username, Some(password))
            }
            None => request,
        }
    }
}
