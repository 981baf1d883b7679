use std::fmt;
use std::sync::Arc;

use reqwest::{Client, Method, RequestBuilder, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use url::Url;

use super::{RequestOptions, RetryPolicy};
use crate::{Error, Result, TRACING_TARGET_HTTP};

struct HttpClientInner {
    secure: Client,
    insecure: Client,
    policy: RetryPolicy,
}

/// Typed JSON client with bounded retries.
///
/// Holds two connection pools: one verifying server certificates and one
/// accepting any certificate, selected per call through [`RequestOptions`].
/// Cheap to clone.
#[derive(Clone)]
pub struct HttpClient {
    inner: Arc<HttpClientInner>,
}

impl HttpClient {
    /// Creates a new client.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the TLS backend cannot be initialized.
    pub fn new(policy: RetryPolicy, user_agent: &str) -> Result<Self> {
        let secure = Client::builder().user_agent(user_agent).build()?;
        let insecure = Client::builder()
            .user_agent(user_agent)
            .danger_accept_invalid_certs(true)
            .build()?;

        tracing::debug!(
            target: TRACING_TARGET_HTTP,
            max_attempts = policy.max_attempts,
            delay_ms = policy.delay.as_millis(),
            timeout_ms = policy.timeout.as_millis(),
            "Created http client"
        );

        Ok(Self {
            inner: Arc::new(HttpClientInner {
                secure,
                insecure,
                policy,
            }),
        })
    }

    /// Returns the retry policy applied to every call.
    pub fn policy(&self) -> &RetryPolicy {
        &self.inner.policy
    }

    /// Sends a GET request and decodes the JSON response.
    pub async fn get<T>(
        &self,
        url: Url,
        options: RequestOptions,
        cancel: &CancellationToken,
    ) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let body = self.execute(Method::GET, url, None, options, cancel).await?;
        serde_json::from_slice(&body).map_err(Error::Decode)
    }

    /// Sends `body` as JSON in a POST request and decodes the JSON response.
    pub async fn post<B, T>(
        &self,
        url: Url,
        body: &B,
        options: RequestOptions,
        cancel: &CancellationToken,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = serde_json::to_vec(body).map_err(Error::Encode)?;
        let body = self
            .execute(Method::POST, url, Some(payload), options, cancel)
            .await?;
        serde_json::from_slice(&body).map_err(Error::Decode)
    }

    /// Runs the attempt loop and returns the raw body of the first successful response.
    async fn execute(
        &self,
        method: Method,
        url: Url,
        payload: Option<Vec<u8>>,
        options: RequestOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>> {
        let policy = self.inner.policy;
        let client = if options.skip_tls_verify {
            &self.inner.insecure
        } else {
            &self.inner.secure
        };

        let mut attempt = 0;
        loop {
            attempt += 1;

            let mut request = client
                .request(method.clone(), url.clone())
                .timeout(policy.timeout)
                .header(header::ACCEPT, "application/json");
            if let Some(payload) = &payload {
                request = request
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(payload.clone());
            }

            let outcome = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                outcome = send_once(request) => outcome,
            };

            let error = match outcome {
                Ok(body) => {
                    tracing::debug!(
                        target: TRACING_TARGET_HTTP,
                        %method,
                        path = url.path(),
                        attempt,
                        "Request succeeded"
                    );
                    return Ok(body);
                }
                Err(error) => error,
            };

            if !error.is_retryable() {
                tracing::warn!(
                    target: TRACING_TARGET_HTTP,
                    %method,
                    path = url.path(),
                    attempt,
                    error = %error,
                    "Request failed with a non-retryable error"
                );
                return Err(error);
            }

            if attempt >= policy.max_attempts {
                tracing::error!(
                    target: TRACING_TARGET_HTTP,
                    %method,
                    path = url.path(),
                    attempts = attempt,
                    error = %error,
                    "Request failed, no attempts left"
                );
                return Err(error);
            }

            tracing::warn!(
                target: TRACING_TARGET_HTTP,
                %method,
                path = url.path(),
                attempt,
                status = error.status(),
                error = %error,
                "Request failed, retrying"
            );

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                _ = tokio::time::sleep(policy.delay) => {}
            }
        }
    }
}

/// Sends one attempt and maps non-success statuses to errors.
async fn send_once(request: RequestBuilder) -> Result<Vec<u8>> {
    let response = request.send().await?;
    let status = response.status();
    let body = response.bytes().await?;

    if status.is_success() {
        Ok(body.to_vec())
    } else {
        Err(Error::from_status(status, &body))
    }
}

impl fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClient")
            .field("policy", &self.inner.policy)
            .finish_non_exhaustive()
    }
}
