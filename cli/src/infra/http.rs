//! Infrastructure implementation of the `VendorApi` port.
//!
//! `BrowserStackClient` uses a blocking reqwest client with HTTP basic auth.
//! Connection-level failures are retried with exponential backoff; HTTP
//! error statuses are returned or raised immediately, never retried.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::{Client, RequestBuilder, Response, multipart};
use serde_json::Value;

use crate::application::ports::{ApiResponse, FailOnError, VendorApi};
use crate::domain::{Credentials, HttpConfig, RunError};

pub struct BrowserStackClient {
    client: Client,
    credentials: Credentials,
    policy: HttpConfig,
}

impl BrowserStackClient {
    /// Build a client for the given credentials and HTTP policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the TLS backend cannot be initialised.
    pub fn new(credentials: Credentials, policy: HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(policy.request_timeout())
            .connect_timeout(Duration::from_secs(30))
            .user_agent(concat!("xcui-runner/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            credentials,
            policy,
        })
    }

    /// Send a request, rebuilding it for each attempt.
    ///
    /// Only connection errors are retried; any response, whatever its
    /// status, ends the loop.
    fn send_with_retry<F>(&self, url: &str, build: F) -> Result<Response>
    where
        F: Fn(&Client) -> Result<RequestBuilder>,
    {
        let mut retries = 0u32;
        loop {
            let request = build(&self.client)?
                .basic_auth(&self.credentials.user, Some(&self.credentials.access_key));
            match request.send() {
                Ok(response) => return Ok(response),
                Err(e) if e.is_connect() && retries < self.policy.connect_retries => {
                    retries += 1;
                    let delay = self.policy.backoff(retries);
                    tracing::warn!(
                        url,
                        retry = retries,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        error = %e,
                        "connection failed, retrying"
                    );
                    std::thread::sleep(delay);
                }
                Err(e) => {
                    return Err(RunError::Transport {
                        url: url.to_string(),
                        attempts: retries + 1,
                        message: e.to_string(),
                    }
                    .into());
                }
            }
        }
    }
}

/// Read the body, log it, and apply the fail-on-error policy.
fn into_api_response(url: &str, response: Response, fail: FailOnError) -> Result<ApiResponse> {
    let status = response.status().as_u16();
    let text = response
        .text()
        .with_context(|| format!("failed to read response body from {url}"))?;
    tracing::debug!(url, status, body = %text, "vendor response");

    if fail == FailOnError::Yes && !response_ok(status) {
        return Err(RunError::HttpStatus {
            status,
            url: url.to_string(),
            body: text,
        }
        .into());
    }

    let body = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    };
    Ok(ApiResponse { status, body })
}

fn response_ok(status: u16) -> bool {
    (200..300).contains(&status)
}

impl VendorApi for BrowserStackClient {
    fn post_file(&self, url: &str, path: &Path, fail: FailOnError) -> Result<ApiResponse> {
        tracing::debug!(url, file = %path.display(), "uploading file");
        let response = self.send_with_retry(url, |client| {
            let form = multipart::Form::new()
                .file("file", path)
                .with_context(|| format!("cannot open {}", path.display()))?;
            Ok(client.post(url).multipart(form))
        })?;
        into_api_response(url, response, fail)
    }

    fn post_json(&self, url: &str, body: &Value, fail: FailOnError) -> Result<ApiResponse> {
        tracing::debug!(url, payload = %body, "posting JSON");
        let response = self.send_with_retry(url, |client| Ok(client.post(url).json(body)))?;
        into_api_response(url, response, fail)
    }

    fn get(&self, url: &str, fail: FailOnError) -> Result<ApiResponse> {
        let response = self.send_with_retry(url, |client| Ok(client.get(url)))?;
        into_api_response(url, response, fail)
    }
}
