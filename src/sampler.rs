//! Live response sampling for read endpoints.

use crate::extractor::SampledResponse;
use log::debug;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

/// Performs one bounded GET per endpoint and records what came back
pub struct ResponseSampler {
    client: Client,
    token_type: String,
    timeout: Duration,
}

impl ResponseSampler {
    pub fn new(client: Client, token_type: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client,
            token_type: token_type.into(),
            timeout,
        }
    }

    /// GET `url`, attaching `Authorization: <token type> <token>` when a token is given.
    ///
    /// Any HTTP status is a successful sample; only transport failures and timeouts are errors.
    pub async fn sample(&self, url: &str, token: Option<&str>) -> reqwest::Result<SampledResponse> {
        debug!("Sampling GET {}", url);
        let mut request = self
            .client
            .get(url)
            .timeout(self.timeout)
            .header(ACCEPT, "application/json");

        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("{} {}", self.token_type, token));
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        let body = serde_json::from_str(&text).unwrap_or(Value::String(text));

        debug!("Sampled {} -> {}", url, status);
        Ok(SampledResponse { status, body })
    }
}

/// Concrete URL for sampling: every `{...}` placeholder becomes `1`
pub fn sample_url(base_url: &str, uri: &str) -> String {
    let mut path = String::with_capacity(uri.len());
    let mut rest = uri.trim_start_matches('/');

    while let Some(open) = rest.find('{') {
        match rest[open..].find('}') {
            Some(close) => {
                path.push_str(&rest[..open]);
                path.push('1');
                rest = &rest[open + close + 1..];
            }
            None => break,
        }
    }
    path.push_str(rest);

    format!("{}/{}", base_url.trim_end_matches('/'), path)
}
