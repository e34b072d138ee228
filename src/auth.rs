//! Bearer token resolution for authenticated response sampling.

use crate::config::{AuthMode, GeneratorConfig, LoginConfig};
use anyhow::{Context, Result};
use log::{debug, info, warn};
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// Resolves the token attached to samples of authenticated endpoints
pub struct Authenticator<'a> {
    client: &'a Client,
}

impl<'a> Authenticator<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Resolve a token according to the configured mode.
    ///
    /// An explicit override always wins. Login failures are logged and yield `None`, so
    /// sampling continues without an `Authorization` header.
    pub async fn resolve_token(
        &self,
        config: &GeneratorConfig,
        override_token: Option<&str>,
    ) -> Option<String> {
        if let Some(token) = override_token.filter(|t| !t.is_empty()) {
            debug!("Using token supplied on the command line");
            return Some(token.to_string());
        }

        match config.auth.mode {
            AuthMode::None => None,
            AuthMode::Manual => config.auth.token.clone(),
            AuthMode::Login => {
                match self
                    .login(&config.base_url, &config.auth.login, config.timeout())
                    .await
                {
                    Ok(Some(token)) => {
                        info!("Obtained sampling token from login endpoint");
                        Some(token)
                    }
                    Ok(None) => {
                        warn!(
                            "Login response has no token at '{}'; sampling without authentication",
                            config.auth.login.token_key
                        );
                        None
                    }
                    Err(e) => {
                        warn!("Login failed: {:#}; sampling without authentication", e);
                        None
                    }
                }
            }
        }
    }

    /// Perform the login request and pull the token out of its body
    pub async fn login(
        &self,
        base_url: &str,
        login: &LoginConfig,
        timeout: Duration,
    ) -> Result<Option<String>> {
        let url = login_url(base_url, &login.url);
        debug!("Logging in at {} ({})", url, login.method);

        let request = if credentials_in_query(&login.method) {
            self.client
                .get(&url)
                .query(&[("email", &login.email), ("password", &login.password)])
        } else {
            self.client.post(&url).json(&json!({
                "email": login.email,
                "password": login.password,
            }))
        };

        let body: Value = request
            .timeout(timeout)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .with_context(|| format!("Login request to {} failed", url))?
            .json()
            .await
            .context("Login response is not JSON")?;

        Ok(lookup_path(&body, &login.token_key).and_then(token_string))
    }
}

/// `GET` logins carry credentials in the query string; anything else is sent as a JSON `POST`
fn credentials_in_query(method: &str) -> bool {
    if method.eq_ignore_ascii_case("GET") {
        true
    } else {
        if !method.eq_ignore_ascii_case("POST") {
            warn!("Unrecognized login method '{}'; logging in with POST", method);
        }
        false
    }
}

/// Absolute login URL; relative paths are appended to the base URL
fn login_url(base_url: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), url.trim_start_matches('/'))
    }
}

/// Follow a dot path (`data.token`, `tokens.0`) through a JSON value
pub fn lookup_path<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.')
        .filter(|segment| !segment.is_empty())
        .try_fold(value, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
}

fn token_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
