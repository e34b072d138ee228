//! Generator configuration.
//!
//! Values are layered: built-in defaults, then an optional YAML file, then command-line
//! options. The resulting [`GeneratorConfig`] is passed explicitly to every component.

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Config file read when `--config` is not given, if it exists
pub const DEFAULT_CONFIG_FILE: &str = "openapi-from-routes.yaml";

/// How a bearer token for response sampling is obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// No token
    #[default]
    None,
    /// Static token from configuration
    Manual,
    /// Token fetched from a login endpoint
    Login,
}

impl FromStr for AuthMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(AuthMode::None),
            "manual" => Ok(AuthMode::Manual),
            "login" => Ok(AuthMode::Login),
            other => Err(format!("unknown auth mode '{}' (expected none, manual or login)", other)),
        }
    }
}

impl fmt::Display for AuthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuthMode::None => "none",
            AuthMode::Manual => "manual",
            AuthMode::Login => "login",
        };
        f.write_str(s)
    }
}

/// Login request used by [`AuthMode::Login`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginConfig {
    /// Relative to the base URL unless absolute
    pub url: String,
    /// `POST` (JSON body) or `GET` (query string)
    pub method: String,
    pub email: String,
    pub password: String,
    /// Dot path of the token in the login response body
    pub token_key: String,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            url: "/api/login".to_string(),
            method: "POST".to_string(),
            email: "a@a.com".to_string(),
            password: "password".to_string(),
            token_key: "data.token".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    pub mode: AuthMode,
    pub token: Option<String>,
    pub token_type: String,
    pub login: LoginConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::None,
            token: None,
            token_type: "Bearer".to_string(),
            login: LoginConfig::default(),
        }
    }
}

/// Everything the generation step needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Application name recorded in the artifact
    pub project: String,
    /// Artifact output path
    pub path: PathBuf,
    /// Base URL of the running application, without trailing slash
    pub base_url: String,
    /// Sample live responses for GET endpoints
    pub capture_response: bool,
    /// Network timeout in seconds
    pub timeout: u64,
    /// Routes whose URI contains any of these substrings are left out
    pub skip: Vec<String>,
    /// Only routes starting with this prefix are documented
    pub api_prefix: String,
    /// Middleware name (or `name:` prefix) marking a route as authenticated
    pub auth_middleware: String,
    pub auth: AuthConfig,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            project: "Laravel".to_string(),
            path: PathBuf::from("public/api-docs.json"),
            base_url: "http://localhost".to_string(),
            capture_response: true,
            timeout: 15,
            skip: Vec::new(),
            api_prefix: "api/".to_string(),
            auth_middleware: "auth".to_string(),
            auth: AuthConfig::default(),
        }
    }
}

impl GeneratorConfig {
    /// Load configuration from a YAML file, or defaults when no file applies.
    ///
    /// An explicitly named file must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };

        if !explicit && !path.exists() {
            debug!("No config file at {}; using defaults", path.display());
            return Ok(Self::default().normalized());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Self = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        info!("Loaded configuration from {}", path.display());
        Ok(config.normalized())
    }

    /// Trim the base URL and drop empty skip entries
    pub fn normalized(mut self) -> Self {
        self.base_url = self.base_url.trim_end_matches('/').to_string();
        self.skip.retain(|s| !s.is_empty());
        self
    }

    /// Network timeout as a duration
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout)
    }
}

/// Split a comma-separated skip list
pub fn parse_skip_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.path, PathBuf::from("public/api-docs.json"));
        assert!(config.capture_response);
        assert_eq!(config.timeout, 15);
        assert_eq!(config.api_prefix, "api/");
        assert_eq!(config.auth.mode, AuthMode::None);
        assert_eq!(config.auth.token_type, "Bearer");
        assert_eq!(config.auth.login.url, "/api/login");
        assert_eq!(config.auth.login.token_key, "data.token");
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(
            &path,
            concat!(
                "base_url: https://shop.test/\n",
                "skip: [telescope, '']\n",
                "auth:\n  mode: login\n  login:\n    email: admin@shop.test\n",
            ),
        )
        .unwrap();

        let config = GeneratorConfig::load(Some(&path)).unwrap();
        assert_eq!(config.base_url, "https://shop.test");
        assert_eq!(config.skip, vec!["telescope"]);
        assert_eq!(config.auth.mode, AuthMode::Login);
        assert_eq!(config.auth.login.email, "admin@shop.test");
        assert_eq!(config.auth.login.password, "password");
        assert_eq!(config.timeout, 15);
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(GeneratorConfig::load(Some(&dir.path().join("nope.yaml"))).is_err());
    }

    #[test]
    fn test_auth_mode_parsing() {
        assert_eq!("LOGIN".parse::<AuthMode>(), Ok(AuthMode::Login));
        assert_eq!("none".parse::<AuthMode>(), Ok(AuthMode::None));
        assert!("oauth".parse::<AuthMode>().is_err());
        assert_eq!(AuthMode::Manual.to_string(), "manual");
    }

    #[test]
    fn test_parse_skip_list() {
        assert_eq!(
            parse_skip_list("telescope, horizon,,sanctum/csrf"),
            vec!["telescope", "horizon", "sanctum/csrf"]
        );
        assert!(parse_skip_list("").is_empty());
    }
}
