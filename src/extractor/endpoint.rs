//! Route filtering and endpoint record construction.

use super::{Endpoint, Parameter, ParameterLocation};
use crate::auth::Authenticator;
use crate::config::GeneratorConfig;
use crate::route_source::{RouteDescriptor, RouteSource};
use crate::sampler::{sample_url, ResponseSampler};
use crate::schema_generator::translate;
use crate::tag_grouper::classify;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use reqwest::Client;

/// Builds [`Endpoint`]s from a route source according to a [`GeneratorConfig`]
pub struct EndpointExtractor<'a> {
    config: &'a GeneratorConfig,
    client: Client,
}

impl<'a> EndpointExtractor<'a> {
    pub fn new(config: &'a GeneratorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { config, client })
    }

    /// Extract all documented endpoints, in route registration order.
    ///
    /// When response capture is enabled a sampling token is resolved first; `override_token`
    /// takes precedence over the configured auth mode. Sampling failures only drop the
    /// affected endpoint's response.
    pub async fn extract(
        &self,
        source: &dyn RouteSource,
        override_token: Option<&str>,
    ) -> Vec<Endpoint> {
        let token = if self.config.capture_response {
            Authenticator::new(&self.client)
                .resolve_token(self.config, override_token)
                .await
        } else {
            None
        };
        let sampler = ResponseSampler::new(
            self.client.clone(),
            self.config.auth.token_type.clone(),
            self.config.timeout(),
        );

        let routes = source.routes();
        let mut endpoints = Vec::new();

        for route in &routes {
            if let Some(endpoint) = self
                .extract_route(source, route, &sampler, token.as_deref())
                .await
            {
                endpoints.push(endpoint);
            }
        }

        info!(
            "Extracted {} endpoints from {} routes",
            endpoints.len(),
            routes.len()
        );
        endpoints
    }

    async fn extract_route(
        &self,
        source: &dyn RouteSource,
        route: &RouteDescriptor,
        sampler: &ResponseSampler,
        token: Option<&str>,
    ) -> Option<Endpoint> {
        let uri = route.uri.trim_start_matches('/');

        if !uri.starts_with(&self.config.api_prefix) {
            debug!("Skipping {}: outside '{}'", uri, self.config.api_prefix);
            return None;
        }

        let Some(handler) = source.resolve(&route.action) else {
            debug!("Skipping {}: unresolvable handler '{}'", uri, route.action);
            return None;
        };

        if let Some(pattern) = skip_match(uri, &self.config.skip) {
            debug!("Skipping {}: matches skip pattern '{}'", uri, pattern);
            return None;
        }

        let auth_required = is_auth_required(&route.middleware, &self.config.auth_middleware);
        let provider = source.schema_provider(&handler);

        let request_schema = match provider.map(|p| p.declared_validation_rules()) {
            Some(Ok(Some(rules))) => translate(&rules),
            Some(Ok(None)) | None => None,
            Some(Err(e)) => {
                warn!("{}; documenting {} without a request schema", e, uri);
                None
            }
        };

        let mut parameters = path_parameters(uri);
        if let Some(provider) = provider {
            parameters.extend(provider.declared_query_parameters());
        }

        let action = provider
            .and_then(|p| p.description())
            .unwrap_or_else(|| route.action.clone());

        let classification = classify(uri);
        let mut endpoint = Endpoint {
            group: classification.group_path.join("/"),
            tag: classification.tag,
            methods: route.methods.clone(),
            uri: format!("/{}", uri),
            name: route.name.clone(),
            action: Some(action),
            parameters,
            request_schema,
            auth_required,
            response: None,
        };

        if self.config.capture_response && endpoint.primary_method() == "get" {
            let url = sample_url(&self.config.base_url, uri);
            let token = if auth_required { token } else { None };
            match sampler.sample(&url, token).await {
                Ok(sample) => endpoint.response = Some(sample),
                Err(e) => warn!("Could not sample {}: {}", url, e),
            }
        }

        Some(endpoint)
    }
}

/// First skip pattern contained in `uri`
pub fn skip_match<'s>(uri: &str, skip: &'s [String]) -> Option<&'s str> {
    skip.iter()
        .map(String::as_str)
        .find(|pattern| !pattern.is_empty() && uri.contains(pattern))
}

/// Whether any middleware equals `marker` or is a parameterised form of it (`auth:sanctum`)
pub fn is_auth_required(middleware: &[String], marker: &str) -> bool {
    middleware.iter().any(|m| {
        m == marker
            || m.strip_prefix(marker)
                .is_some_and(|rest| rest.starts_with(':'))
    })
}

/// Required path parameters from `{name}` placeholders, in order of appearance.
///
/// Placeholders may sit anywhere in a segment (`{file}.{ext}`, `avatar-{size}`).
pub fn path_parameters(uri: &str) -> Vec<Parameter> {
    let mut parameters = Vec::new();
    let mut rest = uri;

    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}') else {
            break;
        };
        let name = rest[open + 1..open + close].trim_end_matches('?');
        if !name.is_empty() {
            parameters.push(Parameter::new(name, ParameterLocation::Path, true));
        }
        rest = &rest[open + close + 1..];
    }

    parameters
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route_source::{HandlerSpec, RouteManifest};
    use axum::{routing::get, Json, Router};
    use indexmap::IndexMap;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn config() -> GeneratorConfig {
        GeneratorConfig {
            capture_response: false,
            timeout: 2,
            ..GeneratorConfig::default()
        }
    }

    fn manifest(routes: Vec<RouteDescriptor>) -> RouteManifest {
        RouteManifest::new(routes, IndexMap::new())
    }

    async fn extract(config: &GeneratorConfig, source: &RouteManifest) -> Vec<Endpoint> {
        EndpointExtractor::new(config)
            .unwrap()
            .extract(source, None)
            .await
    }

    #[test]
    fn test_path_parameters() {
        assert_eq!(
            path_parameters("api/users/{user}/posts/{post?}"),
            vec![
                Parameter::new("user", ParameterLocation::Path, true),
                Parameter::new("post", ParameterLocation::Path, true),
            ]
        );
        assert!(path_parameters("api/users").is_empty());
    }

    #[test]
    fn test_path_parameters_inside_segments() {
        assert_eq!(
            path_parameters("api/files/{file}.{ext}"),
            vec![
                Parameter::new("file", ParameterLocation::Path, true),
                Parameter::new("ext", ParameterLocation::Path, true),
            ]
        );
        assert_eq!(
            path_parameters("api/users/{user}/avatar-{size}"),
            vec![
                Parameter::new("user", ParameterLocation::Path, true),
                Parameter::new("size", ParameterLocation::Path, true),
            ]
        );
        assert!(path_parameters("api/broken/{name").is_empty());
    }

    #[test]
    fn test_is_auth_required() {
        let mw = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert!(is_auth_required(&mw(&["api", "auth"]), "auth"));
        assert!(is_auth_required(&mw(&["auth:sanctum"]), "auth"));
        assert!(!is_auth_required(&mw(&["authorize"]), "auth"));
        assert!(!is_auth_required(&mw(&["api", "throttle:60,1"]), "auth"));
    }

    #[test]
    fn test_skip_match_first_pattern_wins() {
        let skip = vec!["telescope".to_string(), "tele".to_string()];
        assert_eq!(skip_match("api/telescope/entries", &skip), Some("telescope"));
        assert_eq!(skip_match("api/Telescope", &skip), None);
    }

    #[tokio::test]
    async fn test_filters_prefix_closures_and_skips() {
        let mut config = config();
        config.skip = vec!["internal".to_string()];
        let source = manifest(vec![
            RouteDescriptor::new("api/users", &["GET", "HEAD"], "UserController@index"),
            RouteDescriptor::new("web/home", &["GET"], "HomeController@index"),
            RouteDescriptor::new("api/ping", &["GET"], "Closure"),
            RouteDescriptor::new("api/internal/jobs", &["GET"], "JobController@index"),
            RouteDescriptor::new("/api/orders", &["POST"], "OrderController::store"),
        ]);

        let endpoints = extract(&config, &source).await;
        let uris: Vec<_> = endpoints.iter().map(|e| e.uri.as_str()).collect();
        assert_eq!(uris, vec!["/api/users", "/api/orders"]);
    }

    #[tokio::test]
    async fn test_builds_endpoint_record() {
        let mut handlers = IndexMap::new();
        handlers.insert(
            "ProfileController@update".to_string(),
            HandlerSpec::with_rules(json!({"name": "required|string", "age": ["integer"]})),
        );
        let source = RouteManifest::new(
            vec![RouteDescriptor::new(
                "api/dashboard/admin/profile/{id}",
                &["PUT", "PATCH"],
                "ProfileController@update",
            )
            .with_middleware(&["api", "auth:sanctum"])
            .with_name("admin.profile.update")],
            handlers,
        );

        let endpoints = extract(&config(), &source).await;
        assert_eq!(endpoints.len(), 1);
        let endpoint = &endpoints[0];

        assert_eq!(endpoint.uri, "/api/dashboard/admin/profile/{id}");
        assert_eq!(endpoint.tag, "{id}");
        assert_eq!(endpoint.group, "dashboard/admin/profile");
        assert_eq!(endpoint.methods, vec!["PUT", "PATCH"]);
        assert_eq!(endpoint.name.as_deref(), Some("admin.profile.update"));
        assert_eq!(endpoint.action.as_deref(), Some("ProfileController@update"));
        assert!(endpoint.auth_required);
        assert_eq!(
            endpoint.parameters,
            vec![Parameter::new("id", ParameterLocation::Path, true)]
        );

        let schema = endpoint.request_schema.as_ref().unwrap();
        assert_eq!(schema.required, Some(vec!["name".to_string()]));
        assert!(endpoint.response.is_none());
    }

    #[tokio::test]
    async fn test_rule_lookup_failure_leaves_schema_empty() {
        let mut handlers = IndexMap::new();
        handlers.insert(
            "UserController@store".to_string(),
            HandlerSpec::with_rules(json!("required|string")),
        );
        let source = RouteManifest::new(
            vec![RouteDescriptor::new("api/users", &["POST"], "UserController@store")],
            handlers,
        );

        let endpoints = extract(&config(), &source).await;
        assert_eq!(endpoints.len(), 1);
        assert!(endpoints[0].request_schema.is_none());
    }

    #[tokio::test]
    async fn test_capture_samples_get_only_and_survives_failures() {
        let app = Router::new().route(
            "/api/widgets/{id}",
            get(|| async { Json(json!({"id": 1, "name": "sprocket"})) }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let mut config = config();
        config.capture_response = true;
        config.base_url = format!("http://{}", addr);
        let source = manifest(vec![
            RouteDescriptor::new("api/widgets/{id}", &["GET", "HEAD"], "WidgetController@show"),
            RouteDescriptor::new("api/widgets", &["POST"], "WidgetController@store"),
            RouteDescriptor::new("api/gadgets", &["GET"], "GadgetController@index"),
        ]);

        let endpoints = extract(&config, &source).await;
        assert_eq!(endpoints.len(), 3);

        let sample = endpoints[0].response.as_ref().unwrap();
        assert_eq!(sample.status, 200);
        assert_eq!(sample.body, json!({"id": 1, "name": "sprocket"}));
        assert!(endpoints[1].response.is_none());
        assert_eq!(endpoints[2].response.as_ref().unwrap().status, 404);
    }

    #[tokio::test]
    async fn test_unreachable_host_keeps_endpoint() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut config = config();
        config.capture_response = true;
        config.base_url = format!("http://{}", addr);
        let source = manifest(vec![RouteDescriptor::new(
            "api/widgets/{id}",
            &["GET"],
            "WidgetController@show",
        )]);

        let endpoints = extract(&config, &source).await;
        assert_eq!(endpoints.len(), 1);
        assert!(endpoints[0].response.is_none());
    }
}
