//! Endpoint extraction from the host application's route table.
//!
//! The extractor filters raw [`RouteDescriptor`](crate::route_source::RouteDescriptor)s down to
//! the documented API surface and turns each into a normalized [`Endpoint`] record. The
//! endpoint list is the artifact persisted between the generation and serving steps.
//!
//! # Example
//!
//! ```no_run
//! use openapi_from_routes::config::GeneratorConfig;
//! use openapi_from_routes::extractor::endpoint::EndpointExtractor;
//! use openapi_from_routes::route_source::RouteManifest;
//! use std::path::Path;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let manifest = RouteManifest::load(Path::new("routes.json"))?;
//! let config = GeneratorConfig::default();
//! let extractor = EndpointExtractor::new(&config)?;
//! let endpoints = extractor.extract(&manifest, None).await;
//! println!("Found {} endpoints", endpoints.len());
//! # Ok(())
//! # }
//! ```

pub mod endpoint;

use crate::schema_generator::Schema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Complete information about a single documented API endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Group path of the endpoint joined with `/` (empty for top-level endpoints)
    pub group: String,
    /// Flat tag, the last path segment after the API prefix
    pub tag: String,
    /// Declared HTTP methods, primary first
    pub methods: Vec<String>,
    /// URI with a leading slash, e.g. `/api/users/{id}`
    pub uri: String,
    /// Route name, e.g. `users.show`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Human-readable handler reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    /// Path placeholders followed by declared query parameters
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    /// Object schema derived from the handler's validation rules
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_schema: Option<Schema>,
    /// Whether an authentication middleware guards the route
    #[serde(default)]
    pub auth_required: bool,
    /// Live response captured during generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<SampledResponse>,
}

impl Endpoint {
    /// Primary HTTP method, lowercased (`get` when none is declared)
    pub fn primary_method(&self) -> String {
        self.methods
            .first()
            .map(|m| m.to_lowercase())
            .unwrap_or_else(|| "get".to_string())
    }
}

/// Information about a single request parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// The parameter name
    pub name: String,
    /// Where the parameter is read from
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    /// Whether the parameter must be supplied
    pub required: bool,
}

impl Parameter {
    /// Create a new Parameter
    pub fn new(name: impl Into<String>, location: ParameterLocation, required: bool) -> Self {
        Self {
            name: name.into(),
            location,
            required,
        }
    }
}

/// The location where a parameter value is extracted from in an HTTP request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// Path placeholder (e.g., `/users/{id}`)
    Path,
    /// Query string parameter (e.g., `?page=1`)
    Query,
}

/// Status and body captured from a live read against an endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampledResponse {
    pub status: u16,
    pub body: Value,
}
