//! OpenAPI from routes - OpenAPI documentation from an application's route table.
//!
//! Instead of analysing source code, this library works from the routes a running web
//! application has registered: their URIs, methods, middleware and handlers. Each route in
//! the API prefix becomes an endpoint record with path parameters, a request schema derived
//! from the handler's declared validation rules, an authentication flag and, optionally, a
//! live sample response. Endpoint records are persisted and later assembled into an
//! OpenAPI 3.0 document with hierarchical tag groups.
//!
//! # Architecture
//!
//! 1. [`route_source`] - Raw route descriptors and handler introspection
//! 2. [`schema_generator`] - Translates validation rules into request-body schemas
//! 3. [`auth`] - Resolves the bearer token used for sampling
//! 4. [`sampler`] - Captures live responses of read endpoints
//! 5. [`extractor`] - Filters routes and builds endpoint records
//! 6. [`tag_grouper`] - Derives tags and nested tag groups from paths
//! 7. [`openapi_builder`] - Assembles the OpenAPI document
//! 8. [`serializer`] - Persists the endpoint artifact and serializes documents
//! 9. [`server`] - Serves the viewer page and the assembled document
//!
//! # Example Usage
//!
//! ```no_run
//! use openapi_from_routes::{
//!     config::GeneratorConfig,
//!     extractor::endpoint::EndpointExtractor,
//!     openapi_builder::assemble,
//!     route_source::RouteManifest,
//!     serializer::serialize_json,
//! };
//! use std::path::Path;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = GeneratorConfig::default();
//! let manifest = RouteManifest::load(Path::new("routes.json"))?;
//!
//! let endpoints = EndpointExtractor::new(&config)?.extract(&manifest, None).await;
//! let document = assemble(&endpoints, &config.base_url, &config.project);
//!
//! println!("{}", serialize_json(&document)?);
//! # Ok(())
//! # }
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod extractor;
pub mod openapi_builder;
pub mod route_source;
pub mod sampler;
pub mod schema_generator;
pub mod serializer;
pub mod server;
pub mod tag_grouper;
