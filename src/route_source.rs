//! Route table access.
//!
//! The host application's router is the source of truth for which routes exist. This module
//! defines the raw [`RouteDescriptor`] shape, the [`RouteSource`] seam through which the
//! extractor reads routes and resolves their handlers, and [`RouteManifest`], a file-backed
//! source that accepts a framework route-list export (`[{"method": "GET|HEAD", "uri": ...}]`)
//! or a richer document that also describes handlers.

use crate::error::{Error, Result};
use crate::extractor::{Parameter, ParameterLocation};
use crate::schema_generator::ValidationRules;
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::fs;
use std::path::Path;

/// A raw route as registered with the host router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDescriptor {
    /// Route URI without a leading slash, e.g. `api/users/{id}`
    #[serde(deserialize_with = "deserialize_uri")]
    pub uri: String,
    /// HTTP methods in declaration order
    #[serde(alias = "method", deserialize_with = "deserialize_methods")]
    pub methods: Vec<String>,
    /// Handler reference such as `UserController@show`, or `Closure`
    pub action: String,
    /// Middleware applied to the route
    #[serde(default)]
    pub middleware: Vec<String>,
    /// Route name
    #[serde(default)]
    pub name: Option<String>,
}

impl RouteDescriptor {
    /// Create a route with no middleware and no name
    pub fn new(uri: &str, methods: &[&str], action: &str) -> Self {
        Self {
            uri: uri.trim_start_matches('/').to_string(),
            methods: methods.iter().map(|m| m.to_uppercase()).collect(),
            action: action.to_string(),
            middleware: Vec::new(),
            name: None,
        }
    }

    pub fn with_middleware(mut self, middleware: &[&str]) -> Self {
        self.middleware = middleware.iter().map(|m| m.to_string()).collect();
        self
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }
}

/// A concrete controller method a route dispatches to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HandlerRef {
    pub controller: String,
    pub method: String,
}

impl HandlerRef {
    /// Parse `Controller@method` or `Controller::method`.
    ///
    /// Inline handlers (`Closure`) and any other shape do not resolve.
    pub fn parse(action: &str) -> Option<Self> {
        let (controller, method) = action
            .split_once('@')
            .or_else(|| action.split_once("::"))?;

        if controller.is_empty() || method.is_empty() {
            return None;
        }

        Some(Self {
            controller: controller.to_string(),
            method: method.to_string(),
        })
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.controller, self.method)
    }
}

/// Optional introspection capability of a route handler.
///
/// Handlers that declare nothing keep the default implementations and simply contribute an
/// empty schema.
pub trait SchemaProvider {
    /// Validation rules declared for the handler's input, if any
    fn declared_validation_rules(&self) -> Result<Option<ValidationRules>>;

    /// Query parameters declared for the handler's input
    fn declared_query_parameters(&self) -> Vec<Parameter> {
        Vec::new()
    }

    /// Free-form description of the handler
    fn description(&self) -> Option<String> {
        None
    }
}

/// Trait for reading the host application's route table.
pub trait RouteSource {
    /// Snapshot of all registered routes, in registration order
    fn routes(&self) -> Vec<RouteDescriptor>;

    /// Resolve an action identifier to a concrete handler
    fn resolve(&self, action: &str) -> Option<HandlerRef> {
        HandlerRef::parse(action)
    }

    /// Introspection capability of a resolved handler
    fn schema_provider(&self, handler: &HandlerRef) -> Option<&dyn SchemaProvider>;
}

/// Handler metadata as written in a route manifest.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HandlerSpec {
    /// Field to rule mapping; anything other than a mapping fails the lookup
    #[serde(default)]
    pub rules: Option<Value>,
    #[serde(default)]
    pub query: Vec<QueryParam>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(skip)]
    action: String,
}

/// A query parameter declared by a handler.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryParam {
    pub name: String,
    #[serde(default)]
    pub required: bool,
}

impl HandlerSpec {
    /// Handler metadata declaring only validation rules
    pub fn with_rules(rules: Value) -> Self {
        Self {
            rules: Some(rules),
            ..Self::default()
        }
    }
}

impl SchemaProvider for HandlerSpec {
    fn declared_validation_rules(&self) -> Result<Option<ValidationRules>> {
        match &self.rules {
            None | Some(Value::Null) => Ok(None),
            Some(rules @ Value::Object(_)) => serde_json::from_value(rules.clone())
                .map(Some)
                .map_err(|e| Error::RuleLookup {
                    action: self.action.clone(),
                    message: e.to_string(),
                }),
            Some(_) => Err(Error::RuleLookup {
                action: self.action.clone(),
                message: "rules must be a mapping of field to rules".to_string(),
            }),
        }
    }

    fn declared_query_parameters(&self) -> Vec<Parameter> {
        self.query
            .iter()
            .map(|q| Parameter::new(q.name.clone(), ParameterLocation::Query, q.required))
            .collect()
    }

    fn description(&self) -> Option<String> {
        self.description.clone()
    }
}

/// File-backed route source.
#[derive(Debug, Clone, Default)]
pub struct RouteManifest {
    routes: Vec<RouteDescriptor>,
    handlers: IndexMap<HandlerRef, HandlerSpec>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawManifest {
    Full {
        routes: Vec<RouteDescriptor>,
        #[serde(default)]
        handlers: IndexMap<String, HandlerSpec>,
    },
    Routes(Vec<RouteDescriptor>),
}

impl RouteManifest {
    /// Build a manifest from in-memory routes and handler metadata keyed by action
    pub fn new(routes: Vec<RouteDescriptor>, handlers: IndexMap<String, HandlerSpec>) -> Self {
        let mut keyed = IndexMap::new();
        for (action, mut spec) in handlers {
            match HandlerRef::parse(&action) {
                Some(handler) => {
                    spec.action = handler.to_string();
                    keyed.insert(handler, spec);
                }
                None => warn!("Ignoring handler entry with unresolvable action '{}'", action),
            }
        }
        Self {
            routes,
            handlers: keyed,
        }
    }

    /// Load a manifest from a JSON or YAML file (chosen by extension).
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading route manifest from {}", path.display());
        let content = fs::read_to_string(path)?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let raw: RawManifest = if is_yaml {
            serde_yaml::from_str(&content).map_err(|e| Error::ManifestError {
                file: path.to_path_buf(),
                message: e.to_string(),
            })?
        } else {
            serde_json::from_str(&content).map_err(|e| Error::ManifestError {
                file: path.to_path_buf(),
                message: e.to_string(),
            })?
        };

        let manifest = match raw {
            RawManifest::Full { routes, handlers } => Self::new(routes, handlers),
            RawManifest::Routes(routes) => Self::new(routes, IndexMap::new()),
        };
        debug!(
            "Loaded {} routes and {} handler descriptions",
            manifest.routes.len(),
            manifest.handlers.len()
        );
        Ok(manifest)
    }
}

impl RouteSource for RouteManifest {
    fn routes(&self) -> Vec<RouteDescriptor> {
        self.routes.clone()
    }

    fn schema_provider(&self, handler: &HandlerRef) -> Option<&dyn SchemaProvider> {
        self.handlers
            .get(handler)
            .map(|spec| spec as &dyn SchemaProvider)
    }
}

fn deserialize_uri<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<String, D::Error> {
    let uri = String::deserialize(deserializer)?;
    Ok(uri.trim_start_matches('/').to_string())
}

fn deserialize_methods<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<Vec<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Methods {
        Pipe(String),
        List(Vec<String>),
    }

    let raw = match Methods::deserialize(deserializer)? {
        Methods::Pipe(methods) => methods.split('|').map(str::to_string).collect(),
        Methods::List(methods) => methods,
    };

    let mut methods: Vec<String> = Vec::new();
    for method in raw {
        let method = method.trim().to_uppercase();
        if !method.is_empty() && !methods.contains(&method) {
            methods.push(method);
        }
    }

    if methods.is_empty() {
        return Err(serde::de::Error::custom("route declares no HTTP methods"));
    }
    Ok(methods)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_parse_action_forms() {
        assert_eq!(
            HandlerRef::parse("App\\Http\\Controllers\\UserController@index"),
            Some(HandlerRef {
                controller: "App\\Http\\Controllers\\UserController".to_string(),
                method: "index".to_string(),
            })
        );
        assert_eq!(
            HandlerRef::parse("UserController::show").map(|h| h.to_string()),
            Some("UserController@show".to_string())
        );
        assert_eq!(HandlerRef::parse("Closure"), None);
        assert_eq!(HandlerRef::parse("@index"), None);
        assert_eq!(HandlerRef::parse("UserController@"), None);
    }

    #[test]
    fn test_route_list_export_shape() {
        let route: RouteDescriptor = serde_json::from_value(json!({
            "domain": null,
            "method": "GET|HEAD",
            "uri": "api/users/{user}",
            "name": "users.show",
            "action": "UserController@show",
            "middleware": ["api", "auth:sanctum"]
        }))
        .unwrap();

        assert_eq!(route.methods, vec!["GET", "HEAD"]);
        assert_eq!(route.uri, "api/users/{user}");
        assert_eq!(route.name.as_deref(), Some("users.show"));
        assert_eq!(route.middleware, vec!["api", "auth:sanctum"]);
    }

    #[test]
    fn test_methods_list_normalized_and_deduplicated() {
        let route: RouteDescriptor = serde_json::from_value(json!({
            "methods": ["post", "POST", "put"],
            "uri": "/api/items",
            "action": "ItemController@store"
        }))
        .unwrap();

        assert_eq!(route.methods, vec!["POST", "PUT"]);
        assert_eq!(route.uri, "api/items");
    }

    #[test]
    fn test_empty_methods_rejected() {
        let result: std::result::Result<RouteDescriptor, _> = serde_json::from_value(json!({
            "methods": "",
            "uri": "api/items",
            "action": "ItemController@index"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_bare_route_list() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "routes.json",
            r#"[{"method": "GET|HEAD", "uri": "api/ping", "action": "Closure"}]"#,
        );

        let manifest = RouteManifest::load(&path).unwrap();
        assert_eq!(manifest.routes().len(), 1);
    }

    #[test]
    fn test_load_yaml_manifest_with_handlers() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "routes.yaml",
            r#"
routes:
  - uri: api/users
    methods: [POST]
    action: UserController@store
handlers:
  "UserController::store":
    rules:
      name: required|string
      roles: [array, required]
    query:
      - name: include
    description: Create a user
"#,
        );

        let manifest = RouteManifest::load(&path).unwrap();
        let handler = manifest.resolve("UserController@store").unwrap();
        let provider = manifest.schema_provider(&handler).unwrap();

        let rules = provider.declared_validation_rules().unwrap().unwrap();
        assert_eq!(rules.keys().collect::<Vec<_>>(), vec!["name", "roles"]);
        assert_eq!(provider.description().as_deref(), Some("Create a user"));
        assert_eq!(
            provider.declared_query_parameters(),
            vec![Parameter::new("include", ParameterLocation::Query, false)]
        );
    }

    #[test]
    fn test_non_mapping_rules_fail_lookup() {
        let manifest = RouteManifest::new(
            vec![],
            IndexMap::from([(
                "UserController@store".to_string(),
                HandlerSpec::with_rules(json!(["required"])),
            )]),
        );
        let handler = HandlerRef::parse("UserController@store").unwrap();
        let err = manifest
            .schema_provider(&handler)
            .unwrap()
            .declared_validation_rules()
            .unwrap_err();
        assert!(err.to_string().contains("UserController@store"));
    }

    #[test]
    fn test_load_missing_and_malformed() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            RouteManifest::load(&dir.path().join("absent.json")),
            Err(Error::IoError(_))
        ));

        let path = write_file(&dir, "broken.json", "{\"routes\": 5}");
        assert!(matches!(
            RouteManifest::load(&path),
            Err(Error::ManifestError { .. })
        ));
    }
}
