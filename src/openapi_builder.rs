use crate::extractor::{Endpoint, Parameter, ParameterLocation};
use crate::schema_generator::{request_body, RequestBody, Schema};
use crate::tag_grouper::{sort_tags, TagGroupEntry, TagGroups};
use indexmap::IndexMap;
use log::debug;
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Methods whose operations carry a request body
const BODY_METHODS: [&str; 3] = ["post", "put", "patch"];

/// OpenAPI document builder
pub struct OpenApiBuilder {
    /// OpenAPI info section
    info: Info,
    /// Server list
    servers: Vec<Server>,
    /// Paths collection (URI -> lowercase method -> Operation)
    paths: IndexMap<String, IndexMap<String, Operation>>,
    /// Tags in first-seen order, before sorting
    tags: Vec<String>,
    /// Nested tag groups
    groups: TagGroups,
}

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
}

/// OpenAPI Server object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
}

/// OpenAPI Tag object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
}

/// OpenAPI Operation object - represents a single API operation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    pub tags: Vec<String>,
    pub summary: String,
    pub description: String,
    #[serde(rename = "operationId")]
    pub operation_id: String,
    pub parameters: Vec<OperationParameter>,
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Security requirements; empty for public endpoints
    pub security: Vec<IndexMap<String, Vec<String>>>,
    /// Exactly one entry keyed by status code
    pub responses: IndexMap<String, Response>,
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationParameter {
    /// Parameter name
    pub name: String,
    /// Parameter location (path, query)
    #[serde(rename = "in")]
    pub location: ParameterLocation,
    /// Whether the parameter is required
    pub required: bool,
    /// Parameter schema
    pub schema: Schema,
}

/// OpenAPI Response object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// Response description
    pub description: String,
    /// Response content keyed by media type
    pub content: IndexMap<String, Example>,
}

/// Media type entry holding an example payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example {
    pub example: Value,
}

/// OpenAPI security scheme
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: String,
    pub scheme: String,
}

/// OpenAPI Components object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Components {
    #[serde(rename = "securitySchemes")]
    pub security_schemes: IndexMap<String, SecurityScheme>,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version
    pub openapi: String,
    /// API info
    pub info: Info,
    pub servers: Vec<Server>,
    pub components: Components,
    /// Sorted tags, `general` last
    pub tags: Vec<Tag>,
    /// Nested tag groups for viewers that support them
    #[serde(rename = "x-tagGroups")]
    pub tag_groups: Vec<TagGroupEntry>,
    /// API paths
    pub paths: IndexMap<String, IndexMap<String, Operation>>,
}

impl OpenApiBuilder {
    /// Create a new OpenApiBuilder titled after the application
    pub fn new(app_title: &str) -> Self {
        debug!("Initializing OpenApiBuilder");
        Self {
            info: Info {
                title: format!("{} API Documentation", app_title),
                version: "1.0.0".to_string(),
            },
            servers: Vec::new(),
            paths: IndexMap::new(),
            tags: Vec::new(),
            groups: TagGroups::new(),
        }
    }

    /// Add a server URL
    pub fn with_server(mut self, url: &str) -> Self {
        self.servers.push(Server {
            url: url.to_string(),
        });
        self
    }

    /// Add an endpoint to the OpenAPI document.
    ///
    /// Only the primary method is documented; a later endpoint with the same URI and primary
    /// method replaces an earlier one.
    pub fn add_endpoint(&mut self, endpoint: &Endpoint) {
        let method = endpoint.primary_method();
        debug!("Adding endpoint: {} {}", method, endpoint.uri);

        let group_path: Vec<String> = endpoint
            .group
            .split('/')
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        self.tags.push(endpoint.tag.clone());
        self.groups.insert(&group_path, &endpoint.tag);

        let request_body = if BODY_METHODS.contains(&method.as_str()) {
            endpoint.request_schema.as_ref().and_then(request_body)
        } else {
            None
        };

        let security = if endpoint.auth_required {
            vec![IndexMap::from([("bearerAuth".to_string(), Vec::new())])]
        } else {
            Vec::new()
        };

        let (status, example) = match &endpoint.response {
            Some(sample) => (sample.status, sample.body.clone()),
            None => (200, Value::Null),
        };
        let mut responses = IndexMap::new();
        responses.insert(
            status.to_string(),
            Response {
                description: "Auto captured response".to_string(),
                content: IndexMap::from([("application/json".to_string(), Example { example })]),
            },
        );

        let operation = Operation {
            tags: vec![endpoint.tag.clone()],
            summary: format!("{} {}", endpoint.name.as_deref().unwrap_or(""), endpoint.uri)
                .trim()
                .to_string(),
            description: endpoint.action.clone().unwrap_or_default(),
            operation_id: operation_id(endpoint, &method),
            parameters: endpoint.parameters.iter().map(to_operation_parameter).collect(),
            request_body,
            security,
            responses,
        };

        self.paths
            .entry(endpoint.uri.clone())
            .or_default()
            .insert(method, operation);
    }

    /// Build the final OpenAPI document
    pub fn build(self) -> OpenApiDocument {
        debug!("Building final OpenAPI document");

        let mut security_schemes = IndexMap::new();
        security_schemes.insert(
            "bearerAuth".to_string(),
            SecurityScheme {
                scheme_type: "http".to_string(),
                scheme: "bearer".to_string(),
            },
        );

        OpenApiDocument {
            openapi: "3.0.0".to_string(),
            info: self.info,
            servers: self.servers,
            components: Components { security_schemes },
            tags: sort_tags(self.tags)
                .into_iter()
                .map(|name| Tag { name })
                .collect(),
            tag_groups: self.groups.to_entries(),
            paths: self.paths,
        }
    }
}

/// Assemble a document from persisted endpoints
pub fn assemble(endpoints: &[Endpoint], base_url: &str, app_title: &str) -> OpenApiDocument {
    let mut builder = OpenApiBuilder::new(app_title).with_server(base_url);
    for endpoint in endpoints {
        builder.add_endpoint(endpoint);
    }
    builder.build()
}

/// Route name with `.` and `-` as `_`, or `<method>_<md5 of uri>` for unnamed routes
pub fn operation_id(endpoint: &Endpoint, method: &str) -> String {
    match endpoint.name.as_deref().filter(|n| !n.is_empty()) {
        Some(name) => name.replace(['.', '-'], "_"),
        None => {
            let digest = Md5::digest(endpoint.uri.as_bytes());
            format!("{}_{}", method, hex::encode(digest))
        }
    }
}

fn to_operation_parameter(param: &Parameter) -> OperationParameter {
    OperationParameter {
        name: param.name.clone(),
        location: param.location,
        required: param.required,
        schema: Schema::of_type("string"),
    }
}
