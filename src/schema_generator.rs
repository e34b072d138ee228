//! Translation of declared validation rules into request-body schemas.
//!
//! Handlers describe their input as a mapping from field name to a rule list, either as a
//! pipe-delimited string (`"required|integer|min:1"`) or as an ordered list of tokens. Only
//! string tokens carry meaning here; rule objects in a list are ignored.

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field name to rule list, in declaration order
pub type ValidationRules = IndexMap<String, RuleSet>;

/// The rules declared for a single field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RuleSet {
    /// Pipe-delimited rule string, e.g. `required|string|max:255`
    Pipe(String),
    /// Ordered rule tokens; non-string entries are skipped
    List(Vec<Value>),
}

impl RuleSet {
    /// Normalize to an ordered list of rule tokens
    pub fn tokens(&self) -> Vec<&str> {
        match self {
            RuleSet::Pipe(rules) => rules.split('|').filter(|r| !r.is_empty()).collect(),
            RuleSet::List(rules) => rules.iter().filter_map(Value::as_str).collect(),
        }
    }
}

impl From<&str> for RuleSet {
    fn from(rules: &str) -> Self {
        RuleSet::Pipe(rules.to_string())
    }
}

/// OpenAPI Schema definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// The type of the schema (string, number, boolean, object)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Properties for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, Property>>,
    /// Required field names for object types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

/// Property definition for object schemas
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// The type of the property
    #[serde(rename = "type")]
    pub property_type: String,
}

/// OpenAPI RequestBody object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Whether the request body is required
    pub required: bool,
    /// Content types and their schemas
    pub content: IndexMap<String, MediaType>,
}

/// OpenAPI MediaType object carrying a schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    pub schema: Schema,
}

impl Schema {
    /// A scalar schema with only a type
    pub fn of_type(schema_type: &str) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            properties: None,
            required: None,
        }
    }

    /// Whether this object schema describes at least one field
    pub fn has_properties(&self) -> bool {
        self.properties.as_ref().is_some_and(|p| !p.is_empty())
    }
}

/// Translate declared validation rules into an object schema.
///
/// Returns `None` for an empty rule set so callers emit no request body at all.
pub fn translate(rules: &ValidationRules) -> Option<Schema> {
    if rules.is_empty() {
        return None;
    }

    let mut properties = IndexMap::new();
    let mut required = Vec::new();

    for (field, rule_set) in rules {
        let tokens = rule_set.tokens();
        let has = |name: &str| tokens.iter().any(|t| rule_name(t) == name);

        let mut field_type = "string";
        if has("numeric") || has("integer") {
            field_type = "number";
        }
        // Evaluated after the numeric check so boolean wins when both are declared.
        if has("boolean") {
            field_type = "boolean";
        }

        debug!("Field '{}' rules {:?} -> {}", field, tokens, field_type);
        properties.insert(
            field.clone(),
            Property {
                property_type: field_type.to_string(),
            },
        );

        if has("required") {
            required.push(field.clone());
        }
    }

    Some(Schema {
        schema_type: Some("object".to_string()),
        properties: Some(properties),
        required: Some(required),
    })
}

/// Wrap an object schema as a required JSON request body.
///
/// Schemas without properties produce no body.
pub fn request_body(schema: &Schema) -> Option<RequestBody> {
    if !schema.has_properties() {
        return None;
    }

    let mut content = IndexMap::new();
    content.insert(
        "application/json".to_string(),
        MediaType {
            schema: schema.clone(),
        },
    );
    Some(RequestBody {
        required: true,
        content,
    })
}

/// Rule name without its parameters (`max:255` -> `max`)
fn rule_name(token: &str) -> &str {
    token.split(':').next().unwrap_or(token).trim()
}
