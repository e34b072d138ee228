//! Serialization of OpenAPI documents and persistence of the endpoint artifact.
//!
//! The generation step writes an [`Artifact`] (project metadata plus the extracted endpoint
//! list) as pretty JSON; the serving step reads it back on every request. Reading never
//! fails loudly: a missing or malformed artifact is reported as `None`.

use crate::error::{Error, Result};
use crate::extractor::Endpoint;
use crate::openapi_builder::OpenApiDocument;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use time::macros::format_description;
use time::OffsetDateTime;

/// Persisted output of a generation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Artifact {
    pub project: String,
    pub base_url: String,
    /// UTC timestamp of the run, `YYYY-MM-DD HH:MM:SS`
    pub generated_at: String,
    pub endpoints: Vec<Endpoint>,
}

impl Artifact {
    /// Wrap freshly extracted endpoints, stamped with the current time
    pub fn new(project: &str, base_url: &str, endpoints: Vec<Endpoint>) -> Self {
        Self {
            project: project.to_string(),
            base_url: base_url.to_string(),
            generated_at: timestamp(OffsetDateTime::now_utc()),
            endpoints,
        }
    }
}

fn timestamp(at: OffsetDateTime) -> String {
    at.format(format_description!(
        "[year]-[month]-[day] [hour]:[minute]:[second]"
    ))
    .unwrap_or_else(|_| "invalid-timestamp".into())
}

/// Serializes an OpenAPI document to YAML format.
pub fn serialize_yaml(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to YAML");
    Ok(serde_yaml::to_string(doc)?)
}

/// Serializes an OpenAPI document to JSON format with pretty printing.
pub fn serialize_json(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to JSON");
    Ok(serde_json::to_string_pretty(doc)?)
}

/// Writes string content to a file, creating parent directories as needed.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

/// Persist the artifact as pretty JSON
pub fn write_artifact(artifact: &Artifact, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(artifact)?;
    write_to_file(&json, path)
}

/// Read a previously written artifact; missing or malformed files yield `None`
pub fn read_artifact(path: &Path) -> Option<Artifact> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            warn!("Cannot read endpoint artifact {}: {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_str(&content) {
        Ok(artifact) => Some(artifact),
        Err(e) => {
            warn!(
                "{}",
                Error::SerializationError(format!("malformed artifact {}: {}", path.display(), e))
            );
            None
        }
    }
}
