//! Documentation server.
//!
//! `GET /api-docs` returns the viewer page and `GET /api-docs/openapi.json` the assembled
//! document. Every document request re-reads the artifact and re-assembles, so the server
//! holds no mutable state.

use crate::openapi_builder::{assemble, OpenApiDocument};
use crate::serializer::read_artifact;
use anyhow::{Context, Result};
use axum::{extract::State, response::Html, routing::get, Json, Router};
use log::{info, warn};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

const VIEWER_PAGE: &str = include_str!("../assets/viewer.html");

/// Title used when neither the artifact nor the command line names the project
const FALLBACK_PROJECT: &str = "Laravel";

/// Immutable serving configuration
#[derive(Debug, Clone)]
pub struct ServeConfig {
    /// Artifact written by the generation step
    pub artifact_path: PathBuf,
    /// Replaces the project name recorded in the artifact
    pub title_override: Option<String>,
}

pub type SharedConfig = Arc<ServeConfig>;

/// Build the documentation routes
pub fn router(config: ServeConfig) -> Router {
    Router::new()
        .route("/api-docs", get(viewer))
        .route("/api-docs/openapi.json", get(openapi_json))
        .with_state(Arc::new(config))
}

/// Bind `addr` and serve until interrupted
pub async fn serve(addr: SocketAddr, config: ServeConfig) -> Result<()> {
    info!(
        "Serving documentation for {} at http://{}/api-docs",
        config.artifact_path.display(),
        addr
    );

    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, router(config))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Documentation server failed")?;

    info!("Documentation server stopped");
    Ok(())
}

async fn viewer() -> Html<&'static str> {
    Html(VIEWER_PAGE)
}

async fn openapi_json(State(config): State<SharedConfig>) -> Json<OpenApiDocument> {
    Json(load_document(&config).await)
}

/// Assemble the current document, or an empty one when the artifact is unusable
pub async fn load_document(config: &ServeConfig) -> OpenApiDocument {
    let path = config.artifact_path.clone();
    let artifact = tokio::task::spawn_blocking(move || read_artifact(&path))
        .await
        .ok()
        .flatten();

    match artifact {
        Some(artifact) => {
            let project = config
                .title_override
                .as_deref()
                .unwrap_or(artifact.project.as_str());
            assemble(&artifact.endpoints, &artifact.base_url, project)
        }
        None => {
            warn!("No usable endpoint artifact; serving an empty document");
            let project = config
                .title_override
                .as_deref()
                .unwrap_or(FALLBACK_PROJECT);
            assemble(&[], "", project)
        }
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {},
                    _ = term.recv() => {},
                }
            }
            Err(e) => {
                warn!("Cannot install SIGTERM handler: {}", e);
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
