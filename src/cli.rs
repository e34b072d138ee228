use crate::config::{parse_skip_list, AuthMode, GeneratorConfig};
use crate::extractor::endpoint::EndpointExtractor;
use crate::openapi_builder::assemble;
use crate::route_source::RouteManifest;
use crate::serializer::{serialize_json, serialize_yaml, write_artifact, write_to_file, Artifact};
use crate::server::{serve, ServeConfig};
use anyhow::{Context, Result};
use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand};
use log::{debug, info};
use std::net::SocketAddr;
use std::path::PathBuf;

/// OpenAPI from routes - document an application's HTTP API from its route table
#[derive(Parser, Debug)]
#[command(name = "openapi-from-routes")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Extract endpoints from a route manifest and write the endpoint artifact
    Generate(GenerateArgs),
    /// Serve the documentation viewer and the assembled OpenAPI document
    Serve(ServeArgs),
}

#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    /// Route manifest (JSON or YAML), e.g. a route-list JSON export
    #[arg(long, value_name = "FILE")]
    pub routes: PathBuf,

    /// YAML configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Application name recorded in the artifact
    #[arg(long)]
    pub project: Option<String>,

    /// Output file path
    #[arg(long, value_name = "FILE")]
    pub path: Option<PathBuf>,

    /// Base URL of the running application
    #[arg(long = "base-url")]
    pub base_url: Option<String>,

    /// Sample live responses of GET endpoints (1/0)
    #[arg(long = "capture-response", value_parser = BoolishValueParser::new())]
    pub capture_response: Option<bool>,

    /// Timeout in seconds for login and sampling requests
    #[arg(long)]
    pub timeout: Option<u64>,

    /// none | manual | login
    #[arg(long = "auth-mode")]
    pub auth_mode: Option<AuthMode>,

    /// Token used for sampling, overriding the auth mode
    #[arg(long)]
    pub token: Option<String>,

    /// Authorization scheme prefix
    #[arg(long = "token-type")]
    pub token_type: Option<String>,

    /// Login URL, relative to the base URL unless absolute
    #[arg(long = "login-url")]
    pub login_url: Option<String>,

    /// POST | GET
    #[arg(long = "login-method")]
    pub login_method: Option<String>,

    /// Login email
    #[arg(long = "login-email", env = "LOGIN_EMAIL")]
    pub login_email: Option<String>,

    /// Login password
    #[arg(long = "login-password", env = "LOGIN_PASSWORD", hide_env_values = true)]
    pub login_password: Option<String>,

    /// Dot path of the token in the login response
    #[arg(long = "token-key")]
    pub token_key: Option<String>,

    /// Comma-separated URI substrings to leave out
    #[arg(long)]
    pub skip: Option<String>,

    /// Also write the assembled OpenAPI document (.json, .yaml or .yml)
    #[arg(long, value_name = "FILE")]
    pub openapi: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Endpoint artifact written by `generate`
    #[arg(long, value_name = "FILE", default_value = "public/api-docs.json")]
    pub path: PathBuf,

    /// Address to listen on
    #[arg(long, default_value = "127.0.0.1:8080")]
    pub listen: SocketAddr,

    /// Project name shown in the document title
    #[arg(long)]
    pub title: Option<String>,
}

impl GenerateArgs {
    /// Overlay command-line options on a loaded configuration
    pub fn apply(&self, mut config: GeneratorConfig) -> GeneratorConfig {
        if let Some(project) = &self.project {
            config.project = project.clone();
        }
        if let Some(path) = &self.path {
            config.path = path.clone();
        }
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(capture) = self.capture_response {
            config.capture_response = capture;
        }
        if let Some(timeout) = self.timeout {
            config.timeout = timeout;
        }
        if let Some(mode) = self.auth_mode {
            config.auth.mode = mode;
        }
        if let Some(token_type) = &self.token_type {
            config.auth.token_type = token_type.clone();
        }
        if let Some(url) = &self.login_url {
            config.auth.login.url = url.clone();
        }
        if let Some(method) = &self.login_method {
            config.auth.login.method = method.to_uppercase();
        }
        if let Some(email) = &self.login_email {
            config.auth.login.email = email.clone();
        }
        if let Some(password) = &self.login_password {
            config.auth.login.password = password.clone();
        }
        if let Some(token_key) = &self.token_key {
            config.auth.login.token_key = token_key.clone();
        }
        if let Some(skip) = &self.skip {
            config.skip = parse_skip_list(skip);
        }
        config.normalized()
    }
}

/// Run the selected subcommand
pub async fn run(args: CliArgs) -> Result<()> {
    debug!("Parsed arguments: {:?}", args.command);
    match args.command {
        Command::Generate(generate) => run_generate(generate).await,
        Command::Serve(serve_args) => {
            serve(
                serve_args.listen,
                ServeConfig {
                    artifact_path: serve_args.path,
                    title_override: serve_args.title,
                },
            )
            .await
        }
    }
}

/// Extract endpoints and persist the artifact
pub async fn run_generate(args: GenerateArgs) -> Result<()> {
    let config = args.apply(GeneratorConfig::load(args.config.as_deref())?);

    info!("Starting endpoint extraction...");
    info!("Route manifest: {}", args.routes.display());
    info!("Base URL: {}", config.base_url);
    info!(
        "Response capture: {} (auth mode: {})",
        if config.capture_response { "on" } else { "off" },
        config.auth.mode
    );

    let manifest = RouteManifest::load(&args.routes)
        .with_context(|| format!("Failed to load route manifest {}", args.routes.display()))?;

    let extractor = EndpointExtractor::new(&config)?;
    let endpoints = extractor.extract(&manifest, args.token.as_deref()).await;
    let sampled = endpoints.iter().filter(|e| e.response.is_some()).count();

    let artifact = Artifact::new(&config.project, &config.base_url, endpoints);
    write_artifact(&artifact, &config.path)
        .with_context(|| format!("Failed to write endpoint artifact {}", config.path.display()))?;
    info!("Wrote {}", config.path.display());

    if let Some(openapi_path) = &args.openapi {
        let document = assemble(&artifact.endpoints, &artifact.base_url, &artifact.project);
        let is_yaml = matches!(
            openapi_path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let content = if is_yaml {
            serialize_yaml(&document)?
        } else {
            serialize_json(&document)?
        };
        write_to_file(&content, openapi_path).with_context(|| {
            format!("Failed to write OpenAPI document {}", openapi_path.display())
        })?;
        info!("Wrote OpenAPI document to {}", openapi_path.display());
    }

    info!("Generation complete!");
    info!("Summary:");
    info!("  - Endpoints documented: {}", artifact.endpoints.len());
    info!("  - Responses sampled: {}", sampled);

    Ok(())
}
