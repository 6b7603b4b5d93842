//! Hookwise CLI.
//!
//! Composition root for running the standard GitHub catalogue outside a web
//! server:
//!
//! 1. **Wire observability**: `tracing-subscriber` with an `EnvFilter` and an
//!    optional JSON layer.
//! 2. **Load configuration**: built-in defaults overlaid with an optional YAML
//!    file.
//! 3. **Construct the dispatcher**: catalogue, a logging handler on the base
//!    event, and the configured check-run and credential ports.
//! 4. **Run the command**: replay a recorded delivery, resolve one without
//!    running handlers, print the taxonomy, or print configuration.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dispatch::{
    CheckRunRef, CheckRunReporter, CheckRunUpdate, ConfigNode, Dispatcher, EnvCredentialProvider,
    HandlerRegistryBuilder, RawHeaders, Taxonomy, DEFAULT_PRIVATE_KEY_PATH,
};
use github::EventCatalogue;
use listener::{IndexPage, WebhookReceiver, WebhookResponse};
use serde_json::{json, Value};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// ============================================================================
// CLI Structure
// ============================================================================

/// Hookwise - typed dispatch for GitHub webhooks
#[derive(Debug, Parser)]
#[command(name = "hookwise")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Resolve and dispatch GitHub webhook deliveries")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "HOOKWISE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level, used when RUST_LOG is not set
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Enable JSON logging
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Replay a recorded delivery through the dispatcher
    Dispatch {
        /// JSON object of request headers
        #[arg(long)]
        headers: PathBuf,

        /// Raw request body
        #[arg(long)]
        body: PathBuf,
    },

    /// Print the event type a recorded delivery resolves to
    Resolve {
        /// JSON object of request headers
        #[arg(long)]
        headers: PathBuf,

        /// Raw request body
        #[arg(long)]
        body: PathBuf,
    },

    /// Print the event type hierarchy
    Taxonomy,

    /// Print the effective configuration, or one value of it
    Config {
        /// Dotted path of the value to print
        path: Option<String>,
    },

    /// Print the landing page served at `/`
    Index,
}

// ============================================================================
// Setup
// ============================================================================

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `level`.
pub fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

/// Built-in defaults overlaid with the optional configuration file.
pub fn load_config(path: Option<&Path>) -> Result<ConfigNode> {
    let mut config = ConfigNode::new();
    config.create_config("app", None, object(json!({ "name": "hookwise" })))?;
    config.create_config("check_runs", None, object(json!({ "report_failures": true })))?;
    config.create_config(
        "credentials",
        None,
        object(json!({
            "from_env": false,
            "private_key_path": DEFAULT_PRIVATE_KEY_PATH,
        })),
    )?;

    if let Some(path) = path {
        let loaded = config
            .load_yaml_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?;
        if !loaded {
            warn!(path = %path.display(), "Configuration file not found; using defaults");
        }
    }
    Ok(config)
}

fn object(value: Value) -> serde_json::Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}

/// Logs check-run updates instead of sending them to GitHub.
#[derive(Debug, Default)]
pub struct LoggingReporter;

impl CheckRunReporter for LoggingReporter {
    fn update(
        &self,
        check_run: &CheckRunRef,
        update: &CheckRunUpdate,
    ) -> Result<(), dispatch::CheckRunError> {
        warn!(
            check_run = %check_run.id(),
            conclusion = %update.conclusion,
            text = update.text.as_deref().unwrap_or_default(),
            "Check run update"
        );
        Ok(())
    }
}

/// Build the dispatcher for the standard catalogue.
///
/// A single handler on the base event logs every delivery.
pub fn build_dispatcher(catalogue: &EventCatalogue, config: &ConfigNode) -> Result<Dispatcher> {
    let taxonomy = catalogue.taxonomy();
    let mut registry = HandlerRegistryBuilder::new(Arc::clone(taxonomy));
    registry.register_fn(taxonomy.base(), "log_delivery", |event| {
        info!(
            event_type = event.type_name(),
            action = event.action().unwrap_or("-"),
            repository = %event.repository().full_name,
            sender = %event.sender().login,
            "Received delivery"
        );
        Ok(())
    })?;

    let mut dispatcher = Dispatcher::new(Arc::new(registry.seal()));
    if config.get_as::<bool>("check_runs.report_failures")? {
        dispatcher = dispatcher.with_check_run_reporter(Arc::new(LoggingReporter));
    }
    if config.get_as::<bool>("credentials.from_env")? {
        let key_path: String = config.get_as("credentials.private_key_path")?;
        let provider = EnvCredentialProvider::from_env().with_private_key_path(key_path);
        dispatcher = dispatcher.with_credentials(Arc::new(provider));
    }
    Ok(dispatcher)
}

// ============================================================================
// Commands
// ============================================================================

/// Read a recorded delivery: a JSON object of headers and the raw body.
pub fn read_delivery(headers: &Path, body: &Path) -> Result<(RawHeaders, Vec<u8>)> {
    let text = std::fs::read_to_string(headers)
        .with_context(|| format!("reading headers from {}", headers.display()))?;
    let map: HashMap<String, String> = serde_json::from_str(&text)
        .with_context(|| format!("{} must be a JSON object of strings", headers.display()))?;
    let body =
        std::fs::read(body).with_context(|| format!("reading body from {}", body.display()))?;
    Ok((RawHeaders::from(map), body))
}

/// Render the taxonomy as an indented tree with each node's own criteria.
pub fn render_taxonomy(taxonomy: &Taxonomy) -> String {
    let mut lines = Vec::new();
    let mut stack = vec![taxonomy.base()];
    while let Some(id) = stack.pop() {
        let node = taxonomy.node(id);
        let indent = "  ".repeat(node.depth());
        let criteria: Vec<String> = node.criteria().iter().map(ToString::to_string).collect();
        if criteria.is_empty() {
            lines.push(format!("{indent}{}", node.name()));
        } else {
            lines.push(format!("{indent}{} [{}]", node.name(), criteria.join(", ")));
        }
        stack.extend(node.children().iter().rev().copied());
    }
    lines.join("\n")
}

/// Describe a resolved type and its ancestors, most specific first.
pub fn describe_resolution(taxonomy: &Taxonomy, id: dispatch::EventTypeId) -> String {
    let mut chain = vec![taxonomy.node(id).name()];
    chain.extend(taxonomy.ancestors(id).into_iter().map(|a| taxonomy.node(a).name()));
    let suffix = if taxonomy.is_leaf(id) { "" } else { " (not a leaf)" };
    format!("{}{suffix}", chain.join(" < "))
}

/// Execute a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;
    let catalogue = EventCatalogue::standard()?;

    match cli.command {
        Commands::Dispatch { headers, body } => {
            let (headers, body) = read_delivery(&headers, &body)?;
            let receiver = WebhookReceiver::new(Arc::new(build_dispatcher(&catalogue, &config)?));
            let response = receiver.receive(&headers, &body);
            print_response(&response);
            anyhow::ensure!(response.is_success(), "delivery failed with {}", response.status);
        }
        Commands::Resolve { headers, body } => {
            let (headers, body) = read_delivery(&headers, &body)?;
            let body: Value = serde_json::from_slice(&body).context("body is not valid JSON")?;
            let taxonomy = catalogue.taxonomy();
            let id = taxonomy.resolve(&headers, &body)?;
            println!("{}", describe_resolution(taxonomy, id));
        }
        Commands::Taxonomy => println!("{}", render_taxonomy(catalogue.taxonomy())),
        Commands::Config { path } => {
            let value = match path {
                Some(path) => config.get(&path)?.to_json(),
                None => config.to_json(),
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Commands::Index => {
            let name: String = config.get_as("app.name")?;
            let page = IndexPage::new(name)
                .with_version(env!("CARGO_PKG_VERSION"))
                .with_component("dispatch", env!("CARGO_PKG_VERSION"));
            println!("{}", page.render());
        }
    }
    Ok(())
}

fn print_response(response: &WebhookResponse) {
    println!("{}", response.status);
    println!("{}", response.body);
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
