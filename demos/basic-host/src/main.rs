//! Demo host serving Drive and Sheets helper tools.
//!
//! Any of `--tools`, `--services` or `--tier` replaces the selection read
//! from `ENABLED_TOOLS`, `TOOL_SERVICES` and `TOOL_TIER`. Tier lists come
//! from `--config` or the bundled `tool_tiers.yaml`.

mod tools;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use tool_config::{ToolSelection, ToolSettings, ToolTier};
use tool_registry::{RegistrationInterceptor, ToolError, ToolFailure, ToolRegistry};
use tool_telemetry::TelemetryConfig;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "basic-host", about = "Serve workspace helper tools")]
struct Cli {
    /// Tier configuration file. Defaults to the bundled tiers.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Explicit tool names to enable.
    #[arg(long, value_delimiter = ',')]
    tools: Option<Vec<String>>,

    /// Services whose tier lists are enabled.
    #[arg(long, value_delimiter = ',')]
    services: Option<Vec<String>>,

    /// Tool tier: core, extended or complete.
    #[arg(long)]
    tier: Option<ToolTier>,

    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the tools that survived filtering.
    List,
    /// Invoke one tool with JSON arguments.
    Call {
        /// Tool name.
        tool: String,
        /// JSON object passed to the tool.
        #[arg(long, default_value = "{}")]
        args: String,
    },
}

impl Cli {
    fn selection(&self) -> ToolSelection {
        let mut selection = ToolSelection::default();
        if let Some(tools) = &self.tools {
            selection = selection.with_tools(tools.iter().cloned());
        }
        if let Some(services) = &self.services {
            selection = selection.with_services(services.iter().cloned());
        }
        if let Some(tier) = self.tier {
            selection = selection.with_tier(tier);
        }
        selection
    }

    fn settings(&self) -> Result<ToolSettings> {
        match &self.config {
            Some(path) => tool_config::load(path)
                .with_context(|| format!("loading tool settings from {}", path.display())),
            None => tool_config::parse(tools::DEFAULT_SETTINGS)
                .context("parsing bundled tool settings"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    tool_telemetry::init(&TelemetryConfig::default().with_directive(cli.log_level.clone()))?;

    let settings = cli.settings()?;
    let selection = cli.selection().or(ToolSelection::from_env()?);
    let enablement = settings.resolve(&selection)?;

    let host = Arc::new(ToolRegistry::new());
    let mut interceptor = RegistrationInterceptor::install(Arc::clone(&host), enablement)
        .with_boundary_policy(settings.boundary_policy());
    tools::register_all(&mut interceptor)?;
    let summary = interceptor.filter();
    info!(
        removed = summary.removed,
        remaining = summary.remaining,
        "tool table ready"
    );

    match cli.command {
        Command::List => {
            for metadata in host.list() {
                println!(
                    "{:<24} {:<8} {}",
                    metadata.name(),
                    metadata.service().unwrap_or("-"),
                    metadata.description().unwrap_or_default()
                );
            }
        }
        Command::Call { tool, args } => {
            let args: Value = serde_json::from_str(&args).context("parsing --args as JSON")?;
            tokio::select! {
                result = host.invoke(&tool, args) => match result {
                    Ok(text) => println!("{text}"),
                    Err(ToolError::Failed(ToolFailure::Interrupted)) => {
                        warn!(tool = %tool, "tool call interrupted");
                    }
                    Err(err) => return Err(err.into()),
                },
                _ = tokio::signal::ctrl_c() => {
                    warn!(tool = %tool, "shutdown requested; abandoning tool call");
                }
            }
        }
    }

    Ok(())
}
