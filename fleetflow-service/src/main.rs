//! fleetflow-service: chat bridge and maintenance CLI.
//!
//!   fleetflow-service                          # serve the bridge with the local agent
//!   fleetflow-service serve --remote           # serve the bridge in front of a remote agent
//!   fleetflow-service flow --vehicle-id TRUCK-22 --failure-in-days 6
//!   fleetflow-service ask "Predict maintenance for vehicle TRUCK-22"
//!
//! Configuration comes from an optional TOML file (`--config`) and
//! `FLEETFLOW__*` environment variables.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fleetflow::agent::{maintenance_agent, Agent, RemoteAgent};
use fleetflow::bridge;
use fleetflow::observability::{event_sink, init_tracing};
use fleetflow::pipeline::ToolChainExecutor;
use fleetflow::settings::ServiceConfig;
use fleetflow::tools::{maintenance_flow, FailureHorizon, MaintenanceRequest};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "fleetflow-service")]
#[command(about = "Predictive maintenance agent bridge", version)]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, short, global = true, env = "FLEETFLOW_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the chat-completions bridge (default)
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,

        /// Forward prompts to the configured remote agent instead of the local one
        #[arg(long)]
        remote: bool,
    },

    /// Run the predictive maintenance flow once and print the final context
    Flow {
        /// Vehicle to check
        #[arg(long)]
        vehicle_id: String,

        /// Driver to notify
        #[arg(long)]
        driver_id: Option<String>,

        /// Fix the predicted failure horizon instead of sampling it
        #[arg(long)]
        failure_in_days: Option<i64>,
    },

    /// Ask a remote agent over JSON-RPC and print its answer
    Ask {
        /// The prompt
        prompt: String,

        /// Override the configured remote agent URL
        #[arg(long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ServiceConfig::load(cli.config.as_deref())
        .context("Failed to load configuration")?;
    init_tracing(&config.logging).context("Failed to initialize logging")?;

    match cli.command.unwrap_or(Command::Serve {
        port: None,
        remote: false,
    }) {
        Command::Serve { port, remote } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            let agent: Arc<dyn Agent> = if remote {
                info!(url = %config.rpc.remote_url, "Bridging to remote agent");
                Arc::new(RemoteAgent::new(&config.rpc)?)
            } else {
                let executor =
                    ToolChainExecutor::new().with_event_sink(event_sink(&config.logging));
                Arc::new(maintenance_agent(&config.agent, executor)?)
            };
            bridge::serve(&config, agent)
                .await
                .context("Bridge server failed")?;
        }
        Command::Flow {
            vehicle_id,
            driver_id,
            failure_in_days,
        } => {
            let horizon =
                failure_in_days.map_or_else(FailureHorizon::default, FailureHorizon::Fixed);
            let mut request = MaintenanceRequest::new(vehicle_id);
            if let Some(driver_id) = driver_id {
                request = request.with_driver(driver_id);
            }

            let executor = ToolChainExecutor::new().with_event_sink(event_sink(&config.logging));
            let flow = maintenance_flow(horizon)?;
            let run = executor.run(&flow, request.into_record()).await?;
            println!("{}", serde_json::to_string_pretty(&run.context)?);
        }
        Command::Ask { prompt, url } => {
            let agent = match url {
                Some(url) => RemoteAgent::with_url(&config.rpc, url)?,
                None => RemoteAgent::new(&config.rpc)?,
            };
            let response = agent.run(&prompt).await?;
            println!("{}", response.text);
        }
    }

    Ok(())
}
