mod config;

use clap::{Parser, Subcommand};
use config::FleetConfig;
use fleethub_gateway::GatewayServer;
use fleethub_mcp::Hub;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "fleethub", about = "fleethub: orchestration hub for a fleet of HTTP agents")]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "fleethub.toml")]
    config: PathBuf,

    /// Human-readable logs instead of JSON
    #[arg(long)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the hub: registry, health monitor and gateway
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// Inspect configured agents
    Agents {
        #[command(subcommand)]
        action: ListAction,
    },
    /// Inspect the tool surface
    Tools {
        #[command(subcommand)]
        action: ListAction,
    },
}

#[derive(Subcommand)]
enum ListAction {
    /// List entries
    List,
}

fn init_tracing(pretty: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if pretty {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env is fine.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.pretty);

    let config = FleetConfig::load(&cli.config).await?;

    match cli.command {
        Commands::Serve { host, port } => {
            let host = host.unwrap_or(config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let hub = Arc::new(Hub::new(config.hub.clone())?);
            hub.register_agents(&config.agents()).await;
            info!(
                agents = hub.registry().len().await,
                tools = hub.tools().len(),
                "Hub initialized"
            );

            let monitor = hub.start_monitor();

            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to bind {addr}: {e}"))?;
            GatewayServer::serve(listener, hub, shutdown_signal()).await?;

            monitor.shutdown().await;
            info!("fleethub stopped");
        }
        Commands::Agents {
            action: ListAction::List,
        } => {
            let agents = config.agents();
            if config.agents.is_empty() {
                println!("No agents configured; using the default fleet.");
            }
            println!("Agents:");
            for agent in &agents {
                println!(
                    "  {:<20} {}",
                    agent.name,
                    agent.base_url.as_deref().unwrap_or("-")
                );
                if let Some(cmd) = &agent.run_command {
                    println!("    run: {cmd}");
                }
            }
            println!("\nTotal: {} agent(s)", agents.len());
        }
        Commands::Tools {
            action: ListAction::List,
        } => {
            let hub = Hub::new(config.hub)?;
            println!("Registered tools:");
            for tool in hub.tools().descriptors() {
                println!("  {:<22} {}", tool.name, tool.description);
            }
            println!("\nTotal: {} tool(s)", hub.tools().len());
        }
    }

    Ok(())
}
