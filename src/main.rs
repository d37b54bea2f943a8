use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rpc_explorer::catalog::{self, Catalog};
use rpc_explorer::rpc::reference::ReferenceClient;
use rpc_explorer::{ApiServerBuilder, Config, NodeClient};

/// RPC Explorer - browse a Bitcoin node's read-only RPC commands over HTTP
#[derive(Parser)]
#[command(name = "rpc-explorer", version, about)]
struct Cli {
    /// Path to a config file (defaults to ~/.config/rpc-explorer/config.toml)
    #[arg(short, long, env = "RPC_EXPLORER_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind (overrides config)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides config)
    #[arg(long)]
    port: Option<u16>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// List the exposed commands and their parameters
    Commands,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "info,rpc_explorer=info",
        1 => "info,rpc_explorer=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.api_server.host = host;
    }
    if let Some(port) = cli.port {
        config.api_server.port = port;
    }
    tracing::debug!(?config, "loaded configuration");

    let permitted = catalog::permitted_commands(&config.disabled_commands);
    let catalog = Catalog::build(&permitted, &ReferenceClient)?;

    if let Some(Command::Commands) = cli.command {
        print_commands(&catalog);
        return Ok(());
    }

    let client = NodeClient::new(&config.rpc.url, config.rpc.auth()?, config.rpc.timeout)?;
    tracing::info!(
        node = %client.url(),
        commands = catalog.len(),
        "starting rpc explorer"
    );

    ApiServerBuilder::new(Arc::new(client), catalog)
        .host(config.api_server.host)
        .port(config.api_server.port)
        .rate_limit(config.api_server.rate_limit_per_minute)
        .build()
        .run()
        .await?;

    Ok(())
}

/// Print the catalog as a table
fn print_commands(catalog: &Catalog) {
    for op in catalog.iter() {
        let mode = if rpc_explorer::api::uses_structured_call(op) {
            "structured"
        } else {
            "fallback"
        };
        let params: Vec<String> = op
            .params
            .iter()
            .map(|p| {
                if p.has_default {
                    format!("{}={}", p.name, p.default_value())
                } else {
                    p.name.clone()
                }
            })
            .collect();
        println!(
            "{:<24} {:<10} {}",
            rpc_explorer::api::endpoint_path(&op.name),
            mode,
            params.join(", ")
        );
    }
}
