use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use careconnect::config::Config;
use careconnect::providers::{
    create_knowledge_provider, create_model_provider, sanitize_api_error, KnowledgeProvider,
    ModelProvider,
};
use careconnect::routing::create_router;
use careconnect::{gateway, health};

/// CareConnect backend - routed AI chat and care-team services.
#[derive(Parser, Debug)]
#[command(name = "careconnect")]
#[command(version)]
#[command(about = "Home-care backend gateway.", long_about = None)]
struct Cli {
    /// Configuration directory (default: ~/.careconnect)
    #[arg(long, global = true)]
    config_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway
    #[command(long_about = "\
Start the HTTP gateway.

Serves the chat, messaging, meetings, vitals, and report endpoints on the
configured host and port.

Examples:
  careconnect serve
  careconnect serve --port 9090")]
    Serve {
        /// Override the configured port
        #[arg(long)]
        port: Option<u16>,

        /// Override the configured bind host
        #[arg(long)]
        host: Option<String>,
    },

    /// Classify a prompt without calling any backend
    #[command(long_about = "\
Classify a prompt without calling any backend.

Prints the route decision as JSON: the chosen tag (knowledge or general)
and the text that would be forwarded.

Examples:
  careconnect route \"What is my blood pressure today?\"
  careconnect route \"Tell me a joke\"")]
    Route {
        /// The prompt to classify
        prompt: String,
    },

    /// Probe the model and knowledge-base backends
    Doctor,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Write a default config.toml if none exists
    Init,
    /// Print the current config with credentials masked
    Show,
    /// Print the config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    health::init();

    let cli = Cli::parse();
    let config = Config::load(cli.config_dir.as_deref()).await?;

    match cli.command {
        Commands::Serve { port, host } => {
            let mut config = config;
            if let Some(port) = port {
                config.gateway.port = port;
            }
            if let Some(host) = host {
                config.gateway.host = host;
            }
            gateway::run(config).await
        }

        Commands::Route { prompt } => {
            let prompt = prompt.trim();
            anyhow::ensure!(!prompt.is_empty(), "Prompt is required");

            let router = create_router(&config.router);
            let decision = router.classify(prompt);
            println!("{}", serde_json::to_string_pretty(&decision)?);
            Ok(())
        }

        Commands::Doctor => run_doctor(&config).await,

        Commands::Config { action } => match action {
            ConfigCommands::Init => {
                if config.config_path.exists() {
                    println!("config already exists at {}", config.config_path.display());
                } else {
                    config.save().await?;
                    println!("wrote {}", config.config_path.display());
                }
                Ok(())
            }
            ConfigCommands::Show => {
                print!("{}", config.to_masked_toml()?);
                Ok(())
            }
            ConfigCommands::Path => {
                println!("{}", config.config_path.display());
                Ok(())
            }
        },
    }
}

/// Probe both AI backends and report per-service status.
async fn run_doctor(config: &Config) -> Result<()> {
    let model = create_model_provider(&config.bedrock);
    let knowledge = create_knowledge_provider(&config.bedrock);

    print_probe(
        "model",
        model
            .generate("Hello! Please respond with 'Bedrock Runtime working'.")
            .await,
    );
    print_probe(
        "knowledge base",
        knowledge
            .retrieve_and_generate("What is blood pressure?")
            .await,
    );
    Ok(())
}

fn print_probe(service: &str, result: Result<String>) {
    match result {
        Ok(response) => println!("ok     {service}: {response}"),
        Err(err) => println!("failed {service}: {}", sanitize_api_error(&err.to_string())),
    }
}
