use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use roguedb_client::config::Transport;
use roguedb_client::credentials::SignedToken;
use roguedb_client::rest::RestRequest;
use roguedb_client::{
    build_mutation, compose_query, issue, ClientConfig, ComparisonExpression, MutationKind,
    Operand, SchemaSet, ServiceAccount,
};
use tracing::{error, info};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
#[command(name = "roguedb")]
#[command(about = "Issue RogueDB credentials and assemble signed requests", long_about = None)]
#[command(version)]
struct Cli {
    /// Deployment hostname (overrides configuration)
    #[arg(short = 'H', long)]
    host: Option<String>,

    /// API key (overrides configuration)
    #[arg(short, long)]
    api_key: Option<String>,

    /// Path to service_account.json (overrides configuration)
    #[arg(short, long)]
    service_account: Option<PathBuf>,

    /// Token lifetime in seconds (overrides configuration)
    #[arg(long)]
    ttl: Option<i64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a freshly issued bearer token
    Token,

    /// Assemble a search from a JSON array of expressions
    Search {
        #[arg(short, long, help = "JSON file holding an array of basic expressions")]
        queries: PathBuf,
    },

    /// Assemble an insert, update, or remove request
    Mutate {
        #[arg(short, long, help = "insert, update, or remove")]
        kind: MutationKind,

        #[arg(short, long, help = "JSON file holding an array of typed messages")]
        messages: PathBuf,
    },

    /// Assemble a schema subscription from every .proto file under the given directories
    Subscribe {
        #[arg(short, long = "dir", required = true, help = "Schema directory (repeatable)")]
        dirs: Vec<PathBuf>,
    },
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, Box<dyn std::error::Error>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    Ok(serde_json::from_str(&text)?)
}

fn render_request(config: &ClientConfig, rpc: &str, message: &str, request: &RestRequest) -> String {
    let mut out = String::new();
    match config.endpoint.transport {
        Transport::Rest => {
            out.push_str(&format!("{} {}\n", request.method, request.url));
            for (name, value) in &request.headers {
                out.push_str(&format!("{name}: {value}\n"));
            }
        }
        Transport::Grpc => {
            // Body is the proto3 JSON mapping; caller schemas have no encoder here.
            out.push_str(&format!("rpc {rpc} @ {}\n", config.grpc_endpoint()));
            if let Some(value) = request.header("Authorization") {
                out.push_str(&format!("authorization: {value}\n"));
            }
            out.push_str(&format!("message: rogue.services.{message} (proto3 JSON mapping)\n"));
        }
    }
    out.push('\n');
    out.push_str(&request.body);
    out
}

fn message_name(kind: MutationKind) -> &'static str {
    match kind {
        MutationKind::Insert => "Insert",
        MutationKind::Update => "Update",
        MutationKind::Remove => "Remove",
    }
}

fn sign(config: &ClientConfig) -> Result<SignedToken, Box<dyn std::error::Error>> {
    let account = ServiceAccount::from_file(&config.credentials.service_account_path)?;
    let token = issue(&account, config.credentials.token_ttl_seconds)?;
    info!(
        aud = %token.claims().aud,
        expires_at = token.expires_at(),
        "Token issued"
    );
    Ok(token)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = ClientConfig::from_env().unwrap_or_else(|e| {
        error!("Failed to load configuration: {e}");
        info!("Using default configuration");
        ClientConfig::default()
    });

    if let Some(host) = cli.host {
        config.endpoint.host = host;
    }
    if let Some(api_key) = cli.api_key {
        config.api_key = api_key;
    }
    if let Some(path) = cli.service_account {
        config.credentials.service_account_path = path;
    }
    if let Some(ttl) = cli.ttl {
        config.credentials.token_ttl_seconds = ttl;
    }

    match cli.command {
        Commands::Token => {
            let token = sign(&config)?;
            println!("{}", token.as_str());
            eprintln!("expires at: {}", token.expires_at());
        }

        Commands::Search { queries } => {
            config.validate()?;
            let expressions: Vec<ComparisonExpression> = read_json(&queries)?;
            let query = compose_query(config.api_key.clone(), expressions)?;
            let token = sign(&config)?;

            info!(queries = query.len(), "Search assembled");
            let request = RestRequest::search(&config.rest_base_url(), &token, &query)?;
            println!("{}", render_request(&config, "search", "Search", &request));
        }

        Commands::Mutate { kind, messages } => {
            config.validate()?;
            let messages: Vec<Operand> = read_json(&messages)?;
            let mutation = build_mutation(kind, config.api_key.clone(), messages)?;
            let token = sign(&config)?;

            info!(kind = kind.as_str(), messages = mutation.messages().len(), "Mutation assembled");
            let request = RestRequest::mutation(&config.rest_base_url(), &token, &mutation)?;
            println!("{}", render_request(&config, kind.as_str(), message_name(kind), &request));
        }

        Commands::Subscribe { dirs } => {
            config.validate()?;
            let schemas = SchemaSet::from_directories(config.api_key.clone(), &dirs)?;
            let token = sign(&config)?;

            info!(schemas = schemas.len(), "Subscription assembled");
            let request = RestRequest::subscribe(&config.rest_base_url(), &token, &schemas)?;
            println!("{}", render_request(&config, "subscribe", "Subscribe", &request));
        }
    }

    Ok(())
}
