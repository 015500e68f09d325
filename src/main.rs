use anyhow::{bail, Context, Result};
use apigw_bridge::config::Config;
use apigw_bridge::endpoint::{Endpoint, Request};
use apigw_bridge::gateway::{
    format_gateway_error, ApiKeySigner, CallContext, GatewayClient, HttpTransport, NoAuth, Signer,
};
use apigw_bridge::native::to_native;
use apigw_bridge::AdapterError;
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Version injected at compile time via APIGW_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("APIGW_VERSION") {
    Some(v) => v,
    None => "dev",
};

/// Command line client for the API gateway REST API
#[derive(Parser, Debug)]
#[command(name = "apigw", version, about, long_about = None)]
struct Args {
    /// Gateway API base URL
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// API key (overrides APIGW_API_KEY and the config file)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List available endpoints
    Endpoints,

    /// Show an endpoint's descriptor
    Describe {
        /// Endpoint key, e.g. create-api
        endpoint: String,
    },

    /// Invoke an endpoint and print the typed response
    Call {
        /// Endpoint key, e.g. create-api
        endpoint: String,

        /// Request field as name=value (value parsed as JSON when possible)
        #[arg(short, long = "param", value_name = "NAME=VALUE")]
        params: Vec<String>,

        /// Read request fields from a JSON object file
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,

        /// Print the control plane attribute form instead
        #[arg(long)]
        native: bool,

        /// Follow pagination and merge every page
        #[arg(long)]
        all_pages: bool,

        /// Print the prepared call without sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Show or change the stored configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the stored configuration and where it lives
    Show,

    /// Store the gateway base URL
    SetBaseUrl {
        /// e.g. https://gw.example.com/api/v1
        url: String,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("apigw {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("apigw").join("apigw.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".apigw").join("apigw.log");
    }
    PathBuf::from("apigw.log")
}

/// Build a request from `--json` and `--param` (params win)
fn build_request(params: &[String], json: Option<&PathBuf>) -> Result<Request> {
    let mut request = match json {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {:?}", path))?;
            let value: Value = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse {:?}", path))?;
            Request::from_value(value).with_context(|| format!("{:?} is not a JSON object", path))?
        }
        None => Request::new(),
    };

    for param in params {
        let Some((name, raw)) = param.split_once('=') else {
            bail!("Invalid parameter `{}`, expected NAME=VALUE", param);
        };
        let value =
            serde_json::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        request.insert(name.trim(), value);
    }

    Ok(request)
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run_config(config: &mut Config, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let mut shown = serde_json::to_value(&*config)?;
            if config.api_key.is_some() {
                shown["api_key"] = Value::from("********");
            }
            if let Some(path) = Config::config_path() {
                println!("# {}", path.display());
            }
            print_json(&shown)
        }
        ConfigAction::SetBaseUrl { url } => {
            config.set_base_url(&url)?;
            let path = config.save()?;
            tracing::info!("Saved base URL to {:?}", path);
            println!("Base URL set to {}", url.trim_end_matches('/'));
            Ok(())
        }
    }
}

fn list_endpoints(client: &GatewayClient) {
    for endpoint in client.registry().iter() {
        println!(
            "{:<28} {:<6} {}",
            endpoint.key,
            endpoint.method.as_str(),
            endpoint.path
        );
    }
}

async fn call(
    client: &GatewayClient,
    ctx: &CallContext,
    endpoint: &Endpoint,
    request: &Request,
    native: bool,
    all_pages: bool,
) -> Result<Value, AdapterError> {
    let response = if all_pages {
        client.execute_all_pages(ctx, endpoint, request).await?
    } else {
        client.execute(ctx, endpoint, request).await?
    };

    if native {
        Ok(to_native(&response).to_json())
    } else {
        Ok(response.to_json())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level)?;

    let mut config = Config::load();
    let command = match args.command {
        Command::Config { action } => return run_config(&mut config, action),
        command => command,
    };

    let base_url = config.effective_base_url(args.base_url.as_deref());
    let signer: Arc<dyn Signer> = match config.effective_api_key(args.api_key.as_deref()) {
        Some(key) => Arc::new(ApiKeySigner::new(&key)),
        None => Arc::new(NoAuth),
    };
    let transport = HttpTransport::new(&config.effective_user_agent(), signer)
        .context("Failed to create HTTP client")?;
    let client = GatewayClient::new(&base_url, Arc::new(transport))?
        .with_registry(Arc::new(config.registry()?));

    tracing::info!("Using gateway at {}", client.base_url());

    match command {
        Command::Endpoints => list_endpoints(&client),
        Command::Describe { endpoint } => {
            let endpoint = client.endpoint(&endpoint)?;
            print_json(&serde_json::to_value(endpoint.as_ref())?)?;
        }
        Command::Call {
            endpoint,
            params,
            json,
            native,
            all_pages,
            dry_run,
        } => {
            let endpoint = client.endpoint(&endpoint)?;
            let request = build_request(&params, json.as_ref())?;

            if dry_run {
                let prepared = client.prepare(&endpoint, &request)?;
                print_json(&serde_json::json!({
                    "method": prepared.method,
                    "url": client.url_for(&prepared.path),
                    "query": prepared.query,
                    "body": prepared.body,
                }))?;
                return Ok(());
            }

            let ctx = CallContext::new().with_timeout(config.effective_timeout(args.timeout));
            match call(&client, &ctx, &endpoint, &request, native, all_pages).await {
                Ok(value) => print_json(&value)?,
                Err(err) => {
                    tracing::error!("{} failed: {}", endpoint.key, err);
                    bail!("{}: {}", endpoint.key, format_gateway_error(&err));
                }
            }
        }
        Command::Config { action } => run_config(&mut config, action)?,
    }

    Ok(())
}
