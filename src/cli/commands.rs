use crate::codec::{effective_uri, identifier_to_uri, uri_to_identifier};
use crate::config::AppConfig;
use crate::context::{ContextSettings, ResolutionContext};
use crate::dispatcher::DispatchFilter;
use crate::echo::EchoAction;
use crate::error::ConfigurationError;
use crate::ids::HandlerId;
use crate::logging::{init_logging_with_config, LogConfig};
use crate::registry::HandlerRegistry;
use crate::runtime_config::RuntimeConfig;
use crate::server::{AppService, HttpServer};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Command-line interface for chainroute
#[derive(Parser)]
#[command(name = "chainroute")]
#[command(about = "Convention-based handler dispatch", long_about = None, version)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server with the echo handler mounted at the index URI
    Serve {
        /// Path to the YAML configuration file
        #[arg(short, long)]
        config: PathBuf,

        /// Address and port to bind to (overrides the configuration)
        #[arg(long)]
        addr: Option<String>,
    },
    /// Print the URI a handler identifier is mapped to
    Uri {
        /// Base namespace of handler identifiers
        #[arg(short, long, env = "CHAINROUTE_BASE_NAMESPACE")]
        namespace: String,

        /// Handler identifier, e.g. app.actions.sub.SomeTestAction
        identifier: String,
    },
    /// Print the candidate handler identifier for a URI
    Resolve {
        /// Base namespace of handler identifiers
        #[arg(short, long, env = "CHAINROUTE_BASE_NAMESPACE")]
        namespace: String,

        /// Request path, e.g. /sub/someTest
        uri: String,
    },
}

/// Parse the process arguments and execute the command.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the server fails to
/// start, or an identifier cannot be mapped.
pub fn run_cli() -> anyhow::Result<()> {
    run(Cli::parse())
}

/// Execute an already parsed command line.
pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve { config, addr } => serve(&config, addr),
        Commands::Uri {
            namespace,
            identifier,
        } => {
            println!("{}", uri_of(&namespace, &identifier)?);
            Ok(())
        }
        Commands::Resolve { namespace, uri } => {
            println!("{}", candidate_of(&namespace, &uri)?);
            Ok(())
        }
    }
}

/// URI of `identifier` under `namespace`.
pub fn uri_of(namespace: &str, identifier: &str) -> anyhow::Result<String> {
    let namespace = checked_namespace(namespace)?;
    let uri = identifier_to_uri(namespace, &HandlerId::new(identifier.trim()))?;
    Ok(uri)
}

/// Candidate identifier for `uri` under `namespace`.
pub fn candidate_of(namespace: &str, uri: &str) -> anyhow::Result<HandlerId> {
    let namespace = checked_namespace(namespace)?;
    Ok(uri_to_identifier(namespace, &effective_uri(uri)))
}

/// Identifier that serves the index URI of `settings`.
pub fn index_handler_id(settings: &ContextSettings) -> Result<HandlerId, ConfigurationError> {
    let namespace = checked_namespace(&settings.base_namespace)?;
    Ok(uri_to_identifier(namespace, &settings.effective_index_uri()))
}

fn checked_namespace(namespace: &str) -> Result<&str, ConfigurationError> {
    let trimmed = namespace.trim();
    if trimmed.is_empty() {
        return Err(ConfigurationError::BlankNamespace);
    }
    Ok(trimmed)
}

fn serve(config_path: &std::path::Path, addr: Option<String>) -> anyhow::Result<()> {
    let _log_guard = init_logging_with_config(&LogConfig::from_env())?;
    let runtime = RuntimeConfig::from_env();
    may::config().set_stack_size(runtime.stack_size);

    let config = AppConfig::load(config_path)
        .with_context(|| format!("failed to load configuration from {}", config_path.display()))?;
    let namespace = checked_namespace(&config.base_namespace)?.to_string();

    let settings = config.context_settings();

    let mut registry = HandlerRegistry::new();
    registry.register_default::<EchoAction>(index_handler_id(&settings)?);

    let context = ResolutionContext::new(settings, Arc::new(registry))
        .context("invalid dispatch configuration")?;
    let filter = DispatchFilter::with_runtime_config(Arc::new(context), &runtime);
    let service = AppService::new(
        Arc::new(filter),
        config.static_dir.clone(),
        config.dynamic_dir.clone(),
    )
    .with_mount_prefix(&config.mount_prefix());

    let addr = addr.unwrap_or_else(|| config.addr().to_string());
    info!(
        addr = %addr,
        base_namespace = %namespace,
        mount_prefix = %config.mount_prefix(),
        stack_size = runtime.stack_size,
        max_chain = ?runtime.max_chain,
        "Starting chainroute server"
    );
    let handle = HttpServer(service)
        .start(addr.as_str())
        .with_context(|| format!("failed to bind {addr}"))?;
    handle
        .join()
        .map_err(|_| anyhow::anyhow!("server coroutine panicked"))
}
