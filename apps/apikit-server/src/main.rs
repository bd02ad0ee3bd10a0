use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use api_ingress::{placeholder_handlers, ApiIngress, ApiIngressConfig};
use apikit::resource_core::loader::load_from_path;
use apikit::{compile, CompileOptions, CompiledApi};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

mod shutdown;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const APIKIT_MODULE: &str = "apikit";
const INGRESS_MODULE: &str = "api_ingress";

/// `modules.apikit` section.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct ApikitConfig {
    /// Resource model file (YAML or JSON).
    #[serde(default)]
    schema_file: Option<String>,
    #[serde(default)]
    compile: CompileOptions,
}

/// apikit server - compiles a resource model into a REST API
#[derive(Parser)]
#[command(name = "apikit-server")]
#[command(about = "apikit server - compiles a resource model into a REST API")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Resource model file (overrides modules.apikit.schema_file)
    #[arg(short, long)]
    schema: Option<PathBuf>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the compiled API
    Run,
    /// Validate configuration and resource model
    Check,
    /// Write the compiled OpenAPI document as JSON
    Compile {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::init_logging_from_config(&logging_config, Path::new(&config.server.home_dir));
    tracing::debug!(home_dir = %config.server.home_dir, "configuration loaded");

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let api = compile_from_config(&config, cli.schema.as_deref())?;
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, api, args.port.is_some()).await,
        Commands::Check => check(&api),
        Commands::Compile { output } => write_document(&api, output.as_deref()),
    }
}

fn compile_from_config(config: &AppConfig, schema_override: Option<&Path>) -> Result<CompiledApi> {
    let module: ApikitConfig = config.module_config(APIKIT_MODULE)?;
    let schema = schema_override
        .map(Path::to_path_buf)
        .or_else(|| module.schema_file.map(PathBuf::from))
        .context("no resource model: pass --schema or set modules.apikit.schema_file")?;

    let model = load_from_path(&schema)
        .with_context(|| format!("failed to load resource model '{}'", schema.display()))?;
    let api = compile(&model, &module.compile).context("failed to compile API")?;
    tracing::info!(
        schema = %schema.display(),
        operations = api.operation_count(),
        "resource model compiled"
    );
    Ok(api)
}

async fn run_server(config: AppConfig, api: CompiledApi, port_overridden: bool) -> Result<()> {
    let mut ingress_config: ApiIngressConfig = config.module_config(INGRESS_MODULE)?;
    if ingress_config.bind_addr.is_empty() || port_overridden {
        ingress_config.bind_addr = format!("{}:{}", config.server.host, config.server.port);
    }
    if config.server.timeout_sec > 0 {
        ingress_config.request_timeout_sec = config.server.timeout_sec;
    }

    // No storage backend is wired here; every operation answers 501 until one is.
    let routes = api.bind(&placeholder_handlers())?;
    let ingress = Arc::new(ApiIngress::new(ingress_config));
    ingress.mount(&api, routes)?;

    let cancel = CancellationToken::new();
    shutdown::cancel_on_signal(cancel.clone());
    ingress.serve(cancel).await
}

fn check(api: &CompiledApi) -> Result<()> {
    let routes = api.bind(&placeholder_handlers())?;
    println!("Configuration check passed");
    println!(
        "{} paths, {} operations, {} routes, {} components",
        api.document.paths.len(),
        api.operation_count(),
        routes.len(),
        api.document.components.schemas.len()
    );
    Ok(())
}

fn write_document(api: &CompiledApi, output: Option<&Path>) -> Result<()> {
    let json = api.to_json_pretty()?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("failed to write '{}'", path.display()))?;
            tracing::info!(path = %path.display(), "OpenAPI document written");
        }
        None => println!("{json}"),
    }
    Ok(())
}
