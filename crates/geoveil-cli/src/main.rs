//! `geoveil` – inspect a catalog as a given request would see it.
//!
//! Loads a TOML catalog fixture, wraps it in an
//! [`AdvertisedCatalog`][geoveil_kernel::AdvertisedCatalog] and prints the
//! layers, groups or resources a simulated OWS request is allowed to see.
//! The `processes` subcommand runs the processing configuration through a
//! [`CapabilityGate`][geoveil_kernel::CapabilityGate] and lists what remains.

mod config;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use thiserror::Error;
use tracing::debug;

use geoveil_kernel::{
    AdvertisedCatalog, CapabilityGate, GroupVisibilityMode, ProcessSelector, VisibilityFilter,
};
use geoveil_memory::Fixture;
use geoveil_middleware::{ConfigBus, ConfigStore, ServiceConfigSource};
use geoveil_types::{
    CatalogError, CatalogReader, GET_CAPABILITIES, LayerGroup, ProcessRegistry, PublishedInfo,
    Request,
};

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("no catalog fixture configured (pass --catalog or set GEOVEIL_CATALOG)")]
    NoCatalog,
}

#[derive(Parser)]
#[command(name = "geoveil", version)]
#[command(about = "Advertised-catalog inspector", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.geoveil/config.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Catalog fixture, overriding the configured one.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Group visibility policy: hide-never, hide-empty or hide-if-all-hidden.
    #[arg(long, global = true)]
    policy: Option<GroupVisibilityMode>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the layers visible to the request.
    Layers(RequestArgs),
    /// List the layer groups visible to the request, with their members.
    Groups(RequestArgs),
    /// List the resources visible to the request.
    Resources(RequestArgs),
    /// List the processes offered under the processing configuration.
    Processes {
        /// Also print the disabled process names.
        #[arg(long)]
        show_disabled: bool,
    },
}

#[derive(Args)]
struct RequestArgs {
    /// OWS service name.
    #[arg(long, default_value = "WMS")]
    service: String,

    /// Operation being simulated.
    #[arg(long, default_value = GET_CAPABILITIES)]
    operation: String,

    /// Virtual-service context, e.g. `topp` or `topp/states`.
    #[arg(long)]
    context: Option<String>,

    /// Read the catalog with no request at all.
    #[arg(long, conflicts_with_all = ["context"])]
    no_request: bool,
}

impl RequestArgs {
    fn request(&self) -> Option<Request> {
        if self.no_request {
            return None;
        }
        let mut request = Request::new(&self.operation).with_service(&self.service);
        if let Some(context) = &self.context {
            request = request.with_context(context);
        }
        Some(request)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // Structured logging from RUST_LOG (default "info"); GEOVEIL_LOG_FORMAT=json
    // switches to newline-delimited JSON. Listings go to stdout via println!.
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    if std::env::var("GEOVEIL_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.clone().unwrap_or_else(config::config_path);
    let mut cfg = config::load_or_default(&config_path)?;
    if let Some(path) = cli.catalog {
        cfg.catalog_path = Some(path);
    }
    if let Some(mode) = cli.policy {
        cfg.group_policy = mode;
    }
    debug!(config = ?cfg, path = %config_path.display(), "configuration resolved");

    let fixture = Fixture::load(cfg.catalog_path.as_deref().ok_or(CliError::NoCatalog)?)?;
    let catalog = AdvertisedCatalog::with_filter(
        fixture.catalog,
        VisibilityFilter::with_group_policy(cfg.group_policy.policy()),
    );

    match cli.cmd {
        Commands::Layers(args) => {
            let request = args.request();
            let view = catalog.view(request.as_ref());
            print_heading("Layers", request.as_ref());
            for layer in view.layers() {
                let title = layer.resource.title.as_deref().unwrap_or("");
                println!("  {}  {}", layer.prefixed_name().bold(), title.dimmed());
            }
        }
        Commands::Groups(args) => {
            let request = args.request();
            let view = catalog.view(request.as_ref());
            print_heading("Layer groups", request.as_ref());
            for group in view.layer_groups() {
                print_group(&*group, 1);
            }
        }
        Commands::Resources(args) => {
            let request = args.request();
            let view = catalog.view(request.as_ref());
            print_heading("Resources", request.as_ref());
            for resource in view.resources() {
                let marker = if resource.advertised {
                    "advertised".green()
                } else {
                    "unadvertised".yellow()
                };
                println!("  {}  {}", resource.prefixed_name().bold(), marker);
            }
        }
        Commands::Processes { show_disabled } => {
            list_processes(fixture.processes, cfg.processing, show_disabled);
        }
    }
    Ok(())
}

fn list_processes(
    registry: geoveil_memory::StaticProcessRegistry,
    processing: geoveil_types::ProcessingServiceConfig,
    show_disabled: bool,
) {
    let registry: Arc<dyn ProcessRegistry> = Arc::new(registry);
    let store = Arc::new(ConfigStore::new(ConfigBus::default()).with_processing(processing));
    let gate = Arc::new(CapabilityGate::new(Arc::clone(&registry)));
    let source: Arc<dyn ServiceConfigSource> = store;
    let subscription = gate.initialize(source);

    let selector = ProcessSelector::new(registry, Arc::clone(&gate));
    println!("{}", "Processes".bold().cyan());
    for provider in selector.providers() {
        println!("  {}", provider.key().bold());
        for name in provider.names() {
            println!("    • {name}");
        }
    }

    if show_disabled {
        let mut disabled: Vec<_> = gate.disabled().iter().cloned().collect();
        disabled.sort();
        println!("{}", "Disabled".bold().yellow());
        for name in disabled {
            println!("    • {}", name.dimmed());
        }
    }

    subscription.shutdown();
}

fn print_heading(what: &str, request: Option<&Request>) {
    let seen_by = match request {
        None => "no request".to_string(),
        Some(r) => {
            let op = r.operation.as_deref().unwrap_or("?");
            match &r.context {
                Some(ctx) => format!("{op} @ {ctx}"),
                None => op.to_string(),
            }
        }
    };
    println!("{} {}", what.bold().cyan(), format!("({seen_by})").dimmed());
}

fn print_group(group: &dyn LayerGroup, depth: usize) {
    let indent = "  ".repeat(depth);
    println!(
        "{indent}{} {}",
        group.prefixed_name().bold(),
        format!("[{:?}]", group.mode()).dimmed()
    );
    for member in group.layers() {
        match member {
            PublishedInfo::Layer(layer) => println!("{indent}  - {}", layer.prefixed_name()),
            PublishedInfo::Group(inner) => print_group(&**inner, depth + 1),
        }
    }
}
