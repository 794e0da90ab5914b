//! jcli
//!
//! Reference command-line client for the jocker engine:
//! - Container, image and network management over the engine's REST API
//! - Live console attach (`container start`) and build logs (`image build`)
//!   streamed over WebSocket

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use jc_core::api::{ContainerConfig, NetworkConfig};
use jc_core::BuildOptions;
use jcli::commands::{self, container, image, network, EngineContext};
use jcli::output::print_error;

#[derive(Parser)]
#[command(name = "jcli")]
#[command(author, version, about = "A cli-tool for jocker")]
#[command(long_about = "jcli is the reference cli-tool for interacting with jocker-engine")]
#[command(propagate_version = true)]
struct Cli {
    /// Jocker engine to connect to: http://host:port[/path] or tcp://host:port
    #[arg(short = 'H', long, global = true, env = "JOCKER_HOST")]
    host: Option<String>,

    /// Enable debug mode
    #[arg(short = 'D', long, global = true)]
    debug: bool,

    /// Increase log verbosity (repeatable)
    #[arg(long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage containers
    Container {
        #[command(subcommand)]
        action: ContainerAction,
    },

    /// Manage images
    Image {
        #[command(subcommand)]
        action: ImageAction,
    },

    /// Manage networks
    Network {
        #[command(subcommand)]
        action: NetworkAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ContainerAction {
    /// Create a new container
    Create {
        /// Assign a name to the container
        #[arg(long)]
        name: Option<String>,
        /// Connect the container to a network
        #[arg(long = "network", value_delimiter = ',')]
        networks: Vec<String>,
        /// Bind mount a volume to the container
        #[arg(short = 'v', long = "volume", value_delimiter = ',')]
        volumes: Vec<String>,
        /// Set environment variables (e.g. --env FIRST=env --env SECOND=env)
        #[arg(short = 'e', long = "env", value_delimiter = ',')]
        env: Vec<String>,
        /// Specify a jail parameter, see jail(8) for details
        #[arg(
            short = 'J',
            long = "jailparam",
            value_delimiter = ',',
            default_value = "mount.devfs"
        )]
        jail_params: Vec<String>,
        /// Image to create the container from
        image: String,
        /// Command and arguments to run in the container
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Remove one or more containers
    Rm {
        #[arg(required = true)]
        containers: Vec<String>,
    },

    /// Start one or more stopped containers; attach to STDOUT/STDERR if only one is started
    Start {
        /// Attach STDOUT/STDERR (--attach=false to only start)
        #[arg(
            short,
            long,
            num_args = 0..=1,
            require_equals = true,
            default_value_t = true,
            default_missing_value = "true",
            action = ArgAction::Set
        )]
        attach: bool,
        #[arg(required = true)]
        containers: Vec<String>,
    },

    /// Stop one or more running containers
    Stop {
        #[arg(required = true)]
        containers: Vec<String>,
    },

    /// List containers
    #[command(alias = "list")]
    Ls {
        /// Show all containers (default shows just running)
        #[arg(short, long)]
        all: bool,
    },
}

#[derive(Subcommand)]
enum ImageAction {
    /// Build an image from a Dockerfile
    Build {
        /// Name of the Dockerfile inside PATH
        #[arg(short = 'f', long = "file", default_value = "Dockerfile")]
        dockerfile: String,
        /// Name and optionally a tag in the 'name:tag' format
        #[arg(short, long, default_value = "")]
        tag: String,
        /// Suppress the build output and print image ID on success
        #[arg(short, long)]
        quiet: bool,
        /// Build context directory
        path: PathBuf,
    },

    /// Remove one or more images
    Rm {
        #[arg(required = true)]
        images: Vec<String>,
    },

    /// List images
    #[command(alias = "list")]
    Ls,
}

#[derive(Subcommand)]
enum NetworkAction {
    /// Create a new network
    Create {
        /// Which driver to use for the network; only 'loopback' is supported
        #[arg(short, long, default_value = "")]
        driver: String,
        /// Name of the loopback interface used for the network
        #[arg(long, default_value = "")]
        ifname: String,
        /// Subnet in CIDR format for the network
        #[arg(long, default_value = "")]
        subnet: String,
        name: String,
    },

    /// Remove one or more networks
    #[command(alias = "remove")]
    Rm {
        #[arg(required = true)]
        networks: Vec<String>,
    },

    /// Connect a container to a network
    Connect { network: String, container: String },

    /// Disconnect a container from a network
    Disconnect { network: String, container: String },

    /// List networks
    #[command(alias = "list")]
    Ls,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration
    Show,
    /// Get specific config value
    Get { key: String },
    /// Set config value
    Set { key: String, value: String },
    /// Show config file path
    Path,
    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity; stdout carries session output
    let log_level = match (cli.debug, cli.verbose) {
        (_, 3..) => "trace",
        (true, _) | (false, 2) => "debug",
        (false, 1) => "info",
        (false, _) => "warn",
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.into()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    let engine = || {
        EngineContext::load(config_path, cli.host.as_deref())
            .context("Failed to load configuration")
    };

    match cli.command {
        Commands::Container { action } => run_container(&engine()?, action).await,
        Commands::Image { action } => run_image(&engine()?, action).await,
        Commands::Network { action } => run_network(&engine()?, action).await,
        Commands::Config { action } => run_config(config_path, action),
    }
}

fn run_config(config_path: Option<&Path>, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => commands::config::config_show(config_path),
        ConfigAction::Get { key } => commands::config::config_get(config_path, &key),
        ConfigAction::Set { key, value } => {
            commands::config::config_set(config_path, &key, &value)
        }
        ConfigAction::Path => {
            commands::config::config_path(config_path);
            Ok(())
        }
        ConfigAction::Init { force } => commands::config::config_init(config_path, force),
    }
}

async fn run_container(ctx: &EngineContext, action: ContainerAction) -> Result<()> {
    match action {
        ContainerAction::Create {
            name,
            networks,
            volumes,
            env,
            jail_params,
            image,
            command,
        } => {
            let config = ContainerConfig {
                image,
                cmd: command,
                networks,
                volumes,
                env,
                jail_param: jail_params,
            };
            container::create(ctx, name.as_deref(), config).await
        }
        ContainerAction::Rm { containers } => container::remove(ctx, &containers).await,
        ContainerAction::Start { attach, containers } => {
            container::start(ctx, attach, &containers).await
        }
        ContainerAction::Stop { containers } => container::stop(ctx, &containers).await,
        ContainerAction::Ls { all } => container::list(ctx, all).await,
    }
}

async fn run_image(ctx: &EngineContext, action: ImageAction) -> Result<()> {
    match action {
        ImageAction::Build {
            dockerfile,
            tag,
            quiet,
            path,
        } => {
            let options = BuildOptions {
                dockerfile,
                tag,
                quiet,
                ..BuildOptions::default()
            };
            image::build(ctx, &path, options).await
        }
        ImageAction::Rm { images } => image::remove(ctx, &images).await,
        ImageAction::Ls => image::list(ctx).await,
    }
}

async fn run_network(ctx: &EngineContext, action: NetworkAction) -> Result<()> {
    match action {
        NetworkAction::Create {
            driver,
            ifname,
            subnet,
            name,
        } => {
            let config = NetworkConfig {
                name,
                driver,
                ifname,
                subnet,
            };
            network::create(ctx, config).await
        }
        NetworkAction::Rm { networks } => network::remove(ctx, &networks).await,
        NetworkAction::Connect { network, container } => {
            network::connect(ctx, &network, &container).await
        }
        NetworkAction::Disconnect { network, container } => {
            network::disconnect(ctx, &network, &container).await
        }
        NetworkAction::Ls => network::list(ctx).await,
    }
}
