//! Tiffin CLI - browse restaurants and order food from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # List delivery restaurants serving pizza
//! tiffin restaurants --type food_delivery --category pizza
//!
//! # Show the vegetarian part of a menu
//! tiffin menu 64f1c2 --diet veg
//!
//! # Sign in, fill a cart and check out interactively
//! tiffin shell
//! ```
//!
//! # Environment Variables
//!
//! See `tiffin_storefront::config` (`TIFFIN_API_URL`, `SENTRY_DSN`, ...).

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use secrecy::ExposeSecret;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tiffin_storefront::{Storefront, StorefrontConfig};

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "tiffin")]
#[command(author, version, about = "Tiffin food-delivery storefront")]
struct Cli {
    /// Override the API base URL (`TIFFIN_API_URL`)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List restaurants
    Restaurants(commands::restaurants::RestaurantsArgs),
    /// Show a restaurant's menu
    Menu(commands::menu::MenuArgs),
    /// Interactive session: login, cart and orders
    Shell,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.expose_secret(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tiffin_storefront=info,tiffin_cli=info".into());

    // stdout belongs to the rendered output
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

fn load_config(cli: &Cli) -> Result<StorefrontConfig, Box<dyn std::error::Error>> {
    let config = StorefrontConfig::from_env()?;
    Ok(match &cli.api_url {
        Some(url) => config.with_api_url(url)?,
        None => config,
    })
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init)
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    if let Err(e) = run(cli.command, config).await {
        e.report();
        tracing::error!("Command failed: {}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: StorefrontConfig) -> Result<(), commands::CommandError> {
    let storefront = Storefront::new(config)?;
    let mut out = std::io::stdout().lock();

    match command {
        Commands::Restaurants(args) => {
            commands::restaurants::run(&storefront, &args, &mut out).await
        }
        Commands::Menu(args) => commands::menu::run(&storefront, &args, &mut out).await,
        Commands::Shell => {
            drop(out);
            commands::shell::run(&storefront).await
        }
    }
}
