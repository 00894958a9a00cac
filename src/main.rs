//! IIIF Gatekeeper operator CLI.
//!
//! Evaluates request contexts and resolves identifiers against the live
//! configuration, for debugging deployments from the command line.

use std::io::Read;
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use iiif_gatekeeper::{
    config::{Cli, Command, Config},
    pairtree_path, RequestContext,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.config.verbose);

    if let Err(e) = cli.config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    match cli.command {
        Command::Authorize { context } => run_authorize(&cli.config, context.as_deref()),
        Command::Resolve { identifier } => run_resolve(&cli.config, &identifier).await,
        Command::Pairtree { identifier } => {
            println!("{}", pairtree_path(&identifier));
            ExitCode::SUCCESS
        }
    }
}

// =============================================================================
// Authorize Command
// =============================================================================

fn run_authorize(config: &Config, context_path: Option<&std::path::Path>) -> ExitCode {
    let raw = match read_context(context_path) {
        Ok(raw) => raw,
        Err(e) => {
            error!("Failed to read request context: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let ctx: RequestContext = match serde_json::from_str(&raw) {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Request context is not valid JSON: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let authorizer = match config.authorizer() {
        Ok(authorizer) => authorizer,
        Err(e) => {
            error!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let verdict = authorizer.authorize(&ctx);
    debug!(?verdict, identifier = %ctx.identifier, "Evaluated request");

    if let Some(redirect) = authorizer.redirect(&ctx) {
        info!(
            location = %redirect.location,
            status = redirect.status_code,
            "Redirect rule applies"
        );
    }

    println!("{}", verdict.to_wire(config.response_mode()));
    println!("source: {}", config.source_router().route(&ctx.identifier));
    ExitCode::SUCCESS
}

fn read_context(path: Option<&std::path::Path>) -> std::io::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut raw = String::new();
            std::io::stdin().read_to_string(&mut raw)?;
            Ok(raw)
        }
    }
}

// =============================================================================
// Resolve Command
// =============================================================================

async fn run_resolve(config: &Config, identifier: &str) -> ExitCode {
    let locator = match config.locator() {
        Ok(locator) => locator,
        Err(e) => {
            error!("Failed to build lookup clients: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Resolving '{}'...", identifier);
    match locator.locate(identifier).await {
        Some(resolved) => {
            // Serialization of ResolvedSource cannot fail
            println!("{}", serde_json::to_string_pretty(&resolved).unwrap());
            ExitCode::SUCCESS
        }
        None => {
            error!("Resource not found: {}", identifier);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Logging
// =============================================================================

fn init_logging(verbose: bool) {
    let default_filter = if verbose {
        "iiif_gatekeeper=debug,info"
    } else {
        "iiif_gatekeeper=info,warn"
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
