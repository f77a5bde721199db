//! ocl-diff - compare two concepts from the command line
//!
//! Exit status: 0 when the concepts match, 1 when they differ, 2 when a
//! concept could not be loaded.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use ocl_common::compare::ListAttribute;
use ocl_common::config::{Overrides, ServiceConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ocl_web::client::{validate_uri, OclClient};
use ocl_web::comparison::{parse_expand, run_comparison};
use ocl_web::render::render_comparison;

#[derive(Parser, Debug)]
#[command(name = "ocl-diff")]
#[command(about = "Show attribute differences between two concepts")]
#[command(version)]
struct Args {
    /// Relative API path of the left concept
    #[arg(long)]
    lhs: String,

    /// Relative API path of the right concept
    #[arg(long)]
    rhs: String,

    /// Comma-separated list attributes to print row by row
    #[arg(long, default_value = "names,descriptions,extras,mappings")]
    expand: String,

    /// Only print differing attributes
    #[arg(long)]
    only_diffs: bool,

    /// Print the comparison as JSON instead of text
    #[arg(long)]
    json: bool,

    #[arg(long, env = "OCL_API_URL")]
    api_url: Option<String>,

    #[arg(long, env = "OCL_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    #[arg(long, env = "OCL_LOG_LEVEL")]
    log_level: Option<String>,

    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();
    let overrides = Overrides {
        api_url: args.api_url.clone(),
        api_token: args.api_token.clone(),
        log_level: args.log_level.clone(),
        config_file: args.config.clone(),
        ..Default::default()
    };
    let config = ServiceConfig::resolve(&overrides).context("Failed to load configuration")?;

    // Logs go to stderr so stdout stays clean for the diff
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("ocl_web={0},ocl_common={0}", config.log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    validate_uri(&args.lhs).context("Invalid --lhs")?;
    validate_uri(&args.rhs).context("Invalid --rhs")?;

    let client = OclClient::new(&config).context("Failed to build terminology API client")?;
    let expanded: BTreeSet<ListAttribute> = parse_expand(Some(&args.expand));
    let view = run_comparison(&client, &args.lhs, &args.rhs, &expanded).await;

    if args.json {
        let response = ocl_web::api::compare::CompareResponse::from_view(&view);
        println!("{}", serde_json::to_string_pretty(&response).context("Failed to encode comparison")?);
    } else {
        print!("{}", render_comparison(&view, args.only_diffs));
    }

    if !view.failures().is_empty() {
        return Ok(ExitCode::from(2));
    }
    let differs = view
        .table()
        .is_some_and(|table| !table.diffing_attributes().is_empty());
    Ok(if differs { ExitCode::from(1) } else { ExitCode::SUCCESS })
}
