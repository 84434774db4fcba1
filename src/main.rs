// SPDX-License-Identifier: MIT

//! Host-glue CLI: registers the built-in criteria against default providers
//! and evaluates administrator-authored definitions for a visitor snapshot.
//! Everything here is wiring; the evaluation logic lives in the library.

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use cohort_rs::criteria::{registry, CriteriaRegistry};
use cohort_rs::providers::{
    Clock, FixedClock, IpProvider, StaticIpProvider, StaticPagesViewedProvider, SystemClock,
    WebGeoLocationProvider,
};
use dotenv::dotenv;
use serde::Deserialize;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the registered criteria
    List {
        /// Also print each criterion's definition schema as JSON
        #[arg(long)]
        schemas: bool,
    },
    /// Evaluate a criterion definition against a visitor snapshot
    Eval {
        /// Alias of the criterion to evaluate
        #[arg(short, long)]
        criterion: String,

        /// The JSON definition string
        #[arg(short, long)]
        definition: Option<String>,

        /// Read the JSON definition from a file instead
        #[arg(long)]
        definition_file: Option<PathBuf>,

        /// YAML visitor snapshot (`ip:` and `viewed:` fields)
        #[arg(long)]
        visitor: Option<PathBuf>,

        /// Requester IP address (overrides the snapshot's)
        #[arg(long)]
        ip: Option<String>,

        /// Evaluate as if at this moment, e.g. 2016-06-03T10:00:00
        #[arg(long)]
        at: Option<String>,
    },
}

/// Visitor snapshot file: the signals a host would have extracted from its
/// request context and session store
#[derive(Debug, Default, Deserialize)]
struct VisitorSnapshot {
    ip: Option<String>,
    #[serde(default)]
    viewed: Vec<i64>,
}

impl VisitorSnapshot {
    fn load(path: &PathBuf) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("could not read visitor snapshot {}", path.display()))?;
        serde_yaml::from_str(&content)
            .with_context(|| format!("could not parse visitor snapshot {}", path.display()))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::List { schemas } => list(schemas).await,
        Commands::Eval {
            criterion,
            definition,
            definition_file,
            visitor,
            ip,
            at,
        } => {
            let definition = match (definition, definition_file) {
                (Some(definition), None) => definition,
                (None, Some(path)) => fs::read_to_string(&path)
                    .with_context(|| format!("could not read definition {}", path.display()))?,
                _ => bail!("provide exactly one of --definition and --definition-file"),
            };

            let snapshot = match visitor {
                Some(path) => VisitorSnapshot::load(&path)?,
                None => VisitorSnapshot::default(),
            };

            eval(&criterion, &definition, snapshot, ip, at).await
        }
    }
}

async fn list(schemas: bool) -> Result<()> {
    let registry = default_registry(VisitorSnapshot::default(), None, None).await?;

    for descriptor in registry.descriptors().await {
        println!(
            "{:<12} {:<14} {}",
            descriptor.alias, descriptor.name, descriptor.description
        );
        if schemas {
            if let Some(criterion) = registry.get(&descriptor.alias).await {
                let schema = serde_json::to_string_pretty(&criterion.definition_schema())
                    .unwrap_or_default();
                println!("{}", schema);
            }
        }
    }

    Ok(())
}

async fn eval(
    alias: &str,
    definition: &str,
    snapshot: VisitorSnapshot,
    ip: Option<String>,
    at: Option<String>,
) -> Result<()> {
    let registry = default_registry(snapshot, ip, at).await?;

    let criterion = match registry.get(alias).await {
        Some(criterion) => criterion,
        None => bail!("no criterion registered under alias '{}'", alias),
    };

    log::info!("Evaluating criterion '{}'", alias);
    let matched = criterion.matches_visitor(definition).await?;
    println!("matched: {}", matched);

    Ok(())
}

/// Wire the built-in criteria against default providers. Provider selection
/// happens only here, never inside evaluators.
async fn default_registry(
    snapshot: VisitorSnapshot,
    ip: Option<String>,
    at: Option<String>,
) -> Result<CriteriaRegistry> {
    let ip_provider: Arc<dyn IpProvider> = match ip.or(snapshot.ip) {
        Some(ip) => Arc::new(StaticIpProvider::new(ip)),
        None => Arc::new(StaticIpProvider::unresolved()),
    };

    let clock: Arc<dyn Clock> = match at {
        Some(at) => {
            let instant: NaiveDateTime = at
                .parse()
                .with_context(|| format!("'{}' is not a date-time", at))?;
            Arc::new(FixedClock(instant))
        }
        None => Arc::new(SystemClock),
    };

    let geo_provider =
        WebGeoLocationProvider::new().map_err(|e| anyhow::anyhow!("geolocation setup: {}", e))?;

    let registry = CriteriaRegistry::new();
    registry::register_builtin(
        &registry,
        ip_provider,
        Arc::new(geo_provider),
        Arc::new(StaticPagesViewedProvider::new(snapshot.viewed)),
        clock,
    )
    .await;

    Ok(registry)
}
