// SPDX-License-Identifier: MIT OR Apache-2.0
//! `nodeflow` - headless graph host
//!
//! Builds a small demo graph from the built-in catalog and drives it for a
//! fixed number of ticks:
//! - Start prints a float literal once
//! - Update advances a Timer and a Delay; the Delay prints the timer
//!   reading each time it completes

use clap::Parser;
use nodeflow_graph::nodes::{builtin_registry, ids};
use nodeflow_graph::{
    ConfigError, ConnectionError, EngineConfig, ExecutionError, Graph, GraphError, NodeId,
    NodeRegistry, Overrides,
};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Engine configuration file (RON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of ticks to run
    #[arg(short, long, default_value_t = 8)]
    ticks: u32,

    /// Seconds per tick
    #[arg(short, long, default_value_t = 0.25)]
    delta: f32,
}

#[derive(Debug, thiserror::Error)]
enum RunnerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Unknown node type: {0}")]
    UnknownNodeType(&'static str),

    #[error(transparent)]
    Connection(#[from] ConnectionError),

    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error("Tick {tick} failed: {source}")]
    Tick {
        tick: u32,
        #[source]
        source: ExecutionError,
    },
}

fn main() {
    let cli = Cli::parse();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("nodeflow_runner=info,nodeflow_graph=info,nodeflow=info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting nodeflow v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&cli) {
        tracing::error!("Run failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), RunnerError> {
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    let registry = builtin_registry();
    tracing::debug!("Registered {} node types", registry.len());

    let mut graph = build_demo(&registry, config)?;
    tracing::info!(
        "Graph '{}': {} nodes, {} connections",
        graph.name,
        graph.node_count(),
        graph.connection_count()
    );

    graph.request_start();
    for tick in 0..cli.ticks {
        let report = graph
            .tick(cli.delta)
            .map_err(|source| RunnerError::Tick { tick, source })?;
        tracing::debug!(
            "Tick {tick}: {} nodes executed, {} lines printed",
            report.executed().len(),
            report.printed.len()
        );
    }

    Ok(())
}

fn spawn(
    graph: &mut Graph,
    registry: &NodeRegistry,
    type_id: &'static str,
    overrides: Overrides,
) -> Result<NodeId, RunnerError> {
    let definition = registry
        .get(type_id)
        .ok_or(RunnerError::UnknownNodeType(type_id))?;
    Ok(graph.create_node(definition, overrides))
}

fn build_demo(registry: &NodeRegistry, config: EngineConfig) -> Result<Graph, RunnerError> {
    let mut graph = Graph::with_config("demo", config);

    // Start -> Print(literal)
    let start = spawn(&mut graph, registry, ids::START, Overrides::new())?;
    let literal = spawn(&mut graph, registry, ids::FLOAT, Overrides::new().output(0, 3.5f32))?;
    let greeting = spawn(&mut graph, registry, ids::PRINT, Overrides::new())?;
    graph.add_connection(start, 0, greeting, 0)?;
    graph.add_connection(literal, 0, greeting, 1)?;

    // Update -> Timer, Update -> Delay -> Print(timer)
    let update = spawn(&mut graph, registry, ids::UPDATE, Overrides::new())?;
    let timer = spawn(&mut graph, registry, ids::TIMER, Overrides::new())?;
    let delay = spawn(&mut graph, registry, ids::DELAY, Overrides::new().input(1, 1.0f32))?;
    let report = spawn(&mut graph, registry, ids::PRINT, Overrides::new())?;
    graph.add_connection(update, 0, timer, 0)?;
    graph.add_connection(update, 0, delay, 0)?;
    graph.add_connection(delay, 0, report, 0)?;
    graph.add_connection(timer, 1, report, 1)?;

    graph.set_node_position(start, [0.0, 0.0])?;
    graph.set_node_position(update, [0.0, 200.0])?;

    Ok(graph)
}
