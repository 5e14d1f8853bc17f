/******************************************************************************
 * Copyright ContinuousC. Licensed under the "Elastic License 2.0".           *
 ******************************************************************************/

mod error;

use std::{future::Future, path::PathBuf, process::ExitCode, time::Instant};

use clap::Parser;
use serde::{de::DeserializeOwned, Serialize};

use coupling_graph::{
    align, classify, client::ANTI_PATTERN_PATH, metric_options, normalize, resiliency_charts,
    serial::RawGraph, ChangePointPayload, ClientConfig, GraphClient, MetricKey, TimeRange,
    WeightType,
};

use error::{Error, Result};

/// Run coupling graph transformations from the command line.
#[derive(clap::Parser)]
struct Args {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// List the selectable metrics.
    Metrics,
    Classify(ClassifyArgs),
    Align(AlignArgs),
    Normalize(NormalizeArgs),
    Graph(GraphArgs),
    ChangePoints(ChangePointArgs),
    AntiPatterns(AntiPatternArgs),
    Resiliency(ResiliencyArgs),
}

/// Tell whether a metric applies to nodes or to edges.
#[derive(clap::Args)]
struct ClassifyArgs {
    key: String,
}

/// Align a change-point payload into chart rows.
#[derive(clap::Args)]
struct AlignArgs {
    #[clap(long)]
    bench: bool,
    #[clap(short, long)]
    metric: MetricKey,
    /// Path to a change-point payload in json format.
    items: PathBuf,
}

/// Bring a graph payload into canonical shape.
#[derive(clap::Args)]
struct NormalizeArgs {
    #[clap(long)]
    bench: bool,
    /// Path to a graph payload in json format.
    graph: PathBuf,
}

#[derive(clap::Args)]
struct BackendArgs {
    #[clap(long)]
    bench: bool,
    /// Graph analytics backend.
    #[clap(long, env = "COUPLING_GRAPH_URL", default_value = "http://localhost:8000/")]
    base_url: String,
    /// Chaos testing backend.
    #[clap(
        long,
        env = "COUPLING_GRAPH_RESILIENCY_URL",
        default_value = "http://localhost:8080/"
    )]
    resiliency_url: String,
    #[clap(long, default_value = ANTI_PATTERN_PATH)]
    anti_pattern_path: String,
}

#[derive(clap::Args)]
struct RangeArgs {
    /// Start of the window, in microseconds since the epoch.
    #[clap(long)]
    start: Option<i64>,
    /// End of the window, in microseconds since the epoch.
    #[clap(long)]
    end: Option<i64>,
    /// Window ending now, used when neither start nor end is given.
    #[clap(long, default_value_t = 15)]
    minutes: i64,
}

/// Fetch and normalize the weighted dependency graph.
#[derive(clap::Args)]
struct GraphArgs {
    #[command(flatten)]
    backend: BackendArgs,
    #[command(flatten)]
    range: RangeArgs,
    #[clap(short, long, default_value_t = WeightType::default())]
    weight_type: WeightType,
}

/// Fetch and align the change points of a metric.
#[derive(clap::Args)]
struct ChangePointArgs {
    #[command(flatten)]
    backend: BackendArgs,
    #[command(flatten)]
    range: RangeArgs,
    #[clap(short, long)]
    metric: MetricKey,
}

/// Fetch and normalize the anti-pattern graph.
#[derive(clap::Args)]
struct AntiPatternArgs {
    #[command(flatten)]
    backend: BackendArgs,
}

/// List the tested services, or show the resiliency charts of one.
#[derive(clap::Args)]
struct ResiliencyArgs {
    #[command(flatten)]
    backend: BackendArgs,
    #[clap(short, long)]
    service: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::init();

    let args = Args::parse();

    let res = match &args.cmd {
        Command::Metrics => print_json(&metric_options()),
        Command::Classify(args) => classify_metric(args),
        Command::Align(args) => align_items(args),
        Command::Normalize(args) => normalize_graph(args),
        Command::Graph(args) => weighted_graph(args).await,
        Command::ChangePoints(args) => change_points(args).await,
        Command::AntiPatterns(args) => anti_patterns(args).await,
        Command::Resiliency(args) => resiliency(args).await,
    };

    if let Err(e) = res {
        eprintln!("Error: {e}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn report(flag: bool, msg: &str, start: Instant) {
    if flag {
        eprintln!(
            "{msg} took {:.3}ms",
            Instant::now().duration_since(start).as_micros() as f64 / 1000.0
        );
    }
}

fn benchmark<F, R>(flag: bool, msg: &str, f: F) -> R
where
    F: FnOnce() -> R,
{
    let start = Instant::now();
    let r = f();
    report(flag, msg, start);
    r
}

fn try_benchmark<F, R>(flag: bool, msg: &str, f: F) -> Result<R>
where
    F: FnOnce() -> Result<R>,
{
    let start = Instant::now();
    let r = f()?;
    report(flag, msg, start);
    Ok(r)
}

async fn try_benchmark_async<F, R>(flag: bool, msg: &str, f: F) -> Result<R>
where
    F: Future<Output = Result<R>>,
{
    let start = Instant::now();
    let r = f.await?;
    report(flag, msg, start);
    Ok(r)
}

fn load_json<T: DeserializeOwned>(path: &PathBuf) -> Result<T> {
    let data = std::fs::read_to_string(path).map_err(|e| Error::ReadFile(path.clone(), e))?;
    serde_json::from_str(&data).map_err(|e| Error::DecodeFile(path.clone(), e))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).map_err(Error::Encode)?
    );
    Ok(())
}

fn classify_metric(args: &ClassifyArgs) -> Result<()> {
    println!("{}", classify(&args.key)?);
    Ok(())
}

fn align_items(args: &AlignArgs) -> Result<()> {
    let payload = try_benchmark(args.bench, "Loading items", || {
        load_json::<ChangePointPayload>(&args.items)
    })?;
    let items = payload.into_items();
    let table = try_benchmark(args.bench, "Aligning series", || {
        Ok(align(&items, args.metric)?)
    })?;
    print_json(&table)
}

fn normalize_graph(args: &NormalizeArgs) -> Result<()> {
    let raw = try_benchmark(args.bench, "Loading graph", || {
        let payload = load_json::<serde_json::Value>(&args.graph)?;
        RawGraph::from_payload(payload).map_err(|e| Error::DecodeFile(args.graph.clone(), e))
    })?;
    let graph = benchmark(args.bench, "Normalizing graph", || normalize(&raw));
    print_json(&graph)
}

impl BackendArgs {
    fn client(&self) -> Result<GraphClient> {
        let mut config = ClientConfig::new(&self.base_url, &self.resiliency_url)?;
        config.anti_pattern_path = self.anti_pattern_path.clone();
        Ok(GraphClient::new(config)?)
    }
}

impl RangeArgs {
    fn time_range(&self) -> TimeRange {
        if self.start.is_some() || self.end.is_some() {
            TimeRange::new(self.start, self.end)
        } else {
            TimeRange::last(chrono::Duration::minutes(self.minutes))
        }
    }
}

async fn weighted_graph(args: &GraphArgs) -> Result<()> {
    let client = args.backend.client()?;
    let range = args.range.time_range();
    let raw = try_benchmark_async(args.backend.bench, "Fetching graph", async {
        Ok(client.fetch_graph_data(&range, args.weight_type).await?)
    })
    .await?;
    let graph = benchmark(args.backend.bench, "Normalizing graph", || normalize(&raw));
    if graph.is_empty() {
        eprintln!("Warning: no data for the selected time range");
    }
    print_json(&graph)
}

async fn change_points(args: &ChangePointArgs) -> Result<()> {
    let client = args.backend.client()?;
    let range = args.range.time_range();
    let items = try_benchmark_async(args.backend.bench, "Fetching change points", async {
        Ok(client.fetch_change_point_graph(&range, args.metric).await?)
    })
    .await?;
    let table = try_benchmark(args.backend.bench, "Aligning series", || {
        Ok(align(&items, args.metric)?)
    })?;
    print_json(&table)
}

async fn anti_patterns(args: &AntiPatternArgs) -> Result<()> {
    let client = args.backend.client()?;
    let raw = try_benchmark_async(args.backend.bench, "Fetching anti-patterns", async {
        Ok(client.fetch_anti_pattern_graph().await?)
    })
    .await?;
    print_json(&normalize(&raw))
}

async fn resiliency(args: &ResiliencyArgs) -> Result<()> {
    let client = args.backend.client()?;
    match &args.service {
        None => print_json(&client.fetch_service_names().await?),
        Some(service) => {
            let scores = try_benchmark_async(args.backend.bench, "Fetching scores", async {
                Ok(client.fetch_resiliency_scores(service).await?)
            })
            .await?;
            match resiliency_charts(&scores) {
                Some(charts) => print_json(&charts),
                None => {
                    eprintln!("No resiliency scores for {service}");
                    Ok(())
                }
            }
        }
    }
}
