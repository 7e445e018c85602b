//! city: compare every search strategy on one road network.
//!
//! Builds a synthetic street grid (or loads `nodes.csv` / `edges.csv`),
//! snaps two coordinates to the nearest nodes, and runs each algorithm
//! between them.  Then closes the city centre with a region obstacle, runs
//! them again, and undoes the region.
//!
//! ```text
//! cargo run -p city -- --size 80 --seed 7
//! cargo run -p city -- --nodes nodes.csv --edges edges.csv --from 30.69,-88.04 --to 30.70,-88.02
//! RUST_LOG=debug cargo run -p city -- --algorithm astar
//! ```

mod network;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use nav_core::{BoundingBox, GeoPoint, NavConfig, NodeId};
use nav_graph::{Graph, ObstacleManager, SharedGraph, load_graph_csv};
use nav_search::{Algorithm, PathSearch, SearchOutcome, path_distance_m};

use network::build_grid;

#[derive(Parser, Debug)]
#[command(name = "city")]
#[command(about = "Compare road-network search strategies", long_about = None)]
struct Args {
    /// Node CSV (`id,lat,lon`); requires --edges
    #[arg(long, requires = "edges")]
    nodes: Option<PathBuf>,

    /// Edge CSV (`from,to,cost`); requires --nodes
    #[arg(long, requires = "nodes")]
    edges: Option<PathBuf>,

    /// Synthetic grid side length, in nodes
    #[arg(long, default_value = "60")]
    size: usize,

    /// Seed for the synthetic grid
    #[arg(long, default_value = "42")]
    seed: u64,

    /// JSON engine configuration (search limits, snapping radii)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start coordinate as `lat,lon`
    #[arg(long, value_parser = parse_point)]
    from: Option<GeoPoint>,

    /// Goal coordinate as `lat,lon`
    #[arg(long, value_parser = parse_point)]
    to: Option<GeoPoint>,

    /// Run only this algorithm (default: all of them)
    #[arg(long)]
    algorithm: Option<Algorithm>,
}

fn parse_point(s: &str) -> Result<GeoPoint, String> {
    let (lat, lon) = s.split_once(',').ok_or("expected `lat,lon`")?;
    let lat: f64 = lat.trim().parse().map_err(|e| format!("latitude: {e}"))?;
    let lon: f64 = lon.trim().parse().map_err(|e| format!("longitude: {e}"))?;
    GeoPoint::try_new(lat, lon).map_err(|e| e.to_string())
}

struct Scenario {
    graph:  Graph,
    from:   GeoPoint,
    to:     GeoPoint,
    region: BoundingBox,
}

fn load_scenario(args: &Args) -> Result<Scenario> {
    if let (Some(nodes), Some(edges)) = (&args.nodes, &args.edges) {
        let graph = load_graph_csv(nodes, edges)
            .with_context(|| format!("loading {} and {}", nodes.display(), edges.display()))?;
        let (Some(from), Some(to)) = (args.from, args.to) else {
            bail!("--from and --to are required with a CSV network");
        };
        let mid = BoundingBox::from_corners(from.lat, from.lon, to.lat, to.lon).center();
        let region = BoundingBox::from_corners(
            mid.lat - 0.002,
            mid.lon - 0.002,
            mid.lat + 0.002,
            mid.lon + 0.002,
        );
        return Ok(Scenario { graph, from, to, region });
    }

    if args.size < 3 {
        bail!("--size must be at least 3");
    }
    let t0 = Instant::now();
    let grid = build_grid(args.size, args.seed)?;
    println!(
        "  built {}×{} grid: {} nodes, {} edges in {:.2?}",
        grid.size,
        grid.size,
        grid.graph.node_count(),
        grid.graph.edge_count(),
        t0.elapsed()
    );
    let last = grid.size - 1;
    let from = args.from.unwrap_or_else(|| grid.position(0, 0));
    let to = args.to.unwrap_or_else(|| grid.position(last, last));
    let region = grid.centre_box();
    Ok(Scenario { graph: grid.graph, from, to, region })
}

fn run_table(graph: &Graph, algorithms: &[Algorithm], start: NodeId, goal: NodeId, config: &NavConfig) -> Result<()> {
    println!(
        "  {:<32} {:>10} {:>8} {:>12} {:>12}",
        "algorithm", "expanded", "hops", "distance m", "time"
    );
    for algo in algorithms {
        let t0 = Instant::now();
        let report = algo.search(graph, start, goal, &config.search)?;
        let elapsed = t0.elapsed();
        let (hops, distance) = match &report.outcome {
            SearchOutcome::Found(path) => (
                (path.len() - 1).to_string(),
                format!("{:.1}", path_distance_m(graph, path)),
            ),
            SearchOutcome::NoPath => ("-".into(), "no path".into()),
            SearchOutcome::NegativeCycle => ("-".into(), "neg. cycle".into()),
            SearchOutcome::TimedOut => ("-".into(), "timed out".into()),
        };
        println!(
            "  {:<32} {:>10} {:>8} {:>12} {:>12.2?}",
            algo.name(),
            report.expanded,
            hops,
            distance,
            elapsed
        );
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    println!("=== city: road-network search comparison ===");

    let config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            NavConfig::from_json(&text)?
        }
        None => NavConfig::default(),
    };

    let scenario = load_scenario(&args)?;
    let algorithms: Vec<Algorithm> = match args.algorithm {
        Some(a) => vec![a],
        None => Algorithm::ALL.to_vec(),
    };

    let graph = &scenario.graph;
    let start = graph
        .snap(scenario.from, &config.snap)?
        .with_context(|| format!("no node within {} m of {}", config.snap.max_radius_m, scenario.from))?;
    let goal = graph
        .snap(scenario.to, &config.snap)?
        .with_context(|| format!("no node within {} m of {}", config.snap.max_radius_m, scenario.to))?;
    println!("  start {start} (near {}), goal {goal} (near {})", scenario.from, scenario.to);
    println!();

    println!("── open network ──");
    run_table(graph, &algorithms, start, goal, &config)?;
    println!();

    // ── Region obstacle ──────────────────────────────────────────────────────
    let shared = SharedGraph::new(scenario.graph);
    let manager = ObstacleManager::new(shared.clone());
    let region = scenario.region;

    let t0 = Instant::now();
    let task = manager.add_area_obstacles(region.min_lat, region.min_lon, region.max_lat, region.max_lon)?;
    let Some(batch) = task.wait()? else {
        bail!("region task was cancelled");
    };
    println!(
        "── {} closed: {} node(s) in {} ({:.2?}) ──",
        batch.id,
        batch.nodes.len(),
        batch.bbox,
        t0.elapsed()
    );
    run_table(&shared.snapshot(), &algorithms, start, goal, &config)?;
    println!();

    let undone = manager.remove_last_region()?;
    let restored = shared.snapshot();
    println!(
        "── region undone ({} node(s) reopened, {} obstacle(s) left) ──",
        undone.map_or(0, |b| b.nodes.len()),
        restored.obstacle_count()
    );
    run_table(&restored, &algorithms, start, goal, &config)?;

    Ok(())
}
