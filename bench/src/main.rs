use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use temporal_path_core::{
    sample_graph, temporal_hop_count, ExploreConfig, Explorer, Graph, GraphBuilder, Interval,
    Metric, RandomIds, SortKey,
};
use tracing_subscriber::EnvFilter;

const HOP_PROFILE_MAX_EDGES: usize = 100;

const VERTEX_LABELS: [&str; 10] = ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J"];

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    /// Fixed 10-vertex, 50-edge sample graph
    Sample,
    /// Uniform random temporal edges over vertices A..J
    Random,
    /// Both
    All,
}

/// Random exploration walks over a temporal graph, timed per metric.
#[derive(Debug, Parser)]
#[command(name = "temporal-path-bench")]
struct Args {
    #[arg(value_enum, default_value = "all")]
    mode: Mode,

    /// Edge count for the random graph
    #[arg(long, default_value_t = 2_000)]
    edges: usize,

    /// Earliest validity instant for random edges
    #[arg(long, default_value_t = 1)]
    min_time: i64,

    /// Latest validity instant for random edges
    #[arg(long, default_value_t = 48)]
    max_time: i64,

    /// Walks per metric
    #[arg(long, default_value_t = 200)]
    walks: usize,

    /// Steps after which a walk stops even if it could continue
    #[arg(long, default_value_t = 25)]
    max_depth: usize,

    /// Sort key applied at every step (label, validFrom, validTo, sourceLabel, targetLabel)
    #[arg(long, default_value = "label")]
    sort: String,

    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    if args.min_time >= args.max_time {
        bail!("--min-time must be below --max-time");
    }

    println!("temporal-path-bench");
    println!("===================");
    println!();

    let mut rng = StdRng::seed_from_u64(args.seed);
    let sort_key = SortKey::from(args.sort.as_str());

    let graphs: Vec<(&str, Graph)> = match args.mode {
        Mode::Sample => vec![("Sample graph", sample_graph(RandomIds)?)],
        Mode::Random => vec![("Random temporal graph", gen_random(&args, &mut rng)?)],
        Mode::All => vec![
            ("Sample graph", sample_graph(RandomIds)?),
            ("Random temporal graph", gen_random(&args, &mut rng)?),
        ],
    };

    for (name, graph) in &graphs {
        run_benchmark(name, graph, &args, sort_key, &mut rng)?;
    }
    Ok(())
}

fn run_benchmark(
    name: &str,
    graph: &Graph,
    args: &Args,
    sort_key: SortKey,
    rng: &mut StdRng,
) -> Result<()> {
    println!("--- {} ---", name);
    println!(
        "{} vertices, {} edges, sort by {}",
        graph.vertex_count(),
        graph.edge_count(),
        sort_key
    );
    if graph.edge_count() == 0 {
        println!("(no edges, nothing to explore)");
        println!();
        return Ok(());
    }

    println!();
    println!(
        "{:>8} {:>10} {:>10} {:>10} {:>10} {:>10}",
        "metric", "walks", "avg depth", "max depth", "dead ends", "time"
    );
    println!(
        "{:->8} {:->10} {:->10} {:->10} {:->10} {:->10}",
        "", "", "", "", "", ""
    );

    for metric in [
        Metric::HopCount,
        Metric::TemporalShortestPath,
        Metric::TemporalConnectedness,
    ] {
        let config = ExploreConfig {
            metric,
            sort_key,
            root_vertex: None,
        };

        let mut total_depth = 0usize;
        let mut deepest = 0usize;
        let mut dead_ends = 0usize;
        let t = Instant::now();

        for _ in 0..args.walks {
            let mut explorer = Explorer::new(graph, config.clone())?;
            let depth = random_walk(&mut explorer, args.max_depth, rng)?;
            if depth < args.max_depth {
                dead_ends += 1;
            }
            total_depth += depth;
            deepest = deepest.max(depth);
        }

        let elapsed = t.elapsed();
        println!(
            "{:>8} {:>10} {:>10.2} {:>10} {:>10} {:>8.1}ms",
            metric,
            args.walks,
            total_depth as f64 / args.walks.max(1) as f64,
            deepest,
            dead_ends,
            elapsed.as_secs_f64() * 1000.0
        );
    }

    // Undo throughput: build one deep path, then unwind it completely
    let mut explorer = Explorer::new(graph, ExploreConfig::default())?;
    let depth = random_walk(&mut explorer, args.max_depth, rng)?;
    let t = Instant::now();
    while explorer.steps().len() > 1 {
        explorer.undo();
    }
    explorer.undo();
    println!();
    println!(
        "Unwound a {}-edge path in {:.3}ms",
        depth,
        t.elapsed().as_secs_f64() * 1000.0
    );

    // Hop profiles enumerate simple paths; keep to small graphs
    if graph.edge_count() <= HOP_PROFILE_MAX_EDGES && graph.vertex_count() > 1 {
        let start = &graph.vertices()[rng.gen_range(0..graph.vertex_count())];
        let end = loop {
            let v = &graph.vertices()[rng.gen_range(0..graph.vertex_count())];
            if v.id != start.id {
                break v;
            }
        };
        let t = Instant::now();
        let profile = temporal_hop_count(graph, &start.id, &end.id)?;
        println!(
            "Hop profile {} -> {}: {} segments in {:.3}ms",
            start.label,
            end.label,
            profile.segments().len(),
            t.elapsed().as_secs_f64() * 1000.0
        );
        for seg in profile.segments() {
            println!("  [{}, {}) {} hops", seg.window.from, seg.window.to, seg.hops);
        }
    }
    println!();
    Ok(())
}

/// Pick a random candidate at the frontier until the path dead-ends or
/// reaches `max_depth` chosen edges. Returns the number of edges chosen.
fn random_walk(explorer: &mut Explorer<'_>, max_depth: usize, rng: &mut StdRng) -> Result<usize> {
    for depth in 0..max_depth {
        let index = explorer.steps().len() - 1;
        let frontier = explorer.steps()[index].edges();
        let edge_id = frontier[rng.gen_range(0..frontier.len())].id;
        explorer
            .choose_edge(index, &edge_id)
            .with_context(|| format!("choosing edge {} at step {}", edge_id, index))?;

        if explorer.steps().len() == index + 1 {
            return Ok(depth + 1);
        }
    }
    Ok(max_depth)
}

/// Uniform random temporal graph over vertices A..J.
///
/// Each edge picks source and target uniformly (self-loops allowed) and two
/// instants in `[min_time, max_time)`; the earlier becomes `valid_from`.
fn gen_random(args: &Args, rng: &mut StdRng) -> Result<Graph> {
    let mut builder = GraphBuilder::with_capacity(RandomIds, VERTEX_LABELS.len(), args.edges);
    let ids: Vec<_> = VERTEX_LABELS
        .iter()
        .map(|label| builder.add_vertex(*label, Interval::UNBOUNDED))
        .collect();

    for i in 0..args.edges {
        let source = ids[rng.gen_range(0..ids.len())];
        let target = ids[rng.gen_range(0..ids.len())];
        let a = rng.gen_range(args.min_time..args.max_time);
        let b = rng.gen_range(args.min_time..args.max_time);
        let (from, to) = if a == b { (a, a + 1) } else { (a.min(b), a.max(b)) };
        builder.add_edge_between(format!("Edge {}", i + 1), source, target, from, to);
    }

    let t = Instant::now();
    let graph = builder.build()?;
    tracing::info!(
        edges = graph.edge_count(),
        elapsed_ms = t.elapsed().as_secs_f64() * 1000.0,
        "random graph built"
    );
    Ok(graph)
}
