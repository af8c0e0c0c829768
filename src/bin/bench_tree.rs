//! Benchmark merge tree construction at large scales.
//!
//! Run with: cargo run --release --bin bench_tree
//!
//! Usage:
//!   bench_tree                    Default 1k x 1k grid
//!   bench_tree --side 2k -n 5     2k x 2k grid, 5 iterations
//!   bench_tree --tree join        Join tree only
//!
//! For per-phase timing, build with: cargo run --release --features timing --bin bench_tree

use clap::Parser;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Instant;
use sweeptree::{compute, AdjacencyMesh, Scalars, TreeParams, TreeType};

fn parse_count(s: &str) -> Result<usize, String> {
    const SUFFIXES: [(char, usize); 2] = [('k', 1_000), ('m', 1_000_000)];

    let lower = s.to_lowercase();
    let mut digits = lower.as_str();
    let mut multiplier = 1usize;
    for (suffix, scale) in SUFFIXES {
        if let Some(head) = lower.strip_suffix(suffix) {
            digits = head;
            multiplier = scale;
            break;
        }
    }

    let value: f64 = digits
        .parse()
        .map_err(|e| format!("invalid count '{}': {}", s, e))?;
    Ok((value * multiplier as f64) as usize)
}

#[derive(Parser)]
#[command(about = "Benchmark merge tree construction on random grid fields")]
struct Args {
    /// Grid side length (total vertices = side * side). Accepts k/m suffixes.
    #[arg(long, default_value = "1k", value_parser = parse_count)]
    side: usize,

    /// Tree to build: join, split or both.
    #[arg(long, default_value = "both")]
    tree: String,

    /// Iterations per configuration.
    #[arg(short = 'n', long, default_value_t = 3)]
    iters: usize,

    /// Seed for the random field.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Skip the segmentation passes.
    #[arg(long)]
    no_segmentation: bool,
}

fn random_field(n: usize, seed: u64) -> Vec<f32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(0.0..1.0)).collect()
}

fn bench_type(
    tree_type: TreeType,
    mesh: &AdjacencyMesh,
    scalars: &Scalars,
    args: &Args,
) {
    let params = TreeParams {
        tree_type,
        compute_segmentation: !args.no_segmentation,
        ..TreeParams::default()
    };
    let n = scalars.size();

    for iter in 0..args.iters {
        let t = Instant::now();
        let tree = compute(mesh, scalars, &params).expect("build failed");
        let elapsed = t.elapsed();
        let rate = n as f64 / elapsed.as_secs_f64();
        println!(
            "{} tree  iter {}  {:8.1}ms  {:>12.0} vert/s  ({} nodes, {} arcs, {} leaves)",
            tree_type,
            iter,
            elapsed.as_secs_f64() * 1000.0,
            rate,
            tree.num_nodes(),
            tree.num_arcs(),
            tree.leaves().len()
        );
    }
}

fn main() {
    let args = Args::parse();
    let n = args.side * args.side;

    println!(
        "grid {}x{} ({} vertices), seed {}",
        args.side, args.side, n, args.seed
    );

    let t = Instant::now();
    let mesh = AdjacencyMesh::grid_2d(args.side, args.side);
    let field = random_field(n, args.seed);
    let scalars = Scalars::from_f32(&field);
    println!("setup in {:.1}ms", t.elapsed().as_secs_f64() * 1000.0);

    if args.tree == "join" || args.tree == "both" {
        bench_type(TreeType::Join, &mesh, &scalars, &args);
    }
    if args.tree == "split" || args.tree == "both" {
        bench_type(TreeType::Split, &mesh, &scalars, &args);
    }
}
