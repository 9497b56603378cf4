use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing_subscriber::EnvFilter;

use casegen::graph::Graph;
use casegen::io::{MatrixRead, StateListRead};
use casegen::machine::StateMachine;
use casegen::node::{Node, NumNodes};
use casegen::travel::{
    ALGORITHM, Algorithm, END, MAX_CASES, MAX_DEPTH, Properties, RANDOM_WALK, START,
};

/// Generates test-case sequences from a state-machine description.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Traversal strategy: node, all, dfs, path, or euler
    #[arg(short, long, default_value = "node")]
    strategy: Algorithm,

    /// Start vertex, or "any" to sweep all vertices
    #[arg(short = 'o', long, default_value = "0")]
    start: String,

    /// End vertex, or "any" to sweep all vertices
    #[arg(short = 'e', long, default_value = "0")]
    end: String,

    /// Maximum links per case (strategy "all")
    #[arg(short = 'd', long)]
    max_depth: Option<i64>,

    /// Maximum number of cases (strategy "all")
    #[arg(short = 'n', long)]
    max_cases: Option<i64>,

    /// Transition-matrix file to load
    #[arg(short, long, default_value = "m.txt")]
    file: PathBuf,

    /// Load a state-list file instead of a transition matrix
    #[arg(long, value_name = "FILE")]
    states: Option<PathBuf>,

    /// Shuffle adjacency order while searching
    #[arg(long)]
    random: bool,

    /// Seed for reproducible --random runs
    #[arg(long)]
    seed: Option<u64>,

    /// Print the loaded graph instead of generating cases
    #[arg(long)]
    dump: bool,
}

/// Expands a vertex selector: an index, or "any" for all of them.
fn select(selector: &str, n: NumNodes) -> Result<Vec<Node>, String> {
    if selector == "any" {
        return Ok((0..n).collect());
    }
    match selector.parse::<Node>() {
        Ok(v) if v < n => Ok(vec![v]),
        Ok(v) => Err(format!("vertex S{v} is out of range ({n} states)")),
        Err(_) => Err(format!("invalid vertex selector {selector:?}")),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let loaded = match &args.states {
        Some(path) => Graph::try_read_states_file(path),
        None => Graph::try_read_matrix_file(&args.file),
    };
    let graph = match loaded {
        Ok(graph) => graph,
        Err(e) => {
            eprintln!("failed to load state machine: {e}");
            return ExitCode::FAILURE;
        }
    };
    if !graph.good() {
        eprintln!("state machine has no transitions");
        return ExitCode::FAILURE;
    }
    if args.dump {
        print!("{graph}");
        return ExitCode::SUCCESS;
    }

    // Sweeping makes no sense for strategies that ignore an endpoint.
    let uses_start = !matches!(args.strategy, Algorithm::Dfs | Algorithm::DfsPath);
    let uses_end = matches!(args.strategy, Algorithm::BfsOne | Algorithm::BfsAll);
    let n = graph.number_of_nodes();
    let selected = |used: bool, selector: &str| {
        if used {
            select(selector, n)
        } else {
            Ok(vec![0])
        }
    };
    let (starts, ends) = match (
        selected(uses_start, &args.start),
        selected(uses_end, &args.end),
    ) {
        (Ok(starts), Ok(ends)) => (starts, ends),
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let mut config = Properties::default();
    config.insert(ALGORITHM.to_string(), args.strategy.tag());
    if let Some(depth) = args.max_depth {
        config.insert(MAX_DEPTH.to_string(), depth);
    }
    if let Some(cases) = args.max_cases {
        config.insert(MAX_CASES.to_string(), cases);
    }
    if args.random {
        config.insert(RANDOM_WALK.to_string(), 1);
    }

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let mut machine = StateMachine::new(graph);
    let mut failed = false;
    for &start in &starts {
        for &end in &ends {
            config.insert(START.to_string(), start as i64);
            config.insert(END.to_string(), end as i64);
            machine.configure(&config);
            match machine.cases(&mut rng) {
                Ok(trace) => print!("{trace}"),
                Err(e) => {
                    eprintln!("S{start} -> S{end}: {e}");
                    failed = true;
                }
            }
        }
    }
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
