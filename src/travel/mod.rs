/*!
Traversal strategies that turn a graph into printable test-case traces.

Every strategy emits the same trace grammar: a case starts with a vertex
label `S{v}` and continues with steps `--E{ty}-->S{w}`, one case per
line. Strategies are configured through a flat [`Properties`] map so a
single driver can reconfigure and rerun them in a loop.
*/

mod bfs;
mod dfs;
mod euler;

use fxhash::FxHashMap;
use rand::Rng;
use std::fmt::Write;
use std::str::FromStr;

pub use bfs::{BfsAll, BfsOne, shortest_path};
pub use dfs::{Dfs, DfsPath};
pub use euler::Euler;

use crate::error::Error;
use crate::graph::{Graph, Link};
use crate::node::Node;

/// Flat string-to-integer configuration shared by all strategies.
pub type Properties = FxHashMap<String, i64>;

/// Start vertex of a traversal.
pub const START: &str = "START";
/// End vertex of a path search.
pub const END: &str = "END";
/// Maximum number of steps per case.
pub const MAX_DEPTH: &str = "MAX_DEPTH";
/// Maximum number of cases to emit.
pub const MAX_CASES: &str = "MAX_CASES";
/// Nonzero to shuffle adjacency order before each expansion.
pub const RANDOM_WALK: &str = "RANDOM_WALK";
/// Strategy selector, holding an [`Algorithm`] tag.
pub const ALGORITHM: &str = "ALGORITHM";

/// Looks up `key`, falling back to `default` if absent.
pub(crate) fn property(config: &Properties, key: &str, default: i64) -> i64 {
    config.get(key).copied().unwrap_or(default)
}

/// Appends `--E{ty}-->S{target}` to a trace line.
pub(crate) fn push_step(line: &mut String, link: &Link) {
    let _ = write!(line, "--E{}-->S{}", link.ty, link.target);
}

/// Prepends a trace line with its start label `S{v}`.
pub(crate) fn case_head(v: Node) -> String {
    format!("S{v}")
}

/// The closed set of traversal strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// One shortest path between two vertices.
    BfsOne,
    /// All simple paths between two vertices, bounded by depth and count.
    BfsAll,
    /// A spanning forest of paths from vertex 0 to every dead end.
    Dfs,
    /// A greedy set of paths covering every link exactly once.
    DfsPath,
    /// A single closed circuit covering every link exactly once.
    Euler,
}

impl Algorithm {
    /// Integer tag for storing the selector in a [`Properties`] map.
    pub fn tag(self) -> i64 {
        match self {
            Algorithm::BfsOne => 0,
            Algorithm::BfsAll => 1,
            Algorithm::Dfs => 2,
            Algorithm::DfsPath => 3,
            Algorithm::Euler => 4,
        }
    }

    pub fn from_tag(tag: i64) -> Option<Self> {
        Some(match tag {
            0 => Algorithm::BfsOne,
            1 => Algorithm::BfsAll,
            2 => Algorithm::Dfs,
            3 => Algorithm::DfsPath,
            4 => Algorithm::Euler,
            _ => return None,
        })
    }
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "node" => Algorithm::BfsOne,
            "all" => Algorithm::BfsAll,
            "dfs" => Algorithm::Dfs,
            "path" => Algorithm::DfsPath,
            "euler" => Algorithm::Euler,
            _ => return Err(format!("unknown strategy: {s:?}")),
        })
    }
}

/// A configured traversal strategy.
pub enum Traveller {
    BfsOne(BfsOne),
    BfsAll(BfsAll),
    Dfs(Dfs),
    DfsPath(DfsPath),
    Euler(Euler),
}

impl Traveller {
    pub fn new(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::BfsOne => Traveller::BfsOne(BfsOne::default()),
            Algorithm::BfsAll => Traveller::BfsAll(BfsAll::default()),
            Algorithm::Dfs => Traveller::Dfs(Dfs),
            Algorithm::DfsPath => Traveller::DfsPath(DfsPath),
            Algorithm::Euler => Traveller::Euler(Euler::default()),
        }
    }

    pub fn algorithm(&self) -> Algorithm {
        match self {
            Traveller::BfsOne(_) => Algorithm::BfsOne,
            Traveller::BfsAll(_) => Algorithm::BfsAll,
            Traveller::Dfs(_) => Algorithm::Dfs,
            Traveller::DfsPath(_) => Algorithm::DfsPath,
            Traveller::Euler(_) => Algorithm::Euler,
        }
    }

    /// Reads the properties a strategy cares about; unknown keys are
    /// ignored so one map can drive every strategy.
    pub fn configure(&mut self, config: &Properties) {
        match self {
            Traveller::BfsOne(t) => t.configure(config),
            Traveller::BfsAll(t) => t.configure(config),
            Traveller::Dfs(_) | Traveller::DfsPath(_) => {}
            Traveller::Euler(t) => t.configure(config),
        }
    }

    /// Runs the strategy over `g` and returns its trace.
    pub fn travel<R: Rng>(&mut self, g: &Graph, rng: &mut R) -> Result<String, Error> {
        match self {
            Traveller::BfsOne(t) => t.travel(g, rng),
            Traveller::BfsAll(t) => t.travel(g, rng),
            Traveller::Dfs(t) => t.travel(g),
            Traveller::DfsPath(t) => t.travel(g),
            Traveller::Euler(t) => t.travel(g),
        }
    }
}
