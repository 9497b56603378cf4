/*!
Error taxonomy for graph mutation and traversal.
*/

use thiserror::Error;

use crate::node::{Node, NumLinks};

/// Failures that can surface while transforming a graph or walking it.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Two bitsets of different lengths were diffed.
    #[error("bitsets of size {0} and {1} cannot be diffed")]
    SizeMismatch(usize, usize),

    /// A path printer hit a vertex without a recorded incoming link.
    #[error("no backtrack link recorded for S{0}")]
    MissingBacktrack(Node),

    /// An Euler circuit was requested on a graph that is not Eulerian.
    #[error("graph is not eulerian")]
    NotEulerian,

    /// The circuit walk found no unvisited out-link despite a positive
    /// residual out-degree.
    #[error("euler walk stuck at S{0} with residual out-degree {1}")]
    EulerWalkStuck(Node, NumLinks),

    /// The partial circuit does not start and end on the same vertex.
    #[error("euler circuit is open: starts at S{0}, ends at S{1}")]
    OpenCircuit(Node, Node),

    /// A vertex on the circuit had unequal residual in- and out-degrees.
    #[error("vertex S{0} on the euler circuit is unbalanced")]
    UnbalancedCircuitVertex(Node),

    /// Rotation visited every circuit position without finding an
    /// extendable vertex while links remain uncovered.
    #[error("euler circuit cannot be extended to cover all links")]
    IncompleteCircuit,

    /// The requested start vertex is not the source of any circuit link.
    #[error("start vertex S{0} does not lie on the euler circuit")]
    StartOffCircuit(Node),

    /// Eulerization kept finding imbalance after the permitted number of
    /// bridge rounds, or ran out of bridges with imbalance remaining.
    #[error("eulerization did not converge after {0} rounds")]
    EulerizeDiverged(usize),
}
