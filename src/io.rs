/*!
Loading graphs from the two text formats the generator accepts.

**Transition matrix**: one row per state, one column per edge type; the
entry is the target state or `-1` for "no transition". Row `i`, column
`c` with value `j >= 0` becomes a link `i --c--> j`.

**State list**: one row of `0`/`1` attribute flags per state; the graph
is derived by linking states that differ in exactly one attribute (see
[`crate::machine::derive_transition_graph`]).
*/

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::warn;

use crate::bits::BitSet;
use crate::graph::Graph;
use crate::machine::derive_transition_graph;
use crate::node::{EdgeType, Node, NumEdgeTypes, NumNodes};

macro_rules! io_error {
    ($($arg : tt)*) => {
        Err(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!($($arg)*),
        ))
    };
}

macro_rules! raise_error_unless {
    ($cond : expr, $($arg : tt)*) => {
        if !$cond {
            return io_error!($($arg)*);
        }
    };
}

/// Parses a whitespace-separated table of integers, skipping blank
/// lines and requiring a consistent column count.
fn read_table<R: BufRead>(reader: R) -> std::io::Result<Vec<Vec<i64>>> {
    let mut rows: Vec<Vec<i64>> = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let mut row = Vec::new();
        for token in line.split_whitespace() {
            match token.parse::<i64>() {
                Ok(value) => row.push(value),
                Err(_) => return io_error!("line {}: invalid entry {:?}", index + 1, token),
            }
        }
        if row.is_empty() {
            continue;
        }
        raise_error_unless!(
            rows.is_empty() || row.len() == rows[0].len(),
            "line {}: expected {} entries, found {}",
            index + 1,
            rows[0].len(),
            row.len()
        );
        rows.push(row);
    }
    raise_error_unless!(!rows.is_empty(), "input holds no rows");
    Ok(rows)
}

/// Reader for the transition-matrix format.
#[derive(Debug, Default)]
pub struct MatrixReader;

impl MatrixReader {
    pub fn new() -> Self {
        Self
    }

    pub fn try_read_graph<R: BufRead>(&self, reader: R) -> std::io::Result<Graph> {
        let rows = read_table(reader)?;
        let num_states = rows.len();
        let num_types = rows[0].len();

        let mut g = Graph::new(num_states as NumNodes);
        // Columns whose entries are all -1 still count as edge types.
        g.register_edge_types(num_types as NumEdgeTypes);
        for (source, row) in rows.iter().enumerate() {
            for (ty, &target) in row.iter().enumerate() {
                if target < 0 {
                    continue;
                }
                if target as usize >= num_states {
                    warn!(
                        source,
                        ty, target, "transition target out of range, skipped"
                    );
                    continue;
                }
                g.link(source as Node, target as Node, ty as EdgeType);
            }
        }
        Ok(g)
    }

    pub fn try_read_graph_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<Graph> {
        self.try_read_graph(BufReader::new(File::open(path)?))
    }
}

/// Reader for the state-list format.
#[derive(Debug, Default)]
pub struct StateListReader;

impl StateListReader {
    pub fn new() -> Self {
        Self
    }

    pub fn try_read_graph<R: BufRead>(&self, reader: R) -> std::io::Result<Graph> {
        let rows = read_table(reader)?;
        let width = rows[0].len();
        let mut states = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            raise_error_unless!(
                row.iter().all(|&flag| flag == 0 || flag == 1),
                "state {}: attribute flags must be 0 or 1",
                index
            );
            states.push(BitSet::new_with_bits_set(
                width,
                row.iter()
                    .enumerate()
                    .filter(|&(_, &flag)| flag == 1)
                    .map(|(attribute, _)| attribute),
            ));
        }
        match derive_transition_graph(&states) {
            Ok(g) => Ok(g),
            Err(e) => io_error!("deriving transitions failed: {e}"),
        }
    }

    pub fn try_read_graph_file<P: AsRef<Path>>(&self, path: P) -> std::io::Result<Graph> {
        self.try_read_graph(BufReader::new(File::open(path)?))
    }
}

/// Shorthand to load a graph from the transition-matrix format.
pub trait MatrixRead: Sized {
    fn try_read_matrix<R: BufRead>(reader: R) -> std::io::Result<Self>;

    fn try_read_matrix_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        Self::try_read_matrix(BufReader::new(File::open(path)?))
    }
}

impl MatrixRead for Graph {
    fn try_read_matrix<R: BufRead>(reader: R) -> std::io::Result<Self> {
        MatrixReader::new().try_read_graph(reader)
    }
}

/// Shorthand to load a graph from the state-list format.
pub trait StateListRead: Sized {
    fn try_read_states<R: BufRead>(reader: R) -> std::io::Result<Self>;

    fn try_read_states_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        Self::try_read_states(BufReader::new(File::open(path)?))
    }
}

impl StateListRead for Graph {
    fn try_read_states<R: BufRead>(reader: R) -> std::io::Result<Self> {
        StateListReader::new().try_read_graph(reader)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_matrix(text: &str) -> std::io::Result<Graph> {
        Graph::try_read_matrix(text.as_bytes())
    }

    fn read_states(text: &str) -> std::io::Result<Graph> {
        Graph::try_read_states(text.as_bytes())
    }

    #[test]
    fn matrix_round() {
        let g = read_matrix("1 2\n2 0\n0 1\n").unwrap();
        assert_eq!(g.number_of_nodes(), 3);
        assert_eq!(g.number_of_links(), 6);
        assert_eq!(g.number_of_edge_types(), 2);
        assert!(g.good());
        assert!(g.eulerian());
    }

    #[test]
    fn matrix_skips_missing_and_out_of_range_transitions() {
        let g = read_matrix("-1 2\n5 -1\n-1 -1\n").unwrap();
        assert_eq!(g.number_of_nodes(), 3);
        assert_eq!(g.number_of_links(), 1);
        // Unused columns still register their edge type.
        assert_eq!(g.number_of_edge_types(), 2);
        let link = *g.link_at(0);
        assert_eq!((link.source, link.target, link.ty), (0, 2, 1));
    }

    #[test]
    fn matrix_rejects_ragged_rows() {
        let err = read_matrix("0 1\n0\n").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::InvalidData);
    }

    #[test]
    fn matrix_rejects_garbage() {
        assert!(read_matrix("0 x\n").is_err());
        assert!(read_matrix("").is_err());
        assert!(read_matrix("\n  \n").is_err());
    }

    #[test]
    fn matrix_skips_blank_lines() {
        let g = read_matrix("\n1 -1\n\n0 -1\n").unwrap();
        assert_eq!(g.number_of_nodes(), 2);
        assert_eq!(g.number_of_links(), 2);
    }

    #[test]
    fn states_derive_transitions() {
        let g = read_states("0 0\n1 0\n1 1\n").unwrap();
        assert_eq!(g.number_of_nodes(), 3);
        assert_eq!(g.number_of_edge_types(), 4);
        assert_eq!(g.number_of_links(), 4);
    }

    #[test]
    fn states_reject_non_binary_flags() {
        assert!(read_states("0 2\n").is_err());
    }
}
