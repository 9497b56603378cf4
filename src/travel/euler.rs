/*!
Euler circuit construction via walk extension (Hierholzer's method).
*/

use super::{Properties, START, case_head, property, push_step};
use crate::bits::BitSet;
use crate::error::Error;
use crate::graph::{Graph, Vertex};
use crate::node::{LinkId, Node};

/// Emits a single closed case that traverses every link exactly once,
/// rotated to begin at `START`.
///
/// Requires a balanced graph; [`crate::machine::StateMachine`]
/// eulerizes beforehand. Connectivity failures surface while building
/// the circuit.
#[derive(Debug, Default)]
pub struct Euler {
    start: Node,
}

impl Euler {
    pub fn configure(&mut self, config: &Properties) {
        self.start = property(config, START, 0) as Node;
    }

    pub fn travel(&mut self, g: &Graph) -> Result<String, Error> {
        if !g.eulerian() {
            return Err(Error::NotEulerian);
        }
        if g.number_of_links() == 0 || g.links_of(self.start).is_empty() {
            return Ok(String::new());
        }
        let circuit = self.circuit(g)?;
        let mut line = self.print(g, &circuit)?;
        line.push('\n');
        Ok(line)
    }

    /// Builds the full circuit: repeatedly walk until returning to the
    /// walk's origin, then rotate the closed circuit so its tail sits on
    /// a vertex with unvisited out-links, and walk again.
    pub fn circuit(&self, g: &Graph) -> Result<Vec<LinkId>, Error> {
        let mut visited = BitSet::new(g.number_of_links() as usize);
        // Residual degrees, counted down as links are consumed.
        let mut residual: Vec<Vertex> = g.vertices().map(|v| g.vertex(v).clone()).collect();
        let mut circuit = Vec::new();

        while !visited.all_one() {
            Self::walk(g, self.start, &mut circuit, &mut visited, &mut residual)?;
            Self::rotate_to_free_vertex(g, &mut circuit, &visited, &residual)?;
        }
        Ok(circuit)
    }

    /// Extends the circuit from its current tail until the walk closes.
    fn walk(
        g: &Graph,
        start: Node,
        circuit: &mut Vec<LinkId>,
        visited: &mut BitSet,
        residual: &mut [Vertex],
    ) -> Result<(), Error> {
        let mut at = circuit
            .last()
            .map_or(start, |&e| g.link_at(e).target);
        let origin = at;

        while residual[at as usize].out_degree > 0 {
            let next = g
                .links_of(at)
                .iter()
                .copied()
                .find(|&e| !visited.get_bit(e as usize))
                .ok_or(Error::EulerWalkStuck(at, residual[at as usize].out_degree))?;
            visited.set_bit(next as usize);
            circuit.push(next);
            residual[at as usize].out_degree -= 1;
            at = g.link_at(next).target;
            residual[at as usize].in_degree -= 1;
            if at == origin {
                return Ok(());
            }
        }
        Ok(())
    }

    /// Rotates the closed circuit until its tail vertex still has an
    /// unvisited out-link. Failing to find one while links remain
    /// uncovered means the graph is disconnected.
    fn rotate_to_free_vertex(
        g: &Graph,
        circuit: &mut [LinkId],
        visited: &BitSet,
        residual: &[Vertex],
    ) -> Result<(), Error> {
        let (&first, &last) = match (circuit.first(), circuit.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(Error::IncompleteCircuit),
        };
        let head = g.link_at(first).source;
        let tail = g.link_at(last).target;
        if head != tail {
            return Err(Error::OpenCircuit(head, tail));
        }

        let mut steps = 0;
        let mut tail = g.link_at(circuit[circuit.len() - 1]).target;
        while residual[tail as usize].out_degree == 0 && steps < circuit.len() {
            let front = g.link_at(circuit[0]).source;
            if residual[front as usize].balance() != 0 {
                return Err(Error::UnbalancedCircuitVertex(front));
            }
            circuit.rotate_left(1);
            tail = g.link_at(circuit[circuit.len() - 1]).target;
            steps += 1;
        }
        if steps == circuit.len() && !visited.all_one() {
            return Err(Error::IncompleteCircuit);
        }
        Ok(())
    }

    /// Rotates the circuit so the case begins at the start vertex, then
    /// renders it.
    fn print(&self, g: &Graph, circuit: &[LinkId]) -> Result<String, Error> {
        let pivot = circuit
            .iter()
            .position(|&e| g.link_at(e).source == self.start)
            .ok_or(Error::StartOffCircuit(self.start))?;

        let mut line = case_head(self.start);
        for &e in circuit[pivot..].iter().chain(&circuit[..pivot]) {
            push_step(&mut line, g.link_at(e));
        }
        Ok(line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand_pcg::Pcg64Mcg;

    /// Two opposing triangles on three vertices; every vertex has
    /// in-degree and out-degree 2.
    fn two_cycles() -> Graph {
        let mut g = Graph::new(3);
        g.link(0, 1, 0);
        g.link(1, 2, 0);
        g.link(2, 0, 0);
        g.link(0, 2, 1);
        g.link(2, 1, 1);
        g.link(1, 0, 1);
        g
    }

    fn assert_closed_cover(g: &Graph, circuit: &[LinkId]) {
        assert_eq!(circuit.len() as u32, g.number_of_links());
        let mut seen = BitSet::new(g.number_of_links() as usize);
        let mut at = g.link_at(circuit[0]).source;
        for &e in circuit {
            assert!(!seen.set_bit(e as usize), "link L{e} traversed twice");
            assert_eq!(g.link_at(e).source, at);
            at = g.link_at(e).target;
        }
        assert_eq!(at, g.link_at(circuit[0]).source);
    }

    #[test]
    fn circuit_covers_two_cycles() {
        let g = two_cycles();
        let mut t = Euler::default();
        let circuit = t.circuit(&g).unwrap();
        assert_closed_cover(&g, &circuit);

        let trace = t.travel(&g).unwrap();
        assert!(trace.starts_with("S0--"));
        assert!(trace.ends_with("-->S0\n"));
        assert_eq!(trace.matches("-->").count(), 6);
    }

    #[test]
    fn circuit_needs_interleaved_walks() {
        // A figure eight through S0: the first walk closes early and
        // must be extended by a second walk from a rotated tail.
        let mut g = Graph::new(3);
        g.link(0, 1, 0);
        g.link(1, 0, 0);
        g.link(0, 2, 0);
        g.link(2, 0, 0);

        let circuit = Euler::default().circuit(&g).unwrap();
        assert_closed_cover(&g, &circuit);
    }

    #[test]
    fn start_elsewhere_rotates_the_case() {
        let g = two_cycles();
        let mut t = Euler::default();
        let mut config = Properties::default();
        config.insert(START.to_string(), 1);
        t.configure(&config);

        let trace = t.travel(&g).unwrap();
        assert!(trace.starts_with("S1--"));
        assert!(trace.ends_with("-->S1\n"));
        assert_eq!(trace.matches("-->").count(), 6);
    }

    #[test]
    fn unbalanced_graph_is_rejected() {
        let mut g = Graph::new(2);
        g.link(0, 1, 0);
        assert_eq!(Euler::default().travel(&g), Err(Error::NotEulerian));
    }

    #[test]
    fn disconnected_balanced_graph_is_reported() {
        // Two separate 2-cycles; the circuit from S0 cannot reach the
        // second component.
        let mut g = Graph::new(4);
        g.link(0, 1, 0);
        g.link(1, 0, 0);
        g.link(2, 3, 0);
        g.link(3, 2, 0);
        assert_eq!(
            Euler::default().travel(&g),
            Err(Error::IncompleteCircuit)
        );
    }

    #[test]
    fn isolated_start_yields_empty_trace() {
        let mut g = Graph::new(3);
        g.link(1, 2, 0);
        g.link(2, 1, 0);
        // S0 is balanced but has no out-links.
        assert_eq!(Euler::default().travel(&g).unwrap(), "");
    }

    #[test]
    fn random_balanced_graphs_are_covered() {
        let mut rng = Pcg64Mcg::seed_from_u64(0xe1e);
        for _ in 0..10 {
            let n: Node = rng.random_range(2..8);
            let mut g = Graph::new(n);
            // A union of random closed tours through S0 is balanced and
            // connected from S0.
            for _ in 0..rng.random_range(1..4) {
                let mut at = 0;
                for _ in 0..rng.random_range(1..6) {
                    let next = rng.random_range(0..n);
                    g.link(at, next, 0);
                    at = next;
                }
                g.link(at, 0, 0);
            }
            let circuit = Euler::default().circuit(&g).unwrap();
            assert_closed_cover(&g, &circuit);
        }
    }
}
