/*!
Ties a graph to a traversal strategy and produces test-case traces.

A state machine can be loaded directly as a transition matrix, or
derived from a list of attribute states: two states become linked when
they differ in exactly one attribute.
*/

use rand::Rng;
use tracing::debug;

use crate::bits::BitSet;
use crate::error::Error;
use crate::graph::Graph;
use crate::node::{EdgeType, Node, NumEdgeTypes, NumNodes};
use crate::travel::{ALGORITHM, Algorithm, Properties, Traveller, property};

/// Derives the transition graph of a machine given as a list of states.
///
/// Each state is a row of boolean attributes; all rows must have the
/// same width. States differing in exactly the attribute `a` are linked
/// in both directions, typed by the attribute and the direction of the
/// flip: `a` for setting it, `a + width` for clearing it.
pub fn derive_transition_graph(states: &[BitSet]) -> Result<Graph, Error> {
    let width = states.first().map_or(0, BitSet::number_of_bits);
    let mut g = Graph::new(states.len() as NumNodes);
    g.register_edge_types(2 * width as NumEdgeTypes);

    for (i, from) in states.iter().enumerate() {
        for (j, to) in states.iter().enumerate() {
            if i == j {
                continue;
            }
            let changed = from.diff(to)?;
            if let [attribute] = changed[..] {
                let ty = if from.get_bit(attribute) {
                    attribute + width
                } else {
                    attribute
                };
                g.link(i as Node, j as Node, ty as EdgeType);
            }
        }
    }
    debug!(
        states = states.len(),
        links = g.number_of_links(),
        "derived transition graph"
    );
    Ok(g)
}

/// A graph paired with a configurable traveller.
pub struct StateMachine {
    graph: Graph,
    traveller: Option<Traveller>,
}

impl StateMachine {
    pub fn new(graph: Graph) -> Self {
        Self {
            graph,
            traveller: None,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }

    /// Number of states.
    pub fn size(&self) -> NumNodes {
        self.graph.number_of_nodes()
    }

    /// Selects a strategy from `ALGORITHM` and forwards the remaining
    /// properties to it. An absent or unknown tag clears the strategy.
    pub fn configure(&mut self, config: &Properties) {
        self.traveller = Algorithm::from_tag(property(config, ALGORITHM, -1)).map(|algorithm| {
            let mut traveller = Traveller::new(algorithm);
            traveller.configure(config);
            traveller
        });
    }

    /// Runs the configured strategy and returns its trace.
    ///
    /// An Euler run on an imbalanced machine first eulerizes the graph,
    /// duplicating existing transitions until a circuit exists.
    pub fn cases<R: Rng>(&mut self, rng: &mut R) -> Result<String, Error> {
        let algorithm = match &self.traveller {
            None => return Ok(String::new()),
            Some(traveller) => traveller.algorithm(),
        };
        if algorithm == Algorithm::Euler && !self.graph.eulerian() {
            self.graph.eulerize(rng)?;
        }
        match &mut self.traveller {
            None => Ok(String::new()),
            Some(traveller) => traveller.travel(&self.graph, rng),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::travel::{END, START};
    use rand::prelude::*;
    use rand_pcg::Pcg64Mcg;

    fn euler_config() -> Properties {
        let mut config = Properties::default();
        config.insert(ALGORITHM.to_string(), Algorithm::Euler.tag());
        config
    }

    #[test]
    fn derive_links_single_bit_neighbors() {
        // Three of the four states over two attributes.
        let states = vec![
            BitSet::new_with_bits_set(2, []),
            BitSet::new_with_bits_set(2, [0]),
            BitSet::new_with_bits_set(2, [0, 1]),
        ];
        let g = derive_transition_graph(&states).unwrap();

        assert_eq!(g.number_of_nodes(), 3);
        assert_eq!(g.number_of_edge_types(), 4);
        // 00 <-> 10 flips attribute 0; 10 <-> 11 flips attribute 1.
        // 00 and 11 differ in two attributes and stay unlinked.
        assert_eq!(g.number_of_links(), 4);
        let typed: Vec<(Node, Node, EdgeType)> = g
            .links()
            .iter()
            .map(|link| (link.source, link.target, link.ty))
            .collect();
        assert!(typed.contains(&(0, 1, 0))); // set attribute 0
        assert!(typed.contains(&(1, 0, 2))); // clear attribute 0
        assert!(typed.contains(&(1, 2, 1))); // set attribute 1
        assert!(typed.contains(&(2, 1, 3))); // clear attribute 1
    }

    #[test]
    fn derive_mismatched_widths_is_an_error() {
        let states = vec![BitSet::new(2), BitSet::new(3)];
        assert_eq!(
            derive_transition_graph(&states),
            Err(Error::SizeMismatch(2, 3))
        );
    }

    #[test]
    fn euler_run_eulerizes_on_demand() {
        let mut g = Graph::new(2);
        g.link(0, 1, 0);
        g.link(1, 0, 1);
        g.link(0, 1, 0);
        let mut machine = StateMachine::new(g);
        machine.configure(&euler_config());

        let mut rng = Pcg64Mcg::seed_from_u64(9);
        let trace = machine.cases(&mut rng).unwrap();
        assert!(machine.graph().eulerian());
        assert_eq!(machine.graph().number_of_links(), 4);
        assert!(trace.starts_with("S0--"));
        assert!(trace.trim_end().ends_with("-->S0"));
        assert_eq!(trace.matches("-->").count(), 4);
    }

    #[test]
    fn euler_covers_a_loaded_matrix() {
        use crate::io::MatrixRead;

        // Two transitions per state, balanced out of the box.
        let g = Graph::try_read_matrix("1 2\n2 0\n0 1\n".as_bytes()).unwrap();
        let mut machine = StateMachine::new(g);
        machine.configure(&euler_config());

        let mut rng = Pcg64Mcg::seed_from_u64(1);
        let trace = machine.cases(&mut rng).unwrap();
        assert!(trace.starts_with("S0--"));
        assert!(trace.trim_end().ends_with("-->S0"));
        assert_eq!(trace.matches("-->").count(), 6);
    }

    #[test]
    fn unconfigured_machine_yields_nothing() {
        let mut machine = StateMachine::new(Graph::new(2));
        let mut rng = Pcg64Mcg::seed_from_u64(9);
        assert_eq!(machine.cases(&mut rng).unwrap(), "");
    }

    #[test]
    fn configure_switches_strategies() {
        let mut g = Graph::new(3);
        g.link(0, 1, 0);
        g.link(1, 2, 0);
        let mut machine = StateMachine::new(g);
        let mut rng = Pcg64Mcg::seed_from_u64(9);

        let mut config = Properties::default();
        config.insert(ALGORITHM.to_string(), Algorithm::BfsOne.tag());
        config.insert(START.to_string(), 0);
        config.insert(END.to_string(), 2);
        machine.configure(&config);
        assert_eq!(
            machine.cases(&mut rng).unwrap(),
            "S0--E0-->S1--E0-->S2\n"
        );

        config.insert(ALGORITHM.to_string(), Algorithm::DfsPath.tag());
        machine.configure(&config);
        assert_eq!(
            machine.cases(&mut rng).unwrap(),
            "S0--E0-->S1--E0-->S2\n"
        );
    }
}
