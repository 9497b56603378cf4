/*!
`casegen` generates test-case sequences for state machines.

A machine is modelled as a directed multigraph: vertices are states,
links are transitions labelled with an edge type. Traversal strategies
(see [`travel`]) turn the graph into traces of the form
`S0--E1-->S2--E0-->S3`, one test case per line, ranging from a single
shortest path up to an Euler circuit exercising every transition
exactly once.

```
use casegen::prelude::*;
use rand::SeedableRng;

let mut g = Graph::new(3);
g.link(0, 1, 0);
g.link(1, 2, 0);
g.link(2, 0, 0);

let mut machine = StateMachine::new(g);
let mut config = Properties::default();
config.insert(ALGORITHM.to_string(), Algorithm::Euler.tag());
machine.configure(&config);

let mut rng = rand::rngs::StdRng::seed_from_u64(0);
let trace = machine.cases(&mut rng).unwrap();
assert_eq!(trace, "S0--E0-->S1--E0-->S2--E0-->S0\n");
```

Graphs can be loaded from transition-matrix or state-list text files
(see [`io`]), and imbalanced machines are *eulerized* on demand by
duplicating existing transitions until an Euler circuit exists.
*/

pub mod bits;
pub mod error;
pub mod graph;
pub mod io;
pub mod machine;
pub mod node;
pub mod travel;

pub mod prelude {
    pub use crate::bits::{BitMatrix, BitSet};
    pub use crate::error::Error;
    pub use crate::graph::{Classification, Graph, Link, Vertex};
    pub use crate::io::{MatrixRead, MatrixReader, StateListRead, StateListReader};
    pub use crate::machine::{StateMachine, derive_transition_graph};
    pub use crate::node::*;
    pub use crate::travel::{
        ALGORITHM, Algorithm, BfsAll, BfsOne, Dfs, DfsPath, END, Euler, MAX_CASES, MAX_DEPTH,
        Properties, RANDOM_WALK, START, Traveller, shortest_path,
    };
}
