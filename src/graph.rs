/*!
The directed multigraph at the heart of the crate.

Vertices and links live in append-only arenas and are addressed by plain
indices, so links can be duplicated freely (multiple parallel links
between the same pair of vertices are expected, not an error). Parallel
links carry an *edge type* label that identifies which transition of the
underlying state machine they model.

Reachability is answered from a lazily computed all-pairs table that is
dropped whenever the graph gains a link.
*/

use std::cell::OnceCell;
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fmt;

use itertools::Itertools;
use rand::Rng;
use smallvec::SmallVec;
use tracing::debug;

use crate::bits::{BitMatrix, BitSet};
use crate::error::Error;
use crate::node::{EdgeType, LinkId, Node, NumEdgeTypes, NumLinks, NumNodes};
use crate::travel::shortest_path;

type AdjList = SmallVec<[LinkId; 4]>;

/// Per-vertex bookkeeping: degrees are maintained incrementally by
/// [`Graph::link`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Vertex {
    pub in_degree: NumLinks,
    pub out_degree: NumLinks,
}

impl Vertex {
    /// In-degree minus out-degree. Zero for vertices a closed trail can
    /// pass through.
    pub fn balance(&self) -> i64 {
        self.in_degree as i64 - self.out_degree as i64
    }
}

/// A directed link between two vertices, labelled with an edge type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Link {
    pub source: Node,
    pub target: Node,
    pub ty: EdgeType,
}

impl Link {
    pub fn is_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Vertices partitioned by balance sign.
///
/// *Arrows* (positive balance) have spare incoming capacity and need
/// more out-links; *forks* (negative balance) are the mirror case.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Classification {
    pub balanced: Vec<Node>,
    pub arrows: Vec<Node>,
    pub forks: Vec<Node>,
}

/// A directed multigraph with typed links.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graph {
    vertices: Vec<Vertex>,
    links: Vec<Link>,
    net: Vec<AdjList>,
    num_edge_types: NumEdgeTypes,
    reach: OnceCell<BitMatrix>,
}

impl Graph {
    /// Creates a graph with `n` isolated vertices and no edge types.
    pub fn new(n: NumNodes) -> Self {
        Self {
            vertices: vec![Vertex::default(); n as usize],
            links: Vec::new(),
            net: (0..n).map(|_| AdjList::new()).collect(),
            num_edge_types: 0,
            reach: OnceCell::new(),
        }
    }

    pub fn number_of_nodes(&self) -> NumNodes {
        self.vertices.len() as NumNodes
    }

    /// Number of vertices as a `usize`, for indexing.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn number_of_links(&self) -> NumLinks {
        self.links.len() as NumLinks
    }

    pub fn number_of_edge_types(&self) -> NumEdgeTypes {
        self.num_edge_types
    }

    /// Iterates over all vertex indices.
    pub fn vertices(&self) -> impl Iterator<Item = Node> + use<> {
        0..self.number_of_nodes()
    }

    /// Degree record of `v`. Panics if `v` is out of range.
    pub fn vertex(&self, v: Node) -> &Vertex {
        &self.vertices[v as usize]
    }

    /// The link with index `e`. Panics if `e` is out of range.
    pub fn link_at(&self, e: LinkId) -> &Link {
        &self.links[e as usize]
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Out-links of `v` in insertion order.
    pub fn links_of(&self, v: Node) -> &[LinkId] {
        &self.net[v as usize]
    }

    /// Ensures at least `n` edge types exist.
    ///
    /// [`Graph::link`] only registers a new type when it is the next
    /// unused index; input formats with unused type columns must
    /// pre-register the full range.
    pub fn register_edge_types(&mut self, n: NumEdgeTypes) {
        self.num_edge_types = self.num_edge_types.max(n);
    }

    /// Adds a link from `source` to `target` with edge type `ty`.
    ///
    /// Returns `None` without modifying the graph if an endpoint is out
    /// of range or `ty` skips past the next unregistered type. A `ty`
    /// equal to the current type count registers it on the fly.
    ///
    /// Invalidates the cached reachability table.
    pub fn link(&mut self, source: Node, target: Node, ty: EdgeType) -> Option<LinkId> {
        if source >= self.number_of_nodes() || target >= self.number_of_nodes() {
            return None;
        }
        match ty.cmp(&self.num_edge_types) {
            Ordering::Greater => return None,
            Ordering::Equal => self.num_edge_types += 1,
            Ordering::Less => {}
        }
        Some(self.push_link(source, target, ty))
    }

    fn push_link(&mut self, source: Node, target: Node, ty: EdgeType) -> LinkId {
        let id = self.links.len() as LinkId;
        self.links.push(Link { source, target, ty });
        self.net[source as usize].push(id);
        self.vertices[source as usize].out_degree += 1;
        self.vertices[target as usize].in_degree += 1;
        self.reach.take();
        id
    }

    /// `true` once the graph holds vertices, links, and edge types.
    /// Used as a sanity gate after loading.
    pub fn good(&self) -> bool {
        !self.vertices.is_empty() && !self.links.is_empty() && self.num_edge_types > 0
    }

    /// All-pairs reachability, computed on first use by one BFS per
    /// vertex. Every vertex reaches itself.
    pub fn reach_table(&self) -> &BitMatrix {
        self.reach.get_or_init(|| self.compute_reach())
    }

    /// `true` iff a (possibly empty) directed walk leads from `v` to `w`.
    /// Out-of-range vertices reach nothing.
    pub fn reachable(&self, v: Node, w: Node) -> bool {
        self.reach_table().get(v as usize, w as usize)
    }

    fn compute_reach(&self) -> BitMatrix {
        let n = self.len();
        let mut table = BitMatrix::new(n, n);
        let mut queue = VecDeque::new();
        for v in self.vertices() {
            table.set(v as usize, v as usize);
            let mut visited = BitSet::new(n);
            visited.set_bit(v as usize);
            queue.clear();
            queue.push_back(v);
            while let Some(u) = queue.pop_front() {
                for &e in self.links_of(u) {
                    let w = self.links[e as usize].target;
                    if !visited.set_bit(w as usize) {
                        table.set(v as usize, w as usize);
                        queue.push_back(w);
                    }
                }
            }
        }
        table
    }

    /// Partitions the vertices by balance sign.
    pub fn classify(&self) -> Classification {
        let mut classes = Classification::default();
        for v in self.vertices() {
            match self.vertices[v as usize].balance().cmp(&0) {
                Ordering::Equal => classes.balanced.push(v),
                Ordering::Greater => classes.arrows.push(v),
                Ordering::Less => classes.forks.push(v),
            }
        }
        classes
    }

    /// `true` iff every vertex is balanced. Connectivity is a separate
    /// concern and is caught by the circuit construction itself.
    pub fn eulerian(&self) -> bool {
        self.vertices.iter().all(|v| v.balance() == 0)
    }

    /// Balances the graph by duplicating existing links.
    ///
    /// Repeatedly finds shortest *bridges* (paths from an arrow to a
    /// fork) and clones the links along the shortest ones until both
    /// endpoints are balanced, which adds out-capacity at the arrow and
    /// in-capacity at the fork without inventing transitions the state
    /// machine does not have.
    ///
    /// Fails with [`Error::EulerizeDiverged`] if imbalance remains but
    /// no bridge connects an arrow to a fork (disconnected misuse), or
    /// if the bounded number of bridge rounds is exhausted.
    pub fn eulerize<R: Rng>(&mut self, rng: &mut R) -> Result<(), Error> {
        let surplus: i64 = self.vertices.iter().map(|v| v.balance().max(0)).sum();
        let max_rounds = surplus as usize + 1;

        for round in 0..=max_rounds {
            let classes = self.classify();
            if classes.arrows.is_empty() && classes.forks.is_empty() {
                return Ok(());
            }

            let mut bridges: Vec<Vec<LinkId>> = Vec::new();
            for &arrow in &classes.arrows {
                for &fork in &classes.forks {
                    if let Some(path) = shortest_path(self, arrow, fork, rng) {
                        bridges.push(path);
                    }
                }
            }
            if bridges.is_empty() {
                return Err(Error::EulerizeDiverged(round));
            }
            bridges.sort_by_key(|bridge| bridge.len());

            debug!(round, bridges = bridges.len(), "eulerize: cloning bridges");
            for bridge in &bridges {
                let head = self.links[bridge[0] as usize].source;
                let tail = self.links[bridge[bridge.len() - 1] as usize].target;
                while self.vertices[head as usize].balance() > 0
                    && self.vertices[tail as usize].balance() < 0
                {
                    self.clone_path(bridge);
                }
            }
        }
        Err(Error::EulerizeDiverged(max_rounds))
    }

    /// Appends a copy of every link along `path`.
    fn clone_path(&mut self, path: &[LinkId]) {
        for &e in path {
            let Link { source, target, ty } = self.links[e as usize];
            self.push_link(source, target, ty);
        }
    }
}

impl fmt::Display for Graph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "graph: {} vertices, {} links, {} edge types",
            self.number_of_nodes(),
            self.number_of_links(),
            self.num_edge_types
        )?;
        for v in self.vertices() {
            let vertex = self.vertex(v);
            writeln!(
                f,
                "S{v}: in {}, out {}, links [{}]",
                vertex.in_degree,
                vertex.out_degree,
                self.links_of(v).iter().map(|e| format!("L{e}")).join(", ")
            )?;
        }
        for (e, link) in self.links.iter().enumerate() {
            writeln!(f, "L{e}: S{}--E{}-->S{}", link.source, link.ty, link.target)?;
        }
        let classes = self.classify();
        writeln!(
            f,
            "balanced [{}], arrows [{}], forks [{}]",
            classes.balanced.iter().join(", "),
            classes.arrows.iter().join(", "),
            classes.forks.iter().join(", ")
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::prelude::*;
    use rand_pcg::Pcg64Mcg;

    /// Cycle 0 -> 1 -> 2 -> 0 with a second reversed cycle on top.
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

    #[test]
    fn link_maintains_degrees() {
        let mut rng = Pcg64Mcg::seed_from_u64(0xabc);
        let n = 12;
        let mut g = Graph::new(n);
        for _ in 0..200 {
            let u = rng.random_range(0..n);
            let v = rng.random_range(0..n);
            assert!(g.link(u, v, 0).is_some());
        }
        for v in g.vertices() {
            let out = g
                .links()
                .iter()
                .filter(|link| link.source == v)
                .count();
            let inc = g
                .links()
                .iter()
                .filter(|link| link.target == v)
                .count();
            assert_eq!(g.vertex(v).out_degree as usize, out);
            assert_eq!(g.vertex(v).in_degree as usize, inc);
            assert_eq!(g.links_of(v).len(), out);
        }
        assert_eq!(g.number_of_links(), 200);
    }

    #[test]
    fn link_rejects_invalid_input() {
        let mut g = Graph::new(2);
        assert_eq!(g.link(0, 2, 0), None);
        assert_eq!(g.link(2, 0, 0), None);
        // Type 1 would skip past the next unregistered type 0.
        assert_eq!(g.link(0, 1, 1), None);
        assert_eq!(g.number_of_links(), 0);
        assert!(!g.good());

        assert_eq!(g.link(0, 1, 0), Some(0));
        assert_eq!(g.link(1, 0, 1), Some(1));
        assert_eq!(g.number_of_edge_types(), 2);
        assert!(g.good());
    }

    #[test]
    fn register_edge_types_fills_gaps() {
        let mut g = Graph::new(2);
        g.register_edge_types(3);
        // Type 2 is now in range even though types 0 and 1 are unused.
        assert!(g.link(0, 1, 2).is_some());
        assert_eq!(g.number_of_edge_types(), 3);
    }

    #[test]
    fn reachability() {
        let mut g = Graph::new(4);
        g.link(0, 1, 0);
        g.link(1, 2, 0);

        assert!(g.reachable(0, 2));
        assert!(g.reachable(1, 2));
        assert!(!g.reachable(2, 0));
        assert!(!g.reachable(0, 3));
        // Reflexive even for isolated vertices.
        assert!(g.reachable(3, 3));
        // Out of range reaches nothing.
        assert!(!g.reachable(4, 0));
        assert!(!g.reachable(0, 4));
    }

    #[test]
    fn reachability_cache_invalidated_by_link() {
        let mut g = Graph::new(3);
        g.link(0, 1, 0);
        assert!(!g.reachable(1, 2));
        g.link(1, 2, 0);
        assert!(g.reachable(1, 2));
        assert!(g.reachable(0, 2));
    }

    #[test]
    fn classify_by_balance_sign() {
        let mut g = Graph::new(3);
        g.link(0, 1, 0);
        g.link(0, 1, 0);
        g.link(1, 0, 1);
        // S0: in 1, out 2 -> fork; S1: in 2, out 1 -> arrow; S2 balanced.
        let classes = g.classify();
        assert_eq!(classes.forks, vec![0]);
        assert_eq!(classes.arrows, vec![1]);
        assert_eq!(classes.balanced, vec![2]);
        assert!(!g.eulerian());
    }

    #[test]
    fn eulerian_graph_stays_untouched() {
        let mut g = two_cycles();
        assert!(g.eulerian());
        let links_before = g.number_of_links();
        let mut rng = Pcg64Mcg::seed_from_u64(7);
        g.eulerize(&mut rng).unwrap();
        assert_eq!(g.number_of_links(), links_before);
    }

    #[test]
    fn eulerize_duplicates_a_return_link() {
        // S0 <-> S1 plus one extra S0 -> S1.
        let mut g = Graph::new(2);
        g.link(0, 1, 0);
        g.link(1, 0, 1);
        g.link(0, 1, 0);
        assert!(!g.eulerian());

        let mut rng = Pcg64Mcg::seed_from_u64(7);
        g.eulerize(&mut rng).unwrap();
        assert!(g.eulerian());
        assert_eq!(g.number_of_links(), 4);
        // The only possible bridge is the S1 -> S0 link.
        let added = *g.link_at(3);
        assert_eq!((added.source, added.target, added.ty), (1, 0, 1));
    }

    #[test]
    fn eulerize_random_imbalance_converges() {
        let mut rng = Pcg64Mcg::seed_from_u64(0x5eed);
        for _ in 0..10 {
            let mut g = two_cycles();
            for _ in 0..rng.random_range(1..5) {
                let u = rng.random_range(0..3);
                let v = rng.random_range(0..3);
                g.link(u, v, 0);
            }
            g.eulerize(&mut rng).unwrap();
            assert!(g.eulerian());
        }
    }

    #[test]
    fn eulerize_reports_disconnected_imbalance() {
        // Fork and arrow live in different components.
        let mut g = Graph::new(4);
        g.link(0, 1, 0);
        g.link(3, 2, 0);
        let mut rng = Pcg64Mcg::seed_from_u64(7);
        assert!(matches!(
            g.eulerize(&mut rng),
            Err(Error::EulerizeDiverged(_))
        ));
    }

    #[test]
    fn display_dump() {
        let mut g = Graph::new(2);
        g.link(0, 1, 0);
        let dump = g.to_string();
        assert!(dump.contains("2 vertices, 1 links, 1 edge types"));
        assert!(dump.contains("L0: S0--E0-->S1"));
    }
}
