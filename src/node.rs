/*!
Index types used across the crate.

Vertices, links, and edge types are all plain `u32` indices into the
arenas held by [`crate::graph::Graph`]. Aliases exist purely to make
signatures self-documenting.
*/

/// A vertex of the graph.
pub type Node = u32;

/// Number of vertices in a graph.
pub type NumNodes = Node;

/// A link (directed edge instance) of the graph.
///
/// Links are identified by their insertion order.
pub type LinkId = u32;

/// Number of links in a graph.
pub type NumLinks = LinkId;

/// Label shared by parallel links that model the same transition.
pub type EdgeType = u32;

/// Number of distinct edge types registered in a graph.
pub type NumEdgeTypes = EdgeType;
