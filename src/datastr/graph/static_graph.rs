//! Frozen adjacency array graph for the query algorithms.
//!
//! Nodes and edges are identified by ids from `0` to `n-1` and `m-1`. The
//! graph is stored as the usual three collections: `first_out` with `n+1`
//! entries, `head` and `edge_data` with `m` entries each.
//! `head[first_out[x]..first_out[x+1]]` are the neighbors of `x`.

use super::*;

#[derive(Debug, Clone)]
pub struct StaticGraph<E> {
    first_out: Vec<EdgeId>,
    head: Vec<NodeId>,
    edge_data: Vec<E>,
}

impl<E: DirectedEdge> StaticGraph<E> {
    /// Build the adjacency array from an edge list. The list is sorted
    /// lexicographically by `(source, target)` first; ties keep their order.
    pub fn from_edges(num_nodes: usize, mut edges: Vec<InputEdge<E>>) -> StaticGraph<E> {
        edges.sort_by_key(InputEdge::cmp_key);

        let mut first_out = Vec::with_capacity(num_nodes + 1);
        first_out.push(0);
        let mut head = Vec::with_capacity(edges.len());
        let mut edge_data = Vec::with_capacity(edges.len());

        let mut edge_iter = edges.into_iter().peekable();
        for node in 0..num_nodes as NodeId {
            while let Some(edge) = edge_iter.peek() {
                if edge.source != node {
                    assert!(edge.source > node, "edge source {} out of range", edge.source);
                    break;
                }
                let edge = edge_iter.next().unwrap();
                assert!((edge.target as usize) < num_nodes, "edge target {} out of range", edge.target);
                head.push(edge.target);
                edge_data.push(edge.data);
            }
            first_out.push(head.len() as EdgeId);
        }
        assert!(edge_iter.peek().is_none(), "edge source out of range");

        StaticGraph { first_out, head, edge_data }
    }

    pub fn neighbor_edge_indices(&self, node: NodeId) -> Range<EdgeId> {
        self.first_out[node as usize]..self.first_out[node as usize + 1]
    }

    pub fn target(&self, edge: EdgeId) -> NodeId {
        self.head[edge as usize]
    }

    pub fn edge_data(&self, edge: EdgeId) -> &E {
        &self.edge_data[edge as usize]
    }

    /// Iterate over `(target, data)` of the outgoing edges of `node`.
    pub fn link_iter(&self, node: NodeId) -> impl Iterator<Item = (NodeId, &E)> {
        let range = edge_range(&self.first_out, node);
        self.head[range.clone()].iter().copied().zip(self.edge_data[range].iter())
    }

    /// Find the minimum weight edge from `from` to `to`. Ties are broken by
    /// the first occurrence.
    pub fn find_edge(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        let mut smallest_edge = None;
        let mut smallest_weight = INFINITY;
        for edge in self.neighbor_edge_indices(from) {
            if self.target(edge) == to && self.edge_data(edge).weight() < smallest_weight {
                smallest_edge = Some(edge);
                smallest_weight = self.edge_data(edge).weight();
            }
        }
        smallest_edge
    }

    /// Try `(from, to)`, then `(to, from)`.
    pub fn find_edge_in_either_direction(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.find_edge(from, to).or_else(|| self.find_edge(to, from))
    }
}

impl<E: DirectedEdge> Graph for StaticGraph<E> {
    fn num_nodes(&self) -> usize {
        self.first_out.len() - 1
    }

    fn num_arcs(&self) -> usize {
        self.head.len()
    }

    fn degree(&self, node: NodeId) -> usize {
        self.neighbor_edge_indices(node).len()
    }
}
