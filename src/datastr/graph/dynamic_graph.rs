//! Mutable graph representation for the preprocessing phases.
//!
//! Edges of a node live in one contiguous range of the edge array. Ranges
//! may be over-allocated to amortise insertions; the logical end is tracked
//! per node and freed slots are marked with an invalid target so neighboring
//! ranges can grow into them. Iteration order within a node is insertion
//! order.

use super::*;

/// One adjacency slot. A `target` of `INVALID_NODE` marks a hole between
/// adjacency ranges.
#[derive(Debug, Clone, Copy)]
pub struct EdgeEntry<E> {
    pub target: NodeId,
    pub data: E,
}

#[derive(Debug, Clone, Copy, Default)]
struct NodeEntry {
    first_edge: EdgeId,
    num_edges: u32,
}

#[derive(Debug, Clone)]
pub struct DynamicGraph<E> {
    nodes: Vec<NodeEntry>,
    edges: Vec<EdgeEntry<E>>,
    num_edges: usize,
}

impl<E: Copy + Default> DynamicGraph<E> {
    /// An edgeless graph over `num_nodes` nodes.
    pub fn new(num_nodes: usize) -> DynamicGraph<E> {
        DynamicGraph {
            nodes: vec![NodeEntry::default(); num_nodes],
            edges: Vec::new(),
            num_edges: 0,
        }
    }

    /// Build from an edge list sorted lexicographically by `(source, target)`.
    /// Out of range endpoints are programming errors and panic.
    pub fn from_sorted_edges(num_nodes: usize, sorted_edges: &[InputEdge<E>]) -> DynamicGraph<E> {
        let mut nodes = vec![NodeEntry::default(); num_nodes];
        let mut edges = Vec::with_capacity(sorted_edges.len());

        for window in sorted_edges.windows(2) {
            debug_assert!(window[0].cmp_key() <= window[1].cmp_key(), "edge list not sorted");
        }

        for edge in sorted_edges {
            assert!((edge.source as usize) < num_nodes, "edge source {} out of range", edge.source);
            assert!((edge.target as usize) < num_nodes, "edge target {} out of range", edge.target);
            nodes[edge.source as usize].num_edges += 1;
            edges.push(EdgeEntry {
                target: edge.target,
                data: edge.data,
            });
        }

        let mut first_edge = 0;
        for node in &mut nodes {
            node.first_edge = first_edge;
            first_edge += node.num_edges;
        }

        DynamicGraph {
            nodes,
            edges,
            num_edges: sorted_edges.len(),
        }
    }

    /// The range of edge ids currently making up the outgoing edges of `node`.
    pub fn neighbor_edge_indices(&self, node: NodeId) -> Range<EdgeId> {
        let node = &self.nodes[node as usize];
        node.first_edge..node.first_edge + node.num_edges
    }

    pub fn target(&self, edge: EdgeId) -> NodeId {
        self.edges[edge as usize].target
    }

    pub fn edge_data(&self, edge: EdgeId) -> &E {
        &self.edges[edge as usize].data
    }

    pub fn edge_data_mut(&mut self, edge: EdgeId) -> &mut E {
        &mut self.edges[edge as usize].data
    }

    /// Insert an edge at the logical end of the source node's range. If the
    /// slot after the range is taken the range first grows into a free slot
    /// on its left, and failing that relocates to fresh, over-allocated
    /// space at the end of the edge array.
    pub fn insert_edge(&mut self, from: NodeId, to: NodeId, data: E) {
        let node = self.nodes[from as usize];
        let range_end = (node.first_edge + node.num_edges) as usize;

        if range_end >= self.edges.len() || self.edges[range_end].target != INVALID_NODE {
            if node.first_edge != 0 && self.edges[node.first_edge as usize - 1].target == INVALID_NODE {
                // grow to the left, moving the last edge into the freed slot
                let node = &mut self.nodes[from as usize];
                node.first_edge -= 1;
                let first = node.first_edge as usize;
                let count = node.num_edges as usize;
                self.edges[first] = self.edges[first + count];
            } else {
                // relocate the whole range to the end with ten percent slack
                let new_first = self.edges.len();
                let new_size = node.num_edges as usize + node.num_edges as usize / 10 + 2;
                self.edges.resize(
                    new_first + new_size,
                    EdgeEntry {
                        target: INVALID_NODE,
                        data: E::default(),
                    },
                );
                for i in 0..node.num_edges as usize {
                    self.edges[new_first + i] = self.edges[node.first_edge as usize + i];
                    self.edges[node.first_edge as usize + i].target = INVALID_NODE;
                }
                self.nodes[from as usize].first_edge = new_first as EdgeId;
            }
        }

        let node = &mut self.nodes[from as usize];
        let slot = (node.first_edge + node.num_edges) as usize;
        self.edges[slot] = EdgeEntry { target: to, data };
        node.num_edges += 1;
        self.num_edges += 1;
    }

    /// Remove all edges from `from` to `to`. Returns how many were removed.
    /// The freed slots stay with the range as growth room.
    pub fn delete_edges_to(&mut self, from: NodeId, to: NodeId) -> usize {
        let range = self.neighbor_edge_indices(from);
        let mut end = range.end as usize;
        let mut i = range.start as usize;
        while i < end {
            if self.edges[i].target == to {
                end -= 1;
                self.edges[i] = self.edges[end];
                self.edges[end].target = INVALID_NODE;
            } else {
                i += 1;
            }
        }

        let deleted = range.end as usize - end;
        self.nodes[from as usize].num_edges -= deleted as u32;
        self.num_edges -= deleted;
        deleted
    }

    /// Find the first edge from `from` to `to` in insertion order.
    pub fn find_edge(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        self.neighbor_edge_indices(from).find(|&edge| self.target(edge) == to)
    }
}

impl<E: Copy + Default> Graph for DynamicGraph<E> {
    fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    fn num_arcs(&self) -> usize {
        self.num_edges
    }

    fn degree(&self, node: NodeId) -> usize {
        self.nodes[node as usize].num_edges as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(source: NodeId, target: NodeId, weight: Weight) -> InputEdge<Weight> {
        InputEdge { source, target, data: weight }
    }

    #[test]
    fn build_and_iterate() {
        let graph = DynamicGraph::from_sorted_edges(3, &[edge(0, 1, 10), edge(0, 2, 20), edge(2, 1, 30)]);
        assert_eq!(graph.num_nodes(), 3);
        assert_eq!(graph.num_arcs(), 3);
        assert_eq!(graph.degree(0), 2);
        assert_eq!(graph.degree(1), 0);

        let targets: Vec<_> = graph.neighbor_edge_indices(0).map(|e| graph.target(e)).collect();
        assert_eq!(targets, vec![1, 2]);
    }

    #[test]
    fn insertions_keep_insertion_order_and_relocate() {
        let mut graph = DynamicGraph::from_sorted_edges(4, &[edge(0, 1, 1), edge(1, 0, 1), edge(1, 2, 1)]);
        // node 0 has no slack, forcing a relocation
        graph.insert_edge(0, 2, 2);
        graph.insert_edge(0, 3, 3);

        let links: Vec<_> = graph
            .neighbor_edge_indices(0)
            .map(|e| (graph.target(e), *graph.edge_data(e)))
            .collect();
        assert_eq!(links, vec![(1, 1), (2, 2), (3, 3)]);
        // node 1 is untouched by the relocation
        let targets: Vec<_> = graph.neighbor_edge_indices(1).map(|e| graph.target(e)).collect();
        assert_eq!(targets, vec![0, 2]);
        assert_eq!(graph.num_arcs(), 5);
    }

    #[test]
    fn delete_edges_to_removes_all_parallel_edges() {
        let mut graph = DynamicGraph::from_sorted_edges(3, &[edge(0, 1, 1), edge(0, 1, 2), edge(0, 2, 3)]);
        assert_eq!(graph.delete_edges_to(0, 1), 2);
        assert_eq!(graph.degree(0), 1);
        assert_eq!(graph.find_edge(0, 1), None);
        assert!(graph.find_edge(0, 2).is_some());
        // the freed slots are reusable
        graph.insert_edge(0, 1, 7);
        assert_eq!(graph.degree(0), 2);
        assert_eq!(*graph.edge_data(graph.find_edge(0, 1).unwrap()), 7);
    }

    #[test]
    fn deleted_slots_absorb_growth_of_the_left_neighbor() {
        let mut graph = DynamicGraph::from_sorted_edges(4, &[edge(0, 1, 1), edge(1, 2, 2), edge(2, 3, 3)]);
        graph.delete_edges_to(1, 2);
        // node 2's range can now grow to the left without relocating
        graph.insert_edge(2, 0, 4);
        let links: Vec<_> = graph
            .neighbor_edge_indices(2)
            .map(|e| (graph.target(e), *graph.edge_data(e)))
            .collect();
        assert_eq!(links.len(), 2);
        assert!(links.contains(&(3, 3)));
        assert!(links.contains(&(0, 4)));
    }
}
