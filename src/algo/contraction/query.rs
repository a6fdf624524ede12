//! Bidirectional point to point queries over the contracted graph.
//!
//! Forward and reverse search run on the same static graph; the forward
//! search relaxes forward flagged edges, the reverse search backward flagged
//! ones. Since every surviving edge points from an earlier to a later
//! contracted node, both searches only ever climb the hierarchy and meet in
//! the middle. Shortcut edges are unpacked recursively through their via
//! nodes when the actual path is requested.

use super::*;

/// One settle step of a hierarchy search: take the next node from
/// `active_heap`, account a potential meeting with the opposite search,
/// prune once the best known weight cannot be beaten anymore, stall nodes
/// that a higher neighbor reaches cheaper, and relax the direction's edges.
pub(crate) fn routing_step(
    graph: &StaticGraph<ContractorEdgeData>,
    active_heap: &mut AddressableMinHeap<NodeId>,
    other_heap: &AddressableMinHeap<NodeId>,
    middle: &mut NodeId,
    upper_bound: &mut Weight,
    direction: Direction,
) {
    let Some(node) = active_heap.pop() else { return };
    let weight = active_heap.key(node);

    if other_heap.was_inserted(node) {
        let new_weight = other_heap.key(node) + weight;
        if new_weight < *upper_bound {
            *middle = node;
            *upper_bound = new_weight;
        }
    }

    if weight > *upper_bound {
        active_heap.delete_all();
        return;
    }

    // stall on demand: if a node we already saw reaches this one over an
    // edge of the opposite direction with less weight, the shortest path
    // through here comes from the other search and relaxing is wasted work
    for (to, data) in graph.link_iter(node) {
        if direction.reverse().allows(data) && active_heap.was_inserted(to) && active_heap.key(to) + data.weight < weight {
            return;
        }
    }

    for (to, data) in graph.link_iter(node) {
        if !direction.allows(data) {
            continue;
        }
        let to_weight = weight + data.weight;
        if !active_heap.was_inserted(to) {
            active_heap.push(to, to_weight, node);
        } else if to_weight < active_heap.key(to) {
            *active_heap.data_mut(to) = node;
            active_heap.decrease_key(to, to_weight);
        }
    }
}

/// The packed path from the origin of `heap`'s search to `node`, in travel
/// order of that search.
pub(crate) fn packed_path_from_heap(heap: &AddressableMinHeap<NodeId>, node: NodeId) -> Vec<NodeId> {
    let mut path = vec![node];
    let mut current = node;
    while *heap.data(current) != current {
        current = *heap.data(current);
        path.push(current);
    }
    path.reverse();
    path
}

/// The packed path of a bidirectional search that met at `meeting_node`,
/// from the forward origin over the meeting node to the reverse origin.
pub(crate) fn packed_path_via_meeting(
    forward_heap: &AddressableMinHeap<NodeId>,
    reverse_heap: &AddressableMinHeap<NodeId>,
    meeting_node: NodeId,
) -> Vec<NodeId> {
    let mut path = packed_path_from_heap(forward_heap, meeting_node);
    let mut current = meeting_node;
    while *reverse_heap.data(current) != current {
        current = *reverse_heap.data(current);
        path.push(current);
    }
    path
}

/// Append the unpacked expansion of the edge `(from, to)` to `out`,
/// excluding `from` itself. Shortcuts are replaced by their two halves
/// recursively.
pub(crate) fn append_unpacked_edge(graph: &StaticGraph<ContractorEdgeData>, from: NodeId, to: NodeId, out: &mut Vec<NodeId>) {
    let edge = graph
        .find_edge_in_either_direction(from, to)
        .expect("packed path contains a pair without an edge");
    let data = *graph.edge_data(edge);
    if data.shortcut {
        append_unpacked_edge(graph, from, data.via, out);
        append_unpacked_edge(graph, data.via, to, out);
    } else {
        out.push(to);
    }
}

/// Expand a packed node sequence into the full path over original edges.
pub(crate) fn unpack_packed_path(graph: &StaticGraph<ContractorEdgeData>, packed: &[NodeId]) -> Vec<NodeId> {
    let mut path = vec![packed[0]];
    for pair in packed.windows(2) {
        append_unpacked_edge(graph, pair[0], pair[1], &mut path);
    }
    path
}

/// A contraction hierarchy query server. Owns a pair of heaps which are
/// reused across queries.
pub struct Server {
    graph: StaticGraph<ContractorEdgeData>,
    forward_heap: AddressableMinHeap<NodeId>,
    reverse_heap: AddressableMinHeap<NodeId>,
    settled_node_cap: Option<usize>,
    meeting_node: NodeId,
    best_weight: Weight,
}

impl Server {
    /// Build the server from the contractor output. `num_nodes` is the node
    /// count of the edge based graph the hierarchy was built over.
    pub fn new(num_nodes: usize, edges: Vec<ContractedEdge>) -> Server {
        Self::from_graph(StaticGraph::from_edges(num_nodes, edges))
    }

    pub fn from_graph(graph: StaticGraph<ContractorEdgeData>) -> Server {
        let num_nodes = graph.num_nodes();
        Server {
            graph,
            forward_heap: AddressableMinHeap::new(num_nodes),
            reverse_heap: AddressableMinHeap::new(num_nodes),
            settled_node_cap: None,
            meeting_node: INVALID_NODE,
            best_weight: INFINITY,
        }
    }

    /// Abort queries after this many settled nodes with `Error::Cancelled`.
    pub fn with_settled_node_cap(mut self, cap: usize) -> Server {
        self.settled_node_cap = Some(cap);
        self
    }

    pub fn graph(&self) -> &StaticGraph<ContractorEdgeData> {
        &self.graph
    }

    /// The shortest path weight, or `None` if the endpoints are not
    /// connected. `Err(Cancelled)` when the settled node cap was exhausted.
    pub fn distance(&mut self, from: NodeId, to: NodeId) -> Result<Option<Weight>> {
        self.best_weight = INFINITY;
        self.meeting_node = INVALID_NODE;
        self.forward_heap.clear();
        self.reverse_heap.clear();
        self.forward_heap.push(from, 0, from);
        self.reverse_heap.push(to, 0, to);

        let mut settled = 0usize;
        while self.forward_heap.len() + self.reverse_heap.len() > 0 {
            if let Some(cap) = self.settled_node_cap {
                if settled > cap {
                    return Err(Error::Cancelled);
                }
            }
            if !self.forward_heap.is_empty() {
                routing_step(
                    &self.graph,
                    &mut self.forward_heap,
                    &self.reverse_heap,
                    &mut self.meeting_node,
                    &mut self.best_weight,
                    Direction::Forward,
                );
                settled += 1;
            }
            if !self.reverse_heap.is_empty() {
                routing_step(
                    &self.graph,
                    &mut self.reverse_heap,
                    &self.forward_heap,
                    &mut self.meeting_node,
                    &mut self.best_weight,
                    Direction::Backward,
                );
                settled += 1;
            }
        }

        if self.best_weight == INFINITY {
            Ok(None)
        } else {
            Ok(Some(self.best_weight))
        }
    }

    /// The fully unpacked node path of the last successful query.
    pub fn path(&self) -> Vec<NodeId> {
        assert!(self.meeting_node != INVALID_NODE, "no path to unpack");
        let packed = packed_path_via_meeting(&self.forward_heap, &self.reverse_heap, self.meeting_node);
        unpack_packed_path(&self.graph, &packed)
    }

    /// The packed (shortcut level) node path of the last successful query.
    pub fn packed_path(&self) -> Vec<NodeId> {
        assert!(self.meeting_node != INVALID_NODE, "no path to unpack");
        packed_path_via_meeting(&self.forward_heap, &self.reverse_heap, self.meeting_node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::edge_based_graph::{EdgeBasedEdge, TurnInstruction};

    fn bidirectional(source: NodeId, target: NodeId, weight: Weight) -> EdgeBasedEdge {
        EdgeBasedEdge {
            source,
            target,
            via: 0,
            name_id: 0,
            weight,
            forward: true,
            backward: true,
            turn_instruction: TurnInstruction::NoTurn,
        }
    }

    fn server(num_nodes: usize, edges: &[EdgeBasedEdge]) -> Server {
        let mut contractor = Contractor::new(num_nodes, edges).unwrap();
        contractor.run().unwrap();
        Server::new(num_nodes, contractor.take_edges().unwrap())
    }

    #[test]
    fn triangle_query_uses_the_shorter_way() {
        let mut server = server(3, &[bidirectional(0, 1, 3), bidirectional(1, 2, 4), bidirectional(0, 2, 10)]);
        assert_eq!(server.distance(0, 2).unwrap(), Some(7));
        assert_eq!(server.path(), vec![0, 1, 2]);
        assert_eq!(server.distance(2, 0).unwrap(), Some(7));
        assert_eq!(server.distance(0, 0).unwrap(), Some(0));
    }

    #[test]
    fn disconnected_nodes_have_no_path() {
        let mut server = server(4, &[bidirectional(0, 1, 3), bidirectional(2, 3, 4)]);
        assert_eq!(server.distance(0, 3).unwrap(), None);
    }

    #[test]
    fn one_way_edges_are_respected() {
        let mut one_way = bidirectional(0, 1, 5);
        one_way.backward = false;
        let mut server = server(2, &[one_way]);
        assert_eq!(server.distance(0, 1).unwrap(), Some(5));
        assert_eq!(server.distance(1, 0).unwrap(), None);
    }

    #[test]
    fn settled_node_cap_cancels() {
        let edges: Vec<_> = (0..99).map(|i| bidirectional(i, i + 1, 1)).collect();
        let mut contractor = Contractor::new(100, &edges).unwrap();
        contractor.run().unwrap();
        let mut server = Server::new(100, contractor.take_edges().unwrap()).with_settled_node_cap(1);
        assert!(matches!(server.distance(0, 99), Err(Error::Cancelled)));
    }

    #[test]
    fn shortcuts_unpack_to_original_nodes() {
        // a path graph contracts its interior away, queries must still
        // report every intermediate node
        let edges: Vec<_> = (0..9).map(|i| bidirectional(i, i + 1, 2)).collect();
        let mut server = server(10, &edges);
        assert_eq!(server.distance(0, 9).unwrap(), Some(18));
        assert_eq!(server.path(), (0..10).collect::<Vec<_>>());
    }
}
