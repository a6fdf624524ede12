//! Alternative routes via the via node method.
//!
//! A recording bidirectional search collects every node both directions
//! touched. Each such node is a candidate to route through. Candidates that
//! are too long, share too much with the shortest path or stretch the
//! detour part too far are filtered out, first with cheap approximations
//! from the search trees, then exactly by partially unpacking shortcuts.
//! The best survivor has to prove local optimality of its plateau in a
//! final T test before it is returned.

use super::*;
use crate::algo::contraction::query::{packed_path_from_heap, packed_path_via_meeting, routing_step, unpack_packed_path};
use crate::algo::contraction::{ContractedEdge, ContractorEdgeData};
use crate::datastr::index_heap::AddressableMinHeap;
use std::collections::{HashMap, HashSet};

/// Admissible stretch of the detour part of an alternative.
pub const VIAPATH_ALPHA: f64 = 0.10;
/// An alternative may be at most this factor longer than the optimum.
pub const VIAPATH_EPSILON: f64 = 0.15;
/// An alternative shares at most this fraction with the shortest path.
pub const VIAPATH_GAMMA: f64 = 0.75;

/// An accepted alternative route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViaPath {
    pub via: NodeId,
    pub weight: Weight,
    pub path: Vec<NodeId>,
}

/// Result of an alternative route query: the shortest path and at most one
/// sufficiently different alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlternativeQueryResult {
    pub shortest_weight: Weight,
    pub shortest_path: Vec<NodeId>,
    pub alternative: Option<ViaPath>,
}

struct RankedCandidate {
    node: NodeId,
    length: Weight,
    sharing: Weight,
}

impl RankedCandidate {
    fn rank(&self) -> u64 {
        2 * u64::from(self.length) + u64::from(self.sharing)
    }
}

/// Alternative route server over a contracted graph. Three heap pairs: the
/// recording search, the via path half searches and the T test query.
pub struct Server {
    graph: StaticGraph<ContractorEdgeData>,
    forward_heap1: AddressableMinHeap<NodeId>,
    reverse_heap1: AddressableMinHeap<NodeId>,
    forward_heap2: AddressableMinHeap<NodeId>,
    reverse_heap2: AddressableMinHeap<NodeId>,
    forward_heap3: AddressableMinHeap<NodeId>,
    reverse_heap3: AddressableMinHeap<NodeId>,
}

impl Server {
    pub fn new(num_nodes: usize, edges: Vec<ContractedEdge>) -> Server {
        Self::from_graph(StaticGraph::from_edges(num_nodes, edges))
    }

    pub fn from_graph(graph: StaticGraph<ContractorEdgeData>) -> Server {
        let n = graph.num_nodes();
        Server {
            graph,
            forward_heap1: AddressableMinHeap::new(n),
            reverse_heap1: AddressableMinHeap::new(n),
            forward_heap2: AddressableMinHeap::new(n),
            reverse_heap2: AddressableMinHeap::new(n),
            forward_heap3: AddressableMinHeap::new(n),
            reverse_heap3: AddressableMinHeap::new(n),
        }
    }

    /// Compute the shortest path and, if one exists, an admissible
    /// alternative. `None` if the endpoints are not connected at all.
    pub fn alternatives(&mut self, from: NodeId, to: NodeId) -> Option<AlternativeQueryResult> {
        self.forward_heap1.clear();
        self.reverse_heap1.clear();
        self.forward_heap1.push(from, 0, from);
        self.reverse_heap1.push(to, 0, to);

        let mut upper_bound = INFINITY;
        let mut middle = INVALID_NODE;
        let mut via_candidates = Vec::new();
        let mut forward_search_space: Vec<(NodeId, NodeId)> = Vec::new();
        let mut reverse_search_space: Vec<(NodeId, NodeId)> = Vec::new();

        // search from both sides until new_min / (1 + epsilon) passes the
        // optimum, recording the search spaces
        while self.forward_heap1.len() + self.reverse_heap1.len() > 0 {
            if !self.forward_heap1.is_empty() {
                alternative_routing_step(
                    &self.graph,
                    &mut self.forward_heap1,
                    &self.reverse_heap1,
                    &mut middle,
                    &mut upper_bound,
                    &mut via_candidates,
                    &mut forward_search_space,
                    Direction::Forward,
                );
            }
            if !self.reverse_heap1.is_empty() {
                alternative_routing_step(
                    &self.graph,
                    &mut self.reverse_heap1,
                    &self.forward_heap1,
                    &mut middle,
                    &mut upper_bound,
                    &mut via_candidates,
                    &mut reverse_search_space,
                    Direction::Backward,
                );
            }
        }

        if upper_bound == INFINITY {
            return None;
        }

        via_candidates.sort_unstable();
        via_candidates.dedup();

        let packed_forward = packed_path_from_heap(&self.forward_heap1, middle);
        let packed_reverse = packed_path_from_heap(&self.reverse_heap1, middle);

        let mut nodes_in_path: HashSet<NodeId> = packed_forward.iter().copied().collect();
        nodes_in_path.insert(middle);
        nodes_in_path.extend(packed_reverse.iter().copied());

        // approximate sharing: on path nodes share their whole key, off
        // path nodes inherit whatever their search tree parent shares
        let mut approximated_forward_sharing: HashMap<NodeId, Weight> = HashMap::new();
        for &(u, v) in &forward_search_space {
            if nodes_in_path.contains(&v) {
                approximated_forward_sharing.entry(v).or_insert_with(|| self.forward_heap1.key(v));
            } else if let Some(&sharing_of_u) = approximated_forward_sharing.get(&u) {
                approximated_forward_sharing.entry(v).or_insert(sharing_of_u);
            }
        }
        let mut approximated_reverse_sharing: HashMap<NodeId, Weight> = HashMap::new();
        for &(u, v) in &reverse_search_space {
            if nodes_in_path.contains(&v) {
                approximated_reverse_sharing.entry(v).or_insert_with(|| self.reverse_heap1.key(v));
            } else if let Some(&sharing_of_u) = approximated_reverse_sharing.get(&u) {
                approximated_reverse_sharing.entry(v).or_insert(sharing_of_u);
            }
        }

        let mut preselected = Vec::new();
        for &node in &via_candidates {
            if node == middle {
                continue;
            }
            let forward_sharing = approximated_forward_sharing.get(&node).copied().unwrap_or(0);
            let reverse_sharing = approximated_reverse_sharing.get(&node).copied().unwrap_or(0);
            let sharing = f64::from(forward_sharing + reverse_sharing);
            let length = f64::from(self.forward_heap1.key(node) + self.reverse_heap1.key(node));
            let optimum = f64::from(upper_bound);

            let length_passes = length < optimum * (1. + VIAPATH_EPSILON);
            let sharing_passes = sharing <= optimum * VIAPATH_GAMMA;
            let stretch_passes = length - sharing < (1. + VIAPATH_ALPHA) * (optimum - sharing);
            if length_passes && sharing_passes && stretch_passes {
                preselected.push(node);
            }
        }

        // from -> middle -> to in travel order
        let mut packed_shortest_path = packed_forward;
        packed_shortest_path.extend(packed_reverse.iter().rev().skip(1));

        let maximum_allowed_sharing = (f64::from(upper_bound) * VIAPATH_GAMMA) as Weight;
        let mut ranked_candidates = Vec::new();
        for &node in &preselected {
            let (length, sharing) = self.compute_length_and_sharing(node, &packed_shortest_path);
            if sharing <= maximum_allowed_sharing && f64::from(length) <= f64::from(upper_bound) * (1. + VIAPATH_EPSILON) {
                ranked_candidates.push(RankedCandidate { node, length, sharing });
            }
        }
        ranked_candidates.sort_by_key(RankedCandidate::rank);

        let mut selected_via = INVALID_NODE;
        let mut length_of_via_path = INFINITY;
        let mut s_v_middle = INVALID_NODE;
        let mut v_t_middle = INVALID_NODE;
        for candidate in &ranked_candidates {
            if self.passes_t_test(candidate.node, upper_bound, &mut length_of_via_path, &mut s_v_middle, &mut v_t_middle) {
                // take the first admissible candidate
                selected_via = candidate.node;
                break;
            }
        }

        let shortest_path = unpack_packed_path(&self.graph, &packed_shortest_path);
        let alternative = (selected_via != INVALID_NODE).then(|| {
            let mut packed = packed_path_via_meeting(&self.forward_heap1, &self.reverse_heap2, s_v_middle);
            // the via node ends the first half and starts the second
            packed.pop();
            packed.extend(packed_path_via_meeting(&self.forward_heap2, &self.reverse_heap1, v_t_middle));
            ViaPath {
                via: selected_via,
                weight: length_of_via_path,
                path: unpack_packed_path(&self.graph, &packed),
            }
        });

        Some(AlternativeQueryResult {
            shortest_weight: upper_bound,
            shortest_path,
            alternative,
        })
    }

    /// Exact via path length plus the exact weight shared with the shortest
    /// path, determined by partially unpacking both from the ends until
    /// they deviate.
    fn compute_length_and_sharing(&mut self, via_node: NodeId, packed_shortest_path: &[NodeId]) -> (Weight, Weight) {
        self.forward_heap2.clear();
        self.reverse_heap2.clear();

        // complete <from, .., via> by reusing the forward search tree
        let mut s_v_middle = INVALID_NODE;
        let mut upper_bound_s_v = INFINITY;
        self.reverse_heap2.push(via_node, 0, via_node);
        while !self.reverse_heap2.is_empty() {
            routing_step(
                &self.graph,
                &mut self.reverse_heap2,
                &self.forward_heap1,
                &mut s_v_middle,
                &mut upper_bound_s_v,
                Direction::Backward,
            );
        }
        // complete <via, .., to> by reusing the reverse search tree
        let mut v_t_middle = INVALID_NODE;
        let mut upper_bound_v_t = INFINITY;
        self.forward_heap2.push(via_node, 0, via_node);
        while !self.forward_heap2.is_empty() {
            routing_step(
                &self.graph,
                &mut self.forward_heap2,
                &self.reverse_heap1,
                &mut v_t_middle,
                &mut upper_bound_v_t,
                Direction::Forward,
            );
        }

        let length = upper_bound_s_v.saturating_add(upper_bound_v_t);
        if s_v_middle == INVALID_NODE || v_t_middle == INVALID_NODE {
            return (length, 0);
        }

        let packed_s_v_path = packed_path_via_meeting(&self.forward_heap1, &self.reverse_heap2, s_v_middle);
        let packed_v_t_path = packed_path_via_meeting(&self.forward_heap2, &self.reverse_heap1, v_t_middle);

        let mut sharing = 0;
        let mut partially_unpacked_shortest = Vec::new();
        let mut partially_unpacked_via = Vec::new();

        // shared prefix on the packed level, then one level deeper once the
        // packed paths deviate
        let prefix_pairs = std::cmp::min(packed_s_v_path.len(), packed_shortest_path.len()) - 1;
        for i in 0..prefix_pairs {
            if packed_s_v_path[i] == packed_shortest_path[i] && packed_s_v_path[i + 1] == packed_shortest_path[i + 1] {
                sharing += self.edge_weight(packed_s_v_path[i], packed_s_v_path[i + 1]);
            } else {
                if packed_s_v_path[i] == packed_shortest_path[i] {
                    partially_unpacked_via.push(packed_s_v_path[i]);
                    self.append_unpacked(packed_s_v_path[i], packed_s_v_path[i + 1], &mut partially_unpacked_via);
                    partially_unpacked_shortest.push(packed_shortest_path[i]);
                    self.append_unpacked(packed_shortest_path[i], packed_shortest_path[i + 1], &mut partially_unpacked_shortest);
                }
                break;
            }
        }
        let deeper_pairs = std::cmp::min(partially_unpacked_via.len(), partially_unpacked_shortest.len()).saturating_sub(1);
        for i in 0..deeper_pairs {
            if partially_unpacked_via[i] != partially_unpacked_shortest[i] || partially_unpacked_via[i + 1] != partially_unpacked_shortest[i + 1] {
                break;
            }
            sharing += self.edge_weight(partially_unpacked_via[i], partially_unpacked_via[i + 1]);
        }

        // the same from the target side, walking backwards
        partially_unpacked_shortest.clear();
        partially_unpacked_via.clear();
        let mut via_index = packed_v_t_path.len() as i64 - 1;
        let mut shortest_index = packed_shortest_path.len() as i64 - 1;
        while via_index > 0 && shortest_index > 0 {
            let (v, s) = (via_index as usize, shortest_index as usize);
            if packed_v_t_path[v - 1] == packed_shortest_path[s - 1] && packed_v_t_path[v] == packed_shortest_path[s] {
                sharing += self.edge_weight(packed_v_t_path[v - 1], packed_v_t_path[v]);
            } else {
                if packed_v_t_path[v] == packed_shortest_path[s] {
                    partially_unpacked_via.push(packed_v_t_path[v - 1]);
                    self.append_unpacked(packed_v_t_path[v - 1], packed_v_t_path[v], &mut partially_unpacked_via);
                    partially_unpacked_shortest.push(packed_shortest_path[s - 1]);
                    self.append_unpacked(packed_shortest_path[s - 1], packed_shortest_path[s], &mut partially_unpacked_shortest);
                }
                break;
            }
            via_index -= 1;
            shortest_index -= 1;
        }
        let mut via_index = partially_unpacked_via.len() as i64 - 1;
        let mut shortest_index = partially_unpacked_shortest.len() as i64 - 1;
        while via_index > 0 && shortest_index > 0 {
            let (v, s) = (via_index as usize, shortest_index as usize);
            if partially_unpacked_via[v - 1] != partially_unpacked_shortest[s - 1] || partially_unpacked_via[v] != partially_unpacked_shortest[s] {
                break;
            }
            sharing += self.edge_weight(partially_unpacked_via[v - 1], partially_unpacked_via[v]);
            via_index -= 1;
            shortest_index -= 1;
        }

        (length, sharing)
    }

    /// The T test: unpack the via path from both ends until the weight
    /// budget `epsilon * optimum` is spent, then check that the remaining
    /// plateau is itself a shortest path between its endpoints.
    fn passes_t_test(
        &mut self,
        candidate: NodeId,
        length_of_shortest_path: Weight,
        length_of_via_path: &mut Weight,
        s_v_middle: &mut NodeId,
        v_t_middle: &mut NodeId,
    ) -> bool {
        self.forward_heap2.clear();
        self.reverse_heap2.clear();

        *s_v_middle = INVALID_NODE;
        let mut upper_bound_s_v = INFINITY;
        self.reverse_heap2.push(candidate, 0, candidate);
        while !self.reverse_heap2.is_empty() {
            routing_step(
                &self.graph,
                &mut self.reverse_heap2,
                &self.forward_heap1,
                s_v_middle,
                &mut upper_bound_s_v,
                Direction::Backward,
            );
        }
        if upper_bound_s_v == INFINITY {
            return false;
        }

        *v_t_middle = INVALID_NODE;
        let mut upper_bound_v_t = INFINITY;
        self.forward_heap2.push(candidate, 0, candidate);
        while !self.forward_heap2.is_empty() {
            routing_step(
                &self.graph,
                &mut self.forward_heap2,
                &self.reverse_heap1,
                v_t_middle,
                &mut upper_bound_v_t,
                Direction::Forward,
            );
        }
        if upper_bound_v_t == INFINITY {
            return false;
        }
        if *s_v_middle == INVALID_NODE || *v_t_middle == INVALID_NODE {
            return false;
        }

        *length_of_via_path = upper_bound_s_v + upper_bound_v_t;

        let packed_s_v_path = packed_path_via_meeting(&self.forward_heap1, &self.reverse_heap2, *s_v_middle);
        let packed_v_t_path = packed_path_via_meeting(&self.forward_heap2, &self.reverse_heap1, *v_t_middle);

        let t_threshold = (VIAPATH_EPSILON * f64::from(length_of_shortest_path)) as Weight;
        let mut unpacked_until_weight = 0;
        let mut s_p = *s_v_middle;
        let mut t_p = *v_t_middle;
        let mut unpack_stack: Vec<(NodeId, NodeId)> = Vec::new();

        // walk from the via towards the source until the budget is reached
        let mut i = packed_s_v_path.len() - 1;
        while i > 0 && unpack_stack.is_empty() {
            let edge_weight = self.edge_weight(packed_s_v_path[i - 1], packed_s_v_path[i]);
            if edge_weight + unpacked_until_weight >= t_threshold {
                unpack_stack.push((packed_s_v_path[i - 1], packed_s_v_path[i]));
            } else {
                unpacked_until_weight += edge_weight;
                s_p = packed_s_v_path[i - 1];
            }
            i -= 1;
        }
        while let Some((from, to)) = unpack_stack.pop() {
            let Some(edge) = self.graph.find_edge_in_either_direction(from, to) else {
                return false;
            };
            let data = *self.graph.edge_data(edge);
            if data.shortcut {
                // unpacking in reverse: resolve the second half first
                let second_segment_weight = self.edge_weight(data.via, to);
                if unpacked_until_weight + second_segment_weight >= t_threshold {
                    unpack_stack.push((data.via, to));
                } else {
                    unpacked_until_weight += second_segment_weight;
                    unpack_stack.push((from, data.via));
                }
            } else {
                unpacked_until_weight += data.weight;
                s_p = from;
            }
        }

        let mut t_test_path_length = unpacked_until_weight;
        let mut unpacked_until_weight = 0;
        // and from the via towards the target
        let mut i = 0;
        while i + 1 < packed_v_t_path.len() && unpack_stack.is_empty() {
            let edge_weight = self.edge_weight(packed_v_t_path[i], packed_v_t_path[i + 1]);
            if edge_weight + unpacked_until_weight >= t_threshold {
                unpack_stack.push((packed_v_t_path[i], packed_v_t_path[i + 1]));
            } else {
                unpacked_until_weight += edge_weight;
                t_p = packed_v_t_path[i + 1];
            }
            i += 1;
        }
        while let Some((from, to)) = unpack_stack.pop() {
            let Some(edge) = self.graph.find_edge_in_either_direction(from, to) else {
                return false;
            };
            let data = *self.graph.edge_data(edge);
            if data.shortcut {
                let first_segment_weight = self.edge_weight(from, data.via);
                if unpacked_until_weight + first_segment_weight >= t_threshold {
                    unpack_stack.push((from, data.via));
                } else {
                    unpacked_until_weight += first_segment_weight;
                    unpack_stack.push((data.via, to));
                }
            } else {
                unpacked_until_weight += data.weight;
                t_p = to;
            }
        }
        t_test_path_length += unpacked_until_weight;

        // the plateau passes iff it is itself a shortest path
        self.forward_heap3.clear();
        self.reverse_heap3.clear();
        let mut upper_bound = INFINITY;
        let mut middle = INVALID_NODE;
        self.forward_heap3.push(s_p, 0, s_p);
        self.reverse_heap3.push(t_p, 0, t_p);
        while self.forward_heap3.len() + self.reverse_heap3.len() > 0 {
            if !self.forward_heap3.is_empty() {
                routing_step(
                    &self.graph,
                    &mut self.forward_heap3,
                    &self.reverse_heap3,
                    &mut middle,
                    &mut upper_bound,
                    Direction::Forward,
                );
            }
            if !self.reverse_heap3.is_empty() {
                routing_step(
                    &self.graph,
                    &mut self.reverse_heap3,
                    &self.forward_heap3,
                    &mut middle,
                    &mut upper_bound,
                    Direction::Backward,
                );
            }
        }
        upper_bound <= t_test_path_length
    }

    fn edge_weight(&self, from: NodeId, to: NodeId) -> Weight {
        let edge = self
            .graph
            .find_edge_in_either_direction(from, to)
            .expect("packed path contains a pair without an edge");
        self.graph.edge_data(edge).weight
    }

    fn append_unpacked(&self, from: NodeId, to: NodeId, out: &mut Vec<NodeId>) {
        crate::algo::contraction::query::append_unpacked_edge(&self.graph, from, to, out);
    }
}

/// One step of the recording search: like the plain routing step but
/// without stalling, remembering the relaxed tree edges and every meeting
/// node, and pruning against the scaled upper bound.
#[allow(clippy::too_many_arguments)]
fn alternative_routing_step(
    graph: &StaticGraph<ContractorEdgeData>,
    active_heap: &mut AddressableMinHeap<NodeId>,
    other_heap: &AddressableMinHeap<NodeId>,
    middle: &mut NodeId,
    upper_bound: &mut Weight,
    via_candidates: &mut Vec<NodeId>,
    search_space: &mut Vec<(NodeId, NodeId)>,
    direction: Direction,
) {
    let Some(node) = active_heap.pop() else { return };
    let weight = active_heap.key(node);

    let scaled_weight = (f64::from(weight) / (1. + VIAPATH_EPSILON)) as Weight;
    if *upper_bound != INFINITY && scaled_weight > *upper_bound {
        active_heap.delete_all();
        return;
    }

    search_space.push((*active_heap.data(node), node));

    if other_heap.was_inserted(node) {
        via_candidates.push(node);
        let new_weight = other_heap.key(node) + weight;
        if new_weight < *upper_bound {
            *middle = node;
            *upper_bound = new_weight;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algo::contraction::Contractor;
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

    // a finished hierarchy edge: stored on the lower ranked endpoint,
    // traversable both ways
    fn hierarchy_edge(source: NodeId, target: NodeId, weight: Weight) -> ContractedEdge {
        InputEdge {
            source,
            target,
            data: ContractorEdgeData {
                weight,
                original_edges: 1,
                via: 0,
                name_id: 0,
                turn_instruction: TurnInstruction::NoTurn,
                shortcut: false,
                forward: true,
                backward: true,
                original_via_node_id: true,
            },
        }
    }

    #[test]
    fn accepts_a_well_separated_alternative() {
        // Shortest path 0 -> 1 -> 2 -> 3 of weight 100, with a detour from
        // 1 to 2 over node 4 that shares only the first and the last edge.
        //
        //            40     45
        //         +----- 4 -----+
        //         |             |
        //   0 -- 1 ----- 2 ---- 3
        //     10     80     10
        //
        // Contraction order 0, 3, 1, 2, 4 needs no shortcuts (the direct
        // edge witnesses every pair), so the hierarchy is just the input
        // with each edge stored at its lower ranked endpoint.
        let mut server = Server::new(
            5,
            vec![
                hierarchy_edge(0, 1, 10),
                hierarchy_edge(3, 2, 10),
                hierarchy_edge(1, 2, 80),
                hierarchy_edge(1, 4, 40),
                hierarchy_edge(2, 4, 45),
            ],
        );
        let result = server.alternatives(0, 3).expect("endpoints are connected");

        assert_eq!(result.shortest_weight, 100);
        assert_eq!(result.shortest_path, vec![0, 1, 2, 3]);

        // length 105 < 115, sharing 20 <= 75, stretch 85 < 1.1 * 80
        let alternative = result.alternative.expect("the detour is admissible");
        assert_eq!(alternative.via, 4);
        assert_eq!(alternative.weight, 105);
        assert_eq!(alternative.path, vec![0, 1, 4, 2, 3]);
    }

    #[test]
    fn rejects_an_alternative_with_too_much_overlap() {
        // Shortest path 0 -> 1 -> 2 -> 3 -> 5 of weight 100 and a tiny
        // deviation from 2 to 3 over node 4: the alternative shares 90 of
        // 100 with the optimum and the sharing filter kills it.
        let mut server = Server::new(
            6,
            vec![
                hierarchy_edge(0, 1, 40),
                hierarchy_edge(5, 3, 10),
                hierarchy_edge(1, 2, 40),
                hierarchy_edge(2, 3, 10),
                hierarchy_edge(2, 4, 12),
                hierarchy_edge(3, 4, 12),
            ],
        );
        let result = server.alternatives(0, 5).expect("endpoints are connected");
        assert_eq!(result.shortest_weight, 100);
        assert!(result.alternative.is_none());
    }

    #[test]
    fn no_alternative_on_a_plain_path() {
        let mut server = server(3, &[bidirectional(0, 1, 10), bidirectional(1, 2, 10)]);
        let result = server.alternatives(0, 2).expect("endpoints are connected");
        assert_eq!(result.shortest_weight, 20);
        assert!(result.alternative.is_none());
    }

    #[test]
    fn disconnected_endpoints_give_none() {
        let mut server = server(4, &[bidirectional(0, 1, 10), bidirectional(2, 3, 10)]);
        assert!(server.alternatives(0, 3).is_none());
    }
}
