//! Expansion of the node based road graph into the edge based graph.
//!
//! Every directed node based edge becomes an edge based node; every allowed
//! turn between two adjacent node based edges becomes an edge based edge
//! carrying the turn cost and a turn instruction. Turn restrictions remove
//! turns (`no_*`) or remove all siblings of a turn (`only_*`).

use super::*;
use crate::error::{Error, Result};
use crate::geo::{turn_angle, Coordinate};
use log::{info, warn};
use std::io::Write;

/// Turn instructions with their wire values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum TurnInstruction {
    #[default]
    NoTurn = 0,
    GoStraight = 1,
    TurnSlightRight = 2,
    TurnRight = 3,
    TurnSharpRight = 4,
    UTurn = 5,
    TurnSharpLeft = 6,
    TurnLeft = 7,
    TurnSlightLeft = 8,
    ReachedYourDestination = 9,
    EnterRoundAbout = 10,
    LeaveRoundAbout = 11,
    StayOnRoundAbout = 12,
    StartAtEndOfStreet = 13,
    ReachedCheckpoint = 14,
}

impl TurnInstruction {
    /// The direction bucket for a turn over the given angle, with 180
    /// degrees being straight through.
    pub fn direction_of(angle: f64) -> TurnInstruction {
        use TurnInstruction::*;
        match angle {
            a if (23. ..67.).contains(&a) => TurnSharpRight,
            a if (67. ..113.).contains(&a) => TurnRight,
            a if (113. ..158.).contains(&a) => TurnSlightRight,
            a if (158. ..202.).contains(&a) => GoStraight,
            a if (202. ..248.).contains(&a) => TurnSlightLeft,
            a if (248. ..292.).contains(&a) => TurnLeft,
            a if (292. ..336.).contains(&a) => TurnSharpLeft,
            _ => UTurn,
        }
    }

    pub fn from_wire(value: u8) -> Option<TurnInstruction> {
        use TurnInstruction::*;
        Some(match value {
            0 => NoTurn,
            1 => GoStraight,
            2 => TurnSlightRight,
            3 => TurnRight,
            4 => TurnSharpRight,
            5 => UTurn,
            6 => TurnSharpLeft,
            7 => TurnLeft,
            8 => TurnSlightLeft,
            9 => ReachedYourDestination,
            10 => EnterRoundAbout,
            11 => LeaveRoundAbout,
            12 => StayOnRoundAbout,
            13 => StartAtEndOfStreet,
            14 => ReachedCheckpoint,
            _ => return None,
        })
    }
}

/// A directed edge of the node based road graph as the parser delivers it.
#[derive(Debug, Clone, Copy)]
pub struct NodeBasedEdge {
    pub source: NodeId,
    pub target: NodeId,
    /// travel time in tenths of seconds
    pub weight: Weight,
    pub forward: bool,
    pub backward: bool,
    pub name_id: u32,
    pub road_type: i16,
    pub roundabout: bool,
}

/// A turn restriction with its way references already resolved to the entry
/// and exit nodes by the parser.
#[derive(Debug, Clone, Copy)]
pub struct TurnRestriction {
    pub from_node: NodeId,
    pub via_node: NodeId,
    pub to_node: NodeId,
    /// `only_*` restrictions prescribe the one allowed turn, `no_*`
    /// restrictions forbid exactly one.
    pub is_only: bool,
}

/// An edge based node: one directed node based edge, with the coordinates of
/// both endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EdgeBasedNode {
    pub name_id: u32,
    pub lat1: i32,
    pub lon1: i32,
    pub lat2: i32,
    pub lon2: i32,
    pub id: NodeId,
    pub weight: Weight,
}

/// An edge based edge: an allowed turn at `via` between two edge based nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeBasedEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub via: NodeId,
    pub name_id: u32,
    pub weight: Weight,
    pub forward: bool,
    pub backward: bool,
    pub turn_instruction: TurnInstruction,
}

#[derive(Debug, Clone, Copy, Default)]
struct NodeBasedEdgeData {
    weight: Weight,
    edge_based_node_id: NodeId,
    name_id: u32,
    #[allow(dead_code)]
    road_type: i16,
    roundabout: bool,
    forward: bool,
    backward: bool,
}

pub struct EdgeBasedGraphFactory {
    node_based_graph: DynamicGraph<NodeBasedEdgeData>,
    node_coords: Vec<Coordinate>,
    // sorted by from_node
    restrictions: Vec<TurnRestriction>,
    num_edge_based_nodes: usize,
    edge_based_nodes: Vec<EdgeBasedNode>,
    edge_based_edges: Vec<EdgeBasedEdge>,
}

impl EdgeBasedGraphFactory {
    pub fn new(
        num_nodes: usize,
        input_edges: &[NodeBasedEdge],
        mut restrictions: Vec<TurnRestriction>,
        node_coords: Vec<Coordinate>,
    ) -> Result<EdgeBasedGraphFactory> {
        if node_coords.len() < num_nodes {
            return Err(Error::InvalidInput(format!(
                "{} nodes declared but only {} coordinates",
                num_nodes,
                node_coords.len()
            )));
        }

        let num_input_restrictions = restrictions.len();
        restrictions.retain(|r| {
            (r.from_node as usize) < num_nodes && (r.via_node as usize) < num_nodes && (r.to_node as usize) < num_nodes
        });
        if restrictions.len() < num_input_restrictions {
            warn!(
                "dropped {} restrictions referencing unknown nodes",
                num_input_restrictions - restrictions.len()
            );
        }
        restrictions.sort_by_key(|r| r.from_node);

        // make directions explicit: each direction of a node based edge
        // becomes its own entry and thereby its own edge based node
        let mut expanded = Vec::with_capacity(2 * input_edges.len());
        for edge in input_edges {
            if edge.source == edge.target {
                continue;
            }
            if (edge.source as usize) >= num_nodes || (edge.target as usize) >= num_nodes {
                return Err(Error::InvalidInput(format!(
                    "edge ({}, {}) references unknown nodes",
                    edge.source, edge.target
                )));
            }

            let data = NodeBasedEdgeData {
                weight: std::cmp::max(edge.weight, 1),
                edge_based_node_id: expanded.len() as NodeId,
                name_id: edge.name_id,
                road_type: edge.road_type,
                roundabout: edge.roundabout,
                forward: edge.forward,
                backward: edge.backward,
            };
            expanded.push(InputEdge {
                source: edge.source,
                target: edge.target,
                data,
            });
            if edge.backward {
                expanded.push(InputEdge {
                    source: edge.target,
                    target: edge.source,
                    data: NodeBasedEdgeData {
                        edge_based_node_id: expanded.len() as NodeId,
                        forward: edge.backward,
                        backward: edge.forward,
                        ..data
                    },
                });
            }
        }

        let num_edge_based_nodes = expanded.len();
        expanded.sort_by_key(InputEdge::cmp_key);
        let node_based_graph = DynamicGraph::from_sorted_edges(num_nodes, &expanded);
        info!(
            "converted {} node based edges into {} edge based nodes",
            input_edges.len(),
            num_edge_based_nodes
        );

        Ok(EdgeBasedGraphFactory {
            node_based_graph,
            node_coords,
            restrictions,
            num_edge_based_nodes,
            edge_based_nodes: Vec::new(),
            edge_based_edges: Vec::new(),
        })
    }

    /// Number of nodes of the edge based graph.
    pub fn num_nodes(&self) -> usize {
        self.num_edge_based_nodes
    }

    /// Sweep over all turns and generate the edge based representation.
    pub fn run(&mut self) {
        let graph = &self.node_based_graph;
        let num_nodes = graph.num_nodes() as NodeId;
        let mut restriction_begin = 0;
        let mut node_based_edge_counter = 0usize;
        let mut restricted_turns = 0usize;

        for u in 0..num_nodes {
            // the restrictions originating from u form one window of the
            // sorted restriction list
            while restriction_begin < self.restrictions.len() && self.restrictions[restriction_begin].from_node < u {
                restriction_begin += 1;
            }
            let restriction_window: &[TurnRestriction] = {
                let mut end = restriction_begin;
                while end < self.restrictions.len() && self.restrictions[end].from_node == u {
                    end += 1;
                }
                &self.restrictions[restriction_begin..end]
            };

            for e1 in graph.neighbor_edge_indices(u) {
                node_based_edge_counter += 1;
                let v = graph.target(e1);

                let only_to = restriction_window
                    .iter()
                    .find(|r| r.via_node == v && r.is_only)
                    .map(|r| r.to_node);

                // dead ends still need their edge based node, no turn will
                // emit it below
                if graph.degree(v) == 1 {
                    self.edge_based_nodes.push(Self::edge_based_node(&self.node_coords, u, v, graph.edge_data(e1)));
                }

                for e2 in graph.neighbor_edge_indices(v) {
                    let w = graph.target(e2);
                    if u == w {
                        // no U-turns within a single edge pair
                        continue;
                    }

                    if let Some(only_to) = only_to {
                        if w != only_to {
                            restricted_turns += 1;
                            continue;
                        }
                    } else if restriction_window.iter().any(|r| r.via_node == v && r.to_node == w) {
                        restricted_turns += 1;
                        continue;
                    }

                    let e1_data = graph.edge_data(e1);
                    let e2_data = graph.edge_data(e2);
                    let edge_based_source = e1_data.edge_based_node_id;
                    let edge_based_target = e2_data.edge_based_node_id;
                    assert!(
                        (edge_based_source as usize) < self.num_edge_based_nodes,
                        "edge based node id {} out of range",
                        edge_based_source
                    );
                    assert!(
                        (edge_based_target as usize) < self.num_edge_based_nodes,
                        "edge based node id {} out of range",
                        edge_based_target
                    );

                    let angle = turn_angle(
                        self.node_coords[u as usize],
                        self.node_coords[v as usize],
                        self.node_coords[w as usize],
                    );
                    // simple turn cost model: free when going straight
                    // through, up to doubling the edge weight for a U-turn
                    let weight = (f64::from(e1_data.weight) * (1. + ((angle - 180.).abs() / 180.))) as Weight;
                    let turn_instruction = Self::analyze_turn(graph, v, e1_data, e2_data, angle);

                    self.edge_based_edges.push(EdgeBasedEdge {
                        source: edge_based_source,
                        target: edge_based_target,
                        via: v,
                        name_id: e2_data.name_id,
                        weight,
                        forward: true,
                        backward: false,
                        turn_instruction,
                    });
                    self.edge_based_nodes.push(Self::edge_based_node(&self.node_coords, u, v, e1_data));
                }
            }
        }

        self.edge_based_nodes.sort_unstable();
        self.edge_based_nodes.dedup();

        info!("node based graph contains {} edges", node_based_edge_counter);
        info!(
            "edge based graph contains {} edges, blowup is {:.2}",
            self.edge_based_edges.len(),
            self.edge_based_edges.len() as f64 / node_based_edge_counter as f64
        );
        info!("edge based graph obeys {} turn restrictions", restricted_turns);
        info!("generated {} edge based nodes", self.edge_based_nodes.len());
    }

    fn edge_based_node(coords: &[Coordinate], u: NodeId, v: NodeId, data: &NodeBasedEdgeData) -> EdgeBasedNode {
        EdgeBasedNode {
            name_id: data.name_id,
            lat1: coords[u as usize].lat,
            lon1: coords[u as usize].lon,
            lat2: coords[v as usize].lat,
            lon2: coords[v as usize].lon,
            id: data.edge_based_node_id,
            weight: data.weight,
        }
    }

    fn analyze_turn(
        graph: &DynamicGraph<NodeBasedEdgeData>,
        v: NodeId,
        first: &NodeBasedEdgeData,
        second: &NodeBasedEdgeData,
        angle: f64,
    ) -> TurnInstruction {
        // roundabouts need to be handled explicitly
        if first.roundabout && second.roundabout {
            // is there a turn to make? if not, there is nothing to announce
            if graph.degree(v) == 1 {
                return TurnInstruction::NoTurn;
            }
            return TurnInstruction::StayOnRoundAbout;
        }
        if !first.roundabout && second.roundabout {
            return TurnInstruction::EnterRoundAbout;
        }
        if first.roundabout && !second.roundabout {
            return TurnInstruction::LeaveRoundAbout;
        }
        // staying on the same street is not a turn
        if first.name_id == second.name_id {
            return TurnInstruction::NoTurn;
        }
        TurnInstruction::direction_of(angle)
    }

    pub fn into_parts(self) -> (Vec<EdgeBasedNode>, Vec<EdgeBasedEdge>) {
        (self.edge_based_nodes, self.edge_based_edges)
    }
}

/// Write the packed edge based node records.
pub fn write_edge_based_nodes(nodes: &[EdgeBasedNode], writer: &mut impl Write) -> std::io::Result<()> {
    writer.write_all(&(nodes.len() as u32).to_le_bytes())?;
    for node in nodes {
        writer.write_all(&node.name_id.to_le_bytes())?;
        writer.write_all(&node.lat1.to_le_bytes())?;
        writer.write_all(&node.lon1.to_le_bytes())?;
        writer.write_all(&node.lat2.to_le_bytes())?;
        writer.write_all(&node.lon2.to_le_bytes())?;
        writer.write_all(&node.id.to_le_bytes())?;
        writer.write_all(&node.weight.to_le_bytes())?;
    }
    Ok(())
}

/// Write the packed edge based edge records.
pub fn write_edge_based_edges(edges: &[EdgeBasedEdge], writer: &mut impl Write) -> std::io::Result<()> {
    writer.write_all(&(edges.len() as u32).to_le_bytes())?;
    for edge in edges {
        writer.write_all(&edge.source.to_le_bytes())?;
        writer.write_all(&edge.target.to_le_bytes())?;
        writer.write_all(&edge.name_id.to_le_bytes())?;
        writer.write_all(&edge.via.to_le_bytes())?;
        writer.write_all(&edge.weight.to_le_bytes())?;
        writer.write_all(&[edge.forward as u8, edge.backward as u8, edge.turn_instruction as u8])?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(n: usize) -> Vec<Coordinate> {
        // a ring of positions so every node has distinct screen vectors
        (0..n)
            .map(|i| {
                let angle = i as f64 / n as f64 * 2. * std::f64::consts::PI;
                Coordinate::from_degrees(49. + 0.01 * angle.sin(), 8. + 0.01 * angle.cos())
            })
            .collect()
    }

    fn edge(source: NodeId, target: NodeId) -> NodeBasedEdge {
        NodeBasedEdge {
            source,
            target,
            weight: 100,
            forward: true,
            backward: true,
            name_id: source * 100 + target,
            road_type: 3,
            roundabout: false,
        }
    }

    #[test]
    fn direction_buckets() {
        assert_eq!(TurnInstruction::direction_of(180.), TurnInstruction::GoStraight);
        assert_eq!(TurnInstruction::direction_of(90.), TurnInstruction::TurnRight);
        assert_eq!(TurnInstruction::direction_of(270.), TurnInstruction::TurnLeft);
        assert_eq!(TurnInstruction::direction_of(30.), TurnInstruction::TurnSharpRight);
        assert_eq!(TurnInstruction::direction_of(130.), TurnInstruction::TurnSlightRight);
        assert_eq!(TurnInstruction::direction_of(230.), TurnInstruction::TurnSlightLeft);
        assert_eq!(TurnInstruction::direction_of(320.), TurnInstruction::TurnSharpLeft);
        assert_eq!(TurnInstruction::direction_of(5.), TurnInstruction::UTurn);
        assert_eq!(TurnInstruction::direction_of(355.), TurnInstruction::UTurn);
    }

    #[test]
    fn wire_values_roundtrip() {
        for value in 0..=14u8 {
            assert_eq!(TurnInstruction::from_wire(value).unwrap() as u8, value);
        }
        assert_eq!(TurnInstruction::from_wire(15), None);
    }

    #[test]
    fn expands_turns_between_adjacent_edges() {
        // a - b - c, both edges bidirectional: each direction is an edge
        // based node, u-turns at b are not expanded
        let mut factory = EdgeBasedGraphFactory::new(3, &[edge(0, 1), edge(1, 2)], Vec::new(), coords(3)).unwrap();
        factory.run();
        let (nodes, edges) = factory.into_parts();

        assert_eq!(nodes.len(), 4);
        // a->b continues to b->c and c->b continues to b->a
        assert_eq!(edges.len(), 2);
        for edge in &edges {
            assert_eq!(edge.via, 1);
            assert!(edge.forward);
            assert!(!edge.backward);
        }
    }

    #[test]
    fn one_way_edges_expand_to_one_edge_based_node() {
        let mut one_way = edge(0, 1);
        one_way.backward = false;
        let factory = EdgeBasedGraphFactory::new(2, &[one_way], Vec::new(), coords(2)).unwrap();
        assert_eq!(factory.num_nodes(), 1);
    }

    // The expansion assigns edge based node ids in input order: the forward
    // direction of input edge i first, its backward direction (if any) right
    // after. For the fixture [edge(0,1), edge(1,2), edge(1,3)] that is
    // 0: 0->1, 1: 1->0, 2: 1->2, 3: 2->1, 4: 1->3, 5: 3->1.

    #[test]
    fn no_restriction_drops_the_turn() {
        let restriction = TurnRestriction {
            from_node: 0,
            via_node: 1,
            to_node: 2,
            is_only: false,
        };
        let mut factory =
            EdgeBasedGraphFactory::new(4, &[edge(0, 1), edge(1, 2), edge(1, 3)], vec![restriction], coords(4)).unwrap();
        factory.run();
        let (_, edges) = factory.into_parts();

        // the turn 0->1->2 is gone
        assert!(!edges.iter().any(|e| e.source == 0 && e.target == 2));
        // 0->1->3 and the turns from other entry directions survive
        assert!(edges.iter().any(|e| e.source == 0 && e.target == 4));
        assert!(edges.iter().any(|e| e.source == 3 && e.target == 4));
        assert!(edges.iter().any(|e| e.source == 5 && e.target == 2));
        assert_eq!(edges.len(), 5);
    }

    #[test]
    fn only_restriction_drops_all_other_turns() {
        let restriction = TurnRestriction {
            from_node: 0,
            via_node: 1,
            to_node: 2,
            is_only: true,
        };
        let mut factory =
            EdgeBasedGraphFactory::new(4, &[edge(0, 1), edge(1, 2), edge(1, 3)], vec![restriction], coords(4)).unwrap();
        factory.run();
        let (_, edges) = factory.into_parts();

        // only 0->1->2 survives from the 0->1 entry
        let from_entry: Vec<_> = edges.iter().filter(|e| e.source == 0).collect();
        assert_eq!(from_entry.len(), 1);
        assert_eq!(from_entry[0].target, 2);
        // entries not covered by the restriction keep their turns
        assert!(edges.iter().any(|e| e.source == 3 && e.target == 4));
    }

    #[test]
    fn roundabout_instructions() {
        let mut edges = vec![edge(0, 1), edge(1, 2), edge(1, 3)];
        edges[0].roundabout = true;
        edges[1].roundabout = true;
        let mut factory = EdgeBasedGraphFactory::new(4, &edges, Vec::new(), coords(4)).unwrap();
        factory.run();
        let (_, expanded) = factory.into_parts();

        let instruction = |source: NodeId, target: NodeId| {
            expanded
                .iter()
                .find(|e| e.source == source && e.target == target)
                .unwrap()
                .turn_instruction
        };

        // both segments on the roundabout and the via node has an exit
        assert_eq!(instruction(0, 2), TurnInstruction::StayOnRoundAbout);
        assert_eq!(instruction(3, 1), TurnInstruction::StayOnRoundAbout);
        // leaving to the plain edge 1->3
        assert_eq!(instruction(0, 4), TurnInstruction::LeaveRoundAbout);
        // entering from the plain edge 3->1
        assert_eq!(instruction(5, 2), TurnInstruction::EnterRoundAbout);
    }

    #[test]
    fn roundabout_without_choice_is_no_turn() {
        // one way roundabout segments, the via node has a single exit
        let mut edges = vec![edge(0, 1), edge(1, 2)];
        for edge in &mut edges {
            edge.backward = false;
            edge.roundabout = true;
        }
        let mut factory = EdgeBasedGraphFactory::new(3, &edges, Vec::new(), coords(3)).unwrap();
        factory.run();
        let (_, expanded) = factory.into_parts();
        assert_eq!(expanded.len(), 1);
        assert_eq!(expanded[0].turn_instruction, TurnInstruction::NoTurn);
    }

    #[test]
    fn same_name_is_no_turn() {
        let mut edges = vec![edge(0, 1), edge(1, 2)];
        edges[0].name_id = 7;
        edges[1].name_id = 7;
        let mut factory = EdgeBasedGraphFactory::new(3, &edges, Vec::new(), coords(3)).unwrap();
        factory.run();
        let (_, expanded) = factory.into_parts();
        assert!(expanded.iter().all(|e| e.turn_instruction == TurnInstruction::NoTurn));
    }
}
