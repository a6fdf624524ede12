//! The algorithms: turn expansion, contraction and the query servers,
//! plus the vocabulary types shared between them.

use crate::datastr::graph::*;

pub mod alternatives;
pub mod contraction;
pub mod dijkstra;
pub mod edge_based_graph;

/// A shortest path query between two nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Query {
    pub from: NodeId,
    pub to: NodeId,
}

/// A node and its distance in the current search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct State {
    pub distance: Weight,
    pub node: NodeId,
}

/// What one step of a stepped search did.
#[derive(Debug, Clone, Copy)]
pub enum QueryProgress {
    Settled(State),
    Done(Option<Weight>),
}

/// Which direction flag a search relaxes. Both searches of a bidirectional
/// query run on the same graph, just with different flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn allows<E: DirectedEdge>(self, edge: &E) -> bool {
        match self {
            Direction::Forward => edge.is_forward(),
            Direction::Backward => edge.is_backward(),
        }
    }

    pub fn reverse(self) -> Direction {
        match self {
            Direction::Forward => Direction::Backward,
            Direction::Backward => Direction::Forward,
        }
    }
}
