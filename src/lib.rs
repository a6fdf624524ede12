//! A routing engine core for road networks: turn expansion, contraction
//! hierarchy preprocessing and the matching point-to-point and
//! alternative-route queries.
//!
//! The pipeline is: an external parser delivers geographic nodes, directed
//! node-based edges and turn restrictions; the
//! [`EdgeBasedGraphFactory`](algo::edge_based_graph::EdgeBasedGraphFactory)
//! expands them into an edge-based graph in which turns carry costs and obey
//! restrictions; the [`Contractor`](algo::contraction::Contractor) builds a
//! contraction hierarchy over that graph; the query servers in
//! [`algo::contraction::query`] and [`algo::alternatives`] answer shortest
//! path and alternative route requests over the contracted graph.

#[macro_use]
pub mod report;
pub mod algo;
pub mod cli;
pub mod datastr;
pub mod error;
pub mod geo;
pub mod io;
