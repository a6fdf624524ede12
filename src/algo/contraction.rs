//! Contraction hierarchy preprocessing over the edge based graph.
//!
//! Nodes are contracted in rounds: every round selects an independent set of
//! locally least important nodes, contracts them in parallel and patches the
//! neighborhood priorities. Contracting a node inserts shortcuts between its
//! neighbors wherever a bounded witness search cannot find a path that is at
//! least as good without the node. Once three quarters of the nodes are
//! gone, the graph is renumbered to a dense id space and edges of contracted
//! nodes are spilled to a temporary file to cut the memory footprint.
//!
//! The surviving edges plus the spilled edges, both mapped back to the
//! original id space, form the search graph for the hierarchy queries.

use super::*;
use crate::algo::edge_based_graph::{EdgeBasedEdge, TurnInstruction};
use crate::datastr::index_heap::AddressableMinHeap;
use crate::error::{Error, Result};
use log::{info, warn};
use rand::prelude::*;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};

pub mod query;

/// Per edge payload of the contractor graph and the resulting hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContractorEdgeData {
    pub weight: Weight,
    /// how many original edge based edges this edge stands for
    pub original_edges: u32,
    /// the contracted node a shortcut bridges
    pub via: NodeId,
    pub name_id: u32,
    pub turn_instruction: TurnInstruction,
    pub shortcut: bool,
    pub forward: bool,
    pub backward: bool,
    /// set when `via` refers to the id space from before the mid-run
    /// renumbering
    pub original_via_node_id: bool,
}

impl DirectedEdge for ContractorEdgeData {
    fn weight(&self) -> Weight {
        self.weight
    }
    fn is_forward(&self) -> bool {
        self.forward
    }
    fn is_backward(&self) -> bool {
        self.backward
    }
}

/// An edge of the contracted graph, in the original edge based id space.
pub type ContractedEdge = InputEdge<ContractorEdgeData>;

type ContractorGraph = DynamicGraph<ContractorEdgeData>;

/// Number of nodes settled in a witness search before giving up,
/// when simulating a contraction for priority evaluation.
const SIMULATION_SETTLE_LIMIT: usize = 1000;
/// Same limit for the real contraction, which can afford to look further.
const CONTRACTION_SETTLE_LIMIT: usize = 2000;

#[derive(Debug, Clone, Copy)]
pub struct ContractorConfig {
    /// Hop limit of the witness searches. The classic literature uses small
    /// bounds here; unbounded reproduces the reference behaviour.
    pub hop_limit: u32,
    /// Fraction of contracted nodes that triggers the mid-run compaction.
    pub flush_threshold: f64,
}

impl Default for ContractorConfig {
    fn default() -> ContractorConfig {
        ContractorConfig {
            hop_limit: u32::MAX,
            flush_threshold: 0.75,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct NodePriorityData {
    /// coarse contraction level, monotonically non decreasing
    depth: i32,
    /// random permutation value for tie breaking
    bias: NodeId,
}

#[derive(Debug, Clone, Copy, Default)]
struct ContractionStats {
    edges_deleted: i32,
    edges_added: i32,
    original_edges_deleted: i32,
    original_edges_added: i32,
}

#[derive(Debug, Clone, Copy, Default)]
struct WitnessHeapData {
    hop: u32,
    target: bool,
}

/// Scratch state owned by one contraction worker.
struct WorkerContext {
    heap: AddressableMinHeap<WitnessHeapData>,
    inserted_edges: Vec<ContractedEdge>,
    neighbours: Vec<NodeId>,
}

impl WorkerContext {
    fn new(num_nodes: usize) -> WorkerContext {
        WorkerContext {
            heap: AddressableMinHeap::new(num_nodes),
            inserted_edges: Vec::new(),
            neighbours: Vec::new(),
        }
    }
}

// The parallel phases share the graph and the priority arrays as raw
// pointers. Every write goes to a node adjacent to a node of the current
// independent set, and two nodes of the set are never within two hops of
// each other, so no two workers ever touch the same entry. Expressing that
// in safe rust would need per node locks we do not want to pay for.
struct SyncPtr<T>(*mut T);
unsafe impl<T> Send for SyncPtr<T> {}
unsafe impl<T> Sync for SyncPtr<T> {}
impl<T> Clone for SyncPtr<T> {
    fn clone(&self) -> Self {
        SyncPtr(self.0)
    }
}
impl<T> Copy for SyncPtr<T> {}

pub struct Contractor {
    graph: ContractorGraph,
    config: ContractorConfig,
    /// spill target for edges of contracted nodes during compaction,
    /// unlinked by the OS when the contractor goes away
    spill: File,
    flushed: bool,
    num_spilled_edges: u32,
    /// maps the dense post-compaction ids back to the original ones;
    /// the identity until the compaction happened
    old_node_id_from_new: Vec<NodeId>,
}

impl Contractor {
    /// Prepare the direction explicit contractor graph from the edge based
    /// edge list: self loops are dropped and parallel edges are reduced to
    /// the minimum weight per direction, merging equal forward and backward
    /// weights into one bidirectional edge.
    pub fn new(num_nodes: usize, input_edges: &[EdgeBasedEdge]) -> Result<Contractor> {
        Self::with_config(num_nodes, input_edges, ContractorConfig::default())
    }

    pub fn with_config(num_nodes: usize, input_edges: &[EdgeBasedEdge], config: ContractorConfig) -> Result<Contractor> {
        let mut edges = Vec::with_capacity(2 * input_edges.len());
        let mut oversized = 0usize;
        for edge in input_edges {
            let data = ContractorEdgeData {
                weight: std::cmp::max(edge.weight, 1),
                original_edges: 1,
                via: edge.via,
                name_id: edge.name_id,
                turn_instruction: edge.turn_instruction,
                shortcut: false,
                forward: edge.forward,
                backward: edge.backward,
                original_via_node_id: false,
            };
            if data.weight > MAX_EDGE_WEIGHT {
                oversized += 1;
                continue;
            }
            edges.push(InputEdge {
                source: edge.source,
                target: edge.target,
                data,
            });
            edges.push(InputEdge {
                source: edge.target,
                target: edge.source,
                data: ContractorEdgeData {
                    forward: edge.backward,
                    backward: edge.forward,
                    ..data
                },
            });
        }
        if oversized > 0 {
            warn!("dropped {} edges with weights above a day, they would corrupt the hierarchy", oversized);
        }
        edges.sort_by_key(InputEdge::cmp_key);

        let merged = reduce_parallel_edges(&edges);
        info!("merged {} edges out of {}", edges.len() - merged.len(), edges.len());
        let graph = ContractorGraph::from_sorted_edges(num_nodes, &merged);

        Ok(Contractor {
            graph,
            config,
            spill: tempfile::tempfile()?,
            flushed: false,
            num_spilled_edges: 0,
            old_node_id_from_new: (0..num_nodes as NodeId).collect(),
        })
    }

    /// Contract all nodes.
    pub fn run(&mut self) -> Result<()> {
        let initial_node_count = self.graph.num_nodes();
        let num_workers = rayon::current_num_threads().max(1);
        info!("contractor is using {} workers", num_workers);

        let mut workers: Vec<WorkerContext> = (0..num_workers).map(|_| WorkerContext::new(initial_node_count)).collect();
        let mut remaining: Vec<(NodeId, bool)> = (0..initial_node_count as NodeId).map(|node| (node, false)).collect();
        let mut node_priority = vec![0f64; initial_node_count];
        let mut node_data = vec![NodePriorityData::default(); initial_node_count];

        // a fixed seed keeps preprocessing runs reproducible
        let mut shuffled: Vec<NodeId> = (0..initial_node_count as NodeId).collect();
        shuffled.shuffle(&mut StdRng::from_seed(Default::default()));
        for (position, &node) in shuffled.iter().enumerate() {
            node_data[node as usize].bias = position as NodeId;
        }
        drop(shuffled);

        info!("initializing elimination queue");
        {
            let chunk_size = initial_node_count / num_workers + 1;
            let graph = &self.graph;
            let node_data = &node_data;
            let config = self.config;
            rayon::scope(|s| {
                for (worker, (chunk_index, priorities)) in workers.iter_mut().zip(node_priority.chunks_mut(chunk_size).enumerate()) {
                    s.spawn(move |_| {
                        for (offset, priority) in priorities.iter_mut().enumerate() {
                            let node = (chunk_index * chunk_size + offset) as NodeId;
                            *priority = evaluate(graph, worker, &config, node_data[node as usize].depth, node);
                        }
                    });
                }
            });
        }

        info!("preprocessing {} nodes", initial_node_count);
        let mut num_contracted = 0;
        while num_contracted < initial_node_count {
            if !self.flushed && num_contracted as f64 > initial_node_count as f64 * self.config.flush_threshold {
                self.flush(&mut remaining, &mut node_priority, &mut node_data, &mut workers)?;
            }

            // phase 1: select an independent set of local priority minima
            let chunk_size = remaining.len() / num_workers + 1;
            {
                let graph = &self.graph;
                let node_priority = &node_priority;
                let node_data = &node_data;
                rayon::scope(|s| {
                    for (worker, chunk) in workers.iter_mut().zip(remaining.chunks_mut(chunk_size)) {
                        s.spawn(move |_| {
                            for (node, selected) in chunk {
                                *selected = is_independent(graph, node_priority, node_data, worker, *node);
                            }
                        });
                    }
                });
            }
            let mut independent = Vec::new();
            remaining.retain(|&(node, selected)| {
                if selected {
                    independent.push(node);
                }
                !selected
            });
            debug_assert!(!independent.is_empty(), "no progress in contraction round");

            // phase 2: contract the set, each worker collecting shortcuts
            // into its own buffer
            let chunk_size = independent.len() / num_workers + 1;
            {
                let graph = &self.graph;
                let config = self.config;
                rayon::scope(|s| {
                    for (worker, chunk) in workers.iter_mut().zip(independent.chunks(chunk_size)) {
                        s.spawn(move |_| {
                            for &node in chunk {
                                contract(graph, worker, &config, node, None);
                            }
                            worker.inserted_edges.sort_by_key(InputEdge::cmp_key);
                        });
                    }
                });
            }

            // phase 3: unlink the contracted nodes from their neighbors.
            // Disjointness of the touched adjacency ranges follows from the
            // two hop independence of the set.
            {
                let graph_ptr = SyncPtr(&mut self.graph as *mut ContractorGraph);
                rayon::scope(|s| {
                    for (worker, chunk) in workers.iter_mut().zip(independent.chunks(chunk_size)) {
                        s.spawn(move |_| {
                            let graph_ptr = graph_ptr;
                            let graph = unsafe { &mut *graph_ptr.0 };
                            for &node in chunk {
                                delete_incoming_edges(graph, worker, node);
                            }
                        });
                    }
                });
            }

            // phase 4: merge the shortcut buffers into the graph, single
            // threaded
            for worker in &mut workers {
                for edge in worker.inserted_edges.drain(..) {
                    let mut handled = false;
                    if let Some(existing) = self.graph.find_edge(edge.source, edge.target) {
                        let existing_data = self.graph.edge_data_mut(existing);
                        if existing_data.forward == edge.data.forward && existing_data.backward == edge.data.backward {
                            if existing_data.weight <= edge.data.weight {
                                handled = true;
                            } else {
                                // the winning shortcut brings its own via,
                                // keeping the stored weight and the unpacked
                                // path in agreement
                                *existing_data = edge.data;
                                handled = true;
                            }
                        }
                    }
                    if !handled {
                        self.graph.insert_edge(edge.source, edge.target, edge.data);
                    }
                }
            }

            // phase 5: raise neighbor depths and recompute their priorities
            {
                let graph = &self.graph;
                let config = self.config;
                let priority_ptr = SyncPtr(node_priority.as_mut_ptr());
                let data_ptr = SyncPtr(node_data.as_mut_ptr());
                rayon::scope(|s| {
                    for (worker, chunk) in workers.iter_mut().zip(independent.chunks(chunk_size)) {
                        s.spawn(move |_| {
                            for &node in chunk {
                                update_neighbours(graph, priority_ptr, data_ptr, worker, &config, node);
                            }
                        });
                    }
                });
            }

            num_contracted += independent.len();
        }

        info!("contraction done, {} edges in the hierarchy", self.graph.num_arcs() as u32 + self.num_spilled_edges);
        Ok(())
    }

    /// Renumber the remaining quarter of the nodes to a dense id space,
    /// move their edges to a fresh graph and spill everything else to the
    /// temporary file.
    fn flush(
        &mut self,
        remaining: &mut [(NodeId, bool)],
        node_priority: &mut Vec<f64>,
        node_data: &mut Vec<NodePriorityData>,
        workers: &mut Vec<WorkerContext>,
    ) -> Result<()> {
        info!("flushing memory, {} nodes remaining", remaining.len());

        // free the old heaps before allocating anything new
        workers.clear();

        let num_remaining = remaining.len();
        let mut new_priority = vec![0f64; num_remaining];
        let mut new_node_data = vec![NodePriorityData::default(); num_remaining];
        let mut old_from_new = vec![INVALID_NODE; num_remaining];
        let mut new_from_old = vec![INVALID_NODE; self.graph.num_nodes()];

        for (new_id, entry) in remaining.iter_mut().enumerate() {
            let old_id = entry.0;
            old_from_new[new_id] = old_id;
            new_from_old[old_id as usize] = new_id as NodeId;
            new_priority[new_id] = node_priority[old_id as usize];
            new_node_data[new_id] = node_data[old_id as usize];
            entry.0 = new_id as NodeId;
        }

        let mut new_graph = ContractorGraph::new(num_remaining);
        let mut num_spilled = 0u32;
        self.spill.seek(SeekFrom::Start(0))?;
        let mut writer = BufWriter::new(&mut self.spill);
        writer.write_all(&0u32.to_le_bytes())?;

        for node in 0..self.graph.num_nodes() as NodeId {
            for edge in self.graph.neighbor_edge_indices(node) {
                let target = self.graph.target(edge);
                let data = *self.graph.edge_data(edge);
                if new_from_old[node as usize] == INVALID_NODE {
                    // edges of contracted nodes keep their untranslated ids
                    write_spill_record(&mut writer, node, target, &data)?;
                    num_spilled += 1;
                } else {
                    debug_assert!(new_from_old[target as usize] != INVALID_NODE);
                    let data = ContractorEdgeData {
                        original_via_node_id: true,
                        ..data
                    };
                    new_graph.insert_edge(new_from_old[node as usize], new_from_old[target as usize], data);
                }
            }
        }
        writer.flush()?;
        drop(writer);
        self.spill.seek(SeekFrom::Start(0))?;
        self.spill.write_all(&num_spilled.to_le_bytes())?;
        info!("spilled {} edges to disk", num_spilled);

        *node_priority = new_priority;
        *node_data = new_node_data;
        self.old_node_id_from_new = old_from_new;
        self.num_spilled_edges = num_spilled;
        self.graph = new_graph;
        workers.extend((0..rayon::current_num_threads().max(1)).map(|_| WorkerContext::new(num_remaining)));
        self.flushed = true;
        Ok(())
    }

    /// All edges of the finished hierarchy, translated back into the
    /// original edge based node id space.
    pub fn take_edges(&mut self) -> Result<Vec<ContractedEdge>> {
        let mut edges = Vec::with_capacity(self.graph.num_arcs() + self.num_spilled_edges as usize);
        for node in 0..self.graph.num_nodes() as NodeId {
            for edge in self.graph.neighbor_edge_indices(node) {
                let target = self.graph.target(edge);
                let mut data = *self.graph.edge_data(edge);
                // only shortcuts created after the compaction carry a via in
                // the renumbered space
                if self.flushed && !data.original_via_node_id {
                    data.via = *self
                        .old_node_id_from_new
                        .get(data.via as usize)
                        .ok_or_else(|| Error::GraphInconsistency(format!("via id {} outside the renumbered space", data.via)))?;
                    data.original_via_node_id = true;
                }
                edges.push(InputEdge {
                    source: self.old_node_id_from_new[node as usize],
                    target: self.old_node_id_from_new[target as usize],
                    data,
                });
            }
        }

        if self.flushed {
            self.spill.seek(SeekFrom::Start(0))?;
            let mut reader = BufReader::new(&mut self.spill);
            let mut count_bytes = [0u8; 4];
            reader.read_exact(&mut count_bytes)?;
            let count = u32::from_le_bytes(count_bytes);
            for _ in 0..count {
                let (source, target, data) = read_spill_record(&mut reader)?;
                edges.push(InputEdge { source, target, data });
            }
        }
        Ok(edges)
    }

    /// Write the contracted graph blob: the adjacency of every surviving
    /// renumbered node with targets and vias translated to the original id
    /// space, followed by the spilled edges prefixed with their count.
    pub fn write_graph(&mut self, writer: &mut impl Write) -> Result<()> {
        writer.write_all(&(self.graph.num_nodes() as u32).to_le_bytes())?;
        for node in 0..self.graph.num_nodes() as NodeId {
            writer.write_all(&(self.graph.degree(node) as u32).to_le_bytes())?;
            for edge in self.graph.neighbor_edge_indices(node) {
                let target = self.old_node_id_from_new[self.graph.target(edge) as usize];
                let data = self.graph.edge_data(edge);
                let via = if !self.flushed || data.original_via_node_id {
                    data.via
                } else {
                    *self
                        .old_node_id_from_new
                        .get(data.via as usize)
                        .ok_or_else(|| Error::GraphInconsistency(format!("via id {} outside the renumbered space", data.via)))?
                };
                writer.write_all(&target.to_le_bytes())?;
                writer.write_all(&data.weight.to_le_bytes())?;
                writer.write_all(&via.to_le_bytes())?;
                writer.write_all(&data.name_id.to_le_bytes())?;
                writer.write_all(&[
                    data.turn_instruction as u8,
                    data.shortcut as u8,
                    data.forward as u8,
                    data.backward as u8,
                ])?;
            }
        }

        if self.flushed {
            self.spill.seek(SeekFrom::Start(0))?;
            let mut spilled = Vec::new();
            self.spill.read_to_end(&mut spilled)?;
            writer.write_all(&spilled)?;
        } else {
            writer.write_all(&0u32.to_le_bytes())?;
        }
        Ok(())
    }
}

/// Reduce a direction explicit, sorted edge list: drop self loops, keep only
/// the minimum weight per direction of every node pair and merge the two
/// directions into one edge where the minima agree.
fn reduce_parallel_edges(sorted_edges: &[ContractedEdge]) -> Vec<ContractedEdge> {
    let mut merged: Vec<ContractedEdge> = Vec::with_capacity(sorted_edges.len());
    let mut i = 0;
    while i < sorted_edges.len() {
        let source = sorted_edges[i].source;
        let target = sorted_edges[i].target;
        if source == target {
            i += 1;
            continue;
        }

        let template = ContractorEdgeData {
            weight: INFINITY,
            original_edges: 1,
            shortcut: false,
            ..sorted_edges[i].data
        };
        let mut forward_edge = InputEdge {
            source,
            target,
            data: ContractorEdgeData {
                forward: true,
                backward: false,
                ..template
            },
        };
        let mut backward_edge = InputEdge {
            source,
            target,
            data: ContractorEdgeData {
                forward: false,
                backward: true,
                ..template
            },
        };

        while i < sorted_edges.len() && sorted_edges[i].source == source && sorted_edges[i].target == target {
            if sorted_edges[i].data.forward {
                forward_edge.data.weight = std::cmp::min(forward_edge.data.weight, sorted_edges[i].data.weight);
            }
            if sorted_edges[i].data.backward {
                backward_edge.data.weight = std::cmp::min(backward_edge.data.weight, sorted_edges[i].data.weight);
            }
            i += 1;
        }

        if forward_edge.data.weight == backward_edge.data.weight {
            if forward_edge.data.weight != INFINITY {
                forward_edge.data.backward = true;
                merged.push(forward_edge);
            }
        } else {
            if forward_edge.data.weight != INFINITY {
                merged.push(forward_edge);
            }
            if backward_edge.data.weight != INFINITY {
                merged.push(backward_edge);
            }
        }
    }
    merged
}

/// Simulate contracting `node` and derive its priority from the edge
/// difference, the original edge counts and the depth term.
fn evaluate(graph: &ContractorGraph, worker: &mut WorkerContext, config: &ContractorConfig, depth: i32, node: NodeId) -> f64 {
    let mut stats = ContractionStats::default();
    contract(graph, worker, config, node, Some(&mut stats));

    let result = if stats.edges_deleted == 0 || stats.original_edges_deleted == 0 {
        f64::from(depth)
    } else {
        2. * (f64::from(stats.edges_added) / f64::from(stats.edges_deleted))
            + 4. * (f64::from(stats.original_edges_added) / f64::from(stats.original_edges_deleted))
            + f64::from(depth)
    };
    debug_assert!(result >= 0.);
    result
}

/// Contract one node: for every incoming edge, check via a bounded witness
/// search which outgoing edges still need a shortcut, and either count them
/// (simulation) or append them to the worker buffer.
fn contract(
    graph: &ContractorGraph,
    worker: &mut WorkerContext,
    config: &ContractorConfig,
    node: NodeId,
    mut stats: Option<&mut ContractionStats>,
) {
    let WorkerContext {
        heap, inserted_edges, ..
    } = worker;
    let simulate = stats.is_some();
    let buffer_start = inserted_edges.len();

    for in_edge in graph.neighbor_edge_indices(node) {
        let in_data = *graph.edge_data(in_edge);
        let source = graph.target(in_edge);
        if let Some(stats) = stats.as_deref_mut() {
            stats.edges_deleted += 1;
            stats.original_edges_deleted += in_data.original_edges as i32;
        }
        if !in_data.backward {
            continue;
        }

        heap.clear();
        heap.push(source, 0, WitnessHeapData::default());
        if node != source {
            heap.push(node, in_data.weight, WitnessHeapData::default());
        }
        let mut max_distance = 0;
        let mut num_targets = 0;

        for out_edge in graph.neighbor_edge_indices(node) {
            let out_data = graph.edge_data(out_edge);
            if !out_data.forward {
                continue;
            }
            let target = graph.target(out_edge);
            let path_distance = in_data.weight + out_data.weight;
            max_distance = std::cmp::max(max_distance, path_distance);
            if !heap.was_inserted(target) {
                heap.push(target, path_distance, WitnessHeapData { hop: 0, target: true });
                num_targets += 1;
            } else if path_distance < heap.key(target) {
                heap.decrease_key(target, path_distance);
            }
        }

        let settle_limit = if simulate { SIMULATION_SETTLE_LIMIT } else { CONTRACTION_SETTLE_LIMIT };
        witness_search(graph, heap, max_distance, num_targets, settle_limit, config.hop_limit);

        for out_edge in graph.neighbor_edge_indices(node) {
            let out_data = graph.edge_data(out_edge);
            if !out_data.forward {
                continue;
            }
            let target = graph.target(out_edge);
            let path_distance = in_data.weight + out_data.weight;
            if path_distance <= heap.key(target) {
                if let Some(stats) = stats.as_deref_mut() {
                    stats.edges_added += 2;
                    stats.original_edges_added += 2 * (out_data.original_edges + in_data.original_edges) as i32;
                } else {
                    let shortcut_data = ContractorEdgeData {
                        weight: path_distance,
                        original_edges: out_data.original_edges + in_data.original_edges,
                        via: node,
                        name_id: 0,
                        turn_instruction: in_data.turn_instruction,
                        shortcut: true,
                        forward: true,
                        backward: false,
                        original_via_node_id: false,
                    };
                    inserted_edges.push(InputEdge {
                        source,
                        target,
                        data: shortcut_data,
                    });
                    inserted_edges.push(InputEdge {
                        source: target,
                        target: source,
                        data: ContractorEdgeData {
                            forward: false,
                            backward: true,
                            ..shortcut_data
                        },
                    });
                }
            }
        }
    }

    if !simulate {
        // a shortcut pair discovered from both sides shows up twice in the
        // buffer, merge the direction bits into the later copy
        let mut write = buffer_start;
        for i in buffer_start..inserted_edges.len() {
            let current = inserted_edges[i];
            let mut found = false;
            for other in inserted_edges.iter_mut().skip(i + 1) {
                if other.source == current.source
                    && other.target == current.target
                    && other.data.weight == current.data.weight
                    && other.data.shortcut == current.data.shortcut
                {
                    other.data.forward |= current.data.forward;
                    other.data.backward |= current.data.backward;
                    found = true;
                    break;
                }
            }
            if !found {
                inserted_edges[write] = current;
                write += 1;
            }
        }
        inserted_edges.truncate(write);
    }
}

/// The bounded Dijkstra of the witness test. Stops once `max_nodes` nodes
/// were settled, the smallest key exceeds `max_distance` or all targets were
/// seen; returns the reason implicitly via the final heap keys.
fn witness_search(
    graph: &ContractorGraph,
    heap: &mut AddressableMinHeap<WitnessHeapData>,
    max_distance: Weight,
    num_targets: usize,
    max_nodes: usize,
    hop_limit: u32,
) {
    let mut settled = 0;
    let mut targets_found = 0;

    while let Some(node) = heap.pop() {
        let distance = heap.key(node);
        let current_hop = heap.data(node).hop + 1;

        settled += 1;
        if settled > max_nodes {
            return;
        }
        if distance > max_distance {
            return;
        }
        if heap.data(node).target {
            targets_found += 1;
            if targets_found >= num_targets {
                return;
            }
        }
        if current_hop >= hop_limit {
            continue;
        }

        for edge in graph.neighbor_edge_indices(node) {
            let data = graph.edge_data(edge);
            if !data.forward {
                continue;
            }
            let to = graph.target(edge);
            let to_distance = distance + data.weight;

            if !heap.was_inserted(to) {
                heap.push(to, to_distance, WitnessHeapData { hop: current_hop, target: false });
            } else if to_distance < heap.key(to) {
                heap.decrease_key(to, to_distance);
                heap.data_mut(to).hop = current_hop;
            }
        }
    }
}

/// A node may be contracted this round iff no node within two hops has a
/// smaller priority, with the random bias breaking ties.
fn is_independent(
    graph: &ContractorGraph,
    priorities: &[f64],
    node_data: &[NodePriorityData],
    worker: &mut WorkerContext,
    node: NodeId,
) -> bool {
    let priority = priorities[node as usize];
    let neighbours = &mut worker.neighbours;
    neighbours.clear();

    for edge in graph.neighbor_edge_indices(node) {
        let target = graph.target(edge);
        let target_priority = priorities[target as usize];
        debug_assert!(target_priority >= 0.);
        if priority > target_priority {
            return false;
        }
        if priority == target_priority && node_data[node as usize].bias < node_data[target as usize].bias {
            return false;
        }
        neighbours.push(target);
    }

    neighbours.sort_unstable();
    neighbours.dedup();

    for &u in neighbours.iter() {
        for edge in graph.neighbor_edge_indices(u) {
            let target = graph.target(edge);
            let target_priority = priorities[target as usize];
            debug_assert!(target_priority >= 0.);
            if priority > target_priority {
                return false;
            }
            if priority == target_priority && node_data[node as usize].bias < node_data[target as usize].bias {
                return false;
            }
        }
    }

    true
}

/// Remove the edges pointing at a freshly contracted node. Its own adjacency
/// stays untouched, those edges are the node's slice of the hierarchy.
fn delete_incoming_edges(graph: &mut ContractorGraph, worker: &mut WorkerContext, node: NodeId) {
    let neighbours = &mut worker.neighbours;
    neighbours.clear();

    for edge in graph.neighbor_edge_indices(node) {
        let target = graph.target(edge);
        if target != node {
            neighbours.push(target);
        }
    }
    neighbours.sort_unstable();
    neighbours.dedup();

    for &u in neighbours.iter() {
        graph.delete_edges_to(u, node);
    }
}

/// After contracting `node`, lift the depth of its surviving neighbors and
/// recompute their priorities.
fn update_neighbours(
    graph: &ContractorGraph,
    priorities: SyncPtr<f64>,
    node_data: SyncPtr<NodePriorityData>,
    worker: &mut WorkerContext,
    config: &ContractorConfig,
    node: NodeId,
) {
    worker.neighbours.clear();
    let node_depth = unsafe { (*node_data.0.add(node as usize)).depth };

    for edge in graph.neighbor_edge_indices(node) {
        let u = graph.target(edge);
        if u == node {
            continue;
        }
        worker.neighbours.push(u);
        unsafe {
            let depth = &mut (*node_data.0.add(u as usize)).depth;
            *depth = (*depth).max(node_depth + 1);
        }
    }
    worker.neighbours.sort_unstable();
    worker.neighbours.dedup();

    let neighbours = std::mem::take(&mut worker.neighbours);
    for &u in &neighbours {
        let depth = unsafe { (*node_data.0.add(u as usize)).depth };
        let priority = evaluate(graph, worker, config, depth, u);
        unsafe {
            *priorities.0.add(u as usize) = priority;
        }
    }
    worker.neighbours = neighbours;
}

fn write_spill_record(writer: &mut impl Write, source: NodeId, target: NodeId, data: &ContractorEdgeData) -> std::io::Result<()> {
    writer.write_all(&source.to_le_bytes())?;
    writer.write_all(&target.to_le_bytes())?;
    writer.write_all(&data.weight.to_le_bytes())?;
    writer.write_all(&data.original_edges.to_le_bytes())?;
    writer.write_all(&data.via.to_le_bytes())?;
    writer.write_all(&data.name_id.to_le_bytes())?;
    let flags = data.shortcut as u8 | (data.forward as u8) << 1 | (data.backward as u8) << 2 | (data.original_via_node_id as u8) << 3;
    writer.write_all(&[data.turn_instruction as u8, flags])
}

fn read_spill_record(reader: &mut impl Read) -> std::io::Result<(NodeId, NodeId, ContractorEdgeData)> {
    let mut words = [0u8; 24];
    reader.read_exact(&mut words)?;
    let word = |i: usize| u32::from_le_bytes(words[4 * i..4 * i + 4].try_into().unwrap());
    let mut tail = [0u8; 2];
    reader.read_exact(&mut tail)?;
    let turn_instruction = TurnInstruction::from_wire(tail[0])
        .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidData, "unknown turn instruction"))?;
    let flags = tail[1];

    Ok((
        word(0),
        word(1),
        ContractorEdgeData {
            weight: word(2),
            original_edges: word(3),
            via: word(4),
            name_id: word(5),
            turn_instruction,
            shortcut: flags & 1 != 0,
            forward: flags & 2 != 0,
            backward: flags & 4 != 0,
            original_via_node_id: flags & 8 != 0,
        },
    ))
}
