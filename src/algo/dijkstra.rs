//! Basic variant of dijkstras algorithm over a direction flagged graph.
//!
//! One node is settled per step so callers can interleave searches or stop
//! early. Used as the reference query implementation; the contraction
//! hierarchy searches have their own, pruned loops.

use super::*;
use crate::datastr::index_heap::AddressableMinHeap;

#[derive(Debug)]
pub struct SteppedDijkstra<E> {
    graph: StaticGraph<E>,
    direction: Direction,
    // parent pointers ride along as heap payload
    queue: AddressableMinHeap<NodeId>,
    // the current query
    query: Option<Query>,
    // set once the algorithm finished, to the final result
    result: Option<Option<Weight>>,
}

impl<E: DirectedEdge> SteppedDijkstra<E> {
    pub fn new(graph: StaticGraph<E>) -> SteppedDijkstra<E> {
        Self::new_directed(graph, Direction::Forward)
    }

    pub fn new_directed(graph: StaticGraph<E>, direction: Direction) -> SteppedDijkstra<E> {
        let n = graph.num_nodes();
        SteppedDijkstra {
            graph,
            direction,
            queue: AddressableMinHeap::new(n),
            query: None,
            result: None,
        }
    }

    pub fn initialize_query(&mut self, query: Query) {
        let from = query.from;
        self.query = Some(query);
        self.result = None;
        self.queue.clear();
        self.queue.push(from, 0, from);
    }

    pub fn next_step(&mut self) -> QueryProgress {
        match self.result {
            Some(result) => QueryProgress::Done(result),
            None => self.settle_next_node(),
        }
    }

    fn settle_next_node(&mut self) -> QueryProgress {
        let to = self.query.expect("query was not initialized properly").to;

        if let Some(node) = self.queue.pop() {
            let distance = self.queue.key(node);

            if node == to {
                self.result = Some(Some(distance));
                return QueryProgress::Done(Some(distance));
            }

            for (head, data) in self.graph.link_iter(node) {
                if !self.direction.allows(data) {
                    continue;
                }
                let next_distance = distance + data.weight();

                if !self.queue.was_inserted(head) {
                    self.queue.push(head, next_distance, node);
                } else if next_distance < self.queue.key(head) {
                    self.queue.decrease_key(head, next_distance);
                    *self.queue.data_mut(head) = node;
                }
            }

            QueryProgress::Settled(State { distance, node })
        } else {
            self.result = Some(None);
            QueryProgress::Done(None)
        }
    }

    pub fn tentative_distance(&self, node: NodeId) -> Weight {
        if self.queue.was_inserted(node) {
            self.queue.key(node)
        } else {
            INFINITY
        }
    }

    pub fn predecessor(&self, node: NodeId) -> NodeId {
        *self.queue.data(node)
    }

    pub fn query(&self) -> Query {
        self.query.expect("query was not initialized properly")
    }

    pub fn graph(&self) -> &StaticGraph<E> {
        &self.graph
    }
}

/// A complete plain Dijkstra query server.
#[derive(Debug)]
pub struct Server<E> {
    dijkstra: SteppedDijkstra<E>,
}

impl<E: DirectedEdge> Server<E> {
    pub fn new(graph: StaticGraph<E>) -> Server<E> {
        Server {
            dijkstra: SteppedDijkstra::new(graph),
        }
    }

    pub fn distance(&mut self, from: NodeId, to: NodeId) -> Option<Weight> {
        self.dijkstra.initialize_query(Query { from, to });

        loop {
            match self.dijkstra.next_step() {
                QueryProgress::Settled(_) => (),
                QueryProgress::Done(result) => return result,
            }
        }
    }

    /// The node sequence of the last successful query, front to back.
    pub fn path(&self) -> Vec<NodeId> {
        let mut path = vec![self.dijkstra.query().to];

        while *path.last().unwrap() != self.dijkstra.query().from {
            path.push(self.dijkstra.predecessor(*path.last().unwrap()));
        }

        path.reverse();
        path
    }
}
