use ch_routing_engine::{
    algo::contraction::{query::Server as ChServer, ContractedEdge, Contractor, ContractorConfig, ContractorEdgeData},
    algo::dijkstra::Server as DijkstraServer,
    algo::edge_based_graph::*,
    datastr::graph::*,
    geo::Coordinate,
};

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

fn plain_graph(num_nodes: usize, edges: &[EdgeBasedEdge]) -> StaticGraph<ContractorEdgeData> {
    let input = edges
        .iter()
        .flat_map(|edge| {
            let data = ContractorEdgeData {
                weight: edge.weight,
                original_edges: 1,
                via: edge.via,
                name_id: edge.name_id,
                turn_instruction: edge.turn_instruction,
                shortcut: false,
                forward: edge.forward,
                backward: edge.backward,
                original_via_node_id: false,
            };
            [
                InputEdge {
                    source: edge.source,
                    target: edge.target,
                    data,
                },
                InputEdge {
                    source: edge.target,
                    target: edge.source,
                    data: ContractorEdgeData {
                        forward: edge.backward,
                        backward: edge.forward,
                        ..data
                    },
                },
            ]
        })
        .collect();
    StaticGraph::from_edges(num_nodes, input)
}

fn contracted(num_nodes: usize, edges: &[EdgeBasedEdge]) -> Vec<ContractedEdge> {
    let mut contractor = Contractor::new(num_nodes, edges).unwrap();
    contractor.run().unwrap();
    contractor.take_edges().unwrap()
}

#[test]
fn triangle_query_through_the_full_pipeline() {
    let edges = [bidirectional(0, 1, 3), bidirectional(1, 2, 4), bidirectional(0, 2, 10)];
    let mut server = ChServer::new(3, contracted(3, &edges));

    assert_eq!(server.distance(0, 2).unwrap(), Some(7));
    assert_eq!(server.path(), vec![0, 1, 2]);
}

#[test]
fn ch_distances_match_plain_dijkstra_on_a_grid() {
    // a 6x6 grid with uneven but deterministic weights
    let side = 6u32;
    let mut edges = Vec::new();
    for i in 0..side {
        for j in 0..side {
            let node = i * side + j;
            if j + 1 < side {
                edges.push(bidirectional(node, node + 1, 1 + (7 * i + 13 * j) % 10));
            }
            if i + 1 < side {
                edges.push(bidirectional(node, node + side, 1 + (3 * i + 5 * j) % 10));
            }
        }
    }
    let num_nodes = (side * side) as usize;

    let mut ch_server = ChServer::new(num_nodes, contracted(num_nodes, &edges));
    let mut dijkstra_server = DijkstraServer::new(plain_graph(num_nodes, &edges));

    for from in 0..num_nodes as NodeId {
        for to in (0..num_nodes as NodeId).step_by(5) {
            assert_eq!(
                ch_server.distance(from, to).unwrap(),
                dijkstra_server.distance(from, to),
                "distances disagree for {} -> {}",
                from,
                to
            );
        }
    }
}

#[test]
fn compaction_does_not_change_query_results() {
    let mut edges = Vec::new();
    for i in 0..49 {
        edges.push(bidirectional(i, i + 1, 1 + i % 7));
    }
    edges.push(bidirectional(10, 30, 3));
    edges.push(bidirectional(5, 45, 40));

    let mut with_flush = Contractor::with_config(
        50,
        &edges,
        ContractorConfig {
            flush_threshold: 0.3,
            ..Default::default()
        },
    )
    .unwrap();
    with_flush.run().unwrap();
    let mut flushed_server = ChServer::new(50, with_flush.take_edges().unwrap());

    let mut dijkstra_server = DijkstraServer::new(plain_graph(50, &edges));

    for from in (0..50).step_by(3) {
        for to in (0..50).step_by(7) {
            assert_eq!(flushed_server.distance(from, to).unwrap(), dijkstra_server.distance(from, to));
        }
    }
}

#[test]
fn turn_restrictions_shape_the_edge_based_graph() {
    // node based: a -> b with b -> c and b -> d, where an only restriction
    // (a, b, c) forces the turn towards c
    let coords = vec![
        Coordinate::from_degrees(49., 8.),
        Coordinate::from_degrees(49., 8.001),
        Coordinate::from_degrees(49., 8.002),
        Coordinate::from_degrees(49.001, 8.001),
    ];
    let one_way = |source, target| NodeBasedEdge {
        source,
        target,
        weight: 100,
        forward: true,
        backward: false,
        name_id: target,
        road_type: 3,
        roundabout: false,
    };
    let edges = [one_way(0, 1), one_way(1, 2), one_way(1, 3)];
    let restriction = TurnRestriction {
        from_node: 0,
        via_node: 1,
        to_node: 2,
        is_only: true,
    };

    let mut factory = EdgeBasedGraphFactory::new(4, &edges, vec![restriction], coords).unwrap();
    factory.run();
    let num_edge_based_nodes = factory.num_nodes();
    let (_, edge_based_edges) = factory.into_parts();

    // one way edges expand to one edge based node each, in input order
    assert_eq!(num_edge_based_nodes, 3);
    assert!(edge_based_edges.iter().any(|e| e.source == 0 && e.target == 1));
    assert!(!edge_based_edges.iter().any(|e| e.source == 0 && e.target == 2));

    // after contraction, queries confirm: a->b reaches b->c but not b->d
    let mut server = ChServer::new(num_edge_based_nodes, contracted(num_edge_based_nodes, &edge_based_edges));
    assert!(server.distance(0, 1).unwrap().is_some());
    assert_eq!(server.distance(0, 2).unwrap(), None);
}

#[test]
fn turn_costs_flow_into_query_weights() {
    // a straight through turn is free, so the query weight is exactly the
    // weight of the traversed edge based node
    let coords = vec![
        Coordinate::from_degrees(49., 8.),
        Coordinate::from_degrees(49., 8.001),
        Coordinate::from_degrees(49., 8.002),
    ];
    let one_way = |source, target| NodeBasedEdge {
        source,
        target,
        weight: 100,
        forward: true,
        backward: false,
        name_id: 7,
        road_type: 3,
        roundabout: false,
    };
    let mut factory = EdgeBasedGraphFactory::new(3, &[one_way(0, 1), one_way(1, 2)], Vec::new(), coords).unwrap();
    factory.run();
    let num_edge_based_nodes = factory.num_nodes();
    let (_, edge_based_edges) = factory.into_parts();

    assert_eq!(edge_based_edges.len(), 1);
    assert_eq!(edge_based_edges[0].weight, 100);
    assert_eq!(edge_based_edges[0].turn_instruction, TurnInstruction::NoTurn);

    let mut server = ChServer::new(num_edge_based_nodes, contracted(num_edge_based_nodes, &edge_based_edges));
    assert_eq!(server.distance(0, 1).unwrap(), Some(100));
}

#[test]
fn contracted_blob_matches_the_edge_list() {
    let mut edges = Vec::new();
    for i in 0..39 {
        edges.push(bidirectional(i, i + 1, 1 + i % 5));
    }
    edges.push(bidirectional(3, 20, 2));

    let mut contractor = Contractor::with_config(
        40,
        &edges,
        ContractorConfig {
            flush_threshold: 0.5,
            ..Default::default()
        },
    )
    .unwrap();
    contractor.run().unwrap();

    let mut blob = Vec::new();
    contractor.write_graph(&mut blob).unwrap();
    let edges = contractor.take_edges().unwrap();

    // parse the blob back: node count, then per node the degree and its
    // records, then the count prefixed spilled edges
    let word = |offset: usize| u32::from_le_bytes(blob[offset..offset + 4].try_into().unwrap());
    let mut offset = 0;
    let num_nodes = word(offset) as usize;
    offset += 4;
    let mut surviving_records = 0;
    for _ in 0..num_nodes {
        let degree = word(offset) as usize;
        offset += 4;
        for _ in 0..degree {
            let target = word(offset);
            assert!((target as usize) < 40, "blob target must be in the original id space");
            // target, weight, via, name id and the four flag bytes
            offset += 16 + 4;
            surviving_records += 1;
        }
    }
    let spilled = word(offset) as usize;
    offset += 4;
    // source, target, weight, original edges, via, name id, instruction, flags
    offset += spilled * 26;

    assert_eq!(offset, blob.len());
    assert_eq!(surviving_records + spilled, edges.len());
}
