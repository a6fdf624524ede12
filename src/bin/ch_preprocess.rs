//! Preprocessing pipeline: reads a node based road graph and its turn
//! restrictions from flat binary vectors (one file per field), expands it
//! into the edge based graph, contracts that and writes the edge based node
//! and edge lists plus the contracted graph blob.

use std::{env, error::Error, fs::File, io::BufWriter, path::Path};

use ch_routing_engine::{
    algo::contraction::Contractor,
    algo::edge_based_graph::*,
    cli::CliErr,
    geo::{haversine_distance, Coordinate},
    io::*,
    report,
    report::*,
};

fn main() -> Result<(), Box<dyn Error>> {
    let _reporter = enable_reporting("ch_preprocess");
    env_logger::init();

    let mut args = env::args();
    args.next();
    let input = args.next().ok_or(CliErr("No input directory arg given"))?;
    let output = args.next().ok_or(CliErr("No output directory arg given"))?;
    let input = Path::new(&input);
    let output = Path::new(&output);

    let latitude = Vec::<i32>::load_from(input.join("latitude"))?;
    let longitude = Vec::<i32>::load_from(input.join("longitude"))?;
    let node_coords: Vec<Coordinate> = latitude
        .iter()
        .zip(longitude.iter())
        .map(|(&lat, &lon)| Coordinate { lat, lon })
        .collect();
    report!("num_nodes", node_coords.len());

    let edge_source = Vec::<u32>::load_from(input.join("edge_source"))?;
    let edge_target = Vec::<u32>::load_from(input.join("edge_target"))?;
    let edge_weight = Vec::<u32>::load_from(input.join("edge_weight"))?;
    let edge_forward = Vec::<u8>::load_from(input.join("edge_forward"))?;
    let edge_backward = Vec::<u8>::load_from(input.join("edge_backward"))?;
    let edge_name = Vec::<u32>::load_from(input.join("edge_name"))?;
    let edge_type = Vec::<i16>::load_from(input.join("edge_type"))?;
    let edge_roundabout = Vec::<u8>::load_from(input.join("edge_roundabout"))?;

    let input_edges: Vec<NodeBasedEdge> = (0..edge_source.len())
        .map(|i| NodeBasedEdge {
            source: edge_source[i],
            target: edge_target[i],
            weight: edge_weight[i],
            forward: edge_forward[i] != 0,
            backward: edge_backward[i] != 0,
            name_id: edge_name[i],
            road_type: edge_type[i],
            roundabout: edge_roundabout[i] != 0,
        })
        .collect();
    report!("num_node_based_edges", input_edges.len());
    let network_length_m: f64 = input_edges
        .iter()
        .map(|edge| haversine_distance(node_coords[edge.source as usize], node_coords[edge.target as usize]))
        .sum();
    report!("network_length_m", network_length_m);

    // restrictions come with their way references already resolved to the
    // entry and exit nodes
    let restriction_from = Vec::<u32>::load_from(input.join("restriction_from"))?;
    let restriction_via = Vec::<u32>::load_from(input.join("restriction_via"))?;
    let restriction_to = Vec::<u32>::load_from(input.join("restriction_to"))?;
    let restriction_only = Vec::<u8>::load_from(input.join("restriction_only"))?;
    let restrictions: Vec<TurnRestriction> = (0..restriction_from.len())
        .map(|i| TurnRestriction {
            from_node: restriction_from[i],
            via_node: restriction_via[i],
            to_node: restriction_to[i],
            is_only: restriction_only[i] != 0,
        })
        .collect();
    report!("num_restrictions", restrictions.len());

    let mut factory = EdgeBasedGraphFactory::new(node_coords.len(), &input_edges, restrictions, node_coords)?;
    report_time_with_key("edge expansion", "edge_expansion_running_time_ms", || factory.run());

    let num_edge_based_nodes = factory.num_nodes();
    let (edge_based_nodes, edge_based_edges) = factory.into_parts();
    report!("num_edge_based_nodes", num_edge_based_nodes);
    report!("num_edge_based_edges", edge_based_edges.len());

    write_edge_based_nodes(&edge_based_nodes, &mut BufWriter::new(File::create(output.join("edge_based_nodes"))?))?;
    write_edge_based_edges(&edge_based_edges, &mut BufWriter::new(File::create(output.join("edge_based_edges"))?))?;

    let mut contractor = Contractor::new(num_edge_based_nodes, &edge_based_edges)?;
    report_time_with_key("node contraction", "contraction_running_time_ms", || contractor.run())?;

    contractor.write_graph(&mut BufWriter::new(File::create(output.join("contracted_graph"))?))?;

    Ok(())
}
