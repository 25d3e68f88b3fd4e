use anyhow::{Context, Result};
use clap::{Arg, ArgMatches, Command};
use dotenv::dotenv;
use neuronet::{CsrGraph, GraphBuilder, NodeId, SparseGraph};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn node_arg() -> Arg {
    Arg::new("node")
        .long("node")
        .short('n')
        .required(true)
        .allow_negative_numbers(true)
        .value_parser(clap::value_parser!(NodeId))
        .help("External node id")
}

fn depth_arg() -> Arg {
    Arg::new("depth")
        .long("depth")
        .short('d')
        .default_value("2")
        .value_parser(clap::value_parser!(u32))
        .help("Maximum BFS depth")
}

fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "neuronet=info,neuronet_cli=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let matches = Command::new("NeuroNet")
        .about("Load a sparse directed graph and query it")
        .arg(
            Arg::new("input")
                .long("input")
                .short('i')
                .global(true)
                .value_parser(clap::value_parser!(PathBuf))
                .help("Edge list file (text, or .parquet). Defaults to $NEURONET_EDGES"),
        )
        .subcommand(Command::new("stats").about("Print node/edge counts, memory and the max-degree node"))
        .subcommand(
            Command::new("neighbors")
                .about("List the out-neighbors of a node")
                .arg(node_arg()),
        )
        .subcommand(
            Command::new("degree")
                .about("Print the out-degree of a node")
                .arg(node_arg()),
        )
        .subcommand(
            Command::new("bfs")
                .about("Breadth-first search up to a maximum depth")
                .arg(node_arg())
                .arg(depth_arg()),
        )
        .subcommand(Command::new("max-degree").about("Print the node with the greatest out-degree"))
        .subcommand(
            Command::new("edges")
                .about("List stored (deduplicated) edges")
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .short('l')
                        .value_parser(clap::value_parser!(usize))
                        .help("Print at most this many edges"),
                ),
        )
        .subcommand(
            Command::new("subgraph")
                .about("List edges among the nodes reached by a bounded BFS")
                .arg(node_arg())
                .arg(depth_arg()),
        )
        .get_matches();

    let input = input_path(&matches);
    let graph = load_graph(&input)?;

    match matches.subcommand() {
        Some(("stats", _)) => println!("{}", graph.stats()),
        Some(("neighbors", sub_m)) => handle_neighbors(&graph, sub_m),
        Some(("degree", sub_m)) => handle_degree(&graph, sub_m),
        Some(("bfs", sub_m)) => handle_bfs(&graph, sub_m),
        Some(("max-degree", _)) => handle_max_degree(&graph),
        Some(("edges", sub_m)) => handle_edges(&graph, sub_m),
        Some(("subgraph", sub_m)) => handle_subgraph(&graph, sub_m),
        _ => println!("No valid subcommand provided. Use --help for usage."),
    }

    Ok(())
}

fn input_path(matches: &ArgMatches) -> PathBuf {
    let from_subcommand = matches
        .subcommand()
        .and_then(|(_, sub_m)| sub_m.get_one::<PathBuf>("input"));
    match from_subcommand.or_else(|| matches.get_one::<PathBuf>("input")) {
        Some(path) => path.clone(),
        None => std::env::var("NEURONET_EDGES")
            .unwrap_or_else(|_| "data/edges.txt".to_string())
            .into(),
    }
}

fn load_graph(path: &Path) -> Result<CsrGraph> {
    let is_parquet = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));
    let graph = if is_parquet {
        GraphBuilder::from_parquet(path)
    } else {
        GraphBuilder::from_path(path)
    };
    graph.with_context(|| format!("could not load graph from {}", path.display()))
}

fn node(matches: &ArgMatches) -> NodeId {
    // Required argument with a value parser; clap rejects the call otherwise.
    matches.get_one::<NodeId>("node").copied().unwrap_or_default()
}

fn depth(matches: &ArgMatches) -> u32 {
    matches.get_one::<u32>("depth").copied().unwrap_or(2)
}

fn handle_neighbors<G: SparseGraph>(graph: &G, matches: &ArgMatches) {
    let node = node(matches);
    let neighbors = graph.neighbors(node);
    println!("Found {} neighbors for node {}.", neighbors.len(), node);
    for id in neighbors {
        println!(" - {}", id);
    }
}

fn handle_degree<G: SparseGraph>(graph: &G, matches: &ArgMatches) {
    let node = node(matches);
    println!("Degree of node {}: {}", node, graph.degree(node));
}

fn handle_bfs<G: SparseGraph>(graph: &G, matches: &ArgMatches) {
    let node = node(matches);
    let depth = depth(matches);
    let found = graph.bounded_bfs(node, depth);
    if found.is_empty() {
        println!("Node {} does not exist in the graph.", node);
        return;
    }
    println!(
        "Found {} nodes from node {} (depth {}).",
        found.len(),
        node,
        depth
    );
    for (id, distance) in found {
        println!(" - {} (distance {})", id, distance);
    }
}

fn handle_max_degree<G: SparseGraph>(graph: &G) {
    let (node, degree) = graph.max_degree_node();
    println!("Max degree node: {} (degree {})", node, degree);
}

fn handle_edges(graph: &CsrGraph, matches: &ArgMatches) {
    let edges = graph.all_edges();
    let limit = matches
        .get_one::<usize>("limit")
        .copied()
        .unwrap_or(edges.len());
    println!("{} stored edges.", edges.len());
    for (origin, destination) in edges.into_iter().take(limit) {
        println!("{} {}", origin, destination);
    }
}

fn handle_subgraph(graph: &CsrGraph, matches: &ArgMatches) {
    let node = node(matches);
    let depth = depth(matches);
    let edges = graph.bfs_subgraph_edges(node, depth);
    println!(
        "Found {} edges around node {} (depth {}).",
        edges.len(),
        node,
        depth
    );
    for (origin, destination) in edges {
        println!("{} {}", origin, destination);
    }
}
