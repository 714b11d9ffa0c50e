//! CLI driver: reads an edge list (and optional vertex-value file),
//! partitions it, and writes the final assignment.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::process;

use clap::{App, Arg};
use mimalloc::MiMalloc;

use lapart::config::{BroadcastSelector, Config, ConvergenceMode};
use lapart::coordinator::Coordinator;
use lapart::io::{build_graph, read_edges, read_vertex_values, write_assignments};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn parse_flag<T: std::str::FromStr>(matches: &clap::ArgMatches, name: &str, default: T) -> T {
    matches
        .value_of(name)
        .map(|s| {
            s.parse::<T>().unwrap_or_else(|_| {
                eprintln!("invalid value for --{name}: {s}");
                process::exit(2);
            })
        })
        .unwrap_or(default)
}

fn main() {
    let defaults = Config::default();
    let matches = App::new("lapart")
        .version("0.1.0")
        .about("Edge-balanced k-way graph partitioning via label propagation and per-vertex learning automata")
        .arg(Arg::with_name("edges").long("edges").takes_value(true).required(true)
            .help("edge list path: <srcId>SEP<dstId>[SEP<weight>] per line"))
        .arg(Arg::with_name("vertex-values").long("vertex-values").takes_value(true)
            .help("vertex-value path: <vertexId>[SEP<priorPartition>] per line"))
        .arg(Arg::with_name("output").long("output").takes_value(true)
            .help("partition-assignment output path (stdout if omitted)"))
        .arg(Arg::with_name("delim").long("delim").takes_value(true).default_value(" "))
        .arg(Arg::with_name("k").long("k").takes_value(true))
        .arg(Arg::with_name("repartition").long("repartition").takes_value(true))
        .arg(Arg::with_name("additional-capacity").long("additional-capacity").takes_value(true))
        .arg(Arg::with_name("lambda").long("lambda").takes_value(true))
        .arg(Arg::with_name("alpha").long("alpha").takes_value(true))
        .arg(Arg::with_name("beta").long("beta").takes_value(true))
        .arg(Arg::with_name("max-iterations").long("max-iterations").takes_value(true))
        .arg(Arg::with_name("convergence-threshold").long("convergence-threshold").takes_value(true))
        .arg(Arg::with_name("window-size").long("window-size").takes_value(true))
        .arg(Arg::with_name("edge-weight").long("edge-weight").takes_value(true))
        .arg(Arg::with_name("run-seed").long("run-seed").takes_value(true))
        .arg(Arg::with_name("always-run-to-max").long("always-run-to-max")
            .help("never halt early on convergence; run the full maxIterations (§9 open question 1)"))
        .arg(Arg::with_name("broadcast-la-sample").long("broadcast-la-sample")
            .help("broadcast the LA-sampled proposal instead of the argmax-score partition (§9 open question 3)"))
        .arg(Arg::with_name("threads").long("threads").takes_value(true).default_value("4"))
        .arg(Arg::with_name("verbose").short("v").long("verbose"))
        .get_matches();

    let config = Config {
        number_of_partitions: parse_flag(&matches, "k", defaults.number_of_partitions),
        repartition: parse_flag(&matches, "repartition", defaults.repartition),
        additional_capacity: parse_flag(&matches, "additional-capacity", defaults.additional_capacity),
        lambda: parse_flag(&matches, "lambda", defaults.lambda),
        alpha: parse_flag(&matches, "alpha", defaults.alpha),
        beta: parse_flag(&matches, "beta", defaults.beta),
        max_iterations: parse_flag(&matches, "max-iterations", defaults.max_iterations),
        convergence_threshold: parse_flag(&matches, "convergence-threshold", defaults.convergence_threshold),
        window_size: parse_flag(&matches, "window-size", defaults.window_size),
        edge_weight: parse_flag(&matches, "edge-weight", defaults.edge_weight),
        convergence_mode: if matches.is_present("always-run-to-max") {
            ConvergenceMode::AlwaysRunToMax
        } else {
            defaults.convergence_mode
        },
        broadcast_selector: if matches.is_present("broadcast-la-sample") {
            BroadcastSelector::LaSample
        } else {
            defaults.broadcast_selector
        },
        run_seed: parse_flag(&matches, "run-seed", defaults.run_seed),
        verbose: matches.is_present("verbose"),
    };

    if let Err(e) = config.validate() {
        eprintln!("configuration error: {e}");
        process::exit(2);
    }

    let edges = match File::open(matches.value_of("edges").unwrap()) {
        Ok(f) => match read_edges(BufReader::new(f), config.edge_weight) {
            Ok(edges) => edges,
            Err(e) => {
                eprintln!("failed to read edges: {e}");
                process::exit(1);
            }
        },
        Err(e) => {
            eprintln!("failed to open edge list: {e}");
            process::exit(1);
        }
    };

    let vertex_values = match matches.value_of("vertex-values") {
        Some(path) => match File::open(path).map(BufReader::new).and_then(|r| {
            read_vertex_values(r).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
        }) {
            Ok(values) => values,
            Err(e) => {
                eprintln!("failed to read vertex values: {e}");
                process::exit(1);
            }
        },
        None => Vec::new(),
    };

    let (graph, prior_partitions) = build_graph(&edges, &vertex_values);
    let threads: usize = parse_flag(&matches, "threads", 4usize);

    let mut coordinator = match Coordinator::new(graph, config, threads, prior_partitions) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("configuration error: {e}");
            process::exit(2);
        }
    };
    let counters = coordinator.run();
    println!("{}", serde_json::to_string(&counters).unwrap());

    let delim = matches.value_of("delim").unwrap_or(" ");
    let write_result = match matches.value_of("output") {
        Some(path) => File::create(path)
            .map(BufWriter::new)
            .and_then(|w| write_assignments(w, coordinator.graph(), coordinator.vertices(), delim)),
        None => write_assignments(io::stdout().lock(), coordinator.graph(), coordinator.vertices(), delim),
    };
    if let Err(e) = write_result {
        eprintln!("failed to write assignments: {e}");
        process::exit(1);
    }
}

