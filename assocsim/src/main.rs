use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::time::Instant;
use clap::Parser;
use log::debug;
use assoclib::config::{CacheConfig, IndexingMode};
use assoclib::io::{load_config, load_trace};
use assoclib::report::write_report;
use assoclib::simulator::{compare, run, SimulationRun};

#[cfg(debug_assertions)]
const DEBUG_DEFAULT: bool = true;

#[cfg(not(debug_assertions))]
const DEBUG_DEFAULT: bool = false;

#[derive(Parser, Debug)]
#[command(about = String::from("Set-associative cache simulator with lsb and adaptive index bit selection"))]
struct Args {
    config: String,
    trace: String,
    /// Where to write the report, stdout if omitted
    output: Option<String>,

    /// Overrides the indexing mode from the config file
    #[arg(short, long, value_enum)]
    mode: Option<IndexingMode>,

    #[arg(short, long)]
    json: bool,

    /// Runs both indexing modes and prints their miss counts
    #[arg(short, long)]
    compare: bool,

    #[arg(short, long)]
    performance: bool,

    #[arg(short, long, default_value_t = DEBUG_DEFAULT)]
    debug: bool,
}

fn main() -> Result<(), String> {
    let start = Instant::now();
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(if args.debug { "debug" } else { "warn" })).init();
    #[cfg(debug_assertions)]
    debug!("Running the debug binary, debug mode is enabled by default. If benchmarking, do not use this binary, re-compile with the --release argument when using cargo run");

    let mut config = load_config(&args.config).map_err(|e| e.to_string())?;
    if let Some(mode) = args.mode {
        config.indexing = mode;
    }
    debug!("Parsed input configuration: {config:?}");
    let trace = load_trace(&args.trace).map_err(|e| e.to_string())?;

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(File::create(path).map_err(|e| format!("Couldn't create the output file at path {path}: {e}"))?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let runs = if args.compare {
        let (lsb, adaptive) = compare(&config, &trace).map_err(|e| e.to_string())?;
        vec![lsb, adaptive]
    } else {
        vec![run(&config, &trace).map_err(|e| e.to_string())?]
    };

    if args.json {
        let json = if args.compare {
            serde_json::to_string_pretty(&runs)
        } else {
            serde_json::to_string_pretty(&runs[0])
        };
        writeln!(out, "{}", json.map_err(|e| format!("Couldn't serialise the output {e}"))?).map_err(|e| e.to_string())?;
    } else if args.compare {
        for r in &runs {
            writeln!(out, "{}: indexing bits {:?}, {} misses", r.mode.name(), r.assignment.index_bit_numbers(), r.result.misses).map_err(|e| e.to_string())?;
        }
    } else {
        write_report(&mut out, &runs[0]).map_err(|e| format!("Couldn't write the report: {e}"))?;
    }
    out.flush().map_err(|e| e.to_string())?;

    if args.debug {
        runs.iter().for_each(|r| log_residency(&config, r));
    }
    if args.performance {
        let end = Instant::now();
        let total_time = end - start;
        for r in &runs {
            println!("Simulation time ({}): {}s", r.mode.name(), r.simulation_time.as_nanos() as f64 / 1e9);
        }
        println!("Total execution time (includes initial parsing, configuration, and output): {}s", total_time.as_nanos() as f64 / 1e9)
    }
    Ok(())
}

fn log_residency(config: &CacheConfig, run: &SimulationRun) {
    let formatted = run.resident_counts
        .iter()
        .map(|(set, count)| format!("{set}: {count}"))
        .collect::<Vec<_>>()
        .join(", ");
    debug!("Resident tags by touched set ({}, associativity {}): ({formatted})", run.mode.name(), config.associativity);
    debug!("Total resident tags: {}", run.resident_counts.values().sum::<usize>())
}
