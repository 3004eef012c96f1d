//! Runs a synthetic profiled workload or pretty-prints a saved report.
//!
//! Run with: cargo run --release --bin regionprof -- demo --out profile.json
//! Or:       cargo run --release --bin regionprof -- show profile.json

use std::error::Error;
use std::hint::black_box;
use std::path::PathBuf;
use std::thread;

use clap::{Args, Parser, Subcommand};
use region_profiler::report::log_summary;
use region_profiler::{read_report, try_dump, ProfileConfig, ProfileEntry, Profiler};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "regionprof",
    version,
    about = "Region profiler demo workload and report viewer",
    disable_help_subcommand = true
)]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "REGION_PROFILE_CONFIG",
        help = "TOML profiler config (output, summary_top)"
    )]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Profile a synthetic multi-threaded workload and write the report")]
    Demo(DemoArgs),
    #[command(about = "Print a CSV or JSON report sorted by total time")]
    Show(ShowArgs),
}

#[derive(Args, Debug)]
struct DemoArgs {
    #[arg(long, default_value_t = 4, help = "Worker threads")]
    threads: usize,

    #[arg(long, default_value_t = 1000, help = "Iterations per thread")]
    iterations: u64,

    #[arg(long, default_value_t = 4096, help = "Bytes reported per iteration")]
    bytes: u64,

    #[arg(long, help = "Report path (.json for JSON, anything else CSV)")]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ShowArgs {
    #[arg(help = "Report produced by `demo` or a profiled host")]
    path: PathBuf,

    #[arg(long, help = "Only print the N most expensive regions")]
    top: Option<usize>,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let config = match cli.config.as_ref() {
        Some(path) => ProfileConfig::load(path)?.with_env(),
        None => ProfileConfig::from_env(),
    };

    match cli.command {
        Command::Demo(args) => run_demo(&args, &config),
        Command::Show(args) => run_show(&args),
    }
}

fn run_demo(args: &DemoArgs, config: &ProfileConfig) -> Result<(), Box<dyn Error>> {
    let out = args
        .out
        .clone()
        .or_else(|| config.output.clone())
        .ok_or("no report path: pass --out, set REGION_PROFILE_OUT, or set `output` in the config")?;
    if args.threads == 0 {
        return Err("--threads must be at least 1".into());
    }

    info!(
        threads = args.threads,
        iterations = args.iterations,
        "running demo workload"
    );
    let profiler = Profiler::new();
    thread::scope(|s| {
        for worker in 0..args.threads {
            let profiler = &profiler;
            s.spawn(move || demo_worker(profiler, worker, args.iterations, args.bytes));
        }
    });

    let entries = profiler.entries();
    log_summary(&entries, config.summary_top);
    let written = try_dump(&entries, &out)?;
    println!(
        "profile with {} regions written to {}",
        entries.len(),
        written.display()
    );
    Ok(())
}

fn demo_worker(profiler: &Profiler, worker: usize, iterations: u64, bytes: u64) {
    let _thread = profiler.scope("demo.worker");
    for i in 0..iterations {
        let _outer = profiler.scope("demo.iteration");
        {
            let _kernel = profiler.scope("demo.kernel");
            black_box(kernel(worker as u64 + i));
        }
        profiler.start("demo.io");
        black_box(checksum(bytes));
        profiler.stop("demo.io");
        profiler.add_bytes("demo.io", bytes);
    }
}

fn kernel(seed: u64) -> f64 {
    (1..=256u64).map(|k| ((seed + k) as f64).sqrt()).sum()
}

fn checksum(bytes: u64) -> u64 {
    (0..bytes).fold(0u64, |acc, b| acc.rotate_left(5) ^ b)
}

fn run_show(args: &ShowArgs) -> Result<(), Box<dyn Error>> {
    let entries = read_report(&args.path)?;
    let shown = args.top.unwrap_or(entries.len()).min(entries.len());
    print_table(&entries[..shown]);
    if shown < entries.len() {
        println!("... {} more regions", entries.len() - shown);
    }
    Ok(())
}

fn print_table(entries: &[ProfileEntry]) {
    let name_width = entries
        .iter()
        .map(|e| e.name.len())
        .max()
        .unwrap_or(0)
        .max("region".len());
    println!(
        "{:<name_width$}  {:>10}  {:>14}  {:>14}  {:>14}  {:>10}",
        "region", "calls", "total_s", "avg_s", "bytes", "MiB/s"
    );
    for entry in entries {
        let rate = entry
            .throughput()
            .map(|bps| format!("{:.2}", bps / (1024.0 * 1024.0)))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<name_width$}  {:>10}  {:>14.6}  {:>14.6}  {:>14}  {:>10}",
            entry.name,
            entry.calls,
            entry.total_seconds,
            entry.avg_seconds(),
            entry.total_bytes,
            rate
        );
    }
}
