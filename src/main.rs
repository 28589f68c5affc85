use anyhow::Result;
use clap::Parser;
use irclog::app::{self, RunStats};
use irclog::config::RunConfig;
use irclog::logging;
use std::io;
use std::time::Instant;

fn main() -> Result<()> {
    let config = RunConfig::parse();
    logging::init_logging(config.log_json);

    let start_time = Instant::now();
    let stats = app::run(&config, &mut io::stdout().lock())?;

    if config.benchmark {
        print_benchmark_results(&stats, start_time.elapsed());
    }

    Ok(())
}

fn print_benchmark_results(stats: &RunStats, duration: std::time::Duration) {
    let secs = duration.as_secs_f64();
    let size_mb = stats.bytes as f64 / (1024.0 * 1024.0);

    eprintln!("\n=== BENCHMARK RESULTS ===");
    eprintln!("Log size: {:.2} MB, {} lines", size_mb, stats.total_lines);
    eprintln!(
        "Messages: {} from {} users over {} timestamps",
        stats.records, stats.users, stats.timestamps
    );
    eprintln!("Processing time: {:.3}s", secs);
    eprintln!("Throughput: {:.2} MB/s", size_mb / secs);
    if stats.total_lines > 0 {
        eprintln!(
            "Message lines: {:.1}%",
            (stats.records as f64 / stats.total_lines as f64) * 100.0
        );
    }
}
