//! hotkv - scenario replay and workload driver

mod scenario;
mod workload;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::scenario::ScenarioKind;
use crate::workload::{Policy, WorkloadConfig};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay the reference scenarios and check every result
    Scenario {
        /// Which structure to exercise
        #[arg(value_enum, default_value_t = ScenarioKind::All)]
        kind: ScenarioKind,
    },

    /// Run a seeded random workload and report statistics
    Workload {
        /// Structure under test
        #[arg(short, long, value_enum, default_value_t = Policy::Lru)]
        policy: Policy,

        /// Cache capacity, or initial table capacity
        #[arg(short, long, default_value_t = 1000)]
        capacity: usize,

        /// Number of operations
        #[arg(short, long, default_value_t = 100_000)]
        ops: usize,

        /// Size of the key space
        #[arg(short, long, default_value_t = 5000)]
        keys: u64,

        /// Fraction of operations that are reads
        #[arg(long, default_value_t = 0.8)]
        read_ratio: f64,

        /// Fraction of writes that are deletes (tables only)
        #[arg(long, default_value_t = 0.2)]
        delete_ratio: f64,

        /// Fraction of reads and writes aimed at the hottest 20% of keys
        #[arg(long, default_value_t = 0.8)]
        hot_ratio: f64,

        /// RNG seed
        #[arg(short, long, default_value_t = 42)]
        seed: u64,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let args = Args::parse();
    info!("hotkv v{}", env!("CARGO_PKG_VERSION"));

    match args.command {
        Command::Scenario { kind } => scenario::run(kind),
        Command::Workload {
            policy,
            capacity,
            ops,
            keys,
            read_ratio,
            delete_ratio,
            hot_ratio,
            seed,
            json,
        } => {
            let config = WorkloadConfig {
                policy,
                capacity,
                ops,
                keys,
                read_ratio,
                delete_ratio,
                hot_ratio,
                seed,
            };
            let report = workload::run(&config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                report.print();
            }
            Ok(())
        }
    }
}
