//! GMII loopback regression runner.
//!
//! Sends a configurable list of incrementing payloads through a source, an
//! optional register pipeline and a sink, then checks that every frame came
//! back intact and in order.
//!
//! ```text
//! gmii-sim --ifg 0 --pipeline 4
//! RUST_LOG=gmii_core=debug gmii-sim --min-len 64 --max-len 70 --extra 1514
//! ```

use std::process::ExitCode;

use clap::Parser;
use gmii_core::SourceConfig;
use gmii_harness::{
    ClockEnable, SimConfig,
    payloads::incrementing,
    scenario::{Scenario, all_of, exact_delivery, rx_times_increasing},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// GMII loopback regression runner
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Inter-frame gap in cycles (0 still leaves one idle cycle)
    #[arg(long, default_value_t = SourceConfig::default().ifg)]
    ifg: u32,

    /// Shortest payload in the length sweep
    #[arg(long, default_value_t = 64)]
    min_len: usize,

    /// Longest payload in the length sweep
    #[arg(long, default_value_t = 127)]
    max_len: usize,

    /// Extra payload lengths sent after the sweep
    #[arg(long, value_delimiter = ',', default_values_t = [512, 1514, 9214])]
    extra: Vec<usize>,

    /// Number of minimum-size (64 byte) payloads sent last
    #[arg(long = "repeat-64", default_value_t = 10)]
    repeat_64: usize,

    /// Register stages between source and sink
    #[arg(long, default_value_t = 0)]
    pipeline: usize,

    /// Pulse clock enable once every N cycles (10 for 100M, 100 for 10M)
    #[arg(long)]
    enable_every: Option<u32>,

    /// Clock period in picoseconds
    #[arg(long, default_value_t = SimConfig::default().clock_period_ps)]
    period_ps: u64,

    /// Give up after this many cycles
    #[arg(long, default_value_t = 10_000_000)]
    max_cycles: u64,

    /// Log every state change
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn payload_lengths(&self) -> Vec<usize> {
        (self.min_len..=self.max_len)
            .chain(self.extra.iter().copied())
            .chain(std::iter::repeat_n(64, self.repeat_64))
            .collect()
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    if args.min_len > args.max_len {
        error!(min_len = args.min_len, max_len = args.max_len, "empty length sweep");
        return ExitCode::FAILURE;
    }

    let lengths = args.payload_lengths();
    info!(
        frames = lengths.len(),
        ifg = args.ifg,
        pipeline = args.pipeline,
        enable_every = ?args.enable_every,
        "starting loopback run"
    );

    let clock_enable = args.enable_every.map_or(ClockEnable::Unwired, ClockEnable::EveryNth);
    let result = Scenario::new("gmii loopback")
        .ifg(args.ifg)
        .pipeline(args.pipeline)
        .clock_enable(clock_enable)
        .sim_config(SimConfig { clock_period_ps: args.period_ps })
        .max_cycles(args.max_cycles)
        .payloads(lengths.into_iter().map(incrementing))
        .oracle(all_of(vec![Box::new(exact_delivery), Box::new(rx_times_increasing)]))
        .run();

    match result {
        Ok(outcome) => {
            info!(
                sent = outcome.sent.len(),
                received = outcome.received.len(),
                cycles = outcome.cycles,
                "PASS"
            );
            ExitCode::SUCCESS
        },
        Err(reason) => {
            error!(%reason, "FAIL");
            ExitCode::FAILURE
        },
    }
}
