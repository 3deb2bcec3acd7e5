use clap::{Parser, ValueEnum};
use env_logger::Env;
use log::debug;
use std::time::Duration;

use bb84::prelude::*;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum NoiseKind {
    BitFlip,
    Dephasing,
    Depolarizing,
    AmplitudeDamping,
}

impl NoiseKind {
    fn channel(self, level: f64) -> NoiseChannel {
        match self {
            NoiseKind::BitFlip => NoiseChannel::BitFlip { p: level },
            NoiseKind::Dephasing => NoiseChannel::Dephasing { p: level },
            NoiseKind::Depolarizing => NoiseChannel::Depolarizing { p: level },
            NoiseKind::AmplitudeDamping => NoiseChannel::AmplitudeDamping { gamma: level },
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "bb84")]
#[command(about = "Run one simulated BB84 key exchange between Alice and Bob")]
struct Args {
    /// Number of qubits Alice sends
    #[arg(short = 'n', long, default_value = "4")]
    length: usize,

    /// Seed for reproducible runs
    #[arg(short, long)]
    seed: Option<u64>,

    /// Shots per qubit (more than 1 needs --majority)
    #[arg(long, default_value = "1")]
    shots: u32,

    /// Reduce multi-shot histograms by majority vote
    #[arg(long)]
    majority: bool,

    /// Channel noise applied between Alice and Bob
    #[arg(long, value_enum)]
    noise: Option<NoiseKind>,

    /// Noise probability (γ for amplitude damping)
    #[arg(long, default_value = "0.05")]
    noise_level: f64,

    /// Resubmissions after a transient execution failure
    #[arg(long, default_value = "2")]
    retries: u32,

    /// Per-attempt execution timeout in milliseconds
    #[arg(long, default_value = "30000")]
    timeout_ms: u64,

    /// Print the combined circuit diagram
    #[arg(long)]
    circuit: bool,

    /// Log pipeline stages
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn config(&self) -> ProtocolConfig {
        let reduction = if self.majority {
            OutcomeReduction::Majority
        } else {
            OutcomeReduction::SingleShot
        };
        let mut config = ProtocolConfig::default()
            .with_length(self.length)
            .with_shots(self.shots, reduction)
            .with_retries(self.retries, Duration::from_millis(self.timeout_ms));
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if let Some(kind) = self.noise {
            config = config.with_noise(kind.channel(self.noise_level));
        }
        config
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    let config = args.config();
    debug!("{:?}", config);

    let mut protocol = Protocol::local(config)?;
    let record = protocol.run().await?;

    let report = record.report();
    let report = if args.circuit { report.with_circuit() } else { report };
    print!("{}", report);

    Ok(())
}
