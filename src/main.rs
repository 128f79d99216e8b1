use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::filter::LevelFilter;

use geomerge::config::MergeConfig;
use geomerge::kernel::CuboidKernel;
use geomerge::merge::run;

/// Imprint overlapping solids and share their coincident boundaries.
#[derive(Parser)]
#[command(name = "geomerge")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Input container
    #[arg(name = "INPUT")]
    input: PathBuf,

    /// Output container, written only if the merge succeeds
    #[arg(name = "OUTPUT")]
    output: PathBuf,

    /// Fuzzy value, neighbour distance and relative volume tolerance
    #[arg(long, default_value_t = 1e-3)]
    tolerance: f64,

    /// Deadline for each intersection in milliseconds (0 = none)
    #[arg(long, default_value_t = 0)]
    pave_timeout_ms: u32,

    /// Fail instead of retrying a timed-out intersection without deadline
    #[arg(long)]
    no_retry_timeouts: bool,

    /// Check the input geometry before merging
    #[arg(long)]
    check_geometry: bool,

    /// Increase logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn log_level(&self) -> LevelFilter {
        match self.verbose {
            0 => LevelFilter::INFO,
            1 => LevelFilter::DEBUG,
            _ => LevelFilter::TRACE,
        }
    }

    fn config(&self) -> MergeConfig {
        MergeConfig {
            tolerance: self.tolerance,
            pave_timeout_ms: self.pave_timeout_ms,
            retry_timeouts: !self.no_retry_timeouts,
            check_geometry: self.check_geometry,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // WARN for dependencies, the chosen level for geomerge; RUST_LOG overrides.
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(LevelFilter::WARN.into())
        .add_directive(
            format!("geomerge={}", cli.log_level())
                .parse()
                .unwrap_or_default(),
        );
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match run(&CuboidKernel::new(), &cli.input, &cli.output, &cli.config()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err}");
            ExitCode::FAILURE
        }
    }
}
