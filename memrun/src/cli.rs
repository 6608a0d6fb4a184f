use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

fn parse_duration(input: &str) -> Result<Duration, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err("duration cannot be empty (expected e.g. 50ms, 1s, 2m)".to_string());
    }

    let number_end = s
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii_digit())
        .map_or(s.len(), |(idx, _)| idx);

    if number_end == 0 {
        return Err(format!("invalid duration '{s}' (expected e.g. 50ms, 1s, 2m)"));
    }

    let (number_str, unit_str) = s.split_at(number_end);
    let value: u64 = number_str
        .parse()
        .map_err(|_| format!("invalid duration '{s}' (expected e.g. 50ms, 1s, 2m)"))?;

    match unit_str.trim() {
        "ms" => Ok(Duration::from_millis(value)),
        "" | "s" => Ok(Duration::from_secs(value)),
        "m" => {
            let secs = value
                .checked_mul(60)
                .ok_or_else(|| format!("duration '{s}' is too large"))?;
            Ok(Duration::from_secs(secs))
        }
        _ => Err(format!("invalid duration '{s}' (expected e.g. 50ms, 1s, 2m)")),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ModeArg {
    /// Pick the real host automatically.
    Auto,
    /// Real process/system memory counters, file assets as load targets.
    System,
    /// Deterministic synthetic counters and loads.
    Sim,
}

#[derive(Debug, Parser)]
#[command(
    name = "memrun",
    author,
    version,
    about = "Load-cycle memory benchmark with per-run charts",
    long_about = "memrun drives repeated load cycles, samples memory counters on a fixed cadence through load and post-load stabilization, and writes per-run peak/steady aggregates, a CSV log and a chart PNG per run.\n\nA plan file lists the load targets and run parameters; CLI flags override values from the plan.",
    after_help = "Examples:\n  memrun run plan.yaml\n  memrun run plan.yaml --iterations 5 --sample-interval 25ms\n  memrun run plan.yaml --mode sim --stabilization 500ms"
)]
pub struct Cli {
    /// Logging verbosity (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run a benchmark plan
    #[command(
        long_about = "Run every target in the plan for the configured number of iterations, sequentially, writing results under <results-root>/BenchmarkResults/<timestamp>/."
    )]
    Run(RunArgs),

    /// Scaffold a starter plan file
    Init(InitArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Path to the plan (.yaml)
    pub plan: PathBuf,

    /// Override iterations per target (otherwise use the plan's, default=3)
    #[arg(long)]
    pub iterations: Option<u32>,

    /// Override the sampling cadence (e.g. 50ms, 1s)
    #[arg(long, value_parser = parse_duration)]
    pub sample_interval: Option<Duration>,

    /// Override the post-load stabilization window (e.g. 1s)
    #[arg(long, value_parser = parse_duration)]
    pub stabilization: Option<Duration>,

    /// Host platform (otherwise use the plan's, default=auto)
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Root directory for BenchmarkResults/ (defaults per platform)
    #[arg(long)]
    pub results_root: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Target directory to initialize (created if missing)
    #[arg(default_value = ".")]
    pub dir: PathBuf,

    /// Overwrite an existing plan file
    #[arg(long)]
    pub force: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_accepts_common_units() {
        assert_eq!(parse_duration("250ms"), Ok(Duration::from_millis(250)));
        assert_eq!(parse_duration("10s"), Ok(Duration::from_secs(10)));
        assert_eq!(parse_duration("2m"), Ok(Duration::from_secs(120)));
        assert_eq!(parse_duration("5"), Ok(Duration::from_secs(5)));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("10x").is_err());
        assert!(parse_duration("ms").is_err());
    }

    #[test]
    fn cli_parses_run_with_overrides() {
        let parsed = Cli::try_parse_from([
            "memrun",
            "run",
            "plan.yaml",
            "--iterations",
            "5",
            "--sample-interval",
            "25ms",
            "--stabilization",
            "1s",
            "--mode",
            "sim",
        ]);

        let cli = match parsed {
            Ok(v) => v,
            Err(err) => panic!("failed to parse args: {err}"),
        };

        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.plan, PathBuf::from("plan.yaml"));
                assert_eq!(args.iterations, Some(5));
                assert_eq!(args.sample_interval, Some(Duration::from_millis(25)));
                assert_eq!(args.stabilization, Some(Duration::from_secs(1)));
                assert_eq!(args.mode, Some(ModeArg::Sim));
                assert_eq!(args.results_root, None);
            }
            Command::Init(_) => panic!("expected run command"),
        }
    }

    #[test]
    fn cli_parses_init_defaults() {
        let parsed = Cli::try_parse_from(["memrun", "init"]);
        let cli = match parsed {
            Ok(v) => v,
            Err(err) => panic!("failed to parse args: {err}"),
        };

        match cli.command {
            Command::Init(args) => {
                assert_eq!(args.dir, PathBuf::from("."));
                assert!(!args.force);
            }
            Command::Run(_) => panic!("expected init command"),
        }
    }
}
