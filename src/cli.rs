//! Command-line argument parsing for the `hybrid-dispatch` binary.

use std::env;
use std::path::PathBuf;

/// Parsed CLI arguments.
#[derive(Debug, Default, PartialEq)]
pub struct CliOptions {
    pub scenario: Option<PathBuf>,
    pub preset: Option<String>,
    /// Overrides `simulation.hours`.
    pub hours: Option<usize>,
    /// Overrides the scenario's template id.
    pub template: Option<u8>,
    /// Overrides `simulation.seed`.
    pub seed: Option<u64>,
    /// Print every hourly record.
    pub hourly: bool,
    /// Print the monthly breakdown.
    pub monthly: bool,
    pub help: bool,
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(args)
}

/// Parses arguments (without the program name).
///
/// Falls back to the `reference` preset when neither `--scenario` nor
/// `--preset` is given.
pub fn parse_args_from(args: Vec<String>) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut opts = CliOptions::default();

    while i < args.len() {
        match args[i].as_str() {
            "--scenario" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --scenario (expected a TOML file path)",
                )?;
                if opts.scenario.replace(PathBuf::from(path)).is_some() {
                    return Err("--scenario provided more than once".to_string());
                }
            }
            "--preset" => {
                i += 1;
                let name =
                    args.next_or_err(i, "missing value for --preset (expected a preset name)")?;
                if opts.preset.replace(name.to_string()).is_some() {
                    return Err("--preset provided more than once".to_string());
                }
            }
            "--hours" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --hours (expected a count)")?;
                let hours = raw
                    .parse::<usize>()
                    .map_err(|_| format!("--hours value \"{raw}\" is not a valid count"))?;
                opts.hours = Some(hours);
            }
            "--template" => {
                i += 1;
                let raw =
                    args.next_or_err(i, "missing value for --template (expected 0 to 6)")?;
                let id = raw
                    .trim_start_matches(['T', 't'])
                    .parse::<u8>()
                    .map_err(|_| format!("--template value \"{raw}\" is not a template id"))?;
                opts.template = Some(id);
            }
            "--seed" => {
                i += 1;
                let raw = args.next_or_err(i, "missing value for --seed (expected a u64)")?;
                let seed = raw
                    .parse::<u64>()
                    .map_err(|_| format!("--seed value \"{raw}\" is not a valid u64"))?;
                opts.seed = Some(seed);
            }
            "--hourly" => opts.hourly = true,
            "--monthly" => opts.monthly = true,
            "--help" | "-h" => {
                opts.help = true;
                return Ok(opts);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    if opts.scenario.is_some() && opts.preset.is_some() {
        return Err(
            "arguments `--scenario` and `--preset` are mutually exclusive; choose one source"
                .to_string(),
        );
    }

    if opts.scenario.is_none() && opts.preset.is_none() {
        opts.preset = Some("reference".to_string());
    }

    Ok(opts)
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage(presets: &[&str]) {
    eprintln!("hybrid-dispatch: hourly Solar + BESS + Diesel dispatch simulator");
    eprintln!();
    eprintln!("Usage: hybrid-dispatch [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>   Load scenario from TOML config file");
    eprintln!("  --preset <name>     Use a built-in preset ({})", presets.join(", "));
    eprintln!("  --hours <n>         Override the simulation horizon");
    eprintln!("  --template <id>     Override the dispatch template (0 to 6)");
    eprintln!("  --seed <u64>        Override the profile random seed");
    eprintln!("  --hourly            Print every hourly record");
    eprintln!("  --monthly           Print the monthly breakdown");
    eprintln!("  --help              Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the reference preset is used.");
    eprintln!("Log verbosity follows RUST_LOG (default: hybrid_dispatch=info).");
}
