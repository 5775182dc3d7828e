//! Dispatch simulator entry point: CLI wiring and scenario-driven runs.

use std::process;

use tracing::info;
use tracing_subscriber::EnvFilter;

use hybrid_dispatch::DispatchError;
use hybrid_dispatch::cli::{self, CliOptions};
use hybrid_dispatch::config::ScenarioConfig;
use hybrid_dispatch::sim::engine::simulate;
use hybrid_dispatch::sim::kpi::{SummaryReport, monthly_breakdown};

fn load_scenario(cli: &CliOptions) -> Result<ScenarioConfig, String> {
    let mut scenario = match (&cli.scenario, &cli.preset) {
        (Some(path), _) => ScenarioConfig::from_toml_file(path),
        (None, Some(name)) => ScenarioConfig::from_preset(name),
        (None, None) => Ok(ScenarioConfig::reference()),
    }
    .map_err(|e| e.to_string())?;

    if let Some(hours) = cli.hours {
        scenario.simulation.hours = hours;
    }
    if let Some(id) = cli.template {
        scenario.simulation.template = Some(id);
    }
    if let Some(seed) = cli.seed {
        scenario.simulation.seed = seed;
    }
    Ok(scenario)
}

fn run(cli: &CliOptions) -> Result<(), String> {
    let scenario = load_scenario(cli)?;

    let (config, profiles) = scenario.build().map_err(|e| match e {
        DispatchError::InvalidConfig(errors) => errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    })?;
    info!(
        template = %config.template,
        merit_order = config.template.rule().merit_order,
        "scenario loaded"
    );

    let records =
        simulate(&config, &profiles, scenario.simulation.hours).map_err(|e| e.to_string())?;

    if cli.hourly {
        for r in &records {
            println!("{r}");
        }
        println!();
    }

    let summary = SummaryReport::from_records(&records, config.battery.capacity_mwh);
    println!("{summary}");

    if cli.monthly {
        println!();
        for month in monthly_breakdown(&records) {
            println!("{month}");
        }
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("hybrid_dispatch=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = match cli::parse_args() {
        Ok(opts) => opts,
        Err(e) => {
            eprintln!("error: {e}");
            cli::print_usage(ScenarioConfig::PRESETS);
            process::exit(1);
        }
    };

    if cli.help {
        cli::print_usage(ScenarioConfig::PRESETS);
        return;
    }

    if let Err(e) = run(&cli) {
        eprintln!("{e}");
        process::exit(1);
    }
}
