/// Vixen Simulator - drive a media control surface from a scripted scenario
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vixen_sim::{Report, Scenario, SimConfig, Simulator};

#[derive(Parser)]
#[command(name = "vixen-sim")]
#[command(about = "Run scripted scenarios against the Vixen media controls", long_about = None)]
struct Cli {
    /// Configuration file path (defaults to ./vixen-sim.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scenario and print what every step did
    Run {
        /// Scenario file
        scenario: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Print the final element tree
        #[arg(long)]
        dump: bool,
    },
    /// Parse and validate a scenario without running it
    Check {
        /// Scenario file
        scenario: PathBuf,
    },
    /// Print the effective configuration
    Config,
}

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vixen_sim=info,vixen_controls=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = SimConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Run {
            scenario,
            json,
            dump,
        } => run(&scenario, &config, json, dump)?,
        Commands::Check { scenario } => check(&scenario)?,
        Commands::Config => println!("{}", toml::to_string_pretty(&config)?),
    }

    Ok(())
}

fn run(path: &Path, config: &SimConfig, json: bool, dump: bool) -> anyhow::Result<()> {
    let scenario = Scenario::load(path)?;
    let mut simulator = Simulator::new(&scenario, config)?;
    let report = simulator.run(&scenario);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }
    if dump {
        println!("{}", simulator.dump());
    }

    let failures = report.failures().count();
    if failures > 0 {
        tracing::warn!(failures, "some steps failed");
    }
    Ok(())
}

fn check(path: &Path) -> anyhow::Result<()> {
    let scenario = Scenario::load(path)?;
    println!(
        "{}: {} sources, {} tracks, {} steps",
        scenario.name,
        scenario.media.sources.len(),
        scenario.tracks.len(),
        scenario.steps.len()
    );
    Ok(())
}

fn print_report(report: &Report) {
    println!("Scenario: {}", report.scenario);
    for step in &report.steps {
        println!(
            "{:>3} {:>8}ms  {:<16} {:<13} {:>8} / {:<8} vol {:.2}{}",
            step.index + 1,
            step.clock_ms,
            step.action,
            step.lifecycle,
            step.elapsed,
            step.remaining,
            step.volume,
            step.error
                .as_deref()
                .map(|e| format!("  error: {}", e))
                .unwrap_or_default()
        );
        if let Some(dump) = &step.dump {
            println!("{}", dump);
        }
    }

    if !report.resolutions.is_empty() {
        println!("Resolutions: {:?}", report.resolutions);
    }
    for chapter in &report.chapters {
        println!("Chapter {:>8}  {}", vixen_controls::format_time(chapter.start), chapter.text);
    }
    if report.fallback_links > 0 {
        println!("Fallback links: {}", report.fallback_links);
    }
}
