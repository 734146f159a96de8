//! Run command - Train the driving agent, then test it

use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use serde_json::to_writer_pretty;

use crate::{
    app::{AgentConfig, App, WorldConfig},
    cli::output::{print_metrics, print_report},
    pipeline::{
        CsvTrialObserver, MetricsObserver, ProgressObserver, SimulationConfig, SimulationReport,
        Simulator, TraceObserver,
    },
    q_learning::{DecayStrategy, TieRule},
};

fn sanitize_summary_path(raw: &Path) -> PathBuf {
    let mut normalized = raw.to_path_buf();
    let raw_str = raw.as_os_str().to_string_lossy();

    // Trailing separator or no file name: treat as a directory.
    if raw_str.ends_with(std::path::MAIN_SEPARATOR) || normalized.file_name().is_none() {
        normalized.push("run_summary.json");
        return normalized;
    }

    match normalized.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => normalized,
        _ => {
            normalized.set_extension("json");
            normalized
        }
    }
}

fn parse_decay(s: &str) -> Result<DecayStrategy> {
    s.parse::<DecayStrategy>()
        .map_err(|e| anyhow!("{e}. Use 'linear' or 'exponential'"))
}

#[derive(Parser, Debug)]
#[command(name = "run", about = "Train the driving agent, then test it")]
pub struct RunArgs {
    /// Update the Q-table and decay exploration between trials
    #[arg(long, default_value_t = false)]
    pub learning: bool,

    /// Learning rate
    #[arg(long, short = 'a', default_value_t = 0.5)]
    pub alpha: f64,

    /// Exploration probability before the first trial
    #[arg(long, short = 'e', default_value_t = 1.0)]
    pub epsilon: f64,

    /// Constant driving the epsilon decay (defaults to alpha)
    #[arg(long)]
    pub decay_rate: Option<f64>,

    /// Epsilon decay: linear or exponential
    #[arg(long, default_value = "exponential")]
    pub decay: String,

    /// Treat values within this distance of the maximum as tied
    #[arg(long)]
    pub tie_tolerance: Option<f64>,

    /// Add Q-table rows on first visit instead of pre-populating all states
    #[arg(long, default_value_t = false)]
    pub lazy_states: bool,

    /// Random seed for the world; the agent uses the next seed
    #[arg(long, short = 's')]
    pub seed: Option<u64>,

    /// End trials as failures when the deadline runs out
    #[arg(long, default_value_t = false)]
    pub enforce_deadline: bool,

    /// Number of dummy vehicles
    #[arg(long, default_value_t = 100)]
    pub dummies: usize,

    /// Number of testing trials
    #[arg(long, short = 'n', default_value_t = 10)]
    pub n_test: usize,

    /// Stop training once epsilon falls to this value
    #[arg(long, default_value_t = 0.05)]
    pub tolerance: f64,

    /// Cap on training trials
    #[arg(long, default_value_t = 100_000)]
    pub max_training_trials: usize,

    /// Seconds to pause after each step
    #[arg(long, default_value_t = 0.0)]
    pub update_delay: f64,

    /// Log every step
    #[arg(long, default_value_t = false)]
    pub display: bool,

    /// Write sim_{variant}.csv and sim_{variant}.txt to the output directory
    #[arg(long, default_value_t = false)]
    pub log_metrics: bool,

    /// Label the run as the improved learning variant
    #[arg(long, default_value_t = false)]
    pub optimized: bool,

    /// Directory for trial logs
    #[arg(long, default_value = "logs")]
    pub output_dir: PathBuf,

    /// Optional path for writing a summary JSON file
    #[arg(long)]
    pub summary: Option<PathBuf>,

    /// Hide the progress spinner
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}

impl RunArgs {
    fn agent_config(&self) -> Result<AgentConfig> {
        let mut config = AgentConfig::new(self.learning)
            .with_alpha(self.alpha)
            .with_epsilon(self.epsilon)
            .with_decay(parse_decay(&self.decay)?)
            .with_eager_states(!self.lazy_states);
        if let Some(rate) = self.decay_rate {
            config = config.with_decay_rate(rate);
        }
        if let Some(tolerance) = self.tie_tolerance {
            config = config.with_tie_rule(TieRule::Tolerance(tolerance));
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed.wrapping_add(1));
        }
        Ok(config)
    }

    fn world_config(&self) -> WorldConfig {
        let config = WorldConfig::default()
            .with_dummies(self.dummies)
            .with_enforce_deadline(self.enforce_deadline);
        match self.seed {
            Some(seed) => config.with_seed(seed),
            None => config,
        }
    }

    fn simulation_config(&self) -> SimulationConfig {
        SimulationConfig {
            update_delay: self.update_delay,
            display: self.display,
            log_metrics: self.log_metrics,
            optimized: self.optimized,
            n_test: self.n_test,
            tolerance: self.tolerance,
            max_training_trials: self.max_training_trials,
            output_dir: self.output_dir.clone(),
        }
    }
}

pub fn execute(args: RunArgs) -> Result<()> {
    let summary_target = args.summary.as_ref().map(|raw| {
        let sanitized = sanitize_summary_path(raw);
        let normalized = sanitized != *raw;
        (sanitized, normalized)
    });

    let app = App::new();
    let mut world = app
        .create_world(args.world_config())
        .context("failed to create the grid world")?;
    let mut agent = app
        .create_agent(&world, args.agent_config()?)
        .context("failed to create the driving agent")?;

    let sim_config = args.simulation_config();
    let metrics = Arc::new(Mutex::new(MetricsObserver::new()));
    let mut simulator =
        Simulator::new(sim_config.clone())?.with_observer(Box::new(Arc::clone(&metrics)));
    if args.display {
        simulator = simulator.with_observer(Box::new(TraceObserver));
    } else if !args.no_progress {
        simulator = simulator.with_observer(Box::new(ProgressObserver::new()));
    }
    if sim_config.log_metrics {
        simulator =
            simulator.with_observer(Box::new(CsvTrialObserver::new(&sim_config.output_dir, true)));
    }

    let report = simulator
        .run(&mut world, &mut agent)
        .context("simulation aborted")?;
    print_report(&report);
    print_metrics(&metrics.lock().unwrap_or_else(PoisonError::into_inner));

    if sim_config.log_metrics {
        let variant = &report.variant;
        println!(
            "\nTrial log written to {}",
            sim_config.output_dir.join(format!("sim_{variant}.csv")).display()
        );
    }

    if let Some((summary_path, normalized)) = summary_target {
        if normalized {
            println!(
                "\nNormalizing summary path to {}",
                summary_path.display()
            );
        }
        write_summary(&summary_path, &report)?;
        println!("\nSummary written to {}", summary_path.display());
    }

    Ok(())
}

fn write_summary(path: &Path, report: &SimulationReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    to_writer_pretty(file, report)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_path_gets_json_extension() {
        assert_eq!(
            sanitize_summary_path(Path::new("out/run")),
            PathBuf::from("out/run.json")
        );
        assert_eq!(
            sanitize_summary_path(Path::new("out/run.JSON")),
            PathBuf::from("out/run.JSON")
        );
    }

    #[test]
    fn test_seed_is_split_between_world_and_agent() {
        let args = RunArgs::parse_from(["run", "--learning", "--seed", "9"]);
        assert_eq!(args.world_config().seed, Some(9));
        assert_eq!(args.agent_config().unwrap().seed, Some(10));
    }

    #[test]
    fn test_unknown_decay_is_rejected() {
        let args = RunArgs::parse_from(["run", "--decay", "cosine"]);
        assert!(args.agent_config().is_err());
    }
}
