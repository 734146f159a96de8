//! Observer pattern for simulation runs
//!
//! Observers allow composable data collection during a run without coupling
//! the simulator to specific output formats.

use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    sync::{Arc, Mutex, PoisonError},
};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use crate::{
    Error, Result,
    pipeline::{PhaseSummary, TrialRecord, TrialStart},
    ports::{Observer, StepRecord},
    q_learning::QTable,
};

/// Progress spinner observer - Shows which trial is running
pub struct ProgressObserver {
    progress_bar: Option<ProgressBar>,
    successes: usize,
    trials: usize,
}

impl ProgressObserver {
    /// Create a new progress observer
    pub fn new() -> Self {
        Self {
            progress_bar: None,
            successes: 0,
            trials: 0,
        }
    }

    fn tally(&self) -> String {
        format!("{}/{} successful", self.successes, self.trials)
    }
}

impl Default for ProgressObserver {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ProgressObserver {
    fn on_run_start(&mut self, label: &str) -> Result<()> {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} [{elapsed_precise}] {prefix} {msg}")
                .map_err(|e| Error::ProgressBarTemplate {
                    message: e.to_string(),
                })?,
        );
        pb.set_prefix(label.to_string());
        self.progress_bar = Some(pb);
        Ok(())
    }

    fn on_trial_start(&mut self, start: &TrialStart) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            let phase = if start.testing { "testing" } else { "training" };
            pb.set_message(format!(
                "{phase} trial {} (ε={:.4}) {}",
                start.trial,
                start.epsilon,
                self.tally()
            ));
            pb.tick();
        }
        Ok(())
    }

    fn on_trial_end(&mut self, record: &TrialRecord) -> Result<()> {
        self.trials += 1;
        if record.success {
            self.successes += 1;
        }
        Ok(())
    }

    fn on_run_end(&mut self, _table: Option<&QTable>) -> Result<()> {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message(self.tally());
        }
        Ok(())
    }
}

/// Metrics observer - Tracks per-phase success, reward and violations
#[derive(Debug, Default)]
pub struct MetricsObserver {
    training: PhaseSummary,
    testing: PhaseSummary,
    steps: usize,
    explored: usize,
}

impl MetricsObserver {
    /// Create a new metrics observer
    pub fn new() -> Self {
        Self::default()
    }

    pub fn training(&self) -> &PhaseSummary {
        &self.training
    }

    pub fn testing(&self) -> &PhaseSummary {
        &self.testing
    }

    /// Steps observed across both phases.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Fraction of all steps whose action came from exploration.
    pub fn exploration_rate(&self) -> f64 {
        crate::utils::rate(self.explored, self.steps)
    }
}

impl Observer for MetricsObserver {
    fn on_step(&mut self, _trial: usize, _step: usize, record: &StepRecord) -> Result<()> {
        self.steps += 1;
        if record.explored {
            self.explored += 1;
        }
        Ok(())
    }

    fn on_trial_end(&mut self, record: &TrialRecord) -> Result<()> {
        if record.testing {
            self.testing.record(record);
        } else {
            self.training.record(record);
        }
        Ok(())
    }
}

/// Shared observer - Lets the caller read an observer back after the run
///
/// The simulator owns its observers, so one that must be inspected afterwards
/// is attached as an `Arc<Mutex<_>>` clone.
impl<O: Observer> Observer for Arc<Mutex<O>> {
    fn on_run_start(&mut self, label: &str) -> Result<()> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on_run_start(label)
    }

    fn on_trial_start(&mut self, start: &TrialStart) -> Result<()> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on_trial_start(start)
    }

    fn on_step(&mut self, trial: usize, step: usize, record: &StepRecord) -> Result<()> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on_step(trial, step, record)
    }

    fn on_trial_end(&mut self, record: &TrialRecord) -> Result<()> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on_trial_end(record)
    }

    fn on_run_end(&mut self, table: Option<&QTable>) -> Result<()> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .on_run_end(table)
    }
}

/// CSV observer - Writes one row per trial to `sim_{variant}.csv`
///
/// When `dump_table` is set, the driver's Q-table is also written to
/// `sim_{variant}.txt` at the end of the run.
pub struct CsvTrialObserver {
    dir: PathBuf,
    dump_table: bool,
    label: String,
    writer: Option<csv::Writer<File>>,
}

impl CsvTrialObserver {
    /// Create a new CSV observer writing into `dir`
    pub fn new<P: AsRef<Path>>(dir: P, dump_table: bool) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            dump_table,
            label: String::new(),
            writer: None,
        }
    }

    /// Path of the trial log for `label`.
    pub fn log_path(&self, label: &str) -> PathBuf {
        self.dir.join(format!("sim_{label}.csv"))
    }

    /// Path of the Q-table dump for `label`.
    pub fn table_path(&self, label: &str) -> PathBuf {
        self.dir.join(format!("sim_{label}.txt"))
    }
}

fn create(path: &Path) -> Result<File> {
    File::create(path).map_err(|source| Error::Io {
        operation: format!("create {}", path.display()),
        source,
    })
}

impl Observer for CsvTrialObserver {
    fn on_run_start(&mut self, label: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|source| Error::Io {
            operation: format!("create directory {}", self.dir.display()),
            source,
        })?;
        self.label = label.to_string();
        let file = create(&self.log_path(label))?;
        self.writer = Some(csv::Writer::from_writer(file));
        Ok(())
    }

    fn on_trial_end(&mut self, record: &TrialRecord) -> Result<()> {
        if let Some(writer) = &mut self.writer {
            writer.serialize(record)?;
            writer.flush()?;
        }
        Ok(())
    }

    fn on_run_end(&mut self, table: Option<&QTable>) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }
        if let (true, Some(table)) = (self.dump_table, table) {
            let path = self.table_path(&self.label);
            let mut out = BufWriter::new(create(&path)?);
            table.write_report(&mut out)?;
            out.flush()?;
        }
        Ok(())
    }
}

/// Trace observer - Logs every step through `tracing`
#[derive(Debug, Default)]
pub struct TraceObserver;

impl Observer for TraceObserver {
    fn on_trial_start(&mut self, start: &TrialStart) -> Result<()> {
        info!(
            trial = start.trial,
            testing = start.testing,
            start = %start.start.location,
            destination = %start.destination,
            deadline = start.deadline,
            "trial started"
        );
        Ok(())
    }

    fn on_step(&mut self, trial: usize, step: usize, record: &StepRecord) -> Result<()> {
        info!(
            trial,
            step,
            state = %record.state,
            action = %record.action,
            reward = record.reward,
            deadline = record.deadline,
            explored = record.explored,
            "step"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(testing: bool, success: bool) -> TrialRecord {
        TrialRecord {
            trial: 1,
            testing,
            epsilon: 0.5,
            alpha: 0.5,
            initial_deadline: 25,
            final_deadline: 3,
            net_reward: 14.5,
            steps: 22,
            legal_actions: 20,
            minor_violations: 1,
            major_violations: 1,
            minor_accidents: 0,
            major_accidents: 0,
            arrived: success,
            success,
        }
    }

    #[test]
    fn test_metrics_split_by_phase() {
        let mut metrics = MetricsObserver::new();
        metrics.on_trial_end(&record(false, true)).unwrap();
        metrics.on_trial_end(&record(false, false)).unwrap();
        metrics.on_trial_end(&record(true, true)).unwrap();

        assert_eq!(metrics.training().trials, 2);
        assert_eq!(metrics.training().success_rate, 0.5);
        assert_eq!(metrics.testing().trials, 1);
        assert_eq!(metrics.testing().success_rate, 1.0);
    }

    #[test]
    fn test_csv_observer_writes_rows() {
        let dir = tempfile::tempdir().unwrap();
        let mut observer = CsvTrialObserver::new(dir.path(), false);
        observer.on_run_start("no-learning").unwrap();
        observer.on_trial_end(&record(false, true)).unwrap();
        observer.on_trial_end(&record(true, false)).unwrap();
        observer.on_run_end(None).unwrap();

        let mut reader = csv::Reader::from_path(dir.path().join("sim_no-learning.csv")).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(&headers[0], "trial");
        let rows: Vec<TrialRecord> = reader.deserialize().map(|row| row.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].success);
        assert!(rows[1].testing);
        assert!(!dir.path().join("sim_no-learning.txt").exists());
    }
}
