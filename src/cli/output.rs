//! Output formatting for CLI

use crate::pipeline::{MetricsObserver, PhaseSummary, SimulationReport};

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Print statistics table
pub fn print_stats_table(stats: &[(&str, String)]) {
    for (key, value) in stats {
        print_kv(key, value);
    }
}

/// Format a ratio as a percentage with one decimal
pub fn format_percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

fn print_phase(title: &str, phase: &PhaseSummary) {
    print_subsection(title);
    print_stats_table(&[
        ("Trials", phase.trials.to_string()),
        ("Successes", phase.successes.to_string()),
        ("Success rate", format_percent(phase.success_rate)),
        ("Mean net reward", format!("{:.2}", phase.mean_net_reward)),
        ("Reward per step", format!("{:.3}", phase.mean_reward_per_step)),
        ("Violations", phase.violations.to_string()),
        ("Accidents", phase.accidents.to_string()),
    ]);
}

/// Print the outcome of a simulation run
pub fn print_report(report: &SimulationReport) {
    print_section(&format!("Simulation: {} ({})", report.variant, report.driver));
    print_phase("Training", &report.training);
    print_phase("Testing", &report.testing);

    print_subsection("Agent");
    print_kv("Final epsilon", &format!("{:.4}", report.final_training_epsilon));
    if let Some(states) = report.states_learned {
        print_kv("States in table", &states.to_string());
    }
    if let Some(reward) = report.recent_training_reward {
        print_kv("Recent train reward", &format!("{reward:.2}"));
    }
}

/// Print step-level metrics collected during a run
pub fn print_metrics(metrics: &MetricsObserver) {
    print_subsection("Steps");
    print_stats_table(&[
        ("Steps taken", metrics.steps().to_string()),
        ("Explored", format_percent(metrics.exploration_rate())),
    ]);
}
