use crate::game::leaderboard_set::Violation;
use log::{error, warn};

/// User-visible reporting of rejected entries and failed submissions.
pub trait Reporter: Send + Sync {
    fn report(&self, violations: &[Violation]);
    fn report_failure(&self, reason: &str);
}

pub fn violation_text(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.message())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Writes alerts to stderr, which is where a terminal player will see them.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleReporter;

impl Reporter for ConsoleReporter {
    fn report(&self, violations: &[Violation]) {
        warn!("Entry rejected: {violations:?}");
        eprintln!("{}", violation_text(violations));
    }

    fn report_failure(&self, reason: &str) {
        error!("{reason}");
        eprintln!("{reason}");
    }
}
