/// Severity of a kernel alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gravity {
    Warning,
    Fail,
}

/// A single message raised by a kernel algorithm.
#[derive(Debug, Clone)]
struct Alert {
    gravity: Gravity,
    message: String,
}

/// Collects the warnings and errors raised while running a kernel algorithm.
#[derive(Debug, Clone, Default)]
pub struct Report {
    alerts: Vec<Alert>,
}

impl Report {
    /// Creates an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a warning.
    pub fn warn(&mut self, message: impl Into<String>) {
        self.alerts.push(Alert {
            gravity: Gravity::Warning,
            message: message.into(),
        });
    }

    /// Records an error. Any error makes the algorithm's output unusable.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.alerts.push(Alert {
            gravity: Gravity::Fail,
            message: message.into(),
        });
    }

    /// Returns `true` if at least one error was recorded.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.alerts.iter().any(|a| a.gravity == Gravity::Fail)
    }

    /// Number of warnings recorded.
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.alerts
            .iter()
            .filter(|a| a.gravity == Gravity::Warning)
            .count()
    }

    /// Messages of the recorded errors, joined for logging.
    #[must_use]
    pub fn error_summary(&self) -> String {
        self.alerts
            .iter()
            .filter(|a| a.gravity == Gravity::Fail)
            .map(|a| a.message.as_str())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_do_not_count_as_errors() {
        let mut report = Report::new();
        report.warn("close coordinates");
        report.warn("empty argument");
        assert_eq!(report.warning_count(), 2);
        assert!(!report.has_errors());

        report.fail("interrupted");
        assert!(report.has_errors());
        report.fail("no solids");
        assert_eq!(report.warning_count(), 2);
        assert_eq!(report.error_summary(), "interrupted; no solids");
    }
}
