//! Text reporting of steady-state metrics.

use std::fmt::{self, Display};

use bon::bon;

use crate::{config::QueueConfig, steady_state::SteadyState};

/// How a report is laid out.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportFormat {
    title: Option<String>,
    label_width: usize,
    precision: usize,
}

#[bon]
impl ReportFormat {
    #[allow(missing_docs)]
    #[builder]
    pub fn new(
        /// Printed above the metrics.
        #[builder(into)]
        title: Option<String>,
        /// Labels are padded to this width.
        #[builder(default = 28)]
        label_width: usize,
        /// Digits after the decimal point.
        #[builder(default = 4)]
        precision: usize,
    ) -> Self {
        Self {
            title,
            label_width,
            precision,
        }
    }
}

impl Default for ReportFormat {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Steady-state metrics of a queue, ready to display.
#[derive(Debug, Clone)]
pub struct SteadyStateReport {
    config: QueueConfig,
    metrics: SteadyState,
    format: ReportFormat,
}

impl SteadyStateReport {
    /// Compute the metrics for `config` and pair them with `format`.
    pub fn new(config: &QueueConfig, format: ReportFormat) -> Self {
        Self {
            config: *config,
            metrics: SteadyState::compute(config),
            format,
        }
    }

    /// The computed metrics.
    pub fn metrics(&self) -> &SteadyState {
        &self.metrics
    }

    /// Print the report to stdout.
    pub fn print(&self) {
        println!("{self}");
    }
}

impl Display for SteadyStateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label_width = self.format.label_width;
        let precision = self.format.precision;

        if let Some(title) = &self.format.title {
            writeln!(f, "=== {title} ===")?;
        }
        writeln!(f, "{:<label_width$} {}", "Queue", self.config)?;

        for (label, value) in self.metrics.labelled() {
            writeln!(f, "{label:<label_width$} {value:.precision$}")?;
        }

        write!(f, "{:<label_width$}", "State probabilities")?;
        for p in &self.metrics.state_probabilities {
            write!(f, " {p:.precision$}")?;
        }
        Ok(())
    }
}
