//! Folding one trial's events into a time-bucketed occupancy histogram.

use nalgebra::{DMatrix, Dyn, MatrixView, U1};
use tracing::trace;

use crate::{
    config::QueueConfig,
    error::HistogramError,
    sampler::SampledTrial,
};

/// Occupancy indicators over time: one row per state, one column per time bucket.
///
/// For a single trial, each column holds a single 1 at the occupancy observed in that bucket.
/// Summed over trials and divided by the trial count, entries estimate the probability of each
/// state in each bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct OccupancyHistogram {
    cells: DMatrix<f64>,
}

impl OccupancyHistogram {
    /// An all-zero histogram.
    pub fn zeros(states: usize, sections: usize) -> Self {
        Self {
            cells: DMatrix::zeros(states, sections),
        }
    }

    /// `(states, sections)`
    pub fn shape(&self) -> (usize, usize) {
        self.cells.shape()
    }

    /// Value for `state` in bucket `section`.
    ///
    /// # Panics
    ///
    /// If either index is out of range.
    pub fn get(&self, state: usize, section: usize) -> f64 {
        self.cells[(state, section)]
    }

    /// One state's values across all buckets.
    pub fn row(&self, state: usize) -> MatrixView<'_, f64, U1, Dyn, U1, Dyn> {
        self.cells.row(state)
    }

    /// All states' values in one bucket.
    pub fn column(&self, section: usize) -> MatrixView<'_, f64, Dyn, U1, U1, Dyn> {
        self.cells.column(section)
    }

    /// The whole histogram, states by sections.
    pub fn cells(&self) -> &DMatrix<f64> {
        &self.cells
    }

    /// Add `other` element-wise.
    pub fn merge(&mut self, other: &OccupancyHistogram) -> Result<(), HistogramError> {
        if self.shape() != other.shape() {
            return Err(HistogramError {
                expected: self.shape(),
                actual: other.shape(),
            });
        }
        self.cells += &other.cells;
        Ok(())
    }

    /// Divide every cell by `divisor`.
    pub(crate) fn scale_down(&mut self, divisor: f64) {
        self.cells /= divisor;
    }

    fn set(&mut self, state: usize, section: usize, value: f64) {
        self.cells[(state, section)] = value;
    }
}

/// Why a trial was abandoned.
#[derive(Debug, Clone, Copy, PartialEq)]
#[non_exhaustive]
pub enum TrialSkip {
    /// The sampled events ran out before the clock reached the horizon.
    SamplesExhausted {
        /// Events available (and consumed).
        events: usize,
        /// Arrival time of the last event.
        reached: f64,
        /// Time the trial needed to cover.
        horizon: f64,
    },
}

/// Result of folding one trial.
#[derive(Debug, Clone, PartialEq)]
pub enum TrialOutcome {
    /// The trial covered the horizon.
    Completed(OccupancyHistogram),
    /// The trial was abandoned and contributes nothing.
    Skipped(TrialSkip),
}

/// Converts sampled trials into occupancy histograms for one queue.
#[derive(Debug, Clone, Copy)]
pub struct TrialAccumulator<'a> {
    config: &'a QueueConfig,
}

impl<'a> TrialAccumulator<'a> {
    /// Create an accumulator for `config`.
    pub fn new(config: &'a QueueConfig) -> Self {
        Self { config }
    }

    /// Fold one trial into a histogram with `section_count` buckets covering `horizon`.
    ///
    /// An arriving request is admitted when the occupancy of its arrival bucket is below the
    /// admission threshold. It then counts towards every bucket from its arrival bucket up to,
    /// but not including, the bucket its service would end in. Blocked requests contribute
    /// nothing. The trial ends when the clock reaches `horizon` or the last bucket; running out
    /// of events first skips the trial.
    ///
    /// # Panics
    ///
    /// If `section_count` is zero, or `horizon` is not a positive finite number.
    pub fn fold_trial(
        &self,
        trial: &SampledTrial,
        horizon: f64,
        section_count: usize,
    ) -> TrialOutcome {
        assert!(section_count > 0, "section_count must be positive");
        assert!(
            horizon.is_finite() && horizon > 0.0,
            "horizon must be positive and finite, got {horizon}"
        );

        let section_width = horizon / section_count as f64;
        let last_section = section_count - 1;
        let threshold = self.config.admission_threshold();
        let clamp = |value: f64| (value.max(0.0) as usize).min(last_section);

        let mut occupancy = vec![0usize; section_count];
        let mut current = 0.0;
        let mut admitted = 0usize;
        let mut blocked = 0usize;
        let mut finished = false;

        for event in trial.events() {
            current += event.arrival_offset;
            if current >= horizon {
                finished = true;
                break;
            }

            let bound_l = clamp((current / section_width).floor());
            if bound_l == last_section {
                finished = true;
                break;
            }
            let bound_r =
                clamp(bound_l as f64 + (event.service_duration / section_width).floor());

            if occupancy[bound_l] < threshold {
                admitted += 1;
                for count in &mut occupancy[bound_l..bound_r] {
                    *count += 1;
                }
            } else {
                blocked += 1;
            }
        }

        if !finished {
            return TrialOutcome::Skipped(TrialSkip::SamplesExhausted {
                events: trial.len(),
                reached: current,
                horizon,
            });
        }

        trace!(admitted, blocked, "trial folded");

        let mut histogram = OccupancyHistogram::zeros(self.config.state_count(), section_count);
        for (section, &count) in occupancy.iter().enumerate() {
            debug_assert!(count <= threshold, "occupancy above admission threshold");
            histogram.set(count.min(threshold), section, 1.0);
        }
        TrialOutcome::Completed(histogram)
    }
}
