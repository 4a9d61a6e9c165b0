//! Monte-Carlo estimate of the transient occupancy distribution.
//!
//! Every trial is independent: it samples its own events from a seed derived from the run's seed
//! and the trial index, so splitting trials across workers does not change the result.

use std::ops::Range;

use bon::bon;
use tracing::{Instrument, Span, debug, info, info_span, warn};

use crate::{
    accumulator::{OccupancyHistogram, TrialAccumulator, TrialOutcome},
    config::QueueConfig,
    error::{HistogramError, SimulationError},
    sampler::{EventSampler, ServiceDistribution},
};

/// What the summed histogram is divided by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[non_exhaustive]
pub enum Normalization {
    /// Divide by the number of trials that completed. Skipped trials are left out entirely.
    #[default]
    CompletedTrials,
    /// Divide by the number of trials requested. Skipped trials count as all-zero histograms.
    NominalTrials,
}

/// The averaged result of a simulation run.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    /// Estimated probability of each state (row) in each time bucket (column).
    pub histogram: OccupancyHistogram,
    /// Trials that covered the horizon.
    pub completed_trials: usize,
    /// Trials abandoned because their events ran out.
    pub skipped_trials: usize,
    /// How `histogram` was normalised.
    pub normalization: Normalization,
}

/// Runs repeated trials of a queue and averages their occupancy histograms.
#[derive(Debug, Clone)]
pub struct SimulationRunner<'a> {
    config: &'a QueueConfig,
    oversampling_factor: f64,
    service: ServiceDistribution,
    normalization: Normalization,
    seed: u64,
}

#[bon]
impl<'a> SimulationRunner<'a> {
    #[allow(missing_docs)]
    #[builder]
    pub fn new(
        config: &'a QueueConfig,
        /// Events sampled per unit of horizon, per trial.
        #[builder(default = 5.0)]
        oversampling_factor: f64,
        /// Distribution of service durations.
        #[builder(default)]
        service: ServiceDistribution,
        /// What the summed histogram is divided by.
        #[builder(default)]
        normalization: Normalization,
        /// Seed for reproducibility. Random when absent.
        seed: Option<u64>,
    ) -> Self {
        Self {
            config,
            oversampling_factor,
            service,
            normalization,
            seed: seed.unwrap_or_else(rand::random),
        }
    }
}

impl SimulationRunner<'_> {
    /// Run `trial_count` trials over `horizon`, bucketed into `section_count` sections.
    pub fn run(
        &self,
        horizon: f64,
        trial_count: usize,
        section_count: usize,
    ) -> Result<SimulationReport, SimulationError> {
        self.validate(horizon, trial_count, section_count)?;

        let span = info_span!(
            "simulation run",
            trials = trial_count,
            sections = section_count,
            seed = self.seed
        );
        let _enter = span.enter();

        let plan = self.plan(horizon, section_count);
        let partial = plan.run_trials(0..trial_count)?;
        self.finish(partial, trial_count)
    }

    /// Like [`run`](Self::run), with the trials split across `workers` blocking tasks.
    ///
    /// Each worker sums into its own histogram; the sums are combined once all workers finish.
    /// Produces the same report as `run` for the same seed.
    pub async fn run_concurrent(
        &self,
        horizon: f64,
        trial_count: usize,
        section_count: usize,
        workers: usize,
    ) -> Result<SimulationReport, SimulationError> {
        self.validate(horizon, trial_count, section_count)?;
        if workers == 0 {
            return Err(SimulationError::InvalidParameter {
                name: "workers",
                reason: "must be at least 1",
            });
        }

        let span = info_span!(
            "simulation run",
            trials = trial_count,
            sections = section_count,
            seed = self.seed,
            workers
        );

        self.run_workers(horizon, trial_count, section_count, workers)
            .instrument(span)
            .await
    }

    async fn run_workers(
        &self,
        horizon: f64,
        trial_count: usize,
        section_count: usize,
        workers: usize,
    ) -> Result<SimulationReport, SimulationError> {
        let plan = self.plan(horizon, section_count);
        let chunk = trial_count.div_ceil(workers);

        let handles: Vec<_> = (0..trial_count)
            .step_by(chunk)
            .map(|start| {
                let trials = start..(start + chunk).min(trial_count);
                let span = Span::current();
                tokio::task::spawn_blocking(move || span.in_scope(|| plan.run_trials(trials)))
            })
            .collect();

        let mut total = Partial::empty(plan.config.state_count(), section_count);
        for handle in handles {
            let partial = handle.await.map_err(SimulationError::WorkerFailed)??;
            total.absorb(partial)?;
        }

        self.finish(total, trial_count)
    }

    fn validate(
        &self,
        horizon: f64,
        trial_count: usize,
        section_count: usize,
    ) -> Result<(), SimulationError> {
        let invalid = |name, reason| Err(SimulationError::InvalidParameter { name, reason });

        if !(horizon.is_finite() && horizon > 0.0) {
            return invalid("horizon", "must be finite and positive");
        }
        if trial_count == 0 {
            return invalid("trial_count", "must be at least 1");
        }
        if section_count == 0 {
            return invalid("section_count", "must be at least 1");
        }
        if !(self.oversampling_factor.is_finite() && self.oversampling_factor > 0.0) {
            return invalid("oversampling_factor", "must be finite and positive");
        }
        Ok(())
    }

    fn plan(&self, horizon: f64, section_count: usize) -> TrialPlan {
        TrialPlan {
            config: *self.config,
            horizon,
            section_count,
            oversampling_factor: self.oversampling_factor,
            service: self.service,
            seed: self.seed,
        }
    }

    fn finish(
        &self,
        partial: Partial,
        trial_count: usize,
    ) -> Result<SimulationReport, SimulationError> {
        let Partial {
            mut histogram,
            completed,
            skipped,
        } = partial;

        let divisor = match self.normalization {
            Normalization::CompletedTrials => completed,
            Normalization::NominalTrials => trial_count,
        };
        if completed == 0 {
            warn!(skipped, "no trial covered the horizon; increase the oversampling factor");
        } else {
            histogram.scale_down(divisor as f64);
        }

        info!(completed, skipped, "simulation finished");

        Ok(SimulationReport {
            histogram,
            completed_trials: completed,
            skipped_trials: skipped,
            normalization: self.normalization,
        })
    }
}

/// Everything a worker needs to run trials, owned so it can move to another thread.
#[derive(Debug, Clone, Copy)]
struct TrialPlan {
    config: QueueConfig,
    horizon: f64,
    section_count: usize,
    oversampling_factor: f64,
    service: ServiceDistribution,
    seed: u64,
}

impl TrialPlan {
    fn run_trials(&self, trials: Range<usize>) -> Result<Partial, HistogramError> {
        debug!(start = trials.start, end = trials.end, "running trials");

        let accumulator = TrialAccumulator::new(&self.config);
        let mut partial = Partial::empty(self.config.state_count(), self.section_count);

        for trial_index in trials {
            let mut sampler = EventSampler::builder()
                .service(self.service)
                .seed(self.seed.wrapping_add(trial_index as u64))
                .build();
            let trial = sampler.sample(&self.config, self.horizon, self.oversampling_factor);

            match accumulator.fold_trial(&trial, self.horizon, self.section_count) {
                TrialOutcome::Completed(histogram) => {
                    partial.histogram.merge(&histogram)?;
                    partial.completed += 1;
                }
                TrialOutcome::Skipped(reason) => {
                    warn!(trial = trial_index, ?reason, "trial skipped");
                    partial.skipped += 1;
                }
            }
        }

        Ok(partial)
    }
}

/// Sum of some trials' histograms.
#[derive(Debug)]
struct Partial {
    histogram: OccupancyHistogram,
    completed: usize,
    skipped: usize,
}

impl Partial {
    fn empty(states: usize, sections: usize) -> Self {
        Self {
            histogram: OccupancyHistogram::zeros(states, sections),
            completed: 0,
            skipped: 0,
        }
    }

    fn absorb(&mut self, other: Partial) -> Result<(), HistogramError> {
        self.histogram.merge(&other.histogram)?;
        self.completed += other.completed;
        self.skipped += other.skipped;
        Ok(())
    }
}
