//! Transient and steady-state analysis of finite-capacity queues.
//!
//! A queue with `c` service channels and `m` waiting slots is a birth-death process over the
//! occupancy states `0..=c + m`. Requests that arrive when all `c + m` places are taken are
//! turned away.
//!
//! The transient distribution (how the occupancy probabilities evolve from an empty system) is
//! computed two independent ways so the results can be cross-checked:
//!
//! - [`integrator`] evolves the Kolmogorov forward equation built from the
//!   [`generator`] matrix with fixed-step forward Euler.
//! - [`SimulationRunner`] samples many independent trials and averages their time-bucketed
//!   occupancy.
//!
//! Closed-form long-run metrics live in [`steady_state`], with text formatting in [`report`] and
//! plain-text data export for plotting in [`export`].
//!
//! See the README for an example.

#![deny(missing_docs)]

#[cfg(doctest)]
use doc_comment::doctest;
#[cfg(doctest)]
doctest!("../README.md");

mod accumulator;
mod config;
pub mod error;
pub mod export;
pub mod generator;
pub mod integrator;
pub mod report;
mod sampler;
mod simulation;
pub mod steady_state;

pub use accumulator::{OccupancyHistogram, TrialAccumulator, TrialOutcome, TrialSkip};
pub use config::QueueConfig;
pub use error::{ConfigError, HistogramError, IntegrationError, SimulationError};
pub use generator::GeneratorMatrix;
pub use integrator::{ProbabilityVector, TimePoint, TimeSeries};
pub use report::{ReportFormat, SteadyStateReport};
pub use sampler::{EventSampler, SampledEvent, SampledTrial, ServiceDistribution};
pub use simulation::{Normalization, SimulationReport, SimulationRunner};
pub use steady_state::SteadyState;
