//! Errors.

use thiserror::Error;

/// A queue could not be configured with the given parameters.
///
/// Unrecoverable for that set of parameters.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum ConfigError {
    /// A rate was zero, negative, infinite or NaN.
    #[error("{name} must be finite and positive, got {value}")]
    InvalidRate {
        /// Which rate was rejected.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A mean time was zero, negative, infinite or NaN.
    #[error("{name} must be finite and positive, got {value}")]
    InvalidMeanTime {
        /// Which mean time was rejected.
        name: &'static str,
        /// The rejected value.
        value: f64,
    },

    /// A queue needs at least one service channel.
    #[error("channel_count must be at least 1")]
    NoChannels,
}

/// The preconditions of a transient integration were not met.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum IntegrationError {
    /// Fewer than two steps were requested.
    #[error("step_count must be at least 2, got {0}")]
    TooFewSteps(usize),

    /// The duration was zero, negative, infinite or NaN.
    #[error("duration must be finite and positive, got {0}")]
    InvalidDuration(f64),

    /// The initial distribution does not cover the generator's state space.
    #[error("initial distribution has {actual} states but the generator has {expected}")]
    StateCountMismatch {
        /// States in the generator.
        expected: usize,
        /// States in the initial distribution.
        actual: usize,
    },

    /// The initial distribution does not sum to 1.
    #[error("initial distribution must sum to 1, got {0}")]
    NotNormalised(f64),
}

/// A simulation run could not be started.
///
/// Per-trial problems never surface here: they are reported as
/// [`TrialOutcome::Skipped`](crate::TrialOutcome::Skipped) and counted in the report.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SimulationError {
    /// A run parameter was out of range.
    #[error("invalid simulation parameter {name}: {reason}")]
    InvalidParameter {
        /// The offending parameter.
        name: &'static str,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// A worker running a share of the trials panicked or was cancelled.
    #[error("simulation worker failed")]
    WorkerFailed(#[source] tokio::task::JoinError),

    /// Merging histograms failed.
    #[error(transparent)]
    Histogram(#[from] HistogramError),
}

/// Histograms of different shapes cannot be combined.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("histogram shape mismatch: expected {expected:?}, got {actual:?}")]
pub struct HistogramError {
    /// `(states, sections)` of the receiving histogram.
    pub expected: (usize, usize),
    /// `(states, sections)` of the histogram being merged in.
    pub actual: (usize, usize),
}
