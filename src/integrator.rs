//! Fixed-step forward Euler integration of the transient distribution.

use nalgebra::DVector;
use tracing::debug;

use crate::{
    config::QueueConfig,
    error::IntegrationError,
    generator::{self, GeneratorMatrix},
};

/// How far the initial distribution may stray from a total mass of 1.
const NORMALISATION_TOLERANCE: f64 = 1e-9;

/// A distribution over occupancy states.
///
/// Entries are only guaranteed to be non-negative and sum to 1 while integration is stable.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbabilityVector(DVector<f64>);

impl ProbabilityVector {
    /// All mass on state 0: the system starts empty.
    pub fn empty_system(state_count: usize) -> Self {
        let mut p = DVector::zeros(state_count);
        if state_count > 0 {
            p[0] = 1.0;
        }
        Self(p)
    }

    /// Probabilities indexed by occupancy.
    pub fn as_slice(&self) -> &[f64] {
        self.0.as_slice()
    }

    /// The underlying column vector.
    pub fn as_vector(&self) -> &DVector<f64> {
        &self.0
    }

    /// Number of states.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no states at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all entries.
    pub fn total_mass(&self) -> f64 {
        self.0.sum()
    }

    /// Expected number of requests in the system.
    pub fn mean_occupancy(&self) -> f64 {
        self.0.iter().enumerate().map(|(n, p)| n as f64 * p).sum()
    }

    /// Whether every entry lies in `[0, 1]` and the total is within `tolerance` of 1.
    pub fn is_distribution(&self, tolerance: f64) -> bool {
        self.0.iter().all(|p| (-tolerance..=1.0 + tolerance).contains(p))
            && (self.total_mass() - 1.0).abs() <= tolerance
    }
}

impl From<Vec<f64>> for ProbabilityVector {
    fn from(p: Vec<f64>) -> Self {
        Self(DVector::from_vec(p))
    }
}

impl From<DVector<f64>> for ProbabilityVector {
    fn from(p: DVector<f64>) -> Self {
        Self(p)
    }
}

/// One point of a transient trajectory.
#[derive(Debug, Clone, PartialEq)]
pub struct TimePoint {
    /// Simulated time.
    pub time: f64,
    /// Distribution over states at `time`.
    pub distribution: ProbabilityVector,
}

/// A transient trajectory, ordered by time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimeSeries {
    points: Vec<TimePoint>,
}

impl TimeSeries {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    fn push(&mut self, time: f64, distribution: ProbabilityVector) {
        self.points.push(TimePoint { time, distribution });
    }

    /// All points.
    pub fn points(&self) -> &[TimePoint] {
        &self.points
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether there are no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// The last point.
    pub fn last(&self) -> Option<&TimePoint> {
        self.points.last()
    }

    /// The time axis.
    pub fn times(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.time).collect()
    }

    /// Probability of `state` over time.
    ///
    /// # Panics
    ///
    /// If `state` is out of range.
    pub fn state_series(&self, state: usize) -> Vec<f64> {
        self.points
            .iter()
            .map(|p| p.distribution.as_slice()[state])
            .collect()
    }

    /// The largest distance of any point's total mass from 1.
    ///
    /// Close to zero for a stable integration; grows quickly when the step is too coarse.
    pub fn max_mass_deviation(&self) -> f64 {
        self.points
            .iter()
            .map(|p| (p.distribution.total_mass() - 1.0).abs())
            .fold(0.0, f64::max)
    }
}

/// Evolve `initial` under `generator` for `duration`, in `step_count` equal steps.
///
/// Returns exactly `step_count` points at `t = k * dt` for `k` in `0..step_count`, where
/// `dt = duration / step_count`. The first point is `initial` itself.
///
/// Stability is the caller's responsibility: keep `dt * generator.max_exit_rate()` well below 1.
/// Coarser steps are not rejected, they produce entries outside `[0, 1]`.
pub fn integrate(
    generator: &GeneratorMatrix,
    initial: &ProbabilityVector,
    duration: f64,
    step_count: usize,
) -> Result<TimeSeries, IntegrationError> {
    if step_count < 2 {
        return Err(IntegrationError::TooFewSteps(step_count));
    }
    if !(duration.is_finite() && duration > 0.0) {
        return Err(IntegrationError::InvalidDuration(duration));
    }
    if initial.len() != generator.state_count() {
        return Err(IntegrationError::StateCountMismatch {
            expected: generator.state_count(),
            actual: initial.len(),
        });
    }
    let mass = initial.total_mass();
    if (mass - 1.0).abs() > NORMALISATION_TOLERANCE {
        return Err(IntegrationError::NotNormalised(mass));
    }

    let dt = duration / step_count as f64;
    debug!(
        dt,
        step_count,
        stiffness = dt * generator.max_exit_rate(),
        "integrating transient distribution"
    );

    let mut series = TimeSeries::with_capacity(step_count);
    let mut current = initial.0.clone();
    let mut derivative = DVector::zeros(current.len());

    series.push(0.0, initial.clone());
    for k in 1..step_count {
        generator.apply(&current, &mut derivative);
        current += &derivative * dt;
        series.push(k as f64 * dt, ProbabilityVector(current.clone()));
    }

    Ok(series)
}

/// Build the generator for `config` and integrate from an empty system.
pub fn integrate_from_empty(
    config: &QueueConfig,
    duration: f64,
    step_count: usize,
) -> Result<TimeSeries, IntegrationError> {
    let generator = generator::build(config);
    let initial = ProbabilityVector::empty_system(config.state_count());
    integrate(&generator, &initial, duration, step_count)
}
