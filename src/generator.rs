//! The transition-rate matrix of the birth-death process.
//!
//! Only neighbouring states are connected, so the matrix is stored as three bands.

use nalgebra::{DMatrix, DVector};

use crate::config::QueueConfig;

/// Generator of a finite birth-death process, laid out for `dP/dt = G · P` with `P` a column
/// vector.
///
/// Entry `(i + 1, i)` is the arrival rate (flow from `i` into `i + 1`), entry `(i, i + 1)` is the
/// service rate of state `i + 1` (flow from `i + 1` back into `i`), and the diagonal holds minus
/// the total outflow of each state. Every column therefore sums to zero; [`rate`](Self::rate)
/// gives the conventional from→to view, whose rows sum to zero.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorMatrix {
    /// `arrivals[i]`: rate from `i` to `i + 1`.
    arrivals: Vec<f64>,
    /// `services[i]`: rate from `i + 1` to `i`.
    services: Vec<f64>,
    diagonal: Vec<f64>,
}

/// Build the generator for `config`.
///
/// Arrivals at a full system are lost, so the last state has no arrival outflow. The empty state
/// has no service outflow.
pub fn build(config: &QueueConfig) -> GeneratorMatrix {
    let states = config.state_count();
    let arrival_rate = config.arrival_rate();

    let arrivals = vec![arrival_rate; states - 1];
    let services: Vec<f64> = (1..states).map(|n| config.service_rate_at(n)).collect();

    let diagonal = (0..states)
        .map(|i| {
            let up = if i + 1 < states { arrivals[i] } else { 0.0 };
            let down = if i > 0 { services[i - 1] } else { 0.0 };
            -(up + down)
        })
        .collect();

    GeneratorMatrix {
        arrivals,
        services,
        diagonal,
    }
}

impl GeneratorMatrix {
    /// Number of states (rows and columns).
    pub fn state_count(&self) -> usize {
        self.diagonal.len()
    }

    /// Entry at `(row, col)` in the `G · P` layout.
    ///
    /// # Panics
    ///
    /// If either index is out of range.
    pub fn entry(&self, row: usize, col: usize) -> f64 {
        let states = self.state_count();
        assert!(
            row < states && col < states,
            "entry ({row}, {col}) out of range for {states} states"
        );

        if row == col {
            self.diagonal[row]
        } else if row == col + 1 {
            self.arrivals[col]
        } else if col == row + 1 {
            self.services[row]
        } else {
            0.0
        }
    }

    /// Instantaneous rate of moving from state `from` to state `to`.
    ///
    /// The diagonal (`from == to`) is minus the total outflow of `from`.
    pub fn rate(&self, from: usize, to: usize) -> f64 {
        self.entry(to, from)
    }

    /// The largest total outflow of any state.
    ///
    /// A forward Euler step `dt` stays well behaved while `dt * max_exit_rate()` is small.
    pub fn max_exit_rate(&self) -> f64 {
        self.diagonal.iter().fold(0.0, |max, d| f64::max(max, -d))
    }

    /// Compute `out = G · p`.
    ///
    /// # Panics
    ///
    /// If `p` or `out` do not have [`state_count`](Self::state_count) entries.
    pub fn apply(&self, p: &DVector<f64>, out: &mut DVector<f64>) {
        let states = self.state_count();
        assert_eq!(p.len(), states, "vector length must match state count");
        assert_eq!(out.len(), states, "output length must match state count");

        for (i, slot) in out.iter_mut().enumerate() {
            let mut value = self.diagonal[i] * p[i];
            if i > 0 {
                value += self.arrivals[i - 1] * p[i - 1];
            }
            if i + 1 < states {
                value += self.services[i] * p[i + 1];
            }
            *slot = value;
        }
    }

    /// The full matrix.
    pub fn to_dense(&self) -> DMatrix<f64> {
        let states = self.state_count();
        DMatrix::from_fn(states, states, |row, col| self.entry(row, col))
    }
}
