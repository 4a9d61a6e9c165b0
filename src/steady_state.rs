//! Closed-form steady-state metrics.
//!
//! Every function is a pure function of the [`QueueConfig`]; nothing is cached between calls.

use crate::config::QueueConfig;

/// Long-run probability of each occupancy state.
///
/// Uses the birth-death product form `p_n ∝ Π_{k=1..n} λ / μ_k` with `μ_k = min(k, c)·μ`, which
/// also covers a traffic intensity of exactly 1.
pub fn state_probabilities(config: &QueueConfig) -> Vec<f64> {
    let mut weights = Vec::with_capacity(config.state_count());
    let mut weight = 1.0;
    weights.push(weight);
    for n in 1..config.state_count() {
        weight *= config.arrival_rate() / config.service_rate_at(n);
        weights.push(weight);
    }

    let total: f64 = weights.iter().sum();
    for w in &mut weights {
        *w /= total;
    }
    weights
}

/// Probability that an arriving request finds the system full and is turned away.
pub fn denial_probability(config: &QueueConfig) -> f64 {
    state_probabilities(config)
        .last()
        .copied()
        .unwrap_or_default()
}

/// Probability that an arriving request is admitted.
pub fn acceptance_probability(config: &QueueConfig) -> f64 {
    1.0 - denial_probability(config)
}

/// Share of arriving requests that get served.
pub fn relative_throughput(config: &QueueConfig) -> f64 {
    acceptance_probability(config)
}

/// Requests served per unit time. Equal to the rate of the outgoing flow.
pub fn absolute_throughput(config: &QueueConfig) -> f64 {
    config.arrival_rate() * relative_throughput(config)
}

/// Mean number of requests waiting.
pub fn mean_queue_length(config: &QueueConfig) -> f64 {
    let channels = config.channel_count();
    state_probabilities(config)
        .iter()
        .enumerate()
        .skip(channels + 1)
        .map(|(n, p)| (n - channels) as f64 * p)
        .sum()
}

/// Mean number of requests being served.
pub fn mean_in_service(config: &QueueConfig) -> f64 {
    let channels = config.channel_count();
    state_probabilities(config)
        .iter()
        .enumerate()
        .map(|(n, p)| n.min(channels) as f64 * p)
        .sum()
}

/// Mean number of requests in the system, waiting or in service.
pub fn mean_in_system(config: &QueueConfig) -> f64 {
    mean_queue_length(config) + mean_in_service(config)
}

/// Mean time spent waiting, averaged over all arriving requests.
///
/// Turned-away requests count as waiting zero time.
pub fn mean_waiting_time(config: &QueueConfig) -> f64 {
    mean_queue_length(config) / config.arrival_rate()
}

/// Mean time spent in the system, averaged over all arriving requests.
pub fn mean_sojourn_time(config: &QueueConfig) -> f64 {
    mean_in_system(config) / config.arrival_rate()
}

/// Mean service time of a request that is served.
pub fn mean_service_time(config: &QueueConfig) -> f64 {
    1.0 / config.service_rate()
}

/// Mean service time averaged over all arriving requests, turned-away ones included.
pub fn mean_service_time_per_arrival(config: &QueueConfig) -> f64 {
    mean_in_service(config) / config.arrival_rate()
}

/// Every steady-state metric of a queue.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct SteadyState {
    /// λ/μ
    pub traffic_intensity: f64,
    /// Probability of each occupancy state.
    pub state_probabilities: Vec<f64>,
    /// See [`denial_probability`].
    pub denial_probability: f64,
    /// See [`acceptance_probability`].
    pub acceptance_probability: f64,
    /// See [`relative_throughput`].
    pub relative_throughput: f64,
    /// See [`absolute_throughput`].
    pub absolute_throughput: f64,
    /// See [`mean_queue_length`].
    pub mean_queue_length: f64,
    /// See [`mean_in_service`].
    pub mean_in_service: f64,
    /// See [`mean_in_system`].
    pub mean_in_system: f64,
    /// See [`mean_waiting_time`].
    pub mean_waiting_time: f64,
    /// See [`mean_sojourn_time`].
    pub mean_sojourn_time: f64,
    /// See [`mean_service_time`].
    pub mean_service_time: f64,
    /// See [`mean_service_time_per_arrival`].
    pub mean_service_time_per_arrival: f64,
}

impl SteadyState {
    /// Compute every metric for `config`.
    pub fn compute(config: &QueueConfig) -> Self {
        Self {
            traffic_intensity: config.traffic_intensity(),
            state_probabilities: state_probabilities(config),
            denial_probability: denial_probability(config),
            acceptance_probability: acceptance_probability(config),
            relative_throughput: relative_throughput(config),
            absolute_throughput: absolute_throughput(config),
            mean_queue_length: mean_queue_length(config),
            mean_in_service: mean_in_service(config),
            mean_in_system: mean_in_system(config),
            mean_waiting_time: mean_waiting_time(config),
            mean_sojourn_time: mean_sojourn_time(config),
            mean_service_time: mean_service_time(config),
            mean_service_time_per_arrival: mean_service_time_per_arrival(config),
        }
    }

    /// Scalar metrics with human-readable labels, in reporting order.
    pub fn labelled(&self) -> [(&'static str, f64); 12] {
        [
            ("Traffic intensity", self.traffic_intensity),
            ("Denial probability", self.denial_probability),
            ("Acceptance probability", self.acceptance_probability),
            ("Relative throughput", self.relative_throughput),
            ("Absolute throughput", self.absolute_throughput),
            ("Mean queue length", self.mean_queue_length),
            ("Mean requests in service", self.mean_in_service),
            ("Mean requests in system", self.mean_in_system),
            ("Mean waiting time", self.mean_waiting_time),
            ("Mean time in system", self.mean_sojourn_time),
            ("Mean service time (served)", self.mean_service_time),
            ("Mean service time (all)", self.mean_service_time_per_arrival),
        ]
    }
}
