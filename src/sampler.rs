//! Random interarrival and service times for one simulated trial.

use bon::bon;
use rand::{Rng, SeedableRng};
use rand_distr::Exp1;

use crate::config::QueueConfig;

/// How long each admitted request takes to serve.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[non_exhaustive]
pub enum ServiceDistribution {
    /// Exponential with mean `1/μ`.
    #[default]
    Exponential,
    /// Exponential with mean `1/μ + padding`.
    ///
    /// Reproduces service samplers that lengthen every service by a constant on average.
    PaddedExponential {
        /// Added to the mean service time.
        padding: f64,
    },
}

impl ServiceDistribution {
    /// Mean service time for `config`.
    pub fn mean(&self, config: &QueueConfig) -> f64 {
        let base = 1.0 / config.service_rate();
        match self {
            ServiceDistribution::Exponential => base,
            ServiceDistribution::PaddedExponential { padding } => base + padding,
        }
    }
}

/// One request of a trial.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampledEvent {
    /// Time since the previous arrival.
    pub arrival_offset: f64,
    /// How long the request would occupy the system if admitted.
    pub service_duration: f64,
}

/// The requests of one simulated trial, in arrival order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SampledTrial {
    events: Vec<SampledEvent>,
}

impl SampledTrial {
    /// All sampled events.
    pub fn events(&self) -> &[SampledEvent] {
        &self.events
    }

    /// Number of sampled events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether no events were sampled.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Arrival time of the last event.
    pub fn span(&self) -> f64 {
        self.events.iter().map(|e| e.arrival_offset).sum()
    }
}

impl FromIterator<SampledEvent> for SampledTrial {
    fn from_iter<T: IntoIterator<Item = SampledEvent>>(iter: T) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}

/// Draws interarrival gaps (exponential with rate λ) and service durations.
#[derive(Debug, Clone)]
pub struct EventSampler {
    service: ServiceDistribution,
    /// RNG for reproducibility
    rng: rand::rngs::StdRng,
}

#[bon]
impl EventSampler {
    #[allow(missing_docs)]
    #[builder]
    pub fn new(
        /// Distribution of service durations.
        #[builder(default)]
        service: ServiceDistribution,
        /// Seed for reproducibility. Uses OS entropy when absent.
        seed: Option<u64>,
    ) -> Self {
        let rng = match seed {
            Some(s) => rand::rngs::StdRng::seed_from_u64(s),
            None => rand::rngs::StdRng::from_os_rng(),
        };

        Self { service, rng }
    }
}

impl EventSampler {
    /// Sample enough events to cover `horizon` with a safety margin.
    ///
    /// Draws `ceil(horizon * oversampling_factor)` events. Nothing guarantees they reach
    /// `horizon`; a short trial is detected when it is folded.
    pub fn sample(
        &mut self,
        config: &QueueConfig,
        horizon: f64,
        oversampling_factor: f64,
    ) -> SampledTrial {
        let count = (horizon * oversampling_factor).ceil().max(0.0) as usize;
        let mean_interarrival = 1.0 / config.arrival_rate();
        let mean_service = self.service.mean(config);

        (0..count)
            .map(|_| {
                let gap: f64 = self.rng.sample(Exp1);
                let service: f64 = self.rng.sample(Exp1);
                SampledEvent {
                    arrival_offset: gap * mean_interarrival,
                    service_duration: service * mean_service,
                }
            })
            .collect()
    }
}
