use std::fmt::{self, Display};

use bon::bon;

use crate::error::ConfigError;

/// Parameters of a finite-capacity queue.
///
/// Requests arrive at `arrival_rate` and each channel serves at `service_rate`. Up to `capacity`
/// requests can wait beyond the `channel_count` being served; any more are turned away.
///
/// Validated on construction and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueueConfig {
    arrival_rate: f64,
    service_rate: f64,
    capacity: usize,
    channel_count: usize,
}

#[bon]
impl QueueConfig {
    #[allow(missing_docs)]
    #[builder]
    pub fn new(
        /// Requests arriving per unit time (λ).
        arrival_rate: f64,
        /// Requests completed per unit time by one channel (μ).
        service_rate: f64,
        /// Waiting slots beyond those in service.
        capacity: usize,
        /// Number of parallel service channels.
        #[builder(default = 1)]
        channel_count: usize,
    ) -> Result<Self, ConfigError> {
        check_positive(arrival_rate)
            .map_err(|value| ConfigError::InvalidRate { name: "arrival_rate", value })?;
        check_positive(service_rate)
            .map_err(|value| ConfigError::InvalidRate { name: "service_rate", value })?;
        if channel_count == 0 {
            return Err(ConfigError::NoChannels);
        }

        Ok(Self {
            arrival_rate,
            service_rate,
            capacity,
            channel_count,
        })
    }
}

impl QueueConfig {
    /// Create a single-channel queue from the mean time between arrivals and the mean time to
    /// serve one request.
    pub fn from_mean_times(
        mean_interarrival: f64,
        mean_service: f64,
        capacity: usize,
    ) -> Result<Self, ConfigError> {
        check_positive(mean_interarrival).map_err(|value| ConfigError::InvalidMeanTime {
            name: "mean_interarrival",
            value,
        })?;
        check_positive(mean_service).map_err(|value| ConfigError::InvalidMeanTime {
            name: "mean_service",
            value,
        })?;

        Self::builder()
            .arrival_rate(1.0 / mean_interarrival)
            .service_rate(1.0 / mean_service)
            .capacity(capacity)
            .build()
    }

    /// λ
    pub fn arrival_rate(&self) -> f64 {
        self.arrival_rate
    }

    /// μ, per channel.
    pub fn service_rate(&self) -> f64 {
        self.service_rate
    }

    /// Waiting slots beyond those in service.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of parallel service channels.
    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    /// The most requests that can be in the system at once. Arrivals that find this many are
    /// turned away.
    pub fn admission_threshold(&self) -> usize {
        self.channel_count + self.capacity
    }

    /// Number of occupancy states, `0..=admission_threshold()`.
    pub fn state_count(&self) -> usize {
        self.admission_threshold() + 1
    }

    /// λ/μ
    pub fn traffic_intensity(&self) -> f64 {
        self.arrival_rate / self.service_rate
    }

    /// Total service rate when `occupancy` requests are in the system.
    pub(crate) fn service_rate_at(&self, occupancy: usize) -> f64 {
        occupancy.min(self.channel_count) as f64 * self.service_rate
    }
}

impl Display for QueueConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "arrival_rate: {}, service_rate: {}, capacity: {}, channels: {}",
            self.arrival_rate, self.service_rate, self.capacity, self.channel_count
        )
    }
}

fn check_positive(value: f64) -> Result<f64, f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(value)
    }
}
