use birth_death_transient::{
    generator,
    integrator::{self, integrate},
    steady_state, ProbabilityVector,
};

use crate::types::{assorted_configs, textbook_config};

/// Given any valid queue
/// When we build its generator
/// Then every from→to row sums to zero and every column of the evolution matrix sums to zero
#[test]
fn generators_are_conservative() {
    for config in assorted_configs() {
        let generator = generator::build(&config);
        let states = generator.state_count();
        assert_eq!(states, config.state_count());

        for i in 0..states {
            let row: f64 = (0..states).map(|j| generator.rate(i, j)).sum();
            let column: f64 = (0..states).map(|j| generator.entry(j, i)).sum();
            assert!(row.abs() < 1e-12, "{config}: row {i} sums to {row}");
            assert!(column.abs() < 1e-12, "{config}: column {i} sums to {column}");
        }
    }
}

/// Given the textbook queue
/// When we build its generator
/// Then row 0 holds -λ and μ, and the last diagonal entry is -μ
#[test]
fn textbook_generator() {
    let config = textbook_config();
    let generator = generator::build(&config);
    let mu = config.service_rate();

    let dense = generator.to_dense();
    assert_eq!(dense.row(0).iter().copied().collect::<Vec<_>>(), vec![-1.0, mu, 0.0, 0.0]);
    assert!(dense.row_sum().amax() < 1e-12, "columns sum to zero");
    assert_eq!(generator.entry(3, 3), -mu);
    assert_eq!(generator, generator::build(&config));
}

/// Given a small enough step
/// When we integrate from an empty system for a long time
/// Then the trajectory stays a distribution and settles on the closed-form steady state
#[test]
fn long_integration_reaches_steady_state() {
    for config in assorted_configs() {
        let generator = generator::build(&config);
        let duration = 600.0;
        // Keep dt * max_exit_rate at 0.05.
        let step_count = (duration * generator.max_exit_rate() / 0.05).ceil() as usize;

        let series = integrate(
            &generator,
            &ProbabilityVector::empty_system(config.state_count()),
            duration,
            step_count,
        )
        .unwrap();

        assert_eq!(series.len(), step_count);
        assert!(series.max_mass_deviation() < 1e-9, "{config}");

        let last = series.last().unwrap().distribution.as_slice();
        let expected = steady_state::state_probabilities(&config);
        for (state, (p, q)) in last.iter().zip(&expected).enumerate() {
            assert!((p - q).abs() < 1e-4, "{config}: state {state}: {p} vs {q}");
        }
    }
}

/// Given a step far too coarse for the rates
/// When we integrate
/// Then the result leaves the probability simplex instead of failing
#[test]
fn instability_is_observable_not_fatal() {
    let config = textbook_config();

    let series = integrator::integrate_from_empty(&config, 60.0, 20).unwrap();

    assert_eq!(series.len(), 20);
    assert!(series
        .points()
        .iter()
        .any(|p| p.distribution.as_slice().iter().any(|&v| !(0.0..=1.0).contains(&v))));
}

/// Given the textbook queue
/// When we integrate
/// Then the mean occupancy grows from zero towards its steady-state value
#[test]
fn mean_occupancy_rises_from_empty() {
    let config = textbook_config();
    let series = integrator::integrate_from_empty(&config, 60.0, 10_000).unwrap();

    let first = series.points()[0].distribution.mean_occupancy();
    let last = series.last().unwrap().distribution.mean_occupancy();

    assert_eq!(first, 0.0);
    assert!((last - steady_state::mean_in_system(&config)).abs() < 1e-3);
}
