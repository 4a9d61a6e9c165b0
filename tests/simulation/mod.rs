use assert_matches::assert_matches;
use birth_death_transient::{
    export, EventSampler, Normalization, SimulationError, SimulationRunner, TrialAccumulator,
    TrialOutcome, TrialSkip,
};
use tracing::Level;
use tracing_capture::{CaptureLayer, SharedStorage};
use tracing_subscriber::layer::SubscriberExt;

use crate::types::{assorted_configs, textbook_config};

/// Given any valid queue
/// When we run a simulation
/// Then every entry is an averaged indicator and every bucket holds one unit of probability
#[test]
fn histograms_are_distributions_per_bucket() {
    for config in assorted_configs() {
        let runner = SimulationRunner::builder()
            .config(&config)
            .oversampling_factor(20.0)
            .seed(17)
            .build();

        let report = runner.run(30.0, 50, 30).unwrap();

        assert_eq!(report.histogram.shape(), (config.state_count(), 30));
        assert!(report.completed_trials > 0, "{config}");
        for section in 0..30 {
            let column = report.histogram.column(section);
            assert!(column.iter().all(|v| (0.0..=1.0).contains(v)));
            let total: f64 = column.iter().sum();
            assert!((total - 1.0).abs() < 1e-9, "{config}: bucket {section}");
        }
    }
}

/// Given the textbook queue
/// When we run a single trial with a single section
/// Then the result is a single column of indicators
#[test]
fn one_trial_one_section() {
    let config = textbook_config();
    let runner = SimulationRunner::builder().config(&config).seed(5).build();

    let report = runner.run(60.0, 1, 1).unwrap();

    assert_eq!(report.histogram.shape(), (4, 1));
    assert!(report
        .histogram
        .cells()
        .iter()
        .all(|v| (0.0..=1.0).contains(v)));
}

/// Given a sampler and an accumulator driven by hand
/// When a trial has plenty of events
/// Then it completes, and with too few it is skipped
#[test]
fn sampler_and_accumulator_compose() {
    let config = textbook_config();
    let accumulator = TrialAccumulator::new(&config);

    let mut sampler = EventSampler::builder().seed(3).build();
    let plenty = sampler.sample(&config, 60.0, 5.0);
    assert_matches!(
        accumulator.fold_trial(&plenty, 60.0, 200),
        TrialOutcome::Completed(h) if h.shape() == (4, 200)
    );

    let scarce = sampler.sample(&config, 60.0, 0.05);
    assert_matches!(
        accumulator.fold_trial(&scarce, 60.0, 200),
        TrialOutcome::Skipped(TrialSkip::SamplesExhausted { events: 3, .. })
    );
}

/// Given a run where some trials run out of events
/// When we normalise by the nominal trial count
/// Then the estimate is scaled down by the share of completed trials
#[test]
fn nominal_normalization() {
    let config = textbook_config();
    let runner = SimulationRunner::builder()
        .config(&config)
        .oversampling_factor(1.0)
        .normalization(Normalization::NominalTrials)
        .seed(23)
        .build();

    let report = runner.run(60.0, 100, 10).unwrap();

    assert_eq!(report.normalization, Normalization::NominalTrials);
    assert_eq!(report.completed_trials + report.skipped_trials, 100);
    let share = report.completed_trials as f64 / 100.0;
    for section in 0..10 {
        let total: f64 = report.histogram.column(section).iter().sum();
        assert!((total - share).abs() < 1e-9);
    }
}

/// Given invalid run parameters
/// When we run
/// Then the run is rejected before any trial starts
#[test]
fn invalid_run_parameters() {
    let config = textbook_config();
    let runner = SimulationRunner::builder()
        .config(&config)
        .oversampling_factor(-1.0)
        .build();

    assert_matches!(
        runner.run(60.0, 10, 10),
        Err(SimulationError::InvalidParameter {
            name: "oversampling_factor",
            ..
        })
    );
}

/// Given a multi-threaded runtime
/// When we split trials across workers
/// Then the result matches the sequential run
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_matches_sequential() {
    let config = textbook_config();
    let runner = SimulationRunner::builder().config(&config).seed(99).build();

    let sequential = runner.run(60.0, 40, 60).unwrap();
    for workers in [1, 3, 7, 40, 100] {
        let concurrent = runner.run_concurrent(60.0, 40, 60, workers).await.unwrap();
        assert_eq!(sequential, concurrent, "{workers} workers");
    }
}

/// Given trials that run out of events
/// When we run
/// Then each skip is reported as a warning inside the run's span
#[test]
fn skipped_trials_are_logged() {
    let subscriber = tracing_subscriber::fmt()
        .pretty()
        .with_max_level(Level::INFO)
        .with_test_writer()
        .finish();
    let storage = SharedStorage::default();
    let subscriber = subscriber.with(CaptureLayer::new(&storage));
    let _guard = tracing::subscriber::set_default(subscriber);

    let config = textbook_config();
    let runner = SimulationRunner::builder()
        .config(&config)
        .oversampling_factor(0.1)
        .seed(8)
        .build();

    let report = runner.run(60.0, 4, 10).unwrap();
    assert_eq!(report.skipped_trials, 4);

    let storage = storage.lock();

    let run_spans: Vec<_> = storage
        .all_spans()
        .filter(|span| span.metadata().name() == "simulation run")
        .collect();
    assert_eq!(run_spans.len(), 1, "should be a single span for the run");
    assert_eq!(
        run_spans[0]["trials"], 4u64,
        "trials shouldn't be emitted as a string"
    );

    let skip_events: Vec<_> = storage
        .all_events()
        .filter(|event| event.message() == Some("trial skipped"))
        .collect();
    assert_eq!(skip_events.len(), 4, "should be one warning per skipped trial");
    for event in skip_events {
        assert_eq!(*event.metadata().level(), Level::WARN);
        assert_eq!(
            event.parent(),
            Some(run_spans[0].clone()),
            "skip warnings should belong to the run span"
        );
    }
}

/// Given a finished run
/// When we export it
/// Then there is one line per bucket plus a header
#[test]
fn export_for_plotting() {
    let config = textbook_config();
    let runner = SimulationRunner::builder().config(&config).seed(12).build();
    let report = runner.run(60.0, 10, 20).unwrap();

    let mut out = Vec::new();
    export::write_histogram(&mut out, &report.histogram, 60.0).unwrap();

    let text = String::from_utf8(out).unwrap();
    assert_eq!(text.lines().count(), 21);
    assert!(text.starts_with("# time p0 p1 p2 p3\n0 "));
}
