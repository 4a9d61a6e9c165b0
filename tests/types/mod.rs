use birth_death_transient::QueueConfig;

/// Mean interarrival time 1, mean service time 3, two waiting slots.
pub fn textbook_config() -> QueueConfig {
    QueueConfig::from_mean_times(1.0, 3.0, 2).unwrap()
}

/// A spread of single- and multi-channel queues, including a traffic intensity of exactly 1.
pub fn assorted_configs() -> Vec<QueueConfig> {
    let single = [(1.0, 1.0 / 3.0, 2), (0.5, 2.0, 0), (3.0, 3.0, 4), (0.2, 0.1, 7)];
    let multi = [(2.0, 1.0, 1, 2), (5.0, 1.5, 3, 4)];

    single
        .into_iter()
        .map(|(arrival_rate, service_rate, capacity)| {
            QueueConfig::builder()
                .arrival_rate(arrival_rate)
                .service_rate(service_rate)
                .capacity(capacity)
                .build()
                .unwrap()
        })
        .chain(
            multi
                .into_iter()
                .map(|(arrival_rate, service_rate, capacity, channel_count)| {
                    QueueConfig::builder()
                        .arrival_rate(arrival_rate)
                        .service_rate(service_rate)
                        .capacity(capacity)
                        .channel_count(channel_count)
                        .build()
                        .unwrap()
                }),
        )
        .collect()
}
