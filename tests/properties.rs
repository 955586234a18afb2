use std::sync::Arc;

use proptest::prelude::*;

use resilient::{CircuitBreaker, Config, ManualClock, RollingMetrics};

fn rolling_metrics(clock: &Arc<ManualClock>) -> RollingMetrics {
    RollingMetrics::from_config(&Config::default()).with_clock(clock.clone())
}

proptest! {
    #[test]
    fn requests_always_equals_successes_plus_failures(
        marks in proptest::collection::vec(any::<bool>(), 0..200),
        advances in proptest::collection::vec(0u64..30, 0..200),
    ) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let metrics = rolling_metrics(&clock);

        for (i, &success) in marks.iter().enumerate() {
            if success {
                metrics.mark_success();
            } else {
                metrics.mark_failure();
            }
            if let Some(&step) = advances.get(i) {
                clock.advance(step);
            }
            prop_assert_eq!(
                metrics.requests(),
                metrics.successes() + metrics.failures()
            );
        }
    }

    #[test]
    fn error_percentage_matches_the_rounding_formula(
        marks in proptest::collection::vec(any::<bool>(), 1..300),
    ) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let metrics = rolling_metrics(&clock);

        for &success in &marks {
            if success {
                metrics.mark_success();
            } else {
                metrics.mark_failure();
            }
        }

        let failures = marks.iter().filter(|&&success| !success).count() as u64;
        let requests = marks.len() as u64;
        let expected = (200 * failures + requests) / (2 * requests);
        prop_assert_eq!(metrics.error_percentage() as u64, expected);
    }

    #[test]
    fn config_build_enforces_the_divisibility_rule(
        window in 0u64..600,
        bucket in 0u64..600,
    ) {
        let result = Config::builder()
            .window_size_in_seconds(window)
            .bucket_size_in_seconds(bucket)
            .build();

        let valid = bucket > 0 && bucket < window && window % bucket == 0;
        prop_assert_eq!(result.is_ok(), valid);
    }

    #[test]
    fn allow_request_is_stable_under_a_frozen_clock(
        marks in proptest::collection::vec(any::<bool>(), 0..100),
        volume in 0u64..30,
        threshold in 0u8..=100,
    ) {
        let config = Config::builder()
            .request_volume_threshold(volume)
            .error_threshold_percentage(threshold)
            .build()
            .expect("valid config");
        let clock = Arc::new(ManualClock::new(1_000_000));
        let metrics = RollingMetrics::from_config(&config).with_clock(clock.clone());
        for &success in &marks {
            if success {
                metrics.mark_success();
            } else {
                metrics.mark_failure();
            }
        }
        let breaker = CircuitBreaker::builder()
            .config(config)
            .metrics(metrics)
            .clock(clock)
            .build();

        // The first call may trip the circuit; once it has settled, the
        // answer must not change while time stands still and no outcomes
        // are reported.
        let first = breaker.allow_request();
        for _ in 0..5 {
            prop_assert_eq!(breaker.allow_request(), first);
        }
    }

    #[test]
    fn a_reported_success_always_reopens_traffic(
        failures in 1u64..100,
    ) {
        let config = Config::builder()
            .request_volume_threshold(0)
            .error_threshold_percentage(1)
            .build()
            .expect("valid config");
        let clock = Arc::new(ManualClock::new(1_000_000));
        let metrics = RollingMetrics::from_config(&config).with_clock(clock.clone());
        let breaker = CircuitBreaker::builder()
            .config(config)
            .metrics(metrics)
            .clock(clock)
            .build();

        for _ in 0..failures {
            breaker.mark_failure();
        }
        prop_assert!(!breaker.allow_request());
        prop_assert!(breaker.open());

        breaker.mark_success();
        prop_assert!(!breaker.open());
    }
}
