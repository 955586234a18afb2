use std::thread;
use std::time::Duration;

use resilient::{CircuitBreaker, Config, ConfigError};

// A service that fails for a while, then recovers.
fn flaky_service(call: u32) -> Result<String, String> {
    if (5..12).contains(&call) {
        Err(format!("service unavailable (call {})", call))
    } else {
        Ok(format!("response {}", call))
    }
}

fn main() -> Result<(), ConfigError> {
    let config = Config::builder()
        .error_threshold_percentage(50)
        .request_volume_threshold(5)
        .sleep_window_seconds(2)
        .window_size_in_seconds(60)
        .bucket_size_in_seconds(10)
        .build()?;

    let breaker = CircuitBreaker::builder().config(config).build();

    for call in 0..20 {
        if breaker.allow_request() {
            match flaky_service(call) {
                Ok(response) => {
                    breaker.mark_success();
                    println!("call {:2}: ok       - {}", call, response);
                }
                Err(err) => {
                    breaker.mark_failure();
                    println!("call {:2}: failed   - {}", call, err);
                }
            }
        } else {
            println!("call {:2}: short-circuited (circuit open)", call);
        }

        thread::sleep(Duration::from_millis(300));
    }

    Ok(())
}
