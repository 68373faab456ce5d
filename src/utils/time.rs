use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

const NANOS_PER_SECOND: u128 = 1_000_000_000;

/// Time provider trait for dependency injection and testing
pub trait TimeProvider: Send + Sync {
    fn now_nanos(&self) -> u64;
}

/// Monotonic clock anchored at creation
pub struct MonotonicTimeProvider {
    origin: Instant,
}

impl MonotonicTimeProvider {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicTimeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeProvider for MonotonicTimeProvider {
    fn now_nanos(&self) -> u64 {
        self.origin.elapsed().as_nanos() as u64
    }
}

/// Mock time provider for deterministic testing
pub struct MockTimeProvider {
    current_time: AtomicU64,
}

impl MockTimeProvider {
    pub fn new(initial_time_nanos: u64) -> Self {
        Self {
            current_time: AtomicU64::new(initial_time_nanos),
        }
    }

    pub fn advance_by(&self, nanos: u64) {
        self.current_time.fetch_add(nanos, Ordering::Relaxed);
    }

    pub fn set_time(&self, nanos: u64) {
        self.current_time.store(nanos, Ordering::Relaxed);
    }
}

impl TimeProvider for MockTimeProvider {
    fn now_nanos(&self) -> u64 {
        self.current_time.load(Ordering::Relaxed)
    }
}

/// Number of whole samples produced at `rate_hz` during `elapsed_nanos`
pub fn samples_in(elapsed_nanos: u64, rate_hz: u32) -> u64 {
    (elapsed_nanos as u128 * rate_hz as u128 / NANOS_PER_SECOND) as u64
}

/// Time needed to produce `samples` at `rate_hz`, rounded up to the next nanosecond
pub fn duration_of(samples: u64, rate_hz: u32) -> Duration {
    if rate_hz == 0 {
        return Duration::ZERO;
    }
    let nanos = (samples as u128 * NANOS_PER_SECOND).div_ceil(rate_hz as u128);
    Duration::from_nanos(nanos.min(u64::MAX as u128) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_in_truncates() {
        assert_eq!(samples_in(1_000_000_000, 512), 512);
        assert_eq!(samples_in(1_999_999, 512), 1);
        assert_eq!(samples_in(0, 512), 0);
    }

    #[test]
    fn test_duration_of_covers_samples() {
        let d = duration_of(32, 512);
        assert_eq!(d, Duration::from_millis(62) + Duration::from_micros(500));
        assert!(samples_in(duration_of(3, 1000).as_nanos() as u64, 1000) >= 3);
        assert_eq!(duration_of(10, 0), Duration::ZERO);
    }

    #[test]
    fn test_mock_time_provider() {
        let clock = MockTimeProvider::new(1_000);
        clock.advance_by(500);
        assert_eq!(clock.now_nanos(), 1_500);
        clock.set_time(10);
        assert_eq!(clock.now_nanos(), 10);
    }

    #[test]
    fn test_monotonic_provider_advances() {
        let clock = MonotonicTimeProvider::new();
        let first = clock.now_nanos();
        std::thread::sleep(Duration::from_millis(1));
        assert!(clock.now_nanos() > first);
    }
}
