use std::time::Duration;

use rand::Rng;

use crate::config::PacingConfig;

/// Randomized delay between consecutive lookups
#[derive(Debug, Clone)]
pub struct PacingController {
    max_delay: Duration,
    pace_first: bool,
}

impl PacingController {
    pub fn new(max_delay_ms: u64, pace_first: bool) -> Self {
        Self {
            max_delay: Duration::from_millis(max_delay_ms),
            pace_first,
        }
    }

    pub fn from_config(config: &PacingConfig) -> Self {
        Self::new(config.max_delay_ms, config.pace_first)
    }

    pub fn disabled() -> Self {
        Self::new(0, false)
    }

    pub fn is_enabled(&self) -> bool {
        !self.max_delay.is_zero()
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Delay to wait before record `index`, drawn uniformly from `[0, max)`.
    ///
    /// The first record is not paced unless `pace_first` is set.
    pub fn delay_for(&self, index: usize) -> Option<Duration> {
        if index == 0 && !self.pace_first {
            return None;
        }

        let max_micros = u64::try_from(self.max_delay.as_micros()).unwrap_or(u64::MAX);
        if max_micros == 0 {
            return None;
        }

        let mut rng = rand::rng();
        Some(Duration::from_micros(rng.random_range(0..max_micros)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_record_is_not_paced() {
        let pacing = PacingController::new(1500, false);

        assert_eq!(pacing.delay_for(0), None);
    }

    #[test]
    fn test_delay_stays_below_maximum() {
        let pacing = PacingController::new(1500, false);

        for index in 1..200 {
            let delay = pacing.delay_for(index).unwrap();
            assert!(delay < Duration::from_millis(1500));
        }
    }

    #[test]
    fn test_huge_maximum_saturates() {
        // 2^61 ms is an exact multiple of 2^64 µs
        for max_delay_ms in [1u64 << 61, u64::MAX] {
            let pacing = PacingController::new(max_delay_ms, false);

            let delay = pacing.delay_for(1).unwrap();
            assert!(delay < Duration::from_micros(u64::MAX));
        }
    }

    #[test]
    fn test_disabled_never_paces() {
        let pacing = PacingController::disabled();

        assert!(!pacing.is_enabled());
        assert_eq!(pacing.delay_for(0), None);
        assert_eq!(pacing.delay_for(5), None);
    }

    #[test]
    fn test_pace_first_option() {
        let pacing = PacingController::from_config(&PacingConfig {
            max_delay_ms: 10,
            pace_first: true,
        });

        assert!(pacing.delay_for(0).is_some());
    }
}
