// SPDX-License-Identifier: MIT

//! Date/time signal provider

use chrono::{Local, NaiveDateTime};

/// Supplies the present moment for the evaluating host
pub trait Clock: Send + Sync {
    /// Current wall-clock date and time in the host's local timezone.
    /// Never fails.
    fn current_date_time(&self) -> NaiveDateTime;
}

/// Clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn current_date_time(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock pinned to a fixed instant, for hosts simulating a moment in time
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn current_date_time(&self) -> NaiveDateTime {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_fixed_clock_returns_pinned_instant() {
        let instant = NaiveDate::from_ymd_opt(2016, 6, 3)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let clock = FixedClock(instant);

        assert_eq!(clock.current_date_time(), instant);
        assert_eq!(clock.current_date_time(), instant);
    }
}
