use chrono::{DateTime, SubsecRound, Utc};

/// Source of "now" for timestamps.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock, truncated to the millisecond precision the store keeps.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now().trunc_subsecs(3)
    }
}

/// Always reports the same instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn system_clock_has_millisecond_precision() {
        let now = SystemClock.now();
        assert_eq!(now.nanosecond() % 1_000_000, 0);
    }

    #[test]
    fn fixed_clock_is_fixed() {
        let t = Utc.with_ymd_and_hms(2024, 1, 5, 9, 30, 0).unwrap();
        let c = FixedClock(t);
        assert_eq!(c.now(), t);
        assert_eq!(c.now(), c.now());
    }
}
