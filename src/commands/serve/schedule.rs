use chrono::{Duration, NaiveDateTime, NaiveTime};

use crate::shared::config::{ConfigError, ScheduleConfig};

const MAX_COOLDOWN_MINUTES: u64 = 24 * 60;

/// One run per day at a fixed local time, with a shorter retry delay after
/// a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    at: NaiveTime,
    cooldown: Duration,
}

impl DailySchedule {
    /// Cooldown is clamped to 1 minute .. 1 day.
    pub fn new(at: NaiveTime, cooldown_minutes: u64) -> Self {
        let minutes = cooldown_minutes.clamp(1, MAX_COOLDOWN_MINUTES);
        Self {
            at,
            cooldown: Duration::minutes(minutes as i64),
        }
    }

    pub fn from_config(config: &ScheduleConfig) -> Result<Self, ConfigError> {
        Ok(Self::new(config.run_time()?, config.cooldown_minutes))
    }

    pub fn at(&self) -> NaiveTime {
        self.at
    }

    /// Next slot strictly after `now`: today if the time has not passed yet,
    /// otherwise tomorrow.
    pub fn next_run_after(&self, now: NaiveDateTime) -> NaiveDateTime {
        let today = now.date().and_time(self.at);
        if today > now {
            today
        } else {
            today + Duration::days(1)
        }
    }

    pub fn retry_after(&self, now: NaiveDateTime) -> NaiveDateTime {
        now + self.cooldown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn on(day: u32, h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[rstest]
    #[case::before_slot(on(1, 8, 0, 0), on(1, 9, 0, 0))]
    #[case::exactly_at_slot(on(1, 9, 0, 0), on(2, 9, 0, 0))]
    #[case::just_after_slot(on(1, 9, 0, 1), on(2, 9, 0, 0))]
    #[case::late_evening(on(1, 23, 59, 59), on(2, 9, 0, 0))]
    #[case::month_end(on(31, 10, 0, 0), NaiveDate::from_ymd_opt(2024, 4, 1).unwrap().and_time(at(9, 0)))]
    fn next_run_after(#[case] now: NaiveDateTime, #[case] expected: NaiveDateTime) {
        let schedule = DailySchedule::new(at(9, 0), 5);
        assert_eq!(schedule.next_run_after(now), expected);
    }

    #[rstest]
    #[case::configured(5, 5)]
    #[case::zero_is_raised(0, 1)]
    #[case::capped_at_a_day(100_000, 24 * 60)]
    fn retry_uses_clamped_cooldown(#[case] configured: u64, #[case] expected_minutes: i64) {
        let schedule = DailySchedule::new(at(9, 0), configured);
        let now = on(1, 9, 0, 30);
        assert_eq!(
            schedule.retry_after(now),
            now + Duration::minutes(expected_minutes)
        );
    }

    #[test]
    fn from_config_rejects_bad_time() {
        let config = ScheduleConfig {
            at: "25:00".to_string(),
            cooldown_minutes: 5,
        };
        assert!(matches!(
            DailySchedule::from_config(&config),
            Err(ConfigError::InvalidValue {
                key: "schedule.at",
                ..
            })
        ));
    }

    #[test]
    fn from_config_defaults() {
        let schedule = DailySchedule::from_config(&ScheduleConfig::default()).unwrap();
        assert_eq!(schedule.at(), at(9, 0));
    }
}
