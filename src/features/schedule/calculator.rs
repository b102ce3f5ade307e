//! Next-run calculation for reminder schedules.
//!
//! Pure functions from a [`Schedule`] plus a reference instant to the next
//! concrete execution instant, all in the configured civil zone. Calendar
//! arithmetic (month lengths, DST gaps) is chrono's job; a local time that
//! does not exist in the zone simply disqualifies that candidate.

use chrono::{DateTime, Datelike, Days, NaiveDate, NaiveTime, Timelike};
use chrono_tz::Tz;

use crate::features::schedule::model::{parse_hhmm, parse_instant, resolve_civil, Schedule};

/// How many months ahead the monthly resolver will scan before giving up.
/// Any day 1-31 recurs within a year; the margin covers DST-skipped slots.
const MONTHLY_SCAN_LIMIT: u32 = 48;

/// First execution instant for a freshly registered schedule.
///
/// Returns `None` when the schedule is structurally unusable (bad `HH:MM`,
/// out-of-range weekday/day, unparseable embedded instant).
pub fn initial_run_at(schedule: &Schedule, now: DateTime<Tz>) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    match schedule {
        Schedule::Once { run_at } => parse_instant(run_at, tz),
        Schedule::Weekly { weekday, time } => {
            if *weekday > 6 {
                return None;
            }
            let (hour, minute) = parse_hhmm(time)?;
            let target = NaiveTime::from_hms_opt(hour, minute, 0)?;

            let mut days_ahead =
                i64::from(*weekday) - i64::from(now.weekday().num_days_from_monday());
            if days_ahead < 0 {
                days_ahead += 7;
            } else if days_ahead == 0 && now.time() >= target {
                // Today's slot already passed (or is right now): next week
                days_ahead = 7;
            }

            let date = now
                .date_naive()
                .checked_add_days(Days::new(days_ahead as u64))?;
            resolve_civil(tz, date, hour, minute)
        }
        Schedule::Monthly { day, time } => {
            if !(1..=31).contains(day) {
                return None;
            }
            let (hour, minute) = parse_hhmm(time)?;

            let mut year = now.year();
            let mut month = now.month();
            for _ in 0..MONTHLY_SCAN_LIMIT {
                if let Some(date) = NaiveDate::from_ymd_opt(year, month, u32::from(*day)) {
                    if let Some(candidate) = resolve_civil(tz, date, hour, minute) {
                        if candidate > now {
                            return Some(candidate);
                        }
                    }
                }
                (year, month) = next_month(year, month);
            }
            None
        }
    }
}

/// Next execution instant after a firing at `previous_run`.
///
/// `None` means the schedule is terminal (one-off) or unusable; the sweep
/// retires the reminder either way. Weekly advancement is anchored to the
/// previous scheduled instant, not the processing time, so a sweep that
/// runs late does not drift the series.
pub fn advance(schedule: &Schedule, previous_run: DateTime<Tz>) -> Option<DateTime<Tz>> {
    let tz = previous_run.timezone();
    match schedule {
        Schedule::Once { .. } => None,
        Schedule::Weekly { weekday, time } => {
            if *weekday > 6 {
                return None;
            }
            let (hour, minute) = parse_hhmm(time)?;
            let date = previous_run.date_naive().checked_add_days(Days::new(7))?;
            resolve_civil(tz, date, hour, minute)
        }
        Schedule::Monthly { day, time } => {
            if !(1..=31).contains(day) {
                return None;
            }
            let (hour, minute) = parse_hhmm(time)?;

            let (mut year, mut month) = next_month(previous_run.year(), previous_run.month());
            for _ in 0..MONTHLY_SCAN_LIMIT {
                if let Some(date) = NaiveDate::from_ymd_opt(year, month, u32::from(*day)) {
                    if let Some(candidate) = resolve_civil(tz, date, hour, minute) {
                        return Some(candidate);
                    }
                }
                (year, month) = next_month(year, month);
            }
            None
        }
    }
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Tokyo;

    fn tokyo(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Tz> {
        Tokyo.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    fn weekly(weekday: u8, time: &str) -> Schedule {
        Schedule::Weekly {
            weekday,
            time: time.to_string(),
        }
    }

    fn monthly(day: u8, time: &str) -> Schedule {
        Schedule::Monthly {
            day,
            time: time.to_string(),
        }
    }

    // ---- once ----

    #[test]
    fn test_once_initial_returns_embedded_instant() {
        let schedule = Schedule::Once {
            run_at: "2025-05-03T14:00:00+09:00".to_string(),
        };
        let now = tokyo(2025, 1, 1, 10, 0);
        assert_eq!(
            initial_run_at(&schedule, now).unwrap(),
            tokyo(2025, 5, 3, 14, 0)
        );
    }

    #[test]
    fn test_once_advance_is_terminal() {
        let schedule = Schedule::Once {
            run_at: "2025-05-03T14:00:00+09:00".to_string(),
        };
        assert_eq!(advance(&schedule, tokyo(2025, 5, 3, 14, 0)), None);
    }

    #[test]
    fn test_once_initial_rejects_bad_instant() {
        let schedule = Schedule::Once {
            run_at: "yesterday-ish".to_string(),
        };
        assert_eq!(initial_run_at(&schedule, tokyo(2025, 1, 1, 0, 0)), None);
    }

    // ---- weekly ----

    #[test]
    fn test_weekly_initial_later_this_week() {
        // Wed 2025-01-01; Friday (4) 20:00 is two days out
        let now = tokyo(2025, 1, 1, 10, 0);
        assert_eq!(
            initial_run_at(&weekly(4, "20:00"), now).unwrap(),
            tokyo(2025, 1, 3, 20, 0)
        );
    }

    #[test]
    fn test_weekly_initial_today_if_time_not_passed() {
        // Wed 2025-01-01 10:00; Wednesday (2) 20:00 is still today
        let now = tokyo(2025, 1, 1, 10, 0);
        assert_eq!(
            initial_run_at(&weekly(2, "20:00"), now).unwrap(),
            tokyo(2025, 1, 1, 20, 0)
        );
    }

    #[test]
    fn test_weekly_initial_exactly_now_goes_next_week() {
        let now = tokyo(2025, 1, 1, 20, 0);
        assert_eq!(
            initial_run_at(&weekly(2, "20:00"), now).unwrap(),
            tokyo(2025, 1, 8, 20, 0)
        );
    }

    #[test]
    fn test_weekly_initial_earlier_weekday_wraps() {
        // Wed 2025-01-01; Monday (0) 09:00 is next Monday
        let now = tokyo(2025, 1, 1, 10, 0);
        assert_eq!(
            initial_run_at(&weekly(0, "09:00"), now).unwrap(),
            tokyo(2025, 1, 6, 9, 0)
        );
    }

    #[test]
    fn test_weekly_initial_is_strictly_future() {
        let now = tokyo(2025, 1, 1, 10, 0);
        for weekday in 0..7u8 {
            let next = initial_run_at(&weekly(weekday, "10:00"), now).unwrap();
            assert!(next > now, "weekday {weekday} resolved to {next}");
            assert!(next - now <= chrono::Duration::days(7));
        }
    }

    #[test]
    fn test_weekly_advance_adds_exactly_seven_days() {
        let prev = tokyo(2025, 1, 5, 20, 0);
        assert_eq!(
            advance(&weekly(6, "20:00"), prev).unwrap(),
            tokyo(2025, 1, 12, 20, 0)
        );
    }

    #[test]
    fn test_weekly_advance_reapplies_time_after_late_processing() {
        // Advancing from the scheduled instant keeps the series on the
        // wall-clock slot even when the firing itself was processed late
        let prev = tokyo(2025, 1, 5, 20, 0);
        let next = advance(&weekly(6, "20:00"), prev).unwrap();
        assert_eq!(next.time(), NaiveTime::from_hms_opt(20, 0, 0).unwrap());
        assert_eq!(next.date_naive(), prev.date_naive() + Days::new(7));
    }

    #[test]
    fn test_weekly_rejects_bad_inputs() {
        let now = tokyo(2025, 1, 1, 10, 0);
        assert_eq!(initial_run_at(&weekly(7, "20:00"), now), None);
        assert_eq!(initial_run_at(&weekly(2, "25:00"), now), None);
        assert_eq!(advance(&weekly(2, "nope"), now), None);
    }

    // ---- monthly ----

    #[test]
    fn test_monthly_initial_this_month() {
        let now = tokyo(2025, 1, 10, 10, 0);
        assert_eq!(
            initial_run_at(&monthly(15, "09:00"), now).unwrap(),
            tokyo(2025, 1, 15, 9, 0)
        );
    }

    #[test]
    fn test_monthly_initial_rolls_to_next_month() {
        let now = tokyo(2025, 1, 20, 10, 0);
        assert_eq!(
            initial_run_at(&monthly(15, "09:00"), now).unwrap(),
            tokyo(2025, 2, 15, 9, 0)
        );
    }

    #[test]
    fn test_monthly_initial_skips_short_months() {
        // Day 31 requested in late January: February never qualifies
        let now = tokyo(2025, 1, 31, 23, 0);
        assert_eq!(
            initial_run_at(&monthly(31, "09:00"), now).unwrap(),
            tokyo(2025, 3, 31, 9, 0)
        );
    }

    #[test]
    fn test_monthly_advance_skips_february_entirely() {
        let prev = tokyo(2025, 1, 31, 9, 0);
        assert_eq!(
            advance(&monthly(31, "09:00"), prev).unwrap(),
            tokyo(2025, 3, 31, 9, 0)
        );
    }

    #[test]
    fn test_monthly_advance_day_30_skips_february_only() {
        let prev = tokyo(2025, 1, 30, 9, 0);
        assert_eq!(
            advance(&monthly(30, "09:00"), prev).unwrap(),
            tokyo(2025, 3, 30, 9, 0)
        );
    }

    #[test]
    fn test_monthly_advance_day_29_lands_in_leap_february() {
        let prev = tokyo(2024, 1, 29, 9, 0);
        assert_eq!(
            advance(&monthly(29, "09:00"), prev).unwrap(),
            tokyo(2024, 2, 29, 9, 0)
        );
    }

    #[test]
    fn test_monthly_advance_wraps_year() {
        let prev = tokyo(2025, 12, 15, 9, 0);
        assert_eq!(
            advance(&monthly(15, "09:00"), prev).unwrap(),
            tokyo(2026, 1, 15, 9, 0)
        );
    }

    #[test]
    fn test_monthly_rejects_bad_inputs() {
        let now = tokyo(2025, 1, 1, 10, 0);
        assert_eq!(initial_run_at(&monthly(0, "09:00"), now), None);
        assert_eq!(initial_run_at(&monthly(32, "09:00"), now), None);
        assert_eq!(advance(&monthly(15, "9am"), now), None);
    }
}
