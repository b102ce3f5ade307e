//! Japanese natural-language time expressions.
//!
//! An ordered chain of recognizers turns free text like 「10分後」,
//! 「毎週日曜日 20時」 or 「2025年5月3日 14:00」 into a [`Schedule`] plus a
//! formatted description. The first recognizer whose shape matches wins;
//! a shape that matches but fails validation fails the whole parse rather
//! than falling through to a looser pattern.
//!
//! Supported forms, in matching order:
//! - 10分後 / 2時間後 / 3日後 / 3日後 14時
//! - 毎週日曜日 20時 (weekly), 毎月1日 20時 (monthly)
//! - 来週火曜日の21時
//! - 明後日の午前9時, 明日 9時, 今日の22:00
//! - 22:00 / 14時 / 午後3時 / 午前9時30分 (today, rolling to tomorrow)
//! - 2025-11-20, 11/20, 11月20日, 2025年11月20日 (09:00 default)
//! - 2025年5月3日 14:00, 2025-11-20 14:00

use chrono::{DateTime, Datelike, Days, Duration, NaiveDate};
use chrono_tz::Tz;
use regex::Regex;
use std::sync::OnceLock;

use crate::features::schedule::model::{resolve_civil, Schedule};

/// Relative offsets accepted by the 「N分後」「N時間後」「N日後」 forms
pub const MAX_RELATIVE_MINUTES: i64 = 1440;
pub const MAX_RELATIVE_HOURS: i64 = 168;
pub const MAX_RELATIVE_DAYS: u64 = 365;

/// Explicit dates further ahead than this many years are rejected
pub const MAX_FUTURE_YEARS: i32 = 5;

/// Japanese weekday letters indexed by weekday number (0 = Monday)
const JA_WEEKDAYS: [&str; 7] = ["月", "火", "水", "木", "金", "土", "日"];

/// A successfully parsed time expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    pub schedule: Schedule,
    /// Human-readable rendering of the resolved schedule, e.g.
    /// 「2025年01月02日 09:00」 or 「毎週日曜日 20:00」
    pub description: String,
}

struct Patterns {
    rel_minutes: Regex,
    rel_hours: Regex,
    rel_days_with_time: Regex,
    rel_days: Regex,
    weekly: Regex,
    monthly: Regex,
    next_week: Regex,
    day_after_tomorrow: Regex,
    tomorrow: Regex,
    today: Regex,
    date_iso: Regex,
    date_slash: Regex,
    date_jp: Regex,
    date_jp_with_year: Regex,
    datetime_jp: Regex,
    datetime_iso: Regex,
    time_pm: Regex,
    time_am: Regex,
    time_clock: Regex,
}

static PATTERNS: OnceLock<Patterns> = OnceLock::new();

fn patterns() -> &'static Patterns {
    PATTERNS.get_or_init(|| Patterns {
        rel_minutes: Regex::new(r"^(\d+)分後").expect("valid regex"),
        rel_hours: Regex::new(r"^(\d+)時間後").expect("valid regex"),
        rel_days_with_time: Regex::new(r"^(\d+)日後\s+(.+)").expect("valid regex"),
        rel_days: Regex::new(r"^(\d+)日後$").expect("valid regex"),
        weekly: Regex::new(r"^毎週\s*([月火水木金土日]曜?日?)\s*(.+)").expect("valid regex"),
        monthly: Regex::new(r"^毎月\s*(\d{1,2})日?\s*(.+)").expect("valid regex"),
        next_week: Regex::new(r"^来週\s*([月火水木金土日]曜?日?)\s*(.+)").expect("valid regex"),
        day_after_tomorrow: Regex::new(r"^明後日\s*(.+)").expect("valid regex"),
        tomorrow: Regex::new(r"^明日\s*(.+)").expect("valid regex"),
        today: Regex::new(r"^今日\s*(.+)").expect("valid regex"),
        date_iso: Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})$").expect("valid regex"),
        date_slash: Regex::new(r"^(\d{1,2})/(\d{1,2})$").expect("valid regex"),
        date_jp: Regex::new(r"^(\d{1,2})月(\d{1,2})日?$").expect("valid regex"),
        date_jp_with_year: Regex::new(r"^(\d{4})年\s*(\d{1,2})月\s*(\d{1,2})日?$")
            .expect("valid regex"),
        datetime_jp: Regex::new(r"^(\d{4})年\s*(\d{1,2})月\s*(\d{1,2})日?\s+(.+)")
            .expect("valid regex"),
        datetime_iso: Regex::new(r"^(\d{4})-(\d{1,2})-(\d{1,2})\s+(\d{1,2}):(\d{1,2})")
            .expect("valid regex"),
        time_pm: Regex::new(r"^午後\s*(\d{1,2})時?(\d{0,2})分?").expect("valid regex"),
        time_am: Regex::new(r"^午前\s*(\d{1,2})時?(\d{0,2})分?").expect("valid regex"),
        time_clock: Regex::new(r"^(\d{1,2})[時:](\d{0,2})分?").expect("valid regex"),
    })
}

/// Parse a natural-language time expression relative to `now`.
///
/// Recognizers are tried in a fixed order and the first syntactic match
/// decides the outcome. Returns `None` when nothing matches or when the
/// matched shape fails validation.
pub fn parse(text: &str, now: DateTime<Tz>) -> Option<ParseResult> {
    let text = text.trim();
    let p = patterns();
    let tz = now.timezone();

    // N分後
    if let Some(caps) = p.rel_minutes.captures(text) {
        let minutes: i64 = caps[1].parse().ok()?;
        if minutes == 0 || minutes > MAX_RELATIVE_MINUTES {
            return None;
        }
        return Some(once(now + Duration::minutes(minutes)));
    }

    // N時間後
    if let Some(caps) = p.rel_hours.captures(text) {
        let hours: i64 = caps[1].parse().ok()?;
        if hours == 0 || hours > MAX_RELATIVE_HOURS {
            return None;
        }
        return Some(once(now + Duration::hours(hours)));
    }

    // N日後 <time>
    if let Some(caps) = p.rel_days_with_time.captures(text) {
        let days: u64 = caps[1].parse().ok()?;
        if days == 0 || days > MAX_RELATIVE_DAYS {
            return None;
        }
        let (hour, minute) = parse_time_of_day(&caps[2])?;
        let date = now.date_naive().checked_add_days(Days::new(days))?;
        return Some(once(resolve_civil(tz, date, hour, minute)?));
    }

    // N日後 (defaults to 09:00)
    if let Some(caps) = p.rel_days.captures(text) {
        let days: u64 = caps[1].parse().ok()?;
        if days == 0 || days > MAX_RELATIVE_DAYS {
            return None;
        }
        let date = now.date_naive().checked_add_days(Days::new(days))?;
        return Some(once(resolve_civil(tz, date, 9, 0)?));
    }

    // 毎週 曜日 時刻
    if let Some(caps) = p.weekly.captures(text) {
        let weekday_text = &caps[1];
        let weekday = weekday_number(weekday_text)?;
        let (hour, minute) = parse_time_of_day(&caps[2])?;
        let time = format!("{hour:02}:{minute:02}");
        return Some(ParseResult {
            description: format!("毎週{weekday_text} {time}"),
            schedule: Schedule::Weekly { weekday, time },
        });
    }

    // 毎月 DD日 時刻
    if let Some(caps) = p.monthly.captures(text) {
        let day: u8 = caps[1].parse().ok()?;
        if !(1..=31).contains(&day) {
            return None;
        }
        let (hour, minute) = parse_time_of_day(&caps[2])?;
        let time = format!("{hour:02}:{minute:02}");
        return Some(ParseResult {
            description: format!("毎月{day}日 {time}"),
            schedule: Schedule::Monthly { day, time },
        });
    }

    // 来週○曜日 時刻 — always lands in next week, even if today matches
    if let Some(caps) = p.next_week.captures(text) {
        let weekday = weekday_number(&caps[1])?;
        let (hour, minute) = parse_time_of_day(&caps[2])?;
        let days_ahead =
            i64::from(weekday) - i64::from(now.weekday().num_days_from_monday()) + 7;
        let date = now
            .date_naive()
            .checked_add_days(Days::new(days_ahead as u64))?;
        let target = resolve_civil(tz, date, hour, minute)?;
        let ja = JA_WEEKDAYS[target.weekday().num_days_from_monday() as usize];
        return Some(ParseResult {
            description: format!(
                "{}({}) {}",
                target.format("%Y年%m月%d日"),
                ja,
                target.format("%H:%M")
            ),
            schedule: Schedule::Once {
                run_at: target.to_rfc3339(),
            },
        });
    }

    // 明後日 時刻
    if let Some(caps) = p.day_after_tomorrow.captures(text) {
        let time_part = caps[1].replace('の', "");
        let (hour, minute) = parse_time_of_day(time_part.trim())?;
        let date = now.date_naive().checked_add_days(Days::new(2))?;
        return Some(once(resolve_civil(tz, date, hour, minute)?));
    }

    // 明日 時刻
    if let Some(caps) = p.tomorrow.captures(text) {
        let time_part = caps[1].replace('の', "");
        let (hour, minute) = parse_time_of_day(time_part.trim())?;
        let date = now.date_naive().checked_add_days(Days::new(1))?;
        return Some(once(resolve_civil(tz, date, hour, minute)?));
    }

    // 今日 時刻 — rolls to tomorrow if the time already passed
    if let Some(caps) = p.today.captures(text) {
        let time_part = caps[1].replace('の', "");
        let (hour, minute) = parse_time_of_day(time_part.trim())?;
        return Some(once(today_or_tomorrow(now, hour, minute)?));
    }

    // 時刻のみ — today at that time, rolling to tomorrow if passed
    if let Some((hour, minute)) = parse_time_of_day(text) {
        return Some(once(today_or_tomorrow(now, hour, minute)?));
    }

    // YYYY-MM-DD (defaults to 09:00)
    if let Some(caps) = p.date_iso.captures(text) {
        let date = ymd(&caps[1], &caps[2], &caps[3])?;
        return Some(once_morning(resolve_civil(tz, date, 9, 0)?));
    }

    // MM/DD — rolls to next year if already passed
    if let Some(caps) = p.date_slash.captures(text) {
        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        return Some(once_morning(yearless_date(now, month, day)?));
    }

    // M月D日 — rolls to next year if already passed
    if let Some(caps) = p.date_jp.captures(text) {
        let month: u32 = caps[1].parse().ok()?;
        let day: u32 = caps[2].parse().ok()?;
        return Some(once_morning(yearless_date(now, month, day)?));
    }

    // YYYY年M月D日 (defaults to 09:00)
    if let Some(caps) = p.date_jp_with_year.captures(text) {
        let date = ymd(&caps[1], &caps[2], &caps[3])?;
        return Some(once_morning(resolve_civil(tz, date, 9, 0)?));
    }

    // YYYY年M月D日 時刻
    if let Some(caps) = p.datetime_jp.captures(text) {
        let year: i32 = caps[1].parse().ok()?;
        if year > now.year() + MAX_FUTURE_YEARS {
            return None;
        }
        let (hour, minute) = parse_time_of_day(&caps[4])?;
        let date = ymd(&caps[1], &caps[2], &caps[3])?;
        let target = resolve_civil(tz, date, hour, minute)?;
        if target <= now {
            return None;
        }
        return Some(once(target));
    }

    // YYYY-MM-DD HH:MM
    if let Some(caps) = p.datetime_iso.captures(text) {
        let year: i32 = caps[1].parse().ok()?;
        if year > now.year() + MAX_FUTURE_YEARS {
            return None;
        }
        let date = ymd(&caps[1], &caps[2], &caps[3])?;
        let hour: u32 = caps[4].parse().ok()?;
        let minute: u32 = caps[5].parse().ok()?;
        let target = resolve_civil(tz, date, hour, minute)?;
        if target <= now {
            return None;
        }
        return Some(once(target));
    }

    None
}

/// Parse a time-of-day fragment: `HH:MM`, `HH時MM分`, `HH時`, with
/// optional 午前/午後 markers. 午後 adds 12 hours unless the literal hour
/// is already 12; 午前12時 maps to 00:00.
pub fn parse_time_of_day(text: &str) -> Option<(u32, u32)> {
    let p = patterns();

    if let Some(caps) = p.time_pm.captures(text) {
        let mut hour: u32 = caps[1].parse().ok()?;
        let minute = optional_minute(&caps[2])?;
        if hour != 12 {
            hour += 12;
        }
        return valid_time(hour, minute);
    }

    if let Some(caps) = p.time_am.captures(text) {
        let mut hour: u32 = caps[1].parse().ok()?;
        let minute = optional_minute(&caps[2])?;
        if hour == 12 {
            hour = 0;
        }
        return valid_time(hour, minute);
    }

    if let Some(caps) = p.time_clock.captures(text) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute = optional_minute(&caps[2])?;
        return valid_time(hour, minute);
    }

    None
}

/// Map a weekday word (月, 月曜, 月曜日, ...) to its number, 0 = Monday.
pub fn weekday_number(text: &str) -> Option<u8> {
    let initial = text.chars().next()?;
    JA_WEEKDAYS
        .iter()
        .position(|&w| w.chars().next() == Some(initial))
        .map(|i| i as u8)
}

fn once(target: DateTime<Tz>) -> ParseResult {
    ParseResult {
        description: target.format("%Y年%m月%d日 %H:%M").to_string(),
        schedule: Schedule::Once {
            run_at: target.to_rfc3339(),
        },
    }
}

fn once_morning(target: DateTime<Tz>) -> ParseResult {
    ParseResult {
        description: target.format("%Y年%m月%d日 09:00").to_string(),
        schedule: Schedule::Once {
            run_at: target.to_rfc3339(),
        },
    }
}

fn today_or_tomorrow(now: DateTime<Tz>, hour: u32, minute: u32) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    let target = resolve_civil(tz, now.date_naive(), hour, minute)?;
    if target <= now {
        let tomorrow = now.date_naive().checked_add_days(Days::new(1))?;
        return resolve_civil(tz, tomorrow, hour, minute);
    }
    Some(target)
}

fn yearless_date(now: DateTime<Tz>, month: u32, day: u32) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    let date = NaiveDate::from_ymd_opt(now.year(), month, day)?;
    let target = resolve_civil(tz, date, 9, 0)?;
    if target <= now {
        let date = NaiveDate::from_ymd_opt(now.year() + 1, month, day)?;
        return resolve_civil(tz, date, 9, 0);
    }
    Some(target)
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn optional_minute(s: &str) -> Option<u32> {
    if s.is_empty() {
        Some(0)
    } else {
        s.parse().ok()
    }
}

fn valid_time(hour: u32, minute: u32) -> Option<(u32, u32)> {
    if hour >= 24 || minute >= 60 {
        return None;
    }
    Some((hour, minute))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Asia::Tokyo;

    fn tokyo(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> DateTime<Tz> {
        Tokyo.with_ymd_and_hms(y, mo, d, h, mi, 0).unwrap()
    }

    /// Wed 2025-01-01 10:00 JST
    fn reference() -> DateTime<Tz> {
        tokyo(2025, 1, 1, 10, 0)
    }

    fn run_at(result: &ParseResult) -> DateTime<Tz> {
        match &result.schedule {
            Schedule::Once { run_at } => {
                crate::features::schedule::model::parse_instant(run_at, Tokyo).unwrap()
            }
            other => panic!("expected Once, got {other:?}"),
        }
    }

    // ---- time-of-day sub-parser ----

    #[test]
    fn test_time_of_day_formats() {
        assert_eq!(parse_time_of_day("22:00"), Some((22, 0)));
        assert_eq!(parse_time_of_day("14時"), Some((14, 0)));
        assert_eq!(parse_time_of_day("14時30分"), Some((14, 30)));
        assert_eq!(parse_time_of_day("午後3時"), Some((15, 0)));
        assert_eq!(parse_time_of_day("午後3時30分"), Some((15, 30)));
        assert_eq!(parse_time_of_day("午前9時30分"), Some((9, 30)));
    }

    #[test]
    fn test_time_of_day_noon_and_midnight() {
        assert_eq!(parse_time_of_day("午後12時"), Some((12, 0)));
        assert_eq!(parse_time_of_day("午前12時"), Some((0, 0)));
        assert_eq!(parse_time_of_day("午前0時"), Some((0, 0)));
    }

    #[test]
    fn test_time_of_day_rejects_out_of_range() {
        assert_eq!(parse_time_of_day("24:00"), None);
        assert_eq!(parse_time_of_day("25時"), None);
        assert_eq!(parse_time_of_day("12:60"), None);
        assert_eq!(parse_time_of_day("午後13時"), None);
        assert_eq!(parse_time_of_day("そのうち"), None);
    }

    // ---- relative offsets ----

    #[test]
    fn test_relative_minutes() {
        let result = parse("10分後", reference()).unwrap();
        assert_eq!(run_at(&result), tokyo(2025, 1, 1, 10, 10));
        assert_eq!(result.description, "2025年01月01日 10:10");
    }

    #[test]
    fn test_relative_minutes_bounds() {
        assert!(parse("1分後", reference()).is_some());
        assert!(parse("1440分後", reference()).is_some());
        assert!(parse("0分後", reference()).is_none());
        assert!(parse("1441分後", reference()).is_none());
    }

    #[test]
    fn test_relative_hours() {
        let result = parse("2時間後", reference()).unwrap();
        assert_eq!(run_at(&result), tokyo(2025, 1, 1, 12, 0));
    }

    #[test]
    fn test_relative_hours_bounds() {
        assert!(parse("168時間後", reference()).is_some());
        assert!(parse("169時間後", reference()).is_none());
        assert!(parse("0時間後", reference()).is_none());
    }

    #[test]
    fn test_relative_days_with_time() {
        let result = parse("3日後 14時", reference()).unwrap();
        assert_eq!(run_at(&result), tokyo(2025, 1, 4, 14, 0));
    }

    #[test]
    fn test_relative_days_defaults_to_morning() {
        let result = parse("3日後", reference()).unwrap();
        assert_eq!(run_at(&result), tokyo(2025, 1, 4, 9, 0));
    }

    #[test]
    fn test_relative_days_bounds() {
        assert!(parse("365日後", reference()).is_some());
        assert!(parse("366日後", reference()).is_none());
        // An invalid time after a valid day count fails the whole parse
        assert!(parse("3日後 25時", reference()).is_none());
    }

    // ---- recurring ----

    #[test]
    fn test_weekly_sunday_evening() {
        // Regardless of what day "now" is, the schedule is the plain rule
        for day in 1..=7 {
            let now = tokyo(2025, 6, day, 12, 0);
            let result = parse("毎週日曜日 20時", now).unwrap();
            assert_eq!(
                result.schedule,
                Schedule::Weekly {
                    weekday: 6,
                    time: "20:00".to_string()
                }
            );
            assert_eq!(result.description, "毎週日曜日 20:00");
        }
    }

    #[test]
    fn test_weekly_short_weekday_forms() {
        let result = parse("毎週月曜 20時", reference()).unwrap();
        assert_eq!(
            result.schedule,
            Schedule::Weekly {
                weekday: 0,
                time: "20:00".to_string()
            }
        );
        let result = parse("毎週金 9時30分", reference()).unwrap();
        assert_eq!(
            result.schedule,
            Schedule::Weekly {
                weekday: 4,
                time: "09:30".to_string()
            }
        );
    }

    #[test]
    fn test_monthly() {
        let result = parse("毎月1日 20時", reference()).unwrap();
        assert_eq!(
            result.schedule,
            Schedule::Monthly {
                day: 1,
                time: "20:00".to_string()
            }
        );
        assert_eq!(result.description, "毎月1日 20:00");
    }

    #[test]
    fn test_monthly_day_31_allowed_day_32_rejected() {
        assert!(parse("毎月31日 9時", reference()).is_some());
        assert!(parse("毎月32日 9時", reference()).is_none());
        assert!(parse("毎月0日 9時", reference()).is_none());
    }

    // ---- day words ----

    #[test]
    fn test_next_week_always_lands_next_week() {
        // Reference is a Wednesday; 来週水曜 must be +7, not today
        let result = parse("来週水曜日 21時", reference()).unwrap();
        assert_eq!(run_at(&result), tokyo(2025, 1, 8, 21, 0));
        assert_eq!(result.description, "2025年01月08日(水) 21:00");
    }

    #[test]
    fn test_next_week_other_weekday() {
        // 来週火曜 from Wed 2025-01-01: next week's Tuesday is Jan 7
        let result = parse("来週火曜日の21時", reference()).unwrap();
        assert_eq!(run_at(&result), tokyo(2025, 1, 7, 21, 0));
    }

    #[test]
    fn test_day_after_tomorrow() {
        let result = parse("明後日の午前9時", reference()).unwrap();
        assert_eq!(run_at(&result), tokyo(2025, 1, 3, 9, 0));
    }

    #[test]
    fn test_tomorrow() {
        let result = parse("明日 9時", reference()).unwrap();
        assert_eq!(run_at(&result), tokyo(2025, 1, 2, 9, 0));
        assert!(result.description.contains("01月02日 09:00"));
    }

    #[test]
    fn test_today_future_time_stays_today() {
        let result = parse("今日の22:00", reference()).unwrap();
        assert_eq!(run_at(&result), tokyo(2025, 1, 1, 22, 0));
    }

    #[test]
    fn test_today_past_time_rolls_to_tomorrow() {
        let result = parse("今日の9時", reference()).unwrap();
        assert_eq!(run_at(&result), tokyo(2025, 1, 2, 9, 0));
    }

    #[test]
    fn test_bare_time_rolls_forward_when_passed() {
        let result = parse("22:00", reference()).unwrap();
        assert_eq!(run_at(&result), tokyo(2025, 1, 1, 22, 0));

        let result = parse("9時", reference()).unwrap();
        assert_eq!(run_at(&result), tokyo(2025, 1, 2, 9, 0));
    }

    #[test]
    fn test_bare_time_exactly_now_rolls_forward() {
        let result = parse("10時", reference()).unwrap();
        assert_eq!(run_at(&result), tokyo(2025, 1, 2, 10, 0));
    }

    // ---- bare dates ----

    #[test]
    fn test_iso_date_defaults_to_morning() {
        let result = parse("2025-11-20", reference()).unwrap();
        assert_eq!(run_at(&result), tokyo(2025, 11, 20, 9, 0));
        assert_eq!(result.description, "2025年11月20日 09:00");
    }

    #[test]
    fn test_iso_date_in_the_past_is_not_rejected() {
        // Bare dates only get calendar validation; the past-instant check
        // belongs to the date+time forms
        let result = parse("2024-03-01", reference()).unwrap();
        assert_eq!(run_at(&result), tokyo(2024, 3, 1, 9, 0));
    }

    #[test]
    fn test_iso_date_invalid_calendar_day() {
        assert!(parse("2025-02-30", reference()).is_none());
        assert!(parse("2025-13-01", reference()).is_none());
    }

    #[test]
    fn test_slash_date_future_this_year() {
        let result = parse("11/20", reference()).unwrap();
        assert_eq!(run_at(&result), tokyo(2025, 11, 20, 9, 0));
    }

    #[test]
    fn test_slash_date_passed_rolls_to_next_year() {
        let now = tokyo(2025, 12, 1, 10, 0);
        let result = parse("11/20", now).unwrap();
        assert_eq!(run_at(&result), tokyo(2026, 11, 20, 9, 0));
    }

    #[test]
    fn test_jp_date_passed_rolls_to_next_year() {
        let now = tokyo(2025, 12, 1, 10, 0);
        let result = parse("11月20日", now).unwrap();
        assert_eq!(run_at(&result), tokyo(2026, 11, 20, 9, 0));
    }

    #[test]
    fn test_jp_date_with_year() {
        let result = parse("2025年5月3日", reference()).unwrap();
        assert_eq!(run_at(&result), tokyo(2025, 5, 3, 9, 0));
        assert_eq!(result.description, "2025年05月03日 09:00");
    }

    #[test]
    fn test_bare_dates_skip_the_past_instant_check() {
        // Like the other bare-date forms, 2024年3月1日 gets calendar
        // validation only; the past-instant check applies to the forms
        // that carry an explicit time
        let result = parse("2024年3月1日", reference()).unwrap();
        assert_eq!(run_at(&result), tokyo(2024, 3, 1, 9, 0));
    }

    // ---- full date+time ----

    #[test]
    fn test_jp_datetime() {
        let result = parse("2025年5月3日 14:00", reference()).unwrap();
        assert_eq!(run_at(&result), tokyo(2025, 5, 3, 14, 0));
        assert_eq!(result.description, "2025年05月03日 14:00");
    }

    #[test]
    fn test_jp_datetime_round_trips_through_initial_run_at() {
        let result = parse("2025年5月3日 14:00", reference()).unwrap();
        let resolved =
            crate::features::schedule::initial_run_at(&result.schedule, reference()).unwrap();
        assert_eq!(resolved, run_at(&result));
    }

    #[test]
    fn test_iso_datetime() {
        let result = parse("2025-11-20 14:00", reference()).unwrap();
        assert_eq!(run_at(&result), tokyo(2025, 11, 20, 14, 0));
    }

    #[test]
    fn test_datetime_in_the_past_rejected() {
        assert!(parse("2024年5月3日 14:00", reference()).is_none());
        assert!(parse("2024-05-03 14:00", reference()).is_none());
    }

    #[test]
    fn test_datetime_at_reference_instant_rejected() {
        assert!(parse("2025年1月1日 10:00", reference()).is_none());
        assert!(parse("2025-01-01 10:00", reference()).is_none());
    }

    #[test]
    fn test_datetime_more_than_five_years_ahead_rejected() {
        assert!(parse("2030年5月3日 14:00", reference()).is_some());
        assert!(parse("2031年5月3日 14:00", reference()).is_none());
        assert!(parse("2031-05-03 14:00", reference()).is_none());
    }

    // ---- precedence and failure ----

    #[test]
    fn test_relative_wins_over_monthly_shape() {
        // 「3日後」 must be relative days, never 毎月-style day-of-month
        let result = parse("3日後", reference()).unwrap();
        assert!(matches!(result.schedule, Schedule::Once { .. }));
    }

    #[test]
    fn test_matched_shape_with_bad_time_does_not_fall_through() {
        // 明日 + invalid time must fail outright, not be re-read as
        // something looser
        assert!(parse("明日 25時", reference()).is_none());
        assert!(parse("毎週日曜日 25時", reference()).is_none());
    }

    #[test]
    fn test_unrecognized_text() {
        assert!(parse("そのうち", reference()).is_none());
        assert!(parse("", reference()).is_none());
        assert!(parse("リマインドして", reference()).is_none());
    }

    #[test]
    fn test_leading_and_trailing_whitespace() {
        assert!(parse("  10分後  ", reference()).is_some());
    }

    #[test]
    fn test_weekday_number_mapping() {
        assert_eq!(weekday_number("月"), Some(0));
        assert_eq!(weekday_number("月曜日"), Some(0));
        assert_eq!(weekday_number("日曜"), Some(6));
        assert_eq!(weekday_number("祝"), None);
    }
}
