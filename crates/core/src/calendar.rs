//! Business-day to calendar-day arithmetic.
//!
//! A five-day working week is projected exactly by walking weekdays. Any other
//! week length uses the `ceil(n * 7 / wd)` ratio, which ignores holidays and
//! where the weekend actually falls.

use chrono::{Datelike, Days, NaiveDate, Weekday};

pub const EXACT_WORKING_WEEK: u32 = 5;

pub fn business_days_to_calendar_days(business_days: u32, working_days_per_week: u32) -> u32 {
    let per_week = u64::from(working_days_per_week.max(1));
    let span = (u64::from(business_days) * 7).div_ceil(per_week);
    u32::try_from(span).unwrap_or(u32::MAX)
}

/// Date on which `business_days` working days after `start` have elapsed.
/// `start` itself is never counted.
pub fn project_finish_date(
    start: NaiveDate,
    business_days: u32,
    working_days_per_week: u32,
) -> NaiveDate {
    if working_days_per_week == EXACT_WORKING_WEEK {
        return walk_weekdays(start, business_days);
    }

    let calendar_days = business_days_to_calendar_days(business_days, working_days_per_week);
    start.checked_add_days(Days::new(u64::from(calendar_days))).unwrap_or(NaiveDate::MAX)
}

pub fn is_weekday(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

fn walk_weekdays(start: NaiveDate, business_days: u32) -> NaiveDate {
    let mut counted = 0;
    let mut current = start;
    while counted < business_days {
        let Some(next) = current.succ_opt() else {
            return NaiveDate::MAX;
        };
        current = next;
        if is_weekday(current) {
            counted += 1;
        }
    }
    current
}
