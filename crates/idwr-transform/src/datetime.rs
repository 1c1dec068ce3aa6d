//! ISO week date helpers.
//!
//! Confirmed-case and all-case tables are dated by the Sunday ending the
//! ISO week; sentinel tables by the Monday starting it.

use chrono::{Datelike, NaiveDate, TimeDelta, Weekday};

/// Sunday of ISO week `week` in ISO year `year`.
///
/// Returns `None` when the year has no such week (week 53 in a 52-week
/// year, week 0, or out-of-range input).
///
/// ```
/// use chrono::NaiveDate;
/// use idwr_transform::datetime::iso_week_sunday;
///
/// assert_eq!(iso_week_sunday(2024, 1), NaiveDate::from_ymd_opt(2024, 1, 7));
/// assert_eq!(iso_week_sunday(2021, 53), None);
/// ```
pub fn iso_week_sunday(year: i32, week: i32) -> Option<NaiveDate> {
    let week = u32::try_from(week).ok()?;
    NaiveDate::from_isoywd_opt(year, week, Weekday::Sun)
}

/// Monday of ISO week `week` counted from the Monday of the week that
/// contains January 4th.
///
/// Weeks past the end of the year roll into the next year, so this is
/// defined for every week number. `None` only outside chrono's date range.
pub fn iso_week_monday(year: i32, week: i32) -> Option<NaiveDate> {
    let jan4 = NaiveDate::from_ymd_opt(year, 1, 4)?;
    let offset = i64::from(jan4.weekday().num_days_from_monday());
    let days = i64::from(week - 1) * 7 - offset;
    jan4.checked_add_signed(TimeDelta::try_days(days)?)
}
