//! Quarterly rebalance calendar.

use chrono::{Datelike, Days, NaiveDate, Weekday};

/// Roll a date forward to the next weekday if it falls on a weekend.
pub fn roll_to_business_day(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date + Days::new(2),
        Weekday::Sun => date + Days::new(1),
        _ => date,
    }
}

/// The first business day of the quarter containing `year`/`month`.
fn quarter_start(year: i32, month: u32) -> Option<NaiveDate> {
    let quarter_month = ((month - 1) / 3) * 3 + 1;
    NaiveDate::from_ymd_opt(year, quarter_month, 1).map(roll_to_business_day)
}

/// Quarterly rebalance dates within `[start, end]`.
///
/// A rebalance date is the first business day of a calendar quarter
/// (January, April, July, October the 1st, rolled past weekends). Dates
/// are ascending; the result is empty when no quarter starts inside the
/// range.
pub fn rebalance_dates(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut year = start.year();
    let mut month = ((start.month() - 1) / 3) * 3 + 1;

    loop {
        let Some(date) = quarter_start(year, month) else {
            break;
        };
        if date > end {
            break;
        }
        if date >= start {
            dates.push(date);
        }

        month += 3;
        if month > 12 {
            month = 1;
            year += 1;
        }
    }

    dates
}
