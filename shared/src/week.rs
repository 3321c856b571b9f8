//! Business-week date math
//!
//! A week is identified by the ISO date of its Monday (the "week anchor").
//! All arithmetic is local-calendar: the business week is a calendar concept,
//! not a UTC instant.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Weekday};
use chrono_tz::Tz;

/// Orders for the current week close Wednesday at this local hour.
const CUTOFF_DAY_OFFSET: i64 = 2;
const CUTOFF_HOUR: u32 = 13;

/// Number of orderable days per week (Monday through Friday)
pub const WORK_DAY_COUNT: usize = 5;

/// Spanish day name, as shown on menus and embedded in selections
pub fn day_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Lunes",
        Weekday::Tue => "Martes",
        Weekday::Wed => "Miércoles",
        Weekday::Thu => "Jueves",
        Weekday::Fri => "Viernes",
        Weekday::Sat => "Sábado",
        Weekday::Sun => "Domingo",
    }
}

/// Whether a date is a valid week anchor (a Monday)
pub fn is_week_anchor(date: NaiveDate) -> bool {
    date.weekday() == Weekday::Mon
}

/// The Monday of the week containing `date`
pub fn monday_of(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// The five work days (Mon..Fri) of the week anchored at `week_start`
pub fn work_days(week_start: NaiveDate) -> Vec<NaiveDate> {
    (0..WORK_DAY_COUNT as i64)
        .map(|offset| week_start + Duration::days(offset))
        .collect()
}

/// Whether orders may still be placed for the week anchored at `week_start`
///
/// The cutoff is Wednesday 13:00 local time of the *current* week. Future
/// weeks have no deadline until they become current; past weeks are closed.
pub fn ordering_allowed(week_start: NaiveDate, now: DateTime<Tz>) -> bool {
    let current_anchor = monday_of(now.date_naive());
    if week_start > current_anchor {
        return true;
    }
    if week_start < current_anchor {
        return false;
    }

    let cutoff_day = week_start + Duration::days(CUTOFF_DAY_OFFSET);
    let today = now.date_naive();
    today < cutoff_day || (today == cutoff_day && now.hour() < CUTOFF_HOUR)
}
