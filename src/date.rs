//! Date normalization of range endpoints.
//!
//! An endpoint is tried against the locale's short date pattern, then
//! `yyyy-MM-dd`, `yyyy-MM` and `yyyy`, then RFC 3339 and ISO 8601. Numeric
//! patterns are lenient: out of range months and days roll over into the
//! following (or preceding) month or year. Two digit years of the short
//! pattern are placed within 80 years before and 20 years after today.
//!
//! Parsed dates are encoded as sortable digit strings in UTC, truncated to a
//! [`DateResolution`], e.g. `20210314` at day resolution.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use time::{
    format_description::well_known::{Iso8601, Rfc3339},
    macros::format_description,
    Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset,
};
use tracing::trace;

use crate::config::{DateResolution, Locale};

lazy_static! {
    static ref REGEX_SLASH_DATE: Regex = Regex::new(r"^([0-9]+)/([0-9]+)/([0-9]+)$").unwrap();
    static ref REGEX_DOT_DATE: Regex = Regex::new(r"^([0-9]+)\.([0-9]+)\.([0-9]+)$").unwrap();
    static ref REGEX_ISO_DATE: Regex =
        Regex::new(r"^([0-9]{4})(?:-([0-9]{1,2})(?:-([0-9]{1,2}))?)?$").unwrap();
}

/// Order of the day, month and year groups in a short date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldOrder {
    MonthDayYear,
    DayMonthYear,
    YearMonthDay,
}

impl Locale {
    fn short_date(self) -> (&'static Regex, FieldOrder) {
        match self {
            Locale::EnUs => (&*REGEX_SLASH_DATE, FieldOrder::MonthDayYear),
            Locale::EnGb | Locale::Fr => (&*REGEX_SLASH_DATE, FieldOrder::DayMonthYear),
            Locale::De => (&*REGEX_DOT_DATE, FieldOrder::DayMonthYear),
            Locale::Ja => (&*REGEX_SLASH_DATE, FieldOrder::YearMonthDay),
        }
    }
}

/// Parses `text` as a date, returning midnight of that day at `offset`.
/// Inputs carrying a time of day keep it, moved into `offset`.
pub fn parse(text: &str, locale: Locale, offset: UtcOffset) -> Option<OffsetDateTime> {
    let today = OffsetDateTime::now_utc().to_offset(offset).year();
    parse_at(text, locale, offset, today)
}

fn parse_at(text: &str, locale: Locale, offset: UtcOffset, current_year: i32) -> Option<OffsetDateTime> {
    let text = text.trim();

    let (regex, order) = locale.short_date();
    if let Some(captures) = regex.captures(text) {
        return short_date(&captures, order, current_year).map(|date| midnight(date, offset));
    }

    if let Some(captures) = REGEX_ISO_DATE.captures(text) {
        let year = number(&captures, 1)?;
        let month = captures.get(2).map_or(Some(1), |_| number(&captures, 2))?;
        let day = captures.get(3).map_or(Some(1), |_| number(&captures, 3))?;
        return lenient_date(year, month, day).map(|date| midnight(date, offset));
    }

    let upper = text.to_ascii_uppercase();
    OffsetDateTime::parse(&upper, &Rfc3339)
        .or_else(|_| OffsetDateTime::parse(&upper, &Iso8601::PARSING))
        .ok()
        .map(|datetime| datetime.to_offset(offset))
}

fn short_date(captures: &Captures<'_>, order: FieldOrder, current_year: i32) -> Option<Date> {
    let (year, month, day) = match order {
        FieldOrder::MonthDayYear => (3, 1, 2),
        FieldOrder::DayMonthYear => (3, 2, 1),
        FieldOrder::YearMonthDay => (1, 2, 3),
    };

    let year_text = captures.get(year)?.as_str();
    let mut year = number(captures, year)?;
    if year_text.len() == 2 {
        year = expand_two_digit_year(year, current_year);
    }

    lenient_date(year, number(captures, month)?, number(captures, day)?)
}

fn number(captures: &Captures<'_>, group: usize) -> Option<i64> {
    captures.get(group)?.as_str().parse().ok()
}

/// Places a two digit year in the century window starting 80 years ago.
fn expand_two_digit_year(year: i64, current_year: i32) -> i64 {
    let start = i64::from(current_year) - 80;
    let candidate = start.div_euclid(100) * 100 + year;
    if candidate < start {
        candidate + 100
    } else {
        candidate
    }
}

/// Builds a date, rolling overflowing months and days into neighbours.
fn lenient_date(year: i64, month: i64, day: i64) -> Option<Date> {
    let months = year.checked_mul(12)?.checked_add(month - 1)?;
    let year = i32::try_from(months.div_euclid(12)).ok()?;
    let month = Month::try_from(u8::try_from(months.rem_euclid(12) + 1).ok()?).ok()?;
    let first = Date::from_calendar_date(year, month, 1).ok()?;
    // Day counts past this overflow `Duration`.
    if !(0..=i64::from(i32::MAX)).contains(&day) {
        return None;
    }
    first.checked_add(Duration::days(day - 1))
}

fn midnight(date: Date, offset: UtcOffset) -> OffsetDateTime {
    PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_offset(offset)
}

/// The last millisecond of the day `datetime` falls on, in its own offset.
pub fn end_of_day(datetime: OffsetDateTime) -> Option<OffsetDateTime> {
    let time = Time::from_hms_milli(23, 59, 59, 999).ok()?;
    Some(datetime.replace_time(time))
}

/// Encodes `datetime` in UTC at `resolution`.
pub fn format(datetime: OffsetDateTime, resolution: DateResolution) -> Option<String> {
    let utc = datetime.to_offset(UtcOffset::UTC);

    let formatted = match resolution {
        DateResolution::Year => utc.format(format_description!("[year]")),
        DateResolution::Month => utc.format(format_description!("[year][month]")),
        DateResolution::Day => utc.format(format_description!("[year][month][day]")),
        DateResolution::Hour => utc.format(format_description!("[year][month][day][hour]")),
        DateResolution::Minute => {
            utc.format(format_description!("[year][month][day][hour][minute]"))
        }
        DateResolution::Second => {
            utc.format(format_description!("[year][month][day][hour][minute][second]"))
        }
        DateResolution::Millisecond => utc.format(format_description!(
            "[year][month][day][hour][minute][second][subsecond digits:3]"
        )),
    };

    formatted.ok()
}

/// Date encoding of one range endpoint, or `None` when `text` is not a date.
/// `end_of_day` moves an inclusive upper bound to the last instant of its day.
pub fn normalize(
    text: &str,
    locale: Locale,
    offset: UtcOffset,
    resolution: DateResolution,
    end_of_day: bool,
) -> Option<String> {
    let Some(mut datetime) = parse(text, locale, offset) else {
        trace!(endpoint = text, "range endpoint is not a date");
        return None;
    };

    if end_of_day {
        datetime = self::end_of_day(datetime)?;
    }

    format(datetime, resolution)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{datetime, offset};

    #[test]
    fn two_digit_years() {
        assert_eq!(expand_two_digit_year(21, 2026), 2021);
        assert_eq!(expand_two_digit_year(45, 2026), 2045);
        assert_eq!(expand_two_digit_year(46, 2026), 1946);
        assert_eq!(expand_two_digit_year(99, 2026), 1999);
    }

    #[test]
    fn locale_short_dates() {
        let utc = UtcOffset::UTC;
        assert_eq!(
            parse_at("3/14/21", Locale::EnUs, utc, 2026),
            Some(datetime!(2021-03-14 0:00 UTC))
        );
        assert_eq!(
            parse_at("14/03/2021", Locale::EnGb, utc, 2026),
            Some(datetime!(2021-03-14 0:00 UTC))
        );
        assert_eq!(
            parse_at("14.3.2021", Locale::De, utc, 2026),
            Some(datetime!(2021-03-14 0:00 UTC))
        );
        assert_eq!(
            parse_at("21/03/14", Locale::Ja, utc, 2026),
            Some(datetime!(2021-03-14 0:00 UTC))
        );
        assert_eq!(parse_at("14/03/2021", Locale::De, utc, 2026), None);
    }

    #[test]
    fn lenient_roll_over() {
        let utc = UtcOffset::UTC;
        assert_eq!(
            parse_at("13/1/2020", Locale::EnUs, utc, 2026),
            Some(datetime!(2021-01-01 0:00 UTC))
        );
        assert_eq!(
            parse_at("2/30/2021", Locale::EnUs, utc, 2026),
            Some(datetime!(2021-03-02 0:00 UTC))
        );
        assert_eq!(
            parse_at("2021-01-00", Locale::EnUs, utc, 2026),
            Some(datetime!(2020-12-31 0:00 UTC))
        );
    }

    #[test]
    fn oversized_fields_are_not_dates() {
        let utc = UtcOffset::UTC;
        assert_eq!(parse_at("1/200000000000000/2020", Locale::EnUs, utc, 2026), None);
        assert_eq!(parse_at("99999999999/1/2020", Locale::EnUs, utc, 2026), None);
        assert_eq!(parse_at("1.1.99999999999", Locale::De, utc, 2026), None);
        assert_eq!(parse_at("1/99999999999999999999/2020", Locale::EnUs, utc, 2026), None);
    }

    #[test]
    fn universal_patterns() {
        let utc = UtcOffset::UTC;
        assert_eq!(
            parse_at("2021", Locale::EnUs, utc, 2026),
            Some(datetime!(2021-01-01 0:00 UTC))
        );
        assert_eq!(
            parse_at("2021-06", Locale::EnUs, utc, 2026),
            Some(datetime!(2021-06-01 0:00 UTC))
        );
        assert_eq!(
            parse_at("2021-06-15t10:30:00z", Locale::EnUs, utc, 2026),
            Some(datetime!(2021-06-15 10:30 UTC))
        );
        assert_eq!(parse_at("foo", Locale::EnUs, utc, 2026), None);
        assert_eq!(parse_at("123", Locale::EnUs, utc, 2026), None);
    }

    #[test]
    fn resolutions() {
        let datetime = datetime!(2021-03-14 15:09:26.535 UTC);
        assert_eq!(format(datetime, DateResolution::Year).as_deref(), Some("2021"));
        assert_eq!(format(datetime, DateResolution::Month).as_deref(), Some("202103"));
        assert_eq!(format(datetime, DateResolution::Day).as_deref(), Some("20210314"));
        assert_eq!(format(datetime, DateResolution::Hour).as_deref(), Some("2021031415"));
        assert_eq!(format(datetime, DateResolution::Minute).as_deref(), Some("202103141509"));
        assert_eq!(format(datetime, DateResolution::Second).as_deref(), Some("20210314150926"));
        assert_eq!(
            format(datetime, DateResolution::Millisecond).as_deref(),
            Some("20210314150926535")
        );
    }

    #[test]
    fn normalize_in_time_zone() {
        let resolution = DateResolution::Hour;
        let cet = offset!(+1);

        assert_eq!(
            normalize("2021-03-14", Locale::EnUs, cet, resolution, false).as_deref(),
            Some("2021031323")
        );
        assert_eq!(
            normalize("2021-03-14", Locale::EnUs, cet, resolution, true).as_deref(),
            Some("2021031422")
        );
        assert_eq!(
            normalize("2021", Locale::EnUs, UtcOffset::UTC, DateResolution::Millisecond, true)
                .as_deref(),
            Some("20210101235959999")
        );
        assert_eq!(normalize("abc", Locale::EnUs, cet, resolution, true), None);
    }
}
