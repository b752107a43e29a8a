//! MM-DD-YYYY date helpers.
//!
//! The form collects every date in US MM-DD-YYYY order. Internally dates are
//! parsed to `chrono::NaiveDate` so that "02-30-2020" is rejected and ages
//! can be computed.

use chrono::{Datelike, Local, NaiveDate};

/// Parse an MM-DD-YYYY string into a date, rejecting impossible calendar
/// dates like `02-30-2020`.
pub fn parse_mmddyyyy(value: &str) -> Option<NaiveDate> {
    let mut parts = value.split('-');
    let month: u32 = parse_fixed(parts.next()?, 2)?;
    let day: u32 = parse_fixed(parts.next()?, 2)?;
    let year: i32 = parse_fixed(parts.next()?, 4)? as i32;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_fixed(segment: &str, width: usize) -> Option<u32> {
    if segment.len() != width || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// Whether the string is a real calendar date in MM-DD-YYYY form
pub fn is_valid_date(value: &str) -> bool {
    parse_mmddyyyy(value).is_some()
}

/// Convert MM-DD-YYYY to ISO YYYY-MM-DD, e.g. for the email timestamp block
pub fn to_iso(value: &str) -> Option<String> {
    parse_mmddyyyy(value).map(|d| d.format("%Y-%m-%d").to_string())
}

/// Format a date as MM-DD-YYYY
pub fn format_mmddyyyy(date: NaiveDate) -> String {
    date.format("%m-%d-%Y").to_string()
}

/// Whole years between `date_of_birth` and `on`, or `None` if the birth date
/// does not parse or lies in the future.
pub fn age_in_years(date_of_birth: &str, on: NaiveDate) -> Option<i32> {
    let birth = parse_mmddyyyy(date_of_birth)?;
    if birth > on {
        return None;
    }
    let mut age = on.year() - birth.year();
    if (on.month(), on.day()) < (birth.month(), birth.day()) {
        age -= 1;
    }
    Some(age)
}

/// Age as of the local calendar date
pub fn age_today(date_of_birth: &str) -> Option<i32> {
    age_in_years(date_of_birth, Local::now().date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_dates() {
        assert_eq!(
            parse_mmddyyyy("02-29-2020"),
            NaiveDate::from_ymd_opt(2020, 2, 29)
        );
        assert_eq!(
            parse_mmddyyyy("12-31-1999"),
            NaiveDate::from_ymd_opt(1999, 12, 31)
        );
    }

    #[test]
    fn rejects_malformed_and_impossible_dates() {
        assert!(!is_valid_date("02-30-2020")); // not a real day
        assert!(!is_valid_date("2020-02-01")); // ISO order
        assert!(!is_valid_date("2-1-2020")); // unpadded
        assert!(!is_valid_date("02-01-20")); // short year
        assert!(!is_valid_date("02-01-2020-X"));
        assert!(!is_valid_date(""));
    }

    #[test]
    fn converts_to_iso() {
        assert_eq!(to_iso("03-05-2018").as_deref(), Some("2018-03-05"));
        assert_eq!(to_iso("13-05-2018"), None);
    }

    #[test]
    fn computes_age_with_birthday_boundary() {
        let on = NaiveDate::from_ymd_opt(2026, 6, 15).unwrap();
        assert_eq!(age_in_years("06-15-2008", on), Some(18)); // birthday today
        assert_eq!(age_in_years("06-16-2008", on), Some(17)); // birthday tomorrow
        assert_eq!(age_in_years("06-14-2008", on), Some(18));
        assert_eq!(age_in_years("01-01-2030", on), None); // future
    }
}
