//! Age arithmetic on calendar dates.

use chrono::{Datelike, NaiveDate};

/// Whole months between `birth` and `reference`.
///
/// Counts calendar months, subtracting one when the day-of-month has not
/// yet been reached, and clamps at zero for references before the birth
/// date. This matches the backend's age derivation, so a locally computed
/// age agrees with the `ageMonths` value the server stores.
pub fn age_in_months(birth: NaiveDate, reference: NaiveDate) -> u32 {
    let years = reference.year() - birth.year();
    let months = reference.month() as i32 - birth.month() as i32;
    let mut total = years * 12 + months;
    if reference.day() < birth.day() {
        total -= 1;
    }
    total.max(0) as u32
}

/// Whole years between `birth` and `reference`, derived from whole months.
pub fn age_in_years(birth: NaiveDate, reference: NaiveDate) -> u32 {
    age_in_months(birth, reference) / 12
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn counts_whole_months_only() {
        // One day short of two months.
        assert_eq!(age_in_months(date("2024-01-15"), date("2024-03-14")), 1);
        // Exactly two months.
        assert_eq!(age_in_months(date("2024-01-15"), date("2024-03-15")), 2);
    }

    #[test]
    fn clamps_to_zero_before_birth() {
        assert_eq!(age_in_months(date("2024-06-01"), date("2024-05-01")), 0);
        assert_eq!(age_in_months(date("2024-06-01"), date("2024-06-01")), 0);
    }

    #[test]
    fn spans_year_boundaries() {
        assert_eq!(age_in_months(date("2022-11-20"), date("2024-02-20")), 15);
        assert_eq!(age_in_years(date("2020-05-10"), date("2025-05-09")), 4);
        assert_eq!(age_in_years(date("2020-05-10"), date("2025-05-10")), 5);
    }
}
