//! Date specs and their resolution against a caller-supplied reference date.
//!
//! A date token is either an absolute calendar date (`2023-01-15`) or a
//! relative offset (`-5d`, `2w`, `1m`, `10y`). Relative offsets are only
//! given meaning by [`DateSpec::resolve`], which shifts the reference date
//! the caller passes in; the engine never reads a wall clock, so evaluation
//! stays deterministic.

use chrono::{Days, Months, NaiveDate};

use crate::error::{QueryError, QueryResult};

/// Unit of a relative date offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateUnit {
    /// `d`
    Day,
    /// `w`
    Week,
    /// `m`
    Month,
    /// `y`
    Year,
}

impl DateUnit {
    /// Maps a unit letter (case-insensitive) to its unit.
    fn from_letter(letter: char) -> Option<Self> {
        match letter.to_ascii_lowercase() {
            'd' => Some(DateUnit::Day),
            'w' => Some(DateUnit::Week),
            'm' => Some(DateUnit::Month),
            'y' => Some(DateUnit::Year),
            _ => None,
        }
    }
}

/// An absolute calendar date or a signed relative offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSpec {
    /// A concrete calendar date; resolution ignores the reference date.
    Absolute(NaiveDate),
    /// An offset from the reference date. Negative counts are the past,
    /// positive counts the future.
    Relative {
        /// The signed number of units.
        count: i32,
        /// The unit the count is measured in.
        unit: DateUnit,
    },
}

/// Returns true if `spec` has the shape of an absolute `YYYY-MM-DD` date.
fn matches_date_fmt(spec: &str) -> bool {
    spec.len() == 10 && spec.bytes().filter(|&b| b == b'-').count() == 2
}

impl DateSpec {
    /// Parses a single date token.
    ///
    /// `position` is the byte offset of the token in the original query,
    /// carried into any error.
    pub fn parse(spec: &str, position: usize) -> QueryResult<Self> {
        let invalid = || QueryError::InvalidDate {
            input: spec.to_string(),
            position,
        };

        if matches_date_fmt(spec) {
            let date = NaiveDate::parse_from_str(spec, "%Y-%m-%d").map_err(|_| invalid())?;
            return Ok(DateSpec::Absolute(date));
        }

        // Relative form: optional '-', digits, one unit letter.
        let (negative, body) = match spec.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, spec),
        };
        let mut chars = body.chars();
        let unit_letter = chars.next_back().ok_or_else(invalid)?;
        let unit = DateUnit::from_letter(unit_letter).ok_or_else(invalid)?;
        let digits = chars.as_str();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let magnitude: i32 = digits.parse().map_err(|_| invalid())?;
        let count = if negative { -magnitude } else { magnitude };

        Ok(DateSpec::Relative { count, unit })
    }

    /// Resolves the spec to a concrete date relative to `today`.
    ///
    /// Month and year arithmetic clamps to the last valid day of the target
    /// month (Jan 31 plus one month is Feb 28/29). Resolution never fails;
    /// offsets past the calendar's bounds saturate.
    pub fn resolve(&self, today: NaiveDate) -> NaiveDate {
        match *self {
            DateSpec::Absolute(date) => date,
            DateSpec::Relative { count, unit } => match unit {
                DateUnit::Day => shift_days(today, i64::from(count)),
                DateUnit::Week => shift_days(today, i64::from(count) * 7),
                DateUnit::Month => shift_months(today, count),
                DateUnit::Year => shift_months(today, count.saturating_mul(12)),
            },
        }
    }
}

fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    if days >= 0 {
        date.checked_add_days(Days::new(days as u64))
            .unwrap_or(NaiveDate::MAX)
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
            .unwrap_or(NaiveDate::MIN)
    }
}

fn shift_months(date: NaiveDate, months: i32) -> NaiveDate {
    if months >= 0 {
        date.checked_add_months(Months::new(months as u32))
            .unwrap_or(NaiveDate::MAX)
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
            .unwrap_or(NaiveDate::MIN)
    }
}

/// A start date and an optional end date, both inclusive once resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// The first day of the range.
    pub start: DateSpec,
    /// The last day of the range; a missing end denotes the single day
    /// named by `start`.
    pub end: Option<DateSpec>,
}

impl DateRange {
    /// Parses a `DATE[:DATE]` range token.
    pub fn parse(spec: &str, position: usize) -> QueryResult<Self> {
        match spec.split_once(':') {
            Some((start, end)) => Ok(Self {
                start: DateSpec::parse(start, position)?,
                end: Some(DateSpec::parse(end, position + start.len() + 1)?),
            }),
            None => Ok(Self {
                start: DateSpec::parse(spec, position)?,
                end: None,
            }),
        }
    }

    /// Resolves both bounds against `today`, collapsing a missing end bound
    /// onto the start so containment is always a closed interval.
    ///
    /// A resolved end earlier than the resolved start is a valid, empty
    /// interval that contains no date.
    pub fn resolve(&self, today: NaiveDate) -> (NaiveDate, NaiveDate) {
        let start = self.start.resolve(today);
        let end = self.end.map_or(start, |spec| spec.resolve(today));
        (start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_parse_absolute_date() {
        assert_eq!(
            DateSpec::parse("2023-01-15", 0).unwrap(),
            DateSpec::Absolute(date(2023, 1, 15))
        );
    }

    #[test]
    fn test_parse_absolute_date_invalid_calendar_day() {
        let err = DateSpec::parse("2023-02-30", 4).unwrap_err();
        assert_eq!(
            err,
            QueryError::InvalidDate {
                input: "2023-02-30".to_string(),
                position: 4,
            }
        );
    }

    #[test]
    fn test_parse_relative_units() {
        assert_eq!(
            DateSpec::parse("7d", 0).unwrap(),
            DateSpec::Relative {
                count: 7,
                unit: DateUnit::Day,
            }
        );
        assert_eq!(
            DateSpec::parse("2W", 0).unwrap(),
            DateSpec::Relative {
                count: 2,
                unit: DateUnit::Week,
            }
        );
        assert_eq!(
            DateSpec::parse("-3m", 0).unwrap(),
            DateSpec::Relative {
                count: -3,
                unit: DateUnit::Month,
            }
        );
        assert_eq!(
            DateSpec::parse("20y", 0).unwrap(),
            DateSpec::Relative {
                count: 20,
                unit: DateUnit::Year,
            }
        );
    }

    #[test]
    fn test_parse_relative_rejects_garbage() {
        for bad in ["d", "-d", "5", "5x", "--1d", "1.5d", "one-day"] {
            assert!(DateSpec::parse(bad, 0).is_err(), "accepted {bad:?}");
        }
    }

    #[test]
    fn test_resolve_absolute_ignores_reference() {
        let spec = DateSpec::Absolute(date(2020, 6, 1));
        assert_eq!(spec.resolve(date(1999, 1, 1)), date(2020, 6, 1));
    }

    #[test]
    fn test_resolve_day_and_week_offsets() {
        let today = date(2000, 1, 31);
        let plus_7d = DateSpec::Relative {
            count: 7,
            unit: DateUnit::Day,
        };
        assert_eq!(plus_7d.resolve(today), date(2000, 2, 7));

        let minus_1d = DateSpec::Relative {
            count: -1,
            unit: DateUnit::Day,
        };
        assert_eq!(minus_1d.resolve(today), date(2000, 1, 30));

        let plus_2w = DateSpec::Relative {
            count: 2,
            unit: DateUnit::Week,
        };
        assert_eq!(plus_2w.resolve(today), date(2000, 2, 14));
    }

    #[test]
    fn test_resolve_month_offset_clamps() {
        let plus_1m = DateSpec::Relative {
            count: 1,
            unit: DateUnit::Month,
        };
        // 2000 is a leap year, 2001 is not.
        assert_eq!(plus_1m.resolve(date(2000, 1, 31)), date(2000, 2, 29));
        assert_eq!(plus_1m.resolve(date(2001, 1, 31)), date(2001, 2, 28));

        let plus_3m = DateSpec::Relative {
            count: 3,
            unit: DateUnit::Month,
        };
        assert_eq!(plus_3m.resolve(date(2000, 1, 31)), date(2000, 4, 30));

        let minus_1m = DateSpec::Relative {
            count: -1,
            unit: DateUnit::Month,
        };
        assert_eq!(minus_1m.resolve(date(2000, 3, 31)), date(2000, 2, 29));
    }

    #[test]
    fn test_resolve_year_offset() {
        let plus_20y = DateSpec::Relative {
            count: 20,
            unit: DateUnit::Year,
        };
        assert_eq!(plus_20y.resolve(date(2000, 1, 31)), date(2020, 1, 31));

        // Leap day clamps on non-leap target years.
        let plus_1y = DateSpec::Relative {
            count: 1,
            unit: DateUnit::Year,
        };
        assert_eq!(plus_1y.resolve(date(2000, 2, 29)), date(2001, 2, 28));
    }

    #[test]
    fn test_range_parse_single_and_pair() {
        let single = DateRange::parse("2000-01-01", 0).unwrap();
        assert_eq!(single.start, DateSpec::Absolute(date(2000, 1, 1)));
        assert_eq!(single.end, None);

        let pair = DateRange::parse("2000-01-01:2000-01-31", 0).unwrap();
        assert_eq!(pair.start, DateSpec::Absolute(date(2000, 1, 1)));
        assert_eq!(pair.end, Some(DateSpec::Absolute(date(2000, 1, 31))));
    }

    #[test]
    fn test_range_parse_mixed_bounds() {
        let range = DateRange::parse("-1w:0d", 0).unwrap();
        assert_eq!(
            range.start,
            DateSpec::Relative {
                count: -1,
                unit: DateUnit::Week,
            }
        );
        assert_eq!(
            range.end,
            Some(DateSpec::Relative {
                count: 0,
                unit: DateUnit::Day,
            })
        );
    }

    #[test]
    fn test_range_parse_bad_end_reports_end_position() {
        let err = DateRange::parse("2000-01-01:never", 1).unwrap_err();
        assert_eq!(
            err,
            QueryError::InvalidDate {
                input: "never".to_string(),
                position: 12,
            }
        );
    }

    #[test]
    fn test_range_resolve_missing_end_is_single_day() {
        let range = DateRange::parse("0d", 0).unwrap();
        let today = date(2024, 5, 5);
        assert_eq!(range.resolve(today), (today, today));
    }

    #[test]
    fn test_range_resolve_inverted_is_allowed() {
        // end before start resolves fine; the evaluator treats it as empty.
        let range = DateRange::parse("0d:-2d", 0).unwrap();
        let today = date(2024, 5, 5);
        assert_eq!(range.resolve(today), (today, date(2024, 5, 3)));
    }
}
