//! Calendar date utilities.

#[cfg(feature = "postgres")]
use std::error::Error as StdError;
use std::{fmt, iter::FusedIterator, str::FromStr};

use derive_more::{Display, Error};
#[cfg(feature = "postgres")]
use postgres_types::{
    accepts, private::BytesMut, to_sql_checked, FromSql, IsNull, ToSql, Type,
};
use time::{macros::format_description, Duration, Month};

/// Calendar date without a time-of-day component.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Date(time::Date);

impl Date {
    /// Creates a new [`Date`] from the provided year, month and day.
    ///
    /// [`None`] is returned if the components don't form a valid date.
    #[must_use]
    pub fn from_ymd(year: i32, month: u8, day: u8) -> Option<Self> {
        let month = Month::try_from(month).ok()?;
        time::Date::from_calendar_date(year, month, day).ok().map(Self)
    }

    /// Returns the [`Date`] following this one.
    ///
    /// [`None`] is returned on overflow of the supported range.
    #[must_use]
    pub fn next_day(self) -> Option<Self> {
        self.0.next_day().map(Self)
    }

    /// Returns this [`Date`] shifted by the provided number of days.
    ///
    /// [`None`] is returned on overflow of the supported range.
    #[must_use]
    pub fn add_days(self, days: i64) -> Option<Self> {
        self.0.checked_add(Duration::days(days)).map(Self)
    }

    /// Returns this [`Date`] shifted forward by the provided number of
    /// months.
    ///
    /// The day is clamped to the last day of the resulting month, so
    /// `2024-01-31` plus one month is `2024-02-29`.
    #[must_use]
    pub fn add_months(self, months: u32) -> Option<Self> {
        let total = i64::from(self.0.year()) * 12
            + i64::from(u8::from(self.0.month()) - 1)
            + i64::from(months);
        let year = i32::try_from(total.div_euclid(12)).ok()?;
        let month = u8::try_from(total.rem_euclid(12) + 1).ok()?;
        let month = Month::try_from(month).ok()?;
        let day = self.0.day().min(time::util::days_in_year_month(year, month));
        time::Date::from_calendar_date(year, month, day).ok().map(Self)
    }

    /// Returns the number of days from this [`Date`] to the `other` one.
    ///
    /// Negative if `other` precedes this [`Date`].
    #[must_use]
    pub fn days_until(self, other: Self) -> i64 {
        (other.0 - self.0).whole_days()
    }

    /// Returns an iterator over every [`Date`] from this one to the `last`
    /// one, both inclusive.
    ///
    /// The iterator is empty if `last` precedes this [`Date`].
    #[must_use]
    pub fn through(self, last: Self) -> Days {
        Days {
            next: (self <= last).then_some(self),
            last,
        }
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}",
            self.0.year(),
            u8::from(self.0.month()),
            self.0.day(),
        )
    }
}

impl FromStr for Date {
    type Err = ParseError;

    /// Parses a [`Date`] from its `YYYY-MM-DD` representation.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        let well_shaped = bytes.len() == 10
            && bytes.iter().enumerate().all(|(i, b)| match i {
                4 | 7 => *b == b'-',
                _ => b.is_ascii_digit(),
            });
        if !well_shaped {
            return Err(ParseError::Format);
        }

        time::Date::parse(s, format_description!("[year]-[month]-[day]"))
            .map(Self)
            .map_err(ParseError::Parse)
    }
}

impl From<time::Date> for Date {
    fn from(date: time::Date) -> Self {
        Self(date)
    }
}

impl From<Date> for time::Date {
    fn from(date: Date) -> Self {
        date.0
    }
}

/// Error of parsing a [`Date`] from a string.
#[derive(Clone, Copy, Debug, Display, Error)]
pub enum ParseError {
    /// String is not in the `YYYY-MM-DD` form.
    #[display("expected `YYYY-MM-DD` format")]
    Format,

    /// String has the right form, but doesn't denote a valid date.
    #[display("invalid date: {_0}")]
    Parse(time::error::Parse),
}

/// Iterator over consecutive [`Date`]s, created by [`Date::through()`].
#[derive(Clone, Copy, Debug)]
pub struct Days {
    /// Next [`Date`] to yield, if any.
    next: Option<Date>,

    /// Last [`Date`] to yield.
    last: Date,
}

impl Iterator for Days {
    type Item = Date;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.next_day().filter(|d| *d <= self.last);
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.next.map_or(0, |d| {
            usize::try_from(d.days_until(self.last) + 1).unwrap_or(0)
        });
        (len, Some(len))
    }
}

impl ExactSizeIterator for Days {}
impl FusedIterator for Days {}

/// Non-empty stay between a check-in and a check-out [`Date`].
///
/// The check-out [`Date`] is always strictly after the check-in one.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct DateRange {
    /// First [`Date`] of this [`DateRange`].
    check_in: Date,

    /// [`Date`] this [`DateRange`] ends at.
    check_out: Date,
}

impl DateRange {
    /// Creates a new [`DateRange`].
    ///
    /// [`None`] is returned unless `check_out` is strictly after `check_in`.
    #[must_use]
    pub fn new(check_in: Date, check_out: Date) -> Option<Self> {
        (check_out > check_in).then_some(Self {
            check_in,
            check_out,
        })
    }

    /// Returns the check-in [`Date`].
    #[must_use]
    pub const fn check_in(&self) -> Date {
        self.check_in
    }

    /// Returns the check-out [`Date`].
    #[must_use]
    pub const fn check_out(&self) -> Date {
        self.check_out
    }

    /// Number of nights of this stay, never less than `1`.
    #[must_use]
    pub fn nights(&self) -> u32 {
        u32::try_from(self.check_in.days_until(self.check_out))
            .unwrap_or(u32::MAX)
            .max(1)
    }

    /// Indicates whether this stay collides with the `other` one.
    ///
    /// Uses half-open semantics: the check-out day is free, so back-to-back
    /// stays don't overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.check_in < other.check_out && self.check_out > other.check_in
    }

    /// Indicates whether this stay touches the provided calendar `day`,
    /// counting both the check-in and the check-out days.
    #[must_use]
    pub fn touches(&self, day: Date) -> bool {
        self.check_in <= day && day <= self.check_out
    }

    /// Indicates whether this stay touches any day of the `[from, to]`
    /// calendar window, both ends inclusive.
    #[must_use]
    pub fn touches_window(&self, from: Date, to: Date) -> bool {
        self.check_in <= to && self.check_out >= from
    }
}

#[cfg(feature = "postgres")]
impl FromSql<'_> for Date {
    accepts!(DATE);

    fn from_sql(
        ty: &Type,
        raw: &[u8],
    ) -> Result<Self, Box<dyn StdError + Sync + Send>> {
        time::Date::from_sql(ty, raw).map(Self)
    }
}

#[cfg(feature = "postgres")]
impl ToSql for Date {
    accepts!(DATE);
    to_sql_checked!();

    fn to_sql(
        &self,
        ty: &Type,
        w: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn StdError + Sync + Send>> {
        self.0.to_sql(ty, w)
    }
}

#[cfg(feature = "juniper")]
mod juniper {
    //! Module providing integration with [`juniper`] crate.

    use std::str::FromStr as _;

    use juniper::{graphql_scalar, InputValue, ScalarValue, Value};

    /// Calendar date in `YYYY-MM-DD` format.
    #[graphql_scalar(with = Self, parse_token(String))]
    type Date = super::Date;

    impl Date {
        fn to_output<S: ScalarValue>(d: &Date) -> Value<S> {
            Value::scalar(d.to_string())
        }

        fn from_input<S: ScalarValue>(
            input: &InputValue<S>,
        ) -> Result<Self, String> {
            input
                .as_string_value()
                .ok_or_else(|| {
                    format!(
                        "Cannot parse `Date` input scalar from \
                         non-string value: {input}",
                    )
                })
                .and_then(|s| {
                    Self::from_str(s).map_err(|e| {
                        format!("Cannot parse `Date` input scalar: {e}")
                    })
                })
        }
    }
}

#[cfg(test)]
mod spec {
    use super::{Date, DateRange};

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    fn range(from: &str, to: &str) -> DateRange {
        DateRange::new(date(from), date(to)).unwrap()
    }

    #[test]
    fn parses_only_exact_format() {
        assert_eq!(date("2024-06-01"), Date::from_ymd(2024, 6, 1).unwrap());
        assert_eq!(date("2024-02-29").to_string(), "2024-02-29");

        assert!("2024-6-01".parse::<Date>().is_err());
        assert!("2024/06/01".parse::<Date>().is_err());
        assert!("01-06-2024".parse::<Date>().is_err());
        assert!("2024-06-01T00:00:00Z".parse::<Date>().is_err());
        assert!("2023-02-29".parse::<Date>().is_err());
        assert!("2024-13-01".parse::<Date>().is_err());
        assert!("".parse::<Date>().is_err());
    }

    #[test]
    fn adds_months_clamping_day() {
        assert_eq!(date("2024-01-31").add_months(1), Some(date("2024-02-29")));
        assert_eq!(date("2024-11-15").add_months(3), Some(date("2025-02-15")));
        assert_eq!(date("2024-06-01").add_months(0), Some(date("2024-06-01")));
    }

    #[test]
    fn iterates_days_inclusively() {
        let days = date("2024-02-28").through(date("2024-03-01"));
        assert_eq!(days.len(), 3);
        assert_eq!(
            days.collect::<Vec<_>>(),
            vec![date("2024-02-28"), date("2024-02-29"), date("2024-03-01")],
        );
        assert_eq!(date("2024-03-02").through(date("2024-03-01")).count(), 0);
        assert_eq!(date("2024-03-01").through(date("2024-03-01")).count(), 1);
    }

    #[test]
    fn range_requires_check_out_after_check_in() {
        assert!(DateRange::new(date("2024-06-02"), date("2024-06-02")).is_none());
        assert!(DateRange::new(date("2024-06-03"), date("2024-06-02")).is_none());
        assert_eq!(range("2024-06-01", "2024-06-03").nights(), 2);
        assert_eq!(range("2024-06-01", "2024-06-02").nights(), 1);
    }

    #[test]
    fn back_to_back_stays_do_not_overlap() {
        let first = range("2024-06-01", "2024-06-03");
        let second = range("2024-06-03", "2024-06-05");
        assert!(!first.overlaps(&second));
        assert!(!second.overlaps(&first));
    }

    #[test]
    fn intersecting_stays_overlap() {
        let a = range("2024-06-01", "2024-06-04");
        let b = range("2024-06-03", "2024-06-06");
        let inner = range("2024-06-02", "2024-06-03");
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
        assert!(a.overlaps(&inner));
        assert!(inner.overlaps(&a));
        assert!(a.overlaps(&a));
    }

    #[test]
    fn touches_days_inclusively() {
        let stay = range("2024-06-01", "2024-06-03");
        assert!(stay.touches(date("2024-06-01")));
        assert!(stay.touches(date("2024-06-03")));
        assert!(!stay.touches(date("2024-06-04")));
        assert!(!stay.touches(date("2024-05-31")));
        assert!(stay.touches_window(date("2024-06-03"), date("2024-06-10")));
        assert!(!stay.touches_window(date("2024-06-04"), date("2024-06-10")));
    }
}
