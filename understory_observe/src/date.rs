// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared dates in UTC.

use alloc::rc::{Rc, Weak};
use core::cell::Cell;
use core::fmt;

use time::{Duration, Month, OffsetDateTime};

use crate::value::{ObservableTarget, TargetKey};

const MS_PER_SECOND: i64 = 1_000;
const MS_PER_MINUTE: i64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: i64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: i64 = 24 * MS_PER_HOUR;
const NS_PER_MS: i128 = 1_000_000;

/// Largest representable distance from the epoch, in milliseconds.
const MAX_TIME: f64 = 8.64e15;

/// A shared, mutable point in time.
///
/// Stored as milliseconds since the Unix epoch. `NaN` marks an invalid date;
/// getters return `None` for invalid dates and setters leave them invalid,
/// except [`set_utc_full_year`](Self::set_utc_full_year) which starts over
/// from the epoch.
///
/// Calendar fields follow the usual conventions: months are zero-based, days
/// of the month start at one, and out-of-range fields roll over into the
/// neighbouring unit.
///
/// Only UTC accessors exist; there is no local time zone.
///
/// # Example
///
/// ```rust
/// use understory_observe::Date;
///
/// let date = Date::from_utc(2024, 1, 28, 12, 0, 0, 0);
/// date.set_utc_date(30);
///
/// // February 2024 has 29 days, so the 30th rolls over into March.
/// assert_eq!(date.utc_month(), Some(2));
/// assert_eq!(date.utc_date(), Some(1));
/// ```
#[derive(Clone)]
pub struct Date(Rc<Cell<f64>>);

impl Date {
    /// Creates a date from milliseconds since the epoch.
    ///
    /// Non-finite or out-of-range values produce an invalid date.
    #[must_use]
    pub fn from_millis(millis: f64) -> Self {
        Self(Rc::new(Cell::new(time_clip(millis))))
    }

    /// Creates a date from UTC calendar fields.
    #[must_use]
    pub fn from_utc(
        year: i64,
        month: i64,
        day: i64,
        hours: i64,
        minutes: i64,
        seconds: i64,
        millis: i64,
    ) -> Self {
        let parts = Parts {
            year,
            month,
            day,
            hours,
            minutes,
            seconds,
            millis,
        };
        Self::from_millis(parts.compose())
    }

    /// Creates an invalid date.
    #[must_use]
    pub fn invalid() -> Self {
        Self::from_millis(f64::NAN)
    }

    /// Returns milliseconds since the epoch, `NaN` if invalid.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.0.get()
    }

    /// Returns `true` unless this is an invalid date.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        !self.0.get().is_nan()
    }

    /// Replaces the time, returning the stored (clipped) value.
    pub fn set_time(&self, millis: f64) -> f64 {
        let t = time_clip(millis);
        self.0.set(t);
        t
    }

    /// Returns the year.
    #[must_use]
    pub fn utc_full_year(&self) -> Option<i64> {
        self.parts().map(|p| p.year)
    }

    /// Returns the zero-based month.
    #[must_use]
    pub fn utc_month(&self) -> Option<i64> {
        self.parts().map(|p| p.month)
    }

    /// Returns the day of the month, starting at one.
    #[must_use]
    pub fn utc_date(&self) -> Option<i64> {
        self.parts().map(|p| p.day)
    }

    /// Returns the day of the week, zero for Sunday.
    #[must_use]
    pub fn utc_day(&self) -> Option<i64> {
        self.datetime()
            .map(|datetime| i64::from(datetime.weekday().number_days_from_sunday()))
    }

    /// Returns the hour of the day.
    #[must_use]
    pub fn utc_hours(&self) -> Option<i64> {
        self.parts().map(|p| p.hours)
    }

    /// Returns the minute of the hour.
    #[must_use]
    pub fn utc_minutes(&self) -> Option<i64> {
        self.parts().map(|p| p.minutes)
    }

    /// Returns the second of the minute.
    #[must_use]
    pub fn utc_seconds(&self) -> Option<i64> {
        self.parts().map(|p| p.seconds)
    }

    /// Returns the millisecond of the second.
    #[must_use]
    pub fn utc_milliseconds(&self) -> Option<i64> {
        self.parts().map(|p| p.millis)
    }

    /// Sets the year. An invalid date is first reset to the epoch.
    pub fn set_utc_full_year(&self, year: i64) -> f64 {
        let mut parts = self
            .parts()
            .unwrap_or_else(|| Parts::from(OffsetDateTime::UNIX_EPOCH));
        parts.year = year;
        self.set_time(parts.compose())
    }

    /// Sets the zero-based month.
    pub fn set_utc_month(&self, month: i64) -> f64 {
        self.update(|p| p.month = month)
    }

    /// Sets the day of the month.
    pub fn set_utc_date(&self, day: i64) -> f64 {
        self.update(|p| p.day = day)
    }

    /// Sets the hour of the day.
    pub fn set_utc_hours(&self, hours: i64) -> f64 {
        self.update(|p| p.hours = hours)
    }

    /// Sets the minute of the hour.
    pub fn set_utc_minutes(&self, minutes: i64) -> f64 {
        self.update(|p| p.minutes = minutes)
    }

    /// Sets the second of the minute.
    pub fn set_utc_seconds(&self, seconds: i64) -> f64 {
        self.update(|p| p.seconds = seconds)
    }

    /// Sets the millisecond of the second.
    pub fn set_utc_milliseconds(&self, millis: i64) -> f64 {
        self.update(|p| p.millis = millis)
    }

    /// Returns `true` if both handles refer to the same date.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn downgrade(&self) -> Weak<Cell<f64>> {
        Rc::downgrade(&self.0)
    }

    fn update(&self, f: impl FnOnce(&mut Parts)) -> f64 {
        match self.parts() {
            Some(mut parts) => {
                f(&mut parts);
                self.set_time(parts.compose())
            }
            None => f64::NAN,
        }
    }

    #[expect(
        clippy::cast_possible_truncation,
        reason = "stored times are integral and within ±8.64e15"
    )]
    fn millis(&self) -> Option<i64> {
        let t = self.0.get();
        (!t.is_nan()).then_some(t as i64)
    }

    fn datetime(&self) -> Option<OffsetDateTime> {
        let t = self.millis()?;
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(t) * NS_PER_MS).ok()
    }

    fn parts(&self) -> Option<Parts> {
        self.datetime().map(Parts::from)
    }
}

impl ObservableTarget for Date {
    fn target_key(&self) -> Option<TargetKey> {
        Some(TargetKey::of(&self.0))
    }
}

impl fmt::Debug for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Date").field(&self.0.get()).finish()
    }
}

/// Broken-down UTC time. Fields may be out of range before composing.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Parts {
    year: i64,
    month: i64,
    day: i64,
    hours: i64,
    minutes: i64,
    seconds: i64,
    millis: i64,
}

impl Parts {
    /// Milliseconds since the epoch, `NaN` if the fields overflow.
    fn compose(self) -> f64 {
        self.to_datetime().map_or(f64::NAN, epoch_millis)
    }

    /// Resolves the fields, rolling overflowing units into larger ones.
    fn to_datetime(self) -> Option<OffsetDateTime> {
        let year = self.year.checked_add(self.month.div_euclid(12))?;
        let month = u8::try_from(self.month.rem_euclid(12) + 1).ok()?;
        let month_start = time::Date::from_calendar_date(
            i32::try_from(year).ok()?,
            Month::try_from(month).ok()?,
            1,
        )
        .ok()?;
        let offset = self
            .day
            .checked_sub(1)?
            .checked_mul(MS_PER_DAY)?
            .checked_add(self.hours.checked_mul(MS_PER_HOUR)?)?
            .checked_add(self.minutes.checked_mul(MS_PER_MINUTE)?)?
            .checked_add(self.seconds.checked_mul(MS_PER_SECOND)?)?
            .checked_add(self.millis)?;
        month_start
            .midnight()
            .assume_utc()
            .checked_add(Duration::milliseconds(offset))
    }
}

impl From<OffsetDateTime> for Parts {
    fn from(datetime: OffsetDateTime) -> Self {
        Self {
            year: i64::from(datetime.year()),
            month: i64::from(u8::from(datetime.month())) - 1,
            day: i64::from(datetime.day()),
            hours: i64::from(datetime.hour()),
            minutes: i64::from(datetime.minute()),
            seconds: i64::from(datetime.second()),
            millis: i64::from(datetime.millisecond()),
        }
    }
}

fn epoch_millis(datetime: OffsetDateTime) -> f64 {
    let millis = datetime.unix_timestamp_nanos().div_euclid(NS_PER_MS);
    i64::try_from(millis).map_or(f64::NAN, |t| t as f64)
}

fn time_clip(t: f64) -> f64 {
    if !t.is_finite() || t.abs() > MAX_TIME {
        return f64::NAN;
    }
    // Truncates toward zero; also folds -0 into +0.
    #[expect(
        clippy::cast_possible_truncation,
        reason = "bounded by MAX_TIME, well within i64"
    )]
    let whole = t as i64;
    whole as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_fields() {
        let date = Date::from_millis(0.0);
        assert_eq!(date.utc_full_year(), Some(1970));
        assert_eq!(date.utc_month(), Some(0));
        assert_eq!(date.utc_date(), Some(1));
        assert_eq!(date.utc_day(), Some(4));
        assert_eq!(date.utc_hours(), Some(0));
    }

    #[test]
    fn extremes_of_the_time_range() {
        let last = Date::from_millis(MAX_TIME);
        assert_eq!(last.utc_full_year(), Some(275_760));
        assert_eq!(last.utc_month(), Some(8));
        assert_eq!(last.utc_date(), Some(13));

        let first = Date::from_millis(-MAX_TIME);
        assert_eq!(first.utc_full_year(), Some(-271_821));
        assert_eq!(first.utc_month(), Some(3));
        assert_eq!(first.utc_date(), Some(20));

        assert_eq!(
            Date::from_utc(2000, 2, 1, 0, 0, 0, 0).time(),
            951_868_800_000.0
        );
        assert!(!Date::from_utc(300_000, 0, 1, 0, 0, 0, 0).is_valid());
        assert!(!Date::from_utc(2_000_000, 0, 1, 0, 0, 0, 0).is_valid());
    }

    #[test]
    fn extreme_fields_invalidate_the_date() {
        let setters: [fn(&Date, i64) -> f64; 7] = [
            Date::set_utc_full_year,
            Date::set_utc_month,
            Date::set_utc_date,
            Date::set_utc_hours,
            Date::set_utc_minutes,
            Date::set_utc_seconds,
            Date::set_utc_milliseconds,
        ];
        for (i, set) in setters.into_iter().enumerate() {
            for extreme in [i64::MIN, i64::MAX] {
                let date = Date::from_millis(0.0);
                assert!(set(&date, extreme).is_nan(), "setter {i} with {extreme}");
                assert!(!date.is_valid());
            }
        }
        for extreme in [i64::MIN, i64::MAX] {
            assert!(!Date::from_utc(extreme, 0, 1, 0, 0, 0, 0).is_valid());
            assert!(!Date::from_utc(2000, extreme, 1, 0, 0, 0, 0).is_valid());
            assert!(!Date::from_utc(2000, 0, extreme, 0, 0, 0, 0).is_valid());
            assert!(!Date::from_utc(2000, 0, 1, 0, 0, 0, extreme).is_valid());
        }
    }

    #[test]
    fn before_epoch() {
        let date = Date::from_millis(-1.0);
        assert_eq!(date.utc_full_year(), Some(1969));
        assert_eq!(date.utc_month(), Some(11));
        assert_eq!(date.utc_date(), Some(31));
        assert_eq!(date.utc_hours(), Some(23));
        assert_eq!(date.utc_milliseconds(), Some(999));
        assert_eq!(date.utc_day(), Some(3));
    }

    #[test]
    fn setters_roll_over() {
        let date = Date::from_utc(2023, 11, 31, 23, 59, 59, 999);
        date.set_utc_milliseconds(1_000);
        assert_eq!(date.utc_full_year(), Some(2024));
        assert_eq!(date.utc_month(), Some(0));
        assert_eq!(date.utc_date(), Some(1));
        assert_eq!(date.utc_hours(), Some(0));

        date.set_utc_month(-1);
        assert_eq!(date.utc_full_year(), Some(2023));
        assert_eq!(date.utc_month(), Some(11));
    }

    #[test]
    fn invalid_dates_stay_invalid_except_full_year() {
        let date = Date::invalid();
        assert!(!date.is_valid());
        assert!(date.set_utc_hours(3).is_nan());
        assert_eq!(date.utc_hours(), None);

        date.set_utc_full_year(2001);
        assert_eq!(date.utc_full_year(), Some(2001));
        assert_eq!(date.utc_month(), Some(0));
    }

    #[test]
    fn set_time_clips() {
        let date = Date::from_millis(10.0);
        assert_eq!(date.set_time(1.9), 1.0);
        assert!(date.set_time(9e15).is_nan());
        assert!(Date::from_millis(f64::INFINITY).time().is_nan());
    }
}
