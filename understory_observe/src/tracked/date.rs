// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::date::Date;
use crate::id::HandlerId;
use crate::registry::Registry;

/// A tracked view of a [`Date`].
///
/// Getters are access events. Every setter is a modification event, even
/// when it leaves the time unchanged.
#[derive(Clone, Debug)]
pub struct TrackedDate {
    raw: Date,
    registry: Registry,
}

/// Getters that report an access before delegating.
macro_rules! tracked_getters {
    ($($(#[$doc:meta])* $name:ident -> $ty:ty;)*) => {
        $(
            $(#[$doc])*
            pub fn $name(&self) -> $ty {
                self.registry.touch(&self.raw);
                self.raw.$name()
            }
        )*
    };
}

/// Setters that report a modification before delegating.
macro_rules! tracked_setters {
    ($($(#[$doc:meta])* $name:ident($arg:ident: $ty:ty);)*) => {
        $(
            $(#[$doc])*
            pub fn $name(&self, $arg: $ty) -> f64 {
                self.registry.modify(&self.raw);
                self.raw.$name($arg)
            }
        )*
    };
}

impl TrackedDate {
    pub(crate) fn new(raw: Date, registry: Registry) -> Self {
        Self { raw, registry }
    }

    /// Returns the wrapped date.
    #[must_use]
    pub fn raw(&self) -> &Date {
        &self.raw
    }

    /// Returns the handler of the wrapped date.
    #[must_use]
    pub fn handler(&self) -> Option<HandlerId> {
        self.registry.find(&self.raw)
    }

    tracked_getters! {
        /// Returns milliseconds since the epoch, `NaN` if invalid.
        time -> f64;
        /// Returns `true` unless this is an invalid date.
        is_valid -> bool;
        /// Returns the year.
        utc_full_year -> Option<i64>;
        /// Returns the zero-based month.
        utc_month -> Option<i64>;
        /// Returns the day of the month.
        utc_date -> Option<i64>;
        /// Returns the day of the week, zero for Sunday.
        utc_day -> Option<i64>;
        /// Returns the hour of the day.
        utc_hours -> Option<i64>;
        /// Returns the minute of the hour.
        utc_minutes -> Option<i64>;
        /// Returns the second of the minute.
        utc_seconds -> Option<i64>;
        /// Returns the millisecond of the second.
        utc_milliseconds -> Option<i64>;
    }

    tracked_setters! {
        /// Replaces the time, returning the stored value.
        set_time(millis: f64);
        /// Sets the year, returning the new time.
        set_utc_full_year(year: i64);
        /// Sets the zero-based month, returning the new time.
        set_utc_month(month: i64);
        /// Sets the day of the month, returning the new time.
        set_utc_date(day: i64);
        /// Sets the hour, returning the new time.
        set_utc_hours(hours: i64);
        /// Sets the minute, returning the new time.
        set_utc_minutes(minutes: i64);
        /// Sets the second, returning the new time.
        set_utc_seconds(seconds: i64);
        /// Sets the millisecond, returning the new time.
        set_utc_milliseconds(millis: i64);
    }
}

view_conversions!(TrackedDate, Date);
