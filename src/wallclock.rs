//! Timezone-aware conversion between instants and local wall-clock fields.
//!
//! MIT License
//!
//! Copyright (c) 2026 66f94eae
//!
//! Permission is hereby granted, free of charge, to any person obtaining a copy
//! of this software and associated documentation files (the "Software"), to deal
//! in the Software without restriction, including without limitation the rights
//! to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
//! copies of the Software, and to permit persons to whom the Software is
//! furnished to do so, subject to the following conditions:
//!
//! The above copyright notice and this permission notice shall be included in all
//! copies or substantial portions of the Software.
//!
//! THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
//! IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
//! FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
//! AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
//! LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
//! OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
//! SOFTWARE.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike, Utc, Weekday};
use chrono_tz::Tz;

use crate::error::{CalendarError, Result};

/// Local date format (YYYY-MM-DD)
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Number of offset corrections applied when resolving a wall-clock reading
const CORRECTION_PASSES: usize = 2;

/// Calendar and clock fields of an instant as observed in a timezone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalFields {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl fmt::Display for LocalFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Wall clock of a single IANA timezone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallClock {
    tz: Tz,
}

impl WallClock {
    /// Creates a wall clock for the named timezone
    ///
    /// # Errors
    /// * `UnknownTimezone` if the identifier is not in the timezone database
    pub fn new(name: &str) -> Result<Self> {
        name.parse::<Tz>()
            .map(Self::from_tz)
            .map_err(|_| CalendarError::UnknownTimezone(name.to_string()))
    }

    pub fn from_tz(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// Reads the local wall clock at `instant`
    pub fn to_local_fields(&self, instant: DateTime<Utc>) -> LocalFields {
        let local = instant.with_timezone(&self.tz);
        LocalFields {
            year: local.year(),
            month: local.month(),
            day: local.day(),
            hour: local.hour(),
            minute: local.minute(),
            second: local.second(),
        }
    }

    /// Local calendar date of `instant`
    pub fn to_local_date(&self, instant: DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.tz).date_naive()
    }

    /// Local calendar date of `instant` formatted as YYYY-MM-DD
    pub fn to_local_date_string(&self, instant: DateTime<Utc>) -> String {
        self.to_local_date(instant).format(DATE_FORMAT).to_string()
    }

    /// Local weekday of `instant`
    pub fn weekday(&self, instant: DateTime<Utc>) -> Weekday {
        instant.with_timezone(&self.tz).weekday()
    }

    /// Returns the instant whose local reading is `date` at `hour:minute:second`
    ///
    /// # Arguments
    /// * `date` - Local calendar date anchoring year, month and day
    /// * `hour` - Local hour, 24 meaning midnight at the end of `date`
    /// * `minute` - Local minute
    /// * `second` - Local second
    ///
    /// # Errors
    /// * `OutOfRange` when the result cannot be represented
    pub fn from_local_fields(
        &self,
        date: NaiveDate,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Result<DateTime<Utc>> {
        let time_of_day = TimeDelta::hours(i64::from(hour))
            + TimeDelta::minutes(i64::from(minute))
            + TimeDelta::seconds(i64::from(second));
        self.at_time_of_day(date, time_of_day)
    }

    /// Same as [`Self::from_local_fields`], anchored to the local date of `instant`
    pub fn on_same_local_day(
        &self,
        instant: DateTime<Utc>,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Result<DateTime<Utc>> {
        self.from_local_fields(self.to_local_date(instant), hour, minute, second)
    }

    /// Returns the instant reading `time_of_day` past local midnight of `date`
    pub fn at_time_of_day(&self, date: NaiveDate, time_of_day: TimeDelta) -> Result<DateTime<Utc>> {
        let wall = date
            .and_time(NaiveTime::MIN)
            .checked_add_signed(time_of_day)
            .ok_or(CalendarError::OutOfRange)?;
        self.resolve(wall)
    }

    /// Wall-clock time elapsed between local midnight of `date` and `instant`
    pub fn time_of_day_since(&self, date: NaiveDate, instant: DateTime<Utc>) -> TimeDelta {
        instant.with_timezone(&self.tz).naive_local() - date.and_time(NaiveTime::MIN)
    }

    /// Maps a local wall-clock reading to an instant.
    ///
    /// The offset depends on the instant being built, so the reading is first
    /// taken at offset zero and then shifted by whatever residual the
    /// timezone reports back. The second pass absorbs an offset change
    /// between the candidate and the corrected instant.
    fn resolve(&self, wall: NaiveDateTime) -> Result<DateTime<Utc>> {
        let mut candidate = wall.and_utc();
        for _ in 0..CORRECTION_PASSES {
            let observed = candidate.with_timezone(&self.tz).naive_local();
            let residual = wall - observed;
            if residual == TimeDelta::zero() {
                break;
            }
            candidate = candidate
                .checked_add_signed(residual)
                .ok_or(CalendarError::OutOfRange)?;
        }
        Ok(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn unknown_timezone_is_rejected() {
        assert_eq!(
            WallClock::new("America/Atlantis"),
            Err(CalendarError::UnknownTimezone("America/Atlantis".to_string()))
        );
    }

    #[test]
    fn reads_local_fields_in_bogota() {
        let clock = WallClock::new("America/Bogota").unwrap();
        let fields = clock.to_local_fields(utc("2025-04-10T15:00:00Z"));
        assert_eq!(
            fields,
            LocalFields { year: 2025, month: 4, day: 10, hour: 10, minute: 0, second: 0 }
        );
        assert_eq!(fields.to_string(), "2025-04-10 10:00:00");
        assert_eq!(clock.weekday(utc("2025-04-10T15:00:00Z")), Weekday::Thu);
    }

    #[test]
    fn local_date_lags_utc_date_late_in_the_evening() {
        let clock = WallClock::new("America/Bogota").unwrap();
        assert_eq!(clock.to_local_date_string(utc("2025-04-11T03:00:00Z")), "2025-04-10");
        assert_eq!(clock.weekday(utc("2025-04-11T03:00:00Z")), Weekday::Thu);
    }

    #[test]
    fn resolves_fixed_negative_offset() {
        let clock = WallClock::new("America/Bogota").unwrap();
        assert_eq!(
            clock.from_local_fields(date(2025, 4, 10), 8, 0, 0).unwrap(),
            utc("2025-04-10T13:00:00Z")
        );
        assert_eq!(
            clock.from_local_fields(date(2025, 4, 10), 17, 30, 15).unwrap(),
            utc("2025-04-10T22:30:15Z")
        );
    }

    #[test]
    fn resolves_half_hour_offset_across_utc_midnight() {
        let clock = WallClock::new("Asia/Kolkata").unwrap();
        assert_eq!(
            clock.from_local_fields(date(2025, 1, 15), 22, 0, 0).unwrap(),
            utc("2025-01-15T16:30:00Z")
        );
        assert_eq!(
            clock.from_local_fields(date(2025, 1, 15), 2, 0, 0).unwrap(),
            utc("2025-01-14T20:30:00Z")
        );
    }

    #[test]
    fn resolves_quarter_hour_offset() {
        let clock = WallClock::new("Asia/Kathmandu").unwrap();
        assert_eq!(
            clock.from_local_fields(date(2025, 6, 2), 10, 0, 0).unwrap(),
            utc("2025-06-02T04:15:00Z")
        );
    }

    #[test]
    fn follows_daylight_saving_offsets() {
        let clock = WallClock::new("America/New_York").unwrap();
        assert_eq!(
            clock.from_local_fields(date(2025, 7, 1), 8, 0, 0).unwrap(),
            utc("2025-07-01T12:00:00Z")
        );
        assert_eq!(
            clock.from_local_fields(date(2025, 1, 6), 8, 0, 0).unwrap(),
            utc("2025-01-06T13:00:00Z")
        );
        // first local day after the spring transition, offset differs from the candidate's
        assert_eq!(
            clock.from_local_fields(date(2025, 3, 9), 20, 0, 0).unwrap(),
            utc("2025-03-10T00:00:00Z")
        );
    }

    #[test]
    fn hour_twenty_four_is_next_midnight() {
        let clock = WallClock::new("America/Bogota").unwrap();
        let end = clock.from_local_fields(date(2025, 4, 10), 24, 0, 0).unwrap();
        assert_eq!(end, utc("2025-04-11T05:00:00Z"));
        assert_eq!(clock.time_of_day_since(date(2025, 4, 10), end), TimeDelta::hours(24));
    }

    #[test]
    fn same_local_day_anchor() {
        let clock = WallClock::new("America/Bogota").unwrap();
        // 02:00Z on the 11th is still the 10th in Bogota
        assert_eq!(
            clock.on_same_local_day(utc("2025-04-11T02:00:00Z"), 12, 0, 0).unwrap(),
            utc("2025-04-10T17:00:00Z")
        );
    }
}
