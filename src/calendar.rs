//! Business day classification, boundary snapping and day/hour advancement.
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

use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, Utc, Weekday};
use chrono_tz::Tz;

use crate::{
    error::{CalendarError, Result},
    holiday::HolidayCalendar,
    wallclock::WallClock,
};

/// Milliseconds in one hour
const MS_PER_HOUR: f64 = 3_600_000.0;
/// Tolerance, in hours, when comparing a budget against a segment length
const HOUR_EPSILON: f64 = 1e-9;

/// Work schedule of a single business timezone
///
/// Hours are on a 24-hour local clock and satisfy
/// `start < lunch_start < lunch_end < end <= 24`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessRules {
    clock: WallClock,
    workday_start_hour: u32,
    lunch_start_hour: u32,
    lunch_end_hour: u32,
    workday_end_hour: u32,
}

impl BusinessRules {
    /// Creates validated rules
    ///
    /// # Errors
    /// * `UnknownTimezone` if `timezone` is not a known IANA identifier
    /// * `InvalidRules` if the hours are not strictly increasing within 0..=24
    pub fn new(
        timezone: &str,
        workday_start_hour: u32,
        lunch_start_hour: u32,
        lunch_end_hour: u32,
        workday_end_hour: u32,
    ) -> Result<Self> {
        let clock = WallClock::new(timezone)?;
        let ordered = workday_start_hour < lunch_start_hour
            && lunch_start_hour < lunch_end_hour
            && lunch_end_hour < workday_end_hour
            && workday_end_hour <= 24;
        if !ordered {
            return Err(CalendarError::InvalidRules(format!(
                "expected start < lunch start < lunch end < end <= 24, got {}/{}/{}/{}",
                workday_start_hour, lunch_start_hour, lunch_end_hour, workday_end_hour
            )));
        }
        Ok(Self {
            clock,
            workday_start_hour,
            lunch_start_hour,
            lunch_end_hour,
            workday_end_hour,
        })
    }

    pub fn wall_clock(&self) -> &WallClock {
        &self.clock
    }

    pub fn timezone(&self) -> Tz {
        self.clock.timezone()
    }

    pub fn workday_start_hour(&self) -> u32 {
        self.workday_start_hour
    }

    pub fn lunch_start_hour(&self) -> u32 {
        self.lunch_start_hour
    }

    pub fn lunch_end_hour(&self) -> u32 {
        self.lunch_end_hour
    }

    pub fn workday_end_hour(&self) -> u32 {
        self.workday_end_hour
    }
}

impl Default for BusinessRules {
    /// America/Bogota, 08:00-12:00 and 13:00-17:00
    fn default() -> Self {
        Self {
            clock: WallClock::from_tz(Tz::America__Bogota),
            workday_start_hour: 8,
            lunch_start_hour: 12,
            lunch_end_hour: 13,
            workday_end_hour: 17,
        }
    }
}

/// Work calendar: rules plus the holiday set, shared read-only between requests
#[derive(Debug, Clone)]
pub struct BusinessCalendar {
    rules: BusinessRules,
    holidays: HolidayCalendar,
}

impl BusinessCalendar {
    pub fn new(rules: BusinessRules, holidays: HolidayCalendar) -> Self {
        Self { rules, holidays }
    }

    pub fn rules(&self) -> &BusinessRules {
        &self.rules
    }

    pub fn holidays(&self) -> &HolidayCalendar {
        &self.holidays
    }

    /// Advances `start` by `days` business days, then by `hours` business hours
    ///
    /// Absent or non-positive counts skip their step.
    pub fn compute(
        &self,
        start: DateTime<Utc>,
        days: Option<i64>,
        hours: Option<f64>,
    ) -> Result<DateTime<Utc>> {
        let mut result = start;
        if let Some(days) = days.filter(|d| *d > 0) {
            result = self.add_business_days(result, days)?;
        }
        if let Some(hours) = hours.filter(|h| *h > 0.0) {
            result = self.add_business_hours(result, hours)?;
        }
        Ok(result)
    }

    /// Determines if a local calendar date is a business day
    ///
    /// # Returns
    /// * `false` on Saturday, Sunday and holidays
    /// * `true` otherwise
    pub fn is_business_date(&self, date: NaiveDate) -> bool {
        if matches!(date.weekday(), Weekday::Sat | Weekday::Sun) {
            return false;
        }
        !self.holidays.contains(date)
    }

    /// Determines if `instant` falls on a business day in the business timezone
    pub fn is_business_day(&self, instant: DateTime<Utc>) -> bool {
        self.is_business_date(self.rules.clock.to_local_date(instant))
    }

    /// Normalizes `instant` to a well-defined business moment
    ///
    /// # Rules
    /// 1. Non-business day → end of the last preceding business day
    /// 2. Before workday start → end of the last preceding business day
    /// 3. At or after workday end → workday end
    /// 4. Inside lunch → lunch start
    /// 5. Otherwise unchanged
    pub fn snap_to_nearest_working_moment(&self, instant: DateTime<Utc>) -> Result<DateTime<Utc>> {
        self.snap(instant).map(|(_, snapped)| snapped)
    }

    /// Adds whole business days, keeping the snapped local hour, minute and second
    ///
    /// Sub-second precision is dropped. Non-business days are skipped without consuming the count.
    /// `days <= 0` returns `instant` unchanged.
    pub fn add_business_days(&self, instant: DateTime<Utc>, days: i64) -> Result<DateTime<Utc>> {
        if days <= 0 {
            return Ok(instant);
        }
        let (base_date, base) = self.snap(instant)?;
        let elapsed = self.rules.clock.time_of_day_since(base_date, base);
        let time_of_day = TimeDelta::seconds(elapsed.num_seconds());

        let mut day = base_date;
        let mut remaining = days;
        while remaining > 0 {
            day = day.succ_opt().ok_or(CalendarError::OutOfRange)?;
            if self.is_business_date(day) {
                remaining -= 1;
            }
        }

        let landing = self.rules.clock.at_time_of_day(day, time_of_day)?;
        self.snap_to_nearest_working_moment(landing)
    }

    /// Adds business hours, skipping lunch breaks, nights, weekends and holidays
    ///
    /// Fractional hours are honoured to the millisecond.
    /// `hours <= 0` returns `instant` unchanged.
    ///
    /// # Errors
    /// * `InvalidParameters` for a non-finite number of hours
    pub fn add_business_hours(&self, instant: DateTime<Utc>, hours: f64) -> Result<DateTime<Utc>> {
        if hours.is_nan() || hours <= 0.0 {
            return Ok(instant);
        }
        if !hours.is_finite() {
            return Err(CalendarError::InvalidParameters(format!("hours must be finite, got {}", hours)));
        }

        let (mut day, mut cursor) = self.snap(instant)?;
        let mut remaining = hours;
        loop {
            let lunch_start = self.at_hour(day, self.rules.lunch_start_hour)?;
            let lunch_end = self.at_hour(day, self.rules.lunch_end_hour)?;
            let day_end = self.at_hour(day, self.rules.workday_end_hour)?;

            let segment_end = if cursor < lunch_start {
                lunch_start
            } else if cursor >= day_end {
                (day, cursor) = self.next_business_start(day)?;
                continue;
            } else if cursor >= lunch_end {
                day_end
            } else {
                cursor = lunch_end;
                continue;
            };

            let available = (segment_end - cursor).num_milliseconds() as f64 / MS_PER_HOUR;
            if remaining <= available + HOUR_EPSILON {
                let advance = TimeDelta::milliseconds((remaining * MS_PER_HOUR).round() as i64);
                let result = cursor
                    .checked_add_signed(advance)
                    .ok_or(CalendarError::OutOfRange)?;
                return Ok(result.min(segment_end));
            }

            remaining -= available;
            if segment_end == lunch_start {
                cursor = lunch_end;
            } else {
                (day, cursor) = self.next_business_start(day)?;
            }
        }
    }

    /// Snaps `instant` and reports the business date the result belongs to.
    ///
    /// The date is carried alongside the instant since a workday ending at
    /// 24:00 reads as midnight of the following local date.
    fn snap(&self, instant: DateTime<Utc>) -> Result<(NaiveDate, DateTime<Utc>)> {
        let clock = &self.rules.clock;
        let date = clock.to_local_date(instant);
        if !self.is_business_date(date) {
            return self.previous_business_end(date);
        }

        if instant < clock.on_same_local_day(instant, self.rules.workday_start_hour, 0, 0)? {
            return self.previous_business_end(date);
        }

        let day_end = clock.on_same_local_day(instant, self.rules.workday_end_hour, 0, 0)?;
        if instant >= day_end {
            return Ok((date, day_end));
        }

        let lunch_start = clock.on_same_local_day(instant, self.rules.lunch_start_hour, 0, 0)?;
        let lunch_end = clock.on_same_local_day(instant, self.rules.lunch_end_hour, 0, 0)?;
        if instant >= lunch_start && instant < lunch_end {
            return Ok((date, lunch_start));
        }

        Ok((date, instant))
    }

    /// End of the last business day strictly before `date`
    fn previous_business_end(&self, date: NaiveDate) -> Result<(NaiveDate, DateTime<Utc>)> {
        let mut day = date.pred_opt().ok_or(CalendarError::OutOfRange)?;
        while !self.is_business_date(day) {
            day = day.pred_opt().ok_or(CalendarError::OutOfRange)?;
        }
        Ok((day, self.at_hour(day, self.rules.workday_end_hour)?))
    }

    /// Start of the first business day strictly after `date`
    fn next_business_start(&self, date: NaiveDate) -> Result<(NaiveDate, DateTime<Utc>)> {
        let mut day = date.succ_opt().ok_or(CalendarError::OutOfRange)?;
        while !self.is_business_date(day) {
            day = day.succ_opt().ok_or(CalendarError::OutOfRange)?;
        }
        Ok((day, self.at_hour(day, self.rules.workday_start_hour)?))
    }

    fn at_hour(&self, date: NaiveDate, hour: u32) -> Result<DateTime<Utc>> {
        self.rules.clock.from_local_fields(date, hour, 0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn utc(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn bogota() -> BusinessCalendar {
        let holidays =
            HolidayCalendar::parse(["2025-01-01", "2025-04-17", "2025-04-18", "2025-05-01"]).unwrap();
        BusinessCalendar::new(BusinessRules::default(), holidays)
    }

    #[test]
    fn rules_validation() {
        assert!(BusinessRules::new("America/Bogota", 8, 12, 13, 17).is_ok());
        assert!(matches!(
            BusinessRules::new("America/Bogota", 8, 12, 12, 17),
            Err(CalendarError::InvalidRules(_))
        ));
        assert!(matches!(
            BusinessRules::new("America/Bogota", 8, 12, 13, 25),
            Err(CalendarError::InvalidRules(_))
        ));
        assert_eq!(
            BusinessRules::new("Mars/Olympus_Mons", 8, 12, 13, 17),
            Err(CalendarError::UnknownTimezone("Mars/Olympus_Mons".to_string()))
        );
        assert_eq!(BusinessRules::new("America/Bogota", 8, 12, 13, 17).unwrap(), BusinessRules::default());
    }

    #[test]
    fn weekends_and_holidays_are_not_business_days() {
        let cal = bogota();
        assert!(cal.is_business_date(date(2025, 4, 16)));
        assert!(!cal.is_business_date(date(2025, 4, 17)));
        assert!(!cal.is_business_date(date(2025, 4, 19)));
        assert!(!cal.is_business_date(date(2025, 4, 20)));
        // 2025-04-17T02:00Z is still Wednesday evening in Bogota
        assert!(cal.is_business_day(utc("2025-04-17T02:00:00Z")));
        assert!(!cal.is_business_day(utc("2025-04-17T05:00:00Z")));
    }

    #[test]
    fn snap_inside_working_hours_is_identity() {
        let cal = bogota();
        let t = utc("2025-04-15T14:15:00Z"); // Tue 09:15
        assert_eq!(cal.snap_to_nearest_working_moment(t).unwrap(), t);
        let t = utc("2025-04-15T18:00:00Z"); // Tue 13:00
        assert_eq!(cal.snap_to_nearest_working_moment(t).unwrap(), t);
    }

    #[test]
    fn snap_clamps_lunch_and_evening() {
        let cal = bogota();
        assert_eq!(
            cal.snap_to_nearest_working_moment(utc("2025-04-15T17:45:00Z")).unwrap(),
            utc("2025-04-15T17:00:00Z")
        );
        assert_eq!(
            cal.snap_to_nearest_working_moment(utc("2025-04-15T23:00:00Z")).unwrap(),
            utc("2025-04-15T22:00:00Z")
        );
    }

    #[test]
    fn snap_walks_back_over_weekends_and_holidays() {
        let cal = bogota();
        // Saturday morning → Friday 17:00
        assert_eq!(
            cal.snap_to_nearest_working_moment(utc("2025-04-12T15:00:00Z")).unwrap(),
            utc("2025-04-11T22:00:00Z")
        );
        // Monday 07:00 after Holy Week → Wednesday 17:00
        assert_eq!(
            cal.snap_to_nearest_working_moment(utc("2025-04-21T12:00:00Z")).unwrap(),
            utc("2025-04-16T22:00:00Z")
        );
        // Good Friday mid-day → Wednesday 17:00
        assert_eq!(
            cal.snap_to_nearest_working_moment(utc("2025-04-18T16:00:00Z")).unwrap(),
            utc("2025-04-16T22:00:00Z")
        );
    }

    #[test]
    fn five_days_across_holy_week() {
        let cal = bogota();
        // Thu 10:00 → Mon 21 10:00, skipping Apr 17-18 and the weekend
        assert_eq!(
            cal.add_business_days(utc("2025-04-10T15:00:00Z"), 5).unwrap(),
            utc("2025-04-21T15:00:00Z")
        );
    }

    #[test]
    fn days_from_a_weekend_keep_the_snapped_time() {
        let cal = bogota();
        // Saturday 10:00 snaps to Friday 17:00
        assert_eq!(
            cal.add_business_days(utc("2025-04-12T15:00:00Z"), 1).unwrap(),
            utc("2025-04-14T22:00:00Z")
        );
        // lunch snaps to 12:00 and stays there
        assert_eq!(
            cal.add_business_days(utc("2025-04-14T17:30:00Z"), 1).unwrap(),
            utc("2025-04-15T17:00:00Z")
        );
    }

    #[test]
    fn days_drop_sub_second_precision() {
        let cal = bogota();
        assert_eq!(
            cal.add_business_days(utc("2025-04-10T15:00:00.500Z"), 1).unwrap(),
            utc("2025-04-11T15:00:00Z")
        );
        assert_eq!(
            cal.add_business_days(utc("2025-04-10T15:30:45.999Z"), 2).unwrap(),
            utc("2025-04-14T15:30:45Z")
        );
    }

    #[test]
    fn friday_close_plus_one_hour() {
        let cal = bogota();
        assert_eq!(
            cal.add_business_hours(utc("2025-04-11T22:00:00Z"), 1.0).unwrap(),
            utc("2025-04-14T14:00:00Z")
        );
    }

    #[test]
    fn lunch_does_not_count() {
        let cal = bogota();
        // Tue 12:30 + 1h → 14:00
        assert_eq!(
            cal.add_business_hours(utc("2025-04-15T17:30:00Z"), 1.0).unwrap(),
            utc("2025-04-15T19:00:00Z")
        );
        // Tue 11:30 + 1.5h → 12:00 then 13:00-14:00
        assert_eq!(
            cal.add_business_hours(utc("2025-04-15T16:30:00Z"), 1.5).unwrap(),
            utc("2025-04-15T19:00:00Z")
        );
    }

    #[test]
    fn hours_roll_over_holidays() {
        let cal = bogota();
        // Wed 16:00 + 2h → 17:00 Wed, then Mon 21 08:00-09:00
        assert_eq!(
            cal.add_business_hours(utc("2025-04-16T21:00:00Z"), 2.0).unwrap(),
            utc("2025-04-21T14:00:00Z")
        );
        // a full day is exactly eight hours
        assert_eq!(
            cal.add_business_hours(utc("2025-04-14T13:00:00Z"), 8.0).unwrap(),
            utc("2025-04-14T22:00:00Z")
        );
    }

    #[test]
    fn fractional_budget_stops_on_lunch_start_then_resumes() {
        let cal = bogota();
        // Tue 10:30 + 1.5h lands exactly on 12:00
        let at_lunch = cal.add_business_hours(utc("2025-04-15T15:30:00Z"), 1.5).unwrap();
        assert_eq!(at_lunch, utc("2025-04-15T17:00:00Z"));
        // another quarter hour resumes after lunch
        assert_eq!(
            cal.add_business_hours(at_lunch, 0.25).unwrap(),
            utc("2025-04-15T18:15:00Z")
        );
        assert_eq!(
            cal.add_business_hours(utc("2025-04-15T15:30:00Z"), 1.75).unwrap(),
            utc("2025-04-15T18:15:00Z")
        );
        // a third of an hour rounds to the millisecond
        assert_eq!(
            cal.add_business_hours(utc("2025-04-15T16:40:00Z"), 1.0 / 3.0).unwrap(),
            utc("2025-04-15T17:00:00Z")
        );
    }

    #[test]
    fn segment_end_is_reachable_exactly() {
        let cal = bogota();
        assert_eq!(
            cal.add_business_hours(utc("2025-04-14T13:00:00Z"), 4.0).unwrap(),
            utc("2025-04-14T17:00:00Z")
        );
    }

    #[test]
    fn non_positive_counts_are_no_ops() {
        let cal = bogota();
        let t = utc("2025-04-12T15:00:00Z");
        assert_eq!(cal.add_business_days(t, 0).unwrap(), t);
        assert_eq!(cal.add_business_days(t, -3).unwrap(), t);
        assert_eq!(cal.add_business_hours(t, 0.0).unwrap(), t);
        assert_eq!(cal.add_business_hours(t, -1.5).unwrap(), t);
        assert_eq!(cal.compute(t, None, None).unwrap(), t);
        assert!(matches!(
            cal.add_business_hours(t, f64::INFINITY),
            Err(CalendarError::InvalidParameters(_))
        ));
    }

    #[test]
    fn compute_applies_days_then_hours() {
        let cal = bogota();
        // Thu 10:00 + 1 day → Fri 10:00, + 3h → 12:00 then 13:00-14:00
        assert_eq!(
            cal.compute(utc("2025-04-10T15:00:00Z"), Some(1), Some(3.0)).unwrap(),
            utc("2025-04-11T19:00:00Z")
        );
    }

    #[test]
    fn workday_ending_at_midnight() {
        let rules = BusinessRules::new("UTC", 6, 12, 13, 24).unwrap();
        let cal = BusinessCalendar::new(rules, HolidayCalendar::new());
        let saturday = utc("2025-04-12T10:00:00Z");
        let friday_close = utc("2025-04-12T00:00:00Z");
        assert_eq!(cal.snap_to_nearest_working_moment(saturday).unwrap(), friday_close);
        assert_eq!(cal.snap_to_nearest_working_moment(friday_close).unwrap(), friday_close);
        assert_eq!(cal.add_business_days(saturday, 1).unwrap(), utc("2025-04-15T00:00:00Z"));
        assert_eq!(cal.add_business_hours(saturday, 1.0).unwrap(), utc("2025-04-14T07:00:00Z"));
        assert_eq!(
            cal.add_business_days(utc("2025-04-11T23:30:00Z"), 1).unwrap(),
            utc("2025-04-14T23:30:00Z")
        );
    }

    /// Minute-granular instants spanning 2025 and early 2026
    fn instants() -> impl Strategy<Value = DateTime<Utc>> {
        (0i64..(450 * 24 * 60)).prop_map(|m| utc("2025-01-01T00:00:00Z") + TimeDelta::minutes(m))
    }

    proptest! {
        #[test]
        fn snap_is_idempotent(t in instants()) {
            let cal = bogota();
            let once = cal.snap_to_nearest_working_moment(t).unwrap();
            prop_assert_eq!(cal.snap_to_nearest_working_moment(once).unwrap(), once);
        }

        #[test]
        fn days_land_inside_working_hours(t in instants(), d in 1i64..40) {
            let cal = bogota();
            let result = cal.add_business_days(t, d).unwrap();
            prop_assert!(cal.is_business_day(result));

            let date = cal.rules().wall_clock().to_local_date(result);
            let tod = cal.rules().wall_clock().time_of_day_since(date, result);
            prop_assert!(tod >= TimeDelta::hours(8) && tod <= TimeDelta::hours(17));
            prop_assert!(!(tod > TimeDelta::hours(12) && tod < TimeDelta::hours(13)));
        }

        #[test]
        fn days_skip_only_non_business_days(t in instants(), d in 1i64..40) {
            let cal = bogota();
            let (start_date, _) = cal.snap(t).unwrap();
            let result = cal.add_business_days(t, d).unwrap();
            let end_date = cal.rules().wall_clock().to_local_date(result);
            let between = start_date
                .iter_days()
                .skip(1)
                .take_while(|day| *day < end_date)
                .filter(|day| cal.is_business_date(*day))
                .count() as i64;
            prop_assert_eq!(between, d - 1);
        }

        #[test]
        fn hours_are_additive(t in instants(), h1 in 0u32..30, h2 in 0u32..30) {
            let cal = bogota();
            let whole = cal.add_business_hours(t, f64::from(h1 + h2)).unwrap();
            let split = cal.add_business_hours(cal.add_business_hours(t, f64::from(h1)).unwrap(), f64::from(h2)).unwrap();
            prop_assert_eq!(whole, split);
        }

        #[test]
        fn fractional_hours_are_additive(
            t in instants(),
            ms1 in 1i64..(30 * 3_600_000),
            ms2 in 1i64..(30 * 3_600_000),
        ) {
            let cal = bogota();
            let h1 = ms1 as f64 / MS_PER_HOUR;
            let h2 = ms2 as f64 / MS_PER_HOUR;
            let whole = cal.add_business_hours(t, (ms1 + ms2) as f64 / MS_PER_HOUR).unwrap();
            let split = cal.add_business_hours(cal.add_business_hours(t, h1).unwrap(), h2).unwrap();
            prop_assert!((whole - split).num_milliseconds().abs() <= 1, "{} vs {}", whole, split);
        }
    }
}
