//! Business date computation entry point: request validation, clock and timestamp framing.
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

use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::debug;

use crate::{
    calendar::BusinessCalendar,
    error::{CalendarError, Result},
};

/// Source of the current instant
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Host clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Parses an ISO 8601 timestamp carrying an explicit `Z` designator
///
/// # Errors
/// * `InvalidInstant` for offset timestamps, naive timestamps and garbage
pub fn parse_instant(value: &str) -> Result<DateTime<Utc>> {
    if !value.ends_with('Z') {
        return Err(CalendarError::InvalidInstant(value.to_string()));
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| CalendarError::InvalidInstant(value.to_string()))
}

/// Formats an instant as `YYYY-MM-DDTHH:MM:SS.mmmZ`
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Largest accepted day count, about 380 years of business days
pub const MAX_DAYS: u32 = 100_000;
/// Largest accepted hour count
pub const MAX_HOURS: u32 = 800_000;

/// Days and hours to add, and an optional start timestamp
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputeRequest {
    pub days: Option<u32>,
    pub hours: Option<u32>,
    pub date: Option<String>,
}

impl ComputeRequest {
    /// At least one of days and hours must be positive, neither above its ceiling
    pub fn validate(&self) -> Result<()> {
        let days = self.days.unwrap_or(0);
        let hours = self.hours.unwrap_or(0);
        if days == 0 && hours == 0 {
            return Err(CalendarError::InvalidParameters(
                "days and/or hours must be positive".to_string(),
            ));
        }
        if days > MAX_DAYS {
            return Err(CalendarError::InvalidParameters(format!("days must not exceed {}", MAX_DAYS)));
        }
        if hours > MAX_HOURS {
            return Err(CalendarError::InvalidParameters(format!("hours must not exceed {}", MAX_HOURS)));
        }
        Ok(())
    }
}

/// Computes business dates against a shared calendar
#[derive(Clone)]
pub struct BusinessDateService {
    calendar: Arc<BusinessCalendar>,
    clock: Arc<dyn Clock>,
}

impl BusinessDateService {
    pub fn new(calendar: Arc<BusinessCalendar>, clock: Arc<dyn Clock>) -> Self {
        Self { calendar, clock }
    }

    pub fn calendar(&self) -> &BusinessCalendar {
        &self.calendar
    }

    /// Validates `request` and computes its result instant
    ///
    /// The start defaults to the clock's current instant.
    pub fn execute(&self, request: &ComputeRequest) -> Result<DateTime<Utc>> {
        request.validate()?;
        let start = match request.date.as_deref() {
            Some(date) => parse_instant(date)?,
            None => self.clock.now(),
        };
        let days = request.days.map(i64::from);
        let hours = request.hours.map(f64::from);
        let result = self.calendar.compute(start, days, hours)?;

        debug!(
            start = %format_instant(start),
            ?days,
            ?hours,
            result = %format_instant(result),
            local = %self.calendar.rules().wall_clock().to_local_fields(result),
            "computed business date"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{calendar::BusinessRules, holiday::HolidayCalendar};

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn service(now: &str) -> BusinessDateService {
        let holidays = HolidayCalendar::parse(["2025-04-17", "2025-04-18"]).unwrap();
        let calendar = BusinessCalendar::new(BusinessRules::default(), holidays);
        BusinessDateService::new(Arc::new(calendar), Arc::new(FixedClock(now.parse().unwrap())))
    }

    #[test]
    fn parses_only_utc_instants() {
        assert_eq!(
            parse_instant("2025-04-10T15:00:00Z").unwrap(),
            "2025-04-10T15:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
        assert!(parse_instant("2025-04-10T15:00:00.123Z").is_ok());
        for bad in ["2025-04-10T15:00:00", "2025-04-10T10:00:00-05:00", "2025-04-10", "yesterdayZ", ""] {
            assert_eq!(parse_instant(bad), Err(CalendarError::InvalidInstant(bad.to_string())));
        }
    }

    #[test]
    fn formats_with_milliseconds() {
        let t: DateTime<Utc> = "2025-04-21T15:00:00Z".parse().unwrap();
        assert_eq!(format_instant(t), "2025-04-21T15:00:00.000Z");
    }

    #[test]
    fn requires_days_or_hours() {
        let svc = service("2025-04-10T15:00:00Z");
        for request in [
            ComputeRequest::default(),
            ComputeRequest { days: Some(0), hours: Some(0), date: None },
        ] {
            assert!(matches!(svc.execute(&request), Err(CalendarError::InvalidParameters(_))));
        }
    }

    #[test]
    fn rejects_counts_above_ceiling() {
        let svc = service("2025-04-10T15:00:00Z");
        for request in [
            ComputeRequest { days: Some(MAX_DAYS + 1), ..Default::default() },
            ComputeRequest { hours: Some(u32::MAX), ..Default::default() },
            ComputeRequest { days: Some(1), hours: Some(MAX_HOURS + 1), date: None },
        ] {
            assert!(matches!(svc.execute(&request), Err(CalendarError::InvalidParameters(_))));
        }
        let at_ceiling = ComputeRequest { days: Some(MAX_DAYS), ..Default::default() };
        assert!(svc.execute(&at_ceiling).is_ok());
    }

    #[test]
    fn defaults_start_to_now() {
        let svc = service("2025-04-10T15:00:00Z");
        let result = svc.execute(&ComputeRequest { days: Some(5), ..Default::default() }).unwrap();
        assert_eq!(format_instant(result), "2025-04-21T15:00:00.000Z");
    }

    #[test]
    fn explicit_start_overrides_clock() {
        let svc = service("2030-01-01T00:00:00Z");
        let request = ComputeRequest {
            days: None,
            hours: Some(1),
            date: Some("2025-04-15T17:30:00Z".to_string()),
        };
        assert_eq!(format_instant(svc.execute(&request).unwrap()), "2025-04-15T19:00:00.000Z");
    }

    #[test]
    fn rejects_start_without_utc_designator() {
        let svc = service("2025-04-10T15:00:00Z");
        let request = ComputeRequest {
            days: Some(1),
            hours: None,
            date: Some("2025-04-10T10:00:00".to_string()),
        };
        assert!(matches!(svc.execute(&request), Err(CalendarError::InvalidInstant(_))));
    }
}
