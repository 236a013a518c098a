//! Set of non-working calendar dates.
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

use std::collections::HashSet;

use chrono::NaiveDate;

use crate::wallclock::DATE_FORMAT;

/// Separator between the two ends of an inclusive date range
const RANGE_SEPARATOR: &str = "..";

/// Dates, in the business timezone, that are non-working besides weekends
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HolidayCalendar {
    dates: HashSet<NaiveDate>,
}

impl HolidayCalendar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a calendar from date specifications
    ///
    /// # Arguments
    /// * `specs` - Items like "2025-04-17" or "2025-04-17..2025-04-18"
    ///
    /// # Returns
    /// * `Err(spec)` carrying the first item that does not parse
    pub fn parse<'a, I>(specs: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut calendar = Self::new();
        for spec in specs {
            let dates = parse_date_spec(spec).ok_or_else(|| spec.to_string())?;
            calendar.dates.extend(dates);
        }
        Ok(calendar)
    }

    /// Whether `date` is a holiday
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn insert(&mut self, date: NaiveDate) -> bool {
        self.dates.insert(date)
    }

    /// Adds every date of `other`
    pub fn merge(&mut self, other: &HolidayCalendar) {
        self.dates.extend(other.dates.iter().copied());
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    /// Dates in ascending order
    pub fn sorted(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = self.dates.iter().copied().collect();
        dates.sort_unstable();
        dates
    }
}

impl FromIterator<NaiveDate> for HolidayCalendar {
    fn from_iter<T: IntoIterator<Item = NaiveDate>>(iter: T) -> Self {
        Self {
            dates: iter.into_iter().collect(),
        }
    }
}

/// Expands a single date or an inclusive "start..end" range
///
/// # Returns
/// * `None` if either end is not a YYYY-MM-DD date
///
/// # Examples
/// * "2025-05-01" → [2025-05-01]
/// * "2025-04-17..2025-04-18" → [2025-04-17, 2025-04-18]
/// * "2025-04-18..2025-04-17" → [2025-04-17, 2025-04-18]
pub fn parse_date_spec(spec: &str) -> Option<Vec<NaiveDate>> {
    let spec = spec.trim();
    match spec.split_once(RANGE_SEPARATOR) {
        None => NaiveDate::parse_from_str(spec, DATE_FORMAT).ok().map(|d| vec![d]),
        Some((a, b)) => {
            let a = NaiveDate::parse_from_str(a.trim(), DATE_FORMAT).ok()?;
            let b = NaiveDate::parse_from_str(b.trim(), DATE_FORMAT).ok()?;
            let (start, end) = (a.min(b), a.max(b));
            Some(start.iter_days().take_while(|d| *d <= end).collect())
        }
    }
}
