//! Holiday set retrieval from JSON feeds and iCalendar files.
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

use std::{future::Future, io::{BufRead, Cursor}};

use chrono::NaiveDate;
use ical::property::Property;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::{
    conf::Conf,
    error::{CalendarError, Result},
    holiday::HolidayCalendar,
    wallclock::DATE_FORMAT,
};

/// Public holiday feed used when no source is configured
pub const DEFAULT_HOLIDAYS_URL: &str = "https://content.capta.co/Recruitment/WorkingDays.json";
/// Country key looked up in JSON feeds
pub const DEFAULT_COUNTRY: &str = "Colombia";

/// First line of an iCalendar stream
const ICAL_MAGIC: &str = "BEGIN:VCALENDAR";
/// iCalendar property key for event start time
const KEY_DTSTART: &str = "DTSTART";
/// iCalendar property key for event end time
const KEY_DTEND: &str = "DTEND";
/// iCalendar date format: YYYYMMDD
const ICAL_DATE_FMT: &str = "%Y%m%d";
/// Lower-case markers of a non-working day in string-valued JSON feeds
const NON_WORKING_MARKERS: [&str; 3] = ["holiday", "non", "no-labor"];

/// Provider of the holiday set, consulted once before requests are served
pub trait HolidaySource {
    fn load_holiday_set(&self) -> impl Future<Output = Result<HolidayCalendar>> + Send;
}

/// Source returning a fixed, already materialized set
#[derive(Debug, Clone, Default)]
pub struct StaticHolidaySource {
    holidays: HolidayCalendar,
}

impl StaticHolidaySource {
    pub fn new(holidays: HolidayCalendar) -> Self {
        Self { holidays }
    }
}

impl HolidaySource for StaticHolidaySource {
    async fn load_holiday_set(&self) -> Result<HolidayCalendar> {
        Ok(self.holidays.clone())
    }
}

/// Holiday loader reading HTTP(S) feeds and local files
pub struct RemoteHolidaySource {
    /// URLs or file paths, unioned together
    sources: Vec<String>,
    /// Key selecting the country in JSON feeds
    country: String,
    /// Set used in place of any failing source; `None` makes failures fatal
    fallback: Option<HolidayCalendar>,
    client: reqwest::Client,
}

impl RemoteHolidaySource {
    pub fn new(sources: Vec<String>, country: impl Into<String>, fallback: Option<HolidayCalendar>) -> Self {
        Self {
            sources,
            country: country.into(),
            fallback,
            client: reqwest::Client::new(),
        }
    }

    /// Creates a loader from the `[holidays]` configuration section
    pub fn from_conf(conf: &Conf) -> Self {
        Self::new(
            conf.holiday_sources().to_vec(),
            conf.holiday_country(),
            conf.holiday_fallback().cloned(),
        )
    }

    /// Reads and parses one source
    ///
    /// # Note
    /// Supports both HTTP URLs and local file paths
    async fn fetch(&self, uri: &str) -> std::result::Result<HolidayCalendar, String> {
        let bytes = if uri.starts_with("http://") || uri.starts_with("https://") {
            let resp = self.client.get(uri).send().await.map_err(|e| e.to_string())?;
            if !resp.status().is_success() {
                return Err(format!("HTTP status {}", resp.status()));
            }
            resp.bytes().await.map_err(|e| e.to_string())?.to_vec()
        } else {
            tokio::fs::read(uri).await.map_err(|e| e.to_string())?
        };
        parse_holidays(&bytes, &self.country)
    }
}

impl HolidaySource for RemoteHolidaySource {
    async fn load_holiday_set(&self) -> Result<HolidayCalendar> {
        let mut calendar = HolidayCalendar::new();
        let mut failures = Vec::new();

        if self.sources.is_empty() {
            failures.push("no holiday source configured".to_string());
        }

        for uri in &self.sources {
            match self.fetch(uri).await {
                Ok(loaded) => {
                    info!(source = %uri, holidays = loaded.len(), "loaded holiday source");
                    calendar.merge(&loaded);
                },
                Err(reason) => {
                    warn!(source = %uri, %reason, "holiday source unavailable");
                    failures.push(format!("{}: {}", uri, reason));
                },
            }
        }

        if failures.is_empty() {
            return Ok(calendar);
        }

        match &self.fallback {
            Some(fallback) => {
                warn!(holidays = fallback.len(), "using fallback holiday set");
                calendar.merge(fallback);
                Ok(calendar)
            },
            None => Err(CalendarError::HolidayDataUnavailable(failures.join("; "))),
        }
    }
}

/// Parses holiday data, detecting iCalendar streams by their header
pub fn parse_holidays(bytes: &[u8], country: &str) -> std::result::Result<HolidayCalendar, String> {
    let text = String::from_utf8_lossy(bytes);
    if text.trim_start_matches('\u{feff}').trim_start().starts_with(ICAL_MAGIC) {
        parse_calendar(Cursor::new(bytes))
    } else {
        parse_json(bytes, country)
    }
}

/// Parses a JSON feed keyed by country
///
/// # Supported Formats
/// * `{"Colombia": {"2025-01-01": false, ...}}` where `false` marks a non-working day
/// * `{"Colombia": {"2025-01-01": "Holiday", ...}}` matched against [`NON_WORKING_MARKERS`]
/// * `{"Colombia": ["2025-01-01", ...]}`
fn parse_json(bytes: &[u8], country: &str) -> std::result::Result<HolidayCalendar, String> {
    let data: Value = serde_json::from_slice(bytes).map_err(|e| format!("invalid JSON: {}", e))?;
    let mut calendar = HolidayCalendar::new();

    match data.get(country) {
        Some(Value::Object(by_date)) => {
            for (ymd, val) in by_date {
                let non_working = match val {
                    Value::Bool(working) => !working,
                    Value::String(label) => {
                        let label = label.to_lowercase();
                        NON_WORKING_MARKERS.iter().any(|m| label.contains(m))
                    },
                    _ => false,
                };
                if non_working {
                    insert_ymd(&mut calendar, ymd);
                }
            }
        },
        Some(Value::Array(list)) => {
            for ymd in list.iter().filter_map(Value::as_str) {
                insert_ymd(&mut calendar, ymd);
            }
        },
        _ => return Err(format!("no '{}' entry in holiday data", country)),
    }
    Ok(calendar)
}

fn insert_ymd(calendar: &mut HolidayCalendar, ymd: &str) {
    match NaiveDate::parse_from_str(ymd, DATE_FORMAT) {
        Ok(date) => {
            calendar.insert(date);
        },
        Err(_) => debug!(value = %ymd, "skipping malformed holiday date"),
    }
}

/// Parses iCalendar data; every VEVENT is a holiday
///
/// All-day events cover `[DTSTART, DTEND)`, timed events every date they touch.
fn parse_calendar<T: BufRead>(reader: T) -> std::result::Result<HolidayCalendar, String> {
    let mut calendar = HolidayCalendar::new();
    let mut found = false;

    for cal in ical::IcalParser::new(reader) {
        let cal = cal.map_err(|e| format!("invalid iCalendar data: {:?}", e))?;
        found = true;

        for event in cal.events {
            let mut start = None;
            let mut end = None;
            for prop in &event.properties {
                match prop.name.as_str() {
                    KEY_DTSTART => start = parse_ical_date(prop),
                    KEY_DTEND => end = parse_ical_date(prop),
                    _ => {},
                }
            }

            let Some((start, _)) = start else {
                continue;
            };
            let last = match end {
                Some((end, true)) => end.pred_opt().unwrap_or(end),
                Some((end, false)) => end,
                None => start,
            };
            for day in start.iter_days().take_while(|d| *d <= last.max(start)) {
                calendar.insert(day);
            }
        }
    }

    if !found {
        return Err("no VCALENDAR found".to_string());
    }
    Ok(calendar)
}

/// Extracts the date of a DTSTART/DTEND property
///
/// # Returns
/// * `(date, true)` for an all-day YYYYMMDD value
/// * `(date, false)` for a YYYYMMDDTHHMMSS[Z] value
fn parse_ical_date(prop: &Property) -> Option<(NaiveDate, bool)> {
    let value = prop.value.as_deref()?.trim();
    let date = NaiveDate::parse_from_str(value.get(..8)?, ICAL_DATE_FMT).ok()?;
    Some((date, value.len() == 8))
}
