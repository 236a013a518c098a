//! Configuration module for the business date calculator.
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

use serde::{de::{Error, SeqAccess, Visitor}, Deserialize};

use crate::{
    calendar::BusinessRules,
    error::Result,
    holiday::HolidayCalendar,
    source::{DEFAULT_COUNTRY, DEFAULT_HOLIDAYS_URL},
};

/// Holidays used when every configured source fails, unless overridden
const DEFAULT_FALLBACK: [&str; 4] = ["2025-01-01", "2025-04-17", "2025-04-18", "2025-05-01"];

/// Main configuration structure for the application.
///
/// Every section is optional; an empty file reproduces the built-in defaults.
#[derive(Deserialize, Clone, Default)]
pub struct Conf {
    /// Work schedule and business timezone
    #[serde(default)]
    rules: Rules,
    /// Holiday sources and fallback data
    #[serde(default)]
    holidays: Holidays,
    /// HTTP listener settings
    #[serde(default)]
    server: Server,
}

/// Work schedule settings.
///
/// Hours are on a 24-hour local clock.
#[derive(Deserialize, Clone)]
struct Rules {
    #[serde(default = "default_timezone")]
    timezone: String,
    #[serde(default = "default_workday_start_hour")]
    workday_start_hour: u32,
    #[serde(default = "default_lunch_start_hour")]
    lunch_start_hour: u32,
    #[serde(default = "default_lunch_end_hour")]
    lunch_end_hour: u32,
    #[serde(default = "default_workday_end_hour")]
    workday_end_hour: u32,
}

/// Holiday configuration for external data sources.
#[derive(Deserialize, Clone)]
struct Holidays {
    /// List of holiday feed URLs or file paths
    #[serde(default = "default_sources")]
    source: Vec<String>,
    /// Country key selected in JSON feeds
    #[serde(default = "default_country")]
    country: String,
    /// Dates used when a source is unavailable; empty disables the fallback
    /// Deserialized from lists like ["2025-01-01", "2025-04-17..2025-04-18"]
    /// or a single comma separated string
    #[serde(default = "default_fallback", deserialize_with = "deserialize_holidays")]
    fallback: HolidayCalendar,
}

#[derive(Deserialize, Clone)]
struct Server {
    #[serde(default = "default_host")]
    host: String,
    #[serde(default = "default_port")]
    port: u16,
}

fn default_timezone() -> String {
    "America/Bogota".to_string()
}

fn default_workday_start_hour() -> u32 {
    8
}

fn default_lunch_start_hour() -> u32 {
    12
}

fn default_lunch_end_hour() -> u32 {
    13
}

fn default_workday_end_hour() -> u32 {
    17
}

fn default_sources() -> Vec<String> {
    vec![DEFAULT_HOLIDAYS_URL.to_string()]
}

fn default_country() -> String {
    DEFAULT_COUNTRY.to_string()
}

fn default_fallback() -> HolidayCalendar {
    HolidayCalendar::parse(DEFAULT_FALLBACK).unwrap_or_default()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            workday_start_hour: default_workday_start_hour(),
            lunch_start_hour: default_lunch_start_hour(),
            lunch_end_hour: default_lunch_end_hour(),
            workday_end_hour: default_workday_end_hour(),
        }
    }
}

impl Default for Holidays {
    fn default() -> Self {
        Self {
            source: default_sources(),
            country: default_country(),
            fallback: default_fallback(),
        }
    }
}

impl Default for Server {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Conf {
    /// Builds validated business rules.
    ///
    /// # Errors
    /// - `UnknownTimezone` for an unrecognized timezone
    /// - `InvalidRules` when the hours are out of order
    pub fn rules(&self) -> Result<BusinessRules> {
        let r = &self.rules;
        BusinessRules::new(
            &r.timezone,
            r.workday_start_hour,
            r.lunch_start_hour,
            r.lunch_end_hour,
            r.workday_end_hour,
        )
    }

    /// Returns the configured holiday sources
    pub fn holiday_sources(&self) -> &[String] {
        &self.holidays.source
    }

    /// Returns the country key for JSON feeds
    pub fn holiday_country(&self) -> &str {
        &self.holidays.country
    }

    /// Returns the fallback holiday set.
    ///
    /// # Returns
    /// - `Some(&HolidayCalendar)`: Dates used in place of unavailable sources
    /// - `None`: Fallback disabled, unavailable data is fatal
    pub fn holiday_fallback(&self) -> Option<&HolidayCalendar> {
        Some(&self.holidays.fallback).filter(|f| !f.is_empty())
    }

    pub fn host(&self) -> &str {
        &self.server.host
    }

    pub fn port(&self) -> u16 {
        self.server.port
    }
}

/// Deserializes holiday specifications into a HolidayCalendar.
///
/// # Supported Formats
/// * List: ["2025-01-01", "2025-04-17..2025-04-18"]
/// * String: "2025-01-01,2025-04-17..2025-04-18"
fn deserialize_holidays<'de, D>(deserializer: D) -> std::result::Result<HolidayCalendar, D::Error>
where
    D: serde::Deserializer<'de>,
{
    deserializer.deserialize_any(HolidaysVisitor)
}

/// Error message format for holiday deserialization errors.
const ERR_FMT: &str = "holiday dates like '2025-05-01' or ranges like '2025-04-17..2025-04-18'";

/// Visitor for deserializing holiday specifications.
struct HolidaysVisitor;

impl<'a> Visitor<'a> for HolidaysVisitor {
    type Value = HolidayCalendar;

    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(formatter, "{}", &ERR_FMT)
    }

    fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
    where
        E: serde::de::Error,
    {
        HolidayCalendar::parse(v.split(',').filter(|spec| !spec.trim().is_empty()))
            .map_err(|spec| Error::invalid_value(serde::de::Unexpected::Str(&spec), &ERR_FMT))
    }

    fn visit_seq<A>(self, mut seq: A) -> std::result::Result<Self::Value, A::Error>
    where
        A: SeqAccess<'a>,
    {
        let mut specs: Vec<String> = Vec::new();
        while let Some(spec) = seq.next_element::<String>()? {
            specs.push(spec);
        }
        HolidayCalendar::parse(specs.iter().map(String::as_str))
            .map_err(|spec| Error::invalid_value(serde::de::Unexpected::Str(&spec), &ERR_FMT))
    }
}
