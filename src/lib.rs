//! Business date calculator.
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
//!
//! ## Modules
//!
//! - [`wallclock`]: instant <-> local wall-clock fields in a timezone
//! - [`holiday`]: set of non-working dates
//! - [`calendar`]: business day classification, snapping, day and hour advancement
//! - [`source`]: holiday retrieval from JSON feeds and iCalendar files
//! - [`service`]: request validation, clock and timestamp framing
//! - [`server`]: HTTP endpoint
//! - [`conf`], [`cli`]: configuration file and command line

pub mod calendar;
pub mod cli;
pub mod conf;
pub mod error;
pub mod holiday;
pub mod server;
pub mod service;
pub mod source;
pub mod wallclock;

pub use calendar::{BusinessCalendar, BusinessRules};
pub use error::{CalendarError, Result};
pub use holiday::HolidayCalendar;
pub use service::{BusinessDateService, Clock, ComputeRequest, SystemClock};
pub use wallclock::{LocalFields, WallClock};
