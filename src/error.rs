//! Error types for business date computation.
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

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    /// Supplied timestamp is not an RFC 3339 instant with a `Z` designator
    #[error("Invalid instant '{0}': must be ISO 8601 UTC ending with 'Z'")]
    InvalidInstant(String),

    /// Timezone identifier not present in the timezone database
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    /// Holiday set could not be loaded and no fallback applies
    #[error("Holiday data unavailable: {0}")]
    HolidayDataUnavailable(String),

    /// Rule hours break `start < lunch start < lunch end < end`
    #[error("Invalid business rules: {0}")]
    InvalidRules(String),

    /// Request-level validation failure
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// Computation task failed to complete
    #[error("Computation aborted: {0}")]
    Aborted(String),

    /// Date arithmetic left the representable calendar range
    #[error("Date out of supported range")]
    OutOfRange,
}

pub type Result<T> = std::result::Result<T, CalendarError>;
