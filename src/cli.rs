//! Command-line interface parser for the business date calculator.
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

use std::{fs::File, io::Read};

use clap::{builder::TypedValueParser, Parser, Subcommand};

use crate::{conf::Conf, service::parse_instant};

/// Help message for start timestamp format
const HELP_MSG: &str = "Start timestamp, ISO 8601 in UTC with a trailing 'Z' (e.g. 2025-04-10T15:00:00Z)\nLeave empty to start from now";

/// Command-line interface structure
#[derive(Parser)]
#[command(
    version(env!("CARGO_PKG_VERSION")),
    author(env!("CARGO_PKG_AUTHORS")),
    about(env!("CARGO_PKG_DESCRIPTION")),
    long_about = "Business date calculator that advances a start instant by working \
                 days and hours, skipping nights, lunch breaks, weekends and holidays."
)]
pub struct Cli {
    /// Configuration file path
    ///
    /// TOML configuration file containing the work schedule,
    /// holiday sources and listener settings. Defaults apply when omitted.
    #[arg(
        long,
        short,
        global = true,
        value_parser = ConfParser,
        help = "Path to TOML configuration file"
    )]
    conf: Option<Conf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compute a business date and print it
    Compute {
        /// Business days to add
        #[arg(long)]
        days: Option<u32>,
        /// Business hours to add
        #[arg(long)]
        hours: Option<u32>,
        #[arg(long, value_parser = InstantParser, help = HELP_MSG)]
        date: Option<String>,
    },
    /// Serve the computation over HTTP
    Serve {
        /// Address to bind, overriding the configuration
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on, overriding the configuration and $PORT
        #[arg(long, short)]
        port: Option<u16>,
    },
}

impl Cli {
    /// Returns the parsed configuration, if a file was given
    pub fn conf(&self) -> Option<&Conf> {
        self.conf.as_ref()
    }

    pub fn command(&self) -> &Command {
        &self.command
    }
}

/// Custom parser for start timestamps
///
/// Validates eagerly so that a bad timestamp is reported as a usage error,
/// while the value stays a string for the computation request.
#[derive(Clone)]
struct InstantParser;

impl TypedValueParser for InstantParser {
    type Value = String;

    fn parse_ref(
        &self,
        _cmd: &clap::Command,
        _arg: Option<&clap::Arg>,
        value: &std::ffi::OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let Some(value_str) = value.to_str() else {
            return Err(clap::Error::new(clap::error::ErrorKind::DisplayHelp));
        };

        parse_instant(value_str)
            .map(|_| value_str.to_string())
            .map_err(|e| clap::Error::raw(
                clap::error::ErrorKind::InvalidValue,
                format!("{}\n{}\n", e, HELP_MSG)
            ))
    }
}

/// Custom parser for configuration file loading
#[derive(Clone)]
struct ConfParser;

impl TypedValueParser for ConfParser {
    type Value = Conf;

    /// Parses configuration file path and loads the configuration
    ///
    /// # Errors
    /// * File not found or permission denied
    /// * Invalid TOML format
    fn parse_ref(
        &self,
        _cmd: &clap::Command,
        _arg: Option<&clap::Arg>,
        value: &std::ffi::OsStr,
    ) -> Result<Self::Value, clap::Error> {
        let Some(file_path) = value.to_str() else {
            return Err(clap::Error::new(clap::error::ErrorKind::DisplayHelp));
        };

        // Open configuration file
        let mut file = File::open(file_path).map_err(|e| {
            let error_msg = match e.kind() {
                std::io::ErrorKind::NotFound => format!("Configuration file '{}' not found", file_path),
                std::io::ErrorKind::PermissionDenied => format!("Permission denied for '{}'", file_path),
                _ => format!("Cannot access configuration file '{}': {}", file_path, e),
            };
            clap::Error::raw(clap::error::ErrorKind::InvalidValue, error_msg)
        })?;

        // Read file contents
        let mut config_content = String::new();
        file.read_to_string(&mut config_content).map_err(|e| {
            clap::Error::raw(
                clap::error::ErrorKind::InvalidValue,
                format!("Failed to read configuration file '{}': {}", file_path, e)
            )
        })?;

        // Parse TOML configuration
        toml::from_str(&config_content).map_err(|e| {
            clap::Error::raw(
                clap::error::ErrorKind::InvalidValue,
                format!("Invalid configuration in '{}': {}", file_path, e)
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn compute_arguments() {
        let cli = Cli::try_parse_from([
            "bizdate", "compute", "--days", "5", "--hours", "2", "--date", "2025-04-10T15:00:00Z",
        ])
        .unwrap();
        assert!(cli.conf().is_none());
        match cli.command() {
            Command::Compute { days, hours, date } => {
                assert_eq!(*days, Some(5));
                assert_eq!(*hours, Some(2));
                assert_eq!(date.as_deref(), Some("2025-04-10T15:00:00Z"));
            },
            Command::Serve { .. } => panic!("expected compute"),
        }
    }

    #[test]
    fn rejects_start_without_utc_designator() {
        assert!(Cli::try_parse_from(["bizdate", "compute", "--days", "1", "--date", "2025-04-10T10:00:00"]).is_err());
    }

    #[test]
    fn serve_with_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[server]\nport = 8081\n").unwrap();
        let path = file.path().to_string_lossy().into_owned();

        let cli = Cli::try_parse_from(["bizdate", "serve", "-c", &path]).unwrap();
        assert_eq!(cli.conf().map(Conf::port), Some(8081));
        assert!(matches!(cli.command(), Command::Serve { host: None, port: None }));
    }

    #[test]
    fn missing_config_file_is_a_usage_error() {
        assert!(Cli::try_parse_from(["bizdate", "-c", "/nonexistent/bizdate.toml", "serve"]).is_err());
    }
}
