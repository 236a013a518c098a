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

use std::sync::Arc;

use bizdate::{
    cli::{Cli, Command},
    server::{self, AppState},
    service::format_instant,
    source::{HolidaySource, RemoteHolidaySource},
    BusinessCalendar, BusinessDateService, ComputeRequest, SystemClock,
};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Main entry point for the business date calculator
///
/// # Usage Examples
/// ```bash
/// # Five business days from now, default Bogota calendar
/// bizdate compute --days 5
///
/// # One business day and four hours from a given instant
/// bizdate -c config.toml compute --days 1 --hours 4 --date 2025-04-10T15:00:00Z
///
/// # HTTP service
/// bizdate -c config.toml serve --port 3000
/// ```
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr, stdout carries the computed date
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let conf = cli.conf().cloned().unwrap_or_default();

    // Unknown timezone or unordered hours are fatal at startup
    let rules = conf.rules()?;
    info!(
        timezone = %rules.timezone(),
        workday = %format!(
            "{}-{}/{}-{}",
            rules.workday_start_hour(),
            rules.lunch_start_hour(),
            rules.lunch_end_hour(),
            rules.workday_end_hour()
        ),
        "business rules loaded"
    );

    let holidays = RemoteHolidaySource::from_conf(&conf).load_holiday_set().await;

    match cli.command() {
        Command::Compute { days, hours, date } => {
            let calendar = BusinessCalendar::new(rules, holidays?);
            let service = BusinessDateService::new(Arc::new(calendar), Arc::new(SystemClock));
            let request = ComputeRequest {
                days: *days,
                hours: *hours,
                date: date.clone(),
            };
            println!("{}", format_instant(service.execute(&request)?));
        },
        Command::Serve { host, port } => {
            let host = host.as_deref().unwrap_or(conf.host());
            let port = match port {
                Some(port) => *port,
                None => std::env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(conf.port()),
            };

            let state = match holidays {
                Ok(holidays) => {
                    let calendar = BusinessCalendar::new(rules, holidays);
                    AppState::ready(BusinessDateService::new(Arc::new(calendar), Arc::new(SystemClock)))
                },
                Err(e) => {
                    // Computations answer 503 until the process is restarted
                    error!(error = %e, "holiday data unavailable, computations will be refused");
                    AppState::unavailable(e.to_string())
                },
            };
            server::serve(host, port, Arc::new(state)).await?;
        },
    }

    Ok(())
}
