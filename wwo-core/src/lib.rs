//! Client library for the World Weather Online free v2 API.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Fetchers for the weather and location-search endpoints
//! - Streaming XML decoding into typed reports
//!
//! A fetch either returns a [`FetchResult`] (a weather report, a location
//! report or the API's own error, plus the rate-limit counters the service
//! attaches to every response), or fails with [`Error`] for missing inputs
//! and transport problems. Match on [`Report`] to see which outcome a result
//! holds.
//!
//! The upstream terms require attribution; [`BOILERPLATE`] is the link text
//! they suggest.
//!
//! It is used by `wwo-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
mod fetch;
pub mod location;
pub mod parser;
pub mod query;
pub mod report;
pub mod weather;

pub use config::Config;
pub use error::{Error, ParseError};
pub use location::LocationFetcher;
pub use report::{
    Astronomy, Current, DailyForecast, ErrorReport, FetchResult, HourlyForecast, Location,
    LocationReport, Report, WeatherReport,
};
pub use weather::{Frequency, WeatherFetcher, WeatherOptions};

/// Required link back to the API. Code that uses the API must display a link
/// to the provider; this is how they recommend you format it.
pub const BOILERPLATE: &str = "Powered by <a href=\"http://www.worldweatheronline.com/\" \
     title=\"Free Weather API\" target=\"_blank\">World Weather Online</a>";
