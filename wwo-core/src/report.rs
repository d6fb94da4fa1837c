//! Typed outcomes of a fetch.
//!
//! Every value here is built once by the response parser (or synthesized by
//! the result assembler) and never mutated afterwards. Optional fields mean
//! "legitimately absent in the upstream document", never "zero".

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ParseError;

/// What one fetch produced: exactly one report plus the rate-limit counters
/// the upstream attaches to every response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchResult {
    report: Report,
    requests_per_second: i32,
    requests_per_day: i32,
}

impl FetchResult {
    pub(crate) fn new(report: Report, requests_per_second: i32, requests_per_day: i32) -> Self {
        Self { report, requests_per_second, requests_per_day }
    }

    /// True unless the fetch produced an [`ErrorReport`].
    pub fn is_success(&self) -> bool {
        !matches!(self.report, Report::Error(_))
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    pub fn weather(&self) -> Option<&WeatherReport> {
        match &self.report {
            Report::Weather(report) => Some(report),
            _ => None,
        }
    }

    pub fn location(&self) -> Option<&LocationReport> {
        match &self.report {
            Report::Location(report) => Some(report),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorReport> {
        match &self.report {
            Report::Error(report) => Some(report),
            _ => None,
        }
    }

    /// Requests left in the current second, or -1 when the upstream did not
    /// report a usable counter.
    pub fn requests_per_second(&self) -> i32 {
        self.requests_per_second
    }

    /// Requests left in the current day, or -1 when the upstream did not
    /// report a usable counter.
    pub fn requests_per_day(&self) -> i32 {
        self.requests_per_day
    }
}

/// The three shapes a response body can decode to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Report {
    Weather(WeatherReport),
    Location(LocationReport),
    Error(ErrorReport),
}

/// Upstream-reported or locally synthesized failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorReport {
    /// Short machine-oriented label, e.g. `Download Failure`.
    pub kind: String,
    /// Human-readable detail.
    pub message: String,
}

impl ErrorReport {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self { kind: kind.into(), message: message.into() }
    }
}

impl From<ParseError> for ErrorReport {
    fn from(err: ParseError) -> Self {
        ErrorReport::new("Parse Failure", err.to_string())
    }
}

/// Weather for one location: current conditions plus per-day forecasts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    /// The query echoed back by the API, e.g. `London, United Kingdom`.
    pub query: Option<String>,
    /// How the API interpreted the query (`City`, `Postcode`, ...).
    pub query_type: Option<String>,
    /// Local date and time at the location (`showlocaltime=yes`).
    pub local_time: Option<NaiveDateTime>,
    /// Offset from UTC in hours at the location.
    pub utc_offset: Option<f32>,
    /// Current conditions, absent when requested with `cc=no`.
    pub current: Option<Current>,
    /// Per-day forecasts, empty when requested with `fx=no`.
    pub days: Vec<DailyForecast>,
    /// Best matching area for the query (`includelocation=yes`).
    pub nearest_area: Option<Location>,
}

/// Conditions at observation time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Current {
    /// Observation time of day, UTC.
    pub observation_time: Option<NaiveTime>,
    pub temp_c: i32,
    pub temp_f: i32,
    pub weather_code: u32,
    pub weather_desc: String,
    pub weather_icon_url: String,
    pub windspeed_mph: u32,
    pub windspeed_kmph: u32,
    pub winddir_degree: u32,
    pub winddir_16pt: String,
    pub precip_mm: f32,
    pub humidity_pct: u32,
    pub visibility_km: u32,
    pub pressure_mb: u32,
    pub cloud_cover_pct: u32,
    pub feels_like_c: i32,
    pub feels_like_f: i32,
}

/// Forecast for a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyForecast {
    pub date: NaiveDate,
    pub astronomy: Option<Astronomy>,
    pub max_temp_c: i32,
    pub max_temp_f: i32,
    pub min_temp_c: i32,
    pub min_temp_f: i32,
    pub uv_index: u32,
    /// Within-day periods, one per `tp` hours.
    pub hourly: Vec<HourlyForecast>,
}

/// Forecast for one period within a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyForecast {
    /// Start of the period, local time.
    pub time: NaiveTime,
    /// Start of the period, UTC (`extra=utcDateTime`).
    pub utc_time: Option<NaiveDateTime>,
    pub temp_c: i32,
    pub temp_f: i32,
    pub feels_like_c: i32,
    pub feels_like_f: i32,
    pub windspeed_mph: u32,
    pub windspeed_kmph: u32,
    pub winddir_degree: u32,
    pub winddir_16pt: String,
    pub weather_code: u32,
    pub weather_desc: String,
    pub weather_icon_url: String,
    pub precip_mm: f32,
    pub humidity_pct: u32,
    pub visibility_km: u32,
    pub pressure_mb: u32,
    pub cloud_cover_pct: u32,
}

/// Sunrise, sunset, moonrise and moonset for a location/date pair.
///
/// Moonrise and moonset are `None` on days when the moon does not rise or
/// set (high latitudes); the upstream marks those with a literal
/// `No moonrise` / `No moonset`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Astronomy {
    pub sunrise: Option<NaiveTime>,
    pub sunset: Option<NaiveTime>,
    pub moonrise: Option<NaiveTime>,
    pub moonset: Option<NaiveTime>,
}

/// Result of a location search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocationReport {
    /// Matches in the order the API returned them.
    pub locations: Vec<Location>,
}

/// A place the API knows about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub country: String,
    pub region: String,
    pub latitude: f64,
    pub longitude: f64,
    pub population: u64,
    pub weather_url: String,
    /// Offset from UTC in hours (`timezone=yes`), absent otherwise.
    pub timezone_offset: Option<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_is_absence_of_error() {
        let ok = FetchResult::new(Report::Weather(WeatherReport::default()), 4, 199);
        assert!(ok.is_success());
        assert!(ok.weather().is_some());
        assert!(ok.error().is_none());

        let failed =
            FetchResult::new(Report::Error(ErrorReport::new("Download Failure", "oops")), -1, -1);
        assert!(!failed.is_success());
        assert!(failed.weather().is_none());
        assert_eq!(failed.error().unwrap().message, "oops");
    }

    #[test]
    fn parse_error_becomes_error_report() {
        let report = ErrorReport::from(ParseError::MissingRoot);
        assert_eq!(report.kind, "Parse Failure");
        assert!(report.message.contains("root"));
    }
}
