//! Weather endpoint facade.

use anyhow::anyhow;
use chrono::NaiveDate;
use reqwest::blocking::Client;

use crate::error::Error;
use crate::fetch;
use crate::parser;
use crate::query;
use crate::report::FetchResult;

const ENDPOINT: &str = "https://api.worldweatheronline.com/free/v2/weather.ashx";

/// Placeholder the credential is swapped for in loggable URLs.
const REDACTED: &str = "HIDDEN";

/// Hours between forecast periods. The API accepts exactly these four values
/// and silently falls back to three-hourly for anything else, so anything
/// else is unrepresentable here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Frequency {
    #[default]
    ThreeHourly,
    SixHourly,
    TwelveHourly,
    Daily,
}

impl Frequency {
    pub fn as_hours(self) -> u8 {
        match self {
            Frequency::ThreeHourly => 3,
            Frequency::SixHourly => 6,
            Frequency::TwelveHourly => 12,
            Frequency::Daily => 24,
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}h", self.as_hours())
    }
}

impl TryFrom<u8> for Frequency {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            3 => Ok(Frequency::ThreeHourly),
            6 => Ok(Frequency::SixHourly),
            12 => Ok(Frequency::TwelveHourly),
            24 => Ok(Frequency::Daily),
            _ => Err(anyhow!(
                "Unsupported forecast frequency '{value}'. Supported: 3, 6, 12 or 24 hours."
            )),
        }
    }
}

/// Options for a weather fetch. The defaults match what the API assumes when
/// the parameters are left off the request.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherOptions {
    /// Language for human-readable text (two-letter code). `None` means
    /// English.
    pub language: Option<String>,
    /// Days of forecast to request.
    pub num_of_days: u8,
    /// Fetch weather for this date instead of today.
    pub date: Option<NaiveDate>,
    /// Include per-day forecasts.
    pub forecast: bool,
    /// Include current conditions.
    pub current: bool,
    /// Hours between forecast periods.
    pub frequency: Frequency,
}

impl Default for WeatherOptions {
    fn default() -> Self {
        Self {
            language: None,
            num_of_days: 3,
            date: None,
            forecast: true,
            current: true,
            frequency: Frequency::default(),
        }
    }
}

/// Fetches weather reports from `weather.ashx`.
///
/// Configuration is fixed at construction; one fetcher can serve any number
/// of calls, and threads; the underlying client handles pooling.
#[derive(Debug, Clone)]
pub struct WeatherFetcher {
    api_key: String,
    http: Client,
    options: WeatherOptions,
}

impl WeatherFetcher {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_options(api_key, WeatherOptions::default())
    }

    pub fn with_options(api_key: impl Into<String>, options: WeatherOptions) -> Self {
        Self { api_key: api_key.into(), http: Client::new(), options }
    }

    /// Fetch a weather report for `location`.
    ///
    /// `location` may be a city name, UK/Canadian postcode, US zip code,
    /// IPv4 address or a `lat,lon` pair; the API works out which from
    /// context.
    ///
    /// Returns a [`FetchResult`] for everything the API itself has to say,
    /// including its error responses. Only transport failures and missing
    /// inputs surface as [`Error`].
    pub fn fetch(&self, location: &str) -> Result<FetchResult, Error> {
        if self.api_key.trim().is_empty() {
            return Err(Error::MissingApiKey);
        }
        if location.trim().is_empty() {
            return Err(Error::MissingLocation);
        }

        let (loggable_url, url) = self.request_urls(location);
        fetch::execute(&self.http, &url, &loggable_url, parser::weather::parse)
    }

    // Render the request twice from one parameter list: redacted for
    // logging, real for the wire.
    fn request_urls(&self, location: &str) -> (String, String) {
        let opts = &self.options;

        let mut params: Vec<(&'static str, String)> = vec![
            ("q", location.to_string()),
            ("extra", "utcDateTime".to_string()),
            ("num_of_days", opts.num_of_days.to_string()),
            ("tp", opts.frequency.as_hours().to_string()),
            ("format", "xml".to_string()),
            ("showlocaltime", "yes".to_string()),
            ("includelocation", "yes".to_string()),
        ];
        if let Some(date) = opts.date {
            params.push(("date", date.format("%Y-%m-%d").to_string()));
        }
        if let Some(language) = &opts.language {
            params.push(("lang", language.clone()));
        }
        if !opts.forecast {
            params.push(("fx", "no".to_string()));
        }
        if !opts.current {
            params.push(("cc", "no".to_string()));
        }
        params.push(("key", REDACTED.to_string()));

        let loggable_url = query::assemble_url(ENDPOINT, &query::flatten(&params));
        let params = query::with_credential(params, "key", &self.api_key);
        let url = query::assemble_url(ENDPOINT, &query::flatten(&params));
        (loggable_url, url)
    }
}
