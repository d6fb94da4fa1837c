//! Location-search endpoint facade.

use reqwest::blocking::Client;

use crate::error::Error;
use crate::fetch;
use crate::parser;
use crate::query;
use crate::report::FetchResult;

const ENDPOINT: &str = "https://api.worldweatheronline.com/free/v2/search.ashx";

const REDACTED: &str = "HIDDEN";

/// Looks up locations via `search.ashx`.
#[derive(Debug, Clone)]
pub struct LocationFetcher {
    api_key: String,
    http: Client,
    num_results: u32,
}

impl LocationFetcher {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_results(api_key, 3)
    }

    /// Ask the API for up to `num_results` matches per search.
    pub fn with_results(api_key: impl Into<String>, num_results: u32) -> Self {
        Self { api_key: api_key.into(), http: Client::new(), num_results }
    }

    /// Search for locations matching `query` (free text: a city name,
    /// postcode, or `lat,lon` pair).
    pub fn fetch(&self, query: &str) -> Result<FetchResult, Error> {
        if self.api_key.trim().is_empty() {
            return Err(Error::MissingApiKey);
        }
        if query.trim().is_empty() {
            return Err(Error::MissingQuery);
        }

        let (loggable_url, url) = self.request_urls(query);
        fetch::execute(&self.http, &url, &loggable_url, parser::location::parse)
    }

    fn request_urls(&self, search: &str) -> (String, String) {
        let params: Vec<(&'static str, String)> = vec![
            ("q", search.to_string()),
            ("timezone", "yes".to_string()),
            ("format", "xml".to_string()),
            ("num_of_results", self.num_results.to_string()),
            ("key", REDACTED.to_string()),
        ];

        let loggable_url = query::assemble_url(ENDPOINT, &query::flatten(&params));
        let params = query::with_credential(params, "key", &self.api_key);
        let url = query::assemble_url(ENDPOINT, &query::flatten(&params));
        (loggable_url, url)
    }
}
