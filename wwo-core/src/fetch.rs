//! One request/response cycle, reduced to a [`FetchResult`].
//!
//! The assembly step is pure: given a status, headers and body it always
//! produces a result. Only the surrounding transport call can fail, and only
//! with [`Error::Http`].

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::HeaderMap;

use crate::error::{Error, ParseError};
use crate::parser::envelope;
use crate::report::{ErrorReport, FetchResult, Report};

/// Requests left in the current second, reported on every response.
pub(crate) const QPS_LEFT_HEADER: &str = "x-apiaxleproxy-qps-left";
/// Requests left in the current day, reported on every response.
pub(crate) const QPD_LEFT_HEADER: &str = "x-apiaxleproxy-qpd-left";

// Rate-limit reporting is best effort: anything missing or unreadable
// becomes -1 rather than failing the fetch.
fn int_header(headers: &HeaderMap, name: &str) -> i32 {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(-1)
}

/// Merge status, rate-limit headers and decoded body into one result.
pub(crate) fn assemble<F>(
    status: StatusCode,
    headers: &HeaderMap,
    body: &str,
    parse: F,
) -> FetchResult
where
    F: FnOnce(&str) -> Result<Report, ParseError>,
{
    let requests_per_second = int_header(headers, QPS_LEFT_HEADER);
    let requests_per_day = int_header(headers, QPD_LEFT_HEADER);

    let report = if status == StatusCode::OK {
        match parse(body) {
            Ok(report) => report,
            Err(err) => Report::Error(ErrorReport::from(err)),
        }
    } else {
        Report::Error(download_failure(status, body))
    };

    FetchResult::new(report, requests_per_second, requests_per_day)
}

// The status decides that the fetch failed; the body only gets a say in the
// message, when it happens to carry the API's own error envelope.
fn download_failure(status: StatusCode, body: &str) -> ErrorReport {
    let message = match envelope::parse(body) {
        Ok(report) => report.message,
        Err(_) => status.to_string(),
    };
    ErrorReport::new("Download Failure", message)
}

/// Issue the GET and assemble the response.
///
/// `loggable_url` is the same request with the credential redacted; the real
/// URL never reaches the log.
pub(crate) fn execute<F>(
    client: &Client,
    url: &str,
    loggable_url: &str,
    parse: F,
) -> Result<FetchResult, Error>
where
    F: FnOnce(&str) -> Result<Report, ParseError>,
{
    log::debug!("fetching {loggable_url}");
    let response = client.get(url).send()?;
    let status = response.status();
    log::debug!("response {status}");

    let headers = response.headers().clone();
    let body = response.text()?;
    log::trace!("received body\n------\n{body}\n------");
    Ok(assemble(status, &headers, &body, parse))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser;
    use reqwest::header::HeaderValue;

    const WEATHER_BODY: &str =
        "<data><current_condition><temp_C>9</temp_C></current_condition></data>";

    fn rate_limit_headers(qps: &'static str, qpd: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(QPS_LEFT_HEADER, HeaderValue::from_static(qps));
        headers.insert(QPD_LEFT_HEADER, HeaderValue::from_static(qpd));
        headers
    }

    #[test]
    fn ok_response_with_counters_succeeds() {
        let headers = rate_limit_headers("4", "199");
        let result =
            assemble(StatusCode::OK, &headers, WEATHER_BODY, parser::weather::parse);

        assert!(result.is_success());
        assert_eq!(result.requests_per_second(), 4);
        assert_eq!(result.requests_per_day(), 199);
        assert_eq!(result.weather().unwrap().current.as_ref().unwrap().temp_c, 9);
        assert!(result.error().is_none());
    }

    #[test]
    fn missing_headers_default_to_minus_one_without_failing() {
        let result =
            assemble(StatusCode::OK, &HeaderMap::new(), WEATHER_BODY, parser::weather::parse);

        assert!(result.is_success());
        assert_eq!(result.requests_per_second(), -1);
        assert_eq!(result.requests_per_day(), -1);
    }

    #[test]
    fn unreadable_header_defaults_to_minus_one() {
        let headers = rate_limit_headers("soon", "199");
        let result =
            assemble(StatusCode::OK, &headers, WEATHER_BODY, parser::weather::parse);

        assert_eq!(result.requests_per_second(), -1);
        assert_eq!(result.requests_per_day(), 199);
    }

    #[test]
    fn non_200_skips_the_success_parser() {
        let result = assemble(StatusCode::NOT_FOUND, &HeaderMap::new(), "<html>gone</html>", |_| {
            panic!("success parser must not run for non-200 responses")
        });

        assert!(!result.is_success());
        let error = result.error().unwrap();
        assert_eq!(error.kind, "Download Failure");
        assert_eq!(error.message, "404 Not Found");
    }

    #[test]
    fn non_200_with_envelope_body_uses_the_envelope_message() {
        let body = "<data><error><msg>API key has reached calls per day allowed limit.</msg></error></data>";
        let result = assemble(StatusCode::FORBIDDEN, &HeaderMap::new(), body, |_| {
            panic!("success parser must not run for non-200 responses")
        });

        let error = result.error().unwrap();
        assert_eq!(error.kind, "Download Failure");
        assert_eq!(error.message, "API key has reached calls per day allowed limit.");
    }

    #[test]
    fn parse_failure_is_normalized_into_the_result() {
        let result = assemble(
            StatusCode::OK,
            &rate_limit_headers("3", "100"),
            "not xml at all",
            parser::weather::parse,
        );

        assert!(!result.is_success());
        assert_eq!(result.error().unwrap().kind, "Parse Failure");
        // Counters still come through on a failed parse.
        assert_eq!(result.requests_per_second(), 3);
    }

    #[test]
    fn identical_inputs_assemble_to_equal_results() {
        let headers = rate_limit_headers("4", "199");
        let first = assemble(StatusCode::OK, &headers, WEATHER_BODY, parser::weather::parse);
        let second = assemble(StatusCode::OK, &headers, WEATHER_BODY, parser::weather::parse);
        assert_eq!(first, second);
    }
}
