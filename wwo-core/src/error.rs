use thiserror::Error;

/// Failures that escape a fetch call.
///
/// Only caller mistakes (missing credentials or query input, caught before
/// any network traffic) and transport-level faults surface here. Everything
/// the upstream API reports about a request (non-200 statuses, in-band
/// error envelopes, unparseable bodies) is normalized into the
/// [`ErrorReport`](crate::report::ErrorReport) of a normally-returned
/// [`FetchResult`](crate::report::FetchResult).
#[derive(Debug, Error)]
pub enum Error {
    #[error("API key not set")]
    MissingApiKey,
    #[error("Location not set")]
    MissingLocation,
    #[error("Search query not set")]
    MissingQuery,
    #[error("HTTP transport failure: {0}")]
    Http(#[from] reqwest::Error),
}

/// Structural failure while decoding a response body.
///
/// Never crosses the public fetch boundary; the result assembler converts it
/// into an `ErrorReport` instead.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("document ended unexpectedly")]
    UnexpectedEof,
    #[error("no recognizable root element")]
    MissingRoot,
    #[error("unexpected root element <{0}>")]
    UnexpectedRoot(String),
    #[error("missing required element <{0}>")]
    MissingField(&'static str),
    #[error("invalid value {value:?} for element <{element}>")]
    InvalidField { element: String, value: String },
}

impl ParseError {
    pub(crate) fn invalid(element: &str, value: &str) -> Self {
        ParseError::InvalidField { element: element.to_string(), value: value.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_names_the_offending_element() {
        let err = ParseError::invalid("temp_C", "warm");
        assert!(err.to_string().contains("temp_C"));
        assert!(err.to_string().contains("warm"));
    }
}
