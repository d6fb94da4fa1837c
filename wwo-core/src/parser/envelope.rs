//! Decoder for the API's bare error envelope.
//!
//! Used to pull a human-readable message out of non-200 response bodies,
//! where the endpoint sometimes still returns its `<error><msg>` structure.

use quick_xml::events::Event;

use crate::error::ParseError;
use crate::parser::{parse_error_element, reader_for};
use crate::report::ErrorReport;

/// Scan the document for an `<error>` element and decode it.
///
/// Fails when the document is not XML or contains no envelope; the caller
/// treats that as "no enrichment available", never as a fetch failure.
pub fn parse(xml: &str) -> Result<ErrorReport, ParseError> {
    let mut reader = reader_for(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == b"error" => {
                return parse_error_element(&mut reader);
            }
            Event::Start(_) => {}
            Event::Eof => return Err(ParseError::MissingField("error")),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_message_is_extracted() {
        let report = parse("<data><error><msg>API key has reached calls per day allowed limit.</msg></error></data>").unwrap();
        assert_eq!(report.kind, "API Error");
        assert_eq!(report.message, "API key has reached calls per day allowed limit.");
    }

    #[test]
    fn plain_html_body_is_not_an_envelope() {
        assert!(parse("<html><body>404 Not Found</body></html>").is_err());
    }

    #[test]
    fn empty_body_is_not_an_envelope() {
        assert!(parse("").is_err());
    }
}
