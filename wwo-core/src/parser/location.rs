//! Decoder for `search.ashx` response bodies.

use quick_xml::events::Event;

use crate::error::ParseError;
use crate::parser::{XmlReader, parse_area, parse_error_element, reader_for};
use crate::report::{LocationReport, Report};

/// Decode a location-search response body.
///
/// Success documents are rooted at `<search_api>`; the API reports in-band
/// errors under a `<data>` root instead, so the root element alone decides
/// which shape this is.
pub fn parse(xml: &str) -> Result<Report, ParseError> {
    let mut reader = reader_for(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                return match e.name().as_ref() {
                    b"search_api" => parse_results(&mut reader),
                    b"data" => parse_error_root(&mut reader),
                    other => {
                        Err(ParseError::UnexpectedRoot(String::from_utf8_lossy(other).into_owned()))
                    }
                };
            }
            Event::Empty(e) if e.name().as_ref() == b"search_api" => {
                return Ok(Report::Location(LocationReport::default()));
            }
            Event::Eof => return Err(ParseError::MissingRoot),
            _ => {}
        }
    }
}

fn parse_results(reader: &mut XmlReader) -> Result<Report, ParseError> {
    let mut report = LocationReport::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"result" => report.locations.push(parse_area(reader, b"result")?),
                b"error" => return Ok(Report::Error(parse_error_element(reader)?)),
                _ => {
                    reader.read_to_end(e.to_end().name())?;
                }
            },
            Event::End(e) if e.name().as_ref() == b"search_api" => {
                return Ok(Report::Location(report));
            }
            Event::Eof => return Err(ParseError::UnexpectedEof),
            _ => {}
        }
    }
}

// A <data> root on this endpoint only ever carries the error envelope.
fn parse_error_root(reader: &mut XmlReader) -> Result<Report, ParseError> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"error" => return Ok(Report::Error(parse_error_element(reader)?)),
                _ => {
                    reader.read_to_end(e.to_end().name())?;
                }
            },
            Event::End(e) if e.name().as_ref() == b"data" => {
                return Err(ParseError::UnexpectedRoot("data".to_string()));
            }
            Event::Eof => return Err(ParseError::UnexpectedEof),
            _ => {}
        }
    }
}
