//! Streaming decoders for the three response shapes the API produces.
//!
//! Each parser is a single forward scan over XML events; nothing is
//! materialized into a tree and nothing backtracks. The decision between
//! "success report" and "in-band error" is made from the document itself:
//! an `<error>` element short-circuits the scan and the rest of the stream
//! is ignored.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::ParseError;
use crate::report::{ErrorReport, Location};

pub mod envelope;
pub mod location;
pub mod weather;

pub(crate) type XmlReader<'a> = Reader<&'a [u8]>;

pub(crate) fn reader_for(xml: &str) -> XmlReader<'_> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    reader
}

/// Collect the text and CDATA content of the element just opened, consuming
/// events up to and including its end tag. Unexpected nested elements are
/// skipped.
pub(crate) fn element_text(reader: &mut XmlReader, name: &[u8]) -> Result<String, ParseError> {
    let mut text = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(t) => text.push_str(&t.unescape()?),
            Event::CData(c) => text.push_str(&String::from_utf8_lossy(&c.into_inner())),
            Event::Start(e) => {
                reader.read_to_end(e.to_end().name())?;
            }
            Event::End(e) if e.name().as_ref() == name => return Ok(text.trim().to_string()),
            Event::Eof => return Err(ParseError::UnexpectedEof),
            _ => {}
        }
    }
}

/// Parse the text of an element into any `FromStr` target, failing closed
/// with the element name in the error.
pub(crate) fn parse_field<T: FromStr>(element: &str, value: &str) -> Result<T, ParseError> {
    value.trim().parse().map_err(|_| ParseError::invalid(element, value))
}

/// Clock time in the API's 12-hour form, e.g. `08:05 AM`.
pub(crate) fn parse_time_12h(element: &str, value: &str) -> Result<NaiveTime, ParseError> {
    NaiveTime::parse_from_str(value.trim(), "%I:%M %p")
        .map_err(|_| ParseError::invalid(element, value))
}

/// Astronomy times, where a literal `No moonrise` / `No moonset` marks a
/// day without that event.
pub(crate) fn parse_optional_time(
    element: &str,
    value: &str,
) -> Result<Option<NaiveTime>, ParseError> {
    if value.trim().to_ascii_lowercase().starts_with("no ") {
        return Ok(None);
    }
    parse_time_12h(element, value).map(Some)
}

/// The API's compact within-day period form: `0`, `300`, `2100`.
pub(crate) fn parse_period_time(element: &str, value: &str) -> Result<NaiveTime, ParseError> {
    let raw: u32 = value.trim().parse().map_err(|_| ParseError::invalid(element, value))?;
    NaiveTime::from_hms_opt(raw / 100, raw % 100, 0)
        .ok_or_else(|| ParseError::invalid(element, value))
}

/// ISO date, `2015-06-20`.
pub(crate) fn parse_date(element: &str, value: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ParseError::invalid(element, value))
}

/// Local timestamp, `2015-06-20 13:06`.
pub(crate) fn parse_datetime(element: &str, value: &str) -> Result<NaiveDateTime, ParseError> {
    NaiveDateTime::parse_from_str(value.trim(), "%Y-%m-%d %H:%M")
        .map_err(|_| ParseError::invalid(element, value))
}

/// Decode an `<error>` element the reader has just entered. Returns once the
/// matching end tag is consumed; anything after it is the caller's problem
/// (and is, in practice, ignored).
pub(crate) fn parse_error_element(reader: &mut XmlReader) -> Result<ErrorReport, ParseError> {
    let mut message = String::new();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"msg" => message = element_text(reader, b"msg")?,
                _ => {
                    reader.read_to_end(e.to_end().name())?;
                }
            },
            Event::End(e) if e.name().as_ref() == b"error" => {
                return Ok(ErrorReport::new("API Error", message));
            }
            Event::Eof => return Err(ParseError::UnexpectedEof),
            _ => {}
        }
    }
}

/// Decode an area record, shared between the weather report's
/// `<nearest_area>` and the search response's `<result>` elements.
pub(crate) fn parse_area(reader: &mut XmlReader, end: &[u8]) -> Result<Location, ParseError> {
    let mut area = Location::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"areaName" => area.name = element_text(reader, b"areaName")?,
                b"country" => area.country = element_text(reader, b"country")?,
                b"region" => area.region = element_text(reader, b"region")?,
                b"latitude" => {
                    area.latitude = parse_field("latitude", &element_text(reader, b"latitude")?)?;
                }
                b"longitude" => {
                    area.longitude =
                        parse_field("longitude", &element_text(reader, b"longitude")?)?;
                }
                b"population" => {
                    area.population =
                        parse_field("population", &element_text(reader, b"population")?)?;
                }
                b"weatherUrl" => area.weather_url = element_text(reader, b"weatherUrl")?,
                b"timezone" => area.timezone_offset = parse_area_timezone(reader)?,
                _ => {
                    reader.read_to_end(e.to_end().name())?;
                }
            },
            Event::End(e) if e.name().as_ref() == end => return Ok(area),
            Event::Eof => return Err(ParseError::UnexpectedEof),
            _ => {}
        }
    }
}

// <timezone><offset>1.0</offset></timezone>, present with timezone=yes
fn parse_area_timezone(reader: &mut XmlReader) -> Result<Option<f32>, ParseError> {
    let mut offset = None;
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"offset" => {
                    offset = Some(parse_field("offset", &element_text(reader, b"offset")?)?);
                }
                _ => {
                    reader.read_to_end(e.to_end().name())?;
                }
            },
            Event::End(e) if e.name().as_ref() == b"timezone" => return Ok(offset),
            Event::Eof => return Err(ParseError::UnexpectedEof),
            _ => {}
        }
    }
}
