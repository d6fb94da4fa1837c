//! Decoder for `weather.ashx` response bodies.

use quick_xml::events::Event;

use crate::error::ParseError;
use crate::parser::{
    XmlReader, element_text, parse_area, parse_date, parse_datetime, parse_error_element,
    parse_field, parse_optional_time, parse_period_time, parse_time_12h, reader_for,
};
use crate::report::{Astronomy, Current, DailyForecast, HourlyForecast, Report, WeatherReport};

/// Decode a weather response body.
///
/// Returns [`Report::Weather`] for the success schema and [`Report::Error`]
/// when the document carries the API's in-band error envelope instead.
pub fn parse(xml: &str) -> Result<Report, ParseError> {
    let mut reader = reader_for(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                return match e.name().as_ref() {
                    b"data" => parse_data(&mut reader),
                    other => {
                        Err(ParseError::UnexpectedRoot(String::from_utf8_lossy(other).into_owned()))
                    }
                };
            }
            Event::Empty(e) if e.name().as_ref() == b"data" => {
                return Ok(Report::Weather(WeatherReport::default()));
            }
            Event::Eof => return Err(ParseError::MissingRoot),
            _ => {}
        }
    }
}

fn parse_data(reader: &mut XmlReader) -> Result<Report, ParseError> {
    let mut report = WeatherReport::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                // In-band failure: take the message and stop looking.
                b"error" => return Ok(Report::Error(parse_error_element(reader)?)),
                b"request" => parse_request(reader, &mut report)?,
                b"current_condition" => report.current = Some(parse_current(reader)?),
                b"weather" => report.days.push(parse_day(reader)?),
                b"time_zone" => parse_time_zone(reader, &mut report)?,
                b"nearest_area" => {
                    report.nearest_area = Some(parse_area(reader, b"nearest_area")?);
                }
                _ => {
                    reader.read_to_end(e.to_end().name())?;
                }
            },
            Event::End(e) if e.name().as_ref() == b"data" => return Ok(Report::Weather(report)),
            Event::Eof => return Err(ParseError::UnexpectedEof),
            _ => {}
        }
    }
}

fn parse_request(reader: &mut XmlReader, report: &mut WeatherReport) -> Result<(), ParseError> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"type" => report.query_type = Some(element_text(reader, b"type")?),
                b"query" => report.query = Some(element_text(reader, b"query")?),
                _ => {
                    reader.read_to_end(e.to_end().name())?;
                }
            },
            Event::End(e) if e.name().as_ref() == b"request" => return Ok(()),
            Event::Eof => return Err(ParseError::UnexpectedEof),
            _ => {}
        }
    }
}

fn parse_time_zone(reader: &mut XmlReader, report: &mut WeatherReport) -> Result<(), ParseError> {
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"localtime" => {
                    let raw = element_text(reader, b"localtime")?;
                    report.local_time = Some(parse_datetime("localtime", &raw)?);
                }
                b"utcOffset" => {
                    let raw = element_text(reader, b"utcOffset")?;
                    report.utc_offset = Some(parse_field("utcOffset", &raw)?);
                }
                _ => {
                    reader.read_to_end(e.to_end().name())?;
                }
            },
            Event::End(e) if e.name().as_ref() == b"time_zone" => return Ok(()),
            Event::Eof => return Err(ParseError::UnexpectedEof),
            _ => {}
        }
    }
}

fn parse_current(reader: &mut XmlReader) -> Result<Current, ParseError> {
    let mut current = Current::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.name().as_ref().to_vec();
                match name.as_slice() {
                    b"observation_time" => {
                        let raw = element_text(reader, b"observation_time")?;
                        current.observation_time = Some(parse_time_12h("observation_time", &raw)?);
                    }
                    b"weatherDesc" => current.weather_desc = element_text(reader, b"weatherDesc")?,
                    b"weatherIconUrl" => {
                        current.weather_icon_url = element_text(reader, b"weatherIconUrl")?;
                    }
                    b"winddir16Point" => {
                        current.winddir_16pt = element_text(reader, b"winddir16Point")?;
                    }
                    b"temp_C" => current.temp_c = numeric(reader, &name)?,
                    b"temp_F" => current.temp_f = numeric(reader, &name)?,
                    b"weatherCode" => current.weather_code = numeric(reader, &name)?,
                    b"windspeedMiles" => current.windspeed_mph = numeric(reader, &name)?,
                    b"windspeedKmph" => current.windspeed_kmph = numeric(reader, &name)?,
                    b"winddirDegree" => current.winddir_degree = numeric(reader, &name)?,
                    b"precipMM" => current.precip_mm = numeric(reader, &name)?,
                    b"humidity" => current.humidity_pct = numeric(reader, &name)?,
                    b"visibility" => current.visibility_km = numeric(reader, &name)?,
                    b"pressure" => current.pressure_mb = numeric(reader, &name)?,
                    b"cloudcover" => current.cloud_cover_pct = numeric(reader, &name)?,
                    b"FeelsLikeC" => current.feels_like_c = numeric(reader, &name)?,
                    b"FeelsLikeF" => current.feels_like_f = numeric(reader, &name)?,
                    _ => {
                        reader.read_to_end(e.to_end().name())?;
                    }
                }
            }
            Event::End(e) if e.name().as_ref() == b"current_condition" => return Ok(current),
            Event::Eof => return Err(ParseError::UnexpectedEof),
            _ => {}
        }
    }
}

fn parse_day(reader: &mut XmlReader) -> Result<DailyForecast, ParseError> {
    let mut date = None;
    let mut astronomy = None;
    let mut max_temp_c = 0;
    let mut max_temp_f = 0;
    let mut min_temp_c = 0;
    let mut min_temp_f = 0;
    let mut uv_index = 0;
    let mut hourly = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.name().as_ref().to_vec();
                match name.as_slice() {
                    b"date" => date = Some(parse_date("date", &element_text(reader, b"date")?)?),
                    b"astronomy" => astronomy = Some(parse_astronomy(reader)?),
                    b"maxtempC" => max_temp_c = numeric(reader, &name)?,
                    b"maxtempF" => max_temp_f = numeric(reader, &name)?,
                    b"mintempC" => min_temp_c = numeric(reader, &name)?,
                    b"mintempF" => min_temp_f = numeric(reader, &name)?,
                    b"uvIndex" => uv_index = numeric(reader, &name)?,
                    b"hourly" => hourly.push(parse_hourly(reader)?),
                    _ => {
                        reader.read_to_end(e.to_end().name())?;
                    }
                }
            }
            Event::End(e) if e.name().as_ref() == b"weather" => {
                return Ok(DailyForecast {
                    date: date.ok_or(ParseError::MissingField("date"))?,
                    astronomy,
                    max_temp_c,
                    max_temp_f,
                    min_temp_c,
                    min_temp_f,
                    uv_index,
                    hourly,
                });
            }
            Event::Eof => return Err(ParseError::UnexpectedEof),
            _ => {}
        }
    }
}

fn parse_astronomy(reader: &mut XmlReader) -> Result<Astronomy, ParseError> {
    let mut astronomy = Astronomy::default();
    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.name().as_ref() {
                b"sunrise" => {
                    astronomy.sunrise =
                        parse_optional_time("sunrise", &element_text(reader, b"sunrise")?)?;
                }
                b"sunset" => {
                    astronomy.sunset =
                        parse_optional_time("sunset", &element_text(reader, b"sunset")?)?;
                }
                b"moonrise" => {
                    astronomy.moonrise =
                        parse_optional_time("moonrise", &element_text(reader, b"moonrise")?)?;
                }
                b"moonset" => {
                    astronomy.moonset =
                        parse_optional_time("moonset", &element_text(reader, b"moonset")?)?;
                }
                _ => {
                    reader.read_to_end(e.to_end().name())?;
                }
            },
            Event::End(e) if e.name().as_ref() == b"astronomy" => return Ok(astronomy),
            Event::Eof => return Err(ParseError::UnexpectedEof),
            _ => {}
        }
    }
}

fn parse_hourly(reader: &mut XmlReader) -> Result<HourlyForecast, ParseError> {
    let mut time = None;
    let mut utc_date = None;
    let mut utc_clock = None;
    let mut forecast = HourlyForecast {
        time: chrono::NaiveTime::MIN,
        utc_time: None,
        temp_c: 0,
        temp_f: 0,
        feels_like_c: 0,
        feels_like_f: 0,
        windspeed_mph: 0,
        windspeed_kmph: 0,
        winddir_degree: 0,
        winddir_16pt: String::new(),
        weather_code: 0,
        weather_desc: String::new(),
        weather_icon_url: String::new(),
        precip_mm: 0.0,
        humidity_pct: 0,
        visibility_km: 0,
        pressure_mb: 0,
        cloud_cover_pct: 0,
    };

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.name().as_ref().to_vec();
                match name.as_slice() {
                    b"time" => {
                        time = Some(parse_period_time("time", &element_text(reader, b"time")?)?);
                    }
                    b"UTCdate" => {
                        utc_date = Some(parse_date("UTCdate", &element_text(reader, b"UTCdate")?)?);
                    }
                    b"UTCtime" => {
                        utc_clock =
                            Some(parse_period_time("UTCtime", &element_text(reader, b"UTCtime")?)?);
                    }
                    b"weatherDesc" => forecast.weather_desc = element_text(reader, b"weatherDesc")?,
                    b"weatherIconUrl" => {
                        forecast.weather_icon_url = element_text(reader, b"weatherIconUrl")?;
                    }
                    b"winddir16Point" => {
                        forecast.winddir_16pt = element_text(reader, b"winddir16Point")?;
                    }
                    b"tempC" => forecast.temp_c = numeric(reader, &name)?,
                    b"tempF" => forecast.temp_f = numeric(reader, &name)?,
                    b"FeelsLikeC" => forecast.feels_like_c = numeric(reader, &name)?,
                    b"FeelsLikeF" => forecast.feels_like_f = numeric(reader, &name)?,
                    b"windspeedMiles" => forecast.windspeed_mph = numeric(reader, &name)?,
                    b"windspeedKmph" => forecast.windspeed_kmph = numeric(reader, &name)?,
                    b"winddirDegree" => forecast.winddir_degree = numeric(reader, &name)?,
                    b"weatherCode" => forecast.weather_code = numeric(reader, &name)?,
                    b"precipMM" => forecast.precip_mm = numeric(reader, &name)?,
                    b"humidity" => forecast.humidity_pct = numeric(reader, &name)?,
                    b"visibility" => forecast.visibility_km = numeric(reader, &name)?,
                    b"pressure" => forecast.pressure_mb = numeric(reader, &name)?,
                    b"cloudcover" => forecast.cloud_cover_pct = numeric(reader, &name)?,
                    _ => {
                        reader.read_to_end(e.to_end().name())?;
                    }
                }
            }
            Event::End(e) if e.name().as_ref() == b"hourly" => {
                forecast.time = time.ok_or(ParseError::MissingField("time"))?;
                forecast.utc_time = match (utc_date, utc_clock) {
                    (Some(date), Some(clock)) => Some(date.and_time(clock)),
                    _ => None,
                };
                return Ok(forecast);
            }
            Event::Eof => return Err(ParseError::UnexpectedEof),
            _ => {}
        }
    }
}

// Read the element's text and parse it, with the element name in any error.
fn numeric<T: std::str::FromStr>(reader: &mut XmlReader, name: &[u8]) -> Result<T, ParseError> {
    let label = String::from_utf8_lossy(name).into_owned();
    let raw = element_text(reader, name)?;
    parse_field(&label, &raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};

    const FULL: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<data>
  <request>
    <type>City</type>
    <query>Newcastle Upon Tyne, United Kingdom</query>
  </request>
  <nearest_area>
    <areaName><![CDATA[Newcastle Upon Tyne]]></areaName>
    <country><![CDATA[United Kingdom]]></country>
    <region><![CDATA[Tyne and Wear]]></region>
    <latitude>54.988</latitude>
    <longitude>-1.619</longitude>
    <population>192382</population>
    <weatherUrl><![CDATA[http://www.worldweatheronline.com/v2/weather.aspx?q=NE1]]></weatherUrl>
  </nearest_area>
  <current_condition>
    <observation_time>10:30 AM</observation_time>
    <temp_C>9</temp_C>
    <temp_F>48</temp_F>
    <weatherCode>113</weatherCode>
    <weatherIconUrl><![CDATA[http://cdn.worldweatheronline.net/images/sunny.png]]></weatherIconUrl>
    <weatherDesc><![CDATA[Sunny]]></weatherDesc>
    <windspeedMiles>13</windspeedMiles>
    <windspeedKmph>20</windspeedKmph>
    <winddirDegree>230</winddirDegree>
    <winddir16Point>SW</winddir16Point>
    <precipMM>0.1</precipMM>
    <humidity>71</humidity>
    <visibility>10</visibility>
    <pressure>1009</pressure>
    <cloudcover>25</cloudcover>
    <FeelsLikeC>7</FeelsLikeC>
    <FeelsLikeF>45</FeelsLikeF>
  </current_condition>
  <weather>
    <date>2015-06-20</date>
    <astronomy>
      <sunrise>04:27 AM</sunrise>
      <sunset>09:47 PM</sunset>
      <moonrise>08:31 AM</moonrise>
      <moonset>No moonset</moonset>
    </astronomy>
    <maxtempC>15</maxtempC>
    <maxtempF>59</maxtempF>
    <mintempC>8</mintempC>
    <mintempF>46</mintempF>
    <uvIndex>5</uvIndex>
    <hourly>
      <time>0</time>
      <UTCdate>2015-06-19</UTCdate>
      <UTCtime>2300</UTCtime>
      <tempC>9</tempC>
      <tempF>48</tempF>
      <windspeedMiles>8</windspeedMiles>
      <windspeedKmph>13</windspeedKmph>
      <winddirDegree>247</winddirDegree>
      <winddir16Point>WSW</winddir16Point>
      <weatherCode>119</weatherCode>
      <weatherIconUrl><![CDATA[http://cdn.worldweatheronline.net/images/cloudy.png]]></weatherIconUrl>
      <weatherDesc><![CDATA[Cloudy]]></weatherDesc>
      <precipMM>0.0</precipMM>
      <humidity>83</humidity>
      <visibility>10</visibility>
      <pressure>1014</pressure>
      <cloudcover>61</cloudcover>
      <FeelsLikeC>7</FeelsLikeC>
      <FeelsLikeF>45</FeelsLikeF>
    </hourly>
    <hourly>
      <time>300</time>
      <tempC>8</tempC>
      <tempF>46</tempF>
      <weatherDesc><![CDATA[Clear]]></weatherDesc>
    </hourly>
  </weather>
  <time_zone>
    <localtime>2015-06-20 13:06</localtime>
    <utcOffset>1.0</utcOffset>
  </time_zone>
</data>"#;

    #[test]
    fn full_document_populates_every_present_field() {
        let report = match parse(FULL).unwrap() {
            Report::Weather(report) => report,
            other => panic!("expected weather report, got {other:?}"),
        };

        assert_eq!(report.query.as_deref(), Some("Newcastle Upon Tyne, United Kingdom"));
        assert_eq!(report.query_type.as_deref(), Some("City"));
        assert_eq!(report.utc_offset, Some(1.0));
        assert_eq!(
            report.local_time,
            Some(NaiveDate::from_ymd_opt(2015, 6, 20).unwrap().and_hms_opt(13, 6, 0).unwrap())
        );

        let area = report.nearest_area.as_ref().unwrap();
        assert_eq!(area.name, "Newcastle Upon Tyne");
        assert_eq!(area.population, 192382);
        assert!(area.timezone_offset.is_none());

        let current = report.current.as_ref().unwrap();
        assert_eq!(current.observation_time, NaiveTime::from_hms_opt(10, 30, 0));
        assert_eq!(current.temp_c, 9);
        assert_eq!(current.weather_desc, "Sunny");
        assert_eq!(current.weather_code, 113);
        assert_eq!(current.precip_mm, 0.1);
        assert_eq!(current.winddir_16pt, "SW");
        assert_eq!(current.feels_like_f, 45);

        assert_eq!(report.days.len(), 1);
        let day = &report.days[0];
        assert_eq!(day.date, NaiveDate::from_ymd_opt(2015, 6, 20).unwrap());
        assert_eq!(day.max_temp_c, 15);
        assert_eq!(day.uv_index, 5);

        let astronomy = day.astronomy.as_ref().unwrap();
        assert_eq!(astronomy.sunrise, NaiveTime::from_hms_opt(4, 27, 0));
        assert_eq!(astronomy.moonrise, NaiveTime::from_hms_opt(8, 31, 0));
        // "No moonset" is absence, not a sentinel time.
        assert_eq!(astronomy.moonset, None);

        assert_eq!(day.hourly.len(), 2);
        let first = &day.hourly[0];
        assert_eq!(first.time, NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        assert_eq!(
            first.utc_time,
            Some(NaiveDate::from_ymd_opt(2015, 6, 19).unwrap().and_hms_opt(23, 0, 0).unwrap())
        );
        assert_eq!(first.weather_desc, "Cloudy");
        assert_eq!(first.humidity_pct, 83);

        let second = &day.hourly[1];
        assert_eq!(second.time, NaiveTime::from_hms_opt(3, 0, 0).unwrap());
        assert_eq!(second.utc_time, None);
    }

    #[test]
    fn error_envelope_short_circuits_to_an_error_report() {
        let xml = r#"<data><error><msg>Unable to find any matching weather location to the query submitted!</msg></error></data>"#;
        match parse(xml).unwrap() {
            Report::Error(err) => {
                assert_eq!(
                    err.message,
                    "Unable to find any matching weather location to the query submitted!"
                );
                assert_eq!(err.kind, "API Error");
            }
            other => panic!("expected error report, got {other:?}"),
        }
    }

    #[test]
    fn envelope_with_empty_message_is_still_an_error() {
        let xml = "<data><error><msg></msg></error></data>";
        match parse(xml).unwrap() {
            Report::Error(err) => assert_eq!(err.message, ""),
            other => panic!("expected error report, got {other:?}"),
        }
    }

    #[test]
    fn empty_input_is_a_structural_error() {
        assert!(matches!(parse(""), Err(ParseError::MissingRoot)));
        assert!(matches!(parse("   \n  "), Err(ParseError::MissingRoot)));
    }

    #[test]
    fn truncated_document_is_a_structural_error() {
        let xml = "<data><current_condition><temp_C>9</temp_C>";
        assert!(parse(xml).is_err());
    }

    #[test]
    fn wrong_root_is_rejected() {
        assert!(matches!(
            parse("<wrong><data/></wrong>"),
            Err(ParseError::UnexpectedRoot(name)) if name == "wrong"
        ));
    }

    #[test]
    fn unparseable_numeric_field_fails_closed() {
        let xml = "<data><current_condition><temp_C>warm</temp_C></current_condition></data>";
        match parse(xml) {
            Err(ParseError::InvalidField { element, value }) => {
                assert_eq!(element, "temp_C");
                assert_eq!(value, "warm");
            }
            other => panic!("expected InvalidField, got {other:?}"),
        }
    }

    #[test]
    fn unknown_elements_are_skipped() {
        let xml = r#"<data>
            <shiny_new_block><nested>stuff</nested></shiny_new_block>
            <current_condition><temp_C>9</temp_C><temp_F>48</temp_F></current_condition>
        </data>"#;
        let report = match parse(xml).unwrap() {
            Report::Weather(report) => report,
            other => panic!("expected weather report, got {other:?}"),
        };
        assert_eq!(report.current.as_ref().unwrap().temp_c, 9);
    }

    #[test]
    fn day_without_date_is_rejected() {
        let xml = "<data><weather><maxtempC>15</maxtempC></weather></data>";
        assert!(matches!(parse(xml), Err(ParseError::MissingField("date"))));
    }
}
