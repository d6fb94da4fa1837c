use anyhow::{Context, bail};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use wwo_core::{
    Config, DailyForecast, Frequency, LocationFetcher, Report, WeatherFetcher, WeatherReport,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "wwo", version, about = "World Weather Online client")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the worldweatheronline.com API key.
    Configure,

    /// Show weather for a location.
    Show {
        /// City name, postcode, zip code, IP address or "lat,lon".
        location: String,

        /// Days of forecast to request.
        #[arg(long)]
        days: Option<u8>,

        /// Date to fetch weather for (yyyy-mm-dd); defaults to today.
        #[arg(long)]
        date: Option<String>,

        /// Language for descriptions (two-letter code).
        #[arg(long)]
        lang: Option<String>,

        /// Hours between forecast periods: 3, 6, 12 or 24.
        #[arg(long)]
        frequency: Option<u8>,

        /// Skip the per-day forecast.
        #[arg(long)]
        no_forecast: bool,

        /// Skip current conditions.
        #[arg(long)]
        no_current: bool,
    },

    /// Search for locations the API knows about.
    Search {
        /// Free-text query: city name, postcode or "lat,lon".
        query: String,

        /// Maximum number of matches to return.
        #[arg(long, default_value_t = 3)]
        num: u32,
    },
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { location, days, date, lang, frequency, no_forecast, no_current } => {
                show(&location, days, date, lang, frequency, no_forecast, no_current)
            }
            Command::Search { query, num } => search(&query, num),
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Text::new("worldweatheronline.com API key:")
        .with_help_message("Register at https://developer.worldweatheronline.com/")
        .prompt()?;
    config.set_api_key(api_key.trim().to_string());
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn show(
    location: &str,
    days: Option<u8>,
    date: Option<String>,
    lang: Option<String>,
    frequency: Option<u8>,
    no_forecast: bool,
    no_current: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;
    let api_key = config.require_api_key()?;

    let mut options = config.weather_options();
    if let Some(days) = days {
        options.num_of_days = days;
    }
    if let Some(lang) = lang {
        options.language = Some(lang);
    }
    if let Some(hours) = frequency {
        options.frequency = Frequency::try_from(hours)?;
    }
    if let Some(date) = date {
        let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .with_context(|| format!("Date must be yyyy-mm-dd, got '{date}'"))?;
        options.date = Some(date);
    }
    options.forecast = !no_forecast;
    options.current = !no_current;

    let fetcher = WeatherFetcher::with_options(api_key, options);
    let result = fetcher.fetch(location)?;

    log::debug!(
        "requests left: {}/s {}/day",
        result.requests_per_second(),
        result.requests_per_day()
    );

    match result.report() {
        Report::Weather(report) => print_weather(report),
        Report::Error(error) => bail!("{}: {}", error.kind, error.message),
        Report::Location(_) => bail!("Unexpected report type from the weather endpoint"),
    }

    Ok(())
}

fn search(query: &str, num: u32) -> anyhow::Result<()> {
    let config = Config::load()?;
    let api_key = config.require_api_key()?;

    let fetcher = LocationFetcher::with_results(api_key, num);
    let result = fetcher.fetch(query)?;

    match result.report() {
        Report::Location(report) => {
            if report.locations.is_empty() {
                println!("No matches for '{query}'.");
            }
            for location in &report.locations {
                println!(
                    "{}, {} ({}) at {:.3},{:.3}",
                    location.name, location.region, location.country, location.latitude,
                    location.longitude
                );
            }
        }
        Report::Error(error) => bail!("{}: {}", error.kind, error.message),
        Report::Weather(_) => bail!("Unexpected report type from the search endpoint"),
    }

    Ok(())
}

fn print_weather(report: &WeatherReport) {
    if let Some(query) = &report.query {
        println!("Weather for {query}");
    }
    if let Some(local_time) = report.local_time {
        println!("Local time: {}", local_time.format("%Y-%m-%d %H:%M"));
    }

    if let Some(current) = &report.current {
        println!(
            "Now: {}°C (feels like {}°C), {}, wind {} km/h {}, humidity {}%",
            current.temp_c,
            current.feels_like_c,
            current.weather_desc,
            current.windspeed_kmph,
            current.winddir_16pt,
            current.humidity_pct,
        );
    }

    for day in &report.days {
        print_day(day);
    }
}

fn print_day(day: &DailyForecast) {
    println!("{}: {}°C to {}°C, UV {}", day.date, day.min_temp_c, day.max_temp_c, day.uv_index);

    if let Some(astronomy) = &day.astronomy {
        let fmt = |time: Option<chrono::NaiveTime>| match time {
            Some(time) => time.format("%H:%M").to_string(),
            None => "--".to_string(),
        };
        println!(
            "  sun {} to {}, moon {} to {}",
            fmt(astronomy.sunrise),
            fmt(astronomy.sunset),
            fmt(astronomy.moonrise),
            fmt(astronomy.moonset),
        );
    }

    for hour in &day.hourly {
        println!(
            "  {} {}°C {} precip {:.1}mm",
            hour.time.format("%H:%M"),
            hour.temp_c,
            hour.weather_desc,
            hour.precip_mm,
        );
    }
}
