use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use inquire::{Select, Text};
use sunny_core::{Config, Repository, Weather};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "sunny", version, about = "Place search and weather CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the weather-service API token.
    Configure,

    /// Search for a place, pick one and save it as yours.
    Search {
        /// Place name to look up.
        query: String,
    },

    /// Show current weather and the daily forecast.
    Show {
        /// Longitude; defaults to the saved place.
        #[arg(long, requires = "lat")]
        lng: Option<String>,

        /// Latitude; defaults to the saved place.
        #[arg(long, requires = "lng")]
        lat: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Search { query } => search(&query).await,
            Command::Show { lng, lat } => show(lng, lat).await,
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let token = Text::new("API token:")
        .with_help_message("Issued on the weather-service developer console")
        .prompt()
        .context("Token prompt aborted")?;

    config.token = token.trim().to_string();
    config.validate()?;
    config.save()?;

    println!("Token saved to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn search(query: &str) -> Result<()> {
    let repo = open_repository()?;

    let places = match repo.search_place(query).outcome().await {
        Ok(places) => places,
        Err(err) => bail!("Place search failed: {err}"),
    };

    if places.is_empty() {
        println!("No places matched \"{query}\".");
        return Ok(());
    }

    let place = Select::new("Choose a place:", places)
        .prompt()
        .context("Place selection aborted")?;

    repo.save_place(&place)?;
    println!("Saved {place} as your place.");

    match repo.refresh_weather(&place.location.lng, &place.location.lat).outcome().await {
        Ok(weather) => print_weather(&place.name, &weather),
        Err(err) => eprintln!("Could not fetch weather: {err}"),
    }

    Ok(())
}

async fn show(lng: Option<String>, lat: Option<String>) -> Result<()> {
    let repo = open_repository()?;

    let (name, lng, lat) = match (lng, lat) {
        (Some(lng), Some(lat)) => (format!("{lng},{lat}"), lng, lat),
        _ => {
            let place = repo
                .saved_place()?
                .context("No saved place yet. Run `sunny search <query>` first.")?;
            let (lng, lat) = (place.location.lng, place.location.lat);
            (place.name, lng, lat)
        }
    };

    match repo.refresh_weather(&lng, &lat).outcome().await {
        Ok(weather) => print_weather(&name, &weather),
        Err(err) => bail!("Could not fetch weather: {err}"),
    }

    Ok(())
}

fn open_repository() -> Result<Repository> {
    let config = Config::load()?;
    Repository::new(&config)
}

fn print_weather(name: &str, weather: &Weather) {
    let realtime = &weather.realtime;

    println!("Weather for {name} (as of {})", chrono::Local::now().format("%Y-%m-%d %H:%M"));
    println!(
        "  Now: {} {:.1}°C, AQI {:.0}",
        realtime.skycon, realtime.temperature, realtime.air_quality.aqi.chn
    );
    println!();
    println!("  Daily forecast:");

    for (day, temp) in weather.daily.temperature.iter().enumerate() {
        let (date, sky) = weather
            .daily
            .skycon
            .get(day)
            .map_or(("", "-"), |s| (s.date.as_str(), s.value.as_str()));
        let rain = weather
            .daily
            .precipitation
            .get(day)
            .map_or(String::new(), |p| format!(", {:.0}% rain", p.probability));

        println!("    {date} {sky} {:.0}°C..{:.0}°C{rain}", temp.min, temp.max);
    }
}
