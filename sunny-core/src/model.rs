use serde::{Deserialize, Serialize};

/// Coordinates, carried as the raw strings the service returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub lng: String,
    pub lat: String,
}

/// A geographic place returned by the place-search endpoint.
///
/// Identity is name + location. `address` is the formatted
/// administrative-district string the service builds for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub location: Location,
    #[serde(rename = "formatted_address")]
    pub address: String,
}

impl std::fmt::Display for Place {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.address)
    }
}

/// Place-search response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceResponse {
    pub status: String,
    #[serde(default)]
    pub places: Vec<Place>,
}

/// Realtime-weather response envelope. `result` is absent when the service
/// reports a failure status.
#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeResponse {
    pub status: String,
    pub result: Option<RealtimeResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeResult {
    pub realtime: Realtime,
}

/// Current conditions at a coordinate pair.
#[derive(Debug, Clone, Deserialize)]
pub struct Realtime {
    pub skycon: String,
    pub temperature: f32,
    pub air_quality: AirQuality,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AirQuality {
    pub aqi: Aqi,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Aqi {
    pub chn: f32,
}

/// Daily-forecast response envelope. `result` is absent when the service
/// reports a failure status.
#[derive(Debug, Clone, Deserialize)]
pub struct DailyResponse {
    pub status: String,
    pub result: Option<DailyResult>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DailyResult {
    pub daily: Daily,
}

/// Ordered per-day forecast records, passed through as the service sent them.
/// The parallel vectors line up by day index.
#[derive(Debug, Clone, Deserialize)]
pub struct Daily {
    pub temperature: Vec<TemperatureRange>,
    pub skycon: Vec<SkyconEntry>,
    #[serde(default)]
    pub precipitation: Vec<PrecipitationEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TemperatureRange {
    pub max: f32,
    pub min: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SkyconEntry {
    /// Upstream date string, not normalized.
    pub date: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrecipitationEntry {
    pub date: String,
    #[serde(default)]
    pub probability: f32,
}

/// Both weather facets joined; only built once both fetches succeeded.
#[derive(Debug, Clone)]
pub struct Weather {
    pub realtime: Realtime,
    pub daily: Daily,
}
