use thiserror::Error;

/// Remote endpoint an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    PlaceSearch,
    RealtimeWeather,
    DailyForecast,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::PlaceSearch => "place search",
            Endpoint::RealtimeWeather => "realtime weather",
            Endpoint::DailyForecast => "daily forecast",
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors produced by the data-access layer.
///
/// The first five variants are transport-class: the service never produced a
/// usable body. `Status` and `WeatherStatus` mean the transport succeeded but
/// the service itself reported a failure. `Background` is the catch-all for a
/// query task that died before delivering its result.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to send {endpoint} request")]
    Transport {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to read {endpoint} response body")]
    Body {
        endpoint: Endpoint,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} request failed with status {status}: {body}")]
    Http {
        endpoint: Endpoint,
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("{endpoint} response body is empty")]
    EmptyBody { endpoint: Endpoint },

    #[error("failed to parse {endpoint} JSON")]
    Malformed {
        endpoint: Endpoint,
        #[source]
        source: serde_json::Error,
    },

    /// A response reported success but carried no payload.
    #[error("{endpoint} response is missing its payload")]
    MissingPayload { endpoint: Endpoint },

    /// The place-search response reported a non-ok domain status.
    #[error("response status is {0}")]
    Status(String),

    /// At least one weather response reported a non-ok domain status; both
    /// observed statuses are named for diagnostics.
    #[error("realtime response status is {realtime} daily response status is {daily}")]
    WeatherStatus { realtime: String, daily: String },

    #[error("query task failed: {0}")]
    Background(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
