use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::oneshot;
use tracing::debug;

use crate::api::{WeatherApi, caiyun::CaiyunClient};
use crate::config::Config;
use crate::error::{Endpoint, Error, Result};
use crate::model::{Place, Weather};
use crate::store::PlaceStore;

/// Domain status the service uses to signal success.
const STATUS_OK: &str = "ok";

/// Single entry point over the remote API and the saved-place store.
///
/// Queries run as tasks on the tokio runtime; each returns a [`QueryHandle`]
/// that resolves to exactly one `Result`, whatever happens inside the task.
#[derive(Debug)]
pub struct Repository {
    api: Arc<dyn WeatherApi>,
    store: PlaceStore,
    seq: AtomicU64,
}

impl Repository {
    /// Repository backed by the live service and the platform data dir.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let api = CaiyunClient::new(config)?;
        let store = PlaceStore::open_default()?;

        Ok(Self::with_api(Arc::new(api), store))
    }

    /// Repository over an arbitrary API backend.
    pub fn with_api(api: Arc<dyn WeatherApi>, store: PlaceStore) -> Self {
        Self { api, store, seq: AtomicU64::new(0) }
    }

    /// Look up places matching `query`.
    ///
    /// An empty list is still a successful search; only a non-ok domain
    /// status is a failure.
    pub fn search_place(&self, query: &str) -> QueryHandle<Vec<Place>> {
        let api = Arc::clone(&self.api);
        let query = query.to_owned();

        self.fire(async move {
            let response = api.search_places(&query).await?;

            if response.status == STATUS_OK {
                Ok(response.places)
            } else {
                Err(Error::Status(response.status))
            }
        })
    }

    /// Fetch realtime conditions and the daily forecast for a coordinate
    /// pair and join them.
    ///
    /// The two fetches have no ordering dependency, so both are spawned
    /// before either is awaited. When the first awaited fetch fails, the
    /// other task is not waited on further; it runs to completion and its
    /// result is dropped.
    pub fn refresh_weather(&self, lng: &str, lat: &str) -> QueryHandle<Weather> {
        let api = Arc::clone(&self.api);
        let lng = lng.to_owned();
        let lat = lat.to_owned();

        self.fire(async move {
            let realtime_task = tokio::spawn({
                let api = Arc::clone(&api);
                let (lng, lat) = (lng.clone(), lat.clone());
                async move { api.realtime(&lng, &lat).await }
            });
            let daily_task = tokio::spawn({
                let api = Arc::clone(&api);
                let (lng, lat) = (lng.clone(), lat.clone());
                async move { api.daily(&lng, &lat).await }
            });

            let realtime = realtime_task.await.map_err(join_failure)??;
            let daily = daily_task.await.map_err(join_failure)??;

            if realtime.status == STATUS_OK && daily.status == STATUS_OK {
                let realtime = realtime
                    .result
                    .ok_or(Error::MissingPayload { endpoint: Endpoint::RealtimeWeather })?;
                let daily = daily
                    .result
                    .ok_or(Error::MissingPayload { endpoint: Endpoint::DailyForecast })?;

                Ok(Weather { realtime: realtime.realtime, daily: daily.daily })
            } else {
                Err(Error::WeatherStatus { realtime: realtime.status, daily: daily.status })
            }
        })
    }

    pub fn save_place(&self, place: &Place) -> anyhow::Result<()> {
        self.store.save(place)
    }

    pub fn saved_place(&self) -> anyhow::Result<Option<Place>> {
        self.store.load()
    }

    pub fn is_place_saved(&self) -> bool {
        self.store.exists()
    }

    /// Sequence number of the most recently issued query.
    ///
    /// Superseded queries are neither cancelled nor de-duplicated; a consumer
    /// racing several compares each handle's [`QueryHandle::seq`] against
    /// this and drops the stale results.
    pub fn latest_seq(&self) -> u64 {
        self.seq.load(Ordering::Acquire)
    }

    /// Run `operation` on the runtime and hand back its single-shot result.
    fn fire<T, F>(&self, operation: F) -> QueryHandle<T>
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let seq = self.seq.fetch_add(1, Ordering::AcqRel) + 1;
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            // The receiver may already be gone; losing the send is fine.
            let _ = tx.send(operation.await);
        });

        debug!(seq, "query issued");
        QueryHandle { seq, rx }
    }
}

fn join_failure(err: tokio::task::JoinError) -> Error {
    Error::Background(err.to_string())
}

/// Pending result of one issued query.
#[derive(Debug)]
pub struct QueryHandle<T> {
    seq: u64,
    rx: oneshot::Receiver<Result<T>>,
}

impl<T> QueryHandle<T> {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Wait for the query's single result.
    ///
    /// A task that died without reporting (a panic inside the operation)
    /// surfaces as [`Error::Background`], never as a propagated panic, so
    /// callers need no guard of their own.
    pub async fn outcome(self) -> Result<T> {
        self.rx.await.unwrap_or_else(|_| {
            Err(Error::Background("query task stopped before reporting a result".into()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        AirQuality, Aqi, Daily, DailyResponse, DailyResult, Location, PlaceResponse,
        PrecipitationEntry, Realtime, RealtimeResponse, RealtimeResult, SkyconEntry,
        TemperatureRange,
    };
    use async_trait::async_trait;

    /// Stub backend: `None` for a facet makes that call fail at the
    /// transport level.
    #[derive(Debug, Default)]
    struct StubApi {
        places: Option<PlaceResponse>,
        realtime: Option<RealtimeResponse>,
        daily: Option<DailyResponse>,
    }

    #[async_trait]
    impl WeatherApi for StubApi {
        async fn search_places(&self, _query: &str) -> Result<PlaceResponse> {
            self.places.clone().ok_or(Error::EmptyBody { endpoint: Endpoint::PlaceSearch })
        }

        async fn realtime(&self, _lng: &str, _lat: &str) -> Result<RealtimeResponse> {
            self.realtime.clone().ok_or(Error::EmptyBody { endpoint: Endpoint::RealtimeWeather })
        }

        async fn daily(&self, _lng: &str, _lat: &str) -> Result<DailyResponse> {
            self.daily.clone().ok_or(Error::EmptyBody { endpoint: Endpoint::DailyForecast })
        }
    }

    fn repository(api: StubApi) -> Repository {
        // These tests never touch the store; any writable dir will do.
        Repository::with_api(Arc::new(api), PlaceStore::open_at(std::env::temp_dir()))
    }

    fn beijing() -> Place {
        Place {
            name: "Beijing".into(),
            location: Location { lng: "116.40".into(), lat: "39.90".into() },
            address: "China".into(),
        }
    }

    fn realtime_response(status: &str) -> RealtimeResponse {
        let result = (status == STATUS_OK).then(|| RealtimeResult {
            realtime: Realtime {
                skycon: "CLEAR_DAY".into(),
                temperature: 25.0,
                air_quality: AirQuality { aqi: Aqi { chn: 30.0 } },
            },
        });

        RealtimeResponse { status: status.into(), result }
    }

    fn daily_response(status: &str) -> DailyResponse {
        let result = (status == STATUS_OK).then(|| DailyResult {
            daily: Daily {
                temperature: vec![TemperatureRange { max: 28.0, min: 19.0 }],
                skycon: vec![SkyconEntry {
                    date: "2024-05-01T00:00+08:00".into(),
                    value: "CLEAR_DAY".into(),
                }],
                precipitation: vec![PrecipitationEntry {
                    date: "2024-05-01T00:00+08:00".into(),
                    probability: 0.0,
                }],
            },
        });

        DailyResponse { status: status.into(), result }
    }

    #[tokio::test]
    async fn search_resolves_to_matching_places() {
        let repo = repository(StubApi {
            places: Some(PlaceResponse { status: "ok".into(), places: vec![beijing()] }),
            ..StubApi::default()
        });

        let places = repo.search_place("Beijing").outcome().await.expect("search succeeds");

        assert_eq!(places, vec![beijing()]);
    }

    #[tokio::test]
    async fn search_with_no_matches_is_still_success() {
        let repo = repository(StubApi {
            places: Some(PlaceResponse { status: "ok".into(), places: Vec::new() }),
            ..StubApi::default()
        });

        let places = repo.search_place("Atlantis").outcome().await.expect("search succeeds");

        assert!(places.is_empty());
    }

    #[tokio::test]
    async fn search_surfaces_the_failure_status() {
        let repo = repository(StubApi {
            places: Some(PlaceResponse { status: "invalid_token".into(), places: Vec::new() }),
            ..StubApi::default()
        });

        let err = repo.search_place("Beijing").outcome().await.unwrap_err();

        assert!(matches!(err, Error::Status(_)));
        assert!(err.to_string().contains("invalid_token"));
    }

    #[tokio::test]
    async fn search_surfaces_transport_failures() {
        let repo = repository(StubApi::default());

        let err = repo.search_place("Beijing").outcome().await.unwrap_err();

        assert!(matches!(err, Error::EmptyBody { .. }));
    }

    #[tokio::test]
    async fn refresh_combines_both_payloads() {
        let repo = repository(StubApi {
            realtime: Some(realtime_response("ok")),
            daily: Some(daily_response("ok")),
            ..StubApi::default()
        });

        let weather =
            repo.refresh_weather("116.40", "39.90").outcome().await.expect("refresh succeeds");

        assert_eq!(weather.realtime.skycon, "CLEAR_DAY");
        assert_eq!(weather.realtime.temperature, 25.0);
        assert_eq!(weather.realtime.air_quality.aqi.chn, 30.0);
        assert_eq!(weather.daily.temperature[0].max, 28.0);
        assert_eq!(weather.daily.skycon[0].value, "CLEAR_DAY");
    }

    #[tokio::test]
    async fn refresh_names_both_statuses_when_one_fails() {
        let repo = repository(StubApi {
            realtime: Some(realtime_response("error")),
            daily: Some(daily_response("ok")),
            ..StubApi::default()
        });

        let err = repo.refresh_weather("116.40", "39.90").outcome().await.unwrap_err();

        assert!(matches!(err, Error::WeatherStatus { .. }));
        let msg = err.to_string();
        assert!(msg.contains("error"));
        assert!(msg.contains("ok"));
    }

    #[tokio::test]
    async fn refresh_fails_when_both_statuses_fail() {
        let repo = repository(StubApi {
            realtime: Some(realtime_response("error")),
            daily: Some(daily_response("too_many_requests")),
            ..StubApi::default()
        });

        let err = repo.refresh_weather("116.40", "39.90").outcome().await.unwrap_err();

        let msg = err.to_string();
        assert!(msg.contains("error"));
        assert!(msg.contains("too_many_requests"));
    }

    #[tokio::test]
    async fn one_dead_fetch_fails_the_join() {
        // Realtime errors, daily would succeed; its result must not leak.
        let repo = repository(StubApi {
            realtime: None,
            daily: Some(daily_response("ok")),
            ..StubApi::default()
        });

        let err = repo.refresh_weather("116.40", "39.90").outcome().await.unwrap_err();

        assert!(matches!(err, Error::EmptyBody { endpoint: Endpoint::RealtimeWeather }));
    }

    #[tokio::test]
    async fn ok_status_without_payload_is_a_failure() {
        let mut realtime = realtime_response("ok");
        realtime.result = None;

        let repo = repository(StubApi {
            realtime: Some(realtime),
            daily: Some(daily_response("ok")),
            ..StubApi::default()
        });

        let err = repo.refresh_weather("116.40", "39.90").outcome().await.unwrap_err();

        assert!(matches!(
            err,
            Error::MissingPayload { endpoint: Endpoint::RealtimeWeather }
        ));
    }

    async fn explode() -> Result<Vec<Place>> {
        panic!("synthetic failure")
    }

    #[tokio::test]
    async fn a_panicking_query_still_delivers_a_result() {
        let repo = repository(StubApi::default());

        let err = repo.fire(explode()).outcome().await.unwrap_err();

        assert!(matches!(err, Error::Background(_)));
    }

    #[tokio::test]
    async fn queries_carry_increasing_sequence_numbers() {
        let repo = repository(StubApi {
            places: Some(PlaceResponse { status: "ok".into(), places: Vec::new() }),
            ..StubApi::default()
        });

        let first = repo.search_place("Beijing");
        let second = repo.search_place("Shanghai");

        assert!(second.seq() > first.seq());
        assert_eq!(repo.latest_seq(), second.seq());

        // Both stay in flight and both resolve; nothing is cancelled.
        assert!(first.outcome().await.is_ok());
        assert!(second.outcome().await.is_ok());
    }

    #[tokio::test]
    async fn store_passthroughs_round_trip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let repo =
            Repository::with_api(Arc::new(StubApi::default()), PlaceStore::open_at(dir.path()));

        assert!(!repo.is_place_saved());

        repo.save_place(&beijing()).expect("save works");

        assert!(repo.is_place_saved());

        let loaded = repo.saved_place().expect("load works").expect("place present");
        assert_eq!(loaded.name, beijing().name);
        assert_eq!(loaded.location, beijing().location);
    }
}
