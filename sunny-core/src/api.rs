use crate::error::Result;
use crate::model::{DailyResponse, PlaceResponse, RealtimeResponse};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod caiyun;

/// Seam over the remote weather service.
///
/// Each call is a single attempt that resolves to the endpoint's typed
/// response or a transport-class error. Retry policy, if any, belongs to the
/// caller; none is applied here.
#[async_trait]
pub trait WeatherApi: Send + Sync + Debug {
    async fn search_places(&self, query: &str) -> Result<PlaceResponse>;

    async fn realtime(&self, lng: &str, lat: &str) -> Result<RealtimeResponse>;

    async fn daily(&self, lng: &str, lat: &str) -> Result<DailyResponse>;
}
