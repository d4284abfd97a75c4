use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::error::{Endpoint, Error, Result};
use crate::model::{DailyResponse, PlaceResponse, RealtimeResponse};

use super::WeatherApi;

/// Client for the Caiyun open API.
#[derive(Debug, Clone)]
pub struct CaiyunClient {
    http: Client,
    base_url: String,
    token: String,
    lang: String,
}

impl CaiyunClient {
    /// Build a client from configuration; fails when no token is set.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        config.validate()?;

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
            lang: config.lang.clone(),
        })
    }

    fn place_url(&self) -> String {
        format!("{}/v2/place", self.base_url)
    }

    fn weather_url(&self, lng: &str, lat: &str, resource: &str) -> String {
        format!("{}/v2.6/{}/{lng},{lat}/{resource}", self.base_url, self.token)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        url: String,
        query: &[(&str, &str)],
    ) -> Result<T> {
        debug!(%endpoint, "sending request");

        let res = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|source| Error::Transport { endpoint, source })?;

        let status = res.status();
        let body = res.text().await.map_err(|source| Error::Body { endpoint, source })?;

        if !status.is_success() {
            return Err(Error::Http { endpoint, status, body: truncate_body(&body) });
        }

        if body.trim().is_empty() {
            return Err(Error::EmptyBody { endpoint });
        }

        serde_json::from_str(&body).map_err(|source| Error::Malformed { endpoint, source })
    }
}

#[async_trait]
impl WeatherApi for CaiyunClient {
    async fn search_places(&self, query: &str) -> Result<PlaceResponse> {
        self.fetch(
            Endpoint::PlaceSearch,
            self.place_url(),
            &[("query", query), ("token", self.token.as_str()), ("lang", self.lang.as_str())],
        )
        .await
    }

    async fn realtime(&self, lng: &str, lat: &str) -> Result<RealtimeResponse> {
        self.fetch(Endpoint::RealtimeWeather, self.weather_url(lng, lat, "realtime.json"), &[])
            .await
    }

    async fn daily(&self, lng: &str, lat: &str) -> Result<DailyResponse> {
        self.fetch(Endpoint::DailyForecast, self.weather_url(lng, lat, "daily.json"), &[]).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX { format!("{}...", &body[..MAX]) } else { body.to_string() }
}
