//! Core library for the `sunny` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Abstraction over the remote weather service
//! - Shared domain models (places, realtime conditions, daily forecasts)
//! - The repository joining concurrent weather fetches into one result
//!
//! It is used by `sunny-cli`, but can also be reused by other binaries or services.

pub mod api;
pub mod config;
pub mod error;
pub mod model;
pub mod repository;
pub mod store;

pub use api::{WeatherApi, caiyun::CaiyunClient};
pub use config::Config;
pub use error::{Endpoint, Error, Result};
pub use model::{Daily, Place, Realtime, Weather};
pub use repository::{QueryHandle, Repository};
pub use store::PlaceStore;
