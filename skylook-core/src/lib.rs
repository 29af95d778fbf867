//! Core library for the `skylook` city weather lookup.
//!
//! This crate defines:
//! - Geocoding and current-weather clients for the Open-Meteo services
//! - Position sources for "use my location"
//! - The recent-searches cache and its storage backends
//! - Rendering of weather cards and the recent list
//! - The search and locate flows, driven through an injectable UI surface
//!
//! It is used by `skylook-cli`, but the flows only talk to [`UiPorts`], so
//! other front ends can reuse them.

pub mod config;
pub mod controller;
pub mod error;
pub mod geocode;
pub mod locate;
pub mod model;
pub mod provider;
pub mod recent;
pub mod render;
pub mod ui;
pub mod weather;

pub use config::{Config, LocationConfig};
pub use controller::{LocationController, SearchController};
pub use error::{LookupError, Service};
pub use geocode::GeocodeClient;
pub use locate::{Geolocator, PositionOptions, PositionProvider};
pub use model::{
    Coordinates, CurrentWeather, GeoResult, MY_LOCATION, PlaceLabel, WeatherSnapshot,
};
pub use provider::{Geocoder, LocationSource, Services, WeatherSource, services_from_config};
pub use recent::{FileStore, KeyValueStore, MemoryStore, RecentCache};
pub use render::OutputFormat;
pub use ui::{Control, ControlState, RecentView, RecordingUi, UiEvent, UiPorts};
pub use weather::WeatherClient;
