///! RNLI launches monitoring module
///!
///! Polls the public RNLI launches feed, keeps a per-station cache of the
///! most recent launches, and derives a sensor-style state from it.
///!
///! ## Main Components
///! - `LaunchApiClient`: one-shot feed fetch with a typed error taxonomy
///! - `LaunchCoordinator`: per-station cache + periodic refresh + dedup
///! - `LaunchSensor`: pure view from a cache snapshot to (state, attributes)

pub mod client;
pub mod coordinator;
pub mod error;
pub mod select;
pub mod sensor;
pub mod types;

// 重新导出常用类型
pub use client::{LaunchApiClient, DEFAULT_FETCH_TIMEOUT, RNLI_API_URL};
pub use coordinator::{LaunchCoordinator, LaunchSource, DEFAULT_REFRESH_INTERVAL};
pub use error::FetchError;
pub use select::select_station;
pub use sensor::{LaunchSensor, ATTRIBUTION, STATE_UNKNOWN};
pub use types::{CacheEntry, LaunchRecord, Station};
