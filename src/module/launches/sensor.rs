///! Latest-launch sensor view
///!
///! Derives a display state and attribute map from a coordinator cache
///! snapshot. Pure: no I/O, no clock. A malformed launch date degrades the
///! state value to "unknown" instead of failing the whole render.

use chrono::DateTime;
use serde_json::Value;
use std::collections::BTreeMap;

use super::types::CacheEntry;

/// Attribution reported with every state
pub const ATTRIBUTION: &str = "Data provided by RNLI Web API";

/// State used when no launch (or no parseable date) is available
pub const STATE_UNKNOWN: &str = "unknown";

const NO_LAUNCHES_NOTE: &str = "No recent launches found for this station.";

/// Read-only view over one station's cached launches.
pub struct LaunchSensor {
    station: String,
}

impl LaunchSensor {
    pub fn new(station: impl Into<String>) -> Self {
        Self {
            station: station.into(),
        }
    }

    /// Display name, e.g. "RNLI Tower Latest Launch"
    pub fn name(&self) -> String {
        format!("RNLI {} Latest Launch", self.station)
    }

    /// Stable identifier derived from the station short name
    pub fn unique_id(&self) -> String {
        format!(
            "rnli_launches_{}_latest_launch",
            self.station.to_lowercase().replace(' ', "_")
        )
    }

    /// Render a cache snapshot into `(state, attributes)`.
    ///
    /// The state is the most recent launch date re-expressed as a normalized
    /// RFC 3339 instant. The attribute map always carries the attribution and
    /// the monitored station; with data present it adds the latest record's
    /// identifying fields plus a verbatim pass-through of any extra feed
    /// fields, and with no data a human-readable note instead.
    pub fn render(&self, entry: &CacheEntry) -> (String, BTreeMap<String, Value>) {
        let mut attributes = BTreeMap::new();
        attributes.insert(
            "attribution".to_string(),
            Value::String(ATTRIBUTION.to_string()),
        );
        attributes.insert(
            "station_monitored".to_string(),
            Value::String(self.station.clone()),
        );

        let Some(latest) = entry.latest() else {
            attributes.insert(
                "last_launch_info".to_string(),
                Value::String(NO_LAUNCHES_NOTE.to_string()),
            );
            return (STATE_UNKNOWN.to_string(), attributes);
        };

        attributes.insert("launch_id".to_string(), Value::String(latest.id.clone()));
        attributes.insert(
            "lifeboat_id".to_string(),
            latest
                .lifeboat_id
                .clone()
                .map(Value::String)
                .unwrap_or(Value::Null),
        );
        attributes.insert(
            "station_title".to_string(),
            Value::String(latest.title.clone()),
        );
        attributes.insert(
            "station_website".to_string(),
            latest
                .website
                .clone()
                .map(Value::String)
                .unwrap_or(Value::Null),
        );

        // Pass through anything the feed added beyond the fixed fields
        for (key, value) in &latest.extra {
            attributes
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }

        (normalize_launch_date(&latest.launch_date), attributes)
    }
}

/// Re-express a raw ISO-8601 launch date as a normalized RFC 3339 instant.
fn normalize_launch_date(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(instant) => instant.to_rfc3339(),
        Err(_) => {
            tracing::warn!("Could not parse launchDate: {:?}", raw);
            STATE_UNKNOWN.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::launches::types::LaunchRecord;
    use chrono::Utc;
    use serde_json::json;

    fn entry_with(records: Vec<LaunchRecord>) -> CacheEntry {
        CacheEntry {
            launches: records,
            last_success: Some(Utc::now()),
            last_error: None,
        }
    }

    #[test]
    fn test_render_empty_cache_degrades() {
        let sensor = LaunchSensor::new("Tower");
        let (state, attributes) = sensor.render(&CacheEntry::default());

        assert_eq!(state, "unknown");
        assert_eq!(attributes["attribution"], json!(ATTRIBUTION));
        assert_eq!(attributes["station_monitored"], json!("Tower"));
        assert_eq!(
            attributes["last_launch_info"],
            json!("No recent launches found for this station.")
        );
        assert!(!attributes.contains_key("launch_id"));
        assert!(!attributes.contains_key("lifeboat_id"));
    }

    #[test]
    fn test_render_latest_launch() {
        let record: LaunchRecord = serde_json::from_value(json!({
            "id": "8901",
            "shortName": "Tower",
            "title": "Tower Lifeboat Station",
            "lifeboat_IdNo": "E-07",
            "launchDate": "2024-02-01T09:00:00+00:00",
            "website": "https://example.org/tower",
            "reason": "Kayaker in difficulty",
            "crewCount": 4
        }))
        .unwrap();
        let sensor = LaunchSensor::new("Tower");

        let (state, attributes) = sensor.render(&entry_with(vec![record]));

        assert_eq!(state, "2024-02-01T09:00:00+00:00");
        assert_eq!(attributes["launch_id"], json!("8901"));
        assert_eq!(attributes["lifeboat_id"], json!("E-07"));
        assert_eq!(attributes["station_title"], json!("Tower Lifeboat Station"));
        assert_eq!(attributes["station_website"], json!("https://example.org/tower"));
        // Extra feed fields pass through verbatim
        assert_eq!(attributes["reason"], json!("Kayaker in difficulty"));
        assert_eq!(attributes["crewCount"], json!(4));
        assert!(!attributes.contains_key("last_launch_info"));
    }

    #[test]
    fn test_render_unparseable_date_degrades_state_only() {
        let record: LaunchRecord = serde_json::from_value(json!({
            "id": "77",
            "shortName": "Tower",
            "title": "Tower Lifeboat Station",
            "launchDate": "yesterday-ish"
        }))
        .unwrap();
        let sensor = LaunchSensor::new("Tower");

        let (state, attributes) = sensor.render(&entry_with(vec![record]));

        assert_eq!(state, "unknown");
        // Attributes still rendered in full
        assert_eq!(attributes["launch_id"], json!("77"));
    }

    #[test]
    fn test_render_missing_optional_fields_are_null() {
        let record: LaunchRecord = serde_json::from_value(json!({
            "id": "5",
            "shortName": "Tower",
            "title": "Tower Lifeboat Station",
            "launchDate": "2024-01-01T10:00:00+00:00"
        }))
        .unwrap();
        let sensor = LaunchSensor::new("Tower");

        let (_state, attributes) = sensor.render(&entry_with(vec![record]));
        assert_eq!(attributes["lifeboat_id"], Value::Null);
        assert_eq!(attributes["station_website"], Value::Null);
    }

    #[test]
    fn test_sensor_identity() {
        let sensor = LaunchSensor::new("St Agnes");
        assert_eq!(sensor.name(), "RNLI St Agnes Latest Launch");
        assert_eq!(sensor.unique_id(), "rnli_launches_st_agnes_latest_launch");
    }
}
