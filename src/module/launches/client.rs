///! RNLI launches API client
///!
///! Issues one bounded-timeout GET against the public launches feed and
///! deserializes the JSON array into launch records. No retries here:
///! retry cadence belongs to the coordinator's schedule, not the client.

use reqwest::{header, Client};
use std::time::Duration;

use super::error::FetchError;
use super::types::{LaunchRecord, Station};

/// Public RNLI launches feed
pub const RNLI_API_URL: &str = "https://services.rnli.org/api/launches";

/// Hard per-request timeout
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the launches feed – owns the reqwest client and endpoint.
pub struct LaunchApiClient {
    client:   Client,
    endpoint: String,
}

impl LaunchApiClient {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build reqwest client"),
            endpoint: RNLI_API_URL.to_string(),
        }
    }

    /// Point the client at a different endpoint (config override, tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Fetch the full launches feed.
    ///
    /// Exactly one outbound GET per call. Fails with [`FetchError::Timeout`]
    /// when the hard timeout elapses, [`FetchError::HttpStatus`] on a non-2xx
    /// response, [`FetchError::Parse`] when the body is not a JSON array of
    /// objects, and [`FetchError::Transport`] for everything else on the wire.
    pub async fn fetch_launches(&self) -> Result<Vec<LaunchRecord>, FetchError> {
        tracing::debug!("Fetching RNLI launches from {}", self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus(status.as_u16()));
        }

        let body = response.text().await?;
        let launches: Vec<LaunchRecord> =
            serde_json::from_str(&body).map_err(|e| FetchError::Parse(e.to_string()))?;

        tracing::debug!("Fetched {} launch records", launches.len());
        Ok(launches)
    }

    /// Unique stations seen in the feed, in first-seen order.
    ///
    /// Backs the station selection step of the configuration flow. Records
    /// missing either name field are skipped.
    pub async fn fetch_stations(&self) -> Result<Vec<Station>, FetchError> {
        let launches = self.fetch_launches().await?;

        let mut stations: Vec<Station> = Vec::new();
        for launch in launches {
            if launch.short_name.is_empty() || launch.title.is_empty() {
                continue;
            }
            if stations.iter().any(|s| s.short_name == launch.short_name) {
                continue;
            }
            stations.push(Station {
                short_name: launch.short_name,
                title: launch.title,
            });
        }

        Ok(stations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mock_client(template: ResponseTemplate) -> (MockServer, LaunchApiClient) {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/launches"))
            .and(header("Accept", "application/json"))
            .respond_with(template)
            .mount(&server)
            .await;
        let client = LaunchApiClient::new(Duration::from_secs(2))
            .with_endpoint(format!("{}/api/launches", server.uri()));
        (server, client)
    }

    #[tokio::test]
    async fn test_fetch_launches_parses_feed() {
        let body = json!([
            {
                "shortName": "Tower",
                "title": "Tower Lifeboat Station",
                "launchDate": "2024-02-01T09:00:00+00:00",
                "id": "2",
                "lifeboat_IdNo": "E-07",
                "website": "https://example.org/tower",
                "reason": "Kayaker in difficulty"
            },
            { "shortName": "Chiswick", "title": "Chiswick Lifeboat Station", "id": "9" }
        ]);
        let (_server, client) = mock_client(ResponseTemplate::new(200).set_body_json(body)).await;

        let launches = client.fetch_launches().await.unwrap();
        assert_eq!(launches.len(), 2);
        assert_eq!(launches[0].short_name, "Tower");
        assert_eq!(launches[0].extra["reason"], json!("Kayaker in difficulty"));
        assert_eq!(launches[1].launch_date, "");
    }

    #[tokio::test]
    async fn test_fetch_launches_http_error() {
        let (_server, client) = mock_client(ResponseTemplate::new(503)).await;

        let err = client.fetch_launches().await.unwrap_err();
        assert_eq!(err, FetchError::HttpStatus(503));
    }

    #[tokio::test]
    async fn test_fetch_launches_malformed_body() {
        let (_server, client) =
            mock_client(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
                .await;

        let err = client.fetch_launches().await.unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[tokio::test]
    async fn test_fetch_launches_unexpected_shape() {
        // Valid JSON, but an object instead of an array of launches
        let (_server, client) =
            mock_client(ResponseTemplate::new(200).set_body_json(json!({"error": "nope"}))).await;

        let err = client.fetch_launches().await.unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
    }

    #[tokio::test]
    async fn test_fetch_launches_timeout() {
        let template = ResponseTemplate::new(200)
            .set_body_json(json!([]))
            .set_delay(Duration::from_secs(30));
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(template)
            .mount(&server)
            .await;

        let client = LaunchApiClient::new(Duration::from_millis(200))
            .with_endpoint(format!("{}/api/launches", server.uri()));

        let err = client.fetch_launches().await.unwrap_err();
        assert_eq!(err, FetchError::Timeout);
    }

    #[tokio::test]
    async fn test_fetch_launches_connection_refused() {
        // Grab a free port, then drop the listener so nothing is bound there
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = LaunchApiClient::new(Duration::from_secs(2))
            .with_endpoint(format!("http://{}/api/launches", addr));

        let err = client.fetch_launches().await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }

    #[tokio::test]
    async fn test_fetch_stations_dedupes_in_feed_order() {
        let body = json!([
            { "shortName": "Tower", "title": "Tower Lifeboat Station", "id": "1" },
            { "shortName": "Chiswick", "title": "Chiswick Lifeboat Station", "id": "2" },
            { "shortName": "Tower", "title": "Tower Lifeboat Station", "id": "3" },
            { "shortName": "", "title": "Nameless", "id": "4" },
            { "shortName": "Untitled", "id": "5" }
        ]);
        let (_server, client) = mock_client(ResponseTemplate::new(200).set_body_json(body)).await;

        let stations = client.fetch_stations().await.unwrap();
        assert_eq!(
            stations,
            vec![
                Station {
                    short_name: "Tower".to_string(),
                    title: "Tower Lifeboat Station".to_string(),
                },
                Station {
                    short_name: "Chiswick".to_string(),
                    title: "Chiswick Lifeboat Station".to_string(),
                },
            ]
        );
    }
}
