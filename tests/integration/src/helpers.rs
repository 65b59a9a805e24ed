//! Test helpers for integration tests
//!
//! Provides utilities for spawning test servers on a manual clock and
//! making HTTP requests against them.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use chrono::{TimeDelta, TimeZone, Utc};
use presence_api::{create_app, create_app_state_with_clock};
use presence_common::AppConfig;
use presence_core::ManualClock;
use reqwest::{Client, Response, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Instant every test server clock starts at
pub const TEST_EPOCH_SECS: i64 = 1_700_000_000;

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub clock: ManualClock,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server with default configuration
    pub async fn start() -> Result<Self> {
        Self::start_with_config(AppConfig::default()).await
    }

    /// Start a test server with custom config
    ///
    /// No background sweeper runs; tests drive decay through the clock and
    /// the sweep endpoint.
    pub async fn start_with_config(config: AppConfig) -> Result<Self> {
        let start = Utc
            .timestamp_opt(TEST_EPOCH_SECS, 0)
            .single()
            .ok_or_else(|| anyhow::anyhow!("invalid test epoch"))?;
        let clock = ManualClock::new(start);

        let state = create_app_state_with_clock(config, Arc::new(clock.clone()));
        let app = create_app(state);

        // Port 0 lets the OS pick a free port
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            addr,
            client,
            clock,
            handle,
        })
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// URL of a presence API path
    pub fn presence_url(&self, path: &str) -> String {
        format!("{}/api/v1/presence{}", self.base_url(), path)
    }

    /// Move the server clock forward
    pub fn advance(&self, delta: TimeDelta) {
        self.clock.advance(delta);
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Make a GET request to a presence path
    pub async fn get_presence(&self, path: &str) -> Result<Response> {
        Ok(self.client.get(self.presence_url(path)).send().await?)
    }

    /// Open the event stream of a user
    pub async fn events(&self, user_id: &str) -> Result<EventStream> {
        let url = self.presence_url(&format!("/users/{user_id}/events"));
        let response = self
            .client
            .get(url)
            .header("accept", "text/event-stream")
            .send()
            .await?;
        Ok(EventStream::new(response))
    }

    /// Make a POST request with JSON body to a presence path
    pub async fn post<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        Ok(self.client.post(self.presence_url(path)).json(body).send().await?)
    }

    /// Make a POST request without a body to a presence path
    pub async fn post_empty(&self, path: &str) -> Result<Response> {
        Ok(self.client.post(self.presence_url(path)).send().await?)
    }

    /// Make a PUT request with JSON body to a presence path
    pub async fn put<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        Ok(self.client.put(self.presence_url(path)).json(body).send().await?)
    }

    /// Make a DELETE request to a presence path
    pub async fn delete(&self, path: &str) -> Result<Response> {
        Ok(self.client.delete(self.presence_url(path)).send().await?)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }

    Ok(response.json().await?)
}

/// Assert response status only
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!(
            "Expected status {}, got {}. Body: {}",
            expected_status,
            status,
            body
        );
    }

    Ok(())
}

/// Reader over a `text/event-stream` response
pub struct EventStream {
    response: Response,
    buffer: String,
}

impl EventStream {
    pub fn new(response: Response) -> Self {
        Self {
            response,
            buffer: String::new(),
        }
    }

    /// Response status
    pub fn status(&self) -> StatusCode {
        self.response.status()
    }

    /// Content type header, if any
    pub fn content_type(&self) -> Option<&str> {
        self.response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
    }

    /// Wait for the next event carrying a `data:` payload
    ///
    /// Fails if the stream ends or nothing arrives within five seconds.
    pub async fn next_data(&mut self) -> Result<serde_json::Value> {
        loop {
            while let Some(end) = self.buffer.find("\n\n") {
                let frame: String = self.buffer.drain(..end + 2).collect();
                let data = frame
                    .lines()
                    .find_map(|line| line.strip_prefix("data:"))
                    .map(str::trim);

                // Keep-alive comments carry no data
                if let Some(data) = data {
                    return Ok(serde_json::from_str(data)?);
                }
            }

            let chunk = tokio::time::timeout(Duration::from_secs(5), self.response.chunk())
                .await
                .map_err(|_| anyhow::anyhow!("timed out waiting for event"))??
                .ok_or_else(|| anyhow::anyhow!("event stream ended"))?;
            self.buffer.push_str(&String::from_utf8_lossy(&chunk));
        }
    }
}
