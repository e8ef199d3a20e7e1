//! Blocking HTTP client for the Toggl Track v9 API.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, FixedOffset, NaiveDate};
use reqwest::blocking::RequestBuilder;
use reqwest::header;
use serde_json::json;
use tracing::{debug, error, info, warn};

use super::traits::TimeEntryClient;
use super::types::{ApiResponse, EntrySpec, TogglError};
use crate::storage::mask_token;

const TOGGL_API_BASE_URL: &str = "https://api.track.toggl.com/api/v9";
const CREATED_WITH: &str = "AnkiToggl";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);
const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// Toggl Track API client for one configured entry tuple.
pub struct TogglClient {
    client: reqwest::blocking::Client,
    api_token: String,
    spec: EntrySpec,
    base_url: String,
}

impl TogglClient {
    /// Create a client for the given credentials and entry tuple.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(api_token: impl Into<String>, spec: EntrySpec) -> Result<Self, TogglError> {
        let client = reqwest::blocking::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(READ_TIMEOUT)
            .build()?;
        let api_token = api_token.into();
        debug!(
            workspace_id = spec.workspace_id,
            project_id = spec.project_id,
            token = %mask_token(&api_token),
            "Toggl client initialized"
        );
        Ok(Self {
            client,
            api_token,
            spec,
            base_url: TOGGL_API_BASE_URL.to_string(),
        })
    }

    /// Override the API base URL (tests point this at a mock server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn spec(&self) -> &EntrySpec {
        &self.spec
    }

    fn entries_url(&self) -> String {
        format!(
            "{}/workspaces/{}/time_entries",
            self.base_url, self.spec.workspace_id
        )
    }

    fn auth_header(&self) -> String {
        let token = BASE64.encode(format!("{}:api_token", self.api_token));
        format!("Basic {token}")
    }

    fn execute(&self, request: RequestBuilder) -> Result<ApiResponse, TogglError> {
        // `.json()` on the builder already sets Content-Type for bodies.
        let response = request
            .header(header::AUTHORIZATION, self.auth_header())
            .header(header::USER_AGENT, USER_AGENT)
            .send()
            .map_err(|e| {
                error!("network error during Toggl API call: {e}");
                TogglError::Network(e)
            })?;

        let status = response.status().as_u16();
        debug!(status, "Toggl API response");
        let body = match response.text() {
            Ok(body) => body,
            Err(e) => {
                debug!("failed to read response body: {e}");
                String::new()
            }
        };
        if status >= 400 {
            error!(status, "Toggl API error: {body}");
            return Err(TogglError::Http { status, body });
        }
        Ok(ApiResponse { status, body })
    }

    fn build_entry_data(
        &self,
        start_time: DateTime<FixedOffset>,
        duration_seconds: i64,
    ) -> serde_json::Value {
        json!({
            "start": start_time.to_rfc3339(),
            "duration": duration_seconds,
            "description": self.spec.description,
            "project_id": self.spec.project_id,
            "created_with": CREATED_WITH,
            "workspace_id": self.spec.workspace_id,
        })
    }

    /// Fetch the authenticated user. Used as a credentials check.
    pub fn me(&self) -> Result<ApiResponse, TogglError> {
        self.execute(self.client.get(format!("{}/me", self.base_url)))
    }

    /// All time entries for one calendar date.
    pub fn time_entries_for_date(
        &self,
        target_date: NaiveDate,
    ) -> Result<Vec<serde_json::Value>, TogglError> {
        let date_str = target_date.format("%Y-%m-%d").to_string();
        debug!(date = %date_str, "fetching time entries");
        let response = self.execute(
            self.client
                .get(self.entries_url())
                .query(&[("start_date", date_str.as_str()), ("end_date", date_str.as_str())]),
        )?;
        let entries = response
            .json()
            .and_then(|v| v.as_array().cloned())
            .unwrap_or_default();
        debug!(count = entries.len(), date = %date_str, "fetched time entries");
        Ok(entries)
    }
}

impl TimeEntryClient for TogglClient {
    fn create_entry(
        &self,
        start_time: DateTime<FixedOffset>,
        duration_seconds: i64,
    ) -> Result<ApiResponse, TogglError> {
        info!(
            duration_s = duration_seconds,
            description = %self.spec.description,
            "creating Toggl entry"
        );
        let data = self.build_entry_data(start_time, duration_seconds);
        self.execute(self.client.post(self.entries_url()).json(&data))
    }

    fn update_entry(
        &self,
        entry_id: i64,
        duration_seconds: i64,
        start_time: DateTime<FixedOffset>,
    ) -> Result<ApiResponse, TogglError> {
        info!(entry_id, duration_s = duration_seconds, "updating Toggl entry");
        let data = self.build_entry_data(start_time, duration_seconds);
        let url = format!("{}/{}", self.entries_url(), entry_id);
        self.execute(self.client.put(url).json(&data))
    }

    fn find_existing_entry(&self, target_date: NaiveDate) -> Option<serde_json::Value> {
        let entries = match self.time_entries_for_date(target_date) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("failed to list entries for {target_date}: {e}");
                return None;
            }
        };
        for entry in entries {
            let project_matches = entry.get("project_id").and_then(|v| v.as_i64())
                == Some(self.spec.project_id);
            let description_matches = entry.get("description").and_then(|v| v.as_str())
                == Some(self.spec.description.as_str());
            if project_matches && description_matches {
                info!(id = ?entry.get("id"), "found existing entry");
                return Some(entry);
            }
        }
        info!(
            project_id = self.spec.project_id,
            description = %self.spec.description,
            "no existing entry found for {target_date}"
        );
        None
    }
}
