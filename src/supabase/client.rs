//! Supabase REST and auth calls
//!
//! Every request carries the project's `apikey` header and a bearer token:
//! the user's access token when one is configured, the anon key otherwise.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::settings::SupabaseSettings;
use crate::error::{FieldLogError, FieldLogResult};
use crate::identity::{SessionUser, UserProfile};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Low-level Supabase client
#[derive(Debug, Clone)]
pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
}

impl SupabaseClient {
    pub fn new(base_url: &str, anon_key: &str, access_token: Option<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.to_string(),
            access_token: access_token.filter(|t| !t.trim().is_empty()),
        }
    }

    /// Build from settings
    ///
    /// # Errors
    ///
    /// `Config` if the URL or anon key is missing.
    pub fn from_settings(settings: &SupabaseSettings) -> FieldLogResult<Self> {
        let url = settings
            .url
            .as_deref()
            .filter(|u| !u.trim().is_empty())
            .ok_or_else(|| FieldLogError::Config("Supabase URL is not configured".into()))?;
        let anon_key = settings
            .anon_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| FieldLogError::Config("Supabase anon key is not configured".into()))?;

        Ok(Self::new(url, anon_key, settings.access_token.clone()))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_session(&self) -> bool {
        self.access_token.is_some()
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.anon_key);
        request
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", bearer))
    }

    /// Insert a single row, asking for no response body
    pub async fn insert_row<T: Serialize + ?Sized>(
        &self,
        table: &str,
        row: &T,
    ) -> FieldLogResult<()> {
        debug!(table, "inserting row");
        let response = self
            .authorized(self.client.post(self.rest_url(table)))
            .header("Prefer", "return=minimal")
            .json(row)
            .send()
            .await?;

        ensure_success(response, "insert").await?;
        Ok(())
    }

    /// Insert or merge a record keyed on `conflict_column`
    pub async fn upsert_record(
        &self,
        table: &str,
        record: &Map<String, Value>,
        conflict_column: &str,
    ) -> FieldLogResult<()> {
        debug!(table, conflict_column, "upserting record");
        let response = self
            .authorized(self.client.post(self.rest_url(table)))
            .query(&[("on_conflict", conflict_column)])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(record)
            .send()
            .await?;

        ensure_success(response, "upsert").await?;
        Ok(())
    }

    /// The user behind the configured access token
    ///
    /// No token, or a token the server rejects, means no current user.
    pub async fn current_user(&self) -> FieldLogResult<Option<SessionUser>> {
        if self.access_token.is_none() {
            return Ok(None);
        }

        let response = self
            .authorized(self.client.get(format!("{}/auth/v1/user", self.base_url)))
            .send()
            .await?;

        if response.status() == reqwest::StatusCode::UNAUTHORIZED
            || response.status() == reqwest::StatusCode::FORBIDDEN
        {
            debug!(status = %response.status(), "session token rejected");
            return Ok(None);
        }

        let response = ensure_success(response, "fetch current user").await?;
        Ok(Some(response.json::<SessionUser>().await?))
    }

    /// Look up `full_name` and `role` for a user id
    pub async fn fetch_profile(
        &self,
        table: &str,
        user_id: &str,
    ) -> FieldLogResult<Option<UserProfile>> {
        let id_filter = format!("eq.{}", user_id);
        let response = self
            .authorized(self.client.get(self.rest_url(table)))
            .query(&[("id", id_filter.as_str()), ("select", "full_name,role")])
            .send()
            .await?;

        let response = ensure_success(response, "fetch profile").await?;
        let mut rows: Vec<UserProfile> = response.json().await?;
        Ok(if rows.is_empty() {
            None
        } else {
            Some(rows.swap_remove(0))
        })
    }
}

async fn ensure_success(response: Response, action: &str) -> FieldLogResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "failed to read error body".to_string());
    Err(FieldLogError::Backend(format!(
        "Supabase {} failed with {}: {}",
        action, status, body
    )))
}
