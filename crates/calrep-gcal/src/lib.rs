//! Google Calendar access for calrep.
//!
//! Lists the events of one calendar for a time window using an access token
//! that was issued elsewhere. Obtaining and refreshing tokens is out of scope:
//! the token file is only read.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use calrep_core::RawEvent;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

/// Default request timeout for API calls.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
/// Root of the Calendar v3 REST API.
pub const DEFAULT_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
/// Largest page size `events.list` accepts.
const MAX_RESULTS_PER_PAGE: &str = "2500";

/// Google Calendar client errors.
#[derive(Debug, Error)]
pub enum GcalError {
    /// No token file exists yet.
    #[error("no token file at {}", path.display())]
    MissingToken { path: PathBuf },
    /// The token file could not be read.
    #[error("failed to read token file {}: {source}", path.display())]
    ReadToken {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The token file is not the expected JSON.
    #[error("failed to parse token file: {0}")]
    ParseToken(#[source] serde_json::Error),
    /// The token is unusable.
    #[error("invalid access token: {reason}")]
    InvalidToken { reason: &'static str },
    /// The API base URL or calendar id did not form a valid URL.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    /// Failed to build HTTP client.
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// API returned an error response.
    #[error("API error: {message}")]
    Api { message: String },
    /// Failed to parse response.
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// An OAuth2 bearer token for the Calendar API.
#[derive(Clone)]
pub struct AccessToken(String);

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

impl AccessToken {
    /// Wraps a raw token string.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty or whitespace-only.
    pub fn new(token: impl Into<String>) -> Result<Self, GcalError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(GcalError::InvalidToken {
                reason: "access token cannot be empty",
            });
        }
        Ok(Self(token))
    }

    /// Reads the token file written by the OAuth2 token endpoint.
    ///
    /// Only `access_token` is used; other fields such as `refresh_token` and
    /// `expiry_date` are ignored.
    pub fn load(path: &Path) -> Result<Self, GcalError> {
        let contents = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                GcalError::MissingToken {
                    path: path.to_path_buf(),
                }
            } else {
                GcalError::ReadToken {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        Self::from_json(&contents)
    }

    fn from_json(contents: &str) -> Result<Self, GcalError> {
        #[derive(Deserialize)]
        struct TokenFile {
            access_token: Option<String>,
        }

        let file: TokenFile = serde_json::from_str(contents).map_err(GcalError::ParseToken)?;
        let token = file.access_token.ok_or(GcalError::InvalidToken {
            reason: "token file has no access_token",
        })?;
        Self::new(token)
    }

    fn as_str(&self) -> &str {
        &self.0
    }
}

/// Google Calendar API client.
///
/// Constructed explicitly by the caller for one fetch and dropped afterwards.
/// Clones share the underlying HTTP connection pool.
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    token: AccessToken,
    base_url: String,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("token", &self.token)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a new client for the public Calendar API.
    pub fn new(token: AccessToken) -> Result<Self, GcalError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(GcalError::ClientBuild)?;

        Ok(Self {
            http,
            token,
            base_url: DEFAULT_API_BASE.to_string(),
        })
    }

    /// Points the client at a different API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Lists single (expanded) events starting in `[time_min, time_max)`,
    /// ordered by start time, following pagination to the end.
    pub async fn list_events(
        &self,
        calendar_id: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<RawEvent>, GcalError> {
        let url = self.events_url(calendar_id)?;
        let time_min = time_min.to_rfc3339_opts(SecondsFormat::Secs, true);
        let time_max = time_max.to_rfc3339_opts(SecondsFormat::Secs, true);

        let mut events = Vec::new();
        let mut page_token: Option<String> = None;
        let mut seen_tokens = HashSet::new();
        loop {
            let mut query = vec![
                ("timeMin", time_min.clone()),
                ("timeMax", time_max.clone()),
                ("singleEvents", "true".to_string()),
                ("orderBy", "startTime".to_string()),
                ("maxResults", MAX_RESULTS_PER_PAGE.to_string()),
            ];
            if let Some(token) = page_token.take() {
                query.push(("pageToken", token));
            }

            let response = self
                .http
                .get(url.clone())
                .bearer_auth(self.token.as_str())
                .query(&query)
                .send()
                .await?;

            let status = response.status();
            let body = response.text().await?;
            if !status.is_success() {
                return Err(parse_api_error(&body).unwrap_or_else(|| GcalError::Api {
                    message: format!("status {status}: {body}"),
                }));
            }

            let page = parse_events_page(&body)?;
            tracing::debug!(count = page.items.len(), "fetched events page");
            events.extend(page.items);

            match page.next_page_token {
                Some(token) if !token.is_empty() => {
                    if !seen_tokens.insert(token.clone()) {
                        return Err(GcalError::InvalidResponse(format!(
                            "repeated nextPageToken '{token}'"
                        )));
                    }
                    page_token = Some(token);
                }
                _ => break,
            }
        }

        Ok(events)
    }

    fn events_url(&self, calendar_id: &str) -> Result<Url, GcalError> {
        let mut url =
            Url::parse(&self.base_url).map_err(|err| GcalError::InvalidUrl(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| GcalError::InvalidUrl(self.base_url.clone()))?
            .pop_if_empty()
            .extend(["calendars", calendar_id, "events"]);
        Ok(url)
    }
}

/// One page of an `events.list` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventsPage {
    #[serde(default)]
    items: Vec<RawEvent>,
    next_page_token: Option<String>,
}

fn parse_events_page(body: &str) -> Result<EventsPage, GcalError> {
    serde_json::from_str(body).map_err(|err| GcalError::InvalidResponse(err.to_string()))
}

fn parse_api_error(body: &str) -> Option<GcalError> {
    #[derive(Deserialize)]
    struct ErrorPayload {
        error: ErrorDetails,
    }

    #[derive(Deserialize)]
    struct ErrorDetails {
        message: String,
    }

    serde_json::from_str::<ErrorPayload>(body)
        .ok()
        .map(|payload| GcalError::Api {
            message: payload.error.message,
        })
}
