//! Dashboard REST implementation of `MeetingBackend`.
//!
//! The dashboard API answers with two body shapes depending on the route:
//! a bare meeting object, or a `{success, data, message}` wrapper. Both are
//! decoded here into the single contract the orchestrator relies on. Meeting
//! ids arrive as strings or numbers under `meetingId`, `id` or `_id`.
//!
//! # Routes
//!
//! - `POST   /api/{role}/meetings` with `{"sessionId": ...}`
//! - `GET    /api/{role}/meetings/session/{sessionId}` (404 means no meeting)
//! - `PATCH  /api/meetings/{meetingId}`
//! - `DELETE /api/meetings/{meetingId}`
//! - `PATCH  /api/sessions/{sessionId}` with `{meetingLink, meetingId}`

use crate::errors::BackendError;
use crate::models::{Meeting, MeetingPatch, MeetingStatus, SessionMeetingPatch};
use crate::services::backend::MeetingBackend;
use common::secret::{ExposeSecret, SecretString};
use common::types::{SessionId, UserRole};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

/// Default connect timeout in seconds.
const CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateMeetingRequest<'a> {
    session_id: &'a str,
}

/// Identifier that may be serialized as a string or a number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum WireId {
    Text(String),
    Number(u64),
}

impl WireId {
    fn into_string(self) -> String {
        match self {
            WireId::Text(s) => s,
            WireId::Number(n) => n.to_string(),
        }
    }
}

/// Meeting as any dashboard route serializes it.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MeetingRecord {
    #[serde(default, alias = "meeting_id")]
    meeting_id: Option<WireId>,
    #[serde(default)]
    id: Option<WireId>,
    #[serde(default, rename = "_id")]
    object_id: Option<WireId>,
    #[serde(default, alias = "join_url")]
    join_url: Option<String>,
    #[serde(default, alias = "start_url")]
    start_url: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

impl MeetingRecord {
    fn into_meeting(self) -> Meeting {
        let id = self
            .meeting_id
            .or(self.id)
            .or(self.object_id)
            .map(WireId::into_string)
            .unwrap_or_default();
        Meeting {
            id,
            join_url: self.join_url,
            start_url: self.start_url,
            status: self.status.as_deref().map(parse_status).unwrap_or_default(),
        }
    }
}

/// Lenient status parsing; unknown values count as scheduled.
fn parse_status(raw: &str) -> MeetingStatus {
    match raw.trim().to_ascii_lowercase().as_str() {
        "started" | "active" | "in_progress" => MeetingStatus::Started,
        "ended" | "finished" | "completed" => MeetingStatus::Ended,
        "cancelled" | "canceled" | "deleted" => MeetingStatus::Cancelled,
        _ => MeetingStatus::Scheduled,
    }
}

/// The two response shapes.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Envelope {
    Wrapped {
        success: bool,
        #[serde(default)]
        data: Option<MeetingRecord>,
        #[serde(default)]
        message: Option<String>,
    },
    Bare(MeetingRecord),
}

impl Envelope {
    /// `Ok(None)` when the body says there is no meeting.
    fn into_meeting(self) -> Result<Option<Meeting>, BackendError> {
        match self {
            Envelope::Wrapped {
                success: true,
                data,
                ..
            } => Ok(data.map(MeetingRecord::into_meeting)),
            Envelope::Wrapped {
                success: false,
                message,
                ..
            } => Err(BackendError::Failed(
                message.unwrap_or_else(|| "request unsuccessful".to_string()),
            )),
            Envelope::Bare(record) => Ok(Some(record.into_meeting())),
        }
    }
}

/// HTTP client for the dashboard meeting routes.
#[derive(Clone)]
pub struct HttpMeetingBackend {
    /// HTTP client with configured timeouts.
    client: Client,

    /// Base URL without trailing slash.
    base_url: String,

    /// Bearer token of the signed-in user.
    token: Option<SecretString>,
}

impl HttpMeetingBackend {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns `BackendError::Internal` if the HTTP client cannot be built.
    pub fn new(
        base_url: &str,
        token: Option<SecretString>,
        request_timeout: Duration,
    ) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                error!(target: "join.http_backend", error = %e, "Failed to build HTTP client");
                BackendError::Internal
            })?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, BackendError> {
        self.authorize(request).send().await.map_err(|e| {
            warn!(target: "join.http_backend", error = %e, "Meeting API request failed");
            BackendError::Unavailable(e.to_string())
        })
    }

    /// Map non-success statuses; 404 is left to the caller.
    fn check_status(status: StatusCode) -> Result<(), BackendError> {
        if status.is_success() || status == StatusCode::NOT_FOUND {
            Ok(())
        } else if status.is_server_error() {
            warn!(target: "join.http_backend", status = %status, "Meeting API returned server error");
            Err(BackendError::Unavailable(format!("status {status}")))
        } else {
            warn!(target: "join.http_backend", status = %status, "Meeting API rejected request");
            Err(BackendError::Rejected {
                status: status.as_u16(),
            })
        }
    }

    async fn decode(response: Response) -> Result<Option<Meeting>, BackendError> {
        let body = response.text().await.map_err(|e| {
            warn!(target: "join.http_backend", error = %e, "Failed to read response body");
            BackendError::Unavailable(e.to_string())
        })?;
        if body.trim().is_empty() || body.trim() == "null" {
            return Ok(None);
        }
        let envelope: Envelope = serde_json::from_str(&body).map_err(|e| {
            error!(target: "join.http_backend", error = %e, "Failed to parse meeting response");
            BackendError::Decode(e.to_string())
        })?;
        envelope.into_meeting()
    }

    /// Decode a body that must contain a meeting.
    async fn expect_meeting(response: Response) -> Result<Meeting, BackendError> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(BackendError::Rejected {
                status: status.as_u16(),
            });
        }
        Self::decode(response)
            .await?
            .ok_or_else(|| BackendError::Decode("response carried no meeting".to_string()))
    }
}

#[async_trait::async_trait]
impl MeetingBackend for HttpMeetingBackend {
    #[instrument(skip_all, fields(session_id = %session_id, role = %role))]
    async fn create_meeting(
        &self,
        session_id: &SessionId,
        role: UserRole,
    ) -> Result<Meeting, BackendError> {
        let url = format!("{}/api/{}/meetings", self.base_url, role.as_str());
        let request = self.client.post(&url).json(&CreateMeetingRequest {
            session_id: session_id.as_str(),
        });

        let response = self.send(request).await?;
        Self::check_status(response.status())?;
        Self::expect_meeting(response).await
    }

    #[instrument(skip_all, fields(session_id = %session_id, role = %role))]
    async fn get_meeting_by_session_id(
        &self,
        session_id: &SessionId,
        role: UserRole,
    ) -> Result<Option<Meeting>, BackendError> {
        let url = format!(
            "{}/api/{}/meetings/session/{}",
            self.base_url,
            role.as_str(),
            session_id
        );

        let response = self.send(self.client.get(&url)).await?;
        let status = response.status();
        Self::check_status(status)?;
        if status == StatusCode::NOT_FOUND {
            debug!(target: "join.http_backend", "No meeting for session");
            return Ok(None);
        }

        match Self::decode(response).await {
            // A failed envelope on lookup means "not found" for this API.
            Err(BackendError::Failed(message)) => {
                debug!(target: "join.http_backend", message = %message, "Lookup reported no meeting");
                Ok(None)
            }
            other => other,
        }
    }

    #[instrument(skip_all, fields(meeting_id = %meeting_id))]
    async fn update_meeting(
        &self,
        meeting_id: &str,
        patch: &MeetingPatch,
    ) -> Result<Meeting, BackendError> {
        let url = format!("{}/api/meetings/{}", self.base_url, meeting_id);

        let response = self.send(self.client.patch(&url).json(patch)).await?;
        Self::check_status(response.status())?;
        Self::expect_meeting(response).await
    }

    #[instrument(skip_all, fields(meeting_id = %meeting_id))]
    async fn delete_meeting(&self, meeting_id: &str) -> Result<(), BackendError> {
        let url = format!("{}/api/meetings/{}", self.base_url, meeting_id);

        let response = self.send(self.client.delete(&url)).await?;
        let status = response.status();
        Self::check_status(status)?;
        if status == StatusCode::NOT_FOUND {
            return Err(BackendError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }

    #[instrument(skip_all, fields(session_id = %session_id))]
    async fn patch_session_fallback(
        &self,
        session_id: &SessionId,
        patch: &SessionMeetingPatch,
    ) -> Result<(), BackendError> {
        let url = format!("{}/api/sessions/{}", self.base_url, session_id);

        let response = self.send(self.client.patch(&url).json(patch)).await?;
        let status = response.status();
        Self::check_status(status)?;
        if status == StatusCode::NOT_FOUND {
            return Err(BackendError::Rejected {
                status: status.as_u16(),
            });
        }
        Ok(())
    }
}
