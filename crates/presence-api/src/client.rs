use presence_core::poller::{RecognizeError, Recognizer};
use presence_core::types::{AttendanceRecord, DetectedFace, Frame, WeeklyAttendance};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::wire::{
    AttendanceAllResponse, CountResponse, EnrollRequest, EnrollResponse, ErrorBody, ImagePayload,
    MessageResponse, RecognizeResponse, UpdateFacePayload, UpdatePasswordPayload, VerifyPayload,
    VerifyResponse, WeeklyResponse,
};

#[derive(Error, Debug)]
pub enum ApiError {
    /// The request could not complete at all.
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),
    /// The service answered with a non-success status and error body.
    #[error("server error ({status}): {message}")]
    Remote { status: u16, message: String },
}

/// Async client for the recognition/attendance service.
///
/// Deliberately carries no request timeout: during polling, a hung
/// request just delays the next iteration until it resolves or the
/// loop is torn down.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Decode a success body, or map a non-success status plus its
    /// `{ "error": ... }` payload to [`ApiError::Remote`].
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error,
            Err(_) => status
                .canonical_reason()
                .unwrap_or("unexpected response")
                .to_string(),
        };
        Err(ApiError::Remote {
            status: status.as_u16(),
            message,
        })
    }

    /// `POST /recognize` — submit one frame, get zero or more faces.
    ///
    /// The service answers 400 when no face is in the frame; during
    /// continuous polling that is the common case, so it maps to an
    /// empty list rather than an error.
    pub async fn recognize_image(&self, image: &str) -> Result<Vec<DetectedFace>, ApiError> {
        let response = self
            .http
            .post(self.url("/recognize"))
            .json(&ImagePayload { image })
            .send()
            .await?;

        if response.status() == StatusCode::BAD_REQUEST {
            tracing::trace!("no face in frame");
            return Ok(Vec::new());
        }

        let parsed: RecognizeResponse = Self::decode(response).await?;
        Ok(parsed.faces.into_iter().map(Into::into).collect())
    }

    /// `POST /enroll` — register a new student from a captured frame.
    pub async fn enroll(&self, request: &EnrollRequest) -> Result<EnrollResponse, ApiError> {
        let response = self
            .http
            .post(self.url("/enroll"))
            .json(request)
            .send()
            .await?;
        Self::decode(response).await
    }

    /// `POST /update-face` — replace the stored facial data for an
    /// already-enrolled student. Returns the service's message.
    pub async fn update_face(&self, name: &str, image: &str) -> Result<String, ApiError> {
        let response = self
            .http
            .post(self.url("/update-face"))
            .json(&UpdateFacePayload { name, image })
            .send()
            .await?;
        let parsed: MessageResponse = Self::decode(response).await?;
        Ok(parsed.message)
    }

    /// `POST /api/verify` — check the admin password. A 401 is a clean
    /// "wrong password", not a remote error.
    pub async fn verify_admin(&self, password: &str) -> Result<bool, ApiError> {
        let response = self
            .http
            .post(self.url("/api/verify"))
            .json(&VerifyPayload { password })
            .send()
            .await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            return Ok(false);
        }

        let parsed: VerifyResponse = Self::decode(response).await?;
        Ok(parsed.success)
    }

    /// `POST /api/update-password` — change the admin password.
    pub async fn update_password(&self, old: &str, new: &str) -> Result<String, ApiError> {
        let response = self
            .http
            .post(self.url("/api/update-password"))
            .json(&UpdatePasswordPayload {
                old_password: old,
                new_password: new,
            })
            .send()
            .await?;
        let parsed: MessageResponse = Self::decode(response).await?;
        Ok(parsed.message)
    }

    /// `GET /api/students-today` — distinct students seen today.
    pub async fn students_today(&self) -> Result<u64, ApiError> {
        self.count(self.url("/api/students-today")).await
    }

    /// `GET /api/students-absent-today`.
    pub async fn students_absent_today(&self) -> Result<u64, ApiError> {
        self.count(self.url("/api/students-absent-today")).await
    }

    /// `GET /api/total-students` — all enrolled students.
    pub async fn total_students(&self) -> Result<u64, ApiError> {
        self.count(self.url("/api/total-students")).await
    }

    async fn count(&self, url: String) -> Result<u64, ApiError> {
        let response = self.http.get(url).send().await?;
        let parsed: CountResponse = Self::decode(response).await?;
        Ok(parsed.count)
    }

    /// `GET /api/weekly-attendance?offset=N` — per-day counts for the
    /// week `N` weeks away from the current one (negative = past).
    pub async fn weekly_attendance(&self, offset: i32) -> Result<WeeklyAttendance, ApiError> {
        let response = self
            .http
            .get(self.url("/api/weekly-attendance"))
            .query(&[("offset", offset)])
            .send()
            .await?;
        let parsed: WeeklyResponse = Self::decode(response).await?;
        Ok(parsed)
    }

    /// `GET /api/attendance-all` — every attendance row, for export.
    pub async fn attendance_all(&self) -> Result<Vec<AttendanceRecord>, ApiError> {
        let response = self.http.get(self.url("/api/attendance-all")).send().await?;
        let parsed: AttendanceAllResponse = Self::decode(response).await?;
        Ok(parsed.records)
    }
}

impl Recognizer for ApiClient {
    async fn recognize(&self, frame: &Frame) -> Result<Vec<DetectedFace>, RecognizeError> {
        self.recognize_image(&frame.data_url)
            .await
            .map_err(|e| match e {
                ApiError::Network(err) => RecognizeError::Network(err.to_string()),
                ApiError::Remote { message, .. } => RecognizeError::Remote(message),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::new("http://localhost:5000/");
        assert_eq!(client.base_url(), "http://localhost:5000");
        assert_eq!(client.url("/recognize"), "http://localhost:5000/recognize");
    }

    #[test]
    fn test_url_joins_api_paths() {
        let client = ApiClient::new("https://attendance.example.com");
        assert_eq!(
            client.url("/api/weekly-attendance"),
            "https://attendance.example.com/api/weekly-attendance"
        );
    }
}
