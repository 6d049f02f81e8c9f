//! Wire types for the service's JSON payloads.

use presence_core::types::{AttendanceRecord, BoundingBox, DetectedFace, WeeklyAttendance};
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub(crate) struct ImagePayload<'a> {
    pub image: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct RecognizeResponse {
    pub faces: Vec<WireFace>,
}

/// A face as the service returns it: bbox is a bare `[x, y, w, h]` array.
#[derive(Deserialize)]
pub(crate) struct WireFace {
    pub name: String,
    pub bbox: [f32; 4],
    #[serde(default)]
    pub confidence: Option<f32>,
}

impl From<WireFace> for DetectedFace {
    fn from(w: WireFace) -> Self {
        let [x, y, width, height] = w.bbox;
        DetectedFace {
            name: w.name,
            bbox: BoundingBox { x, y, width, height },
            confidence: w.confidence,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrollRequest {
    pub name: String,
    pub mobile: Option<String>,
    pub email: Option<String>,
    /// Data-URL-encoded captured frame.
    pub image: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EnrollResponse {
    /// True when the name is already enrolled; the service then asks
    /// whether to update the stored facial data instead.
    #[serde(default)]
    pub student_exists: bool,
    pub message: String,
}

#[derive(Serialize)]
pub(crate) struct UpdateFacePayload<'a> {
    pub name: &'a str,
    pub image: &'a str,
}

#[derive(Serialize)]
pub(crate) struct VerifyPayload<'a> {
    pub password: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct VerifyResponse {
    pub success: bool,
}

#[derive(Serialize)]
pub(crate) struct UpdatePasswordPayload<'a> {
    pub old_password: &'a str,
    pub new_password: &'a str,
}

#[derive(Deserialize)]
pub(crate) struct MessageResponse {
    pub message: String,
}

#[derive(Deserialize)]
pub(crate) struct CountResponse {
    pub count: u64,
}

#[derive(Deserialize)]
pub(crate) struct AttendanceAllResponse {
    pub records: Vec<AttendanceRecord>,
}

pub(crate) type WeeklyResponse = WeeklyAttendance;

/// Error payload the service attaches to non-success statuses.
#[derive(Deserialize)]
pub(crate) struct ErrorBody {
    pub error: String,
}
