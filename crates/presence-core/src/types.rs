use serde::{Deserialize, Serialize};

/// Identity the recognition service returns when a face matched no
/// enrolled student.
pub const UNKNOWN_IDENTITY: &str = "Unknown";

/// One encoded still image sampled from the live camera stream.
///
/// Produced fresh each poll cycle and discarded after submission; the
/// poller never holds more than one at a time.
#[derive(Debug, Clone)]
pub struct Frame {
    /// `data:image/jpeg;base64,...` payload, ready for the recognize endpoint.
    pub data_url: String,
    pub width: u32,
    pub height: u32,
}

/// Bounding box for a detected face, in frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A face returned by the recognition service for one submitted frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedFace {
    /// Matched student name, or [`UNKNOWN_IDENTITY`].
    pub name: String,
    pub bbox: BoundingBox,
    pub confidence: Option<f32>,
}

impl DetectedFace {
    /// True if this face matched an enrolled identity (not the sentinel).
    pub fn is_known(&self) -> bool {
        self.name != UNKNOWN_IDENTITY
    }
}

/// One attendance row as returned by `/api/attendance-all`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub student: String,
    pub date: String,
    pub intime: String,
    pub outtime: String,
}

/// One week of per-day attendance counts, as returned by
/// `/api/weekly-attendance`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyAttendance {
    pub dates: Vec<String>,
    pub counts: Vec<u64>,
}
