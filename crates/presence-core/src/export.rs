//! Attendance CSV export.

use crate::types::AttendanceRecord;

const CSV_HEADER: &str = "Name,Date,In Time,Out Time";

/// Render attendance records as `Name,Date,In Time,Out Time` rows.
///
/// Lines are newline-joined with no trailing newline, matching the
/// format the dashboard has always exported.
pub fn attendance_csv(records: &[AttendanceRecord]) -> String {
    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(CSV_HEADER.to_string());
    for r in records {
        lines.push(format!("{},{},{},{}", r.student, r.date, r.intime, r.outtime));
    }
    lines.join("\n")
}
