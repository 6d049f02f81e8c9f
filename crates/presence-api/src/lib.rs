//! Presence API client — the HTTP face of the remote recognition and
//! attendance service. All computer vision and durable storage live on
//! the other side of these calls.

mod client;
mod wire;

pub use client::{ApiClient, ApiError};
pub use wire::{EnrollRequest, EnrollResponse};
