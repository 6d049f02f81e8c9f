//! Presence hardware abstraction — bridges the local V4L2 camera to the
//! encoded still frames the recognition loop submits.

pub mod camera;
pub mod frame;

pub use camera::{CameraError, CameraSource, DeviceInfo};
pub use frame::RawFrame;
