//! Depth-camera frames to 3-D point clouds.
//!
//! One [`Unprojector`] per camera session holds the calibration; each call
//! to [`Unprojector::unproject`] turns a [`DepthFrame`] (raw 16-bit depth,
//! optionally paired with an NV12 color buffer) into positions and packed
//! RGBA colors inside a caller-owned, reusable [`PointCloud`]. The transform
//! is a plain synchronous CPU loop with no allocation, sized for the stage
//! between a camera driver and a renderer.

mod color;
mod types;
mod unproject;

pub use color::{yuv_to_rgba, Nv12Frame, OPAQUE_WHITE};
pub use types::{CalibrationConfig, DepthFrame, PointCloud, RAW_DEPTH_MAX};
pub use unproject::Unprojector;
