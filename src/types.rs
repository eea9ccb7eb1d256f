use anyhow::ensure;
use bytemuck::cast_slice;
use nalgebra::Point3;
use serde::Deserialize;
use serde::Serialize;

use crate::color::Nv12Frame;

/// Largest raw depth sample: the top 10 bits carry data, the low 6 bits are
/// reserved padding, so valid samples are multiples of 64 up to this value.
pub const RAW_DEPTH_MAX: u16 = 0xFFC0;

/// Pinhole intrinsics plus depth decoding parameters for one camera session.
///
/// All values are assumed sane by the caller; no range checking is done here.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct CalibrationConfig {
    /// Principal point, pixels.
    pub ppx: f32,
    pub ppy: f32,
    /// Focal lengths, pixel units.
    pub fx: f32,
    pub fy: f32,
    /// Real-world distance per raw depth unit (e.g. metres per unit).
    pub depth_unit: f32,
    /// Margins shaving the usable ends off the representable depth range.
    pub min_margin: f32,
    pub max_margin: f32,
}

/// Borrowed view of one captured depth frame, optionally paired with an
/// NV12 color frame covering the same pixel grid.
///
/// The fields are public so a capture stage that already guarantees the
/// layout can build the view directly; [`DepthFrame::new`] checks it.
#[derive(Clone, Copy)]
pub struct DepthFrame<'a> {
    pub width: usize,
    pub height: usize,
    /// Byte stride between depth rows; samples are 2 bytes wide.
    pub depth_stride: usize,
    /// `height` rows of `depth_stride / 2` samples, row-major.
    pub data: &'a [u16],
    pub colors: Option<Nv12Frame<'a>>,
}

impl<'a> DepthFrame<'a> {
    pub fn new(
        width: usize,
        height: usize,
        depth_stride: usize,
        data: &'a [u16],
    ) -> anyhow::Result<Self> {
        ensure!(
            depth_stride / 2 >= width,
            "depth stride {} bytes is too small for width {}",
            depth_stride,
            width
        );
        ensure!(
            data.len() >= height * (depth_stride / 2),
            "depth buffer holds {} samples, need {} for {}x{} at stride {}",
            data.len(),
            height * (depth_stride / 2),
            width,
            height,
            depth_stride
        );
        Ok(Self {
            width,
            height,
            depth_stride,
            data,
            colors: None,
        })
    }

    /// Attach a packed NV12 color buffer; `color_stride` is the Y-plane byte
    /// stride (the UV plane inherits it).
    pub fn with_colors(mut self, buf: &'a [u8], color_stride: usize) -> anyhow::Result<Self> {
        ensure!(
            color_stride >= self.width,
            "color stride {} is too small for width {}",
            color_stride,
            self.width
        );
        self.colors = Some(Nv12Frame::new(buf, color_stride, self.height)?);
        Ok(self)
    }
}

/// Caller-owned output buffer, allocated once and reused across frames.
///
/// The transform fills a prefix of the backing storage and records its
/// length in `used`; it never reallocates. Positions and colors stay
/// index-aligned, so entry `k` of both belongs to the same source pixel.
pub struct PointCloud {
    pub(crate) positions: Vec<[f32; 3]>,
    pub(crate) colors: Vec<u32>,
    pub(crate) used: usize,
}

impl PointCloud {
    /// Allocate backing storage for `capacity` points, zero-filled.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: vec![[0.0; 3]; capacity],
            colors: vec![0; capacity],
            used: 0,
        }
    }

    /// Maximum number of points one transform call can write.
    pub fn capacity(&self) -> usize {
        self.positions.len()
    }

    /// Number of points written by the most recent transform.
    pub fn len(&self) -> usize {
        self.used
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// Positions written by the most recent transform, raster order.
    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions[..self.used]
    }

    /// Packed little-endian RGBA colors, aligned 1:1 with `positions()`.
    pub fn colors(&self) -> &[u32] {
        &self.colors[..self.used]
    }

    /// Zero-copy byte view of the valid positions, for renderer upload.
    pub fn position_bytes(&self) -> &[u8] {
        cast_slice(&self.positions[..self.used])
    }

    /// Zero-copy byte view of the valid colors.
    pub fn color_bytes(&self) -> &[u8] {
        cast_slice(&self.colors[..self.used])
    }

    /// The valid points as nalgebra geometry.
    pub fn points(&self) -> impl Iterator<Item = Point3<f32>> + '_ {
        self.positions[..self.used]
            .iter()
            .map(|&[x, y, z]| Point3::new(x, y, z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_undersized_depth_buffer() {
        let raw = [0u16; 3];
        assert!(DepthFrame::new(2, 2, 4, &raw).is_err());
    }

    #[test]
    fn rejects_stride_narrower_than_width() {
        let raw = [0u16; 16];
        assert!(DepthFrame::new(4, 2, 4, &raw).is_err());
    }

    #[test]
    fn rejects_undersized_color_buffer() {
        let raw = [0u16; 4];
        let colors = [0u8; 5]; // 2x2 NV12 needs 6 bytes at stride 2
        let frame = DepthFrame::new(2, 2, 4, &raw).unwrap();
        assert!(frame.with_colors(&colors, 2).is_err());
    }

    #[test]
    fn accessors_cover_the_used_prefix() {
        let mut cloud = PointCloud::with_capacity(3);
        cloud.positions[0] = [1.0, 2.0, 3.0];
        cloud.positions[1] = [4.0, 5.0, 6.0];
        cloud.colors[0] = 0xAABBCCDD;
        cloud.used = 2;

        assert_eq!(cloud.capacity(), 3);
        assert_eq!(cloud.len(), 2);
        assert_eq!(cloud.positions().len(), 2);
        assert_eq!(cloud.colors().len(), 2);
        assert_eq!(cloud.position_bytes().len(), 2 * 3 * 4);
        assert_eq!(cloud.color_bytes().len(), 2 * 4);

        let pts: Vec<Point3<f32>> = cloud.points().collect();
        assert_eq!(
            pts,
            vec![Point3::new(1.0, 2.0, 3.0), Point3::new(4.0, 5.0, 6.0)]
        );
    }
}
