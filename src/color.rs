//! NV12 plane views and integer YUV to RGB conversion.

use anyhow::ensure;

/// Emitted for every point when a frame carries no color buffer.
pub const OPAQUE_WHITE: u32 = 0xFFFF_FFFF;

#[inline]
fn clip(x: i32) -> u8 {
    x.clamp(0, 255) as u8
}

/// BT.601 studio-range (16-235) YUV to packed RGBA, alpha fixed at 255.
///
/// Fixed-point with i32 intermediates; channels saturate to [0, 255]. The
/// result is little-endian, byte order (R, G, B, A) from the low byte up.
#[inline]
pub fn yuv_to_rgba(y: u8, u: u8, v: u8) -> u32 {
    let c = y as i32 - 16;
    let d = u as i32 - 128;
    let e = v as i32 - 128;

    let r = clip((298 * c + 409 * e + 128) >> 8);
    let g = clip((298 * c - 100 * d - 208 * e + 128) >> 8);
    let b = clip((298 * c + 516 * d + 128) >> 8);

    u32::from_le_bytes([r, g, b, 0xFF])
}

/// Y plane and interleaved UV plane of one packed NV12 buffer.
///
/// The Y plane is `height` rows of `stride` bytes, one per pixel. The UV
/// plane follows immediately: `height / 2` rows of `stride` bytes holding
/// (U, V) byte pairs, each pair covering a 2x2 pixel block. Dimensions are
/// expected to be even, as NV12 subsampling implies.
#[derive(Clone, Copy)]
pub struct Nv12Frame<'a> {
    y: &'a [u8],
    uv: &'a [u8],
    stride: usize,
}

impl<'a> Nv12Frame<'a> {
    /// Split `buf` into the two plane slices, rejecting a buffer shorter
    /// than the declared layout.
    pub fn new(buf: &'a [u8], stride: usize, height: usize) -> anyhow::Result<Self> {
        let y_len = stride * height;
        let uv_len = stride * (height / 2);
        ensure!(
            buf.len() >= y_len + uv_len,
            "NV12 buffer holds {} bytes, need {} for height {} at stride {}",
            buf.len(),
            y_len + uv_len,
            height,
            stride
        );
        Ok(Self {
            y: &buf[..y_len],
            uv: &buf[y_len..y_len + uv_len],
            stride,
        })
    }

    /// Luma sample for pixel (r, c).
    #[inline]
    pub fn luma(&self, r: usize, c: usize) -> u8 {
        self.y[r * self.stride + c]
    }

    /// (U, V) pair of the 2x2 chroma block covering pixel (r, c).
    #[inline]
    pub fn chroma(&self, r: usize, c: usize) -> (u8, u8) {
        let i = (r / 2) * self.stride + (c / 2) * 2;
        (self.uv[i], self.uv[i + 1])
    }
}
