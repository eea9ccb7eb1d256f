use tracing::{debug, trace};

use crate::color::{yuv_to_rgba, OPAQUE_WHITE};
use crate::types::{CalibrationConfig, DepthFrame, PointCloud, RAW_DEPTH_MAX};

/// Maps depth(+color) frames onto a pre-allocated [`PointCloud`] using a
/// pinhole camera model.
///
/// One instance per camera session; the calibration and the derived depth
/// window are fixed at construction. Instances hold no per-call state, so a
/// single `Unprojector` may serve several threads as long as each thread
/// brings its own output buffer.
pub struct Unprojector {
    config: CalibrationConfig,
    min_depth: f32,
    max_depth: f32,
}

impl Unprojector {
    pub fn new(config: CalibrationConfig) -> Self {
        let min_depth = config.min_margin;
        let max_depth = RAW_DEPTH_MAX as f32 * config.depth_unit - config.max_margin;
        debug!("valid depth window [{min_depth}, {max_depth}]");
        Self {
            config,
            min_depth,
            max_depth,
        }
    }

    /// Lower bound of the valid depth window, in real-world units.
    ///
    /// The transform never culls by it; consumers that need to drop invalid
    /// points filter against this bound themselves.
    pub fn min_depth(&self) -> f32 {
        self.min_depth
    }

    /// Upper bound of the valid depth window, in real-world units.
    pub fn max_depth(&self) -> f32 {
        self.max_depth
    }

    /// Unproject every depth pixel into `out`, raster order, and set its
    /// used length.
    ///
    /// Each pixel (r, c) becomes `[d*(c - ppx)/fx, -d*(r - ppy)/fy, d]` with
    /// `d = raw * depth_unit`; the y sign flips image-down rows onto the
    /// up-positive 3-D axis. Out-of-range depths (zero included) still emit
    /// their computed position, keeping output index `k` matched to pixel
    /// `(k / width, k % width)` for consumers that mesh over the grid.
    ///
    /// Once `out` is full the rest of the scan is skipped entirely, so a
    /// capacity below `width * height` yields a raster-order prefix of the
    /// frame, not a rectangular crop.
    pub fn unproject(&self, depth: &DepthFrame, out: &mut PointCloud) {
        let samples_per_row = depth.depth_stride / 2;
        debug_assert!(depth.data.len() >= depth.height * samples_per_row);

        let capacity = out.capacity();
        let mut points = 0;

        'scan: for r in 0..depth.height {
            for c in 0..depth.width {
                if points == capacity {
                    break 'scan;
                }

                let d = depth.data[r * samples_per_row + c] as f32 * self.config.depth_unit;

                out.positions[points] = [
                    d * (c as f32 - self.config.ppx) / self.config.fx,
                    -d * (r as f32 - self.config.ppy) / self.config.fy,
                    d,
                ];
                out.colors[points] = match &depth.colors {
                    Some(nv12) => {
                        let (u, v) = nv12.chroma(r, c);
                        yuv_to_rgba(nv12.luma(r, c), u, v)
                    }
                    None => OPAQUE_WHITE,
                };
                points += 1;
            }
        }

        out.used = points;
        trace!(
            "unprojected {points} of {} pixels",
            depth.width * depth.height
        );
    }
}
