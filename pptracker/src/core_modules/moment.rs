// THEORY:
// Raster moments summarize a mask as a handful of weighted sums. The tracker
// only needs the first three:
// - `m00`: total mass, the sum of all pixel values,
// - `m10`: sum of x weighted by pixel value,
// - `m01`: sum of y weighted by pixel value.
// The centroid of everything that survived thresholding is then
// `(m10 / m00, m01 / m00)`.
//
// Weights are the raw 8-bit pixel values, so an "on" pixel contributes 255 to
// `m00`. Thresholds on `m00` are expressed in those raw units.

use crate::core_modules::frame::Mask;

/// Zeroth and first order raster moments of a mask.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RasterMoments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl RasterMoments {
    /// The intensity-weighted centroid, or `None` for an empty mask.
    pub fn centroid(&self) -> Option<(f64, f64)> {
        if self.m00 == 0.0 {
            return None;
        }
        Some((self.m10 / self.m00, self.m01 / self.m00))
    }
}

pub trait MomentCalculator {
    fn moments(&self, mask: &Mask) -> RasterMoments;
}

/// Straight per-pixel accumulation.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpatialMoments;

impl MomentCalculator for SpatialMoments {
    fn moments(&self, mask: &Mask) -> RasterMoments {
        let mut moments = RasterMoments::default();
        for (x, y, pixel) in mask.enumerate_pixels() {
            let weight = f64::from(pixel.0[0]);
            if weight == 0.0 {
                continue;
            }
            moments.m00 += weight;
            moments.m10 += f64::from(x) * weight;
            moments.m01 += f64::from(y) * weight;
        }
        moments
    }
}
