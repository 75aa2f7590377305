// THEORY:
// The `BlobDetector` turns one color frame into one answer: "is the target
// visible, and where is its center?"
//
// Algorithm, in the order that determines the result:
// 1.  **Color conversion**: the frame is converted to HSV.
// 2.  **Thresholding**: a pixel is "on" iff all three of its HSV channels lie
//     inside the inclusive bounds.
// 3.  **Denoising**: erode, dilate (open), then dilate, erode (close), each a
//     single pass with the same elliptical structuring element.
// 4.  **Moments**: `m00`, `m10` and `m01` of the cleaned mask.
// 5.  **Decision**: the target is found iff `m00` exceeds the area threshold.
//     The centroid is then `(floor(m10 / m00), floor(m01 / m00))`.
//
// The detector is stateless: no memory of previous frames, no side effects
// beyond allocating the returned mask. Each primitive sits behind its own trait
// so a different vision backend can replace any step.

use crate::core_modules::bounds::ThresholdBounds;
use crate::core_modules::frame::{Frame, Mask};
use crate::core_modules::hsv::{ColorSpaceConverter, RgbToHsv, in_range};
use crate::core_modules::moment::{MomentCalculator, RasterMoments, SpatialMoments};
use crate::core_modules::morphology::{
    DEFAULT_HALF_SIZE, ElementMorphology, MorphologyFilter, denoise,
};

/// Total mask mass (raw 8-bit units) a blob must exceed to count as found.
pub const DEFAULT_MIN_AREA: f64 = 10000.0;

/// Tunable constants of the detector.
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Half-size of the elliptical structuring element, `(x, y)`.
    pub kernel_half_size: (u32, u32),
    /// `m00` must be strictly greater than this for a detection.
    pub min_area: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            kernel_half_size: DEFAULT_HALF_SIZE,
            min_area: DEFAULT_MIN_AREA,
        }
    }
}

/// The outcome of running the detector on one frame.
#[derive(Debug, Clone)]
pub struct DetectionResult {
    pub found: bool,
    /// Centroid column. Zero, and meaningless, unless `found`.
    pub x: i32,
    /// Centroid row. Zero, and meaningless, unless `found`.
    pub y: i32,
    pub moments: RasterMoments,
    /// The cleaned mask, kept for calibration display.
    pub mask: Mask,
}

impl DetectionResult {
    pub fn position(&self) -> Option<(i32, i32)> {
        self.found.then_some((self.x, self.y))
    }
}

pub struct BlobDetector<C = RgbToHsv, F = ElementMorphology, M = SpatialMoments> {
    converter: C,
    filter: F,
    calculator: M,
    min_area: f64,
}

impl BlobDetector {
    pub fn new(config: &DetectorConfig) -> Self {
        let (half_width, half_height) = config.kernel_half_size;
        Self::with_primitives(
            RgbToHsv,
            ElementMorphology::ellipse(half_width, half_height),
            SpatialMoments,
            config.min_area,
        )
    }
}

impl Default for BlobDetector {
    fn default() -> Self {
        Self::new(&DetectorConfig::default())
    }
}

impl<C, F, M> BlobDetector<C, F, M>
where
    C: ColorSpaceConverter,
    F: MorphologyFilter,
    M: MomentCalculator,
{
    pub fn with_primitives(converter: C, filter: F, calculator: M, min_area: f64) -> Self {
        Self {
            converter,
            filter,
            calculator,
            min_area,
        }
    }

    pub fn detect(&self, frame: &Frame, bounds: &ThresholdBounds) -> DetectionResult {
        // --- 1. Color conversion ---
        let hsv = self.converter.to_hsv(frame);

        // --- 2. Threshold ---
        let raw_mask = in_range(&hsv, bounds);

        // --- 3. Open + close ---
        let mask = denoise(&self.filter, &raw_mask);

        // --- 4. Moments ---
        let moments = self.calculator.moments(&mask);

        // --- 5. Decision ---
        let centroid = moments.centroid().filter(|_| moments.m00 > self.min_area);
        if let Some((cx, cy)) = centroid {
            let x = cx.floor() as i32;
            let y = cy.floor() as i32;
            log::debug!("found the target at ({x}, {y}), m00={}", moments.m00);
            DetectionResult {
                found: true,
                x,
                y,
                moments,
                mask,
            }
        } else {
            DetectionResult {
                found: false,
                x: 0,
                y: 0,
                moments,
                mask,
            }
        }
    }
}

/// Runs the default detector once.
pub fn detect(frame: &Frame, bounds: &ThresholdBounds) -> DetectionResult {
    BlobDetector::default().detect(frame, bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    /// Leaves the mask untouched.
    struct NoCleanup;

    impl MorphologyFilter for NoCleanup {
        fn erode(&self, mask: &Mask) -> Mask {
            mask.clone()
        }

        fn dilate(&self, mask: &Mask) -> Mask {
            mask.clone()
        }
    }

    /// Reports the same moments for every mask.
    struct FixedMoments(RasterMoments);

    impl MomentCalculator for FixedMoments {
        fn moments(&self, _mask: &Mask) -> RasterMoments {
            self.0
        }
    }

    fn noise_grid() -> Frame {
        // isolated blue pixels on a grid, each far smaller than the element
        Frame::from_fn(200, 200, |x, y| {
            if x % 7 == 0 && y % 7 == 0 { BLUE } else { BLACK }
        })
    }

    const BLUE: Rgb<u8> = Rgb([0, 0, 255]);
    const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

    fn blue_bounds() -> ThresholdBounds {
        ThresholdBounds::new([110, 100, 100], [130, 255, 255])
    }

    fn disk_frame(width: u32, height: u32, cx: i32, cy: i32, radius: i32) -> Frame {
        Frame::from_fn(width, height, |x, y| {
            let dx = x as i32 - cx;
            let dy = y as i32 - cy;
            if dx * dx + dy * dy <= radius * radius {
                BLUE
            } else {
                BLACK
            }
        })
    }

    #[test]
    fn uniform_frame_inside_widest_bounds_is_found_everywhere() {
        let frame = Frame::from_pixel(64, 48, Rgb([30, 200, 90]));
        let result = detect(&frame, &ThresholdBounds::default());

        assert!(result.found);
        assert_eq!(result.moments.m00, 64.0 * 48.0 * 255.0);
        assert_eq!((result.x, result.y), (31, 23));
        assert_eq!(result.mask.dimensions(), (64, 48));
    }

    #[test]
    fn frame_outside_the_range_is_not_found() {
        let frame = Frame::from_pixel(64, 48, Rgb([255, 0, 0]));
        let result = detect(&frame, &blue_bounds());

        assert!(!result.found);
        assert_eq!((result.x, result.y), (0, 0));
        assert_eq!(result.position(), None);
        assert_eq!(result.moments.m00, 0.0);
        assert!(result.mask.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn blue_disk_centroid_is_recovered() {
        let frame = disk_frame(240, 200, 100, 100, 40);
        let result = detect(&frame, &blue_bounds());

        assert!(result.found);
        let (x, y) = result.position().unwrap();
        assert!((x - 100).abs() <= 2, "x = {x}");
        assert!((y - 100).abs() <= 2, "y = {y}");
    }

    #[test]
    fn blob_below_the_area_threshold_is_ignored() {
        // 6x6 = 36 pixels -> m00 = 9180, under 10000
        let frame = Frame::from_fn(50, 50, |x, y| {
            if (20..26).contains(&x) && (20..26).contains(&y) {
                BLUE
            } else {
                BLACK
            }
        });
        let result = detect(&frame, &blue_bounds());

        assert!(!result.found);
        assert!(result.moments.m00 > 0.0);
        assert_eq!((result.x, result.y), (0, 0));
    }

    #[test]
    fn area_threshold_is_configurable() {
        let frame = Frame::from_fn(50, 50, |x, y| {
            if (20..26).contains(&x) && (20..26).contains(&y) {
                BLUE
            } else {
                BLACK
            }
        });
        let detector = BlobDetector::new(&DetectorConfig {
            min_area: 1000.0,
            ..DetectorConfig::default()
        });
        assert!(detector.detect(&frame, &blue_bounds()).found);
    }

    #[test]
    fn scattered_noise_does_not_trigger_a_detection() {
        let result = detect(&noise_grid(), &blue_bounds());
        assert!(!result.found);
        assert_eq!(result.moments.m00, 0.0);
    }

    #[test]
    fn swapped_filter_changes_what_survives() {
        // 29x29 = 841 specks -> m00 = 214455 once nothing removes them
        let detector =
            BlobDetector::with_primitives(RgbToHsv, NoCleanup, SpatialMoments, DEFAULT_MIN_AREA);
        let result = detector.detect(&noise_grid(), &blue_bounds());

        assert!(result.found);
        assert_eq!(result.moments.m00, 841.0 * 255.0);
        assert_eq!((result.x, result.y), (98, 98));
    }

    #[test]
    fn swapped_calculator_drives_the_decision() {
        let moments = RasterMoments {
            m00: 20000.0,
            m10: 20000.0 * 12.75,
            m01: 20000.0 * 3.2,
        };
        let detector = BlobDetector::with_primitives(
            RgbToHsv,
            ElementMorphology::default(),
            FixedMoments(moments),
            DEFAULT_MIN_AREA,
        );
        // the frame itself matches nothing
        let frame = Frame::from_pixel(32, 32, BLACK);
        let result = detector.detect(&frame, &blue_bounds());

        assert!(result.found);
        assert_eq!(result.position(), Some((12, 3)));
        assert!(result.mask.pixels().all(|p| p.0[0] == 0));
    }

    #[test]
    fn mass_exactly_at_the_threshold_is_not_found() {
        let moments = RasterMoments {
            m00: DEFAULT_MIN_AREA,
            m10: DEFAULT_MIN_AREA * 5.0,
            m01: DEFAULT_MIN_AREA * 5.0,
        };
        let detector = BlobDetector::with_primitives(
            RgbToHsv,
            NoCleanup,
            FixedMoments(moments),
            DEFAULT_MIN_AREA,
        );
        let result = detector.detect(&Frame::from_pixel(8, 8, BLUE), &blue_bounds());
        assert!(!result.found);
        assert_eq!(result.position(), None);
    }
}
