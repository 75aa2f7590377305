// THEORY:
// Color identity is tested in HSV rather than RGB because hue stays roughly
// constant under lighting changes while brightness moves into its own channel.
//
// The conversion reproduces the usual 8-bit vision-library convention so that
// thresholds calibrated here transfer to other tools unchanged:
// - value is the largest channel,
// - saturation is 255 * chroma / value, rounded,
// - hue is the sector-based angle in degrees halved to fit a byte, giving
//   [0, 179]; rounding is half-up and negative angles wrap by +180.
//
// The per-pixel math is single-pixel scope only: no neighbors, no history.

use crate::core_modules::bounds::ThresholdBounds;
use crate::core_modules::frame::{Frame, HsvImage, MASK_OFF, MASK_ON, Mask};
use image::Rgb;

/// Converts a color frame into an HSV image of the same size.
pub trait ColorSpaceConverter {
    fn to_hsv(&self, frame: &Frame) -> HsvImage;
}

/// The default converter: 8-bit RGB to 8-bit HSV.
#[derive(Debug, Clone, Copy, Default)]
pub struct RgbToHsv;

impl ColorSpaceConverter for RgbToHsv {
    fn to_hsv(&self, frame: &Frame) -> HsvImage {
        let (width, height) = frame.dimensions();
        let mut hsv = HsvImage::new(width, height);
        for (source, target) in frame.pixels().zip(hsv.pixels_mut()) {
            let [red, green, blue] = source.0;
            *target = Rgb(rgb_to_hsv(red, green, blue));
        }
        hsv
    }
}

/// Converts one 8-bit RGB pixel into `[hue, saturation, value]`.
pub fn rgb_to_hsv(red: u8, green: u8, blue: u8) -> [u8; 3] {
    let (r, g, b) = (i32::from(red), i32::from(green), i32::from(blue));
    let value = r.max(g).max(b);
    let minimum = r.min(g).min(b);
    let chroma = value - minimum;

    let saturation = if value == 0 {
        0
    } else {
        round_half_up(f64::from(chroma * 255) / f64::from(value))
    };

    if chroma == 0 {
        return [0, saturation as u8, value as u8];
    }

    // Sector numerators in units of chroma/6 of the full circle.
    let numerator = if value == r {
        g - b
    } else if value == g {
        (b - r) + 2 * chroma
    } else {
        (r - g) + 4 * chroma
    };

    let mut hue = round_half_up(f64::from(numerator) * 30.0 / f64::from(chroma));
    if hue < 0 {
        hue += 180;
    }

    [hue as u8, saturation as u8, value as u8]
}

#[inline]
fn round_half_up(x: f64) -> i32 {
    (x + 0.5).floor() as i32
}

/// Builds the binary mask of pixels whose HSV triple lies inside `bounds`.
pub fn in_range(hsv: &HsvImage, bounds: &ThresholdBounds) -> Mask {
    let (width, height) = hsv.dimensions();
    let mut mask = Mask::new(width, height);
    for (source, target) in hsv.pixels().zip(mask.pixels_mut()) {
        *target = if bounds.contains(source.0) {
            MASK_ON
        } else {
            MASK_OFF
        };
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primaries_land_on_their_sector_starts() {
        assert_eq!(rgb_to_hsv(255, 0, 0), [0, 255, 255]);
        assert_eq!(rgb_to_hsv(0, 255, 0), [60, 255, 255]);
        assert_eq!(rgb_to_hsv(0, 0, 255), [120, 255, 255]);
    }

    #[test]
    fn secondaries_land_between_sectors() {
        assert_eq!(rgb_to_hsv(255, 255, 0), [30, 255, 255]);
        assert_eq!(rgb_to_hsv(0, 255, 255), [90, 255, 255]);
        assert_eq!(rgb_to_hsv(255, 0, 255), [150, 255, 255]);
    }

    #[test]
    fn greys_have_no_hue_or_saturation() {
        assert_eq!(rgb_to_hsv(0, 0, 0), [0, 0, 0]);
        assert_eq!(rgb_to_hsv(128, 128, 128), [0, 0, 128]);
        assert_eq!(rgb_to_hsv(255, 255, 255), [0, 0, 255]);
    }

    #[test]
    fn reddish_magenta_wraps_to_the_top_of_the_hue_range() {
        // Red is the max and blue just exceeds green: a small negative angle.
        let [hue, _, _] = rgb_to_hsv(255, 0, 20);
        assert_eq!(hue, 178);
    }

    #[test]
    fn saturation_is_rounded() {
        // chroma 100 over value 200: 127.5 rounds up.
        assert_eq!(rgb_to_hsv(200, 100, 100)[1], 128);
    }

    #[test]
    fn converter_preserves_dimensions() {
        let frame = Frame::from_pixel(7, 3, Rgb([0, 0, 255]));
        let hsv = RgbToHsv.to_hsv(&frame);
        assert_eq!(hsv.dimensions(), (7, 3));
        assert!(hsv.pixels().all(|p| p.0 == [120, 255, 255]));
    }

    #[test]
    fn in_range_marks_only_matching_pixels() {
        let mut frame = Frame::from_pixel(4, 1, Rgb([0, 0, 0]));
        frame.put_pixel(1, 0, Rgb([0, 0, 255]));
        frame.put_pixel(3, 0, Rgb([255, 0, 0]));
        let hsv = RgbToHsv.to_hsv(&frame);

        let blue = ThresholdBounds::new([110, 100, 100], [130, 255, 255]);
        let mask = in_range(&hsv, &blue);
        let values: Vec<u8> = mask.pixels().map(|p| p.0[0]).collect();
        assert_eq!(values, vec![0, 255, 0, 0]);
    }
}
