// THEORY:
// Image buffers that flow through one iteration of the main loop. A `Frame` is
// the color image pulled from the camera, a `Mask` is the single-channel
// threshold result. Neither is retained across iterations.
//
// Frames are stored R,G,B. Backends that capture in another channel order
// (OpenCV delivers B,G,R) convert before handing the frame over.

use image::{GrayImage, ImageBuffer, Luma, Rgb, RgbImage};

/// A 3-channel color frame, R,G,B byte order.
pub type Frame = RgbImage;

/// A single-channel binary image: 255 for "on", 0 for "off".
pub type Mask = GrayImage;

/// A 3-channel image whose channels hold hue, saturation and value.
pub type HsvImage = ImageBuffer<Rgb<u8>, Vec<u8>>;

pub const MASK_ON: Luma<u8> = Luma([255]);
pub const MASK_OFF: Luma<u8> = Luma([0]);

pub const MARKER_COLOR: Rgb<u8> = Rgb([255, 255, 255]);

/// Draws a one-pixel square outline spanning `(x, y)` to `(x + size, y + size)`
/// inclusive. Parts that fall outside the frame are clipped.
pub fn draw_marker(frame: &mut Frame, x: i32, y: i32, size: u32, color: Rgb<u8>) {
    let (width, height) = frame.dimensions();
    let size = size as i32;
    let mut plot = |px: i32, py: i32| {
        if px >= 0 && py >= 0 && (px as u32) < width && (py as u32) < height {
            frame.put_pixel(px as u32, py as u32, color);
        }
    };

    for offset in 0..=size {
        plot(x + offset, y);
        plot(x + offset, y + size);
        plot(x, y + offset);
        plot(x + size, y + offset);
    }
}
