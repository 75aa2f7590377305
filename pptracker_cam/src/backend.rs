// OpenCV implementations of the pptracker frame source and display traits.
//
// OpenCV hands out B,G,R `Mat`s while pptracker works on R,G,B `image`
// buffers, so every frame crossing this boundary goes through `cvt_color`.

use opencv::{
    core::{self, Mat, Scalar},
    highgui, imgproc,
    prelude::*,
    videoio::{self, VideoCapture},
};
use pptracker::{ControlCallback, DisplaySurface, Frame, FrameSource, Mask, TrackerError};

fn capture_error(err: opencv::Error) -> TrackerError {
    TrackerError::Capture(err.to_string())
}

fn display_error(err: opencv::Error) -> TrackerError {
    TrackerError::Display(err.to_string())
}

/// A webcam opened through `videoio`.
pub struct OpenCvCamera {
    capture: VideoCapture,
    index: i32,
}

impl OpenCvCamera {
    pub fn open(index: i32) -> Result<Self, TrackerError> {
        let device_error = |reason: String| TrackerError::DeviceOpen { index, reason };

        let capture = VideoCapture::new(index, videoio::CAP_ANY)
            .map_err(|err| device_error(err.to_string()))?;
        let opened = capture
            .is_opened()
            .map_err(|err| device_error(err.to_string()))?;
        if !opened {
            return Err(device_error("device did not open".to_string()));
        }

        log::info!("opened camera {index}");
        Ok(Self { capture, index })
    }
}

impl FrameSource for OpenCvCamera {
    fn grab_next_frame(&mut self) -> Result<Frame, TrackerError> {
        let mut bgr = Mat::default();
        let grabbed = self.capture.read(&mut bgr).map_err(capture_error)?;
        if !grabbed || bgr.empty() {
            return Err(TrackerError::FrameUnavailable);
        }
        mat_to_frame(&bgr).map_err(capture_error)?.ok_or_else(|| {
            TrackerError::Capture(format!("camera {} delivered a malformed frame", self.index))
        })
    }

    fn release(&mut self) -> Result<(), TrackerError> {
        self.capture.release().map_err(capture_error)?;
        log::info!("released camera {}", self.index);
        Ok(())
    }
}

impl Drop for OpenCvCamera {
    fn drop(&mut self) {
        // Releasing twice is a no-op in videoio.
        let _ = self.capture.release();
    }
}

/// Converts a B,G,R `Mat` into an R,G,B frame. `None` if the sizes disagree.
fn mat_to_frame(bgr: &Mat) -> opencv::Result<Option<Frame>> {
    let mut rgb = Mat::default();
    imgproc::cvt_color(bgr, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;
    let size = rgb.size()?;
    let data = rgb.data_bytes()?.to_vec();
    Ok(Frame::from_raw(size.width as u32, size.height as u32, data))
}

fn frame_to_mat(frame: &Frame) -> opencv::Result<Mat> {
    let (width, height) = frame.dimensions();
    let mut rgb = Mat::new_rows_cols_with_default(
        height as i32,
        width as i32,
        core::CV_8UC3,
        Scalar::all(0.0),
    )?;
    rgb.data_bytes_mut()?.copy_from_slice(frame.as_raw());

    let mut bgr = Mat::default();
    imgproc::cvt_color(&rgb, &mut bgr, imgproc::COLOR_RGB2BGR, 0)?;
    Ok(bgr)
}

fn mask_to_mat(mask: &Mask) -> opencv::Result<Mat> {
    let (width, height) = mask.dimensions();
    let mut gray = Mat::new_rows_cols_with_default(
        height as i32,
        width as i32,
        core::CV_8UC1,
        Scalar::all(0.0),
    )?;
    gray.data_bytes_mut()?.copy_from_slice(mask.as_raw());
    Ok(gray)
}

/// HighGUI windows and trackbars.
#[derive(Debug, Default)]
pub struct HighGuiDisplay;

impl DisplaySurface for HighGuiDisplay {
    fn create_window(&mut self, name: &str) -> Result<(), TrackerError> {
        highgui::named_window(name, highgui::WINDOW_AUTOSIZE).map_err(display_error)
    }

    fn show_frame(&mut self, window: &str, frame: &Frame) -> Result<(), TrackerError> {
        let mat = frame_to_mat(frame).map_err(display_error)?;
        highgui::imshow(window, &mat).map_err(display_error)
    }

    fn show_mask(&mut self, window: &str, mask: &Mask) -> Result<(), TrackerError> {
        let mat = mask_to_mat(mask).map_err(display_error)?;
        highgui::imshow(window, &mat).map_err(display_error)
    }

    fn create_control(
        &mut self,
        window: &str,
        name: &str,
        initial: i32,
        max: i32,
        on_change: ControlCallback,
    ) -> Result<(), TrackerError> {
        highgui::create_trackbar(name, window, None, max, Some(on_change))
            .map_err(display_error)?;
        highgui::set_trackbar_pos(name, window, initial).map_err(display_error)
    }

    fn wait_for_key(&mut self, timeout_ms: i32) -> Result<Option<i32>, TrackerError> {
        let key = highgui::wait_key(timeout_ms).map_err(display_error)?;
        Ok((key >= 0).then_some(key))
    }

    fn destroy_window(&mut self, name: &str) -> Result<(), TrackerError> {
        highgui::destroy_window(name).map_err(display_error)
    }
}
