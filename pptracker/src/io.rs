// THEORY:
// The camera and the GUI are external collaborators. The main loop only talks
// to them through these two traits, so the tracking logic runs the same against
// an OpenCV webcam, a recorded clip, or an in-memory fake in tests.
//
// Opening a device is left to the concrete type's constructor: a source that
// exists is a source that opened.

use crate::core_modules::frame::{Frame, Mask};
use crate::error::TrackerError;

/// Change handler attached to a slider control. Receives the new position.
pub type ControlCallback = Box<dyn FnMut(i32) + Send + Sync + 'static>;

pub trait FrameSource {
    /// Returns the next frame, or `TrackerError::FrameUnavailable` when the
    /// device had nothing to deliver this time.
    fn grab_next_frame(&mut self) -> Result<Frame, TrackerError>;

    /// Releases the device. Called once on the exit path.
    fn release(&mut self) -> Result<(), TrackerError>;
}

pub trait DisplaySurface {
    fn create_window(&mut self, name: &str) -> Result<(), TrackerError>;

    fn show_frame(&mut self, window: &str, frame: &Frame) -> Result<(), TrackerError>;

    fn show_mask(&mut self, window: &str, mask: &Mask) -> Result<(), TrackerError>;

    /// Adds a slider with range `0..=max` starting at `initial`.
    fn create_control(
        &mut self,
        window: &str,
        name: &str,
        initial: i32,
        max: i32,
        on_change: ControlCallback,
    ) -> Result<(), TrackerError>;

    /// Blocks for up to `timeout_ms` and returns the pressed key, if any.
    fn wait_for_key(&mut self, timeout_ms: i32) -> Result<Option<i32>, TrackerError>;

    fn destroy_window(&mut self, name: &str) -> Result<(), TrackerError>;
}
