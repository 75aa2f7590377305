// THEORY:
// This file is the main entry point for the `pptracker` library crate. It
// exposes the tracking pipeline and the data types around it as the public
// API, so a front-end only has to supply a camera and a window toolkit.
//
// - `core_modules` holds the vision primitives and the stateless blob detector.
// - `calibration` binds slider controls to the threshold bounds.
// - `io` defines the frame source and display traits a front-end implements.
// - `pipeline` is the single-threaded main loop that ties it all together.

pub mod calibration;
pub mod core_modules;
pub mod error;
pub mod io;
pub mod pipeline;

pub use core_modules::blob_detector::{BlobDetector, DetectionResult, DetectorConfig, detect};
pub use core_modules::bounds::{BoundField, BoundUpdate, ThresholdBounds};
pub use core_modules::config_store::{ConfigError, ConfigStore};
pub use core_modules::frame::{Frame, Mask};
pub use error::TrackerError;
pub use io::{ControlCallback, DisplaySurface, FrameSource};
pub use pipeline::{LoopState, PipelineConfig, RunMode, TrackingPipeline};
