// THEORY:
// The `pipeline` module is the top-level API of the tracker. It owns every
// resource of a session (frame source, display, config store, live bounds) and
// drives the single-threaded loop:
//
//   drain control updates -> grab frame -> detect -> mark -> display -> wait key
//
// The loop is a two-state machine. `Running` repeats the tick above; the quit
// key moves it to `Exiting`, whose only job is to persist the bounds and
// release everything that was acquired at startup.
//
// Failure policy:
// - a malformed config file aborts startup,
// - a missing frame or a failed draw is logged and the tick moves on,
// - a failed save on exit is reported but does not block shutdown.

use crate::calibration::{CONTROLS_WINDOW, CalibrationControls};
use crate::core_modules::blob_detector::{BlobDetector, DetectionResult, DetectorConfig};
use crate::core_modules::bounds::ThresholdBounds;
use crate::core_modules::config_store::{ConfigStore, DEFAULT_CONFIG_PATH};
use crate::core_modules::frame::{Frame, MARKER_COLOR, draw_marker};
use crate::error::TrackerError;
use crate::io::{DisplaySurface, FrameSource};
use std::path::PathBuf;

/// Escape.
pub const DEFAULT_QUIT_KEY: i32 = 27;
pub const DEFAULT_WAIT_MS: i32 = 10;
pub const DEFAULT_MARKER_SIZE: u32 = 20;
pub const TRACKING_WINDOW: &str = "pptracker";

/// Argument value that turns on calibration mode.
pub const CALIBRATE_ARG: &str = "calibrate";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Tracking,
    /// Show the cleaned mask instead of the frame and print bounds each tick.
    Calibration,
}

impl RunMode {
    /// `calibrate` selects calibration mode; anything else, or nothing, tracks.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            Some(CALIBRATE_ARG) => RunMode::Calibration,
            _ => RunMode::Tracking,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Exiting,
}

/// Configuration for the `TrackingPipeline`.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub mode: RunMode,
    pub config_path: PathBuf,
    pub detector: DetectorConfig,
    pub quit_key: i32,
    /// Key-wait timeout per tick; also paces the loop.
    pub wait_ms: i32,
    pub marker_size: u32,
    pub tracking_window: String,
    pub controls_window: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::default(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            detector: DetectorConfig::default(),
            quit_key: DEFAULT_QUIT_KEY,
            wait_ms: DEFAULT_WAIT_MS,
            marker_size: DEFAULT_MARKER_SIZE,
            tracking_window: TRACKING_WINDOW.to_string(),
            controls_window: CONTROLS_WINDOW.to_string(),
        }
    }
}

/// What happened during one tick. Mostly useful to tests and embedders.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub state: LoopState,
    pub detection: Option<DetectionResult>,
    pub updates_applied: usize,
}

pub struct TrackingPipeline<S: FrameSource, D: DisplaySurface> {
    source: S,
    display: D,
    detector: BlobDetector,
    controls: CalibrationControls,
    store: ConfigStore,
    bounds: ThresholdBounds,
    config: PipelineConfig,
    state: LoopState,
    /// True while the source keeps failing, so an outage is logged once.
    source_stalled: bool,
}

impl<S: FrameSource, D: DisplaySurface> TrackingPipeline<S, D> {
    /// Loads the bounds, opens the windows and installs the sliders.
    ///
    /// A config file that exists but does not parse is fatal here.
    pub fn new(source: S, mut display: D, config: PipelineConfig) -> Result<Self, TrackerError> {
        let store = ConfigStore::new(config.config_path.clone());
        let bounds = store.load()?;
        log::info!("starting in {:?} mode with {bounds}", config.mode);

        display.create_window(&config.tracking_window)?;
        display.create_window(&config.controls_window)?;

        let controls = CalibrationControls::new();
        controls.install(&mut display, &config.controls_window, &bounds)?;

        Ok(Self {
            source,
            display,
            detector: BlobDetector::new(&config.detector),
            controls,
            store,
            bounds,
            config,
            state: LoopState::Running,
            source_stalled: false,
        })
    }

    pub fn bounds(&self) -> &ThresholdBounds {
        &self.bounds
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Runs one iteration of the loop.
    pub fn tick(&mut self) -> TickReport {
        if self.state == LoopState::Exiting {
            return TickReport {
                state: self.state,
                detection: None,
                updates_applied: 0,
            };
        }

        // --- 1. Apply slider changes made since the last tick ---
        let updates_applied = self.controls.drain_into(&mut self.bounds);

        // --- 2. Grab, detect, display ---
        let detection = match self.source.grab_next_frame() {
            Ok(frame) => {
                self.source_stalled = false;
                Some(self.process_frame(frame))
            }
            Err(err) => {
                if !self.source_stalled {
                    log::warn!("skipping frame: {err}");
                }
                self.source_stalled = true;
                None
            }
        };

        // --- 3. Key handling paces the loop ---
        match self.display.wait_for_key(self.config.wait_ms) {
            Ok(Some(key)) if key & 0xFF == self.config.quit_key => {
                log::info!("quit key pressed");
                self.state = LoopState::Exiting;
            }
            Ok(_) => {}
            Err(err) => log::warn!("key wait failed: {err}"),
        }

        TickReport {
            state: self.state,
            detection,
            updates_applied,
        }
    }

    fn process_frame(&mut self, mut frame: Frame) -> DetectionResult {
        let result = self.detector.detect(&frame, &self.bounds);

        if let Some((x, y)) = result.position() {
            draw_marker(&mut frame, x, y, self.config.marker_size, MARKER_COLOR);
        }

        let shown = match self.config.mode {
            RunMode::Calibration => {
                println!("{}", self.bounds);
                self.display.show_mask(&self.config.tracking_window, &result.mask)
            }
            RunMode::Tracking => self.display.show_frame(&self.config.tracking_window, &frame),
        };
        if let Err(err) = shown {
            log::warn!("display failed: {err}");
        }

        result
    }

    /// Ticks until the quit key, then shuts down. Returns the final bounds.
    pub fn run(mut self) -> Result<ThresholdBounds, TrackerError> {
        while self.tick().state == LoopState::Running {}
        self.shutdown()
    }

    /// Saves the bounds, releases the source and closes the windows.
    ///
    /// A failed save is logged and does not stop the rest of the teardown; a
    /// failed release is returned after the windows are closed.
    pub fn shutdown(mut self) -> Result<ThresholdBounds, TrackerError> {
        self.state = LoopState::Exiting;

        if let Err(err) = self.store.save(&self.bounds) {
            log::error!("could not save bounds: {err}");
        }

        let released = self.source.release();

        for window in [&self.config.tracking_window, &self.config.controls_window] {
            if let Err(err) = self.display.destroy_window(window) {
                log::warn!("could not close window {window}: {err}");
            }
        }

        released?;
        Ok(self.bounds)
    }
}
