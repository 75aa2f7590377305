// THEORY:
// Calibration is six sliders, one per threshold bound. Slider callbacks run
// inside the GUI toolkit's event pump, so they must not touch the live bounds
// directly. Each callback only sends a `BoundUpdate` down a channel. The main
// loop drains the channel at the start of every tick, before detection, which
// gives exactly one writer per tick and no shared mutable aliasing.

use crate::core_modules::bounds::{BoundField, BoundUpdate, ThresholdBounds};
use crate::error::TrackerError;
use crate::io::DisplaySurface;
use std::sync::mpsc::{self, Receiver, Sender};

pub const CONTROLS_WINDOW: &str = "Controls";

pub struct CalibrationControls {
    sender: Sender<BoundUpdate>,
    receiver: Receiver<BoundUpdate>,
}

impl CalibrationControls {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self { sender, receiver }
    }

    /// Creates one slider per field on `window`, initialised from `bounds`.
    pub fn install<D>(
        &self,
        display: &mut D,
        window: &str,
        bounds: &ThresholdBounds,
    ) -> Result<(), TrackerError>
    where
        D: DisplaySurface + ?Sized,
    {
        for field in BoundField::ALL {
            let sender = self.sender.clone();
            display.create_control(
                window,
                field.name(),
                i32::from(bounds.get(field)),
                i32::from(field.max()),
                Box::new(move |position| {
                    // The receiver lives as long as the pipeline; a failed send
                    // only happens during teardown.
                    let _ = sender.send(BoundUpdate::from_position(field, position));
                }),
            )?;
        }
        Ok(())
    }

    /// Applies every pending update to `bounds`. Returns how many were applied.
    pub fn drain_into(&self, bounds: &mut ThresholdBounds) -> usize {
        let mut applied = 0;
        for update in self.receiver.try_iter() {
            bounds.apply(update);
            applied += 1;
        }
        applied
    }
}

impl Default for CalibrationControls {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::frame::{Frame, Mask};
    use crate::io::ControlCallback;

    #[derive(Default)]
    struct SliderPanel {
        sliders: Vec<(String, String, i32, i32, ControlCallback)>,
    }

    impl SliderPanel {
        fn drag(&mut self, name: &str, position: i32) {
            let slider = self
                .sliders
                .iter_mut()
                .find(|s| s.1 == name)
                .expect("slider exists");
            (slider.4)(position);
        }
    }

    impl DisplaySurface for SliderPanel {
        fn create_window(&mut self, _name: &str) -> Result<(), TrackerError> {
            Ok(())
        }
        fn show_frame(&mut self, _window: &str, _frame: &Frame) -> Result<(), TrackerError> {
            Ok(())
        }
        fn show_mask(&mut self, _window: &str, _mask: &Mask) -> Result<(), TrackerError> {
            Ok(())
        }
        fn create_control(
            &mut self,
            window: &str,
            name: &str,
            initial: i32,
            max: i32,
            on_change: ControlCallback,
        ) -> Result<(), TrackerError> {
            self.sliders
                .push((window.to_string(), name.to_string(), initial, max, on_change));
            Ok(())
        }
        fn wait_for_key(&mut self, _timeout_ms: i32) -> Result<Option<i32>, TrackerError> {
            Ok(None)
        }
        fn destroy_window(&mut self, _name: &str) -> Result<(), TrackerError> {
            Ok(())
        }
    }

    #[test]
    fn install_creates_six_sliders_with_ranges_and_initial_values() {
        let controls = CalibrationControls::new();
        let mut panel = SliderPanel::default();
        let bounds = ThresholdBounds::new([10, 20, 30], [140, 250, 240]);
        controls.install(&mut panel, CONTROLS_WINDOW, &bounds).unwrap();

        let summary: Vec<(&str, i32, i32)> = panel
            .sliders
            .iter()
            .map(|s| (s.1.as_str(), s.2, s.3))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("LowH", 10, 179),
                ("LowS", 20, 255),
                ("LowV", 30, 255),
                ("HighH", 140, 179),
                ("HighS", 250, 255),
                ("HighV", 240, 255),
            ]
        );
        assert!(panel.sliders.iter().all(|s| s.0 == CONTROLS_WINDOW));
    }

    #[test]
    fn slider_moves_reach_the_bounds_only_when_drained() {
        let controls = CalibrationControls::new();
        let mut panel = SliderPanel::default();
        let mut bounds = ThresholdBounds::default();
        controls.install(&mut panel, CONTROLS_WINDOW, &bounds).unwrap();

        panel.drag("LowH", 100);
        panel.drag("HighS", 200);
        panel.drag("LowH", 105);
        assert_eq!(bounds, ThresholdBounds::default());

        assert_eq!(controls.drain_into(&mut bounds), 3);
        assert_eq!(bounds.low_h, 105);
        assert_eq!(bounds.high_s, 200);
        assert_eq!(controls.drain_into(&mut bounds), 0);
    }

    #[test]
    fn low_may_exceed_high() {
        let controls = CalibrationControls::new();
        let mut panel = SliderPanel::default();
        let mut bounds = ThresholdBounds::default();
        controls.install(&mut panel, CONTROLS_WINDOW, &bounds).unwrap();

        panel.drag("HighV", 10);
        panel.drag("LowV", 200);
        controls.drain_into(&mut bounds);
        assert_eq!((bounds.low_v, bounds.high_v), (200, 10));
    }
}
