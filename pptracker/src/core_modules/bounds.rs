// THEORY:
// `ThresholdBounds` is the only long-lived mutable state in the tracker. It is a
// "dumb" data container for the six HSV limits the blob detector tests every
// pixel against. Everything else in the system either reads it (the detector,
// the console print in calibration mode) or proposes changes to it (the
// calibration controls, the config store).
//
// Changes never reach the bounds directly from a widget callback. A control
// emits a `BoundUpdate` naming the field it owns and its new position; the main
// loop applies all pending updates once per tick before detection. That keeps a
// single writer per tick without any shared aliasing.
//
// The on-disk field names are part of the config file format, so the serde
// renames here must stay stable.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Largest hue value produced by the 8-bit HSV conversion.
pub const HUE_MAX: u8 = 179;
/// Largest saturation or value channel value.
pub const CHANNEL_MAX: u8 = 255;

/// Accepts any JSON number in `0..=255`; fractional values are truncated.
fn bound_value<'de, D>(deserializer: D) -> Result<u8, D::Error>
where
    D: Deserializer<'de>,
{
    let value = f64::deserialize(deserializer)?;
    if !(0.0..=f64::from(CHANNEL_MAX)).contains(&value) {
        return Err(D::Error::custom(format!(
            "bound {value} is outside 0..={CHANNEL_MAX}"
        )));
    }
    Ok(value as u8)
}

/// The six inclusive HSV limits used to build the threshold mask.
///
/// `low <= high` per channel is expected but not enforced. A record that is
/// missing a field decodes that field as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThresholdBounds {
    #[serde(rename = "LowH", alias = "lowH", default, deserialize_with = "bound_value")]
    pub low_h: u8,
    #[serde(rename = "LowS", alias = "lowS", default, deserialize_with = "bound_value")]
    pub low_s: u8,
    #[serde(rename = "LowV", alias = "lowV", default, deserialize_with = "bound_value")]
    pub low_v: u8,
    #[serde(rename = "HighH", alias = "highH", default, deserialize_with = "bound_value")]
    pub high_h: u8,
    #[serde(rename = "HighS", alias = "highS", default, deserialize_with = "bound_value")]
    pub high_s: u8,
    #[serde(rename = "HighV", alias = "highV", default, deserialize_with = "bound_value")]
    pub high_v: u8,
}

impl Default for ThresholdBounds {
    /// The widest possible range: every pixel passes.
    fn default() -> Self {
        Self {
            low_h: 0,
            low_s: 0,
            low_v: 0,
            high_h: HUE_MAX,
            high_s: CHANNEL_MAX,
            high_v: CHANNEL_MAX,
        }
    }
}

impl ThresholdBounds {
    pub fn new(lower: [u8; 3], upper: [u8; 3]) -> Self {
        Self {
            low_h: lower[0],
            low_s: lower[1],
            low_v: lower[2],
            high_h: upper[0],
            high_s: upper[1],
            high_v: upper[2],
        }
    }

    /// Lower limits as `[h, s, v]`.
    pub fn lower(&self) -> [u8; 3] {
        [self.low_h, self.low_s, self.low_v]
    }

    /// Upper limits as `[h, s, v]`.
    pub fn upper(&self) -> [u8; 3] {
        [self.high_h, self.high_s, self.high_v]
    }

    /// True when every channel of `hsv` lies inside its inclusive range.
    #[inline]
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        (self.low_h..=self.high_h).contains(&hsv[0])
            && (self.low_s..=self.high_s).contains(&hsv[1])
            && (self.low_v..=self.high_v).contains(&hsv[2])
    }

    pub fn get(&self, field: BoundField) -> u8 {
        match field {
            BoundField::LowH => self.low_h,
            BoundField::LowS => self.low_s,
            BoundField::LowV => self.low_v,
            BoundField::HighH => self.high_h,
            BoundField::HighS => self.high_s,
            BoundField::HighV => self.high_v,
        }
    }

    pub fn set(&mut self, field: BoundField, value: u8) {
        let slot = match field {
            BoundField::LowH => &mut self.low_h,
            BoundField::LowS => &mut self.low_s,
            BoundField::LowV => &mut self.low_v,
            BoundField::HighH => &mut self.high_h,
            BoundField::HighS => &mut self.high_s,
            BoundField::HighV => &mut self.high_v,
        };
        *slot = value;
    }

    pub fn apply(&mut self, update: BoundUpdate) {
        self.set(update.field, update.value);
    }
}

impl fmt::Display for ThresholdBounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Low=({}, {}, {}) High=({}, {}, {})",
            self.low_h, self.low_s, self.low_v, self.high_h, self.high_s, self.high_v
        )
    }
}

/// Names one of the six fields of `ThresholdBounds`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundField {
    LowH,
    LowS,
    LowV,
    HighH,
    HighS,
    HighV,
}

impl BoundField {
    /// Every field, in control-creation order.
    pub const ALL: [BoundField; 6] = [
        BoundField::LowH,
        BoundField::LowS,
        BoundField::LowV,
        BoundField::HighH,
        BoundField::HighS,
        BoundField::HighV,
    ];

    /// The label used for the control and the config key.
    pub fn name(self) -> &'static str {
        match self {
            BoundField::LowH => "LowH",
            BoundField::LowS => "LowS",
            BoundField::LowV => "LowV",
            BoundField::HighH => "HighH",
            BoundField::HighS => "HighS",
            BoundField::HighV => "HighV",
        }
    }

    /// Upper end of the control range. Hue stops at 179, the others at 255.
    pub fn max(self) -> u8 {
        match self {
            BoundField::LowH | BoundField::HighH => HUE_MAX,
            _ => CHANNEL_MAX,
        }
    }
}

/// A single control change: "set `field` to `value`".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundUpdate {
    pub field: BoundField,
    pub value: u8,
}

impl BoundUpdate {
    /// Converts a raw widget position, clamping it to the field's range.
    pub fn from_position(field: BoundField, position: i32) -> Self {
        let value = position.clamp(0, i32::from(field.max())) as u8;
        Self { field, value }
    }
}
