use crate::core_modules::config_store::ConfigError;

#[derive(thiserror::Error, Debug)]
pub enum TrackerError {
    #[error("cannot open camera device {index}: {reason}")]
    DeviceOpen { index: i32, reason: String },
    #[error("no frame available")]
    FrameUnavailable,
    #[error("capture failed: {0}")]
    Capture(String),
    #[error("display failed: {0}")]
    Display(String),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
