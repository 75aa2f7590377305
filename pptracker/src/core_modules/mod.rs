pub mod blob_detector;
pub mod bounds;
pub mod config_store;
pub mod frame;
pub mod hsv;
pub mod moment;
pub mod morphology;
