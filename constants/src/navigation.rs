pub const DEFAULT_MODEL_PATH: &str = "models/model.glb";
pub const CONFIG_PATH: &str = "config/default.viewer.json";

pub const ORBIT_SENSITIVITY: f32 = 0.005;
pub const PAN_SENSITIVITY: f32 = 0.0015;
pub const DOLLY_SENSITIVITY: f32 = 0.01;
pub const WHEEL_ZOOM_STEP: f32 = 0.1;

pub const MIN_CAMERA_DISTANCE: f32 = 0.05;
pub const MAX_CAMERA_DISTANCE: f32 = 1000.0;

/// Keeps the orbit away from the poles where `looking_at` flips.
pub const MAX_PITCH: f32 = 1.5;

/// A left press released within this many logical pixels counts as a click rather than a drag.
pub const CLICK_DRAG_TOLERANCE: f32 = 4.0;
