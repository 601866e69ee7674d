//! Shared constants for the model viewer.

/// Annotation and overlay appearance.
pub mod render_settings;

/// Measurement thresholds, unit conversion and label precision.
pub mod measurement;

/// Camera navigation limits and input tolerances.
pub mod navigation;
