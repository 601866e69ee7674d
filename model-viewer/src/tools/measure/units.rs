use constants::measurement::{AREA_SCALE, AREA_SUFFIX, LABEL_DECIMALS, LENGTH_SCALE, LENGTH_SUFFIX};
use serde::{Deserialize, Serialize};

/// Conversion from scene units to the units shown in labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementUnits {
    pub length_scale: f32,
    pub length_suffix: String,
    pub area_scale: f32,
    pub area_suffix: String,
    pub decimals: usize,
}

impl Default for MeasurementUnits {
    fn default() -> Self {
        Self {
            length_scale: LENGTH_SCALE,
            length_suffix: LENGTH_SUFFIX.to_string(),
            area_scale: AREA_SCALE,
            area_suffix: AREA_SUFFIX.to_string(),
            decimals: LABEL_DECIMALS,
        }
    }
}

impl MeasurementUnits {
    pub fn scale_length(&self, scene_length: f32) -> f32 {
        scene_length * self.length_scale
    }

    pub fn scale_area(&self, scene_area: f32) -> f32 {
        scene_area * self.area_scale
    }

    /// Label text for an already scaled length.
    pub fn format_length(&self, value: f32) -> String {
        format!("{:.*} {}", self.decimals, value, self.length_suffix)
    }

    pub fn format_angle(&self, degrees: f32) -> String {
        format!("{:.*}°", self.decimals, degrees)
    }

    /// Label text for an already scaled area.
    pub fn format_area(&self, value: f32) -> String {
        format!("{:.*} {}", self.decimals, value, self.area_suffix)
    }
}
