use crate::engine::core::app_state::AppState;
use crate::engine::loading::model_loader::{ModelLoader, model_path_override, start_model_load};
use crate::tools::measure::session::ViewerSession;
use crate::tools::measure::units::MeasurementUnits;
use bevy::asset::LoadState;
use bevy::prelude::*;
use constants::measurement::POLYGON_CLOSE_THRESHOLD;
use constants::navigation::{CONFIG_PATH, DEFAULT_MODEL_PATH};
use constants::render_settings::BACKGROUND_COLOUR;
use serde::Deserialize;
use thiserror::Error;

/// Viewer settings read from `assets/config/default.viewer.json`.
/// Every field is optional in the file.
#[derive(Asset, TypePath, Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// glTF/GLB path relative to the asset root.
    pub model_path: String,
    /// Scene-unit distance within which a click closes a polygon.
    pub close_threshold: f32,
    pub units: MeasurementUnits,
    /// sRGB, each channel in 0..=1.
    pub background_colour: [f32; 3],
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let background = BACKGROUND_COLOUR.to_srgba();
        Self {
            model_path: DEFAULT_MODEL_PATH.to_string(),
            close_threshold: POLYGON_CLOSE_THRESHOLD,
            units: MeasurementUnits::default(),
            background_colour: [background.red, background.green, background.blue],
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("close_threshold must be a positive number, got {0}")]
    InvalidCloseThreshold(f32),
    #[error("{field} must be a positive number, got {value}")]
    InvalidScale { field: &'static str, value: f32 },
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

impl ViewerConfig {
    /// Checks the measurement settings; the model path and colour are always usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !positive(self.close_threshold) {
            return Err(ConfigError::InvalidCloseThreshold(self.close_threshold));
        }
        if !positive(self.units.length_scale) {
            return Err(ConfigError::InvalidScale {
                field: "units.length_scale",
                value: self.units.length_scale,
            });
        }
        if !positive(self.units.area_scale) {
            return Err(ConfigError::InvalidScale {
                field: "units.area_scale",
                value: self.units.area_scale,
            });
        }
        Ok(())
    }

    pub fn background(&self) -> Color {
        let [r, g, b] = self.background_colour.map(|c| c.clamp(0.0, 1.0));
        Color::srgb(r, g, b)
    }

    /// Configured model path, or the default when the file leaves it blank.
    pub fn model_path(&self) -> &str {
        let path = self.model_path.trim();
        if path.is_empty() { DEFAULT_MODEL_PATH } else { path }
    }
}

#[derive(Resource, Default)]
pub struct ConfigLoader {
    handle: Option<Handle<ViewerConfig>>,
}

/// Start the loading process.
pub fn start_loading(mut config_loader: ResMut<ConfigLoader>, asset_server: Res<AssetServer>) {
    info!("Loading viewer config from: {}", CONFIG_PATH);
    config_loader.handle = Some(asset_server.load(CONFIG_PATH));
}

/// Apply the config once it is available (or has failed to load), then start
/// loading the model and enter the running state.
pub fn apply_config_when_ready(
    config_loader: Res<ConfigLoader>,
    configs: Res<Assets<ViewerConfig>>,
    asset_server: Res<AssetServer>,
    mut session: ResMut<ViewerSession>,
    mut clear_colour: ResMut<ClearColor>,
    mut model_loader: ResMut<ModelLoader>,
    mut commands: Commands,
    mut next_state: ResMut<NextState<AppState>>,
) {
    let Some(handle) = &config_loader.handle else {
        return;
    };

    let config = match configs.get(handle) {
        Some(config) => config.clone(),
        None => match asset_server.get_load_state(handle) {
            Some(LoadState::Failed(err)) => {
                warn!("Could not load {}: {}; using defaults", CONFIG_PATH, err);
                ViewerConfig::default()
            }
            _ => return,
        },
    };

    match config.validate() {
        Ok(()) => session.apply_settings(config.units.clone(), config.close_threshold),
        Err(err) => warn!("Ignoring measurement settings in {}: {}", CONFIG_PATH, err),
    }
    clear_colour.0 = config.background();

    let model_path = model_path_override().unwrap_or_else(|| config.model_path().to_string());
    start_model_load(&mut commands, &asset_server, &mut model_loader, &model_path);

    info!("→ Config applied, transitioning to Running state");
    next_state.set(AppState::Running);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config: ViewerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ViewerConfig::default());
        assert_eq!(config.model_path(), DEFAULT_MODEL_PATH);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn reads_nested_units() {
        let config: ViewerConfig = serde_json::from_value(serde_json::json!({
            "model_path": "models/bridge.glb",
            "close_threshold": 0.25,
            "units": { "length_scale": 1000.0, "length_suffix": "mm" },
            "background_colour": [0.1, 0.2, 0.3]
        }))
        .unwrap();

        assert_eq!(config.model_path(), "models/bridge.glb");
        assert_eq!(config.close_threshold, 0.25);
        assert_eq!(config.units.length_suffix, "mm");
        assert_eq!(config.units.area_suffix, "cm²");
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn rejects_non_positive_threshold() {
        let config = ViewerConfig {
            close_threshold: 0.0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidCloseThreshold(0.0))
        );

        let config = ViewerConfig {
            close_threshold: f32::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_negative_scale() {
        let mut config = ViewerConfig::default();
        config.units.area_scale = -1.0;
        let err = config.validate().unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidScale {
                field: "units.area_scale",
                value: -1.0
            }
        );
        assert_eq!(
            err.to_string(),
            "units.area_scale must be a positive number, got -1"
        );
    }

    #[test]
    fn blank_model_path_falls_back() {
        let config = ViewerConfig {
            model_path: "  ".to_string(),
            ..Default::default()
        };
        assert_eq!(config.model_path(), DEFAULT_MODEL_PATH);
    }

    #[test]
    fn background_channels_are_clamped() {
        let config = ViewerConfig {
            background_colour: [2.0, -1.0, 0.5],
            ..Default::default()
        };
        let colour = config.background().to_srgba();
        assert_eq!(colour.red, 1.0);
        assert_eq!(colour.green, 0.0);
        assert_eq!(colour.blue, 0.5);
    }
}
