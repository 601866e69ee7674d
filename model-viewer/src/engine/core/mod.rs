//! Core application setup and state management.
//!
//! Handles application lifecycle, window configuration, viewer config loading
//! and plugin initialisation for both native and WASM targets.

/// Application setup and plugin configuration for the Bevy engine.
///
/// Creates the main app with config and model loading, measurement systems,
/// and platform-specific configurations.
pub mod app_setup;

/// Application state: waiting for the viewer config, then running.
pub mod app_state;

/// Viewer config asset, validation and startup application.
pub mod config;

/// Native status line showing the active modes.
#[cfg(not(target_arch = "wasm32"))]
pub mod status;

/// Platform-specific window configuration for native and WASM builds.
///
/// Configures canvas integration for web targets and vsync settings.
pub mod window_config;
