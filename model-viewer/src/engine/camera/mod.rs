//! Viewport camera system for model navigation.
//!
//! Orbit camera around a focus point with mouse-only controls. The left-drag
//! binding follows the camera mode selected on the viewer session.

/// Viewport camera resource and controller system for scene navigation.
pub mod viewport_camera;
