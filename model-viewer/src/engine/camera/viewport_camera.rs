use crate::tools::measure::session::ViewerSession;
use crate::tools::tool_manager::CameraMode;
use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::math::EulerRot;
use bevy::prelude::*;
use constants::navigation::{
    DOLLY_SENSITIVITY, MAX_CAMERA_DISTANCE, MAX_PITCH, MIN_CAMERA_DISTANCE, ORBIT_SENSITIVITY,
    PAN_SENSITIVITY, WHEEL_ZOOM_STEP,
};

/// Orbit camera state: the camera sits `distance` away from `focus_point`,
/// turned by `yaw` about Y and then `pitch` about X.
#[derive(Resource, Debug, Clone, PartialEq)]
pub struct ViewportCamera {
    pub focus_point: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub distance: f32,
}

impl Default for ViewportCamera {
    fn default() -> Self {
        Self {
            focus_point: Vec3::ZERO,
            yaw: 0.0,
            pitch: -0.6,
            distance: 10.0,
        }
    }
}

impl ViewportCamera {
    pub fn rotation(&self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, 0.0)
    }

    /// Camera transform looking at the focus point.
    pub fn transform(&self) -> Transform {
        let rotation = self.rotation();
        let position = self.focus_point + rotation * Vec3::Z * self.distance;
        Transform::from_translation(position).with_rotation(rotation)
    }

    /// Rotate around the focus point by a mouse delta in logical pixels.
    pub fn orbit(&mut self, delta: Vec2) {
        self.yaw -= delta.x * ORBIT_SENSITIVITY;
        self.pitch = (self.pitch - delta.y * ORBIT_SENSITIVITY).clamp(-MAX_PITCH, MAX_PITCH);
    }

    /// Slide the focus point in the view plane so the model follows the pointer.
    pub fn pan(&mut self, delta: Vec2) {
        let rotation = self.rotation();
        let right = rotation * Vec3::X;
        let up = rotation * Vec3::Y;
        let scale = self.distance * PAN_SENSITIVITY;
        self.focus_point += (up * delta.y - right * delta.x) * scale;
    }

    /// Dragging down moves away, dragging up moves closer.
    pub fn dolly(&mut self, delta: f32) {
        self.set_distance(self.distance * (1.0 + delta * DOLLY_SENSITIVITY).max(0.1));
    }

    /// Positive steps (wheel away from the user) zoom in.
    pub fn zoom_wheel(&mut self, steps: f32) {
        self.set_distance(self.distance * (1.0 - WHEEL_ZOOM_STEP).powf(steps));
    }

    /// Centre on the box and back off until its largest side fits the vertical field of view.
    pub fn frame_bounds(&mut self, min: Vec3, max: Vec3, fov: f32) {
        let max_dim = (max - min).max_element();
        self.focus_point = (min + max) * 0.5;
        self.set_distance(max_dim / (fov * 0.5).sin() / 2.0);
    }

    fn set_distance(&mut self, distance: f32) {
        self.distance = distance.clamp(MIN_CAMERA_DISTANCE, MAX_CAMERA_DISTANCE);
    }
}

/// Mouse navigation. Left-drag follows the selected camera mode, middle-drag
/// pans, right-drag dollies and the wheel zooms. Applied directly, no damping.
pub fn camera_controller(
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
    mut viewport_camera: ResMut<ViewportCamera>,
    session: Res<ViewerSession>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
) {
    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();

    if mouse_delta != Vec2::ZERO {
        if mouse_button.pressed(MouseButton::Left) {
            match session.camera_mode() {
                CameraMode::Orbit => viewport_camera.orbit(mouse_delta),
                CameraMode::Pan => viewport_camera.pan(mouse_delta),
                CameraMode::Zoom => viewport_camera.dolly(mouse_delta.y),
            }
        } else if mouse_button.pressed(MouseButton::Middle) {
            viewport_camera.pan(mouse_delta);
        } else if mouse_button.pressed(MouseButton::Right) {
            viewport_camera.dolly(mouse_delta.y);
        }
    }

    // Mouse wheel scroll accumulation (pixel and line scroll).
    let scroll: f32 = scroll_events
        .read()
        .map(|ev| match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        })
        .sum();
    if scroll.abs() > f32::EPSILON {
        viewport_camera.zoom_wheel(scroll);
    }

    if !viewport_camera.is_changed() {
        return;
    }
    if let Ok(mut transform) = camera_query.single_mut() {
        *transform = viewport_camera.transform();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use std::f32::consts::FRAC_PI_2;

    fn forward(transform: &Transform) -> Vec3 {
        transform.rotation * Vec3::NEG_Z
    }

    #[test]
    fn camera_looks_at_focus() {
        let camera = ViewportCamera {
            focus_point: Vec3::new(1.0, 2.0, 3.0),
            yaw: 0.7,
            pitch: -0.4,
            distance: 5.0,
        };
        let transform = camera.transform();

        assert_relative_eq!(transform.translation.distance(camera.focus_point), 5.0, epsilon = 1e-4);
        let to_focus = (camera.focus_point - transform.translation).normalize();
        assert_abs_diff_eq!(forward(&transform).dot(to_focus), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn default_view_is_from_above() {
        let transform = ViewportCamera::default().transform();
        assert!(transform.translation.y > 0.0);
        assert!(forward(&transform).y < 0.0);
    }

    #[test]
    fn pitch_stays_off_the_poles() {
        let mut camera = ViewportCamera::default();
        camera.orbit(Vec2::new(0.0, 10_000.0));
        assert_relative_eq!(camera.pitch, -MAX_PITCH);
        camera.orbit(Vec2::new(0.0, -100_000.0));
        assert_relative_eq!(camera.pitch, MAX_PITCH);
        assert!(camera.pitch < FRAC_PI_2);
    }

    #[test]
    fn pan_keeps_the_view_direction() {
        let mut camera = ViewportCamera::default();
        let before = camera.transform();
        camera.pan(Vec2::new(30.0, -12.0));
        let after = camera.transform();

        assert_ne!(camera.focus_point, Vec3::ZERO);
        assert_eq!(before.rotation, after.rotation);
        // Focus moved within the view plane.
        assert_abs_diff_eq!(camera.focus_point.dot(forward(&before)), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn wheel_and_dolly_respect_limits() {
        let mut camera = ViewportCamera::default();
        camera.zoom_wheel(1.0);
        assert_relative_eq!(camera.distance, 9.0, epsilon = 1e-4);

        camera.zoom_wheel(10_000.0);
        assert_relative_eq!(camera.distance, MIN_CAMERA_DISTANCE);

        camera.dolly(1.0e9);
        assert_relative_eq!(camera.distance, MAX_CAMERA_DISTANCE);
    }

    #[test]
    fn framing_fits_largest_side() {
        let mut camera = ViewportCamera::default();
        let fov = std::f32::consts::FRAC_PI_4;
        camera.frame_bounds(Vec3::new(-1.0, 0.0, -3.0), Vec3::new(1.0, 2.0, 3.0), fov);

        assert_eq!(camera.focus_point, Vec3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(camera.distance, 6.0 / (fov * 0.5).sin() / 2.0, epsilon = 1e-4);
    }
}
