use crate::engine::annotations::AnnotationScene;
use crate::rpc::web_rpc::WebRpcInterface;
use crate::tools::measure::session::{MeasurementKind, ViewerSession};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// What a left-drag does while no measurement is being placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraMode {
    #[default]
    Orbit,
    Pan,
    Zoom,
}

/// Every mode the UI chrome can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModeCommand {
    Orbit,
    Pan,
    Zoom,
    MeasureDistance,
    MeasureAngle,
    MeasureArea,
}

impl ModeCommand {
    /// Convert string identifier to mode for RPC compatibility.
    pub fn from_string(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "orbit" => Some(Self::Orbit),
            "pan" => Some(Self::Pan),
            "zoom" => Some(Self::Zoom),
            "distance" | "measure_distance" => Some(Self::MeasureDistance),
            "angle" | "measure_angle" => Some(Self::MeasureAngle),
            "area" | "measure_area" => Some(Self::MeasureArea),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Orbit => "orbit",
            Self::Pan => "pan",
            Self::Zoom => "zoom",
            Self::MeasureDistance => "distance",
            Self::MeasureAngle => "angle",
            Self::MeasureArea => "area",
        }
    }

    pub fn camera_mode(&self) -> Option<CameraMode> {
        match self {
            Self::Orbit => Some(CameraMode::Orbit),
            Self::Pan => Some(CameraMode::Pan),
            Self::Zoom => Some(CameraMode::Zoom),
            _ => None,
        }
    }

    pub fn measurement_kind(&self) -> Option<MeasurementKind> {
        match self {
            Self::MeasureDistance => Some(MeasurementKind::Distance),
            Self::MeasureAngle => Some(MeasurementKind::Angle),
            Self::MeasureArea => Some(MeasurementKind::Area),
            _ => None,
        }
    }
}

/// Source of a mode change for debugging and conditional logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeSelectionSource {
    Rpc,
    Keyboard,
}

/// Event fired when a mode is selected via RPC or keyboard shortcut.
#[derive(Event, Debug, Clone, Copy)]
pub struct ModeCommandEvent {
    pub command: ModeCommand,
    pub source: ModeSelectionSource,
}

/// Abandon the measurement in progress.
#[derive(Event, Debug, Clone, Copy)]
pub struct CancelMeasurementEvent {
    pub source: ModeSelectionSource,
}

/// Remove every completed measurement from the scene.
#[derive(Event, Debug, Clone, Copy)]
pub struct ClearMeasurementsEvent {
    pub source: ModeSelectionSource,
}

/// System applying mode selections to the session and notifying the frontend.
pub fn handle_mode_command_events(
    mut events: EventReader<ModeCommandEvent>,
    mut session: ResMut<ViewerSession>,
    mut scene: AnnotationScene,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    let mut annotator = scene.annotator();
    for event in events.read() {
        session.set_mode(event.command, &mut annotator);

        info!("Mode {} selected via {:?}", event.command.as_str(), event.source);

        rpc_interface.send_notification(
            "mode_changed",
            serde_json::json!({
                "mode": event.command.as_str(),
                "camera_mode": session.camera_mode(),
                "measurement_mode": session.measurement_mode(),
            }),
        );
    }
}

pub fn handle_cancel_events(
    mut events: EventReader<CancelMeasurementEvent>,
    mut session: ResMut<ViewerSession>,
    mut scene: AnnotationScene,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    // Several cancels in one frame collapse into one.
    let Some(event) = events.read().last() else {
        return;
    };

    let mut annotator = scene.annotator();
    session.cancel(&mut annotator);
    debug!("Cancel requested via {:?}", event.source);

    rpc_interface.send_notification(
        "measurement_cancelled",
        serde_json::json!({
            "camera_mode": session.camera_mode(),
            "measurement_mode": session.measurement_mode(),
        }),
    );
}

pub fn handle_clear_events(
    mut events: EventReader<ClearMeasurementsEvent>,
    mut session: ResMut<ViewerSession>,
    mut scene: AnnotationScene,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    let Some(event) = events.read().last() else {
        return;
    };

    let cleared = session.completed().len();
    let mut annotator = scene.annotator();
    session.clear_completed(&mut annotator);
    debug!("Clear requested via {:?}", event.source);

    rpc_interface.send_notification(
        "measurements_cleared",
        serde_json::json!({ "cleared": cleared }),
    );
}

/// Escape cancels on every target; the UI chrome drives everything else on the web.
pub fn handle_cancel_shortcut(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut cancel_events: EventWriter<CancelMeasurementEvent>,
) {
    if keyboard.just_pressed(KeyCode::Escape) {
        cancel_events.write(CancelMeasurementEvent {
            source: ModeSelectionSource::Keyboard,
        });
    }
}

/// Map keyboard shortcuts to mode commands (native builds only).
#[cfg(not(target_arch = "wasm32"))]
pub fn handle_mode_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut mode_events: EventWriter<ModeCommandEvent>,
    mut clear_events: EventWriter<ClearMeasurementsEvent>,
) {
    const SHORTCUTS: [(KeyCode, ModeCommand); 6] = [
        (KeyCode::KeyO, ModeCommand::Orbit),
        (KeyCode::KeyP, ModeCommand::Pan),
        (KeyCode::KeyZ, ModeCommand::Zoom),
        (KeyCode::KeyD, ModeCommand::MeasureDistance),
        (KeyCode::KeyA, ModeCommand::MeasureAngle),
        (KeyCode::KeyR, ModeCommand::MeasureArea),
    ];

    for (key, command) in SHORTCUTS {
        if keyboard.just_pressed(key) {
            mode_events.write(ModeCommandEvent {
                command,
                source: ModeSelectionSource::Keyboard,
            });
        }
    }

    if keyboard.just_pressed(KeyCode::Delete) {
        clear_events.write(ClearMeasurementsEvent {
            source: ModeSelectionSource::Keyboard,
        });
    }
}

/// Placeholder system for WASM builds where mode shortcuts are disabled.
#[cfg(target_arch = "wasm32")]
pub fn handle_mode_keyboard_shortcuts() {
    // Modes are selected by the frontend via RPC.
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_names_round_trip() {
        for command in [
            ModeCommand::Orbit,
            ModeCommand::Pan,
            ModeCommand::Zoom,
            ModeCommand::MeasureDistance,
            ModeCommand::MeasureAngle,
            ModeCommand::MeasureArea,
        ] {
            assert_eq!(ModeCommand::from_string(command.as_str()), Some(command));
        }
    }

    #[test]
    fn accepts_long_names_and_any_case() {
        assert_eq!(
            ModeCommand::from_string("Measure_Area"),
            Some(ModeCommand::MeasureArea)
        );
        assert_eq!(ModeCommand::from_string("ORBIT"), Some(ModeCommand::Orbit));
        assert_eq!(ModeCommand::from_string("knife"), None);
    }

    #[test]
    fn commands_split_into_camera_and_measurement() {
        assert_eq!(ModeCommand::Zoom.camera_mode(), Some(CameraMode::Zoom));
        assert_eq!(ModeCommand::Zoom.measurement_kind(), None);
        assert_eq!(ModeCommand::MeasureAngle.camera_mode(), None);
        assert_eq!(
            ModeCommand::MeasureAngle.measurement_kind(),
            Some(MeasurementKind::Angle)
        );
    }

    #[test]
    fn escape_sends_cancel() {
        let mut app = App::new();
        app.add_event::<CancelMeasurementEvent>()
            .init_resource::<ButtonInput<KeyCode>>()
            .add_systems(Update, handle_cancel_shortcut);

        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::Escape);
        app.update();

        let events = app.world().resource::<Events<CancelMeasurementEvent>>();
        let mut cursor = events.get_cursor();
        let sent: Vec<_> = cursor.read(events).collect();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].source, ModeSelectionSource::Keyboard);
    }
}
