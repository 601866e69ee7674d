use super::annotation::AnnotationRenderer;
use super::pick::PickService;
use super::session::{CompletedMeasurement, SessionEvent, ViewerSession};
use crate::engine::annotations::AnnotationScene;
use crate::engine::picking::{AnnotationFilter, ScenePicker};
use crate::rpc::web_rpc::WebRpcInterface;
use bevy::picking::mesh_picking::ray_cast::MeshRayCast;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use constants::navigation::CLICK_DRAG_TOLERANCE;

/// Fired for every measurement the session completes.
#[derive(Event, Debug, Clone)]
pub struct MeasurementCompletedEvent(pub CompletedMeasurement);

/// Tells clicks apart from camera drags on the left button.
#[derive(Resource, Debug, Default)]
pub struct PointerTracker {
    press_position: Option<Vec2>,
}

impl PointerTracker {
    pub fn press(&mut self, position: Vec2) {
        self.press_position = Some(position);
    }

    /// Position of the click, or `None` when the pointer travelled too far (a drag)
    /// or no press was seen.
    pub fn release(&mut self, position: Vec2) -> Option<Vec2> {
        let pressed = self.press_position.take()?;
        (pressed.distance(position) <= CLICK_DRAG_TOLERANCE).then_some(position)
    }
}

/// Pointer events to feed the session this frame, in order.
fn collect_pointer_events(
    moved_to: Option<Vec2>,
    cursor: Option<Vec2>,
    mouse_button: &ButtonInput<MouseButton>,
    tracker: &mut PointerTracker,
) -> Vec<SessionEvent> {
    let mut events = Vec::new();

    if let Some(position) = moved_to {
        events.push(SessionEvent::PointerMove(position));
    }

    if let Some(position) = cursor {
        if mouse_button.just_pressed(MouseButton::Left) {
            tracker.press(position);
        }
        if mouse_button.just_released(MouseButton::Left) {
            if let Some(click) = tracker.release(position) {
                events.push(SessionEvent::PointerClick(click));
            }
        }
    }

    events
}

pub fn measurement_input_system(
    mut cursor_moved: EventReader<CursorMoved>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    annotations: AnnotationFilter,
    // Ray casting reads the mesh assets the annotator adds to, so the two take turns.
    mut scene_access: ParamSet<(MeshRayCast, AnnotationScene)>,
    mut session: ResMut<ViewerSession>,
    mut tracker: ResMut<PointerTracker>,
    mut completed_events: EventWriter<MeasurementCompletedEvent>,
) {
    // Only the latest position matters for rubber-band feedback.
    let moved_to = cursor_moved.read().last().map(|moved| moved.position);
    let cursor = windows
        .single()
        .ok()
        .and_then(|window| window.cursor_position());

    let events = collect_pointer_events(moved_to, cursor, &mouse_button, &mut tracker);
    if events.is_empty() {
        return;
    }

    let Ok((camera, camera_transform)) = cameras.single() else {
        return;
    };

    let picked: Vec<PickedEvent> = {
        let mut ray_cast = scene_access.p0();
        let is_model_surface = |entity: Entity| !annotations.contains(entity);
        let mut picker =
            ScenePicker::new(&mut ray_cast, &is_model_surface, camera, camera_transform);
        events
            .into_iter()
            .map(|event| pick_for(event, &mut picker))
            .collect()
    };

    let mut scene = scene_access.p1();
    let mut annotator = scene.annotator();
    for measurement in apply_picked_events(&mut session, picked, &mut annotator) {
        completed_events.write(MeasurementCompletedEvent(measurement));
    }
}

/// A session event with the surface point picked for it.
pub type PickedEvent = (SessionEvent, Option<Vec3>);

fn pick_for(event: SessionEvent, picker: &mut impl PickService) -> PickedEvent {
    let hit = match event {
        SessionEvent::PointerMove(screen) | SessionEvent::PointerClick(screen) => {
            picker.pick(screen)
        }
        _ => None,
    };
    (event, hit)
}

/// Feed already picked events to the session in order; returns what they completed.
pub fn apply_picked_events(
    session: &mut ViewerSession,
    picked: Vec<PickedEvent>,
    renderer: &mut impl AnnotationRenderer,
) -> Vec<CompletedMeasurement> {
    picked
        .into_iter()
        .filter_map(|(event, hit)| {
            let mut picked_hit = |_: Vec2| hit;
            session.handle(event, &mut picked_hit, renderer)
        })
        .collect()
}

/// Forward completed measurements to the page.
pub fn notify_completed_measurements(
    mut completed_events: EventReader<MeasurementCompletedEvent>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for MeasurementCompletedEvent(measurement) in completed_events.read() {
        rpc_interface.send_notification(
            "measurement_completed",
            serde_json::json!({ "measurement": measurement }),
        );
    }
}
