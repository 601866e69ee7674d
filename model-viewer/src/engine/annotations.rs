//! Scene-side drawing of measurement annotations.
//!
//! Lines are unlit cuboids (one per segment), markers are unlit spheres and
//! labels are absolutely positioned UI text nodes that follow their world
//! anchor every frame. Every spawned entity carries its [`AnnotationLayer`] so
//! a whole layer can be despawned at once and so picking can skip it.

use crate::tools::measure::annotation::{
    AnnotationLayer, AnnotationRenderer, LineStyle, MarkerStyle,
};
use bevy::ecs::system::SystemParam;
use bevy::pbr::NotShadowCaster;
use bevy::prelude::*;
use constants::render_settings::{
    ANCHOR_MARKER_COLOUR, DRAW_LINE_WIDTH, DRAW_VERTEX_SIZE, LABEL_BACKGROUND_COLOUR,
    LABEL_CORNER_RADIUS, LABEL_FONT_SIZE, LABEL_PADDING, LABEL_TEXT_COLOUR, LABEL_Z_INDEX,
    MARKER_COLOUR, MEASURE_LINE_COLOUR, MIN_SEGMENT_LENGTH, PREVIEW_LINE_COLOUR,
};
use std::collections::HashSet;

/// World position a label UI node is pinned to.
#[derive(Component, Debug, Clone, Copy)]
pub struct AnnotationLabel {
    pub anchor: Vec3,
}

/// Everything needed to spawn and despawn annotation entities from a system.
#[derive(SystemParam)]
pub struct AnnotationScene<'w, 's> {
    commands: Commands<'w, 's>,
    meshes: ResMut<'w, Assets<Mesh>>,
    materials: ResMut<'w, Assets<StandardMaterial>>,
    existing: Query<'w, 's, (Entity, &'static AnnotationLayer)>,
}

impl<'w, 's> AnnotationScene<'w, 's> {
    /// One annotator per system run, so entities spawned and removed in the
    /// same run are tracked together.
    pub fn annotator(&mut self) -> SceneAnnotator<'_, 'w, 's> {
        SceneAnnotator {
            scene: self,
            spawned: Vec::new(),
            despawned: HashSet::new(),
        }
    }
}

/// [`AnnotationRenderer`] backed by Bevy entities.
///
/// Commands are deferred, so entities spawned during this run are not yet
/// visible to the layer query; they are tracked here instead.
pub struct SceneAnnotator<'a, 'w, 's> {
    scene: &'a mut AnnotationScene<'w, 's>,
    spawned: Vec<(Entity, AnnotationLayer)>,
    despawned: HashSet<Entity>,
}

impl SceneAnnotator<'_, '_, '_> {
    fn unlit(&mut self, colour: Color) -> MeshMaterial3d<StandardMaterial> {
        MeshMaterial3d(self.scene.materials.add(StandardMaterial {
            base_color: colour,
            unlit: true,
            ..default()
        }))
    }

    fn track(&mut self, entity: Entity, layer: AnnotationLayer) {
        self.spawned.push((entity, layer));
    }

    fn despawn(&mut self, entity: Entity) {
        if self.despawned.insert(entity) {
            self.scene.commands.entity(entity).despawn();
        }
    }
}

fn line_appearance(style: LineStyle) -> (Color, f32) {
    match style {
        LineStyle::Preview => (PREVIEW_LINE_COLOUR, DRAW_LINE_WIDTH),
        LineStyle::Edge => (MEASURE_LINE_COLOUR, DRAW_LINE_WIDTH),
        LineStyle::Result => (MEASURE_LINE_COLOUR, DRAW_LINE_WIDTH * 1.5),
    }
}

fn marker_appearance(style: MarkerStyle) -> (Color, f32) {
    match style {
        MarkerStyle::Point => (MARKER_COLOUR, DRAW_VERTEX_SIZE * 0.5),
        MarkerStyle::Anchor => (ANCHOR_MARKER_COLOUR, DRAW_VERTEX_SIZE * 0.75),
    }
}

/// Centre and rotation of a cuboid spanning `start..end` along its X axis.
/// `None` for segments too short to orient.
pub fn segment_transform(start: Vec3, end: Vec3) -> Option<(Transform, f32)> {
    let direction = end - start;
    let length = direction.length();
    if length < MIN_SEGMENT_LENGTH {
        return None;
    }
    let rotation = Quat::from_rotation_arc(Vec3::X, direction / length);
    let transform = Transform::from_translation((start + end) * 0.5).with_rotation(rotation);
    Some((transform, length))
}

impl AnnotationRenderer for SceneAnnotator<'_, '_, '_> {
    fn add_line(&mut self, points: &[Vec3], style: LineStyle, layer: AnnotationLayer) {
        let (colour, width) = line_appearance(style);
        for segment in points.windows(2) {
            let Some((transform, length)) = segment_transform(segment[0], segment[1]) else {
                continue;
            };
            let mesh = Mesh3d(self.scene.meshes.add(Cuboid::new(length, width, width)));
            let material = self.unlit(colour);
            let entity = self
                .scene
                .commands
                .spawn((mesh, material, transform, NotShadowCaster, layer))
                .id();
            self.track(entity, layer);
        }
    }

    fn add_marker(&mut self, point: Vec3, style: MarkerStyle, layer: AnnotationLayer) {
        let (colour, radius) = marker_appearance(style);
        let mesh = Mesh3d(self.scene.meshes.add(Sphere::new(radius)));
        let material = self.unlit(colour);
        let entity = self
            .scene
            .commands
            .spawn((
                mesh,
                material,
                Transform::from_translation(point),
                NotShadowCaster,
                layer,
            ))
            .id();
        self.track(entity, layer);
    }

    fn add_label(&mut self, text: &str, position: Vec3, layer: AnnotationLayer) {
        let entity = self
            .scene
            .commands
            .spawn((
                Text::new(text),
                TextFont {
                    font_size: LABEL_FONT_SIZE,
                    ..default()
                },
                TextColor(LABEL_TEXT_COLOUR),
                Node {
                    position_type: PositionType::Absolute,
                    padding: UiRect::all(Val::Px(LABEL_PADDING)),
                    ..default()
                },
                BackgroundColor(LABEL_BACKGROUND_COLOUR),
                BorderRadius::all(Val::Px(LABEL_CORNER_RADIUS)),
                GlobalZIndex(LABEL_Z_INDEX),
                // Shown once positioned.
                Visibility::Hidden,
                AnnotationLabel { anchor: position },
                layer,
            ))
            .id();
        self.track(entity, layer);
    }

    fn remove_all(&mut self, layer: AnnotationLayer) {
        let existing: Vec<Entity> = self
            .scene
            .existing
            .iter()
            .filter(|(_, l)| **l == layer)
            .map(|(entity, _)| entity)
            .collect();
        for entity in existing {
            self.despawn(entity);
        }

        let spawned: Vec<Entity> = self
            .spawned
            .iter()
            .filter(|(_, l)| *l == layer)
            .map(|(entity, _)| *entity)
            .collect();
        self.spawned.retain(|(_, l)| *l != layer);
        for entity in spawned {
            self.despawn(entity);
        }
    }
}

/// Pin label nodes over their world anchors; hide the ones behind the camera.
///
/// Runs after the camera controller in the same frame. The camera has no
/// parent, so its local transform is already its global one.
pub fn position_annotation_labels(
    cameras: Query<(&Camera, &Transform), With<Camera3d>>,
    mut labels: Query<(&AnnotationLabel, &ComputedNode, &mut Node, &mut Visibility)>,
) {
    let Ok((camera, camera_transform)) = cameras.single() else {
        return;
    };
    let camera_transform = GlobalTransform::from(*camera_transform);

    for (label, computed, mut node, mut visibility) in &mut labels {
        let Ok(screen) = camera.world_to_viewport(&camera_transform, label.anchor) else {
            visibility.set_if_neq(Visibility::Hidden);
            continue;
        };

        // Centre the box on the anchor, in logical pixels.
        let size = computed.size() * computed.inverse_scale_factor();
        node.left = Val::Px(screen.x - size.x * 0.5);
        node.top = Val::Px(screen.y - size.y * 0.5);
        visibility.set_if_neq(Visibility::Inherited);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn segment_spans_both_ends() {
        let start = Vec3::new(1.0, 0.0, 0.0);
        let end = Vec3::new(1.0, 0.0, 4.0);
        let (transform, length) = segment_transform(start, end).unwrap();

        assert_relative_eq!(length, 4.0);
        assert_eq!(transform.translation, Vec3::new(1.0, 0.0, 2.0));

        // The cuboid's X axis now points along the segment.
        let axis = transform.rotation * Vec3::X;
        assert_relative_eq!(axis.z, 1.0, epsilon = 1e-5);
        assert_relative_eq!(axis.x, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn collapsed_segment_is_skipped() {
        assert!(segment_transform(Vec3::ONE, Vec3::ONE).is_none());
    }

    #[test]
    fn remove_all_despawns_only_that_layer() {
        let mut app = App::new();
        app.init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<StandardMaterial>>();

        let existing_live = app.world_mut().spawn(AnnotationLayer::Live).id();
        let existing_done = app.world_mut().spawn(AnnotationLayer::Completed).id();

        let mut system_state: bevy::ecs::system::SystemState<AnnotationScene> =
            bevy::ecs::system::SystemState::new(app.world_mut());
        {
            let mut scene = system_state.get_mut(app.world_mut());
            let mut annotator = scene.annotator();
            annotator.add_marker(Vec3::ZERO, MarkerStyle::Point, AnnotationLayer::Live);
            annotator.add_marker(Vec3::X, MarkerStyle::Anchor, AnnotationLayer::Pending);
            annotator.remove_all(AnnotationLayer::Live);
            annotator.remove_all(AnnotationLayer::Live);
        }
        system_state.apply(app.world_mut());

        let world = app.world_mut();
        assert!(world.get_entity(existing_live).is_err());
        assert!(world.get_entity(existing_done).is_ok());

        let mut layers = world.query::<&AnnotationLayer>();
        let remaining: Vec<AnnotationLayer> = layers.iter(world).copied().collect();
        assert_eq!(remaining.len(), 2);
        assert!(remaining.contains(&AnnotationLayer::Pending));
        assert!(remaining.contains(&AnnotationLayer::Completed));
    }
}
