use crate::tools::measure::annotation::AnnotationLayer;
use crate::tools::measure::pick::PickService;
use bevy::picking::mesh_picking::ray_cast::{MeshRayCast, MeshRayCastSettings, RayCastVisibility};
use bevy::prelude::*;

/// Annotation entities, which the picker looks through.
pub type AnnotationFilter<'w, 's> = Query<'w, 's, (), With<AnnotationLayer>>;

/// Picks the nearest visible model surface under a viewport position.
pub struct ScenePicker<'a, 'w, 's> {
    ray_cast: &'a mut MeshRayCast<'w, 's>,
    /// True for entities the ray may hit.
    filter: &'a dyn Fn(Entity) -> bool,
    camera: &'a Camera,
    camera_transform: &'a GlobalTransform,
}

impl<'a, 'w, 's> ScenePicker<'a, 'w, 's> {
    pub fn new(
        ray_cast: &'a mut MeshRayCast<'w, 's>,
        filter: &'a dyn Fn(Entity) -> bool,
        camera: &'a Camera,
        camera_transform: &'a GlobalTransform,
    ) -> Self {
        Self {
            ray_cast,
            filter,
            camera,
            camera_transform,
        }
    }
}

impl PickService for ScenePicker<'_, '_, '_> {
    fn pick(&mut self, screen: Vec2) -> Option<Vec3> {
        let ray = self
            .camera
            .viewport_to_world(self.camera_transform, screen)
            .ok()?;

        let settings = MeshRayCastSettings::default()
            .with_visibility(RayCastVisibility::Visible)
            .with_filter(&self.filter);

        // Hits come back sorted nearest first.
        self.ray_cast
            .cast_ray(ray, &settings)
            .first()
            .map(|(_, hit)| hit.point)
    }
}
