use crate::engine::camera::viewport_camera::ViewportCamera;
use crate::rpc::web_rpc::WebRpcInterface;
use bevy::asset::{LoadState, RecursiveDependencyLoadState};
use bevy::gltf::{Gltf, GltfAssetLabel};
use bevy::prelude::*;
use bevy::render::mesh::MeshAabb;
use bevy::scene::SceneInstanceReady;

/// Tracks the single model shown by the viewer.
#[derive(Resource, Default)]
pub struct ModelLoader {
    path: Option<String>,
    gltf: Option<Handle<Gltf>>,
    /// Scene root instantiated last frame, framed once its transforms have propagated.
    pending_frame: Option<Entity>,
    stage: ModelLoadStage,
}

/// Coarse progress of the glTF asset and everything it references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelLoadStage {
    #[default]
    NotStarted,
    Loading,
    /// The glTF itself is parsed; buffers and textures are still arriving.
    LoadingDependencies,
    Loaded,
    Failed,
}

impl ModelLoadStage {
    fn is_final(self) -> bool {
        matches!(self, Self::Loaded | Self::Failed)
    }
}

pub fn model_load_stage(
    load: &LoadState,
    dependencies: &RecursiveDependencyLoadState,
) -> ModelLoadStage {
    match (load, dependencies) {
        (LoadState::Failed(_), _) | (_, RecursiveDependencyLoadState::Failed(_)) => {
            ModelLoadStage::Failed
        }
        (LoadState::Loaded, RecursiveDependencyLoadState::Loaded) => ModelLoadStage::Loaded,
        (LoadState::Loaded, _) => ModelLoadStage::LoadingDependencies,
        (LoadState::Loading, _) => ModelLoadStage::Loading,
        (LoadState::NotLoaded, _) => ModelLoadStage::NotStarted,
    }
}

fn load_error(load: &LoadState, dependencies: &RecursiveDependencyLoadState) -> String {
    match (load, dependencies) {
        (LoadState::Failed(err), _) => err.to_string(),
        (_, RecursiveDependencyLoadState::Failed(err)) => err.to_string(),
        _ => "unknown error".to_string(),
    }
}

#[derive(Component)]
pub struct LoadedModel;

/// Model path given on the command line (native) or as `?model=` (wasm).
pub fn model_path_override() -> Option<String> {
    #[cfg(target_arch = "wasm32")]
    {
        let search = web_sys::window()?.location().search().ok()?;
        let raw = model_from_query(&search)?;
        js_sys::decode_uri_component(&raw).ok().map(String::from)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        std::env::args().nth(1).filter(|arg| !arg.is_empty())
    }
}

/// Raw value of the `model` parameter in a URL query string.
pub fn model_from_query(search: &str) -> Option<String> {
    search
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, value)| *key == "model" && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

pub fn start_model_load(
    commands: &mut Commands,
    asset_server: &AssetServer,
    loader: &mut ModelLoader,
    path: &str,
) {
    info!("Loading model from: {}", path);

    loader.path = Some(path.to_string());
    loader.gltf = Some(asset_server.load::<Gltf>(path.to_string()));
    loader.stage = ModelLoadStage::NotStarted;

    let scene = asset_server.load(GltfAssetLabel::Scene(0).from_asset(path.to_string()));
    commands
        .spawn((SceneRoot(scene), LoadedModel))
        .observe(on_model_ready);
}

fn on_model_ready(trigger: Trigger<SceneInstanceReady>, mut loader: ResMut<ModelLoader>) {
    info!("✓ Model scene instantiated");
    loader.pending_frame = Some(trigger.target());
}

/// World-space box of a local box under `transform`.
pub fn world_aabb(min: Vec3, max: Vec3, transform: &GlobalTransform) -> (Vec3, Vec3) {
    let corners = [
        Vec3::new(min.x, min.y, min.z),
        Vec3::new(max.x, min.y, min.z),
        Vec3::new(min.x, max.y, min.z),
        Vec3::new(max.x, max.y, min.z),
        Vec3::new(min.x, min.y, max.z),
        Vec3::new(max.x, min.y, max.z),
        Vec3::new(min.x, max.y, max.z),
        Vec3::new(max.x, max.y, max.z),
    ];
    corners
        .into_iter()
        .map(|corner| transform.transform_point(corner))
        .fold((Vec3::INFINITY, Vec3::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p), hi.max(p))
        })
}

/// World-space box of a mesh instance, `None` for a mesh without positions.
pub fn mesh_bounds(mesh: &Mesh, transform: &GlobalTransform) -> Option<(Vec3, Vec3)> {
    let aabb = mesh.compute_aabb()?;
    Some(world_aabb(aabb.min().into(), aabb.max().into(), transform))
}

/// Union of boxes, `None` when there are none.
pub fn merge_bounds(boxes: impl IntoIterator<Item = (Vec3, Vec3)>) -> Option<(Vec3, Vec3)> {
    boxes
        .into_iter()
        .reduce(|(lo, hi), (min, max)| (lo.min(min), hi.max(max)))
}

/// Fit the camera to the model the frame after its scene was spawned.
pub fn frame_loaded_model(
    mut loader: ResMut<ModelLoader>,
    children: Query<&Children>,
    mesh_instances: Query<(&Mesh3d, &GlobalTransform)>,
    meshes: Res<Assets<Mesh>>,
    projections: Query<&Projection, With<Camera3d>>,
    mut viewport_camera: ResMut<ViewportCamera>,
) {
    let Some(root) = loader.pending_frame else {
        return;
    };
    loader.pending_frame = None;

    let boxes = children.iter_descendants(root).filter_map(|entity| {
        let (mesh, transform) = mesh_instances.get(entity).ok()?;
        mesh_bounds(meshes.get(&mesh.0)?, transform)
    });

    let Some((min, max)) = merge_bounds(boxes) else {
        warn!("Loaded model has no meshes to frame");
        return;
    };

    let fov = match projections.single() {
        Ok(Projection::Perspective(perspective)) => perspective.fov,
        _ => PerspectiveProjection::default().fov,
    };
    viewport_camera.frame_bounds(min, max, fov);

    info!(
        "Framed model: bounds {:?}..{:?}, distance {:.2}",
        min, max, viewport_camera.distance
    );
}

/// Log each loading stage once; a failure is also reported to the page.
/// The viewer keeps running with an empty scene after a failure.
pub fn track_model_load(
    mut loader: ResMut<ModelLoader>,
    asset_server: Res<AssetServer>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    if loader.stage.is_final() {
        return;
    }
    let Some(handle) = &loader.gltf else {
        return;
    };
    let Some((load, _, dependencies)) = asset_server.get_load_states(handle) else {
        return;
    };

    let stage = model_load_stage(&load, &dependencies);
    if stage == loader.stage {
        return;
    }
    loader.stage = stage;

    let path = loader.path.clone().unwrap_or_default();
    match stage {
        ModelLoadStage::NotStarted => {}
        ModelLoadStage::Loading => info!("Model {} loading...", path),
        ModelLoadStage::LoadingDependencies => {
            info!("Model {} parsed, loading buffers and textures", path)
        }
        ModelLoadStage::Loaded => info!("✓ Model {} loaded", path),
        ModelLoadStage::Failed => {
            let err = load_error(&load, &dependencies);
            error!("Failed to load model {}: {}", path, err);
            rpc_interface.send_notification(
                "model_load_failed",
                serde_json::json!({
                    "path": path,
                    "error": err,
                }),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn query_parameter_is_found() {
        assert_eq!(
            model_from_query("?model=models/bridge.glb"),
            Some("models/bridge.glb".to_string())
        );
        assert_eq!(
            model_from_query("?debug=1&model=a%20b.glb"),
            Some("a%20b.glb".to_string())
        );
        assert_eq!(model_from_query("?model="), None);
        assert_eq!(model_from_query(""), None);
        assert_eq!(model_from_query("?models=x.glb"), None);
    }

    #[test]
    fn box_follows_translation_and_scale() {
        let transform = GlobalTransform::from(
            Transform::from_xyz(10.0, 0.0, 0.0).with_scale(Vec3::splat(2.0)),
        );
        let (min, max) = world_aabb(Vec3::splat(-1.0), Vec3::splat(1.0), &transform);
        assert_eq!(min, Vec3::new(8.0, -2.0, -2.0));
        assert_eq!(max, Vec3::new(12.0, 2.0, 2.0));
    }

    #[test]
    fn rotated_box_grows() {
        let transform = GlobalTransform::from(Transform::from_rotation(Quat::from_rotation_y(
            std::f32::consts::FRAC_PI_4,
        )));
        let (min, max) = world_aabb(Vec3::splat(-1.0), Vec3::splat(1.0), &transform);
        assert_relative_eq!(max.x, 2.0_f32.sqrt(), epsilon = 1e-5);
        assert_relative_eq!(min.z, -(2.0_f32.sqrt()), epsilon = 1e-5);
        assert_relative_eq!(max.y, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn mesh_bounds_follow_the_instance_transform() {
        let mesh = Mesh::from(Cuboid::new(2.0, 4.0, 6.0));
        let transform = GlobalTransform::from(Transform::from_xyz(0.0, 10.0, 0.0));
        let (min, max) = mesh_bounds(&mesh, &transform).unwrap();
        assert_relative_eq!(min.y, 8.0, epsilon = 1e-5);
        assert_relative_eq!(max.y, 12.0, epsilon = 1e-5);
        assert_relative_eq!(max.z, 3.0, epsilon = 1e-5);
    }

    #[test]
    fn load_stage_waits_for_dependencies() {
        assert_eq!(
            model_load_stage(&LoadState::Loading, &RecursiveDependencyLoadState::Loading),
            ModelLoadStage::Loading
        );
        assert_eq!(
            model_load_stage(&LoadState::Loaded, &RecursiveDependencyLoadState::Loading),
            ModelLoadStage::LoadingDependencies
        );
        assert_eq!(
            model_load_stage(&LoadState::Loaded, &RecursiveDependencyLoadState::Loaded),
            ModelLoadStage::Loaded
        );
        assert_eq!(
            model_load_stage(&LoadState::NotLoaded, &RecursiveDependencyLoadState::NotLoaded),
            ModelLoadStage::NotStarted
        );
        assert!(ModelLoadStage::Loaded.is_final());
        assert!(!ModelLoadStage::LoadingDependencies.is_final());
    }

    #[test]
    fn merged_bounds_cover_all_boxes() {
        assert_eq!(merge_bounds(Vec::new()), None);
        let merged = merge_bounds([
            (Vec3::ZERO, Vec3::ONE),
            (Vec3::new(-2.0, 0.5, 0.0), Vec3::new(0.0, 0.7, 3.0)),
        ]);
        assert_eq!(
            merged,
            Some((Vec3::new(-2.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 3.0)))
        );
    }
}
