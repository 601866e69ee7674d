use bevy::asset::AssetMetaCheck;
use bevy::prelude::*;
use bevy_common_assets::json::JsonAssetPlugin;
use constants::render_settings::BACKGROUND_COLOUR;
// Crate engine modules
use crate::engine::annotations::position_annotation_labels;
use crate::engine::camera::viewport_camera::{ViewportCamera, camera_controller};
use crate::engine::core::app_state::AppState;
use crate::engine::core::config::{
    ConfigLoader, ViewerConfig, apply_config_when_ready, start_loading,
};
use crate::engine::core::window_config::create_window_config;
use crate::engine::loading::model_loader::{
    ModelLoader, frame_loaded_model, track_model_load,
};
// Crate tools modules
use crate::tools::measure::input::{
    MeasurementCompletedEvent, PointerTracker, measurement_input_system,
    notify_completed_measurements,
};
use crate::tools::measure::session::ViewerSession;
use crate::tools::tool_manager::{
    CancelMeasurementEvent, ClearMeasurementsEvent, ModeCommandEvent, handle_cancel_events,
    handle_cancel_shortcut, handle_clear_events, handle_mode_command_events,
    handle_mode_keyboard_shortcuts,
};
// Create Web RPC modules
use crate::rpc::web_rpc::WebRpcPlugin;

#[cfg(not(target_arch = "wasm32"))]
use crate::engine::core::status::{create_native_overlays, status_text_update_system};

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        // Registers ViewerConfig as a loadable asset type from JSON files.
        .add_plugins(JsonAssetPlugin::<ViewerConfig>::new(&["viewer.json"]))
        .add_plugins(WebRpcPlugin)
        .insert_resource(ClearColor(BACKGROUND_COLOUR));

    // Initialise resources early
    app.init_resource::<ConfigLoader>()
        .init_resource::<ModelLoader>()
        .init_resource::<ViewerSession>()
        .init_resource::<ViewportCamera>()
        .init_resource::<PointerTracker>()
        .add_event::<ModeCommandEvent>()
        .add_event::<CancelMeasurementEvent>()
        .add_event::<ClearMeasurementsEvent>()
        .add_event::<MeasurementCompletedEvent>();

    // State-based system scheduling
    app.add_systems(Startup, (setup, start_loading).chain())
        .add_systems(
            Update,
            apply_config_when_ready.run_if(in_state(AppState::Loading)),
        );

    // Input is read first, then mode changes, then pointer handling, so a
    // mode switch and a click in the same frame apply in that order.
    let runtime_systems = (
        handle_cancel_shortcut,
        handle_mode_keyboard_shortcuts, // Native shortcuts or no-op for WASM
        handle_mode_command_events,
        handle_cancel_events,
        handle_clear_events,
        measurement_input_system,
        notify_completed_measurements,
        track_model_load,
        frame_loaded_model,
        camera_controller,
        position_annotation_labels,
    )
        .chain();

    app.add_systems(Update, runtime_systems.run_if(in_state(AppState::Running)));

    #[cfg(not(target_arch = "wasm32"))]
    {
        app.add_systems(
            Update,
            status_text_update_system.run_if(in_state(AppState::Running)),
        );
    }

    app
}

fn spawn_lighting(commands: &mut Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::ZYX,
            0.0,
            1.0,
            -std::f32::consts::FRAC_PI_4,
        )),
    ));
    commands.insert_resource(AmbientLight {
        brightness: 400.0,
        ..default()
    });
}

fn spawn_camera(commands: &mut Commands) {
    commands.spawn((Camera3d::default(), ViewportCamera::default().transform()));
}

// Startup system that only handles basic initialisation
fn setup(mut commands: Commands) {
    spawn_lighting(&mut commands);
    spawn_camera(&mut commands);

    #[cfg(not(target_arch = "wasm32"))]
    {
        create_native_overlays(&mut commands);
    }
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
