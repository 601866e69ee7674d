use bevy::prelude::*;

/// Loading waits for the viewer config; the model itself streams in while running.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Hash, States)]
pub enum AppState {
    #[default]
    Loading,
    Running,
}
