//! Model loading and camera framing.
//!
//! The model is a glTF/GLB scene spawned as a `SceneRoot`. Once the scene is
//! instantiated the camera is fitted to the world-space bounds of its meshes;
//! a failed load is reported to the frontend and leaves an empty scene.

/// glTF scene spawning, load failure reporting and framing on first instantiation.
pub mod model_loader;
