//! Distance, angle and area measurement on the loaded model.
//!
//! The interaction core ([`session`]) is plain Rust: it only sees the
//! [`pick::PickService`] and [`annotation::AnnotationRenderer`] traits, so it is
//! tested headlessly. [`input`] is the Bevy glue that feeds it pointer events
//! and hands it the scene-backed picker and annotator.

/// Drawing contract: layers, styles and the renderer trait.
pub mod annotation;

/// Cursor and left-button handling with click/drag separation.
pub mod input;

/// Screen-to-surface picking contract.
pub mod pick;

/// Measurement state machine and completed measurement records.
pub mod session;

/// Scene-unit to display-unit conversion and label text.
pub mod units;
