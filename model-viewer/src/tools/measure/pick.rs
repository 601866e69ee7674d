use bevy::math::{Vec2, Vec3};

/// Maps a viewport position (logical pixels) to the nearest visible surface point.
pub trait PickService {
    fn pick(&mut self, screen: Vec2) -> Option<Vec3>;
}

impl<F> PickService for F
where
    F: FnMut(Vec2) -> Option<Vec3>,
{
    fn pick(&mut self, screen: Vec2) -> Option<Vec3> {
        self(screen)
    }
}
