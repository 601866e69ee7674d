use crate::tools::measure::session::ViewerSession;
use bevy::prelude::*;

#[derive(Component)]
pub struct StatusText;

pub fn create_native_overlays(commands: &mut Commands) {
    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(0.1, 0.1, 0.1)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(12.0),
                    left: Val::Px(12.0),
                    ..default()
                },
                StatusText,
            ));
        });
}

pub fn status_text_update_system(
    session: Res<ViewerSession>,
    mut query: Query<&mut Text, With<StatusText>>,
) {
    if !session.is_changed() {
        return;
    }
    for mut text in &mut query {
        text.0 = session.status_line();
    }
}
