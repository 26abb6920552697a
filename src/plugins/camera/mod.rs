//! Camera plugin (render-only).
//!
//! The gameplay core scrolls through `CameraScroll`; the render camera just
//! mirrors it. Fixed y, x pinned to the scroll — the view never eases, so the
//! recycling edge math and what the player sees are the same number.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::world::CameraScroll;

#[derive(Component)]
pub struct MainCamera;

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::InGame), spawn_camera)
        .add_systems(
            PostUpdate,
            follow_scroll
                .before(TransformSystems::Propagate)
                .run_if(in_state(GameState::InGame)),
        );
}

fn spawn_camera(mut commands: Commands, tunables: Res<Tunables>) {
    commands.spawn((
        Name::new("MainCamera"),
        Camera2d,
        MainCamera,
        Transform::from_xyz(
            tunables.viewport.x * 0.5,
            tunables.viewport.y * 0.5,
            999.0,
        ),
        DespawnOnExit(GameState::InGame),
    ));
}

fn follow_scroll(
    tunables: Res<Tunables>,
    scroll: Res<CameraScroll>,
    mut q_cam: Query<&mut Transform, With<MainCamera>>,
) {
    let Ok(mut tf) = q_cam.single_mut() else {
        return;
    };
    tf.translation.x = scroll.x + tunables.viewport.x * 0.5;
}
