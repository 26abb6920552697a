//! Player plugin: the Running → Killed → Dead state machine.
//!
//! Pipeline:
//! - Update: sample boost input, write BoostInput resource
//! - FixedUpdate: drive the state machine, then integrate vertical acceleration
//! - FixedPostUpdate (after physics): clamp into the ground/ceiling band
//!
//! Design notes:
//! - `PlayerState` is an explicit enum with forward-only transitions, dispatched
//!   via one `match` per tick. Transition legality lives in exactly two places:
//!   `drive_state` (Killed → Dead) and `kill` (Running → Killed).
//! - Acceleration, animation key, and the jetpack flame flag are derived facts:
//!   only `drive_state` and `kill` write them. The flame sprite entity is pure
//!   presentation and just mirrors `JetpackOn`.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use bevy::time::Fixed;

use crate::common::{layers::Layer, state::GameState, tunables::Tunables};

/// Half-extents of the player's collision box, tighter than the sprite so
/// grazing a laser visually before touching it does not kill.
pub const BODY_HALF: Vec2 = Vec2::new(22.0, 37.0);

pub const SPRITE_SIZE: Vec2 = Vec2::new(88.0, 106.0);

#[derive(Component)]
pub struct Player;

/// Forward-only lifecycle. Running is entered once at spawn; Dead is terminal
/// for the session.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerState {
    #[default]
    Running,
    Killed,
    Dead,
}

/// Symbolic animation key handed to the renderer. The core never touches
/// frames or textures.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimKey {
    #[default]
    RunLoop,
    Fall,
    Dead,
}

/// Vertical acceleration in px/s², signed (+up). Written only by the state
/// machine; integrated once per fixed tick.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct VerticalAccel(pub f32);

/// Whether the body rests on the ground band. Maintained by `clamp_to_band`.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Grounded(pub bool);

/// Gameplay truth for the jetpack flame; the flame sprite mirrors this.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct JetpackOn(pub bool);

/// Marker for the flame overlay sprite (child of the player).
#[derive(Component)]
pub struct JetpackFlame;

/// Boost signal sampled fresh every frame; never latched.
#[derive(Resource, Default, Debug)]
pub struct BoostInput {
    pub active: bool,
}

/// Written every fixed tick while the player is Dead. Consumers own the
/// debounce; re-triggering an in-progress game-over transition must be a
/// no-op on their side.
#[derive(Message, Debug, Clone, Copy)]
pub struct PlayerDead;

pub fn plugin(app: &mut App) {
    app.insert_resource(BoostInput::default())
        .add_message::<PlayerDead>()
        .add_systems(OnEnter(GameState::InGame), spawn)
        .add_systems(Update, (gather_input, sync_flame_visibility))
        .add_systems(
            FixedUpdate,
            (drive_state, integrate_vertical)
                .chain()
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            FixedPostUpdate,
            clamp_to_band
                .after(PhysicsSet::Sync)
                .run_if(in_state(GameState::InGame)),
        );
}

fn spawn(mut commands: Commands, tunables: Res<Tunables>) {
    let layers = CollisionLayers::new(Layer::Player, [Layer::Hazard, Layer::Pickup]);

    commands
        .spawn((
            Name::new("Player"),
            Player,
            PlayerState::Running,
            AnimKey::RunLoop,
            VerticalAccel(-tunables.fall_accel),
            Grounded(true),
            JetpackOn(false),
            Sprite {
                color: Color::srgb(0.85, 0.8, 0.75),
                custom_size: Some(SPRITE_SIZE),
                ..default()
            },
            Transform::from_xyz(tunables.viewport.x * 0.5, tunables.ground_y, 1.0),
            // Dynamic so overlap pairs against the static sensors are always
            // detected; with zero gravity and no contact response the state
            // machine stays the only writer of motion.
            RigidBody::Dynamic,
            LockedAxes::ROTATION_LOCKED,
            Collider::rectangle(BODY_HALF.x * 2.0, BODY_HALF.y * 2.0),
            layers,
            LinearVelocity(Vec2::new(tunables.run_speed, 0.0)),
            CollidingEntities::default(),
            CollisionEventsEnabled,
            DespawnOnExit(GameState::InGame),
        ))
        .with_children(|parent| {
            parent.spawn((
                Name::new("JetpackFlame"),
                JetpackFlame,
                Sprite {
                    color: Color::srgb(1.0, 0.55, 0.1),
                    custom_size: Some(Vec2::new(30.0, 40.0)),
                    ..default()
                },
                Transform::from_xyz(-63.0, -15.0, -0.1),
                Visibility::Hidden,
            ));
        });
}

fn gather_input(keys: Res<ButtonInput<KeyCode>>, mut input: ResMut<BoostInput>) {
    input.active = keys.pressed(KeyCode::Space);
}

/// Running → Killed. Idempotent: a hazard overlap while already Killed or Dead
/// changes nothing. Returns whether the transition applied.
pub fn kill(
    state: &mut PlayerState,
    velocity: &mut LinearVelocity,
    accel: &mut VerticalAccel,
    anim: &mut AnimKey,
    jetpack: &mut JetpackOn,
    tunables: &Tunables,
) -> bool {
    if *state != PlayerState::Running {
        return false;
    }

    *state = PlayerState::Killed;
    velocity.0 = Vec2::new(tunables.knockback_speed, 0.0);
    accel.0 = 0.0;
    *anim = AnimKey::Dead;
    jetpack.0 = false;
    true
}

/// The per-tick state switch.
fn drive_state(
    tunables: Res<Tunables>,
    boost: Res<BoostInput>,
    mut dead_writer: MessageWriter<PlayerDead>,
    mut q_player: Query<
        (
            &mut PlayerState,
            &mut LinearVelocity,
            &mut VerticalAccel,
            &mut AnimKey,
            &mut JetpackOn,
            &Grounded,
        ),
        With<Player>,
    >,
) {
    let Ok((mut state, mut vel, mut accel, mut anim, mut jetpack, grounded)) =
        q_player.single_mut()
    else {
        return;
    };

    match *state {
        PlayerState::Running => {
            let was_on = jetpack.0;

            if boost.active {
                accel.0 = tunables.boost_accel;
                jetpack.0 = true;
            } else {
                accel.0 = -tunables.fall_accel;
                jetpack.0 = false;
            }

            // Forward speed is held constant while running.
            vel.x = tunables.run_speed;

            // Animation priority: ground contact, then falling pose.
            if grounded.0 {
                *anim = AnimKey::RunLoop;
            } else if vel.y < 0.0 {
                *anim = AnimKey::Fall;
            }

            // Igniting the jetpack forces the fall pose immediately, even
            // before vertical velocity turns around.
            if jetpack.0 && !was_on {
                *anim = AnimKey::Fall;
            }
        }
        PlayerState::Killed => {
            accel.0 = 0.0;

            // Deterministic air drag, applied once per tick.
            vel.x *= tunables.knockback_damping;

            if vel.x.abs() <= tunables.dead_speed_threshold {
                *state = PlayerState::Dead;
                vel.0 = Vec2::ZERO;
            }
        }
        PlayerState::Dead => {
            vel.0 = Vec2::ZERO;
            accel.0 = 0.0;
            dead_writer.write(PlayerDead);
        }
    }
}

/// Integrate vertical acceleration into velocity. Avian integrates the
/// body velocity into position during the physics step.
fn integrate_vertical(
    time: Res<Time<Fixed>>,
    mut q_player: Query<(&VerticalAccel, &mut LinearVelocity), With<Player>>,
) {
    let dt = time.delta_secs();
    let Ok((accel, mut vel)) = q_player.single_mut() else {
        return;
    };
    vel.y += accel.0 * dt;
}

/// Keep the body inside the ground/ceiling band and maintain ground contact.
/// Runs after the physics step so it sees the integrated transform.
pub fn clamp_to_band(
    tunables: Res<Tunables>,
    mut q_player: Query<(&mut Transform, &mut LinearVelocity, &mut Grounded), With<Player>>,
) {
    let Ok((mut tf, mut vel, mut grounded)) = q_player.single_mut() else {
        return;
    };

    if tf.translation.y <= tunables.ground_y {
        tf.translation.y = tunables.ground_y;
        if vel.y < 0.0 {
            vel.y = 0.0;
        }
        grounded.0 = true;
    } else {
        grounded.0 = false;
        if tf.translation.y >= tunables.ceiling_y {
            tf.translation.y = tunables.ceiling_y;
            if vel.y > 0.0 {
                vel.y = 0.0;
            }
        }
    }
}

/// Presentation: the flame sprite mirrors the gameplay flag.
fn sync_flame_visibility(
    q_player: Query<&JetpackOn, With<Player>>,
    mut q_flame: Query<&mut Visibility, With<JetpackFlame>>,
) {
    let Ok(jetpack) = q_player.single() else {
        return;
    };
    for mut vis in &mut q_flame {
        *vis = if jetpack.0 {
            Visibility::Inherited
        } else {
            Visibility::Hidden
        };
    }
}
