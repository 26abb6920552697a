//! World plugin: camera scroll, prop recycling, and the tiled background.
//!
//! The illusion of an endless level comes from a fixed set of props that wrap
//! around the camera: once a prop has fully scrolled past the left edge it is
//! relocated to a random position ahead of the right edge. Placement draws go
//! through `WorldRng` so a seeded session replays exactly.
//!
//! Ordering discipline (all FixedPostUpdate, after the collision router):
//! 1. `advance_scroll`   — one scroll snapshot per tick, monotonic
//! 2. `recycle_props`    — hole/windows/bookcases/hazard wrap-around
//! 3. `suppress_overlapping_windows` — avoid-set visibility rule
//! 4. `respawn_pickup_wave` — coarse-boundary pickup wave relayout
//! 5. `tile_background`  — continuous re-tiling, no position resets

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;
use rand::Rng;

use crate::common::{
    layers::Layer,
    state::GameState,
    tunables::{GapBand, Tunables},
};
use crate::plugins::collision;
use crate::plugins::core::WorldRng;
use crate::plugins::player::Player;

pub const HOLE_WIDTH: f32 = 128.0;
pub const WINDOW_WIDTH: f32 = 128.0;
pub const BOOKCASE_WIDTH: f32 = 160.0;
pub const HAZARD_WIDTH: f32 = 100.0;
pub const HAZARD_HEIGHT: f32 = 64.0;
pub const PICKUP_WIDTH: f32 = 48.0;
pub const TILE_WIDTH: f32 = 256.0;

/// How many pickup entities exist in the pool; a wave activates 1..=20 of them.
pub const PICKUP_POOL: usize = 20;

// -----------------------------------------------------------------------------
// Resources
// -----------------------------------------------------------------------------

/// Camera scroll in world units. Monotonically non-decreasing for the session;
/// every recycling threshold is expressed relative to it. Written once per
/// tick by `advance_scroll`, read-only everywhere else.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct CameraScroll {
    pub x: f32,
}

impl CameraScroll {
    #[inline]
    pub fn right_edge(&self, tunables: &Tunables) -> f32 {
        self.x + tunables.viewport.x
    }
}

// -----------------------------------------------------------------------------
// Components
// -----------------------------------------------------------------------------

/// Prop groups share the recycling mechanism and differ in policy data only.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropKind {
    Hole,
    Window,
    Bookcase,
    Hazard,
}

impl PropKind {
    fn gap(self, tunables: &Tunables) -> GapBand {
        match self {
            PropKind::Hole => tunables.hole_gap,
            PropKind::Window => tunables.window_gap,
            PropKind::Bookcase => tunables.bookcase_gap,
            PropKind::Hazard => tunables.hazard_gap,
        }
    }
}

/// A prop that wraps around the camera.
#[derive(Component, Debug, Clone, Copy)]
pub struct Recyclable {
    pub kind: PropKind,
    pub width: f32,
}

/// Second-of-a-pair props place themselves past their sibling instead of the
/// camera edge, so pairs keep their staggered rhythm.
#[derive(Component, Debug, Clone, Copy)]
pub struct ChainAfter(pub Entity);

/// Windows hide instead of redrawing when they land on a bookcase. One draw
/// per prop per tick; an absent decoration beats a retry loop.
#[derive(Component, Debug, Clone, Copy)]
pub struct AvoidsBookcases;

/// Set when a prop relocates this tick; consumed by the overlap suppressor.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct JustRelocated(pub bool);

#[derive(Component, Debug, Clone, Copy)]
pub struct Bookcase;

/// The fatal laser. `armed` gates the kill so continued overlap cannot
/// retrigger it; recycling re-arms.
#[derive(Component)]
pub struct Hazard;

#[derive(Component, Debug, Clone, Copy)]
pub struct HazardArmed(pub bool);

/// A score pickup. `active` gates collection; only the wave respawn pass may
/// reactivate a collected pickup.
#[derive(Component)]
pub struct Pickup;

#[derive(Component, Debug, Clone, Copy)]
pub struct PickupActive(pub bool);

/// Background tiles are never recycled; their x is re-derived from the scroll
/// every tick, which tiles seamlessly without resets.
#[derive(Component, Debug, Clone, Copy)]
pub struct BackgroundTile {
    pub index: u32,
}

// -----------------------------------------------------------------------------
// Collision layer helpers ("disabled" without structural changes)
// -----------------------------------------------------------------------------

#[inline]
pub fn active_pickup_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Pickup, [Layer::Player])
}

/// Empty filters: a collected pickup overlaps nothing until respawned.
#[inline]
pub fn inactive_pickup_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Pickup, [] as [Layer; 0])
}

// -----------------------------------------------------------------------------
// Plugin wiring
// -----------------------------------------------------------------------------

pub fn plugin(app: &mut App) {
    app.insert_resource(CameraScroll::default());

    app.add_systems(
        OnEnter(GameState::InGame),
        (spawn_background, spawn_decorations, spawn_hazard, spawn_pickups),
    );

    app.add_systems(
        FixedPostUpdate,
        (
            advance_scroll,
            recycle_props,
            suppress_overlapping_windows,
            respawn_pickup_wave,
            tile_background,
        )
            .chain()
            .after(collision::route_overlaps)
            .run_if(in_state(GameState::InGame)),
    );
}

// -----------------------------------------------------------------------------
// Spawn (asset-free: solid-colour sprites, like the rest of the project)
// -----------------------------------------------------------------------------

fn spawn_background(mut commands: Commands, tunables: Res<Tunables>) {
    let tiles = (tunables.viewport.x / TILE_WIDTH).ceil() as u32 + 2;
    let y = tunables.viewport.y * 0.5;

    for index in 0..tiles {
        let color = if index % 2 == 0 {
            Color::srgb(0.14, 0.14, 0.16)
        } else {
            Color::srgb(0.12, 0.12, 0.14)
        };

        commands.spawn((
            Name::new(format!("BackgroundTile{index}")),
            BackgroundTile { index },
            Sprite {
                color,
                custom_size: Some(Vec2::new(TILE_WIDTH, tunables.viewport.y)),
                ..default()
            },
            Transform::from_xyz(index as f32 * TILE_WIDTH, y, -1.0),
            DespawnOnExit(GameState::InGame),
        ));
    }
}

fn spawn_decor(
    commands: &mut Commands,
    name: &str,
    kind: PropKind,
    width: f32,
    x: f32,
    y: f32,
    color: Color,
) -> Entity {
    commands
        .spawn((
            Name::new(name.to_owned()),
            Recyclable { kind, width },
            JustRelocated(false),
            Sprite {
                color,
                custom_size: Some(Vec2::new(width, width)),
                ..default()
            },
            Transform::from_xyz(x, y, 0.0),
            DespawnOnExit(GameState::InGame),
        ))
        .id()
}

fn spawn_decorations(mut commands: Commands, mut rng: ResMut<WorldRng>) {
    let hole_x = rng.0.random_range(900.0..=1500.0);
    spawn_decor(
        &mut commands,
        "MouseHole",
        PropKind::Hole,
        HOLE_WIDTH,
        hole_x,
        139.0,
        Color::srgb(0.08, 0.07, 0.07),
    );

    let w1_x = rng.0.random_range(900.0..=1300.0);
    let w2_x = rng.0.random_range(1600.0..=2000.0);
    let window_color = Color::srgb(0.55, 0.7, 0.9);
    let w1 = spawn_decor(&mut commands, "Window1", PropKind::Window, WINDOW_WIDTH, w1_x, 440.0, window_color);
    let w2 = spawn_decor(&mut commands, "Window2", PropKind::Window, WINDOW_WIDTH, w2_x, 440.0, window_color);
    commands.entity(w1).insert(AvoidsBookcases);
    commands.entity(w2).insert((AvoidsBookcases, ChainAfter(w1)));

    let b1_x = rng.0.random_range(2200.0..=2700.0);
    let b2_x = rng.0.random_range(2900.0..=3400.0);
    let bookcase_color = Color::srgb(0.45, 0.3, 0.2);
    let b1 = spawn_decor(&mut commands, "Bookcase1", PropKind::Bookcase, BOOKCASE_WIDTH, b1_x, 60.0, bookcase_color);
    let b2 = spawn_decor(&mut commands, "Bookcase2", PropKind::Bookcase, BOOKCASE_WIDTH, b2_x, 60.0, bookcase_color);
    commands.entity(b1).insert(Bookcase);
    commands.entity(b2).insert((Bookcase, ChainAfter(b1)));
}

fn spawn_hazard(mut commands: Commands) {
    commands.spawn((
        Name::new("Laser"),
        Hazard,
        HazardArmed(true),
        Recyclable {
            kind: PropKind::Hazard,
            width: HAZARD_WIDTH,
        },
        JustRelocated(false),
        Sprite {
            color: Color::srgb(0.95, 0.2, 0.25),
            custom_size: Some(Vec2::new(HAZARD_WIDTH, HAZARD_HEIGHT)),
            ..default()
        },
        Transform::from_xyz(900.0, 540.0, 0.5),
        RigidBody::Static,
        Collider::rectangle(HAZARD_WIDTH, HAZARD_HEIGHT),
        Sensor,
        CollisionLayers::new(Layer::Hazard, [Layer::Player]),
        CollisionEventsEnabled,
        DespawnOnExit(GameState::InGame),
    ));
}

/// Pre-spawn the whole pickup pool, parked off-screen-left and inactive. The
/// first `respawn_pickup_wave` pass lays out the opening wave through the same
/// code path every later wave uses.
fn spawn_pickups(mut commands: Commands) {
    for i in 0..PICKUP_POOL {
        commands.spawn((
            Name::new(format!("Pickup{i}")),
            Pickup,
            PickupActive(false),
            Sprite {
                color: Color::srgb(0.95, 0.8, 0.2),
                custom_size: Some(Vec2::splat(PICKUP_WIDTH)),
                ..default()
            },
            Transform::from_xyz(-2.0 * PICKUP_WIDTH, 200.0, 0.5),
            Visibility::Hidden,
            RigidBody::Static,
            Collider::circle(PICKUP_WIDTH * 0.5),
            Sensor,
            inactive_pickup_layers(),
            CollisionEventsEnabled,
            DespawnOnExit(GameState::InGame),
        ));
    }
}

// -----------------------------------------------------------------------------
// Per-tick systems
// -----------------------------------------------------------------------------

/// Advance the scroll from the player's forward motion. `max` keeps it
/// monotonic: the knockback never drags the world backwards.
pub fn advance_scroll(
    tunables: Res<Tunables>,
    mut scroll: ResMut<CameraScroll>,
    q_player: Query<&Transform, With<Player>>,
) {
    let Ok(tf) = q_player.single() else {
        return;
    };
    scroll.x = scroll.x.max(tf.translation.x - tunables.viewport.x * 0.5);
}

/// Draw a relocation x for a prop. The lower bound is lifted to
/// `right_edge + width` so a freshly relocated prop can never be visible,
/// whatever the configured gap band says.
fn draw_ahead(rng: &mut WorldRng, base_x: f32, right_edge: f32, width: f32, gap: GapBand) -> f32 {
    let lo = (base_x + gap.min).max(right_edge + width);
    rng.0.random_range(lo..=lo + gap.range)
}

/// The generic wrap-around pass. At most one relocation per prop per tick.
pub fn recycle_props(
    tunables: Res<Tunables>,
    scroll: Res<CameraScroll>,
    mut rng: ResMut<WorldRng>,
    mut q_props: Query<(
        Entity,
        &Recyclable,
        Option<&ChainAfter>,
        &mut Transform,
        &mut JustRelocated,
        Option<&mut HazardArmed>,
    )>,
) {
    // One edge snapshot per tick; relocations this tick must not feed back
    // into later eligibility or sibling bases.
    let right_edge = scroll.right_edge(&tunables);
    let snapshot: Vec<(Entity, f32)> = q_props
        .iter()
        .map(|(e, _, _, tf, _, _)| (e, tf.translation.x))
        .collect();

    for (_, prop, chain, mut tf, mut relocated, armed) in &mut q_props {
        relocated.0 = false;

        if tf.translation.x + prop.width >= scroll.x {
            continue;
        }

        let base_x = chain
            .and_then(|ChainAfter(sibling)| {
                snapshot.iter().find(|(e, _)| e == sibling).map(|(_, x)| *x)
            })
            .map(|x| x.max(right_edge))
            .unwrap_or(right_edge);

        let gap = prop.kind.gap(&tunables);
        tf.translation.x = draw_ahead(&mut rng, base_x, right_edge, prop.width, gap);
        relocated.0 = true;

        if prop.kind == PropKind::Hazard {
            tf.translation.y = rng
                .0
                .random_range(tunables.hazard_y.0..=tunables.hazard_y.1);
            if let Some(mut armed) = armed {
                armed.0 = true;
            }
        }
    }
}

/// Avoid-set rule: a window that relocated onto a bookcase hides for this
/// cycle instead of redrawing. Bounded to one draw attempt per relocation.
pub fn suppress_overlapping_windows(
    mut q_windows: Query<
        (&Recyclable, &Transform, &mut JustRelocated, &mut Visibility),
        With<AvoidsBookcases>,
    >,
    q_bookcases: Query<&Transform, (With<Bookcase>, Without<AvoidsBookcases>)>,
) {
    for (prop, tf, mut relocated, mut vis) in &mut q_windows {
        if !relocated.0 {
            continue;
        }
        relocated.0 = false;

        let overlaps = q_bookcases
            .iter()
            .any(|bc| (tf.translation.x - bc.translation.x).abs() <= prop.width);

        *vis = if overlaps {
            Visibility::Hidden
        } else {
            Visibility::Visible
        };
    }
}

/// Coarse recycling boundary: once the entire wave (collected or not) has
/// scrolled past the left edge, lay out a fresh one ahead of the camera.
/// This is the only place a collected pickup comes back to life.
pub fn respawn_pickup_wave(
    tunables: Res<Tunables>,
    scroll: Res<CameraScroll>,
    mut rng: ResMut<WorldRng>,
    mut q_pickups: Query<
        (
            &mut Transform,
            &mut Visibility,
            &mut PickupActive,
            &mut CollisionLayers,
        ),
        With<Pickup>,
    >,
) {
    let any_pending = q_pickups
        .iter()
        .any(|(tf, ..)| tf.translation.x + PICKUP_WIDTH >= scroll.x);
    if any_pending {
        return;
    }

    let right_edge = scroll.right_edge(&tunables);
    let (lo, hi) = tunables.pickup_count;
    let count = rng.0.random_range(lo..=hi);

    let mut x = right_edge + tunables.pickup_lead;
    let y_band = tunables.pickup_margin..=(tunables.viewport.y - tunables.pickup_margin);

    for (i, (mut tf, mut vis, mut active, mut layers)) in q_pickups.iter_mut().enumerate() {
        tf.translation.x = x;
        tf.translation.y = rng.0.random_range(y_band.clone());

        // The whole pool is parked left-to-right; only the first `count` are
        // live. Parked ones keep the wave boundary honest.
        let live = (i as u32) < count;
        active.0 = live;
        *vis = if live {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
        *layers = if live {
            active_pickup_layers()
        } else {
            inactive_pickup_layers()
        };

        x += PICKUP_WIDTH * tunables.pickup_spacing_factor;
    }
}

/// Re-derive tile positions from the scroll. Continuous: the strip wraps by
/// whole pattern periods (two tiles, so the alternating shades keep phase)
/// and no seam is ever on screen.
pub fn tile_background(
    scroll: Res<CameraScroll>,
    mut q_tiles: Query<(&BackgroundTile, &mut Transform)>,
) {
    let period = TILE_WIDTH * 2.0;
    let base = (scroll.x / period).floor() * period;
    for (tile, mut tf) in &mut q_tiles {
        tf.translation.x = base + tile.index as f32 * TILE_WIDTH + TILE_WIDTH * 0.5;
    }
}

#[cfg(test)]
mod tests;
