//! Collision router.
//!
//! Overlap facts come from Avian (`CollidingEntities`, refreshed every physics
//! tick). This module holds no state of its own: exactly-once semantics come
//! from the per-prop guards (`HazardArmed`, `PickupActive`) and from the
//! player state machine's idempotent `kill`.
//!
//! Producer → queue → consumer: effects that other components care about leave
//! as messages (`HazardHit`, `ScoreDelta`); the router never touches the score
//! or the scene.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::player::{self, AnimKey, JetpackOn, Player, PlayerState, VerticalAccel};
use crate::plugins::world::{
    inactive_pickup_layers, Hazard, HazardArmed, Pickup, PickupActive,
};

/// The player touched the live hazard. No payload; the kill itself is applied
/// by the router before this is written.
#[derive(Message, Debug, Clone, Copy)]
pub struct HazardHit;

/// One pickup collected. Always `amount: 1`; the running total lives outside
/// the core.
#[derive(Message, Debug, Clone, Copy)]
pub struct ScoreDelta {
    pub amount: u32,
}

pub fn plugin(app: &mut App) {
    app.add_message::<HazardHit>().add_message::<ScoreDelta>();

    app.add_systems(
        FixedPostUpdate,
        route_overlaps
            .after(player::clamp_to_band)
            .run_if(in_state(GameState::InGame)),
    );
}

/// Walk the player's current overlap set and apply hazard/pickup effects.
///
/// Runs every tick; continued overlap is harmless because each effect is
/// gated by a flag that this pass turns off (and only recycling turns on).
pub fn route_overlaps(
    tunables: Res<Tunables>,
    mut hazard_writer: MessageWriter<HazardHit>,
    mut score_writer: MessageWriter<ScoreDelta>,
    mut q_player: Query<
        (
            &CollidingEntities,
            &mut PlayerState,
            &mut LinearVelocity,
            &mut VerticalAccel,
            &mut AnimKey,
            &mut JetpackOn,
        ),
        With<Player>,
    >,
    mut q_hazards: Query<&mut HazardArmed, With<Hazard>>,
    mut q_pickups: Query<
        (&mut PickupActive, &mut Visibility, &mut CollisionLayers),
        With<Pickup>,
    >,
) {
    let Ok((contacts, mut state, mut vel, mut accel, mut anim, mut jetpack)) =
        q_player.single_mut()
    else {
        return;
    };

    for &other in contacts.iter() {
        if let Ok(mut armed) = q_hazards.get_mut(other) {
            if armed.0 && *state == PlayerState::Running {
                armed.0 = false;
                let applied = player::kill(
                    &mut state,
                    &mut vel,
                    &mut accel,
                    &mut anim,
                    &mut jetpack,
                    &tunables,
                );
                debug_assert!(applied, "armed hazard must only fire on a running player");
                hazard_writer.write(HazardHit);
            }
            continue;
        }

        if let Ok((mut active, mut vis, mut layers)) = q_pickups.get_mut(other) {
            if !active.0 {
                continue;
            }
            // Collection is a pure deactivation; the wave respawn pass owns
            // reactivation, which makes collection exactly-once per spawn.
            active.0 = false;
            *vis = Visibility::Hidden;
            *layers = inactive_pickup_layers();
            score_writer.write(ScoreDelta { amount: 1 });
        }
    }
}
