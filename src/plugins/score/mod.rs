//! Score plugin: the thin consumer side of the `ScoreDelta` contract.
//!
//! The core never owns a running total; this plugin is the reference consumer
//! that folds deltas into a resource. Rendering the number is someone else's
//! job.

use bevy::prelude::*;

use crate::common::state::GameState;
use crate::plugins::collision::ScoreDelta;

#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Score(pub u32);

pub fn plugin(app: &mut App) {
    app.init_resource::<Score>();
    app.add_systems(OnEnter(GameState::InGame), reset);
    app.add_systems(
        FixedPostUpdate,
        apply_deltas.run_if(in_state(GameState::InGame)),
    );
}

fn reset(mut score: ResMut<Score>) {
    score.0 = 0;
}

fn apply_deltas(mut deltas: MessageReader<ScoreDelta>, mut score: ResMut<Score>) {
    for delta in deltas.read() {
        score.0 += delta.amount;
    }
}
