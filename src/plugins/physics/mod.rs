//! Physics plugin.
//!
//! Global gravity stays zero: vertical acceleration is owned by the player
//! state machine, which writes it explicitly each tick. Avian integrates the
//! body velocity and maintains overlap data for the collision router.

use avian2d::prelude::*;
use bevy::prelude::*;

pub fn plugin(app: &mut App) {
    app.add_plugins(PhysicsPlugins::default());
    app.insert_resource(Gravity(Vec2::ZERO));
}
