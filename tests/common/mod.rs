//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides core ECS runtime.
//! - we then call `rocket_runner::game::configure_headless` to install gameplay plugins.

use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::scene::ScenePlugin;
use bevy::state::app::StatesPlugin;
use std::time::Duration;

pub fn app_headless() -> App {
    let mut app = App::new();

    // Core ECS + states; AssetPlugin + ScenePlugin so SceneSpawner exists.
    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        AssetPlugin::default(),
        ScenePlugin,
    ));

    rocket_runner::game::configure_headless(&mut app);
    app
}

/// Advance virtual time by one 64 Hz fixed step and run a frame, so every
/// `update` drives exactly one simulation tick.
#[allow(dead_code)]
pub fn tick(app: &mut App) {
    app.world_mut()
        .resource_mut::<Time<Virtual>>()
        .advance_by(Duration::from_micros(15_625));
    app.update();
}

#[allow(dead_code)]
pub fn tick_n(app: &mut App, n: u32) {
    for _ in 0..n {
        tick(app);
    }
}
