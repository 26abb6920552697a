//! Core plugin: shared resources and global settings.

use bevy::prelude::*;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::common::tunables::Tunables;

/// Deterministic RNG behind every placement draw.
///
/// Seeded once at startup; tests pin `Tunables::rng_seed` to replay sessions.
#[derive(Resource, Debug)]
pub struct WorldRng(pub Pcg32);

impl WorldRng {
    pub fn from_tunables(tunables: &Tunables) -> Self {
        let seed = tunables
            .rng_seed
            .unwrap_or_else(|| rand::rng().random::<u64>());
        Self(Pcg32::seed_from_u64(seed))
    }
}

pub fn plugin(app: &mut App) {
    let tunables = Tunables::default();
    // Configuration defects abort here, before any system can read them.
    tunables.validate();

    app.insert_resource(WorldRng::from_tunables(&tunables));
    app.insert_resource(tunables);
    app.insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.07)));
}
