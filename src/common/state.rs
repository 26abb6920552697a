//! Global state machine.
//!
//! Menu and game-over screens live outside this crate; they are driven by the
//! `PlayerDead` message. The core only knows about the running session.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, States, Default)]
pub enum GameState {
    #[default]
    InGame,
}
