// Copyright 2024 Karl Sundequist Blomdahl <karl.sundequist.blomdahl@gmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Process-wide tunables, read once from the environment. Every value here
//! has a default that reproduces the behaviour described in the engine
//! specification; set the corresponding `DG_*` environment variable to
//! override it.

use std::env;

/// Parses an environment variable of the given name as `T`, falling back to
/// `default` if it is unset or fails to parse.
fn from_env<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name).ok().and_then(|value| value.parse().ok()).unwrap_or(default)
}

lazy_static! {
    /// The side length of the board. Typical values are `9` and `19`.
    pub static ref BOARD_SIZE: usize = from_env("DG_BOARD_SIZE", 19);

    /// The komi added to White's score, unless overridden per-game.
    pub static ref KOMI: f32 = from_env("DG_KOMI", 7.5);

    /// The per-move readout (rollout) budget `R`.
    pub static ref NUM_ROLLOUT: usize = from_env("DG_NUM_ROLLOUT", 1600);

    /// The PUCT exploration constant `c`.
    pub static ref EXPLORATION_CONSTANT: f32 = from_env("DG_EXPLORATION_CONSTANT", 5.0);

    /// The resignation threshold. A game resigns when `to_play * root.Q`
    /// drops below this (negative) value.
    pub static ref RESIGN_THRESHOLD: f32 = from_env("DG_RESIGN_THRESHOLD", -0.9);

    /// The fraction of games that have resignation disabled, for calibrating
    /// the resignation threshold against what a played-out game would have
    /// scored.
    pub static ref RESIGN_DISABLE_PROBABILITY: f32 = from_env("DG_RESIGN_DISABLE_PROBABILITY", 0.05);

    /// The number of self-play games to run concurrently.
    pub static ref NUM_GAMES: usize = from_env("DG_NUM_GAMES", 1);

    /// The number of worker threads the self-play pool runs at once (its
    /// `capacity`), defaulting to one game at a time.
    pub static ref NUM_THREADS: usize = from_env("DG_NUM_THREADS", 1);
}
