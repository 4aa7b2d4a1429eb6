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

//! The Monte-Carlo tree search core: the node/tree data structure and its
//! selection-expansion-backup algorithm (`node`), root exploration noise
//! (`dirichlet`), move selection (`choose`), the readout-budget time
//! control (`time_control`), and the game driver that ties them together
//! into complete self-play games (`player`). `pool` runs many such games
//! concurrently against one shared network. `komi` draws a weighted random
//! starting komi so self-play data is not all generated at one fixed value.

mod choose;
mod dirichlet;
pub mod komi;
pub mod node;
mod player;
pub mod pool;
pub mod time_control;

pub use crate::choose::{argmax_visits, pick_move, temperature_cutoff};
pub use crate::komi::random_komi;
pub use crate::node::{
    backup_value, best_child, children_as_pi, expand, inject_root_noise, maybe_add_child,
    promote_to_root, select_leaf, Node, NodeRef, EXPLORATION_CONSTANT, ILLEGAL_PENALTY,
    ROOT_NOISE_WEIGHT
};
pub use crate::player::{max_game_depth, GameResult, Player, TrainingExample};
pub use crate::pool::{play_games, PoolGame};
pub use crate::time_control::{EarlyExit, RolloutLimit, TimeStrategy};
