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

//! Runs many independent self-play games concurrently against one shared
//! network -- spec.md section 5's "Parallelism across games": each game owns
//! its own tree, and the only thing they share is the network, which must
//! tolerate concurrent callers (section 4.4). There is no parallelism
//! *within* a single game's tree here (section 5's "Ordering" -- readouts
//! within one game stay strictly sequential); this module only ever runs
//! whole games side by side, the same division of labour as the teacher's
//! `libdg_mcts::pool::Pool` (a fixed-capacity worker pool pulling games off a
//! shared counter against one `Arc`-shared predictor).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use dg_go::Position;
use dg_nn::Network;

use crate::player::{GameResult, Player, TrainingExample};

/// One finished game's outcome, training examples, and SGF record.
pub struct PoolGame {
    pub result: GameResult,
    pub examples: Vec<TrainingExample>,
    pub sgf: String
}

/// Plays `num_games` complete self-play games against `network`, with at
/// most `capacity` of them running concurrently at any one time. `new_position`
/// is invoked once per game with that game's own seeded RNG, so callers can,
/// e.g., draw a fresh random komi per game the way the teacher's
/// `get_random_komi` does ([`crate::komi::random_komi`]) while staying
/// reproducible; each game's RNG is derived from `seed` and the game's
/// index, so a run is reproducible regardless of how the games happen to
/// interleave across threads.
///
/// `capacity` is clamped to at least `1`; `num_games` of `0` returns an empty
/// vector without spawning any threads.
#[allow(clippy::too_many_arguments)]
pub fn play_games<N, F>(
    network: N,
    num_games: usize,
    capacity: usize,
    seed: u64,
    num_readouts: usize,
    resign_threshold: f32,
    resign_disable_probability: f32,
    new_position: F
) -> Vec<PoolGame>
where
    N: Network + Send + Sync + 'static,
    F: Fn(&mut SmallRng) -> Position + Send + Sync
{
    if num_games == 0 {
        return Vec::new();
    }

    let network = Arc::new(network);
    let next_game = AtomicUsize::new(0);
    let results: Mutex<Vec<(usize, PoolGame)>> = Mutex::new(Vec::with_capacity(num_games));

    thread::scope(|scope| {
        for _ in 0..capacity.max(1) {
            let network = Arc::clone(&network);
            let next_game = &next_game;
            let results = &results;
            let new_position = &new_position;

            scope.spawn(move || loop {
                let index = next_game.fetch_add(1, Ordering::SeqCst);
                if index >= num_games {
                    return;
                }

                let mut rng = SmallRng::seed_from_u64(seed ^ (index as u64).wrapping_mul(0x9E3779B97F4A7C15));
                let resign_disabled = rng.gen_range(0.0..1.0) < resign_disable_probability;
                let position = new_position(&mut rng);

                let mut player = Player::initialize_game(
                    Arc::clone(&network),
                    position,
                    num_readouts,
                    resign_threshold,
                    resign_disabled
                );

                let result = {
                    let outcome = player.play_game(&mut rng);

                    GameResult { was_resign: outcome.was_resign, winner: outcome.winner, score: outcome.score }
                };
                let examples = player.extract_data();
                let sgf = player.to_sgf();

                results.lock().expect("results mutex was not poisoned")
                    .push((index, PoolGame { result, examples, sgf }));
            });
        }
    });

    let mut ordered = results.into_inner().expect("results mutex was not poisoned");
    ordered.sort_by_key(|(index, _)| *index);
    ordered.into_iter().map(|(_, game)| game).collect()
}
