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

//! Picks the move to actually play from a searched root: proportional to
//! visit count early in the game (to diversify self-play data), and the
//! single most-visited move once the game passes the temperature cutoff (to
//! stop throwing away points late on).

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use ordered_float::OrderedFloat;

use crate::node::Node;

/// Below this many plies, moves are sampled proportional to `child_n`
/// (temperature `1`); from here on the most-visited move is always chosen.
pub fn temperature_cutoff(size: usize) -> usize {
    (size * size) / 12
}

/// Picks a move index out of `root`'s children, using `ply` and `size` to
/// decide whether to sample or play greedily.
pub fn pick_move<R: Rng + ?Sized>(root: &Node, ply: usize, size: usize, rng: &mut R) -> usize {
    if ply < temperature_cutoff(size) {
        let weights = root.child_n.clone();

        if weights.iter().any(|&w| w > 0.0) {
            let dist = WeightedIndex::new(&weights).expect("at least one positive weight");

            return dist.sample(rng);
        }
    }

    argmax_visits(root)
}

/// The single most-visited legal move, ties broken by lowest index (`Vec::
/// iter().enumerate().max_by_key` keeps the first maximum it sees, and moves
/// are iterated in ascending flattened-index order).
pub fn argmax_visits(root: &Node) -> usize {
    root.child_n.iter()
        .enumerate()
        .max_by_key(|&(_, &n)| OrderedFloat(n))
        .map(|(i, _)| i)
        .expect("at least one candidate move")
}
