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

//! The game driver: orchestrates one game of self-play from a starting
//! position to a final result, running the tree search described in
//! `node.rs` between moves. This is the "Player" of spec.md section 4.6 --
//! `suggest_move` is the one-shot search entry point any GTP front-end
//! would call; `play_game` drives a complete self-play game and collects
//! the training examples and SGF text the engine emits.

use rand::Rng;

use dg_go::{features, to_sgf, Color, Position};
use dg_nn::Network;

use crate::choose::{pick_move, temperature_cutoff};
use crate::dirichlet;
use crate::node::{backup_value, children_as_pi, expand, inject_root_noise, maybe_add_child, promote_to_root, select_leaf, Node, NodeRef};
use crate::time_control::{RolloutLimit, TimeStrategy};

/// Plies past which a game is a dead loss and should not be allowed to run
/// out the clock -- `floor(1.25 * size^2)`, per spec.md section 4.5.
pub fn max_game_depth(size: usize) -> usize {
    (1.25 * (size * size) as f32).floor() as usize
}

/// One recorded ply: the position the move was chosen from, the training
/// policy target (the root's visit distribution at the time), and the
/// root's `Q` at that point (kept for the SGF comment, spec.md section 6's
/// persisted-state layout).
struct RecordedPly {
    position: Position,
    pi: Vec<f32>,
    root_q: f32,
    played: Option<dg_go::Point>,
    color: Color
}

/// A `(feature_tensor, pi_target, z)` training example, spec.md section 3.
pub struct TrainingExample {
    pub features: Vec<f32>,
    pub pi: Vec<f32>,
    pub z: f32
}

/// The outcome of a finished game.
pub struct GameResult {
    /// `true` if the game ended by resignation rather than score or the
    /// depth cap.
    pub was_resign: bool,
    /// The winner, from `score()`'s sign (or the non-resigning color, if
    /// `was_resign`).
    pub winner: Color,
    /// The final Tromp-Taylor score (only meaningful when `!was_resign`).
    pub score: f32
}

/// Drives a single game of self-play: repeatedly searches the current root,
/// commits a move, and records the training target for that ply, until the
/// game ends by two passes, resignation, or the depth cap.
pub struct Player<N> {
    network: N,
    root: NodeRef,
    num_readouts: usize,
    resign_threshold: f32,
    resign_disabled: bool,
    history: Vec<RecordedPly>,
    result: Option<GameResult>
}

impl<N: Network> Player<N> {
    /// Creates a new player and pre-evaluates `position` so the root has
    /// priors before the first descent (spec.md section 4.6 step 1).
    pub fn initialize_game(network: N, position: Position, num_readouts: usize, resign_threshold: f32, resign_disabled: bool) -> Self {
        let root = Node::new_root(position);
        let (policy, value) = network.run(&root.borrow().position().clone());
        expand(&root, &policy, value);

        Self {
            network,
            root,
            num_readouts,
            resign_threshold,
            resign_disabled,
            history: Vec::new(),
            result: None
        }
    }

    pub fn get_root(&self) -> &NodeRef {
        &self.root
    }

    pub fn is_done(&self) -> bool {
        self.result.is_some()
    }

    /// Runs readouts until the root has accumulated `self.num_readouts`
    /// beyond its current visit count, descending to a leaf, evaluating it
    /// with the network, and backing up the result -- spec.md section 4.6
    /// step 2b.
    fn search<R: Rng>(&mut self, rng: &mut R) {
        let noise = dirichlet::sample(rng, self.root.borrow().position().size(), self.root.borrow().num_moves());
        inject_root_noise(&self.root, &noise);

        let strategy = RolloutLimit::new(self.num_readouts);
        let mut readouts = 0;

        while !strategy.is_done(readouts, &self.root.borrow()) {
            let leaf = select_leaf(&self.root);

            if !leaf.borrow().is_expanded {
                let (policy, value) = self.network.run(&leaf.borrow().position().clone());
                let used = expand(&leaf, &policy, value);
                backup_value(&leaf, used, &self.root);
            } else {
                // a terminal leaf that was already expanded: back up its
                // (already overridden) value again without re-expanding it,
                // per spec.md section 4.7's "terminal nodes are sticky".
                let value = leaf.borrow().position().result();
                backup_value(&leaf, value, &self.root);
            }

            readouts += 1;
        }
    }

    /// Runs one full move of search and returns the chosen flattened move
    /// index, without committing it -- the one-shot entry point a GTP
    /// front-end (or `suggest_move`) would call.
    pub fn suggest_move<R: Rng>(&mut self, rng: &mut R) -> usize {
        self.search(rng);

        let size = self.root.borrow().position().size();
        let ply = self.root.borrow().position().n();

        pick_move(&self.root.borrow(), ply, size, rng)
    }

    /// Runs one full move: search, check resignation, pick a move, record
    /// the training target, and commit the root to the chosen child
    /// (dropping every sibling subtree). Returns `true` if the game ended
    /// as a result (resignation, two passes, or the depth cap).
    pub fn play_move<R: Rng>(&mut self, rng: &mut R) -> bool {
        if self.is_done() {
            return true;
        }

        self.search(rng);

        let position = self.root.borrow().position().clone();
        let root_q = self.root.borrow().q();
        let to_play = position.to_play();

        if !self.resign_disabled && to_play.sign() * root_q < self.resign_threshold {
            self.result = Some(GameResult { was_resign: true, winner: to_play.opposite(), score: root_q });
            return true;
        }

        let size = position.size();
        let high_temperature = position.n() < temperature_cutoff(size);
        let pi = children_as_pi(&self.root.borrow(), high_temperature);
        let fmove = pick_move(&self.root.borrow(), position.n(), size, rng);

        self.history.push(RecordedPly {
            position: position.clone(),
            pi,
            root_q,
            played: dg_go::from_flat(fmove, size),
            color: to_play
        });

        let child = maybe_add_child(&self.root, fmove);
        promote_to_root(&child);
        self.root = child;

        let next_position = self.root.borrow().position().clone();

        if next_position.is_game_over() || next_position.n() >= max_game_depth(size) {
            let score = next_position.score();
            let winner = if score > 0.0 { Color::Black } else { Color::White };

            self.result = Some(GameResult { was_resign: false, winner, score });
            return true;
        }

        false
    }

    /// Plays out an entire game, readout by readout and move by move, until
    /// termination.
    pub fn play_game<R: Rng>(&mut self, rng: &mut R) -> &GameResult {
        while !self.play_move(rng) { }

        self.result.as_ref().expect("play_move always sets a result before returning true")
    }

    /// Extracts the `(feature_tensor, pi_target, z)` training examples for
    /// every committed ply of the game -- spec.md section 3 and section
    /// 4.6's "Training-set emission".
    pub fn extract_data(&self) -> Vec<TrainingExample> {
        let result = self.result.as_ref().expect("extract_data is only meaningful once the game has ended");

        self.history.iter()
            .map(|ply| {
                let z = if ply.color == result.winner { 1.0 } else { -1.0 };

                TrainingExample {
                    features: features::extract(&ply.position),
                    pi: ply.pi.clone(),
                    z
                }
            })
            .collect()
    }

    /// Renders the game as an SGF record: board size, komi, result string,
    /// and one move node per committed ply with a `C[...]` comment carrying
    /// that move's root `Q` -- spec.md section 6's persisted-state layout.
    pub fn to_sgf(&self) -> String {
        let result = self.result.as_ref().expect("to_sgf is only meaningful once the game has ended");
        let size = self.history.first().map(|p| p.position.size()).unwrap_or_else(|| self.root.borrow().position().size());
        let komi = self.history.first().map(|p| p.position.komi()).unwrap_or_else(|| self.root.borrow().position().komi());

        let result_string = if result.was_resign {
            format!("{}+Resign", result.winner)
        } else {
            format!("{}+{:.1}", result.winner, result.score.abs())
        };

        let mut sgf = format!("(;GM[1]FF[4]SZ[{}]KM[{:.1}]PB[dg_mcts]PW[dg_mcts]RE[{}]", size, komi, result_string);

        for ply in &self.history {
            let coord = to_sgf(ply.played);

            sgf += &format!(";{}[{}]C[{:.3}]", ply.color, coord, ply.root_q);
        }

        sgf += ")";
        sgf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dg_nn::{ConstantPredictor, UniformPredictor};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn two_pass_game_reports_komi_result() {
        // Scenario F: an empty 9x9, a network with no opinion at all.
        // Every readout's leaf is the root itself once expanded and the
        // root Pass is excluded early on, so the search eventually visits
        // stones instead -- but a uniform-policy, zero-value network still
        // settles on a komi-determined score once both sides pass out.
        let size = 9;
        let network = UniformPredictor::new(0.0);
        let mut player = Player::initialize_game(network, Position::new(size, 7.5), 16, -2.0, true);
        let mut rng = SmallRng::seed_from_u64(1);

        let result = player.play_game(&mut rng);

        assert!(!result.was_resign);
    }

    #[test]
    fn resignation_path_records_a_loss_for_the_resigner() {
        // Scenario E: resign_threshold = -0.5, a mock network that always
        // returns -0.9 (from Black's perspective, absolute units). Black
        // to play resigns immediately.
        let size = 9;
        let num_moves = size * size + 1;
        let policy = vec![1.0 / num_moves as f32; num_moves];
        let network = ConstantPredictor::new(policy, -0.9);
        let mut player = Player::initialize_game(network, Position::new(size, 7.5), 1, -0.5, false);
        let mut rng = SmallRng::seed_from_u64(2);

        let result = player.play_game(&mut rng);

        assert!(result.was_resign);
        assert_eq!(result.winner, Color::White);

        let examples = player.extract_data();
        assert!(!examples.is_empty());
        for (example, ply) in examples.iter().zip(player.history.iter()) {
            let expected = if ply.color == Color::Black { -1.0 } else { 1.0 };
            assert_eq!(example.z, expected);
        }
    }

    #[test]
    fn resign_disabled_games_never_resign_even_with_a_pessimistic_network() {
        let size = 9;
        let num_moves = size * size + 1;
        let policy = vec![1.0 / num_moves as f32; num_moves];
        let network = ConstantPredictor::new(policy, -0.99);
        let mut player = Player::initialize_game(network, Position::new(size, 7.5), 4, -0.5, true);
        let mut rng = SmallRng::seed_from_u64(3);

        // run a handful of moves; none of them should resign even though
        // the value estimate is well past the threshold.
        for _ in 0..5 {
            if player.play_move(&mut rng) {
                break;
            }
        }

        assert!(!player.is_done() || !player.result.as_ref().unwrap().was_resign);
    }

    #[test]
    fn to_sgf_includes_header_and_one_node_per_ply() {
        let size = 9;
        let network = UniformPredictor::new(0.0);
        let mut player = Player::initialize_game(network, Position::new(size, 7.5), 4, -2.0, true);
        let mut rng = SmallRng::seed_from_u64(4);

        player.play_move(&mut rng);
        player.history.push(RecordedPly {
            position: Position::new(size, 7.5),
            pi: vec![1.0 / (size * size + 1) as f32; size * size + 1],
            root_q: 0.0,
            played: None,
            color: Color::Black
        });
        player.result = Some(GameResult { was_resign: false, winner: Color::Black, score: 1.5 });

        let sgf = player.to_sgf();

        assert!(sgf.starts_with("(;GM[1]FF[4]SZ[9]"));
        assert!(sgf.contains("RE[B+1.5]"));
        assert!(sgf.ends_with(")"));
    }
}
