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

//! Cross-crate integration tests: these exercise `dg_go`, `dg_mcts`, and
//! `dg_nn` together through their public APIs, the way a real self-play
//! binary would, rather than poking at any one crate's internals.

use dg_go::{features, Position};
use dg_mcts::node::{best_child, expand, Node};
use dg_mcts::Player;
use dg_nn::{ConstantPredictor, Network, RandomSymmetryPredictor, TensorNetwork, UniformPredictor};
use rand::rngs::SmallRng;
use rand::SeedableRng;

/// A full self-play game with a network that has no opinion at all should
/// still terminate, and the training examples it produces should line up
/// with the feature tensor shape the rest of the workspace assumes.
#[test]
fn full_self_play_game_produces_consistent_training_data() {
    // A 9x9 board, not a smaller one: with an opinion-free network and the
    // early-pass-exclusion window spanning most of a tiny board's legal
    // game length, a 5x5 board can run out of legal non-pass moves before
    // the depth cap, which this test should not need to reason about.
    let size = 9;
    let komi = 5.5;
    let network = UniformPredictor::new(0.0);
    let mut player = Player::initialize_game(network, Position::new(size, komi), 24, -2.0, true);
    let mut rng = SmallRng::seed_from_u64(100);

    let result = player.play_game(&mut rng);
    assert!(!result.was_resign);

    let examples = player.extract_data();
    assert!(!examples.is_empty());

    let expected_feature_len = size * size * features::NUM_FEATURES;
    for example in &examples {
        assert_eq!(example.features.len(), expected_feature_len);
        assert_eq!(example.pi.len(), size * size + 1);
        assert!((example.z - 1.0).abs() < 1e-6 || (example.z + 1.0).abs() < 1e-6);

        let total: f32 = example.pi.iter().sum();
        assert!((total - 1.0).abs() < 1e-3);
    }

    let sgf = player.to_sgf();
    assert!(sgf.starts_with("(;GM[1]FF[4]SZ[9]"));
    assert!(sgf.ends_with(')'));
}

/// A network that is pessimistic about every position eventually drives a
/// game to resignation rather than letting it run to the depth cap, and
/// every emitted training example still carries a well-formed `z` --
/// spec.md's resignation scenario, exercised end to end through `Player`
/// rather than by hand-constructing a `GameResult`.
#[test]
fn resignation_path_end_to_end() {
    let size = 9;
    let num_moves = size * size + 1;
    let policy = vec![1.0 / num_moves as f32; num_moves];
    let network = ConstantPredictor::new(policy, -0.9);
    let mut player = Player::initialize_game(network, Position::new(size, 7.5), 1, -0.5, false);
    let mut rng = SmallRng::seed_from_u64(200);

    let result = player.play_game(&mut rng);

    assert!(result.was_resign);

    let examples = player.extract_data();
    for example in &examples {
        assert!((example.z - 1.0).abs() < 1e-6 || (example.z + 1.0).abs() < 1e-6);
    }
}

/// With an opinion-free, color-blind network, the search is symmetric under
/// swapping whose turn it is: two otherwise-identical trees -- one rooted
/// Black-to-play, one rooted White-to-play on the same (empty) board --
/// driven by identically-seeded randomness pick the same move, because the
/// `Color::sign` flip in PUCT selection cancels out when every candidate's
/// `Q` is identical (spec.md's MCTS color symmetry property).
#[test]
fn color_symmetric_first_move_selection() {
    let size = 9;
    let num_moves = size * size + 1;
    let policy = vec![1.0 / num_moves as f32; num_moves];

    let black_network = ConstantPredictor::new(policy.clone(), 0.1);
    let white_network = ConstantPredictor::new(policy, 0.1);

    let black_root = Position::new(size, 7.5);
    let white_root = black_root.flip_playerturn();

    let mut black_player = Player::initialize_game(black_network, black_root, 64, -2.0, true);
    let mut white_player = Player::initialize_game(white_network, white_root, 64, -2.0, true);

    let mut black_rng = SmallRng::seed_from_u64(7);
    let mut white_rng = SmallRng::seed_from_u64(7);

    let black_move = black_player.suggest_move(&mut black_rng);
    let white_move = white_player.suggest_move(&mut white_rng);

    assert_eq!(black_move, white_move);
}

/// After running search on the root, the tree-wide visit-count invariant
/// holds: the root's own visit count (minus the implicit pre-evaluation
/// visit) equals the sum of its children's visit counts, and every expanded
/// child's `N`/`W` match what its parent has cached for it.
#[test]
fn visit_count_invariant_after_search() {
    let size = 9;
    let network = UniformPredictor::new(0.0);
    let mut player = Player::initialize_game(network, Position::new(size, 7.5), 48, -2.0, true);
    let mut rng = SmallRng::seed_from_u64(9);

    player.play_move(&mut rng);

    let root = player.get_root();
    let root_ref = root.borrow();

    let child_total: f32 = root_ref.child_n.iter().sum();
    assert!((root_ref.n() - 1.0 - child_total).abs() < 1e-3);

    for (&fmove, child) in root_ref.children.iter() {
        let child_ref = child.borrow();

        assert_eq!(root_ref.child_n[fmove], child_ref.n());
        assert_eq!(root_ref.child_w[fmove], child_ref.w());
    }
}

/// Illegal actions are never the PUCT maximizer, even deep into a real
/// search with real (non-uniform) priors -- the illegal-prior penalty from
/// `expand` survives noise injection and repeated selection.
#[test]
fn illegal_moves_are_never_the_best_child_after_a_real_search() {
    let size = 9;
    let num_moves = size * size + 1;
    let mut pos = Position::new(size, 7.5);
    pos = pos.play_move(Some(dg_go::Point::new(4, 4)), Some(dg_go::Color::Black)).unwrap();
    pos = pos.play_move(Some(dg_go::Point::new(4, 5)), Some(dg_go::Color::White)).unwrap();

    let root = Node::new_root(pos.clone());
    let mut policy = vec![1.0 / num_moves as f32; num_moves];
    policy[dg_go::to_flat(Some(dg_go::Point::new(4, 4)), size)] = 50.0; // a huge prior on an occupied (illegal) point
    expand(&root, &policy, 0.0);

    for _ in 0..16 {
        let choice = best_child(&root.borrow(), false);
        let coord = dg_go::from_flat(choice, size);

        assert!(pos.is_move_legal(coord), "selected an illegal move despite a huge illegal prior");
    }
}

struct ConstantTensorNetwork {
    value: f32
}

impl TensorNetwork for ConstantTensorNetwork {
    fn run_tensor(&self, tensor: &[f32], size: usize) -> (Vec<f32>, f32) {
        let num_moves = size * size + 1;
        assert_eq!(tensor.len(), size * size * features::NUM_FEATURES);

        (vec![1.0 / num_moves as f32; num_moves], self.value)
    }
}

/// `Player` works unmodified with a `Network` built out of the randomized-
/// symmetry wrapper around a lower-level `TensorNetwork` -- the seam a real
/// model implementation would sit behind.
#[test]
fn player_drives_a_randomized_symmetry_network() {
    let size = 9;
    let rng_for_symmetry = SmallRng::seed_from_u64(3);
    let network = RandomSymmetryPredictor::new(ConstantTensorNetwork { value: 0.0 }, rng_for_symmetry);

    let (policy, value) = network.run(&Position::new(size, 5.5));
    assert_eq!(policy.len(), size * size + 1);
    assert_eq!(value, 0.0);

    let mut player = Player::initialize_game(network, Position::new(size, 5.5), 8, -2.0, true);
    let mut rng = SmallRng::seed_from_u64(4);

    player.play_game(&mut rng);

    assert!(!player.extract_data().is_empty());
}
