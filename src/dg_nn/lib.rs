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

//! The boundary between the search and whatever actually produces a policy
//! and a value for a position. [`Network`] is what `dg_mcts` calls;
//! [`TensorNetwork`] is the lower-level seam a concrete model implements,
//! so that [`RandomSymmetryPredictor`] can sit in between and randomize
//! which of the eight board orientations the model actually sees.

use dg_go::{features, Position, ALL};
use rand::seq::SliceRandom;
use rand::Rng;

/// Something that can evaluate a [`Position`] directly: a policy over
/// `size*size + 1` moves, and a value in `[-1, 1]` from Black's
/// perspective.
pub trait Network {
    fn run(&self, position: &Position) -> (Vec<f32>, f32);

    /// Evaluates a batch of positions. The default implementation just
    /// loops over `run`; an implementation backed by a real model should
    /// override this to batch them together.
    fn run_many(&self, positions: &[Position]) -> Vec<(Vec<f32>, f32)> {
        positions.iter().map(|position| self.run(position)).collect()
    }
}

/// An `Arc`-wrapped network is itself a `Network`, forwarding every call to
/// the shared instance underneath. This is what lets `dg_mcts::pool` hand
/// the same network out to several concurrently-running games: each worker
/// thread holds its own clone of the `Arc` (cheap, just a refcount bump) and
/// calls through it exactly as `Player` would call a network it owned
/// outright.
impl<N: Network + ?Sized> Network for std::sync::Arc<N> {
    fn run(&self, position: &Position) -> (Vec<f32>, f32) {
        (**self).run(position)
    }

    fn run_many(&self, positions: &[Position]) -> Vec<(Vec<f32>, f32)> {
        (**self).run_many(positions)
    }
}

/// The raw interface a model implements: takes a `(size, size,
/// NUM_FEATURES)` tensor already in some orientation, returns a policy over
/// `size*size + 1` moves (in that same orientation) and a value.
pub trait TensorNetwork {
    fn run_tensor(&self, tensor: &[f32], size: usize) -> (Vec<f32>, f32);
}

/// Adapts a [`TensorNetwork`] into a [`Network`] by picking one of the
/// eight board symmetries uniformly at random on every call, feeding the
/// model that orientation, and rotating the returned policy back. This is
/// what lets a single set of weights generalize across orientations instead
/// of overfitting to whichever one training data happened to use.
///
/// The per-call randomness sits behind a `Mutex` rather than a `RefCell` so
/// that a `RandomSymmetryPredictor` can itself satisfy `Network`'s
/// thread-safety contract (spec.md section 4.4): multiple self-play games
/// running concurrently (`dg_mcts::pool`) may all call `run` on the same
/// instance from different worker threads.
pub struct RandomSymmetryPredictor<T, R> {
    inner: T,
    rng: std::sync::Mutex<R>
}

impl<T: TensorNetwork, R: Rng> RandomSymmetryPredictor<T, R> {
    pub fn new(inner: T, rng: R) -> Self {
        Self { inner, rng: std::sync::Mutex::new(rng) }
    }
}

impl<T: TensorNetwork, R: Rng> Network for RandomSymmetryPredictor<T, R> {
    fn run(&self, position: &Position) -> (Vec<f32>, f32) {
        let size = position.size();
        let mut rng = self.rng.lock().expect("rng mutex was not poisoned");
        let transform = *ALL.choose(&mut *rng).expect("ALL is non-empty");
        drop(rng);

        let tensor = features::extract(position);
        let transformed_tensor = transform.apply_tensor(&tensor, size, features::NUM_FEATURES);

        let (policy, value) = self.inner.run_tensor(&transformed_tensor, size);
        let restored_policy = transform.inverse().apply_policy(&policy, size);

        (restored_policy, value)
    }
}

/// A predictor that always returns a uniform policy and a fixed value.
/// Useful as a baseline opponent or a deterministic test double.
pub struct UniformPredictor {
    value: f32
}

impl UniformPredictor {
    pub fn new(value: f32) -> Self {
        Self { value }
    }
}

impl Network for UniformPredictor {
    fn run(&self, position: &Position) -> (Vec<f32>, f32) {
        let num_moves = position.size() * position.size() + 1;

        (vec![1.0 / num_moves as f32; num_moves], self.value)
    }
}

/// A predictor that always returns a caller-supplied `(policy, value)`
/// pair, regardless of the position. Useful for driving the search towards
/// a specific, predictable outcome in tests.
pub struct ConstantPredictor {
    policy: Vec<f32>,
    value: f32
}

impl ConstantPredictor {
    pub fn new(policy: Vec<f32>, value: f32) -> Self {
        Self { policy, value }
    }
}

impl Network for ConstantPredictor {
    fn run(&self, _position: &Position) -> (Vec<f32>, f32) {
        (self.policy.clone(), self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dg_go::Color;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    struct EchoTensorNetwork;

    impl TensorNetwork for EchoTensorNetwork {
        fn run_tensor(&self, tensor: &[f32], size: usize) -> (Vec<f32>, f32) {
            // a policy derived from the tensor itself, so a test can check
            // that the *un-rotated* policy survives the round trip.
            let num_moves = size * size + 1;
            let mut policy = vec![0.0; num_moves];

            for i in 0..size * size {
                policy[i] = tensor[i * features::NUM_FEATURES];
            }

            let total: f32 = policy.iter().sum();
            if total > 0.0 {
                for p in policy.iter_mut() {
                    *p /= total;
                }
            } else {
                policy = vec![1.0 / num_moves as f32; num_moves];
            }

            (policy, 0.0)
        }
    }

    #[test]
    fn uniform_predictor_sums_to_one() {
        let predictor = UniformPredictor::new(0.0);
        let position = Position::new(9, 7.5);
        let (policy, _) = predictor.run(&position);

        let total: f32 = policy.iter().sum();
        assert!((total - 1.0).abs() < 1e-4);
    }

    #[test]
    fn constant_predictor_ignores_the_position() {
        let num_moves = 9 * 9 + 1;
        let mut policy = vec![0.0; num_moves];
        policy[0] = 1.0;
        let predictor = ConstantPredictor::new(policy.clone(), 0.7);

        let a = Position::new(9, 7.5);
        let b = a.play_move(Some(dg_go::Point::new(0, 0)), Some(Color::Black)).unwrap();

        assert_eq!(predictor.run(&a).0, policy);
        assert_eq!(predictor.run(&b).0, policy);
        assert_eq!(predictor.run(&b).1, 0.7);
    }

    #[test]
    fn random_symmetry_predictor_is_reproducible_with_a_seeded_rng() {
        let rng = SmallRng::seed_from_u64(11);
        let predictor = RandomSymmetryPredictor::new(EchoTensorNetwork, rng);
        let position = Position::new(9, 7.5);

        let (policy, _) = predictor.run(&position);
        let total: f32 = policy.iter().sum();

        assert_eq!(policy.len(), 9 * 9 + 1);
        assert!((total - 1.0).abs() < 1e-3);
    }

    #[test]
    fn run_many_defaults_to_looping_over_run() {
        let predictor = UniformPredictor::new(0.25);
        let positions = vec![Position::new(9, 7.5), Position::new(9, 7.5)];

        let results = predictor.run_many(&positions);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].1, 0.25);
        assert_eq!(results[1].1, 0.25);
    }
}
