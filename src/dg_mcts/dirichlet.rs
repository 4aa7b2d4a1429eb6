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

//! Root exploration noise. The concentration parameter is scaled so that a
//! 9x9 board gets roughly the same amount of noise per move as the 19x19
//! board the self-play literature was tuned on.

use rand::distributions::Distribution;
use rand::Rng;
use rand_distr::Dirichlet;

/// Returns the Dirichlet concentration parameter for a `size * size` board.
pub fn alpha(size: usize) -> f32 {
    0.03 * 19.0 / size as f32
}

/// Samples a noise vector of length `num_moves` from `Dirichlet(alpha, ...,
/// alpha)`.
pub fn sample<R: Rng + ?Sized>(rng: &mut R, size: usize, num_moves: usize) -> Vec<f32> {
    let concentration = vec![alpha(size) as f64; num_moves];
    let dirichlet = Dirichlet::new(&concentration).expect("positive concentration parameters");

    dirichlet.sample(rng).into_iter().map(|x| x as f32).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn alpha_scales_inversely_with_board_size() {
        assert!((alpha(19) - 0.03).abs() < 1e-6);
        assert!(alpha(9) > alpha(19));
    }

    #[test]
    fn sample_is_a_probability_distribution() {
        let mut rng = SmallRng::seed_from_u64(42);
        let noise = sample(&mut rng, 9, 82);

        assert_eq!(noise.len(), 82);
        assert!(noise.iter().all(|&x| x >= 0.0));

        let total: f32 = noise.iter().sum();
        assert!((total - 1.0).abs() < 1e-4);
    }
}
