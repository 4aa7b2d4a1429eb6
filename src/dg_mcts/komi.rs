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

//! Weighted random komi, used to vary the starting position across
//! self-play games rather than always drawing from the same fixed `7.5`.

use rand::Rng;

/// Draws a weighted random komi in `[-7.5, 7.5]`, with the most common
/// values being `7.5`, `6.5`, and `0.5`:
///
/// - 40% chance of `7.5`
/// - 40% chance of `6.5`
/// - 10% chance of `0.5`
/// - 10% chance of a uniformly random komi in `[-7.5, 7.5]`
pub fn random_komi<R: Rng + ?Sized>(rng: &mut R) -> f32 {
    let value: f32 = rng.gen();

    if value < 0.4 {
        7.5
    } else if value < 0.8 {
        6.5
    } else if value < 0.9 {
        0.5
    } else {
        let value: i32 = rng.gen_range(-8..8);

        value as f32 + 0.5
    }
}
