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

//! Converts a [`Position`] into the tensor a network consumes: eight planes
//! of the current player's stones across the last eight board states,
//! interleaved with eight planes of the opponent's, followed by a single
//! constant plane carrying whose turn it is. Planes are laid out
//! `(row, col, plane)`, plane-minor, to match [`crate::symmetry::Transform`]'s
//! tensor permutation.
//!
//! | plane | contents |
//! |-------|----------|
//! | 0     | own stones, current board |
//! | 1     | opponent stones, current board |
//! | 2     | own stones, 1 ply ago |
//! | 3     | opponent stones, 1 ply ago |
//! | ...   | ... |
//! | 14    | own stones, 7 plies ago |
//! | 15    | opponent stones, 7 plies ago |
//! | 16    | all ones if Black to play, all zeros if White to play |

use crate::board::{Position, FEATURE_HISTORY};
use crate::color::Color;
use crate::coords::Point;

/// The number of planes a feature tensor carries.
pub const NUM_FEATURES: usize = 2 * FEATURE_HISTORY + 1;

/// Returns the `(size, size, NUM_FEATURES)` feature tensor for `position`,
/// from the perspective of `position.to_play()`.
pub fn extract(position: &Position) -> Vec<f32> {
    let size = position.size();
    let to_play = position.to_play();
    let mut out = vec![0.0f32; size * size * NUM_FEATURES];

    for t in 0..FEATURE_HISTORY {
        let board = position.board_at(t);

        for point in Point::all(size) {
            let idx = point.row() as usize * size + point.col() as usize;
            let base = idx * NUM_FEATURES + 2 * t;

            match board[idx] {
                Some(color) if color == to_play => out[base] = 1.0,
                Some(_) => out[base + 1] = 1.0,
                None => { }
            }
        }
    }

    if to_play == Color::Black {
        for point in Point::all(size) {
            let idx = point.row() as usize * size + point.col() as usize;
            out[idx * NUM_FEATURES + 2 * FEATURE_HISTORY] = 1.0;
        }
    }

    out
}
