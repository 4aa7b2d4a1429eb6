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

//! The Go rules engine: the board, stone groups and liberties, scoring,
//! coordinate conversions, the dihedral symmetry group, and the feature
//! tensor the network consumes.

mod board;
mod color;
mod coords;
mod error;
mod symmetry;

pub mod features;

pub use crate::board::{Group, LibertyTracker, Position, FEATURE_HISTORY};
pub use crate::color::Color;
pub use crate::coords::{from_gtp, from_sgf, to_flat, from_flat, to_gtp, to_sgf, Point};
pub use crate::error::Error;
pub use crate::symmetry::{Transform, ALL};
