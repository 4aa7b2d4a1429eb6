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

//! The eight-element dihedral group of the square, used to randomize which
//! orientation of the board is shown to the network (to help it generalize)
//! and to prune symmetric candidate moves from the root policy. Names and
//! the inverse table are carried over unchanged from the names used
//! throughout the rest of the self-play literature (`identity`, `rot90`,
//! ..., `fliprot270`).

use crate::coords::{from_flat, to_flat, Point};

/// An element of the dihedral group of the square.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Transform {
    Identity,
    Rot90,
    Rot180,
    Rot270,
    Flip,
    FlipRot90,
    FlipRot180,
    FlipRot270
}

/// All eight elements of the group, in a fixed order.
pub const ALL: [Transform; 8] = [
    Transform::Identity,
    Transform::Rot90,
    Transform::Rot180,
    Transform::Rot270,
    Transform::Flip,
    Transform::FlipRot90,
    Transform::FlipRot180,
    Transform::FlipRot270
];

impl Transform {
    /// Returns the inverse of this transform. `Rot90` and `Rot270` are each
    /// other's inverse; every other element is its own inverse.
    pub fn inverse(self) -> Transform {
        match self {
            Transform::Rot90 => Transform::Rot270,
            Transform::Rot270 => Transform::Rot90,
            other => other
        }
    }

    /// Maps a point on a `size * size` board through this transform.
    pub fn apply_point(self, point: Point, size: usize) -> Point {
        let n = size as u8;
        let (r, c) = (point.row(), point.col());

        let (nr, nc) = match self {
            Transform::Identity => (r, c),
            Transform::Rot90 => (n - 1 - c, r),
            Transform::Rot180 => (n - 1 - r, n - 1 - c),
            Transform::Rot270 => (c, n - 1 - r),
            Transform::Flip => (c, r),
            Transform::FlipRot90 => (n - 1 - r, c),
            Transform::FlipRot180 => (n - 1 - c, n - 1 - r),
            Transform::FlipRot270 => (r, n - 1 - c)
        };

        Point::new(nr, nc)
    }

    /// Maps a flattened index through this transform. The Pass index
    /// (`size * size`) is always fixed.
    pub fn apply_flat(self, flat: usize, size: usize) -> usize {
        if flat == size * size {
            flat
        } else {
            let point = from_flat(flat, size).expect("flat index within board");

            to_flat(Some(self.apply_point(point, size)), size)
        }
    }

    /// Applies this transform to a `(size, size, planes)` feature tensor laid
    /// out in row-major, plane-minor order, permuting only the spatial
    /// dimensions.
    pub fn apply_tensor<T: Copy + Default>(self, tensor: &[T], size: usize, planes: usize) -> Vec<T> {
        debug_assert_eq!(tensor.len(), size * size * planes);

        let inverse = self.inverse();
        let mut out = vec![T::default(); tensor.len()];

        for point in Point::all(size) {
            let src = inverse.apply_point(point, size);
            let dst_base = (point.row() as usize * size + point.col() as usize) * planes;
            let src_base = (src.row() as usize * size + src.col() as usize) * planes;

            out[dst_base..dst_base + planes].copy_from_slice(&tensor[src_base..src_base + planes]);
        }

        out
    }

    /// Applies this transform to a policy vector of length `size*size + 1`,
    /// permuting the first `size*size` entries and leaving the trailing
    /// Pass entry fixed.
    pub fn apply_policy(self, policy: &[f32], size: usize) -> Vec<f32> {
        debug_assert_eq!(policy.len(), size * size + 1);

        let inverse = self.inverse();
        let mut out = vec![0.0; policy.len()];

        for flat in 0..size * size {
            out[flat] = policy[inverse.apply_flat(flat, size)];
        }
        out[size * size] = policy[size * size];

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tensor(size: usize) -> Vec<i32> {
        (0..size * size).map(|i| i as i32).collect()
    }

    #[test]
    fn inverse_is_an_involution_and_matches_the_group_table() {
        for &t in &ALL {
            assert_eq!(t.inverse().inverse(), t);
        }

        assert_eq!(Transform::Rot90.inverse(), Transform::Rot270);
        assert_eq!(Transform::Rot270.inverse(), Transform::Rot90);
        assert_eq!(Transform::Rot180.inverse(), Transform::Rot180);
        assert_eq!(Transform::Flip.inverse(), Transform::Flip);
    }

    #[test]
    fn rot90_applied_four_times_is_identity() {
        let size = 9;

        for point in Point::all(size) {
            let mut p = point;

            for _ in 0..4 {
                p = Transform::Rot90.apply_point(p, size);
            }

            assert_eq!(p, point);
        }
    }

    #[test]
    fn composition_matches_rot180() {
        let size = 9;

        for point in Point::all(size) {
            let twice = Transform::Rot90.apply_point(Transform::Rot90.apply_point(point, size), size);

            assert_eq!(twice, Transform::Rot180.apply_point(point, size));
        }
    }

    #[test]
    fn apply_then_invert_is_identity_for_tensors_and_policies() {
        let size = 9;
        let planes = 3;
        let tensor: Vec<i32> = (0..size * size * planes).map(|i| i as i32).collect();
        let mut policy = vec![0.0f32; size * size + 1];
        for (i, p) in policy.iter_mut().enumerate() {
            *p = i as f32;
        }

        for &t in &ALL {
            let transformed = t.apply_tensor(&tensor, size, planes);
            let restored = t.inverse().apply_tensor(&transformed, size, planes);
            assert_eq!(restored, tensor);

            let transformed_pi = t.apply_policy(&policy, size);
            let restored_pi = t.inverse().apply_policy(&transformed_pi, size);
            assert_eq!(restored_pi, policy);

            // the pass entry is always fixed
            assert_eq!(transformed_pi[size * size], policy[size * size]);
        }
    }

    #[test]
    fn the_eight_symmetries_are_distinct_for_a_generic_tensor() {
        let size = 9;
        let tensor = sample_tensor(size);
        let mut seen = Vec::new();

        for &t in &ALL {
            let transformed = t.apply_tensor(&tensor, size, 1);
            assert!(!seen.contains(&transformed), "transform {:?} collided with another", t);
            seen.push(transformed);
        }

        assert_eq!(seen.len(), 8);
    }

    #[test]
    fn policy_permutation_matches_point_permutation() {
        let size = 9;

        for &t in &ALL {
            for point in Point::all(size) {
                let flat = to_flat(Some(point), size);
                let expected = to_flat(Some(t.apply_point(point, size)), size);

                assert_eq!(t.apply_flat(flat, size), expected);
            }

            assert_eq!(t.apply_flat(size * size, size), size * size);
        }
    }
}
