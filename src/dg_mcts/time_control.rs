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

//! Decides when a search has done enough readouts. [`RolloutLimit`] is a
//! plain readout budget; [`EarlyExit`] wraps one and stops sooner if the
//! runner-up child cannot possibly catch the leader with whatever readouts
//! remain, following the `EARLY-C` strategy of Baier and Winands, "Time
//! Management for Monte-Carlo Tree Search in Go".

use crate::node::Node;

pub trait TimeStrategy {
    /// Returns true if the search rooted at `root`, having already spent
    /// `readouts` rollouts, should stop.
    fn is_done(&self, readouts: usize, root: &Node) -> bool;
}

/// Stops after a fixed number of readouts.
pub struct RolloutLimit {
    limit: usize
}

impl RolloutLimit {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }
}

impl TimeStrategy for RolloutLimit {
    fn is_done(&self, readouts: usize, _root: &Node) -> bool {
        readouts >= self.limit
    }
}

/// Wraps another strategy and stops early if the second most-visited child
/// could not out-visit the leader even if every remaining readout went to
/// it.
pub struct EarlyExit<T> {
    inner: T,
    limit: usize
}

impl<T: TimeStrategy> EarlyExit<T> {
    pub fn new(inner: T, limit: usize) -> Self {
        Self { inner, limit }
    }
}

/// The number of additional readouts the second most-visited child would
/// need to overtake the most-visited child.
fn min_promote_rollouts(root: &Node) -> usize {
    let mut top_1 = 0usize;
    let mut top_2 = 0usize;

    for a in 0..root.child_n.len() {
        if root.child_n[a] > root.child_n[top_1] {
            top_2 = top_1;
            top_1 = a;
        } else if a != top_1 && root.child_n[a] > root.child_n[top_2] {
            top_2 = a;
        }
    }

    let (count_1, count_2) = (root.child_n[top_1], root.child_n[top_2]);

    if count_1 > count_2 {
        (count_1 - count_2) as usize
    } else {
        0
    }
}

impl<T: TimeStrategy> TimeStrategy for EarlyExit<T> {
    fn is_done(&self, readouts: usize, root: &Node) -> bool {
        if self.inner.is_done(readouts, root) {
            return true;
        }

        let remaining = self.limit.saturating_sub(readouts);

        min_promote_rollouts(root) > remaining
    }
}
