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

//! The search tree. A node's own visit count and total value live in its
//! *parent*'s `child_n` / `child_w` arrays (indexed by the move that leads
//! to the node) rather than on the node itself -- the same layout the
//! self-play literature uses, since it lets PUCT selection read every
//! child's statistics out of one contiguous array without dereferencing
//! each child in turn. The root is the only node without a parent, so it
//! keeps its own `root_n` / `root_w` pair.
//!
//! `W` is always accumulated from Black's point of view (`+1` is a Black
//! win, `-1` a White win), never flipped per-ply; [`Color::sign`] is what
//! turns an absolute `Q` into "how good is this for whoever is about to
//! move here".
//!
//! This tree assumes a single thread drives a single game, so unlike a
//! batched concurrent searcher there is no virtual loss: a node's visit
//! count is incremented exactly once, during backup, rather than once
//! during selection and once during backup.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use dg_go::Position;
use ordered_float::OrderedFloat;

/// The PUCT exploration constant.
pub const EXPLORATION_CONSTANT: f32 = 5.0;

/// Fraction of the root's prior that is replaced by Dirichlet noise.
pub const ROOT_NOISE_WEIGHT: f32 = 0.25;

/// Subtracted from an illegal action's prior (after masking) so that it is
/// never selected by [`best_child`] regardless of the policy the network
/// assigned it, without renormalizing the rest of the distribution.
pub const ILLEGAL_PENALTY: f32 = 10.0;

/// Plies before which Pass is excluded from the candidate moves considered
/// by [`best_child`], scaled by board size, so the engine does not end a
/// 9x9 game the moment it is "ahead" the way it might for 19x19.
pub fn early_pass_exclusion_window(size: usize) -> usize {
    8 * size
}

pub type NodeRef = Rc<RefCell<Node>>;

pub struct Node {
    num_moves: usize, // size*size + 1
    position: Position,
    parent: Option<Weak<RefCell<Node>>>,
    fmove: Option<usize>,
    pub children: HashMap<usize, NodeRef>,
    pub is_expanded: bool,
    pub child_n: Vec<f32>,
    pub child_w: Vec<f32>,
    pub child_prior: Vec<f32>,
    root_n: f32,
    root_w: f32
}

impl Node {
    /// Creates a fresh, unexpanded root node wrapping `position`.
    pub fn new_root(position: Position) -> NodeRef {
        let num_moves = position.size() * position.size() + 1;

        Rc::new(RefCell::new(Node {
            num_moves,
            position,
            parent: None,
            fmove: None,
            children: HashMap::new(),
            is_expanded: false,
            child_n: Vec::new(),
            child_w: Vec::new(),
            child_prior: Vec::new(),
            root_n: 0.0,
            root_w: 0.0
        }))
    }

    fn new_child(parent: &NodeRef, fmove: usize) -> NodeRef {
        let (num_moves, position) = {
            let parent_ref = parent.borrow();
            let size = parent_ref.position.size();
            let coord = dg_go::from_flat(fmove, size);

            let position = parent_ref.position.play_move(coord, None)
                .expect("the tree never selects an illegal move");

            (parent_ref.num_moves, position)
        };

        Rc::new(RefCell::new(Node {
            num_moves,
            position,
            parent: Some(Rc::downgrade(parent)),
            fmove: Some(fmove),
            children: HashMap::new(),
            is_expanded: false,
            child_n: Vec::new(),
            child_w: Vec::new(),
            child_prior: Vec::new(),
            root_n: 0.0,
            root_w: 0.0
        }))
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn num_moves(&self) -> usize {
        self.num_moves
    }

    /// This node's own visit count (read out of the parent's `child_n`, or
    /// `root_n` if this is the root).
    pub fn n(&self) -> f32 {
        match &self.parent {
            Some(parent) => {
                let parent = parent.upgrade().expect("parent outlives child");
                let fmove = self.fmove.expect("non-root node has a parent move");
                let n = parent.borrow().child_n[fmove];

                n
            },
            None => self.root_n
        }
    }

    /// This node's own total value accumulator.
    pub fn w(&self) -> f32 {
        match &self.parent {
            Some(parent) => {
                let parent = parent.upgrade().expect("parent outlives child");
                let fmove = self.fmove.expect("non-root node has a parent move");
                let w = parent.borrow().child_w[fmove];

                w
            },
            None => self.root_w
        }
    }

    /// `Q`, this node's mean value from Black's perspective. Uses a `1 +
    /// N` denominator so an unvisited node has a well-defined (zero) value
    /// instead of dividing by zero.
    pub fn q(&self) -> f32 {
        self.w() / (1.0 + self.n())
    }
}

/// Finds the best candidate move out of `node` according to PUCT.
/// `exclude_pass` drops the Pass action from consideration (the early-game
/// window of spec.md section 4.5). Illegal actions are never chosen because
/// [`expand`] already biases their prior by [`ILLEGAL_PENALTY`]; this
/// function does not need to consult legality itself. Ties are broken by
/// smallest flattened index, since `max_by_key` keeps the first maximum it
/// sees and actions are iterated in ascending order.
pub fn best_child(node: &Node, exclude_pass: bool) -> usize {
    let parent_n = node.n().max(1.0);
    let pass = node.num_moves - 1;

    (0..node.num_moves)
        .filter(|&a| !(exclude_pass && a == pass))
        .max_by_key(|&a| {
            let q = if node.child_n[a] > 0.0 {
                node.child_w[a] / node.child_n[a]
            } else {
                node.q()
            };
            let u = EXPLORATION_CONSTANT * node.child_prior[a] * parent_n.sqrt() / (1.0 + node.child_n[a]);
            let score = node.position.to_play().sign() * q + u;

            OrderedFloat(score)
        })
        .expect("at least one legal move (Pass, if nothing else)")
}

/// Returns the existing child for `fmove`, creating it if necessary.
pub fn maybe_add_child(parent: &NodeRef, fmove: usize) -> NodeRef {
    if let Some(child) = parent.borrow().children.get(&fmove) {
        return Rc::clone(child);
    }

    let child = Node::new_child(parent, fmove);
    parent.borrow_mut().children.insert(fmove, Rc::clone(&child));

    child
}

/// Promotes `child` to be a tree root in its own right: its accumulated `N`
/// and `W` (so far only visible through its parent's `child_n` / `child_w`
/// arrays) are copied into its own `root_n` / `root_w`, and its parent link
/// is severed.
///
/// This must run before the driver drops its reference to the old root --
/// without it, `child.parent` would be left as a dangling weak reference
/// once nothing else keeps the old root (and its other children) alive, and
/// the very next call to [`Node::n`] or [`Node::w`] on the new root would
/// panic on `parent.upgrade()`. Tree reuse across moves always goes through
/// this function rather than a bare reassignment.
pub fn promote_to_root(child: &NodeRef) {
    let (n, w) = {
        let node = child.borrow();

        (node.n(), node.w())
    };

    let mut node = child.borrow_mut();
    node.parent = None;
    node.fmove = None;
    node.root_n = n;
    node.root_w = w;
}

/// Walks down from `root`, repeatedly choosing the best legal child, until
/// it reaches a node that has not yet been expanded, or a terminal node
/// (terminal nodes are "sticky": once expanded they are always returned
/// directly rather than ever growing children -- spec.md section 4.7).
pub fn select_leaf(root: &NodeRef) -> NodeRef {
    let mut current = Rc::clone(root);

    loop {
        let (is_expanded, is_terminal) = {
            let node = current.borrow();

            (node.is_expanded, node.position.is_game_over())
        };

        if !is_expanded || is_terminal {
            return current;
        }

        let exclude_pass = current.borrow().position.n() < early_pass_exclusion_window(current.borrow().position.size());
        let fmove = best_child(&current.borrow(), exclude_pass);
        let next = maybe_add_child(&current, fmove);

        current = next;
    }
}

/// Expands `leaf` with the network's output: `policy` (length `num_moves`,
/// summing to approximately `1`) and `value` (from Black's perspective).
/// Illegal actions are never renormalized away -- their prior is biased down
/// by [`ILLEGAL_PENALTY`] in place, per spec.md's "by subtraction, not
/// masking-then-renormalization" design note. `child_n` and `child_w` start
/// at zero for every candidate move, a pure `W ← W + value` accumulator per
/// spec.md section 4.5's backup rule; first-play urgency for an unvisited
/// move is supplied entirely by [`best_child`]'s fallback to the node's own
/// `Q` rather than by seeding `child_w`, so the two mechanisms never
/// double-count the same leaf value.
///
/// If `leaf`'s position is terminal, `value` is overridden by the true
/// `sign(score())` from Black's perspective, per spec.md section 4.5's
/// terminal-value-override rule.
///
/// Panics if `leaf` is already expanded: the driver is expected to check
/// `is_expanded` before requesting a network evaluation, so a double
/// expansion means a leaf was evaluated twice (or a terminal node was
/// re-expanded), which this tree treats as a caller bug rather than a
/// recoverable condition.
pub fn expand(leaf: &NodeRef, policy: &[f32], value: f32) -> f32 {
    let mut node = leaf.borrow_mut();

    assert!(!node.is_expanded, "leaf was already expanded (or a terminal node was re-expanded)");
    assert_eq!(policy.len(), node.num_moves, "network policy has the wrong shape");

    let legal = node.position.all_legal_moves();
    let value = if node.position.is_game_over() {
        node.position.result()
    } else {
        value
    };

    node.child_prior = policy.iter().zip(legal.iter())
        .map(|(&p, &is_legal)| if is_legal { p } else { p - ILLEGAL_PENALTY })
        .collect();
    node.child_n = vec![0.0; node.num_moves];
    node.child_w = vec![0.0; node.num_moves];
    node.is_expanded = true;

    value
}

/// Propagates `value` (from Black's perspective) from `leaf` up to and
/// including `up_to`, incrementing every node's own visit count and value
/// accumulator exactly once along the way. A node's own stats live in its
/// parent's `child_n`/`child_w` arrays (or, for the root, in `root_n`/
/// `root_w`), so the walk still touches `up_to`'s own entry before stopping
/// -- only `up_to`'s parent (and beyond) is excluded.
pub fn backup_value(leaf: &NodeRef, value: f32, up_to: &NodeRef) {
    let mut current = Rc::clone(leaf);

    loop {
        let parent = current.borrow().parent.clone();

        match parent {
            Some(weak_parent) => {
                let parent_rc = weak_parent.upgrade().expect("parent outlives child");
                let fmove = current.borrow().fmove.expect("non-root node has a parent move");

                {
                    let mut parent_mut = parent_rc.borrow_mut();
                    parent_mut.child_n[fmove] += 1.0;
                    parent_mut.child_w[fmove] += value;
                }

                let reached_up_to = Rc::ptr_eq(&current, up_to);
                current = parent_rc;

                if reached_up_to {
                    return;
                }
            },
            None => {
                let mut root = current.borrow_mut();
                root.root_n += 1.0;
                root.root_w += value;

                return;
            }
        }
    }
}

/// Mixes Dirichlet noise into the root's prior, in place. Only ever called
/// once per move, immediately before the readout loop. Illegal actions
/// retain their strongly negative prior because the mix is applied after
/// [`expand`] has already biased them down.
pub fn inject_root_noise(root: &NodeRef, noise: &[f32]) {
    let mut node = root.borrow_mut();

    assert_eq!(noise.len(), node.num_moves);

    for (prior, &n) in node.child_prior.iter_mut().zip(noise) {
        *prior = (1.0 - ROOT_NOISE_WEIGHT) * *prior + ROOT_NOISE_WEIGHT * n;
    }
}

/// Returns the visit-count-derived training policy (`pi`). When
/// `temperature_high` is true this is `child_n / sum(child_n)`; otherwise it
/// is `child_n^8 / sum(child_n^8)`, which sharpens the distribution towards
/// whichever move was visited the most without being a hard one-hot (spec.md
/// section 4.5's low-temperature policy).
pub fn children_as_pi(root: &Node, temperature_high: bool) -> Vec<f32> {
    let weights: Vec<f32> = if temperature_high {
        root.child_n.clone()
    } else {
        root.child_n.iter().map(|&n| n.powi(8)).collect()
    };

    let total: f32 = weights.iter().sum();

    if total <= 0.0 {
        return vec![1.0 / root.num_moves as f32; root.num_moves];
    }

    weights.iter().map(|&w| w / total).collect()
}
