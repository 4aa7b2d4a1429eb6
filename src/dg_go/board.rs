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

//! The board, stone groups, liberties, and `Position` -- the rules engine
//! described in the engine specification's "Position & Rules Engine"
//! component. A `Position` is an immutable value: every mutating operation
//! (`play_move`, `pass_move`, `flip_playerturn`) returns a new `Position`
//! rather than modifying `self`, so the search tree can hold on to as many
//! positions as it likes without aliasing surprises.
//!
//! The liberty tracker recomputes stone groups from scratch (a linear flood
//! fill) on every move rather than updating an incremental union-find. This
//! is the same algorithmic contract the specification describes -- every
//! group's liberties are always exactly its stones' empty neighbors, and the
//! per-stone cached liberty count always matches `|group.liberties|` -- just
//! derived fresh every time instead of patched in place, which removes an
//! entire class of cache-goes-stale bugs at the cost of doing `O(N^2)` work
//! per move instead of `O(1)` amortized.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use crate::color::Color;
use crate::coords::{from_flat, to_flat, Point};
use crate::error::Error;

/// The number of recent board states the feature extractor reconstructs
/// (the current board plus seven predecessors).
pub const FEATURE_HISTORY: usize = 8;

/// The number of most-recent move deltas retained. One fewer than
/// `FEATURE_HISTORY` since the current board itself is not a delta.
const MAX_DELTAS: usize = FEATURE_HISTORY - 1;

fn neighbors(point: Point, size: usize) -> Vec<Point> {
    let (r, c) = (point.row() as i32, point.col() as i32);
    let mut out = Vec::with_capacity(4);

    for &(dr, dc) in &[(-1, 0), (1, 0), (0, -1), (0, 1)] {
        let (nr, nc) = (r + dr, c + dc);

        if nr >= 0 && nr < size as i32 && nc >= 0 && nc < size as i32 {
            out.push(Point::new(nr as u8, nc as u8));
        }
    }

    out
}

/// A maximal connected (4-adjacent) set of same-colored stones, together
/// with its liberties.
#[derive(Clone, Debug)]
pub struct Group {
    pub color: Color,
    pub stones: Vec<Point>,
    pub liberties: Vec<Point>
}

type GroupId = usize;

/// Maps every occupied point to the group that owns it, and every group to
/// its stones and liberties. See the module documentation for why this is
/// recomputed from scratch rather than updated incrementally.
#[derive(Clone, Debug)]
pub struct LibertyTracker {
    size: usize,
    group_of: Vec<Option<GroupId>>,
    groups: Vec<Group>
}

impl LibertyTracker {
    fn new(cells: &[Option<Color>], size: usize) -> Self {
        let mut group_of: Vec<Option<GroupId>> = vec![None; size * size];
        let mut groups = Vec::new();

        for start in 0..size * size {
            if group_of[start].is_some() {
                continue;
            }

            let color = match cells[start] {
                Some(color) => color,
                None => continue
            };

            let id = groups.len();
            let mut stones = Vec::new();
            let mut liberties = BTreeSet::new();
            let mut stack = vec![start];
            group_of[start] = Some(id);

            while let Some(idx) = stack.pop() {
                let point = from_flat(idx, size).expect("idx is within the board");
                stones.push(point);

                for neighbor in neighbors(point, size) {
                    let nidx = to_flat(Some(neighbor), size);

                    match cells[nidx] {
                        None => {
                            liberties.insert(neighbor);
                        },
                        Some(other) if other == color && group_of[nidx].is_none() => {
                            group_of[nidx] = Some(id);
                            stack.push(nidx);
                        },
                        _ => { }
                    }
                }
            }

            stones.sort();
            groups.push(Group { color, stones, liberties: liberties.into_iter().collect() });
        }

        Self { size, group_of, groups }
    }

    /// Returns the id of the group occupying `point`, or `None` if it is
    /// empty.
    pub fn group_id(&self, point: Point) -> Option<GroupId> {
        self.group_of[to_flat(Some(point), self.size)]
    }

    /// Returns the group with the given id.
    pub fn group(&self, id: GroupId) -> &Group {
        &self.groups[id]
    }

    /// Returns the number of liberties of the group occupying `point`, or
    /// `0` if `point` is empty.
    pub fn liberty_count(&self, point: Point) -> usize {
        self.group_id(point).map_or(0, |id| self.group(id).liberties.len())
    }
}

/// An immutable Go position: the board, whose turn it is, capture counters,
/// the simple-ko point (if any), and bounded move/board history.
#[derive(Clone)]
pub struct Position {
    size: usize,
    cells: Vec<Option<Color>>,
    to_play: Color,
    n: usize,
    komi: f32,
    caps: (u32, u32),
    ko: Option<Point>,
    recent: Vec<(Color, Option<Point>)>,
    board_deltas: VecDeque<Vec<(Point, Option<Color>)>>,
    lib_tracker: LibertyTracker
}

impl Position {
    /// Creates a fresh, empty position on a `size * size` board.
    pub fn new(size: usize, komi: f32) -> Self {
        let cells = vec![None; size * size];
        let lib_tracker = LibertyTracker::new(&cells, size);

        Self {
            size,
            cells,
            to_play: Color::Black,
            n: 0,
            komi,
            caps: (0, 0),
            ko: None,
            recent: Vec::new(),
            board_deltas: VecDeque::with_capacity(MAX_DELTAS),
            lib_tracker
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn to_play(&self) -> Color {
        self.to_play
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn komi(&self) -> f32 {
        self.komi
    }

    /// Returns `(captured_by_black, captured_by_white)`.
    pub fn caps(&self) -> (u32, u32) {
        self.caps
    }

    pub fn ko(&self) -> Option<Point> {
        self.ko
    }

    /// The ordered move history, as far back as this position retains it.
    pub fn recent(&self) -> &[(Color, Option<Point>)] {
        &self.recent
    }

    pub fn lib_tracker(&self) -> &LibertyTracker {
        &self.lib_tracker
    }

    /// Returns the stone at `point`, or `None` if it is empty.
    pub fn at(&self, point: Point) -> Option<Color> {
        self.cells[to_flat(Some(point), self.size)]
    }

    /// Reconstructs the board as it was `k` plies ago (`k == 0` is the
    /// current board). If fewer than `k` deltas are retained, the oldest
    /// retained board is returned instead (it is repeated, per the feature
    /// extractor's contract).
    pub fn board_at(&self, k: usize) -> Vec<Option<Color>> {
        let mut cells = self.cells.clone();
        let steps = k.min(self.board_deltas.len());

        for delta in self.board_deltas.iter().take(steps) {
            for &(point, prior) in delta {
                cells[to_flat(Some(point), self.size)] = prior;
            }
        }

        cells
    }

    /// Plays a stone of `color` (defaulting to `to_play`) at `coord`, or
    /// passes if `coord` is `None`. Returns the resulting position, or
    /// `IllegalMove` if the point is occupied, forbidden by the simple-ko
    /// rule, or suicidal.
    pub fn play_move(&self, coord: Option<Point>, color: Option<Color>) -> Result<Position, Error> {
        let color = color.unwrap_or(self.to_play);

        let point = match coord {
            None => return Ok(self.pass_move()),
            Some(point) => point
        };

        if self.at(point).is_some() {
            return Err(Error::IllegalMove(point));
        }
        if self.ko == Some(point) {
            return Err(Error::IllegalMove(point));
        }

        let mut cells = self.cells.clone();
        cells[to_flat(Some(point), self.size)] = Some(color);

        // capture any opposing groups adjacent to `point` that are now at
        // zero liberties.
        let opponent = color.opposite();
        let after_place = LibertyTracker::new(&cells, self.size);
        let mut seen_groups = BTreeSet::new();
        let mut captured_points: Vec<Point> = Vec::new();

        for neighbor in neighbors(point, self.size) {
            if cells[to_flat(Some(neighbor), self.size)] != Some(opponent) {
                continue;
            }

            let gid = after_place.group_id(neighbor).expect("occupied point has a group");

            if seen_groups.insert(gid) {
                let group = after_place.group(gid);

                if group.liberties.is_empty() {
                    captured_points.extend(group.stones.iter().copied());
                }
            }
        }

        for &captured in &captured_points {
            cells[to_flat(Some(captured), self.size)] = None;
        }

        let mut caps = self.caps;
        match color {
            Color::Black => caps.0 += captured_points.len() as u32,
            Color::White => caps.1 += captured_points.len() as u32
        }

        let lib_tracker = LibertyTracker::new(&cells, self.size);
        let own_gid = lib_tracker.group_id(point).expect("the stone just placed forms a group");
        let own_group = lib_tracker.group(own_gid);

        if own_group.liberties.is_empty() {
            return Err(Error::IllegalMove(point)); // suicide: captured nothing and has no liberties
        }

        let ko = if captured_points.len() == 1
            && own_group.stones.len() == 1
            && own_group.liberties.len() == 1
            && own_group.liberties[0] == captured_points[0]
        {
            Some(captured_points[0])
        } else {
            None
        };

        let mut delta = Vec::with_capacity(1 + captured_points.len());
        delta.push((point, None));
        for &captured in &captured_points {
            delta.push((captured, Some(opponent)));
        }

        let mut board_deltas = self.board_deltas.clone();
        board_deltas.push_front(delta);
        if board_deltas.len() > MAX_DELTAS {
            board_deltas.pop_back();
        }

        let mut recent = self.recent.clone();
        recent.push((color, Some(point)));

        Ok(Position {
            size: self.size,
            cells,
            to_play: color.opposite(),
            n: self.n + 1,
            komi: self.komi,
            caps,
            ko,
            recent,
            board_deltas,
            lib_tracker
        })
    }

    /// Returns true iff `coord` is a legal move for `to_play` (Pass is
    /// always legal).
    pub fn is_move_legal(&self, coord: Option<Point>) -> bool {
        match coord {
            None => true,
            Some(_) => self.play_move(coord, None).is_ok()
        }
    }

    /// Returns a mask of length `size*size + 1` (Pass last) of which moves
    /// are legal for `to_play`.
    pub fn all_legal_moves(&self) -> Vec<bool> {
        let mut out: Vec<bool> = Point::all(self.size).map(|p| self.is_move_legal(Some(p))).collect();
        out.push(true); // Pass is always legal

        out
    }

    /// Passes: advances the ply count and turn without placing a stone,
    /// clearing `ko`.
    pub fn pass_move(&self) -> Position {
        let mut recent = self.recent.clone();
        recent.push((self.to_play, None));

        let mut board_deltas = self.board_deltas.clone();
        board_deltas.push_front(Vec::new());
        if board_deltas.len() > MAX_DELTAS {
            board_deltas.pop_back();
        }

        Position {
            size: self.size,
            cells: self.cells.clone(),
            to_play: self.to_play.opposite(),
            n: self.n + 1,
            komi: self.komi,
            caps: self.caps,
            ko: None,
            recent,
            board_deltas,
            lib_tracker: self.lib_tracker.clone()
        }
    }

    /// Returns a copy of this position with `to_play` flipped and `ko`
    /// cleared, without recording a move. Used when the search needs to
    /// reason about what the board would look like from the other player's
    /// perspective without actually playing a stone.
    pub fn flip_playerturn(&self) -> Position {
        let mut next = self.clone();
        next.to_play = self.to_play.opposite();
        next.ko = None;

        next
    }

    /// True iff the two most recent moves were both Pass.
    pub fn is_game_over(&self) -> bool {
        let len = self.recent.len();

        len >= 2 && self.recent[len - 1].1.is_none() && self.recent[len - 2].1.is_none()
    }

    /// The Tromp-Taylor area score: Black's stones plus Black-only
    /// territory, minus White's stones, White-only territory, and komi. A
    /// positive score is a Black win.
    pub fn score(&self) -> f32 {
        let mut visited = vec![false; self.size * self.size];
        let (mut black_stones, mut white_stones) = (0i32, 0i32);
        let (mut black_territory, mut white_territory) = (0i32, 0i32);

        for cell in &self.cells {
            match cell {
                Some(Color::Black) => black_stones += 1,
                Some(Color::White) => white_stones += 1,
                None => { }
            }
        }

        for start in 0..self.size * self.size {
            if visited[start] || self.cells[start].is_some() {
                continue;
            }

            let mut stack = vec![start];
            visited[start] = true;
            let mut region_size = 0i32;
            let (mut borders_black, mut borders_white) = (false, false);

            while let Some(idx) = stack.pop() {
                region_size += 1;
                let point = from_flat(idx, self.size).expect("idx is within the board");

                for neighbor in neighbors(point, self.size) {
                    let nidx = to_flat(Some(neighbor), self.size);

                    match self.cells[nidx] {
                        None => {
                            if !visited[nidx] {
                                visited[nidx] = true;
                                stack.push(nidx);
                            }
                        },
                        Some(Color::Black) => borders_black = true,
                        Some(Color::White) => borders_white = true
                    }
                }
            }

            if borders_black && !borders_white {
                black_territory += region_size;
            } else if borders_white && !borders_black {
                white_territory += region_size;
            }
        }

        (black_stones + black_territory) as f32 - (white_stones + white_territory) as f32 - self.komi
    }

    /// The sign of `score()`: `+1.0` for a Black win, `-1.0` for a White
    /// win.
    pub fn result(&self) -> f32 {
        if self.score() > 0.0 { 1.0 } else { -1.0 }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        for row in 0..self.size {
            for col in 0..self.size {
                let ch = match self.cells[row * self.size + col] {
                    Some(Color::Black) => 'X',
                    Some(Color::White) => 'O',
                    None => '.'
                };

                write!(fmt, "{}", ch)?;
            }
            writeln!(fmt)?;
        }

        Ok(())
    }
}
