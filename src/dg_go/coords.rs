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

//! Pure conversions between the coordinate spaces used throughout the
//! engine:
//!
//! * [`Point`] -- a `(row, col)` pair, `0`-indexed from the top-left. `Pass`
//!   is represented as `Option<Point> = None`, mirroring the way the rest of
//!   the engine treats "no point" throughout.
//! * *Flattened* -- a single `usize` in `[0, size * size]`, with `size *
//!   size` reserved for `Pass`. This is the index space used by policy
//!   vectors and by `child_N`/`child_W`/`child_prior`.
//! * SGF text -- two lowercase letters, `""` for `Pass`.
//! * GTP text -- a column letter (skipping `I`) followed by a 1-based row
//!   counted from the bottom, `"pass"` for `Pass`.

use crate::error::Error;

const SGF_COLUMNS: &str = "abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const GTP_COLUMNS: &str = "ABCDEFGHJKLMNOPQRSTUVWXYZ";

/// A point on the board, `0`-indexed from the top-left corner. `Pass` is
/// represented as `None` wherever a `Point` is expected in this crate.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct Point {
    row: u8,
    col: u8
}

impl Point {
    pub fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    pub fn row(self) -> u8 {
        self.row
    }

    pub fn col(self) -> u8 {
        self.col
    }

    /// Returns every point on a `size * size` board, in row-major order.
    pub fn all(size: usize) -> impl Iterator<Item = Point> {
        (0..size).flat_map(move |row| (0..size).map(move |col| Point::new(row as u8, col as u8)))
    }
}

/// Converts a `(point, size)` pair to its flattened index. `None` (pass)
/// maps to `size * size`.
pub fn to_flat(coord: Option<Point>, size: usize) -> usize {
    match coord {
        None => size * size,
        Some(point) => point.row() as usize * size + point.col() as usize
    }
}

/// Converts a flattened index back to a `Point`, or `None` if it denotes
/// `Pass`.
pub fn from_flat(flat: usize, size: usize) -> Option<Point> {
    if flat == size * size {
        None
    } else {
        Some(Point::new((flat / size) as u8, (flat % size) as u8))
    }
}

/// Converts a `Point` to its two-letter SGF encoding, or `""` for `Pass`.
pub fn to_sgf(coord: Option<Point>) -> String {
    match coord {
        None => String::new(),
        Some(point) => {
            let columns = SGF_COLUMNS.as_bytes();

            [columns[point.col() as usize] as char, columns[point.row() as usize] as char]
                .iter()
                .collect()
        }
    }
}

/// Parses a two-letter SGF coordinate. An empty string, or (for boards no
/// larger than 19x19) the traditional `"tt"` pass marker, is `Pass`.
pub fn from_sgf(text: &str, size: usize) -> Result<Option<Point>, Error> {
    if text.is_empty() || (size <= 19 && text == "tt") {
        return Ok(None);
    }

    let chars: Vec<char> = text.chars().collect();

    if chars.len() != 2 {
        return Err(Error::BadCoordinate(text.to_string()));
    }

    let col = SGF_COLUMNS.find(chars[0]).ok_or_else(|| Error::BadCoordinate(text.to_string()))?;
    let row = SGF_COLUMNS.find(chars[1]).ok_or_else(|| Error::BadCoordinate(text.to_string()))?;

    Ok(Some(Point::new(row as u8, col as u8)))
}

/// Converts a `Point` to its GTP encoding, or `"pass"` for `Pass`.
pub fn to_gtp(coord: Option<Point>, size: usize) -> String {
    match coord {
        None => "pass".to_string(),
        Some(point) => {
            let columns = GTP_COLUMNS.as_bytes();
            let col = columns[point.col() as usize] as char;
            let row_from_bottom = size - point.row() as usize;

            format!("{}{}", col, row_from_bottom)
        }
    }
}

/// Parses a GTP coordinate (case-insensitive). `"pass"` is `Pass`.
pub fn from_gtp(text: &str, size: usize) -> Result<Option<Point>, Error> {
    let upper = text.to_uppercase();

    if upper == "PASS" {
        return Ok(None);
    }

    let mut chars = upper.chars();
    let col_ch = chars.next().ok_or_else(|| Error::BadCoordinate(text.to_string()))?;
    let col = GTP_COLUMNS.find(col_ch).ok_or_else(|| Error::BadCoordinate(text.to_string()))?;
    let row_from_bottom: usize = chars.as_str().parse().map_err(|_| Error::BadCoordinate(text.to_string()))?;

    if row_from_bottom == 0 || row_from_bottom > size {
        return Err(Error::BadCoordinate(text.to_string()));
    }

    Ok(Some(Point::new((size - row_from_bottom) as u8, col as u8)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_every_point_and_pass() {
        let size = 9;

        for point in Point::all(size) {
            let coord = Some(point);
            let flat = to_flat(coord, size);

            assert_eq!(from_flat(flat, size), coord);
            assert_eq!(from_sgf(&to_sgf(coord), size).unwrap(), coord);
            assert_eq!(from_gtp(&to_gtp(coord, size), size).unwrap(), coord);
        }

        assert_eq!(to_flat(None, size), size * size);
        assert_eq!(from_flat(size * size, size), None);
        assert_eq!(from_sgf(&to_sgf(None), size).unwrap(), None);
        assert_eq!(from_gtp(&to_gtp(None, size), size).unwrap(), None);
    }

    #[test]
    fn gtp_skips_i() {
        let size = 19;

        // column index 8 is 'I' in the alphabet, but GTP skips it, so the
        // 9th column (index 8) should be encoded as 'J'.
        let point = Point::new(0, 8);

        assert_eq!(to_gtp(Some(point), size), "J19");
    }

    #[test]
    fn gtp_is_indexed_from_the_bottom() {
        let size = 19;
        let top_left = Point::new(0, 0);
        let bottom_left = Point::new(18, 0);

        assert_eq!(to_gtp(Some(top_left), size), "A19");
        assert_eq!(to_gtp(Some(bottom_left), size), "A1");
    }

    #[test]
    fn malformed_text_is_an_error() {
        assert!(from_gtp("Z99", 19).is_err());
        assert!(from_gtp("", 19).is_err());
        assert!(from_sgf("z", 19).is_err());
    }
}
