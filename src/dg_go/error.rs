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

use std::error;
use std::fmt;

use crate::Point;

/// The errors that the rules engine and its coordinate conversions can
/// produce. There is no retry logic anywhere in this crate -- a caller that
/// receives an `Error` either aborts the current game (`IllegalMove`) or has
/// a malformed text coordinate to report back to whoever supplied it
/// (`BadCoordinate`).
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    /// The given point was occupied, forbidden by the simple-ko rule, or
    /// would have been suicidal without capturing anything.
    IllegalMove(Point),

    /// A GTP or SGF coordinate string could not be parsed.
    BadCoordinate(String)
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::IllegalMove(point) => write!(fmt, "illegal move at {:?}", point),
            Error::BadCoordinate(ref text) => write!(fmt, "malformed coordinate `{}`", text)
        }
    }
}

impl error::Error for Error { }
