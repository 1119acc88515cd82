//! Grid coordinates and the `A1`-style label codec.
//!
//! `Position` is a zero-based `(row, col)` pair with fixed grid bounds.
//! The textual form is a bijective base-26 column label (`A`, `Z`, `AA`,
//! `XFD`) followed by the one-based row number. The sentinel
//! `Position::NONE` stands in for "no position" wherever a parse or a
//! lookup has nothing to return.

use core::fmt;
use once_cell::sync::Lazy;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const LETTERS: i32 = 26;

pub const MAX_ROWS: i32 = 16_384;
pub const MAX_COLS: i32 = 16_384;
pub const MAX_POSITION_LENGTH: usize = 17;
pub const MAX_POS_LETTER_COUNT: usize = 3;

// Column lookup table for common columns (A-ZZ = 702 columns).
static COLUMN_LOOKUP: Lazy<Vec<String>> = Lazy::new(|| {
    let mut cols = Vec::with_capacity(702);
    for c in b'A'..=b'Z' {
        cols.push(String::from(c as char));
    }
    for c1 in b'A'..=b'Z' {
        for c2 in b'A'..=b'Z' {
            cols.push(format!("{}{}", c1 as char, c2 as char));
        }
    }
    cols
});

/// Zero-based grid coordinate. Ordered lexicographically: row, then col.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    /// The "no position" sentinel. Never valid.
    pub const NONE: Self = Self { row: -1, col: -1 };

    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    #[inline]
    pub fn is_valid(self) -> bool {
        self.row >= 0 && self.col >= 0 && self.row < MAX_ROWS && self.col < MAX_COLS
    }

    /// Decode an `A1`-style label.
    ///
    /// Anything that is not `[A-Z]{1,3}[0-9]+`, is longer than
    /// `MAX_POSITION_LENGTH`, or decodes outside the grid bounds yields
    /// `NONE`. Row digits accumulate with checked arithmetic so oversized
    /// inputs cannot wrap around into a valid coordinate.
    pub fn from_label(s: &str) -> Position {
        if s.is_empty() || s.len() > MAX_POSITION_LENGTH {
            return Self::NONE;
        }
        let bytes = s.as_bytes();

        let mut letter_count = 0;
        while letter_count < bytes.len() && bytes[letter_count].is_ascii_alphabetic() {
            if !bytes[letter_count].is_ascii_uppercase() {
                return Self::NONE;
            }
            letter_count += 1;
        }
        if letter_count == 0
            || letter_count > MAX_POS_LETTER_COUNT
            || letter_count == bytes.len()
        {
            return Self::NONE;
        }

        let mut col: i32 = 0;
        for &b in &bytes[..letter_count] {
            col = col * LETTERS + (b - b'A' + 1) as i32;
        }

        let mut row: i32 = 0;
        for &b in &bytes[letter_count..] {
            if !b.is_ascii_digit() {
                return Self::NONE;
            }
            row = match row
                .checked_mul(10)
                .and_then(|r| r.checked_add((b - b'0') as i32))
            {
                Some(r) => r,
                None => return Self::NONE,
            };
        }

        let pos = Position {
            row: row - 1,
            col: col - 1,
        };
        if pos.is_valid() { pos } else { Self::NONE }
    }
}

impl fmt::Display for Position {
    /// The canonical label, or nothing at all for an invalid position.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_valid() {
            return Ok(());
        }
        if (self.col as usize) < COLUMN_LOOKUP.len() {
            f.write_str(&COLUMN_LOOKUP[self.col as usize])?;
        } else {
            let mut letters = String::with_capacity(MAX_POS_LETTER_COUNT);
            let mut c = self.col;
            while c >= 0 {
                letters.insert(0, (b'A' + (c % LETTERS) as u8) as char);
                c = c / LETTERS - 1;
            }
            f.write_str(&letters)?;
        }
        write!(f, "{}", self.row + 1)
    }
}

/// A grid extent, as returned by the printable-size query.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub struct Size {
    pub rows: i32,
    pub cols: i32,
}
