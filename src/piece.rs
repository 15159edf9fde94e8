//! Piece shapes and their oriented forms.
//!
//! A piece is described by up to five rows of up to five characters:
//! `0` for an empty cell, `1` for a filled cell and `X` for the single filled
//! pivot cell. Loading trims the description to its bounding box, flips it so
//! that row 0 is the bottom row, and derives the three clockwise rotations.

use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::{LoadError, ShapeError};
use crate::field::FIELD_WIDTH;

/// Maximum width and height of any form.
pub const PIECE_SIZE: usize = 5;

/// Number of quarter turns a piece can make.
pub const NUM_ROTATIONS: usize = 4;

/// Extent of the lowest contiguous run of filled cells in one form column.
///
/// `bottom` is the lowest filled row and `top` is one past the highest row of
/// that run, so `top > bottom` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnProfile {
    pub bottom: usize,
    pub top: usize,
}

/// One orientation of a piece together with its placement geometry.
///
/// Cells are indexed `[x][y]` with `y = 0` at the bottom. Filled cells hold
/// the piece id, empty cells hold 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Form {
    width: usize,
    height: usize,
    tiles: [[u8; PIECE_SIZE]; PIECE_SIZE],
    profile: [Option<ColumnProfile>; PIECE_SIZE],
    rotation: usize,
    pivot: (usize, usize),
    translation: i32,
    id: u8,
}

impl Form {
    /// Builds the unrotated form and derives its profile and translation.
    fn new(
        id: u8,
        width: usize,
        height: usize,
        tiles: [[u8; PIECE_SIZE]; PIECE_SIZE],
        pivot: (usize, usize),
    ) -> Self {
        let mut form = Self {
            width,
            height,
            tiles,
            profile: [None; PIECE_SIZE],
            rotation: 0,
            pivot,
            translation: 0,
            id,
        };
        form.derive_geometry();
        form
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Piece identity, 1-based.
    #[inline]
    pub fn id(&self) -> u8 {
        self.id
    }

    /// Number of clockwise quarter turns from the loaded orientation.
    #[inline]
    pub fn rotation(&self) -> usize {
        self.rotation
    }

    /// Pivot cell as `(x, y)` within this orientation.
    #[inline]
    pub fn pivot(&self) -> (usize, usize) {
        self.pivot
    }

    /// Offset of the pivot column from the field's centre column.
    ///
    /// A piece whose protocol translation is 0 lands at
    /// `xpos = -translation`, which puts the pivot under the centre column.
    #[inline]
    pub fn translation(&self) -> i32 {
        self.translation
    }

    /// Raw cell value: the piece id when filled, 0 otherwise.
    #[inline]
    pub fn tile(&self, x: usize, y: usize) -> u8 {
        self.tiles[x][y]
    }

    #[inline]
    pub fn is_filled(&self, x: usize, y: usize) -> bool {
        self.tiles[x][y] != 0
    }

    /// Profile of column `x`, or `None` when the column is empty.
    #[inline]
    pub fn profile(&self, x: usize) -> Option<ColumnProfile> {
        self.profile[x]
    }

    /// Iterates over the `(x, y)` coordinates of every filled cell.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.width).flat_map(move |x| {
            (0..self.height)
                .filter(move |&y| self.is_filled(x, y))
                .map(move |y| (x, y))
        })
    }

    /// Returns this form turned 90 degrees clockwise.
    ///
    /// Cell `(x, y)` moves to `(height - 1 - y, x)`.
    pub fn rotated(&self) -> Self {
        let mut tiles = [[0u8; PIECE_SIZE]; PIECE_SIZE];
        for x in 0..self.width {
            for y in 0..self.height {
                tiles[self.height - 1 - y][x] = self.tiles[x][y];
            }
        }

        let (pivot_x, pivot_y) = self.pivot;
        let mut form = Self {
            width: self.height,
            height: self.width,
            tiles,
            profile: [None; PIECE_SIZE],
            rotation: (self.rotation + 1) % NUM_ROTATIONS,
            pivot: (self.height - 1 - pivot_y, pivot_x),
            translation: 0,
            id: self.id,
        };
        form.derive_geometry();
        form
    }

    /// True when both forms occupy exactly the same cells.
    ///
    /// Rotation, pivot and translation are ignored.
    pub fn same_shape(&self, other: &Form) -> bool {
        self.width == other.width
            && self.height == other.height
            && (0..self.width)
                .all(|x| (0..self.height).all(|y| self.is_filled(x, y) == other.is_filled(x, y)))
    }

    fn derive_geometry(&mut self) {
        for x in 0..PIECE_SIZE {
            self.profile[x] = if x < self.width {
                self.column_profile(x)
            } else {
                None
            };
        }
        self.translation = self.pivot.0 as i32 - (FIELD_WIDTH / 2) as i32;
    }

    /// Scans upward from the first filled cell and stops at the first gap.
    ///
    /// Only the lowest run is tracked; a column with an inner gap reports the
    /// top of its lower run.
    fn column_profile(&self, x: usize) -> Option<ColumnProfile> {
        let bottom = (0..self.height).find(|&y| self.is_filled(x, y))?;
        let top = (bottom..self.height)
            .find(|&y| !self.is_filled(x, y))
            .unwrap_or(self.height);
        Some(ColumnProfile { bottom, top })
    }
}

impl fmt::Display for Form {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..self.height).rev() {
            for x in 0..self.width {
                f.write_str(if self.is_filled(x, y) { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// A piece: all four orientations plus the number of distinct ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Piece {
    forms: usize,
    form: [Form; NUM_ROTATIONS],
}

impl Piece {
    /// Parses a shape description.
    ///
    /// Rows are separated by whitespace and listed top to bottom.
    pub fn parse(id: u8, description: &str) -> Result<Self, ShapeError> {
        let rows: Vec<&[u8]> = description.split_whitespace().map(str::as_bytes).collect();
        if rows.len() > PIECE_SIZE {
            return Err(ShapeError::TooManyRows(rows.len()));
        }

        let row_len = rows.first().map_or(0, |row| row.len());
        if row_len > PIECE_SIZE {
            return Err(ShapeError::RowTooLong(row_len));
        }

        // (x, y, is_pivot) in source coordinates, y growing downward
        let mut filled = Vec::new();
        for (y, row) in rows.iter().enumerate() {
            if row.len() != row_len {
                return Err(ShapeError::RaggedRows {
                    row: y,
                    expected: row_len,
                    found: row.len(),
                });
            }
            for (x, &byte) in row.iter().enumerate() {
                match byte {
                    b'0' => {}
                    b'1' => filled.push((x, y, false)),
                    b'X' => filled.push((x, y, true)),
                    other => return Err(ShapeError::InvalidCharacter(char::from(other))),
                }
            }
        }

        let (Some(min_x), Some(max_x)) = (
            filled.iter().map(|&(x, _, _)| x).min(),
            filled.iter().map(|&(x, _, _)| x).max(),
        ) else {
            return Err(ShapeError::Empty);
        };
        let min_y = filled.iter().map(|&(_, y, _)| y).min().unwrap_or(0);
        let max_y = filled.iter().map(|&(_, y, _)| y).max().unwrap_or(0);

        let mut pivots = filled.iter().filter(|&&(_, _, pivot)| pivot);
        let (pivot_x, pivot_y, _) = *pivots.next().ok_or(ShapeError::MissingPivot)?;
        if pivots.next().is_some() {
            return Err(ShapeError::MultiplePivots);
        }

        // flip vertically so that row 0 is the bottom of the shape
        let mut tiles = [[0u8; PIECE_SIZE]; PIECE_SIZE];
        for &(x, y, _) in &filled {
            tiles[x - min_x][max_y - y] = id;
        }

        let base = Form::new(
            id,
            max_x - min_x + 1,
            max_y - min_y + 1,
            tiles,
            (pivot_x - min_x, max_y - pivot_y),
        );
        Ok(Self::from_base(base))
    }

    /// Loads a shape description from a file.
    pub fn load(id: u8, path: &Path) -> Result<Self, LoadError> {
        let description = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(id, &description).map_err(|source| LoadError::Shape {
            path: path.to_path_buf(),
            source,
        })
    }

    fn from_base(base: Form) -> Self {
        let first = base.rotated();
        let second = first.rotated();
        let third = second.rotated();
        let form = [base, first, second, third];

        // symmetric shapes repeat after one or two turns
        let forms = (1..NUM_ROTATIONS)
            .find(|&rotation| form[rotation].same_shape(&base))
            .unwrap_or(NUM_ROTATIONS);

        Self { forms, form }
    }

    /// Number of geometrically distinct orientations (1, 2 or 4).
    #[inline]
    pub fn forms(&self) -> usize {
        self.forms
    }

    /// Orientation for `rotation`, taken modulo 4.
    #[inline]
    pub fn form(&self, rotation: usize) -> &Form {
        &self.form[rotation % NUM_ROTATIONS]
    }

    /// The distinct orientations, in rotation order.
    #[inline]
    pub fn distinct_forms(&self) -> &[Form] {
        &self.form[..self.forms]
    }

    #[inline]
    pub fn id(&self) -> u8 {
        self.form[0].id
    }
}
