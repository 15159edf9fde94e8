//! The playing field and the placement algorithm.
//!
//! The field is a fixed 15x40 grid stored column-major, where each cell holds
//! a piece id (1-based) or 0 for empty. Row 0 is the bottom row. Alongside the
//! cells the field keeps a skyline: for every column, one past the highest
//! occupied row. Dropping a form only has to consult the skyline of the
//! columns it covers, and clearing only rescans the rows it touched.

use std::fmt;

use crate::error::PlacementError;
use crate::piece::Form;

/// Number of columns.
pub const FIELD_WIDTH: usize = 15;

/// Number of rows.
pub const FIELD_HEIGHT: usize = 40;

/// Field contents plus skyline. Plain value type; clone it to branch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    tiles: [[u8; FIELD_HEIGHT]; FIELD_WIDTH],
    top: [usize; FIELD_WIDTH],
}

impl Default for Field {
    fn default() -> Self {
        Self::new()
    }
}

impl Field {
    /// Creates an empty field.
    pub const fn new() -> Self {
        Self {
            tiles: [[0; FIELD_HEIGHT]; FIELD_WIDTH],
            top: [0; FIELD_WIDTH],
        }
    }

    /// Piece id at `(x, y)`, or 0 when empty.
    #[inline(always)]
    pub fn tile(&self, x: usize, y: usize) -> u8 {
        self.tiles[x][y]
    }

    #[inline(always)]
    pub fn is_filled(&self, x: usize, y: usize) -> bool {
        self.tiles[x][y] != 0
    }

    /// Skyline height of column `x`.
    #[inline(always)]
    pub fn top(&self, x: usize) -> usize {
        self.top[x]
    }

    #[inline]
    pub fn skyline(&self) -> &[usize; FIELD_WIDTH] {
        &self.top
    }

    /// True when every column of row `y` is occupied.
    #[inline]
    pub fn row_is_full(&self, y: usize) -> bool {
        self.tiles.iter().all(|column| column[y] != 0)
    }

    /// Row at which `form` comes to rest when dropped with its left edge at
    /// `xpos`.
    ///
    /// Form columns without a profile impose no constraint, so a form may
    /// overhang lower columns. `xpos + form.width()` must not exceed the
    /// field width.
    pub fn rest_row(&self, form: &Form, xpos: usize) -> usize {
        (0..form.width())
            .filter_map(|x| {
                form.profile(x)
                    .map(|profile| self.top[xpos + x].saturating_sub(profile.bottom))
            })
            .max()
            .unwrap_or(0)
    }

    /// Drops `form` with its left edge at column `xpos`.
    ///
    /// On success returns the number of rows cleared (0 to 5). On failure the
    /// field is left untouched.
    pub fn place(&mut self, form: &Form, xpos: i32) -> Result<usize, PlacementError> {
        if xpos < 0 || xpos as usize + form.width() > FIELD_WIDTH {
            return Err(PlacementError::OutOfBounds {
                xpos,
                width: form.width(),
            });
        }
        let xpos = xpos as usize;

        let rest = self.rest_row(form, xpos);
        if rest + form.height() > FIELD_HEIGHT {
            return Err(PlacementError::TooHigh);
        }

        for x in 0..form.width() {
            let column = xpos + x;
            for y in 0..form.height() {
                if form.is_filled(x, y) {
                    self.tiles[column][rest + y] = form.tile(x, y);
                }
            }
            if let Some(profile) = form.profile(x) {
                self.top[column] = rest + profile.top;
            }
        }

        // top to bottom, so a cleared row never shifts an unscanned one
        let mut cleared = 0;
        for y in (rest..rest + form.height()).rev() {
            if self.row_is_full(y) {
                self.clear_row(y);
                cleared += 1;
            }
        }

        Ok(cleared)
    }

    /// Removes row `y`, moving everything above it down by one.
    fn clear_row(&mut self, y: usize) {
        for (column, top) in self.tiles.iter_mut().zip(self.top.iter_mut()) {
            column.copy_within(y + 1.., y);
            column[FIELD_HEIGHT - 1] = 0;

            // lowering the column may expose holes left below the old top
            let mut height = (*top).max(y + 1) - 1;
            while height > 0 && column[height - 1] == 0 {
                height -= 1;
            }
            *top = height;
        }
    }
}

impl fmt::Display for Field {
    /// Rows top to bottom as `#`/`.`, followed by the skyline heights.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in (0..FIELD_HEIGHT).rev() {
            for x in 0..FIELD_WIDTH {
                f.write_str(if self.is_filled(x, y) { "#" } else { "." })?;
            }
            writeln!(f)?;
        }
        for (x, top) in self.top.iter().enumerate() {
            if x > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{top}")?;
        }
        writeln!(f)
    }
}
