use crate::error::{Result, SeatingError};
use crate::roster::{RosterStore, Student};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;

pub const DEFAULT_ROWS: usize = 5;
pub const DEFAULT_COLS: usize = 8;
pub const MAX_DIMENSION: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    Cleared,
    AlreadyEmpty,
}

/// A `rows x cols` classroom. Each seat holds the name of a roster student,
/// stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeatingGrid {
    rows: usize,
    cols: usize,
    cells: Vec<Option<String>>,
    enforce_single_seat: bool,
}

impl Default for SeatingGrid {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            cells: vec![None; DEFAULT_ROWS * DEFAULT_COLS],
            enforce_single_seat: false,
        }
    }
}

fn check_dimensions(rows: usize, cols: usize) -> Result<()> {
    if rows == 0 || cols == 0 || rows > MAX_DIMENSION || cols > MAX_DIMENSION {
        return Err(SeatingError::InvalidDimensions { rows, cols });
    }
    Ok(())
}

impl SeatingGrid {
    pub fn new(rows: usize, cols: usize) -> Result<Self> {
        check_dimensions(rows, cols)?;
        Ok(Self {
            rows,
            cols,
            cells: vec![None; rows * cols],
            enforce_single_seat: false,
        })
    }

    /// When set, `place` refuses a student who already has a seat.
    pub fn with_single_seat(mut self, enforce: bool) -> Self {
        self.enforce_single_seat = enforce;
        self
    }

    pub fn enforces_single_seat(&self) -> bool {
        self.enforce_single_seat
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn capacity(&self) -> usize {
        self.rows * self.cols
    }

    fn index(&self, row: usize, col: usize) -> Result<usize> {
        if row >= self.rows || col >= self.cols {
            return Err(SeatingError::OutOfBounds {
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(row * self.cols + col)
    }

    pub fn get(&self, row: usize, col: usize) -> Result<Option<&str>> {
        let idx = self.index(row, col)?;
        Ok(self.cells[idx].as_deref())
    }

    /// Rows of seat occupants, top to bottom.
    pub fn seat_rows(&self) -> impl Iterator<Item = &[Option<String>]> {
        self.cells.chunks(self.cols)
    }

    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    /// First seat holding `name`, scanning row-major.
    pub fn position_of(&self, name: &str) -> Option<(usize, usize)> {
        self.cells
            .iter()
            .position(|c| c.as_deref() == Some(name))
            .map(|idx| (idx / self.cols, idx % self.cols))
    }

    pub fn resize(&mut self, rows: usize, cols: usize) -> Result<()> {
        check_dimensions(rows, cols)?;
        self.rows = rows;
        self.cols = cols;
        self.cells = vec![None; rows * cols];
        Ok(())
    }

    pub fn place(&mut self, row: usize, col: usize, student: &Student) -> Result<()> {
        let idx = self.index(row, col)?;
        if let Some(occupant) = &self.cells[idx] {
            return Err(SeatingError::OccupiedSeat {
                row,
                col,
                occupant: occupant.clone(),
            });
        }
        if self.enforce_single_seat {
            if let Some((r, c)) = self.position_of(&student.name) {
                return Err(SeatingError::AlreadySeated {
                    name: student.name.clone(),
                    row: r,
                    col: c,
                });
            }
        }
        self.cells[idx] = Some(student.name.clone());
        Ok(())
    }

    pub fn clear(&mut self, row: usize, col: usize) -> Result<ClearOutcome> {
        let idx = self.index(row, col)?;
        Ok(match self.cells[idx].take() {
            Some(_) => ClearOutcome::Cleared,
            None => ClearOutcome::AlreadyEmpty,
        })
    }

    pub fn clear_all(&mut self) {
        self.cells.iter_mut().for_each(|c| *c = None);
    }

    /// Empties every seat held by `name`. Returns how many were cleared.
    pub fn unseat(&mut self, name: &str) -> usize {
        let mut cleared = 0;
        for cell in self.cells.iter_mut() {
            if cell.as_deref() == Some(name) {
                *cell = None;
                cleared += 1;
            }
        }
        cleared
    }

    /// Shuffles the whole roster into the grid, row-major from seat 1-1.
    /// Nothing changes when the roster does not fit.
    pub fn auto_arrange<R: Rng + ?Sized>(&mut self, roster: &RosterStore, rng: &mut R) -> Result<usize> {
        if roster.is_empty() {
            return Err(SeatingError::EmptyRoster);
        }
        if roster.len() > self.capacity() {
            return Err(SeatingError::CapacityExceeded {
                students: roster.len(),
                seats: self.capacity(),
            });
        }

        let mut order: Vec<&str> = roster.iter().map(|s| s.name.as_str()).collect();
        order.shuffle(rng);

        self.clear_all();
        for (cell, name) in self.cells.iter_mut().zip(order.iter()) {
            *cell = Some((*name).to_string());
        }
        Ok(order.len())
    }

    pub fn unseated_students<'a>(&self, roster: &'a RosterStore) -> Vec<&'a Student> {
        let seated: HashSet<&str> = self.cells.iter().filter_map(|c| c.as_deref()).collect();
        roster.iter().filter(|s| !seated.contains(s.name.as_str())).collect()
    }
}
