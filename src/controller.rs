use crate::error::{Result, SeatingError};
use crate::grid::{ClearOutcome, SeatingGrid, DEFAULT_COLS, DEFAULT_ROWS};
use crate::roster::{Gender, ImportMode, RosterStore, Student};
use crate::table::{self, Table, TableImport};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

/// Called with the new state after every successful mutation.
pub type OnChange = Box<dyn FnMut(&ClassroomState)>;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassroomState {
    pub roster: RosterStore,
    pub grid: SeatingGrid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    pub rows: usize,
    pub cols: usize,
    pub enforce_single_seat: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            enforce_single_seat: false,
        }
    }
}

/// What the UI should do after a seat was clicked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SeatClick {
    /// Taken seats are not reassigned in place; clear first.
    Occupied { name: String },
    NoStudents,
    AllSeated,
    ChooseStudent { candidates: Vec<Student> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ImportFormat {
    SeatingChart,
    RosterList,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportOutcome {
    pub format: ImportFormat,
    pub added: usize,
    pub skipped: usize,
    pub seated: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassroomStats {
    pub total: usize,
    pub male: usize,
    pub female: usize,
    pub seats: usize,
    pub seated: usize,
    /// `seats - total`; negative when the roster outgrows the room.
    pub free: i64,
}

pub struct Controller {
    state: ClassroomState,
    options: ControllerOptions,
    hooks: Vec<OnChange>,
    rng: StdRng,
}

impl Controller {
    pub fn new(options: ControllerOptions) -> Result<Self> {
        Self::with_rng(options, StdRng::from_entropy())
    }

    pub fn with_rng(options: ControllerOptions, rng: StdRng) -> Result<Self> {
        Ok(Self {
            state: Self::fresh_state(&options)?,
            options,
            hooks: Vec::new(),
            rng,
        })
    }

    fn fresh_state(options: &ControllerOptions) -> Result<ClassroomState> {
        Ok(ClassroomState {
            roster: RosterStore::new(),
            grid: SeatingGrid::new(options.rows, options.cols)?
                .with_single_seat(options.enforce_single_seat),
        })
    }

    /// Empty roster in the configured layout.
    pub fn initial_state(&self) -> Result<ClassroomState> {
        Self::fresh_state(&self.options)
    }

    pub fn state(&self) -> &ClassroomState {
        &self.state
    }

    pub fn options(&self) -> ControllerOptions {
        self.options
    }

    pub fn on_change(&mut self, hook: OnChange) {
        self.hooks.push(hook);
    }

    pub fn clear_hooks(&mut self) {
        self.hooks.clear();
    }

    fn changed(&mut self) {
        for hook in self.hooks.iter_mut() {
            hook(&self.state);
        }
    }

    /// Swaps in a state loaded from storage. Hooks are not fired.
    pub fn restore(&mut self, mut state: ClassroomState) {
        state.grid = state
            .grid
            .with_single_seat(self.options.enforce_single_seat);
        self.state = state;
    }

    /// Back to an empty roster and the configured layout.
    pub fn reset(&mut self) -> Result<()> {
        self.state = self.initial_state()?;
        self.changed();
        Ok(())
    }

    pub fn add_student(&mut self, name: &str, gender: Gender) -> Result<Student> {
        let student = self.state.roster.add(name, gender)?.clone();
        self.changed();
        Ok(student)
    }

    /// Removes the student and empties every seat they held.
    pub fn remove_student(&mut self, name: &str) -> Result<usize> {
        let removed = self.state.roster.remove(name)?;
        let cleared = self.state.grid.unseat(&removed.name);
        self.changed();
        Ok(cleared)
    }

    pub fn clear_students(&mut self) {
        self.state.roster.clear();
        self.state.grid.clear_all();
        self.changed();
    }

    pub fn import_students(&mut self, rows: Vec<Student>, mode: ImportMode) -> ImportOutcome {
        let summary = self.state.roster.import_many(rows, mode);
        if mode == ImportMode::Replace {
            self.state.grid.clear_all();
        }
        self.changed();
        ImportOutcome {
            format: ImportFormat::RosterList,
            added: summary.added,
            skipped: summary.skipped,
            seated: 0,
        }
    }

    pub fn resize(&mut self, rows: usize, cols: usize) -> Result<()> {
        self.state.grid.resize(rows, cols)?;
        self.changed();
        Ok(())
    }

    pub fn handle_seat_click(&self, row: usize, col: usize) -> Result<SeatClick> {
        if let Some(name) = self.state.grid.get(row, col)? {
            return Ok(SeatClick::Occupied {
                name: name.to_string(),
            });
        }
        if self.state.roster.is_empty() {
            return Ok(SeatClick::NoStudents);
        }
        let candidates: Vec<Student> = self
            .state
            .grid
            .unseated_students(&self.state.roster)
            .into_iter()
            .cloned()
            .collect();
        if candidates.is_empty() {
            return Ok(SeatClick::AllSeated);
        }
        Ok(SeatClick::ChooseStudent { candidates })
    }

    pub fn assign_seat(&mut self, row: usize, col: usize, name: &str) -> Result<Student> {
        let student = self
            .state
            .roster
            .get(name)
            .cloned()
            .ok_or_else(|| SeatingError::StudentNotFound(name.to_string()))?;
        self.state.grid.place(row, col, &student)?;
        self.changed();
        Ok(student)
    }

    pub fn clear_seat(&mut self, row: usize, col: usize) -> Result<ClearOutcome> {
        let outcome = self.state.grid.clear(row, col)?;
        if outcome == ClearOutcome::Cleared {
            self.changed();
        }
        Ok(outcome)
    }

    pub fn unseated_students(&self) -> Vec<&Student> {
        self.state.grid.unseated_students(&self.state.roster)
    }

    pub fn auto_arrange(&mut self) -> Result<usize> {
        let seated = self
            .state
            .grid
            .auto_arrange(&self.state.roster, &mut self.rng)?;
        self.changed();
        Ok(seated)
    }

    pub fn export_table(&self) -> Result<Table> {
        table::export_table(&self.state.roster, &self.state.grid)
    }

    /// Applies a roster list or seating chart. The work happens on a copy so
    /// a failure leaves the current state untouched.
    pub fn import_table(&mut self, table: &Table, mode: ImportMode) -> Result<ImportOutcome> {
        let mut next = self.state.clone();
        let outcome = match table::import_table(table)? {
            TableImport::RosterList(list) => {
                let summary = next.roster.import_many(list.students, mode);
                if mode == ImportMode::Replace {
                    next.grid.clear_all();
                }
                ImportOutcome {
                    format: ImportFormat::RosterList,
                    added: summary.added,
                    skipped: summary.skipped + list.skipped,
                    seated: 0,
                }
            }
            TableImport::SeatingChart(chart) => {
                if mode == ImportMode::Replace {
                    next.roster.clear();
                }
                next.grid.resize(chart.rows, chart.cols)?;

                let mut outcome = ImportOutcome {
                    format: ImportFormat::SeatingChart,
                    added: 0,
                    skipped: 0,
                    seated: 0,
                };
                for placement in chart.placements {
                    // A name already on the roster keeps its roster gender.
                    let student = match next.roster.get(&placement.student.name) {
                        Some(existing) => existing.clone(),
                        None => {
                            outcome.added += 1;
                            next.roster
                                .add(&placement.student.name, placement.student.gender)?
                                .clone()
                        }
                    };
                    match next.grid.place(placement.row, placement.col, &student) {
                        Ok(()) => outcome.seated += 1,
                        Err(_) => outcome.skipped += 1,
                    }
                }
                if outcome.seated == 0 {
                    return Err(SeatingError::ImportParseFailure(
                        "no seats could be filled from the chart".to_string(),
                    ));
                }
                outcome
            }
        };
        self.state = next;
        self.changed();
        Ok(outcome)
    }

    pub fn stats(&self) -> ClassroomStats {
        let roster = self.state.roster.stats();
        let seats = self.state.grid.capacity();
        ClassroomStats {
            total: roster.total,
            male: roster.male,
            female: roster.female,
            seats,
            seated: self.state.grid.occupied(),
            free: seats as i64 - roster.total as i64,
        }
    }
}
