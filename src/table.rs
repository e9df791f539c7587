//! Spreadsheet-shaped interchange for rosters and seating charts.
//!
//! A seating chart looks like:
//!
//! ```text
//! row/col | col 1      | col 2
//! row 1   | Ada\n(F)   | empty
//! row 2   | Bo\n(M)    | Cy\n(F)
//!
//! summary
//! total students  | 3
//! ...
//! ```
//!
//! Anything whose top-left cell is not `row/col` is read as a plain roster
//! list: a header row followed by `name | gender` rows.

use crate::error::{Result, SeatingError};
use crate::grid::{SeatingGrid, MAX_DIMENSION};
use crate::roster::{Gender, RosterStore, Student};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::sync::OnceLock;

pub const HEADER_SENTINEL: &str = "row/col";
pub const EMPTY_SEAT: &str = "empty";
pub const SUMMARY_TITLE: &str = "summary";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TableCell {
    Text(String),
    Number(f64),
    Empty,
}

impl TableCell {
    pub fn text(s: impl Into<String>) -> Self {
        TableCell::Text(s.into())
    }

    /// Cell contents as trimmed text; `None` for blank cells.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        match self {
            TableCell::Text(s) if !s.trim().is_empty() => Some(Cow::Borrowed(s.as_str())),
            TableCell::Number(n) => Some(Cow::Owned(format_number(*n))),
            _ => None,
        }
    }
}

/// Whole numbers print without a fractional part (`42.0` -> `42`).
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Table {
    pub rows: Vec<Vec<TableCell>>,
}

impl Table {
    pub fn new(rows: Vec<Vec<TableCell>>) -> Self {
        Self { rows }
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&TableCell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    pub fn is_seating_chart(&self) -> bool {
        matches!(self.cell(0, 0), Some(TableCell::Text(s)) if s.trim() == HEADER_SENTINEL)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Placement {
    pub row: usize,
    pub col: usize,
    pub student: Student,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartImport {
    pub rows: usize,
    pub cols: usize,
    pub placements: Vec<Placement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RosterListImport {
    pub students: Vec<Student>,
    /// Rows with a name and gender where the gender did not parse.
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableImport {
    SeatingChart(ChartImport),
    RosterList(RosterListImport),
}

fn seat_text(student: &Student) -> String {
    format!("{}\n({})", student.name, student.gender)
}

pub fn export_table(roster: &RosterStore, grid: &SeatingGrid) -> Result<Table> {
    if roster.is_empty() {
        return Err(SeatingError::EmptyRoster);
    }

    let mut rows = Vec::with_capacity(grid.rows() + 8);
    let mut header = vec![TableCell::text(HEADER_SENTINEL)];
    header.extend((1..=grid.cols()).map(|c| TableCell::text(format!("col {}", c))));
    rows.push(header);

    for (i, seats) in grid.seat_rows().enumerate() {
        let mut row = vec![TableCell::text(format!("row {}", i + 1))];
        row.extend(seats.iter().map(|seat| {
            match seat.as_deref().and_then(|name| roster.get(name)) {
                Some(student) => TableCell::Text(seat_text(student)),
                None => TableCell::text(EMPTY_SEAT),
            }
        }));
        rows.push(row);
    }

    let stats = roster.stats();
    let seats = grid.capacity() as f64;
    rows.push(Vec::new());
    rows.push(vec![TableCell::text(SUMMARY_TITLE)]);
    for (label, value) in [
        ("total students", stats.total as f64),
        ("male students", stats.male as f64),
        ("female students", stats.female as f64),
        ("total seats", seats),
        ("free seats", seats - stats.total as f64),
    ] {
        rows.push(vec![TableCell::text(label), TableCell::Number(value)]);
    }

    Ok(Table::new(rows))
}

fn gender_marker() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\(\s*(female|male|f|m|男|女)\s*\)").expect("valid gender regex")
    })
}

fn axis_label() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)^(row|col)\s*\d+$").expect("valid label regex"))
}

/// Reads one seat cell. Tried in order: `name\n(G)`, `name (G)`, bare name
/// (counted as male).
pub fn parse_student_info(cell: &str) -> Option<Student> {
    let marker = gender_marker();

    let lines: Vec<&str> = cell.split('\n').collect();
    if lines.len() >= 2 {
        let name = lines[0].trim();
        if let Some(caps) = marker.captures(lines[1]) {
            if let (false, Ok(gender)) = (name.is_empty(), caps[1].parse::<Gender>()) {
                return Some(Student::new(name, gender));
            }
        }
    }

    if let Some(caps) = marker.captures(cell) {
        let name = marker.replace(cell, "");
        let name = name.trim();
        if let (false, Ok(gender)) = (name.is_empty(), caps[1].parse::<Gender>()) {
            return Some(Student::new(name, gender));
        }
    }

    let name = cell.trim();
    if name.is_empty() {
        None
    } else {
        Some(Student::new(name, Gender::M))
    }
}

pub fn import_table(table: &Table) -> Result<TableImport> {
    if table.is_seating_chart() {
        import_chart(table).map(TableImport::SeatingChart)
    } else {
        import_roster_list(table).map(TableImport::RosterList)
    }
}

fn import_chart(table: &Table) -> Result<ChartImport> {
    let header = &table.rows[0];
    let cols = header
        .iter()
        .rposition(|c| c.as_text().is_some())
        .unwrap_or(0);

    let mut rows = 0;
    let mut placements = Vec::new();
    for (i, row) in table.rows.iter().enumerate().skip(1) {
        let is_seat_row = row
            .first()
            .and_then(TableCell::as_text)
            .is_some_and(|label| label.to_lowercase().contains("row"));
        if !is_seat_row {
            continue;
        }
        let seat_row = i - 1;
        rows = rows.max(seat_row + 1);

        for (j, cell) in row.iter().enumerate().skip(1).take(cols) {
            let Some(text) = cell.as_text() else {
                continue;
            };
            let text = text.trim();
            if text.eq_ignore_ascii_case(EMPTY_SEAT) || axis_label().is_match(text) {
                continue;
            }
            if let Some(student) = parse_student_info(text) {
                placements.push(Placement {
                    row: seat_row,
                    col: j - 1,
                    student,
                });
            }
        }
    }

    if rows == 0 || cols == 0 || rows > MAX_DIMENSION || cols > MAX_DIMENSION {
        return Err(SeatingError::ImportParseFailure(format!(
            "seating chart has an unusable {}x{} layout",
            rows, cols
        )));
    }
    if placements.is_empty() {
        return Err(SeatingError::ImportParseFailure(
            "seating chart has no occupied seats".to_string(),
        ));
    }
    Ok(ChartImport {
        rows,
        cols,
        placements,
    })
}

fn import_roster_list(table: &Table) -> Result<RosterListImport> {
    let mut students = Vec::new();
    let mut skipped = 0;
    for row in table.rows.iter().skip(1) {
        let name = row.first().and_then(TableCell::as_text);
        let gender = row.get(1).and_then(TableCell::as_text);
        let (Some(name), Some(gender)) = (name, gender) else {
            continue;
        };
        match gender.parse::<Gender>() {
            Ok(gender) => students.push(Student::new(name.trim(), gender)),
            Err(_) => skipped += 1,
        }
    }
    if students.is_empty() {
        return Err(SeatingError::ImportParseFailure(
            "no student rows found".to_string(),
        ));
    }
    Ok(RosterListImport { students, skipped })
}
