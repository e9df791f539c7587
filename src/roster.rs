use crate::error::{Result, SeatingError};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gender {
    M,
    F,
}

impl Gender {
    pub fn as_str(self) -> &'static str {
        match self {
            Gender::M => "M",
            Gender::F => "F",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = SeatingError;

    // Legacy spreadsheets carry the CJK forms, so both are accepted.
    fn from_str(s: &str) -> Result<Self> {
        let t = s.trim();
        match t.to_ascii_lowercase().as_str() {
            "m" | "male" | "男" => Ok(Gender::M),
            "f" | "female" | "女" => Ok(Gender::F),
            "" => Err(SeatingError::InvalidInput("missing gender".to_string())),
            _ => Err(SeatingError::InvalidInput(format!("unknown gender: {}", t))),
        }
    }
}

impl Serialize for Gender {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Gender {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    pub name: String,
    pub gender: Gender,
}

impl Student {
    pub fn new(name: impl Into<String>, gender: Gender) -> Self {
        Self {
            name: name.into(),
            gender,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImportMode {
    /// Discard what is there first.
    #[default]
    Replace,
    /// Keep what is there and add only new names.
    Append,
}

impl FromStr for ImportMode {
    type Err = SeatingError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "replace" => Ok(ImportMode::Replace),
            "append" | "merge" => Ok(ImportMode::Append),
            other => Err(SeatingError::InvalidInput(format!(
                "mode must be replace or append, got {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ImportSummary {
    pub added: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RosterStats {
    pub total: usize,
    pub male: usize,
    pub female: usize,
}

/// Ordered list of students keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RosterStore {
    students: Vec<Student>,
}

impl RosterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.students.len()
    }

    pub fn is_empty(&self) -> bool {
        self.students.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Student> {
        self.students.iter()
    }

    pub fn students(&self) -> &[Student] {
        &self.students
    }

    /// Looks a student up by name, ignoring surrounding whitespace the way
    /// `add` does.
    pub fn get(&self, name: &str) -> Option<&Student> {
        let name = name.trim();
        self.students.iter().find(|s| s.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Adds one student. The name is trimmed before the uniqueness check.
    pub fn add(&mut self, name: &str, gender: Gender) -> Result<&Student> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SeatingError::InvalidInput("missing student name".to_string()));
        }
        if self.contains(name) {
            return Err(SeatingError::DuplicateName(name.to_string()));
        }
        self.students.push(Student::new(name, gender));
        Ok(&self.students[self.students.len() - 1])
    }

    /// Removes the student from the roster only. Seats referencing the name
    /// are cleared by the caller (see `Controller::remove_student`).
    pub fn remove(&mut self, name: &str) -> Result<Student> {
        let name = name.trim();
        let idx = self
            .students
            .iter()
            .position(|s| s.name == name)
            .ok_or_else(|| SeatingError::StudentNotFound(name.to_string()))?;
        Ok(self.students.remove(idx))
    }

    pub fn clear(&mut self) {
        self.students.clear();
    }

    /// Bulk import. Names already on the roster, or repeated earlier in
    /// `rows`, are skipped rather than merged.
    pub fn import_many<I>(&mut self, rows: I, mode: ImportMode) -> ImportSummary
    where
        I: IntoIterator<Item = Student>,
    {
        if mode == ImportMode::Replace {
            self.students.clear();
        }
        let mut seen: HashSet<String> = self.students.iter().map(|s| s.name.clone()).collect();
        let mut summary = ImportSummary::default();
        for student in rows {
            let name = student.name.trim();
            if name.is_empty() || !seen.insert(name.to_string()) {
                summary.skipped += 1;
                continue;
            }
            self.students.push(Student::new(name, student.gender));
            summary.added += 1;
        }
        summary
    }

    pub fn stats(&self) -> RosterStats {
        let male = self.students.iter().filter(|s| s.gender == Gender::M).count();
        RosterStats {
            total: self.students.len(),
            male,
            female: self.students.len() - male,
        }
    }
}

impl FromIterator<Student> for RosterStore {
    fn from_iter<T: IntoIterator<Item = Student>>(iter: T) -> Self {
        let mut roster = RosterStore::new();
        roster.import_many(iter, ImportMode::Append);
        roster
    }
}
