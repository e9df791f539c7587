use thiserror::Error;

/// Every recoverable failure a classroom operation can report.
///
/// Seat coordinates are stored zero-based and rendered one-based, the way
/// seats are labelled in the UI (`2-3` is row 2, column 3).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SeatingError {
    /// A required field was missing or blank.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("student already exists: {0}")]
    DuplicateName(String),

    #[error("student not found: {0}")]
    StudentNotFound(String),

    #[error("seat {}-{} is already taken by {occupant}", .row + 1, .col + 1)]
    OccupiedSeat {
        row: usize,
        col: usize,
        occupant: String,
    },

    #[error("seat {}-{} is outside the {rows}x{cols} classroom", .row + 1, .col + 1)]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("invalid classroom dimensions {rows}x{cols}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("{students} students exceed {seats} seats")]
    CapacityExceeded { students: usize, seats: usize },

    /// Only raised when single-seat enforcement is switched on.
    #[error("{name} is already seated at {}-{}", .row + 1, .col + 1)]
    AlreadySeated { name: String, row: usize, col: usize },

    #[error("no students in the roster")]
    EmptyRoster,

    /// A spreadsheet or table could not be turned into students or seats.
    #[error("import failed: {0}")]
    ImportParseFailure(String),

    /// The snapshot store could not be read or written.
    #[error("storage failure: {0}")]
    StorageFailure(String),
}

impl SeatingError {
    /// Stable error code carried in IPC error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            SeatingError::InvalidInput(_) => "invalid_input",
            SeatingError::DuplicateName(_) => "duplicate_name",
            SeatingError::StudentNotFound(_) => "not_found",
            SeatingError::OccupiedSeat { .. } => "occupied_seat",
            SeatingError::OutOfBounds { .. } => "out_of_bounds",
            SeatingError::InvalidDimensions { .. } => "invalid_dimensions",
            SeatingError::CapacityExceeded { .. } => "capacity_exceeded",
            SeatingError::AlreadySeated { .. } => "already_seated",
            SeatingError::EmptyRoster => "empty_roster",
            SeatingError::ImportParseFailure(_) => "import_parse_failed",
            SeatingError::StorageFailure(_) => "storage_failed",
        }
    }
}

pub type Result<T> = std::result::Result<T, SeatingError>;
