pub mod core;
pub mod exchange;
pub mod seating;
pub mod snapshot;
pub mod students;
