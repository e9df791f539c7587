pub mod config;
pub mod controller;
pub mod db;
pub mod error;
pub mod grid;
pub mod ipc;
pub mod roster;
pub mod snapshot;
pub mod store;
pub mod table;
pub mod xlsx;

pub use controller::{ClassroomState, Controller, ControllerOptions};
pub use error::SeatingError;
