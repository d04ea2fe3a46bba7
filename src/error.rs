//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for the
//! `multiedit` engine. It uses the `thiserror` library to create a
//! comprehensive `Error` enum that covers all anticipated failure modes,
//! providing clear and descriptive error messages.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors that can
//!   occur within the engine. Each variant corresponds to a specific type of
//!   error and includes contextual information to aid in debugging.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`, used
//!   throughout the library to simplify function signatures.
//!
//! The `Error` enum covers:
//!
//! - Record ingestion and field-path errors.
//! - Validation errors (missing required fields before a create).
//! - Invalid edit-session transitions.
//! - Attempts to mutate a session while a submit is in flight.
//! - Update-planning errors (including the guard against persisting the
//!   differs marker).
//! - Store collaborator failures.
//! - I/O and JSON parsing errors, wrapped from their source crates.

use thiserror::Error;

/// Main error type for multiedit operations
#[derive(Error, Debug)]
pub enum Error {
    /// A record could not be built from or converted to JSON, or a field
    /// path could not be navigated.
    #[error("Record error: {message}")]
    Record { message: String },

    /// A required field is missing (or still marked as differing) at the
    /// point of a create submit.
    ///
    /// Validation runs before any collaborator is invoked; when this error
    /// is returned no session state has changed.
    #[error("Validation error: required field '{field}' is missing")]
    Validation { field: String },

    /// An edit-session transition was requested that is not legal in the
    /// session's current state.
    #[error("Session error: {message}")]
    Session { message: String },

    /// The session refused an operation because another one is in flight.
    ///
    /// Submits set a busy flag for their duration; overlapping
    /// confirmation-gated transitions are refused rather than interleaved.
    #[error("Session busy: cannot {operation} while another operation is in flight")]
    Busy { operation: String },

    /// An error occurred while planning per-record updates.
    #[error("Update planning error: {message}")]
    Plan { message: String },

    /// A store collaborator (create/update/delete) failed.
    #[error("Store operation error: {operation} - {message}")]
    Store { operation: String, message: String },

    /// An error for a feature that a resource schema does not provide.
    #[error("Feature not implemented: {feature}")]
    NotImplemented { feature: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON parsing or serialization error, wrapped from `serde_json::Error`.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
