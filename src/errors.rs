//! Error Types
//!
//! This module defines the error types used by the stage.
//!
//! # Overview
//!
//! Most choreography operations never fail loudly: the animation scheduler and
//! the camera report rejected requests with a `bool` and leave their state
//! untouched. [`StageError`] covers the remaining failure modes, which all
//! belong to scene loading:
//! - The scene source could not produce content
//! - The loaded content was empty
//! - The background worker could not be started
//!
//! # Usage
//!
//! Fallible APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, StageError>`.
//!
//! ```rust,ignore
//! use stage::errors::{StageError, Result};
//!
//! fn read_scene(uri: &str) -> Result<LoadedScene> {
//!     Err(StageError::SourceNotFound(uri.to_string()))
//! }
//! ```

use thiserror::Error;

/// The main error type for the stage.
#[derive(Error, Debug)]
pub enum StageError {
    // ========================================================================
    // Scene Loading Errors
    // ========================================================================
    /// The requested scene source does not exist.
    #[error("Scene source not found: {0}")]
    SourceNotFound(String),

    /// The source was read but produced no drawable content.
    #[error("Scene is empty: {0}")]
    EmptyScene(String),

    /// The external loader rejected the content.
    #[error("Scene loader error: {0}")]
    Loader(String),

    // ========================================================================
    // I/O Errors
    // ========================================================================
    /// File I/O error raised by a scene source.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    // ========================================================================
    // Threading Errors
    // ========================================================================
    /// The background load worker could not be spawned.
    #[error("Failed to start load worker: {0}")]
    Thread(String),
}

/// Alias for `Result<T, StageError>`.
pub type Result<T> = std::result::Result<T, StageError>;
