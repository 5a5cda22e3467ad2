//! List-picker capability.
//!
//! The CLI makes two kinds of choice: which discovered TV to connect to, and
//! then (repeatedly) which command to send.  Both go through [`Selector`] so
//! the terminal UI can be swapped for a scripted one in tests.

use std::io;

use thiserror::Error;

/// Outcome of one pick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Zero-based index into the offered items.
    Chosen(usize),
    /// The user quit, or input ended.
    Cancelled,
}

#[derive(Debug, Error)]
pub enum SelectError {
    /// Input that is neither a valid item number nor a quit request.
    #[error("invalid selection: {0:?}")]
    InvalidSelection(String),

    /// The item list was empty.
    #[error("nothing to select from")]
    Empty,

    /// Reading input or drawing the list failed.
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
}

/// Presents `items` and returns the user's choice.
pub trait Selector {
    /// # Errors
    ///
    /// [`SelectError::Empty`] when `items` is empty;
    /// [`SelectError::InvalidSelection`] for unusable input, after which the
    /// caller may simply ask again.
    fn select(&mut self, title: &str, items: &[String]) -> Result<Selection, SelectError>;
}
