//! Errors that can occur in the io module

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
/// All the errors that can occur in file io operations
pub enum IOError {
    /// Error when opening a noise data file.
    #[error("Couldn't open {}: {source}", .path.display())]
    Open {
        /// The path of the file
        path: PathBuf,
        /// The underlying [`std::io::Error`]
        source: std::io::Error,
    },

    /// Error when listing a telescope model directory.
    #[error("Couldn't list directory {}: {source}", .path.display())]
    ReadDir {
        /// The path of the directory
        path: PathBuf,
        /// The underlying [`std::io::Error`]
        source: std::io::Error,
    },

    /// Error when reading a line of a noise data file.
    #[error("{}:{line_num}: couldn't read line: {source}", .path.display())]
    Read {
        /// The path of the file
        path: PathBuf,
        /// The (1-based) line number where the error occurred
        line_num: usize,
        /// The underlying [`std::io::Error`]
        source: std::io::Error,
    },
}
