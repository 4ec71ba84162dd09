//! Errors that can occur while building station noise models.

use std::path::PathBuf;

use thiserror::Error;

use crate::{io::error::IOError, mem::ElementType, settings::SettingsError};

#[derive(Error, Debug)]
/// All the errors that can occur while loading and converting noise data.
pub enum NoiseError {
    /// A required input to an entry point was missing.
    #[error("invalid argument {argument} supplied to {function}: {reason}")]
    InvalidArgument {
        /// The argument name within the function
        argument: String,
        /// The function name
        function: String,
        /// Why the argument was rejected
        reason: String,
    },

    /// A required file or directory is missing.
    #[error("{function}: required path {} does not exist", .path.display())]
    FileIO {
        /// The path that could not be found
        path: PathBuf,
        /// The function name
        function: String,
    },

    /// The telescope model is not resident in host memory.
    #[error("{function}: telescope model must be in CPU memory, found {location}")]
    BadLocation {
        /// The location that was found instead
        location: String,
        /// The function name
        function: String,
    },

    /// Buffers of different precision were mixed in a conversion.
    #[error("type mismatch for argument {argument} of function {function}. expected {expected}, received {received}")]
    TypeMismatch {
        /// The argument name within the function
        argument: String,
        /// The function name
        function: String,
        /// The expected element type
        expected: ElementType,
        /// The element type that was received instead
        received: ElementType,
    },

    /// An array length disagrees with the number of noise frequencies.
    #[error("bad array length supplied to argument {argument} of function {function}. expected {expected}, received {received}")]
    DimensionMismatch {
        /// The argument name within the function
        argument: String,
        /// The function name
        function: String,
        /// The expected length
        expected: usize,
        /// The length that was received instead
        received: usize,
    },

    /// A numeric kernel was handed an element type it can't process.
    #[error("{function}: unsupported element type {element_type}, expected a real float")]
    BadDataType {
        /// The unsupported element type
        element_type: ElementType,
        /// The function name
        function: String,
    },

    /// The interferometer noise settings are malformed or insufficient.
    #[error("invalid interferometer noise settings: {0}")]
    SettingsInterferometerNoise(String),

    /// No usable noise data could be assembled for a station.
    #[error("telescope setup failed: {0}")]
    SetupFailTelescope(String),

    /// Growing a station array or a buffer failed.
    #[error("memory allocation failure while growing {what} to {len} elements")]
    MemoryAllocFailure {
        /// A description of what was being allocated
        what: String,
        /// The requested number of elements
        len: usize,
    },

    #[error(transparent)]
    /// Error derived from [`IOError`]
    IOError(#[from] IOError),
}

#[derive(Error, Debug)]
/// Errors relating to CLI args
pub enum CLIError {
    #[error("Invalid command line argument for option {option}. expected {expected}, received {received}")]
    /// Error for invalid command line arguments
    InvalidCommandLineArgument {
        /// The option for which the error occurred
        option: String,
        /// The value that was expected
        expected: String,
        /// The unexpected value that was received
        received: String,
    },
}

#[derive(Error, Debug)]
/// Top-level errors for the `sysnoise` application
pub enum SysnoiseError {
    #[error(transparent)]
    /// Error derived from [`NoiseError`]
    NoiseError(#[from] NoiseError),

    #[error(transparent)]
    /// Error derived from [`SettingsError`]
    SettingsError(#[from] SettingsError),

    #[error(transparent)]
    /// Error derived from [`CLIError`]
    CLIError(#[from] CLIError),

    #[cfg(feature = "cli")]
    #[error(transparent)]
    /// Error derived from [`clap::Error`]
    ClapError(#[from] clap::Error),

    #[error("Dry run")]
    /// Dry run, no files were loaded
    DryRun {},
}
