//! Input data file format modules

use std::path::Path;

use crate::{
    error::NoiseError,
    mem::{Mem, Precision},
};

pub mod error;
pub mod text;

pub use text::{parse_line, read_noise_values};

/// Read a noise data file that must exist.
///
/// # Errors
///
/// [`NoiseError::FileIO`] if `path` doesn't exist, or a wrapped
/// [`error::IOError`] if it can't be read.
pub(crate) fn load_existing(
    path: &Path,
    precision: Precision,
    function: &str,
) -> Result<Mem, NoiseError> {
    if !path.exists() {
        return Err(NoiseError::FileIO {
            path: path.to_path_buf(),
            function: function.into(),
        });
    }
    Ok(read_noise_values(path, precision)?)
}
