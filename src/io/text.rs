//! Reading ASCII noise data files.
//!
//! Each line holds one value (frequency, RMS, sensitivity, ...) in its first
//! column. Tokens are separated by whitespace or commas; anything after the
//! first value is metadata and ignored. Lines without a leading numeric token
//! (blank lines, comments, headers) are skipped.

use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use lazy_static::lazy_static;
use log::trace;
use regex::Regex;

use super::error::IOError;
use crate::mem::{Mem, Precision};

lazy_static! {
    static ref TOKEN_SEPARATOR: Regex = Regex::new(r"[\s,]+").unwrap();
}

/// The minimum number of numeric tokens a line needs to contribute a value.
const MIN_TOKENS: usize = 1;

/// Parse up to `max_values` leading numbers from `line`, stopping at the
/// first token that isn't a number.
///
/// # Examples
///
/// ```rust
/// use sysnoise::io::parse_line;
///
/// assert_eq!(parse_line("100e6, 2.5 # note", 3), vec![100e6, 2.5]);
/// assert!(parse_line("# comment", 3).is_empty());
/// ```
pub fn parse_line(line: &str, max_values: usize) -> Vec<f64> {
    TOKEN_SEPARATOR
        .split(line.trim())
        .filter(|token| !token.is_empty())
        .take(max_values)
        .map_while(|token| token.parse::<f64>().ok())
        .collect()
}

/// Read the values in the first column of the file at `path` into a buffer
/// of the given precision.
///
/// # Errors
///
/// Can raise [`IOError`] if the file can't be opened or read.
pub fn read_noise_values<P: AsRef<Path>>(path: P, precision: Precision) -> Result<Mem, IOError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| IOError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = BufReader::new(file);
    let mut buf = vec![];
    let mut values = vec![];
    for line_num in 1.. {
        buf.clear();
        let num_bytes = reader
            .read_until(b'\n', &mut buf)
            .map_err(|source| IOError::Read {
                path: path.to_path_buf(),
                line_num,
                source,
            })?;
        if num_bytes == 0 {
            break;
        }
        // comments may hold non-UTF-8 bytes
        let line = String::from_utf8_lossy(&buf);
        let parsed = parse_line(&line, MIN_TOKENS);
        if parsed.len() < MIN_TOKENS {
            trace!("{}:{} skipped", path.display(), line_num);
            continue;
        }
        values.push(parsed[0]);
    }
    trace!("read {} values from {}", values.len(), path.display());

    Ok(Mem::from_f64s(precision, &values))
}
