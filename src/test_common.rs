//! Fixtures shared by unit tests.

use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::settings::Settings;

/// Write `values`, one per line, to `dir/filename`.
pub fn write_values<P: AsRef<Path>>(dir: P, filename: &str, values: &[f64]) -> PathBuf {
    let path = dir.as_ref().join(filename);
    let contents: String = values.iter().map(|v| format!("{v:e}\n")).collect();
    fs::write(&path, contents).unwrap();
    path
}

/// Create the subdirectory `name` of `dir`.
pub fn make_dir<P: AsRef<Path>>(dir: P, name: &str) -> PathBuf {
    let path = dir.as_ref().join(name);
    fs::create_dir_all(&path).unwrap();
    path
}

/// Settings with noise enabled, 1 MHz channels and 1 s integrations, reading
/// everything from the telescope model at `dir`.
pub fn noise_settings<P: AsRef<Path>>(dir: P) -> Settings {
    let mut settings = Settings::default();
    settings.telescope.input_directory = dir.as_ref().to_path_buf();
    settings.interferometer.channel_bandwidth_hz = 1e6;
    settings.observation.length_seconds = 10.0;
    settings.observation.num_time_steps = 10;
    settings.interferometer.noise.enable = true;
    settings
}

/// `1 / sqrt(2 B T)` for [`noise_settings`].
pub const RADIOMETER_FACTOR: f64 = 7.071_067_811_865_475e-4;
