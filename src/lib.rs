#![warn(missing_docs)]
#![warn(clippy::missing_safety_doc)]
#![warn(clippy::missing_errors_doc)]

//! Sysnoise builds the per-station system noise model used when simulating
//! radio interferometer visibilities.
//!
//! Station calibration data lives in a telescope model directory as plain
//! text files: the noise frequencies, and one of the RMS flux density, the
//! station sensitivity, or the system temperature with effective area and
//! system efficiency. Sysnoise walks the station directories, picks whichever
//! data is available (or whatever the settings override it with), and
//! converts it to RMS noise in Jy at each frequency.
//!
//! # Examples
//!
//! Load noise for a telescope model with telescope-wide sensitivity and one
//! station that provides its own RMS values.
//!
//! ```rust
//! use std::fs;
//! use sysnoise::{load_telescope_noise, Precision, Settings, TelescopeModel};
//! use tempfile::tempdir;
//!
//! // a telescope model with two stations
//! let tm = tempdir().unwrap();
//! fs::write(tm.path().join("noise_frequencies.txt"), "100e6\n150e6\n").unwrap();
//! fs::write(tm.path().join("sensitivity.txt"), "2000\n1000\n").unwrap();
//! fs::create_dir(tm.path().join("station000")).unwrap();
//! fs::create_dir(tm.path().join("station001")).unwrap();
//! fs::write(tm.path().join("station001").join("rms.txt"), "3.0\n2.0\n").unwrap();
//!
//! let mut settings = Settings::default();
//! settings.telescope.input_directory = tm.path().to_path_buf();
//! settings.interferometer.channel_bandwidth_hz = 1e6;
//! settings.observation.length_seconds = 2.0;
//! settings.observation.num_time_steps = 1;
//! settings.interferometer.noise.enable = true;
//!
//! let mut telescope = TelescopeModel::new(Precision::Double);
//! load_telescope_noise(&mut telescope, &settings).unwrap();
//!
//! // sensitivity / sqrt(2 * bandwidth * integration time)
//! let rms = telescope.stations()[0].noise.rms.to_f64_vec().unwrap();
//! assert!((rms[0] - 1.0).abs() < 1e-9);
//! assert!((rms[1] - 0.5).abs() < 1e-9);
//!
//! let rms = telescope.stations()[1].noise.rms.to_f64_vec().unwrap();
//! assert_eq!(rms, vec![3.0, 2.0]);
//! ```

pub mod constants;
pub mod conversions;
pub mod error;
pub mod files;
pub mod freqs;
pub mod io;
pub mod load;
pub mod mem;
pub mod rms;
pub mod settings;
pub mod station;

#[cfg(feature = "cli")]
pub mod cli;

#[cfg(test)]
pub(crate) mod test_common;

pub use error::{NoiseError, SysnoiseError};
pub use files::{NoiseFileRole, NoiseFiles};
pub use load::load_telescope_noise;
pub use mem::{ElementType, Location, Mem, Precision};
pub use settings::{Settings, SettingsBuilder};
pub use station::{NoiseModel, StationModel, TelescopeModel};
