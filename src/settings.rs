//! Settings consumed while loading system noise.
//!
//! Settings may be built in code (see [`SettingsBuilder`]) or read from a
//! TOML or JSON file with [`Settings::from_file`]. Every section and field is
//! optional in a file; missing values take their defaults.
//!
//! ```toml
//! [simulation]
//! double_precision = true
//!
//! [telescope]
//! input_directory = "telescope.tm"
//!
//! [observation]
//! length_seconds = 10.0
//! num_time_steps = 10
//!
//! [interferometer]
//! channel_bandwidth_hz = 1e6
//!
//! [interferometer.noise]
//! enable = true
//!
//! [interferometer.noise.values]
//! specification = "sensitivity"
//! sensitivity = { override = "range", start = 100.0, end = 200.0 }
//! ```

use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    str::FromStr,
};

use derive_builder::Builder;
use lazy_static::lazy_static;
use log::debug;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::{error::NoiseError, mem::Precision};

lazy_static! {
    static ref SETTINGS_FILE_TYPES_COMMA_SEPARATED: String =
        itertools::Itertools::join(&mut SettingsFileType::iter(), ", ");
}

#[derive(Debug, Display, EnumIter, EnumString)]
enum SettingsFileType {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

#[derive(Error, Debug)]
/// Errors that can occur while reading a settings file
pub enum SettingsError {
    #[error("Settings file '{}' doesn't have a recognised file extension! Valid extensions are: {}", .path.display(), *SETTINGS_FILE_TYPES_COMMA_SEPARATED)]
    /// The file extension isn't a supported format
    UnknownFileType {
        /// The settings file path
        path: PathBuf,
    },

    #[error("Couldn't decode toml structure from {}:\n{err}", .path.display())]
    /// The file isn't valid TOML
    Toml {
        /// The settings file path
        path: PathBuf,
        /// The decode error
        err: toml::de::Error,
    },

    #[error("Couldn't decode json structure from {}:\n{err}", .path.display())]
    /// The file isn't valid JSON
    Json {
        /// The settings file path
        path: PathBuf,
        /// The decode error
        err: serde_json::Error,
    },

    #[error("Couldn't read settings file {}: {err}", .path.display())]
    /// The file couldn't be read
    Io {
        /// The settings file path
        path: PathBuf,
        /// The underlying [`std::io::Error`]
        err: std::io::Error,
    },
}

/// How the list of noise frequencies is specified.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum FreqSpecification {
    /// Load from `noise_frequencies.txt` in the telescope model
    #[default]
    TelescopeModel,
    /// Generate from the observation's channel grid
    ObservationSettings,
    /// Load from a separately specified data file
    DataFile,
    /// Generate from an explicit start, increment and count
    Range,
}

/// How noise values are specified.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ValueSpecification {
    /// Use the first of RMS, sensitivity, or (t_sys, area, efficiency) found
    /// in the telescope model
    #[default]
    TelescopeModelPriority,
    /// RMS flux density
    Rms,
    /// Station sensitivity
    Sensitivity,
    /// System temperature, effective area and system efficiency
    SystemTemperature,
}

/// Where the values of a single noise quantity come from.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum OverrideMode {
    /// Use the file found in the telescope model
    #[default]
    NoOverride,
    /// Use the named data file
    DataFile,
    /// Evaluate a range between `start` and `end`
    Range,
}

/// The override specification for one noise quantity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuantitySettings {
    /// Where the values come from
    #[serde(rename = "override")]
    pub override_mode: OverrideMode,
    /// The data file, for [`OverrideMode::DataFile`]
    pub file: Option<PathBuf>,
    /// Range start, for [`OverrideMode::Range`]
    pub start: f64,
    /// Range end (never reached), for [`OverrideMode::Range`]
    pub end: f64,
}

impl QuantitySettings {
    /// Values loaded from the named data file.
    pub fn data_file<P: Into<PathBuf>>(file: P) -> Self {
        Self {
            override_mode: OverrideMode::DataFile,
            file: Some(file.into()),
            ..Self::default()
        }
    }

    /// Values evaluated over a range.
    pub fn range(start: f64, end: f64) -> Self {
        Self {
            override_mode: OverrideMode::Range,
            start,
            end,
            ..Self::default()
        }
    }
}

/// Noise frequency settings (`interferometer.noise.freq`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreqSettings {
    /// How the frequencies are specified
    pub specification: FreqSpecification,
    /// The data file, for [`FreqSpecification::DataFile`]
    pub file: Option<PathBuf>,
    /// The number of frequencies, for [`FreqSpecification::Range`]
    pub number: usize,
    /// The start frequency [Hz], for [`FreqSpecification::Range`]
    pub start: f64,
    /// The frequency increment [Hz], for [`FreqSpecification::Range`]
    pub inc: f64,
}

impl Default for FreqSettings {
    fn default() -> Self {
        Self {
            specification: FreqSpecification::default(),
            file: None,
            number: 1,
            start: 0.0,
            inc: 0.0,
        }
    }
}

/// Noise value settings (`interferometer.noise.values`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseValueSettings {
    /// How the values are specified
    pub specification: ValueSpecification,
    /// RMS flux density [Jy]
    pub rms: QuantitySettings,
    /// Sensitivity [Jy]
    pub sensitivity: QuantitySettings,
    /// System temperature [K]
    pub t_sys: QuantitySettings,
    /// Effective area [m^2]
    pub area: QuantitySettings,
    /// System efficiency, in the range 0 to 1
    pub efficiency: QuantitySettings,
}

/// System noise settings (`interferometer.noise`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NoiseSettings {
    /// Whether noise is enabled at all
    pub enable: bool,
    /// Random number generator seed for the noise-addition stage
    pub seed: u64,
    /// Frequency settings
    pub freq: FreqSettings,
    /// Value settings
    pub values: NoiseValueSettings,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            enable: false,
            seed: 1,
            freq: FreqSettings::default(),
            values: NoiseValueSettings::default(),
        }
    }
}

/// Observation settings (`observation`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservationSettings {
    /// The number of frequency channels
    pub num_channels: usize,
    /// The frequency of the first channel [Hz]
    pub start_frequency_hz: f64,
    /// The channel separation [Hz]
    pub frequency_inc_hz: f64,
    /// The total observation length [s]
    pub length_seconds: f64,
    /// The number of correlator dumps
    pub num_time_steps: usize,
}

impl Default for ObservationSettings {
    fn default() -> Self {
        Self {
            num_channels: 1,
            start_frequency_hz: 0.0,
            frequency_inc_hz: 0.0,
            length_seconds: 0.0,
            num_time_steps: 1,
        }
    }
}

impl ObservationSettings {
    /// The correlator integration time [s]. Zero time steps gives a
    /// non-finite value.
    pub fn integration_time(&self) -> f64 {
        self.length_seconds / self.num_time_steps as f64
    }
}

/// Interferometer settings (`interferometer`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterferometerSettings {
    /// The channel bandwidth [Hz]
    pub channel_bandwidth_hz: f64,
    /// System noise settings
    pub noise: NoiseSettings,
}

/// Simulation settings (`simulation`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Whether to use double precision buffers
    pub double_precision: bool,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            double_precision: true,
        }
    }
}

/// Telescope model settings (`telescope`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelescopeSettings {
    /// The telescope model directory
    pub input_directory: PathBuf,
}

/// The settings snapshot read while loading system noise.
#[derive(Builder, Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[builder(default)]
#[serde(default)]
pub struct Settings {
    /// Simulation settings
    pub simulation: SimulationSettings,
    /// Telescope model settings
    pub telescope: TelescopeSettings,
    /// Observation settings
    pub observation: ObservationSettings,
    /// Interferometer settings
    pub interferometer: InterferometerSettings,
}

fn invalid<T: ToString>(msg: T) -> NoiseError {
    NoiseError::SettingsInterferometerNoise(msg.to_string())
}

impl Settings {
    /// Read settings from a `.toml` or `.json` file.
    ///
    /// # Errors
    ///
    /// Can raise [`SettingsError`] if the file can't be read or decoded, or
    /// has an unrecognised extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        debug!("Attempting to parse settings file {}", path.display());

        let file_type = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| SettingsFileType::from_str(&e).ok())
            .ok_or_else(|| SettingsError::UnknownFileType {
                path: path.to_path_buf(),
            })?;

        let mut contents = String::new();
        File::open(path)
            .and_then(|mut fh| fh.read_to_string(&mut contents))
            .map_err(|err| SettingsError::Io {
                path: path.to_path_buf(),
                err,
            })?;

        match file_type {
            SettingsFileType::Toml => {
                debug!("Parsing toml file...");
                toml::from_str(&contents).map_err(|err| SettingsError::Toml {
                    path: path.to_path_buf(),
                    err,
                })
            }
            SettingsFileType::Json => {
                debug!("Parsing json file...");
                serde_json::from_str(&contents).map_err(|err| SettingsError::Json {
                    path: path.to_path_buf(),
                    err,
                })
            }
        }
    }

    /// The precision of noise buffers.
    pub fn precision(&self) -> Precision {
        Precision::from_double_flag(self.simulation.double_precision)
    }

    /// The correlator integration time [s].
    pub fn integration_time(&self) -> f64 {
        self.observation.integration_time()
    }

    /// Check that the noise settings are usable. Nothing is checked when noise
    /// is disabled.
    ///
    /// # Errors
    ///
    /// Can raise [`NoiseError::SettingsInterferometerNoise`] describing the
    /// first problem found.
    pub fn validate(&self) -> Result<(), NoiseError> {
        let noise = &self.interferometer.noise;
        if !noise.enable {
            return Ok(());
        }

        check_bandwidth_and_time(
            self.interferometer.channel_bandwidth_hz,
            self.integration_time(),
        )?;

        match noise.freq.specification {
            FreqSpecification::DataFile if noise.freq.file.is_none() => {
                return Err(invalid("noise frequency data file not specified"));
            }
            FreqSpecification::Range if noise.freq.number == 0 => {
                return Err(invalid("number of noise frequencies must be positive"));
            }
            _ => (),
        }

        let values = &noise.values;
        let active: &[(&str, &QuantitySettings)] = match values.specification {
            ValueSpecification::TelescopeModelPriority => &[],
            ValueSpecification::Rms => &[("rms", &values.rms)],
            ValueSpecification::Sensitivity => &[("sensitivity", &values.sensitivity)],
            ValueSpecification::SystemTemperature => &[
                ("t_sys", &values.t_sys),
                ("area", &values.area),
                ("efficiency", &values.efficiency),
            ],
        };
        for (name, quantity) in active {
            if quantity.override_mode == OverrideMode::DataFile && quantity.file.is_none() {
                return Err(invalid(format!("{name} data file not specified")));
            }
        }

        if values.specification == ValueSpecification::SystemTemperature
            && values.efficiency.override_mode == OverrideMode::Range
        {
            let eff = &values.efficiency;
            for bound in [eff.start, eff.end] {
                if !(0.0..=1.0).contains(&bound) {
                    return Err(invalid(format!(
                        "efficiency range bounds must be within [0, 1], got {} to {}",
                        eff.start, eff.end
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Require a positive channel bandwidth and integration time.
///
/// # Errors
///
/// Can raise [`NoiseError::SettingsInterferometerNoise`].
pub fn check_bandwidth_and_time(bandwidth: f64, integration_time: f64) -> Result<(), NoiseError> {
    // also rejects NaN and infinite integration times (zero time steps)
    if !(bandwidth >= f64::MIN_POSITIVE) || !bandwidth.is_finite() {
        return Err(invalid(format!(
            "channel bandwidth must be positive, got {bandwidth} Hz"
        )));
    }
    if !(integration_time >= f64::MIN_POSITIVE) || !integration_time.is_finite() {
        return Err(invalid(format!(
            "integration time must be positive, got {integration_time} s"
        )));
    }
    Ok(())
}
