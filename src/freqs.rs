//! Resolving the frequencies at which system noise is defined.

use std::path::Path;

use log::debug;

use crate::{
    conversions::linear_fill,
    error::NoiseError,
    files::NoiseFileRole,
    io::load_existing,
    mem::Mem,
    settings::{FreqSpecification, Settings},
};

/// Fill `freqs` with the noise frequencies [Hz] described by `settings`.
///
/// `telescope_file` is the frequency file located in the telescope model, if
/// any; it's only consulted for [`FreqSpecification::TelescopeModel`]. The
/// buffer keeps its precision. On error its contents are unspecified.
///
/// # Errors
///
/// - [`NoiseError::FileIO`] if the selected frequency file doesn't exist.
/// - [`NoiseError::SettingsInterferometerNoise`] if a data file is selected
///   but not named.
/// - [`NoiseError::BadDataType`] if `freqs` is complex.
/// - A wrapped [`crate::io::error::IOError`] if the file can't be read.
pub fn load_noise_freqs(
    settings: &Settings,
    freqs: &mut Mem,
    telescope_file: Option<&Path>,
) -> Result<(), NoiseError> {
    const FUNCTION: &str = "load_noise_freqs";
    let precision = freqs.precision().ok_or_else(|| NoiseError::BadDataType {
        element_type: freqs.element_type(),
        function: FUNCTION.into(),
    })?;
    let freq = &settings.interferometer.noise.freq;
    debug!("noise frequencies from {}", freq.specification);

    match freq.specification {
        FreqSpecification::TelescopeModel => {
            let default_path;
            let path = match telescope_file {
                Some(path) => path,
                None => {
                    default_path = settings
                        .telescope
                        .input_directory
                        .join(NoiseFileRole::Frequency.filename());
                    default_path.as_path()
                }
            };
            *freqs = load_existing(path, precision, FUNCTION)?;
        }
        FreqSpecification::DataFile => {
            let path = freq.file.as_deref().ok_or_else(|| {
                NoiseError::SettingsInterferometerNoise(
                    "noise frequency data file not specified".into(),
                )
            })?;
            *freqs = load_existing(path, precision, FUNCTION)?;
        }
        FreqSpecification::ObservationSettings => {
            let obs = &settings.observation;
            linear_fill(
                freqs,
                obs.num_channels,
                obs.start_frequency_hz,
                obs.frequency_inc_hz,
            )?;
        }
        FreqSpecification::Range => {
            linear_fill(freqs, freq.number, freq.start, freq.inc)?;
        }
    }
    debug!("resolved {} noise frequencies", freqs.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;
    use crate::mem::Precision;

    #[test]
    fn test_freqs_from_telescope_file() {
        let tmp_dir = tempdir().unwrap();
        let path = tmp_dir.path().join("noise_frequencies.txt");
        fs::write(&path, "100e6\n200e6\n").unwrap();

        let settings = Settings::default();
        let mut freqs = Mem::with_precision(Precision::Double, 0);
        load_noise_freqs(&settings, &mut freqs, Some(&path)).unwrap();
        assert_eq!(freqs, Mem::Double(vec![100e6, 200e6]));
    }

    #[test]
    fn test_freqs_missing_telescope_file() {
        let tmp_dir = tempdir().unwrap();
        let mut settings = Settings::default();
        settings.telescope.input_directory = tmp_dir.path().to_path_buf();
        let mut freqs = Mem::with_precision(Precision::Double, 0);
        assert!(matches!(
            load_noise_freqs(&settings, &mut freqs, None),
            Err(NoiseError::FileIO { .. })
        ));
    }

    #[test]
    fn test_freqs_from_data_file() {
        let tmp_dir = tempdir().unwrap();
        let path = tmp_dir.path().join("my_freqs.csv");
        fs::write(&path, "150e6, first\n160e6, second\n170e6\n").unwrap();

        let mut settings = Settings::default();
        settings.interferometer.noise.freq.specification = FreqSpecification::DataFile;
        settings.interferometer.noise.freq.file = Some(path);
        let mut freqs = Mem::with_precision(Precision::Single, 0);
        load_noise_freqs(&settings, &mut freqs, None).unwrap();
        assert_eq!(freqs, Mem::Single(vec![150e6, 160e6, 170e6]));

        settings.interferometer.noise.freq.file = Some(tmp_dir.path().join("nope.txt"));
        assert!(matches!(
            load_noise_freqs(&settings, &mut freqs, None),
            Err(NoiseError::FileIO { .. })
        ));
    }

    #[test]
    fn test_freqs_from_observation() {
        let mut settings = Settings::default();
        settings.interferometer.noise.freq.specification = FreqSpecification::ObservationSettings;
        settings.observation.num_channels = 3;
        settings.observation.start_frequency_hz = 100e6;
        settings.observation.frequency_inc_hz = 1e6;
        let mut freqs = Mem::with_precision(Precision::Double, 0);
        load_noise_freqs(&settings, &mut freqs, None).unwrap();
        assert_eq!(freqs, Mem::Double(vec![100e6, 101e6, 102e6]));
    }

    #[test]
    fn test_freqs_from_range() {
        let mut settings = Settings::default();
        let freq = &mut settings.interferometer.noise.freq;
        freq.specification = FreqSpecification::Range;
        freq.number = 2;
        freq.start = 50e6;
        freq.inc = 25e6;
        let mut freqs = Mem::with_precision(Precision::Double, 5);
        load_noise_freqs(&settings, &mut freqs, None).unwrap();
        assert_eq!(freqs, Mem::Double(vec![50e6, 75e6]));
    }
}
