//! Loading system noise for every station of a telescope model.
//!
//! A telescope model directory holds one subdirectory per station, in
//! lexicographic order. Noise data files may sit at the telescope level, where
//! they apply to every station, or inside a station directory, where they
//! replace the telescope-level file of the same kind.
//!
//! ```text
//! telescope.tm/
//! ├── noise_frequencies.txt
//! ├── sensitivity.txt
//! ├── station000/
//! │   └── rms.txt
//! └── station001/
//! ```

use std::path::{Path, PathBuf};

use itertools::izip;
use log::{debug, error, info, trace, warn};

use crate::{
    constants::MAX_NOISE_DEPTH,
    error::NoiseError,
    files::{NoiseFileRole, NoiseFiles},
    freqs::load_noise_freqs,
    io::error::IOError,
    mem::{Location, Precision},
    rms::load_noise_rms,
    settings::Settings,
    station::{new_stations, StationModel, TelescopeModel},
};

/// The immediate subdirectories of `dir`, sorted by name.
fn sorted_subdirs(dir: &Path) -> Result<Vec<PathBuf>, NoiseError> {
    let read_dir_err = |source| IOError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };
    let mut subdirs = vec![];
    for entry in dir.read_dir().map_err(read_dir_err)? {
        let path = entry.map_err(read_dir_err)?.path();
        if path.is_dir() {
            subdirs.push(path);
        }
    }
    subdirs.sort_unstable_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(subdirs)
}

/// Load system noise into every station of `telescope` from the telescope
/// model directory and overrides in `settings`.
///
/// Does nothing if noise is disabled. Stations are allocated from the station
/// directories unless a previous loader already created them. Every top-level
/// station receives the same frequencies; each leaf station then receives its
/// RMS values (see [`load_noise_rms`]).
///
/// Stations processed before an error keep their results.
///
/// # Examples
///
/// ```rust
/// use std::fs;
/// use sysnoise::{load_telescope_noise, Precision, Settings, TelescopeModel};
/// use tempfile::tempdir;
///
/// let tm = tempdir().unwrap();
/// fs::write(tm.path().join("noise_frequencies.txt"), "100e6\n200e6\n").unwrap();
/// fs::write(tm.path().join("rms.txt"), "1.0\n1.5\n").unwrap();
/// fs::create_dir(tm.path().join("station000")).unwrap();
///
/// let mut settings = Settings::default();
/// settings.telescope.input_directory = tm.path().to_path_buf();
/// settings.interferometer.channel_bandwidth_hz = 1e6;
/// settings.observation.length_seconds = 1.0;
/// settings.interferometer.noise.enable = true;
///
/// let mut telescope = TelescopeModel::new(Precision::Double);
/// load_telescope_noise(&mut telescope, &settings).unwrap();
/// let noise = &telescope.stations()[0].noise;
/// assert_eq!(noise.rms.to_f64_vec().unwrap(), vec![1.0, 1.5]);
/// ```
///
/// # Errors
///
/// - [`NoiseError::InvalidArgument`] if no telescope model directory is set.
/// - [`NoiseError::FileIO`] if the telescope model directory doesn't exist.
/// - [`NoiseError::BadLocation`] if the model isn't in host memory.
/// - [`NoiseError::TypeMismatch`] if the model's precision differs from
///   `simulation.double_precision`.
/// - [`NoiseError::SettingsInterferometerNoise`] if the noise settings are
///   invalid.
/// - [`NoiseError::DimensionMismatch`] if fewer stations were allocated than
///   there are station directories.
/// - Any error from [`load_noise_freqs`] or [`load_noise_rms`].
pub fn load_telescope_noise(
    telescope: &mut TelescopeModel,
    settings: &Settings,
) -> Result<(), NoiseError> {
    const FUNCTION: &str = "load_telescope_noise";
    if !settings.interferometer.noise.enable {
        debug!("system noise disabled");
        return Ok(());
    }

    let dir = settings.telescope.input_directory.as_path();
    if dir.as_os_str().is_empty() {
        return Err(NoiseError::InvalidArgument {
            argument: "settings.telescope.input_directory".into(),
            function: FUNCTION.into(),
            reason: "no telescope model directory given".into(),
        });
    }
    if !dir.is_dir() {
        return Err(NoiseError::FileIO {
            path: dir.to_path_buf(),
            function: FUNCTION.into(),
        });
    }
    if telescope.location != Location::Cpu {
        return Err(NoiseError::BadLocation {
            location: telescope.location.to_string(),
            function: FUNCTION.into(),
        });
    }
    if telescope.precision != settings.precision() {
        return Err(NoiseError::TypeMismatch {
            argument: "telescope.precision".into(),
            function: FUNCTION.into(),
            expected: settings.precision().element_type(),
            received: telescope.precision.element_type(),
        });
    }

    let result = settings.validate().and_then(|_| {
        let mut files = NoiseFiles::new();
        load_telescope_dir(telescope, settings, dir, &mut files)
    });
    match &result {
        Ok(()) => info!(
            "loaded system noise for {} stations from {}",
            telescope.num_stations(),
            dir.display()
        ),
        Err(err) => error!("Loading noise files ({}) failed: {err}", dir.display()),
    }
    result
}

fn load_telescope_dir(
    telescope: &mut TelescopeModel,
    settings: &Settings,
    dir: &Path,
    files: &mut NoiseFiles,
) -> Result<(), NoiseError> {
    trace!("visiting telescope directory {}", dir.display());
    files.update(dir);
    let subdirs = sorted_subdirs(dir)?;
    let precision = telescope.precision;

    let stations = match telescope.stations {
        Some(ref mut stations) => stations,
        None => telescope
            .stations
            .insert(new_stations(precision, subdirs.len())?),
    };
    if stations.len() < subdirs.len() {
        return Err(NoiseError::DimensionMismatch {
            argument: "telescope.stations".into(),
            function: "load_telescope_noise".into(),
            expected: subdirs.len(),
            received: stations.len(),
        });
    }

    if let Some((first, others)) = stations.split_first_mut() {
        load_noise_freqs(
            settings,
            &mut first.noise.frequency,
            files.get(NoiseFileRole::Frequency),
        )?;
        for station in others {
            station.noise.frequency.copy_from(&first.noise.frequency)?;
        }
    }

    for (station, subdir) in izip!(stations.iter_mut(), &subdirs) {
        load_station_dir(station, settings, precision, subdir, 1, files)?;
    }
    Ok(())
}

fn load_station_dir(
    station: &mut StationModel,
    settings: &Settings,
    precision: Precision,
    dir: &Path,
    depth: usize,
    files: &mut NoiseFiles,
) -> Result<(), NoiseError> {
    if depth > MAX_NOISE_DEPTH {
        return Ok(());
    }
    trace!("visiting station directory {} (depth {depth})", dir.display());
    if dir.join(NoiseFileRole::Frequency.filename()).is_file() {
        warn!(
            "ignoring station frequency file in {}; all stations use the telescope frequencies",
            dir.display()
        );
    }
    files.update(dir);
    let subdirs = sorted_subdirs(dir)?;

    if subdirs.is_empty() {
        return load_noise_rms(settings, &mut station.noise, files);
    }

    let children = match station.children {
        Some(ref mut children) => children,
        None => station
            .children
            .insert(new_stations(precision, subdirs.len())?),
    };
    for (child, subdir) in izip!(children.iter_mut(), &subdirs) {
        load_station_dir(child, settings, precision, subdir, depth + 1, files)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;
    use crate::{
        mem::{ElementType, Mem},
        settings::FreqSpecification,
        test_common::{make_dir, noise_settings, write_values},
    };

    #[test]
    fn test_disabled_does_nothing() {
        let tmp_dir = tempdir().unwrap();
        let mut settings = noise_settings(tmp_dir.path().join("nonexistent"));
        settings.interferometer.noise.enable = false;
        let mut telescope = TelescopeModel::new(Precision::Double);
        load_telescope_noise(&mut telescope, &settings).unwrap();
        assert!(telescope.stations.is_none());
    }

    #[test]
    fn test_missing_directory() {
        let tmp_dir = tempdir().unwrap();
        let settings = noise_settings(tmp_dir.path().join("nonexistent"));
        let mut telescope = TelescopeModel::new(Precision::Double);
        assert!(matches!(
            load_telescope_noise(&mut telescope, &settings),
            Err(NoiseError::FileIO { .. })
        ));
    }

    #[test]
    fn test_bad_location() {
        let tmp_dir = tempdir().unwrap();
        let settings = noise_settings(tmp_dir.path());
        let mut telescope = TelescopeModel::new(Precision::Double);
        telescope.location = Location::Gpu;
        assert!(matches!(
            load_telescope_noise(&mut telescope, &settings),
            Err(NoiseError::BadLocation { .. })
        ));
    }

    #[test]
    fn test_empty_directory_setting() {
        let settings = noise_settings("");
        let mut telescope = TelescopeModel::new(Precision::Double);
        assert!(matches!(
            load_telescope_noise(&mut telescope, &settings),
            Err(NoiseError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_precision_mismatch() {
        let tmp_dir = tempdir().unwrap();
        write_values(tmp_dir.path(), "noise_frequencies.txt", &[100e6]);
        write_values(tmp_dir.path(), "rms.txt", &[1.0]);
        make_dir(tmp_dir.path(), "station000");

        let mut settings = noise_settings(tmp_dir.path());
        settings.simulation.double_precision = false;
        let mut telescope = TelescopeModel::new(Precision::Double);
        assert!(matches!(
            load_telescope_noise(&mut telescope, &settings),
            Err(NoiseError::TypeMismatch {
                expected: ElementType::Single,
                received: ElementType::Double,
                ..
            })
        ));
        assert!(telescope.stations.is_none());
    }

    #[test]
    fn test_end_to_end() {
        let tmp_dir = tempdir().unwrap();
        write_values(tmp_dir.path(), "noise_frequencies.txt", &[100e6, 200e6]);
        write_values(tmp_dir.path(), "rms.txt", &[1.0, 1.5]);
        make_dir(tmp_dir.path(), "station000");

        let settings = noise_settings(tmp_dir.path());
        let mut telescope = TelescopeModel::new(Precision::Double);
        load_telescope_noise(&mut telescope, &settings).unwrap();

        assert_eq!(telescope.num_stations(), 1);
        let noise = &telescope.stations()[0].noise;
        assert_eq!(noise.frequency, Mem::Double(vec![1e8, 2e8]));
        assert_eq!(noise.rms, Mem::Double(vec![1.0, 1.5]));
    }

    #[test]
    fn test_single_precision() {
        let tmp_dir = tempdir().unwrap();
        write_values(tmp_dir.path(), "noise_frequencies.txt", &[100e6, 200e6]);
        write_values(tmp_dir.path(), "rms.txt", &[1.0, 1.5]);
        make_dir(tmp_dir.path(), "station000");

        let mut settings = noise_settings(tmp_dir.path());
        settings.simulation.double_precision = false;
        let mut telescope = TelescopeModel::new(Precision::Single);
        load_telescope_noise(&mut telescope, &settings).unwrap();

        let noise = &telescope.stations()[0].noise;
        assert_eq!(noise.frequency, Mem::Single(vec![1e8, 2e8]));
        assert_eq!(noise.rms, Mem::Single(vec![1.0, 1.5]));
    }

    #[test]
    fn test_frequencies_shared_and_station_order() {
        let tmp_dir = tempdir().unwrap();
        write_values(tmp_dir.path(), "noise_frequencies.txt", &[1e8, 2e8, 3e8]);
        for (name, rms) in [("c", 3.0), ("a", 1.0), ("b", 2.0)] {
            let station_dir = make_dir(tmp_dir.path(), name);
            write_values(&station_dir, "rms.txt", &[rms; 3]);
        }
        // ignored in favour of the telescope-level file
        write_values(tmp_dir.path().join("b"), "noise_frequencies.txt", &[5.0, 6.0]);

        let settings = noise_settings(tmp_dir.path());
        let mut telescope = TelescopeModel::new(Precision::Double);
        load_telescope_noise(&mut telescope, &settings).unwrap();

        let stations = telescope.stations();
        assert_eq!(stations.len(), 3);
        for (station, rms) in izip!(stations, [1.0, 2.0, 3.0]) {
            assert_eq!(station.noise.frequency, stations[0].noise.frequency);
            assert_eq!(station.noise.frequency, Mem::Double(vec![1e8, 2e8, 3e8]));
            assert_eq!(station.noise.rms, Mem::Double(vec![rms; 3]));
        }
    }

    #[test]
    fn test_station_file_overrides_telescope_file() {
        let tmp_dir = tempdir().unwrap();
        write_values(tmp_dir.path(), "noise_frequencies.txt", &[1e8]);
        write_values(tmp_dir.path(), "rms.txt", &[1.0]);
        let station_dir = make_dir(tmp_dir.path(), "station000");
        write_values(&station_dir, "rms.txt", &[2.0]);

        let settings = noise_settings(tmp_dir.path());
        let mut telescope = TelescopeModel::new(Precision::Double);
        load_telescope_noise(&mut telescope, &settings).unwrap();
        assert_eq!(telescope.stations()[0].noise.rms, Mem::Double(vec![2.0]));
    }

    #[test]
    fn test_missing_data_fails() {
        let tmp_dir = tempdir().unwrap();
        write_values(tmp_dir.path(), "noise_frequencies.txt", &[1e8, 2e8]);
        make_dir(tmp_dir.path(), "station000");

        let settings = noise_settings(tmp_dir.path());
        let mut telescope = TelescopeModel::new(Precision::Double);
        assert!(matches!(
            load_telescope_noise(&mut telescope, &settings),
            Err(NoiseError::SetupFailTelescope(_))
        ));
        let noise = &telescope.stations()[0].noise;
        assert_eq!(noise.num_freqs(), 2);
        assert!(noise.rms.is_empty());
    }

    #[test]
    fn test_zero_bandwidth_fails() {
        let tmp_dir = tempdir().unwrap();
        make_dir(tmp_dir.path(), "station000");
        let mut settings = noise_settings(tmp_dir.path());
        settings.interferometer.channel_bandwidth_hz = 0.0;
        let mut telescope = TelescopeModel::new(Precision::Double);
        assert!(matches!(
            load_telescope_noise(&mut telescope, &settings),
            Err(NoiseError::SettingsInterferometerNoise(_))
        ));
        assert!(telescope.stations.is_none());
    }

    #[test]
    fn test_preallocated_stations() {
        let tmp_dir = tempdir().unwrap();
        write_values(tmp_dir.path(), "rms.txt", &[1.0, 2.0]);
        make_dir(tmp_dir.path(), "station000");
        make_dir(tmp_dir.path(), "station001");

        let mut settings = noise_settings(tmp_dir.path());
        let freq = &mut settings.interferometer.noise.freq;
        freq.specification = FreqSpecification::Range;
        freq.number = 2;
        freq.start = 100e6;
        freq.inc = 1e6;

        // more stations than directories: reused without resizing
        let mut telescope = TelescopeModel::with_stations(Precision::Double, 3).unwrap();
        load_telescope_noise(&mut telescope, &settings).unwrap();
        assert_eq!(telescope.num_stations(), 3);
        assert_eq!(telescope.stations()[2].noise.num_freqs(), 2);
        assert_eq!(telescope.stations()[1].noise.rms, Mem::Double(vec![1.0, 2.0]));
        assert!(telescope.stations()[2].noise.rms.is_empty());

        let mut telescope = TelescopeModel::with_stations(Precision::Double, 1).unwrap();
        assert!(matches!(
            load_telescope_noise(&mut telescope, &settings),
            Err(NoiseError::DimensionMismatch {
                expected: 2,
                received: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_nested_stations_allocate_children() {
        let tmp_dir = tempdir().unwrap();
        write_values(tmp_dir.path(), "noise_frequencies.txt", &[1e8]);
        write_values(tmp_dir.path(), "rms.txt", &[1.0]);
        let station_dir = make_dir(tmp_dir.path(), "station000");
        make_dir(&station_dir, "tile0");
        make_dir(&station_dir, "tile1");
        make_dir(tmp_dir.path(), "station001");

        let settings = noise_settings(tmp_dir.path());
        let mut telescope = TelescopeModel::new(Precision::Double);
        load_telescope_noise(&mut telescope, &settings).unwrap();

        let stations = telescope.stations();
        assert_eq!(stations[0].num_children(), 2);
        // stations with children are not leaves
        assert!(stations[0].noise.rms.is_empty());
        assert_eq!(stations[1].noise.rms, Mem::Double(vec![1.0]));
    }

    #[test]
    fn test_no_stations() {
        let tmp_dir = tempdir().unwrap();
        let settings = noise_settings(tmp_dir.path());
        let mut telescope = TelescopeModel::new(Precision::Double);
        load_telescope_noise(&mut telescope, &settings).unwrap();
        assert_eq!(telescope.num_stations(), 0);
    }
}
