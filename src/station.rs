//! The in-memory telescope and station tree.

use log::trace;

use crate::{
    error::NoiseError,
    mem::{Location, Mem, Precision},
};

/// Per-station system noise: RMS flux density at each noise frequency.
#[derive(Debug, Clone, PartialEq)]
pub struct NoiseModel {
    /// Frequencies at which noise is defined [Hz]
    pub frequency: Mem,
    /// RMS flux density at each frequency [Jy]
    pub rms: Mem,
}

impl NoiseModel {
    /// Empty frequency and RMS buffers of the given precision.
    pub fn new(precision: Precision) -> Self {
        Self {
            frequency: Mem::with_precision(precision, 0),
            rms: Mem::with_precision(precision, 0),
        }
    }

    /// The number of noise frequencies.
    pub fn num_freqs(&self) -> usize {
        self.frequency.len()
    }
}

/// A station, which may itself contain stations (e.g. tiles within a
/// station).
#[derive(Debug, Clone, PartialEq)]
pub struct StationModel {
    /// The station's noise model
    pub noise: NoiseModel,
    /// Child stations, once allocated
    pub children: Option<Vec<StationModel>>,
}

impl StationModel {
    /// A station with an empty noise model and no children.
    pub fn new(precision: Precision) -> Self {
        Self {
            noise: NoiseModel::new(precision),
            children: None,
        }
    }

    /// The number of allocated child stations.
    pub fn num_children(&self) -> usize {
        self.children.as_ref().map_or(0, Vec::len)
    }
}

/// Allocate `len` stations, reporting allocation failure.
pub(crate) fn new_stations(
    precision: Precision,
    len: usize,
) -> Result<Vec<StationModel>, NoiseError> {
    trace!("allocating {len} stations");
    let mut stations = Vec::new();
    stations
        .try_reserve_exact(len)
        .map_err(|_| NoiseError::MemoryAllocFailure {
            what: "station array".into(),
            len,
        })?;
    stations.extend((0..len).map(|_| StationModel::new(precision)));
    Ok(stations)
}

/// A telescope: an ordered list of top-level stations.
#[derive(Debug, Clone, PartialEq)]
pub struct TelescopeModel {
    /// Precision of every numeric buffer in the model
    pub precision: Precision,
    /// Where the model's data lives
    pub location: Location,
    /// Top-level stations, once allocated
    pub stations: Option<Vec<StationModel>>,
}

impl TelescopeModel {
    /// An empty host-resident telescope model.
    pub fn new(precision: Precision) -> Self {
        Self {
            precision,
            location: Location::Cpu,
            stations: None,
        }
    }

    /// A telescope model with `num_stations` empty stations already
    /// allocated, as a layout loader would leave it.
    ///
    /// # Errors
    ///
    /// [`NoiseError::MemoryAllocFailure`] if the stations can't be allocated.
    pub fn with_stations(precision: Precision, num_stations: usize) -> Result<Self, NoiseError> {
        Ok(Self {
            stations: Some(new_stations(precision, num_stations)?),
            ..Self::new(precision)
        })
    }

    /// The number of allocated top-level stations.
    pub fn num_stations(&self) -> usize {
        self.stations.as_ref().map_or(0, Vec::len)
    }

    /// The number of cross-correlation baselines between top-level stations.
    pub fn num_baselines(&self) -> usize {
        let n = self.num_stations();
        n * n.saturating_sub(1) / 2
    }

    /// The top-level stations, or an empty slice if none are allocated.
    pub fn stations(&self) -> &[StationModel] {
        self.stations.as_deref().unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_baselines() {
        let telescope = TelescopeModel::new(Precision::Double);
        assert_eq!(telescope.num_stations(), 0);
        assert_eq!(telescope.num_baselines(), 0);
        assert!(telescope.stations().is_empty());

        let telescope = TelescopeModel::with_stations(Precision::Single, 4).unwrap();
        assert_eq!(telescope.num_stations(), 4);
        assert_eq!(telescope.num_baselines(), 6);
        assert_eq!(telescope.location, Location::Cpu);
    }

    #[test]
    fn test_new_station_is_empty() {
        let station = StationModel::new(Precision::Single);
        assert_eq!(station.num_children(), 0);
        assert_eq!(station.noise.num_freqs(), 0);
        assert_eq!(station.noise.rms, Mem::Single(vec![]));
    }
}
