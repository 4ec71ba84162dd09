//! Locating system noise data files in a telescope model directory.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use log::{debug, warn};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

/// The kinds of data file that can describe a station's system noise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum NoiseFileRole {
    /// Frequencies at which noise values are defined [Hz]
    Frequency,
    /// RMS flux density [Jy]
    Rms,
    /// Station sensitivity [Jy]
    Sensitivity,
    /// System temperature [K]
    TSys,
    /// Effective area [m^2]
    Area,
    /// System efficiency
    Efficiency,
}

impl NoiseFileRole {
    /// The canonical filename for this role within a telescope model.
    pub const fn filename(self) -> &'static str {
        match self {
            NoiseFileRole::Frequency => "noise_frequencies.txt",
            NoiseFileRole::Rms => "rms.txt",
            NoiseFileRole::Sensitivity => "sensitivity.txt",
            NoiseFileRole::TSys => "t_sys.txt",
            NoiseFileRole::Area => "area.txt",
            NoiseFileRole::Efficiency => "efficiency.txt",
        }
    }
}

/// The noise data files visible from a directory of the telescope model.
///
/// The map is updated in place as the loader descends the directory tree:
/// a file in a child directory replaces the parent's entry for that role,
/// but parent entries that aren't replaced stay visible to the child.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoiseFiles {
    paths: BTreeMap<NoiseFileRole, PathBuf>,
}

impl NoiseFiles {
    /// An empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record every well-known noise file found directly inside `dir`,
    /// overwriting existing entries for the same role. Stale entries are
    /// never removed.
    pub fn update<P: AsRef<Path>>(&mut self, dir: P) {
        let dir = dir.as_ref();
        for role in NoiseFileRole::iter() {
            let path = dir.join(role.filename());
            if !path.is_file() {
                continue;
            }
            let path = match path.canonicalize() {
                Ok(abs) => abs,
                Err(err) => {
                    warn!("couldn't resolve {}: {err}", path.display());
                    path
                }
            };
            debug!("found {role} file {}", path.display());
            self.paths.insert(role, path);
        }
    }

    /// The located file for `role`, if any.
    pub fn get(&self, role: NoiseFileRole) -> Option<&Path> {
        self.paths.get(&role).map(PathBuf::as_path)
    }

    /// Whether a file has been located for `role`.
    pub fn contains(&self, role: NoiseFileRole) -> bool {
        self.paths.contains_key(&role)
    }

    /// Manually set the file for `role`.
    pub fn insert<P: Into<PathBuf>>(&mut self, role: NoiseFileRole, path: P) {
        self.paths.insert(role, path.into());
    }

    /// Iterate over the located files in role order.
    pub fn iter(&self) -> impl Iterator<Item = (NoiseFileRole, &Path)> {
        self.paths.iter().map(|(&role, path)| (role, path.as_path()))
    }

    /// The number of located files.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether no files have been located.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}
