//! Command Line Interface helpers for sysnoise

use std::{
    ffi::OsString,
    fmt::{Debug, Display},
    path::PathBuf,
};

use clap::{
    arg, command,
    ErrorKind::{ArgumentNotFound, DisplayHelp, DisplayVersion},
    ValueHint::{DirPath, FilePath},
};
use itertools::{Itertools, MinMaxResult};
use lazy_static::lazy_static;
use log::{debug, info, trace, warn};
use prettytable::{cell, format as prettyformat, row, table, Table};
use strum::IntoEnumIterator;

use crate::{
    error::{
        CLIError::InvalidCommandLineArgument,
        SysnoiseError::{self, ClapError, DryRun},
    },
    load::load_telescope_noise,
    mem::Mem,
    settings::{FreqSpecification, OverrideMode, QuantitySettings, Settings, ValueSpecification},
    station::TelescopeModel,
};

lazy_static! {
    static ref FREQ_SPEC_HELP: String = format!(
        "How noise frequencies are specified [possible values: {}]",
        FreqSpecification::iter().join(", ")
    );
    static ref VALUE_SPEC_HELP: String = format!(
        "How noise values are specified [possible values: {}]",
        ValueSpecification::iter().join(", ")
    );
}

/// Args for loading system noise into a telescope model.
#[derive(Debug, Clone)]
pub struct NoiseContext {
    /// The settings file the run started from, if any
    pub settings_file: Option<PathBuf>,
    /// Settings after command line overrides
    pub settings: Settings,
}

// Add build-time information from the "built" crate.
include!(concat!(env!("OUT_DIR"), "/built.rs"));

/// Write many info-level log lines of how this executable was compiled.
///
/// # Errors
///
/// propagates writeln! fails
pub fn fmt_build_info(f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match GIT_HEAD_REF {
        Some(hr) => {
            let dirty = GIT_DIRTY.unwrap_or(false);
            writeln!(
                f,
                "Compiled on git commit hash: {}{}",
                GIT_COMMIT_HASH.unwrap_or("<unknown>"),
                if dirty { " (dirty)" } else { "" }
            )?;
            writeln!(f, "            git head ref: {}", hr)?;
        }
        None => writeln!(f, "Compiled on git commit hash: <no git info>")?,
    }
    writeln!(f, "            {}", BUILT_TIME_UTC)?;
    writeln!(f, "         with compiler {}", RUSTC_VERSION)?;
    writeln!(f)?;
    Ok(())
}

fn fmt_quantity(
    f: &mut std::fmt::Formatter<'_>,
    name: &str,
    quantity: &QuantitySettings,
) -> std::fmt::Result {
    match quantity.override_mode {
        OverrideMode::NoOverride => writeln!(f, "  {name:<12} from telescope model"),
        OverrideMode::DataFile => writeln!(
            f,
            "  {name:<12} from {}",
            quantity
                .file
                .as_ref()
                .map_or_else(|| "<unspecified>".into(), |p| p.display().to_string())
        ),
        OverrideMode::Range => writeln!(
            f,
            "  {name:<12} range {} to {}",
            quantity.start, quantity.end
        ),
    }
}

impl Display for NoiseContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{} version {}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
        )?;

        fmt_build_info(f)?;

        let settings = &self.settings;
        if let Some(settings_file) = &self.settings_file {
            writeln!(f, "Settings file:        {}", settings_file.display())?;
        }
        writeln!(
            f,
            "Telescope model:      {}",
            settings.telescope.input_directory.display()
        )?;
        writeln!(f, "Precision:            {}", settings.precision())?;

        let noise = &settings.interferometer.noise;
        if !noise.enable {
            writeln!(f, "Will not load system noise (disabled)")?;
            return Ok(());
        }
        writeln!(
            f,
            "Channel bandwidth:    {} Hz",
            settings.interferometer.channel_bandwidth_hz
        )?;
        writeln!(f, "Integration time:     {} s", settings.integration_time())?;
        writeln!(f, "Noise seed:           {}", noise.seed)?;

        match noise.freq.specification {
            FreqSpecification::TelescopeModel => {
                writeln!(f, "Frequencies from telescope model")?;
            }
            FreqSpecification::DataFile => writeln!(
                f,
                "Frequencies from {}",
                noise
                    .freq
                    .file
                    .as_ref()
                    .map_or_else(|| "<unspecified>".into(), |p| p.display().to_string())
            )?,
            FreqSpecification::ObservationSettings => writeln!(
                f,
                "Frequencies from observation: {} channels from {} Hz every {} Hz",
                settings.observation.num_channels,
                settings.observation.start_frequency_hz,
                settings.observation.frequency_inc_hz
            )?,
            FreqSpecification::Range => writeln!(
                f,
                "Frequencies from range: {} from {} Hz every {} Hz",
                noise.freq.number, noise.freq.start, noise.freq.inc
            )?,
        }

        let values = &noise.values;
        writeln!(f, "Noise values:         {}", values.specification)?;
        match values.specification {
            ValueSpecification::TelescopeModelPriority => {}
            ValueSpecification::Rms => fmt_quantity(f, "rms", &values.rms)?,
            ValueSpecification::Sensitivity => fmt_quantity(f, "sensitivity", &values.sensitivity)?,
            ValueSpecification::SystemTemperature => {
                fmt_quantity(f, "t_sys", &values.t_sys)?;
                fmt_quantity(f, "area", &values.area)?;
                fmt_quantity(f, "efficiency", &values.efficiency)?;
            }
        }
        Ok(())
    }
}

fn fmt_range(values: &Mem, scale: f64) -> (String, String) {
    let values = values.to_f64_vec().unwrap_or_default();
    match values.into_iter().minmax() {
        MinMaxResult::NoElements => ("-".into(), "-".into()),
        MinMaxResult::OneElement(v) => (format!("{:.3}", v / scale), format!("{:.3}", v / scale)),
        MinMaxResult::MinMax(lo, hi) => {
            (format!("{:.3}", lo / scale), format!("{:.3}", hi / scale))
        }
    }
}

/// A table summarising the noise model of each top-level station.
pub fn station_table(telescope: &TelescopeModel) -> Table {
    let mut table = table!([
        "station",
        "children",
        "freqs",
        "min [MHz]",
        "max [MHz]",
        "rms",
        "min [Jy]",
        "max [Jy]"
    ]);
    table.set_format(*prettyformat::consts::FORMAT_CLEAN);
    for (station_idx, station) in telescope.stations().iter().enumerate() {
        let (freq_min, freq_max) = fmt_range(&station.noise.frequency, 1e6);
        let (rms_min, rms_max) = fmt_range(&station.noise.rms, 1.0);
        table.add_row(row![r =>
            station_idx,
            station.num_children(),
            station.noise.num_freqs(),
            freq_min,
            freq_max,
            station.noise.rms.len(),
            rms_min,
            rms_max
        ]);
    }
    table
}

impl NoiseContext {
    fn get_matches<I, T>(args: I) -> Result<clap::ArgMatches, SysnoiseError>
    where
        I: IntoIterator<Item = T> + Debug,
        T: Into<OsString> + Clone,
    {
        let app = command!()
            .next_line_help(false)
            .about("Load per-station system noise from a radio telescope model.")
            .args(&[
                // input options
                arg!(-s --settings <PATH> "Settings file (.toml or .json)")
                    .required(false)
                    .value_hint(FilePath)
                    .help_heading("INPUT"),
                arg!(-t --telescope <DIR> "Telescope model directory")
                    .required(false)
                    .value_hint(DirPath)
                    .help_heading("INPUT"),
                // noise options
                arg!(--enable "Enable system noise even if the settings disable it")
                    .help_heading("NOISE"),
                arg!(--"single-precision" "Use single precision buffers")
                    .help_heading("NOISE"),
                arg!(--"freq-spec" <SPEC>)
                    .required(false)
                    .help(FREQ_SPEC_HELP.as_str())
                    .help_heading("NOISE"),
                arg!(--"value-spec" <SPEC>)
                    .required(false)
                    .help(VALUE_SPEC_HELP.as_str())
                    .help_heading("NOISE"),
                arg!(--bandwidth <HZ> "Channel bandwidth [Hz]")
                    .required(false)
                    .help_heading("NOISE"),
                arg!(--length <SECONDS> "Observation length [s]")
                    .required(false)
                    .help_heading("NOISE"),
                arg!(--"num-time-steps" <COUNT> "Number of correlator dumps")
                    .required(false)
                    .help_heading("NOISE"),
                arg!(--"dry-run" "Just print the summary and exit"),
            ]);

        Ok(app.try_get_matches_from(args)?)
    }

    fn parse_settings_matches(
        matches: &clap::ArgMatches,
    ) -> Result<(Option<PathBuf>, Settings), SysnoiseError> {
        let settings_file = matches.value_of("settings").map(PathBuf::from);
        let mut settings = match &settings_file {
            Some(path) => Settings::from_file(path)?,
            None => Settings::default(),
        };

        if let Some(dir) = matches.value_of("telescope") {
            settings.telescope.input_directory = PathBuf::from(dir);
        }
        if matches.is_present("enable") {
            settings.interferometer.noise.enable = true;
        }
        if matches.is_present("single-precision") {
            settings.simulation.double_precision = false;
        }

        let noise = &mut settings.interferometer.noise;
        match matches.value_of_t::<FreqSpecification>("freq-spec") {
            Err(err) if err.kind() != ArgumentNotFound => return Err(err.into()),
            Ok(spec) => noise.freq.specification = spec,
            Err(_) => {}
        }
        match matches.value_of_t::<ValueSpecification>("value-spec") {
            Err(err) if err.kind() != ArgumentNotFound => return Err(err.into()),
            Ok(spec) => noise.values.specification = spec,
            Err(_) => {}
        }

        match matches.value_of_t::<f64>("bandwidth") {
            Err(err) if err.kind() != ArgumentNotFound => return Err(err.into()),
            Ok(bandwidth) if !(bandwidth > 0.0) => {
                return Err(InvalidCommandLineArgument {
                    option: "--bandwidth".into(),
                    expected: "a positive number of Hz".into(),
                    received: bandwidth.to_string(),
                }
                .into())
            }
            Ok(bandwidth) => settings.interferometer.channel_bandwidth_hz = bandwidth,
            Err(_) => {}
        }
        match matches.value_of_t::<f64>("length") {
            Err(err) if err.kind() != ArgumentNotFound => return Err(err.into()),
            Ok(length) if !(length > 0.0) => {
                return Err(InvalidCommandLineArgument {
                    option: "--length".into(),
                    expected: "a positive number of seconds".into(),
                    received: length.to_string(),
                }
                .into())
            }
            Ok(length) => settings.observation.length_seconds = length,
            Err(_) => {}
        }
        match matches.value_of_t::<usize>("num-time-steps") {
            Err(err) if err.kind() != ArgumentNotFound => return Err(err.into()),
            Ok(0) => {
                return Err(InvalidCommandLineArgument {
                    option: "--num-time-steps".into(),
                    expected: "a positive integer".into(),
                    received: "0".into(),
                }
                .into())
            }
            Ok(num_time_steps) => settings.observation.num_time_steps = num_time_steps,
            Err(_) => {}
        }

        Ok((settings_file, settings))
    }

    /// Parse an iterator of arguments, `args` into a `NoiseContext`.
    ///
    /// # Errors
    ///
    /// Can raise:
    /// - [`SysnoiseError::ClapError`] if clap cannot parse `args`
    /// - [`SysnoiseError::SettingsError`] if the settings file can't be read.
    /// - [`SysnoiseError::CLIError`] if the arguments are invalid.
    /// - [`SysnoiseError::NoiseError`] if the resulting settings are invalid.
    /// - [`SysnoiseError::DryRun`] if `--dry-run` was given.
    pub fn from_args<I, T>(args: I) -> Result<Self, SysnoiseError>
    where
        I: IntoIterator<Item = T> + Debug,
        T: Into<OsString> + Clone,
    {
        debug!("args:\n{:?}", &args);

        let matches = Self::get_matches(args)?;
        trace!("arg matches:\n{:?}", &matches);

        let (settings_file, settings) = Self::parse_settings_matches(&matches)?;
        settings.validate()?;
        if !settings.interferometer.noise.enable {
            warn!("system noise is disabled, nothing will be loaded (see --enable)");
        }

        let result = Self {
            settings_file,
            settings,
        };

        info!("{}", &result);

        if matches.is_present("dry-run") {
            return Err(DryRun {});
        }

        Ok(result)
    }

    /// Build a host-resident telescope model and load system noise into it.
    ///
    /// # Errors
    ///
    /// can raise any [`crate::NoiseError`] from [`load_telescope_noise`].
    pub fn run(self) -> Result<TelescopeModel, SysnoiseError> {
        let mut telescope = TelescopeModel::new(self.settings.precision());
        load_telescope_noise(&mut telescope, &self.settings)?;
        Ok(telescope)
    }
}

/// Run the `sysnoise` application with the given arguments, returning the
/// process exit code.
pub fn main_with_args<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T> + Debug,
    T: Into<OsString> + Clone,
{
    let noise_ctx = match NoiseContext::from_args(args) {
        Ok(noise_ctx) => noise_ctx,
        Err(DryRun {}) => {
            info!("Dry run. No files will be read.");
            return 0;
        }
        Err(ClapError(inner)) => {
            // Swallow broken pipe errors
            trace!("clap error: {:?}", inner.kind());
            let _ = inner.print();
            match inner.kind() {
                DisplayHelp | DisplayVersion => return 0,
                _ => return 1,
            }
        }
        Err(e) => {
            eprintln!("error parsing args: {e}");
            return 1;
        }
    };

    match noise_ctx.run() {
        Ok(telescope) => {
            info!(
                "{} stations, {} baselines:\n{}",
                telescope.num_stations(),
                telescope.num_baselines(),
                station_table(&telescope)
            );
            0
        }
        Err(e) => {
            eprintln!("noise loading error: {e}");
            1
        }
    }
}
