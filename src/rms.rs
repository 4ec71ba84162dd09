//! Resolving a station's RMS noise from whichever quantities are available.

use log::debug;

use crate::{
    conversions::{evaluate_range, sensitivity_to_rms, t_sys_to_rms},
    error::NoiseError,
    files::{NoiseFileRole, NoiseFiles},
    io::load_existing,
    mem::{Mem, Precision},
    settings::{
        check_bandwidth_and_time, OverrideMode, QuantitySettings, Settings, ValueSpecification,
    },
    station::NoiseModel,
};

const FUNCTION: &str = "load_noise_rms";

fn missing_file(role: NoiseFileRole) -> NoiseError {
    NoiseError::SetupFailTelescope(format!(
        "no {role} data ({}) found in the telescope model",
        role.filename()
    ))
}

fn load_located(
    files: &NoiseFiles,
    role: NoiseFileRole,
    precision: Precision,
) -> Result<Mem, NoiseError> {
    let path = files.get(role).ok_or_else(|| missing_file(role))?;
    load_existing(path, precision, FUNCTION)
}

/// Load one quantity according to its override mode.
fn load_quantity(
    quantity: &QuantitySettings,
    role: NoiseFileRole,
    files: &NoiseFiles,
    precision: Precision,
    num_freqs: usize,
) -> Result<Mem, NoiseError> {
    debug!("{role} values: {}", quantity.override_mode);
    match quantity.override_mode {
        OverrideMode::NoOverride => load_located(files, role, precision),
        OverrideMode::DataFile => {
            let path = quantity.file.as_deref().ok_or_else(|| {
                NoiseError::SettingsInterferometerNoise(format!(
                    "{role} data file not specified"
                ))
            })?;
            load_existing(path, precision, FUNCTION)
        }
        OverrideMode::Range => {
            let mut values = Mem::with_precision(precision, 0);
            evaluate_range(&mut values, num_freqs, quantity.start, quantity.end)?;
            Ok(values)
        }
    }
}

/// Fill `noise.rms` with the RMS flux density [Jy] at each of the
/// `noise.frequency` values, using the data files visible in `files` and any
/// overrides in `settings`.
///
/// With [`ValueSpecification::TelescopeModelPriority`], the first available
/// of these is used: an RMS file, a sensitivity file, or all three of the
/// system temperature, area and efficiency files.
///
/// `noise.rms` is only replaced once a result of the right length has been
/// produced; on error it keeps its previous contents.
///
/// # Errors
///
/// - [`NoiseError::SettingsInterferometerNoise`] if the channel bandwidth or
///   integration time isn't positive. This is checked before any file is
///   read.
/// - [`NoiseError::SetupFailTelescope`] if a required data file wasn't found,
///   or the result doesn't match the number of frequencies.
/// - [`NoiseError::FileIO`] if an override names a file that doesn't exist.
/// - [`NoiseError::DimensionMismatch`] if an input to a conversion has the
///   wrong length.
pub fn load_noise_rms(
    settings: &Settings,
    noise: &mut NoiseModel,
    files: &NoiseFiles,
) -> Result<(), NoiseError> {
    let bandwidth = settings.interferometer.channel_bandwidth_hz;
    let integration_time = settings.integration_time();
    check_bandwidth_and_time(bandwidth, integration_time)?;

    let num_freqs = noise.num_freqs();
    let precision = noise.rms.precision().ok_or_else(|| NoiseError::BadDataType {
        element_type: noise.rms.element_type(),
        function: FUNCTION.into(),
    })?;
    let values = &settings.interferometer.noise.values;
    let mut rms = Mem::with_precision(precision, 0);

    match values.specification {
        ValueSpecification::TelescopeModelPriority => {
            if files.contains(NoiseFileRole::Rms) {
                debug!("using RMS from telescope model");
                rms = load_located(files, NoiseFileRole::Rms, precision)?;
            } else if files.contains(NoiseFileRole::Sensitivity) {
                debug!("using sensitivity from telescope model");
                let sensitivity = load_located(files, NoiseFileRole::Sensitivity, precision)?;
                sensitivity_to_rms(
                    &mut rms,
                    &sensitivity,
                    num_freqs,
                    bandwidth,
                    integration_time,
                )?;
            } else if files.contains(NoiseFileRole::TSys)
                && files.contains(NoiseFileRole::Area)
                && files.contains(NoiseFileRole::Efficiency)
            {
                debug!("using system temperature from telescope model");
                let t_sys = load_located(files, NoiseFileRole::TSys, precision)?;
                let area = load_located(files, NoiseFileRole::Area, precision)?;
                let efficiency = load_located(files, NoiseFileRole::Efficiency, precision)?;
                t_sys_to_rms(
                    &mut rms,
                    &t_sys,
                    &area,
                    &efficiency,
                    num_freqs,
                    bandwidth,
                    integration_time,
                )?;
            } else {
                return Err(NoiseError::SetupFailTelescope(
                    "no RMS, sensitivity or system temperature data found in the telescope model"
                        .into(),
                ));
            }
        }
        ValueSpecification::Rms => {
            rms = load_quantity(
                &values.rms,
                NoiseFileRole::Rms,
                files,
                precision,
                num_freqs,
            )?;
        }
        ValueSpecification::Sensitivity => {
            let sensitivity = load_quantity(
                &values.sensitivity,
                NoiseFileRole::Sensitivity,
                files,
                precision,
                num_freqs,
            )?;
            sensitivity_to_rms(
                &mut rms,
                &sensitivity,
                num_freqs,
                bandwidth,
                integration_time,
            )?;
        }
        ValueSpecification::SystemTemperature => {
            let t_sys = load_quantity(
                &values.t_sys,
                NoiseFileRole::TSys,
                files,
                precision,
                num_freqs,
            )?;
            let area = load_quantity(
                &values.area,
                NoiseFileRole::Area,
                files,
                precision,
                num_freqs,
            )?;
            let efficiency = load_quantity(
                &values.efficiency,
                NoiseFileRole::Efficiency,
                files,
                precision,
                num_freqs,
            )?;
            t_sys_to_rms(
                &mut rms,
                &t_sys,
                &area,
                &efficiency,
                num_freqs,
                bandwidth,
                integration_time,
            )?;
        }
    }

    if rms.len() != num_freqs {
        return Err(NoiseError::SetupFailTelescope(format!(
            "found {} RMS values for {num_freqs} noise frequencies",
            rms.len()
        )));
    }
    noise.rms = rms;
    Ok(())
}
