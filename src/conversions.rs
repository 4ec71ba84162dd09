// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Conversions from station sensitivity or system temperature to RMS noise,
//! and generation of evenly spaced values.
//!
//! The radiometer equation gives the RMS flux density per visibility as
//!
//! ```text
//! rms = sensitivity / sqrt(2 B T)
//! sensitivity = 2 k_B t_sys / (area * efficiency)    [W/m^2/Hz]
//! ```
//!
//! where `B` is the channel bandwidth and `T` the integration time. Each
//! function here dispatches on the element type of its buffers to a generic
//! kernel over [`NoiseFloat`], so single and double precision share the same
//! formula.

use itertools::izip;
use log::trace;

use crate::{
    constants::{BOLTZMANN, JANSKY_PER_SI},
    error::NoiseError,
    mem::{ElementType, Mem, NoiseFloat},
};

fn type_mismatch(argument: &str, function: &str, expected: &Mem, received: &Mem) -> NoiseError {
    NoiseError::TypeMismatch {
        argument: argument.into(),
        function: function.into(),
        expected: expected.element_type(),
        received: received.element_type(),
    }
}

fn check_same_type(
    argument: &str,
    function: &str,
    expected: &Mem,
    received: &Mem,
) -> Result<(), NoiseError> {
    if expected.element_type() == received.element_type() {
        Ok(())
    } else {
        Err(type_mismatch(argument, function, expected, received))
    }
}

fn check_len(argument: &str, function: &str, mem: &Mem, expected: usize) -> Result<(), NoiseError> {
    if mem.len() == expected {
        Ok(())
    } else {
        Err(NoiseError::DimensionMismatch {
            argument: argument.into(),
            function: function.into(),
            expected,
            received: mem.len(),
        })
    }
}

fn bad_data_type(mem: &Mem, function: &str) -> NoiseError {
    NoiseError::BadDataType {
        element_type: mem.element_type(),
        function: function.into(),
    }
}

fn typed<'a, F: NoiseFloat>(
    argument: &str,
    function: &str,
    mem: &'a Mem,
) -> Result<&'a [F], NoiseError> {
    mem.as_slice::<F>().ok_or_else(|| NoiseError::TypeMismatch {
        argument: argument.into(),
        function: function.into(),
        expected: F::ELEMENT_TYPE,
        received: mem.element_type(),
    })
}

fn typed_mut<'a, F: NoiseFloat>(
    argument: &str,
    function: &str,
    mem: &'a mut Mem,
) -> Result<&'a mut [F], NoiseError> {
    let received = mem.element_type();
    mem.as_mut_slice::<F>()
        .ok_or_else(|| NoiseError::TypeMismatch {
            argument: argument.into(),
            function: function.into(),
            expected: F::ELEMENT_TYPE,
            received,
        })
}

/// `1 / sqrt(2 B T)`
#[inline]
fn radiometer_factor(bandwidth: f64, integration_time: f64) -> f64 {
    1.0 / (2.0 * bandwidth * integration_time).sqrt()
}

// Elements are widened to f64 before scaling and narrowed once at the end.
fn scale_kernel<F: NoiseFloat>(rms: &mut [F], values: &[F], factor: f64) {
    for (r, &v) in izip!(rms.iter_mut(), values) {
        *r = F::from_f64_lossy(v.widen() * factor);
    }
}

fn t_sys_kernel<F: NoiseFloat>(
    rms: &mut [F],
    t_sys: &[F],
    area: &[F],
    efficiency: &[F],
    factor: f64,
) {
    for (r, &t, &a, &e) in izip!(rms.iter_mut(), t_sys, area, efficiency) {
        *r = F::from_f64_lossy(t.widen() / (a.widen() * e.widen()) * factor);
    }
}

fn linear_kernel<F: NoiseFloat>(values: &mut [F], start: f64, inc: f64) {
    for (i, v) in values.iter_mut().enumerate() {
        *v = F::from_f64_lossy(start + i as f64 * inc);
    }
}

/// Convert station sensitivity [Jy] to RMS flux density [Jy].
///
/// `rms` is resized to `num_freqs` if needed. Nothing is written unless every
/// check passes.
///
/// # Errors
///
/// - [`NoiseError::TypeMismatch`] if `rms` and `sensitivity` differ in type.
/// - [`NoiseError::BadDataType`] for complex buffers.
/// - [`NoiseError::DimensionMismatch`] if `sensitivity` doesn't hold
///   `num_freqs` values.
pub fn sensitivity_to_rms(
    rms: &mut Mem,
    sensitivity: &Mem,
    num_freqs: usize,
    bandwidth: f64,
    integration_time: f64,
) -> Result<(), NoiseError> {
    const FUNCTION: &str = "sensitivity_to_rms";
    check_same_type("rms", FUNCTION, sensitivity, rms)?;
    check_len("sensitivity", FUNCTION, sensitivity, num_freqs)?;
    let factor = radiometer_factor(bandwidth, integration_time);

    match sensitivity.element_type() {
        ElementType::Single => {
            rms.resize(num_freqs)?;
            scale_kernel::<f32>(
                typed_mut("rms", FUNCTION, rms)?,
                typed("sensitivity", FUNCTION, sensitivity)?,
                factor,
            );
        }
        ElementType::Double => {
            rms.resize(num_freqs)?;
            scale_kernel::<f64>(
                typed_mut("rms", FUNCTION, rms)?,
                typed("sensitivity", FUNCTION, sensitivity)?,
                factor,
            );
        }
        ElementType::ComplexSingle | ElementType::ComplexDouble => {
            return Err(bad_data_type(sensitivity, FUNCTION));
        }
    }
    trace!("{FUNCTION}: converted {num_freqs} values");
    Ok(())
}

/// Convert system temperature [K], effective area [m^2] and system efficiency
/// to RMS flux density [Jy].
///
/// `rms` is resized to `num_freqs` if needed. Nothing is written unless every
/// check passes.
///
/// # Errors
///
/// - [`NoiseError::TypeMismatch`] if any buffer differs in type from `t_sys`.
/// - [`NoiseError::BadDataType`] for complex buffers.
/// - [`NoiseError::DimensionMismatch`] if any input doesn't hold `num_freqs`
///   values.
pub fn t_sys_to_rms(
    rms: &mut Mem,
    t_sys: &Mem,
    area: &Mem,
    efficiency: &Mem,
    num_freqs: usize,
    bandwidth: f64,
    integration_time: f64,
) -> Result<(), NoiseError> {
    const FUNCTION: &str = "t_sys_to_rms";
    check_same_type("area", FUNCTION, t_sys, area)?;
    check_same_type("efficiency", FUNCTION, t_sys, efficiency)?;
    check_same_type("rms", FUNCTION, t_sys, rms)?;
    check_len("t_sys", FUNCTION, t_sys, num_freqs)?;
    check_len("area", FUNCTION, area, num_freqs)?;
    check_len("efficiency", FUNCTION, efficiency, num_freqs)?;
    let factor = 2.0 * BOLTZMANN * JANSKY_PER_SI * radiometer_factor(bandwidth, integration_time);

    match t_sys.element_type() {
        ElementType::Single => {
            rms.resize(num_freqs)?;
            t_sys_kernel::<f32>(
                typed_mut("rms", FUNCTION, rms)?,
                typed("t_sys", FUNCTION, t_sys)?,
                typed("area", FUNCTION, area)?,
                typed("efficiency", FUNCTION, efficiency)?,
                factor,
            );
        }
        ElementType::Double => {
            rms.resize(num_freqs)?;
            t_sys_kernel::<f64>(
                typed_mut("rms", FUNCTION, rms)?,
                typed("t_sys", FUNCTION, t_sys)?,
                typed("area", FUNCTION, area)?,
                typed("efficiency", FUNCTION, efficiency)?,
                factor,
            );
        }
        ElementType::ComplexSingle | ElementType::ComplexDouble => {
            return Err(bad_data_type(t_sys, FUNCTION));
        }
    }
    trace!("{FUNCTION}: converted {num_freqs} values");
    Ok(())
}

/// Fill `values` with `num_values` elements `start + i * inc`, computed in
/// double precision and stored at the buffer's precision.
///
/// # Errors
///
/// [`NoiseError::BadDataType`] for complex buffers.
pub fn linear_fill(
    values: &mut Mem,
    num_values: usize,
    start: f64,
    inc: f64,
) -> Result<(), NoiseError> {
    const FUNCTION: &str = "linear_fill";
    match values.element_type() {
        ElementType::Single => {
            values.resize(num_values)?;
            linear_kernel::<f32>(typed_mut("values", FUNCTION, values)?, start, inc);
        }
        ElementType::Double => {
            values.resize(num_values)?;
            linear_kernel::<f64>(typed_mut("values", FUNCTION, values)?, start, inc);
        }
        ElementType::ComplexSingle | ElementType::ComplexDouble => {
            return Err(bad_data_type(values, FUNCTION));
        }
    }
    Ok(())
}

/// Fill `values` with `num_values` evenly spaced elements from `start`
/// towards `end`: `values[i] = start + i * (end - start) / num_values`.
/// `end` itself is never reached.
///
/// # Examples
///
/// ```rust
/// use sysnoise::{conversions::evaluate_range, mem::Mem};
///
/// let mut values = Mem::Double(vec![]);
/// evaluate_range(&mut values, 4, 1.0, 5.0).unwrap();
/// assert_eq!(values, Mem::Double(vec![1.0, 2.0, 3.0, 4.0]));
/// ```
///
/// # Errors
///
/// [`NoiseError::BadDataType`] for complex buffers.
pub fn evaluate_range(
    values: &mut Mem,
    num_values: usize,
    start: f64,
    end: f64,
) -> Result<(), NoiseError> {
    let inc = if num_values == 0 {
        0.0
    } else {
        (end - start) / num_values as f64
    };
    linear_fill(values, num_values, start, inc).map_err(|err| match err {
        NoiseError::BadDataType { element_type, .. } => NoiseError::BadDataType {
            element_type,
            function: "evaluate_range".into(),
        },
        err => err,
    })
}
