// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Useful constants.
//!
//! All constants *must* be double precision.

/// Boltzmann's constant [J/K] (CODATA 2018, exact).
pub const BOLTZMANN: f64 = 1.380649e-23;

/// The number of Jansky in 1 W/m^2/Hz.
pub const JANSKY_PER_SI: f64 = 1e26;

/// The maximum station tree depth searched for noise files. Directories
/// deeper than this are not visited.
pub const MAX_NOISE_DEPTH: usize = 1;
