//! Integer compensation of raw samples
//!
//! The vendor's two-stage fixed-point algorithm: raw temperature and the
//! calibration words produce the intermediate `b5`, which then feeds the
//! pressure correction chain (`b6`, `b3`, `b4`, `b7`) and a second-order
//! term. Every power-of-two scaling is an exact arithmetic shift; the two
//! genuine divisions stay divisions. Pure arithmetic, no hidden state.

use super::calibration::{CalibrationSet, RawSample};
use super::registers::Oversampling;

/// Final output pair of one acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CompensatedReading {
    /// Temperature in tenths of a degree Celsius (150 = 15.0 °C).
    pub temperature_dc: i16,
    /// Pressure in pascals.
    pub pressure_pa: i32,
}

/// Compensate one raw sample pair against a calibration set.
///
/// `oversampling` must be the setting the pressure conversion actually
/// ran at; it scales the `b3`/`b7` terms. Calibration words are expected
/// to come from a real part (the vendor formula divides by `x1 + md`,
/// which live calibration data keeps nonzero).
pub fn compensate(
    calib: &CalibrationSet,
    raw: &RawSample,
    oversampling: Oversampling,
) -> CompensatedReading {
    let oss = oversampling as u32;

    // Temperature.
    let ut = i32::from(raw.temperature);
    let x1 = ((ut - i32::from(calib.ac6)) * i32::from(calib.ac5)) >> 15;
    let x2 = (i32::from(calib.mc) << 11) / (x1 + i32::from(calib.md));
    let b5 = x1 + x2;
    let temperature_dc = ((b5 + 8) >> 4) as i16;

    // Pressure.
    let b6 = b5 - 4000;
    let x1 = (i32::from(calib.b2) * ((b6 * b6) >> 12)) >> 11;
    let x2 = (i32::from(calib.ac2) * b6) >> 11;
    let x3 = x1 + x2;
    let b3 = (((i32::from(calib.ac1) * 4 + x3) << oss) + 2) >> 2;

    let x1 = (i32::from(calib.ac3) * b6) >> 13;
    let x2 = (i32::from(calib.b1) * ((b6 * b6) >> 12)) >> 16;
    let x3 = (x1 + x2 + 2) >> 2;
    // The vendor keeps b4/b7 unsigned 32-bit; widening the products keeps
    // the same in-range results without wrapping on degenerate inputs.
    let b4 = (u64::from(calib.ac4) * u64::from((x3 + 32768) as u32)) >> 15;
    let b7 = (i64::from(raw.pressure) - i64::from(b3)) * i64::from(50_000u32 >> oss);

    let pressure = if b7 < 0x8000_0000 {
        ((b7 * 2) / b4 as i64) as i32
    } else {
        ((b7 / b4 as i64) * 2) as i32
    };

    // Second-order correction.
    let x1 = (pressure >> 8) * (pressure >> 8);
    let x1 = (x1 * 3038) >> 16;
    let x2 = (-7357 * pressure) >> 16;
    let pressure_pa = pressure + ((x1 + x2 + 3791) >> 4);

    CompensatedReading {
        temperature_dc,
        pressure_pa,
    }
}
