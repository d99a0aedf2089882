//! Factory calibration and raw sample data model

/// Number of 16-bit calibration words (AC1..MD).
pub const CALIBRATION_WORDS: usize = 11;

/// The eleven factory calibration words, read once per sensor.
///
/// Signedness is fixed per field by the datasheet, never inferred from
/// the received bits. Built atomically from a full register-order word
/// array so a partially read block can never leak into compensation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationSet {
    pub ac1: i16,
    pub ac2: i16,
    pub ac3: i16,
    pub ac4: u16,
    pub ac5: u16,
    pub ac6: u16,
    pub b1: i16,
    pub b2: i16,
    pub mb: i16,
    pub mc: i16,
    pub md: i16,
}

impl CalibrationSet {
    /// Build from the eleven words in register order (0xAA..=0xBF), each
    /// already combined MSB-first from its byte pair.
    pub fn from_words(words: [u16; CALIBRATION_WORDS]) -> Self {
        Self {
            ac1: words[0] as i16,
            ac2: words[1] as i16,
            ac3: words[2] as i16,
            ac4: words[3],
            ac5: words[4],
            ac6: words[5],
            b1: words[6] as i16,
            b2: words[7] as i16,
            mb: words[8] as i16,
            mc: words[9] as i16,
            md: words[10] as i16,
        }
    }
}

/// Uncompensated sample pair from one acquisition pass.
///
/// Reset at the start of every acquisition, consumed once by the
/// compensation stage, then discarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RawSample {
    /// Raw temperature, two result bytes MSB-first.
    pub temperature: u16,
    /// Raw pressure, three result bytes MSB-first, already right-shifted
    /// by the oversampling-dependent amount.
    pub pressure: u32,
}

/// Calibration words from the datasheet worked example, register order.
#[cfg(test)]
pub(crate) fn datasheet_words() -> [u16; CALIBRATION_WORDS] {
    [
        408,
        (-72i16) as u16,
        (-14383i16) as u16,
        32741,
        32757,
        23153,
        6190,
        4,
        (-32768i16) as u16,
        (-8711i16) as u16,
        2868,
    ]
}
