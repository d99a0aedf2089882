//! BMP180 register map and command bytes
//!
//! The device sits at the fixed 7-bit address 0x77; the pre-shifted
//! address bytes below carry the read/write bit already.

/// Device address with the write bit (0x77 << 1 | 0).
pub const ADDRESS_WRITE: u8 = 0xEE;

/// Device address with the read bit (0x77 << 1 | 1).
pub const ADDRESS_READ: u8 = 0xEF;

/// Chip-id register; reads 0x55 on a live part.
pub const DEVICE_ID: u8 = 0xD0;

/// First calibration register. Eleven big-endian words occupy
/// 0xAA..=0xBF, MSB at the even address.
pub const CALIBRATION_BASE: u8 = 0xAA;

/// Measurement control register; writing a command byte starts a
/// conversion.
pub const CONTROL: u8 = 0xF4;

/// Conversion result registers.
pub const RESULT_MSB: u8 = 0xF6;
pub const RESULT_LSB: u8 = 0xF7;
pub const RESULT_XLSB: u8 = 0xF8;

/// Control command starting a temperature conversion.
pub const CONVERT_TEMPERATURE: u8 = 0x2E;

const CONVERT_PRESSURE_BASE: u8 = 0x34;

/// Temperature conversion time in ms (datasheet maximum 4.5 ms).
pub const TEMPERATURE_CONVERSION_MS: u32 = 5;

/// Pressure oversampling setting.
///
/// Selects internal sample averaging, which lengthens the analog
/// conversion and changes both the command byte and how far the raw
/// 19-bit result is right-shifted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Oversampling {
    /// Single sample, fastest conversion.
    #[default]
    UltraLowPower = 0,
    /// 2 samples.
    Standard = 1,
    /// 4 samples.
    HighResolution = 2,
    /// 8 samples.
    UltraHighResolution = 3,
}

impl Oversampling {
    /// Control command starting a pressure conversion at this setting.
    pub fn pressure_command(self) -> u8 {
        CONVERT_PRESSURE_BASE | ((self as u8) << 6)
    }

    /// Right shift applied to the assembled 3-byte raw pressure.
    pub fn result_shift(self) -> u32 {
        8 - self as u32
    }

    /// Pressure conversion time in ms (datasheet maxima).
    pub fn conversion_ms(self) -> u32 {
        match self {
            Oversampling::UltraLowPower => 5,
            Oversampling::Standard => 8,
            Oversampling::HighResolution => 14,
            Oversampling::UltraHighResolution => 26,
        }
    }
}
