//! Bit-banged two-wire bus
//!
//! The controller side of the sensor bus, driven entirely through two
//! open-drain GPIO lines. [`BitBangBus`] generates start/stop conditions
//! and clocks single bits; [`WriteTransfer`] and [`ReadTransfer`] carry
//! byte-level state between invocations so the driving loop re-enters the
//! bus at bit granularity instead of blocking for whole bytes.

mod engine;
mod transfer;

pub use engine::BitBangBus;
pub use transfer::{Progress, ReadTransfer, WriteTransfer};

/// Bus timing configuration
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusConfig {
    /// Target bit rate in Hz
    pub bit_rate_hz: u32,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl BusConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self {
        bit_rate_hz: 100_000,
    };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self {
        bit_rate_hz: 400_000,
    };

    /// Half bit-period in microseconds.
    ///
    /// Every bus edge is held for this long. Never returns zero, so even
    /// an over-ambitious bit rate produces a valid waveform.
    pub fn half_period_us(&self) -> u32 {
        (500_000 / self.bit_rate_hz.max(1)).max(1)
    }
}
