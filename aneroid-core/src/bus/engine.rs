//! Bus transport engine
//!
//! Generates the bus waveforms on two open-drain GPIO lines: start and
//! stop conditions, single-bit write steps with acknowledge sampling, and
//! single-bit read steps with a selectable acknowledge response. All
//! timing comes from the injected delay and the configured bit rate.
//!
//! Data changes while the clock is low and is sampled while it is high.
//! Clock stretching and multi-controller arbitration are not supported;
//! the engine assumes it is the only device driving the clock line.

use aneroid_hal::{InputPin, OutputPin};
use embedded_hal::delay::DelayNs;

use super::transfer::{Progress, ReadState, ReadTransfer, WriteState, WriteTransfer};
use super::BusConfig;

/// Bit-banged bus controller.
///
/// Owns the two bus lines and the delay primitive. `SDA` must be readable
/// as well as drivable, since acknowledge bits and incoming data arrive on
/// the released data line.
pub struct BitBangBus<SCL, SDA, D> {
    scl: SCL,
    sda: SDA,
    delay: D,
    half_period_us: u32,
}

impl<SCL, SDA, D> BitBangBus<SCL, SDA, D>
where
    SCL: OutputPin,
    SDA: OutputPin + InputPin,
    D: DelayNs,
{
    pub fn new(scl: SCL, sda: SDA, delay: D, config: BusConfig) -> Self {
        Self {
            scl,
            sda,
            delay,
            half_period_us: config.half_period_us(),
        }
    }

    /// Hold the current line levels for one half bit-period.
    fn hold(&mut self) {
        self.delay.delay_us(self.half_period_us);
    }

    /// Release both lines to their idle-high state.
    ///
    /// Must run once before the first transfer.
    pub fn begin(&mut self) {
        self.sda.set_high();
        self.scl.set_high();
    }

    /// Issue a start (or repeated-start) condition: data falls while the
    /// clock is high.
    ///
    /// The leading clock pulse gives a peripheral still holding the data
    /// line from an earlier byte a falling edge to release on; without it
    /// the data line may never rise and the start never registers.
    pub fn start_condition(&mut self) {
        self.scl.set_low();
        self.hold();
        self.scl.set_high();
        self.hold();

        self.sda.set_low();
        self.scl.set_low();
        self.hold();
    }

    /// Issue a stop condition: data rises while the clock is high.
    pub fn stop_condition(&mut self) {
        self.scl.set_high();
        self.hold();
        self.scl.set_low();
        self.hold();

        self.sda.set_low();
        self.scl.set_high();
        self.hold();
        self.sda.set_high();
    }

    /// Advance a byte write by one clock pulse.
    ///
    /// Call repeatedly until it returns [`Progress::Complete`]; eight
    /// shift pulses are followed by one acknowledge pulse, and the
    /// completion value is the transfer's `on_ack` or `on_nack`
    /// continuation depending on the sampled acknowledge bit. A completed
    /// transfer must not be stepped again.
    pub fn write_step<P: Copy>(&mut self, transfer: &mut WriteTransfer<P>) -> Progress<P> {
        match transfer.state {
            WriteState::Shift => {
                self.scl.set_low();
                self.hold();
                self.sda.set_state(transfer.byte & 0x80 != 0);
                self.scl.set_high();
                self.hold();

                transfer.byte <<= 1;
                transfer.bits_left -= 1;
                if transfer.bits_left == 0 {
                    transfer.state = WriteState::AckCheck;
                }
                Progress::Pending
            }
            WriteState::AckCheck => {
                self.scl.set_low();
                self.hold();
                // Release the data line so the peripheral can answer.
                self.sda.set_high();
                self.scl.set_high();
                self.hold();

                if self.sda.is_low() {
                    Progress::Complete(transfer.on_ack)
                } else {
                    Progress::Complete(transfer.on_nack)
                }
            }
        }
    }

    /// Advance a byte read by one invocation.
    ///
    /// The first invocation releases the data line; the next eight each
    /// clock one bit in; the final one drives the acknowledge bit chosen
    /// when the transfer was created and completes with its `on_done`
    /// continuation.
    pub fn read_step<P: Copy>(&mut self, transfer: &mut ReadTransfer<P>) -> Progress<P> {
        match transfer.state {
            ReadState::Prime => {
                self.sda.set_high();
                transfer.byte = 0;
                transfer.state = ReadState::Shift;
                Progress::Pending
            }
            ReadState::Shift => {
                transfer.byte <<= 1;

                self.scl.set_low();
                self.hold();
                self.scl.set_high();
                self.hold();

                if self.sda.is_high() {
                    transfer.byte |= 0x01;
                }
                transfer.bits_done += 1;
                if transfer.bits_done == 8 {
                    transfer.state = ReadState::Acknowledge;
                }
                Progress::Pending
            }
            ReadState::Acknowledge => {
                self.scl.set_low();
                self.hold();
                // High = not-acknowledge (last byte), low = acknowledge.
                self.sda.set_state(transfer.send_nack);
                self.scl.set_high();
                self.hold();

                Progress::Complete(transfer.on_done)
            }
        }
    }

    /// Busy-wait without touching the bus lines.
    ///
    /// Used by sequencers for mandatory device-side delays such as analog
    /// conversion times.
    pub fn wait_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }
}
