//! Byte transfer sub-machines
//!
//! A [`WriteTransfer`] or [`ReadTransfer`] carries the state of one byte
//! moving across the bus. Each call to the engine's matching step method
//! advances the machine by exactly one clock pulse; the caller re-enters
//! it until it reports [`Progress::Complete`].
//!
//! Completion continuations are data, not callbacks: the caller stores its
//! "next phase" values in the transfer up front, and the finished transfer
//! hands the chosen one back as a typed transition. One generic byte
//! mechanism therefore serves every register access a sequencer performs,
//! with no per-call specialization, recursion, or allocation.

/// Result of advancing a transfer by one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Progress<P> {
    /// The transfer needs more clock pulses; invoke the step again.
    Pending,
    /// The byte is done; carries the caller's continuation value.
    Complete(P),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum WriteState {
    /// Shifting data bits out, MSB first.
    Shift,
    /// All eight bits sent; clock once more and sample the acknowledge.
    AckCheck,
}

/// In-flight write of a single byte.
///
/// The acknowledge check always runs after the eighth bit, and the final
/// step resolves to `on_ack` or `on_nack` depending on whether the
/// peripheral pulled the data line low.
#[derive(Debug, Clone, Copy)]
pub struct WriteTransfer<P> {
    pub(crate) byte: u8,
    pub(crate) bits_left: u8,
    pub(crate) state: WriteState,
    pub(crate) on_ack: P,
    pub(crate) on_nack: P,
}

impl<P: Copy> WriteTransfer<P> {
    /// Prepare a byte for shifting out.
    pub fn new(byte: u8, on_ack: P, on_nack: P) -> Self {
        Self {
            byte,
            bits_left: 8,
            state: WriteState::Shift,
            on_ack,
            on_nack,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReadState {
    /// Release the data line so the peripheral can drive it.
    Prime,
    /// Shifting data bits in, MSB first.
    Shift,
    /// Drive the acknowledge bit chosen at construction.
    Acknowledge,
}

/// In-flight read of a single byte.
///
/// Whether the final clock carries an acknowledge or a not-acknowledge is
/// fixed when the transfer is created: the two responses are different
/// waveforms, and the choice must exist before the eighth bit completes.
/// Reads have no error outcome; the engine trusts the peripheral to drive
/// data once addressed.
#[derive(Debug, Clone, Copy)]
pub struct ReadTransfer<P> {
    pub(crate) byte: u8,
    pub(crate) bits_done: u8,
    pub(crate) send_nack: bool,
    pub(crate) state: ReadState,
    pub(crate) on_done: P,
}

impl<P: Copy> ReadTransfer<P> {
    /// Prepare a byte read. `send_nack` selects the not-acknowledge
    /// response, telling the peripheral this is the last byte expected.
    pub fn new(send_nack: bool, on_done: P) -> Self {
        Self {
            byte: 0,
            bits_done: 0,
            send_nack,
            state: ReadState::Prime,
            on_done,
        }
    }

    /// The byte received so far; complete once the transfer finishes.
    pub fn byte(&self) -> u8 {
        self.byte
    }
}
