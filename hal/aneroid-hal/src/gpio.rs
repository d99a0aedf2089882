//! GPIO pin abstractions
//!
//! Provides traits for the open-drain digital lines the bit-banged bus is
//! built on. Implementations are expected to behave open-drain: "high"
//! means the line is released and floats up through its pull-up, "low"
//! means the line is actively driven to ground. On chips without a real
//! open-drain mode this is typically emulated by switching the pin between
//! input (released) and output-low (driven).

/// Open-drain output line
///
/// Implementations handle the actual hardware register manipulation for
/// the specific chip.
pub trait OutputPin {
    /// Release the line, letting the pull-up take it high (logic 1)
    fn set_high(&mut self);

    /// Drive the line to ground (logic 0)
    fn set_low(&mut self);

    /// Release or drive the line to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }
}

/// Digital input line
///
/// Reads the wire level, which for an open-drain line may be lower than
/// the released output state when another device holds the line down.
pub trait InputPin {
    /// Check if the wire reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the wire reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

/// Line that can be both driven and read back
///
/// The bus data line needs this: the controller drives it for address and
/// register bytes, then releases it and reads what the peripheral answers.
pub trait IoPin: OutputPin + InputPin {}

// Blanket implementation for types that implement both traits
impl<T: OutputPin + InputPin> IoPin for T {}
