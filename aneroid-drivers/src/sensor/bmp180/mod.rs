//! BMP180 barometric pressure and temperature sensor
//!
//! Digital pressure sensor read over the bit-banged two-wire bus. One
//! acquisition walks a fixed sequence: chip id, eleven calibration words,
//! a triggered temperature conversion and a triggered pressure
//! conversion, then compensates the raw samples into physical units.
//!
//! The sequencer composes two explicit state machines: its own logical
//! step ordering and the transport phase of the canonical per-byte
//! transaction. Each loop iteration advances the bus by at most one bit,
//! so the whole acquisition is cooperative and its worst-case duration is
//! bounded by the conversion waits.

mod calibration;
mod compensation;
mod registers;
#[cfg(test)]
mod sim;

pub use calibration::{CalibrationSet, RawSample};
pub use compensation::{compensate, CompensatedReading};
pub use registers::Oversampling;

use aneroid_core::bus::{BitBangBus, Progress, ReadTransfer, WriteTransfer};
use aneroid_hal::{InputPin, OutputPin};
use embedded_hal::delay::DelayNs;

use calibration::CALIBRATION_WORDS;
use registers as reg;

/// Errors that can occur during an acquisition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[non_exhaustive]
pub enum AcquisitionError {
    /// A written byte was not acknowledged: device absent, wrong address,
    /// or bus fault. The bus has been returned to idle with a stop
    /// condition; the acquisition produced no data.
    BusAcknowledge,
}

/// Which half of a big-endian calibration word is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Half {
    Msb,
    Lsb,
}

/// Logical acquisition steps, in fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    /// Chip id, read for presence verification only.
    DeviceId,
    /// One byte of calibration word `word` (0 = AC1 .. 10 = MD).
    Calibration { word: u8, half: Half },
    TriggerTemperature,
    TemperatureMsb,
    TemperatureLsb,
    TriggerPressure,
    PressureMsb,
    PressureLsb,
    PressureXlsb,
}

impl Step {
    /// The following step, or `None` once the sequence is exhausted.
    fn next(self) -> Option<Step> {
        Some(match self {
            Step::DeviceId => Step::Calibration {
                word: 0,
                half: Half::Msb,
            },
            Step::Calibration {
                word,
                half: Half::Msb,
            } => Step::Calibration {
                word,
                half: Half::Lsb,
            },
            Step::Calibration {
                word,
                half: Half::Lsb,
            } => {
                if usize::from(word) + 1 < CALIBRATION_WORDS {
                    Step::Calibration {
                        word: word + 1,
                        half: Half::Msb,
                    }
                } else {
                    Step::TriggerTemperature
                }
            }
            Step::TriggerTemperature => Step::TemperatureMsb,
            Step::TemperatureMsb => Step::TemperatureLsb,
            Step::TemperatureLsb => Step::TriggerPressure,
            Step::TriggerPressure => Step::PressureMsb,
            Step::PressureMsb => Step::PressureLsb,
            Step::PressureLsb => Step::PressureXlsb,
            Step::PressureXlsb => return None,
        })
    }

    /// Steps that write a conversion command instead of reading a byte.
    fn is_command(self) -> bool {
        matches!(self, Step::TriggerTemperature | Step::TriggerPressure)
    }

    /// Register address this step selects.
    fn register(self) -> u8 {
        match self {
            Step::DeviceId => reg::DEVICE_ID,
            Step::Calibration { word, half } => {
                let lsb = matches!(half, Half::Lsb) as u8;
                reg::CALIBRATION_BASE + word * 2 + lsb
            }
            Step::TriggerTemperature | Step::TriggerPressure => reg::CONTROL,
            Step::TemperatureMsb | Step::PressureMsb => reg::RESULT_MSB,
            Step::TemperatureLsb | Step::PressureLsb => reg::RESULT_LSB,
            Step::PressureXlsb => reg::RESULT_XLSB,
        }
    }
}

/// Transport phase of the canonical per-byte transaction.
///
/// Read steps run `Start → AddressWrite → RegisterSelect → Restart →
/// AddressRead → ReadData → StepComplete`; command steps run `Start →
/// AddressWrite → RegisterSelect → CommandData → StepComplete`. Any
/// unacknowledged write diverts to `Failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    AddressWrite,
    RegisterSelect,
    CommandData,
    Restart,
    AddressRead,
    ReadData,
    StepComplete,
    Failed,
}

/// Mutable state threading through one acquisition pass.
struct Acquisition {
    step: Step,
    phase: Phase,
    write: Option<WriteTransfer<Phase>>,
    read: Option<ReadTransfer<Phase>>,
    /// Last byte received on the bus.
    byte: u8,
    /// Chip id, read for presence verification (not interpreted)
    #[allow(dead_code)]
    device_id: u8,
    words: [u16; CALIBRATION_WORDS],
    raw: RawSample,
}

impl Acquisition {
    fn new(first: Step) -> Self {
        Self {
            step: first,
            phase: Phase::Start,
            write: None,
            read: None,
            byte: 0,
            device_id: 0,
            words: [0; CALIBRATION_WORDS],
            raw: RawSample::default(),
        }
    }

    /// File the byte of the just-completed step into its destination.
    ///
    /// Word pairs and the pressure triple assemble MSB-first; the final
    /// pressure byte also applies the oversampling right-shift.
    fn record(&mut self, oversampling: Oversampling) {
        let byte = self.byte;
        match self.step {
            Step::DeviceId => self.device_id = byte,
            Step::Calibration { word, half } => {
                let slot = &mut self.words[usize::from(word)];
                match half {
                    Half::Msb => *slot = u16::from(byte) << 8,
                    Half::Lsb => *slot |= u16::from(byte),
                }
            }
            Step::TemperatureMsb => self.raw.temperature = u16::from(byte) << 8,
            Step::TemperatureLsb => self.raw.temperature |= u16::from(byte),
            Step::PressureMsb => self.raw.pressure = u32::from(byte) << 16,
            Step::PressureLsb => self.raw.pressure |= u32::from(byte) << 8,
            Step::PressureXlsb => {
                self.raw.pressure |= u32::from(byte);
                self.raw.pressure >>= oversampling.result_shift();
            }
            Step::TriggerTemperature | Step::TriggerPressure => {}
        }
    }
}

/// BMP180 driver owning the bus and, after the first successful
/// acquisition, the sensor's calibration.
///
/// `&mut self` on [`acquire`](Self::acquire) enforces the single
/// in-flight acquisition the shared bus lines require.
pub struct Bmp180<SCL, SDA, D> {
    bus: BitBangBus<SCL, SDA, D>,
    oversampling: Oversampling,
    calibration: Option<CalibrationSet>,
}

impl<SCL, SDA, D> Bmp180<SCL, SDA, D>
where
    SCL: OutputPin,
    SDA: OutputPin + InputPin,
    D: DelayNs,
{
    /// Create a driver at the default (lowest) oversampling setting.
    pub fn new(bus: BitBangBus<SCL, SDA, D>) -> Self {
        Self::with_oversampling(bus, Oversampling::default())
    }

    pub fn with_oversampling(bus: BitBangBus<SCL, SDA, D>, oversampling: Oversampling) -> Self {
        Self {
            bus,
            oversampling,
            calibration: None,
        }
    }

    /// Calibration cached by the first successful acquisition.
    pub fn calibration(&self) -> Option<&CalibrationSet> {
        self.calibration.as_ref()
    }

    /// Drop the cached calibration; the next acquisition re-reads the
    /// full block from the sensor.
    pub fn invalidate_calibration(&mut self) {
        self.calibration = None;
    }

    /// Run one full acquisition to completion or failure.
    ///
    /// Blocks for the duration of the bus traffic and the two conversion
    /// waits. With calibration already cached, only the measurement tail
    /// (two conversions and their result bytes) touches the bus.
    pub fn acquire(&mut self) -> Result<CompensatedReading, AcquisitionError> {
        let first = if self.calibration.is_some() {
            Step::TriggerTemperature
        } else {
            Step::DeviceId
        };
        let mut ctx = Acquisition::new(first);

        self.bus.begin();
        self.run(&mut ctx)?;

        let calibration = *self
            .calibration
            .get_or_insert_with(|| CalibrationSet::from_words(ctx.words));
        Ok(compensate(&calibration, &ctx.raw, self.oversampling))
    }

    /// Drive the transport phases until the step sequence is exhausted or
    /// a write goes unacknowledged. One loop iteration moves the bus by
    /// at most one bit.
    fn run(&mut self, ctx: &mut Acquisition) -> Result<(), AcquisitionError> {
        loop {
            match ctx.phase {
                Phase::Start => {
                    self.bus.start_condition();
                    ctx.phase = Phase::AddressWrite;
                }
                Phase::AddressWrite => {
                    if ctx.write.is_none() {
                        ctx.write = Some(WriteTransfer::new(
                            reg::ADDRESS_WRITE,
                            Phase::RegisterSelect,
                            Phase::Failed,
                        ));
                    }
                    self.advance_write(ctx);
                }
                Phase::RegisterSelect => {
                    if ctx.write.is_none() {
                        let on_ack = if ctx.step.is_command() {
                            Phase::CommandData
                        } else {
                            Phase::Restart
                        };
                        ctx.write = Some(WriteTransfer::new(ctx.step.register(), on_ack, Phase::Failed));
                    }
                    self.advance_write(ctx);
                }
                Phase::CommandData => {
                    if ctx.write.is_none() {
                        let command = match ctx.step {
                            Step::TriggerPressure => self.oversampling.pressure_command(),
                            // Only the two trigger steps route here.
                            _ => reg::CONVERT_TEMPERATURE,
                        };
                        ctx.write =
                            Some(WriteTransfer::new(command, Phase::StepComplete, Phase::Failed));
                    }
                    self.advance_write(ctx);
                }
                Phase::Restart => {
                    self.bus.start_condition();
                    ctx.phase = Phase::AddressRead;
                }
                Phase::AddressRead => {
                    if ctx.write.is_none() {
                        ctx.write = Some(WriteTransfer::new(
                            reg::ADDRESS_READ,
                            Phase::ReadData,
                            Phase::Failed,
                        ));
                    }
                    self.advance_write(ctx);
                }
                Phase::ReadData => {
                    if ctx.read.is_none() {
                        // Every read is a single byte, so always not-acknowledge.
                        ctx.read = Some(ReadTransfer::new(true, Phase::StepComplete));
                    }
                    self.advance_read(ctx);
                }
                Phase::StepComplete => {
                    self.bus.stop_condition();
                    match ctx.step {
                        Step::TriggerTemperature => {
                            self.bus.wait_ms(reg::TEMPERATURE_CONVERSION_MS)
                        }
                        Step::TriggerPressure => self.bus.wait_ms(self.oversampling.conversion_ms()),
                        _ => ctx.record(self.oversampling),
                    }
                    match ctx.step.next() {
                        Some(next) => {
                            ctx.step = next;
                            ctx.phase = Phase::Start;
                        }
                        None => return Ok(()),
                    }
                }
                Phase::Failed => {
                    self.bus.stop_condition();
                    return Err(AcquisitionError::BusAcknowledge);
                }
            }
        }
    }

    fn advance_write(&mut self, ctx: &mut Acquisition) {
        if let Some(write) = ctx.write.as_mut() {
            if let Progress::Complete(next) = self.bus.write_step(write) {
                ctx.write = None;
                ctx.phase = next;
            }
        }
    }

    fn advance_read(&mut self, ctx: &mut Acquisition) {
        if let Some(read) = ctx.read.as_mut() {
            if let Progress::Complete(next) = self.bus.read_step(read) {
                ctx.byte = read.byte();
                ctx.read = None;
                ctx.phase = next;
            }
        }
    }
}
