//! Test-only peripheral-side model of the sensor on the bus
//!
//! Decodes the controller's pin edges the way the real part does: start
//! and stop detection from data transitions while the clock is high, bit
//! sampling on rising clock edges, acknowledge and data driving on
//! falling edges. Serves the BMP180 register map, records a bus-level
//! event trace the sequencing tests assert on, and can refuse to
//! acknowledge a chosen byte for fault injection.

use core::cell::RefCell;

use aneroid_hal::{InputPin, OutputPin};
use embedded_hal::delay::DelayNs;
use heapless::Vec;

use super::calibration::CALIBRATION_WORDS;
use super::registers as reg;

/// One decoded bus-level event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Start,
    Stop,
    /// Controller sent a byte; `acked` is this model's response.
    Write { byte: u8, acked: bool },
    /// Model served a byte; `acked` is the controller's response.
    Read { byte: u8, acked: bool },
    /// Controller delayed for at least one millisecond.
    Wait { ms: u32 },
}

/// What a received byte means at its position in the transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReceiveKind {
    Address,
    /// First byte after a write-mode address: the register pointer.
    Pointer,
    /// Later bytes: data written through the pointer.
    Data,
}

/// What the model is doing between clock edges.
#[derive(Clone, Copy)]
enum Activity {
    /// Waiting for a start condition.
    Idle,
    /// Sampling a byte from the controller, MSB first.
    Receive { kind: ReceiveKind, bits: u8, byte: u8 },
    /// Driving (or withholding) the acknowledge for a received byte.
    ReceiveAck { kind: ReceiveKind, ack: bool, driving: bool },
    /// Driving a byte out to the controller.
    Serve { byte: u8, driven: u8, sampled: u8 },
    /// Line released, sampling the controller's acknowledge.
    ServeAck { byte: u8, released: bool },
}

/// Register-level sensor model shared by the simulated pins.
///
/// `ut` and `up` are the raw conversion results the model loads into the
/// result registers when the matching control command arrives; `up` is
/// the post-shift value, re-aligned per the command's oversampling bits
/// before serving.
pub struct SensorModel {
    scl: bool,
    sda_controller: bool,
    sda_peripheral: bool,
    activity: Activity,
    /// Read/write bit of the last acknowledged address byte.
    read_mode: bool,
    pointer: u8,
    control: u8,
    /// 24-bit conversion result backing 0xF6..=0xF8.
    result: u32,
    pub id: u8,
    pub words: [u16; CALIBRATION_WORDS],
    pub ut: u16,
    pub up: u32,
    bytes_received: u32,
    /// Withhold the acknowledge for the Nth received byte (0-based).
    pub nack_on_write: Option<u32>,
    pub trace: Vec<Event, 512>,
}

impl SensorModel {
    pub fn new(words: [u16; CALIBRATION_WORDS], ut: u16, up: u32) -> RefCell<Self> {
        RefCell::new(Self {
            scl: true,
            sda_controller: true,
            sda_peripheral: true,
            activity: Activity::Idle,
            read_mode: false,
            pointer: 0,
            control: 0,
            result: 0,
            id: 0x55,
            words,
            ut,
            up,
            bytes_received: 0,
            nack_on_write: None,
            trace: Vec::new(),
        })
    }

    /// Resolved data line: wired-AND of both drivers.
    fn wire_sda(&self) -> bool {
        self.sda_controller && self.sda_peripheral
    }

    fn push(&mut self, event: Event) {
        self.trace.push(event).unwrap();
    }

    fn set_scl(&mut self, high: bool) {
        if self.scl == high {
            return;
        }
        self.scl = high;
        if high {
            self.rising_edge();
        } else {
            self.falling_edge();
        }
    }

    fn set_sda(&mut self, high: bool) {
        if self.sda_controller == high {
            return;
        }
        let before = self.wire_sda();
        self.sda_controller = high;
        let after = self.wire_sda();
        if self.scl && before != after {
            if after {
                self.stop();
            } else {
                self.start();
            }
        }
    }

    /// Start (or repeated start). Resets the decoder, discarding any
    /// partial bits the condition's own clock edges produced.
    fn start(&mut self) {
        self.push(Event::Start);
        self.sda_peripheral = true;
        self.activity = Activity::Receive {
            kind: ReceiveKind::Address,
            bits: 0,
            byte: 0,
        };
    }

    fn stop(&mut self) {
        self.push(Event::Stop);
        self.sda_peripheral = true;
        self.activity = Activity::Idle;
    }

    fn rising_edge(&mut self) {
        let wire = self.wire_sda();
        match self.activity {
            Activity::Receive { kind, bits, byte } => {
                let byte = (byte << 1) | u8::from(wire);
                if bits + 1 == 8 {
                    self.finish_receive(kind, byte);
                } else {
                    self.activity = Activity::Receive {
                        kind,
                        bits: bits + 1,
                        byte,
                    };
                }
            }
            Activity::Serve {
                byte,
                driven,
                sampled,
            } => {
                if sampled + 1 == 8 {
                    self.activity = Activity::ServeAck {
                        byte,
                        released: false,
                    };
                } else {
                    self.activity = Activity::Serve {
                        byte,
                        driven,
                        sampled: sampled + 1,
                    };
                }
            }
            Activity::ServeAck {
                byte,
                released: true,
            } => {
                let acked = !wire;
                self.push(Event::Read { byte, acked });
                self.activity = Activity::Idle;
            }
            _ => {}
        }
    }

    fn falling_edge(&mut self) {
        match self.activity {
            Activity::ReceiveAck {
                kind,
                ack,
                driving: false,
            } => {
                self.sda_peripheral = !ack;
                self.activity = Activity::ReceiveAck {
                    kind,
                    ack,
                    driving: true,
                };
            }
            Activity::ReceiveAck {
                kind,
                ack,
                driving: true,
            } => {
                self.sda_peripheral = true;
                if !ack {
                    self.activity = Activity::Idle;
                } else if matches!(kind, ReceiveKind::Address) && self.read_mode {
                    self.activity = Activity::Serve {
                        byte: self.read_register(self.pointer),
                        driven: 0,
                        sampled: 0,
                    };
                    self.drive_serve_bit();
                } else {
                    let next = match kind {
                        ReceiveKind::Address => ReceiveKind::Pointer,
                        ReceiveKind::Pointer | ReceiveKind::Data => ReceiveKind::Data,
                    };
                    self.activity = Activity::Receive {
                        kind: next,
                        bits: 0,
                        byte: 0,
                    };
                }
            }
            Activity::Serve { .. } => self.drive_serve_bit(),
            Activity::ServeAck {
                byte,
                released: false,
            } => {
                self.sda_peripheral = true;
                self.activity = Activity::ServeAck {
                    byte,
                    released: true,
                };
            }
            _ => {}
        }
    }

    fn drive_serve_bit(&mut self) {
        if let Activity::Serve {
            byte,
            driven,
            sampled,
        } = self.activity
        {
            if driven < 8 {
                self.sda_peripheral = byte & (0x80 >> driven) != 0;
                self.activity = Activity::Serve {
                    byte,
                    driven: driven + 1,
                    sampled,
                };
            }
        }
    }

    fn finish_receive(&mut self, kind: ReceiveKind, byte: u8) {
        let mut ack = match kind {
            ReceiveKind::Address => byte == reg::ADDRESS_WRITE || byte == reg::ADDRESS_READ,
            ReceiveKind::Pointer | ReceiveKind::Data => true,
        };
        if self.nack_on_write == Some(self.bytes_received) {
            ack = false;
        }
        self.bytes_received += 1;
        self.push(Event::Write { byte, acked: ack });
        if ack {
            match kind {
                ReceiveKind::Address => self.read_mode = byte & 0x01 != 0,
                ReceiveKind::Pointer => self.pointer = byte,
                ReceiveKind::Data => self.write_register(byte),
            }
        }
        self.activity = Activity::ReceiveAck {
            kind,
            ack,
            driving: false,
        };
    }

    fn write_register(&mut self, value: u8) {
        if self.pointer == reg::CONTROL {
            self.control = value;
            if value == reg::CONVERT_TEMPERATURE {
                self.result = u32::from(self.ut) << 8;
            } else {
                // Pressure command: re-align the post-shift raw value
                // into the left-aligned 24-bit result.
                let oss = u32::from(value >> 6);
                self.result = self.up << (8 - oss);
            }
        }
    }

    fn read_register(&self, address: u8) -> u8 {
        let calibration_end = reg::CALIBRATION_BASE + 2 * CALIBRATION_WORDS as u8;
        match address {
            a if (reg::CALIBRATION_BASE..calibration_end).contains(&a) => {
                let offset = a - reg::CALIBRATION_BASE;
                let word = self.words[usize::from(offset / 2)];
                if offset % 2 == 0 {
                    (word >> 8) as u8
                } else {
                    word as u8
                }
            }
            reg::DEVICE_ID => self.id,
            reg::CONTROL => self.control,
            reg::RESULT_MSB => (self.result >> 16) as u8,
            reg::RESULT_LSB => (self.result >> 8) as u8,
            reg::RESULT_XLSB => self.result as u8,
            _ => 0xFF,
        }
    }
}

/// Clock pin wired to a shared [`SensorModel`].
pub struct SimScl<'a>(pub &'a RefCell<SensorModel>);

/// Data pin wired to a shared [`SensorModel`].
pub struct SimSda<'a>(pub &'a RefCell<SensorModel>);

/// Delay source that logs millisecond-scale waits into the trace.
pub struct SimDelay<'a>(pub &'a RefCell<SensorModel>);

impl OutputPin for SimScl<'_> {
    fn set_high(&mut self) {
        self.0.borrow_mut().set_scl(true);
    }

    fn set_low(&mut self) {
        self.0.borrow_mut().set_scl(false);
    }
}

impl OutputPin for SimSda<'_> {
    fn set_high(&mut self) {
        self.0.borrow_mut().set_sda(true);
    }

    fn set_low(&mut self) {
        self.0.borrow_mut().set_sda(false);
    }
}

impl InputPin for SimSda<'_> {
    fn is_high(&self) -> bool {
        self.0.borrow().wire_sda()
    }
}

impl SimDelay<'_> {
    fn record(&self, ns: u64) {
        if ns >= 1_000_000 {
            let ms = (ns / 1_000_000) as u32;
            self.0.borrow_mut().push(Event::Wait { ms });
        }
    }
}

impl DelayNs for SimDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.record(u64::from(ns));
    }

    fn delay_us(&mut self, us: u32) {
        self.record(u64::from(us) * 1_000);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.record(u64::from(ms) * 1_000_000);
    }
}
