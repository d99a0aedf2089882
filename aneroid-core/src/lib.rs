//! Board-agnostic bus logic for the Aneroid acquisition stack
//!
//! This crate implements the controller side of a two-wire sensor bus for
//! chips that have no bus peripheral at all: every clock pulse, start and
//! stop condition, and acknowledge bit is produced by toggling two
//! open-drain GPIO lines with precise timing.
//!
//! The engine is cooperative. Byte transfers advance one bus bit per
//! invocation and never block longer than a single bit period, so a
//! firmware main loop can interleave other work between bits. There is no
//! heap, no interrupt use, and no recursion.
//!
//! Sensor-specific sequencing (which registers to read, in what order)
//! lives in `aneroid-drivers` on top of this crate.

#![no_std]
#![deny(unsafe_code)]

pub mod bus;
