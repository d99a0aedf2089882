//! Aneroid Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the bus and driver crates are
//! written against, so the same acquisition code runs on any chip that can
//! toggle and read two GPIO lines.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Host firmware (polling loop, reporter) │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  aneroid-drivers (BMP180 sequencer)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  aneroid-core (bit-banged bus engine)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  aneroid-hal (this crate - pin traits)  │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::OutputPin`], [`gpio::InputPin`] - open-drain digital I/O
//! - [`gpio::IoPin`] - both directions on one line (the bus data line)

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;

// Re-export key traits at crate root for convenience
pub use gpio::{InputPin, IoPin, OutputPin};
