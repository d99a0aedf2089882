//! Device drivers for the Aneroid acquisition stack
//!
//! Concrete sensor drivers built on the aneroid-core bus engine:
//!
//! - BMP180 barometric pressure / temperature sensor

#![no_std]
#![deny(unsafe_code)]

pub mod sensor;
