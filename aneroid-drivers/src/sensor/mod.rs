//! Sensor drivers

pub mod bmp180;
