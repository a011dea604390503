//! Geolocation sensor contracts: permission states, position readings, and the sensor service.

pub mod service;
pub mod types;
