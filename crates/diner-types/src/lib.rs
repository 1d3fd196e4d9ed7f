//! diner-types: domain values and persistence ports shared by every crate.

pub mod domain;
pub mod ports;
