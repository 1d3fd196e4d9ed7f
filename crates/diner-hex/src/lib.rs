//! diner-hex: hexagonal menu and order API library (core + inbound HTTP)

pub mod config;
pub mod errors;

pub mod application;

pub use diner_types::{domain, ports};

pub mod inbound; // HTTP adapter (server + handlers)
