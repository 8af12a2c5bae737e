//! # Onyx Signal Info Library
//!
//! Gets signal information from the SORACOM Onyx LTE USB dongle
//! (SC-QGLC4-C1, a Quectel EG25-G) over its AT command port.
//!
//! This library provides the serial AT gateway, the response parser and field
//! table, the `-i` field selector, and the three output sinks (console,
//! SORACOM Air metadata, SORACOM unified endpoint).

pub mod app;
pub mod at;
pub mod cli;
pub mod config;
pub mod error;
pub mod serial;
pub mod signal;
pub mod sink;
