//! # Signal Information Module
//!
//! Everything between raw AT response text and the fields handed to a sink.
//!
//! This module handles:
//! - The static field table and per-field transforms
//! - Parsing `+QENG`, `+CSQ` and `+QCSQ` responses
//! - Selecting the fields requested with `-i`

pub mod fields;
pub mod parser;
pub mod select;

pub use fields::{FieldSpec, FieldValue, Rat, FIELD_SPECS};
pub use parser::{ModemResponses, SignalReading};
pub use select::{RequestedFields, SelectedFields, ANY, DEFAULT_INCLUDE};
