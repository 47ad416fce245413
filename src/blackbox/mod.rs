//! # Blackbox Module
//!
//! Encodes flight data into the blackbox log format.
//!
//! This module handles:
//! - Field tables and the per-session condition cache
//! - Variable-byte and tagged encodings
//! - Predictive delta coding against a three-generation history
//! - The textual header and the `I`, `P`, `S`, `H`, `G` and `E` frames
//! - The session state machine that paces everything through a log device

pub mod conditions;
pub mod encoding;
pub mod events;
pub mod fielddefs;
pub mod fields;
pub mod frames;
pub mod header;
pub mod history;
pub mod predictor;
pub mod rate;
pub mod session;
pub mod state;

pub use events::FlightLogEvent;
pub use session::{Blackbox, BlackboxSettings, BlackboxState, SessionStats};
