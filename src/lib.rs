//! # Blackbox Logger Library
//!
//! Flight data recorder producing compact, self-describing flight logs.
//!
//! A [`blackbox::Blackbox`] is fed one sample per control-loop iteration and
//! writes a textual header followed by predictively coded binary frames to a
//! [`device::LogDevice`], never blocking the loop.

pub mod blackbox;
pub mod config;
pub mod device;
pub mod error;
pub mod flight;
