//! Procwatch System - sysinfo-backed process probe
//!
//! Implements the [`procwatch_core::ProcessProbe`] capability on top of the
//! OS process table.

mod system_probe;

pub use system_probe::SystemProbe;
