//! Procwatch Core - Platform-independent abstractions and configurations
//!
//! This crate provides the process identity and snapshot types, the probe and
//! notification capability traits, and the error and configuration types
//! shared by the platform probe and the watcher engine.

mod config;
mod error;
mod process;
mod sink;

pub use config::*;
pub use error::*;
pub use process::*;
pub use sink::*;
