//! Concrete notification sinks.
//!
//! Every sink is constructed and validated at startup; a sink that cannot
//! be set up fails the run before the poll loop starts.

mod desktop;
mod email;

pub use desktop::DesktopSink;
pub use email::EmailSink;
