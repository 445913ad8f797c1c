//! Infrastructure layer module
//!
//! Adapters behind the domain ports:
//! - Rotating file and in-memory log sinks
//! - The tracing subscriber wiring and panic hook

pub mod logging;
