//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!
//! logging.rs fans them out to:
//!     → console (interactive runs only)
//!     → rolling JSON file under <app root>/logs
//! ```
//!
//! # Design Decisions
//! - Structured logging (JSON) for machine parsing
//! - The sink is installed by the lifecycle runner, after the bind probe
//! - Interactive runs print the banner (banner.rs) once logging is up

pub mod banner;
pub mod logging;

pub use logging::{LogSink, LoggingError};
