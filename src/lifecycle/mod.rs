//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (runner.rs):
//!     Probe bind → Init logging → Build HTTP server → Bind → Spawn serving task
//!
//! Running:
//!     Controlling task waits for the first of
//!         cancellation token (signals.rs, owned by the entry point)
//!         serve-time failure (single-slot channel from the serving task)
//!
//! Shutdown (shutdown.rs):
//!     Token cancelled → Stop accepting → Drain in-flight (≤ 5s) → Exit
//!     Serve failure   → Return the error, nothing to drain
//! ```
//!
//! # Design Decisions
//! - The runner never installs signal handlers; it only observes a token
//! - Shutdown has a fixed timeout; overrunning it is logged, not fatal
//! - No shared mutable state between the serving and controlling tasks

pub mod runner;
pub mod shutdown;
pub mod signals;

pub use runner::{LifecycleRunner, RunError};
pub use shutdown::SHUTDOWN_TIMEOUT;
