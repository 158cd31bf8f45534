//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection (listener bound by the lifecycle runner)
//!     → server.rs (Axum router, request ID, tracing, compression, timeout)
//!     → handlers (index, health) or assets.rs (bundled files under /assets/)
//!     → Send to client
//! ```

pub mod assets;
pub mod server;

pub use server::{AppState, HttpServer};
