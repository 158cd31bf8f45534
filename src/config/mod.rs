//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs)
//!     → document on disk (loader.rs: strict YAML, semantic checks)
//!     → VIEWR_* environment variables (resolver.rs)
//!     → command-line flags (resolver.rs)
//!     → AppConfig + Provenance (immutable, passed by reference)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once resolved; it is created once per process
//! - All fields have defaults, so a missing document still yields a valid value
//! - A malformed document aborts resolution; a bad override is skipped
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod resolver;
pub mod schema;
pub mod template;
pub mod validation;

pub use loader::{validate, DocumentSource, ResolveError};
pub use resolver::{ConfigResolver, FlagProvider, NoFlags, Provenance, Resolution, VarSource};
pub use schema::{AppConfig, LogLevel, PathEntry, ServerSettings};
pub use template::{export_template, TemplateError};
pub use validation::{check_bindable, valid_address, valid_log_level, valid_port, BindError};
