//! Viewr: a local web-based file browser.
//!
//! The library holds everything behind the `viewr` binary: layered
//! configuration, the server lifecycle and OS service management.

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod service;

/// Short name, used for the service unit and log files.
pub const APP_NAME: &str = "viewr";
pub const APP_DISPLAY_NAME: &str = "Viewr";
pub const APP_DESCRIPTION: &str = "Web-based file browser";

pub use config::{AppConfig, ConfigResolver, Provenance, Resolution};
pub use http::HttpServer;
pub use lifecycle::{LifecycleRunner, RunError};
pub use service::{ServiceController, ServiceManager, ServiceStatus};
