//! Domain layer — pure business logic, types, and validation.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `std::fs`, `std::process`, or `std::net`.
//! All functions are synchronous and take data in, returning data out.

pub mod build;
pub mod config;
pub mod error;

pub use build::{
    ArtifactKind, BuildJob, BuildRequest, BuildStatus, RunSummary, UploadResult, parse_devices,
};
pub use config::{ConfigOverrides, Credentials, HttpConfig, RunnerConfig};
pub use error::{ConfigError, InputError, RunError, TunnelError};
