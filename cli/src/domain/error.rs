//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use thiserror::Error;

// ── Input errors ──────────────────────────────────────────────────────────────

/// Errors raised while validating command-line input, before any request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Device list is empty. Pass at least one device with --device.")]
    NoDevices,

    #[error("{what} file path is empty")]
    EmptyPath { what: &'static str },

    #[error("{what} file not found: {path}")]
    FileNotFound { what: &'static str, path: String },

    #[error("{0} is empty")]
    EmptyCredential(&'static str),
}

// ── Run errors ────────────────────────────────────────────────────────────────

/// Errors that end a build run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("request to {url} failed after {attempts} attempt(s): {message}")]
    Transport {
        url: String,
        attempts: u32,
        message: String,
    },

    #[error("HTTP {status} from {url}: {body}")]
    HttpStatus { status: u16, url: String, body: String },

    #[error("response from {url} is missing field '{field}'")]
    MissingField { url: String, field: &'static str },

    #[error("XCUI build: {build_id} failed with status: {status}")]
    BuildFailed { build_id: String, status: String },

    #[error("XCUI build: {build_id} timeout: {seconds}s")]
    Timeout { build_id: String, seconds: u64 },
}

// ── Tunnel errors ─────────────────────────────────────────────────────────────

/// Errors from the BrowserStack Local relay process.
#[derive(Debug, Error)]
pub enum TunnelError {
    #[error("BrowserStack Local did not connect: {0}")]
    NotConnected(String),

    #[error("unreadable BrowserStack Local output: {0}")]
    BadOutput(String),

    #[error("BrowserStack Local {action} exited with status {code}: {stderr}")]
    CommandFailed {
        action: &'static str,
        code: i32,
        stderr: String,
    },
}

// ── Config errors ─────────────────────────────────────────────────────────────

/// Errors related to configuration values.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}\n\nExpected an http:// or https:// URL")]
    InvalidUrl { key: &'static str, value: String },

    #[error("Invalid value for {key}: must be greater than zero")]
    ZeroValue { key: &'static str },

    #[error("Invalid value for {key}: must not be empty")]
    Empty { key: &'static str },
}
