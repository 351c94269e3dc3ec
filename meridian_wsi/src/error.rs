//! Error types for the Meridian WSI subsystem
//!
//! This module defines the error types used throughout the presentation
//! layer, covering initialization, chain creation, and native-layer failures.

use std::fmt;

/// Result type for Meridian WSI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Meridian WSI errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (native acquire/present/creation failure)
    BackendError(String),

    /// Initialization failed (surface queries, first chain build)
    InitializationFailed(String),

    /// A required device capability or extension is not available
    MissingCapability(String),

    /// The surface is gone and could not be recovered
    SurfaceLost,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::MissingCapability(msg) => write!(f, "Missing capability: {}", msg),
            Error::SurfaceLost => write!(f, "Surface lost"),
        }
    }
}

impl std::error::Error for Error {}

/// Outcome of a chain (re)build attempt that did not produce a chain.
///
/// `NoSurface` is not fatal: it reports a degenerate surface (both axes of
/// the maximum extent are zero, i.e. a minimized window) and callers are
/// expected to block-and-poll until a live resize arrives. `DeviceError`
/// covers capability-query and chain-creation failures and is retried a
/// bounded number of times before escalating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapchainError {
    /// Surface currently has no presentable area (minimized window)
    NoSurface,

    /// A capability query or the chain creation itself failed
    DeviceError,
}
