//! Unified error type for feeder extraction
//!
//! Every failure that escapes the cursor, extractor or collector is a
//! [`FeederError`]. Variants that concern one circuit entity carry both the
//! entity name and the operation that was running, so a failed pass can be
//! traced back to the exact bus or element that tripped it.
//!
//! # Example
//!
//! ```
//! use feeder_core::{FeederError, FeederResult};
//!
//! fn lookup(name: &str) -> FeederResult<()> {
//!     Err(FeederError::NotFound {
//!         kind: "bus",
//!         name: name.to_string(),
//!         operation: "activate bus",
//!     })
//! }
//!
//! let err = lookup("bus99").unwrap_err();
//! assert!(err.to_string().contains("bus99"));
//! ```

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FeederError {
    /// A bus or element name is unknown to the solved circuit.
    #[error("{kind} '{name}' not found (during {operation})")]
    NotFound {
        kind: &'static str,
        name: String,
        operation: &'static str,
    },

    /// A sample array is shorter than the extraction requires.
    #[error(
        "malformed terminal data on '{entity}' during {operation}: expected {expected} samples, found {found}"
    )]
    MalformedTerminalData {
        entity: String,
        operation: &'static str,
        expected: usize,
        found: usize,
    },

    /// A power array whose length is not a whole number of (P, Q) pairs.
    #[error("unpaired samples on '{entity}' during {operation}: {found} values do not form (P, Q) pairs")]
    UnpairedSamples {
        entity: String,
        operation: &'static str,
        found: usize,
    },

    /// The base voltage of a bus cannot be used for per-unit conversion.
    #[error("invalid base voltage {kv_base} kV on bus '{bus}' during {operation}")]
    InvalidBase {
        bus: String,
        kv_base: f64,
        operation: &'static str,
    },

    /// The circuit model could not be loaded or solved.
    #[error("solver unavailable: {0}")]
    SolverUnavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Other(String),
}

pub type FeederResult<T> = Result<T, FeederError>;

impl FeederError {
    /// Shorthand for a bus lookup failure.
    pub fn bus_not_found(name: impl Into<String>, operation: &'static str) -> Self {
        FeederError::NotFound {
            kind: "bus",
            name: name.into(),
            operation,
        }
    }

    /// Shorthand for an element lookup failure.
    pub fn element_not_found(name: impl Into<String>, operation: &'static str) -> Self {
        FeederError::NotFound {
            kind: "element",
            name: name.into(),
            operation,
        }
    }

    /// Name of the bus or element the error is about, when there is one.
    pub fn entity(&self) -> Option<&str> {
        match self {
            FeederError::NotFound { name, .. } => Some(name),
            FeederError::MalformedTerminalData { entity, .. }
            | FeederError::UnpairedSamples { entity, .. } => Some(entity),
            FeederError::InvalidBase { bus, .. } => Some(bus),
            _ => None,
        }
    }

    /// Operation that was running when the error was raised.
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            FeederError::NotFound { operation, .. }
            | FeederError::MalformedTerminalData { operation, .. }
            | FeederError::UnpairedSamples { operation, .. }
            | FeederError::InvalidBase { operation, .. } => Some(operation),
            _ => None,
        }
    }
}

impl From<anyhow::Error> for FeederError {
    fn from(err: anyhow::Error) -> Self {
        FeederError::Other(err.to_string())
    }
}

impl From<String> for FeederError {
    fn from(s: String) -> Self {
        FeederError::Other(s)
    }
}

impl From<&str> for FeederError {
    fn from(s: &str) -> Self {
        FeederError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for FeederError {
    fn from(err: serde_json::Error) -> Self {
        FeederError::Parse(err.to_string())
    }
}
