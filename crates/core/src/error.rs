//! Error types for Facets
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use crate::attribute::AttributeKey;
use crate::types::EntityId;
use crate::value::ValueType;
use thiserror::Error;

/// Result type alias for Facets operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for entity views
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A contract, or a contract it references or extends, failed validation
    #[error("Invalid view contract {contract}: {reason}")]
    InvalidViewContract {
        /// Contract that was requested
        contract: &'static str,
        /// First rejection found
        reason: String,
    },

    /// The view's backing entity is gone
    #[error("Stale view of {contract}: entity reference lost")]
    StaleView {
        /// Contract of the stale view
        contract: &'static str,
    },

    /// Strict attribute read or removal found nothing
    #[error("Attribute absent: {0}")]
    AttributeAbsent(AttributeKey),

    /// Strict child lookup found nothing
    #[error("Entity absent: {0}")]
    EntityAbsent(EntityId),

    /// Child creation with an identity that is already taken
    #[error("Entity id already in use: {0}")]
    EntityIdInUse(EntityId),

    /// Value does not match the attribute key's payload type
    #[error("Payload type mismatch for {key}: got {actual}")]
    PayloadTypeMismatch {
        /// Attribute being written
        key: AttributeKey,
        /// Payload type supplied
        actual: ValueType,
    },

    /// Invocation of a method no contract in the hierarchy declares
    #[error("Unknown method {contract}::{method}")]
    UnknownMethod {
        /// Contract of the view
        contract: &'static str,
        /// Requested method name
        method: String,
    },

    /// Arguments do not fit the declared signature
    #[error("Argument mismatch calling {method}: {reason}")]
    ArgumentMismatch {
        /// Method being invoked
        method: String,
        /// What did not fit
        reason: String,
    },

    /// A dispatch reply was converted into the wrong Rust shape
    #[error("Reply mismatch: expected {expected}, got {actual}")]
    ReplyMismatch {
        /// Shape asked for
        expected: &'static str,
        /// Shape received
        actual: &'static str,
    },

    /// The dispatcher found no route for a method of a validated contract
    #[error("Internal dispatch fault: no route for {contract}::{method}")]
    InternalDispatchFault {
        /// Contract of the view
        contract: &'static str,
        /// Method that could not be routed
        method: String,
    },

    /// Invalid engine configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create an InvalidViewContract error
    pub fn invalid_contract(contract: &'static str, reason: impl Into<String>) -> Self {
        Error::InvalidViewContract {
            contract,
            reason: reason.into(),
        }
    }

    /// Create an ArgumentMismatch error
    pub fn argument_mismatch(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::ArgumentMismatch {
            method: method.into(),
            reason: reason.into(),
        }
    }

    /// Create a Config error
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Whether this error reports an absent attribute or child
    pub fn is_absent(&self) -> bool {
        matches!(self, Error::AttributeAbsent(_) | Error::EntityAbsent(_))
    }
}
