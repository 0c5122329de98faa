// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `screenbar_lib` library.
//!
//! The hierarchy mirrors the places a request can fail: establishing the
//! transport connection, reading the cached status, the device rejecting a
//! command, a transformer or hook failing, and configuration loading.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// The transport connection could not be established and the retry
    /// policy gave up.
    #[error("connection error: {0}")]
    Connection(TransportError),

    /// A value was requested before any successful poll.
    #[error("data never fetched")]
    StaleData,

    /// The device answered a command with something other than `ok`.
    #[error("command rejected: {0}")]
    CommandRejected(String),

    /// A transformer or hook failed.
    #[error("transform error: {0}")]
    Transform(String),

    /// The transport failed while a call was in flight.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A device call did not complete within the configured timeout.
    #[error("request timed out after {0} ms")]
    Timeout(u64),

    /// A value could not be interpreted.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// The accessory configuration is invalid.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// The service does not expose the requested characteristic.
    #[error("characteristic {0} is not exposed by this service")]
    UnsupportedCharacteristic(String),
}

impl Error {
    /// Creates a [`Error::Transform`] from anything displayable.
    pub fn transform(message: impl std::fmt::Display) -> Self {
        Self::Transform(message.to_string())
    }
}

/// Errors related to interpreting device properties and characteristic values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// An unknown switch state string was provided.
    #[error("invalid switch state: {0}")]
    InvalidSwitchState(String),

    /// A characteristic value had the wrong kind.
    #[error("expected a {expected} value, got {actual}")]
    WrongKind {
        /// The kind the caller needed.
        expected: &'static str,
        /// Debug rendering of the value received.
        actual: String,
    },

    /// A device property could not be read as a number.
    #[error("property {key} is not numeric: {raw}")]
    NotNumeric {
        /// The property key.
        key: String,
        /// The raw property value.
        raw: String,
    },

    /// A device property is missing from the status snapshot.
    #[error("property {0} is missing from the status")]
    MissingProperty(String),
}

/// Errors raised by a [`Connector`](crate::protocol::Connector) or one of its
/// connections.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Connecting to the device failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// A call could not be delivered or no reply was received.
    #[error("call failed: {0}")]
    CallFailed(String),

    /// The device sent a reply that could not be understood.
    #[error("malformed reply: {0}")]
    MalformedReply(String),
}

/// Errors related to accessory configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration JSON could not be parsed.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required field is missing or empty.
    #[error("missing field in config: {0}")]
    MissingField(&'static str),

    /// A field has a value outside its accepted range.
    #[error("invalid value for {field}: {message}")]
    InvalidValue {
        /// The offending field.
        field: &'static str,
        /// Why it was rejected.
        message: String,
    },
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
