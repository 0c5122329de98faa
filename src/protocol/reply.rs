// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Interpretation of command replies.

use crate::error::Error;
use crate::types::PropertyValue;

/// The token a device returns as the first result of a successful command.
pub const SUCCESS_TOKEN: &str = "ok";

/// The batched property read method.
pub const GET_PROP: &str = "get_prop";

/// Checks the first element of a command reply.
///
/// # Errors
///
/// Returns `Error::CommandRejected` carrying the first result token if it is
/// not [`SUCCESS_TOKEN`], or `"unknown error"` if the reply is empty or the
/// token is blank.
///
/// # Examples
///
/// ```
/// use screenbar_lib::protocol::check_reply;
/// use serde_json::json;
///
/// assert!(check_reply(&[json!("ok")]).is_ok());
/// assert_eq!(
///     check_reply(&[json!("invalid")]).unwrap_err().to_string(),
///     "command rejected: invalid",
/// );
/// ```
pub fn check_reply(result: &[PropertyValue]) -> Result<(), Error> {
    let message = match result.first() {
        Some(PropertyValue::String(token)) if token == SUCCESS_TOKEN => return Ok(()),
        Some(PropertyValue::String(token)) => token.clone(),
        Some(PropertyValue::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    if message.is_empty() {
        Err(Error::CommandRejected("unknown error".to_string()))
    } else {
        Err(Error::CommandRejected(message))
    }
}
