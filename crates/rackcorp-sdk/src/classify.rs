// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Success/failure classification of decoded responses.

use crate::envelope::{Action, ResponseStatus};
use crate::error::{Result, SdkError};

/// Classify a response whose operation guarantees a payload.
///
/// Succeeds only when the code is `OK` and the payload is present. An `OK`
/// with no payload is reported as an API error carrying the `OK` code.
pub fn classify<T>(action: Action, status: ResponseStatus, payload: Option<T>) -> Result<T> {
    match payload {
        Some(value) if status.is_ok() => Ok(value),
        _ => Err(api_error(action, status)),
    }
}

/// Classify a response that carries no payload.
pub fn check_status(action: Action, status: ResponseStatus) -> Result<()> {
    if status.is_ok() {
        Ok(())
    } else {
        Err(api_error(action, status))
    }
}

fn api_error(action: Action, status: ResponseStatus) -> SdkError {
    SdkError::Api {
        action: action.to_string(),
        code: status.code,
        message: status.message,
        detail: status.detail,
    }
}
