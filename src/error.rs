// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Failure of a ledger operation.
///
/// Empty result sets are never errors; an unknown group simply has no
/// members.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("{what} {id} not found")]
    NotFound { what: &'static str, id: String },

    #[error("{0}")]
    Invalid(String),
}

impl LedgerError {
    pub fn not_found(what: &'static str, id: impl ToString) -> Self {
        LedgerError::NotFound {
            what,
            id: id.to_string(),
        }
    }

    pub fn invalid(msg: impl Into<String>) -> Self {
        LedgerError::Invalid(msg.into())
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
